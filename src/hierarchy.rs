// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::model::{ManagementGroup, ManagementGroupChild};
use crate::utils::path::last_segment;

use std::collections::{HashMap, HashSet, VecDeque};

use indexmap::IndexSet;

/// Lookup structure over the management groups of a tenant.
///
/// Group identifiers are kept in first-seen order so that resolution walks
/// them in the same order the groups were fetched. Parent links recorded from
/// `children` allow the ancestor chain of a subscription to be computed.
#[derive(Debug, Clone, Default)]
pub struct HierarchyIndex {
    groups: IndexSet<String>,
    parents: HashMap<String, Vec<String>>,
}

impl HierarchyIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an index over `groups`. Groups nested inside `children` are
    /// indexed as well.
    pub fn build<'a, I>(groups: I) -> Self
    where
        I: IntoIterator<Item = &'a ManagementGroup>,
    {
        let mut index = Self::new();
        for group in groups {
            index.groups.insert(group.id.clone());
            index.add_children(&group.id, &group.children);
        }
        index
    }

    fn add_parent(&mut self, child: &str, parent: &str) {
        let parents = self.parents.entry(child.to_string()).or_default();
        if !parents.iter().any(|p| p == parent) {
            parents.push(parent.to_string());
        }
    }

    fn add_children(&mut self, parent: &str, children: &[ManagementGroupChild]) {
        for child in children {
            self.add_parent(&child.id, parent);

            if child.is_subscription() {
                // Subscription children carry `/subscriptions/<guid>` ids while
                // lookups use the bare guid.
                self.add_parent(last_segment(&child.id), parent);
                if let Some(name) = &child.name {
                    self.add_parent(name, parent);
                }
            } else {
                self.groups.insert(child.id.clone());
            }
            self.add_children(&child.id, &child.children);
        }
    }

    /// True if `id` is exactly the identifier of a known group.
    pub fn contains(&self, id: &str) -> bool {
        self.groups.contains(id)
    }

    /// Group identifiers in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = &str> + '_ {
        self.groups.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Ancestor groups of a subscription or group, nearest first.
    ///
    /// Each ancestor appears once even when it is reachable along several
    /// paths. Ids without recorded parents have no ancestors.
    pub fn ancestors(&self, id: &str) -> Vec<&str> {
        let mut seen: HashSet<&str> = HashSet::new();
        let mut chain = vec![];
        let mut queue: VecDeque<&str> = VecDeque::new();
        queue.push_back(id);

        while let Some(current) = queue.pop_front() {
            let Some(parents) = self.parents.get(current) else {
                continue;
            };
            for parent in parents {
                if parent != id && seen.insert(parent.as_str()) {
                    chain.push(parent.as_str());
                    queue.push_back(parent.as_str());
                }
            }
        }

        chain
    }
}

impl<'a> FromIterator<&'a ManagementGroup> for HierarchyIndex {
    fn from_iter<T: IntoIterator<Item = &'a ManagementGroup>>(iter: T) -> Self {
        Self::build(iter)
    }
}
