// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::hierarchy::HierarchyIndex;
use crate::model::PolicyAssignment;
use crate::utils::path::{last_segment, ResourcePath, MANAGEMENT_GROUPS, SUBSCRIPTIONS};

use core::fmt;

use log::debug;
use serde::{Deserialize, Serialize};

/// Which management groups are compared against notScopes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GroupScope {
    /// Every group known to the index, whether or not it contains the
    /// subscription.
    #[default]
    AllGroups,
    /// Only the subscription's ancestor chain recorded in the index.
    Ancestors,
}

/// How an identifier is matched against a notScope entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Comparison {
    /// Case-sensitive substring containment, not anchored to segments.
    #[default]
    Substring,
    /// `subscriptions/<id>` and `managementGroups/<name>` segment pairs.
    ResourcePath,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResolverOptions {
    pub groups: GroupScope,
    pub comparison: Comparison,
}

/// What caused an exclusion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchedBy<'a> {
    Subscription,
    ManagementGroup(&'a str),
}

/// The first notScope entry found to exclude a subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Exclusion<'a> {
    pub not_scope: &'a str,
    pub matched_by: MatchedBy<'a>,
}

impl fmt::Display for Exclusion<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.matched_by {
            MatchedBy::Subscription => {
                write!(f, "notScope `{}` matches the subscription", self.not_scope)
            }
            MatchedBy::ManagementGroup(group) => {
                write!(
                    f,
                    "notScope `{}` matches management group `{group}`",
                    self.not_scope
                )
            }
        }
    }
}

/// Decides whether a policy assignment is excluded for a subscription.
///
/// The default options reproduce the behavior of the portal explorer:
/// every known group is considered and identifiers match as substrings.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScopeResolver {
    options: ResolverOptions,
}

impl ScopeResolver {
    pub fn new(options: ResolverOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ResolverOptions {
        &self.options
    }

    /// Find the first notScope entry that excludes `subscription_id`.
    ///
    /// Entries are visited in order. For each entry the subscription id is
    /// checked before the groups, and groups are visited in index order.
    pub fn find_exclusion<'a>(
        &self,
        subscription_id: &str,
        not_scopes: &'a [String],
        index: &'a HierarchyIndex,
    ) -> Option<Exclusion<'a>> {
        if not_scopes.is_empty() {
            return None;
        }

        let groups: Vec<&'a str> = match self.options.groups {
            GroupScope::AllGroups => index.iter().collect(),
            GroupScope::Ancestors => index.ancestors(subscription_id),
        };

        for not_scope in not_scopes {
            let matched_by = match self.options.comparison {
                Comparison::Substring => {
                    if not_scope.contains(subscription_id) {
                        Some(MatchedBy::Subscription)
                    } else {
                        groups
                            .iter()
                            .copied()
                            .find(|g| not_scope.contains(*g))
                            .map(MatchedBy::ManagementGroup)
                    }
                }
                Comparison::ResourcePath => {
                    let path = ResourcePath::parse(not_scope);
                    if path.has_pair(SUBSCRIPTIONS, subscription_id) {
                        Some(MatchedBy::Subscription)
                    } else {
                        groups
                            .iter()
                            .copied()
                            .find(|g| path.has_pair(MANAGEMENT_GROUPS, last_segment(g)))
                            .map(MatchedBy::ManagementGroup)
                    }
                }
            };

            if let Some(matched_by) = matched_by {
                let exclusion = Exclusion {
                    not_scope: not_scope.as_str(),
                    matched_by,
                };
                debug!("subscription {subscription_id} excluded: {exclusion}");
                return Some(exclusion);
            }
        }

        None
    }

    pub fn is_excluded(
        &self,
        subscription_id: &str,
        not_scopes: &[String],
        index: &HierarchyIndex,
    ) -> bool {
        self.find_exclusion(subscription_id, not_scopes, index)
            .is_some()
    }

    /// True if `assignment` applies to the subscription after exclusions.
    pub fn is_in_effect(
        &self,
        subscription_id: &str,
        assignment: &PolicyAssignment,
        index: &HierarchyIndex,
    ) -> bool {
        assignment.not_scopes.is_empty()
            || !self.is_excluded(subscription_id, &assignment.not_scopes, index)
    }
}

/// [`ScopeResolver::is_excluded`] with default options.
pub fn is_excluded(subscription_id: &str, not_scopes: &[String], index: &HierarchyIndex) -> bool {
    ScopeResolver::default().is_excluded(subscription_id, not_scopes, index)
}

/// [`ScopeResolver::is_in_effect`] with default options.
pub fn is_in_effect(
    subscription_id: &str,
    assignment: &PolicyAssignment,
    index: &HierarchyIndex,
) -> bool {
    ScopeResolver::default().is_in_effect(subscription_id, assignment, index)
}
