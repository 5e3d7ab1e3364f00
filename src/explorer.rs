// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::hierarchy::HierarchyIndex;
use crate::model::{PolicyAssignment, Subscription};
use crate::resolver::{MatchedBy, ResolverOptions, ScopeResolver};
use crate::source::{FetchError, PolicySource};

use log::{info, warn};
use serde::Serialize;

/// Why an assignment was left out for a subscription.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ExclusionRecord {
    pub not_scope: String,
    /// Group whose id matched. `None` when the subscription id itself matched.
    pub management_group: Option<String>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExcludedAssignment {
    pub assignment: PolicyAssignment,
    pub exclusion: ExclusionRecord,
}

/// Assignments of one subscription split by applicability.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionReport {
    pub subscription: Subscription,
    pub in_effect: Vec<PolicyAssignment>,
    pub excluded: Vec<ExcludedAssignment>,
}

/// An exploration session over a [`PolicySource`].
///
/// The management group index is built once when the session is created and
/// shared by every resolution that follows.
#[derive(Debug)]
pub struct Explorer<S> {
    source: S,
    index: HierarchyIndex,
    resolver: ScopeResolver,
}

impl<S: PolicySource> Explorer<S> {
    /// Create a session. A failure to list management groups is not fatal:
    /// the session continues with an empty index.
    pub fn new(source: S, options: ResolverOptions) -> Self {
        match source.context().tenant_id.as_deref() {
            Some(tenant) => info!("exploring tenant {tenant}"),
            None => info!("exploring all tenants"),
        }

        let groups = match source.management_groups() {
            Ok(groups) => groups,
            Err(e) => {
                warn!("Failed to fetch management groups: {e}");
                vec![]
            }
        };
        let index = HierarchyIndex::build(&groups);
        info!("indexed {} management groups", index.len());

        Self {
            source,
            index,
            resolver: ScopeResolver::new(options),
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn index(&self) -> &HierarchyIndex {
        &self.index
    }

    pub fn resolver(&self) -> &ScopeResolver {
        &self.resolver
    }

    pub fn subscriptions(&self) -> Result<Vec<Subscription>, FetchError> {
        self.source.subscriptions()
    }

    /// Look up a subscription by id, display name or `Display Name (id)` label.
    pub fn select_subscription(&self, selector: &str) -> Result<Option<Subscription>, FetchError> {
        let subscriptions = self.subscriptions()?;
        Ok(subscriptions.into_iter().find(|s| {
            s.id == selector
                || s.display_name.as_deref() == Some(selector)
                || crate::report::subscription_label(s) == selector
        }))
    }

    /// Fetch the assignments of `subscription` and decide which are in effect.
    pub fn explore(&self, subscription: &Subscription) -> Result<SubscriptionReport, FetchError> {
        let assignments = self.source.policy_assignments(&subscription.id)?;

        let mut in_effect = vec![];
        let mut excluded = vec![];
        for assignment in assignments {
            let exclusion = if assignment.not_scopes.is_empty() {
                None
            } else {
                self.resolver
                    .find_exclusion(&subscription.id, &assignment.not_scopes, &self.index)
                    .map(|e| ExclusionRecord {
                        not_scope: e.not_scope.to_string(),
                        management_group: match e.matched_by {
                            MatchedBy::Subscription => None,
                            MatchedBy::ManagementGroup(g) => Some(g.to_string()),
                        },
                    })
            };

            match exclusion {
                Some(exclusion) => excluded.push(ExcludedAssignment {
                    assignment,
                    exclusion,
                }),
                None => in_effect.push(assignment),
            }
        }

        info!(
            "subscription {}: {} assignments in effect, {} excluded",
            subscription.id,
            in_effect.len(),
            excluded.len()
        );

        Ok(SubscriptionReport {
            subscription: subscription.clone(),
            in_effect,
            excluded,
        })
    }
}
