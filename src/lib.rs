// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

// Use README.md as crate documentation.
#![doc = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/README.md"))]

mod explorer;
mod hierarchy;
mod model;
pub mod report;
mod resolver;
mod source;
mod utils;

pub use explorer::{ExcludedAssignment, ExclusionRecord, Explorer, SubscriptionReport};
pub use hierarchy::HierarchyIndex;
pub use model::{
    ManagementGroup, ManagementGroupChild, ParameterValue, PolicyAssignment, Subscription,
};
pub use resolver::{
    is_excluded, is_in_effect, Comparison, Exclusion, GroupScope, MatchedBy, ResolverOptions,
    ScopeResolver,
};
pub use source::{
    FetchError, PolicySource, SessionContext, Snapshot, SnapshotFormat, SnapshotSource,
};

/// Items in `unstable` are likely to change.
pub mod unstable {
    pub use crate::utils::path::*;
}
