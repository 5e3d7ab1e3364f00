// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::model::{ManagementGroup, PolicyAssignment, Subscription};

use std::path::Path;

use indexmap::IndexMap;
use log::info;
use serde::{Deserialize, Serialize};

mod error;
pub use error::FetchError;

/// Explicit session state handed to a [`PolicySource`] when it is created.
///
/// Replaces reliance on an ambient, process-wide login.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionContext {
    /// Tenant the session is bound to. `None` accepts any tenant.
    pub tenant_id: Option<String>,
}

impl SessionContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tenant(tenant_id: impl Into<String>) -> Self {
        Self {
            tenant_id: Some(tenant_id.into()),
        }
    }

    /// True if a record of `tenant_id` is visible to this session.
    /// Records without a tenant are always visible.
    pub fn accepts(&self, tenant_id: Option<&str>) -> bool {
        match (&self.tenant_id, tenant_id) {
            (Some(expected), Some(actual)) => expected.eq_ignore_ascii_case(actual),
            _ => true,
        }
    }
}

/// Supplies the records the explorer works on.
///
/// Failures are reported as errors and are never turned into empty results.
pub trait PolicySource {
    fn context(&self) -> &SessionContext;

    fn subscriptions(&self) -> Result<Vec<Subscription>, FetchError>;

    fn management_groups(&self) -> Result<Vec<ManagementGroup>, FetchError>;

    fn policy_assignments(&self, subscription_id: &str)
        -> Result<Vec<PolicyAssignment>, FetchError>;
}

/// Exported state of a tenant.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Snapshot {
    pub tenant_id: Option<String>,
    pub subscriptions: Vec<Subscription>,
    pub management_groups: Vec<ManagementGroup>,
    /// Assignments keyed by subscription id.
    pub policy_assignments: IndexMap<String, Vec<PolicyAssignment>>,
}

/// Snapshot file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotFormat {
    Json,
    Yaml,
}

impl SnapshotFormat {
    pub fn from_path(path: &Path) -> Result<Self, FetchError> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Ok(SnapshotFormat::Json),
            Some("yaml") | Some("yml") => Ok(SnapshotFormat::Yaml),
            _ => Err(FetchError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

impl Snapshot {
    pub fn parse(contents: &str, format: SnapshotFormat) -> Result<Self, FetchError> {
        Ok(match format {
            SnapshotFormat::Json => serde_json::from_str(contents)?,
            SnapshotFormat::Yaml => serde_yaml::from_str(contents)?,
        })
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, FetchError> {
        let path = path.as_ref();
        let format = SnapshotFormat::from_path(path)?;
        let contents = std::fs::read_to_string(path).map_err(|source| FetchError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse(&contents, format)
    }
}

/// [`PolicySource`] backed by an in-memory [`Snapshot`].
#[derive(Debug, Clone)]
pub struct SnapshotSource {
    context: SessionContext,
    snapshot: Snapshot,
}

impl SnapshotSource {
    pub fn new(context: SessionContext, snapshot: Snapshot) -> Result<Self, FetchError> {
        if let (Some(expected), Some(found)) = (&context.tenant_id, &snapshot.tenant_id) {
            if !expected.eq_ignore_ascii_case(found) {
                return Err(FetchError::TenantMismatch {
                    expected: expected.clone(),
                    found: found.clone(),
                });
            }
        }
        Ok(Self { context, snapshot })
    }

    pub fn open<P: AsRef<Path>>(context: SessionContext, path: P) -> Result<Self, FetchError> {
        let snapshot = Snapshot::from_file(path.as_ref())?;
        info!(
            "loaded snapshot {}: {} subscriptions, {} management groups",
            path.as_ref().display(),
            snapshot.subscriptions.len(),
            snapshot.management_groups.len()
        );
        Self::new(context, snapshot)
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    fn find_subscription(&self, subscription_id: &str) -> Option<&Subscription> {
        self.snapshot
            .subscriptions
            .iter()
            .filter(|s| self.context.accepts(s.tenant_id.as_deref()))
            .find(|s| s.id == subscription_id)
    }
}

impl PolicySource for SnapshotSource {
    fn context(&self) -> &SessionContext {
        &self.context
    }

    fn subscriptions(&self) -> Result<Vec<Subscription>, FetchError> {
        Ok(self
            .snapshot
            .subscriptions
            .iter()
            .filter(|s| self.context.accepts(s.tenant_id.as_deref()))
            .cloned()
            .collect())
    }

    fn management_groups(&self) -> Result<Vec<ManagementGroup>, FetchError> {
        Ok(self.snapshot.management_groups.clone())
    }

    fn policy_assignments(
        &self,
        subscription_id: &str,
    ) -> Result<Vec<PolicyAssignment>, FetchError> {
        if self.find_subscription(subscription_id).is_none() {
            return Err(FetchError::UnknownSubscription(subscription_id.to_string()));
        }
        Ok(self
            .snapshot
            .policy_assignments
            .get(subscription_id)
            .cloned()
            .unwrap_or_default())
    }
}
