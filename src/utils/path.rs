// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Resource path utilities used by the resource-path comparison mode

/// Segment keyword introducing a subscription id.
pub const SUBSCRIPTIONS: &str = "subscriptions";

/// Segment keyword introducing a management group name.
pub const MANAGEMENT_GROUPS: &str = "managementGroups";

/// A resource path such as
/// `/providers/Microsoft.Management/managementGroups/mg-finance`
/// split into its non-empty segments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourcePath<'a> {
    segments: Vec<&'a str>,
}

impl<'a> ResourcePath<'a> {
    pub fn parse(path: &'a str) -> Self {
        Self {
            segments: path
                .split('/')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .collect(),
        }
    }

    pub fn segments(&self) -> &[&'a str] {
        &self.segments
    }

    /// Values that directly follow `keyword` anywhere in the path.
    /// Keywords compare ASCII case-insensitively.
    pub fn values_of<'k>(&'k self, keyword: &'k str) -> impl Iterator<Item = &'a str> + 'k {
        self.segments
            .windows(2)
            .filter(move |pair| pair[0].eq_ignore_ascii_case(keyword))
            .map(|pair| pair[1])
    }

    /// True if the path contains the pair `keyword/value`.
    pub fn has_pair(&self, keyword: &str, value: &str) -> bool {
        self.values_of(keyword).any(|v| v.eq_ignore_ascii_case(value))
    }
}

/// Last non-empty segment of an identifier. Bare names are returned as is.
pub fn last_segment(id: &str) -> &str {
    id.rsplit('/')
        .map(str::trim)
        .find(|s| !s.is_empty())
        .unwrap_or(id)
}
