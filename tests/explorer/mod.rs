// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use policy_explorer::*;

use anyhow::{anyhow, Result};

const TENANT: &str = "11111111-1111-1111-1111-111111111111";
const PRODUCTION: &str = "22222222-0000-0000-0000-000000000001";
const SANDBOX: &str = "22222222-0000-0000-0000-000000000002";
const LEGACY: &str = "22222222-0000-0000-0000-000000000003";
const SANDBOXES: &str = "/providers/Microsoft.Management/managementGroups/sandboxes";

fn explorer(options: ResolverOptions) -> Result<Explorer<SnapshotSource>> {
    let _ = env_logger::builder().is_test(true).try_init();
    let source = SnapshotSource::open(
        SessionContext::with_tenant(TENANT),
        "tests/explorer/tenant.yaml",
    )?;
    Ok(Explorer::new(source, options))
}

fn names(assignments: &[PolicyAssignment]) -> Vec<&str> {
    assignments.iter().map(|a| a.name.as_str()).collect()
}

fn select(explorer: &Explorer<SnapshotSource>, selector: &str) -> Result<Subscription> {
    explorer
        .select_subscription(selector)?
        .ok_or_else(|| anyhow!("subscription {selector} not found"))
}

#[test]
fn index_is_built_from_snapshot() -> Result<()> {
    let explorer = explorer(ResolverOptions::default())?;
    assert_eq!(explorer.index().len(), 3);
    assert!(explorer.index().contains(SANDBOXES));
    assert_eq!(explorer.subscriptions()?.len(), 3);
    assert_eq!(explorer.source().context().tenant_id.as_deref(), Some(TENANT));
    Ok(())
}

#[test]
fn select_by_id_name_or_label() -> Result<()> {
    let explorer = explorer(ResolverOptions::default())?;
    assert_eq!(select(&explorer, PRODUCTION)?.id, PRODUCTION);
    assert_eq!(select(&explorer, "Sandbox")?.id, SANDBOX);
    assert_eq!(
        select(&explorer, &format!("Legacy ({LEGACY})"))?.id,
        LEGACY
    );
    assert!(explorer.select_subscription("Nope")?.is_none());
    Ok(())
}

#[test]
fn any_group_mode_excludes_on_unrelated_group() -> Result<()> {
    let explorer = explorer(ResolverOptions::default())?;
    let report = explorer.explore(&select(&explorer, PRODUCTION)?)?;

    assert_eq!(names(&report.in_effect), vec!["require-tags"]);
    assert_eq!(report.excluded.len(), 2);

    assert_eq!(report.excluded[0].assignment.name, "allowed-locations");
    assert_eq!(
        report.excluded[0].exclusion,
        ExclusionRecord {
            not_scope: SANDBOXES.to_string(),
            management_group: Some(SANDBOXES.to_string()),
        }
    );

    assert_eq!(report.excluded[1].assignment.name, "deny-public-ip");
    assert_eq!(report.excluded[1].exclusion.management_group, None);
    Ok(())
}

#[test]
fn ancestor_mode_keeps_assignment() -> Result<()> {
    let explorer = explorer(ResolverOptions {
        groups: GroupScope::Ancestors,
        ..Default::default()
    })?;
    assert_eq!(
        explorer.index().ancestors(SANDBOX),
        vec![SANDBOXES, "/providers/Microsoft.Management/managementGroups/contoso"]
    );
    let report = explorer.explore(&select(&explorer, PRODUCTION)?)?;

    assert_eq!(
        names(&report.in_effect),
        vec!["allowed-locations", "require-tags"]
    );
    assert_eq!(report.excluded.len(), 1);
    assert_eq!(report.excluded[0].assignment.name, "deny-public-ip");
    Ok(())
}

#[test]
fn other_subscriptions() -> Result<()> {
    let explorer = explorer(ResolverOptions::default())?;

    let sandbox = explorer.explore(&select(&explorer, SANDBOX)?)?;
    assert_eq!(names(&sandbox.in_effect), vec!["audit-vms"]);
    assert!(sandbox.excluded.is_empty());

    // Known subscription without assignments is an empty state, not an error.
    let legacy = explorer.explore(&select(&explorer, LEGACY)?)?;
    assert!(legacy.in_effect.is_empty());
    assert!(report::render_report(&legacy, false)
        .contains("No policy assignments found for this subscription"));
    Ok(())
}

#[test]
fn unknown_subscription_is_an_error() -> Result<()> {
    let explorer = explorer(ResolverOptions::default())?;
    let missing = Subscription::new("33333333-0000-0000-0000-000000000000");
    assert!(matches!(
        explorer.explore(&missing),
        Err(FetchError::UnknownSubscription(_))
    ));
    Ok(())
}

#[test]
fn report_renders_parameters() -> Result<()> {
    let explorer = explorer(ResolverOptions {
        groups: GroupScope::Ancestors,
        ..Default::default()
    })?;
    let report = explorer.explore(&select(&explorer, PRODUCTION)?)?;
    let text = report::render_report(&report, true);

    assert!(text.contains("== Allowed locations\n"));
    assert!(text.contains("Description: Restrict resource locations\n"));
    assert!(text.contains(
        "listOfAllowedLocations:\n  [\n    \"eastus\",\n    \"westeurope\"\n  ]\n"
    ));
    assert!(text.contains("tagName:\n  costCenter\n"));
    assert!(text.contains("- Deny public IPs: notScope"));

    let json = serde_json::to_value(&report)?;
    assert_eq!(
        json["inEffect"][0]["parameters"]["listOfAllowedLocations"],
        serde_json::json!({ "value": ["eastus", "westeurope"] })
    );
    Ok(())
}

#[test]
fn json_snapshot_without_groups() -> Result<()> {
    let source = SnapshotSource::open(SessionContext::new(), "tests/explorer/tenant.json")?;
    let explorer = Explorer::new(source, ResolverOptions::default());
    assert!(explorer.index().is_empty());

    let report = explorer.explore(&select(&explorer, "sub-1")?)?;
    assert_eq!(names(&report.in_effect), vec!["audit"]);
    Ok(())
}

#[test]
fn wrong_tenant_is_rejected() {
    let result = SnapshotSource::open(
        SessionContext::with_tenant("99999999-9999-9999-9999-999999999999"),
        "tests/explorer/tenant.yaml",
    );
    assert!(matches!(result, Err(FetchError::TenantMismatch { .. })));
}
