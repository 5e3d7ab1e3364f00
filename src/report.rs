// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Human readable rendering of exploration results.

use crate::explorer::SubscriptionReport;
use crate::model::{ParameterValue, PolicyAssignment, Subscription};

use indexmap::IndexMap;

const RULE: &str = "---";

/// `Display Name (id)`, the label subscriptions are selected by.
pub fn subscription_label(subscription: &Subscription) -> String {
    format!("{} ({})", subscription.label(), subscription.id)
}

pub fn render_subscriptions(subscriptions: &[Subscription]) -> String {
    if subscriptions.is_empty() {
        return "No subscriptions found\n".to_string();
    }
    subscriptions
        .iter()
        .map(|s| subscription_label(s) + "\n")
        .collect()
}

pub fn render_subscription_details(subscription: &Subscription) -> String {
    let mut out = String::new();
    out.push_str(&format!("Selected: {}\n", subscription.label()));
    out.push_str(&format!("Subscription ID: {}\n", subscription.id));
    if let Some(state) = &subscription.state {
        out.push_str(&format!("State: {state}\n"));
    }
    if let Some(tenant) = &subscription.tenant_id {
        out.push_str(&format!("Tenant ID: {tenant}\n"));
    }
    out
}

fn render_value(value: &ParameterValue) -> String {
    let json = value.to_json();
    match value.resolved() {
        ParameterValue::Collection(_) => {
            serde_json::to_string_pretty(&json).unwrap_or_else(|_| json.to_string())
        }
        // Strings print without quotes.
        _ => match json {
            serde_json::Value::String(s) => s,
            other => other.to_string(),
        },
    }
}

pub fn render_parameters(parameters: &IndexMap<String, ParameterValue>) -> String {
    if parameters.is_empty() {
        return "No parameters set for this policy assignment\n".to_string();
    }

    let mut out = String::from("Parameters:\n");
    for (name, value) in parameters {
        out.push_str(&format!("{name}:\n"));
        for line in render_value(value).lines() {
            out.push_str(&format!("  {line}\n"));
        }
        out.push_str(&format!("{RULE}\n"));
    }
    out
}

pub fn render_assignment(assignment: &PolicyAssignment) -> String {
    let mut out = String::new();
    out.push_str(&format!("== {}\n", assignment.title()));
    out.push_str(&format!("Name: {}\n", assignment.name));
    if let Some(description) = assignment.description.as_deref().filter(|d| !d.is_empty()) {
        out.push_str(&format!("Description: {description}\n"));
    }
    if let Some(scope) = assignment.scope.as_deref().filter(|s| !s.is_empty()) {
        out.push_str(&format!("Scope: {scope}\n"));
    }
    if !assignment.not_scopes.is_empty() {
        out.push_str("Not Scopes:\n");
        let json = serde_json::to_string_pretty(&assignment.not_scopes)
            .unwrap_or_else(|_| format!("{:?}", assignment.not_scopes));
        for line in json.lines() {
            out.push_str(&format!("  {line}\n"));
        }
    }
    out.push_str(&format!("{RULE}\n"));
    out.push_str(&render_parameters(&assignment.parameters));
    out
}

pub fn render_report(report: &SubscriptionReport, show_excluded: bool) -> String {
    let mut out = render_subscription_details(&report.subscription);
    out.push_str("\nPolicy Assignments\n\n");

    if report.in_effect.is_empty() && report.excluded.is_empty() {
        out.push_str("No policy assignments found for this subscription\n");
    }
    for assignment in &report.in_effect {
        out.push_str(&render_assignment(assignment));
        out.push('\n');
    }

    if show_excluded && !report.excluded.is_empty() {
        out.push_str("Excluded Assignments\n\n");
        for excluded in &report.excluded {
            let reason = match &excluded.exclusion.management_group {
                Some(group) => format!("management group `{group}`"),
                None => "the subscription".to_string(),
            };
            out.push_str(&format!(
                "- {}: notScope `{}` matches {reason}\n",
                excluded.assignment.title(),
                excluded.exclusion.not_scope
            ));
        }
    }
    out
}
