// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use anyhow::{anyhow, Context, Result};
use clap::{Args, Parser, Subcommand};
use policy_explorer::*;

#[derive(Args)]
struct ModeArgs {
    /// Only consider management groups that contain the subscription.
    #[arg(long)]
    ancestors: bool,

    /// Match resource path segments instead of substrings.
    #[arg(long)]
    resource_path: bool,
}

impl ModeArgs {
    fn options(&self) -> ResolverOptions {
        ResolverOptions {
            groups: if self.ancestors {
                GroupScope::Ancestors
            } else {
                GroupScope::AllGroups
            },
            comparison: if self.resource_path {
                Comparison::ResourcePath
            } else {
                Comparison::Substring
            },
        }
    }
}

fn open_source(snapshot: &str, tenant: Option<String>) -> Result<SnapshotSource> {
    let context = SessionContext { tenant_id: tenant };
    SnapshotSource::open(context, snapshot).with_context(|| format!("Failed to load {snapshot}"))
}

fn list_subscriptions(snapshot: String, tenant: Option<String>) -> Result<()> {
    let source = open_source(&snapshot, tenant)?;
    let subscriptions = source
        .subscriptions()
        .context("Failed to fetch subscriptions")?;
    print!("{}", report::render_subscriptions(&subscriptions));
    Ok(())
}

fn explore_subscription(
    snapshot: String,
    subscription: String,
    tenant: Option<String>,
    mode: ModeArgs,
    show_excluded: bool,
    json: bool,
) -> Result<()> {
    let source = open_source(&snapshot, tenant)?;
    let explorer = Explorer::new(source, mode.options());

    let selected = explorer
        .select_subscription(&subscription)
        .context("Failed to fetch subscriptions")?
        .ok_or_else(|| anyhow!("subscription `{subscription}` not found"))?;

    let result = explorer
        .explore(&selected)
        .context("Failed to fetch policy assignments")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print!("{}", report::render_report(&result, show_excluded));
    }
    Ok(())
}

fn check(
    subscription: String,
    not_scopes: Vec<String>,
    groups: Vec<String>,
    snapshot: Option<String>,
    mode: ModeArgs,
) -> Result<()> {
    let mut management_groups: Vec<ManagementGroup> =
        groups.into_iter().map(ManagementGroup::new).collect();
    if let Some(snapshot) = snapshot {
        let source = open_source(&snapshot, None)?;
        management_groups.extend(
            source
                .management_groups()
                .context("Failed to fetch management groups")?,
        );
    }

    let index = HierarchyIndex::build(&management_groups);
    let resolver = ScopeResolver::new(mode.options());
    match resolver.find_exclusion(&subscription, &not_scopes, &index) {
        Some(exclusion) => println!("excluded: {exclusion}"),
        None => println!("in effect"),
    }
    Ok(())
}

#[derive(Subcommand)]
enum ExplorerCommand {
    /// List the subscriptions of a snapshot.
    Subscriptions {
        /// Tenant snapshot. json or yaml.
        #[arg(long, short, value_name = "tenant.json|tenant.yaml")]
        snapshot: String,

        /// Only show subscriptions of this tenant.
        #[arg(long)]
        tenant: Option<String>,
    },

    /// Show the policy assignments in effect for a subscription.
    Assignments {
        /// Tenant snapshot. json or yaml.
        #[arg(long, short, value_name = "tenant.json|tenant.yaml")]
        snapshot: String,

        /// Subscription id, display name or `Display Name (id)` label.
        subscription: String,

        /// Tenant the session is bound to.
        #[arg(long)]
        tenant: Option<String>,

        #[command(flatten)]
        mode: ModeArgs,

        /// Also list excluded assignments and the notScope that excluded them.
        #[arg(long)]
        show_excluded: bool,

        /// Print the result as json.
        #[arg(long)]
        json: bool,
    },

    /// Decide whether notScopes exclude a subscription.
    Check {
        /// Subscription id.
        subscription: String,

        /// notScope entries.
        #[arg(long = "not-scope", short = 'n')]
        not_scopes: Vec<String>,

        /// Management group ids.
        #[arg(long = "group", short)]
        groups: Vec<String>,

        /// Read management groups from a snapshot as well.
        #[arg(long, short)]
        snapshot: Option<String>,

        #[command(flatten)]
        mode: ModeArgs,
    },
}

#[derive(clap::Parser)]
#[command(
    author,
    version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("GIT_HASH"), ")"),
    about,
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: ExplorerCommand,
}

fn main() -> Result<()> {
    env_logger::init();

    // Parse and dispatch command.
    let cli = Cli::parse();
    match cli.command {
        ExplorerCommand::Subscriptions { snapshot, tenant } => {
            list_subscriptions(snapshot, tenant)
        }
        ExplorerCommand::Assignments {
            snapshot,
            subscription,
            tenant,
            mode,
            show_excluded,
            json,
        } => explore_subscription(snapshot, subscription, tenant, mode, show_excluded, json),
        ExplorerCommand::Check {
            subscription,
            not_scopes,
            groups,
            snapshot,
            mode,
        } => check(subscription, not_scopes, groups, snapshot, mode),
    }
}
