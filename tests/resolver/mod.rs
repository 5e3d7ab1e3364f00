// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use policy_explorer::*;

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use test_generator::test_resources;

#[derive(Serialize, Deserialize, PartialEq, Debug)]
struct TestCase {
    note: String,
    subscription: String,
    #[serde(default)]
    management_groups: Vec<ManagementGroup>,
    #[serde(default)]
    not_scopes: Vec<String>,
    #[serde(default)]
    options: ResolverOptions,
    want_excluded: bool,
    /// `subscription` or the id of the management group expected to match.
    want_match: Option<String>,
    skip: Option<bool>,
}

#[derive(Serialize, Deserialize, PartialEq, Debug)]
struct YamlTest {
    cases: Vec<TestCase>,
}

fn describe(matched_by: Option<MatchedBy<'_>>) -> Option<String> {
    matched_by.map(|m| match m {
        MatchedBy::Subscription => "subscription".to_string(),
        MatchedBy::ManagementGroup(g) => g.to_string(),
    })
}

fn yaml_test_impl(file: &str) -> Result<()> {
    let yaml_str = std::fs::read_to_string(file)?;
    let test: YamlTest = serde_yaml::from_str(&yaml_str)?;

    std::eprintln!("running {file}");

    for case in test.cases {
        std::print!("case {} ", case.note);
        if case.skip == Some(true) {
            std::println!("skipped");
            continue;
        }

        let index = HierarchyIndex::build(&case.management_groups);
        let resolver = ScopeResolver::new(case.options);

        let found = resolver.find_exclusion(&case.subscription, &case.not_scopes, &index);
        let excluded = resolver.is_excluded(&case.subscription, &case.not_scopes, &index);
        if excluded != found.is_some() {
            bail!("{}: is_excluded disagrees with find_exclusion", case.note);
        }
        if excluded != case.want_excluded {
            bail!(
                "{}: want_excluded = {} actual = {excluded} ({found:?})",
                case.note,
                case.want_excluded
            );
        }

        if let Some(want_match) = &case.want_match {
            let actual = describe(found.map(|e| e.matched_by));
            if actual.as_deref() != Some(want_match.as_str()) {
                bail!("{}: want_match = `{want_match}` actual = {actual:?}", case.note);
            }
        }

        // Evaluating again gives the same answer.
        if resolver.is_excluded(&case.subscription, &case.not_scopes, &index) != excluded {
            bail!("{}: result changed on second evaluation", case.note);
        }

        // The order of notScopes does not change the answer.
        let mut reversed = case.not_scopes.clone();
        reversed.reverse();
        if resolver.is_excluded(&case.subscription, &reversed, &index) != excluded {
            bail!("{}: result depends on notScopes order", case.note);
        }

        // Applicability is the negation of exclusion.
        let assignment = PolicyAssignment::new(case.note.clone()).with_not_scopes(case.not_scopes);
        if resolver.is_in_effect(&case.subscription, &assignment, &index) == excluded {
            bail!("{}: is_in_effect disagrees with is_excluded", case.note);
        }

        std::eprintln!("passed");
    }

    Ok(())
}

fn yaml_test(file: &str) -> Result<()> {
    match yaml_test_impl(file) {
        Ok(_) => Ok(()),
        Err(e) => {
            // If Err is returned, it doesn't always get printed by cargo test.
            // Therefore, panic with the error.
            panic!("{e}");
        }
    }
}

#[test_resources("tests/resolver/cases/*.yaml")]
fn run(path: &str) {
    yaml_test(path).unwrap()
}

#[test]
fn shared_index_across_threads() -> Result<()> {
    let groups: Vec<_> = (0..64)
        .map(|i| ManagementGroup::new(format!("mg-{i:02}")))
        .collect();
    let index = HierarchyIndex::build(&groups);

    std::thread::scope(|s| {
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let index = &index;
                s.spawn(move || {
                    let not_scopes = vec![format!("/providers/x/managementGroups/mg-{:02}", i * 8)];
                    is_excluded("sub-1", &not_scopes, index)
                })
            })
            .collect();
        for handle in handles {
            assert!(matches!(handle.join(), Ok(true)));
        }
    });

    Ok(())
}
