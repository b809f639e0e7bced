// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! End-to-end properties of the compiled federation plan

use federation_plan_types::resources::{ClientProviders, ResourceKind};
use federation_plan_types::{DeploymentPlan, LogicalId};
use federation_planner::{
    FederationStack, PlanError, ProviderName, StackConfig,
};
use slog::Logger;
use std::collections::BTreeSet;
use std::fmt::Write;
use url::Url;

fn log() -> Logger {
    Logger::root(slog::Discard, slog::o!())
}

fn default_plan() -> DeploymentPlan {
    FederationStack::plan(&log(), &StackConfig::default()).unwrap()
}

fn config_with_providers(providers: &[&str]) -> StackConfig {
    StackConfig {
        providers: providers
            .iter()
            .map(|name| ProviderName::new(name).unwrap())
            .collect(),
        ..StackConfig::default()
    }
}

fn rid(s: &str) -> LogicalId {
    s.parse().unwrap()
}

fn count_kind(plan: &DeploymentPlan, label: &str) -> usize {
    plan.resources.values().filter(|r| r.kind.label() == label).count()
}

#[test]
fn resource_counts_generalize_over_n() {
    for providers in
        [vec!["Solo"], vec!["First", "Second"], vec!["A", "B", "C"]]
    {
        let n = providers.len();
        let plan = FederationStack::plan(
            &log(),
            &config_with_providers(&providers),
        )
        .unwrap();

        assert_eq!(count_kind(&plan, "network"), 1);
        assert_eq!(count_kind(&plan, "user_pool"), 1);
        assert_eq!(count_kind(&plan, "federated_identity_provider"), n);
        // One client per provider, plus all-providers and pool-only.
        assert_eq!(count_kind(&plan, "user_pool_client"), n + 2);
        assert_eq!(count_kind(&plan, "http_gateway"), n);
        assert_eq!(count_kind(&plan, "container_service"), n);
        // Per-provider URL, all, explicit choice, none.
        assert_eq!(plan.outputs.len(), n + 3);
    }
}

#[test]
fn default_outputs_are_the_five_named_urls() {
    let plan = default_plan();
    let names: Vec<&str> =
        plan.outputs.keys().map(String::as_str).collect();
    assert_eq!(
        names,
        vec![
            "AuthorizeUrlAll",
            "AuthorizeUrlForFirst",
            "AuthorizeUrlForSecond",
            "AuthorizeUrlNone",
            "AuthorizeUrlWithExplicitChoice",
        ]
    );
    assert!(plan.outputs["AuthorizeUrlWithExplicitChoice"]
        .ends_with("&identity_provider=First"));
}

#[test]
fn ordering_edges_never_cross_providers() {
    let plan = default_plan();
    for provider in ["First", "Second"] {
        let registration =
            &plan.resources[&rid(&format!("Cognito{provider}SamlIdp"))];
        let expected: BTreeSet<LogicalId> =
            [rid(&format!("Ecs{provider}ProviderService"))]
                .into_iter()
                .collect();
        assert_eq!(registration.happens_after, expected);

        let client =
            &plan.resources[&rid(&format!("Cognito{provider}AppClient"))];
        let expected: BTreeSet<LogicalId> =
            [rid(&format!("Cognito{provider}SamlIdp"))]
                .into_iter()
                .collect();
        assert_eq!(client.happens_after, expected);
    }

    let all_client = &plan.resources[&rid("CognitoAppClientForAll")];
    let expected: BTreeSet<LogicalId> = [
        rid("CognitoFirstSamlIdp"),
        rid("CognitoSecondSamlIdp"),
    ]
    .into_iter()
    .collect();
    assert_eq!(all_client.happens_after, expected);

    let pool_only = &plan.resources[&rid("CognitoAppClientForNone")];
    assert!(pool_only.happens_after.is_empty());
}

#[test]
fn metadata_urls_join_cleanly() {
    let plan = default_plan();
    let mut seen = 0;
    for resource in plan.resources.values() {
        let ResourceKind::FederatedIdentityProvider {
            provider_name,
            metadata_url,
            ..
        } = &resource.kind
        else {
            continue;
        };
        seen += 1;
        let lowered = provider_name.to_ascii_lowercase();
        assert_eq!(
            metadata_url,
            &format!(
                "https://http{lowered}providerapi.execute-api.us-east-1\
                 .amazonaws.com/auth/realms/test/protocol/saml/descriptor"
            )
        );
        // No double slashes past the scheme, no missing segment.
        assert!(!metadata_url["https://".len()..].contains("//"));
    }
    assert_eq!(seen, 2);
}

#[test]
fn authorize_urls_are_well_formed_and_name_declared_clients() {
    let plan = default_plan();
    let declared_client_ids: BTreeSet<String> = plan
        .resources
        .values()
        .filter(|r| {
            matches!(r.kind, ResourceKind::UserPoolClient { .. })
        })
        .map(|r| r.id.exported_identity())
        .collect();

    for (name, value) in &plan.outputs {
        let url = Url::parse(value)
            .unwrap_or_else(|e| panic!("output {name} is not a URL: {e}"));
        assert_eq!(url.path(), "/authorize");

        let query: Vec<(String, String)> =
            url.query_pairs().into_owned().collect();
        let get = |key: &str| {
            query
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.as_str())
                .unwrap_or_else(|| panic!("output {name} missing {key}"))
        };
        assert_eq!(get("response_type"), "token");
        assert_eq!(get("scope"), "openid");
        assert_eq!(get("redirect_uri"), "https://jwt.io");
        assert!(
            declared_client_ids.contains(get("client_id")),
            "output {name} names an undeclared client"
        );
    }
}

#[test]
fn client_provider_sets_match_their_scope() {
    let plan = default_plan();
    let client_providers = |id: &str| {
        let resource = &plan.resources[&rid(id)];
        match &resource.kind {
            ResourceKind::UserPoolClient { providers, .. } => {
                providers.clone()
            }
            other => panic!("{id} is not a client: {other:?}"),
        }
    };

    assert_eq!(
        client_providers("CognitoFirstAppClient"),
        ClientProviders::Federated { providers: vec!["First".to_string()] }
    );
    assert_eq!(
        client_providers("CognitoAppClientForAll"),
        ClientProviders::Federated {
            providers: vec!["First".to_string(), "Second".to_string()]
        }
    );
    assert_eq!(
        client_providers("CognitoAppClientForNone"),
        ClientProviders::PoolOnly
    );
}

#[test]
fn same_config_same_plan() {
    let first = default_plan();
    let second = default_plan();
    assert_eq!(first, second);
    // Byte-identical when rendered, too.
    assert_eq!(
        serde_json::to_string_pretty(&first).unwrap(),
        serde_json::to_string_pretty(&second).unwrap()
    );
}

#[test]
fn empty_provider_list_fails_fast() {
    let error =
        FederationStack::plan(&log(), &config_with_providers(&[]))
            .unwrap_err();
    assert!(matches!(error, PlanError::EmptyProviderList));
    assert_eq!(error.to_string(), "provider list is empty");
}

#[test]
fn authorize_outputs_golden() {
    let plan = default_plan();
    let mut rendered = String::new();
    for (name, value) in &plan.outputs {
        writeln!(rendered, "{name}: {value}").unwrap();
    }
    expectorate::assert_contents(
        "tests/output/authorize-outputs.txt",
        &rendered,
    );
}

#[test]
fn provisioning_order_golden() {
    let plan = default_plan();

    // Every resource appears exactly once, after all of its prerequisites.
    let mut emitted = BTreeSet::new();
    for id in &plan.provisioning_order {
        let resource = &plan.resources[id];
        for prereq in
            resource.depends_on.iter().chain(&resource.happens_after)
        {
            assert!(
                emitted.contains(prereq),
                "{id} ordered before its prerequisite {prereq}"
            );
        }
        assert!(emitted.insert(id.clone()));
    }
    assert_eq!(emitted.len(), plan.resources.len());

    let mut rendered = String::new();
    for id in &plan.provisioning_order {
        writeln!(rendered, "{id}").unwrap();
    }
    expectorate::assert_contents(
        "tests/output/provisioning-order.txt",
        &rendered,
    );
}
