// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Registering the providers on the pool and emitting the login URLs
//!
//! Ordering policy: each provider's registration happens after its own
//! backing service (the pool fetches the SAML descriptor from the service at
//! registration time, so the metadata URL must already be reachable), each
//! single-provider client after its registration, and the all-providers
//! client after every registration.  The pool-only client depends on nothing
//! but the pool itself.

use crate::identity_pool::IdentityPool;
use crate::names::{self, ProviderName};
use crate::provider_service::ProviderEndpoint;
use crate::{PlanError, StackConfig};
use federation_plan_types::resources::{
    ClientProviders, FederationProtocol, OAuthSettings, ResourceKind,
};
use federation_plan_types::{LogicalId, PlanBuilder};
use slog::{debug, Logger};
use std::collections::BTreeMap;

pub(crate) fn build(
    log: &Logger,
    plan: &mut PlanBuilder,
    config: &StackConfig,
    pool: &IdentityPool,
    endpoints: &BTreeMap<ProviderName, ProviderEndpoint>,
) -> Result<(), PlanError> {
    let mut registrations = Vec::new();
    for provider in &config.providers {
        let endpoint = endpoints
            .get(provider)
            .expect("provider_service::build() plans every provider");

        let registration = plan.resource(
            names::idp_registration(provider),
            ResourceKind::FederatedIdentityProvider {
                user_pool: pool.pool.clone(),
                provider_name: provider.to_string(),
                protocol: FederationProtocol::Saml,
                // `endpoint.url` is slash-terminated; exactly one slash at
                // the join.
                metadata_url: format!(
                    "{}{}",
                    endpoint.url,
                    names::METADATA_PATH
                ),
            },
        )?;
        plan.depends_on(&registration, &endpoint.gateway)?;
        // The descriptor can't be fetched until the broker is serving it.
        // There is no data dependency to express that, only ordering.
        plan.happens_after(&registration, &endpoint.service)?;

        let client = plan.resource(
            names::provider_client(provider),
            client_kind(
                pool,
                ClientProviders::Federated {
                    providers: vec![provider.to_string()],
                },
            ),
        )?;
        plan.happens_after(&client, &registration)?;
        plan.output(
            &names::authorize_url_output(provider),
            authorize_url(pool, &client, None),
        )?;

        debug!(
            log, "registered federated provider";
            "provider" => provider.as_str(),
        );
        registrations.push(registration);
    }

    let all_client = plan.resource(
        names::all_providers_client(),
        client_kind(
            pool,
            ClientProviders::Federated {
                providers: config
                    .providers
                    .iter()
                    .map(ProviderName::to_string)
                    .collect(),
            },
        ),
    )?;
    for registration in &registrations {
        plan.happens_after(&all_client, registration)?;
    }
    plan.output(
        names::AUTHORIZE_URL_ALL,
        authorize_url(pool, &all_client, None),
    )?;

    // Same client, but the URL pre-selects the first configured provider to
    // bypass the provider-choice page.
    let first = config
        .providers
        .first()
        .expect("config validation rejects an empty provider list");
    plan.output(
        names::AUTHORIZE_URL_EXPLICIT_CHOICE,
        authorize_url(pool, &all_client, Some(first)),
    )?;

    let pool_only_client = plan.resource(
        names::pool_only_client(),
        client_kind(pool, ClientProviders::PoolOnly),
    )?;
    plan.output(
        names::AUTHORIZE_URL_NONE,
        authorize_url(pool, &pool_only_client, None),
    )?;

    Ok(())
}

/// All clients share the same OAuth shape: implicit grant, the fixed
/// token-inspection callback, openid scope, no secret
fn client_kind(pool: &IdentityPool, providers: ClientProviders) -> ResourceKind {
    ResourceKind::UserPoolClient {
        user_pool: pool.pool.clone(),
        oauth: OAuthSettings {
            implicit_grant: true,
            callback_urls: vec![names::CALLBACK_URL.to_string()],
            scopes: vec![names::OPENID_SCOPE.to_string()],
        },
        generate_secret: false,
        providers,
    }
}

fn authorize_url(
    pool: &IdentityPool,
    client: &LogicalId,
    explicit_provider: Option<&ProviderName>,
) -> String {
    let mut url = format!(
        "{}/authorize?client_id={}&response_type=token&scope={}&redirect_uri={}",
        pool.base_url,
        client.exported_identity(),
        names::OPENID_SCOPE,
        names::CALLBACK_URL,
    );
    if let Some(provider) = explicit_provider {
        url.push_str(&format!("&identity_provider={provider}"));
    }
    url
}
