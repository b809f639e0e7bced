// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The naming and output contract for the federation stack
//!
//! Logical ids and output names are the stable interface between this
//! compiler, the deployment engine, and the operator reading the outputs.
//! Everything here is a pure function of the provider name, so re-running
//! the compiler over the same configuration reproduces the same identities.

use crate::PlanError;
use federation_plan_types::LogicalId;
use serde::Deserialize;
use std::fmt;

/// Name of the private DNS namespace scoped to this deployment
pub const DNS_NAMESPACE: &str = "P1PocCognitoSaml";

/// Account-scoped prefix for the pool's public domain alias
pub const DOMAIN_PREFIX: &str = "poc-two-ups";

/// Path under which the identity-broker image serves its SAML descriptor.
/// A hard assumption about the broker's internal routing, not configurable.
pub const METADATA_PATH: &str = "auth/realms/test/protocol/saml/descriptor";

/// Token-inspection site used as the only allowed OAuth callback
pub const CALLBACK_URL: &str = "https://jwt.io";

pub const OPENID_SCOPE: &str = "openid";

/// Local image definition the broker container is built from
pub const BROKER_IMAGE: &str = "keycloak";
pub const BROKER_PORT: u16 = 8080;
pub const BROKER_CPU_UNITS: u32 = 512;
pub const BROKER_MEMORY_MIB: u32 = 1024;

/// Request-level gateway access log format: source IP, timestamp, method,
/// route, protocol, status, response size, request id, integration error
pub const ACCESS_LOG_FORMAT: &str = "$context.identity.sourceIp - - \
    [$context.requestTime] \
    \"$context.httpMethod $context.routeKey $context.protocol\" \
    $context.status $context.responseLength $context.requestId \
    $context.integrationErrorMessage";

/// Stream prefix for broker container logs
pub const LOG_STREAM_PREFIX: &str = "/ecs/p1-pocs/cognito-saml";

/// A federated provider's name, as configured
///
/// Names are spliced into logical ids and into the `identity_provider` query
/// parameter, so they are restricted to non-empty ASCII alphanumerics.
#[derive(Clone, Debug, Hash, PartialEq, Eq, PartialOrd, Ord, Deserialize)]
#[serde(try_from = "String")]
pub struct ProviderName(String);

impl ProviderName {
    pub fn new(name: &str) -> Result<ProviderName, PlanError> {
        if name.is_empty() {
            return Err(PlanError::InvalidProviderName {
                name: name.to_string(),
                reason: "cannot be empty",
            });
        }
        if !name.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(PlanError::InvalidProviderName {
                name: name.to_string(),
                reason: "contains characters outside [A-Za-z0-9]",
            });
        }
        Ok(ProviderName(name.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProviderName {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for ProviderName {
    type Error = PlanError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        ProviderName::new(&s)
    }
}

fn id(s: &str) -> LogicalId {
    s.parse().expect("static logical ids are valid")
}

pub fn vpc() -> LogicalId {
    id("Vpc")
}

pub fn user_pool() -> LogicalId {
    id("UserPool")
}

pub fn user_pool_domain() -> LogicalId {
    id("UserPoolDomain")
}

pub fn cluster() -> LogicalId {
    id("EcsCluster")
}

pub fn network_link() -> LogicalId {
    id("VpcLink")
}

pub fn task_security_group() -> LogicalId {
    id("EcsTaskSecurityGroup")
}

pub fn gateway_log_group() -> LogicalId {
    id("CloudWatchHttpApiLogGroup")
}

pub fn dns_namespace() -> LogicalId {
    id("CloudMapNamespace")
}

pub fn dns_registry_entry(provider: &ProviderName) -> LogicalId {
    id(&format!("CloudMap{provider}Service"))
}

pub fn gateway(provider: &ProviderName) -> LogicalId {
    id(&format!("Http{provider}ProviderApi"))
}

pub fn task_definition(provider: &ProviderName) -> LogicalId {
    id(&format!("Ecs{provider}SamlProviderTask"))
}

pub fn provider_service(provider: &ProviderName) -> LogicalId {
    id(&format!("Ecs{provider}ProviderService"))
}

pub fn idp_registration(provider: &ProviderName) -> LogicalId {
    id(&format!("Cognito{provider}SamlIdp"))
}

pub fn provider_client(provider: &ProviderName) -> LogicalId {
    id(&format!("Cognito{provider}AppClient"))
}

pub fn all_providers_client() -> LogicalId {
    id("CognitoAppClientForAll")
}

pub fn pool_only_client() -> LogicalId {
    id("CognitoAppClientForNone")
}

pub fn authorize_url_output(provider: &ProviderName) -> String {
    format!("AuthorizeUrlFor{provider}")
}

pub const AUTHORIZE_URL_ALL: &str = "AuthorizeUrlAll";
pub const AUTHORIZE_URL_EXPLICIT_CHOICE: &str = "AuthorizeUrlWithExplicitChoice";
pub const AUTHORIZE_URL_NONE: &str = "AuthorizeUrlNone";

#[cfg(test)]
mod test {
    use super::ProviderName;

    #[test]
    fn provider_name_alphabet() {
        ProviderName::new("First").unwrap();
        ProviderName::new("Okta2").unwrap();

        let error = ProviderName::new("").unwrap_err();
        assert_eq!(
            error.to_string(),
            "invalid provider name \"\": cannot be empty"
        );
        let error = ProviderName::new("First IdP").unwrap_err();
        assert_eq!(
            error.to_string(),
            "invalid provider name \"First IdP\": \
             contains characters outside [A-Za-z0-9]"
        );
    }

    #[test]
    fn per_provider_names() {
        let first = ProviderName::new("First").unwrap();
        assert_eq!(super::gateway(&first).as_str(), "HttpFirstProviderApi");
        assert_eq!(
            super::idp_registration(&first).as_str(),
            "CognitoFirstSamlIdp"
        );
        assert_eq!(
            super::authorize_url_output(&first),
            "AuthorizeUrlForFirst"
        );
    }
}
