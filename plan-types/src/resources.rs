// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Typed resource definitions for the federation deployment plan
//!
//! Every resource in a plan is a configuration record with identity-by-name.
//! The [`LogicalId`] is the only identity a resource has at plan time; the
//! physical identifier assigned by the deployment engine is stood in for by
//! the deterministic [`LogicalId::exported_identity()`] placeholder, which is
//! what derived strings (URLs, URNs, client ids) are assembled from.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseLogicalIdError {
    #[error("logical id cannot be empty")]
    Empty,
    #[error("logical id {0:?} contains characters outside [A-Za-z0-9]")]
    InvalidCharacter(String),
}

/// Identifies one resource within a deployment plan
///
/// Logical ids are non-empty ASCII alphanumeric strings.  Restricting the
/// alphabet keeps the exported identity (a lowercased copy of the id) safe to
/// splice into hostnames and URLs without escaping.
#[derive(
    Clone,
    Debug,
    Hash,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    JsonSchema,
)]
#[serde(transparent)]
pub struct LogicalId(String);

impl LogicalId {
    pub fn new(s: &str) -> Result<LogicalId, ParseLogicalIdError> {
        if s.is_empty() {
            return Err(ParseLogicalIdError::Empty);
        }
        if !s.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(ParseLogicalIdError::InvalidCharacter(s.to_string()));
        }
        Ok(LogicalId(s.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the deterministic placeholder for the physical identifier the
    /// deployment engine will assign to this resource
    ///
    /// Two plans built from the same configuration produce the same exported
    /// identities, which is what makes the derived URL outputs stable across
    /// runs.
    pub fn exported_identity(&self) -> String {
        self.0.to_ascii_lowercase()
    }
}

impl fmt::Display for LogicalId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for LogicalId {
    type Err = ParseLogicalIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LogicalId::new(s)
    }
}

/// Routability of a subnet group
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum SubnetKind {
    /// Externally routable
    Public,
    /// No direct route out of the network
    Isolated,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SubnetGroup {
    pub name: String,
    pub kind: SubnetKind,
}

/// What happens to a resource when the deployment unit is torn down
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum TeardownPolicy {
    Destroy,
    Retain,
}

/// Federation protocol spoken by an identity provider registration
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum FederationProtocol {
    Saml,
}

/// DNS record type for a service registry entry
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum DnsRecordKind {
    Srv,
}

/// Request-level access logging for an HTTP gateway
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AccessLogConfig {
    pub destination: LogicalId,
    pub format: String,
}

/// The container run by a task definition
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ContainerSpec {
    pub image: String,
    pub container_port: u16,
    pub environment: BTreeMap<String, String>,
    pub log_stream_prefix: String,
}

/// Binds a running container service to a DNS registry entry so the gateway
/// can resolve it
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RegistryAssociation {
    pub registry_entry: LogicalId,
    pub container_port: u16,
}

/// Traffic policy for a security group
///
/// The all-inbound-TCP rule is a PoC shortcut carried from the source
/// configuration; it is a knob rather than a constant so a caller can turn it
/// off without editing the plan compiler.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema,
)]
pub struct SecurityGroupRules {
    pub allow_all_outbound: bool,
    pub allow_all_inbound_tcp: bool,
}

/// OAuth settings for a user pool client
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct OAuthSettings {
    pub implicit_grant: bool,
    pub callback_urls: Vec<String>,
    pub scopes: Vec<String>,
}

/// Which identity sources a user pool client permits
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ClientProviders {
    /// Direct pool login only; no federated provider
    PoolOnly,
    /// The named federated providers, and only those
    Federated { providers: Vec<String> },
}

/// One resource definition
///
/// Variants embed [`LogicalId`]s wherever the original configuration holds a
/// typed reference to another resource; [`ResourceKind::references()`] is the
/// single source of truth for the data-flow edges derived from those fields.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResourceKind {
    /// The isolated network everything else lives in
    Network { subnet_groups: Vec<SubnetGroup> },
    /// Container orchestration cluster bound to the network
    Cluster { network: LogicalId },
    /// Link through which a gateway reaches services on the network
    NetworkLink { network: LogicalId, subnet_kind: SubnetKind },
    SecurityGroup { network: LogicalId, rules: SecurityGroupRules },
    /// Destination for gateway access logs
    LogGroup,
    /// Private DNS namespace scoped to this deployment
    DnsNamespace { network: LogicalId, name: String },
    /// Service registry entry within a namespace
    DnsRegistryEntry { namespace: LogicalId, record_kind: DnsRecordKind },
    /// HTTP gateway whose default route forwards to a registry entry through
    /// a network link
    HttpGateway {
        target: LogicalId,
        network_link: LogicalId,
        access_log: AccessLogConfig,
    },
    TaskDefinition { cpu_units: u32, memory_mib: u32, container: ContainerSpec },
    /// Running instance of a task definition
    ContainerService {
        cluster: LogicalId,
        task_definition: LogicalId,
        subnet_kind: SubnetKind,
        security_group: LogicalId,
        assign_public_ip: bool,
        desired_count: u16,
        association: RegistryAssociation,
    },
    /// The hosted identity pool
    UserPool {
        auto_verify_email: bool,
        auto_verify_phone: bool,
        self_sign_up: bool,
        teardown: TeardownPolicy,
    },
    /// Public-facing domain alias for the pool
    UserPoolDomain { user_pool: LogicalId, domain_prefix: String },
    /// A federated identity source registered on the pool
    FederatedIdentityProvider {
        user_pool: LogicalId,
        provider_name: String,
        protocol: FederationProtocol,
        metadata_url: String,
    },
    /// An application registration permitted to request tokens from the pool
    UserPoolClient {
        user_pool: LogicalId,
        oauth: OAuthSettings,
        generate_secret: bool,
        providers: ClientProviders,
    },
}

impl ResourceKind {
    /// Short label used in error messages
    pub fn label(&self) -> &'static str {
        match self {
            ResourceKind::Network { .. } => "network",
            ResourceKind::Cluster { .. } => "cluster",
            ResourceKind::NetworkLink { .. } => "network_link",
            ResourceKind::SecurityGroup { .. } => "security_group",
            ResourceKind::LogGroup => "log_group",
            ResourceKind::DnsNamespace { .. } => "dns_namespace",
            ResourceKind::DnsRegistryEntry { .. } => "dns_registry_entry",
            ResourceKind::HttpGateway { .. } => "http_gateway",
            ResourceKind::TaskDefinition { .. } => "task_definition",
            ResourceKind::ContainerService { .. } => "container_service",
            ResourceKind::UserPool { .. } => "user_pool",
            ResourceKind::UserPoolDomain { .. } => "user_pool_domain",
            ResourceKind::FederatedIdentityProvider { .. } => {
                "federated_identity_provider"
            }
            ResourceKind::UserPoolClient { .. } => "user_pool_client",
        }
    }

    /// All logical ids this definition embeds
    pub fn references(&self) -> Vec<&LogicalId> {
        match self {
            ResourceKind::Network { .. }
            | ResourceKind::LogGroup
            | ResourceKind::TaskDefinition { .. }
            | ResourceKind::UserPool { .. } => Vec::new(),
            ResourceKind::Cluster { network }
            | ResourceKind::NetworkLink { network, .. }
            | ResourceKind::SecurityGroup { network, .. }
            | ResourceKind::DnsNamespace { network, .. } => vec![network],
            ResourceKind::DnsRegistryEntry { namespace, .. } => {
                vec![namespace]
            }
            ResourceKind::HttpGateway { target, network_link, access_log } => {
                vec![target, network_link, &access_log.destination]
            }
            ResourceKind::ContainerService {
                cluster,
                task_definition,
                security_group,
                association,
                ..
            } => vec![
                cluster,
                task_definition,
                security_group,
                &association.registry_entry,
            ],
            ResourceKind::UserPoolDomain { user_pool, .. }
            | ResourceKind::FederatedIdentityProvider { user_pool, .. }
            | ResourceKind::UserPoolClient { user_pool, .. } => {
                vec![user_pool]
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::{LogicalId, ParseLogicalIdError, ResourceKind};

    #[test]
    fn logical_id_alphabet() {
        assert_eq!(LogicalId::new(""), Err(ParseLogicalIdError::Empty));
        assert_eq!(
            LogicalId::new("Vpc-1"),
            Err(ParseLogicalIdError::InvalidCharacter("Vpc-1".to_string()))
        );
        assert_eq!(
            LogicalId::new("Http First"),
            Err(ParseLogicalIdError::InvalidCharacter(
                "Http First".to_string()
            ))
        );
        let id = LogicalId::new("HttpFirstProviderApi").unwrap();
        assert_eq!(id.as_str(), "HttpFirstProviderApi");
        assert_eq!(id.exported_identity(), "httpfirstproviderapi");
    }

    #[test]
    fn references_cover_embedded_ids() {
        let vpc = LogicalId::new("Vpc").unwrap();
        let kind = ResourceKind::Cluster { network: vpc.clone() };
        assert_eq!(kind.references(), vec![&vpc]);
        assert!(ResourceKind::LogGroup.references().is_empty());
    }
}
