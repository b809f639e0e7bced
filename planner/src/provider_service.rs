// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Per-provider identity-broker services and their gateways
//!
//! For each configured provider this plans: a service registry entry in the
//! deployment's private DNS namespace, an HTTP gateway forwarding to that
//! entry through the network link, a broker task definition whose
//! environment closes the loop back to the identity pool, and the running
//! service associated with the registry entry.  The shared plumbing (cluster,
//! link, security group, log group, namespace) is planned once up front.

use crate::identity_pool::IdentityPool;
use crate::names::{self, ProviderName};
use crate::network::NetworkTopology;
use crate::{PlanError, StackConfig};
use federation_plan_types::resources::{
    AccessLogConfig, ContainerSpec, DnsRecordKind, RegistryAssociation,
    ResourceKind, SecurityGroupRules, SubnetKind,
};
use federation_plan_types::{LogicalId, PlanBuilder};
use slog::{debug, Logger};
use std::collections::BTreeMap;

/// What the registration builder needs to know about one provider's service
#[derive(Clone, Debug)]
pub(crate) struct ProviderEndpoint {
    /// The running service; registrations order themselves after this
    pub service: LogicalId,
    /// The gateway the URL below is derived from
    pub gateway: LogicalId,
    /// Externally reachable base URL, always slash-terminated so callers can
    /// append paths without producing double slashes
    pub url: String,
}

pub(crate) fn build(
    log: &Logger,
    plan: &mut PlanBuilder,
    config: &StackConfig,
    network: &NetworkTopology,
    pool: &IdentityPool,
) -> Result<BTreeMap<ProviderName, ProviderEndpoint>, PlanError> {
    let cluster = plan.resource(
        names::cluster(),
        ResourceKind::Cluster { network: network.vpc.clone() },
    )?;
    let link = plan.resource(
        names::network_link(),
        ResourceKind::NetworkLink {
            network: network.vpc.clone(),
            subnet_kind: SubnetKind::Public,
        },
    )?;
    let security_group = plan.resource(
        names::task_security_group(),
        ResourceKind::SecurityGroup {
            network: network.vpc.clone(),
            rules: SecurityGroupRules {
                allow_all_outbound: true,
                allow_all_inbound_tcp: config.allow_all_inbound_tcp,
            },
        },
    )?;
    let log_group =
        plan.resource(names::gateway_log_group(), ResourceKind::LogGroup)?;
    let namespace = plan.resource(
        names::dns_namespace(),
        ResourceKind::DnsNamespace {
            network: network.vpc.clone(),
            name: names::DNS_NAMESPACE.to_string(),
        },
    )?;

    let mut endpoints = BTreeMap::new();
    for provider in &config.providers {
        let registry_entry = plan.resource(
            names::dns_registry_entry(provider),
            ResourceKind::DnsRegistryEntry {
                namespace: namespace.clone(),
                record_kind: DnsRecordKind::Srv,
            },
        )?;

        let gateway = plan.resource(
            names::gateway(provider),
            ResourceKind::HttpGateway {
                target: registry_entry.clone(),
                network_link: link.clone(),
                access_log: AccessLogConfig {
                    destination: log_group.clone(),
                    format: names::ACCESS_LOG_FORMAT.to_string(),
                },
            },
        )?;
        let url = format!(
            "https://{}.execute-api.{}.amazonaws.com/",
            gateway.exported_identity(),
            config.region
        );

        let mut environment = BTreeMap::new();
        // The broker serves under /auth behind the gateway.
        environment
            .insert("FRONTEND_URL".to_string(), format!("{url}auth"));
        environment
            .insert("COGNITO_URN".to_string(), pool.audience_urn.clone());
        environment.insert(
            "COGNITO_URL".to_string(),
            pool.saml_callback_url.clone(),
        );
        let task = plan.resource(
            names::task_definition(provider),
            ResourceKind::TaskDefinition {
                cpu_units: names::BROKER_CPU_UNITS,
                memory_mib: names::BROKER_MEMORY_MIB,
                container: ContainerSpec {
                    image: names::BROKER_IMAGE.to_string(),
                    container_port: names::BROKER_PORT,
                    environment,
                    log_stream_prefix: names::LOG_STREAM_PREFIX.to_string(),
                },
            },
        )?;
        // The environment strings above embed identities of the gateway, the
        // pool, and its domain; record those as data-flow edges since the
        // task definition has no typed reference to carry them.
        plan.depends_on(&task, &gateway)?;
        plan.depends_on(&task, &pool.pool)?;
        plan.depends_on(&task, &pool.domain)?;

        let service = plan.resource(
            names::provider_service(provider),
            ResourceKind::ContainerService {
                cluster: cluster.clone(),
                task_definition: task,
                subnet_kind: SubnetKind::Public,
                security_group: security_group.clone(),
                assign_public_ip: true,
                desired_count: 1,
                association: RegistryAssociation {
                    registry_entry,
                    container_port: names::BROKER_PORT,
                },
            },
        )?;

        debug!(
            log, "planned provider service";
            "provider" => provider.as_str(),
            "url" => &url,
        );
        endpoints.insert(
            provider.clone(),
            ProviderEndpoint { service, gateway, url },
        );
    }

    Ok(endpoints)
}
