// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Network topology for the federation stack

use crate::names;
use crate::PlanError;
use federation_plan_types::resources::{ResourceKind, SubnetGroup, SubnetKind};
use federation_plan_types::{LogicalId, PlanBuilder};

/// Handle to the planned network, threaded into the later builders
#[derive(Clone, Debug)]
pub(crate) struct NetworkTopology {
    pub vpc: LogicalId,
}

/// Plan the one isolated network every other resource lives in: an
/// externally routable subnet group and an isolated one with no route out
pub(crate) fn build(
    plan: &mut PlanBuilder,
) -> Result<NetworkTopology, PlanError> {
    let vpc = plan.resource(
        names::vpc(),
        ResourceKind::Network {
            subnet_groups: vec![
                SubnetGroup {
                    name: "Public".to_string(),
                    kind: SubnetKind::Public,
                },
                SubnetGroup {
                    name: "Isolated".to_string(),
                    kind: SubnetKind::Isolated,
                },
            ],
        },
    )?;
    Ok(NetworkTopology { vpc })
}
