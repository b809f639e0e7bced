// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Composition root for the federation stack

use crate::{
    identity_pool, network, provider_service, registration, PlanError,
    StackConfig,
};
use federation_plan_types::{DeploymentPlan, Environment, PlanBuilder};
use slog::{info, Logger};

pub struct FederationStack;

impl FederationStack {
    /// Compile a deployment plan from `config`
    ///
    /// The four builders run in strict dependency order; each returns an
    /// explicit handle that is threaded into the next rather than shared
    /// through any ambient state.  The finalized plan is validated and
    /// deterministic: the same `config` always yields the same plan.
    pub fn plan(
        log: &Logger,
        config: &StackConfig,
    ) -> Result<DeploymentPlan, PlanError> {
        config.validate()?;

        let mut plan = PlanBuilder::new(Environment {
            account: config.account.clone(),
            region: config.region.clone(),
        });

        let topology = network::build(&mut plan)?;
        let pool = identity_pool::build(&mut plan, config)?;
        let endpoints = provider_service::build(
            log,
            &mut plan,
            config,
            &topology,
            &pool,
        )?;
        registration::build(log, &mut plan, config, &pool, &endpoints)?;

        let plan = plan.build()?;
        info!(
            log, "assembled federation deployment plan";
            "providers" => config.providers.len(),
            "resources" => plan.resources.len(),
            "outputs" => plan.outputs.len(),
        );
        Ok(plan)
    }
}
