// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Interfaces for working with the federation stack configuration

use crate::names::ProviderName;
use crate::PlanError;
use federation_plan_types::resources::TeardownPolicy;
use serde::Deserialize;
use std::collections::BTreeSet;
use std::path::Path;

/// Configuration for one federation deployment unit
///
/// The defaults reproduce the proof-of-concept exactly: a fixed account and
/// region, two providers named `First` and `Second`, and the all-inbound-TCP
/// security shortcut.  All of them are knobs so a caller can change the
/// provider list or tighten the PoC shortcuts without touching the plan
/// compiler.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct StackConfig {
    #[serde(default = "default_account")]
    pub account: String,

    #[serde(default = "default_region")]
    pub region: String,

    /// Ordered list of federated provider names.  Order matters: the
    /// explicit-choice output picks the first entry.
    #[serde(default = "default_providers")]
    pub providers: Vec<ProviderName>,

    /// PoC shortcut: the broker tasks' security group admits all inbound
    /// TCP.  A production deployment would scope this to the gateway's
    /// network link.
    #[serde(default = "default_true")]
    pub allow_all_inbound_tcp: bool,

    #[serde(default = "default_teardown")]
    pub teardown: TeardownPolicy,

    #[serde(default)]
    pub auto_verify_email: bool,

    #[serde(default)]
    pub auto_verify_phone: bool,

    #[serde(default)]
    pub self_sign_up: bool,
}

fn default_account() -> String {
    "162174280605".to_string()
}

fn default_region() -> String {
    "us-east-1".to_string()
}

fn default_providers() -> Vec<ProviderName> {
    ["First", "Second"]
        .iter()
        .map(|name| {
            ProviderName::new(name).expect("default provider names are valid")
        })
        .collect()
}

fn default_true() -> bool {
    true
}

fn default_teardown() -> TeardownPolicy {
    TeardownPolicy::Destroy
}

impl Default for StackConfig {
    fn default() -> StackConfig {
        StackConfig {
            account: default_account(),
            region: default_region(),
            providers: default_providers(),
            allow_all_inbound_tcp: true,
            teardown: default_teardown(),
            auto_verify_email: false,
            auto_verify_phone: false,
            self_sign_up: false,
        }
    }
}

impl StackConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<StackConfig, PlanError> {
        let path = path.as_ref();
        let contents =
            std::fs::read_to_string(path).map_err(|err| PlanError::Io {
                message: format!("reading \"{}\"", path.display()),
                err,
            })?;
        let config: StackConfig = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Fail fast on configuration this compiler would otherwise bake into a
    /// nonsensical plan
    pub fn validate(&self) -> Result<(), PlanError> {
        if self.account.is_empty() {
            return Err(PlanError::EmptyField("account"));
        }
        if self.region.is_empty() {
            return Err(PlanError::EmptyField("region"));
        }
        // An empty list would still produce the three generic clients with
        // nothing to federate; reject it outright rather than emit an
        // ambiguous plan.  A single provider is fine.
        if self.providers.is_empty() {
            return Err(PlanError::EmptyProviderList);
        }
        let mut seen = BTreeSet::new();
        for provider in &self.providers {
            if !seen.insert(provider) {
                return Err(PlanError::DuplicateProvider(
                    provider.to_string(),
                ));
            }
        }
        Ok(())
    }
}
