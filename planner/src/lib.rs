// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Plan generation for the SAML federation proof-of-concept
//!
//! Given a [`StackConfig`] (account/region, an ordered list of provider
//! names, and a couple of PoC policy knobs), [`FederationStack::plan()`]
//! compiles a [`federation_plan_types::DeploymentPlan`]: the network, the
//! hosted user pool and its domain, one identity-broker service per provider
//! behind an HTTP gateway, and the pool-side registrations and clients that
//! close the login loop.  The emitted plan carries the ordering constraints
//! (service before registration, registration before client) as explicit
//! happens-after edges so an external executor can serialize them while
//! parallelizing the rest.

mod config;
mod identity_pool;
mod network;
pub mod names;
mod provider_service;
mod registration;
mod stack;

pub use config::StackConfig;
pub use names::ProviderName;
pub use stack::FederationStack;

use thiserror::Error;

/// Describes errors which may occur while generating a federation plan
///
/// All of these are declaration-time errors: they are reported before
/// anything is handed to the deployment engine.  Provisioning-time failures
/// are the engine's to surface.
#[derive(Debug, Error)]
pub enum PlanError {
    #[error("provider list is empty")]
    EmptyProviderList,

    #[error("provider {0:?} is listed more than once")]
    DuplicateProvider(String),

    #[error("invalid provider name {name:?}: {reason}")]
    InvalidProviderName { name: String, reason: &'static str },

    #[error("{0} must not be empty")]
    EmptyField(&'static str),

    #[error("I/O error while {message}: {err}")]
    Io {
        message: String,
        #[source]
        err: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid deployment plan: {0}")]
    Graph(#[from] anyhow::Error),
}
