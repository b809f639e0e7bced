// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Types describing a federation deployment plan
//!
//! A deployment plan is a set of typed resource definitions keyed by logical
//! id, together with two kinds of edges between them:
//!
//! - **data-flow edges** (`depends_on`): resource A's definition embeds
//!   resource B's identity (directly via a typed reference, or indirectly via
//!   a derived string such as a URL assembled from B's exported identity);
//! - **happens-after edges** (`happens_after`): A must not be considered
//!   ready until B is, even though nothing in A's definition refers to B.
//!
//! The plan itself performs no provisioning.  It is consumed by an external
//! deployment engine that may parallelize independent branches as long as it
//! serializes both edge kinds.  [`graph::PlanBuilder`] guarantees the emitted
//! graph is internally consistent: ids are unique, every edge target is
//! defined, and the combined edge relation is acyclic.

pub mod graph;
pub mod resources;

pub use graph::{DeploymentPlan, Environment, PlanBuilder, Resource};
pub use resources::{LogicalId, ResourceKind};
