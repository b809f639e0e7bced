// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Assembling the deployment plan graph
//!
//! [`PlanBuilder`] provides a much simpler interface for constructing a
//! consistent plan than building a [`DeploymentPlan`] directly.  It enforces
//! the properties the external deployment engine relies on:
//!
//! - logical ids and output names are unique;
//! - a resource can only reference resources that have already been defined,
//!   so data-flow edges always resolve;
//! - happens-after edges only connect defined resources;
//! - the combined edge relation is acyclic, and finalization produces a
//!   deterministic provisioning order (topological, with lexicographically
//!   smallest ready id first).

use crate::resources::{LogicalId, ResourceKind};
use anyhow::{anyhow, bail, ensure};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Account/region pair a deployment unit is bound to
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Environment {
    pub account: String,
    pub region: String,
}

/// One resource plus its edges
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Resource {
    pub id: LogicalId,
    pub kind: ResourceKind,
    /// Data-flow edges: resources whose identity this definition embeds
    pub depends_on: BTreeSet<LogicalId>,
    /// Ordering-only edges: resources that must be ready first even though
    /// nothing in this definition refers to them
    pub happens_after: BTreeSet<LogicalId>,
}

/// A finalized deployment plan
///
/// Immutable once built.  Two plans built from the same configuration are
/// identical, including `provisioning_order`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct DeploymentPlan {
    pub environment: Environment,
    pub resources: BTreeMap<LogicalId, Resource>,
    /// Named strings surfaced to the operator after deployment
    pub outputs: BTreeMap<String, String>,
    /// One valid serialization of the graph: every resource appears after
    /// everything it depends on or happens after
    pub provisioning_order: Vec<LogicalId>,
}

/// Builder for assembling a [`DeploymentPlan`]
#[derive(Clone)]
pub struct PlanBuilder {
    environment: Environment,
    resources: BTreeMap<LogicalId, Resource>,
    outputs: BTreeMap<String, String>,
}

impl PlanBuilder {
    pub fn new(environment: Environment) -> PlanBuilder {
        PlanBuilder {
            environment,
            resources: BTreeMap::new(),
            outputs: BTreeMap::new(),
        }
    }

    /// Define a new resource
    ///
    /// Data-flow edges are derived from the ids embedded in `kind`; each must
    /// name a resource defined earlier.  Returns the id back as a handle for
    /// wiring later resources to this one.
    ///
    /// # Errors
    ///
    /// Fails if the id is already defined or if `kind` references an
    /// undefined resource.
    pub fn resource(
        &mut self,
        id: LogicalId,
        kind: ResourceKind,
    ) -> anyhow::Result<LogicalId> {
        let mut depends_on = BTreeSet::new();
        for target in kind.references() {
            ensure!(
                self.resources.contains_key(target),
                "resource \"{}\" ({}) references \"{}\", \
                 which has not been defined",
                id,
                kind.label(),
                target,
            );
            depends_on.insert(target.clone());
        }

        if let Some(existing) = self.resources.get(&id) {
            return Err(anyhow!(
                "multiple definitions for resource \"{}\" \
                 (previously {}, now {})",
                id,
                existing.kind.label(),
                kind.label(),
            ));
        }
        let resource = Resource {
            id: id.clone(),
            kind,
            depends_on,
            happens_after: BTreeSet::new(),
        };
        self.resources.insert(id.clone(), resource);
        Ok(id)
    }

    /// Record an additional data-flow edge from `id` to `target`
    ///
    /// Used when a definition embeds another resource's identity indirectly,
    /// through a derived string (a URL or URN assembled from the target's
    /// exported identity) rather than a typed reference.
    pub fn depends_on(
        &mut self,
        id: &LogicalId,
        target: &LogicalId,
    ) -> anyhow::Result<()> {
        ensure!(
            self.resources.contains_key(target),
            "resource \"{}\" cannot depend on \"{}\": \
             \"{}\" has not been defined",
            id,
            target,
            target,
        );
        let resource = self.resources.get_mut(id).ok_or_else(|| {
            anyhow!(
                "resource \"{}\" cannot depend on \"{}\": \
                 \"{}\" has not been defined",
                id,
                target,
                id,
            )
        })?;
        resource.depends_on.insert(target.clone());
        Ok(())
    }

    /// Record an ordering-only edge: `id` must not be considered ready until
    /// `after` is
    pub fn happens_after(
        &mut self,
        id: &LogicalId,
        after: &LogicalId,
    ) -> anyhow::Result<()> {
        ensure!(
            self.resources.contains_key(after),
            "cannot order \"{}\" after \"{}\": \
             \"{}\" has not been defined",
            id,
            after,
            after,
        );
        let resource = self.resources.get_mut(id).ok_or_else(|| {
            anyhow!(
                "cannot order \"{}\" after \"{}\": \
                 \"{}\" has not been defined",
                id,
                after,
                id,
            )
        })?;
        resource.happens_after.insert(after.clone());
        Ok(())
    }

    /// Emit a named output string
    pub fn output(&mut self, name: &str, value: String) -> anyhow::Result<()> {
        match self.outputs.insert(name.to_string(), value) {
            None => Ok(()),
            Some(_) => {
                Err(anyhow!("multiple definitions for output \"{}\"", name))
            }
        }
    }

    /// Finalize the plan
    ///
    /// # Errors
    ///
    /// Fails if the plan does not contain exactly one network and exactly one
    /// user pool, or if the combined edge relation has a cycle.
    pub fn build(self) -> anyhow::Result<DeploymentPlan> {
        let networks = self
            .resources
            .values()
            .filter(|r| matches!(r.kind, ResourceKind::Network { .. }))
            .count();
        ensure!(
            networks == 1,
            "expected exactly one network resource, found {}",
            networks,
        );
        let pools = self
            .resources
            .values()
            .filter(|r| matches!(r.kind, ResourceKind::UserPool { .. }))
            .count();
        ensure!(
            pools == 1,
            "expected exactly one user pool resource, found {}",
            pools,
        );

        let provisioning_order = provisioning_order(&self.resources)?;
        Ok(DeploymentPlan {
            environment: self.environment,
            resources: self.resources,
            outputs: self.outputs,
            provisioning_order,
        })
    }
}

/// Topologically order the resources, taking the lexicographically smallest
/// ready id at each step so the result is deterministic
fn provisioning_order(
    resources: &BTreeMap<LogicalId, Resource>,
) -> anyhow::Result<Vec<LogicalId>> {
    let mut pending: BTreeMap<&LogicalId, BTreeSet<&LogicalId>> = resources
        .values()
        .map(|r| {
            (&r.id, r.depends_on.iter().chain(r.happens_after.iter()).collect())
        })
        .collect();

    let mut order = Vec::with_capacity(resources.len());
    while !pending.is_empty() {
        let ready = pending
            .iter()
            .find(|(_, prereqs)| prereqs.is_empty())
            .map(|(id, _)| (*id).clone());
        let Some(next) = ready else {
            let stuck = pending
                .keys()
                .map(|id| id.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            bail!("dependency cycle involving: {}", stuck);
        };
        pending.remove(&next);
        for prereqs in pending.values_mut() {
            prereqs.remove(&next);
        }
        order.push(next);
    }
    Ok(order)
}
