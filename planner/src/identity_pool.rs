// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The hosted identity pool and its public domain alias

use crate::names;
use crate::{PlanError, StackConfig};
use federation_plan_types::resources::ResourceKind;
use federation_plan_types::{LogicalId, PlanBuilder};

/// Handle to the planned pool plus the strings later builders derive from it
///
/// Everything here is computed once so the provider services (which embed
/// the pool's callback URL and audience URN) and the registrations (which
/// embed the base URL in their outputs) agree on the same values.
#[derive(Clone, Debug)]
pub(crate) struct IdentityPool {
    pub pool: LogicalId,
    pub domain: LogicalId,
    /// `<base_url>/authorize?...` is the login entry point
    pub base_url: String,
    /// Where the broker posts SAML responses back to the pool
    pub saml_callback_url: String,
    /// URN the broker asserts to be recognized as a federation partner
    pub audience_urn: String,
}

pub(crate) fn build(
    plan: &mut PlanBuilder,
    config: &StackConfig,
) -> Result<IdentityPool, PlanError> {
    let pool = plan.resource(
        names::user_pool(),
        ResourceKind::UserPool {
            auto_verify_email: config.auto_verify_email,
            auto_verify_phone: config.auto_verify_phone,
            self_sign_up: config.self_sign_up,
            teardown: config.teardown,
        },
    )?;

    // The account id makes the prefix globally unique without introducing
    // anything nondeterministic.
    let domain_prefix =
        format!("{}-{}", names::DOMAIN_PREFIX, config.account);
    let domain = plan.resource(
        names::user_pool_domain(),
        ResourceKind::UserPoolDomain {
            user_pool: pool.clone(),
            domain_prefix: domain_prefix.clone(),
        },
    )?;

    let pool_id =
        format!("{}_{}", config.region, pool.exported_identity());
    let base_url = format!(
        "https://{}.auth.{}.amazoncognito.com",
        domain_prefix, config.region
    );
    let saml_callback_url = format!("{base_url}/saml2/idpresponse");
    let audience_urn = format!("urn:amazon:cognito:sp:{pool_id}");

    Ok(IdentityPool { pool, domain, base_url, saml_callback_url, audience_urn })
}
