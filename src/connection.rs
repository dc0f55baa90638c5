use log::debug;

use crate::conf::entry::CONNECTION_PRINCIPAL;
use crate::conf::entry::CONNECTION_URL;
use crate::conf::entry::DELEGATION_TOKEN_ENABLED;
use crate::conf::SessionConf;
use crate::error::Result;
use crate::runtime::ExecutionContext;

pub const USER_PLACEHOLDER: &str = "${user}";

const DELEGATION_TOKEN_SUFFIX: &str = ";auth=delegationToken";

/// Builds the outbound connection url for a session.
///
/// Inside a managed container with delegation enabled the url
/// authenticates with a delegation token, outside of one a configured
/// principal is appended. `${user}` is then replaced with the current
/// user, or removed when there is none.
pub fn connection_url(
    conf: &SessionConf,
    user: Option<&str>,
    ctx: &dyn ExecutionContext,
) -> Result<String> {
    let base = conf.get_entry(&CONNECTION_URL)?;
    let delegation = conf.get_entry(&DELEGATION_TOKEN_ENABLED)?;
    let principal = conf.get_optional(&CONNECTION_PRINCIPAL)?;
    let in_container = ctx.is_running_in_managed_container();

    let url = match principal {
        _ if delegation && in_container => format!("{}{}", base, DELEGATION_TOKEN_SUFFIX),
        Some(principal) if !in_container => format!("{};principal={}", base, principal),
        _ => base,
    };
    let url = url.replace(USER_PLACEHOLDER, user.unwrap_or(""));
    debug!("resolved connection url {}", url);
    Ok(url)
}
