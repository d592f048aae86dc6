//! Query-name planning.
//!
//! Turns a target IP (and optionally its bare domain) plus the configured
//! list servers into the concrete DNS names to resolve. Pure construction:
//! no network I/O happens here, and identical inputs always produce the same
//! ordered sequence.

use std::net::Ipv4Addr;

use crate::error_handling::CheckError;
use crate::models::{QueryName, ServerSpec};

/// Checks that at least one usable list source is configured.
///
/// RHSBL servers only count when IP-only mode is off; with `ip_only` set they
/// are filtered out before planning and cannot carry the run on their own.
pub fn ensure_sources(
    servers: &[ServerSpec],
    rhservers: &[ServerSpec],
    ip_only: bool,
) -> Result<(), CheckError> {
    if servers.is_empty() && (ip_only || rhservers.is_empty()) {
        return Err(CheckError::NoListSources);
    }
    Ok(())
}

/// Builds the ordered query-name sequence for one target IP.
///
/// For each IP-based server the reverse-octet name `d4.d3.d2.d1.<server>` is
/// emitted; if `ip_only` is false and a bare domain is known, each RHSBL
/// server gets `<domain>.<server>`. The domain must already be reduced to its
/// registrable two-label form by the caller.
///
/// # Errors
///
/// Returns `CheckError::NoListSources` when neither server list yields any
/// names (see [`ensure_sources`]).
pub fn plan(
    ip: Ipv4Addr,
    domain: Option<&str>,
    servers: &[ServerSpec],
    rhservers: &[ServerSpec],
    ip_only: bool,
) -> Result<Vec<QueryName>, CheckError> {
    ensure_sources(servers, rhservers, ip_only)?;

    let octets = ip.octets();
    let reversed = format!("{}.{}.{}.{}", octets[3], octets[2], octets[1], octets[0]);

    let mut names: Vec<QueryName> = servers
        .iter()
        .map(|server| QueryName {
            fqdn: format!("{}.{}", reversed, server.suffix),
            server: server.clone(),
        })
        .collect();

    if !ip_only {
        if let Some(domain) = domain {
            names.extend(rhservers.iter().map(|server| QueryName {
                fqdn: format!("{}.{}", domain, server.suffix),
                server: server.clone(),
            }));
        }
    }

    Ok(names)
}
