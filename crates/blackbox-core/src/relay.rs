//! Relay list parsing
//!
//! Relays are given on the command line as a comma separated list of
//! multiaddrs, each carrying the relay's `/p2p/<peer-id>`. Parsing is all or
//! nothing: one bad entry rejects the whole list.

use libp2p::Multiaddr;

use crate::address::split_peer_address;
use crate::{BlackboxError, Result};

/// Parse a comma separated relay list.
///
/// Entries are trimmed and empty entries skipped, so blank input yields an
/// empty list.
pub fn parse_relays(csv: &str) -> Result<Vec<Multiaddr>> {
    csv.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            split_peer_address(entry)
                .map(|parsed| parsed.multiaddr().clone())
                .map_err(|reason| BlackboxError::InvalidRelayAddress {
                    entry: entry.to_string(),
                    reason,
                })
        })
        .collect()
}
