//! Peer addresses and own-address classification

use std::fmt;
use std::net::IpAddr;

use libp2p::multiaddr::Protocol;
use libp2p::{Multiaddr, PeerId};

use crate::{BlackboxError, Result};

// ----------------------------------------------------------------------------
// Peer Address
// ----------------------------------------------------------------------------

/// A dialable multiaddr together with the peer id it embeds
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeerAddress {
    addr: Multiaddr,
    peer_id: PeerId,
}

impl PeerAddress {
    /// Full address, including the trailing `/p2p/<peer-id>`
    pub fn multiaddr(&self) -> &Multiaddr {
        &self.addr
    }

    pub fn peer_id(&self) -> PeerId {
        self.peer_id
    }

    /// The address without any `/p2p/` component, as used for probing
    pub fn transport_addr(&self) -> Multiaddr {
        self.addr
            .iter()
            .filter(|p| !matches!(p, Protocol::P2p(_)))
            .collect()
    }
}

impl fmt::Display for PeerAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.addr)
    }
}

/// Parse operator input as a peer address.
///
/// The input must be a valid multiaddr carrying a `/p2p/<peer-id>` component;
/// for circuit addresses the last one names the target peer.
pub fn parse_peer_address(input: &str) -> Result<PeerAddress> {
    let trimmed = input.trim();
    split_peer_address(trimmed).map_err(|reason| BlackboxError::invalid_address(trimmed, reason))
}

pub(crate) fn split_peer_address(input: &str) -> std::result::Result<PeerAddress, String> {
    if input.is_empty() {
        return Err("address is empty".to_string());
    }
    let addr: Multiaddr = input.parse().map_err(|e| format!("invalid multiaddr: {e}"))?;
    let peer_id = last_peer_id(&addr).ok_or_else(|| "missing /p2p/<peer-id> component".to_string())?;
    Ok(PeerAddress { addr, peer_id })
}

fn last_peer_id(addr: &Multiaddr) -> Option<PeerId> {
    addr.iter()
        .filter_map(|p| match p {
            Protocol::P2p(peer_id) => Some(peer_id),
            _ => None,
        })
        .last()
}

// ----------------------------------------------------------------------------
// Own Address Helpers
// ----------------------------------------------------------------------------

/// Append `/p2p/<peer_id>` unless the address already ends with it
pub fn with_peer_id(addr: &Multiaddr, peer_id: PeerId) -> Multiaddr {
    match addr.iter().last() {
        Some(Protocol::P2p(existing)) if existing == peer_id => addr.clone(),
        _ => addr.clone().with(Protocol::P2p(peer_id)),
    }
}

/// Whether the address goes through a circuit relay
pub fn is_relay_address(addr: &Multiaddr) -> bool {
    addr.iter().any(|p| matches!(p, Protocol::P2pCircuit))
}

/// Reachability scope of one of the node's own addresses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressClass {
    /// Same machine only
    Loopback,
    /// Same router or Wi-Fi only
    PrivateLan,
    /// Public, relayed or otherwise unclassified
    Other,
}

impl AddressClass {
    pub fn classify(addr: &Multiaddr) -> Self {
        if is_relay_address(addr) {
            return AddressClass::Other;
        }
        match addr.iter().next() {
            Some(Protocol::Ip4(ip)) if ip.is_loopback() => AddressClass::Loopback,
            Some(Protocol::Ip4(ip)) if ip.is_private() => AddressClass::PrivateLan,
            Some(Protocol::Ip6(ip)) if ip.is_loopback() => AddressClass::Loopback,
            // fc00::/7 unique local
            Some(Protocol::Ip6(ip)) if (ip.segments()[0] & 0xfe00) == 0xfc00 => {
                AddressClass::PrivateLan
            }
            _ => AddressClass::Other,
        }
    }
}

/// Own addresses bucketed by class, each carrying `/p2p/<self>`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddressGroups {
    pub other: Vec<Multiaddr>,
    pub lan: Vec<Multiaddr>,
    pub loopback: Vec<Multiaddr>,
}

/// Group addresses for display. Input order is kept within each group and
/// duplicates are dropped.
pub fn group_addresses(addrs: &[Multiaddr], local: PeerId) -> AddressGroups {
    let mut groups = AddressGroups::default();
    for addr in addrs {
        let full = with_peer_id(addr, local);
        let bucket = match AddressClass::classify(addr) {
            AddressClass::Loopback => &mut groups.loopback,
            AddressClass::PrivateLan => &mut groups.lan,
            AddressClass::Other => &mut groups.other,
        };
        if !bucket.contains(&full) {
            bucket.push(full);
        }
    }
    groups
}

// ----------------------------------------------------------------------------
// Probe Shapes
// ----------------------------------------------------------------------------

/// Host part of a probe target
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeHost {
    Ip(IpAddr),
    Name(String),
}

/// A host and TCP port worth a plain TCP dial
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeTarget {
    pub host: ProbeHost,
    pub port: u16,
}

/// Address layouts the prober understands, tried in order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressShape {
    /// `/ip4|ip6/<addr>/tcp/<port>/...`
    IpTcp,
    /// `/dns|dns4|dns6/<name>/tcp/<port>/...`
    DnsTcp,
}

impl AddressShape {
    pub const ORDERED: [AddressShape; 2] = [AddressShape::IpTcp, AddressShape::DnsTcp];

    /// Extract a probe target if `addr` has this shape
    pub fn extract(self, addr: &Multiaddr) -> Option<ProbeTarget> {
        let mut iter = addr.iter();
        let host = match (self, iter.next()?) {
            (AddressShape::IpTcp, Protocol::Ip4(ip)) => ProbeHost::Ip(IpAddr::V4(ip)),
            (AddressShape::IpTcp, Protocol::Ip6(ip)) => ProbeHost::Ip(IpAddr::V6(ip)),
            (AddressShape::DnsTcp, Protocol::Dns(name))
            | (AddressShape::DnsTcp, Protocol::Dns4(name))
            | (AddressShape::DnsTcp, Protocol::Dns6(name)) => ProbeHost::Name(name.into_owned()),
            _ => return None,
        };
        match iter.next()? {
            Protocol::Tcp(port) => Some(ProbeTarget { host, port }),
            _ => None,
        }
    }
}

/// First target produced by the ordered shapes, if any
pub fn probe_target(addr: &Multiaddr) -> Option<ProbeTarget> {
    AddressShape::ORDERED
        .iter()
        .find_map(|shape| shape.extract(addr))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn peer() -> PeerId {
        PeerId::random()
    }

    #[test]
    fn parses_address_with_peer_id() {
        let id = peer();
        let parsed = parse_peer_address(&format!(" /ip4/127.0.0.1/tcp/4001/p2p/{id} ")).unwrap();
        assert_eq!(parsed.peer_id(), id);
        assert_eq!(parsed.transport_addr().to_string(), "/ip4/127.0.0.1/tcp/4001");
    }

    #[test]
    fn circuit_address_targets_the_last_peer() {
        let relay = peer();
        let target = peer();
        let input = format!("/ip4/1.2.3.4/tcp/4001/p2p/{relay}/p2p-circuit/p2p/{target}");
        assert_eq!(parse_peer_address(&input).unwrap().peer_id(), target);
    }

    #[test]
    fn rejects_bad_input() {
        for input in ["", "   ", "not-an-addr", "/ip4/127.0.0.1/tcp/4001"] {
            let err = parse_peer_address(input).unwrap_err();
            assert!(matches!(err, BlackboxError::InvalidAddress { .. }), "{input:?}");
        }
    }

    #[test]
    fn classifies_scopes() {
        let cases = [
            ("/ip4/127.0.0.1/tcp/4001", AddressClass::Loopback),
            ("/ip6/::1/tcp/4001", AddressClass::Loopback),
            ("/ip4/192.168.1.20/tcp/4001", AddressClass::PrivateLan),
            ("/ip4/10.0.0.5/tcp/4001", AddressClass::PrivateLan),
            ("/ip4/172.16.0.1/tcp/4001", AddressClass::PrivateLan),
            ("/ip6/fd00::1/tcp/4001", AddressClass::PrivateLan),
            ("/ip4/172.32.0.1/tcp/4001", AddressClass::Other),
            ("/ip4/203.0.113.7/tcp/4001", AddressClass::Other),
        ];
        for (addr, class) in cases {
            assert_eq!(AddressClass::classify(&addr.parse().unwrap()), class, "{addr}");
        }
    }

    #[test]
    fn groups_append_own_peer_id_once() {
        let id = peer();
        let addrs: Vec<Multiaddr> = vec![
            "/ip4/127.0.0.1/tcp/4001".parse().unwrap(),
            "/ip4/192.168.1.20/tcp/4001".parse().unwrap(),
            format!("/ip4/203.0.113.7/tcp/4001/p2p/{id}").parse().unwrap(),
            "/ip4/127.0.0.1/tcp/4001".parse().unwrap(),
        ];
        let groups = group_addresses(&addrs, id);

        assert_eq!(groups.loopback.len(), 1);
        assert_eq!(groups.lan.len(), 1);
        assert_eq!(
            groups.other[0].to_string(),
            format!("/ip4/203.0.113.7/tcp/4001/p2p/{id}")
        );
        assert!(groups
            .lan
            .iter()
            .chain(&groups.loopback)
            .all(|a| a.to_string().ends_with(&format!("/p2p/{id}"))));
    }

    #[test]
    fn relay_addresses_are_detected() {
        let relay = peer();
        let addr: Multiaddr = format!("/ip4/1.2.3.4/tcp/4001/p2p/{relay}/p2p-circuit")
            .parse()
            .unwrap();
        assert!(is_relay_address(&addr));
        assert_eq!(AddressClass::classify(&addr), AddressClass::Other);
        assert!(!is_relay_address(&"/ip4/1.2.3.4/tcp/4001".parse().unwrap()));
    }

    #[test]
    fn probe_shapes_in_order() {
        let ip: Multiaddr = "/ip4/10.0.0.2/tcp/4001".parse().unwrap();
        assert_eq!(
            probe_target(&ip),
            Some(ProbeTarget {
                host: ProbeHost::Ip("10.0.0.2".parse().unwrap()),
                port: 4001
            })
        );

        let dns: Multiaddr = "/dns4/chat.example.org/tcp/443".parse().unwrap();
        assert_eq!(
            probe_target(&dns),
            Some(ProbeTarget {
                host: ProbeHost::Name("chat.example.org".to_string()),
                port: 443
            })
        );

        let udp: Multiaddr = "/ip4/10.0.0.2/udp/4001/quic-v1".parse().unwrap();
        assert_eq!(probe_target(&udp), None);
        assert_eq!(AddressShape::DnsTcp.extract(&ip), None);
    }
}
