//! Bind address selection.
//!
//! Probes the local interfaces for an IPv4 address the server can actually
//! bind on the configured port. Selection never fails; when every candidate
//! is refused the wildcard address is used.

use std::net::{IpAddr, Ipv4Addr, SocketAddr, TcpListener, ToSocketAddrs, UdpSocket};

use tracing::debug;

/// Outcome of startup address selection, kept around for `/status`.
#[derive(Debug, Clone)]
pub struct BindSelection {
    pub chosen: Ipv4Addr,
    /// Every address attempted, in order. The wildcard address appears as
    /// the final entry when no candidate was bindable.
    pub tried: Vec<Ipv4Addr>,
}

/// The outbound-facing local address, read from a connectionless socket
/// aimed at a well-known external endpoint. No packets are sent.
fn outbound_ipv4() -> Option<Ipv4Addr> {
    let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0)).ok()?;
    socket.connect(("8.8.8.8", 80)).ok()?;
    match socket.local_addr().ok()?.ip() {
        IpAddr::V4(ip) => Some(ip),
        IpAddr::V6(_) => None,
    }
}

/// Non-loopback IPv4 addresses the local hostname resolves to.
fn hostname_ipv4s() -> Vec<Ipv4Addr> {
    let Ok(name) = hostname::get() else {
        return Vec::new();
    };
    let host = name.to_string_lossy().into_owned();
    let Ok(addrs) = (host.as_str(), 0u16).to_socket_addrs() else {
        return Vec::new();
    };
    addrs
        .filter_map(|addr| match addr.ip() {
            IpAddr::V4(ip) if !ip.is_loopback() => Some(ip),
            _ => None,
        })
        .collect()
}

/// Candidate bind addresses: the outbound-facing address first, then the
/// hostname's addresses, de-duplicated preserving first-seen order.
pub fn ipv4_candidates() -> Vec<Ipv4Addr> {
    let mut candidates = Vec::new();
    if let Some(ip) = outbound_ipv4() {
        candidates.push(ip);
    }
    candidates.extend(hostname_ipv4s());

    let mut seen = std::collections::HashSet::new();
    candidates.retain(|ip| seen.insert(*ip));
    candidates
}

/// Try each candidate with a one-shot listening socket on `port`; first
/// success wins. Probe failures are swallowed and total failure degrades to
/// the wildcard address, recorded as the final tried entry.
pub fn select_bind_ip(port: u16) -> BindSelection {
    let mut tried = Vec::new();
    for ip in ipv4_candidates() {
        tried.push(ip);
        match TcpListener::bind(SocketAddr::from((ip, port))) {
            Ok(_) => return BindSelection { chosen: ip, tried },
            Err(e) => debug!("[Net] probe {ip}:{port} refused: {e}"),
        }
    }
    tried.push(Ipv4Addr::UNSPECIFIED);
    BindSelection {
        chosen: Ipv4Addr::UNSPECIFIED,
        tried,
    }
}
