//! UDP broadcast-based sender announcements.
//!
//! While the transfer server waits for its receiver, the sender repeatedly
//! announces itself on the LAN so receivers know where to connect.  Each
//! tick it:
//!
//! 1. Resolves the address worth advertising (hostname first, routed
//!    interface as fallback).
//! 2. Encodes a fresh announcement datagram carrying that address and the
//!    TCP transfer port.
//! 3. Sends the datagram to the broadcast address on the discovery port.
//!
//! The loop runs as a Tokio task and ends in exactly one of two ways: a
//! receiver connects (the shared [`ConnectedSignal`] is set) or the
//! broadcast timeout elapses.  The [`BroadcastOutcome`] reports which.
//!
//! # How UDP broadcast works (for beginners)
//!
//! UDP (User Datagram Protocol) is a lightweight, connectionless networking
//! protocol.  Unlike TCP it does not guarantee delivery, ordering, or
//! duplicate prevention.  These trade-offs make it ideal for presence
//! announcements:
//!
//! 1. The sender transmits a UDP packet to the LAN broadcast address (e.g.
//!    `255.255.255.255`) on the discovery port.  Every device on the LAN
//!    receives this packet.
//!
//! 2. A receiver listening on that port parses the announcement and learns
//!    the sender's IP address and TCP transfer port.
//!
//! 3. The receiver opens a TCP connection to that address, which is the
//!    transfer server's cue to stop announcing and start sending.
//!
//! A lost datagram costs nothing: the next tick announces again.
//!
//! # Responsiveness
//!
//! Between announcements the task sleeps for the announce interval, but in
//! short slices, re-checking the connected signal after each slice.  A
//! receiver that connects mid-interval therefore silences the broadcast
//! within one slice rather than one full interval.

use std::net::{IpAddr, Ipv4Addr, SocketAddr, ToSocketAddrs};
use std::sync::Arc;
use std::time::Duration;

use lansend_core::{encode_advertisement, Advertisement, ConnectedSignal};
use tokio::net::UdpSocket;
use tokio::task::JoinHandle;
use tokio::time::{sleep, timeout, Instant};
use tracing::{debug, info, warn};

use crate::infrastructure::storage::config::SenderConfig;

/// How a broadcast run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BroadcastOutcome {
    /// The connected signal was set before the timeout elapsed.
    ReceiverConnected,
    /// The full broadcast timeout elapsed with no receiver.
    TimedOut,
}

/// Spawns the announcement loop as a Tokio task.
///
/// The task owns its socket and runs until `signal` is set or the
/// configured broadcast timeout elapses; the returned handle resolves to
/// the [`BroadcastOutcome`].  Socket setup failures are logged and degrade
/// the task to a silent wait so the outcome invariant still holds.
pub fn spawn_broadcaster(
    config: SenderConfig,
    signal: Arc<ConnectedSignal>,
) -> JoinHandle<BroadcastOutcome> {
    tokio::spawn(broadcast_loop(config, signal))
}

/// The announcement loop body.
async fn broadcast_loop(config: SenderConfig, signal: Arc<ConnectedSignal>) -> BroadcastOutcome {
    let total = config.broadcast_timeout();
    let interval = config.broadcast_interval();
    let slice = config.poll_slice();

    let socket = match open_broadcast_socket(
        &config.discovery.broadcast_address,
        config.discovery.discovery_port,
    )
    .await
    {
        Ok(pair) => Some(pair),
        Err(e) => {
            // Still wait out the signal / deadline so the run ends the same
            // way it would with a working socket.
            warn!("discovery socket unavailable, announcements disabled: {e}");
            None
        }
    };

    let started = Instant::now();
    while !signal.is_set() && started.elapsed() < total {
        if let Some((socket, dest)) = &socket {
            announce_once(socket, *dest, config.transfer.transfer_port, interval).await;
        }
        sleep_in_slices(interval, slice, &signal).await;
    }

    if signal.is_set() {
        info!("receiver connected; stopping discovery announcements");
        BroadcastOutcome::ReceiverConnected
    } else {
        info!(
            "no receiver within {}s; stopping discovery announcements",
            total.as_secs()
        );
        BroadcastOutcome::TimedOut
    }
}

/// Opens a UDP socket suitable for broadcasting and resolves the
/// destination address.
async fn open_broadcast_socket(
    broadcast_address: &str,
    discovery_port: u16,
) -> std::io::Result<(UdpSocket, SocketAddr)> {
    let socket = UdpSocket::bind(("0.0.0.0", 0)).await?;
    socket.set_broadcast(true)?;
    let dest: SocketAddr = format!("{broadcast_address}:{discovery_port}")
        .parse()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;
    Ok((socket, dest))
}

/// Resolves the advertised address and sends one announcement datagram.
///
/// Failures are logged and swallowed: a missed announcement only delays
/// discovery until the next tick.
async fn announce_once(socket: &UdpSocket, dest: SocketAddr, transfer_port: u16, limit: Duration) {
    // Hostname resolution can block on DNS, so it runs off the runtime.
    let ip = tokio::task::spawn_blocking(resolve_advertised_ip)
        .await
        .unwrap_or(IpAddr::V4(Ipv4Addr::LOCALHOST));
    let payload = encode_advertisement(&Advertisement::new(ip, transfer_port));

    match timeout(limit, socket.send_to(&payload, dest)).await {
        Ok(Ok(n)) => debug!("announced {ip} to {dest} ({n} bytes)"),
        Ok(Err(e)) => warn!("failed to send announcement to {dest}: {e}"),
        Err(_) => warn!("announcement to {dest} timed out"),
    }
}

/// Sleeps for `total`, in slices of at most `slice`, returning early once
/// `signal` is set.
async fn sleep_in_slices(total: Duration, slice: Duration, signal: &ConnectedSignal) {
    let end = Instant::now() + total;
    while !signal.is_set() {
        let remaining = end.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            break;
        }
        sleep(remaining.min(slice)).await;
    }
}

/// Picks the IP address to advertise.
///
/// The hostname's resolved address is preferred; when that is missing or
/// loopback (a common misconfiguration on laptops), the address of the
/// interface that routes towards the internet is used instead.  Loopback
/// is the last resort so the announcement stays well-formed.
pub fn resolve_advertised_ip() -> IpAddr {
    if let Some(ip) = hostname_ip() {
        if !ip.is_loopback() {
            return ip;
        }
    }
    if let Some(ip) = routed_local_ip() {
        return ip;
    }
    debug!("could not determine a LAN address, advertising loopback");
    IpAddr::V4(Ipv4Addr::LOCALHOST)
}

/// Resolves the machine's own hostname, preferring IPv4 results.
fn hostname_ip() -> Option<IpAddr> {
    let name = hostname::get().ok()?;
    let name = name.to_str()?;
    let addrs: Vec<SocketAddr> = (name, 0u16).to_socket_addrs().ok()?.collect();
    addrs
        .iter()
        .find(|a| a.is_ipv4())
        .or_else(|| addrs.first())
        .map(|a| a.ip())
}

/// Reads the local address of a UDP socket "connected" to a public host.
///
/// No packets are sent: connecting a UDP socket only selects the route,
/// which reveals the outbound interface's address.
fn routed_local_ip() -> Option<IpAddr> {
    let socket = std::net::UdpSocket::bind(("0.0.0.0", 0)).ok()?;
    socket.connect(("8.8.8.8", 80)).ok()?;
    socket.local_addr().ok().map(|a| a.ip())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
