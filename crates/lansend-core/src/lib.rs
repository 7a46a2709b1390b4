//! # lansend-core
//!
//! Shared library for LanSend containing the discovery/transfer wire protocol
//! and the run-lifecycle signal used to hand off between the two phases.
//!
//! This crate is used by the sender application and by any future receiver.
//! It has zero dependencies on OS APIs or network sockets.
//!
//! # How a transfer works (for beginners)
//!
//! LanSend is a one-shot LAN file drop: one machine (the "sender") offers a
//! single file or folder, and the first machine on the network to claim it
//! (the "receiver") gets the bytes.  A full run has two phases:
//!
//! 1. **Discovery** – The sender broadcasts a small UDP datagram on a
//!    well-known port, over and over, saying "I am a sender at this address".
//!    Receivers listen for that datagram to learn where to connect.  The
//!    datagram payload is the [`Advertisement`] defined here.
//!
//! 2. **Transfer** – A receiver opens a TCP connection to the advertised
//!    address.  The sender stops broadcasting (that is what the
//!    [`ConnectedSignal`] coordinates) and streams the payload: a
//!    [`FrameHeader`] describing what is coming, then the raw bytes.
//!
//! This crate defines:
//!
//! - **`protocol`** – How bytes travel over the network.  Both the discovery
//!   datagram and the transfer header are newline-framed ASCII, so they can
//!   be inspected with tcpdump and consumed from any language.
//!
//! - **`signal`** – The [`ConnectedSignal`], a one-way latch that flips
//!   exactly once per run when a receiver connects (or the sender gives up),
//!   telling the broadcaster to stop.

pub mod protocol;
pub mod signal;

// Re-export the most-used items at the crate root so callers can write
// `lansend_core::FrameHeader` instead of `lansend_core::protocol::messages::FrameHeader`.
pub use protocol::codec::{
    decode_advertisement, decode_error_frame, decode_header, encode_advertisement,
    encode_error_frame, encode_header, ProtocolError,
};
pub use protocol::messages::{Advertisement, FrameHeader, PayloadKind};
pub use signal::ConnectedSignal;
