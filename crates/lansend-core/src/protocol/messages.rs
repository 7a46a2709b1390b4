//! Typed representations of everything that crosses the wire.
//!
//! LanSend has exactly three wire artifacts, all newline-framed ASCII:
//!
//! | Artifact      | Carried over   | Shape                                  |
//! |---------------|----------------|----------------------------------------|
//! | Advertisement | UDP broadcast  | `FILE_SENDER:<ip>:<port>`              |
//! | Frame header  | TCP (transfer) | `<TAG>:<name>\n<size>\n` then the body |
//! | Error frame   | TCP (transfer) | `ERROR:<message>`, then EOF            |
//!
//! This module holds the typed structs; the encode/decode functions live in
//! [`super::codec`].

use std::fmt;
use std::net::IpAddr;

/// What kind of payload a transfer carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadKind {
    /// A single regular file, streamed as-is.
    File,
    /// A directory, packaged into a zip archive before streaming.
    Folder,
}

impl PayloadKind {
    /// The ASCII tag used on the wire for this kind.
    pub const fn tag(self) -> &'static str {
        match self {
            PayloadKind::File => "FILE",
            PayloadKind::Folder => "FOLDER",
        }
    }

    /// Maps a wire tag back to a kind.
    ///
    /// Returns `None` for anything else, including the `ERROR` tag — an
    /// error frame replaces the header, it does not describe a payload.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "FILE" => Some(PayloadKind::File),
            "FOLDER" => Some(PayloadKind::Folder),
            _ => None,
        }
    }
}

impl fmt::Display for PayloadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// The discovery datagram: "there is a sender at `<ip>:<port>`".
///
/// The broadcaster re-creates this every tick rather than caching it, because
/// the local address can change between ticks (Wi-Fi roam, DHCP renewal).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Advertisement {
    /// Address the transfer listener is reachable on.
    pub ip: IpAddr,
    /// TCP port the transfer listener is bound to.
    pub port: u16,
}

impl Advertisement {
    /// Creates an advertisement for a listener at `ip:port`.
    pub fn new(ip: IpAddr, port: u16) -> Self {
        Self { ip, port }
    }
}

/// Describes the payload that follows it on the transfer connection.
///
/// Produced once per transfer, written immediately before the body bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameHeader {
    /// Whether the body is a raw file or a packaged folder archive.
    pub kind: PayloadKind,
    /// Name the receiver should save the payload under.  For folders this
    /// already carries the `.zip` suffix.
    pub name: String,
    /// Exact body length in bytes.
    pub size: u64,
}

impl FrameHeader {
    /// Creates a header for a payload of `size` bytes named `name`.
    pub fn new(kind: PayloadKind, name: impl Into<String>, size: u64) -> Self {
        Self {
            kind,
            name: name.into(),
            size,
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
