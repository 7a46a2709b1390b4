//! Text codec for the LanSend wire protocol.
//!
//! # Wire format
//!
//! The whole protocol is newline-framed ASCII, chosen so a receiver can be
//! written in a few lines of any language and a capture in tcpdump/Wireshark
//! is readable without a dissector.
//!
//! **Advertisement datagram** — one UDP payload per broadcast tick:
//!
//! ```text
//! FILE_SENDER:192.168.1.23:50001
//! ```
//!
//! **Transfer frame** — sent once on the TCP connection, directly followed by
//! the body bytes:
//!
//! ```text
//! FOLDER:photos.zip\n
//! 1048576\n
//! <exactly 1048576 body bytes>
//! ```
//!
//! **Error frame** — best-effort failure report, sent in place of (or after
//! part of) regular traffic when the sender dies mid-transfer.  It has no
//! trailing newline; the connection closes right after it:
//!
//! ```text
//! ERROR:failed to read payload: permission denied
//! ```
//!
//! # Decoding model
//!
//! [`decode_header`] is written for a receiver that reads from a socket into
//! a growing buffer: it returns [`ProtocolError::Truncated`] while the two
//! header lines are still incomplete (read more, try again) and
//! `(header, consumed)` once they are — `consumed` is where the body starts.
//! The buffer is never required to end at the header, so a read that already
//! grabbed part of the body decodes fine.

use std::net::IpAddr;
use std::str;

use thiserror::Error;

use super::messages::{Advertisement, FrameHeader, PayloadKind};

/// Service tag leading every discovery datagram.
pub const SERVICE_TAG: &str = "FILE_SENDER";

/// Tag leading a best-effort failure report on the transfer connection.
pub const ERROR_TAG: &str = "ERROR";

/// Upper bound on the encoded frame header, terminators included.
///
/// A header that cannot fit is rejected on both sides, so a receiver feeding
/// [`decode_header`] from a socket never buffers unbounded garbage while
/// hunting for a newline.
pub const MAX_HEADER_LEN: usize = 4096;

/// Error type for all encode/decode operations in this module.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProtocolError {
    /// Not enough bytes yet for a complete header; read more and retry.
    #[error("incomplete header: only {available} bytes buffered")]
    Truncated { available: usize },

    /// The header does not fit within [`MAX_HEADER_LEN`] bytes.
    #[error("header exceeds {limit} bytes")]
    HeaderTooLong { limit: usize },

    /// Header bytes are not valid UTF-8.
    #[error("header is not valid UTF-8")]
    NotUtf8,

    /// A structurally invalid header line (e.g. missing `:` separator).
    #[error("malformed header: {0}")]
    Malformed(String),

    /// The type tag is neither `FILE` nor `FOLDER`.
    #[error("unknown payload type tag {0:?}")]
    UnknownTag(String),

    /// The size line does not parse as a decimal byte count.
    #[error("malformed size line {0:?}")]
    MalformedSize(String),

    /// The name would terminate the first header line early.
    #[error("payload name {0:?} contains a newline")]
    InvalidName(String),

    /// The peer sent an `ERROR:` frame instead of data.
    #[error("remote error: {0}")]
    Remote(String),

    /// A datagram that does not parse as an advertisement.
    #[error("malformed advertisement: {0}")]
    MalformedAdvertisement(String),
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Encodes `ad` into the discovery datagram payload.
///
/// # Examples
///
/// ```rust
/// use lansend_core::{encode_advertisement, Advertisement};
///
/// let ad = Advertisement::new("192.168.1.23".parse().unwrap(), 50001);
/// assert_eq!(encode_advertisement(&ad), b"FILE_SENDER:192.168.1.23:50001");
/// ```
pub fn encode_advertisement(ad: &Advertisement) -> Vec<u8> {
    format!("{SERVICE_TAG}:{}:{}", ad.ip, ad.port).into_bytes()
}

/// Parses a discovery datagram back into an [`Advertisement`].
///
/// The port is taken from the text after the *last* `:` so an unbracketed
/// IPv6 address in the middle still parses.  A single trailing newline is
/// tolerated — some hand-rolled senders append one.
///
/// # Errors
///
/// Returns [`ProtocolError::MalformedAdvertisement`] when the tag, address,
/// or port does not parse, and [`ProtocolError::NotUtf8`] for binary junk.
pub fn decode_advertisement(payload: &[u8]) -> Result<Advertisement, ProtocolError> {
    let text = str::from_utf8(payload).map_err(|_| ProtocolError::NotUtf8)?;
    let text = text.trim_end_matches(['\r', '\n']);

    let rest = text
        .strip_prefix(SERVICE_TAG)
        .and_then(|r| r.strip_prefix(':'))
        .ok_or_else(|| {
            ProtocolError::MalformedAdvertisement(format!("missing {SERVICE_TAG} tag"))
        })?;

    let (ip_text, port_text) = rest.rsplit_once(':').ok_or_else(|| {
        ProtocolError::MalformedAdvertisement("missing port separator".to_string())
    })?;

    let ip: IpAddr = ip_text
        .parse()
        .map_err(|_| ProtocolError::MalformedAdvertisement(format!("bad address {ip_text:?}")))?;
    let port: u16 = port_text
        .parse()
        .map_err(|_| ProtocolError::MalformedAdvertisement(format!("bad port {port_text:?}")))?;

    Ok(Advertisement { ip, port })
}

/// Encodes `header` into the two header lines that precede the body.
///
/// # Errors
///
/// Returns [`ProtocolError::InvalidName`] if the name contains a newline
/// (it would terminate the first line early and desynchronise the receiver)
/// and [`ProtocolError::HeaderTooLong`] if the encoded header would exceed
/// [`MAX_HEADER_LEN`].  Everything a receiver would reject is rejected here,
/// so an encoded header always decodes.
///
/// # Examples
///
/// ```rust
/// use lansend_core::{encode_header, FrameHeader, PayloadKind};
///
/// let header = FrameHeader::new(PayloadKind::File, "notes.txt", 42);
/// assert_eq!(encode_header(&header).unwrap(), b"FILE:notes.txt\n42\n");
/// ```
pub fn encode_header(header: &FrameHeader) -> Result<Vec<u8>, ProtocolError> {
    if header.name.contains('\n') {
        return Err(ProtocolError::InvalidName(header.name.clone()));
    }

    let encoded = format!("{}:{}\n{}\n", header.kind.tag(), header.name, header.size);
    if encoded.len() > MAX_HEADER_LEN {
        return Err(ProtocolError::HeaderTooLong {
            limit: MAX_HEADER_LEN,
        });
    }
    Ok(encoded.into_bytes())
}

/// Decodes a frame header from the front of `bytes`.
///
/// Returns the header and the number of bytes it occupied; `bytes[consumed..]`
/// is the start of the body.  `bytes` may already contain body bytes (or the
/// whole body) — the surplus is ignored here.
///
/// # Errors
///
/// - [`ProtocolError::Truncated`] – the two header lines are not complete
///   yet; read more bytes and call again.
/// - [`ProtocolError::Remote`] – the peer sent an `ERROR:` frame in place of
///   a header.
/// - [`ProtocolError::HeaderTooLong`], [`ProtocolError::NotUtf8`],
///   [`ProtocolError::Malformed`], [`ProtocolError::UnknownTag`],
///   [`ProtocolError::MalformedSize`] – the peer is not speaking this
///   protocol; the connection should be dropped.
pub fn decode_header(bytes: &[u8]) -> Result<(FrameHeader, usize), ProtocolError> {
    // An error frame replaces the header entirely and has no terminator, so
    // recognise it before demanding newline-framed lines.
    if let Some(message) = decode_error_frame(bytes) {
        return Err(ProtocolError::Remote(message.to_string()));
    }

    let name_end = find_newline(bytes, 0)?;
    let size_end = find_newline(bytes, name_end + 1)?;

    let first = str::from_utf8(&bytes[..name_end]).map_err(|_| ProtocolError::NotUtf8)?;
    let (tag, name) = first
        .split_once(':')
        .ok_or_else(|| ProtocolError::Malformed("missing type separator".to_string()))?;
    let kind =
        PayloadKind::from_tag(tag).ok_or_else(|| ProtocolError::UnknownTag(tag.to_string()))?;

    let size_text =
        str::from_utf8(&bytes[name_end + 1..size_end]).map_err(|_| ProtocolError::NotUtf8)?;
    let size: u64 = size_text
        .parse()
        .map_err(|_| ProtocolError::MalformedSize(size_text.to_string()))?;

    Ok((
        FrameHeader {
            kind,
            name: name.to_string(),
            size,
        },
        size_end + 1,
    ))
}

/// Builds the best-effort failure report sent when a transfer dies mid-way.
///
/// No trailing newline — the connection is closed immediately after, so the
/// frame is "everything until EOF".
pub fn encode_error_frame(message: &str) -> Vec<u8> {
    format!("{ERROR_TAG}:{message}").into_bytes()
}

/// Recognises an error frame at the front of `bytes`.
///
/// Returns the message when `bytes` starts with the `ERROR:` tag and the
/// message is valid UTF-8.  A receiver calls this on whatever it has
/// buffered once the connection closes without a complete header.  The tag
/// check comes first so buffers that are not error frames cost nothing.
pub fn decode_error_frame(bytes: &[u8]) -> Option<&str> {
    let message = bytes
        .strip_prefix(ERROR_TAG.as_bytes())?
        .strip_prefix(b":")?;
    str::from_utf8(message).ok()
}

// ── Utility helpers ───────────────────────────────────────────────────────────

/// Locates the next `\n` at or after `start`, enforcing the header cap.
fn find_newline(bytes: &[u8], start: usize) -> Result<usize, ProtocolError> {
    match bytes[start.min(bytes.len())..].iter().position(|&b| b == b'\n') {
        Some(i) if start + i >= MAX_HEADER_LEN => Err(ProtocolError::HeaderTooLong {
            limit: MAX_HEADER_LEN,
        }),
        Some(i) => Ok(start + i),
        None if bytes.len() >= MAX_HEADER_LEN => Err(ProtocolError::HeaderTooLong {
            limit: MAX_HEADER_LEN,
        }),
        None => Err(ProtocolError::Truncated {
            available: bytes.len(),
        }),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
