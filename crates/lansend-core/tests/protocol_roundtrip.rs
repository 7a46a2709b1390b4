//! Integration tests for the lansend-core wire codec.
//!
//! These tests exercise the public API end to end the way the two halves of
//! a real transfer would:
//!
//! ```text
//! broadcaster ──encode_advertisement──▶ UDP ──decode_advertisement──▶ receiver
//! sender      ──encode_header────────▶ TCP ──decode_header─────────▶ receiver
//! ```
//!
//! The receiver side here is simulated by feeding the decoders from byte
//! buffers, including the incremental "read a bit, try again" pattern a
//! socket-driven receiver uses.

use lansend_core::{
    decode_advertisement, decode_error_frame, decode_header, encode_advertisement,
    encode_error_frame, encode_header, Advertisement, ConnectedSignal, FrameHeader, PayloadKind,
    ProtocolError,
};

/// Encodes a header and decodes it back, asserting nothing was lost.
fn roundtrip(header: FrameHeader) -> FrameHeader {
    let bytes = encode_header(&header).expect("encode must succeed");
    let (decoded, consumed) = decode_header(&bytes).expect("decode must succeed");
    assert_eq!(consumed, bytes.len(), "all bytes must be consumed");
    decoded
}

#[test]
fn test_roundtrip_file_header() {
    let original = FrameHeader::new(PayloadKind::File, "holiday-video.mkv", 734_003_200);

    let decoded = roundtrip(original.clone());

    assert_eq!(original, decoded);
}

#[test]
fn test_roundtrip_folder_header() {
    let original = FrameHeader::new(PayloadKind::Folder, "project-src.zip", 81_920);

    assert_eq!(original, roundtrip(original.clone()));
}

#[test]
fn test_roundtrip_advertisement_through_datagram_bytes() {
    let original = Advertisement::new("192.168.0.42".parse().unwrap(), 50001);

    let datagram = encode_advertisement(&original);
    let decoded = decode_advertisement(&datagram).expect("decode must succeed");

    assert_eq!(original, decoded);
}

#[test]
fn test_incremental_receiver_decodes_header_then_body() {
    // A receiver reads from the socket into a growing buffer and retries
    // decode_header until it stops returning Truncated.  Simulate that with
    // one-byte reads.
    let header = FrameHeader::new(PayloadKind::File, "drip.bin", 3);
    let mut wire = encode_header(&header).expect("encode");
    wire.extend_from_slice(b"abc");

    let mut buffered = Vec::new();
    let mut decoded = None;
    for &byte in &wire {
        buffered.push(byte);
        match decode_header(&buffered) {
            Ok(pair) => {
                decoded = Some(pair);
                break;
            }
            Err(ProtocolError::Truncated { .. }) => continue,
            Err(e) => panic!("unexpected decode error: {e}"),
        }
    }

    let (decoded, consumed) = decoded.expect("header must decode before the stream ends");
    assert_eq!(decoded, header);
    assert_eq!(&wire[consumed..consumed + 3], b"abc");
}

#[test]
fn test_receiver_classifies_error_frame_at_stream_end() {
    // When the sender dies before the header, the receiver ends up holding
    // an unterminated ERROR frame at EOF.
    let wire = encode_error_frame("source file vanished");

    // While the stream is open the decoder keeps asking for more...
    assert!(matches!(
        decode_header(&wire[..4]),
        Err(ProtocolError::Truncated { .. })
    ));

    // ...and once EOF makes the buffer final, the frame is recognisable.
    assert_eq!(decode_error_frame(&wire), Some("source file vanished"));
    assert_eq!(
        decode_header(&wire),
        Err(ProtocolError::Remote("source file vanished".to_string()))
    );
}

#[test]
fn test_signal_and_codec_compose_for_a_full_handoff() {
    // The hand-off sequence a run performs: advertise, receiver connects,
    // latch flips once, header goes out.
    let signal = ConnectedSignal::new();
    let ad = Advertisement::new("10.1.2.3".parse().unwrap(), 50001);
    let datagram = encode_advertisement(&ad);

    // Receiver picks up the datagram and "connects".
    let seen = decode_advertisement(&datagram).expect("decode");
    assert_eq!(seen.port, 50001);
    assert!(signal.set(), "accept path performs the transition");
    assert!(!signal.set(), "timeout path arriving later sees it done");

    // Sender now frames the payload.
    let header = FrameHeader::new(PayloadKind::File, "handoff.bin", 1);
    let (decoded, _) = decode_header(&encode_header(&header).unwrap()).expect("decode");
    assert_eq!(decoded.name, "handoff.bin");
}
