//! Protocol module containing message types and the text codec.

pub mod codec;
pub mod messages;

pub use codec::{
    decode_advertisement, decode_error_frame, decode_header, encode_advertisement,
    encode_error_frame, encode_header, ProtocolError, MAX_HEADER_LEN, SERVICE_TAG,
};
pub use messages::*;
