//! Infrastructure layer for the sender application.
//!
//! Contains OS-facing adapters: network sockets, archive packaging, and
//! file-system configuration storage.

pub mod archive;
pub mod network;
pub mod storage;
