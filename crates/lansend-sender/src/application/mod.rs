//! Application layer use cases for the sender.
//!
//! # Sub-modules
//!
//! - **`item`** – Resolves the command-line path into a [`item::TransferItem`]:
//!   does it exist, is it a file or a directory, and what name should the
//!   receiver see?  This runs before any socket is opened, so a typo fails
//!   fast instead of after minutes of broadcasting.
//!
//! - **`send_file`** – The one-shot send use case.  Orchestrates the whole
//!   run: package the payload, advertise it, serve exactly one receiver,
//!   stop advertising, clean up.  This is what `main.rs` and the
//!   integration tests call.

pub mod item;
pub mod send_file;
