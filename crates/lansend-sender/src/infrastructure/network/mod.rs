//! Network adapters: UDP discovery broadcasting and the TCP transfer server.

pub mod broadcast;
pub mod transfer;
