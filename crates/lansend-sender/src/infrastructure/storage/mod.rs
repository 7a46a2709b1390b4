//! File-system storage adapters: configuration loading.

pub mod config;
