//! LanSend sender — entry point.
//!
//! This binary offers a single file or directory to the local network.  It
//! announces itself over UDP broadcast so receivers can find it without any
//! addressing, then streams the payload over TCP to the first receiver that
//! connects.  One run, one payload, one receiver.
//!
//! # Why announce at all?
//!
//! The receiver knows nothing about the sender: no hostname, no IP, no
//! port.  Announcing `FILE_SENDER:<ip>:<port>` to the broadcast address
//! lets any receiver on the LAN discover the sender passively — the human
//! on the receiving end just starts their tool and waits.
//!
//! # Usage
//!
//! ```text
//! lansend-sender [OPTIONS] <PATH>
//!
//! Arguments:
//!   <PATH>  File or directory to offer on the LAN
//!
//! Options:
//!   -t, --broadcast-timeout <SECS>  Announce window in seconds [default: 300]
//!       --config <PATH>             Explicit config file path
//! ```
//!
//! # Environment variable overrides
//!
//! CLI args take precedence when both are present.
//!
//! | Variable                    | Default | Description                     |
//! |-----------------------------|---------|---------------------------------|
//! | `LANSEND_BROADCAST_TIMEOUT` | `300`   | Announce window in seconds      |
//! | `LANSEND_CONFIG`            | –       | Explicit config file path       |
//! | `RUST_LOG`                  | `info`  | `tracing` filter directives     |
//!
//! # Architecture overview
//!
//! ```text
//! lansend-sender  ← this process
//!   application/        resolve the source, orchestrate one run
//!   infrastructure/
//!     network/broadcast   announce on UDP until someone connects
//!     network/transfer    accept ONE receiver, stream the payload
//!     archive             package directories into a staged zip
//!     storage/config      TOML configuration
//!         ↓
//! Receiver  (connects over TCP, reads header + body)
//! ```

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use lansend_sender::application::send_file::send_path;
use lansend_sender::infrastructure::network::transfer::TransferOutcome;
use lansend_sender::infrastructure::storage::config::load_config;

// ── CLI argument definitions ──────────────────────────────────────────────────

/// LanSend one-shot LAN file sender.
///
/// Offers a file or directory to the local network and streams it to the
/// first receiver that connects.
#[derive(Debug, Parser)]
#[command(
    name = "lansend-sender",
    about = "Offer a file or directory to the first receiver on the LAN",
    version
)]
struct Cli {
    /// File or directory to offer.
    ///
    /// Surrounding quotes are stripped, so paths pasted from drag-and-drop
    /// or shell history (e.g. `"/home/me/my file.txt"`) work as-is.
    path: String,

    /// Announce window in seconds.
    ///
    /// The sender broadcasts its presence for this long; a receiver that
    /// has not connected by then (plus a short grace margin) misses the
    /// offer.  Overrides the config file value.
    #[arg(short = 't', long, env = "LANSEND_BROADCAST_TIMEOUT")]
    broadcast_timeout: Option<u64>,

    /// Explicit config file path.
    ///
    /// Without this, the platform config path is tried and defaults apply
    /// when no file exists there.
    #[arg(long, env = "LANSEND_CONFIG")]
    config: Option<PathBuf>,
}

/// Normalises the raw path argument: trims whitespace, then strips one
/// layer of surrounding double or single quotes.
fn clean_path_arg(raw: &str) -> PathBuf {
    let trimmed = raw.trim();
    let unquoted = trimmed.trim_matches(['"', '\'']);
    PathBuf::from(unquoted.trim())
}

// ── Entry point ───────────────────────────────────────────────────────────────

/// Program entry point.
///
/// # What happens at startup
///
/// 1. CLI arguments are parsed with `clap` into a [`Cli`] struct.
/// 2. Configuration is loaded (explicit `--config` path, platform path, or
///    defaults) and the CLI timeout override is applied.
/// 3. `tracing_subscriber` is initialised.  `RUST_LOG` wins when set;
///    otherwise the config file's `log_level` applies.
/// 4. [`send_path`] runs the whole send: resolve, package if needed,
///    announce, serve one receiver.
///
/// All three orderly outcomes — sent, nobody connected, aborted mid-send —
/// exit with status 0; only setup failures exit non-zero.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config =
        load_config(cli.config.as_deref()).context("failed to load configuration")?;
    if let Some(secs) = cli.broadcast_timeout {
        config.sender.broadcast_timeout_secs = secs;
    }

    // `EnvFilter::try_from_default_env()` reads the `RUST_LOG` environment
    // variable.  If it is absent or invalid, the configured level applies.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.sender.log_level)),
        )
        .init();

    let path = clean_path_arg(&cli.path);
    info!(
        "lansend starting — source={}, discovery=UDP {}, transfer=TCP {}",
        path.display(),
        config.discovery.discovery_port,
        config.transfer.transfer_port
    );

    let outcome = send_path(&config, &path).await.context("send failed")?;
    match outcome {
        TransferOutcome::Sent { name, bytes } => info!("done: sent {name} ({bytes} bytes)"),
        TransferOutcome::NoReceiver => info!("done: no receiver connected, nothing was sent"),
        TransferOutcome::Aborted { name, error } => {
            warn!("done: transfer of {name} aborted: {error}");
        }
    }
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
