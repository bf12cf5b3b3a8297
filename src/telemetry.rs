use std::sync::OnceLock;
use tracing_subscriber::EnvFilter;

const DEFAULT_DIRECTIVE: &str = "evm_rpc_failover=info,warn";

static TRACING_INIT: OnceLock<()> = OnceLock::new();

/// Installs a fmt tracing subscriber unless one is already active.
///
/// Honours `RUST_LOG` when present and falls back to info-level events from
/// this crate. Safe to call repeatedly.
pub fn init_tracing() {
    TRACING_INIT.get_or_init(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE));

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .try_init();
    });
}
