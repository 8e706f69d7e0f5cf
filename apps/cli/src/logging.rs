//! Minimal `tracing` setup for the CLI binary, in the spirit of
//! `apps/server/src/logging.rs`'s `init_simple_logging` — environment-driven,
//! no OpenTelemetry. The core library crates only emit events; installing the
//! subscriber is the binary's job (`SPEC_FULL.md` §6).

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub fn init() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("fhirloom=info")))
        .with(fmt::layer())
        .init();
}
