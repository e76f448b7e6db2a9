//! Structured Logging with Sensitive Data Redaction
//!
//! The library only emits `tracing` events; binaries call [`init`] to
//! install a subscriber. Addresses and hashes go through the redaction
//! helpers before they are attached to an event.

use ethers_core::types::Address;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install a fmt subscriber filtered by `RUST_LOG`, falling back to `default_filter`.
///
/// Calling this more than once is harmless; later calls are ignored.
pub fn init(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}

/// Replace a value with a length marker
pub fn redact_value(value: &str) -> String {
    match value.len() {
        0 => "[EMPTY]".to_string(),
        1..=4 => "[REDACTED]".to_string(),
        len => format!("[REDACTED:{}chars]", len),
    }
}

/// `0x` plus the first 6 and last 4 hex digits of an account
pub fn redact_address(address: &Address) -> String {
    let full = format!("{:?}", address);
    elide(&full, 8, 4)
}

/// First 10 and last 6 hex digits of a `0x` transaction hash
pub fn redact_hash(hash: &str) -> String {
    let trimmed = hash.trim();
    let prefix = if trimmed.starts_with("0x") { 12 } else { 10 };
    if trimmed.len() <= 20 {
        return trimmed.to_string();
    }
    elide(trimmed, prefix, 6)
}

fn elide(value: &str, keep_front: usize, keep_back: usize) -> String {
    if !value.is_ascii() || value.len() <= keep_front + keep_back + 3 {
        return redact_value(value);
    }
    format!("{}...{}", &value[..keep_front], &value[value.len() - keep_back..])
}
