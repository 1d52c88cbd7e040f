//! semconv: load semantic convention YAML into a resolved model
//!
//! The model and the resolution engine live in `semconv-core`; this crate adds
//! the YAML front end, directory discovery and tracing setup.

pub mod loader;
pub mod yaml;

pub use loader::SemconvLoader;
pub use semconv_core::*;
pub use yaml::parse_document;

/// Install a `tracing` subscriber filtered by `RUST_LOG`, defaulting to `info`
///
/// Safe to call more than once; only the first call installs a subscriber.
pub fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
