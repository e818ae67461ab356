//! Logger bootstrap for the client.

/// Install the logger with `info` as the default level.
pub fn init() {
    init_with_filter("info");
}

/// Native builds log through `env_logger`; `RUST_LOG` overrides the default
/// filter. Calling this more than once is a no-op.
#[cfg(not(target_arch = "wasm32"))]
pub fn init_with_filter(default_filter: &str) {
    let _ = env_logger::Builder::from_env(env_logger::Env::new().default_filter_or(default_filter)).try_init();
}

/// Browser builds log to the developer console.
#[cfg(target_arch = "wasm32")]
pub fn init_with_filter(default_filter: &str) {
    let level = default_filter.parse().unwrap_or(log::Level::Info);
    let _ = console_log::init_with_level(level);
}
