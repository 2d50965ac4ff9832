pub use log::{debug, error, info, trace, warn};

fn builder(filters: &str) -> env_logger::Builder {
    let mut builder = env_logger::Builder::new();

    #[cfg(debug_assertions)]
    builder.filter_level(log::LevelFilter::Debug);

    #[cfg(not(debug_assertions))]
    builder.filter_level(log::LevelFilter::Info);

    if !filters.trim().is_empty() {
        builder.parse_filters(filters);
    }

    builder
        .format_timestamp_millis()
        .format_level(true)
        .format_module_path(true)
        .format_line_number(true);
    builder
}

/// Installs the global logger. `filters` uses `env_logger` directive syntax
/// (`"info"`, `"warn,quecho_core=debug"`); an empty string keeps the build
/// default of `debug` (debug builds) or `info` (release builds).
///
/// Panics if a logger is already installed.
pub fn init(filters: &str) {
    builder(filters).init();
}

/// Like [`init`], but returns `false` instead of panicking when a logger is
/// already installed.
pub fn try_init(filters: &str) -> bool {
    builder(filters).try_init().is_ok()
}
