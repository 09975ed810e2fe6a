use std::sync::Once;

use log::LevelFilter;

/// Logger configuration.
///
/// Filter precedence: `env_filter`, then `RUST_LOG`, then `default_level`.
/// Filters use the `env_logger` syntax (e.g. "streamblock_engine=debug").
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub env_filter: Option<String>,
    pub default_level: LevelFilter,
    /// Per-block loop chatter (`trace!` from sampling) is noisy; when false
    /// the sample module is capped at `debug`.
    pub trace_sampling: bool,
    pub write_style: env_logger::WriteStyle,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            env_filter: None,
            default_level: LevelFilter::Info,
            trace_sampling: false,
            write_style: env_logger::WriteStyle::Auto,
        }
    }
}

impl LoggingConfig {
    /// Debug-level output for the engine, as used while tuning thresholds.
    pub fn verbose() -> Self {
        Self {
            default_level: LevelFilter::Debug,
            ..Self::default()
        }
    }
}

static INIT: Once = Once::new();

/// Installs `env_logger` as the global logger, once per process.
///
/// Later calls are ignored, as is the case where the host already installed
/// a logger of its own.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let mut builder = env_logger::Builder::new();
        builder.filter_level(config.default_level);
        if !config.trace_sampling {
            let capped = config.default_level.min(LevelFilter::Debug);
            builder.filter_module("streamblock_engine::sample", capped);
        }

        if let Some(filter) = config.env_filter.or_else(|| std::env::var("RUST_LOG").ok()) {
            builder.parse_filters(&filter);
        }

        builder.write_style(config.write_style);
        builder.format_timestamp_millis();

        if builder.try_init().is_err() {
            return;
        }

        log::debug!("logging initialized");
    });
}
