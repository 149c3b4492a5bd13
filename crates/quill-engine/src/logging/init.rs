use std::sync::Once;

use log::LevelFilter;

/// Logger configuration.
///
/// Filter precedence: `env_filter`, then `RUST_LOG`, then `default_level`.
/// `env_filter` and `RUST_LOG` use the `env_logger` directive syntax
/// (e.g. "quill_engine=trace,wgpu_core=warn").
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub env_filter: Option<String>,
    pub default_level: LevelFilter,
    /// Caps the very chatty wgpu/naga crates at `warn` unless a directive names them.
    pub quiet_gpu_crates: bool,
    pub write_style: env_logger::WriteStyle,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            env_filter: None,
            default_level: LevelFilter::Info,
            quiet_gpu_crates: true,
            write_style: env_logger::WriteStyle::Auto,
        }
    }
}

const GPU_CRATES: [&str; 4] = ["wgpu_core", "wgpu_hal", "naga", "wgpu"];

/// Filter directives that will be applied for `config` given the value of `RUST_LOG`.
fn directives(config: &LoggingConfig, rust_log: Option<&str>) -> Option<String> {
    config
        .env_filter
        .as_deref()
        .or(rust_log)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
}

fn configure(builder: &mut env_logger::Builder, config: &LoggingConfig, rust_log: Option<&str>) {
    if config.quiet_gpu_crates {
        for krate in GPU_CRATES {
            builder.filter_module(krate, LevelFilter::Warn);
        }
    }

    match directives(config, rust_log) {
        // Parsed last so explicit directives override the GPU caps above.
        Some(filter) => {
            builder.filter_level(config.default_level);
            builder.parse_filters(&filter);
        }
        None => {
            builder.filter_level(config.default_level);
        }
    }

    builder.write_style(config.write_style);
}

static INIT: Once = Once::new();

/// Initializes the global logger once; later calls are ignored.
///
/// Call early in `main`, before creating any GPU objects.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let rust_log = std::env::var("RUST_LOG").ok();
        let mut builder = env_logger::Builder::new();
        configure(&mut builder, &config, rust_log.as_deref());

        // Another logger may already be installed by the host binary.
        if builder.try_init().is_err() {
            return;
        }
        log::debug!("logging initialized");
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_filter_wins_over_env() {
        let config = LoggingConfig {
            env_filter: Some("quill_engine=trace".into()),
            ..LoggingConfig::default()
        };
        assert_eq!(
            directives(&config, Some("warn")).as_deref(),
            Some("quill_engine=trace")
        );
    }

    #[test]
    fn env_used_when_no_explicit_filter() {
        let config = LoggingConfig::default();
        assert_eq!(directives(&config, Some(" debug ")).as_deref(), Some("debug"));
    }

    #[test]
    fn blank_directives_fall_back_to_default_level() {
        let config = LoggingConfig {
            env_filter: Some("   ".into()),
            ..LoggingConfig::default()
        };
        assert_eq!(directives(&config, None), None);
        assert_eq!(directives(&LoggingConfig::default(), None), None);
    }

    #[test]
    fn repeated_init_is_harmless() {
        init_logging(LoggingConfig::default());
        init_logging(LoggingConfig {
            default_level: LevelFilter::Trace,
            ..LoggingConfig::default()
        });
    }
}
