use crate::config::TelemetryConfig;
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::EnvFilter;

#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    #[error("log filter '{directives}' is not a valid tracing directive list")]
    EnvFilter {
        directives: String,
        #[source]
        source: ParseError,
    },
    #[error("a global tracing subscriber is already installed: {0}")]
    Subscriber(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Where the active log filter came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterSource {
    Environment,
    Config,
}

/// Install a compact stderr subscriber so stdout stays free for command output.
/// `RUST_LOG` takes precedence over `APP_LOG_LEVEL`.
pub fn init(config: &TelemetryConfig) -> Result<FilterSource, TelemetryError> {
    let from_env = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let (filter, source) = resolve_filter(from_env.as_deref(), &config.log_level)?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_ansi(false)
        .compact()
        .try_init()
        .map_err(TelemetryError::Subscriber)?;

    tracing::debug!(?source, "telemetry initialised");
    Ok(source)
}

fn resolve_filter(
    from_env: Option<&str>,
    configured: &str,
) -> Result<(EnvFilter, FilterSource), TelemetryError> {
    if let Some(directives) = from_env.filter(|value| !value.trim().is_empty()) {
        if let Ok(filter) = EnvFilter::try_new(directives) {
            return Ok((filter, FilterSource::Environment));
        }
    }

    EnvFilter::try_new(configured)
        .map(|filter| (filter, FilterSource::Config))
        .map_err(|source| TelemetryError::EnvFilter {
            directives: configured.to_string(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn environment_directives_win() {
        let (_, source) =
            resolve_filter(Some("placement_engine=debug"), "info").expect("valid filter");
        assert_eq!(source, FilterSource::Environment);
    }

    #[test]
    fn blank_or_invalid_environment_falls_back_to_config() {
        let (_, source) = resolve_filter(Some("  "), "warn").expect("valid filter");
        assert_eq!(source, FilterSource::Config);
        let (_, source) = resolve_filter(Some("placement_engine=loud"), "warn").expect("fallback");
        assert_eq!(source, FilterSource::Config);
    }

    #[test]
    fn malformed_configured_level_is_reported() {
        match resolve_filter(None, "placement_engine=loud") {
            Err(TelemetryError::EnvFilter { directives, .. }) => {
                assert_eq!(directives, "placement_engine=loud")
            }
            other => panic!("expected env filter error, got {other:?}"),
        }
    }
}
