use anyhow::{bail, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const LEVELS: [&str; 6] = ["trace", "debug", "info", "warn", "error", "critical"];
const CRATES: [&str; 4] = ["section_sync", "orchestrator", "events", "section_core"];

/// Level used when neither `RUST_LOG` nor the options set one.
pub fn default_level() -> &'static str {
    if cfg!(debug_assertions) {
        "debug"
    } else {
        "critical"
    }
}

pub fn validate_level(level: &str) -> Result<()> {
    if !LEVELS.contains(&level) {
        bail!("Unknown log level '{level}', expected one of {}", LEVELS.join(", "));
    }
    Ok(())
}

/// Env-filter directive for `level`. tracing has no `critical`, it maps to `error`.
pub fn filter_directive(level: Option<&str>) -> String {
    let level = match level.unwrap_or(default_level()) {
        "critical" => "error",
        other => other,
    };

    CRATES
        .iter()
        .map(|krate| format!("{krate}={level}"))
        .collect::<Vec<_>>()
        .join(",")
}

pub fn init_tracing(level: Option<&str>) {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| filter_directive(level).into()),
        )
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_critical_maps_to_error() {
        let directive = filter_directive(Some("critical"));
        assert!(directive.contains("orchestrator=error"));
        assert!(!directive.contains("critical"));
    }

    #[test]
    fn test_explicit_level() {
        assert_eq!(
            filter_directive(Some("info")),
            "section_sync=info,orchestrator=info,events=info,section_core=info"
        );
    }

    #[test]
    fn test_default_level_in_tests() {
        // tests build with debug assertions
        assert_eq!(default_level(), "debug");
        assert!(filter_directive(None).contains("events=debug"));
    }

    #[test]
    fn test_level_from_owned_string() {
        let configured = String::from("warn");
        let directive = filter_directive(Some(configured.as_str()));
        drop(configured);

        assert!(directive.starts_with("section_sync=warn,"));
    }

    #[test]
    fn test_validate_level() {
        assert!(validate_level("warn").is_ok());
        assert!(validate_level("critical").is_ok());
        assert!(validate_level("loud").is_err());
    }
}
