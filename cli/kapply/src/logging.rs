//! Tracing setup.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Log line format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl LogFormat {
    pub fn parse(value: &str) -> Self {
        match value {
            "json" => LogFormat::Json,
            _ => LogFormat::Text,
        }
    }
}

/// Build the filter from a directive such as `debug` or `kapply_diffgraph=trace`.
///
/// Invalid directives fall back to `warn` so that a typo never hides errors.
pub fn filter(directive: &str) -> EnvFilter {
    EnvFilter::try_new(directive).unwrap_or_else(|_| EnvFilter::new("warn"))
}

/// Install the global subscriber. Logs go to stderr; stdout is reserved for
/// command output.
pub fn init(directive: &str, format: LogFormat) {
    let registry = tracing_subscriber::registry().with(filter(directive));

    match format {
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init(),
        LogFormat::Text => registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init(),
    }
}
