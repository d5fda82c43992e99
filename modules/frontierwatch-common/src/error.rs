use thiserror::Error;

/// Failures that can cross a stage boundary.
///
/// Malformed records and geocoder misses are not represented here: they
/// degrade to empty fields, `Published::Unknown`, or an unresolved location.
#[derive(Error, Debug)]
pub enum FrontierError {
    #[error("Source {source_name} unavailable: {reason}")]
    SourceUnavailable { source_name: String, reason: String },

    #[error("Notification delivery failed: {0}")]
    DeliveryFailure(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Output error: {0}")]
    Output(String),
}
