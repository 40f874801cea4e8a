use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while turning event-log rows into a [`crate::events::Recording`].
#[derive(Debug, Error)]
pub enum EventError {
    #[error("line {line}: malformed event: {reason}")]
    MalformedEvent { line: usize, reason: String },
    #[error(
        "QRS onsets are not chronological: event {index} starts at {onset_ms} ms after {previous_ms} ms"
    )]
    UnsortedOnsets {
        index: usize,
        previous_ms: u64,
        onset_ms: u64,
    },
    #[error("event {index}: offset {offset_ms} ms is before onset {onset_ms} ms")]
    InvertedSpan {
        index: usize,
        onset_ms: u64,
        offset_ms: u64,
    },
    #[error("event {index}: onset {onset_ms} ms is past the {limit_ms} ms limit")]
    OnsetOutOfRange {
        index: usize,
        onset_ms: u64,
        limit_ms: u64,
    },
    #[error("failed to read {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("reading event record")]
    Csv(#[from] csv::Error),
}

impl EventError {
    pub(crate) fn malformed(line: usize, reason: impl Into<String>) -> Self {
        EventError::MalformedEvent {
            line,
            reason: reason.into(),
        }
    }
}

/// Errors raised by the aggregation engine.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AggregationError {
    #[error(
        "insufficient data: hour {hour} has no minute bins ({available_minutes} minute bins available, {required_minutes} required)"
    )]
    InsufficientData {
        hour: usize,
        available_minutes: usize,
        required_minutes: usize,
    },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn insufficient_data_names_the_hour() {
        let err = AggregationError::InsufficientData {
            hour: 3,
            available_minutes: 150,
            required_minutes: 1440,
        };
        let msg = err.to_string();
        assert!(msg.contains("hour 3"));
        assert!(msg.contains("150"));
    }

    #[test]
    fn io_error_keeps_source() {
        let err = EventError::Io {
            path: PathBuf::from("missing.csv"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        };
        assert!(err.to_string().contains("missing.csv"));
        assert!(err.source().is_some());
    }
}
