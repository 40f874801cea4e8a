use crate::error::EventError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Detected waveform segment type. Labels other than P/QRS/T are carried verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WaveType {
    P,
    Qrs,
    T,
    Other(String),
}

impl WaveType {
    pub fn from_label(label: &str) -> Self {
        match label {
            "P" => WaveType::P,
            "QRS" => WaveType::Qrs,
            "T" => WaveType::T,
            other => WaveType::Other(other.to_string()),
        }
    }
}

impl FromStr for WaveType {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(WaveType::from_label(s))
    }
}

impl fmt::Display for WaveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WaveType::P => f.write_str("P"),
            WaveType::Qrs => f.write_str("QRS"),
            WaveType::T => f.write_str("T"),
            WaveType::Other(label) => f.write_str(label),
        }
    }
}

/// A single wave detection. Times are milliseconds from recording start.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaveEvent {
    pub wave_type: WaveType,
    pub onset_ms: u64,
    pub offset_ms: u64,
    pub tags: Vec<String>,
}

impl WaveEvent {
    pub fn new(wave_type: WaveType, onset_ms: u64, offset_ms: u64) -> Self {
        debug_assert!(offset_ms >= onset_ms, "wave offset before onset");
        Self {
            wave_type,
            onset_ms,
            offset_ms,
            tags: Vec::new(),
        }
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn is_qrs(&self) -> bool {
        self.wave_type == WaveType::Qrs
    }

    /// Case-sensitive substring match against every tag.
    pub fn has_tag_containing(&self, needle: &str) -> bool {
        self.tags.iter().any(|tag| tag.contains(needle))
    }
}

/// Latest onset accepted from an event log: one week past the recording start.
pub const MAX_ONSET_MS: u64 = 7 * 24 * 60 * 60 * 1000;

/// Events of one recording, with QRS onsets guaranteed non-decreasing.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Recording {
    events: Vec<WaveEvent>,
}

fn check_spans(events: &[WaveEvent], limit_ms: u64) -> Result<(), EventError> {
    for (index, event) in events.iter().enumerate() {
        if event.offset_ms < event.onset_ms {
            return Err(EventError::InvertedSpan {
                index,
                onset_ms: event.onset_ms,
                offset_ms: event.offset_ms,
            });
        }
        if event.onset_ms > limit_ms {
            return Err(EventError::OnsetOutOfRange {
                index,
                onset_ms: event.onset_ms,
                limit_ms,
            });
        }
    }
    Ok(())
}

impl Recording {
    /// Wrap events in file order, rejecting QRS onsets that go backwards.
    pub fn new(events: Vec<WaveEvent>) -> Result<Self, EventError> {
        Self::with_onset_limit(events, MAX_ONSET_MS)
    }

    /// Like [`Recording::new`] with a caller-chosen latest onset.
    pub fn with_onset_limit(events: Vec<WaveEvent>, limit_ms: u64) -> Result<Self, EventError> {
        check_spans(&events, limit_ms)?;
        let mut previous: Option<u64> = None;
        for (index, event) in events.iter().enumerate().filter(|(_, e)| e.is_qrs()) {
            if let Some(previous_ms) = previous {
                if event.onset_ms < previous_ms {
                    return Err(EventError::UnsortedOnsets {
                        index,
                        previous_ms,
                        onset_ms: event.onset_ms,
                    });
                }
            }
            previous = Some(event.onset_ms);
        }
        Ok(Self { events })
    }

    /// Stable-sort events by onset instead of rejecting out-of-order input.
    pub fn sorted(mut events: Vec<WaveEvent>) -> Result<Self, EventError> {
        check_spans(&events, MAX_ONSET_MS)?;
        events.sort_by_key(|event| event.onset_ms);
        Ok(Self { events })
    }

    pub fn events(&self) -> &[WaveEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn qrs_onsets(&self) -> Vec<u64> {
        self.events
            .iter()
            .filter(|event| event.is_qrs())
            .map(|event| event.onset_ms)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn qrs(onset_ms: u64) -> WaveEvent {
        WaveEvent::new(WaveType::Qrs, onset_ms, onset_ms + 80)
    }

    #[test]
    fn parses_wave_labels() {
        assert_eq!("P".parse::<WaveType>().unwrap(), WaveType::P);
        assert_eq!("QRS".parse::<WaveType>().unwrap(), WaveType::Qrs);
        assert_eq!(
            "qrs".parse::<WaveType>().unwrap(),
            WaveType::Other("qrs".into())
        );
        assert_eq!(WaveType::Other("INV".into()).to_string(), "INV");
    }

    #[test]
    fn tag_match_is_substring_and_case_sensitive() {
        let event = WaveEvent::new(WaveType::P, 0, 10).with_tags(["premature-ectopic"]);
        assert!(event.has_tag_containing("premature"));
        assert!(!event.has_tag_containing("Premature"));
        assert!(!WaveEvent::new(WaveType::P, 0, 10).has_tag_containing("premature"));
    }

    #[test]
    fn rejects_backwards_qrs_onsets() {
        let events = vec![qrs(1_000), qrs(2_000), qrs(1_500)];
        match Recording::new(events) {
            Err(EventError::UnsortedOnsets {
                index,
                previous_ms,
                onset_ms,
            }) => {
                assert_eq!(index, 2);
                assert_eq!(previous_ms, 2_000);
                assert_eq!(onset_ms, 1_500);
            }
            other => panic!("expected UnsortedOnsets, got {:?}", other),
        }
    }

    #[test]
    fn non_qrs_events_do_not_affect_ordering() {
        let events = vec![
            qrs(1_000),
            WaveEvent::new(WaveType::P, 500, 600),
            qrs(2_000),
        ];
        let recording = Recording::new(events).expect("QRS onsets are ordered");
        assert_eq!(recording.qrs_onsets(), vec![1_000, 2_000]);
    }

    #[test]
    fn sorted_orders_events_by_onset() {
        let recording = Recording::sorted(vec![qrs(3_000), qrs(1_000), qrs(2_000)]).unwrap();
        assert_eq!(recording.qrs_onsets(), vec![1_000, 2_000, 3_000]);
        assert_eq!(recording.len(), 3);
    }

    #[test]
    fn rejects_onsets_past_the_limit() {
        // a stray microsecond timestamp among millisecond onsets
        let events = vec![qrs(0), qrs(1_000), qrs(300_000_000_000)];
        match Recording::new(events.clone()) {
            Err(EventError::OnsetOutOfRange {
                index,
                onset_ms,
                limit_ms,
            }) => {
                assert_eq!(index, 2);
                assert_eq!(onset_ms, 300_000_000_000);
                assert_eq!(limit_ms, MAX_ONSET_MS);
            }
            other => panic!("expected OnsetOutOfRange, got {:?}", other),
        }
        assert!(matches!(
            Recording::sorted(events),
            Err(EventError::OnsetOutOfRange { index: 2, .. })
        ));
        assert!(matches!(
            Recording::new(vec![qrs(u64::MAX - 100)]),
            Err(EventError::OnsetOutOfRange { .. })
        ));
    }

    #[test]
    fn onset_limit_is_adjustable() {
        let events = vec![qrs(0), qrs(90_000)];
        assert!(Recording::with_onset_limit(events.clone(), 60_000).is_err());
        assert_eq!(
            Recording::with_onset_limit(events, 90_000).unwrap().len(),
            2
        );
    }

    #[test]
    fn rejects_offset_before_onset() {
        let mut inverted = qrs(5_000);
        inverted.offset_ms = 4_000;
        let events = vec![qrs(1_000), inverted];
        match Recording::new(events.clone()) {
            Err(EventError::InvertedSpan {
                index,
                onset_ms,
                offset_ms,
            }) => {
                assert_eq!(index, 1);
                assert_eq!(onset_ms, 5_000);
                assert_eq!(offset_ms, 4_000);
            }
            other => panic!("expected InvertedSpan, got {:?}", other),
        }
        assert!(Recording::sorted(events).is_err());
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "wave offset before onset")]
    fn constructor_asserts_span_order() {
        let _ = WaveEvent::new(WaveType::T, 2_000, 1_000);
    }
}
