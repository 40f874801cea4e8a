use crate::error::AggregationError;
use crate::events::{Recording, WaveType};
use crate::metrics::annotations::count_tagged;
use crate::metrics::heart_rate::{bin_minutes, closing_onset, fold_extrema, Extremum, ExtremaPolicy};
use crate::metrics::hourly::{aggregate_hours, reduce_hours, HourSummary, MINUTES_PER_RECORDING};
use chrono::{Duration, NaiveDateTime};
use log::debug;
use serde::{Deserialize, Serialize};

pub const DEFAULT_PREMATURE_TAG: &str = "premature";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregationOptions {
    /// Substring identifying premature beats in the tag list.
    pub premature_tag: String,
    pub extrema_policy: ExtremaPolicy,
}

impl Default for AggregationOptions {
    fn default() -> Self {
        Self {
            premature_tag: DEFAULT_PREMATURE_TAG.to_string(),
            extrema_policy: ExtremaPolicy::default(),
        }
    }
}

/// Everything the report layer needs from one 24 h recording.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordingSummary {
    pub start_time: NaiveDateTime,
    pub premature_p_count: usize,
    pub premature_qrs_count: usize,
    pub mean_hr: u32,
    pub max_hr: u32,
    pub max_hr_time: Option<NaiveDateTime>,
    pub min_hr: u32,
    pub min_hr_time: Option<NaiveDateTime>,
    pub hours: Vec<HourSummary>,
}

/// Wall-clock time of an onset.
pub fn onset_time(start_time: NaiveDateTime, onset_ms: u64) -> NaiveDateTime {
    start_time + Duration::milliseconds(onset_ms as i64)
}

/// Run the full aggregation over one recording.
///
/// Fails with [`AggregationError::InsufficientData`] when any of the 24 hours
/// has no closed minute bin; nothing partial is returned in that case.
pub fn summarize(
    recording: &Recording,
    start_time: NaiveDateTime,
    options: &AggregationOptions,
) -> Result<RecordingSummary, AggregationError> {
    let events = recording.events();
    let premature_p_count = count_tagged(events, &WaveType::P, &options.premature_tag);
    let premature_qrs_count = count_tagged(events, &WaveType::Qrs, &options.premature_tag);

    let onsets = recording.qrs_onsets();
    let bins = bin_minutes(&onsets);
    let hours = aggregate_hours(&bins.rates)?;
    let rates = reduce_hours(&hours).ok_or(AggregationError::InsufficientData {
        hour: 0,
        available_minutes: bins.len(),
        required_minutes: MINUTES_PER_RECORDING,
    })?;

    let window = &bins.rates[..bins.len().min(MINUTES_PER_RECORDING)];
    let extrema = fold_extrema(window, options.extrema_policy);
    // an extremal minute is stamped with the onset that closed it
    let at = |extremum: Option<Extremum>| {
        extremum
            .and_then(|e| closing_onset(&onsets, e.minute_index))
            .map(|onset_ms| onset_time(start_time, onset_ms))
    };

    debug!(
        "summary: {} events, {} minute bins, mean {} bpm",
        recording.len(),
        bins.len(),
        rates.mean
    );

    Ok(RecordingSummary {
        start_time,
        premature_p_count,
        premature_qrs_count,
        mean_hr: rates.mean,
        max_hr: rates.max,
        max_hr_time: at(extrema.max),
        min_hr: rates.min,
        min_hr_time: at(extrema.min),
        hours,
    })
}
