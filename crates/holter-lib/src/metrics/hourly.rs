use crate::error::AggregationError;
use crate::metrics::heart_rate::MinuteRate;
use serde::{Deserialize, Serialize};

pub const MINUTES_PER_HOUR: usize = 60;
pub const HOURS_PER_RECORDING: usize = 24;
pub const MINUTES_PER_RECORDING: usize = MINUTES_PER_HOUR * HOURS_PER_RECORDING;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HourSummary {
    pub hour_index: usize,
    pub mean_rate: f64,
    pub min_rate: u32,
    pub max_rate: u32,
}

/// Whole-recording heart rate reduced from the hourly summaries (bpm).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordingRates {
    pub mean: u32,
    pub max: u32,
    pub min: u32,
}

fn summarize_hour(hour_index: usize, rates: &[MinuteRate]) -> Option<HourSummary> {
    let first = rates.first()?.qrs_count;
    let (min_rate, max_rate, total) = rates.iter().fold(
        (first, first, 0u64),
        |(lo, hi, total), rate| {
            (
                lo.min(rate.qrs_count),
                hi.max(rate.qrs_count),
                total + u64::from(rate.qrs_count),
            )
        },
    );
    Some(HourSummary {
        hour_index,
        mean_rate: total as f64 / rates.len() as f64,
        min_rate,
        max_rate,
    })
}

/// Slice minute rates into 24 consecutive hours and summarise each one.
///
/// A short final hour is summarised over the minutes it has; an hour with no
/// minutes at all fails the whole aggregation.
pub fn aggregate_hours(rates: &[MinuteRate]) -> Result<Vec<HourSummary>, AggregationError> {
    (0..HOURS_PER_RECORDING)
        .map(|hour| {
            let start = hour * MINUTES_PER_HOUR;
            let end = (start + MINUTES_PER_HOUR).min(rates.len());
            let slice = rates.get(start..end).unwrap_or(&[]);
            summarize_hour(hour, slice).ok_or(AggregationError::InsufficientData {
                hour,
                available_minutes: rates.len(),
                required_minutes: MINUTES_PER_RECORDING,
            })
        })
        .collect()
}

/// Mean of the hourly means (rounded half to even), max of maxima, min of minima.
pub fn reduce_hours(hours: &[HourSummary]) -> Option<RecordingRates> {
    if hours.is_empty() {
        return None;
    }
    let mean = hours.iter().map(|h| h.mean_rate).sum::<f64>() / hours.len() as f64;
    let max = hours.iter().map(|h| h.max_rate).max()?;
    let min = hours.iter().map(|h| h.min_rate).min()?;
    Some(RecordingRates {
        mean: mean.round_ties_even() as u32,
        max,
        min,
    })
}
