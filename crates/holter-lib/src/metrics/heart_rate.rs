use log::debug;
use serde::{Deserialize, Serialize};

pub const MS_PER_MINUTE: u64 = 60_000;

/// QRS onsets counted in one closed minute bin (beats per minute).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MinuteRate {
    pub minute_index: usize,
    pub qrs_count: u32,
}

/// Output of [`bin_minutes`].
///
/// `rates` holds every bin whose end boundary was crossed by a later onset, in
/// chronological order and without gaps. The bin still open when the onsets run
/// out is never flushed into `rates`; it is reported as `partial` only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MinuteBins {
    pub rates: Vec<MinuteRate>,
    pub partial: Option<MinuteRate>,
}

impl MinuteBins {
    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }

    pub fn counts(&self) -> Vec<u32> {
        self.rates.iter().map(|rate| rate.qrs_count).collect()
    }
}

/// Partition non-decreasing QRS onsets (ms) into 60 s bins.
///
/// Silent minutes between two onsets are emitted as zero-count bins so that
/// `rates[i].minute_index == i` always holds.
pub fn bin_minutes(onsets_ms: &[u64]) -> MinuteBins {
    let mut rates = Vec::new();
    let mut current_minute: u64 = 1;
    let mut count_in_bin: u32 = 0;

    for &onset in onsets_ms {
        while onset / MS_PER_MINUTE >= current_minute {
            rates.push(MinuteRate {
                minute_index: (current_minute - 1) as usize,
                qrs_count: count_in_bin,
            });
            current_minute += 1;
            count_in_bin = 0;
        }
        count_in_bin += 1;
    }

    let partial = (count_in_bin > 0).then(|| MinuteRate {
        minute_index: (current_minute - 1) as usize,
        qrs_count: count_in_bin,
    });
    if let Some(open) = &partial {
        debug!(
            "dropping unterminated minute {} ({} QRS onsets)",
            open.minute_index, open.qrs_count
        );
    }
    debug!(
        "binned {} QRS onsets into {} minute bins",
        onsets_ms.len(),
        rates.len()
    );

    MinuteBins { rates, partial }
}

/// The onset that closed minute bin `minute_index`: the first onset at or past its end.
///
/// Several silent minutes closed by one onset share it. `None` while the bin is still open.
pub fn closing_onset(onsets_ms: &[u64], minute_index: usize) -> Option<u64> {
    let end_ms = (minute_index as u64 + 1).checked_mul(MS_PER_MINUTE)?;
    let index = onsets_ms.partition_point(|&onset| onset < end_ms);
    onsets_ms.get(index).copied()
}

/// How a minute bin is compared against the running maximum and minimum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtremaPolicy {
    /// Legacy report behaviour: the maximum starts at 0 and the minimum at 1000,
    /// and a bin only reaches the minimum check when it did not raise the maximum.
    #[default]
    Exclusive,
    /// Every bin is checked against both trackers.
    Independent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Extremum {
    pub rate: u32,
    pub minute_index: usize,
}

impl From<&MinuteRate> for Extremum {
    fn from(rate: &MinuteRate) -> Self {
        Self {
            rate: rate.qrs_count,
            minute_index: rate.minute_index,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RateExtrema {
    pub max: Option<Extremum>,
    pub min: Option<Extremum>,
}

const EXCLUSIVE_MAX_FLOOR: u32 = 0;
const EXCLUSIVE_MIN_CEILING: u32 = 1000;

impl RateExtrema {
    fn step_exclusive(self, rate: &MinuteRate) -> Self {
        let max_so_far = self.max.map_or(EXCLUSIVE_MAX_FLOOR, |m| m.rate);
        let min_so_far = self.min.map_or(EXCLUSIVE_MIN_CEILING, |m| m.rate);
        if rate.qrs_count > max_so_far {
            Self {
                max: Some(rate.into()),
                ..self
            }
        } else if rate.qrs_count < min_so_far {
            Self {
                min: Some(rate.into()),
                ..self
            }
        } else {
            self
        }
    }

    fn step_independent(self, rate: &MinuteRate) -> Self {
        let max = match self.max {
            Some(m) if m.rate >= rate.qrs_count => m,
            _ => rate.into(),
        };
        let min = match self.min {
            Some(m) if m.rate <= rate.qrs_count => m,
            _ => rate.into(),
        };
        Self {
            max: Some(max),
            min: Some(min),
        }
    }
}

/// Locate the minute bins holding the maximum and minimum rate. Ties keep the earliest bin.
pub fn fold_extrema(rates: &[MinuteRate], policy: ExtremaPolicy) -> RateExtrema {
    let extrema = rates
        .iter()
        .fold(RateExtrema::default(), |acc, rate| match policy {
            ExtremaPolicy::Exclusive => acc.step_exclusive(rate),
            ExtremaPolicy::Independent => acc.step_independent(rate),
        });
    debug!("minute extrema ({:?}): {:?}", policy, extrema);
    extrema
}
