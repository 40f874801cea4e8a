use crate::metrics::hourly::{HourSummary, HOURS_PER_RECORDING};
use crate::summary::RecordingSummary;
use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Axis {
    pub label: Option<String>,
    /// Categorical labels, one per integer x position.
    pub tick_labels: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Style {
    pub width: f32,
    pub color: Color,
    pub markers: bool,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color(pub u32);

impl Color {
    pub const RED: Color = Color(0xFF0000);
    pub const BLUE: Color = Color(0x0000FF);
    pub const GREEN: Color = Color(0x008000);

    pub fn rgb(self) -> (u8, u8, u8) {
        (
            ((self.0 >> 16) & 0xFF) as u8,
            ((self.0 >> 8) & 0xFF) as u8,
            (self.0 & 0xFF) as u8,
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineSeries {
    pub name: String,
    pub points: Vec<[f64; 2]>,
    pub style: Style,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Series {
    Line(LineSeries),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Figure {
    pub title: Option<String>,
    pub x: Axis,
    pub y: Axis,
    pub series: Vec<Series>,
}

impl Figure {
    pub fn new(title: impl Into<Option<String>>) -> Self {
        Self {
            title: title.into(),
            x: Axis::default(),
            y: Axis::default(),
            series: Vec::new(),
        }
    }

    pub fn add_series(&mut self, series: Series) {
        self.series.push(series);
    }
}

pub trait PlotBackend {
    fn draw(&mut self, fig: &Figure) -> anyhow::Result<()>;
}

/// `HH:MM - HH:MM` label for each hour of the recording.
pub fn hour_interval_labels(start_time: NaiveDateTime) -> Vec<String> {
    let boundaries: Vec<String> = (0..=HOURS_PER_RECORDING)
        .map(|h| (start_time + Duration::hours(h as i64)).format("%H:%M").to_string())
        .collect();
    boundaries
        .windows(2)
        .map(|pair| format!("{} - {}", pair[0], pair[1]))
        .collect()
}

fn hourly_line(
    name: &str,
    hours: &[HourSummary],
    color: Color,
    value: fn(&HourSummary) -> f64,
) -> Series {
    Series::Line(LineSeries {
        name: name.into(),
        points: hours
            .iter()
            .map(|hour| [hour.hour_index as f64, value(hour)])
            .collect(),
        style: Style {
            width: 2.0,
            color,
            markers: true,
        },
    })
}

/// Hourly mean, max and min heart rate as three line series.
pub fn hourly_figure(summary: &RecordingSummary) -> Figure {
    let mut fig = Figure::new(Some(format!(
        "Heart rate mean, min, max per hour for 24h ECG from {}",
        summary.start_time
    )));
    fig.x = Axis {
        label: Some("Hour interval".into()),
        tick_labels: hour_interval_labels(summary.start_time),
    };
    fig.y = Axis {
        label: Some("Heart rate (bpm)".into()),
        tick_labels: Vec::new(),
    };
    fig.add_series(hourly_line("HR mean", &summary.hours, Color::RED, |h| h.mean_rate));
    fig.add_series(hourly_line("HR max", &summary.hours, Color::BLUE, |h| {
        f64::from(h.max_rate)
    }));
    fig.add_series(hourly_line("HR min", &summary.hours, Color::GREEN, |h| {
        f64::from(h.min_rate)
    }));
    fig
}
