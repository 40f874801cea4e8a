//! Text and HTML renderings of a [`RecordingSummary`].

use crate::plot::hour_interval_labels;
use crate::summary::RecordingSummary;
use chrono::NaiveDateTime;
use std::fmt::Write;

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const REPORT_TEMPLATE: &str = include_str!("templates/report.html");

pub fn format_timestamp(time: Option<NaiveDateTime>) -> String {
    time.map(|t| t.format(TIMESTAMP_FORMAT).to_string())
        .unwrap_or_else(|| "n/a".to_string())
}

/// Console summary.
pub fn render_text(summary: &RecordingSummary) -> String {
    format!(
        "'Premature' tags amount:\n\
         P-wave: {}\n\
         QRS-complex: {}\n\
         \n\n\
         Heart rate:\n\
         Mean heart rate: {} bpm\n\
         Max heart rate: {} bpm at {}\n\
         Min heart rate: {} bpm at {}\n",
        summary.premature_p_count,
        summary.premature_qrs_count,
        summary.mean_hr,
        summary.max_hr,
        format_timestamp(summary.max_hr_time),
        summary.min_hr,
        format_timestamp(summary.min_hr_time),
    )
}

/// Standalone HTML document; `plot_src` is the chart image reference, if one was drawn.
pub fn render_html(summary: &RecordingSummary, plot_src: Option<&str>) -> String {
    let plot = plot_src
        .map(|src| {
            format!(
                "  <img src=\"{}\" alt=\"Heart rate mean, min, max per hour\">",
                escape_html(src)
            )
        })
        .unwrap_or_default();

    let mut hourly_rows = String::new();
    for (label, hour) in hour_interval_labels(summary.start_time)
        .iter()
        .zip(&summary.hours)
    {
        let _ = writeln!(
            hourly_rows,
            "    <tr><td>{}</td><td>{:.1}</td><td>{}</td><td>{}</td></tr>",
            label, hour.mean_rate, hour.min_rate, hour.max_rate
        );
    }

    REPORT_TEMPLATE
        .replace(
            "{{start_time}}",
            &summary.start_time.format(TIMESTAMP_FORMAT).to_string(),
        )
        .replace("{{p_wave_premature}}", &summary.premature_p_count.to_string())
        .replace(
            "{{qrs_complex_premature}}",
            &summary.premature_qrs_count.to_string(),
        )
        .replace("{{mean_heart_rate}}", &summary.mean_hr.to_string())
        .replace("{{max_heart_rate}}", &summary.max_hr.to_string())
        .replace(
            "{{max_heart_rate_time}}",
            &format_timestamp(summary.max_hr_time),
        )
        .replace("{{min_heart_rate}}", &summary.min_hr.to_string())
        .replace(
            "{{min_heart_rate_time}}",
            &format_timestamp(summary.min_hr_time),
        )
        .replace("{{plot}}", &plot)
        .replace("{{hourly_rows}}", hourly_rows.trim_end())
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}
