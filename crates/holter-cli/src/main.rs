use anyhow::{bail, Context, Result};
use chrono::NaiveDateTime;
use clap::{Parser, Subcommand, ValueEnum};
use holter_lib::{
    config::{PdfConfig, PlotConfig, ReportConfig},
    events::{Recording, WaveType},
    io::event_log,
    metrics::{
        annotations::count_tagged,
        heart_rate::{bin_minutes, ExtremaPolicy},
    },
    plot::{hourly_figure, Figure, PlotBackend, Series},
    report::{render_html, render_text, TIMESTAMP_FORMAT},
    summary::{summarize, RecordingSummary, DEFAULT_PREMATURE_TAG},
};
use log::info;
use plotters::prelude::*;
use std::{
    fs,
    path::{Path, PathBuf},
    process::Command,
};

const PLOT_FILE: &str = "plot.png";
const HTML_FILE: &str = "report.html";
const PDF_FILE: &str = "report.pdf";

#[derive(Parser)]
#[command(
    name = "holter",
    version,
    about = "Holter: 24h ECG event-log summary tools"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum OutputMode {
    Text,
    Html,
    Pdf,
    Json,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum PolicyArg {
    #[value(name = "exclusive")]
    Exclusive,
    #[value(name = "independent")]
    Independent,
}

impl From<PolicyArg> for ExtremaPolicy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::Exclusive => ExtremaPolicy::Exclusive,
            PolicyArg::Independent => ExtremaPolicy::Independent,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Summarise a 24h recording: premature tags, hourly heart rate, chart and report
    Report {
        /// Start of the recording, `YYYY-MM-DD HH:MM:SS`
        #[arg(long, value_parser = parse_start_time)]
        start: NaiveDateTime,
        /// Event log (`wave_type,onset_ms,offset_ms[,tags...]`)
        #[arg(long)]
        record: PathBuf,
        #[arg(long, value_enum, default_value = "text")]
        output: OutputMode,
        /// Shorthand for `--output pdf`
        #[arg(long)]
        pdf: bool,
        /// Directory receiving plot.png, report.html and report.pdf
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,
        #[arg(long)]
        config: Option<PathBuf>,
        /// Overrides `premature_tag` from the config file
        #[arg(long)]
        tag: Option<String>,
        /// Overrides `extrema_policy` from the config file
        #[arg(long, value_enum)]
        extrema_policy: Option<PolicyArg>,
        /// Sort events by onset instead of rejecting out-of-order QRS onsets
        #[arg(long)]
        sort_onsets: bool,
        /// Skip drawing plot.png
        #[arg(long)]
        no_plot: bool,
    },
    /// Print the per-minute QRS counts as JSON
    MinuteRates {
        #[arg(long)]
        record: PathBuf,
        #[arg(long)]
        sort_onsets: bool,
    },
    /// Count events of one wave type carrying a tag
    Count {
        #[arg(long)]
        record: PathBuf,
        #[arg(long)]
        wave_type: String,
        #[arg(long, default_value = DEFAULT_PREMATURE_TAG)]
        tag: String,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    match cli.command {
        Commands::Report {
            start,
            record,
            output,
            pdf,
            out_dir,
            config,
            tag,
            extrema_policy,
            sort_onsets,
            no_plot,
        } => {
            let mut cfg = match config {
                Some(path) => ReportConfig::load(&path)
                    .with_context(|| format!("loading config {}", path.display()))?,
                None => ReportConfig::default(),
            };
            if let Some(tag) = tag {
                cfg.premature_tag = tag;
            }
            if let Some(policy) = extrema_policy {
                cfg.extrema_policy = policy.into();
            }
            let mode = if pdf { OutputMode::Pdf } else { output };
            cmd_report(
                start,
                &record,
                mode,
                &out_dir,
                &cfg,
                sort_onsets,
                !no_plot,
            )?
        }
        Commands::MinuteRates {
            record,
            sort_onsets,
        } => cmd_minute_rates(&record, sort_onsets)?,
        Commands::Count {
            record,
            wave_type,
            tag,
        } => cmd_count(&record, &wave_type, &tag)?,
    }
    Ok(())
}

fn parse_start_time(value: &str) -> Result<NaiveDateTime, String> {
    NaiveDateTime::parse_from_str(value, TIMESTAMP_FORMAT)
        .map_err(|e| format!("expected YYYY-MM-DD HH:MM:SS ({})", e))
}

fn load_recording(path: &Path, sort_onsets: bool) -> Result<Recording> {
    let events = event_log::read_event_log(path)
        .with_context(|| format!("reading event log {}", path.display()))?;
    if sort_onsets {
        return Recording::sorted(events).context("validating event log");
    }
    Recording::new(events).context("invalid event log (use --sort-onsets to reorder out-of-order onsets)")
}

fn cmd_report(
    start: NaiveDateTime,
    record: &Path,
    mode: OutputMode,
    out_dir: &Path,
    cfg: &ReportConfig,
    sort_onsets: bool,
    draw_plot: bool,
) -> Result<()> {
    let recording = load_recording(record, sort_onsets)?;
    info!("loaded {} events from {}", recording.len(), record.display());
    let summary = summarize(&recording, start, &cfg.aggregation_options())
        .context("summarising heart rate")?;

    fs::create_dir_all(out_dir)
        .with_context(|| format!("creating output directory {}", out_dir.display()))?;
    let plot_src = if draw_plot {
        let plot_path = out_dir.join(PLOT_FILE);
        PngBackend::new(&plot_path, &cfg.plot).draw(&hourly_figure(&summary))?;
        info!("wrote {}", plot_path.display());
        Some(PLOT_FILE)
    } else {
        None
    };

    match mode {
        OutputMode::Text => print!("{}", render_text(&summary)),
        OutputMode::Json => println!("{}", serde_json::to_string(&summary)?),
        OutputMode::Html => {
            write_html(out_dir, &summary, plot_src)?;
        }
        OutputMode::Pdf => {
            let html = write_html(out_dir, &summary, plot_src)?;
            convert_to_pdf(&cfg.pdf, &html, &out_dir.join(PDF_FILE))?;
        }
    }
    Ok(())
}

fn write_html(
    out_dir: &Path,
    summary: &RecordingSummary,
    plot_src: Option<&str>,
) -> Result<PathBuf> {
    let path = out_dir.join(HTML_FILE);
    fs::write(&path, render_html(summary, plot_src))
        .with_context(|| format!("writing {}", path.display()))?;
    info!("wrote {}", path.display());
    Ok(path)
}

fn convert_to_pdf(pdf: &PdfConfig, html: &Path, out: &Path) -> Result<()> {
    let status = Command::new(&pdf.converter)
        .args(&pdf.args)
        .arg(html)
        .arg(out)
        .status()
        .with_context(|| format!("running PDF converter '{}'", pdf.converter))?;
    if !status.success() {
        bail!("PDF converter '{}' failed with {}", pdf.converter, status);
    }
    info!("wrote {}", out.display());
    Ok(())
}

fn cmd_minute_rates(record: &Path, sort_onsets: bool) -> Result<()> {
    let recording = load_recording(record, sort_onsets)?;
    let bins = bin_minutes(&recording.qrs_onsets());
    println!("{}", serde_json::to_string(&bins)?);
    Ok(())
}

fn cmd_count(record: &Path, wave_type: &str, tag: &str) -> Result<()> {
    let events = event_log::read_event_log(record)
        .with_context(|| format!("reading event log {}", record.display()))?;
    let wave_type = WaveType::from_label(wave_type);
    let count = count_tagged(&events, &wave_type, tag);
    let js = serde_json::json!({
        "wave_type": wave_type.to_string(),
        "tag": tag,
        "count": count,
    });
    println!("{}", js);
    Ok(())
}

/// Draws a [`Figure`] with categorical x positions to a PNG file.
struct PngBackend<'a> {
    path: &'a Path,
    cfg: &'a PlotConfig,
}

impl<'a> PngBackend<'a> {
    fn new(path: &'a Path, cfg: &'a PlotConfig) -> Self {
        Self { path, cfg }
    }
}

impl PlotBackend for PngBackend<'_> {
    fn draw(&mut self, fig: &Figure) -> Result<()> {
        let root = BitMapBackend::new(self.path, (self.cfg.width, self.cfg.height))
            .into_drawing_area();
        root.fill(&WHITE)?;

        let x_max = fig.x.tick_labels.len().saturating_sub(1).max(1) as i32;
        let y_min = f64::from(self.cfg.y_min);
        let y_max = f64::from(self.cfg.y_max.max(self.cfg.y_min + 1));
        let y_ticks =
            (self.cfg.y_max.saturating_sub(self.cfg.y_min) / self.cfg.y_step.max(1) + 1) as usize;

        let mut chart = ChartBuilder::on(&root)
            .margin(10)
            .caption(
                fig.title.clone().unwrap_or_else(|| "Heart rate".into()),
                ("sans-serif", 20),
            )
            .x_label_area_size(110)
            .y_label_area_size(50)
            .build_cartesian_2d(0..x_max, y_min..y_max)?;

        let tick_labels = &fig.x.tick_labels;
        let x_formatter = |x: &i32| {
            usize::try_from(*x)
                .ok()
                .and_then(|i| tick_labels.get(i))
                .cloned()
                .unwrap_or_default()
        };
        chart
            .configure_mesh()
            .x_labels(tick_labels.len().max(2))
            .x_label_formatter(&x_formatter)
            .x_label_style(
                ("sans-serif", 12)
                    .into_font()
                    .transform(FontTransform::Rotate90),
            )
            .y_labels(y_ticks)
            .x_desc(fig.x.label.clone().unwrap_or_default())
            .y_desc(fig.y.label.clone().unwrap_or_default())
            .draw()?;

        for series in &fig.series {
            match series {
                Series::Line(line) => {
                    let (r, g, b) = line.style.color.rgb();
                    let color = RGBColor(r, g, b);
                    let points: Vec<(i32, f64)> =
                        line.points.iter().map(|p| (p[0] as i32, p[1])).collect();
                    chart
                        .draw_series(LineSeries::new(
                            points.iter().copied(),
                            color.stroke_width(line.style.width.round() as u32),
                        ))?
                        .label(line.name.clone())
                        .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
                    if line.style.markers {
                        chart.draw_series(
                            points
                                .iter()
                                .map(|&(x, y)| Circle::new((x, y), 3, color.filled())),
                        )?;
                    }
                }
            }
        }

        chart
            .configure_series_labels()
            .background_style(&WHITE.mix(0.8))
            .border_style(&BLACK)
            .draw()?;
        root.present()?;
        Ok(())
    }
}
