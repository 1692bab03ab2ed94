#![forbid(unsafe_code)]

//! Line-oriented renderers for headless runs.
//!
//! [`TextRenderer`] prints a short human-readable summary per frame;
//! [`JsonRenderer`] prints one JSON object per frame, status or log line so
//! the output can be piped into other tools.

use std::io::{self, Write};

use exo_core::earth::ReferenceBody;
use exo_core::{ComparisonRow, Extent, YearCount};
use exo_runtime::{
    ComparisonDetail, DashboardDetail, LoadStatus, OverviewDetail, Renderer, Scene, SceneDetail,
    SceneFrame, SceneState,
};
use serde::Serialize;

/// Histogram bars printed per text frame before eliding the rest.
const MAX_TEXT_BARS: usize = 12;
/// Record names listed per text frame.
const MAX_TEXT_NAMES: usize = 8;

/// Human-readable frame summaries.
pub struct TextRenderer<W: Write> {
    out: W,
    frames: u64,
}

impl<W: Write> TextRenderer<W> {
    pub fn new(out: W) -> Self {
        Self { out, frames: 0 }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn overview(&mut self, frame: &SceneFrame, detail: &OverviewDetail) -> io::Result<()> {
        let years = match (detail.years.first(), detail.years.last()) {
            (Some(first), Some(last)) => format!("{first}-{last}"),
            _ => "none".to_owned(),
        };
        writeln!(
            self.out,
            "  records {} | years {} | peak {} | habitable {} | sun-like hosts {}",
            frame.records.len(),
            years,
            detail.peak.unwrap_or(0),
            detail.habitable,
            detail.sun_like_hosts,
        )?;
        if let Some(year) = frame.state.focused_year {
            writeln!(self.out, "  focus year {year}")?;
        }
        if let Some(counts) = &frame.aggregates {
            writeln!(self.out, "  histogram {}", histogram_line(counts))?;
        }
        writeln!(
            self.out,
            "  temperature {} | eccentricity {}",
            extent(&detail.temperature),
            extent(&detail.eccentricity),
        )
    }

    fn comparison(&mut self, detail: &ComparisonDetail) -> io::Result<()> {
        for row in &detail.rows {
            writeln!(self.out, "  {}", comparison_line(row))?;
        }
        Ok(())
    }

    fn dashboard(&mut self, frame: &SceneFrame, detail: &DashboardDetail) -> io::Result<()> {
        writeln!(
            self.out,
            "  records {} | active filters {} | x {} {} | y {} {}",
            frame.records.len(),
            detail.filter.active_count(),
            detail.x,
            extent(&detail.x_domain),
            detail.y,
            extent(&detail.y_domain),
        )?;
        let query = detail.filter.name_query();
        if !query.trim().is_empty() {
            writeln!(self.out, "  name contains {query:?}")?;
        }
        if let Some(overlay) = &detail.earth_overlay {
            writeln!(
                self.out,
                "  earth overlay x {}..{} | y {}..{}",
                overlay.x.min, overlay.x.max, overlay.y.min, overlay.y.max
            )?;
        }
        let names = name_list(frame);
        if !names.is_empty() {
            writeln!(self.out, "  {names}")?;
        }
        Ok(())
    }
}

impl<W: Write> Renderer for TextRenderer<W> {
    fn render(&mut self, frame: &SceneFrame) -> io::Result<()> {
        self.frames += 1;
        let mut heading = format!("frame {} [{}] {}", self.frames, frame.scene, frame.scene.title());
        if let (Scene::Comparison, Some(record)) = (frame.scene, &frame.state.focused_record) {
            heading.push_str(": ");
            heading.push_str(record.name());
        }
        if frame.animate {
            heading.push_str(" (animated)");
        }
        writeln!(self.out, "{heading}")?;

        match &frame.detail {
            SceneDetail::Overview(detail) => self.overview(frame, detail)?,
            SceneDetail::Comparison(detail) => self.comparison(detail)?,
            SceneDetail::Dashboard(detail) => self.dashboard(frame, detail)?,
        }
        self.out.flush()
    }

    fn status(&mut self, status: &LoadStatus) -> io::Result<()> {
        match status {
            LoadStatus::Loading { source } => writeln!(self.out, "status: loading {source}")?,
            LoadStatus::Failed { reason } => writeln!(self.out, "status: load failed: {reason}")?,
        }
        self.out.flush()
    }

    fn log(&mut self, line: &str) -> io::Result<()> {
        writeln!(self.out, "log: {line}")
    }
}

fn extent(e: &Extent) -> String {
    format!("[{}, {}]", e.min, e.max)
}

fn histogram_line(counts: &[YearCount]) -> String {
    let mut parts: Vec<String> = counts
        .iter()
        .take(MAX_TEXT_BARS)
        .map(|c| format!("{}:{}", c.year, c.count))
        .collect();
    if counts.len() > MAX_TEXT_BARS {
        parts.push(format!("(+{} years)", counts.len() - MAX_TEXT_BARS));
    }
    parts.join(" ")
}

fn comparison_line(row: &ComparisonRow) -> String {
    let reference = if row.reference.is_point() {
        format!("{}", row.reference.min)
    } else {
        format!("{}..{}", row.reference.min, row.reference.max)
    };
    let body = match row.parameter.body() {
        ReferenceBody::Earth => "earth",
        ReferenceBody::HostStar => "sun",
    };
    let verdict = match row.within_reference() {
        Some(true) => "within",
        Some(false) => "outside",
        None => "no data",
    };
    let value = row
        .planet
        .map_or_else(|| "n/a".to_owned(), |v| v.to_string());
    format!(
        "{:<32} {:>10} vs {} {} ({})",
        row.parameter.label(),
        value,
        body,
        reference,
        verdict
    )
}

fn name_list(frame: &SceneFrame) -> String {
    let mut list = frame
        .records
        .iter()
        .take(MAX_TEXT_NAMES)
        .map(|r| r.name())
        .collect::<Vec<_>>()
        .join(", ");
    let more = frame.records.len().saturating_sub(MAX_TEXT_NAMES);
    if more > 0 {
        list.push_str(&format!(", (+{more} more)"));
    }
    list
}

/// One JSON object per line.
pub struct JsonRenderer<W: Write> {
    out: W,
    frames: u64,
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum JsonLine<'a> {
    Frame {
        seq: u64,
        scene: Scene,
        animate: bool,
        record_count: usize,
        names: Vec<&'a str>,
        #[serde(skip_serializing_if = "Option::is_none")]
        aggregates: Option<&'a [YearCount]>,
        state: &'a SceneState,
        detail: &'a SceneDetail,
    },
    Status(&'a LoadStatus),
    Log {
        line: &'a str,
    },
}

impl<W: Write> JsonRenderer<W> {
    pub fn new(out: W) -> Self {
        Self { out, frames: 0 }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn emit(&mut self, line: &JsonLine<'_>) -> io::Result<()> {
        serde_json::to_writer(&mut self.out, line).map_err(io::Error::other)?;
        self.out.write_all(b"\n")?;
        self.out.flush()
    }
}

impl<W: Write> Renderer for JsonRenderer<W> {
    fn render(&mut self, frame: &SceneFrame) -> io::Result<()> {
        self.frames += 1;
        let line = JsonLine::Frame {
            seq: self.frames,
            scene: frame.scene,
            animate: frame.animate,
            record_count: frame.records.len(),
            names: frame.records.iter().map(|r| r.name()).collect(),
            aggregates: frame.aggregates.as_deref(),
            state: &frame.state,
            detail: &frame.detail,
        };
        self.emit(&line)
    }

    fn status(&mut self, status: &LoadStatus) -> io::Result<()> {
        self.emit(&JsonLine::Status(status))
    }

    fn log(&mut self, line: &str) -> io::Result<()> {
        self.emit(&JsonLine::Log { line })
    }
}
