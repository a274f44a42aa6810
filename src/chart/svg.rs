//! Minimal SVG figure builder: a titled grid of panels, each holding one
//! bar, histogram, pie, heatmap or text plot.

use std::fmt::{self, Write};

use crate::color::diverging;
use crate::config::ChartStyle;
use crate::report::fmt_int;
use crate::stats::Histogram;

const TITLE_BAND: f64 = 48.0;
const PANEL_TITLE: f64 = 36.0;
const RIGHT_MARGIN: f64 = 20.0;

// ---------------------------------------------------------------------------
// Figure
// ---------------------------------------------------------------------------

pub struct Figure<'a> {
    style: &'a ChartStyle,
    title: String,
    rows: usize,
    cols: usize,
    body: String,
}

impl<'a> Figure<'a> {
    pub fn new(style: &'a ChartStyle, title: &str, rows: usize, cols: usize) -> Self {
        Figure {
            style,
            title: title.to_string(),
            rows: rows.max(1),
            cols: cols.max(1),
            body: String::new(),
        }
    }

    pub fn width(&self) -> f64 {
        self.cols as f64 * self.style.panel_width
    }

    pub fn height(&self) -> f64 {
        TITLE_BAND + self.rows as f64 * self.style.panel_height
    }

    pub fn panel(&mut self, row: usize, col: usize) -> Panel<'_> {
        self.panel_span(row, col, 1)
    }

    /// A panel covering `span` grid columns starting at `col`.
    pub fn panel_span(&mut self, row: usize, col: usize, span: usize) -> Panel<'_> {
        let w = self.style.panel_width;
        let h = self.style.panel_height;
        Panel {
            out: &mut self.body,
            style: self.style,
            x: col as f64 * w,
            y: TITLE_BAND + row as f64 * h,
            w: w * span.max(1) as f64,
            h,
        }
    }

    pub fn finish(self) -> Result<String, fmt::Error> {
        let (w, h) = (self.width(), self.height());
        let style = self.style;
        let mut out = String::with_capacity(self.body.len() + 512);
        writeln!(
            out,
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\" font-family=\"{}\">",
            escape_svg(&style.font_family)
        )?;
        writeln!(
            out,
            "<rect x=\"0\" y=\"0\" width=\"{w}\" height=\"{h}\" fill=\"{}\"/>",
            style.background
        )?;
        writeln!(
            out,
            "<text x=\"{}\" y=\"{}\" font-size=\"{}\" font-weight=\"bold\" fill=\"{}\" text-anchor=\"middle\">{}</text>",
            w / 2.0,
            TITLE_BAND * 0.65,
            style.suptitle_size,
            style.text,
            escape_svg(&self.title)
        )?;
        out.push_str(&self.body);
        writeln!(out, "</svg>")?;
        Ok(out)
    }
}

// ---------------------------------------------------------------------------
// Plot inputs
// ---------------------------------------------------------------------------

/// Bars along a category axis.
#[derive(Debug, Default)]
pub struct Bars<'a> {
    pub labels: &'a [String],
    pub values: &'a [f64],
    /// One per bar; cycled when shorter.
    pub colors: &'a [String],
    /// Symmetric error per bar, drawn as whiskers.
    pub errors: Option<&'a [f64]>,
    /// Text drawn at the end of each bar.
    pub annotations: Option<&'a [String]>,
    pub log_scale: bool,
    pub value_label: &'a str,
}

#[derive(Debug, Clone)]
pub struct Series {
    pub name: String,
    pub color: String,
    pub values: Vec<f64>,
}

#[derive(Debug, Clone)]
pub struct Marker {
    pub label: String,
    pub value: f64,
    pub color: String,
}

#[derive(Debug, Clone)]
pub struct Slice {
    pub label: String,
    pub value: f64,
    pub color: String,
}

// ---------------------------------------------------------------------------
// Panel
// ---------------------------------------------------------------------------

pub struct Panel<'a> {
    out: &'a mut String,
    style: &'a ChartStyle,
    x: f64,
    y: f64,
    w: f64,
    h: f64,
}

struct Area {
    left: f64,
    top: f64,
    w: f64,
    h: f64,
}

impl Area {
    fn bottom(&self) -> f64 {
        self.top + self.h
    }

    fn right(&self) -> f64 {
        self.left + self.w
    }
}

/// Value → position mapping along one axis.
#[derive(Clone, Copy)]
enum Scale {
    Linear { min: f64, max: f64 },
    Log { lo: f64, hi: f64 },
}

impl Scale {
    fn linear_from_zero(max: f64, ticks: usize) -> (Scale, Vec<f64>) {
        let max = if max > 0.0 { max } else { 1.0 };
        let (start, step, count) = nice_ticks(0.0, max, ticks);
        let values: Vec<f64> = (0..count).map(|i| start + step * i as f64).collect();
        let top = values.last().copied().unwrap_or(max).max(max);
        (Scale::Linear { min: 0.0, max: top }, values)
    }

    /// Decades covering every positive value.
    fn log(values: &[f64]) -> (Scale, Vec<f64>) {
        let positive = values.iter().copied().filter(|v| *v > 0.0);
        let min = positive.clone().fold(f64::INFINITY, f64::min);
        let max = positive.fold(f64::NEG_INFINITY, f64::max);
        if !min.is_finite() || !max.is_finite() {
            return Scale::linear_from_zero(1.0, 2);
        }
        let lo = min.log10().floor();
        let hi = max.log10().ceil().max(lo + 1.0);
        let ticks = (lo as i32..=hi as i32).map(|k| 10f64.powi(k)).collect();
        (Scale::Log { lo, hi }, ticks)
    }

    /// Fraction of the axis length, clamped to `[0, 1]`.
    fn frac(&self, v: f64) -> f64 {
        let f = match *self {
            Scale::Linear { min, max } => (v - min) / (max - min).max(1e-12),
            Scale::Log { lo, hi } => {
                if v <= 0.0 {
                    0.0
                } else {
                    (v.log10() - lo) / (hi - lo).max(1e-12)
                }
            }
        };
        f.clamp(0.0, 1.0)
    }
}

impl Panel<'_> {
    fn title(&mut self, title: &str) -> fmt::Result {
        writeln!(
            self.out,
            "<text x=\"{}\" y=\"{}\" font-size=\"{}\" font-weight=\"bold\" fill=\"{}\" text-anchor=\"middle\">{}</text>",
            self.x + self.w / 2.0,
            self.y + 22.0,
            self.style.title_size,
            self.style.text,
            escape_svg(title)
        )
    }

    fn area(&self, left: f64, bottom: f64) -> Area {
        Area {
            left: self.x + left,
            top: self.y + PANEL_TITLE,
            w: (self.w - left - RIGHT_MARGIN).max(10.0),
            h: (self.h - PANEL_TITLE - bottom).max(10.0),
        }
    }

    fn frame(&mut self, a: &Area) -> fmt::Result {
        writeln!(
            self.out,
            "<rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" fill=\"none\" stroke=\"{}\"/>",
            a.left, a.top, a.w, a.h, self.style.grid
        )
    }

    fn text(&mut self, x: f64, y: f64, size: f64, anchor: &str, fill: &str, body: &str) -> fmt::Result {
        writeln!(
            self.out,
            "<text x=\"{x}\" y=\"{y}\" font-size=\"{size}\" fill=\"{fill}\" text-anchor=\"{anchor}\" dominant-baseline=\"middle\">{}</text>",
            escape_svg(body)
        )
    }

    /// Title plus a centered "(no data)" note.
    pub fn empty(&mut self, title: &str) -> fmt::Result {
        self.title(title)?;
        let fill = self.style.text.clone();
        self.text(
            self.x + self.w / 2.0,
            self.y + self.h / 2.0,
            self.style.font_size,
            "middle",
            &fill,
            "(no data)",
        )
    }

    fn value_ticks(&mut self, a: &Area, scale: Scale, ticks: &[f64], vertical: bool) -> fmt::Result {
        let size = self.style.font_size * 0.85;
        let grid = self.style.grid.clone();
        let fill = self.style.text.clone();
        for &v in ticks {
            let f = scale.frac(v);
            if vertical {
                let y = a.bottom() - f * a.h;
                writeln!(
                    self.out,
                    "<line x1=\"{}\" y1=\"{y}\" x2=\"{}\" y2=\"{y}\" stroke=\"{grid}\"/>",
                    a.left,
                    a.right()
                )?;
                self.text(a.left - 4.0, y, size, "end", &fill, &fmt_tick(v))?;
            } else {
                let x = a.left + f * a.w;
                writeln!(
                    self.out,
                    "<line x1=\"{x}\" y1=\"{}\" x2=\"{x}\" y2=\"{}\" stroke=\"{grid}\"/>",
                    a.top,
                    a.bottom()
                )?;
                self.text(x, a.bottom() + 10.0, size, "middle", &fill, &fmt_tick(v))?;
            }
        }
        Ok(())
    }

    fn axis_label(&mut self, a: &Area, label: &str, vertical: bool) -> fmt::Result {
        if label.is_empty() {
            return Ok(());
        }
        let size = self.style.font_size;
        let fill = self.style.text.clone();
        if vertical {
            let (x, y) = (self.x + 14.0, a.top + a.h / 2.0);
            writeln!(
                self.out,
                "<text x=\"{x}\" y=\"{y}\" font-size=\"{size}\" fill=\"{fill}\" text-anchor=\"middle\" transform=\"rotate(-90 {x} {y})\">{}</text>",
                escape_svg(label)
            )
        } else {
            self.text(a.left + a.w / 2.0, self.y + self.h - 10.0, size, "middle", &fill, label)
        }
    }

    /// Category names under slots of width `slot`, rotated when crowded.
    fn category_labels(&mut self, a: &Area, labels: &[String], slot: f64) -> fmt::Result {
        let size = self.style.font_size * 0.85;
        let fill = self.style.text.clone();
        let rotate = rotate_labels(labels, slot, size);
        for (i, label) in labels.iter().enumerate() {
            let x = a.left + slot * (i as f64 + 0.5);
            let y = a.bottom() + 12.0;
            if rotate {
                writeln!(
                    self.out,
                    "<text x=\"{x}\" y=\"{y}\" font-size=\"{size}\" fill=\"{fill}\" text-anchor=\"end\" transform=\"rotate(-35 {x} {y})\">{}</text>",
                    escape_svg(label)
                )?;
            } else {
                self.text(x, y, size, "middle", &fill, label)?;
            }
        }
        Ok(())
    }

    fn legend(&mut self, a: &Area, entries: &[(String, String)]) -> fmt::Result {
        let size = self.style.font_size * 0.85;
        let fill = self.style.text.clone();
        let x = a.right() - 130.0;
        for (i, (label, color)) in entries.iter().enumerate() {
            let y = a.top + 10.0 + i as f64 * (size + 6.0);
            writeln!(
                self.out,
                "<rect x=\"{x}\" y=\"{}\" width=\"10\" height=\"10\" fill=\"{color}\"/>",
                y - 5.0
            )?;
            self.text(x + 14.0, y, size, "start", &fill, label)?;
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Plots
    // -----------------------------------------------------------------------

    /// Vertical bars, one per label.
    pub fn bars(&mut self, title: &str, bars: &Bars) -> fmt::Result {
        if bars.labels.is_empty() {
            return self.empty(title);
        }
        self.title(title)?;
        let n = bars.labels.len();
        let rotate = rotate_labels(bars.labels, (self.w - 80.0) / n as f64, self.style.font_size);
        let a = self.area(64.0, if rotate { 90.0 } else { 44.0 });
        self.frame(&a)?;

        let tops: Vec<f64> = bars
            .values
            .iter()
            .enumerate()
            .map(|(i, v)| v + bars.errors.and_then(|e| e.get(i)).copied().unwrap_or(0.0))
            .collect();
        let (scale, ticks) = if bars.log_scale {
            Scale::log(bars.values)
        } else {
            Scale::linear_from_zero(tops.iter().copied().fold(0.0, f64::max), 5)
        };
        self.value_ticks(&a, scale, &ticks, true)?;

        let slot = a.w / n as f64;
        for (i, &v) in bars.values.iter().enumerate().take(n) {
            let height = scale.frac(v) * a.h;
            let x = a.left + slot * i as f64 + slot * 0.15;
            writeln!(
                self.out,
                "<rect x=\"{x}\" y=\"{}\" width=\"{}\" height=\"{height}\" fill=\"{}\"/>",
                a.bottom() - height,
                slot * 0.7,
                cycle(bars.colors, i)
            )?;
            let center = x + slot * 0.35;
            let mut label_y = a.bottom() - height - 8.0;
            if let Some(err) = bars.errors.and_then(|e| e.get(i)).copied() {
                let y_hi = a.bottom() - scale.frac(v + err) * a.h;
                let y_lo = a.bottom() - scale.frac(v - err) * a.h;
                writeln!(
                    self.out,
                    "<line x1=\"{center}\" y1=\"{y_lo}\" x2=\"{center}\" y2=\"{y_hi}\" stroke=\"{}\" stroke-width=\"1.2\"/>",
                    self.style.text
                )?;
                for y in [y_lo, y_hi] {
                    writeln!(
                        self.out,
                        "<line x1=\"{}\" y1=\"{y}\" x2=\"{}\" y2=\"{y}\" stroke=\"{}\" stroke-width=\"1.2\"/>",
                        center - 5.0,
                        center + 5.0,
                        self.style.text
                    )?;
                }
                label_y = y_hi - 8.0;
            }
            if let Some(text) = bars.annotations.and_then(|t| t.get(i)) {
                let (size, fill) = (self.style.font_size * 0.8, self.style.text.clone());
                self.text(center, label_y, size, "middle", &fill, text)?;
            }
        }
        self.category_labels(&a, bars.labels, slot)?;
        self.axis_label(&a, bars.value_label, true)
    }

    /// Horizontal bars, first label on top.
    pub fn hbars(&mut self, title: &str, bars: &Bars) -> fmt::Result {
        if bars.labels.is_empty() {
            return self.empty(title);
        }
        self.title(title)?;
        let longest = bars.labels.iter().map(|l| l.chars().count()).max().unwrap_or(0);
        let left = (longest as f64 * self.style.font_size * 0.55 + 16.0).clamp(60.0, self.w * 0.4);
        let a = self.area(left, 40.0);
        self.frame(&a)?;

        let max = bars.values.iter().copied().fold(0.0, f64::max);
        let (scale, ticks) = Scale::linear_from_zero(max * 1.1, 5);
        self.value_ticks(&a, scale, &ticks, false)?;

        let n = bars.labels.len();
        let slot = a.h / n as f64;
        let size = self.style.font_size * 0.85;
        let fill = self.style.text.clone();
        for (i, label) in bars.labels.iter().enumerate() {
            let v = bars.values.get(i).copied().unwrap_or(0.0);
            let width = scale.frac(v) * a.w;
            let y = a.top + slot * i as f64 + slot * 0.15;
            writeln!(
                self.out,
                "<rect x=\"{}\" y=\"{y}\" width=\"{width}\" height=\"{}\" fill=\"{}\"/>",
                a.left,
                slot * 0.7,
                cycle(bars.colors, i)
            )?;
            let center = y + slot * 0.35;
            self.text(a.left - 6.0, center, size, "end", &fill, label)?;
            if let Some(text) = bars.annotations.and_then(|t| t.get(i)) {
                self.text(a.left + width + 4.0, center, size * 0.95, "start", &fill, text)?;
            }
        }
        self.axis_label(&a, bars.value_label, false)
    }

    /// Side-by-side bars: one cluster per group, one bar per series.
    pub fn grouped_bars(&mut self, title: &str, groups: &[String], series: &[Series], value_label: &str) -> fmt::Result {
        if groups.is_empty() || series.is_empty() {
            return self.empty(title);
        }
        self.title(title)?;
        let rotate = rotate_labels(groups, (self.w - 80.0) / groups.len() as f64, self.style.font_size);
        let a = self.area(64.0, if rotate { 90.0 } else { 44.0 });
        self.frame(&a)?;

        let max = series
            .iter()
            .flat_map(|s| s.values.iter().copied())
            .fold(0.0, f64::max);
        let (scale, ticks) = Scale::linear_from_zero(max * 1.15, 5);
        self.value_ticks(&a, scale, &ticks, true)?;

        let slot = a.w / groups.len() as f64;
        let bar_w = slot * 0.8 / series.len() as f64;
        for (g, _) in groups.iter().enumerate() {
            for (k, s) in series.iter().enumerate() {
                let v = s.values.get(g).copied().unwrap_or(0.0);
                let height = scale.frac(v) * a.h;
                let x = a.left + slot * g as f64 + slot * 0.1 + bar_w * k as f64;
                writeln!(
                    self.out,
                    "<rect x=\"{x}\" y=\"{}\" width=\"{bar_w}\" height=\"{height}\" fill=\"{}\"/>",
                    a.bottom() - height,
                    s.color
                )?;
            }
        }
        self.category_labels(&a, groups, slot)?;
        let entries: Vec<(String, String)> = series
            .iter()
            .map(|s| (s.name.clone(), s.color.clone()))
            .collect();
        self.legend(&a, &entries)?;
        self.axis_label(&a, value_label, true)
    }

    /// Histogram bars with optional dashed vertical markers.
    pub fn histogram(
        &mut self,
        title: &str,
        hist: Option<&Histogram>,
        color: &str,
        markers: &[Marker],
        x_label: &str,
    ) -> fmt::Result {
        let Some(hist) = hist else {
            return self.empty(title);
        };
        self.title(title)?;
        let a = self.area(64.0, 48.0);
        self.frame(&a)?;

        let max = hist.counts.iter().copied().max().unwrap_or(0) as f64;
        let (scale, ticks) = Scale::linear_from_zero(max, 5);
        self.value_ticks(&a, scale, &ticks, true)?;
        let x_scale = Scale::Linear {
            min: hist.start,
            max: hist.end,
        };
        if hist.end - hist.start > 1e-9 {
            let (start, step, count) = nice_ticks(hist.start, hist.end, 6);
            let x_ticks: Vec<f64> = (0..count)
                .map(|i| start + step * i as f64)
                .filter(|v| *v >= hist.start - 1e-9 && *v <= hist.end + 1e-9)
                .collect();
            self.value_ticks(&a, x_scale, &x_ticks, false)?;
        }

        let bin_w = a.w / hist.counts.len().max(1) as f64;
        for (lower, count) in hist.bins() {
            let height = scale.frac(count as f64) * a.h;
            writeln!(
                self.out,
                "<rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{height}\" fill=\"{color}\" stroke=\"{}\" stroke-width=\"0.5\"/>",
                a.left + x_scale.frac(lower) * a.w,
                a.bottom() - height,
                bin_w.max(1.0),
                self.style.background
            )?;
        }

        for m in markers {
            let x = a.left + x_scale.frac(m.value) * a.w;
            writeln!(
                self.out,
                "<line x1=\"{x}\" y1=\"{}\" x2=\"{x}\" y2=\"{}\" stroke=\"{}\" stroke-width=\"2\" stroke-dasharray=\"6 4\"/>",
                a.top,
                a.bottom(),
                m.color
            )?;
        }
        let entries: Vec<(String, String)> = markers
            .iter()
            .map(|m| (m.label.clone(), m.color.clone()))
            .collect();
        self.legend(&a, &entries)?;
        self.axis_label(&a, x_label, false)?;
        self.axis_label(&a, "Count", true)
    }

    /// Pie with percentage labels; zero slices are skipped.
    pub fn pie(&mut self, title: &str, slices: &[Slice]) -> fmt::Result {
        let total: f64 = slices.iter().map(|s| s.value.max(0.0)).sum();
        if total <= 0.0 {
            return self.empty(title);
        }
        self.title(title)?;
        let cx = self.x + self.w / 2.0;
        let cy = self.y + PANEL_TITLE + (self.h - PANEL_TITLE) / 2.0;
        let r = ((self.w.min(self.h - PANEL_TITLE)) / 2.0 - 48.0).max(20.0);
        let size = self.style.font_size * 0.85;
        let fill = self.style.text.clone();

        let visible: Vec<&Slice> = slices.iter().filter(|s| s.value > 0.0).collect();
        if visible.len() == 1 {
            let s = visible[0];
            writeln!(self.out, "<circle cx=\"{cx}\" cy=\"{cy}\" r=\"{r}\" fill=\"{}\"/>", s.color)?;
            self.text(cx, cy, size, "middle", &fill, "100.0%")?;
            return self.text(cx, cy + r + 14.0, size, "middle", &fill, &s.label);
        }

        // Start at twelve o'clock, clockwise.
        let mut angle = -std::f64::consts::FRAC_PI_2;
        for s in visible {
            let sweep = s.value / total * std::f64::consts::TAU;
            let end = angle + sweep;
            let (x0, y0) = (cx + r * angle.cos(), cy + r * angle.sin());
            let (x1, y1) = (cx + r * end.cos(), cy + r * end.sin());
            let large = if sweep > std::f64::consts::PI { 1 } else { 0 };
            writeln!(
                self.out,
                "<path d=\"M {cx} {cy} L {x0} {y0} A {r} {r} 0 {large} 1 {x1} {y1} Z\" fill=\"{}\" stroke=\"{}\" stroke-width=\"1.5\"/>",
                s.color, self.style.background
            )?;
            let mid = angle + sweep / 2.0;
            let pct = format!("{:.1}%", s.value / total * 100.0);
            self.text(cx + r * 0.65 * mid.cos(), cy + r * 0.65 * mid.sin(), size, "middle", &fill, &pct)?;
            let anchor = if mid.cos() >= 0.0 { "start" } else { "end" };
            self.text(
                cx + (r + 10.0) * mid.cos(),
                cy + (r + 10.0) * mid.sin(),
                size,
                anchor,
                &fill,
                &s.label,
            )?;
            angle = end;
        }
        Ok(())
    }

    /// Square matrix in `[-1, 1]`, annotated; `None` cells are greyed out.
    pub fn heatmap(&mut self, title: &str, labels: &[String], values: &[Vec<Option<f64>>]) -> fmt::Result {
        if labels.is_empty() {
            return self.empty(title);
        }
        self.title(title)?;
        let longest = labels.iter().map(|l| l.chars().count()).max().unwrap_or(0);
        let margin = longest as f64 * self.style.font_size * 0.55 + 16.0;
        let a = self.area(margin, margin);
        let n = labels.len() as f64;
        let cell = (a.w / n).min(a.h / n);
        let size = self.style.font_size * 0.85;
        let fill = self.style.text.clone();

        for (i, row) in values.iter().enumerate() {
            for (j, v) in row.iter().enumerate() {
                let x = a.left + cell * j as f64;
                let y = a.top + cell * i as f64;
                let color = match v {
                    Some(v) => diverging(*v),
                    None => self.style.grid.clone(),
                };
                writeln!(
                    self.out,
                    "<rect x=\"{x}\" y=\"{y}\" width=\"{cell}\" height=\"{cell}\" fill=\"{color}\" stroke=\"{}\"/>",
                    self.style.background
                )?;
                let text = match v {
                    Some(v) => format!("{v:.2}"),
                    None => "n/a".to_string(),
                };
                self.text(x + cell / 2.0, y + cell / 2.0, size, "middle", &fill, &text)?;
            }
        }
        for (i, label) in labels.iter().enumerate() {
            let y = a.top + cell * (i as f64 + 0.5);
            self.text(a.left - 6.0, y, size, "end", &fill, label)?;
            let x = a.left + cell * (i as f64 + 0.5);
            let yb = a.top + cell * n + 12.0;
            writeln!(
                self.out,
                "<text x=\"{x}\" y=\"{yb}\" font-size=\"{size}\" fill=\"{fill}\" text-anchor=\"end\" transform=\"rotate(-45 {x} {yb})\">{}</text>",
                escape_svg(label)
            )?;
        }
        Ok(())
    }

    /// Big number with a caption underneath.
    pub fn stat_tile(&mut self, title: &str, value: &str, caption: &str, color: &str) -> fmt::Result {
        self.title(title)?;
        writeln!(
            self.out,
            "<rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" rx=\"10\" fill=\"{color}\" fill-opacity=\"0.12\" stroke=\"{color}\"/>",
            self.x + 16.0,
            self.y + PANEL_TITLE,
            self.w - 32.0,
            self.h - PANEL_TITLE - 16.0
        )?;
        let cx = self.x + self.w / 2.0;
        let body = self.y + PANEL_TITLE + (self.h - PANEL_TITLE - 16.0) / 2.0;
        writeln!(
            self.out,
            "<text x=\"{cx}\" y=\"{}\" font-size=\"{}\" font-weight=\"bold\" fill=\"{color}\" text-anchor=\"middle\" dominant-baseline=\"middle\">{}</text>",
            body - 10.0,
            self.style.suptitle_size * 2.2,
            escape_svg(value)
        )?;
        let (size, fill) = (self.style.font_size, self.style.text.clone());
        self.text(cx, body + self.style.suptitle_size * 1.6, size, "middle", &fill, caption)
    }

    /// One line per entry, each in its own color.
    pub fn text_list(&mut self, title: &str, lines: &[(String, String)]) -> fmt::Result {
        self.title(title)?;
        let size = self.style.font_size * 1.1;
        for (i, (line, color)) in lines.iter().enumerate() {
            let y = self.y + PANEL_TITLE + 24.0 + i as f64 * (size + 14.0);
            self.text(self.x + 24.0, y, size, "start", color, line)?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn cycle(colors: &[String], i: usize) -> &str {
    if colors.is_empty() {
        "#808080"
    } else {
        &colors[i % colors.len()]
    }
}

fn rotate_labels(labels: &[String], slot: f64, size: f64) -> bool {
    labels
        .iter()
        .any(|l| l.chars().count() as f64 * size * 0.6 > slot)
}

pub fn nice_ticks(min: f64, max: f64, ticks: usize) -> (f64, f64, usize) {
    let range = (max - min).abs().max(1e-9);
    let rough = range / (ticks.max(2) as f64 - 1.0);
    let mag = 10f64.powf(rough.abs().log10().floor());
    let norm = rough / mag;
    let step = if norm <= 1.0 {
        1.0
    } else if norm <= 2.0 {
        2.0
    } else if norm <= 5.0 {
        5.0
    } else {
        10.0
    } * mag;
    let start = (min / step).floor() * step;
    let end = (max / step).ceil() * step;
    let count = ((end - start) / step).round() as usize + 1;
    (start, step, count)
}

pub fn fmt_tick(v: f64) -> String {
    if v.abs() >= 1000.0 && (v - v.round()).abs() < 0.001 {
        let s = fmt_int(v.abs().round() as usize);
        if v < 0.0 {
            format!("-{s}")
        } else {
            s
        }
    } else if (v - v.round()).abs() < 0.001 {
        format!("{}", v.round() as i64)
    } else if v.abs() < 10.0 {
        format!("{:.2}", v)
    } else {
        format!("{:.1}", v)
    }
}

pub fn escape_svg(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    out
}
