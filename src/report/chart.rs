//! Chart rendering.
//!
//! Charts are drawn into an RGB raster and encoded as PNG. The raster holds
//! no text: tick values and category names travel with the chart as
//! [`ChartLabel`]s in chart-relative coordinates and are typeset by the
//! document renderer on top of the image.

use crate::models::{GroupEntry, TimeSeries};
use image::{ImageFormat, ImageResult, Rgb, RgbImage};
use std::io::Cursor;

const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);
const AXIS: Rgb<u8> = Rgb([60, 60, 60]);
const GRID: Rgb<u8> = Rgb([205, 205, 205]);
const BAR: Rgb<u8> = Rgb([70, 130, 180]);
const LINE: Rgb<u8> = Rgb([31, 119, 180]);

/// Plot area insets in pixels: left, right, top, bottom.
const INSETS: (u32, u32, u32, u32) = (80, 24, 20, 56);

/// Maximum characters of a category label under a bar.
const MAX_LABEL_CHARS: usize = 14;

/// Horizontal anchoring of a label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
    Right,
}

/// Text placed over a chart; `x` and `y` are fractions of the chart size
/// measured from the top-left corner and mark the text baseline anchor.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartLabel {
    pub x: f32,
    pub y: f32,
    pub text: String,
    pub align: Align,
}

/// A rendered chart.
#[derive(Debug, Clone)]
pub struct Chart {
    pub title: String,
    pub width: u32,
    pub height: u32,
    /// 8-bit RGB PNG.
    pub png: Vec<u8>,
    pub labels: Vec<ChartLabel>,
}

/// Bar chart of group values, one bar per entry in the given order.
pub fn bar_chart(entries: &[GroupEntry], title: &str, width: u32, height: u32) -> ImageResult<Chart> {
    let mut canvas = Canvas::new(width, height);
    if entries.is_empty() {
        return canvas.finish_placeholder(title);
    }

    let values: Vec<f64> = entries.iter().map(|e| e.value).collect();
    let axis = canvas.draw_value_axis(&values);
    let (left, _, right, bottom) = canvas.plot_area();

    let slot = (right - left) as f64 / entries.len() as f64;
    let baseline = canvas.y_for(&axis, 0.0);
    for (i, entry) in entries.iter().enumerate() {
        let center = left as f64 + slot * (i as f64 + 0.5);
        let half = (slot * 0.3).max(1.0);
        let top = canvas.y_for(&axis, entry.value);
        canvas.fill_rect(
            (center - half) as i64,
            top.min(baseline),
            (center + half) as i64,
            top.max(baseline),
            BAR,
        );
        canvas.label(
            center as f32,
            bottom as f32 + 18.0,
            truncate(&entry.key, MAX_LABEL_CHARS),
            Align::Center,
        );
    }
    canvas.draw_frame();

    canvas.finish(title)
}

/// Line chart with point markers. Points are placed proportionally to
/// their date, so gaps in a sparse series stay visible.
pub fn line_chart(series: &TimeSeries, title: &str, width: u32, height: u32) -> ImageResult<Chart> {
    let mut canvas = Canvas::new(width, height);
    let (Some(first), Some(last)) = (series.points.first(), series.points.last()) else {
        return canvas.finish_placeholder(title);
    };

    let values: Vec<f64> = series.points.iter().map(|p| p.value).collect();
    let axis = canvas.draw_value_axis(&values);
    let (left, _, right, bottom) = canvas.plot_area();

    let span = (last.bucket - first.bucket).num_days() as f64;
    let x_for = |offset: i64| -> i64 {
        if span == 0.0 {
            (left + right) / 2
        } else {
            left + ((right - left) as f64 * offset as f64 / span).round() as i64
        }
    };

    let coords: Vec<(i64, i64)> = series
        .points
        .iter()
        .map(|p| {
            (
                x_for((p.bucket - first.bucket).num_days()),
                canvas.y_for(&axis, p.value),
            )
        })
        .collect();

    for pair in coords.windows(2) {
        canvas.line(pair[0], pair[1], LINE, 2);
    }
    for &(x, y) in &coords {
        canvas.disc(x, y, 4, LINE);
    }

    for idx in label_indices(series.points.len(), 6) {
        let (x, _) = coords[idx];
        canvas.label(
            x as f32,
            bottom as f32 + 18.0,
            series.points[idx].bucket.format("%Y-%m-%d").to_string(),
            Align::Center,
        );
    }
    canvas.draw_frame();

    canvas.finish(title)
}

/// Up to `max` evenly spread indices into `0..len`, always including the
/// first and the last.
fn label_indices(len: usize, max: usize) -> Vec<usize> {
    if len <= max {
        return (0..len).collect();
    }
    let mut indices: Vec<usize> = (0..max)
        .map(|i| ((len - 1) as f64 * i as f64 / (max - 1) as f64).round() as usize)
        .collect();
    indices.dedup();
    indices
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let mut cut: String = text.chars().take(max.saturating_sub(1)).collect();
        cut.push('~');
        cut
    }
}

/// Value range and tick step of the vertical axis.
struct ValueAxis {
    lo: f64,
    hi: f64,
    step: f64,
}

impl ValueAxis {
    /// A range that includes zero and the data, rounded out to tick steps.
    fn fit(values: &[f64]) -> Self {
        let lo = values.iter().copied().fold(0.0, f64::min);
        let mut hi = values.iter().copied().fold(0.0, f64::max);
        if hi - lo < f64::EPSILON {
            hi = lo + 1.0;
        }
        let step = nice_step((hi - lo) / 5.0);
        Self {
            lo: (lo / step).floor() * step,
            hi: (hi / step).ceil() * step,
            step,
        }
    }

    fn ticks(&self) -> Vec<f64> {
        let count = ((self.hi - self.lo) / self.step).round() as usize;
        (0..=count).map(|i| self.lo + self.step * i as f64).collect()
    }

    fn format(&self, value: f64) -> String {
        let decimals = if self.step >= 1.0 {
            0
        } else {
            (-self.step.log10()).ceil() as usize
        };
        format!("{:.*}", decimals, value)
    }
}

/// Round a raw step up to 1, 2 or 5 times a power of ten.
fn nice_step(raw: f64) -> f64 {
    let magnitude = 10f64.powf(raw.log10().floor());
    let normalized = raw / magnitude;
    let nice = if normalized <= 1.0 {
        1.0
    } else if normalized <= 2.0 {
        2.0
    } else if normalized <= 5.0 {
        5.0
    } else {
        10.0
    };
    nice * magnitude
}

struct Canvas {
    image: RgbImage,
    labels: Vec<ChartLabel>,
}

impl Canvas {
    fn new(width: u32, height: u32) -> Self {
        Self {
            image: RgbImage::from_pixel(width.max(1), height.max(1), BACKGROUND),
            labels: Vec::new(),
        }
    }

    /// Plot area as (left, top, right, bottom) pixel coordinates.
    fn plot_area(&self) -> (i64, i64, i64, i64) {
        let (l, r, t, b) = INSETS;
        let w = i64::from(self.image.width());
        let h = i64::from(self.image.height());
        (
            i64::from(l),
            i64::from(t),
            (w - i64::from(r)).max(i64::from(l) + 1),
            (h - i64::from(b)).max(i64::from(t) + 1),
        )
    }

    fn y_for(&self, axis: &ValueAxis, value: f64) -> i64 {
        let (_, top, _, bottom) = self.plot_area();
        let frac = (value - axis.lo) / (axis.hi - axis.lo);
        bottom - ((bottom - top) as f64 * frac).round() as i64
    }

    /// Grid lines and tick labels for the value range of `values`.
    fn draw_value_axis(&mut self, values: &[f64]) -> ValueAxis {
        let axis = ValueAxis::fit(values);
        let (left, _, right, _) = self.plot_area();
        for tick in axis.ticks() {
            let y = self.y_for(&axis, tick);
            self.dashed_hline(left, right, y, GRID);
            self.label(left as f32 - 8.0, y as f32 + 3.0, axis.format(tick), Align::Right);
        }
        axis
    }

    fn draw_frame(&mut self) {
        let (left, top, right, bottom) = self.plot_area();
        self.line((left, top), (left, bottom), AXIS, 1);
        self.line((left, bottom), (right, bottom), AXIS, 1);
    }

    fn label(&mut self, x: f32, y: f32, text: String, align: Align) {
        self.labels.push(ChartLabel {
            x: x / self.image.width() as f32,
            y: y / self.image.height() as f32,
            text,
            align,
        });
    }

    fn put(&mut self, x: i64, y: i64, color: Rgb<u8>) {
        if x >= 0 && y >= 0 && x < i64::from(self.image.width()) && y < i64::from(self.image.height())
        {
            self.image.put_pixel(x as u32, y as u32, color);
        }
    }

    fn fill_rect(&mut self, x0: i64, y0: i64, x1: i64, y1: i64, color: Rgb<u8>) {
        for y in y0..=y1 {
            for x in x0..=x1 {
                self.put(x, y, color);
            }
        }
    }

    fn dashed_hline(&mut self, x0: i64, x1: i64, y: i64, color: Rgb<u8>) {
        for x in x0..=x1 {
            if (x - x0) % 8 < 4 {
                self.put(x, y, color);
            }
        }
    }

    /// Bresenham line, stamped with a square brush of `thickness` pixels.
    fn line(&mut self, from: (i64, i64), to: (i64, i64), color: Rgb<u8>, thickness: i64) {
        let (mut x, mut y) = from;
        let dx = (to.0 - x).abs();
        let dy = -(to.1 - y).abs();
        let sx = if x < to.0 { 1 } else { -1 };
        let sy = if y < to.1 { 1 } else { -1 };
        let mut err = dx + dy;
        let reach = thickness / 2;
        loop {
            self.fill_rect(
                x - reach,
                y - reach,
                x - reach + thickness - 1,
                y - reach + thickness - 1,
                color,
            );
            if (x, y) == to {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
    }

    fn disc(&mut self, cx: i64, cy: i64, radius: i64, color: Rgb<u8>) {
        for y in -radius..=radius {
            for x in -radius..=radius {
                if x * x + y * y <= radius * radius {
                    self.put(cx + x, cy + y, color);
                }
            }
        }
    }

    fn finish_placeholder(mut self, title: &str) -> ImageResult<Chart> {
        self.draw_frame();
        let w = self.image.width() as f32;
        let h = self.image.height() as f32;
        self.label(w / 2.0, h / 2.0, "No data".to_string(), Align::Center);
        self.finish(title)
    }

    fn finish(self, title: &str) -> ImageResult<Chart> {
        let mut png = Vec::new();
        self.image
            .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)?;
        Ok(Chart {
            title: title.to_string(),
            width: self.image.width(),
            height: self.image.height(),
            png,
            labels: self.labels,
        })
    }
}
