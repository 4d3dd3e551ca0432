// Chart renderer - Turns a series into an ordered list of draw commands
use crate::domain::chart::{
    date_label_count, date_label_stride, ChartFrame, Color, DrawCommand, GradientStop,
    LinearGradient, Point, Stroke, TextAnchor, ValueRange, RANGE_PADDING,
};
use crate::domain::telemetry::{Channel, Sample, Series};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::f64::consts::FRAC_PI_4;
use std::ops::Range;

pub const EMPTY_CHART_MESSAGE: &str = "No data available for chart";
pub const NO_VALID_READINGS_MESSAGE: &str = "No valid readings to chart";

const FILL_TOP_ALPHA: f64 = 0.4;
const FILL_BOTTOM_ALPHA: f64 = 0.05;
const VALUE_LABEL_X: f64 = 5.0;
const DATE_LABEL_OFFSET: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Dimensions {
    pub width: f64,
    pub height: f64,
}

impl Dimensions {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

impl Default for Dimensions {
    fn default() -> Self {
        Self::new(600.0, 300.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartStyle {
    pub channel: Channel,
    pub grid_line_count: usize,
    pub line_color: Color,
    pub anomaly_color: Color,
    pub marker_stroke: Color,
    pub axis_color: Color,
    pub grid_color: Color,
    pub label_color: Color,
    pub font: String,
    pub marker_radius: f64,
    pub point_radius: f64,
    pub line_width: f64,
    pub padding_x: f64,
    pub padding_y: f64,
}

impl Default for ChartStyle {
    fn default() -> Self {
        Self {
            channel: Channel::WaterLevel,
            grid_line_count: 5,
            line_color: Color::rgb(59, 130, 246),
            anomaly_color: Color::rgb(239, 68, 68),
            marker_stroke: Color::WHITE,
            axis_color: Color::rgb(148, 163, 184),
            grid_color: Color::rgb(203, 213, 225).with_alpha(0.5),
            label_color: Color::rgb(100, 116, 139),
            font: "10px Poppins, sans-serif".to_string(),
            marker_radius: 6.0,
            point_radius: 3.0,
            line_width: 2.0,
            padding_x: 40.0,
            padding_y: 30.0,
        }
    }
}

impl ChartStyle {
    pub fn for_channel(&self, channel: Channel) -> Self {
        Self {
            channel,
            ..self.clone()
        }
    }
}

/// A sample left out of the chart because its value on the charted channel
/// is not a finite number.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RenderSkip {
    pub index: usize,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartRender {
    pub channel: Channel,
    pub dimensions: Dimensions,
    pub frame: Option<ChartFrame>,
    pub commands: Vec<DrawCommand>,
    pub skipped: Vec<RenderSkip>,
}

/// Render `series` onto a `dims`-sized surface.
///
/// Never fails: an empty series, or one without a single finite reading,
/// yields a placeholder message; invalid readings become gaps in the line.
pub fn render_chart(series: &Series, dims: Dimensions, style: &ChartStyle) -> ChartRender {
    let samples = series.samples();
    let mut commands = vec![DrawCommand::Clear {
        width: dims.width,
        height: dims.height,
    }];

    let values: Vec<f64> = samples.iter().map(|s| s.value(style.channel)).collect();
    let skipped: Vec<RenderSkip> = samples
        .iter()
        .zip(&values)
        .enumerate()
        .filter(|(_, (_, v))| !v.is_finite())
        .map(|(index, (sample, _))| RenderSkip {
            index,
            timestamp: sample.timestamp,
        })
        .collect();

    if !skipped.is_empty() {
        tracing::debug!(
            "Skipping {} of {} samples with invalid {:?} readings",
            skipped.len(),
            samples.len(),
            style.channel
        );
    }

    let observed = if samples.is_empty() {
        None
    } else {
        ValueRange::observed(values.iter().copied())
    };

    let Some(observed) = observed else {
        let message = if samples.is_empty() {
            EMPTY_CHART_MESSAGE
        } else {
            NO_VALID_READINGS_MESSAGE
        };
        commands.push(placeholder(message, dims, style));
        return ChartRender {
            channel: style.channel,
            dimensions: dims,
            frame: None,
            commands,
            skipped,
        };
    };

    let frame = ChartFrame::new(
        dims.width,
        dims.height,
        style.padding_x,
        style.padding_y,
        observed.padded(RANGE_PADDING),
        samples.len(),
    );
    let runs = valid_runs(&values);

    draw_axes(&frame, style, &mut commands);
    draw_value_gridlines(&frame, style, &mut commands);
    draw_date_labels(&frame, samples, style, &mut commands);
    draw_area_fill(&frame, &values, &runs, style, &mut commands);
    draw_series_line(&frame, &values, &runs, style, &mut commands);
    draw_anomaly_markers(&frame, samples, &values, style, &mut commands);

    ChartRender {
        channel: style.channel,
        dimensions: dims,
        frame: Some(frame),
        commands,
        skipped,
    }
}

/// Maximal index ranges of consecutive finite values.
fn valid_runs(values: &[f64]) -> Vec<Range<usize>> {
    let mut runs = Vec::new();
    let mut start = None;

    for (i, v) in values.iter().enumerate() {
        match (v.is_finite(), start) {
            (true, None) => start = Some(i),
            (false, Some(s)) => {
                runs.push(s..i);
                start = None;
            }
            _ => {}
        }
    }
    if let Some(s) = start {
        runs.push(s..values.len());
    }

    runs
}

fn placeholder(message: &str, dims: Dimensions, style: &ChartStyle) -> DrawCommand {
    DrawCommand::Text {
        position: Point::new(dims.width / 2.0, dims.height / 2.0),
        text: message.to_string(),
        color: style.label_color,
        font: style.font.clone(),
        rotation: 0.0,
        anchor: TextAnchor::Middle,
    }
}

fn draw_axes(frame: &ChartFrame, style: &ChartStyle, commands: &mut Vec<DrawCommand>) {
    commands.push(DrawCommand::Polyline {
        points: vec![
            Point::new(frame.padding_x, frame.padding_y),
            Point::new(frame.padding_x, frame.baseline()),
            Point::new(frame.right(), frame.baseline()),
        ],
        stroke: Stroke::new(style.axis_color, 1.0),
    });
}

fn draw_value_gridlines(frame: &ChartFrame, style: &ChartStyle, commands: &mut Vec<DrawCommand>) {
    let count = style.grid_line_count.max(1);
    let unit = style.channel.unit();

    for i in 0..=count {
        let t = i as f64 / count as f64;
        let y = frame.y_at_fraction(t);

        commands.push(DrawCommand::Text {
            position: Point::new(VALUE_LABEL_X, y + 3.0),
            text: format!("{:.1} {}", frame.range.lerp(t), unit),
            color: style.label_color,
            font: style.font.clone(),
            rotation: 0.0,
            anchor: TextAnchor::Start,
        });
        commands.push(DrawCommand::Line {
            from: Point::new(frame.padding_x, y),
            to: Point::new(frame.right(), y),
            stroke: Stroke::new(style.grid_color, 1.0),
        });
    }
}

fn draw_date_labels(
    frame: &ChartFrame,
    samples: &[Sample],
    style: &ChartStyle,
    commands: &mut Vec<DrawCommand>,
) {
    let stride = date_label_stride(samples.len());
    commands.reserve(date_label_count(samples.len()));

    for (i, sample) in samples.iter().enumerate().step_by(stride) {
        commands.push(DrawCommand::Text {
            position: Point::new(frame.x_at(i), frame.baseline() + DATE_LABEL_OFFSET),
            text: sample.timestamp.format("%-m/%-d/%Y").to_string(),
            color: style.label_color,
            font: style.font.clone(),
            rotation: FRAC_PI_4,
            anchor: TextAnchor::Start,
        });
    }
}

fn draw_area_fill(
    frame: &ChartFrame,
    values: &[f64],
    runs: &[Range<usize>],
    style: &ChartStyle,
    commands: &mut Vec<DrawCommand>,
) {
    let gradient = LinearGradient {
        start: Point::new(0.0, frame.padding_y),
        end: Point::new(0.0, frame.baseline()),
        stops: vec![
            GradientStop {
                offset: 0.0,
                color: style.line_color.with_alpha(FILL_TOP_ALPHA),
            },
            GradientStop {
                offset: 1.0,
                color: style.line_color.with_alpha(FILL_BOTTOM_ALPHA),
            },
        ],
    };

    for run in runs.iter().filter(|r| r.len() >= 2) {
        let mut points = Vec::with_capacity(run.len() + 2);
        points.push(Point::new(frame.x_at(run.start), frame.baseline()));
        points.extend(run.clone().map(|i| frame.point(i, values[i])));
        points.push(Point::new(frame.x_at(run.end - 1), frame.baseline()));

        commands.push(DrawCommand::FillPolygon {
            points,
            gradient: gradient.clone(),
        });
    }
}

fn draw_series_line(
    frame: &ChartFrame,
    values: &[f64],
    runs: &[Range<usize>],
    style: &ChartStyle,
    commands: &mut Vec<DrawCommand>,
) {
    for run in runs {
        if run.len() == 1 {
            commands.push(DrawCommand::Circle {
                center: frame.point(run.start, values[run.start]),
                radius: style.point_radius,
                fill: Some(style.line_color),
                stroke: None,
            });
            continue;
        }

        commands.push(DrawCommand::Polyline {
            points: run.clone().map(|i| frame.point(i, values[i])).collect(),
            stroke: Stroke::new(style.line_color, style.line_width),
        });
    }
}

fn draw_anomaly_markers(
    frame: &ChartFrame,
    samples: &[Sample],
    values: &[f64],
    style: &ChartStyle,
    commands: &mut Vec<DrawCommand>,
) {
    for (i, (sample, value)) in samples.iter().zip(values).enumerate() {
        if !sample.is_anomaly || !value.is_finite() {
            continue;
        }
        commands.push(DrawCommand::Circle {
            center: frame.point(i, *value),
            radius: style.marker_radius,
            fill: Some(style.anomaly_color),
            stroke: Some(Stroke::new(style.marker_stroke, 1.0)),
        });
    }
}
