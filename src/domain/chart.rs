// Chart domain models - drawing primitives and the per-render frame
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Fraction of the observed value range added above and below the plot.
pub const RANGE_PADDING: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f64,
}

#[derive(Debug, Error, PartialEq)]
#[error("unrecognised color '{0}'")]
pub struct ColorParseError(pub String);

impl Color {
    pub const WHITE: Color = Color::rgb(255, 255, 255);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub fn with_alpha(self, a: f64) -> Self {
        Self { a, ..self }
    }

    /// Hex form without alpha, for surfaces that carry opacity separately.
    pub fn hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.a >= 1.0 {
            write!(f, "{}", self.hex())
        } else {
            write!(f, "rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
        }
    }
}

impl FromStr for Color {
    type Err = ColorParseError;

    /// Accepts `#rgb`, `#rrggbb`, `rgb(r, g, b)`, `rgba(r, g, b, a)`, `white` and `black`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.trim();
        let err = || ColorParseError(s.to_string());

        match raw.to_ascii_lowercase().as_str() {
            "white" => return Ok(Color::WHITE),
            "black" => return Ok(Color::rgb(0, 0, 0)),
            _ => {}
        }

        if let Some(hex) = raw.strip_prefix('#') {
            let digits: Vec<u8> = match hex.len() {
                3 => hex
                    .chars()
                    .map(|c| c.to_digit(16).map(|d| (d * 17) as u8))
                    .collect::<Option<_>>()
                    .ok_or_else(err)?,
                6 => (0..3)
                    .map(|i| u8::from_str_radix(hex.get(i * 2..i * 2 + 2)?, 16).ok())
                    .collect::<Option<_>>()
                    .ok_or_else(err)?,
                _ => return Err(err()),
            };
            return Ok(Color::rgb(digits[0], digits[1], digits[2]));
        }

        let (body, with_alpha) = if let Some(rest) = raw.strip_prefix("rgba(") {
            (rest, true)
        } else if let Some(rest) = raw.strip_prefix("rgb(") {
            (rest, false)
        } else {
            return Err(err());
        };
        let parts: Vec<&str> = body
            .strip_suffix(')')
            .ok_or_else(err)?
            .split(',')
            .map(str::trim)
            .collect();
        if parts.len() != if with_alpha { 4 } else { 3 } {
            return Err(err());
        }

        let channel = |p: &str| p.parse::<u8>().map_err(|_| err());
        let a = if with_alpha {
            let a: f64 = parts[3].parse().map_err(|_| err())?;
            if !(0.0..=1.0).contains(&a) {
                return Err(err());
            }
            a
        } else {
            1.0
        };

        Ok(Color {
            r: channel(parts[0])?,
            g: channel(parts[1])?,
            b: channel(parts[2])?,
            a,
        })
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Stroke {
    pub color: Color,
    pub width: f64,
}

impl Stroke {
    pub fn new(color: Color, width: f64) -> Self {
        Self { color, width }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GradientStop {
    pub offset: f64,
    pub color: Color,
}

/// Linear gradient in canvas coordinates, from `start` (offset 0) to `end` (offset 1).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinearGradient {
    pub start: Point,
    pub end: Point,
    pub stops: Vec<GradientStop>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TextAnchor {
    Start,
    Middle,
}

/// A single drawing primitive. A surface replays the commands in order, so
/// later commands paint over earlier ones.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DrawCommand {
    Clear {
        width: f64,
        height: f64,
    },
    Line {
        from: Point,
        to: Point,
        stroke: Stroke,
    },
    Polyline {
        points: Vec<Point>,
        stroke: Stroke,
    },
    FillPolygon {
        points: Vec<Point>,
        gradient: LinearGradient,
    },
    Circle {
        center: Point,
        radius: f64,
        fill: Option<Color>,
        stroke: Option<Stroke>,
    },
    Text {
        position: Point,
        text: String,
        color: Color,
        font: String,
        /// Clockwise rotation in radians around `position`.
        rotation: f64,
        anchor: TextAnchor,
    },
}

/// Closed interval of plotted values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ValueRange {
    pub lo: f64,
    pub hi: f64,
}

impl ValueRange {
    /// Min and max over the finite values, or `None` when there are none.
    pub fn observed<I>(values: I) -> Option<Self>
    where
        I: IntoIterator<Item = f64>,
    {
        values
            .into_iter()
            .filter(|v| v.is_finite())
            .fold(None, |acc, v| match acc {
                None => Some(Self { lo: v, hi: v }),
                Some(r) => Some(Self {
                    lo: r.lo.min(v),
                    hi: r.hi.max(v),
                }),
            })
    }

    /// Widen both ends by `fraction` of the span. A zero span stays zero.
    pub fn padded(&self, fraction: f64) -> Self {
        let pad = (self.hi - self.lo) * fraction;
        Self {
            lo: self.lo - pad,
            hi: self.hi + pad,
        }
    }

    pub fn span(&self) -> f64 {
        self.hi - self.lo
    }

    /// Position of `value` within the range as a fraction in [0, 1].
    /// A degenerate range maps everything to the middle.
    pub fn normalize(&self, value: f64) -> f64 {
        let span = self.span();
        if span == 0.0 || !span.is_finite() {
            return 0.5;
        }
        ((value - self.lo) / span).clamp(0.0, 1.0)
    }

    /// Value at fraction `t` of the range.
    pub fn lerp(&self, t: f64) -> f64 {
        self.lo + self.span() * t
    }
}

/// Scaling and layout state derived for a single render.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChartFrame {
    pub width: f64,
    pub height: f64,
    pub padding_x: f64,
    pub padding_y: f64,
    pub range: ValueRange,
    pub sample_count: usize,
}

impl ChartFrame {
    pub fn new(
        width: f64,
        height: f64,
        padding_x: f64,
        padding_y: f64,
        range: ValueRange,
        sample_count: usize,
    ) -> Self {
        Self {
            width,
            height,
            padding_x,
            padding_y,
            range,
            sample_count,
        }
    }

    pub fn chart_width(&self) -> f64 {
        (self.width - self.padding_x * 2.0).max(0.0)
    }

    pub fn chart_height(&self) -> f64 {
        (self.height - self.padding_y * 2.0).max(0.0)
    }

    /// Y coordinate of the x axis.
    pub fn baseline(&self) -> f64 {
        self.height - self.padding_y
    }

    pub fn right(&self) -> f64 {
        self.width - self.padding_x
    }

    pub fn x_at(&self, index: usize) -> f64 {
        if self.sample_count <= 1 {
            return self.padding_x;
        }
        self.padding_x + (index as f64 / (self.sample_count - 1) as f64) * self.chart_width()
    }

    pub fn y_at(&self, value: f64) -> f64 {
        self.baseline() - self.range.normalize(value) * self.chart_height()
    }

    /// Y coordinate of the gridline at fraction `t` from the bottom.
    pub fn y_at_fraction(&self, t: f64) -> f64 {
        self.baseline() - t * self.chart_height()
    }

    pub fn point(&self, index: usize, value: f64) -> Point {
        Point::new(self.x_at(index), self.y_at(value))
    }
}

/// Step between labelled samples on the x axis for a series of `n` samples:
/// one label per sixth of the series, every sample when there are fewer than 12.
pub fn date_label_stride(n: usize) -> usize {
    (n / 6).max(1)
}

/// Number of date labels drawn for a series of `n` samples.
pub fn date_label_count(n: usize) -> usize {
    n.div_ceil(date_label_stride(n))
}
