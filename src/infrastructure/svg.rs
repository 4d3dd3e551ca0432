// SVG surface - Replays chart draw commands as a standalone SVG document
use crate::domain::chart::{Color, DrawCommand, Point, Stroke, TextAnchor};
use std::fmt::Write;

pub fn render_svg(commands: &[DrawCommand]) -> String {
    let mut defs = String::new();
    let mut body = String::new();
    let (mut width, mut height) = (0.0, 0.0);
    let mut gradients = 0usize;

    for command in commands {
        match command {
            DrawCommand::Clear { width: w, height: h } => {
                // Everything drawn so far is discarded.
                width = *w;
                height = *h;
                defs.clear();
                body.clear();
            }
            DrawCommand::Line { from, to, stroke } => {
                let _ = writeln!(
                    body,
                    r#"<line x1="{}" y1="{}" x2="{}" y2="{}" {}/>"#,
                    num(from.x),
                    num(from.y),
                    num(to.x),
                    num(to.y),
                    stroke_attrs(stroke)
                );
            }
            DrawCommand::Polyline { points, stroke } => {
                let _ = writeln!(
                    body,
                    r#"<polyline points="{}" fill="none" stroke-linejoin="round" {}/>"#,
                    points_attr(points),
                    stroke_attrs(stroke)
                );
            }
            DrawCommand::FillPolygon { points, gradient } => {
                let id = format!("fill-{}", gradients);
                gradients += 1;
                let _ = write!(
                    defs,
                    r#"<linearGradient id="{}" gradientUnits="userSpaceOnUse" x1="{}" y1="{}" x2="{}" y2="{}">"#,
                    id,
                    num(gradient.start.x),
                    num(gradient.start.y),
                    num(gradient.end.x),
                    num(gradient.end.y)
                );
                for stop in &gradient.stops {
                    let _ = write!(
                        defs,
                        r#"<stop offset="{}" stop-color="{}" stop-opacity="{}"/>"#,
                        num(stop.offset),
                        stop.color.hex(),
                        num(stop.color.a)
                    );
                }
                defs.push_str("</linearGradient>\n");
                let _ = writeln!(
                    body,
                    r#"<polygon points="{}" fill="url(#{})"/>"#,
                    points_attr(points),
                    id
                );
            }
            DrawCommand::Circle {
                center,
                radius,
                fill,
                stroke,
            } => {
                let fill = fill
                    .as_ref()
                    .map(|c| paint_attrs("fill", c))
                    .unwrap_or_else(|| r#"fill="none""#.to_string());
                let stroke = stroke.as_ref().map(stroke_attrs).unwrap_or_default();
                let _ = writeln!(
                    body,
                    r#"<circle cx="{}" cy="{}" r="{}" {} {}/>"#,
                    num(center.x),
                    num(center.y),
                    num(*radius),
                    fill,
                    stroke
                );
            }
            DrawCommand::Text {
                position,
                text,
                color,
                font,
                rotation,
                anchor,
            } => {
                let transform = if *rotation != 0.0 {
                    format!(
                        r#" transform="rotate({} {} {})""#,
                        num(rotation.to_degrees()),
                        num(position.x),
                        num(position.y)
                    )
                } else {
                    String::new()
                };
                let anchor = match anchor {
                    TextAnchor::Start => "start",
                    TextAnchor::Middle => "middle",
                };
                let _ = writeln!(
                    body,
                    r#"<text x="{}" y="{}" text-anchor="{}" style="font: {}" {}{}>{}</text>"#,
                    num(position.x),
                    num(position.y),
                    anchor,
                    escape(font),
                    paint_attrs("fill", color),
                    transform,
                    escape(text)
                );
            }
        }
    }

    let mut svg = format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
        w = num(width),
        h = num(height)
    );
    svg.push('\n');
    if !defs.is_empty() {
        svg.push_str("<defs>\n");
        svg.push_str(&defs);
        svg.push_str("</defs>\n");
    }
    svg.push_str(&body);
    svg.push_str("</svg>\n");
    svg
}

/// Coordinates rounded to two decimals, without trailing zeros.
fn num(v: f64) -> String {
    let s = format!("{:.2}", v);
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" { "0".to_string() } else { s.to_string() }
}

fn points_attr(points: &[Point]) -> String {
    points
        .iter()
        .map(|p| format!("{},{}", num(p.x), num(p.y)))
        .collect::<Vec<_>>()
        .join(" ")
}

fn paint_attrs(attr: &str, color: &Color) -> String {
    if color.a >= 1.0 {
        format!(r#"{}="{}""#, attr, color.hex())
    } else {
        format!(
            r#"{attr}="{}" {attr}-opacity="{}""#,
            color.hex(),
            num(color.a),
            attr = attr
        )
    }
}

fn stroke_attrs(stroke: &Stroke) -> String {
    format!(
        r#"{} stroke-width="{}""#,
        paint_attrs("stroke", &stroke.color),
        num(stroke.width)
    )
}

pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
