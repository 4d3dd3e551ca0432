// Server-rendered HTML pages - dashboard and embedded external pages
use crate::domain::dashboard::{CardStatus, Dashboard, FeedStatus, Trend};
use crate::infrastructure::config::PageConfig;
use crate::infrastructure::svg::escape;
use std::fmt::Write;

const STYLE: &str = r#"
body { margin: 0; font-family: Poppins, sans-serif; color: #1e293b; background: #f1f5f9; display: flex; }
nav { width: 200px; min-height: 100vh; background: #0f172a; padding: 16px; box-sizing: border-box; }
nav a { display: block; color: #cbd5e1; padding: 8px; text-decoration: none; border-radius: 6px; }
nav a.active { background: #1e40af; color: #fff; }
main { flex: 1; padding: 24px; }
.cards { display: grid; grid-template-columns: repeat(4, 1fr); gap: 16px; }
.card { background: #fff; border-radius: 8px; padding: 16px; }
.card.warning { border-left: 4px solid #f59e0b; }
.card.alert { border-left: 4px solid #ef4444; }
.value { font-size: 1.6em; font-weight: 600; }
.map { position: relative; height: 300px; background: #e0f2fe; border-radius: 8px; }
.marker { position: absolute; transform: translate(-50%, -50%); background: #3b82f6; color: #fff; padding: 4px 8px; border-radius: 12px; font-size: 0.8em; }
.marker.anomaly { background: #ef4444; }
.anomaly-item { background: #fef2f2; border-radius: 8px; padding: 12px; margin-bottom: 8px; }
.error { background: #fee2e2; padding: 16px; border-radius: 8px; }
iframe { width: 100%; height: 80vh; border: 0; }
"#;

fn shell(title: &str, active: &str, pages: &[PageConfig], head_extra: &str, content: &str) -> String {
    let mut nav = String::new();
    let link = |nav: &mut String, href: &str, label: &str, is_active: bool| {
        let _ = write!(
            nav,
            r#"<a href="{}"{}>{}</a>"#,
            escape(href),
            if is_active { r#" class="active""# } else { "" },
            escape(label)
        );
    };
    link(&mut nav, "/", "Dashboard", active.is_empty());
    for page in pages {
        link(
            &mut nav,
            &format!("/pages/{}", page.slug),
            &page.title,
            active == page.slug,
        );
    }

    format!(
        "<!DOCTYPE html>\n<html lang=\"en\"><head><meta charset=\"utf-8\"><title>{title}</title>{head_extra}<style>{STYLE}</style></head>\n<body><nav><h2 style=\"color:#fff\">AquaMonitor</h2>{nav}</nav>\n<main>{content}</main></body></html>\n",
        title = escape(title),
    )
}

/// Render the full dashboard. `chart_svg` is embedded as an image so the
/// chart markup stays isolated from the page.
pub fn render_dashboard_page(
    dashboard: &Dashboard,
    chart_svg: &str,
    pages: &[PageConfig],
    refresh_secs: u64,
) -> String {
    let mut html = String::new();

    let updated = dashboard
        .last_updated
        .map(|t| format!("Last updated: {}", t.format("%H:%M:%S UTC")))
        .unwrap_or_default();
    let _ = write!(
        html,
        r#"<header><h1>{}</h1><span>{}</span> <form method="post" action="/refresh" style="display:inline"><button>Refresh Data</button></form></header>"#,
        escape(&dashboard.title),
        escape(&updated)
    );

    match &dashboard.status {
        FeedStatus::Loading => {
            html.push_str("<p>Loading water monitoring data...</p>");
            return shell(&dashboard.title, "", pages, &meta_refresh(refresh_secs), &html);
        }
        FeedStatus::Error { message } => {
            let _ = write!(
                html,
                r#"<div class="error"><p>Failed to fetch water monitoring data</p><small>{}</small><form method="post" action="/refresh"><button>Try Again</button></form></div>"#,
                escape(message)
            );
        }
        FeedStatus::Ready => {}
    }

    html.push_str(r#"<section class="cards">"#);
    for card in &dashboard.cards {
        let class = match card.status {
            CardStatus::Normal => "card",
            CardStatus::Warning => "card warning",
            CardStatus::Alert => "card alert",
        };
        let arrow = match card.trend {
            Some(Trend::Up) => "▲ ",
            Some(Trend::Down) => "▼ ",
            Some(Trend::Flat) => "– ",
            None => "",
        };
        let _ = write!(
            html,
            r#"<div class="{}"><h3>{}</h3><div class="value">{}</div><div>{}{}</div></div>"#,
            class,
            escape(&card.title),
            escape(&card.value),
            arrow,
            escape(&card.change)
        );
    }
    html.push_str("</section>");

    html.push_str(r#"<h2>Monitoring Locations</h2><section class="map">"#);
    if let Some(message) = &dashboard.map_message {
        let _ = write!(html, "<p>{}</p>", escape(message));
    }
    for marker in &dashboard.markers {
        let _ = write!(
            html,
            r#"<div class="marker{}" style="top:{}%;left:{}%" title="Water Level: {} / Temp: {}">{}</div>"#,
            if marker.is_anomaly { " anomaly" } else { "" },
            marker.station.top_pct,
            marker.station.left_pct,
            escape(&marker.water_level),
            escape(&marker.water_temperature),
            escape(marker.station.label)
        );
    }
    html.push_str("</section>");

    let _ = write!(
        html,
        r#"<h2>Water Level Trends</h2><img alt="Water level chart" src="data:image/svg+xml;charset=utf-8,{}">"#,
        urlencoding::encode(chart_svg)
    );

    html.push_str("<h2>Detected Anomalies</h2>");
    if let Some(message) = &dashboard.anomaly_message {
        let _ = write!(html, "<p>{}</p>", escape(message));
    }
    for anomaly in &dashboard.anomalies {
        let _ = write!(
            html,
            r#"<div class="anomaly-item"><strong>{}</strong> Water Level: {} · Water Temp: {} · Pressure: {} · Battery: {}</div>"#,
            escape(&anomaly.date),
            escape(&anomaly.water_level),
            escape(&anomaly.water_temperature),
            escape(&anomaly.barometric_pressure),
            escape(&anomaly.battery_voltage)
        );
    }

    shell(&dashboard.title, "", pages, &meta_refresh(refresh_secs), &html)
}

pub fn render_embedded_page(page: &PageConfig, pages: &[PageConfig]) -> String {
    let content = format!(
        r#"<header><h1>{}</h1><p>{}</p></header><iframe src="{}" title="{}"></iframe>"#,
        escape(&page.title),
        escape(&page.subtitle),
        escape(&page.url),
        escape(&page.title)
    );
    shell(&page.title, &page.slug, pages, "", &content)
}

fn meta_refresh(secs: u64) -> String {
    format!(r#"<meta http-equiv="refresh" content="{}">"#, secs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::dashboard::{MapMarker, MetricCard, STATIONS};
    use crate::domain::telemetry::Channel;

    fn pages() -> Vec<PageConfig> {
        vec![PageConfig {
            slug: "news".to_string(),
            title: "News & Updates".to_string(),
            subtitle: String::new(),
            url: "https://example.org/?a=1&b=2".to_string(),
        }]
    }

    fn dashboard(status: FeedStatus) -> Dashboard {
        Dashboard {
            title: "Water Monitoring Dashboard".to_string(),
            status,
            last_updated: None,
            sample_count: 1,
            cards: vec![MetricCard {
                channel: Channel::WaterLevel,
                title: "Current Water Level".to_string(),
                value: "1.00 m".to_string(),
                change: "N/A".to_string(),
                trend: None,
                status: CardStatus::Alert,
            }],
            anomalies: vec![],
            anomaly_message: Some("No anomalies detected in the current data set.".to_string()),
            markers: vec![MapMarker {
                station: STATIONS[0],
                sample_index: 0,
                water_level: "1.00 m".to_string(),
                water_temperature: "20.0 °C".to_string(),
                is_anomaly: true,
            }],
            map_message: None,
        }
    }

    #[test]
    fn test_dashboard_page_sections() {
        let html = render_dashboard_page(&dashboard(FeedStatus::Ready), "<svg/>", &pages(), 14);

        assert!(html.contains(r#"<div class="card alert">"#));
        assert!(html.contains(r#"<div class="marker anomaly" style="top:30%;left:50%""#));
        assert!(html.contains("data:image/svg+xml;charset=utf-8,%3Csvg%2F%3E"));
        assert!(html.contains("No anomalies detected"));
        assert!(html.contains(r#"<a href="/pages/news">News &amp; Updates</a>"#));
        assert!(html.contains(r#"content="14""#));
    }

    #[test]
    fn test_error_page_offers_retry() {
        let html = render_dashboard_page(
            &dashboard(FeedStatus::Error {
                message: "status <503>".to_string(),
            }),
            "<svg/>",
            &pages(),
            14,
        );
        assert!(html.contains("Try Again"));
        assert!(html.contains("status &lt;503&gt;"));
    }

    #[test]
    fn test_loading_page_has_no_sections() {
        let html = render_dashboard_page(&dashboard(FeedStatus::Loading), "<svg/>", &pages(), 14);
        assert!(html.contains("Loading water monitoring data"));
        assert!(!html.contains("class=\"cards\""));
    }

    #[test]
    fn test_embedded_page_escapes_url() {
        let pages = pages();
        let html = render_embedded_page(&pages[0], &pages);
        assert!(html.contains(r#"<iframe src="https://example.org/?a=1&amp;b=2""#));
        assert!(html.contains(r#"<a href="/pages/news" class="active">"#));
    }
}
