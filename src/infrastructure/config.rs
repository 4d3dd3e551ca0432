use crate::application::chart_renderer::{ChartStyle, Dimensions};
use crate::application::dashboard_service::Thresholds;
use crate::domain::chart::ColorParseError;
use crate::domain::telemetry::Channel;
use serde::Deserialize;
use std::time::Duration;

const ENV_PREFIX: &str = "WATERWATCH";

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub source: SourceSettings,
    #[serde(default)]
    pub poll: PollSettings,
    #[serde(default)]
    pub chart: ChartSettings,
    #[serde(default)]
    pub thresholds: ThresholdSettings,
    #[serde(default = "default_pages")]
    pub pages: Vec<PageConfig>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerSettings::default(),
            source: SourceSettings::default(),
            poll: PollSettings::default(),
            chart: ChartSettings::default(),
            thresholds: ThresholdSettings::default(),
            pages: default_pages(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerSettings {
    pub addr: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            addr: "0.0.0.0:8080".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SourceSettings {
    pub url: String,
    pub timeout_secs: u64,
}

impl Default for SourceSettings {
    fn default() -> Self {
        Self {
            url: "https://api-creation-1hfb.onrender.com/data".to_string(),
            timeout_secs: 10,
        }
    }
}

impl SourceSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct PollSettings {
    pub interval_secs: u64,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self { interval_secs: 14 }
    }
}

impl PollSettings {
    /// Zero would make the timer spin, so it is raised to one second.
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs.max(1))
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ChartSettings {
    pub channel: Channel,
    pub width: f64,
    pub height: f64,
    pub grid_line_count: usize,
    pub padding_x: f64,
    pub padding_y: f64,
    pub marker_radius: f64,
    pub line_color: String,
    pub anomaly_color: String,
}

impl Default for ChartSettings {
    fn default() -> Self {
        let style = ChartStyle::default();
        let dims = Dimensions::default();
        Self {
            channel: style.channel,
            width: dims.width,
            height: dims.height,
            grid_line_count: style.grid_line_count,
            padding_x: style.padding_x,
            padding_y: style.padding_y,
            marker_radius: style.marker_radius,
            line_color: style.line_color.to_string(),
            anomaly_color: style.anomaly_color.to_string(),
        }
    }
}

impl ChartSettings {
    pub fn style(&self) -> Result<ChartStyle, ColorParseError> {
        Ok(ChartStyle {
            channel: self.channel,
            grid_line_count: self.grid_line_count,
            line_color: self.line_color.parse()?,
            anomaly_color: self.anomaly_color.parse()?,
            marker_radius: self.marker_radius,
            padding_x: self.padding_x,
            padding_y: self.padding_y,
            ..ChartStyle::default()
        })
    }

    pub fn dimensions(&self) -> Dimensions {
        Dimensions::new(self.width, self.height)
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ThresholdSettings {
    pub battery_warning_volts: f64,
}

impl Default for ThresholdSettings {
    fn default() -> Self {
        Self {
            battery_warning_volts: Thresholds::default().battery_warning_volts,
        }
    }
}

impl ThresholdSettings {
    pub fn thresholds(&self) -> Thresholds {
        Thresholds {
            battery_warning_volts: self.battery_warning_volts,
        }
    }
}

/// An external page shown inside the navigation shell.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct PageConfig {
    pub slug: String,
    pub title: String,
    #[serde(default)]
    pub subtitle: String,
    pub url: String,
}

fn default_pages() -> Vec<PageConfig> {
    let page = |slug: &str, title: &str, subtitle: &str, url: &str| PageConfig {
        slug: slug.to_string(),
        title: title.to_string(),
        subtitle: subtitle.to_string(),
        url: url.to_string(),
    };
    vec![
        page(
            "news",
            "Latest Water News",
            "Stay updated with the latest water-related news and articles",
            "https://news-um7u.onrender.com/",
        ),
        page(
            "complaint",
            "Raise Complaint",
            "Send your queries about water monitoring",
            "https://aquaalert.netlify.app/",
        ),
        page(
            "prediction",
            "Water Level Prediction",
            "",
            "https://irrigation-monitoring-35fc0.web.app",
        ),
    ]
}

/// Load `config/dashboard.toml` (optional) overlaid with `WATERWATCH__*`
/// environment variables, e.g. `WATERWATCH__POLL__INTERVAL_SECS=30`.
pub fn load_app_config() -> anyhow::Result<AppConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/dashboard").required(false))
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    Ok(settings.try_deserialize()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::chart::Color;

    fn from_toml(toml: &str) -> AppConfig {
        config::Config::builder()
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn test_defaults_when_empty() {
        let config = from_toml("");
        assert_eq!(config.server.addr, "0.0.0.0:8080");
        assert_eq!(config.poll.interval(), Duration::from_secs(14));
        assert_eq!(config.source.timeout(), Duration::from_secs(10));
        assert_eq!(config.chart.style().unwrap(), ChartStyle::default());
        assert_eq!(config.chart.dimensions(), Dimensions::default());
        assert_eq!(config.thresholds.thresholds(), Thresholds::default());
        assert_eq!(config.pages.len(), 3);
        assert_eq!(config.pages[0].slug, "news");
    }

    #[test]
    fn test_partial_overrides() {
        let config = from_toml(
            r##"
            [poll]
            interval_secs = 0

            [chart]
            channel = "battery_voltage"
            line_color = "#10b981"
            grid_line_count = 4

            [[pages]]
            slug = "news"
            title = "News"
            url = "https://example.org/news"
            "##,
        );

        assert_eq!(config.poll.interval(), Duration::from_secs(1));
        let style = config.chart.style().unwrap();
        assert_eq!(style.channel, Channel::BatteryVoltage);
        assert_eq!(style.line_color, Color::rgb(16, 185, 129));
        assert_eq!(style.grid_line_count, 4);
        assert_eq!(style.marker_radius, 6.0);
        assert_eq!(config.pages.len(), 1);
        assert_eq!(config.pages[0].subtitle, "");
    }

    #[test]
    fn test_bad_color_is_rejected() {
        let config = from_toml(
            r#"
            [chart]
            anomaly_color = "reddish"
            "#,
        );
        assert_eq!(
            config.chart.style(),
            Err(ColorParseError("reddish".to_string()))
        );
    }
}
