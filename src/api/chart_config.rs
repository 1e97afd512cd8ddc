use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::core::Interpolation;
use crate::render::Color;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ChartType {
    #[default]
    Bar,
    Line,
    Pie,
    Area,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ConnectorStyle {
    Straight,
    #[default]
    Curve,
}

pub const DEFAULT_SERIES_COLOR_A: &str = "#8884d8";
pub const DEFAULT_SERIES_COLOR_B: &str = "#82ca9d";
pub const DEFAULT_NODE_COLOR: &str = "#4f46e5";
pub const DEFAULT_NODE_TEXT_COLOR: &str = "#ffffff";

/// Chart configuration as persisted on the element schema.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartConfig {
    #[serde(default)]
    pub chart_type: ChartType,
    #[serde(default)]
    pub interpolation: Interpolation,
    #[serde(default = "default_series_color_a")]
    pub series_color_a: String,
    #[serde(default = "default_series_color_b")]
    pub series_color_b: String,
    #[serde(default = "default_true")]
    pub show_grid: bool,
    #[serde(default = "default_true")]
    pub show_points: bool,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            chart_type: ChartType::default(),
            interpolation: Interpolation::default(),
            series_color_a: default_series_color_a(),
            series_color_b: default_series_color_b(),
            show_grid: true,
            show_points: true,
        }
    }
}

impl ChartConfig {
    #[must_use]
    pub fn with_chart_type(mut self, chart_type: ChartType) -> Self {
        self.chart_type = chart_type;
        self
    }

    #[must_use]
    pub fn with_interpolation(mut self, interpolation: Interpolation) -> Self {
        self.interpolation = interpolation;
        self
    }

    #[must_use]
    pub fn with_grid(mut self, show_grid: bool) -> Self {
        self.show_grid = show_grid;
        self
    }

    #[must_use]
    pub fn with_points(mut self, show_points: bool) -> Self {
        self.show_points = show_points;
        self
    }

    #[must_use]
    pub fn with_series_colors(mut self, color_a: impl Into<String>, color_b: impl Into<String>) -> Self {
        self.series_color_a = color_a.into();
        self.series_color_b = color_b.into();
        self
    }

    /// Parsed series colors; malformed hex values fall back to the defaults.
    #[must_use]
    pub fn resolved_series_colors(&self) -> (Color, Color) {
        (
            resolve_color(&self.series_color_a, DEFAULT_SERIES_COLOR_A),
            resolve_color(&self.series_color_b, DEFAULT_SERIES_COLOR_B),
        )
    }
}

/// Mind-map configuration as persisted on the element schema.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagramConfig {
    #[serde(default)]
    pub connector_style: ConnectorStyle,
    #[serde(default = "default_node_color")]
    pub node_color: String,
    #[serde(default = "default_node_text_color")]
    pub text_color: String,
}

impl Default for DiagramConfig {
    fn default() -> Self {
        Self {
            connector_style: ConnectorStyle::default(),
            node_color: default_node_color(),
            text_color: default_node_text_color(),
        }
    }
}

impl DiagramConfig {
    #[must_use]
    pub fn with_connector_style(mut self, connector_style: ConnectorStyle) -> Self {
        self.connector_style = connector_style;
        self
    }

    #[must_use]
    pub fn resolved_node_color(&self) -> Color {
        resolve_color(&self.node_color, DEFAULT_NODE_COLOR)
    }

    #[must_use]
    pub fn resolved_text_color(&self) -> Color {
        resolve_color(&self.text_color, DEFAULT_NODE_TEXT_COLOR)
    }
}

/// Parses a user-supplied hex color, logging and substituting `fallback`.
#[must_use]
pub fn resolve_color(input: &str, fallback: &str) -> Color {
    match Color::from_hex(input) {
        Ok(color) => color,
        Err(err) => {
            warn!(input, error = %err, fallback, "invalid color, using fallback");
            Color::from_hex(fallback).unwrap_or(Color::BLACK)
        }
    }
}

fn default_series_color_a() -> String {
    DEFAULT_SERIES_COLOR_A.to_owned()
}

fn default_series_color_b() -> String {
    DEFAULT_SERIES_COLOR_B.to_owned()
}

fn default_node_color() -> String {
    DEFAULT_NODE_COLOR.to_owned()
}

fn default_node_text_color() -> String {
    DEFAULT_NODE_TEXT_COLOR.to_owned()
}

fn default_true() -> bool {
    true
}
