use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::SceneSize;

use super::{ChartConfig, DiagramConfig};

pub const CHANGE_KEY_INSTANCE_ID: &str = "instanceId";
pub const CHANGE_KEY_CONTENT: &str = "content";

/// Element family; also the content-cache variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SchemaKind {
    #[default]
    Chart,
    Diagram,
}

impl SchemaKind {
    #[must_use]
    pub fn variant(self) -> &'static str {
        match self {
            Self::Chart => "chart",
            Self::Diagram => "diagram",
        }
    }
}

/// Top-left corner of the element on the page, in millimeters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Element schema as persisted by the host designer.
///
/// `width`/`height` are millimeters, `content` holds the last raster payload
/// and `data` the JSON data source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartSchema {
    #[serde(rename = "type")]
    pub kind: SchemaKind,
    pub name: String,
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub position: Position,
    #[serde(default)]
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance_id: Option<String>,
    #[serde(default)]
    pub data: String,
    #[serde(flatten)]
    pub chart: ChartConfig,
    #[serde(flatten)]
    pub diagram: DiagramConfig,
}

impl ChartSchema {
    #[must_use]
    pub fn new(kind: SchemaKind, name: impl Into<String>, width: f64, height: f64) -> Self {
        Self {
            kind,
            name: name.into(),
            width,
            height,
            position: Position::default(),
            content: String::new(),
            instance_id: None,
            data: String::new(),
            chart: ChartConfig::default(),
            diagram: DiagramConfig::default(),
        }
    }

    #[must_use]
    pub fn with_position(mut self, position: Position) -> Self {
        self.position = position;
        self
    }

    #[must_use]
    pub fn with_data(mut self, data: impl Into<String>) -> Self {
        self.data = data.into();
        self
    }

    #[must_use]
    pub fn with_chart_config(mut self, chart: ChartConfig) -> Self {
        self.chart = chart;
        self
    }

    #[must_use]
    pub fn with_diagram_config(mut self, diagram: DiagramConfig) -> Self {
        self.diagram = diagram;
        self
    }

    #[must_use]
    pub fn with_instance_id(mut self, instance_id: impl Into<String>) -> Self {
        self.instance_id = Some(instance_id.into());
        self
    }

    #[must_use]
    pub fn scene_size(&self) -> SceneSize {
        SceneSize::from_millimeters(self.width, self.height)
    }

    /// Applies a change-callback event the way a host persists it.
    ///
    /// Repeated events overwrite; unknown keys are ignored and reported as
    /// `false`.
    pub fn apply_change(&mut self, event: &ChangeEvent) -> bool {
        match (event.key.as_str(), &event.value) {
            (CHANGE_KEY_INSTANCE_ID, Value::String(id)) => {
                self.instance_id = Some(id.clone());
                true
            }
            (CHANGE_KEY_CONTENT, Value::String(content)) => {
                self.content = content.clone();
                true
            }
            _ => false,
        }
    }
}

/// Payload of the host change callback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeEvent {
    pub key: String,
    pub value: Value,
}

impl ChangeEvent {
    #[must_use]
    pub fn instance_id(id: &str) -> Self {
        Self {
            key: CHANGE_KEY_INSTANCE_ID.to_owned(),
            value: Value::String(id.to_owned()),
        }
    }

    #[must_use]
    pub fn content(data_url: &str) -> Self {
        Self {
            key: CHANGE_KEY_CONTENT.to_owned(),
            value: Value::String(data_url.to_owned()),
        }
    }
}
