use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::core::Interpolation;

use super::chart_config::{
    DEFAULT_NODE_COLOR, DEFAULT_NODE_TEXT_COLOR, DEFAULT_SERIES_COLOR_A, DEFAULT_SERIES_COLOR_B,
};
use super::data_source::{sample_series, sample_tree};
use super::schema::CHANGE_KEY_INSTANCE_ID;
use super::{ChartSchema, ChartType, ConnectorStyle, SchemaKind};

/// Default element footprint in millimeters.
pub const DEFAULT_ELEMENT_WIDTH_MM: f64 = 120.0;
pub const DEFAULT_ELEMENT_HEIGHT_MM: f64 = 80.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    String,
    Number,
    Boolean,
}

/// One editable property as exported to the host property panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyField {
    pub title: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(rename = "enum", default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    pub default: Value,
    /// `Some(false)` keeps the value persisted but out of the panel.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visible: Option<bool>,
}

impl PropertyField {
    fn new(title: &str, field_type: FieldType, default: Value) -> Self {
        Self {
            title: title.to_owned(),
            field_type,
            format: None,
            options: None,
            default,
            visible: None,
        }
    }

    fn with_format(mut self, format: &str) -> Self {
        self.format = Some(format.to_owned());
        self
    }

    fn with_options(mut self, options: &[&str]) -> Self {
        self.options = Some(options.iter().map(|option| (*option).to_owned()).collect());
        self
    }

    fn hidden(mut self) -> Self {
        self.visible = Some(false);
        self
    }

    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.visible.unwrap_or(true)
    }
}

/// Property-panel export for one element kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropPanel {
    pub schema: IndexMap<String, PropertyField>,
    pub default_schema: ChartSchema,
}

#[must_use]
pub fn prop_panel(kind: SchemaKind) -> PropPanel {
    let sample = match kind {
        SchemaKind::Chart => serde_json::to_string_pretty(&sample_series()),
        SchemaKind::Diagram => serde_json::to_string_pretty(&sample_tree()),
    }
    .unwrap_or_default();

    let mut schema = IndexMap::new();
    schema.insert(
        "data".to_owned(),
        PropertyField::new("Data source", FieldType::String, Value::String(sample.clone()))
            .with_format("textarea"),
    );
    match kind {
        SchemaKind::Chart => {
            schema.insert(
                "chartType".to_owned(),
                PropertyField::new("Chart type", FieldType::String, enum_default(ChartType::default()))
                    .with_options(&["bar", "line", "pie", "area"]),
            );
            schema.insert(
                "interpolation".to_owned(),
                PropertyField::new(
                    "Line interpolation",
                    FieldType::String,
                    enum_default(Interpolation::default()),
                )
                .with_options(&["linear", "step", "curve", "monotone"]),
            );
            schema.insert(
                "seriesColorA".to_owned(),
                PropertyField::new("Series A color", FieldType::String, json!(DEFAULT_SERIES_COLOR_A))
                    .with_format("color"),
            );
            schema.insert(
                "seriesColorB".to_owned(),
                PropertyField::new("Series B color", FieldType::String, json!(DEFAULT_SERIES_COLOR_B))
                    .with_format("color"),
            );
            schema.insert(
                "showGrid".to_owned(),
                PropertyField::new("Show grid", FieldType::Boolean, json!(true)),
            );
            schema.insert(
                "showPoints".to_owned(),
                PropertyField::new("Show points", FieldType::Boolean, json!(true)),
            );
        }
        SchemaKind::Diagram => {
            schema.insert(
                "connectorStyle".to_owned(),
                PropertyField::new(
                    "Connector style",
                    FieldType::String,
                    enum_default(ConnectorStyle::default()),
                )
                .with_options(&["straight", "curve"]),
            );
            schema.insert(
                "nodeColor".to_owned(),
                PropertyField::new("Node color", FieldType::String, json!(DEFAULT_NODE_COLOR))
                    .with_format("color"),
            );
            schema.insert(
                "textColor".to_owned(),
                PropertyField::new("Text color", FieldType::String, json!(DEFAULT_NODE_TEXT_COLOR))
                    .with_format("color"),
            );
        }
    }
    schema.insert(
        CHANGE_KEY_INSTANCE_ID.to_owned(),
        PropertyField::new("Instance id", FieldType::String, json!("")).hidden(),
    );

    PropPanel {
        schema,
        default_schema: ChartSchema::new(
            kind,
            kind.variant(),
            DEFAULT_ELEMENT_WIDTH_MM,
            DEFAULT_ELEMENT_HEIGHT_MM,
        )
        .with_data(sample),
    }
}

fn enum_default(value: impl Serialize) -> Value {
    serde_json::to_value(value).unwrap_or(Value::Null)
}
