use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::core::{SeriesPoint, TreeNode};
use crate::error::{ChartError, ChartResult};

use super::SchemaKind;

/// Caption drawn over scenes rendered from the built-in dataset.
pub const SAMPLE_DATA_CAPTION: &str = "Sample data";

/// Parsed data source of one element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "lowercase")]
pub enum ChartData {
    Series(Vec<SeriesPoint>),
    Tree(TreeNode),
}

impl ChartData {
    #[must_use]
    pub fn kind(&self) -> SchemaKind {
        match self {
            Self::Series(_) => SchemaKind::Chart,
            Self::Tree(_) => SchemaKind::Diagram,
        }
    }

    /// Built-in dataset substituted when nothing usable is available.
    #[must_use]
    pub fn sample(kind: SchemaKind) -> Self {
        match kind {
            SchemaKind::Chart => Self::Series(sample_series()),
            SchemaKind::Diagram => Self::Tree(sample_tree()),
        }
    }

    pub fn validate(&self) -> ChartResult<()> {
        match self {
            Self::Series(points) => {
                if points.is_empty() {
                    return Err(ChartError::InvalidData(
                        "series data needs at least one point".to_owned(),
                    ));
                }
                points.iter().try_for_each(SeriesPoint::validate)
            }
            Self::Tree(root) => root.validate(),
        }
    }
}

/// Where the data used for a render came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataOrigin {
    Parsed,
    LastKnownGood,
    Sample,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedData {
    pub data: ChartData,
    pub origin: DataOrigin,
}

impl ResolvedData {
    /// Whether the scene should carry the sample-data caption.
    #[must_use]
    pub fn is_sample(&self) -> bool {
        self.origin == DataOrigin::Sample
    }

    #[must_use]
    pub fn is_fallback(&self) -> bool {
        self.origin != DataOrigin::Parsed
    }
}

#[must_use]
pub fn sample_series() -> Vec<SeriesPoint> {
    vec![
        SeriesPoint::new("Jan", 400.0).with_secondary_a(240.0),
        SeriesPoint::new("Feb", 300.0).with_secondary_a(139.0),
        SeriesPoint::new("Mar", 600.0).with_secondary_a(380.0),
        SeriesPoint::new("Apr", 800.0).with_secondary_a(390.0),
    ]
}

#[must_use]
pub fn sample_tree() -> TreeNode {
    TreeNode::new("root", "Project")
        .with_child(
            TreeNode::new("plan", "Planning")
                .with_child(TreeNode::new("scope", "Scope"))
                .with_child(TreeNode::new("budget", "Budget")),
        )
        .with_child(TreeNode::new("build", "Delivery").with_child(TreeNode::new("qa", "Testing")))
}

/// Parses the element's JSON data source for `kind`.
///
/// Charts expect an array of series points, diagrams a single root node.
pub fn parse_chart_data(kind: SchemaKind, json: &str) -> ChartResult<ChartData> {
    if json.trim().is_empty() {
        return Err(ChartError::InvalidData("data source is empty".to_owned()));
    }
    let data = match kind {
        SchemaKind::Chart => ChartData::Series(
            serde_json::from_str(json)
                .map_err(|err| ChartError::InvalidData(format!("series data: {err}")))?,
        ),
        SchemaKind::Diagram => ChartData::Tree(
            serde_json::from_str(json)
                .map_err(|err| ChartError::InvalidData(format!("tree data: {err}")))?,
        ),
    };
    data.validate()?;
    Ok(data)
}

/// Parses the data source and recovers from malformed input.
///
/// Falls back to `last_known_good` when it matches `kind`, otherwise to the
/// built-in sample. Never fails.
#[must_use]
pub fn resolve_chart_data(
    kind: SchemaKind,
    json: &str,
    last_known_good: Option<&ChartData>,
) -> ResolvedData {
    match parse_chart_data(kind, json) {
        Ok(data) => ResolvedData {
            data,
            origin: DataOrigin::Parsed,
        },
        Err(err) => match last_known_good.filter(|data| data.kind() == kind) {
            Some(previous) => {
                warn!(variant = kind.variant(), error = %err, "malformed data, keeping last known good snapshot");
                ResolvedData {
                    data: previous.clone(),
                    origin: DataOrigin::LastKnownGood,
                }
            }
            None => {
                if json.trim().is_empty() {
                    debug!(variant = kind.variant(), "no data source configured, using sample data");
                } else {
                    warn!(variant = kind.variant(), error = %err, "malformed data, using sample data");
                }
                ResolvedData {
                    data: ChartData::sample(kind),
                    origin: DataOrigin::Sample,
                }
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::{ChartData, DataOrigin, parse_chart_data, resolve_chart_data};
    use crate::api::SchemaKind;
    use crate::core::SeriesPoint;

    #[test]
    fn series_json_parses_with_optional_secondaries() {
        let data = parse_chart_data(
            SchemaKind::Chart,
            r#"[{"name":"Jan","value":400},{"name":"Feb","value":300,"secondaryA":12}]"#,
        )
        .expect("series");
        let ChartData::Series(points) = data else {
            panic!("expected series data");
        };
        assert_eq!(points[1], SeriesPoint::new("Feb", 300.0).with_secondary_a(12.0));
    }

    #[test]
    fn empty_series_is_invalid() {
        assert!(parse_chart_data(SchemaKind::Chart, "[]").is_err());
    }

    #[test]
    fn malformed_json_prefers_last_known_good() {
        let previous = ChartData::Series(vec![SeriesPoint::new("x", 1.0)]);
        let resolved = resolve_chart_data(SchemaKind::Chart, "[{", Some(&previous));
        assert_eq!(resolved.origin, DataOrigin::LastKnownGood);
        assert_eq!(resolved.data, previous);
    }

    #[test]
    fn snapshot_of_another_kind_is_not_reused() {
        let previous = ChartData::Series(vec![SeriesPoint::new("x", 1.0)]);
        let resolved = resolve_chart_data(SchemaKind::Diagram, "{", Some(&previous));
        assert!(resolved.is_sample());
        assert_eq!(resolved.data.kind(), SchemaKind::Diagram);
    }
}
