use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SceneLayerKind {
    Background,
    Grid,
    Axis,
    Connectors,
    Series,
    Nodes,
    Markers,
    Labels,
    Legend,
    Overlay,
}

/// Paint order of the layers making up one scene.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SceneLayerStack {
    pub layers: Vec<SceneLayerKind>,
}

impl SceneLayerStack {
    #[must_use]
    pub fn canonical() -> Self {
        Self {
            layers: vec![
                SceneLayerKind::Background,
                SceneLayerKind::Grid,
                SceneLayerKind::Axis,
                SceneLayerKind::Connectors,
                SceneLayerKind::Series,
                SceneLayerKind::Nodes,
                SceneLayerKind::Markers,
                SceneLayerKind::Labels,
                SceneLayerKind::Legend,
                SceneLayerKind::Overlay,
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{SceneLayerKind, SceneLayerStack};

    #[test]
    fn canonical_stack_paints_grid_below_series_and_labels_on_top() {
        let stack = SceneLayerStack::canonical();
        let position = |kind| {
            stack
                .layers
                .iter()
                .position(|layer| *layer == kind)
                .expect("layer present")
        };
        assert!(position(SceneLayerKind::Grid) < position(SceneLayerKind::Series));
        assert!(position(SceneLayerKind::Connectors) < position(SceneLayerKind::Nodes));
        assert!(position(SceneLayerKind::Series) < position(SceneLayerKind::Labels));
        assert_eq!(stack.layers.last(), Some(&SceneLayerKind::Overlay));
    }
}
