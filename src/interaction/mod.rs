use serde::{Deserialize, Serialize};

/// Whether an element is currently being dragged in the designer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum InteractionMode {
    #[default]
    Idle,
    Dragging,
}

/// Element placement on the page in millimeters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct ElementGeometry {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// How the placement changed between two designer renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GeometryChange {
    Unchanged,
    Moved,
    /// Size changed; a position change at the same time is implied.
    Resized,
}

impl GeometryChange {
    #[must_use]
    pub fn is_resize(self) -> bool {
        self == Self::Resized
    }
}

/// Sub-micrometer jitter from host coordinate round trips is not movement.
const GEOMETRY_EPSILON_MM: f64 = 1e-6;

impl ElementGeometry {
    #[must_use]
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    #[must_use]
    pub fn change_from(self, previous: Self) -> GeometryChange {
        let differs = |a: f64, b: f64| (a - b).abs() > GEOMETRY_EPSILON_MM;
        if differs(self.width, previous.width) || differs(self.height, previous.height) {
            GeometryChange::Resized
        } else if differs(self.x, previous.x) || differs(self.y, previous.y) {
            GeometryChange::Moved
        } else {
            GeometryChange::Unchanged
        }
    }
}
