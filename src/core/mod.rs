pub mod area_series;
pub mod axis;
pub mod bar_series;
pub mod line_series;
pub mod path;
pub mod pie;
pub mod primitives;
pub mod scale;
pub mod tree;
pub mod types;

pub use area_series::{AreaGeometry, project_area_geometry};
pub use axis::{
    AxisScale, DEFAULT_GRID_LINE_COUNT, compute_axis_scale, compute_axis_scale_with,
    format_axis_value,
};
pub use bar_series::{BarGeometry, project_bars};
pub use line_series::{ProjectedPoint, project_line_path, project_series_points};
pub use path::{Interpolation, PathCommand, PathData, generate_area_path, generate_path};
pub use pie::{PIE_LABEL_MIN_SHARE, PieSlice, allocate_pie_angles, polar_point};
pub use scale::{BandScale, LinearScale};
pub use tree::{
    LayoutBounds, PositionedNode, TreeLayoutMetrics, TreeNode, layout_tree, layout_tree_with,
};
pub use types::{
    Point2, SceneSize, SeriesPoint, SeriesSlot, Viewport, ZOOM, active_series,
    all_series_values,
};
