use crate::core::SeriesSlot;
use crate::error::ChartResult;
use crate::render::{Color, LineStrokeStyle, Scene, SceneLayerKind, TextHAlign, TextPrimitive};

use super::SAMPLE_DATA_CAPTION;

/// Fallback palette for pie slices beyond the two configured series colors
/// and for the third series slot.
pub const PALETTE: [Color; 8] = [
    Color::rgb(0.533, 0.518, 0.847),
    Color::rgb(0.510, 0.792, 0.616),
    Color::rgb(1.0, 0.776, 0.345),
    Color::rgb(1.0, 0.502, 0.259),
    Color::rgb(0.0, 0.533, 0.996),
    Color::rgb(0.0, 0.769, 0.624),
    Color::rgb(1.0, 0.733, 0.157),
    Color::rgb(1.0, 0.502, 0.502),
];

/// Plot-area insets in scene pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlotMargins {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Default for PlotMargins {
    fn default() -> Self {
        Self {
            top: 20.0,
            right: 20.0,
            bottom: 40.0,
            left: 50.0,
        }
    }
}

/// Visual constants shared by the chart and diagram scene builders.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneStyle {
    pub margins: PlotMargins,
    pub axis_color: Color,
    pub axis_line_width: f64,
    pub grid_color: Color,
    pub grid_line_width: f64,
    pub grid_line_style: LineStrokeStyle,
    pub label_color: Color,
    pub tick_font_size_px: f64,
    pub value_font_size_px: f64,
    pub category_font_size_px: f64,
    pub value_label_offset_px: f64,
    pub bar_group_ratio: f64,
    pub series_line_width: f64,
    pub point_radius_px: f64,
    pub area_fill_alpha: f64,
    pub pie_radius_ratio: f64,
    pub pie_label_radius_ratio: f64,
    pub legend_width_px: f64,
    pub legend_row_height_px: f64,
    pub legend_swatch_px: f64,
    pub node_corner_radius_px: f64,
    pub node_font_size_px: f64,
    pub connector_color: Color,
    pub connector_width: f64,
    pub diagram_padding_px: f64,
    pub caption_color: Color,
    pub caption_font_size_px: f64,
}

impl Default for SceneStyle {
    fn default() -> Self {
        Self {
            margins: PlotMargins::default(),
            axis_color: Color::rgb(0.4, 0.4, 0.4),
            axis_line_width: 1.0,
            grid_color: Color::rgb(0.878, 0.878, 0.878),
            grid_line_width: 1.0,
            grid_line_style: LineStrokeStyle::Dashed,
            label_color: Color::rgb(0.2, 0.2, 0.2),
            tick_font_size_px: 11.0,
            value_font_size_px: 11.0,
            category_font_size_px: 12.0,
            value_label_offset_px: 5.0,
            bar_group_ratio: 0.7,
            series_line_width: 2.0,
            point_radius_px: 4.0,
            area_fill_alpha: 0.3,
            pie_radius_ratio: 0.8,
            pie_label_radius_ratio: 0.65,
            legend_width_px: 120.0,
            legend_row_height_px: 18.0,
            legend_swatch_px: 10.0,
            node_corner_radius_px: 8.0,
            node_font_size_px: 13.0,
            connector_color: Color::rgb(0.6, 0.6, 0.6),
            connector_width: 2.0,
            diagram_padding_px: 16.0,
            caption_color: Color::rgb(0.8, 0.2, 0.2),
            caption_font_size_px: 12.0,
        }
    }
}

impl SceneStyle {
    pub fn validate(self) -> ChartResult<()> {
        for color in [
            self.axis_color,
            self.grid_color,
            self.label_color,
            self.connector_color,
            self.caption_color,
        ] {
            color.validate()?;
        }
        Ok(())
    }
}

/// Marks a scene rendered from the built-in dataset.
pub fn append_sample_caption(scene: &mut Scene, style: &SceneStyle) {
    let x = scene.size.width - 8.0;
    let y = 8.0 + style.caption_font_size_px;
    scene.push_text(
        SceneLayerKind::Overlay,
        TextPrimitive::new(
            SAMPLE_DATA_CAPTION,
            x,
            y,
            style.caption_font_size_px,
            style.caption_color,
            TextHAlign::Right,
        )
        .bold(),
    );
}

/// Color used for a series slot given the two configured colors.
#[must_use]
pub fn slot_color(slot: SeriesSlot, color_a: Color, color_b: Color) -> Color {
    match slot {
        SeriesSlot::A => color_a,
        SeriesSlot::B => color_b,
        SeriesSlot::C => PALETTE[2],
    }
}

/// Pie slice colors: the two series colors first, then the palette.
#[must_use]
pub fn slice_color(index: usize, color_a: Color, color_b: Color) -> Color {
    match index {
        0 => color_a,
        1 => color_b,
        _ => PALETTE[(index - 2) % PALETTE.len()],
    }
}

/// Rough text width estimate for layout decisions (no font metrics).
#[must_use]
pub fn estimate_text_width(text: &str, font_size_px: f64) -> f64 {
    text.chars().count() as f64 * font_size_px * 0.6
}

/// Truncates `text` with an ellipsis so it fits `max_width`.
#[must_use]
pub fn truncate_to_width(text: &str, font_size_px: f64, max_width: f64) -> String {
    if estimate_text_width(text, font_size_px) <= max_width {
        return text.to_owned();
    }
    let max_chars = (max_width / (font_size_px * 0.6)).floor() as usize;
    if max_chars <= 1 {
        return "…".to_owned();
    }
    let mut truncated: String = text.chars().take(max_chars - 1).collect();
    truncated.push('…');
    truncated
}
