use std::f64::consts::FRAC_PI_2;

use tracing::debug;

use crate::core::{
    AxisScale, BandScale, LinearScale, PathData, PieSlice, Point2, SceneSize,
    SeriesPoint, SeriesSlot, active_series, all_series_values, allocate_pie_angles,
    compute_axis_scale, format_axis_value, polar_point, project_area_geometry, project_bars,
    project_line_path, project_series_points,
};
use crate::core::line_series::ProjectedPoint;
use crate::error::{ChartError, ChartResult};
use crate::render::{
    CirclePrimitive, Color, LinePrimitive, PathPrimitive, RectPrimitive, Scene, SceneLayerKind,
    Stroke, TextHAlign, TextPrimitive,
};

use super::scene_style::{slice_color, slot_color, truncate_to_width};
use super::{ChartConfig, ChartType, SceneStyle};

/// Pixel rectangle inside the margins where series are drawn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlotArea {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl PlotArea {
    pub fn from_scene(size: SceneSize, style: &SceneStyle) -> ChartResult<Self> {
        let area = Self {
            left: style.margins.left,
            top: style.margins.top,
            right: size.width - style.margins.right,
            bottom: size.height - style.margins.bottom,
        };
        if area.width() <= 0.0 || area.height() <= 0.0 {
            return Err(ChartError::InvalidData(format!(
                "scene {}x{} leaves no room for the plot area",
                size.width, size.height
            )));
        }
        Ok(area)
    }

    #[must_use]
    pub fn width(self) -> f64 {
        self.right - self.left
    }

    #[must_use]
    pub fn height(self) -> f64 {
        self.bottom - self.top
    }
}

#[derive(Debug, Clone, Copy)]
struct SeriesRenderContext {
    plot: PlotArea,
    bands: BandScale,
    values: LinearScale,
    color_a: Color,
    color_b: Color,
}

pub fn build_chart_scene(
    config: &ChartConfig,
    points: &[SeriesPoint],
    size: SceneSize,
) -> ChartResult<Scene> {
    build_chart_scene_with(config, points, size, &SceneStyle::default())
}

/// Builds the vector scene for a bar, line, area or pie chart.
pub fn build_chart_scene_with(
    config: &ChartConfig,
    points: &[SeriesPoint],
    size: SceneSize,
    style: &SceneStyle,
) -> ChartResult<Scene> {
    size.validate()?;
    style.validate()?;
    if points.is_empty() {
        return Err(ChartError::InvalidData(
            "chart needs at least one data point".to_owned(),
        ));
    }
    points.iter().try_for_each(SeriesPoint::validate)?;

    let (color_a, color_b) = config.resolved_series_colors();
    let mut scene = Scene::new(size).with_background(Color::WHITE);
    match config.chart_type {
        ChartType::Pie => append_pie(&mut scene, points, color_a, color_b, style)?,
        ChartType::Bar | ChartType::Line | ChartType::Area => {
            append_cartesian(&mut scene, config, points, color_a, color_b, style)?;
        }
    }
    scene.validate()?;

    debug!(
        chart_type = ?config.chart_type,
        points = points.len(),
        stats = ?scene.stats(),
        "built chart scene"
    );
    Ok(scene)
}

fn append_cartesian(
    scene: &mut Scene,
    config: &ChartConfig,
    points: &[SeriesPoint],
    color_a: Color,
    color_b: Color,
    style: &SceneStyle,
) -> ChartResult<()> {
    let plot = PlotArea::from_scene(scene.size, style)?;
    let axis = compute_axis_scale(&all_series_values(points))?;
    let ctx = SeriesRenderContext {
        plot,
        bands: BandScale::new(plot.left, plot.width(), points.len())?,
        values: LinearScale::new(0.0, axis.max, plot.bottom, plot.top)?,
        color_a,
        color_b,
    };

    append_value_axis(scene, config, &axis, ctx, style);
    append_category_labels(scene, points, ctx, style);

    let slots = active_series(points);
    match config.chart_type {
        ChartType::Bar => append_bars(scene, points, &slots, ctx, style)?,
        ChartType::Area => {
            for slot in &slots {
                append_area_series(scene, config, points, *slot, ctx, style);
            }
        }
        ChartType::Line | ChartType::Pie => {
            for slot in &slots {
                append_line_series(scene, config, points, *slot, ctx, style);
            }
        }
    }
    Ok(())
}

fn append_value_axis(
    scene: &mut Scene,
    config: &ChartConfig,
    axis: &AxisScale,
    ctx: SeriesRenderContext,
    style: &SceneStyle,
) {
    let plot = ctx.plot;
    for value in &axis.grid_lines {
        let y = ctx.values.to_pixel(*value);
        if config.show_grid {
            scene.push_line(
                SceneLayerKind::Grid,
                LinePrimitive::new(
                    plot.left,
                    y,
                    plot.right,
                    y,
                    style.grid_line_width,
                    style.grid_color,
                )
                .with_stroke_style(style.grid_line_style),
            );
        }
        scene.push_text(
            SceneLayerKind::Axis,
            TextPrimitive::new(
                format_axis_value(*value),
                plot.left - 8.0,
                y + style.tick_font_size_px * 0.35,
                style.tick_font_size_px,
                style.label_color,
                TextHAlign::Right,
            ),
        );
    }

    scene.push_line(
        SceneLayerKind::Axis,
        LinePrimitive::new(
            plot.left,
            plot.bottom,
            plot.right,
            plot.bottom,
            style.axis_line_width,
            style.axis_color,
        ),
    );
    scene.push_line(
        SceneLayerKind::Axis,
        LinePrimitive::new(
            plot.left,
            plot.top,
            plot.left,
            plot.bottom,
            style.axis_line_width,
            style.axis_color,
        ),
    );
}

fn append_category_labels(
    scene: &mut Scene,
    points: &[SeriesPoint],
    ctx: SeriesRenderContext,
    style: &SceneStyle,
) {
    let baseline = ctx.plot.bottom + style.category_font_size_px + 6.0;
    for (index, point) in points.iter().enumerate() {
        if point.name.is_empty() {
            continue;
        }
        let label = truncate_to_width(
            &point.name,
            style.category_font_size_px,
            ctx.bands.band_width(),
        );
        scene.push_text(
            SceneLayerKind::Labels,
            TextPrimitive::new(
                label,
                ctx.bands.center(index),
                baseline,
                style.category_font_size_px,
                style.label_color,
                TextHAlign::Center,
            ),
        );
    }
}

fn append_bars(
    scene: &mut Scene,
    points: &[SeriesPoint],
    slots: &[SeriesSlot],
    ctx: SeriesRenderContext,
    style: &SceneStyle,
) -> ChartResult<()> {
    let bars = project_bars(
        points,
        slots,
        ctx.bands,
        ctx.values,
        ctx.plot.bottom,
        style.bar_group_ratio,
    )?;
    for bar in bars {
        let color = slot_color(bar.slot, ctx.color_a, ctx.color_b);
        scene.push_rect(
            SceneLayerKind::Series,
            RectPrimitive::new(bar.x, bar.y, bar.width, bar.height, color),
        );
        append_value_label(scene, bar.center_x(), bar.y, bar.value, style);
    }
    Ok(())
}

fn append_line_series(
    scene: &mut Scene,
    config: &ChartConfig,
    points: &[SeriesPoint],
    slot: SeriesSlot,
    ctx: SeriesRenderContext,
    style: &SceneStyle,
) {
    let projected = project_series_points(points, slot, ctx.bands, ctx.values);
    if projected.is_empty() {
        return;
    }
    let color = slot_color(slot, ctx.color_a, ctx.color_b);
    let line = project_line_path(&projected, config.interpolation);
    scene.push_path(
        SceneLayerKind::Series,
        PathPrimitive::stroked(line, Stroke::solid(color, style.series_line_width)),
    );
    append_point_decorations(scene, config, &projected, color, style);
}

fn append_area_series(
    scene: &mut Scene,
    config: &ChartConfig,
    points: &[SeriesPoint],
    slot: SeriesSlot,
    ctx: SeriesRenderContext,
    style: &SceneStyle,
) {
    let projected = project_series_points(points, slot, ctx.bands, ctx.values);
    if projected.is_empty() {
        return;
    }
    let color = slot_color(slot, ctx.color_a, ctx.color_b);
    let geometry = project_area_geometry(&projected, config.interpolation, ctx.plot.bottom);
    scene.push_path(
        SceneLayerKind::Series,
        PathPrimitive::filled(geometry.fill, color.with_alpha(style.area_fill_alpha)),
    );
    scene.push_path(
        SceneLayerKind::Series,
        PathPrimitive::stroked(geometry.line, Stroke::solid(color, style.series_line_width)),
    );
    append_point_decorations(scene, config, &projected, color, style);
}

fn append_point_decorations(
    scene: &mut Scene,
    config: &ChartConfig,
    projected: &[ProjectedPoint],
    color: Color,
    style: &SceneStyle,
) {
    for point in projected {
        if config.show_points {
            scene.push_circle(
                SceneLayerKind::Markers,
                CirclePrimitive::new(point.x, point.y, style.point_radius_px, color)
                    .with_stroke(Stroke::solid(Color::WHITE, 1.5)),
            );
        }
        append_value_label(
            scene,
            point.x,
            point.y - style.point_radius_px,
            point.value,
            style,
        );
    }
}

fn append_value_label(scene: &mut Scene, x: f64, top: f64, value: f64, style: &SceneStyle) {
    scene.push_text(
        SceneLayerKind::Labels,
        TextPrimitive::new(
            format_axis_value(value),
            x,
            top - style.value_label_offset_px,
            style.value_font_size_px,
            style.label_color,
            TextHAlign::Center,
        ),
    );
}

fn append_pie(
    scene: &mut Scene,
    points: &[SeriesPoint],
    color_a: Color,
    color_b: Color,
    style: &SceneStyle,
) -> ChartResult<()> {
    let values: Vec<f64> = points.iter().map(|point| point.value).collect();
    let slices = allocate_pie_angles(&values)?;

    let size = scene.size;
    let legend_width = style.legend_width_px.min(size.width * 0.4);
    let pie_width = size.width - legend_width;
    let center = Point2::new(pie_width * 0.5, size.height * 0.5);
    let radius = pie_width.min(size.height) * 0.5 * style.pie_radius_ratio;
    if radius <= 0.0 {
        return Err(ChartError::InvalidData(format!(
            "scene {}x{} leaves no room for the pie",
            size.width, size.height
        )));
    }

    let separator = Stroke::solid(Color::WHITE, 1.0);
    for (index, slice) in slices.iter().enumerate() {
        let color = slice_color(index, color_a, color_b);
        if slice.is_full_circle() {
            scene.push_circle(
                SceneLayerKind::Series,
                CirclePrimitive::new(center.x, center.y, radius, color),
            );
        } else if slice.sweep() > 0.0 {
            scene.push_path(
                SceneLayerKind::Series,
                PathPrimitive::filled(slice_path(center, radius, *slice), color)
                    .with_stroke(separator),
            );
        }
        if slice.show_label {
            let anchor = polar_point(
                center,
                radius * style.pie_label_radius_ratio,
                slice.mid_angle(),
            );
            scene.push_text(
                SceneLayerKind::Labels,
                TextPrimitive::new(
                    format_share(slice.share),
                    anchor.x,
                    anchor.y + style.value_font_size_px * 0.35,
                    style.value_font_size_px,
                    Color::WHITE,
                    TextHAlign::Center,
                )
                .bold(),
            );
        }
    }

    append_pie_legend(scene, points, &slices, pie_width, color_a, color_b, style);
    Ok(())
}

fn append_pie_legend(
    scene: &mut Scene,
    points: &[SeriesPoint],
    slices: &[PieSlice],
    legend_x: f64,
    color_a: Color,
    color_b: Color,
    style: &SceneStyle,
) {
    let rows = points.len() as f64;
    let mut row_top = (scene.size.height - rows * style.legend_row_height_px) * 0.5;
    let label_width = scene.size.width - legend_x - style.legend_swatch_px - 6.0;
    for (index, (point, slice)) in points.iter().zip(slices).enumerate() {
        let swatch_y = row_top + (style.legend_row_height_px - style.legend_swatch_px) * 0.5;
        scene.push_rect(
            SceneLayerKind::Legend,
            RectPrimitive::new(
                legend_x,
                swatch_y,
                style.legend_swatch_px,
                style.legend_swatch_px,
                slice_color(index, color_a, color_b),
            ),
        );
        let entry = format!("{} ({})", point.name, format_share(slice.share));
        scene.push_text(
            SceneLayerKind::Legend,
            TextPrimitive::new(
                truncate_to_width(&entry, style.tick_font_size_px, label_width.max(0.0)),
                legend_x + style.legend_swatch_px + 6.0,
                swatch_y + style.legend_swatch_px,
                style.tick_font_size_px,
                style.label_color,
                TextHAlign::Left,
            ),
        );
        row_top += style.legend_row_height_px;
    }
}

fn format_share(share: f64) -> String {
    format!("{:.0}%", share * 100.0)
}

/// Closed wedge: center, arc as cubic segments of at most a quarter turn.
fn slice_path(center: Point2, radius: f64, slice: PieSlice) -> PathData {
    let mut path = PathData::new();
    path.move_to(center);
    path.line_to(polar_point(center, radius, slice.start_angle));

    let segments = (slice.sweep() / FRAC_PI_2).ceil().max(1.0) as usize;
    let step = slice.sweep() / segments as f64;
    let handle = 4.0 / 3.0 * (step / 4.0).tan() * radius;
    let mut angle = slice.start_angle;
    for _ in 0..segments {
        let end = angle + step;
        let from = polar_point(center, radius, angle);
        let to = polar_point(center, radius, end);
        let control1 = Point2::new(from.x - handle * angle.sin(), from.y + handle * angle.cos());
        let control2 = Point2::new(to.x + handle * end.sin(), to.y - handle * end.cos());
        path.cubic_to(control1, control2, to);
        angle = end;
    }
    path.close();
    path
}
