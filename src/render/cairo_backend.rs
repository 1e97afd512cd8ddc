use std::f64::consts::{FRAC_PI_2, PI, TAU};
use std::io::Write;

use cairo::{Context, Format, ImageSurface};
use pango::FontDescription;
use tracing::trace;

use crate::core::PathCommand;
use crate::error::{ChartError, ChartResult};
use crate::render::{
    CirclePrimitive, Color, LinePrimitive, LineStrokeStyle, PathPrimitive, RectPrimitive, Scene,
    Stroke, TextHAlign, TextPrimitive,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CairoRenderStats {
    pub lines_drawn: usize,
    pub rects_drawn: usize,
    pub paths_drawn: usize,
    pub circles_drawn: usize,
    pub texts_drawn: usize,
}

/// Cairo + Pango scene drawer for live previews.
///
/// Draws into its own image surface through [`CairoSceneRenderer::render`],
/// or onto a host-owned context (a widget draw callback) through
/// [`CairoSceneRenderer::render_on_cairo_context`]. Layers are painted in
/// scene order, so later layers cover earlier ones.
#[derive(Debug)]
pub struct CairoSceneRenderer {
    surface: ImageSurface,
    clear_color: Color,
    last_stats: CairoRenderStats,
}

impl CairoSceneRenderer {
    pub fn new(width: i32, height: i32) -> ChartResult<Self> {
        if width <= 0 || height <= 0 {
            return Err(ChartError::InvalidData(
                "cairo surface size must be > 0".to_owned(),
            ));
        }

        let surface = ImageSurface::create(Format::ARgb32, width, height)
            .map_err(|err| map_backend_error("failed to create cairo surface", err))?;
        Ok(Self {
            surface,
            clear_color: Color::rgb(1.0, 1.0, 1.0),
            last_stats: CairoRenderStats::default(),
        })
    }

    /// Surface sized to the scene's pixel dimensions.
    pub fn for_scene(scene: &Scene) -> ChartResult<Self> {
        scene.size.validate()?;
        Self::new(
            scene.size.width.ceil() as i32,
            scene.size.height.ceil() as i32,
        )
    }

    #[must_use]
    pub fn backend_name(&self) -> &'static str {
        "cairo+pango+pangocairo"
    }

    #[must_use]
    pub fn surface(&self) -> &ImageSurface {
        &self.surface
    }

    pub fn set_clear_color(&mut self, color: Color) -> ChartResult<()> {
        color.validate()?;
        self.clear_color = color;
        Ok(())
    }

    #[must_use]
    pub fn last_stats(&self) -> CairoRenderStats {
        self.last_stats
    }

    pub fn render(&mut self, scene: &Scene) -> ChartResult<()> {
        let context = Context::new(&self.surface)
            .map_err(|err| map_backend_error("failed to create cairo context", err))?;
        self.render_on_cairo_context(&context, scene)
    }

    pub fn render_on_cairo_context(&mut self, context: &Context, scene: &Scene) -> ChartResult<()> {
        scene.validate()?;

        apply_color(context, scene.background.unwrap_or(self.clear_color));
        context
            .paint()
            .map_err(|err| map_backend_error("failed to clear surface", err))?;

        let mut stats = CairoRenderStats::default();
        for layer in &scene.layers {
            for rect in &layer.rects {
                draw_rect(context, rect)?;
                stats.rects_drawn += 1;
            }
            for path in &layer.paths {
                draw_path(context, path)?;
                stats.paths_drawn += 1;
            }
            for line in &layer.lines {
                draw_line(context, line)?;
                stats.lines_drawn += 1;
            }
            for circle in &layer.circles {
                draw_circle(context, circle)?;
                stats.circles_drawn += 1;
            }
            for text in &layer.texts {
                draw_text(context, text);
                stats.texts_drawn += 1;
            }
        }

        trace!(
            rects = stats.rects_drawn,
            paths = stats.paths_drawn,
            texts = stats.texts_drawn,
            "cairo scene drawn"
        );
        self.last_stats = stats;
        Ok(())
    }

    /// Writes the current surface as PNG.
    pub fn write_png<W: Write>(&self, writer: &mut W) -> ChartResult<()> {
        self.surface
            .write_to_png(writer)
            .map_err(|err| ChartError::InvalidData(format!("failed to write png: {err}")))
    }
}

fn apply_color(context: &Context, color: Color) {
    context.set_source_rgba(color.red, color.green, color.blue, color.alpha);
}

fn apply_stroke(context: &Context, width: f64, color: Color, style: LineStrokeStyle) {
    apply_color(context, color);
    context.set_line_width(width);
    match style {
        LineStrokeStyle::Solid => context.set_dash(&[], 0.0),
        LineStrokeStyle::Dashed => context.set_dash(&[3.0, 3.0], 0.0),
        LineStrokeStyle::Dotted => context.set_dash(&[1.0, 2.0], 0.0),
    }
}

fn fill_then_stroke(
    context: &Context,
    fill: Option<Color>,
    stroke: Option<Stroke>,
    what: &str,
) -> ChartResult<()> {
    if let Some(fill) = fill {
        apply_color(context, fill);
        context
            .fill_preserve()
            .map_err(|err| map_backend_error(&format!("failed to fill {what}"), err))?;
    }
    if let Some(stroke) = stroke {
        apply_stroke(context, stroke.width, stroke.color, stroke.style);
        context
            .stroke_preserve()
            .map_err(|err| map_backend_error(&format!("failed to stroke {what}"), err))?;
    }
    context.new_path();
    Ok(())
}

fn draw_line(context: &Context, line: &LinePrimitive) -> ChartResult<()> {
    apply_stroke(context, line.stroke_width, line.color, line.stroke_style);
    context.move_to(line.x1, line.y1);
    context.line_to(line.x2, line.y2);
    context
        .stroke()
        .map_err(|err| map_backend_error("failed to stroke line", err))
}

fn draw_rect(context: &Context, rect: &RectPrimitive) -> ChartResult<()> {
    append_rect_path(context, *rect);
    let border = (rect.border_width > 0.0).then(|| Stroke::solid(rect.border_color, rect.border_width));
    fill_then_stroke(context, Some(rect.fill_color), border, "rectangle")
}

fn draw_path(context: &Context, path: &PathPrimitive) -> ChartResult<()> {
    context.new_path();
    for command in &path.data.commands {
        match *command {
            PathCommand::MoveTo(point) => context.move_to(point.x, point.y),
            PathCommand::LineTo(point) => context.line_to(point.x, point.y),
            PathCommand::CubicTo {
                control1,
                control2,
                to,
            } => context.curve_to(control1.x, control1.y, control2.x, control2.y, to.x, to.y),
            PathCommand::Close => context.close_path(),
        }
    }
    fill_then_stroke(context, path.fill, path.stroke, "path")
}

fn draw_circle(context: &Context, circle: &CirclePrimitive) -> ChartResult<()> {
    context.new_sub_path();
    context.arc(circle.cx, circle.cy, circle.radius, 0.0, TAU);
    context.close_path();
    fill_then_stroke(context, Some(circle.fill), circle.stroke, "circle")
}

fn draw_text(context: &Context, text: &TextPrimitive) {
    let layout = pangocairo::functions::create_layout(context);
    let weight = if text.bold { " Bold" } else { "" };
    let font_description =
        FontDescription::from_string(&format!("Sans{weight} {}px", text.font_size_px));
    layout.set_font_description(Some(&font_description));
    layout.set_text(&text.text);

    // Scene text is anchored on the baseline.
    let (text_width, _) = layout.pixel_size();
    let baseline = f64::from(layout.baseline()) / f64::from(pango::SCALE);
    let x = match text.h_align {
        TextHAlign::Left => text.x,
        TextHAlign::Center => text.x - f64::from(text_width) / 2.0,
        TextHAlign::Right => text.x - f64::from(text_width),
    };

    apply_color(context, text.color);
    context.move_to(x, text.y - baseline);
    pangocairo::functions::show_layout(context, &layout);
}

fn append_rect_path(context: &Context, rect: RectPrimitive) {
    context.new_path();
    if rect.corner_radius <= 0.0 {
        context.rectangle(rect.x, rect.y, rect.width, rect.height);
        return;
    }

    let radius = rect
        .corner_radius
        .min(rect.width * 0.5)
        .min(rect.height * 0.5);
    let left = rect.x;
    let top = rect.y;
    let right = rect.x + rect.width;
    let bottom = rect.y + rect.height;

    context.new_sub_path();
    context.arc(right - radius, top + radius, radius, -FRAC_PI_2, 0.0);
    context.arc(right - radius, bottom - radius, radius, 0.0, FRAC_PI_2);
    context.arc(left + radius, bottom - radius, radius, FRAC_PI_2, PI);
    context.arc(left + radius, top + radius, radius, PI, PI + FRAC_PI_2);
    context.close_path();
}

fn map_backend_error(prefix: &str, err: cairo::Error) -> ChartError {
    ChartError::InvalidData(format!("{prefix}: {err}"))
}
