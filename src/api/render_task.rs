use crate::core::{SceneSize, TreeLayoutMetrics};
use crate::error::{ChartResult, ConversionError};
use crate::render::{RasterPayload, RasterPipeline, Scene, SceneStats};

use super::chart_scene_builder::build_chart_scene_with;
use super::data_source::{ChartData, ResolvedData};
use super::diagram_scene_builder::build_diagram_scene_with;
use super::instance_store::{ElementConfig, RenderPlan};
use super::scene_style::append_sample_caption;
use super::SceneStyle;

/// Builds the chart or diagram scene for resolved data, captioned when the
/// data is the built-in sample.
pub fn build_element_scene(
    data: &ResolvedData,
    config: &ElementConfig,
    size: SceneSize,
    style: &SceneStyle,
) -> ChartResult<Scene> {
    let mut scene = match &data.data {
        ChartData::Series(points) => build_chart_scene_with(&config.chart, points, size, style)?,
        ChartData::Tree(root) => build_diagram_scene_with(
            &config.diagram,
            root,
            size,
            style,
            TreeLayoutMetrics::default(),
        )?,
    };
    if data.is_sample() {
        append_sample_caption(&mut scene, style);
    }
    Ok(scene)
}

pub fn build_plan_scene(plan: &RenderPlan, style: &SceneStyle) -> ChartResult<Scene> {
    let size = SceneSize::from_millimeters(plan.geometry.width, plan.geometry.height);
    build_element_scene(&plan.data, &plan.config, size, style)
}

/// A built scene waiting for conversion. `Send`, so hosts may run
/// [`RenderTask::execute`] on a worker of their own.
#[derive(Debug, Clone)]
pub struct RenderTask {
    plan: RenderPlan,
    scene: Scene,
}

/// Conversion result handed back to `ChartPlugin::finish_render`.
#[derive(Debug)]
pub struct CompletedRender {
    pub plan: RenderPlan,
    pub stats: SceneStats,
    pub result: Result<RasterPayload, ConversionError>,
}

impl RenderTask {
    #[must_use]
    pub fn new(plan: RenderPlan, scene: Scene) -> Self {
        Self { plan, scene }
    }

    #[must_use]
    pub fn plan(&self) -> &RenderPlan {
        &self.plan
    }

    #[must_use]
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.plan.token.is_cancelled()
    }

    #[must_use]
    pub fn execute(self, pipeline: &RasterPipeline) -> CompletedRender {
        let stats = self.scene.stats();
        let result = pipeline.scene_to_raster_payload_with_cancel(&self.scene, &self.plan.token);
        CompletedRender {
            plan: self.plan,
            stats,
            result,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::RenderTask;

    fn assert_send<T: Send>() {}

    #[test]
    fn render_task_can_cross_threads() {
        assert_send::<RenderTask>();
    }
}
