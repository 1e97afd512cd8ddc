use std::thread;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{ChartError, ChartResult, ConversionError};
use crate::extensions::{ObserverContext, PipelineEvent, PipelineObserver};
use crate::interaction::InteractionMode;
use crate::render::{RasterPayload, RasterPipeline, Scene, SceneStats};

use super::data_source::resolve_chart_data;
use super::instance_store::{
    ElementConfig, InstanceId, InstanceStore, InstanceTracker, MemoryInstanceStore, RenderDecision, RenderPlan,
    RenderReason, RenderRequest, SkipReason,
};
use super::property_schema::{PropPanel, prop_panel};
use super::render_task::{CompletedRender, RenderTask, build_element_scene, build_plan_scene};
use super::{ChangeEvent, ChartSchema, PipelineConfig, SchemaKind, SceneStyle};

/// Host surface the plugin is rendering into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum RenderMode {
    #[default]
    Designer,
    Form,
    Viewer,
}

/// What the host should currently display for the element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MountedView<'a> {
    /// Live vector scene, shown while the raster payload is produced.
    Scene(&'a Scene),
    /// Previously produced data URL.
    Cached(&'a str),
    Empty,
}

/// Live display target owned by the host.
pub trait SceneMount {
    fn mount(&mut self, view: MountedView<'_>);
}

/// Summary of the last mounted view, for headless hosts and tests.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum MountRecord {
    #[default]
    Nothing,
    Scene(SceneStats),
    Cached(String),
    Empty,
}

/// Mount that only remembers what it was given.
#[derive(Debug, Default)]
pub struct HeadlessMount {
    pub mounts: usize,
    pub last: MountRecord,
}

impl SceneMount for HeadlessMount {
    fn mount(&mut self, view: MountedView<'_>) {
        self.mounts += 1;
        self.last = match view {
            MountedView::Scene(scene) => MountRecord::Scene(scene.stats()),
            MountedView::Cached(data_url) => MountRecord::Cached(data_url.to_owned()),
            MountedView::Empty => MountRecord::Empty,
        };
    }
}

/// Live preview mount. Cached payloads are left to the host's image widget.
#[cfg(feature = "cairo-backend")]
impl SceneMount for crate::render::CairoSceneRenderer {
    fn mount(&mut self, view: MountedView<'_>) {
        if let MountedView::Scene(scene) = view {
            if let Err(err) = self.render(scene) {
                warn!(error = %err, "cairo preview draw failed");
            }
        }
    }
}

/// Arguments of one interactive render.
pub struct UiRenderProps<'a> {
    pub schema: &'a ChartSchema,
    /// Current `content` value as the host sees it.
    pub value: &'a str,
    pub on_change: &'a mut dyn FnMut(ChangeEvent),
    pub mount: &'a mut dyn SceneMount,
    pub mode: RenderMode,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiOutcome {
    IdentifierAssigned(InstanceId),
    Skipped(SkipReason),
    Reused,
    Rendered {
        reason: RenderReason,
        payload_bytes: usize,
    },
    /// Form/viewer display without touching instance state.
    Displayed,
    /// A newer render of the same element superseded this one.
    Discarded,
    Failed(String),
}

/// Result of the first half of the split render API.
#[derive(Debug)]
pub enum PreparedRender {
    Task(RenderTask),
    Reuse { data_url: String },
    Settled(UiOutcome),
}

/// Arguments of one embed-time render.
#[derive(Debug, Clone, Copy)]
pub struct PdfRenderProps<'a> {
    pub schema: &'a ChartSchema,
    /// Stored payload; falls back to `schema.content` when empty.
    pub value: &'a str,
}

/// Image placement handed to the document composer, in millimeters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageEmbedRequest<'a> {
    pub name: &'a str,
    pub data_url: &'a str,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub pixel_width: u32,
    pub pixel_height: u32,
}

/// Host hook that embeds an image into the composed document.
pub trait ImageEmbedder {
    fn embed_image(&mut self, request: &ImageEmbedRequest<'_>) -> ChartResult<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EmbedOutcome {
    Embedded,
    /// No payload was ever produced; the element stays blank.
    Placeholder,
}

/// Chart/diagram element plugin: interactive render, embed-time render and
/// property-panel export.
pub struct ChartPlugin<S: InstanceStore = MemoryInstanceStore> {
    tracker: InstanceTracker<S>,
    pipeline: RasterPipeline,
    style: SceneStyle,
    settle_delay: Duration,
    observers: Vec<Box<dyn PipelineObserver>>,
}

impl<S: InstanceStore> std::fmt::Debug for ChartPlugin<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChartPlugin")
            .field("pipeline", &self.pipeline)
            .field("settle_delay", &self.settle_delay)
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl ChartPlugin<MemoryInstanceStore> {
    /// In-memory store and the resvg rasterizer.
    #[must_use]
    pub fn with_defaults(config: PipelineConfig) -> Self {
        Self::new(
            MemoryInstanceStore::new(),
            RasterPipeline::with_resvg(config.raster),
            config,
        )
    }
}

impl<S: InstanceStore> ChartPlugin<S> {
    #[must_use]
    pub fn new(store: S, pipeline: RasterPipeline, config: PipelineConfig) -> Self {
        Self {
            tracker: InstanceTracker::new(store).with_policy(config.tracker),
            pipeline,
            style: SceneStyle::default(),
            settle_delay: config.settle_delay(),
            observers: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_style(mut self, style: SceneStyle) -> Self {
        self.style = style;
        self
    }

    #[must_use]
    pub fn tracker(&self) -> &InstanceTracker<S> {
        &self.tracker
    }

    pub fn tracker_mut(&mut self) -> &mut InstanceTracker<S> {
        &mut self.tracker
    }

    #[must_use]
    pub fn pipeline(&self) -> &RasterPipeline {
        &self.pipeline
    }

    /// Registers an observer with unique identifier.
    pub fn register_observer(&mut self, observer: Box<dyn PipelineObserver>) -> ChartResult<()> {
        let observer_id = observer.id().to_owned();
        if observer_id.is_empty() {
            return Err(ChartError::InvalidData(
                "observer id must not be empty".to_owned(),
            ));
        }
        if self.observers.iter().any(|entry| entry.id() == observer_id) {
            return Err(ChartError::InvalidData(format!(
                "observer with id `{observer_id}` is already registered"
            )));
        }
        self.observers.push(observer);
        Ok(())
    }

    /// Unregisters an observer by id. Returns `true` when removed.
    pub fn unregister_observer(&mut self, observer_id: &str) -> bool {
        match self.observers.iter().position(|entry| entry.id() == observer_id) {
            Some(position) => {
                self.observers.remove(position);
                true
            }
            None => false,
        }
    }

    fn emit(&mut self, event: PipelineEvent, variant: SchemaKind, instance_id: Option<&str>, generation: u64) {
        if self.observers.is_empty() {
            return;
        }
        let context = ObserverContext {
            variant,
            generation,
            interaction_mode: self.tracker.interaction_mode(instance_id),
        };
        for observer in &mut self.observers {
            observer.on_event(&event, context);
        }
    }

    /// Interactive render. Never panics and never returns an error to the
    /// host; failures are logged and reported in the outcome.
    pub fn ui(&mut self, props: UiRenderProps<'_>) -> UiOutcome {
        match props.mode {
            RenderMode::Designer => self.designer_ui(props),
            RenderMode::Form | RenderMode::Viewer => self.static_ui(props),
        }
    }

    /// Re-renders with the staged property-panel configuration.
    pub fn apply_changes(&mut self, props: UiRenderProps<'_>) -> UiOutcome {
        if let Some(id) = props.schema.instance_id.as_deref().filter(|id| !id.is_empty()) {
            if self.tracker.request_apply(&InstanceId::from(id)) {
                debug!(instance_id = id, "apply requested");
            }
        }
        self.ui(props)
    }

    fn designer_ui(&mut self, props: UiRenderProps<'_>) -> UiOutcome {
        let UiRenderProps {
            schema,
            value,
            on_change,
            mount,
            ..
        } = props;

        match self.prepare_render(schema, on_change) {
            PreparedRender::Task(task) => {
                mount.mount(MountedView::Scene(task.scene()));
                if !self.settle_delay.is_zero() {
                    thread::sleep(self.settle_delay);
                }
                let completed = task.execute(&self.pipeline);
                self.finish_render(completed, on_change)
            }
            PreparedRender::Reuse { data_url } => {
                mount.mount(MountedView::Cached(&data_url));
                UiOutcome::Reused
            }
            PreparedRender::Settled(outcome) => {
                mount_stored(mount, value);
                outcome
            }
        }
    }

    /// Runs the state machine and, when a render is due, builds its scene.
    ///
    /// Identifier assignment and cache reuse are reported through
    /// `on_change` here; a returned task must be passed through
    /// [`RenderTask::execute`] and [`ChartPlugin::finish_render`].
    pub fn prepare_render(
        &mut self,
        schema: &ChartSchema,
        on_change: &mut dyn FnMut(ChangeEvent),
    ) -> PreparedRender {
        let request = RenderRequest::from_schema(schema);
        let instance_id = schema.instance_id.as_deref();
        match self.tracker.decide(&request) {
            RenderDecision::AssignIdentifier(id) => {
                on_change(ChangeEvent::instance_id(id.as_str()));
                self.emit(
                    PipelineEvent::IdentifierAssigned {
                        instance_id: id.to_string(),
                    },
                    schema.kind,
                    Some(id.as_str()),
                    0,
                );
                PreparedRender::Settled(UiOutcome::IdentifierAssigned(id))
            }
            RenderDecision::Skip { reason, .. } => {
                self.emit(PipelineEvent::RenderSkipped { reason }, schema.kind, instance_id, 0);
                PreparedRender::Settled(UiOutcome::Skipped(reason))
            }
            RenderDecision::Reuse { data_url, .. } => {
                if data_url != schema.content {
                    on_change(ChangeEvent::content(&data_url));
                }
                self.emit(PipelineEvent::CachedContentReused, schema.kind, instance_id, 0);
                PreparedRender::Reuse { data_url }
            }
            RenderDecision::Render(plan) => self.build_task(plan),
        }
    }

    fn build_task(&mut self, plan: RenderPlan) -> PreparedRender {
        let instance_id = plan.instance_id.to_string();
        if plan.data.is_fallback() {
            self.emit(
                PipelineEvent::DataFallback {
                    sample: plan.data.is_sample(),
                },
                plan.variant,
                Some(instance_id.as_str()),
                plan.generation,
            );
        }
        match build_plan_scene(&plan, &self.style) {
            Ok(scene) => {
                self.emit(
                    PipelineEvent::SceneBuilt {
                        reason: plan.reason,
                        stats: scene.stats(),
                    },
                    plan.variant,
                    Some(instance_id.as_str()),
                    plan.generation,
                );
                PreparedRender::Task(RenderTask::new(plan, scene))
            }
            Err(err) => {
                warn!(instance_id = %instance_id, error = %err, "scene build failed, keeping previous content");
                self.tracker.abandon_render(&plan);
                PreparedRender::Settled(UiOutcome::Failed(err.to_string()))
            }
        }
    }

    /// Records a conversion result; stale or failed results leave the
    /// previous payload in place.
    pub fn finish_render(
        &mut self,
        completed: CompletedRender,
        on_change: &mut dyn FnMut(ChangeEvent),
    ) -> UiOutcome {
        let CompletedRender { plan, result, .. } = completed;
        let instance_id = plan.instance_id.to_string();
        match result {
            Ok(payload) => {
                if !self.tracker.complete_render(&plan, &payload.data_url) {
                    self.emit(
                        PipelineEvent::StaleResultDiscarded {
                            generation: plan.generation,
                        },
                        plan.variant,
                        Some(instance_id.as_str()),
                        plan.generation,
                    );
                    return UiOutcome::Discarded;
                }
                on_change(ChangeEvent::content(&payload.data_url));
                let payload_bytes = payload.data_url.len();
                info!(
                    instance_id = %instance_id,
                    reason = ?plan.reason,
                    width = payload.viewport.width,
                    height = payload.viewport.height,
                    payload_bytes,
                    "element rendered"
                );
                self.emit(
                    PipelineEvent::Rasterized { payload_bytes },
                    plan.variant,
                    Some(instance_id.as_str()),
                    plan.generation,
                );
                UiOutcome::Rendered {
                    reason: plan.reason,
                    payload_bytes,
                }
            }
            Err(ConversionError::Cancelled) => {
                self.tracker.abandon_render(&plan);
                self.emit(
                    PipelineEvent::StaleResultDiscarded {
                        generation: plan.generation,
                    },
                    plan.variant,
                    Some(instance_id.as_str()),
                    plan.generation,
                );
                UiOutcome::Discarded
            }
            Err(err) => {
                self.tracker.abandon_render(&plan);
                warn!(instance_id = %instance_id, error = %err, "raster conversion failed, keeping previous content");
                let message = err.to_string();
                self.emit(
                    PipelineEvent::ConversionFailed {
                        message: message.clone(),
                    },
                    plan.variant,
                    Some(instance_id.as_str()),
                    plan.generation,
                );
                UiOutcome::Failed(message)
            }
        }
    }

    fn static_ui(&mut self, props: UiRenderProps<'_>) -> UiOutcome {
        let UiRenderProps {
            schema,
            value,
            mount,
            ..
        } = props;
        let stored = if value.is_empty() { schema.content.as_str() } else { value };
        if !stored.is_empty() {
            mount.mount(MountedView::Cached(stored));
            return UiOutcome::Displayed;
        }

        match build_static_scene(schema, &self.style) {
            Ok(scene) => {
                mount.mount(MountedView::Scene(&scene));
                UiOutcome::Displayed
            }
            Err(err) => {
                warn!(element = %schema.name, error = %err, "static render failed");
                mount.mount(MountedView::Empty);
                UiOutcome::Failed(err.to_string())
            }
        }
    }

    /// Embed-time render: hands the stored payload to the host embedder.
    pub fn pdf(
        &self,
        props: PdfRenderProps<'_>,
        embedder: &mut dyn ImageEmbedder,
    ) -> ChartResult<EmbedOutcome> {
        let schema = props.schema;
        let data_url = if props.value.is_empty() {
            schema.content.as_str()
        } else {
            props.value
        };
        if data_url.is_empty() {
            let missing = ChartError::MissingPayload {
                element: schema.name.clone(),
            };
            debug!(error = %missing, "embedding placeholder");
            return Ok(EmbedOutcome::Placeholder);
        }

        let payload = RasterPayload::inspect(data_url)?;
        embedder.embed_image(&ImageEmbedRequest {
            name: &schema.name,
            data_url,
            x: schema.position.x,
            y: schema.position.y,
            width: schema.width,
            height: schema.height,
            pixel_width: payload.viewport.width,
            pixel_height: payload.viewport.height,
        })?;
        Ok(EmbedOutcome::Embedded)
    }

    #[must_use]
    pub fn prop_panel(&self, kind: SchemaKind) -> PropPanel {
        prop_panel(kind)
    }

    #[must_use]
    pub fn interaction_mode(&self, schema: &ChartSchema) -> InteractionMode {
        self.tracker.interaction_mode(schema.instance_id.as_deref())
    }
}

fn mount_stored(mount: &mut dyn SceneMount, value: &str) {
    if value.is_empty() {
        mount.mount(MountedView::Empty);
    } else {
        mount.mount(MountedView::Cached(value));
    }
}

/// Scene for form/viewer display; no instance state is read or written.
fn build_static_scene(schema: &ChartSchema, style: &SceneStyle) -> ChartResult<Scene> {
    let resolved = resolve_chart_data(schema.kind, &schema.data, None);
    build_element_scene(
        &resolved,
        &ElementConfig::from_schema(schema),
        schema.scene_size(),
        style,
    )
}
