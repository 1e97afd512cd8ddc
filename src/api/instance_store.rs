use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::interaction::{ElementGeometry, GeometryChange, InteractionMode};
use crate::render::CancellationToken;

use super::content_cache::{ContentCache, ContentCacheStats, ContentKey};
use super::data_source::{ChartData, DataOrigin, ResolvedData, resolve_chart_data};
use super::{ChartConfig, ChartSchema, DiagramConfig, SchemaKind};

static INSTANCE_SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// Stable identifier persisted on the element schema.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InstanceId(String);

impl InstanceId {
    /// `chart-<unix millis in hex>-<process sequence>`.
    #[must_use]
    pub fn generate() -> Self {
        let millis = Utc::now().timestamp_millis();
        let sequence = INSTANCE_SEQUENCE.fetch_add(1, Ordering::Relaxed);
        Self(format!("chart-{millis:x}-{sequence}"))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for InstanceId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl From<String> for InstanceId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Configuration half of the schema that feeds scene building.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ElementConfig {
    pub chart: ChartConfig,
    pub diagram: DiagramConfig,
}

impl ElementConfig {
    #[must_use]
    pub fn from_schema(schema: &ChartSchema) -> Self {
        Self {
            chart: schema.chart.clone(),
            diagram: schema.diagram.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InstanceState {
    /// No identifier yet.
    Uninitialized,
    /// Identifier assigned, nothing rendered.
    Identified,
    Cached,
    Moving,
    PendingChanges,
}

/// Last-known state of one element, written after every completed render.
#[derive(Debug, Clone, PartialEq)]
pub struct InstanceSettings {
    pub variant: SchemaKind,
    pub config: ElementConfig,
    pub pending_changes: Option<ElementConfig>,
    pub apply_requested: bool,
    pub data: ChartData,
    pub data_origin: DataOrigin,
    pub geometry: ElementGeometry,
    pub state: InstanceState,
    pub generation: u64,
    pub updated_at: DateTime<Utc>,
}

/// Per-instance persistence used by [`InstanceTracker`].
///
/// Implementations decide where records live; the tracker only needs keyed
/// reads and overwrites.
pub trait InstanceStore {
    fn settings(&self, id: &InstanceId) -> Option<InstanceSettings>;
    fn put_settings(&mut self, id: InstanceId, settings: InstanceSettings);
    fn content(&mut self, key: &ContentKey) -> Option<String>;
    fn put_content(&mut self, key: ContentKey, data_url: String);
    /// Drops the record and every cached payload of `id`.
    fn remove(&mut self, id: &InstanceId) -> bool;
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Process-local store.
#[derive(Debug, Default)]
pub struct MemoryInstanceStore {
    settings: HashMap<InstanceId, InstanceSettings>,
    content: ContentCache,
}

impl MemoryInstanceStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn content_stats(&self) -> ContentCacheStats {
        self.content.stats()
    }
}

impl InstanceStore for MemoryInstanceStore {
    fn settings(&self, id: &InstanceId) -> Option<InstanceSettings> {
        self.settings.get(id).cloned()
    }

    fn put_settings(&mut self, id: InstanceId, settings: InstanceSettings) {
        self.settings.insert(id, settings);
    }

    fn content(&mut self, key: &ContentKey) -> Option<String> {
        self.content.get(key)
    }

    fn put_content(&mut self, key: ContentKey, data_url: String) {
        self.content.insert(key, data_url);
    }

    fn remove(&mut self, id: &InstanceId) -> bool {
        self.content.remove_instance(id);
        self.settings.remove(id).is_some()
    }

    fn len(&self) -> usize {
        self.settings.len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackerPolicy {
    /// Property-panel edits wait for an explicit apply instead of
    /// re-rendering immediately.
    pub stage_config_changes: bool,
}

impl Default for TrackerPolicy {
    fn default() -> Self {
        Self {
            stage_config_changes: true,
        }
    }
}

/// Inputs of one designer render, borrowed from the element schema.
#[derive(Debug, Clone)]
pub struct RenderRequest<'a> {
    pub instance_id: Option<&'a str>,
    pub variant: SchemaKind,
    pub config: ElementConfig,
    pub data_source: &'a str,
    pub geometry: ElementGeometry,
}

impl<'a> RenderRequest<'a> {
    #[must_use]
    pub fn from_schema(schema: &'a ChartSchema) -> Self {
        Self {
            instance_id: schema.instance_id.as_deref(),
            variant: schema.kind,
            config: ElementConfig::from_schema(schema),
            data_source: &schema.data,
            geometry: ElementGeometry::new(
                schema.position.x,
                schema.position.y,
                schema.width,
                schema.height,
            ),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RenderReason {
    FirstRender,
    VariantChanged,
    DataChanged,
    Resized,
    MovementStopped,
    ConfigChanged,
    ChangesApplied,
    CacheMiss,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkipReason {
    Moving,
    ChangesStaged,
}

/// Everything a render needs, fixed at decision time.
#[derive(Debug, Clone)]
pub struct RenderPlan {
    pub instance_id: InstanceId,
    pub variant: SchemaKind,
    pub config: ElementConfig,
    pub data: ResolvedData,
    pub geometry: ElementGeometry,
    pub reason: RenderReason,
    pub generation: u64,
    pub token: CancellationToken,
}

#[derive(Debug, Clone)]
pub enum RenderDecision {
    /// First sight of the element: persist the identifier, draw nothing.
    AssignIdentifier(InstanceId),
    Render(RenderPlan),
    Reuse {
        instance_id: InstanceId,
        data_url: String,
    },
    Skip {
        instance_id: InstanceId,
        reason: SkipReason,
    },
}

#[derive(Debug)]
struct InFlight {
    generation: u64,
    token: CancellationToken,
}

/// Per-instance render state machine.
///
/// `Uninitialized -> Identified -> Cached <-> Moving`, and
/// `Cached -> PendingChanges -> Cached` when config edits are staged.
#[derive(Debug)]
pub struct InstanceTracker<S: InstanceStore = MemoryInstanceStore> {
    store: S,
    policy: TrackerPolicy,
    in_flight: HashMap<InstanceId, InFlight>,
    generation_counter: u64,
}

impl Default for InstanceTracker<MemoryInstanceStore> {
    fn default() -> Self {
        Self::new(MemoryInstanceStore::new())
    }
}

impl<S: InstanceStore> InstanceTracker<S> {
    #[must_use]
    pub fn new(store: S) -> Self {
        Self {
            store,
            policy: TrackerPolicy::default(),
            in_flight: HashMap::new(),
            generation_counter: 0,
        }
    }

    #[must_use]
    pub fn with_policy(mut self, policy: TrackerPolicy) -> Self {
        self.policy = policy;
        self
    }

    #[must_use]
    pub fn policy(&self) -> TrackerPolicy {
        self.policy
    }

    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    #[must_use]
    pub fn state(&self, instance_id: Option<&str>) -> InstanceState {
        let Some(id) = instance_id.filter(|id| !id.is_empty()) else {
            return InstanceState::Uninitialized;
        };
        self.store
            .settings(&InstanceId::from(id))
            .map_or(InstanceState::Identified, |settings| settings.state)
    }

    #[must_use]
    pub fn interaction_mode(&self, instance_id: Option<&str>) -> InteractionMode {
        match self.state(instance_id) {
            InstanceState::Moving => InteractionMode::Dragging,
            _ => InteractionMode::Idle,
        }
    }

    /// Decides whether this designer render needs scene work.
    pub fn decide(&mut self, request: &RenderRequest<'_>) -> RenderDecision {
        let Some(raw_id) = request.instance_id.filter(|id| !id.is_empty()) else {
            let id = InstanceId::generate();
            debug!(instance_id = %id, variant = request.variant.variant(), "assigned instance identifier");
            return RenderDecision::AssignIdentifier(id);
        };
        let id = InstanceId::from(raw_id);

        let Some(mut settings) = self.store.settings(&id) else {
            let data = resolve_chart_data(request.variant, request.data_source, None);
            return self.plan(id, request, request.config.clone(), data, RenderReason::FirstRender);
        };
        if settings.variant != request.variant {
            let data = resolve_chart_data(request.variant, request.data_source, None);
            return self.plan(id, request, request.config.clone(), data, RenderReason::VariantChanged);
        }

        let last_known_good = (settings.data_origin != DataOrigin::Sample).then_some(&settings.data);
        let data = resolve_chart_data(request.variant, request.data_source, last_known_good);
        let staging = self.policy.stage_config_changes;
        let render_config = if staging {
            settings.config.clone()
        } else {
            request.config.clone()
        };

        if settings.apply_requested {
            return self.plan(id, request, request.config.clone(), data, RenderReason::ChangesApplied);
        }
        if data.data != settings.data {
            return self.plan(id, request, render_config, data, RenderReason::DataChanged);
        }
        match request.geometry.change_from(settings.geometry) {
            GeometryChange::Resized => {
                return self.plan(id, request, render_config, data, RenderReason::Resized);
            }
            GeometryChange::Moved => {
                settings.geometry = request.geometry;
                settings.state = InstanceState::Moving;
                settings.updated_at = Utc::now();
                trace!(instance_id = %id, x = request.geometry.x, y = request.geometry.y, "element moving, render suppressed");
                self.store.put_settings(id.clone(), settings);
                return RenderDecision::Skip {
                    instance_id: id,
                    reason: SkipReason::Moving,
                };
            }
            GeometryChange::Unchanged => {}
        }
        if settings.state == InstanceState::Moving {
            return self.plan(id, request, render_config, data, RenderReason::MovementStopped);
        }

        if request.config != settings.config {
            if !staging {
                return self.plan(id, request, render_config, data, RenderReason::ConfigChanged);
            }
            if settings.pending_changes.as_ref() != Some(&request.config) {
                debug!(instance_id = %id, "staged configuration change");
                settings.pending_changes = Some(request.config.clone());
                settings.state = InstanceState::PendingChanges;
                settings.updated_at = Utc::now();
                self.store.put_settings(id.clone(), settings);
            }
            return RenderDecision::Skip {
                instance_id: id,
                reason: SkipReason::ChangesStaged,
            };
        }
        if settings.pending_changes.is_some() {
            // The edit was reverted before being applied.
            settings.pending_changes = None;
            settings.state = InstanceState::Cached;
            self.store.put_settings(id.clone(), settings);
        }

        let key = ContentKey::new(id.clone(), request.variant);
        match self.store.content(&key) {
            Some(data_url) => {
                trace!(instance_id = %id, "reusing cached content");
                RenderDecision::Reuse {
                    instance_id: id,
                    data_url,
                }
            }
            None => self.plan(id, request, render_config, data, RenderReason::CacheMiss),
        }
    }

    /// Forces the next render of `id` to use the staged configuration.
    ///
    /// Returns `false` when the instance has never rendered.
    pub fn request_apply(&mut self, id: &InstanceId) -> bool {
        let Some(mut settings) = self.store.settings(id) else {
            return false;
        };
        settings.apply_requested = true;
        self.store.put_settings(id.clone(), settings);
        true
    }

    fn plan(
        &mut self,
        instance_id: InstanceId,
        request: &RenderRequest<'_>,
        config: ElementConfig,
        data: ResolvedData,
        reason: RenderReason,
    ) -> RenderDecision {
        self.generation_counter += 1;
        let generation = self.generation_counter;
        let token = CancellationToken::new();
        let superseded = self.in_flight.insert(
            instance_id.clone(),
            InFlight {
                generation,
                token: token.clone(),
            },
        );
        if let Some(previous) = superseded {
            previous.token.cancel();
            debug!(
                instance_id = %instance_id,
                superseded = previous.generation,
                generation,
                "cancelled superseded render"
            );
        }
        debug!(instance_id = %instance_id, ?reason, generation, "render scheduled");
        RenderDecision::Render(RenderPlan {
            instance_id,
            variant: request.variant,
            config,
            data,
            geometry: request.geometry,
            reason,
            generation,
            token,
        })
    }

    #[must_use]
    pub fn is_current(&self, id: &InstanceId, generation: u64) -> bool {
        self.in_flight
            .get(id)
            .is_some_and(|in_flight| in_flight.generation == generation)
    }

    /// Records a finished render. Returns `false` and changes nothing when a
    /// newer render of the same instance has been scheduled since.
    pub fn complete_render(&mut self, plan: &RenderPlan, data_url: &str) -> bool {
        if !self.is_current(&plan.instance_id, plan.generation) {
            debug!(
                instance_id = %plan.instance_id,
                generation = plan.generation,
                "discarded stale render result"
            );
            return false;
        }
        self.in_flight.remove(&plan.instance_id);

        let previous = self.store.settings(&plan.instance_id);
        let (pending_changes, apply_requested) = match (&previous, plan.reason) {
            (_, RenderReason::ChangesApplied) | (None, _) => (None, false),
            (Some(previous), _) => (
                previous
                    .pending_changes
                    .clone()
                    .filter(|pending| pending != &plan.config),
                previous.apply_requested,
            ),
        };
        let state = if pending_changes.is_some() {
            InstanceState::PendingChanges
        } else {
            InstanceState::Cached
        };
        self.store.put_settings(
            plan.instance_id.clone(),
            InstanceSettings {
                variant: plan.variant,
                config: plan.config.clone(),
                pending_changes,
                apply_requested,
                data: plan.data.data.clone(),
                data_origin: plan.data.origin,
                geometry: plan.geometry,
                state,
                generation: plan.generation,
                updated_at: Utc::now(),
            },
        );
        self.store.put_content(
            ContentKey::new(plan.instance_id.clone(), plan.variant),
            data_url.to_owned(),
        );
        true
    }

    /// Drops a failed render; the previous record and payload stay.
    pub fn abandon_render(&mut self, plan: &RenderPlan) -> bool {
        if self.is_current(&plan.instance_id, plan.generation) {
            self.in_flight.remove(&plan.instance_id);
            return true;
        }
        false
    }

    /// Forgets an element, cancelling any render still in flight.
    pub fn evict(&mut self, id: &InstanceId) -> bool {
        if let Some(in_flight) = self.in_flight.remove(id) {
            in_flight.token.cancel();
        }
        self.store.remove(id)
    }
}

#[cfg(test)]
mod tests {
    use super::{InstanceId, InstanceState, InstanceTracker, RenderDecision, RenderReason, RenderRequest};
    use crate::api::{ChartSchema, Position, SchemaKind};

    fn schema() -> ChartSchema {
        ChartSchema::new(SchemaKind::Chart, "sales", 100.0, 60.0)
            .with_data(r#"[{"name":"Jan","value":400}]"#)
            .with_instance_id("chart-test")
    }

    #[test]
    fn generated_ids_are_unique() {
        assert_ne!(InstanceId::generate(), InstanceId::generate());
    }

    #[test]
    fn missing_identifier_is_assigned_first() {
        let mut tracker = InstanceTracker::default();
        let mut schema = schema();
        schema.instance_id = None;
        let decision = tracker.decide(&RenderRequest::from_schema(&schema));
        assert!(matches!(decision, RenderDecision::AssignIdentifier(_)));
        assert_eq!(tracker.state(None), InstanceState::Uninitialized);
    }

    #[test]
    fn newer_plan_cancels_the_older_one() {
        let mut tracker = InstanceTracker::default();
        let schema = schema();
        let RenderDecision::Render(first) = tracker.decide(&RenderRequest::from_schema(&schema))
        else {
            panic!("expected first render");
        };
        assert_eq!(first.reason, RenderReason::FirstRender);
        let RenderDecision::Render(second) = tracker.decide(&RenderRequest::from_schema(&schema))
        else {
            panic!("expected second render");
        };
        assert!(first.token.is_cancelled());
        assert!(!tracker.complete_render(&first, "data:image/png;base64,AA"));
        assert!(tracker.complete_render(&second, "data:image/png;base64,BB"));
        assert_eq!(tracker.state(Some("chart-test")), InstanceState::Cached);
    }

    #[test]
    fn movement_is_suppressed_until_it_stops() {
        let mut tracker = InstanceTracker::default();
        let mut schema = schema();
        let RenderDecision::Render(plan) = tracker.decide(&RenderRequest::from_schema(&schema))
        else {
            panic!("expected first render");
        };
        tracker.complete_render(&plan, "data:image/png;base64,AA");

        schema.position = Position::new(5.0, 5.0);
        assert!(matches!(
            tracker.decide(&RenderRequest::from_schema(&schema)),
            RenderDecision::Skip { .. }
        ));
        assert_eq!(tracker.state(Some("chart-test")), InstanceState::Moving);
        let RenderDecision::Render(stopped) = tracker.decide(&RenderRequest::from_schema(&schema))
        else {
            panic!("expected render after movement stopped");
        };
        assert_eq!(stopped.reason, RenderReason::MovementStopped);
    }
}
