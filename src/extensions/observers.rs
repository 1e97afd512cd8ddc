use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};

use crate::api::{RenderReason, SchemaKind, SkipReason};
use crate::interaction::InteractionMode;
use crate::render::SceneStats;

/// Read-only snapshot passed with every observer event.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObserverContext {
    pub variant: SchemaKind,
    pub generation: u64,
    pub interaction_mode: InteractionMode,
}

/// Event stream emitted by the render pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PipelineEvent {
    IdentifierAssigned { instance_id: String },
    RenderSkipped { reason: SkipReason },
    CachedContentReused,
    DataFallback { sample: bool },
    SceneBuilt { reason: RenderReason, stats: SceneStats },
    Rasterized { payload_bytes: usize },
    ConversionFailed { message: String },
    StaleResultDiscarded { generation: u64 },
}

/// Observer hook for embedding hosts (metrics, debugging overlays, tests).
///
/// Observers see events after the pipeline acted on them and cannot change
/// its decisions.
pub trait PipelineObserver {
    fn id(&self) -> &str;
    fn on_event(&mut self, event: &PipelineEvent, context: ObserverContext);
}

/// Records every event; clones share the same log, so a host can keep one
/// handle while the plugin owns another.
#[derive(Debug, Clone, Default)]
pub struct RecordingObserver {
    events: Arc<Mutex<Vec<PipelineEvent>>>,
}

impl RecordingObserver {
    fn log(&self) -> MutexGuard<'_, Vec<PipelineEvent>> {
        self.events.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[must_use]
    pub fn events(&self) -> Vec<PipelineEvent> {
        self.log().clone()
    }

    #[must_use]
    pub fn count(&self, predicate: impl Fn(&PipelineEvent) -> bool) -> usize {
        self.log().iter().filter(|event| predicate(event)).count()
    }

    pub fn clear(&self) {
        self.log().clear();
    }
}

impl PipelineObserver for RecordingObserver {
    fn id(&self) -> &str {
        "recording"
    }

    fn on_event(&mut self, event: &PipelineEvent, _context: ObserverContext) {
        self.log().push(event.clone());
    }
}
