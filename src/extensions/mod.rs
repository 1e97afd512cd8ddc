//! Optional hooks around the render pipeline.
//!
//! Observers are read-only and never coupled into core paths.

pub mod observers;

pub use observers::{ObserverContext, PipelineEvent, PipelineObserver, RecordingObserver};
