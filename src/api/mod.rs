mod chart_config;
mod chart_scene_builder;
mod content_cache;
mod data_source;
mod diagram_scene_builder;
mod instance_store;
mod json_contract;
mod pipeline_config;
mod plugin;
mod property_schema;
mod render_task;
mod scene_style;
mod schema;

pub use chart_config::{
    ChartConfig, ChartType, ConnectorStyle, DEFAULT_NODE_COLOR, DEFAULT_NODE_TEXT_COLOR,
    DEFAULT_SERIES_COLOR_A, DEFAULT_SERIES_COLOR_B, DiagramConfig, resolve_color,
};
pub use chart_scene_builder::{PlotArea, build_chart_scene, build_chart_scene_with};
pub use content_cache::{ContentCache, ContentCacheStats, ContentKey};
pub use data_source::{
    ChartData, DataOrigin, ResolvedData, SAMPLE_DATA_CAPTION, parse_chart_data,
    resolve_chart_data, sample_series, sample_tree,
};
pub use diagram_scene_builder::{FitTransform, build_diagram_scene, build_diagram_scene_with};
pub use instance_store::{
    ElementConfig, InstanceId, InstanceSettings, InstanceState, InstanceStore, InstanceTracker,
    MemoryInstanceStore, RenderDecision, RenderPlan, RenderReason, RenderRequest, SkipReason,
    TrackerPolicy,
};
pub use json_contract::{
    CHART_SCHEMA_JSON_SCHEMA_V1, ChartSchemaJsonContractV1, PIPELINE_CONFIG_JSON_SCHEMA_V1,
    PipelineConfigJsonContractV1,
};
pub use pipeline_config::{DEFAULT_SETTLE_DELAY_MS, PipelineConfig};
pub use plugin::{
    ChartPlugin, EmbedOutcome, HeadlessMount, ImageEmbedRequest, ImageEmbedder, MountRecord,
    MountedView, PdfRenderProps, PreparedRender, RenderMode, SceneMount, UiOutcome,
    UiRenderProps,
};
pub use property_schema::{
    DEFAULT_ELEMENT_HEIGHT_MM, DEFAULT_ELEMENT_WIDTH_MM, FieldType, PropPanel, PropertyField,
    prop_panel,
};
pub use render_task::{CompletedRender, RenderTask, build_element_scene, build_plan_scene};
pub use scene_style::{
    PALETTE, PlotMargins, SceneStyle, append_sample_caption, estimate_text_width, slice_color,
    slot_color, truncate_to_width,
};
pub use schema::{
    CHANGE_KEY_CONTENT, CHANGE_KEY_INSTANCE_ID, ChangeEvent, ChartSchema, Position, SchemaKind,
};
