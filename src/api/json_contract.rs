use serde::{Deserialize, Serialize};

use crate::error::{ChartError, ChartResult};

use super::{ChartSchema, PipelineConfig};

pub const CHART_SCHEMA_JSON_SCHEMA_V1: u32 = 1;
pub const PIPELINE_CONFIG_JSON_SCHEMA_V1: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSchemaJsonContractV1 {
    pub schema_version: u32,
    pub schema: ChartSchema,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfigJsonContractV1 {
    pub schema_version: u32,
    pub config: PipelineConfig,
}

impl ChartSchema {
    pub fn to_json_contract_v1_pretty(&self) -> ChartResult<String> {
        let payload = ChartSchemaJsonContractV1 {
            schema_version: CHART_SCHEMA_JSON_SCHEMA_V1,
            schema: self.clone(),
        };
        serde_json::to_string_pretty(&payload).map_err(|e| {
            ChartError::InvalidData(format!("failed to serialize schema contract v1: {e}"))
        })
    }

    /// Accepts either the bare host schema or the versioned contract.
    pub fn from_json_compat_str(input: &str) -> ChartResult<Self> {
        if let Ok(schema) = serde_json::from_str::<ChartSchema>(input) {
            return Ok(schema);
        }
        let payload: ChartSchemaJsonContractV1 = serde_json::from_str(input).map_err(|e| {
            ChartError::InvalidData(format!("failed to parse schema json payload: {e}"))
        })?;
        if payload.schema_version != CHART_SCHEMA_JSON_SCHEMA_V1 {
            return Err(ChartError::InvalidData(format!(
                "unsupported schema version: {}",
                payload.schema_version
            )));
        }
        Ok(payload.schema)
    }
}

impl PipelineConfig {
    pub fn to_json_contract_v1_pretty(self) -> ChartResult<String> {
        let payload = PipelineConfigJsonContractV1 {
            schema_version: PIPELINE_CONFIG_JSON_SCHEMA_V1,
            config: self,
        };
        serde_json::to_string_pretty(&payload).map_err(|e| {
            ChartError::InvalidData(format!("failed to serialize config contract v1: {e}"))
        })
    }

    pub fn from_json_compat_str(input: &str) -> ChartResult<Self> {
        let value: serde_json::Value = serde_json::from_str(input).map_err(|e| {
            ChartError::InvalidData(format!("failed to parse config json payload: {e}"))
        })?;
        if value.get("schema_version").is_none() {
            return Self::from_json_str(input);
        }
        let payload: PipelineConfigJsonContractV1 = serde_json::from_value(value).map_err(|e| {
            ChartError::InvalidData(format!("failed to parse config contract: {e}"))
        })?;
        if payload.schema_version != PIPELINE_CONFIG_JSON_SCHEMA_V1 {
            return Err(ChartError::InvalidData(format!(
                "unsupported config schema version: {}",
                payload.schema_version
            )));
        }
        payload.config.validate()?;
        Ok(payload.config)
    }
}
