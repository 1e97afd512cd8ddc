use std::str::FromStr;

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer};

use crate::error::{ChartError, ChartResult};

pub fn decimal_to_f64(value: Decimal, field_name: &str) -> ChartResult<f64> {
    value.to_f64().ok_or_else(|| {
        ChartError::InvalidData(format!("{field_name} cannot be represented as f64"))
    })
}

/// Series values arrive either as JSON numbers or as decimal strings
/// (`"400.10"`) exported by spreadsheets and accounting systems.
#[derive(Deserialize)]
#[serde(untagged)]
enum NumericInput {
    Number(f64),
    Text(String),
}

impl NumericInput {
    fn into_f64<E: serde::de::Error>(self, field_name: &str) -> Result<f64, E> {
        match self {
            Self::Number(value) => Ok(value),
            Self::Text(text) => {
                let decimal = Decimal::from_str(text.trim()).map_err(|err| {
                    E::custom(format!("{field_name} `{text}` is not a decimal: {err}"))
                })?;
                decimal_to_f64(decimal, field_name).map_err(E::custom)
            }
        }
    }
}

pub(crate) fn deserialize_numeric<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    NumericInput::deserialize(deserializer)?.into_f64("value")
}

pub(crate) fn deserialize_optional_numeric<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<NumericInput>::deserialize(deserializer)?
        .map(|input| input.into_f64::<D::Error>("secondary value"))
        .transpose()
}
