/*
A destination row as stored in the sheet.

Cells are read leniently: a malformed cell makes that one row ineligible
(or fails it later, in its own processing step) instead of failing the read.
*/

use std::fmt;

use serde::{de, Deserialize, Deserializer};

use crate::error::ApiError;

/// Opaque row identifier assigned by the sheet store. Sheety hands out
/// integers, but nothing here depends on that.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordId {
    Number(i64),
    Text(String),
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordId::Number(n) => write!(f, "{}", n),
            RecordId::Text(s) => f.write_str(s),
        }
    }
}

/// Raw `iataCode` cell. Only `Code` can ever be searched; `Other` holds
/// whatever non-string value the sheet returned and is left alone.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(untagged)]
pub enum CodeCell {
    #[default]
    Missing,
    Code(String),
    Other(serde_json::Value),
}

impl From<&str> for CodeCell {
    fn from(code: &str) -> Self {
        CodeCell::Code(code.to_string())
    }
}

/// Raw `lowestPrice` cell, parsed only when a quote has to be compared.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(untagged)]
pub enum PriceCell {
    #[default]
    Missing,
    Number(f64),
    Text(String),
    Other(serde_json::Value),
}

impl From<f64> for PriceCell {
    fn from(price: f64) -> Self {
        PriceCell::Number(price)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DestinationRecord {
    #[serde(default, deserialize_with = "lenient_id")]
    pub id: Option<RecordId>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub city: Option<String>,
    #[serde(default)]
    pub iata_code: CodeCell,
    #[serde(default)]
    pub lowest_price: PriceCell,
}

impl DestinationRecord {
    /// The code cell as text, if it holds a string.
    pub fn code(&self) -> Option<&str> {
        match &self.iata_code {
            CodeCell::Code(code) => Some(code),
            _ => None,
        }
    }

    /// True when the code is absent or empty and should be backfilled.
    pub fn needs_code(&self) -> bool {
        match &self.iata_code {
            CodeCell::Missing => true,
            CodeCell::Code(code) => code.is_empty(),
            CodeCell::Other(_) => false,
        }
    }

    /// City name usable for a location lookup.
    pub fn lookup_city(&self) -> Option<&str> {
        self.city.as_deref().filter(|c| !c.trim().is_empty())
    }

    /// The destination code, only if it is a string of exactly three characters.
    pub fn searchable_code(&self) -> Option<&str> {
        self.code().filter(|code| code.chars().count() == 3)
    }

    pub fn display_city(&self) -> &str {
        self.city.as_deref().unwrap_or("<unnamed>")
    }

    /// Stored alert threshold. Missing, null and blank cells mean "no threshold".
    pub fn threshold(&self) -> Result<Option<f64>, ApiError> {
        match &self.lowest_price {
            PriceCell::Missing => Ok(None),
            PriceCell::Number(n) => Ok(Some(*n)),
            PriceCell::Text(s) if s.trim().is_empty() => Ok(None),
            PriceCell::Text(s) => s.trim().parse::<f64>().map(Some).map_err(|_| {
                ApiError::InternalConversionError(format!("lowestPrice `{}` is not numeric", s))
            }),
            PriceCell::Other(value) => Err(ApiError::InternalConversionError(format!(
                "lowestPrice `{}` is not numeric",
                value
            ))),
        }
    }
}

/// Top-level body returned by a GET on the sheet endpoint, e.g.
/// `{"prices": [...]}`. The collection key is configurable.
pub fn records_from_body(
    mut body: serde_json::Value,
    collection: &str,
) -> Result<Vec<DestinationRecord>, serde_json::Error> {
    let rows = body
        .get_mut(collection)
        .map(serde_json::Value::take)
        .ok_or_else(|| {
            <serde_json::Error as de::Error>::custom(format!(
                "missing collection key `{}`",
                collection
            ))
        })?;
    serde_json::from_value(rows)
}

fn lenient_id<'de, D>(deserializer: D) -> Result<Option<RecordId>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Number(n) => n.as_i64().map(RecordId::Number),
        serde_json::Value::String(s) => Some(RecordId::Text(s)),
        _ => None,
    })
}

fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Some(s),
        _ => None,
    })
}
