//! Metadata types: the raw tag dictionary read from the container and the
//! normalized camera record built from it.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::image_pipeline::common::error::{GonetError, Result};
use crate::image_pipeline::metadata::tags;

/// A single value from the container's tag dictionary.
#[derive(Debug, Clone, PartialEq)]
pub enum TagValue {
    Int(i64),
    Float(f64),
    Text(String),
    Bytes(Vec<u8>),
    List(Vec<TagValue>),
    /// Nested tag dictionary (the GPS sub-record). Keys are kept as text and
    /// coerced to ids by the consumer.
    Record(BTreeMap<String, TagValue>),
}

impl TagValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            TagValue::Int(v) => Some(*v as f64),
            TagValue::Float(v) => Some(*v),
            TagValue::Text(s) => s.trim().parse().ok(),
            TagValue::List(items) if items.len() == 1 => items[0].as_f64(),
            _ => None,
        }
    }

    pub fn as_u32(&self) -> Option<u32> {
        match self {
            TagValue::Int(v) => u32::try_from(*v).ok(),
            TagValue::Float(v) if v.fract() == 0.0 && *v >= 0.0 && *v <= u32::MAX as f64 => {
                Some(*v as u32)
            }
            TagValue::Text(s) => s.trim().parse().ok(),
            TagValue::List(items) if items.len() == 1 => items[0].as_u32(),
            _ => None,
        }
    }

    /// Text content, with byte strings decoded lossily and trailing NULs
    /// stripped.
    pub fn as_text(&self) -> Option<String> {
        match self {
            TagValue::Text(s) => Some(s.trim_end_matches('\0').to_string()),
            TagValue::Bytes(b) => Some(
                String::from_utf8_lossy(b)
                    .trim_end_matches('\0')
                    .to_string(),
            ),
            _ => None,
        }
    }

    /// Raw byte content of a byte string, or of a list of small integers.
    pub fn as_bytes(&self) -> Option<Vec<u8>> {
        match self {
            TagValue::Bytes(b) => Some(b.clone()),
            TagValue::Text(s) => Some(s.as_bytes().to_vec()),
            TagValue::List(items) => items
                .iter()
                .map(|item| match item {
                    TagValue::Int(v) => u8::try_from(*v).ok(),
                    _ => None,
                })
                .collect(),
            TagValue::Int(v) => u8::try_from(*v).ok().map(|b| vec![b]),
            _ => None,
        }
    }

    /// Converts a JSON value. Objects become records, arrays become lists,
    /// `null` has no tag equivalent.
    pub fn from_json(value: &serde_json::Value) -> Option<TagValue> {
        match value {
            serde_json::Value::Null => None,
            serde_json::Value::Bool(b) => Some(TagValue::Int(*b as i64)),
            serde_json::Value::Number(n) => n
                .as_i64()
                .map(TagValue::Int)
                .or_else(|| n.as_f64().map(TagValue::Float)),
            serde_json::Value::String(s) => Some(TagValue::Text(s.clone())),
            serde_json::Value::Array(items) => Some(TagValue::List(
                items.iter().filter_map(TagValue::from_json).collect(),
            )),
            serde_json::Value::Object(map) => Some(TagValue::Record(
                map.iter()
                    .filter_map(|(k, v)| TagValue::from_json(v).map(|v| (k.clone(), v)))
                    .collect(),
            )),
        }
    }
}

/// Tag id → value dictionary read from a container.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTags {
    entries: BTreeMap<u16, TagValue>,
}

impl RawTags {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: u16, value: TagValue) {
        self.entries.insert(id, value);
    }

    pub fn get(&self, id: u16) -> Option<&TagValue> {
        self.entries.get(&id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u16, &TagValue)> {
        self.entries.iter().map(|(id, value)| (*id, value))
    }

    /// Builds a tag dictionary from a JSON mapping keyed by tag id or tag
    /// name. Keys that resolve to no id are skipped.
    ///
    /// Fails with `InvalidArgument` when `value` is not a mapping.
    pub fn from_json(value: &serde_json::Value) -> Result<Self> {
        let map = value.as_object().ok_or_else(|| {
            GonetError::InvalidArgument(format!(
                "tag dictionary must be a mapping, got {}",
                json_kind(value)
            ))
        })?;

        let mut raw = RawTags::new();
        for (key, value) in map {
            if let (Some(id), Some(value)) = (tags::tag_id(key), TagValue::from_json(value)) {
                raw.insert(id, value);
            }
        }
        Ok(raw)
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

/// A primitive value kept verbatim from tags the extractor does not
/// interpret.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScalarValue {
    Int(i64),
    Float(f64),
    Text(String),
}

/// Per-channel gains applied before display-oriented export. Green is
/// implicitly 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WhiteBalance {
    pub red: f64,
    pub blue: f64,
}

impl WhiteBalance {
    pub fn is_valid(&self) -> bool {
        self.red.is_finite() && self.blue.is_finite() && self.red > 0.0 && self.blue > 0.0
    }
}

/// GPS position in signed decimal degrees (altitude in the unit the camera
/// recorded, negative below sea level).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GpsPosition {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub altitude: Option<f64>,
}

impl GpsPosition {
    pub fn is_empty(&self) -> bool {
        self.latitude.is_none() && self.longitude.is_none() && self.altitude.is_none()
    }
}

/// Normalized capture metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub make: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bayer_width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bayer_height: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_height: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exposure_time: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shutter_speed_value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iso: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub white_balance: Option<WhiteBalance>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analog_gain: Option<f64>,
    #[serde(skip_serializing_if = "GpsPosition::is_empty")]
    pub gps: GpsPosition,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub components_configuration: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color_space: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ycbcr_positioning: Option<String>,
    /// Camera-specific tags nobody downstream interprets.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, ScalarValue>,
}

impl CameraMetadata {
    /// White-balance gains, failing with `MissingMetadata` when absent or
    /// not usable as multipliers.
    pub fn white_balance_gains(&self) -> Result<WhiteBalance> {
        match self.white_balance {
            Some(wb) if wb.is_valid() => Ok(wb),
            Some(wb) => Err(GonetError::MissingMetadata(format!(
                "white balance gains ({}, {}) are malformed",
                wb.red, wb.blue
            ))),
            None => Err(GonetError::MissingMetadata(
                "white balance gains are absent".to_string(),
            )),
        }
    }

    /// Flat `(key, value)` view of the record, typed fields first, then the
    /// extras in key order.
    pub fn flatten(&self) -> Vec<(String, ScalarValue)> {
        let mut entries = Vec::new();
        let mut push_text = |key: &str, value: &Option<String>| {
            if let Some(v) = value {
                entries.push((key.to_string(), ScalarValue::Text(v.clone())));
            }
        };
        push_text("make", &self.make);
        push_text("model", &self.model);
        push_text("components_configuration", &self.components_configuration);
        push_text("color_space", &self.color_space);
        push_text("ycbcr_positioning", &self.ycbcr_positioning);

        let integers = [
            ("bayer_width", self.bayer_width),
            ("bayer_height", self.bayer_height),
            ("image_width", self.image_width),
            ("image_height", self.image_height),
            ("iso", self.iso),
        ];
        for (key, value) in integers {
            if let Some(v) = value {
                entries.push((key.to_string(), ScalarValue::Int(v as i64)));
            }
        }

        let floats = [
            ("exposure_time", self.exposure_time),
            ("shutter_speed", self.shutter_speed_value),
            ("wb_red", self.white_balance.map(|wb| wb.red)),
            ("wb_blue", self.white_balance.map(|wb| wb.blue)),
            ("analog_gain", self.analog_gain),
            ("latitude", self.gps.latitude),
            ("longitude", self.gps.longitude),
            ("altitude", self.gps.altitude),
        ];
        for (key, value) in floats {
            if let Some(v) = value {
                entries.push((key.to_string(), ScalarValue::Float(v)));
            }
        }

        entries.extend(self.extra.iter().map(|(k, v)| (k.clone(), v.clone())));
        entries
    }
}
