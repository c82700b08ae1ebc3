//! Normalizes a container's raw tag dictionary into a [`CameraMetadata`].
//!
//! Extraction is best effort: a malformed tag is logged and skipped, it never
//! fails the decode of an otherwise valid image.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, instrument};

use crate::image_pipeline::metadata::tags::{self, gps};
use crate::image_pipeline::metadata::types::{
    CameraMetadata, GpsPosition, RawTags, ScalarValue, TagValue, WhiteBalance,
};

/// Longest text value kept verbatim among the extras.
pub const MAX_EXTRA_TEXT_LEN: usize = 256;

/// Maker-note key holding the analog gain.
const ANALOG_GAIN_KEY: &str = "ag";

/// `key: value` pairs inside the annotation. A value is either a
/// parenthesized group or a run of non-separator characters.
static ANNOTATION_PAIR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?P<key>[A-Za-z][A-Za-z0-9 _./-]*?)\s*:\s*(?P<value>\([^)]*\)?|[^\s,;]+)")
        .expect("annotation pattern is valid")
});

/// `key=value` tokens inside the maker note.
static MAKER_NOTE_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?P<key>[A-Za-z_][A-Za-z0-9_]*)=(?P<value>[-+]?[0-9]*\.?[0-9]+(?:[eE][-+]?[0-9]+)?)")
        .expect("maker note pattern is valid")
});

#[derive(Debug, Default, Clone, Copy)]
pub struct MetadataExtractor;

impl MetadataExtractor {
    pub fn new() -> Self {
        Self
    }

    #[instrument(skip(self, raw), fields(tags = raw.len()))]
    pub fn extract(&self, raw: &RawTags) -> CameraMetadata {
        let mut meta = CameraMetadata::default();

        // The artist field carries the annotation; fall back to the
        // description when it is absent.
        let annotation_id = if raw.get(tags::ARTIST).is_some() {
            tags::ARTIST
        } else {
            tags::IMAGE_DESCRIPTION
        };

        for (id, value) in raw.iter() {
            match id {
                _ if id == annotation_id => {
                    if let Some(text) = value.as_text() {
                        apply_annotation(&text, &mut meta);
                    }
                }
                tags::GPS_INFO => match value {
                    TagValue::Record(record) => meta.gps = parse_gps(record),
                    _ => debug!("Skipping GPS sub-record that is not a mapping"),
                },
                tags::MAKER_NOTE => {
                    if let Some(bytes) = value.as_bytes() {
                        meta.analog_gain = parse_analog_gain(&bytes);
                    }
                }
                tags::COMPONENTS_CONFIGURATION => {
                    meta.components_configuration =
                        value.as_bytes().map(|codes| components_configuration(&codes));
                }
                tags::COLOR_SPACE => {
                    meta.color_space = value.as_u32().map(color_space_name);
                }
                tags::YCBCR_POSITIONING => {
                    meta.ycbcr_positioning = value.as_u32().map(ycbcr_positioning_name);
                }
                tags::IMAGE_WIDTH | tags::EXIF_IMAGE_WIDTH => {
                    if let Some(width) = value.as_u32() {
                        meta.bayer_width = Some(width);
                        meta.image_width = Some(width / 2);
                    }
                }
                tags::IMAGE_LENGTH | tags::EXIF_IMAGE_HEIGHT => {
                    if let Some(height) = value.as_u32() {
                        meta.bayer_height = Some(height);
                        meta.image_height = Some(height / 2);
                    }
                }
                tags::MAKE => meta.make = value.as_text(),
                tags::MODEL => meta.model = value.as_text(),
                tags::EXPOSURE_TIME => meta.exposure_time = value.as_f64(),
                tags::SHUTTER_SPEED_VALUE => meta.shutter_speed_value = value.as_f64(),
                tags::ISO_SPEED_RATINGS => meta.iso = value.as_u32(),
                tags::EXIF_IFD_POINTER | tags::INTEROP_IFD_POINTER => {}
                _ => {
                    let name = tags::tag_name(id);
                    match primitive_scalar(value) {
                        Some(scalar) => {
                            meta.extra.insert(name, scalar);
                        }
                        None => debug!("Dropping non-scalar tag {}", name),
                    }
                }
            }
        }

        debug!(
            white_balance = meta.white_balance.is_some(),
            analog_gain = meta.analog_gain.is_some(),
            extras = meta.extra.len(),
            "Metadata extracted"
        );
        meta
    }
}

/// Parses the freeform `key: value` annotation into `meta`.
fn apply_annotation(text: &str, meta: &mut CameraMetadata) {
    for pair in ANNOTATION_PAIR.captures_iter(text) {
        let key = pair["key"].trim();
        let value = pair["value"].trim();
        let normalized: String = key
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();

        match normalized.as_str() {
            "whitebalance" | "wb" | "awbgains" => match parse_gain_pair(value) {
                Some(wb) => meta.white_balance = Some(wb),
                None => debug!("Dropping malformed white balance {:?}", value),
            },
            // The GPS sub-record is authoritative for position.
            "latitude" | "longitude" | "altitude" | "lat" | "lon" | "long" | "alt" => {}
            _ => {
                if value.len() <= MAX_EXTRA_TEXT_LEN {
                    meta.extra
                        .insert(key.to_string(), ScalarValue::Text(value.to_string()));
                }
            }
        }
    }
}

/// Parses `(r, b)` or `r, b` into a white-balance pair.
fn parse_gain_pair(value: &str) -> Option<WhiteBalance> {
    let inner = value.trim().trim_start_matches('(').trim_end_matches(')');
    let mut parts = inner.split(',').map(|p| p.trim().parse::<f64>());
    match (parts.next(), parts.next(), parts.next()) {
        (Some(Ok(red)), Some(Ok(blue)), None) => Some(WhiteBalance { red, blue }),
        _ => None,
    }
}

/// Decodes the GPS sub-record. A coordinate missing its value or its
/// hemisphere reference is left unset.
fn parse_gps(record: &BTreeMap<String, TagValue>) -> GpsPosition {
    let by_id: BTreeMap<u16, &TagValue> = record
        .iter()
        .filter_map(|(key, value)| gps::key_id(key).map(|id| (id, value)))
        .collect();

    let coordinate = |value_id: u16, ref_id: u16, negative: char| -> Option<f64> {
        let degrees = dms_to_decimal(by_id.get(&value_id)?)?;
        let reference = by_id.get(&ref_id)?.as_text()?;
        let negate = reference
            .trim()
            .chars()
            .next()
            .is_some_and(|c| c.eq_ignore_ascii_case(&negative));
        Some(if negate { -degrees } else { degrees })
    };

    let latitude = coordinate(gps::LATITUDE, gps::LATITUDE_REF, 'S');
    let longitude = coordinate(gps::LONGITUDE, gps::LONGITUDE_REF, 'W');
    let altitude = by_id.get(&gps::ALTITUDE).and_then(|v| v.as_f64()).map(|alt| {
        let below_sea_level = by_id
            .get(&gps::ALTITUDE_REF)
            .and_then(|r| r.as_bytes())
            .is_some_and(|b| b.first() == Some(&1));
        if below_sea_level { -alt } else { alt }
    });

    if latitude.is_none() || longitude.is_none() {
        debug!("GPS sub-record is missing a coordinate");
    }

    GpsPosition {
        latitude,
        longitude,
        altitude,
    }
}

/// `deg + min/60 + sec/3600`. Accepts a 1-3 element list or a bare number.
fn dms_to_decimal(value: &TagValue) -> Option<f64> {
    let parts: Vec<f64> = match value {
        TagValue::List(items) => items.iter().map(TagValue::as_f64).collect::<Option<_>>()?,
        other => vec![other.as_f64()?],
    };
    if parts.is_empty() || parts.len() > 3 {
        return None;
    }
    let weights = [1.0, 60.0, 3600.0];
    let decimal = parts.iter().zip(weights).map(|(v, w)| v / w).sum::<f64>();
    decimal.is_finite().then_some(decimal)
}

/// Pulls the analog gain out of the maker-note `key=value` tokens.
fn parse_analog_gain(blob: &[u8]) -> Option<f64> {
    let text = String::from_utf8_lossy(blob);
    MAKER_NOTE_TOKEN
        .captures_iter(&text)
        .find(|token| &token["key"] == ANALOG_GAIN_KEY)
        .and_then(|token| token["value"].parse().ok())
}

/// Channel order from the component configuration byte codes.
fn components_configuration(codes: &[u8]) -> String {
    codes
        .iter()
        .map(|code| match code {
            0 => "",
            1 => "Y",
            2 => "Cb",
            3 => "Cr",
            4 => "R",
            5 => "G",
            6 => "B",
            _ => "?",
        })
        .collect()
}

fn color_space_name(code: u32) -> String {
    match code {
        1 => "sRGB".to_string(),
        2 => "Adobe RGB".to_string(),
        0xFFFF => "Uncalibrated".to_string(),
        other => format!("Unknown ({})", other),
    }
}

fn ycbcr_positioning_name(code: u32) -> String {
    match code {
        1 => "Centered".to_string(),
        2 => "Co-sited".to_string(),
        other => format!("Unknown ({})", other),
    }
}

/// Keeps numbers and short strings; everything else is not guaranteed to
/// serialize and is dropped.
fn primitive_scalar(value: &TagValue) -> Option<ScalarValue> {
    match value {
        TagValue::Int(v) => Some(ScalarValue::Int(*v)),
        TagValue::Float(v) => Some(ScalarValue::Float(*v)),
        TagValue::Text(_) | TagValue::Bytes(_) => value
            .as_text()
            .filter(|s| s.len() <= MAX_EXTRA_TEXT_LEN)
            .map(ScalarValue::Text),
        TagValue::List(items) if items.len() == 1 => primitive_scalar(&items[0]),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(entries: &[(&str, TagValue)]) -> TagValue {
        TagValue::Record(
            entries
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
        )
    }

    fn dms(d: f64, m: f64, s: f64) -> TagValue {
        TagValue::List(vec![TagValue::Float(d), TagValue::Float(m), TagValue::Float(s)])
    }

    #[test]
    fn annotation_yields_white_balance_and_extras() {
        let mut raw = RawTags::new();
        raw.insert(
            tags::ARTIST,
            TagValue::Text(
                "Version: 1.3 White Balance: (3.35, 1.59) Latitude: 12.0 Location: Rooftop"
                    .to_string(),
            ),
        );
        let meta = MetadataExtractor::new().extract(&raw);

        assert_eq!(meta.white_balance, Some(WhiteBalance { red: 3.35, blue: 1.59 }));
        assert_eq!(
            meta.extra.get("Version"),
            Some(&ScalarValue::Text("1.3".to_string()))
        );
        assert_eq!(
            meta.extra.get("Location"),
            Some(&ScalarValue::Text("Rooftop".to_string()))
        );
        assert!(!meta.extra.contains_key("Latitude"));
        assert_eq!(meta.gps, GpsPosition::default());
    }

    #[test]
    fn malformed_white_balance_is_dropped() {
        let mut raw = RawTags::new();
        raw.insert(
            tags::ARTIST,
            TagValue::Text("WB: (abc, 1.2) Camera: Dolus".to_string()),
        );
        let meta = MetadataExtractor::new().extract(&raw);
        assert_eq!(meta.white_balance, None);
        assert_eq!(
            meta.extra.get("Camera"),
            Some(&ScalarValue::Text("Dolus".to_string()))
        );
    }

    #[test]
    fn gps_is_converted_to_signed_decimal_degrees() {
        let mut raw = RawTags::new();
        raw.insert(
            tags::GPS_INFO,
            record(&[
                ("1", TagValue::Text("S".to_string())),
                ("2", dms(33.0, 30.0, 36.0)),
                ("3", TagValue::Text("W".to_string())),
                ("4", dms(70.0, 15.0, 0.0)),
                ("5", TagValue::Bytes(vec![0])),
                ("6", TagValue::Float(2200.5)),
            ]),
        );
        let gps = MetadataExtractor::new().extract(&raw).gps;

        assert!((gps.latitude.unwrap() + 33.51).abs() < 1e-9);
        assert!((gps.longitude.unwrap() + 70.25).abs() < 1e-9);
        assert_eq!(gps.altitude, Some(2200.5));
    }

    #[test]
    fn gps_coordinate_without_reference_is_skipped() {
        let mut raw = RawTags::new();
        raw.insert(
            tags::GPS_INFO,
            record(&[
                ("GPSLatitude", dms(10.0, 0.0, 0.0)),
                ("GPSLongitudeRef", TagValue::Text("E".to_string())),
                ("GPSLongitude", dms(20.0, 6.0, 0.0)),
                ("GPSAltitudeRef", TagValue::Int(1)),
                ("GPSAltitude", TagValue::Float(5.0)),
            ]),
        );
        let gps = MetadataExtractor::new().extract(&raw).gps;

        assert_eq!(gps.latitude, None);
        assert!((gps.longitude.unwrap() - 20.1).abs() < 1e-9);
        assert_eq!(gps.altitude, Some(-5.0));
    }

    #[test]
    fn maker_note_keeps_only_analog_gain() {
        let mut raw = RawTags::new();
        raw.insert(
            tags::MAKER_NOTE,
            TagValue::Bytes(b"ev=-1 mlux=-1 exp=6000000 ag=2.25 focus=255 gain_r=1.2".to_vec()),
        );
        let meta = MetadataExtractor::new().extract(&raw);
        assert_eq!(meta.analog_gain, Some(2.25));
        assert!(meta.extra.is_empty());
    }

    #[test]
    fn enumerated_tags_are_described() {
        let mut raw = RawTags::new();
        raw.insert(tags::COMPONENTS_CONFIGURATION, TagValue::Bytes(vec![1, 2, 3, 0]));
        raw.insert(tags::COLOR_SPACE, TagValue::Int(1));
        raw.insert(tags::YCBCR_POSITIONING, TagValue::Int(7));
        let meta = MetadataExtractor::new().extract(&raw);

        assert_eq!(meta.components_configuration.as_deref(), Some("YCbCr"));
        assert_eq!(meta.color_space.as_deref(), Some("sRGB"));
        assert_eq!(meta.ycbcr_positioning.as_deref(), Some("Unknown (7)"));
    }

    #[test]
    fn dimensions_are_halved_for_the_image() {
        let mut raw = RawTags::new();
        raw.insert(tags::EXIF_IMAGE_WIDTH, TagValue::Int(4056));
        raw.insert(tags::EXIF_IMAGE_HEIGHT, TagValue::Int(3040));
        let meta = MetadataExtractor::new().extract(&raw);

        assert_eq!((meta.bayer_width, meta.bayer_height), (Some(4056), Some(3040)));
        assert_eq!((meta.image_width, meta.image_height), (Some(2028), Some(1520)));
    }

    #[test]
    fn exposure_fields_and_extras() {
        let mut raw = RawTags::new();
        raw.insert(tags::MAKE, TagValue::Text("RaspberryPi\0".to_string()));
        raw.insert(tags::EXPOSURE_TIME, TagValue::Float(6.0));
        raw.insert(tags::ISO_SPEED_RATINGS, TagValue::Int(800));
        raw.insert(0x0131, TagValue::Text("raspistill".to_string()));
        raw.insert(0x011A, TagValue::List(vec![TagValue::Int(72), TagValue::Int(1)]));
        raw.insert(0x9000, TagValue::Bytes(b"0220".to_vec()));
        let meta = MetadataExtractor::new().extract(&raw);

        assert_eq!(meta.make.as_deref(), Some("RaspberryPi"));
        assert_eq!(meta.exposure_time, Some(6.0));
        assert_eq!(meta.iso, Some(800));
        assert_eq!(
            meta.extra.get("Software"),
            Some(&ScalarValue::Text("raspistill".to_string()))
        );
        assert_eq!(
            meta.extra.get("ExifVersion"),
            Some(&ScalarValue::Text("0220".to_string()))
        );
        assert!(!meta.extra.contains_key("XResolution"));
    }

    #[test]
    fn non_mapping_gps_is_skipped() {
        let mut raw = RawTags::new();
        raw.insert(tags::GPS_INFO, TagValue::Int(26));
        let meta = MetadataExtractor::new().extract(&raw);
        assert!(meta.gps.is_empty());
    }
}
