//! Builds the raw tag dictionary from the EXIF block of a GONet container
//! with `kamadak-exif`.

use std::collections::BTreeMap;
use std::io::Cursor;

use exif::{Context, Field, In, Value};
use tracing::{debug, warn};

use crate::image_pipeline::metadata::tags;
use crate::image_pipeline::metadata::types::{RawTags, TagValue};

/// Reads the primary-image tags and the GPS sub-record.
///
/// Returns `None` when the container carries no readable EXIF block; a
/// missing block never fails the decode.
pub fn read_exif_tags(container: &[u8]) -> Option<RawTags> {
    let mut cursor = Cursor::new(container);
    let exif = match exif::Reader::new().read_from_container(&mut cursor) {
        Ok(exif) => exif,
        Err(e) => {
            warn!("No EXIF metadata in container: {}", e);
            return None;
        }
    };

    let mut raw = RawTags::new();
    let mut gps_record = BTreeMap::new();

    for field in exif.fields().filter(|f| f.ifd_num == In::PRIMARY) {
        let id = field.tag.number();
        match field.tag.context() {
            Context::Gps => {
                if let Some(value) = convert_value(field) {
                    gps_record.insert(id.to_string(), value);
                }
            }
            Context::Tiff | Context::Exif => {
                if id == tags::EXIF_IFD_POINTER
                    || id == tags::GPS_INFO
                    || id == tags::INTEROP_IFD_POINTER
                {
                    continue;
                }
                if let Some(value) = convert_value(field) {
                    raw.insert(id, value);
                }
            }
            _ => {}
        }
    }

    if !gps_record.is_empty() {
        raw.insert(tags::GPS_INFO, TagValue::Record(gps_record));
    }

    debug!("Read {} EXIF tags", raw.len());
    Some(raw)
}

/// Rationals become floats, ASCII becomes text, byte strings stay bytes.
/// Single-element arrays collapse to their element.
fn convert_value(field: &Field) -> Option<TagValue> {
    let values: Vec<TagValue> = match &field.value {
        Value::Byte(v) => return Some(TagValue::Bytes(v.clone())),
        Value::Undefined(v, _) => return Some(TagValue::Bytes(v.clone())),
        Value::Ascii(strings) => {
            let text = strings
                .iter()
                .map(|s| String::from_utf8_lossy(s).into_owned())
                .collect::<Vec<_>>()
                .join("\n");
            return Some(TagValue::Text(text));
        }
        Value::Short(v) => v.iter().map(|&x| TagValue::Int(x as i64)).collect(),
        Value::Long(v) => v.iter().map(|&x| TagValue::Int(x as i64)).collect(),
        Value::SByte(v) => v.iter().map(|&x| TagValue::Int(x as i64)).collect(),
        Value::SShort(v) => v.iter().map(|&x| TagValue::Int(x as i64)).collect(),
        Value::SLong(v) => v.iter().map(|&x| TagValue::Int(x as i64)).collect(),
        Value::Rational(v) => v.iter().map(|r| TagValue::Float(r.to_f64())).collect(),
        Value::SRational(v) => v.iter().map(|r| TagValue::Float(r.to_f64())).collect(),
        Value::Float(v) => v.iter().map(|&x| TagValue::Float(x as f64)).collect(),
        Value::Double(v) => v.iter().map(|&x| TagValue::Float(x)).collect(),
        _ => return None,
    };

    match values.len() {
        0 => None,
        1 => values.into_iter().next(),
        _ => Some(TagValue::List(values)),
    }
}
