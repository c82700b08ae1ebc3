//! Multi-extension FITS writer.
//!
//! Layout: an empty primary HDU followed by one `IMAGE` extension per
//! channel (red, green, blue) holding the plane as big-endian `f64`
//! (`BITPIX = -64`). Headers are 80-byte cards in 2880-byte blocks.
//! Metadata keys are uppercased, restricted to `[A-Z0-9_-]` and cut to
//! eight characters; when two keys collide the first one wins.

use std::collections::HashSet;
use std::io::Write;

use tracing::debug;

use crate::image_pipeline::common::error::Result;
use crate::image_pipeline::formats::types::WriteConfig;
use crate::image_pipeline::formats::writer::ImageWriter;
use crate::image_pipeline::gonet_image::{Channel, GonetImage};
use crate::image_pipeline::metadata::types::ScalarValue;

pub const BLOCK_SIZE: usize = 2880;
pub const CARD_SIZE: usize = 80;
const MAX_KEY_LEN: usize = 8;
const MAX_STRING_LEN: usize = 68;

/// Reserved keywords a metadata key must not overwrite.
const RESERVED: &[&str] = &[
    "SIMPLE", "BITPIX", "NAXIS", "NAXIS1", "NAXIS2", "EXTEND", "XTENSION", "PCOUNT", "GCOUNT",
    "EXTNAME", "CHANNEL", "END",
];

pub struct FitsWriter;

impl ImageWriter for FitsWriter {
    /// Planes are written unclipped; white balance is not applied.
    fn write_image(&self, image: &GonetImage, output: &mut dyn Write, _config: &WriteConfig) -> Result<()> {
        let (rows, cols) = image.shape();
        debug!("Encoding FITS image: {}x{}, {} extensions", cols, rows, Channel::ALL.len());

        let metadata_cards = match image.metadata() {
            Some(metadata) => metadata_cards(&metadata.flatten()),
            None => Vec::new(),
        };

        let mut buffer = Vec::new();
        let mut primary = Header::default();
        primary.push_logical("SIMPLE", true);
        primary.push_int("BITPIX", 8);
        primary.push_int("NAXIS", 0);
        primary.push_logical("EXTEND", true);
        primary.finish_into(&mut buffer);

        for channel in Channel::ALL {
            let mut header = Header::default();
            header.push_string("XTENSION", "IMAGE");
            header.push_int("BITPIX", -64);
            header.push_int("NAXIS", 2);
            header.push_int("NAXIS1", cols as i64);
            header.push_int("NAXIS2", rows as i64);
            header.push_int("PCOUNT", 0);
            header.push_int("GCOUNT", 1);
            for card in &metadata_cards {
                header.cards.push(card.clone());
            }
            let name = channel.name().to_ascii_uppercase();
            header.push_string("CHANNEL", &name);
            header.push_string("EXTNAME", &name);
            header.finish_into(&mut buffer);

            let start = buffer.len();
            for &value in image.plane(channel).iter() {
                buffer.extend_from_slice(&value.to_be_bytes());
            }
            pad_block(&mut buffer, start, 0);
        }

        output.write_all(&buffer)?;
        debug!("FITS encoding complete: {} bytes", buffer.len());
        Ok(())
    }
}

#[derive(Default)]
struct Header {
    cards: Vec<String>,
}

impl Header {
    fn push_value(&mut self, key: &str, value: &str) {
        self.cards.push(format!("{:<8}= {:>20}", key, value));
    }

    fn push_logical(&mut self, key: &str, value: bool) {
        self.push_value(key, if value { "T" } else { "F" });
    }

    fn push_int(&mut self, key: &str, value: i64) {
        self.push_value(key, &value.to_string());
    }

    fn push_string(&mut self, key: &str, value: &str) {
        self.cards.push(format!("{:<8}= {}", key, quote(value)));
    }

    fn finish_into(mut self, buffer: &mut Vec<u8>) {
        self.cards.push("END".to_string());
        let start = buffer.len();
        for card in &self.cards {
            let mut bytes: Vec<u8> = card.bytes().take(CARD_SIZE).collect();
            bytes.resize(CARD_SIZE, b' ');
            buffer.extend_from_slice(&bytes);
        }
        pad_block(buffer, start, b' ');
    }
}

fn pad_block(buffer: &mut Vec<u8>, start: usize, fill: u8) {
    let written = buffer.len() - start;
    let remainder = written % BLOCK_SIZE;
    if remainder != 0 {
        buffer.resize(buffer.len() + BLOCK_SIZE - remainder, fill);
    }
}

/// FITS string literal: printable ASCII only, single quotes doubled, padded
/// to at least eight characters. The escaped text is cut to fit the card
/// without splitting a doubled quote.
fn quote(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len().min(MAX_STRING_LEN));
    for c in value.chars().map(|c| if (' '..='~').contains(&c) { c } else { '?' }) {
        let width = if c == '\'' { 2 } else { 1 };
        if escaped.len() + width > MAX_STRING_LEN {
            break;
        }
        escaped.push(c);
        if c == '\'' {
            escaped.push('\'');
        }
    }
    format!("'{:<8}'", escaped)
}

/// `ab c.d` becomes `AB_C_D`; keys with nothing usable are dropped.
pub fn sanitize_key(key: &str) -> Option<String> {
    let sanitized: String = key
        .chars()
        .map(|c| c.to_ascii_uppercase())
        .map(|c| if c.is_ascii_uppercase() || c.is_ascii_digit() || c == '-' || c == '_' { c } else { '_' })
        .take(MAX_KEY_LEN)
        .collect();
    if sanitized.is_empty() || sanitized.chars().all(|c| c == '_') {
        None
    } else {
        Some(sanitized)
    }
}

fn metadata_cards(entries: &[(String, ScalarValue)]) -> Vec<String> {
    let mut seen: HashSet<String> = RESERVED.iter().map(|k| k.to_string()).collect();
    let mut header = Header::default();
    for (key, value) in entries {
        let Some(key) = sanitize_key(key) else {
            continue;
        };
        if seen.contains(&key) {
            continue;
        }
        match value {
            ScalarValue::Int(v) => header.push_int(&key, *v),
            ScalarValue::Float(v) if v.is_finite() => header.push_value(&key, &format!("{:.15E}", v)),
            ScalarValue::Float(_) => continue,
            ScalarValue::Text(v) => header.push_string(&key, v),
        }
        seen.insert(key);
    }
    header.cards
}
