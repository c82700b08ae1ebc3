use std::io::Write;

use crate::image_pipeline::common::error::{GonetError, Result};
use crate::image_pipeline::conversions::{DecodeConfig, GonetDecoder, InputKind};
use crate::image_pipeline::gonet_image::FileType;
use crate::image_pipeline::raw::{RawGeometry, RawImageData, RawImageReader};

struct MockReader {
    should_fail: bool,
    mock_data: Option<RawImageData>,
}

impl RawImageReader for MockReader {
    fn read_raw(&self, _data: &[u8], _geometry: &RawGeometry) -> Result<RawImageData> {
        if self.should_fail {
            return Err(GonetError::DecodeError("Mock decode error".to_string()));
        }
        Ok(self.mock_data.clone().unwrap_or(RawImageData {
            width: 4,
            height: 4,
            data: (0..16).collect(),
            bits_per_sample: 12,
        }))
    }
}

fn no_metadata() -> DecodeConfig {
    DecodeConfig::builder().extract_metadata(false).build()
}

#[test]
fn test_config_builder() {
    let config = DecodeConfig::builder()
        .file_type(FileType::Dark)
        .extract_metadata(false)
        .build();

    assert_eq!(config.file_type, FileType::Dark);
    assert!(!config.extract_metadata);
    assert_eq!(config.geometry, RawGeometry::default());
}

#[test]
fn test_successful_decode() {
    let reader = MockReader { should_fail: false, mock_data: None };
    let decoder = GonetDecoder::with_custom(reader, no_metadata());

    let image = decoder.decode_container(b"fake container").unwrap();

    assert_eq!(image.shape(), (2, 2));
    // blue = S[0, 0], red = S[1, 1], green = (S[0, 1] + S[1, 0]) / 2
    let scale = 65535.0 / 4095.0;
    assert!((image.blue()[[0, 0]] - 0.0).abs() < 1e-9);
    assert!((image.red()[[0, 0]] - 5.0 * scale).abs() < 1e-9);
    assert!((image.green()[[0, 0]] - 2.5 * scale).abs() < 1e-9);
    assert!((image.red()[[1, 1]] - 15.0 * scale).abs() < 1e-9);
    assert!(image.metadata().is_none());
    assert!(image.provenance().is_none());
}

#[test]
fn test_reader_failure() {
    let reader = MockReader { should_fail: true, mock_data: None };
    let decoder = GonetDecoder::with_custom(reader, no_metadata());

    let result = decoder.decode_container(b"fake container");
    assert!(matches!(result, Err(GonetError::DecodeError(_))));
}

#[test]
fn test_out_of_range_sample() {
    let reader = MockReader {
        should_fail: false,
        mock_data: Some(RawImageData {
            width: 2,
            height: 2,
            data: vec![0, 0, 0, 5000],
            bits_per_sample: 12,
        }),
    };
    let decoder = GonetDecoder::with_custom(reader, no_metadata());

    let result = decoder.decode_container(b"fake container");
    assert!(matches!(result, Err(GonetError::OutOfRange(_))));
}

#[test]
fn test_container_without_exif_has_no_metadata() {
    let reader = MockReader { should_fail: false, mock_data: None };
    let decoder = GonetDecoder::with_custom(reader, DecodeConfig::default());

    let image = decoder.decode_container(b"no exif here").unwrap();
    assert!(image.metadata().is_none());
}

#[test]
fn test_missing_file() {
    let decoder = GonetDecoder::new(DecodeConfig::default());
    let result = decoder.decode_file("/nonexistent/gonet/Dolus.jpg");
    assert!(matches!(result, Err(GonetError::NotFound(_))));
}

#[test]
fn test_unsupported_extension() {
    let mut file = tempfile::Builder::new().suffix(".bmp").tempfile().unwrap();
    file.write_all(b"BM").unwrap();

    let decoder = GonetDecoder::new(DecodeConfig::default());
    let result = decoder.decode_file(file.path());
    assert!(matches!(result, Err(GonetError::UnsupportedFormat(_))));
}

#[test]
fn test_decode_file_records_provenance() {
    let mut file = tempfile::Builder::new().suffix(".jpg").tempfile().unwrap();
    file.write_all(b"container bytes").unwrap();

    let reader = MockReader { should_fail: false, mock_data: None };
    let config = DecodeConfig::builder()
        .file_type(FileType::Flat)
        .extract_metadata(false)
        .build();
    let decoder = GonetDecoder::with_custom(reader, config);

    let image = decoder.decode_file(file.path()).unwrap();
    let provenance = image.provenance().unwrap();
    assert_eq!(provenance.path, file.path());
    assert_eq!(provenance.file_type, FileType::Flat);
}

#[test]
fn test_input_kind_from_extension() {
    use std::path::Path;

    assert_eq!(InputKind::from_path(Path::new("a.jpg")).unwrap(), InputKind::RawContainer);
    assert_eq!(InputKind::from_path(Path::new("a.TIF")).unwrap(), InputKind::Tiff16);
    assert_eq!(InputKind::from_path(Path::new("a.tiff")).unwrap(), InputKind::Tiff16);
    assert!(InputKind::from_path(Path::new("a.fits")).is_err());
    for name in ["a.JPG", "a.jpeg", "a.Tif", "a"] {
        assert!(
            matches!(InputKind::from_path(Path::new(name)), Err(GonetError::UnsupportedFormat(_))),
            "{} should be rejected",
            name
        );
    }
}
