use std::io::Cursor;
use std::path::{Path, PathBuf};

use exif::experimental::Writer;
use exif::{Field, In, Rational, Tag, Value};

use gonet_core::image_pipeline::raw::pack_line;
use gonet_core::image_pipeline::{
    CameraMetadata, DecodeConfig, FileType, GonetDecoder, GonetError, GonetImage, RawGeometry,
    WhiteBalance, WriteConfig,
};
use gonet_core::regions::{build_mask, reduce, RegionSpec};
use tempfile::TempDir;

fn small_geometry() -> RawGeometry {
    RawGeometry {
        pixel_per_line: 8,
        pixel_per_column: 6,
        padded_line_bytes: 16,
        raw_file_offset: 200,
        raw_header_size: 8,
    }
}

fn sample(column: usize, line: usize) -> u16 {
    ((column * 37 + line * 611) % 4096) as u16
}

/// JPEG-looking prefix, the packed Bayer block, then the trailing bytes the
/// fixed end-relative offset implies.
fn write_container(dir: &Path, geometry: &RawGeometry) -> PathBuf {
    write_container_with_prefix(dir, geometry, vec![0xFF, 0xD8, 0xFF, 0xD9])
}

fn write_container_with_prefix(dir: &Path, geometry: &RawGeometry, prefix: Vec<u8>) -> PathBuf {
    let mut container = prefix;
    container.extend(vec![0u8; 64]);
    for line in 0..geometry.pixel_per_column {
        let samples: Vec<u16> = (0..geometry.pixel_per_line).map(|c| sample(c, line)).collect();
        let mut packed = pack_line(&samples);
        packed.resize(geometry.padded_line_bytes, 0xAB);
        container.extend(packed);
    }
    let trailing = geometry.data_offset() - geometry.block_len();
    container.extend(vec![0x5Au8; trailing as usize]);

    let path = dir.join("Dolus_250101_000000.jpg");
    std::fs::write(&path, container).unwrap();
    path
}

fn decoder() -> GonetDecoder<gonet_core::image_pipeline::GonetRawReader> {
    GonetDecoder::new(
        DecodeConfig::builder()
            .geometry(small_geometry())
            .file_type(FileType::Science)
            .build(),
    )
}

#[test]
fn decode_synthetic_container() {
    let dir = TempDir::new().unwrap();
    let path = write_container(dir.path(), &small_geometry());

    let image = decoder().decode_file(&path).unwrap();

    assert_eq!(image.shape(), (3, 4));
    let scale = 65535.0 / 4095.0;
    let expected_red = sample(2 * 2 + 1, 2 * 1 + 1) as f64 * scale;
    assert!((image.red()[[1, 2]] - expected_red).abs() < 1e-9);
    let expected_green = (sample(0, 1) as f64 + sample(1, 0) as f64) / 2.0 * scale;
    assert!((image.green()[[0, 0]] - expected_green).abs() < 1e-9);
    assert_eq!(image.provenance().unwrap().path, path);
    assert!(image.metadata().is_none());
}

/// JPEG prefix whose APP1 segment carries a GONet-style EXIF block.
fn exif_prefix() -> Vec<u8> {
    let field = |tag, value| Field {
        tag,
        ifd_num: In::PRIMARY,
        value,
    };
    let dms = |d: u32, m: u32, s: u32| {
        Value::Rational(vec![Rational::from((d, 1)), Rational::from((m, 1)), Rational::from((s, 1))])
    };
    let fields = vec![
        field(Tag::Make, Value::Ascii(vec![b"GONet".to_vec()])),
        field(Tag::Artist, Value::Ascii(vec![b"WB: (1.5, 2.0)".to_vec()])),
        field(Tag::MakerNote, Value::Undefined(b"exp=6000000 ag=4.0".to_vec(), 0)),
        field(Tag::GPSLatitudeRef, Value::Ascii(vec![b"N".to_vec()])),
        field(Tag::GPSLatitude, dms(19, 49, 12)),
        field(Tag::GPSLongitudeRef, Value::Ascii(vec![b"W".to_vec()])),
        field(Tag::GPSLongitude, dms(155, 28, 48)),
    ];
    let mut writer = Writer::new();
    for f in &fields {
        writer.push_field(f);
    }
    let mut tiff = Cursor::new(Vec::new());
    writer.write(&mut tiff, true).unwrap();
    let tiff = tiff.into_inner();

    let mut prefix = vec![0xFF, 0xD8, 0xFF, 0xE1];
    prefix.extend_from_slice(&((tiff.len() + 8) as u16).to_be_bytes());
    prefix.extend_from_slice(b"Exif\0\0");
    prefix.extend_from_slice(&tiff);
    prefix.extend_from_slice(&[0xFF, 0xD9]);
    prefix
}

#[test]
fn decode_container_with_exif_metadata() {
    let dir = TempDir::new().unwrap();
    let path = write_container_with_prefix(dir.path(), &small_geometry(), exif_prefix());
    let decoder = GonetDecoder::new(
        DecodeConfig::builder()
            .geometry(small_geometry())
            .extract_metadata(true)
            .build(),
    );

    let image = decoder.decode_file(&path).unwrap();
    let metadata = image.metadata().unwrap();

    assert_eq!(metadata.make.as_deref(), Some("GONet"));
    assert_eq!(metadata.white_balance, Some(WhiteBalance { red: 1.5, blue: 2.0 }));
    assert_eq!(metadata.analog_gain, Some(4.0));
    assert!((metadata.gps.latitude.unwrap() - 19.82).abs() < 1e-9);
    assert!((metadata.gps.longitude.unwrap() + 155.48).abs() < 1e-9);
    assert_eq!(metadata.gps.altitude, None);

    // the white balance gains now apply on export
    let jpeg_path = dir.path().join("balanced.jpg");
    image
        .write_jpeg(&jpeg_path, &WriteConfig::builder().white_balance(true).build())
        .unwrap();
    assert!(jpeg_path.exists());
}

#[test]
fn tiff_round_trip_reproduces_truncated_planes() {
    let dir = TempDir::new().unwrap();
    let path = write_container(dir.path(), &small_geometry());
    let image = decoder().decode_file(&path).unwrap();

    let tiff_path = dir.path().join("out.tiff");
    image.write_tiff(&tiff_path, &WriteConfig::default()).unwrap();
    let reread = decoder().decode_file(&tiff_path).unwrap();

    assert_eq!(reread.shape(), image.shape());
    for (original, restored) in [
        (image.red(), reread.red()),
        (image.green(), reread.green()),
        (image.blue(), reread.blue()),
    ] {
        let expected = original.mapv(|v| v.clamp(0.0, 65535.0).floor());
        assert_eq!(restored, &expected);
    }
}

#[test]
fn tiff_round_trip_keeps_metadata() {
    let dir = TempDir::new().unwrap();
    let mut metadata = CameraMetadata {
        make: Some("GONet".into()),
        iso: Some(800),
        exposure_time: Some(0.25),
        white_balance: Some(WhiteBalance { red: 1.5, blue: 2.0 }),
        ..Default::default()
    };
    metadata.gps.latitude = Some(-33.5);
    let image = GonetImage::new(
        ndarray::Array2::from_elem((2, 3), 1000.0),
        ndarray::Array2::from_elem((2, 3), 70000.0),
        ndarray::Array2::from_elem((2, 3), -5.0),
        Some(metadata.clone()),
        None,
    )
    .unwrap();

    let tiff_path = dir.path().join("calibrated.tif");
    image.write(&tiff_path, &WriteConfig::default()).unwrap();
    let reread = decoder().decode_file(&tiff_path).unwrap();

    assert_eq!(reread.metadata(), Some(&metadata));
    assert!(reread.green().iter().all(|&v| v == 65535.0));
    assert!(reread.blue().iter().all(|&v| v == 0.0));

    let balanced_path = dir.path().join("balanced.tif");
    image
        .write(&balanced_path, &WriteConfig::builder().white_balance(true).build())
        .unwrap();
    let balanced = decoder().decode_file(&balanced_path).unwrap();
    assert!(balanced.red().iter().all(|&v| v == 1500.0));
}

#[test]
fn white_balance_requires_gains() {
    let dir = TempDir::new().unwrap();
    let path = write_container(dir.path(), &small_geometry());
    let image = decoder().decode_file(&path).unwrap();

    let result = image.write_jpeg(
        dir.path().join("out.jpg"),
        &WriteConfig::builder().white_balance(true).build(),
    );
    assert!(matches!(result, Err(GonetError::MissingMetadata(_))));
    assert!(!dir.path().join("out.jpg").exists());
}

#[test]
fn eight_bit_and_fits_outputs() {
    let dir = TempDir::new().unwrap();
    let path = write_container(dir.path(), &small_geometry());
    let image = decoder().decode_file(&path).unwrap();

    let jpeg_path = dir.path().join("preview.jpg");
    image.write(&jpeg_path, &WriteConfig::default()).unwrap();
    let preview = image::open(&jpeg_path).unwrap();
    assert_eq!((preview.width(), preview.height()), (4, 3));

    let png_path = dir.path().join("preview.png");
    image.write_png(&png_path, &WriteConfig::default()).unwrap();
    let lossless = image::open(&png_path).unwrap().to_rgb8();
    let expected = (image.blue()[[2, 3]] / 65535.0 * 255.0).round() as u8;
    assert_eq!(lossless.get_pixel(3, 2).0[2], expected);

    let fits_path = dir.path().join("science.fits");
    image.write_fits(&fits_path, &WriteConfig::default()).unwrap();
    let fits = std::fs::read(&fits_path).unwrap();
    assert_eq!(fits.len() % 2880, 0);
    assert!(fits.starts_with(b"SIMPLE  ="));

    assert!(matches!(
        image.write(dir.path().join("out.bmp"), &WriteConfig::default()),
        Err(GonetError::UnsupportedFormat(_))
    ));
}

#[test]
fn region_statistics_on_decoded_image() {
    let dir = TempDir::new().unwrap();
    let path = write_container(dir.path(), &small_geometry());
    let image = decoder().decode_file(&path).unwrap();

    let spec = RegionSpec::Circle {
        center_x: 1.5,
        center_y: 1.0,
        radius: 100.0,
    };
    let mask = build_mask(&spec, image.shape()).unwrap();
    let stats = reduce(image.channel("red").unwrap(), &mask).unwrap();

    assert_eq!(stats.npixels, 12);
    assert!((stats.mean_counts - image.red().mean().unwrap()).abs() < 1e-9);
}

#[test]
fn truncated_container_is_a_decode_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("short.jpg");
    std::fs::write(&path, vec![0u8; 50]).unwrap();

    assert!(matches!(
        decoder().decode_file(&path),
        Err(GonetError::DecodeError(_))
    ));
}
