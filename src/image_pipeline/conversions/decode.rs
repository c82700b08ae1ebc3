use std::path::Path;

use tracing::{debug, info, instrument};

use crate::image_pipeline::{
    common::error::{GonetError, Result},
    conversions::types::{DecodeConfig, InputKind},
    debayer::SuperpixelDebayer,
    formats::Tiff16Reader,
    gonet_image::{GonetImage, Provenance},
    metadata::{CameraMetadata, MetadataExtractor, read_exif_tags},
    raw::{GonetRawReader, RawImageReader},
};

/// Raw container or TIFF → [`GonetImage`].
pub struct GonetDecoder<R: RawImageReader> {
    reader: R,
    debayer: SuperpixelDebayer,
    extractor: MetadataExtractor,
    tiff_reader: Tiff16Reader,
    config: DecodeConfig,
}

impl GonetDecoder<GonetRawReader> {
    pub fn new(config: DecodeConfig) -> Self {
        Self::with_custom(GonetRawReader, config)
    }
}

impl<R: RawImageReader> GonetDecoder<R> {
    pub fn with_custom(reader: R, config: DecodeConfig) -> Self {
        Self {
            reader,
            debayer: SuperpixelDebayer::new(),
            extractor: MetadataExtractor::new(),
            tiff_reader: Tiff16Reader::new(),
            config,
        }
    }

    /// Decodes a raw container held in memory. The result has no provenance.
    #[instrument(skip(self, input_data), fields(input_size = input_data.len()))]
    pub fn decode_container(&self, input_data: &[u8]) -> Result<GonetImage> {
        info!("Starting raw container decode");

        let raw_image = {
            let _span = tracing::info_span!("decode_raw").entered();
            self.reader.read_raw(input_data, &self.config.geometry)?
        };

        let planes = {
            let _span = tracing::info_span!(
                "debayer",
                width = raw_image.width,
                height = raw_image.height
            )
            .entered();
            self.debayer.process(&raw_image)?
        };

        let metadata = if self.config.extract_metadata {
            let _span = tracing::info_span!("extract_metadata").entered();
            self.container_metadata(input_data)
        } else {
            None
        };

        let (rows, cols) = planes.dim();
        info!(width = cols, height = rows, "Decode complete");
        GonetImage::from_planes(planes, metadata, None)
    }

    /// Decodes a 16-bit TIFF held in memory. The result has no provenance.
    #[instrument(skip(self, input_data), fields(input_size = input_data.len()))]
    pub fn decode_tiff(&self, input_data: &[u8]) -> Result<GonetImage> {
        let (planes, metadata) = {
            let _span = tracing::info_span!("decode_tiff").entered();
            self.tiff_reader.read(input_data)?
        };
        let metadata = if self.config.extract_metadata { metadata } else { None };
        GonetImage::from_planes(planes, metadata, None)
    }

    /// Decodes `input_path`, dispatching on its extension, and records the
    /// path and configured file type as provenance.
    #[instrument(skip(self, input_path))]
    pub fn decode_file<P: AsRef<Path>>(&self, input_path: P) -> Result<GonetImage> {
        let input_path = input_path.as_ref();
        info!(input = %input_path.display(), "Decoding file");

        if !input_path.exists() {
            return Err(GonetError::NotFound(input_path.to_path_buf()));
        }
        let kind = InputKind::from_path(input_path)?;

        let input_data = {
            let _span = tracing::info_span!("read_input_file").entered();
            std::fs::read(input_path).map_err(|e| {
                GonetError::InputReadError(format!("{}: {}", input_path.display(), e))
            })?
        };

        let image = match kind {
            InputKind::RawContainer => self.decode_container(&input_data)?,
            InputKind::Tiff16 => self.decode_tiff(&input_data)?,
        };
        Ok(image.with_provenance(Provenance::new(input_path, self.config.file_type)))
    }

    fn container_metadata(&self, input_data: &[u8]) -> Option<CameraMetadata> {
        let tags = read_exif_tags(input_data)?;
        let metadata = self.extractor.extract(&tags);
        debug!("Extracted metadata with {} extra tags", metadata.extra.len());
        Some(metadata)
    }

    pub fn config(&self) -> &DecodeConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: DecodeConfig) {
        self.config = config;
    }
}

/// Decodes `path` with the default configuration.
pub fn decode<P: AsRef<Path>>(path: P) -> Result<GonetImage> {
    GonetDecoder::new(DecodeConfig::default()).decode_file(path)
}
