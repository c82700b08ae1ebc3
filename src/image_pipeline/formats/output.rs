use std::fs::File;
use std::io::Write;
use std::path::Path;

use tracing::{info, instrument};

use crate::image_pipeline::common::error::{GonetError, Result};
use crate::image_pipeline::formats::fits_writer::FitsWriter;
use crate::image_pipeline::formats::rgb8_writer::{JpegWriter, PngWriter};
use crate::image_pipeline::formats::tiff_writer::Tiff16Writer;
use crate::image_pipeline::formats::types::{OutputFormat, WriteConfig};
use crate::image_pipeline::formats::writer::ImageWriter;
use crate::image_pipeline::gonet_image::GonetImage;

pub fn writer_for(format: OutputFormat) -> &'static dyn ImageWriter {
    match format {
        OutputFormat::Jpeg8 => &JpegWriter,
        OutputFormat::Png8 => &PngWriter,
        OutputFormat::Tiff16 => &Tiff16Writer,
        OutputFormat::Fits => &FitsWriter,
    }
}

impl GonetImage {
    /// Writes to `path` in the format its extension names.
    pub fn write<P: AsRef<Path>>(&self, path: P, config: &WriteConfig) -> Result<()> {
        let path = path.as_ref();
        let format = OutputFormat::from_path(path)?;
        self.write_as(format, path, config)
    }

    pub fn write_jpeg<P: AsRef<Path>>(&self, path: P, config: &WriteConfig) -> Result<()> {
        self.write_as(OutputFormat::Jpeg8, path.as_ref(), config)
    }

    pub fn write_png<P: AsRef<Path>>(&self, path: P, config: &WriteConfig) -> Result<()> {
        self.write_as(OutputFormat::Png8, path.as_ref(), config)
    }

    pub fn write_tiff<P: AsRef<Path>>(&self, path: P, config: &WriteConfig) -> Result<()> {
        self.write_as(OutputFormat::Tiff16, path.as_ref(), config)
    }

    pub fn write_fits<P: AsRef<Path>>(&self, path: P, config: &WriteConfig) -> Result<()> {
        self.write_as(OutputFormat::Fits, path.as_ref(), config)
    }

    /// Encodes into any sink.
    pub fn write_to(&self, format: OutputFormat, output: &mut dyn Write, config: &WriteConfig) -> Result<()> {
        let _span = tracing::info_span!("encode", ?format).entered();
        writer_for(format).write_image(self, output, config)
    }

    /// Encodes in memory first so a failed encode never touches `path`.
    #[instrument(skip(self, config), fields(path = %path.display()))]
    fn write_as(&self, format: OutputFormat, path: &Path, config: &WriteConfig) -> Result<()> {
        let mut encoded = Vec::new();
        self.write_to(format, &mut encoded, config)?;

        {
            let _span = tracing::info_span!("create_output_file").entered();
            File::create(path)
                .and_then(|mut file| file.write_all(&encoded))
                .map_err(|e| GonetError::OutputWriteError(format!("{}: {}", path.display(), e)))?;
        }

        let (rows, cols) = self.shape();
        info!(width = cols, height = rows, ?format, "Image written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use tempfile::TempDir;

    #[test]
    fn failed_encode_leaves_existing_file_untouched() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("night.png");
        std::fs::write(&path, b"previous frame").unwrap();

        let image = GonetImage::new(array![[1.0]], array![[2.0]], array![[3.0]], None, None).unwrap();
        let result = image.write_png(&path, &WriteConfig::builder().white_balance(true).build());

        assert!(matches!(result, Err(GonetError::MissingMetadata(_))));
        assert_eq!(std::fs::read(&path).unwrap(), b"previous frame");
    }

    #[test]
    fn successful_write_replaces_the_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("night.fits");
        std::fs::write(&path, b"stale").unwrap();

        let image = GonetImage::new(array![[1.0]], array![[2.0]], array![[3.0]], None, None).unwrap();
        image.write(&path, &WriteConfig::default()).unwrap();

        let written = std::fs::read(&path).unwrap();
        assert_eq!(written.len() % 2880, 0);
        assert!(written.starts_with(b"SIMPLE  ="));
    }
}
