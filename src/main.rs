use anyhow::{Context, bail};
use gonet_core::image_pipeline::{Channel, DecodeConfig, GonetDecoder, WriteConfig};
use gonet_core::logger;
use gonet_core::regions::{RegionMask, reduce};

use tracing::info;

fn main() -> anyhow::Result<()> {
    logger::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let (input, output) = match args.as_slice() {
        [input, output] => (input, output),
        _ => bail!("usage: gonet-convert <input.jpg|input.tiff> <output.jpg|.png|.tiff|.fits>"),
    };

    info!("Starting gonet-convert...");

    let decoder = GonetDecoder::new(DecodeConfig::default());
    let image = decoder
        .decode_file(input)
        .with_context(|| format!("decoding {}", input))?;

    let (rows, cols) = image.shape();
    info!("Decoded {}x{} image", cols, rows);
    if let Some(metadata) = image.metadata() {
        info!(
            "Camera: {} {}, exposure {:?} s, ISO {:?}",
            metadata.make.as_deref().unwrap_or("unknown"),
            metadata.model.as_deref().unwrap_or(""),
            metadata.exposure_time,
            metadata.iso
        );
    }

    let whole = RegionMask::from_elem(image.shape(), true);
    for channel in Channel::ALL {
        let stats = reduce(image.plane(channel), &whole)?;
        info!(
            "{}: mean {:.1}, std {:.1} over {} pixels",
            channel, stats.mean_counts, stats.std, stats.npixels
        );
    }

    image
        .write(output, &WriteConfig::default())
        .with_context(|| format!("writing {}", output))?;
    info!("Wrote {}", output);

    Ok(())
}
