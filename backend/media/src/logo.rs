//! Logo preparation for the watermark flow.

use std::path::Path;

use bytes::Bytes;
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, ImageFormat};
use reelforge_core::{ReelError, ReelResult, Resolution};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Logos wider than this are scaled down to it.
pub const MAX_LOGO_WIDTH: u32 = 150;

/// Original and on-video size of a logo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogoPlan {
    pub original: Resolution,
    pub resized: Resolution,
}

impl LogoPlan {
    pub fn is_resized(&self) -> bool {
        self.original != self.resized
    }
}

/// Watermark size for a logo of `width` x `height`: capped at
/// [`MAX_LOGO_WIDTH`] with the aspect ratio kept.
pub fn watermark_size(width: u32, height: u32) -> Resolution {
    if width <= MAX_LOGO_WIDTH {
        return Resolution::new(width, height);
    }
    let scaled = (f64::from(height) * f64::from(MAX_LOGO_WIDTH) / f64::from(width)).round();
    Resolution::new(MAX_LOGO_WIDTH, (scaled as u32).max(1))
}

fn decode(data: &[u8]) -> ReelResult<DynamicImage> {
    image::load_from_memory(data).map_err(|e| ReelError::Image(e.to_string()))
}

/// Decode and size a logo without writing anything.
pub fn plan_logo(data: &[u8]) -> ReelResult<LogoPlan> {
    let (width, height) = decode(data)?.dimensions();
    Ok(LogoPlan {
        original: Resolution::new(width, height),
        resized: watermark_size(width, height),
    })
}

/// Decode, downscale with Lanczos if needed and return the image to write.
pub fn resize_logo(data: &[u8]) -> ReelResult<(DynamicImage, LogoPlan)> {
    let img = decode(data)?;
    let (width, height) = img.dimensions();
    let plan = LogoPlan {
        original: Resolution::new(width, height),
        resized: watermark_size(width, height),
    };
    let img = if plan.is_resized() {
        img.resize_exact(plan.resized.width, plan.resized.height, FilterType::Lanczos3)
    } else {
        img
    };
    Ok((img, plan))
}

/// Resize the logo and write it as PNG to `dest`. Decoding and resampling
/// run on the blocking pool.
pub async fn prepare_logo(data: Bytes, dest: &Path) -> ReelResult<LogoPlan> {
    let dest = dest.to_path_buf();
    tokio::task::spawn_blocking(move || -> ReelResult<LogoPlan> {
        let (img, plan) = resize_logo(&data)?;
        img.save_with_format(&dest, ImageFormat::Png)
            .map_err(|e| ReelError::Image(e.to_string()))?;
        debug!(
            path = %dest.display(),
            original = %plan.original,
            resized = %plan.resized,
            "Prepared logo"
        );
        Ok(plan)
    })
    .await
    .map_err(|e| ReelError::Other(anyhow::anyhow!("logo task failed: {e}")))?
}

#[cfg(test)]
pub(crate) fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = DynamicImage::ImageRgba8(image::RgbaImage::from_pixel(
        width,
        height,
        image::Rgba([200, 30, 30, 255]),
    ));
    let mut out = std::io::Cursor::new(Vec::new());
    img.write_to(&mut out, ImageFormat::Png).unwrap();
    out.into_inner()
}
