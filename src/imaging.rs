//! Article picture normalization.
//!
//! Pictures are flattened to RGB on a white background, optionally shrunk to
//! fit a 200×200 box, rebuilt from raw pixels (which drops ICC profiles, EXIF
//! and orientation tags) and re-encoded as JPEG. Every failure degrades to
//! "no picture".

use crate::http::Http;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, RgbImage};
use tracing::{debug, info, instrument};

pub const MAX_DIMENSION: u32 = 200;
const JPEG_QUALITY: u8 = 75;

/// Fetch `url` and normalize it. Absent or blank URLs never touch the network.
///
/// # Arguments
///
/// * `http` - Client used for the download
/// * `url` - Picture location picked by the extractor, if any
/// * `resize` - Shrink to fit [`MAX_DIMENSION`] on both sides
///
/// # Returns
///
/// JPEG bytes, or `None` if the download or decode fails.
///
/// # Examples
///
/// ```ignore
/// let jpeg = shrink_image(&http, Some("https://img.example/p.jpg"), true).await;
/// assert!(jpeg.is_none_or(|bytes| bytes.starts_with(&[0xff, 0xd8])));
/// ```
#[instrument(level = "info", skip(http))]
pub async fn shrink_image<H: Http>(http: &H, url: Option<&str>, resize: bool) -> Option<Vec<u8>> {
    let url = url.map(str::trim).filter(|u| !u.is_empty())?;

    let bytes = match http.get_bytes(url).await {
        Ok(bytes) => bytes,
        Err(e) => {
            info!(error = %e, "Failed to download picture");
            return None;
        }
    };
    normalize_image(&bytes, resize)
}

/// Decode, flatten, optionally shrink and re-encode an image.
pub fn normalize_image(bytes: &[u8], resize: bool) -> Option<Vec<u8>> {
    let decoded = match image::load_from_memory(bytes) {
        Ok(img) => img,
        Err(e) => {
            info!(error = %e, "Picture is not a decodable raster image");
            return None;
        }
    };

    let mut rgb = flatten_on_white(&decoded);
    if resize {
        let (w, h) = fit_within(rgb.width(), rgb.height(), MAX_DIMENSION);
        if (w, h) != rgb.dimensions() {
            rgb = image::imageops::resize(&rgb, w, h, FilterType::Lanczos3);
        }
    }

    let (width, height) = rgb.dimensions();
    let stripped = RgbImage::from_raw(width, height, rgb.into_raw())?;

    let mut out = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut out, JPEG_QUALITY);
    if let Err(e) = DynamicImage::ImageRgb8(stripped).write_with_encoder(encoder) {
        info!(error = %e, "Failed to encode picture");
        return None;
    }
    debug!(width, height, bytes = out.len(), "Normalized picture");
    Some(out)
}

fn flatten_on_white(img: &DynamicImage) -> RgbImage {
    let rgba = img.to_rgba8();
    RgbImage::from_fn(rgba.width(), rgba.height(), |x, y| {
        let [r, g, b, a] = rgba.get_pixel(x, y).0;
        let blend = |c: u8| -> u8 {
            let a = a as u32;
            ((c as u32 * a + 255 * (255 - a) + 127) / 255) as u8
        };
        image::Rgb([blend(r), blend(g), blend(b)])
    })
}

/// Largest size with the same aspect ratio that fits in `max`×`max`.
/// Images already inside the box are left alone.
pub fn fit_within(width: u32, height: u32, max: u32) -> (u32, u32) {
    if width <= max && height <= max {
        return (width, height);
    }
    let scale = f64::min(max as f64 / width as f64, max as f64 / height as f64);
    let w = ((width as f64 * scale).round() as u32).clamp(1, max);
    let h = ((height as f64 * scale).round() as u32).clamp(1, max);
    (w, h)
}
