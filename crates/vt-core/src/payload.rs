// crates/vt-core/src/payload.rs

use std::path::Path;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use tracing::{debug, info};

use crate::error::{Error, Result};

pub const DEFAULT_MIME: &str = "image/jpeg";
pub const MAX_DIMENSION: u32 = 2048;
pub const START_QUALITY: u8 = 85;
pub const QUALITY_STEP: u8 = 5;
pub const MIN_QUALITY: u8 = 20;

/// File contents ready to be embedded in a request body.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedPayload {
    pub mime: String,
    pub bytes: Vec<u8>,
    /// JPEG quality used when the file had to be recompressed.
    pub quality: Option<u8>,
}

impl EncodedPayload {
    pub fn to_data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime, BASE64.encode(&self.bytes))
    }
}

/// Read `path` and prepare it for upload.
///
/// With `budget_kb` set, images larger than the budget are flattened onto
/// white, capped at [`MAX_DIMENSION`] and re-encoded as JPEG at decreasing
/// quality until they fit or [`MIN_QUALITY`] is reached.
pub fn encode_file(path: &Path, budget_kb: Option<u64>) -> Result<EncodedPayload> {
    if !path.exists() {
        return Err(Error::NotFound(path.to_path_buf()));
    }

    let mime = mime_for_path(path);
    let bytes = std::fs::read(path)?;

    if let Some(budget_kb) = budget_kb {
        if mime.starts_with("image/") {
            let budget = budget_kb * 1024;
            if bytes.len() as u64 <= budget {
                debug!(
                    path = %path.display(),
                    size_kb = bytes.len() / 1024,
                    budget_kb,
                    "Image already within budget, skipping compression"
                );
            } else {
                return compress(path, &bytes, budget);
            }
        }
    }

    Ok(EncodedPayload {
        mime,
        bytes,
        quality: None,
    })
}

/// Data URI shorthand for [`encode_file`].
pub fn encode_data_uri(path: &Path, budget_kb: Option<u64>) -> Result<String> {
    encode_file(path, budget_kb).map(|payload| payload.to_data_uri())
}

pub fn mime_for_path(path: &Path) -> String {
    ImageFormat::from_path(path)
        .map(|format| format.to_mime_type().to_string())
        .unwrap_or_else(|_| DEFAULT_MIME.to_string())
}

fn compress(path: &Path, original: &[u8], budget: u64) -> Result<EncodedPayload> {
    info!(
        path = %path.display(),
        size_kb = original.len() / 1024,
        budget_kb = budget / 1024,
        "Compressing image"
    );

    let decoded = image::load_from_memory(original)?;
    let flattened = flatten_onto_white(decoded);
    let img = cap_dimensions(flattened);

    let mut quality = START_QUALITY;
    let mut best = (encode_jpeg(&img, quality)?, quality);
    while best.0.len() as u64 > budget && quality >= MIN_QUALITY + QUALITY_STEP {
        quality -= QUALITY_STEP;
        let encoded = encode_jpeg(&img, quality)?;
        let fits = encoded.len() as u64 <= budget;
        if fits || encoded.len() < best.0.len() {
            best = (encoded, quality);
        }
        if fits {
            break;
        }
    }
    let (bytes, quality) = best;

    info!(
        size_kb = bytes.len() / 1024,
        quality,
        width = img.width(),
        height = img.height(),
        "Compressed image"
    );

    Ok(EncodedPayload {
        mime: DEFAULT_MIME.to_string(),
        bytes,
        quality: Some(quality),
    })
}

/// Composite any alpha channel over an opaque white background.
fn flatten_onto_white(img: DynamicImage) -> RgbImage {
    if !img.color().has_alpha() {
        return img.into_rgb8();
    }

    let rgba = img.into_rgba8();
    let mut out = RgbImage::from_pixel(rgba.width(), rgba.height(), Rgb([255, 255, 255]));
    for (x, y, pixel) in rgba.enumerate_pixels() {
        let alpha = pixel[3] as u32;
        let blend = |c: u8| ((c as u32 * alpha + 255 * (255 - alpha)) / 255) as u8;
        out.put_pixel(x, y, Rgb([blend(pixel[0]), blend(pixel[1]), blend(pixel[2])]));
    }
    out
}

fn cap_dimensions(img: RgbImage) -> RgbImage {
    let (width, height) = img.dimensions();
    let longest = width.max(height);
    if longest <= MAX_DIMENSION {
        return img;
    }

    let ratio = MAX_DIMENSION as f64 / longest as f64;
    let new_width = ((width as f64 * ratio).round() as u32).clamp(1, MAX_DIMENSION);
    let new_height = ((height as f64 * ratio).round() as u32).clamp(1, MAX_DIMENSION);
    debug!(width, height, new_width, new_height, "Downscaling image");

    image::imageops::resize(&img, new_width, new_height, FilterType::Lanczos3)
}

fn encode_jpeg(img: &RgbImage, quality: u8) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    JpegEncoder::new_with_quality(&mut buf, quality).encode_image(img)?;
    Ok(buf)
}
