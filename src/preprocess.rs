use anyhow::{Context, Result};
use image::imageops::FilterType;
use image::{DynamicImage, RgbImage};
use std::path::Path;
use tract_onnx::prelude::tract_ndarray::Array4;

pub const IMAGE_SIZE: usize = 224;
const IMAGE_SIZE_U32: u32 = IMAGE_SIZE as u32;

/// Bicubic, the default the model was calibrated against for RGB resizes.
const RESIZE_FILTER: FilterType = FilterType::CatmullRom;

/// NHWC input of the classifier: `1 x 224 x 224 x 3`, values in `[0, 1]`.
pub type ImageTensor = Array4<f32>;

/// Read the image at `path` and turn it into model input.
#[tracing::instrument(skip_all)]
pub fn load_image<P: AsRef<Path>>(path: P) -> Result<ImageTensor> {
    let path = path.as_ref();
    let img = image::open(path)
        .with_context(|| format!("Failed to decode image {}", path.display()))?;
    tracing::debug!(width = img.width(), height = img.height(), "Image decoded");

    Ok(to_tensor(&img))
}

/// Force three channels and scale to the model's input size.
///
/// An image that is already `224 x 224` is returned as is, so preprocessing
/// its own output is a no-op.
pub fn resize_rgb(img: &DynamicImage) -> RgbImage {
    let rgb = img.to_rgb8();
    if rgb.dimensions() == (IMAGE_SIZE_U32, IMAGE_SIZE_U32) {
        return rgb;
    }
    image::imageops::resize(&rgb, IMAGE_SIZE_U32, IMAGE_SIZE_U32, RESIZE_FILTER)
}

/// Resize, scale pixels to `[0, 1]` and wrap them in a batch of one.
pub fn to_tensor(img: &DynamicImage) -> ImageTensor {
    let rgb = resize_rgb(img);
    Array4::from_shape_fn((1, IMAGE_SIZE, IMAGE_SIZE, 3), |(_, y, x, c)| {
        rgb[(x as u32, y as u32)][c] as f32 / 255.0
    })
}
