//! Image decoding and tensor preparation
//!
//! Matches the training-time loader: RGB, nearest-neighbour resize to the
//! model's input size, intensities scaled to [0, 1], batch of one.

use super::ClassifierError;
use image::imageops::FilterType;
use image::{DynamicImage, ImageReader};
use serde::Deserialize;
use std::path::Path;
use tract_onnx::prelude::tract_ndarray::Array4;

/// Model input tensor, batch dimension first
pub type ImageTensor = Array4<f32>;

/// Default model input edge length in pixels
pub const DEFAULT_INPUT_SIZE: u32 = 224;

/// Channel ordering expected by the model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TensorLayout {
    /// `[1, height, width, 3]` (Keras export default)
    #[default]
    Nhwc,
    /// `[1, 3, height, width]`
    Nchw,
}

/// Decode an image file, sniffing the format from its content
pub fn open_image(path: &Path) -> Result<DynamicImage, ClassifierError> {
    let image = ImageReader::open(path)?.with_guessed_format()?.decode()?;
    Ok(image)
}

#[derive(Debug, Clone, Copy)]
pub struct Preprocessor {
    width: u32,
    height: u32,
    layout: TensorLayout,
}

impl Default for Preprocessor {
    fn default() -> Self {
        Self::new(DEFAULT_INPUT_SIZE, DEFAULT_INPUT_SIZE, TensorLayout::Nhwc)
    }
}

impl Preprocessor {
    pub fn new(width: u32, height: u32, layout: TensorLayout) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
            layout,
        }
    }

    /// Shape of the tensor produced by [`Preprocessor::prepare`]
    pub fn input_shape(&self) -> [usize; 4] {
        let (w, h) = (self.width as usize, self.height as usize);
        match self.layout {
            TensorLayout::Nhwc => [1, h, w, 3],
            TensorLayout::Nchw => [1, 3, h, w],
        }
    }

    pub fn prepare(&self, image: &DynamicImage) -> ImageTensor {
        let rgb = image
            .resize_exact(self.width, self.height, FilterType::Nearest)
            .to_rgb8();
        let (w, h) = (self.width as usize, self.height as usize);
        let scale = |v: u8| f32::from(v) / 255.0;

        match self.layout {
            TensorLayout::Nhwc => Array4::from_shape_fn((1, h, w, 3), |(_, y, x, c)| {
                scale(rgb.get_pixel(x as u32, y as u32)[c])
            }),
            TensorLayout::Nchw => Array4::from_shape_fn((1, 3, h, w), |(_, c, y, x)| {
                scale(rgb.get_pixel(x as u32, y as u32)[c])
            }),
        }
    }
}
