use image::imageops::{self, FilterType};
use image::{Rgb, RgbImage};

use crate::detection::engine::InputTensor;

/// Grey used for the padding bands
pub const PAD_COLOR: Rgb<u8> = Rgb([114, 114, 114]);

/// Where the resized image sits inside the square detector input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LetterboxGeometry {
    pub new_height: u32,
    pub new_width: u32,
    pub top: u32,
    pub left: u32,
}

impl LetterboxGeometry {
    /// Map a box given as center/size in detector-input space back onto a
    /// source image of `source_width` x `source_height`.
    /// Returns `(center_x, center_y, width, height)`.
    pub fn to_source(
        &self,
        center_x: f32,
        center_y: f32,
        width: f32,
        height: f32,
        source_width: u32,
        source_height: u32,
    ) -> (f32, f32, f32, f32) {
        let ratio_w = source_width as f32 / self.new_width as f32;
        let ratio_h = source_height as f32 / self.new_height as f32;
        (
            (center_x - self.left as f32) * ratio_w,
            (center_y - self.top as f32) * ratio_h,
            width * ratio_w,
            height * ratio_h,
        )
    }
}

/// Aspect-preserving resize onto a square canvas
#[derive(Debug, Clone, Copy)]
pub struct Letterbox {
    pub size: u32,
    pub fill: Rgb<u8>,
}

impl Letterbox {
    pub fn new(size: u32) -> Self {
        Self { size, fill: PAD_COLOR }
    }

    /// Compute the resize target and padding for an image of the given size
    pub fn geometry(&self, width: u32, height: u32) -> LetterboxGeometry {
        let size = self.size;
        if width == height || width == 0 || height == 0 {
            return LetterboxGeometry { new_height: size, new_width: size, top: 0, left: 0 };
        }

        let hw_scale = height as f32 / width as f32;
        if hw_scale > 1.0 {
            // Taller than wide: full height, pad left and right
            let new_width = ((size as f32 / hw_scale) as u32).clamp(1, size);
            let left = ((size - new_width) as f32 * 0.5) as u32;
            LetterboxGeometry { new_height: size, new_width, top: 0, left }
        } else {
            let new_height = ((size as f32 * hw_scale) as u32).clamp(1, size);
            let top = ((size - new_height) as f32 * 0.5) as u32;
            LetterboxGeometry { new_height, new_width: size, top, left: 0 }
        }
    }

    /// Resize and pad `img`, returning the canvas and its geometry
    pub fn apply(&self, img: &RgbImage) -> (RgbImage, LetterboxGeometry) {
        let geometry = self.geometry(img.width(), img.height());
        let resized = imageops::resize(img, geometry.new_width, geometry.new_height, FilterType::Triangle);

        if geometry.new_width == self.size && geometry.new_height == self.size {
            return (resized, geometry);
        }

        let mut canvas = RgbImage::from_pixel(self.size, self.size, self.fill);
        imageops::overlay(&mut canvas, &resized, geometry.left.into(), geometry.top.into());
        (canvas, geometry)
    }
}

/// Planar RGB tensor with values scaled to [0, 1]
pub fn to_input_tensor(img: &RgbImage) -> InputTensor {
    let (width, height) = (img.width() as usize, img.height() as usize);
    let plane = width * height;
    let mut data = vec![0.0f32; 3 * plane];

    for (x, y, pixel) in img.enumerate_pixels() {
        let offset = y as usize * width + x as usize;
        for c in 0..3 {
            data[c * plane + offset] = pixel[c] as f32 / 255.0;
        }
    }

    InputTensor { width, height, data }
}
