use anyhow::Context;
use image::RgbImage;

/// 8-bit sRGB image buffer.
///
/// Pixel data is stored as interleaved RGBRGBRGB... rows, top to bottom,
/// with no padding between rows.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageBuf {
    pub width: u32,
    pub height: u32,
    /// Flat pixel data: [R, G, B, R, G, B, ...].
    pub data: Vec<u8>,
}

impl ImageBuf {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0; width as usize * height as usize * 3],
        }
    }

    pub fn from_data(width: u32, height: u32, data: Vec<u8>) -> anyhow::Result<Self> {
        let expected = width as usize * height as usize * 3;
        anyhow::ensure!(
            data.len() == expected,
            "expected {expected} bytes for {width}x{height} RGB, got {}",
            data.len()
        );
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Build a buffer by evaluating `f` at every pixel, row by row.
    pub fn from_fn(width: u32, height: u32, mut f: impl FnMut(u32, u32) -> [u8; 3]) -> Self {
        let mut data = Vec::with_capacity(width as usize * height as usize * 3);
        for y in 0..height {
            for x in 0..width {
                data.extend_from_slice(&f(x, y));
            }
        }
        Self {
            width,
            height,
            data,
        }
    }

    /// Bytes per row.
    pub fn stride(&self) -> usize {
        self.width as usize * 3
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    pub fn pixel(&self, x: u32, y: u32) -> [u8; 3] {
        let idx = y as usize * self.stride() + x as usize * 3;
        [self.data[idx], self.data[idx + 1], self.data[idx + 2]]
    }

    pub fn pixels(&self) -> impl Iterator<Item = &[u8]> {
        self.data.chunks_exact(3)
    }

    pub fn to_rgb_image(&self) -> anyhow::Result<RgbImage> {
        RgbImage::from_raw(self.width, self.height, self.data.clone())
            .context("pixel data does not match image dimensions")
    }

    pub fn from_rgb_image(img: RgbImage) -> Self {
        Self {
            width: img.width(),
            height: img.height(),
            data: img.into_raw(),
        }
    }

    /// Convert to planar f32 channels in [0, 255], one Vec per channel.
    pub fn to_planes_f32(&self) -> [Vec<f32>; 3] {
        let mut planes: [Vec<f32>; 3] =
            std::array::from_fn(|_| Vec::with_capacity(self.pixel_count()));
        for pixel in self.pixels() {
            for (plane, &v) in planes.iter_mut().zip(pixel) {
                plane.push(f32::from(v));
            }
        }
        planes
    }

    /// Rebuild an image from planar f32 channels, rounding and clamping to u8.
    pub fn from_planes_f32(width: u32, height: u32, planes: &[Vec<f32>; 3]) -> Self {
        let count = width as usize * height as usize;
        let mut data = Vec::with_capacity(count * 3);
        for i in 0..count {
            for plane in planes {
                data.push(plane[i].round().clamp(0.0, 255.0) as u8);
            }
        }
        Self {
            width,
            height,
            data,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_buf_dimensions() {
        let buf = ImageBuf::new(100, 50);
        assert_eq!(buf.data.len(), 100 * 50 * 3);
        assert_eq!(buf.pixel_count(), 5000);
        assert_eq!(buf.stride(), 300);
    }

    #[test]
    fn from_data_validates_length() {
        let ok = ImageBuf::from_data(2, 2, vec![0; 12]);
        assert!(ok.is_ok());

        let bad = ImageBuf::from_data(2, 2, vec![0; 10]);
        assert!(bad.is_err());
    }

    #[test]
    fn from_data_zero_dimensions() {
        let buf = ImageBuf::from_data(0, 0, vec![]);
        assert!(buf.is_ok());
        assert_eq!(buf.unwrap().pixel_count(), 0);
    }

    #[test]
    fn from_fn_is_row_major() {
        let buf = ImageBuf::from_fn(3, 2, |x, y| [x as u8, y as u8, 7]);
        assert_eq!(buf.pixel(2, 0), [2, 0, 7]);
        assert_eq!(buf.pixel(0, 1), [0, 1, 7]);
        assert_eq!(buf.data[buf.stride()..buf.stride() + 3], [0, 1, 7]);
    }

    #[test]
    fn rgb_image_conversion_preserves_pixels() {
        let buf = ImageBuf::from_fn(4, 3, |x, y| [(x * 10) as u8, (y * 20) as u8, 99]);
        let img = buf.to_rgb_image().unwrap();
        assert_eq!(img.width(), 4);
        assert_eq!(img.height(), 3);
        assert_eq!(img.get_pixel(3, 2).0, [30, 40, 99]);
        assert_eq!(ImageBuf::from_rgb_image(img), buf);
    }

    #[test]
    fn rgb_image_conversion_rejects_bad_length() {
        let buf = ImageBuf {
            width: 3,
            height: 3,
            data: vec![0; 5],
        };
        assert!(buf.to_rgb_image().is_err());
    }

    #[test]
    fn planes_round_trip_is_exact() {
        let buf = ImageBuf::from_fn(5, 4, |x, y| [(x * 50) as u8, (y * 60) as u8, 255]);
        let planes = buf.to_planes_f32();
        assert_eq!(planes[2].len(), 20);
        let back = ImageBuf::from_planes_f32(5, 4, &planes);
        assert_eq!(back, buf);
    }

    #[test]
    fn from_planes_clamps_out_of_range() {
        let planes = [vec![-12.0], vec![300.0], vec![127.6]];
        let buf = ImageBuf::from_planes_f32(1, 1, &planes);
        assert_eq!(buf.data, vec![0, 255, 128]);
    }
}
