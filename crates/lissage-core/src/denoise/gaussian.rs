use anyhow::{Context, Result};
use image::Rgb32FImage;
use imageproc::filter::separable_filter;

use crate::image_buf::ImageBuf;

/// Normalized 1-D Gaussian weights for an odd `size`, centered on the
/// middle tap.
///
/// Weights are computed in f64, and a sigma so small that every tap but the
/// center vanishes yields the one-hot identity kernel.
pub fn gaussian_kernel(size: usize, sigma: f32) -> Vec<f32> {
    let center = (size as f64 - 1.0) / 2.0;
    let sigma = f64::from(sigma);
    let denom = 2.0 * sigma * sigma;
    let weights: Vec<f64> = (0..size)
        .map(|i| {
            let d = i as f64 - center;
            (-(d * d) / denom).exp()
        })
        .collect();

    let sum: f64 = weights.iter().sum();
    if !sum.is_finite() || sum <= 0.0 || weights.iter().any(|w| !w.is_finite()) {
        let mut identity = vec![0.0; size];
        identity[size / 2] = 1.0;
        return identity;
    }
    weights.iter().map(|w| (w / sum) as f32).collect()
}

/// Separable Gaussian blur with an explicit `kernel_width x kernel_height`
/// window. Pixels past the border repeat the edge pixel.
///
/// Both kernel sizes must be odd and positive; the caller validates them.
/// The convolution runs on f32 samples and rounds once at the end.
pub fn gaussian_blur(
    input: &ImageBuf,
    sigma: f32,
    kernel_width: usize,
    kernel_height: usize,
) -> Result<ImageBuf> {
    if input.width == 0 || input.height == 0 {
        return Ok(input.clone());
    }

    let kx = gaussian_kernel(kernel_width, sigma);
    let ky = gaussian_kernel(kernel_height, sigma);

    let samples = input.data.iter().map(|&v| f32::from(v)).collect();
    let src = Rgb32FImage::from_raw(input.width, input.height, samples)
        .context("pixel buffer does not match its dimensions")?;
    let blurred = separable_filter(&src, &kx, &ky);

    let data = blurred
        .into_raw()
        .into_iter()
        .map(|v| v.round().clamp(0.0, 255.0) as u8)
        .collect();
    ImageBuf::from_data(input.width, input.height, data)
}
