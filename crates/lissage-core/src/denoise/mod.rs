//! Denoising filters. Every filter reads its input and returns a new image.

pub mod gaussian;
pub mod median;
pub mod nl_means;

use anyhow::Result;
use tracing::debug;

use crate::image_buf::ImageBuf;
use crate::params::DenoiseParams;

pub use gaussian::gaussian_blur;
pub use median::median_blur;
pub use nl_means::nl_means;

/// Validate `params` and run the selected filter over `input`.
///
/// Returns the validation error untouched (downcastable from the
/// `anyhow::Error`) when the parameters are illegal; no pixel work is done
/// in that case.
pub fn denoise(input: &ImageBuf, params: &DenoiseParams) -> Result<ImageBuf> {
    params.validate()?;
    let t0 = std::time::Instant::now();

    let output = match *params {
        DenoiseParams::GaussianBlur {
            sigma,
            kernel_width,
            kernel_height,
        } => gaussian_blur(input, sigma, kernel_width as usize, kernel_height as usize)?,
        DenoiseParams::MedianBlur { aperture } => median_blur(input, aperture as u32)?,
        DenoiseParams::NonLocalMeans => nl_means(input),
    };

    debug!(
        filter = %params.process_type(),
        elapsed_ms = t0.elapsed().as_millis(),
        width = output.width,
        height = output.height,
        "denoise"
    );
    Ok(output)
}
