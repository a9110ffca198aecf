use imageproc::filter::median_filter;

use crate::image_buf::ImageBuf;

/// Per-channel median over an `aperture x aperture` square window.
///
/// `aperture` must be odd and at least 3; the caller validates it.
pub fn median_blur(input: &ImageBuf, aperture: u32) -> anyhow::Result<ImageBuf> {
    let radius = aperture / 2;
    let rgb = input.to_rgb_image()?;
    let filtered = median_filter(&rgb, radius, radius);
    Ok(ImageBuf::from_rgb_image(filtered))
}
