use anyhow::Result;

use crate::analysis::ColorBaseline;
use crate::color::{hsv_to_rgb, rgb_to_hsv};
use crate::image_buf::ImageBuf;
use crate::params::EditParams;
use crate::pipeline::module::ProcessingModule;

/// Hue rotation and additive saturation shift, relative to the source's
/// baseline.
///
/// Setting hue and saturation to the baseline values leaves the image
/// untouched. Moving hue by `n` steps rotates every pixel's hue by `n`
/// (2 degrees per step, wrapping); moving saturation by `n` adds `n` to
/// every pixel's HSV saturation, clamped to [0, 255].
pub struct HueSaturation;

impl ProcessingModule for HueSaturation {
    fn name(&self) -> &str {
        "hue_saturation"
    }

    fn process_cpu(
        &self,
        mut input: ImageBuf,
        params: &EditParams,
        baseline: ColorBaseline,
    ) -> Result<ImageBuf> {
        let hue_shift = params.hue - i32::from(baseline.hue);
        let sat_shift = params.saturation - i32::from(baseline.saturation);
        if hue_shift == 0 && sat_shift == 0 {
            return Ok(input);
        }

        let hue_shift = hue_shift as f32;
        let sat_shift = sat_shift as f32;
        for pixel in input.data.chunks_exact_mut(3) {
            let (h, s, v) = rgb_to_hsv(pixel[0], pixel[1], pixel[2]);
            let rgb = hsv_to_rgb(h + hue_shift, s + sat_shift, v);
            pixel.copy_from_slice(&rgb);
        }
        Ok(input)
    }
}
