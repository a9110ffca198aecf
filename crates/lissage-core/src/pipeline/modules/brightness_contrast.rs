use anyhow::Result;

use crate::analysis::ColorBaseline;
use crate::image_buf::ImageBuf;
use crate::params::{EditParams, NEUTRAL_LEVEL};
use crate::pipeline::module::ProcessingModule;

/// Linear intensity remap: `out = contrast / 100 * in + (brightness - 100)`.
pub struct BrightnessContrast;

impl BrightnessContrast {
    fn lut(brightness: i32, contrast: i32) -> [u8; 256] {
        let alpha = contrast as f32 / 100.0;
        let beta = (brightness - NEUTRAL_LEVEL) as f32;
        let mut lut = [0u8; 256];
        for (i, entry) in lut.iter_mut().enumerate() {
            *entry = (alpha * i as f32 + beta).round().clamp(0.0, 255.0) as u8;
        }
        lut
    }
}

impl ProcessingModule for BrightnessContrast {
    fn name(&self) -> &str {
        "brightness_contrast"
    }

    fn process_cpu(
        &self,
        mut input: ImageBuf,
        params: &EditParams,
        _baseline: ColorBaseline,
    ) -> Result<ImageBuf> {
        if params.brightness == NEUTRAL_LEVEL && params.contrast == NEUTRAL_LEVEL {
            return Ok(input);
        }

        let lut = Self::lut(params.brightness, params.contrast);
        for v in &mut input.data {
            *v = lut[*v as usize];
        }
        Ok(input)
    }
}
