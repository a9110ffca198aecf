pub mod module;
pub mod modules;

use anyhow::Result;
use tracing::debug;

use crate::analysis::ColorBaseline;
use crate::image_buf::ImageBuf;
use crate::params::EditParams;
use module::ProcessingModule;

/// Edit pipeline that chains modules together.
///
/// ```text
/// Source -> Brightness/Contrast -> Hue/Saturation -> Output
/// ```
///
/// Every run starts from the caller's source image and applies the full
/// set of edit values, so results never build on a previous edit.
pub struct Pipeline {
    modules: Vec<Box<dyn ProcessingModule>>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self {
            modules: vec![
                Box::new(modules::BrightnessContrast),
                Box::new(modules::HueSaturation),
            ],
        }
    }

    /// Validate `params` and run every module on a copy of `source`.
    pub fn process_cpu(
        &self,
        source: &ImageBuf,
        params: &EditParams,
        baseline: ColorBaseline,
    ) -> Result<ImageBuf> {
        params.validate()?;
        let t0 = std::time::Instant::now();

        let mut current = source.clone();
        for module in &self.modules {
            debug!(module = module.name(), "processing");
            current = module.process_cpu(current, params, baseline)?;
        }

        debug!(elapsed_ms = t0.elapsed().as_millis(), "edit pipeline");
        Ok(current)
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}
