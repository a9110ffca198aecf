use anyhow::Result;

use crate::analysis::ColorBaseline;
use crate::image_buf::ImageBuf;
use crate::params::EditParams;

/// A single step in the edit pipeline.
pub trait ProcessingModule: Send + Sync {
    fn name(&self) -> &str;
    fn process_cpu(
        &self,
        input: ImageBuf,
        params: &EditParams,
        baseline: ColorBaseline,
    ) -> Result<ImageBuf>;
}
