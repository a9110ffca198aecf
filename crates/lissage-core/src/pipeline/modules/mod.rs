mod brightness_contrast;
mod hue_saturation;

pub use brightness_contrast::BrightnessContrast;
pub use hue_saturation::HueSaturation;
