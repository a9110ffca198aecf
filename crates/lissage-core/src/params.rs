//! Denoise and edit parameters, and their validation.
//!
//! Validation never coerces: a value outside its domain is rejected with
//! a [`ValidationError`] naming the field, and no pixel work is attempted.

use std::fmt;
use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::analysis::ColorBaseline;

pub const BRIGHTNESS_RANGE: RangeInclusive<i32> = 0..=200;
pub const CONTRAST_RANGE: RangeInclusive<i32> = 0..=200;
/// Half-turn hue encoding: 2 degrees per step.
pub const HUE_RANGE: RangeInclusive<i32> = 0..=179;
pub const SATURATION_RANGE: RangeInclusive<i32> = 0..=255;

/// Brightness and contrast value that leaves the image unchanged.
pub const NEUTRAL_LEVEL: i32 = 100;

pub const MIN_MEDIAN_APERTURE: i32 = 3;
/// Largest accepted Gaussian kernel side and median aperture.
pub const MAX_KERNEL_SIZE: i32 = 255;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProcessType {
    GaussianBlur,
    MedianBlur,
    NonLocalMeans,
}

impl ProcessType {
    pub fn name(self) -> &'static str {
        match self {
            ProcessType::GaussianBlur => "gaussian_blur",
            ProcessType::MedianBlur => "median_blur",
            ProcessType::NonLocalMeans => "non_local_means",
        }
    }
}

impl fmt::Display for ProcessType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Parameters for one denoise run, keyed by algorithm.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DenoiseParams {
    GaussianBlur {
        sigma: f32,
        kernel_width: i32,
        kernel_height: i32,
    },
    MedianBlur {
        aperture: i32,
    },
    NonLocalMeans,
}

impl DenoiseParams {
    pub fn process_type(&self) -> ProcessType {
        match self {
            DenoiseParams::GaussianBlur { .. } => ProcessType::GaussianBlur,
            DenoiseParams::MedianBlur { .. } => ProcessType::MedianBlur,
            DenoiseParams::NonLocalMeans => ProcessType::NonLocalMeans,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        match *self {
            DenoiseParams::GaussianBlur {
                sigma,
                kernel_width,
                kernel_height,
            } => {
                if !(sigma.is_finite() && sigma > 0.0) {
                    return Err(ValidationError::Sigma(sigma));
                }
                check_odd_positive("kernel_width", kernel_width)?;
                check_odd_positive("kernel_height", kernel_height)
            }
            DenoiseParams::MedianBlur { aperture } => {
                if !(MIN_MEDIAN_APERTURE..=MAX_KERNEL_SIZE).contains(&aperture) || !is_odd(aperture)
                {
                    return Err(ValidationError::Aperture(aperture));
                }
                Ok(())
            }
            DenoiseParams::NonLocalMeans => Ok(()),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }
}

/// Tonal and color adjustments, applied to the pristine source as a set.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EditParams {
    /// 0..=200, 100 is neutral.
    pub brightness: i32,
    /// 0..=200, 100 is neutral.
    pub contrast: i32,
    /// 0..=179 hue steps; the source's baseline hue is neutral.
    pub hue: i32,
    /// 0..=255; the source's baseline saturation is neutral.
    pub saturation: i32,
}

impl EditParams {
    /// The edit that reproduces a source with the given baseline.
    pub fn identity(baseline: ColorBaseline) -> Self {
        Self {
            brightness: NEUTRAL_LEVEL,
            contrast: NEUTRAL_LEVEL,
            hue: i32::from(baseline.hue),
            saturation: i32::from(baseline.saturation),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        check_range("brightness", self.brightness, BRIGHTNESS_RANGE)?;
        check_range("contrast", self.contrast, CONTRAST_RANGE)?;
        check_range("hue", self.hue, HUE_RANGE)?;
        check_range("saturation", self.saturation, SATURATION_RANGE)
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("sigma must be a positive finite number, got {0}")]
    Sigma(f32),
    #[error("{field} must be an odd integer in 1..=255, got {value}")]
    KernelSize { field: &'static str, value: i32 },
    #[error("aperture must be an odd integer in 3..=255, got {0}")]
    Aperture(i32),
    #[error("{field} must be within {min}..={max}, got {value}")]
    OutOfRange {
        field: &'static str,
        value: i32,
        min: i32,
        max: i32,
    },
}

fn is_odd(n: i32) -> bool {
    n % 2 != 0
}

fn check_odd_positive(field: &'static str, value: i32) -> Result<(), ValidationError> {
    if (1..=MAX_KERNEL_SIZE).contains(&value) && is_odd(value) {
        Ok(())
    } else {
        Err(ValidationError::KernelSize { field, value })
    }
}

fn check_range(
    field: &'static str,
    value: i32,
    range: RangeInclusive<i32>,
) -> Result<(), ValidationError> {
    if range.contains(&value) {
        Ok(())
    } else {
        Err(ValidationError::OutOfRange {
            field,
            value,
            min: *range.start(),
            max: *range.end(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gaussian(sigma: f32, kernel_width: i32, kernel_height: i32) -> DenoiseParams {
        DenoiseParams::GaussianBlur {
            sigma,
            kernel_width,
            kernel_height,
        }
    }

    fn edit(brightness: i32, contrast: i32, hue: i32, saturation: i32) -> EditParams {
        EditParams {
            brightness,
            contrast,
            hue,
            saturation,
        }
    }

    #[test]
    fn gaussian_accepts_positive_sigma_and_odd_kernels() {
        assert!(gaussian(5.0, 5, 5).is_valid());
        assert!(gaussian(0.1, 1, 1).is_valid());
        assert!(gaussian(2.0, 3, 31).is_valid());
    }

    #[test]
    fn gaussian_rejects_even_kernel() {
        assert_eq!(
            gaussian(1.0, 4, 5).validate(),
            Err(ValidationError::KernelSize {
                field: "kernel_width",
                value: 4
            })
        );
        assert!(!gaussian(1.0, 5, 4).is_valid());
    }

    #[test]
    fn gaussian_rejects_negative_kernel() {
        assert_eq!(
            gaussian(1.0, 5, -3).validate(),
            Err(ValidationError::KernelSize {
                field: "kernel_height",
                value: -3
            })
        );
        assert!(!gaussian(1.0, 0, 3).is_valid());
    }

    #[test]
    fn oversized_windows_are_rejected() {
        assert!(gaussian(1.0, MAX_KERNEL_SIZE, MAX_KERNEL_SIZE).is_valid());
        assert_eq!(
            gaussian(1.0, 257, 3).validate(),
            Err(ValidationError::KernelSize {
                field: "kernel_width",
                value: 257
            })
        );
        assert!(!gaussian(1.0, 3, i32::MAX).is_valid());

        assert!(DenoiseParams::MedianBlur { aperture: MAX_KERNEL_SIZE }.is_valid());
        assert_eq!(
            DenoiseParams::MedianBlur { aperture: 257 }.validate(),
            Err(ValidationError::Aperture(257))
        );
        assert!(!DenoiseParams::MedianBlur { aperture: i32::MAX }.is_valid());
    }

    #[test]
    fn gaussian_rejects_non_positive_sigma() {
        assert_eq!(gaussian(0.0, 3, 3).validate(), Err(ValidationError::Sigma(0.0)));
        assert!(!gaussian(-1.0, 3, 3).is_valid());
        assert!(!gaussian(f32::NAN, 3, 3).is_valid());
        assert!(!gaussian(f32::INFINITY, 3, 3).is_valid());
    }

    #[test]
    fn median_accepts_iff_odd_and_at_least_three() {
        for aperture in -4..=15 {
            let expected = aperture >= 3 && aperture % 2 == 1;
            assert_eq!(
                DenoiseParams::MedianBlur { aperture }.is_valid(),
                expected,
                "aperture {aperture}"
            );
        }
        assert_eq!(
            DenoiseParams::MedianBlur { aperture: 1 }.validate(),
            Err(ValidationError::Aperture(1))
        );
        assert_eq!(
            DenoiseParams::MedianBlur { aperture: 2 }.validate(),
            Err(ValidationError::Aperture(2))
        );
    }

    #[test]
    fn non_local_means_always_valid() {
        assert!(DenoiseParams::NonLocalMeans.is_valid());
    }

    #[test]
    fn process_type_matches_variant() {
        assert_eq!(gaussian(1.0, 3, 3).process_type(), ProcessType::GaussianBlur);
        assert_eq!(
            DenoiseParams::MedianBlur { aperture: 3 }.process_type(),
            ProcessType::MedianBlur
        );
        assert_eq!(
            DenoiseParams::NonLocalMeans.process_type(),
            ProcessType::NonLocalMeans
        );
        assert_eq!(ProcessType::MedianBlur.to_string(), "median_blur");
    }

    #[test]
    fn edit_bounds_are_inclusive() {
        assert!(edit(0, 0, 0, 0).is_valid());
        assert!(edit(200, 200, 179, 255).is_valid());
        assert!(edit(100, 100, 90, 128).is_valid());
    }

    #[test]
    fn edit_rejects_out_of_range_without_clamping() {
        assert_eq!(
            edit(201, 100, 0, 0).validate(),
            Err(ValidationError::OutOfRange {
                field: "brightness",
                value: 201,
                min: 0,
                max: 200
            })
        );
        assert!(!edit(100, -1, 0, 0).is_valid());
        assert!(!edit(100, 100, 180, 0).is_valid());
        assert!(!edit(100, 100, 0, 256).is_valid());
        assert!(!edit(100, 100, -1, 0).is_valid());
    }

    #[test]
    fn identity_uses_neutral_levels_and_baseline() {
        let params = EditParams::identity(ColorBaseline {
            hue: 42,
            saturation: 77,
        });
        assert_eq!(params, edit(100, 100, 42, 77));
        assert!(params.is_valid());
    }

    #[test]
    fn denoise_params_serialization_is_tagged() {
        let params = gaussian(2.5, 3, 5);
        let json = serde_json::to_string(&params).unwrap();
        assert!(json.contains("\"type\":\"gaussian_blur\""), "{json}");
        let back: DenoiseParams = serde_json::from_str(&json).unwrap();
        assert_eq!(back, params);

        let nlm: DenoiseParams = serde_json::from_str(r#"{"type":"non_local_means"}"#).unwrap();
        assert_eq!(nlm, DenoiseParams::NonLocalMeans);
    }
}
