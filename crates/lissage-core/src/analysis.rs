use std::f64::consts::TAU;

use serde::{Deserialize, Serialize};

use crate::color::{HUE_STEPS, rgb_to_hsv};
use crate::image_buf::ImageBuf;

/// Intrinsic hue and saturation of a source image.
///
/// These are the neutral points of the hue and saturation edit controls:
/// editing with `hue == baseline.hue` and `saturation == baseline.saturation`
/// leaves colors untouched.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColorBaseline {
    /// 0..=179 hue steps.
    pub hue: u8,
    /// 0..=255.
    pub saturation: u8,
}

/// Measure the dominant hue and average saturation of an image.
///
/// Hue is a circular mean weighted by each pixel's saturation, so gray
/// pixels do not drag it toward red. Saturation is the plain mean.
/// Achromatic or empty images report hue 0.
pub fn color_baseline(buf: &ImageBuf) -> ColorBaseline {
    let pixel_count = buf.pixel_count();
    if pixel_count == 0 {
        return ColorBaseline::default();
    }

    let mut sum_sin = 0.0_f64;
    let mut sum_cos = 0.0_f64;
    let mut sum_sat = 0.0_f64;

    for pixel in buf.pixels() {
        let (h, s, _) = rgb_to_hsv(pixel[0], pixel[1], pixel[2]);
        let angle = f64::from(h) / f64::from(HUE_STEPS) * TAU;
        let weight = f64::from(s);
        sum_sin += weight * angle.sin();
        sum_cos += weight * angle.cos();
        sum_sat += weight;
    }

    let saturation = (sum_sat / pixel_count as f64).round().clamp(0.0, 255.0) as u8;

    // Opposing hues can cancel out; treat a vanishing resultant as achromatic.
    let resultant = sum_sin.hypot(sum_cos);
    let hue = if resultant <= 1e-6 * sum_sat.max(1.0) {
        0
    } else {
        let steps = sum_sin.atan2(sum_cos).rem_euclid(TAU) / TAU * f64::from(HUE_STEPS);
        (steps.round() as u32 % HUE_STEPS as u32) as u8
    };

    ColorBaseline { hue, saturation }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(rgb: [u8; 3]) -> ImageBuf {
        ImageBuf::from_fn(4, 4, |_, _| rgb)
    }

    #[test]
    fn empty_image_has_default_baseline() {
        let buf = ImageBuf::new(0, 0);
        assert_eq!(color_baseline(&buf), ColorBaseline::default());
    }

    #[test]
    fn gray_image_is_achromatic() {
        let baseline = color_baseline(&solid([120, 120, 120]));
        assert_eq!(baseline, ColorBaseline { hue: 0, saturation: 0 });
    }

    #[test]
    fn solid_colors_report_their_hue() {
        assert_eq!(color_baseline(&solid([0, 255, 0])).hue, 60);
        assert_eq!(color_baseline(&solid([0, 0, 255])).hue, 120);
        assert_eq!(color_baseline(&solid([255, 0, 255])).hue, 150);
    }

    #[test]
    fn solid_color_reports_its_saturation() {
        let baseline = color_baseline(&solid([200, 100, 100]));
        // s = (200 - 100) / 200 * 255
        assert_eq!(baseline.saturation, 128);
    }

    #[test]
    fn hue_mean_wraps_around_red() {
        // Half the pixels just below a full turn, half just above zero.
        let buf = ImageBuf::from_fn(4, 2, |x, _| {
            if x < 2 { [255, 0, 12] } else { [255, 12, 0] }
        });
        let hue = color_baseline(&buf).hue;
        assert!(hue <= 1 || hue >= 179, "expected hue near red, got {hue}");
    }

    #[test]
    fn gray_pixels_do_not_pull_hue() {
        let buf = ImageBuf::from_fn(4, 4, |x, _| {
            if x == 0 { [0, 0, 255] } else { [80, 80, 80] }
        });
        let baseline = color_baseline(&buf);
        assert_eq!(baseline.hue, 120);
        assert!(baseline.saturation > 0);
        assert!(baseline.saturation < 255);
    }

    #[test]
    fn opposite_hues_cancel_to_zero() {
        let buf = ImageBuf::from_fn(2, 1, |x, _| {
            if x == 0 { [255, 0, 0] } else { [0, 255, 255] }
        });
        let baseline = color_baseline(&buf);
        assert_eq!(baseline.hue, 0);
        assert_eq!(baseline.saturation, 255);
    }
}
