//! HSV conversions in the 8-bit "half-turn" encoding.
//!
//! Hue is stored in [0, 180) so a full turn fits a byte (2 degrees per
//! step). Saturation and value are in [0, 255].

/// Number of hue steps in a full turn.
pub const HUE_STEPS: f32 = 180.0;

/// Maximum saturation / value.
pub const CHANNEL_MAX: f32 = 255.0;

/// Convert 8-bit RGB to HSV with `h` in [0, 180), `s` and `v` in [0, 255].
///
/// Achromatic pixels (r == g == b) get hue 0 and saturation 0.
pub fn rgb_to_hsv(r: u8, g: u8, b: u8) -> (f32, f32, f32) {
    let rf = f32::from(r);
    let gf = f32::from(g);
    let bf = f32::from(b);

    let max = rf.max(gf).max(bf);
    let min = rf.min(gf).min(bf);
    let delta = max - min;

    let v = max;
    let s = if max > 0.0 {
        delta / max * CHANNEL_MAX
    } else {
        0.0
    };

    if delta == 0.0 {
        return (0.0, s, v);
    }

    // Sector-relative hue in sixths of a turn.
    let sixths = if max == rf {
        ((gf - bf) / delta).rem_euclid(6.0)
    } else if max == gf {
        (bf - rf) / delta + 2.0
    } else {
        (rf - gf) / delta + 4.0
    };

    let h = (sixths * HUE_STEPS / 6.0).rem_euclid(HUE_STEPS);
    (h, s, v)
}

/// Convert HSV (`h` in hue steps, wrapped; `s`, `v` clamped to [0, 255])
/// back to 8-bit RGB, rounding to nearest.
pub fn hsv_to_rgb(h: f32, s: f32, v: f32) -> [u8; 3] {
    let h = h.rem_euclid(HUE_STEPS);
    let s = s.clamp(0.0, CHANNEL_MAX) / CHANNEL_MAX;
    let v = v.clamp(0.0, CHANNEL_MAX);

    let c = v * s;
    let sixths = h * 6.0 / HUE_STEPS;
    let x = c * (1.0 - (sixths % 2.0 - 1.0).abs());
    let m = v - c;

    let (r, g, b) = match sixths as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };

    [to_u8(r + m), to_u8(g + m), to_u8(b + m)]
}

fn to_u8(v: f32) -> u8 {
    v.round().clamp(0.0, CHANNEL_MAX) as u8
}
