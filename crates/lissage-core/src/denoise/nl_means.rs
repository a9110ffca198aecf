use rayon::prelude::*;

use crate::image_buf::ImageBuf;

/// Filter strength. Larger values average more aggressively.
pub const FILTER_STRENGTH: f32 = 10.0;
/// Half-size of the 7x7 comparison patch.
pub const TEMPLATE_RADIUS: usize = 3;
/// Half-size of the 21x21 search window.
pub const SEARCH_RADIUS: isize = 10;

/// Non-local means denoising.
///
/// Each output pixel is a weighted average of the pixels in its search
/// window, where a candidate's weight is `exp(-d / h^2)` and `d` is the mean
/// squared color difference between the 7x7 patches around the two pixels.
///
/// The search runs one offset at a time over the whole image, so patch
/// distances come from two box-filter passes instead of a full patch
/// comparison per pair. Rows are processed in parallel; each pixel's
/// accumulation order is fixed, so the result does not depend on the
/// thread count.
pub fn nl_means(input: &ImageBuf) -> ImageBuf {
    let (w, h) = (input.width as usize, input.height as usize);
    if w == 0 || h == 0 {
        return input.clone();
    }

    let planes = input.to_planes_f32();
    let n = w * h;
    let inv_h2 = 1.0 / (FILTER_STRENGTH * FILTER_STRENGTH);
    let patch_area = ((2 * TEMPLATE_RADIUS + 1) * (2 * TEMPLATE_RADIUS + 1)) as f32;

    // Per pixel: weighted R, G, B sums and the weight total.
    let mut acc = vec![[0.0_f32; 4]; n];
    let mut dist = vec![0.0_f32; n];
    let mut row_sums = vec![0.0_f32; n];

    for dy in -SEARCH_RADIUS..=SEARCH_RADIUS {
        for dx in -SEARCH_RADIUS..=SEARCH_RADIUS {
            // Squared color distance between each pixel and its shifted partner.
            dist.par_chunks_mut(w).enumerate().for_each(|(y, row)| {
                let sy = clamp_index(y as isize + dy, h);
                for (x, d) in row.iter_mut().enumerate() {
                    let sx = clamp_index(x as isize + dx, w);
                    let (i, j) = (y * w + x, sy * w + sx);
                    let mut sum = 0.0;
                    for plane in &planes {
                        let e = plane[i] - plane[j];
                        sum += e * e;
                    }
                    *d = sum / 3.0;
                }
            });

            // Horizontal box sum over the patch width.
            row_sums
                .par_chunks_mut(w)
                .zip(dist.par_chunks(w))
                .for_each(|(out, row)| {
                    for (x, o) in out.iter_mut().enumerate() {
                        let mut sum = 0.0;
                        for k in -(TEMPLATE_RADIUS as isize)..=TEMPLATE_RADIUS as isize {
                            sum += row[clamp_index(x as isize + k, w)];
                        }
                        *o = sum;
                    }
                });

            // Vertical box sum, then weight and accumulate the shifted pixel.
            acc.par_chunks_mut(w).enumerate().for_each(|(y, out)| {
                let sy = clamp_index(y as isize + dy, h);
                for (x, a) in out.iter_mut().enumerate() {
                    let mut sum = 0.0;
                    for k in -(TEMPLATE_RADIUS as isize)..=TEMPLATE_RADIUS as isize {
                        sum += row_sums[clamp_index(y as isize + k, h) * w + x];
                    }
                    let patch_dist = sum / patch_area;
                    let weight = (-patch_dist * inv_h2).exp();

                    let j = sy * w + clamp_index(x as isize + dx, w);
                    a[0] += weight * planes[0][j];
                    a[1] += weight * planes[1][j];
                    a[2] += weight * planes[2][j];
                    a[3] += weight;
                }
            });
        }
    }

    let mut out = [vec![0.0_f32; n], vec![0.0_f32; n], vec![0.0_f32; n]];
    for (i, a) in acc.iter().enumerate() {
        // The zero offset always contributes weight 1, so a[3] >= 1.
        for c in 0..3 {
            out[c][i] = a[c] / a[3];
        }
    }
    ImageBuf::from_planes_f32(input.width, input.height, &out)
}

/// Replicate-edge index: `i` clamped into `0..len`.
fn clamp_index(i: isize, len: usize) -> usize {
    i.clamp(0, len as isize - 1) as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Deterministic pseudo-random noise in [-amp, amp].
    fn noise(x: u32, y: u32, c: u32, amp: i32) -> i32 {
        let mut v =
            x.wrapping_mul(73_856_093) ^ y.wrapping_mul(19_349_663) ^ c.wrapping_mul(83_492_791);
        v ^= v >> 13;
        v = v.wrapping_mul(0x5bd1_e995);
        v ^= v >> 15;
        (v % (2 * amp as u32 + 1)) as i32 - amp
    }

    fn noisy_flat(value: u8, amp: i32) -> ImageBuf {
        ImageBuf::from_fn(24, 24, |x, y| {
            std::array::from_fn(|c| {
                (i32::from(value) + noise(x, y, c as u32, amp)).clamp(0, 255) as u8
            })
        })
    }

    fn mean_abs_error(buf: &ImageBuf, value: u8) -> f64 {
        let total: f64 = buf
            .data
            .iter()
            .map(|&v| (f64::from(v) - f64::from(value)).abs())
            .sum();
        total / buf.data.len() as f64
    }

    #[test]
    fn uniform_image_unchanged() {
        let img = ImageBuf::from_fn(16, 12, |_, _| [30, 60, 90]);
        assert_eq!(nl_means(&img), img);
    }

    #[test]
    fn preserves_dimensions() {
        let img = noisy_flat(128, 10);
        let out = nl_means(&img);
        assert_eq!((out.width, out.height), (24, 24));
    }

    #[test]
    fn reduces_noise_on_flat_region() {
        let img = noisy_flat(128, 12);
        let before = mean_abs_error(&img, 128);
        let after = mean_abs_error(&nl_means(&img), 128);
        assert!(
            after < before * 0.7,
            "expected noise to drop, before={before:.2} after={after:.2}"
        );
    }

    #[test]
    fn keeps_strong_edge() {
        let img = ImageBuf::from_fn(24, 24, |x, _| {
            if x < 12 { [20, 20, 20] } else { [230, 230, 230] }
        });
        let out = nl_means(&img);
        // Patches straddling the edge only match each other, so the step
        // survives almost unchanged.
        assert!(out.pixel(5, 10)[0] < 30);
        assert!(out.pixel(18, 10)[0] > 220);
    }

    #[test]
    fn is_deterministic() {
        let img = noisy_flat(90, 15);
        assert_eq!(nl_means(&img), nl_means(&img));
    }

    #[test]
    fn tiny_images() {
        let one = ImageBuf::from_fn(1, 1, |_, _| [1, 2, 3]);
        assert_eq!(nl_means(&one), one);
        let empty = ImageBuf::new(0, 5);
        assert_eq!(nl_means(&empty), empty);
    }
}
