//! Heat → pixels through the palette LUT

use crate::palette::{Lut, CYCLE_FADE_IN, LUT_SIZE};
use crate::pixel_buffer::PixelBuffer;

/// Visibility floor for ramp palettes
pub const THRESHOLD: f32 = 0.002;
/// Cycling palettes need a higher floor to avoid banding near zero
pub const THRESHOLD_CYCLING: f32 = 0.015;

const CYCLE_SPAN: u32 = (LUT_SIZE - CYCLE_FADE_IN) as u32;

/// Map an intensity to a LUT index, or `None` if it is below the visibility floor
#[inline]
pub fn lut_index(value: f32, cycling: bool) -> Option<u8> {
    if cycling {
        if value <= THRESHOLD_CYCLING {
            return None;
        }
        // `as` saturates, so unbounded heat stays well defined
        let raw = (value * 255.0).floor() as u32;
        let fade_in = CYCLE_FADE_IN as u32;
        if raw <= fade_in {
            Some(raw as u8)
        } else {
            // >> 2 slows the cycle relative to heat growth
            Some((fade_in + ((raw - fade_in) >> 2) % CYCLE_SPAN) as u8)
        }
    } else {
        if value <= THRESHOLD {
            return None;
        }
        Some(((value * 255.0).floor() as u32).min(255) as u8)
    }
}

/// Write one pixel per grid cell.
///
/// With a glow mask, intensity is `heat * min(1, glow)`. Cells below the
/// visibility floor get the background, and negative heat is reset to zero.
pub fn render_heat(heat: &mut [f32], glow: Option<&[f32]>, lut: &Lut, out: &mut PixelBuffer) {
    let pixels = out.pixels_mut();
    debug_assert_eq!(pixels.len(), heat.len());

    match glow {
        Some(glow) => {
            for ((px, h), &g) in pixels.iter_mut().zip(heat.iter_mut()).zip(glow) {
                let value = *h * g.min(1.0);
                *px = shade(h, value, lut);
            }
        }
        None => {
            for (px, h) in pixels.iter_mut().zip(heat.iter_mut()) {
                let value = *h;
                *px = shade(h, value, lut);
            }
        }
    }
}

#[inline]
fn shade(heat: &mut f32, value: f32, lut: &Lut) -> u32 {
    match lut_index(value, lut.cycling) {
        Some(i) => lut.get(i),
        None => {
            if *heat < 0.0 {
                *heat = 0.0;
            }
            lut.background
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::palette::{build_lut, ColorStop, Rgb};

    const STOPS: &[ColorStop] = &[
        ColorStop {
            pos: 0.0,
            color: Rgb::new(0, 0, 0),
        },
        ColorStop {
            pos: 1.0,
            color: Rgb::new(255, 255, 255),
        },
    ];

    #[test]
    fn test_ramp_index() {
        assert_eq!(lut_index(0.0, false), None);
        assert_eq!(lut_index(0.002, false), None);
        assert_eq!(lut_index(0.5, false), Some(127));
        assert_eq!(lut_index(1.0, false), Some(255));
        assert_eq!(lut_index(7.5, false), Some(255));
    }

    #[test]
    fn test_cycling_index() {
        assert_eq!(lut_index(0.01, true), None);
        assert_eq!(lut_index(0.1, true), Some(25));
        assert_eq!(lut_index(40.0 / 255.0 + 1e-4, true), Some(40));
        // raw = 255 → 40 + (215 >> 2) = 93
        assert_eq!(lut_index(1.0, true), Some(93));
        for v in [3.0f32, 17.2, 400.0, 1e9] {
            let i = lut_index(v, true).unwrap();
            assert!(i as usize >= CYCLE_FADE_IN);
        }
    }

    #[test]
    fn test_render_background_and_clamp() {
        let bg = Rgb::new(5, 6, 7);
        let lut = build_lut(STOPS, false, bg);
        let mut out = PixelBuffer::with_size(3, 1);
        let mut heat = vec![-0.25, 0.001, 1.0];

        render_heat(&mut heat, None, &lut, &mut out);
        assert_eq!(heat[0], 0.0);
        assert_eq!(out.get_rgb(0, 0), Some((5, 6, 7)));
        assert_eq!(out.get_rgb(1, 0), Some((5, 6, 7)));
        assert_eq!(out.get_rgb(2, 0), Some((255, 255, 255)));
    }

    #[test]
    fn test_render_glow_mask() {
        let lut = build_lut(STOPS, false, Rgb::new(0, 0, 0));
        let mut out = PixelBuffer::with_size(3, 1);
        let mut heat = vec![1.0, 1.0, 1.0];
        let glow = [0.0, 0.5, 2.0];

        render_heat(&mut heat, Some(&glow[..]), &lut, &mut out);
        assert_eq!(out.get(0, 0), Some(lut.background));
        assert_eq!(out.get(1, 0), Some(lut.get(127)));
        assert_eq!(out.get(2, 0), Some(lut.get(255)));
        // Masking never touches the heat itself
        assert_eq!(heat, vec![1.0, 1.0, 1.0]);
    }
}
