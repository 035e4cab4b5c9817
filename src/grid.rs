//! Heat grid: the simulation state buffers and the per-frame operations on them
//!
//! Cells are stored row-major at the downscaled grid resolution. The glow
//! mask is optional and only exists while glow is spatially limited.

use crate::kernel::BrushKernel;

/// Blend toward the neighbor average per diffusion pass
pub const DIFFUSION_FACTOR: f32 = 0.5;
/// Values below this snap to zero during decay so fades actually finish
pub const HEAT_EPSILON: f32 = 1e-6;
/// Fraction of the glow radius that is fully visible
const GLOW_CORE: f32 = 0.7;

pub struct HeatGrid {
    width: usize,
    height: usize,
    heat: Vec<f32>,
    scratch: Vec<f32>,
    glow: Option<Vec<f32>>,
}

impl HeatGrid {
    pub fn new(width: usize, height: usize) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        let cells = width * height;
        Self {
            width,
            height,
            heat: vec![0.0; cells],
            scratch: vec![0.0; cells],
            glow: None,
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height {
            Some(y as usize * self.width + x as usize)
        } else {
            None
        }
    }

    pub fn heat(&self) -> &[f32] {
        &self.heat
    }

    pub fn heat_mut(&mut self) -> &mut [f32] {
        &mut self.heat
    }

    pub fn glow(&self) -> Option<&[f32]> {
        self.glow.as_deref()
    }

    /// Heat and glow together, for the render pass
    pub fn buffers_mut(&mut self) -> (&mut [f32], Option<&[f32]>) {
        (self.heat.as_mut_slice(), self.glow.as_deref())
    }

    pub fn get(&self, x: i32, y: i32) -> Option<f32> {
        self.index(x, y).map(|i| self.heat[i])
    }

    pub fn set(&mut self, x: i32, y: i32, value: f32) {
        if let Some(i) = self.index(x, y) {
            self.heat[i] = value;
        }
    }

    pub fn glow_at(&self, x: i32, y: i32) -> Option<f32> {
        let i = self.index(x, y)?;
        self.glow.as_ref().map(|g| g[i])
    }

    /// Allocate or drop the glow mask. A fresh mask starts fully hidden.
    pub fn set_glow_enabled(&mut self, enabled: bool) {
        match (enabled, self.glow.is_some()) {
            (true, false) => self.glow = Some(vec![0.0; self.width * self.height]),
            (false, true) => self.glow = None,
            _ => {}
        }
    }

    pub fn has_glow(&self) -> bool {
        self.glow.is_some()
    }

    /// Zero heat and glow in place
    pub fn clear(&mut self) {
        self.heat.fill(0.0);
        self.scratch.fill(0.0);
        if let Some(glow) = self.glow.as_mut() {
            glow.fill(0.0);
        }
    }

    /// Reallocate for new dimensions, keeping the overlapping region
    pub fn resize(&mut self, width: usize, height: usize) {
        let width = width.max(1);
        let height = height.max(1);
        if width == self.width && height == self.height {
            return;
        }

        let (old_w, old_h) = (self.width, self.height);
        let copy = |src: &[f32]| {
            let mut dst = vec![0.0; width * height];
            let cols = old_w.min(width);
            for y in 0..old_h.min(height) {
                dst[y * width..y * width + cols].copy_from_slice(&src[y * old_w..y * old_w + cols]);
            }
            dst
        };

        self.heat = copy(&self.heat);
        self.glow = self.glow.as_deref().map(copy);
        self.scratch = vec![0.0; width * height];
        self.width = width;
        self.height = height;
    }

    /// Average heat under the kernel's full-weight core centered at (cx, cy)
    pub fn sample_core(&self, cx: i32, cy: i32, kernel: &BrushKernel) -> f32 {
        let mut sum = 0.0;
        let mut count = 0u32;
        for e in kernel.core() {
            if let Some(i) = self.index(cx + e.dx, cy + e.dy) {
                sum += self.heat[i];
                count += 1;
            }
        }
        if count > 0 {
            sum / count as f32
        } else {
            0.0
        }
    }

    /// Run `passes` rounds of 4-neighbor smoothing with clamped edges
    pub fn diffuse(&mut self, passes: u32) {
        let w = self.width;
        let h = self.height;

        for _ in 0..passes {
            let src = &self.heat;
            let dst = &mut self.scratch;
            for y in 0..h {
                let row = y * w;
                let up = if y > 0 { row - w } else { row };
                let down = if y + 1 < h { row + w } else { row };
                for x in 0..w {
                    let left = if x > 0 { x - 1 } else { x };
                    let right = if x + 1 < w { x + 1 } else { x };
                    let c = src[row + x];
                    let avg =
                        (src[row + left] + src[row + right] + src[up + x] + src[down + x]) * 0.25;
                    dst[row + x] = c + (avg - c) * DIFFUSION_FACTOR;
                }
            }
            // Ping-pong: `heat` always holds the latest pass
            std::mem::swap(&mut self.heat, &mut self.scratch);
        }
    }

    /// Multiply heat (and glow, if present) by `factor`
    pub fn decay(&mut self, factor: f32) {
        decay_slice(&mut self.heat, factor);
        if let Some(glow) = self.glow.as_mut() {
            decay_slice(glow, factor);
        }
    }

    /// Max-blend `value * weight` for every kernel cell around (cx, cy)
    pub fn paint(&mut self, cx: i32, cy: i32, kernel: &BrushKernel, value: f32) {
        for e in kernel.entries() {
            if let Some(i) = self.index(cx + e.dx, cy + e.dy) {
                let v = value * e.weight;
                if v > self.heat[i] {
                    self.heat[i] = v;
                }
            }
        }
    }

    /// Mark glow visibility within `radius` cells of (cx, cy).
    ///
    /// Fully visible inside 70% of the radius, cubic fade to zero at the edge.
    /// No-op without a glow mask.
    pub fn paint_glow(&mut self, cx: i32, cy: i32, radius: f32) {
        let Some(glow) = self.glow.as_mut() else {
            return;
        };
        let radius = radius.max(0.0);
        let core = radius * GLOW_CORE;
        let fade = radius - core;
        let reach = radius.ceil() as i32;
        let (w, h) = (self.width as i32, self.height as i32);

        for y in (cy - reach).max(0)..=(cy + reach).min(h - 1) {
            for x in (cx - reach).max(0)..=(cx + reach).min(w - 1) {
                let dx = (x - cx) as f32;
                let dy = (y - cy) as f32;
                let dist = (dx * dx + dy * dy).sqrt();
                if dist > radius {
                    continue;
                }
                let v = if dist <= core {
                    1.0
                } else {
                    let t = if fade > 0.0 { (dist - core) / fade } else { 1.0 };
                    let f = 1.0 - t.min(1.0);
                    f * f * f
                };
                let i = y as usize * self.width + x as usize;
                if v > glow[i] {
                    glow[i] = v;
                }
            }
        }
    }

    /// Number of cells holding any heat
    pub fn active_cells(&self) -> usize {
        self.heat.iter().filter(|&&v| v > 0.0).count()
    }
}

fn decay_slice(cells: &mut [f32], factor: f32) {
    for v in cells.iter_mut() {
        *v *= factor;
        if *v < HEAT_EPSILON {
            *v = 0.0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_pass_diffusion() {
        let mut grid = HeatGrid::new(9, 9);
        grid.set(4, 4, 1.0);
        grid.diffuse(1);

        assert!((grid.get(4, 4).unwrap() - 0.5).abs() < 1e-6);
        for (x, y) in [(3, 4), (5, 4), (4, 3), (4, 5)] {
            assert!((grid.get(x, y).unwrap() - 0.125).abs() < 1e-6);
        }
        assert_eq!(grid.get(3, 3), Some(0.0));
    }

    #[test]
    fn test_diffusion_edges_clamp() {
        let mut grid = HeatGrid::new(4, 4);
        grid.heat_mut().fill(0.7);
        grid.diffuse(3);
        for &v in grid.heat() {
            assert!((v - 0.7).abs() < 1e-6);
        }
    }

    #[test]
    fn test_odd_pass_count_lands_in_heat() {
        let mut a = HeatGrid::new(8, 8);
        a.set(2, 2, 1.0);
        a.diffuse(3);

        let mut b = HeatGrid::new(8, 8);
        b.set(2, 2, 1.0);
        b.diffuse(1);
        b.diffuse(1);
        b.diffuse(1);

        assert_eq!(a.heat(), b.heat());
    }

    #[test]
    fn test_decay_converges_to_zero() {
        let mut grid = HeatGrid::new(2, 2);
        grid.heat_mut().fill(1.0);
        let mut last = 1.0;
        for _ in 0..100_000 {
            grid.decay(0.99);
            let v = grid.get(0, 0).unwrap();
            assert!(v >= 0.0);
            assert!(v <= last);
            last = v;
        }
        assert_eq!(last, 0.0);
    }

    #[test]
    fn test_paint_max_blend() {
        let kernel = BrushKernel::build(0.0, 0.0, 1);
        let mut grid = HeatGrid::new(5, 5);

        grid.set(2, 2, 0.6);
        grid.paint(2, 2, &kernel, 0.3);
        assert_eq!(grid.get(2, 2), Some(0.6));

        grid.paint(2, 2, &kernel, 0.9);
        assert_eq!(grid.get(2, 2), Some(0.9));
    }

    #[test]
    fn test_paint_clips_at_edges() {
        let kernel = BrushKernel::build(6.0, 0.0, 2);
        let mut grid = HeatGrid::new(5, 5);
        grid.paint(0, 0, &kernel, 1.0);
        assert_eq!(grid.get(0, 0), Some(1.0));
        assert_eq!(grid.get(4, 4), Some(0.0));
    }

    #[test]
    fn test_resize_preserves_overlap() {
        let mut grid = HeatGrid::new(6, 4);
        grid.set_glow_enabled(true);
        for y in 0..4 {
            for x in 0..6 {
                grid.set(x, y, (y * 6 + x + 1) as f32);
            }
        }
        grid.paint_glow(1, 1, 1.0);

        grid.resize(4, 7);
        assert_eq!((grid.width(), grid.height()), (4, 7));
        assert_eq!(grid.heat().len(), 28);
        for y in 0..7 {
            for x in 0..4 {
                let v = grid.get(x, y).unwrap();
                if y < 4 {
                    assert_eq!(v, (y * 6 + x + 1) as f32);
                } else {
                    assert_eq!(v, 0.0);
                }
            }
        }
        assert_eq!(grid.glow().map(<[f32]>::len), Some(28));
        assert_eq!(grid.glow_at(1, 1), Some(1.0));
        assert_eq!(grid.glow_at(3, 6), Some(0.0));
    }

    #[test]
    fn test_glow_mask_shape() {
        let mut grid = HeatGrid::new(40, 40);
        grid.paint_glow(20, 20, 10.0);
        assert!(grid.glow().is_none());

        grid.set_glow_enabled(true);
        grid.paint_glow(20, 20, 10.0);
        assert_eq!(grid.glow_at(20, 20), Some(1.0));
        assert_eq!(grid.glow_at(26, 20), Some(1.0));
        let fading = grid.glow_at(29, 20).unwrap();
        assert!(fading > 0.0 && fading < 1.0);
        assert_eq!(grid.glow_at(31, 20), Some(0.0));
    }

    #[test]
    fn test_decay_scales_glow_with_heat() {
        let mut grid = HeatGrid::new(11, 11);
        grid.set_glow_enabled(true);
        grid.paint_glow(5, 5, 3.0);
        grid.set(5, 5, 0.8);
        let before = grid.glow().unwrap().to_vec();

        grid.decay(0.5);
        assert_eq!(grid.glow_at(5, 5), Some(0.5));
        assert_eq!(grid.get(5, 5), Some(0.4));
        for (&old, &new) in before.iter().zip(grid.glow().unwrap()) {
            let expected = if old * 0.5 < HEAT_EPSILON { 0.0 } else { old * 0.5 };
            assert_eq!(new, expected);
        }
    }

    #[test]
    fn test_sample_core_average() {
        let kernel = BrushKernel::build(2.0, 0.0, 1);
        let mut grid = HeatGrid::new(10, 10);
        grid.set(5, 5, 1.0);
        let n = kernel.core().count() as f32;
        assert!((grid.sample_core(5, 5, &kernel) - 1.0 / n).abs() < 1e-6);
        assert_eq!(grid.sample_core(100, 100, &kernel), 0.0);
    }
}
