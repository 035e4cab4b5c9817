//! Brush kernel: precomputed offsets and weights for the brush footprint

/// Fade radius (px) up to which the solid disc stays perfectly flat
const HARD_FADE_PX: f32 = 30.0;
/// How much of the disc edge weight a fully soft brush gives up
const SOFTNESS_DROP: f32 = 0.6;

/// One cell of the brush footprint relative to its center
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KernelEntry {
    pub dx: i32,
    pub dy: i32,
    pub weight: f32,
}

/// Circular weight mask, sorted by distance from the center
#[derive(Debug, Clone, Default)]
pub struct BrushKernel {
    entries: Vec<KernelEntry>,
    /// Solid-disc radius in grid cells
    brush_grid_r: f32,
    /// Outer support radius in grid cells
    extent_grid_r: f32,
    inner_min_weight: f32,
}

impl BrushKernel {
    /// Build the kernel for radii given in screen pixels at the given pixel scale
    pub fn build(brush_radius: f32, fade_radius: f32, scale: u32) -> Self {
        let scale = scale.max(1) as f32;
        let brush_grid_r = brush_radius.max(0.0) / scale;
        let fade_grid_r = fade_radius.max(0.0) / scale;
        let extent = brush_grid_r + fade_grid_r;

        let softness = ((fade_radius - HARD_FADE_PX) / HARD_FADE_PX).max(0.0);
        let inner_min_weight = (1.0 - softness * SOFTNESS_DROP).max(0.0);

        let reach = extent.ceil() as i32;
        let mut weighted = Vec::new();
        for dy in -reach..=reach {
            for dx in -reach..=reach {
                let dist = ((dx * dx + dy * dy) as f32).sqrt();
                if dist > extent {
                    continue;
                }
                let weight = if dist <= brush_grid_r {
                    let t = if brush_grid_r > 0.0 { dist / brush_grid_r } else { 0.0 };
                    1.0 - (1.0 - inner_min_weight) * t * t
                } else {
                    let t = if fade_grid_r > 0.0 {
                        (dist - brush_grid_r) / fade_grid_r
                    } else {
                        1.0
                    };
                    let falloff = 1.0 - t.min(1.0);
                    inner_min_weight * falloff * falloff * falloff
                };
                weighted.push((dist, KernelEntry { dx, dy, weight }));
            }
        }
        weighted.sort_by(|a, b| a.0.total_cmp(&b.0));

        Self {
            entries: weighted.into_iter().map(|(_, e)| e).collect(),
            brush_grid_r,
            extent_grid_r: extent,
            inner_min_weight,
        }
    }

    pub fn entries(&self) -> &[KernelEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Full-weight cells of the solid core
    pub fn core(&self) -> impl Iterator<Item = &KernelEntry> {
        self.entries.iter().filter(|e| e.weight >= 1.0)
    }

    pub fn inner_min_weight(&self) -> f32 {
        self.inner_min_weight
    }

    pub fn brush_grid_radius(&self) -> f32 {
        self.brush_grid_r
    }

    pub fn extent_grid_radius(&self) -> f32 {
        self.extent_grid_r
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dist(e: &KernelEntry) -> f32 {
        ((e.dx * e.dx + e.dy * e.dy) as f32).sqrt()
    }

    #[test]
    fn test_hard_brush_is_flat() {
        let kernel = BrushKernel::build(40.0, 0.0, 2);
        assert_eq!(kernel.inner_min_weight(), 1.0);
        assert!(!kernel.is_empty());
        for e in kernel.entries() {
            assert!(dist(e) <= 20.0);
            assert_eq!(e.weight, 1.0);
        }
        assert_eq!(kernel.core().count(), kernel.len());
    }

    #[test]
    fn test_weights_non_increasing_with_distance() {
        for &(brush, fade, scale) in &[
            (40.0, 0.0, 2),
            (40.0, 20.0, 2),
            (10.0, 60.0, 3),
            (2.0, 45.0, 4),
            (200.0, 60.0, 2),
            (0.0, 30.0, 2),
        ] {
            let kernel = BrushKernel::build(brush, fade, scale);
            let mut last = (0.0f32, 1.0f32);
            for e in kernel.entries() {
                let d = dist(e);
                assert!((0.0..=1.0).contains(&e.weight), "weight {} out of range", e.weight);
                if d > last.0 + 1e-6 {
                    assert!(e.weight <= last.1 + 1e-6, "weight rose at distance {}", d);
                    last = (d, e.weight);
                } else {
                    last.1 = last.1.max(e.weight);
                }
            }
        }
    }

    #[test]
    fn test_soft_brush_gradient() {
        let kernel = BrushKernel::build(20.0, 60.0, 2);
        assert!((kernel.inner_min_weight() - 0.4).abs() < 1e-6);

        let center = kernel.entries()[0];
        assert_eq!((center.dx, center.dy), (0, 0));
        assert_eq!(center.weight, 1.0);
        // Only the center survives as a full-weight core cell
        assert_eq!(kernel.core().count(), 1);

        let outer = kernel.entries().last().unwrap();
        assert!(outer.weight < 0.05);
    }

    #[test]
    fn test_zero_radius_brush() {
        let kernel = BrushKernel::build(0.0, 0.0, 2);
        assert_eq!(kernel.len(), 1);
        assert_eq!(kernel.entries()[0].weight, 1.0);
    }

    #[test]
    fn test_support_radius_covers_bleed() {
        let kernel = BrushKernel::build(10.0, 10.0, 2);
        let max = kernel.entries().iter().map(dist).fold(0.0, f32::max);
        assert!(max <= kernel.extent_grid_radius());
        assert!(max > kernel.brush_grid_radius());
    }
}
