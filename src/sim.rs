//! Frame loop controller
//!
//! One `tick` per display refresh: drain the inbox, then
//! sample → diffuse → decay → paint → render.
//! All rate constants are expressed per target frame (1/60 s) and scaled by
//! the elapsed frame units handed to `tick`.

use crate::config::Config;
use crate::grid::HeatGrid;
use crate::input::{FrameInputs, Inbox, Pointer};
use crate::kernel::BrushKernel;
use crate::palette::{Lut, Palette, Rgb};
use crate::pixel_buffer::PixelBuffer;
use crate::render::render_heat;
use crate::util::{MAX_FRAME_DT, TARGET_FPS};

/// Heat half-life in target frames (30 s)
pub const HALF_LIFE_FRAMES: f32 = 30.0 * TARGET_FPS;
/// Base heat gained per frame while the brush is held (full in 15 s)
const ACCUM_PER_FRAME: f32 = 1.0 / (15.0 * TARGET_FPS);

/// Host device class; decides grid resolution and diffusion budget
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeviceProfile {
    #[default]
    Desktop,
    Touch,
}

impl DeviceProfile {
    /// Screen pixels per grid cell
    pub fn pixel_scale(self, viewport_w: u32, viewport_h: u32) -> u32 {
        match self {
            DeviceProfile::Desktop => 2,
            DeviceProfile::Touch if viewport_w.min(viewport_h) < 480 => 4,
            DeviceProfile::Touch => 3,
        }
    }

    /// Diffusion passes per frame at burn speed 1/3
    pub fn base_iterations(self) -> f32 {
        match self {
            DeviceProfile::Desktop => 6.0,
            DeviceProfile::Touch => 4.0,
        }
    }
}

/// What the brush is doing this frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Mode {
    /// Brush held at this grid cell
    Painting { cx: i32, cy: i32 },
    Idle,
}

impl Mode {
    /// Idle frames fade twice as fast
    pub fn decay_factor(self, base: f32) -> f32 {
        match self {
            Mode::Painting { .. } => base,
            Mode::Idle => base * base,
        }
    }
}

/// Multiplicative heat decay for `dt` frames at full brush activity
pub fn decay_factor(cycling: bool, dt: f32) -> f32 {
    let half_life = if cycling {
        HALF_LIFE_FRAMES * 0.5
    } else {
        HALF_LIFE_FRAMES
    };
    0.5f32.powf(dt / half_life)
}

/// Heat added on top of the sampled core each painting frame
pub fn accumulation(burn_speed: f32, dt: f32) -> f32 {
    ACCUM_PER_FRAME * (0.5 + burn_speed * 2.0) * dt
}

/// Fractional diffusion passes earned this frame
pub fn diffusion_rate(base_iterations: f32, burn_speed: f32, dt: f32) -> f32 {
    base_iterations * (0.5 + burn_speed * 1.5) * dt
}

/// Summary of the last tick, for stats output
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameStats {
    pub mode: Mode,
    pub passes: u32,
    pub paint_value: f32,
}

impl Default for FrameStats {
    fn default() -> Self {
        Self {
            mode: Mode::Idle,
            passes: 0,
            paint_value: 0.0,
        }
    }
}

pub struct Simulation {
    config: Config,
    palette: &'static Palette,
    lut: Lut,
    kernel: BrushKernel,
    grid: HeatGrid,
    frame: PixelBuffer,
    profile: DeviceProfile,
    viewport: (u32, u32),
    scale: u32,
    /// Fractional diffusion passes carried to the next frame
    iter_accum: f32,
    inbox: Inbox,
    running: bool,
    last: FrameStats,
}

impl Simulation {
    /// Start unless the user asked for reduced motion, in which case nothing is allocated
    pub fn start(
        config: Config,
        viewport: (u32, u32),
        profile: DeviceProfile,
        reduced_motion: bool,
    ) -> Option<Self> {
        if reduced_motion {
            log::info!("Reduced motion requested, heat simulation disabled");
            return None;
        }
        Some(Self::new(config, viewport, profile))
    }

    pub fn new(config: Config, viewport: (u32, u32), profile: DeviceProfile) -> Self {
        let config = config.clamped();
        let palette = config.palette();
        let scale = profile.pixel_scale(viewport.0, viewport.1);
        let (gw, gh) = grid_size(viewport, scale);

        let mut grid = HeatGrid::new(gw, gh);
        grid.set_glow_enabled(config.glow.is_limited());

        log::info!(
            "Heat grid {}x{} (scale {}, {:?}), palette '{}'",
            grid.width(),
            grid.height(),
            scale,
            profile,
            palette.key
        );

        Self {
            kernel: BrushKernel::build(config.brush_radius, config.fade_radius, scale),
            lut: Lut::from_palette(palette),
            frame: PixelBuffer::with_size(grid.width() as u32, grid.height() as u32),
            grid,
            palette,
            config,
            profile,
            viewport,
            scale,
            iter_accum: 0.0,
            inbox: Inbox::new(),
            running: true,
            last: FrameStats::default(),
        }
    }

    pub fn inbox(&self) -> &Inbox {
        &self.inbox
    }

    pub fn inbox_mut(&mut self) -> &mut Inbox {
        &mut self.inbox
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn palette(&self) -> &'static Palette {
        self.palette
    }

    pub fn lut(&self) -> &Lut {
        &self.lut
    }

    /// Color the surrounding view should use
    pub fn background(&self) -> Rgb {
        self.palette.background
    }

    pub fn grid(&self) -> &HeatGrid {
        &self.grid
    }

    pub fn grid_mut(&mut self) -> &mut HeatGrid {
        &mut self.grid
    }

    pub fn kernel(&self) -> &BrushKernel {
        &self.kernel
    }

    /// Last rendered frame, one pixel per grid cell
    pub fn frame(&self) -> &PixelBuffer {
        &self.frame
    }

    pub fn pixel_scale(&self) -> u32 {
        self.scale
    }

    pub fn viewport(&self) -> (u32, u32) {
        self.viewport
    }

    pub fn last_stats(&self) -> FrameStats {
        self.last
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Stop the loop; later ticks do nothing
    pub fn stop(&mut self) {
        if self.running {
            log::info!("Heat simulation stopped");
        }
        self.running = false;
    }

    /// Zero all heat and glow without reallocating
    pub fn clear(&mut self) {
        self.grid.clear();
        self.iter_accum = 0.0;
    }

    /// Grid cell under a screen-space pointer
    pub fn grid_pos(&self, pointer: Pointer) -> (i32, i32) {
        let scale = self.scale as f32;
        ((pointer.x / scale).floor() as i32, (pointer.y / scale).floor() as i32)
    }

    /// Glow radius in grid cells, `None` when glow is unlimited
    pub fn glow_radius(&self) -> Option<f32> {
        let c = &self.config;
        c.glow
            .multiple()
            .map(|m| (c.brush_radius + c.fade_radius + m * c.brush_radius) / self.scale as f32)
    }

    /// Advance one display frame. `dt` is elapsed time in target frames.
    ///
    /// Returns false once the simulation has been stopped.
    pub fn tick(&mut self, dt: f32) -> bool {
        if !self.running {
            return false;
        }
        let dt = if dt.is_finite() {
            dt.clamp(0.0, MAX_FRAME_DT)
        } else {
            0.0
        };

        let inputs = self.inbox.take();
        let pointer = inputs.pointer;
        self.apply(inputs);

        let mode = if pointer.active {
            let (cx, cy) = self.grid_pos(pointer);
            Mode::Painting { cx, cy }
        } else {
            Mode::Idle
        };

        self.last = self.step(mode, dt);
        self.render();
        true
    }

    fn apply(&mut self, inputs: FrameInputs) {
        if let Some((w, h)) = inputs.viewport {
            self.resize(w, h);
        }
        if let Some(config) = inputs.config {
            self.set_config(config);
        }
        if inputs.clear {
            self.clear();
        }
    }

    /// Apply a new configuration, rebuilding only what depends on changed fields.
    /// Heat is never reset.
    pub fn set_config(&mut self, config: Config) {
        let config = config.clamped();
        if config == self.config {
            return;
        }

        if config.palette != self.config.palette {
            self.palette = config.palette();
            self.lut = Lut::from_palette(self.palette);
            log::info!("Palette changed to '{}'", self.palette.key);
        }
        if config.brush_radius != self.config.brush_radius
            || config.fade_radius != self.config.fade_radius
        {
            self.kernel = BrushKernel::build(config.brush_radius, config.fade_radius, self.scale);
            log::debug!(
                "Brush kernel rebuilt: radius {} fade {} ({} cells)",
                config.brush_radius,
                config.fade_radius,
                self.kernel.len()
            );
        }
        if config.glow != self.config.glow {
            self.grid.set_glow_enabled(config.glow.is_limited());
            log::debug!("Glow limit set to {}", config.glow);
        }

        self.config = config;
    }

    /// Rebuild everything sized by the viewport, keeping overlapping heat
    pub fn resize(&mut self, width: u32, height: u32) {
        let width = width.max(1);
        let height = height.max(1);
        if (width, height) == self.viewport {
            return;
        }

        let scale = self.profile.pixel_scale(width, height);
        let (gw, gh) = grid_size((width, height), scale);
        self.grid.resize(gw, gh);
        self.frame = PixelBuffer::with_size(gw as u32, gh as u32);
        if scale != self.scale {
            self.kernel =
                BrushKernel::build(self.config.brush_radius, self.config.fade_radius, scale);
        }
        self.scale = scale;
        self.viewport = (width, height);

        log::info!("Viewport {}x{} → heat grid {}x{} (scale {})", width, height, gw, gh, scale);
    }

    /// Sample, diffuse, decay and paint for one frame
    fn step(&mut self, mode: Mode, dt: f32) -> FrameStats {
        let burn = self.config.burn_speed;

        let paint_value = match mode {
            Mode::Painting { cx, cy } => {
                let v = self.grid.sample_core(cx, cy, &self.kernel) + accumulation(burn, dt);
                if self.palette.cycling {
                    v
                } else {
                    v.min(1.0)
                }
            }
            Mode::Idle => 0.0,
        };

        self.iter_accum += diffusion_rate(self.profile.base_iterations(), burn, dt);
        let passes = self.iter_accum.floor();
        self.iter_accum -= passes;
        let passes = passes as u32;
        self.grid.diffuse(passes);

        // Decay before painting so the brush replenishes what it covers
        let factor = mode.decay_factor(decay_factor(self.palette.cycling, dt));
        self.grid.decay(factor);

        if let Mode::Painting { cx, cy } = mode {
            self.grid.paint(cx, cy, &self.kernel, paint_value);
            if let Some(radius) = self.glow_radius() {
                self.grid.paint_glow(cx, cy, radius);
            }
        }

        FrameStats {
            mode,
            passes,
            paint_value,
        }
    }

    /// Map the grid through the LUT into the frame buffer
    pub fn render(&mut self) {
        let (heat, glow) = self.grid.buffers_mut();
        render_heat(heat, glow, &self.lut, &mut self.frame);
    }
}

fn grid_size((width, height): (u32, u32), scale: u32) -> (usize, usize) {
    let scale = scale.max(1);
    (
        width.div_ceil(scale).max(1) as usize,
        height.div_ceil(scale).max(1) as usize,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GlowLimit;

    fn sim_50() -> Simulation {
        Simulation::new(Config::default(), (100, 100), DeviceProfile::Desktop)
    }

    #[test]
    fn test_first_painting_frame() {
        let mut sim = sim_50();
        assert_eq!((sim.grid().width(), sim.grid().height()), (50, 50));

        sim.inbox_mut().pointer_down(20.0, 20.0);
        assert!(sim.tick(1.0));

        let expected = accumulation(0.5, 1.0);
        let v = sim.grid().get(10, 10).unwrap();
        assert!(v > 0.0);
        assert!((v - expected).abs() < 1e-7, "{} vs {}", v, expected);
        assert_eq!(sim.last_stats().mode, Mode::Painting { cx: 10, cy: 10 });
    }

    #[test]
    fn test_decay_factor_half_life() {
        let mut f = 1.0f32;
        for _ in 0..(HALF_LIFE_FRAMES as usize) {
            f *= decay_factor(false, 1.0);
        }
        assert!((f - 0.5).abs() < 1e-3);
        assert!(decay_factor(true, 1.0) < decay_factor(false, 1.0));
        assert!((Mode::Idle.decay_factor(0.9) - 0.81).abs() < 1e-6);
        assert_eq!(Mode::Painting { cx: 0, cy: 0 }.decay_factor(0.9), 0.9);
    }

    #[test]
    fn test_idle_heat_fades_to_zero() {
        let mut sim = sim_50();
        sim.inbox_mut().pointer_down(50.0, 50.0);
        for _ in 0..120 {
            sim.tick(1.0);
        }
        sim.inbox_mut().pointer_up();

        let mut last_total = f32::INFINITY;
        for _ in 0..40_000 {
            sim.tick(MAX_FRAME_DT);
            let total: f32 = sim.grid().heat().iter().sum();
            assert!(total <= last_total * (1.0 + 1e-5));
            last_total = total;
            if total == 0.0 {
                break;
            }
        }
        assert!(sim.grid().heat().iter().all(|&v| v == 0.0));
        assert_eq!(sim.frame().get(25, 25), Some(sim.lut().background));
    }

    #[test]
    fn test_diffusion_remainder_carries() {
        let mut sim = sim_50();
        // Desktop, burn 0.5: 6 * 1.25 = 7.5 passes per frame
        sim.tick(1.0);
        assert_eq!(sim.last_stats().passes, 7);
        sim.tick(1.0);
        assert_eq!(sim.last_stats().passes, 8);
    }

    #[test]
    fn test_dt_is_clamped() {
        let mut sim = sim_50();
        sim.tick(1000.0);
        // 7.5 * 3 = 22.5
        assert_eq!(sim.last_stats().passes, 22);
        sim.tick(f32::NAN);
        assert_eq!(sim.last_stats().passes, 0);
    }

    #[test]
    fn test_paint_value_clamped_for_ramp_palettes() {
        let mut sim = sim_50();
        sim.grid_mut().heat_mut().fill(1.0);
        sim.inbox_mut().pointer_down(50.0, 50.0);
        sim.tick(1.0);
        assert_eq!(sim.last_stats().paint_value, 1.0);

        let mut cycling = Simulation::new(
            Config {
                palette: "spectrum".to_string(),
                ..Config::default()
            },
            (100, 100),
            DeviceProfile::Desktop,
        );
        cycling.grid_mut().heat_mut().fill(1.0);
        cycling.inbox_mut().pointer_down(50.0, 50.0);
        cycling.tick(1.0);
        assert!(cycling.last_stats().paint_value > 1.0);
    }

    #[test]
    fn test_config_change_keeps_heat() {
        let mut sim = sim_50();
        sim.grid_mut().set(3, 3, 0.8);
        sim.inbox_mut().set_config(Config {
            palette: "ocean".to_string(),
            brush_radius: 10.0,
            ..Config::default()
        });
        sim.tick(0.0);

        assert_eq!(sim.palette().key, "ocean");
        assert_eq!(sim.config().brush_radius, 10.0);
        assert!(sim.grid().get(3, 3).unwrap() > 0.0);
        let kernel = BrushKernel::build(10.0, 20.0, 2);
        assert_eq!(sim.kernel().len(), kernel.len());
    }

    #[test]
    fn test_glow_mask_follows_config() {
        let mut sim = sim_50();
        assert!(!sim.grid().has_glow());
        assert_eq!(sim.glow_radius(), None);

        sim.set_config(Config {
            glow: GlowLimit::Multiple(1),
            brush_radius: 4.0,
            fade_radius: 0.0,
            ..Config::default()
        });
        assert!(sim.grid().has_glow());
        assert_eq!(sim.glow_radius(), Some(4.0));

        sim.inbox_mut().pointer_down(50.0, 50.0);
        sim.tick(1.0);
        assert_eq!(sim.grid().glow_at(25, 25), Some(1.0));
        assert_eq!(sim.grid().glow_at(0, 0), Some(0.0));

        sim.set_config(Config::default());
        assert!(!sim.grid().has_glow());
    }

    #[test]
    fn test_idle_glow_decays_at_squared_rate() {
        let mut sim = Simulation::new(
            Config {
                glow: GlowLimit::Multiple(2),
                ..Config::default()
            },
            (100, 100),
            DeviceProfile::Desktop,
        );
        sim.inbox_mut().pointer_down(50.0, 50.0);
        sim.tick(1.0);
        assert_eq!(sim.grid().glow_at(25, 25), Some(1.0));

        sim.inbox_mut().pointer_up();
        sim.tick(1.0);
        assert_eq!(sim.last_stats().mode, Mode::Idle);
        let expected = decay_factor(false, 1.0).powi(2);
        let glow = sim.grid().glow_at(25, 25).unwrap();
        assert!((glow - expected).abs() < 1e-6, "{} vs {}", glow, expected);
    }

    #[test]
    fn test_resize_keeps_overlap_and_rescales_frame() {
        let mut sim = sim_50();
        sim.grid_mut().set(5, 5, 0.5);
        sim.grid_mut().set(45, 45, 0.5);
        sim.inbox_mut().resize(60, 200);
        sim.tick(0.0);

        assert_eq!((sim.grid().width(), sim.grid().height()), (30, 100));
        assert_eq!(sim.frame().width(), 30);
        assert_eq!(sim.frame().height(), 100);
        assert!(sim.grid().get(5, 5).unwrap() > 0.4);
        assert_eq!(sim.grid().get(29, 99), Some(0.0));
    }

    #[test]
    fn test_touch_profile_scale() {
        assert_eq!(DeviceProfile::Touch.pixel_scale(1024, 768), 3);
        assert_eq!(DeviceProfile::Touch.pixel_scale(390, 844), 4);
        assert_eq!(DeviceProfile::Desktop.pixel_scale(390, 844), 2);

        let mut sim = Simulation::new(Config::default(), (900, 900), DeviceProfile::Touch);
        assert_eq!(sim.pixel_scale(), 3);
        sim.resize(400, 800);
        assert_eq!(sim.pixel_scale(), 4);
        assert_eq!((sim.grid().width(), sim.grid().height()), (100, 200));
    }

    #[test]
    fn test_reduced_motion_and_stop() {
        assert!(Simulation::start(Config::default(), (100, 100), DeviceProfile::Desktop, true)
            .is_none());

        let mut sim =
            Simulation::start(Config::default(), (100, 100), DeviceProfile::Desktop, false)
                .unwrap();
        assert!(sim.tick(1.0));
        sim.stop();
        assert!(!sim.is_running());
        assert!(!sim.tick(1.0));
    }

    #[test]
    fn test_clear_request() {
        let mut sim = sim_50();
        sim.grid_mut().heat_mut().fill(0.5);
        sim.inbox_mut().request_clear();
        sim.tick(1.0);
        assert_eq!(sim.grid().active_cells(), 0);
    }
}
