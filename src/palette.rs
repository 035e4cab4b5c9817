//! Palettes and 256-entry color lookup tables
//!
//! A palette is a handful of color stops. Before rendering, the stops are
//! expanded into a dense LUT of packed pixels so the render loop only does
//! one table read per cell.

use crate::util::lerp_color;

/// Number of LUT entries reserved for the background fade-in on cycling palettes
pub const CYCLE_FADE_IN: usize = 40;
/// LUT size, one entry per 8-bit intensity
pub const LUT_SIZE: usize = 256;

/// 8-bit RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Pack as an opaque pixel with memory byte order R, G, B, A
    #[inline]
    pub fn pack(self) -> u32 {
        u32::from_le_bytes([self.r, self.g, self.b, 255])
    }

    pub fn as_tuple(self) -> (u8, u8, u8) {
        (self.r, self.g, self.b)
    }
}

impl From<(u8, u8, u8)> for Rgb {
    fn from((r, g, b): (u8, u8, u8)) -> Self {
        Self { r, g, b }
    }
}

/// Color at a normalized position in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorStop {
    pub pos: f32,
    pub color: Rgb,
}

const fn stop(pos: f32, r: u8, g: u8, b: u8) -> ColorStop {
    ColorStop {
        pos,
        color: Rgb::new(r, g, b),
    }
}

/// Named color ramp.
///
/// Stops must be sorted by position, start at 0 and end at 1.
#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    pub key: &'static str,
    pub name: &'static str,
    pub background: Rgb,
    pub stops: &'static [ColorStop],
    /// Cycling palettes wrap around as heat keeps growing instead of saturating
    pub cycling: bool,
}

pub const DEFAULT_PALETTE: &str = "ember";

static PALETTES: &[Palette] = &[
    Palette {
        key: "ember",
        name: "Ember",
        background: Rgb::new(8, 2, 0),
        stops: &[
            stop(0.0, 8, 2, 0),
            stop(0.25, 120, 12, 0),
            stop(0.5, 230, 80, 0),
            stop(0.75, 255, 190, 40),
            stop(1.0, 255, 255, 230),
        ],
        cycling: false,
    },
    Palette {
        key: "plasma",
        name: "Plasma",
        background: Rgb::new(10, 0, 24),
        stops: &[
            stop(0.0, 10, 0, 24),
            stop(0.3, 110, 0, 150),
            stop(0.6, 230, 60, 120),
            stop(0.85, 255, 170, 40),
            stop(1.0, 250, 250, 140),
        ],
        cycling: false,
    },
    Palette {
        key: "ocean",
        name: "Deep Ocean",
        background: Rgb::new(0, 4, 16),
        stops: &[
            stop(0.0, 0, 4, 16),
            stop(0.35, 0, 50, 120),
            stop(0.7, 0, 170, 210),
            stop(1.0, 220, 255, 255),
        ],
        cycling: false,
    },
    Palette {
        key: "toxic",
        name: "Toxic",
        background: Rgb::new(0, 8, 0),
        stops: &[
            stop(0.0, 0, 8, 0),
            stop(0.4, 20, 120, 10),
            stop(0.75, 140, 240, 30),
            stop(1.0, 240, 255, 200),
        ],
        cycling: false,
    },
    Palette {
        key: "mono",
        name: "Monochrome",
        background: Rgb::new(0, 0, 0),
        stops: &[stop(0.0, 0, 0, 0), stop(1.0, 255, 255, 255)],
        cycling: false,
    },
    Palette {
        key: "spectrum",
        name: "Spectrum",
        background: Rgb::new(0, 0, 0),
        stops: &[
            stop(0.0, 255, 0, 0),
            stop(0.17, 255, 160, 0),
            stop(0.33, 240, 255, 0),
            stop(0.5, 0, 255, 80),
            stop(0.67, 0, 140, 255),
            stop(0.83, 160, 0, 255),
            stop(1.0, 255, 0, 0),
        ],
        cycling: true,
    },
    Palette {
        key: "aurora",
        name: "Aurora",
        background: Rgb::new(2, 6, 14),
        stops: &[
            stop(0.0, 20, 200, 120),
            stop(0.33, 40, 120, 255),
            stop(0.66, 200, 60, 220),
            stop(1.0, 20, 200, 120),
        ],
        cycling: true,
    },
];

impl Palette {
    /// Look up a palette in the registry
    pub fn by_key(key: &str) -> Option<&'static Palette> {
        PALETTES.iter().find(|p| p.key == key)
    }

    /// Registry lookup that falls back to the default palette
    pub fn by_key_or_default(key: &str) -> &'static Palette {
        Self::by_key(key).unwrap_or_else(|| {
            log::warn!("Unknown palette '{}', using '{}'", key, DEFAULT_PALETTE);
            &PALETTES[0]
        })
    }

    pub fn all() -> &'static [Palette] {
        PALETTES
    }
}

/// Registry keys in display order
pub fn palette_keys() -> impl Iterator<Item = &'static str> {
    PALETTES.iter().map(|p| p.key)
}

/// Dense color table for one palette
#[derive(Debug, Clone)]
pub struct Lut {
    pub entries: [u32; LUT_SIZE],
    pub background: u32,
    pub cycling: bool,
}

impl Lut {
    pub fn from_palette(palette: &Palette) -> Self {
        build_lut(palette.stops, palette.cycling, palette.background)
    }

    #[inline]
    pub fn get(&self, index: u8) -> u32 {
        self.entries[index as usize]
    }
}

/// Interpolate the stop list at `t` in [0, 1]
fn sample_stops(stops: &[ColorStop], t: f32) -> Rgb {
    let first = stops[0];
    if t <= first.pos {
        return first.color;
    }

    for pair in stops.windows(2) {
        let (lo, hi) = (pair[0], pair[1]);
        if t >= lo.pos && t <= hi.pos {
            let span = hi.pos - lo.pos;
            let frac = if span > 0.0 { (t - lo.pos) / span } else { 0.0 };
            return lerp_rgb(lo.color, hi.color, frac);
        }
    }

    stops[stops.len() - 1].color
}

/// Channel-wise lerp with rounding, so the endpoints land exactly on the stops
#[inline]
fn lerp_rgb(a: Rgb, b: Rgb, t: f32) -> Rgb {
    lerp_color(a.as_tuple(), b.as_tuple(), t).into()
}

/// Build a 256-entry pixel LUT plus the background pixel.
///
/// Non-cycling: entry `i` samples the stops at `i / 255`.
/// Cycling: the first [`CYCLE_FADE_IN`] entries blend from the background to
/// the first stop, the rest traverse the stops once.
pub fn build_lut(stops: &[ColorStop], cycling: bool, background: Rgb) -> Lut {
    let mut entries = [0u32; LUT_SIZE];

    if cycling {
        let first = stops[0].color;
        for (i, entry) in entries.iter_mut().enumerate().take(CYCLE_FADE_IN) {
            let t = i as f32 / CYCLE_FADE_IN as f32;
            *entry = lerp_rgb(background, first, t).pack();
        }
        let span = (LUT_SIZE - 1 - CYCLE_FADE_IN) as f32;
        for (i, entry) in entries.iter_mut().enumerate().skip(CYCLE_FADE_IN) {
            let t = (i - CYCLE_FADE_IN) as f32 / span;
            *entry = sample_stops(stops, t).pack();
        }
    } else {
        for (i, entry) in entries.iter_mut().enumerate() {
            let t = i as f32 / (LUT_SIZE - 1) as f32;
            *entry = sample_stops(stops, t).pack();
        }
    }

    Lut {
        entries,
        background: background.pack(),
        cycling,
    }
}
