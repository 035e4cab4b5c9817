//! Brush configuration supplied by the front-end
//!
//! Stored as JSON. Out-of-range values are clamped here, before they ever
//! reach the simulation.

use crate::palette::{Palette, DEFAULT_PALETTE};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const DEFAULT_CONFIG_PATH: &str = "heatbrush.json";

pub const BRUSH_RADIUS_RANGE: (f32, f32) = (2.0, 200.0);
pub const FADE_RADIUS_RANGE: (f32, f32) = (0.0, 60.0);

/// Glow multiples of the brush radius the front-end offers
pub const GLOW_MULTIPLES: [u8; 6] = [0, 1, 2, 4, 8, 16];

/// How far from the last painted spot diffused heat stays visible
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "GlowRepr", into = "GlowRepr")]
pub enum GlowLimit {
    /// Bounded at this many brush radii beyond the brush footprint
    Multiple(u8),
    Unlimited,
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum GlowRepr {
    Multiple(u8),
    Word(String),
}

impl TryFrom<GlowRepr> for GlowLimit {
    type Error = String;

    fn try_from(repr: GlowRepr) -> Result<Self, Self::Error> {
        match repr {
            GlowRepr::Multiple(m) => Ok(GlowLimit::Multiple(m)),
            GlowRepr::Word(w) => GlowLimit::parse(&w).ok_or_else(|| format!("invalid glow '{}'", w)),
        }
    }
}

impl From<GlowLimit> for GlowRepr {
    fn from(limit: GlowLimit) -> Self {
        match limit {
            GlowLimit::Multiple(m) => GlowRepr::Multiple(m),
            GlowLimit::Unlimited => GlowRepr::Word("unlimited".to_string()),
        }
    }
}

impl GlowLimit {
    /// Parse "unlimited"/"inf" or one of the offered multiples
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "unlimited" | "inf" | "none" => Some(GlowLimit::Unlimited),
            other => other.parse::<u8>().ok().map(GlowLimit::Multiple),
        }
    }

    /// The multiplier, or `None` when unlimited
    pub fn multiple(self) -> Option<f32> {
        match self {
            GlowLimit::Multiple(m) => Some(m as f32),
            GlowLimit::Unlimited => None,
        }
    }

    pub fn is_limited(self) -> bool {
        matches!(self, GlowLimit::Multiple(_))
    }

    /// Snap to the nearest offered multiple
    pub fn snapped(self) -> Self {
        match self {
            GlowLimit::Multiple(m) => {
                let nearest = GLOW_MULTIPLES
                    .iter()
                    .copied()
                    .min_by_key(|&g| (g as i32 - m as i32).abs())
                    .unwrap_or(0);
                GlowLimit::Multiple(nearest)
            }
            GlowLimit::Unlimited => GlowLimit::Unlimited,
        }
    }

    /// Next setting in the front-end's cycle: 0, 1, 2, 4, 8, 16, unlimited, 0, ...
    pub fn next(self) -> Self {
        match self.snapped() {
            GlowLimit::Multiple(m) => match GLOW_MULTIPLES.iter().position(|&g| g == m) {
                Some(i) if i + 1 < GLOW_MULTIPLES.len() => GlowLimit::Multiple(GLOW_MULTIPLES[i + 1]),
                _ => GlowLimit::Unlimited,
            }
            GlowLimit::Unlimited => GlowLimit::Multiple(GLOW_MULTIPLES[0]),
        }
    }
}

impl std::fmt::Display for GlowLimit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GlowLimit::Multiple(m) => write!(f, "{}x", m),
            GlowLimit::Unlimited => write!(f, "unlimited"),
        }
    }
}

/// Brush settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Palette registry key
    pub palette: String,
    /// Solid brush radius in screen pixels
    pub brush_radius: f32,
    /// Bleed distance beyond the brush in screen pixels (0 = hard edge)
    pub fade_radius: f32,
    pub glow: GlowLimit,
    /// Normalized [0, 1]
    pub burn_speed: f32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            palette: DEFAULT_PALETTE.to_string(),
            brush_radius: 40.0,
            fade_radius: 20.0,
            glow: GlowLimit::Unlimited,
            burn_speed: 0.5,
        }
    }
}

fn clamp_or(value: f32, (min, max): (f32, f32), fallback: f32) -> f32 {
    if value.is_finite() {
        value.clamp(min, max)
    } else {
        fallback
    }
}

impl Config {
    /// Copy with every field forced into its documented range
    pub fn clamped(&self) -> Self {
        let defaults = Self::default();
        let palette = if Palette::by_key(&self.palette).is_some() {
            self.palette.clone()
        } else {
            log::warn!("Unknown palette '{}', using '{}'", self.palette, defaults.palette);
            defaults.palette.clone()
        };
        Self {
            palette,
            brush_radius: clamp_or(self.brush_radius, BRUSH_RADIUS_RANGE, defaults.brush_radius),
            fade_radius: clamp_or(self.fade_radius, FADE_RADIUS_RANGE, defaults.fade_radius),
            glow: self.glow.snapped(),
            burn_speed: clamp_or(self.burn_speed, (0.0, 1.0), defaults.burn_speed),
        }
    }

    pub fn palette(&self) -> &'static Palette {
        Palette::by_key_or_default(&self.palette)
    }

    pub fn from_json(json: &str) -> Result<Self, String> {
        serde_json::from_str::<Self>(json)
            .map(|c| c.clamped())
            .map_err(|e| e.to_string())
    }

    /// Save config to a JSON file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), String> {
        let json = serde_json::to_string_pretty(self).map_err(|e| e.to_string())?;
        fs::write(path, json).map_err(|e| e.to_string())
    }

    /// Load config from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, String> {
        let json = fs::read_to_string(path).map_err(|e| e.to_string())?;
        Self::from_json(&json)
    }
}
