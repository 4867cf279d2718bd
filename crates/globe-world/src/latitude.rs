//! World presets, border radius and the polar band
//!
//! "Latitude" is the absolute block Z. The world border is a square centered
//! on the origin; the polar band is everything whose `|z|` is at least the
//! band start.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::WorldError;

/// Polar band start as a fraction of the radius when nothing else is set.
/// Puts the start at 12000 on the default 15000-block globe.
pub const DEFAULT_POLAR_START_FRACTION: f64 = 0.8;

/// Generator preset a world was created with
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorldPreset {
    /// Plain world, no globe features
    Vanilla,
    #[default]
    Globe,
    GlobeXsmall,
    GlobeSmall,
    GlobeRegular,
    GlobeLarge,
    GlobeMassive,
}

impl WorldPreset {
    pub const ALL: [WorldPreset; 7] = [
        Self::Vanilla,
        Self::Globe,
        Self::GlobeXsmall,
        Self::GlobeSmall,
        Self::GlobeRegular,
        Self::GlobeLarge,
        Self::GlobeMassive,
    ];

    /// Whether globe features (border, polar pass) apply
    pub fn is_globe(self) -> bool {
        self != Self::Vanilla
    }

    /// Border half-size in blocks
    pub fn border_radius(self) -> i32 {
        match self {
            Self::Globe => 15_000,
            Self::GlobeXsmall => 3_750,
            Self::GlobeSmall => 5_000,
            Self::GlobeRegular | Self::Vanilla => 7_500,
            Self::GlobeLarge => 10_000,
            Self::GlobeMassive => 20_000,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Vanilla => "vanilla",
            Self::Globe => "globe",
            Self::GlobeXsmall => "globe_xsmall",
            Self::GlobeSmall => "globe_small",
            Self::GlobeRegular => "globe_regular",
            Self::GlobeLarge => "globe_large",
            Self::GlobeMassive => "globe_massive",
        }
    }
}

impl fmt::Display for WorldPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for WorldPreset {
    type Err = WorldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        let wanted = wanted.strip_prefix("globe:").map_or(wanted.as_str(), |rest| rest);
        Self::ALL
            .into_iter()
            .find(|preset| preset.name() == wanted)
            .ok_or_else(|| WorldError::UnknownPreset(s.to_string()))
    }
}

/// Where the poles start and where the world ends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PolarBand {
    /// Border half-size in blocks
    radius: i32,
    /// Absolute Z at which polar dressing begins
    start_abs_z: i32,
}

impl PolarBand {
    pub fn new(radius: i32, start_abs_z: i32) -> Result<Self, WorldError> {
        if radius <= 0 {
            return Err(WorldError::InvalidRadius(radius));
        }
        if start_abs_z < 0 || start_abs_z > radius {
            return Err(WorldError::PolarStartOutsideWorld {
                start: start_abs_z,
                radius,
            });
        }
        Ok(Self { radius, start_abs_z })
    }

    /// Derive the band start from the radius: `round(radius * fraction)`
    pub fn from_radius(radius: i32, fraction: f64) -> Result<Self, WorldError> {
        if !(fraction > 0.0 && fraction <= 1.0) {
            return Err(WorldError::InvalidStartFraction(fraction));
        }
        Self::new(radius, (radius as f64 * fraction).round() as i32)
    }

    pub fn for_preset(preset: WorldPreset, fraction: f64) -> Result<Self, WorldError> {
        Self::from_radius(preset.border_radius(), fraction)
    }

    pub fn radius(&self) -> i32 {
        self.radius
    }

    pub fn start_abs_z(&self) -> i32 {
        self.start_abs_z
    }

    /// Whether a block Z lies in the band
    pub fn contains_z(&self, z: i32) -> bool {
        z.unsigned_abs() >= self.start_abs_z as u32
    }

    /// Whether a coordinate is past the border plus `margin`
    pub fn beyond_border(&self, coord: i32, margin: i32) -> bool {
        coord.unsigned_abs() > (self.radius as u32).saturating_add(margin.max(0) as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preset_radii() {
        assert_eq!(WorldPreset::Globe.border_radius(), 15_000);
        assert_eq!(WorldPreset::GlobeXsmall.border_radius(), 3_750);
        assert_eq!(WorldPreset::GlobeMassive.border_radius(), 20_000);
        assert!(!WorldPreset::Vanilla.is_globe());
        assert!(WorldPreset::GlobeSmall.is_globe());
    }

    #[test]
    fn test_preset_parse() {
        assert_eq!("globe".parse::<WorldPreset>(), Ok(WorldPreset::Globe));
        assert_eq!("globe:globe_large".parse::<WorldPreset>(), Ok(WorldPreset::GlobeLarge));
        assert_eq!(" Globe_Small ".parse::<WorldPreset>(), Ok(WorldPreset::GlobeSmall));
        assert!(matches!(
            "flat".parse::<WorldPreset>(),
            Err(WorldError::UnknownPreset(_))
        ));
        for preset in WorldPreset::ALL {
            assert_eq!(preset.to_string().parse::<WorldPreset>(), Ok(preset));
        }
    }

    #[test]
    fn test_default_band_matches_legacy_start() {
        let band = PolarBand::for_preset(WorldPreset::Globe, DEFAULT_POLAR_START_FRACTION).unwrap();
        assert_eq!(band.start_abs_z(), 12_000);
        assert_eq!(band.radius(), 15_000);
    }

    #[test]
    fn test_band_contains() {
        let band = PolarBand::new(15_000, 12_000).unwrap();
        assert!(band.contains_z(12_000));
        assert!(band.contains_z(-12_808));
        assert!(!band.contains_z(11_999));
        assert!(!band.contains_z(5));
    }

    #[test]
    fn test_beyond_border() {
        let band = PolarBand::new(15_000, 12_000).unwrap();
        assert!(!band.beyond_border(15_032, 32));
        assert!(band.beyond_border(15_033, 32));
        assert!(band.beyond_border(-15_033, 32));
    }

    #[test]
    fn test_band_validation() {
        assert_eq!(PolarBand::new(0, 0), Err(WorldError::InvalidRadius(0)));
        assert!(matches!(
            PolarBand::new(100, 200),
            Err(WorldError::PolarStartOutsideWorld { .. })
        ));
        assert_eq!(
            PolarBand::from_radius(100, 1.5),
            Err(WorldError::InvalidStartFraction(1.5))
        );
    }
}
