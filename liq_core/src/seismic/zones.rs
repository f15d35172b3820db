//! # Seismic Zone Tables
//!
//! Built-in design-spectrum tables for the supported region (TWD97 / EPSG:3826
//! coordinates). Three layers of data live here:
//!
//! - general administrative zones resolved by coordinate box,
//! - Taipei-basin micro-zones whose spectral values bypass site amplification,
//! - the fixed city → design-earthquake magnitude table.
//!
//! The Vs30 estimate is a documented placeholder: a latitude-banded base value
//! with deterministic coordinate jitter, standing in for a real shear-wave
//! survey lookup.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// Supported coordinate range (TWD97), eastings in metres
pub const X_MIN: f64 = 160_000.0;
pub const X_MAX: f64 = 380_000.0;
/// Supported coordinate range (TWD97), northings in metres
pub const Y_MIN: f64 = 2_420_000.0;
pub const Y_MAX: f64 = 2_800_000.0;

/// Fallback spectral parameters when no zone matches
pub const DEFAULT_SDS: f64 = 0.6;
pub const DEFAULT_SMS: f64 = 0.8;
/// Fallback design-earthquake magnitude for unmapped cities
pub const DEFAULT_MW: f64 = 7.0;

/// Whether a coordinate lies inside the supported bounding box
pub fn in_bounds(x: f64, y: f64) -> bool {
    (X_MIN..=X_MAX).contains(&x) && (Y_MIN..=Y_MAX).contains(&y)
}

/// A general seismic zone: an administrative region with its design and
/// maximum-considered spectral accelerations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeismicZone {
    pub city: &'static str,
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
    pub sds: f64,
    pub sms: f64,
    pub sd1: f64,
    pub sm1: f64,
}

impl SeismicZone {
    fn contains(&self, x: f64, y: f64) -> bool {
        (self.x_min..=self.x_max).contains(&x) && (self.y_min..=self.y_max).contains(&y)
    }
}

/// General zone table. Boxes overlap; the first match wins, so more specific
/// regions are listed before the ones that enclose them.
pub static GENERAL_ZONES: Lazy<Vec<SeismicZone>> = Lazy::new(|| {
    vec![
        SeismicZone {
            city: "Taipei",
            x_min: 290_000.0,
            x_max: 310_000.0,
            y_min: 2_760_000.0,
            y_max: 2_780_000.0,
            sds: 0.8,
            sms: 1.2,
            sd1: 0.5,
            sm1: 0.75,
        },
        SeismicZone {
            city: "New Taipei",
            x_min: 280_000.0,
            x_max: 320_000.0,
            y_min: 2_740_000.0,
            y_max: 2_790_000.0,
            sds: 0.75,
            sms: 1.15,
            sd1: 0.48,
            sm1: 0.72,
        },
        SeismicZone {
            city: "Taoyuan",
            x_min: 270_000.0,
            x_max: 310_000.0,
            y_min: 2_720_000.0,
            y_max: 2_760_000.0,
            sds: 0.7,
            sms: 1.1,
            sd1: 0.45,
            sm1: 0.68,
        },
        SeismicZone {
            city: "Taichung",
            x_min: 190_000.0,
            x_max: 230_000.0,
            y_min: 2_660_000.0,
            y_max: 2_700_000.0,
            sds: 0.85,
            sms: 1.25,
            sd1: 0.52,
            sm1: 0.78,
        },
        SeismicZone {
            city: "Kaohsiung",
            x_min: 180_000.0,
            x_max: 220_000.0,
            y_min: 2_500_000.0,
            y_max: 2_540_000.0,
            sds: 0.9,
            sms: 1.3,
            sd1: 0.55,
            sm1: 0.82,
        },
    ]
});

/// Find the general zone containing a coordinate
pub fn find_general_zone(x: f64, y: f64) -> Option<&'static SeismicZone> {
    GENERAL_ZONES.iter().find(|z| z.contains(x, y))
}

/// A Taipei-basin micro-zone. Basin spectral values already include site
/// response, so downstream amplification (Fa) must not be applied.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BasinZone {
    pub name: &'static str,
    pub sds: f64,
    pub sms: f64,
}

/// Taipei-basin micro-zone table, keyed by village name
pub static BASIN_ZONES: Lazy<Vec<(&'static str, BasinZone)>> = Lazy::new(|| {
    let zone = |name| BasinZone {
        name,
        sds: 0.6,
        sms: 0.8,
    };
    vec![
        ("臺北一區", zone("臺北一區")),
        ("臺北二區", zone("臺北二區")),
        ("臺北三區", zone("臺北三區")),
    ]
});

/// Look up a basin micro-zone by village name
pub fn find_basin_zone(village: &str) -> Option<&'static BasinZone> {
    BASIN_ZONES
        .iter()
        .find(|(name, _)| *name == village)
        .map(|(_, z)| z)
}

/// Design-earthquake magnitude for a city.
///
/// Grouped by seismic province: 7.3 for the northeast and east coast, 7.1 for
/// the western plain, 6.9 for the northwest, 6.7 for the outlying islands.
pub fn base_magnitude(city: &str) -> f64 {
    match city {
        "Keelung" | "New Taipei" | "Taipei" | "Yilan" | "Hualien" | "Taitung" => 7.3,
        "Taoyuan" | "Taichung" | "Changhua" | "Nantou" | "Yunlin" | "Chiayi" | "Tainan"
        | "Kaohsiung" => 7.1,
        "Hsinchu" | "Miaoli" | "Pingtung" => 6.9,
        "Penghu" | "Kinmen" | "Matsu" => 6.7,
        _ => DEFAULT_MW,
    }
}

/// Estimate Vs30 at a coordinate.
///
/// Placeholder model: a northing-banded base value (stiffer ground in the
/// north) with deterministic sub-kilometre jitter so neighbouring boreholes do
/// not all collapse onto the same value. Clamped to [200, 800] m/s and rounded
/// to one decimal.
pub fn estimate_vs30(x: f64, y: f64) -> f64 {
    let base = if y > 2_750_000.0 {
        600.0
    } else if y >= 2_650_000.0 {
        400.0
    } else if y < 2_550_000.0 {
        350.0
    } else {
        450.0
    };
    let jitter = ((x % 1000.0) + (y % 1000.0)) / 1000.0 * 100.0 - 50.0;
    let vs30 = (base + jitter).clamp(200.0, 800.0);
    (vs30 * 10.0).round() / 10.0
}

/// NEHRP site class from Vs30 (m/s)
pub fn site_class(vs30: f64) -> char {
    if vs30 >= 760.0 {
        'A'
    } else if vs30 >= 360.0 {
        'B'
    } else if vs30 >= 180.0 {
        'C'
    } else if vs30 >= 120.0 {
        'D'
    } else {
        'E'
    }
}

/// Three-tier ground class feeding the site-amplification table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GroundClass {
    /// Stiff ground, Vs30 >= 270 m/s
    First,
    /// Medium ground, 180 <= Vs30 < 270 m/s
    Second,
    /// Soft ground, Vs30 < 180 m/s
    Third,
}

impl GroundClass {
    pub fn from_vs30(vs30: f64) -> Self {
        if vs30 >= 270.0 {
            GroundClass::First
        } else if vs30 >= 180.0 {
            GroundClass::Second
        } else {
            GroundClass::Third
        }
    }
}
