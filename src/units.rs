//! Density unit conversion.
//!
//! Density fields count pixels (grid points) per some physical length. The
//! conversions here turn them into dots per inch. Units from a kilometer up
//! to a millimeter have fractional factors and are rounded half up; the
//! sub-millimeter units have exact integer factors.
//!
//! JPEG 2000 resolution boxes encode the unit as a decimal exponent `E`
//! (density is per 10^-E meters), which [`DensityUnit::from_exponent`] maps
//! onto this table.

/// Physical length a density value is expressed against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DensityUnit {
    Kilometer,
    Hectometer,
    Decameter,
    Meter,
    Decimeter,
    Centimeter,
    Millimeter,
    TenthMillimeter,
    HundredthMillimeter,
    /// Also used for inch-equivalent densities
    Micrometer,
}

impl DensityUnit {
    /// Map a decimal exponent (`-3` = per kilometer ... `6` = per micrometer).
    ///
    /// Returns `None` outside that range.
    pub const fn from_exponent(exponent: i8) -> Option<Self> {
        match exponent {
            -3 => Some(DensityUnit::Kilometer),
            -2 => Some(DensityUnit::Hectometer),
            -1 => Some(DensityUnit::Decameter),
            0 => Some(DensityUnit::Meter),
            1 => Some(DensityUnit::Decimeter),
            2 => Some(DensityUnit::Centimeter),
            3 => Some(DensityUnit::Millimeter),
            4 => Some(DensityUnit::TenthMillimeter),
            5 => Some(DensityUnit::HundredthMillimeter),
            6 => Some(DensityUnit::Micrometer),
            _ => None,
        }
    }

    /// Multiplier from "per unit" to "per inch".
    pub const fn factor(self) -> f64 {
        match self {
            DensityUnit::Kilometer => 0.0000254,
            DensityUnit::Hectometer => 0.000254,
            DensityUnit::Decameter => 0.00254,
            DensityUnit::Meter => 0.0254,
            DensityUnit::Decimeter => 0.254,
            DensityUnit::Centimeter => 2.54,
            DensityUnit::Millimeter => 25.4,
            DensityUnit::TenthMillimeter => 254.0,
            DensityUnit::HundredthMillimeter => 2540.0,
            DensityUnit::Micrometer => 25400.0,
        }
    }

    /// Integer multiplier for units whose factor is exact.
    const fn integer_factor(self) -> Option<u32> {
        match self {
            DensityUnit::TenthMillimeter => Some(254),
            DensityUnit::HundredthMillimeter => Some(2540),
            DensityUnit::Micrometer => Some(25400),
            _ => None,
        }
    }
}

/// Round half up, saturating into `u32`.
fn round_half_up(value: f64) -> u32 {
    // `as` saturates for out-of-range floats
    (value + 0.5).floor() as u32
}

/// Convert a density in `unit` to dots per inch.
pub fn convert_to_dpi(value: u32, unit: DensityUnit) -> u32 {
    match unit.integer_factor() {
        Some(factor) => value.saturating_mul(factor),
        None => round_half_up(f64::from(value) * unit.factor()),
    }
}

/// Convert a density whose unit is given as a decimal exponent.
///
/// Unknown exponents leave the value unchanged.
pub fn convert_exponent_to_dpi(value: u32, exponent: i8) -> u32 {
    match DensityUnit::from_exponent(exponent) {
        Some(unit) => convert_to_dpi(value, unit),
        None => value,
    }
}

/// Convert a rational density `numerator / denominator` to dots per inch.
///
/// With no unit the ratio is only rounded. Returns `None` for a zero
/// denominator.
pub fn convert_ratio_to_dpi(numerator: u32, denominator: u32, unit: Option<DensityUnit>) -> Option<u32> {
    if denominator == 0 {
        return None;
    }
    if denominator == 1 {
        return Some(match unit {
            Some(unit) => convert_to_dpi(numerator, unit),
            None => numerator,
        });
    }

    let ratio = f64::from(numerator) / f64::from(denominator);
    let factor = unit.map_or(1.0, DensityUnit::factor);
    Some(round_half_up(ratio * factor))
}
