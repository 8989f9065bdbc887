//! This module defines the unit types used in reports and the conversions between them.
//!
//! Network data is stored in MW, `MWh` and tonnes. Reported quantities are converted once, using
//! the factors in [`CONVERSIONS`].

/// Factors for converting network units into reporting units
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnitConversions {
    /// MW to GW (also `MWh` to `GWh`)
    pub mw_to_gw: f64,
    /// `MWh` to PJ
    pub mwh_to_pj: f64,
    /// Tonnes to megatonnes
    pub t_to_mt: f64,
    /// `TWh` to PJ
    pub twh_to_pj: f64,
    /// `MWh` to GJ
    pub mwh_to_gj: f64,
}

/// The conversion factors used throughout the program
pub const CONVERSIONS: UnitConversions = UnitConversions {
    mw_to_gw: 1e-3,
    mwh_to_pj: 3.6e-6,
    t_to_mt: 1e-6,
    twh_to_pj: 3.6,
    mwh_to_gj: 3.6,
};

macro_rules! unit_struct {
    ($name:ident, $unit:literal) => {
        #[doc = concat!("A quantity measured in ", $unit, ".")]
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            PartialOrd,
            Default,
            derive_more::Add,
            derive_more::Sub,
            derive_more::Neg,
            derive_more::Display,
        )]
        pub struct $name(pub f64);

        impl $name {
            /// The unit label used in reports
            pub const UNIT: &'static str = $unit;

            /// Returns the value of the unit type as a f64.
            pub fn value(self) -> f64 {
                self.0
            }
        }

        impl std::ops::Mul<f64> for $name {
            type Output = $name;
            fn mul(self, rhs: f64) -> $name {
                $name(self.0 * rhs)
            }
        }

        impl std::iter::Sum for $name {
            fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
                $name(iter.map(|x| x.0).sum())
            }
        }

        impl From<$name> for f64 {
            fn from(val: $name) -> Self {
                val.0
            }
        }
    };
}

unit_struct!(Capacity, "GW");
unit_struct!(StorageEnergy, "GWh");
unit_struct!(Energy, "PJ/yr");
unit_struct!(Mass, "Mt CO2/yr");
unit_struct!(MoneyPerEnergy, "EUR2020/GJ");
unit_struct!(TransmissionCapacity, "GW*km");
