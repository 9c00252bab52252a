//! Physical constants, unit conversions and angle constants.
//!
//! Lengths are in metres and times in seconds unless stated otherwise.

pub const M_E: f64 = std::f64::consts::E;
pub const M_LN2: f64 = std::f64::consts::LN_2;
pub const M_LN10: f64 = std::f64::consts::LN_10;
pub const M_SQRT2: f64 = std::f64::consts::SQRT_2;
pub const M_SQRT1_2: f64 = std::f64::consts::FRAC_1_SQRT_2;
pub const M_SQRT3: f64 = 1.732_050_807_568_877_3;
pub const M_PI: f64 = std::f64::consts::PI;
pub const M_TAU: f64 = std::f64::consts::TAU;
pub const M_PI_2: f64 = std::f64::consts::FRAC_PI_2;
pub const M_PI_4: f64 = std::f64::consts::FRAC_PI_4;

/// Speed of light in vacuum (`m/s`).
pub const M_C: f64 = 299_792_458.0;

/// Newtonian constant of gravitation (`m^3 kg^-1 s^-2`, CODATA 2018).
pub const MU_G0: f64 = 6.674_30e-11;

/// Astronomical unit (`m`, IAU 2012).
pub const M_AU: f64 = 1.495_978_707e11;

/// Heliocentric gravitational constant (`m^3/s^2`).
pub const GM_SUN: f64 = 1.327_124_400_18e20;

pub const SECONDS_PER_DAY: f64 = 86_400.0;

/// Degrees to radians.
pub const DEG_TO_RAD: f64 = M_PI / 180.0;
