//! Conversions between mean, eccentric and true anomaly on elliptic
//! orbits, and the Kepler equation solver that links the first two.

use std::f64::consts;

use tracing::{trace, warn};

/// Default absolute tolerance on the Kepler equation residual.
pub const DEFAULT_TOL: f64 = 1e-12;
/// Default iteration cap for [`ma_to_ea`].
pub const DEFAULT_MAXITER: u64 = 30;

/// Above this eccentricity the Newton iteration starts from `π` instead of
/// from the mean anomaly.
const HIGH_ECCENTRICITY: f64 = 0.8;

/// Outcome of a Kepler equation solve.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct KeplerSolution {
    /// Eccentric anomaly (radians).
    pub ea: f64,
    /// Newton steps taken.
    pub iterations: u64,
    /// Whether the residual reached the tolerance. When `false`, `ea` is
    /// the last iterate.
    pub converged: bool,
}

impl KeplerSolution {
    /// `E - e sin E - M`
    pub fn residual(&self, ma: f64, e: f64) -> f64 {
        kepler_residual(self.ea, ma, e)
    }
}

fn kepler_residual(ea: f64, ma: f64, e: f64) -> f64 {
    ea - e * libm::sin(ea) - ma
}

/// Wrap an angle into `[0, 2π)`.
pub fn principal_angle(a: f64) -> f64 {
    let r = a.rem_euclid(consts::TAU);
    // rem_euclid rounds tiny negative inputs up to exactly 2π
    if r >= consts::TAU {
        0.0
    } else {
        r
    }
}

/// Mean anomaly in `[0, 2π)` after `time` seconds on an orbit of the given
/// `period`, starting from mean anomaly `m0` at `time = 0`.
pub fn mean_anomaly(time: f64, period: f64, m0: f64) -> f64 {
    let phase = time.rem_euclid(period) / period;
    principal_angle(consts::TAU * phase + m0)
}

/// Solve Kepler's equation `M = E - e sin E` for the eccentric anomaly by
/// Newton-Raphson.
///
/// Never fails: when `maxiter` is exhausted the last iterate is returned
/// with `converged == false`.
///
/// Recommended: `tol = 1e-12`, `maxiter = 30`.
pub fn ma_to_ea(ma: f64, e: f64, tol: f64, maxiter: u64) -> KeplerSolution {
    debug_assert!((0.0..1.0).contains(&e));

    let mut ea = if e >= HIGH_ECCENTRICITY {
        consts::PI
    } else {
        ma
    };

    for iterations in 0..maxiter {
        let f = kepler_residual(ea, ma, e);
        if f.abs() < tol {
            trace!("ma_to_ea({ma}, {e}): converged after {iterations} steps");
            return KeplerSolution {
                ea,
                iterations,
                converged: true,
            };
        }
        ea -= f / (1.0 - e * libm::cos(ea));
    }

    let residual = kepler_residual(ea, ma, e);
    let converged = residual.abs() < tol;
    if !converged {
        warn!("ma_to_ea({ma}, {e}, {tol}, {maxiter}): failed to converge, residual={residual}");
    }
    KeplerSolution {
        ea,
        iterations: maxiter,
        converged,
    }
}

/// True anomaly from eccentric anomaly, by the half-angle relation
/// `tan(ν/2) = sqrt((1+e)/(1-e)) tan(E/2)`.
pub fn ea_to_ta(ea: f64, e: f64) -> f64 {
    2.0 * libm::atan2(
        libm::sqrt(1.0 + e) * libm::sin(ea / 2.0),
        libm::sqrt(1.0 - e) * libm::cos(ea / 2.0),
    )
}

pub fn ta_to_ea(ta: f64, e: f64) -> f64 {
    2.0 * libm::atan2(
        libm::sqrt(1.0 - e) * libm::sin(ta / 2.0),
        libm::sqrt(1.0 + e) * libm::cos(ta / 2.0),
    )
}

pub fn ea_to_ma(ea: f64, e: f64) -> f64 {
    ea - e * libm::sin(ea)
}

pub fn ma_to_ta(ma: f64, e: f64, tol: f64, maxiter: u64) -> f64 {
    ea_to_ta(ma_to_ea(ma, e, tol, maxiter).ea, e)
}

#[test]
fn residual_below_tolerance() {
    for ie in 0..100 {
        let e = ie as f64 * 0.01;
        for im in 0..64 {
            let ma = im as f64 * consts::TAU / 64.0;
            let sol = ma_to_ea(ma, e, DEFAULT_TOL, DEFAULT_MAXITER);
            assert!(sol.converged, "e={e}, M={ma}: {sol:?}");
            assert!(sol.residual(ma, e).abs() < 1e-9, "e={e}, M={ma}: {sol:?}");
        }
    }
}

#[test]
fn circular_orbit_anomalies_coincide() {
    let sol = ma_to_ea(1.234, 0.0, DEFAULT_TOL, DEFAULT_MAXITER);
    assert_eq!(sol.ea, 1.234);
    assert_eq!(sol.iterations, 0);
    approx::assert_abs_diff_eq!(ea_to_ta(1.234, 0.0), 1.234, epsilon = 1e-15);
}

#[test]
fn apsides_are_fixed_points() {
    for e in [0.1, 0.5, 0.9, 0.99] {
        approx::assert_abs_diff_eq!(ma_to_ta(0.0, e, DEFAULT_TOL, DEFAULT_MAXITER), 0.0, epsilon = 1e-8);
        approx::assert_abs_diff_eq!(
            ma_to_ta(consts::PI, e, DEFAULT_TOL, DEFAULT_MAXITER),
            consts::PI,
            epsilon = 1e-9
        );
    }
}

#[test]
fn true_anomaly_leads_mean_anomaly_after_periapsis() {
    let e = 0.3;
    let ma = 0.5;
    let ea = ma_to_ea(ma, e, DEFAULT_TOL, DEFAULT_MAXITER).ea;
    let ta = ea_to_ta(ea, e);
    assert!(ma < ea && ea < ta);
    approx::assert_abs_diff_eq!(ta_to_ea(ta, e), ea, epsilon = 1e-12);
    approx::assert_abs_diff_eq!(ea_to_ma(ea, e), ma, epsilon = 1e-11);
}

#[test]
fn capped_solve_returns_estimate() {
    let sol = ma_to_ea(0.1, 0.95, DEFAULT_TOL, 1);
    assert!(!sol.converged);
    assert_eq!(sol.iterations, 1);
    assert!(sol.ea.is_finite());
}

#[test]
fn mean_anomaly_wraps() {
    let period = 100.0;
    approx::assert_abs_diff_eq!(mean_anomaly(25.0, period, 0.0), consts::FRAC_PI_2, epsilon = 1e-15);
    approx::assert_abs_diff_eq!(mean_anomaly(-25.0, period, 0.0), 3.0 * consts::FRAC_PI_2, epsilon = 1e-14);
    approx::assert_abs_diff_eq!(mean_anomaly(325.0, period, 0.0), consts::FRAC_PI_2, epsilon = 1e-14);
    approx::assert_abs_diff_eq!(mean_anomaly(0.0, period, consts::PI), consts::PI, epsilon = 1e-15);
    assert_eq!(principal_angle(-1e-18), 0.0);
}
