//! Position of a body on its Keplerian orbit at a given time.

use nalgebra::{Matrix3, Vector3};
use serde::{Deserialize, Serialize};

use super::{
    anomaly::{ea_to_ta, ma_to_ea, mean_anomaly, DEFAULT_MAXITER, DEFAULT_TOL},
    elements::KeplerianElements,
};
use crate::{
    constants::GM_SUN,
    error::{Error, Result},
    vector::Vec3,
};

/// Settings for propagating elements to a position.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Propagator {
    /// Gravitational parameter of the central body (`m^3/s^2`).
    pub mu: f64,
    /// Tolerance on the Kepler equation residual.
    pub tol: f64,
    /// Iteration cap for the Kepler solver.
    pub max_iter: u64,
}

impl Default for Propagator {
    fn default() -> Self {
        Self {
            mu: GM_SUN,
            tol: DEFAULT_TOL,
            max_iter: DEFAULT_MAXITER,
        }
    }
}

/// Everything computed on the way from a time to a position.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct OrbitState {
    /// Mean anomaly (radians, `[0, 2π)`).
    pub ma: f64,
    /// Eccentric anomaly (radians).
    pub ea: f64,
    /// True anomaly (radians).
    pub ta: f64,
    /// Distance from the focus (m).
    pub r: f64,
    /// Position in the perifocal frame PQW.
    pub perifocal: Vec3,
    /// Position in the reference frame.
    pub position: Vec3,
    pub iterations: u64,
    pub converged: bool,
}

/// A gravitational parameter must be finite and positive.
pub fn check_gravitational_parameter(mu: f64) -> Result<()> {
    if mu.is_finite() && mu > 0.0 {
        Ok(())
    } else {
        Err(Error::InvalidGravitationalParameter(mu))
    }
}

impl Propagator {
    pub fn new(mu: f64) -> Self {
        Self {
            mu,
            ..Self::default()
        }
    }

    /// Reject settings that can only produce NaN positions.
    pub fn validate(&self) -> Result<()> {
        check_gravitational_parameter(self.mu)
    }

    /// Position of a body with elements `k` at `time` seconds after its
    /// epoch.
    pub fn compute_position(&self, k: &KeplerianElements, time: f64) -> Vec3 {
        self.compute_state(k, time).position
    }

    pub fn compute_state(&self, k: &KeplerianElements, time: f64) -> OrbitState {
        let e = k.e();
        let ma = mean_anomaly(time, k.period(self.mu), k.m0());
        let sol = ma_to_ea(ma, e, self.tol, self.max_iter);
        let ta = ea_to_ta(sol.ea, e);
        let r = k.a() * (1.0 - e * libm::cos(sol.ea));

        let rv = Vector3::new(r * libm::cos(ta), r * libm::sin(ta), 0.0);
        let position = pqw_ijk_matrix(k) * rv;

        OrbitState {
            ma,
            ea: sol.ea,
            ta,
            r,
            perifocal: rv.into(),
            position: position.into(),
            iterations: sol.iterations,
            converged: sol.converged,
        }
    }
}

/// [`Propagator::compute_position`] with the default settings (heliocentric,
/// `tol = 1e-12`, 30 iterations).
pub fn compute_position(k: &KeplerianElements, time: f64) -> Vec3 {
    Propagator::default().compute_position(k, time)
}

/// Rotation from the perifocal frame PQW to the reference frame,
/// `R_z(lan) R_x(i) R_z(argpe)`. The identity for coplanar elements.
pub fn pqw_ijk_matrix(k: &KeplerianElements) -> Matrix3<f64> {
    let (sin_lan, cos_lan) = (libm::sin(k.lan()), libm::cos(k.lan()));
    let (sin_argpe, cos_argpe) = (libm::sin(k.argpe()), libm::cos(k.argpe()));
    let (sin_i, cos_i) = (libm::sin(k.i()), libm::cos(k.i()));

    let m11 = cos_lan * cos_argpe - sin_lan * sin_argpe * cos_i;
    let m12 = -cos_lan * sin_argpe - sin_lan * cos_argpe * cos_i;
    let m13 = sin_lan * sin_i;
    let m21 = sin_lan * cos_argpe + cos_lan * sin_argpe * cos_i;
    let m22 = -sin_lan * sin_argpe + cos_lan * cos_argpe * cos_i;
    let m23 = -cos_lan * sin_i;
    let m31 = sin_argpe * sin_i;
    let m32 = cos_argpe * sin_i;
    let m33 = cos_i;

    Matrix3::new(m11, m12, m13, m21, m22, m23, m31, m32, m33)
}
