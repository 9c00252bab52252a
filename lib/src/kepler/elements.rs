//! Keplerian orbital elements.

use std::f64::consts;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// The elements of a closed (elliptic) Keplerian orbit.
///
/// `b`, `p`, `ra` and `rp` are derived from `e` and `a` and stored
/// alongside them; every constructor and setter recomputes them, so they
/// are always consistent. The six shape fields come first and in this order
/// so the record can be shared with foreign callers.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ElementsRecord", into = "ElementsRecord")]
#[repr(C, align(8))]
pub struct KeplerianElements {
    /// Eccentricity (dimensionless).
    e: f64,
    /// Semi-major axis (m).
    a: f64,
    /// Semi-minor axis (m).
    b: f64,
    /// Semi-latus rectum (m).
    p: f64,
    /// Apoapsis radius (m).
    ra: f64,
    /// Periapsis radius (m).
    rp: f64,
    /// Inclination (radians).
    i: f64,
    /// Longitude of ascending node (radians).
    lan: f64,
    /// Argument of periapsis (radians).
    argpe: f64,
    /// Mean anomaly at `t = 0` (radians).
    m0: f64,
}

/// The free parameters of [`KeplerianElements`], used for (de)serialization.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
struct ElementsRecord {
    e: f64,
    a: f64,
    #[serde(default)]
    i: f64,
    #[serde(default)]
    lan: f64,
    #[serde(default)]
    argpe: f64,
    #[serde(default)]
    m0: f64,
}

impl TryFrom<ElementsRecord> for KeplerianElements {
    type Error = Error;

    fn try_from(r: ElementsRecord) -> Result<Self> {
        Ok(KeplerianElements::new(r.e, r.a)?
            .with_orientation(r.i, r.lan, r.argpe)
            .with_mean_anomaly_at_epoch(r.m0))
    }
}

impl From<KeplerianElements> for ElementsRecord {
    fn from(k: KeplerianElements) -> Self {
        ElementsRecord {
            e: k.e,
            a: k.a,
            i: k.i,
            lan: k.lan,
            argpe: k.argpe,
            m0: k.m0,
        }
    }
}

fn check_eccentricity(e: f64) -> Result<()> {
    if e.is_finite() && (0.0..1.0).contains(&e) {
        Ok(())
    } else {
        Err(Error::InvalidEccentricity(e))
    }
}

fn check_semi_major_axis(a: f64) -> Result<()> {
    if a.is_finite() && a > 0.0 {
        Ok(())
    } else {
        Err(Error::InvalidSemiMajorAxis(a))
    }
}

impl KeplerianElements {
    /// Coplanar, periapsis-aligned elements with eccentricity `e` and
    /// semi-major axis `a` (m).
    pub fn new(e: f64, a: f64) -> Result<Self> {
        check_eccentricity(e)?;
        check_semi_major_axis(a)?;
        let mut k = KeplerianElements {
            e,
            a,
            b: 0.0,
            p: 0.0,
            ra: 0.0,
            rp: 0.0,
            i: 0.0,
            lan: 0.0,
            argpe: 0.0,
            m0: 0.0,
        };
        k.update_derived();
        Ok(k)
    }

    /// Elements from periapsis and apoapsis radii (m).
    pub fn from_apsides(rp: f64, ra: f64) -> Result<Self> {
        let (rp, ra) = if rp <= ra { (rp, ra) } else { (ra, rp) };
        Self::new((ra - rp) / (ra + rp), (ra + rp) / 2.0)
    }

    #[must_use]
    pub fn with_orientation(mut self, i: f64, lan: f64, argpe: f64) -> Self {
        self.set_orientation(i, lan, argpe);
        self
    }

    #[must_use]
    pub fn with_mean_anomaly_at_epoch(mut self, m0: f64) -> Self {
        self.m0 = m0;
        self
    }

    fn update_derived(&mut self) {
        let one_minus_e2 = 1.0 - self.e * self.e;
        self.b = self.a * libm::sqrt(one_minus_e2);
        self.p = self.a * one_minus_e2;
        self.ra = self.a * (1.0 + self.e);
        self.rp = self.a * (1.0 - self.e);
    }

    pub fn set_eccentricity(&mut self, e: f64) -> Result<()> {
        check_eccentricity(e)?;
        self.e = e;
        self.update_derived();
        Ok(())
    }

    pub fn set_semi_major_axis(&mut self, a: f64) -> Result<()> {
        check_semi_major_axis(a)?;
        self.a = a;
        self.update_derived();
        Ok(())
    }

    pub fn set_orientation(&mut self, i: f64, lan: f64, argpe: f64) {
        self.i = i;
        self.lan = lan;
        self.argpe = argpe;
    }

    pub fn set_mean_anomaly_at_epoch(&mut self, m0: f64) {
        self.m0 = m0;
    }

    pub fn e(&self) -> f64 {
        self.e
    }

    pub fn a(&self) -> f64 {
        self.a
    }

    pub fn b(&self) -> f64 {
        self.b
    }

    pub fn p(&self) -> f64 {
        self.p
    }

    pub fn apoapsis_radius(&self) -> f64 {
        self.ra
    }

    pub fn periapsis_radius(&self) -> f64 {
        self.rp
    }

    pub fn i(&self) -> f64 {
        self.i
    }

    pub fn lan(&self) -> f64 {
        self.lan
    }

    pub fn argpe(&self) -> f64 {
        self.argpe
    }

    pub fn m0(&self) -> f64 {
        self.m0
    }

    /// Re-check the free parameters, for records that did not come through
    /// a constructor (e.g. from a foreign caller).
    pub fn validate(&self) -> Result<()> {
        check_eccentricity(self.e)?;
        check_semi_major_axis(self.a)
    }

    /// Whether the orbit lies in the reference plane with periapsis on +x.
    pub fn is_coplanar(&self) -> bool {
        self.i == 0.0 && self.lan == 0.0 && self.argpe == 0.0
    }

    /// Mean motion (rad/s) about a central body with gravitational
    /// parameter `mu` (`m^3/s^2`).
    pub fn mean_motion(&self, mu: f64) -> f64 {
        libm::sqrt(mu / (self.a * self.a * self.a))
    }

    /// Orbital period (s).
    pub fn period(&self, mu: f64) -> f64 {
        consts::TAU * libm::sqrt(self.a * self.a * self.a / mu)
    }

    /// Distance from the focus at true anomaly `ta`.
    pub fn radius_at_true_anomaly(&self, ta: f64) -> f64 {
        self.p / (1.0 + self.e * libm::cos(ta))
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    fn assert_derived_consistent(k: &KeplerianElements) {
        let (e, a) = (k.e(), k.a());
        assert_relative_eq!(k.b(), a * (1.0 - e * e).sqrt(), max_relative = 1e-15);
        assert_relative_eq!(k.p(), a * (1.0 - e * e), max_relative = 1e-15);
        assert_relative_eq!(k.apoapsis_radius(), a * (1.0 + e), max_relative = 1e-15);
        assert_relative_eq!(k.periapsis_radius(), a * (1.0 - e), max_relative = 1e-15);
    }

    #[test]
    fn derived_fields_on_construction() {
        let k = KeplerianElements::new(0.5, 2.0).unwrap();
        assert_eq!(k.p(), 1.5);
        assert_eq!(k.apoapsis_radius(), 3.0);
        assert_eq!(k.periapsis_radius(), 1.0);
        assert_derived_consistent(&k);
        assert!(k.is_coplanar());
    }

    #[test]
    fn derived_fields_follow_edits() {
        let mut k = KeplerianElements::new(0.1, 7.0e10).unwrap();
        k.set_eccentricity(0.6).unwrap();
        assert_derived_consistent(&k);
        k.set_semi_major_axis(1.0e11).unwrap();
        assert_derived_consistent(&k);
        assert_eq!(k.e(), 0.6);
        assert_eq!(k.a(), 1.0e11);
    }

    #[test]
    fn rejected_edits_leave_elements_untouched() {
        let mut k = KeplerianElements::new(0.2, 1.0).unwrap();
        let before = k;
        assert_eq!(k.set_eccentricity(1.0), Err(Error::InvalidEccentricity(1.0)));
        assert_eq!(k.set_semi_major_axis(-3.0), Err(Error::InvalidSemiMajorAxis(-3.0)));
        assert_eq!(k, before);
    }

    #[test]
    fn invalid_elements() {
        assert!(matches!(KeplerianElements::new(-0.1, 1.0), Err(Error::InvalidEccentricity(_))));
        assert!(matches!(KeplerianElements::new(f64::NAN, 1.0), Err(Error::InvalidEccentricity(_))));
        assert!(matches!(KeplerianElements::new(0.0, 0.0), Err(Error::InvalidSemiMajorAxis(_))));
        assert!(matches!(
            KeplerianElements::new(0.0, f64::INFINITY),
            Err(Error::InvalidSemiMajorAxis(_))
        ));
    }

    #[test]
    fn validate_catches_corrupted_records() {
        let mut k = KeplerianElements::new(0.3, 5.0).unwrap();
        assert_eq!(k.validate(), Ok(()));
        k.e = 1.2;
        assert_eq!(k.validate(), Err(Error::InvalidEccentricity(1.2)));
        k.e = 0.3;
        k.a = f64::NAN;
        assert!(matches!(k.validate(), Err(Error::InvalidSemiMajorAxis(_))));
    }

    #[test]
    fn from_apsides() {
        let k = KeplerianElements::from_apsides(1.0, 3.0).unwrap();
        assert_eq!(k.e(), 0.5);
        assert_eq!(k.a(), 2.0);
        assert_eq!(KeplerianElements::from_apsides(3.0, 1.0).unwrap(), k);
    }

    #[test]
    fn deserialization_recomputes_derived_fields() {
        let k: KeplerianElements = ron::from_str("(e: 0.5, a: 2.0, i: 0.1)").unwrap();
        assert_eq!(k.p(), 1.5);
        assert_eq!(k.i(), 0.1);
        assert_eq!(k.lan(), 0.0);
        assert_derived_consistent(&k);

        let text = ron::to_string(&k).unwrap();
        assert!(!text.contains("rp"));
        let back: KeplerianElements = ron::from_str(&text).unwrap();
        assert_eq!(back, k);

        assert!(ron::from_str::<KeplerianElements>("(e: 1.5, a: 2.0)").is_err());
    }

    #[test]
    fn period_and_radius() {
        let k = KeplerianElements::new(0.0, 1.0).unwrap();
        assert_relative_eq!(k.period(1.0), std::f64::consts::TAU);
        assert_relative_eq!(k.mean_motion(1.0), 1.0);
        let k = KeplerianElements::new(0.5, 2.0).unwrap();
        assert_relative_eq!(k.radius_at_true_anomaly(0.0), 1.0);
        assert_relative_eq!(k.radius_at_true_anomaly(std::f64::consts::PI), 3.0);
    }
}
