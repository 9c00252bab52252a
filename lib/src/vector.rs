//! Vector algebra over 3-component vectors.
//!
//! Every operation is written once against the [`Triplet`] trait and so
//! works the same on a loose `[f64; 3]` and on the packed [`Vec3`] record.
//! Results are returned by value, which makes it always safe to store a
//! result over one of its operands.

use std::{fmt, ops};

use nalgebra::{Vector2, Vector3};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};

/// A 3-vector with a fixed, byte-stable layout: three contiguous `f64`s,
/// 8-byte aligned, no padding.
#[derive(Copy, Clone, Default, PartialEq, Serialize, Deserialize)]
#[repr(C, align(8))]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

const _: () = assert!(std::mem::size_of::<Vec3>() == 24);
const _: () = assert!(std::mem::align_of::<Vec3>() == 8);

impl Vec3 {
    pub const ZERO: Vec3 = Vec3::new(0.0, 0.0, 0.0);

    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn to_array(self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }
}

/// Anything that can be viewed as three `f64` components.
pub trait Triplet: Copy {
    fn to_vector(&self) -> Vector3<f64>;

    fn from_vector(v: Vector3<f64>) -> Self;

    /// Projection onto the xy plane.
    fn xy(&self) -> [f64; 2] {
        let v = self.to_vector();
        [v[0], v[1]]
    }
}

impl Triplet for [f64; 3] {
    fn to_vector(&self) -> Vector3<f64> {
        Vector3::new(self[0], self[1], self[2])
    }

    fn from_vector(v: Vector3<f64>) -> Self {
        [v[0], v[1], v[2]]
    }
}

impl Triplet for Vec3 {
    fn to_vector(&self) -> Vector3<f64> {
        Vector3::new(self.x, self.y, self.z)
    }

    fn from_vector(v: Vector3<f64>) -> Self {
        Vec3::new(v[0], v[1], v[2])
    }
}

impl Triplet for Vector3<f64> {
    fn to_vector(&self) -> Vector3<f64> {
        *self
    }

    fn from_vector(v: Vector3<f64>) -> Self {
        v
    }
}

/// Euclidean distance between two points.
pub fn distance<V: Triplet>(a: &V, b: &V) -> f64 {
    (a.to_vector() - b.to_vector()).norm()
}

pub fn add<V: Triplet>(a: &V, b: &V) -> V {
    V::from_vector(a.to_vector() + b.to_vector())
}

pub fn sub<V: Triplet>(a: &V, b: &V) -> V {
    V::from_vector(a.to_vector() - b.to_vector())
}

pub fn scale<V: Triplet>(scalar: f64, v: &V) -> V {
    V::from_vector(v.to_vector() * scalar)
}

/// Componentwise `v / scalar`. A zero divisor gives IEEE-754 infinities or
/// NaNs.
pub fn divide_by_scalar<V: Triplet>(scalar: f64, v: &V) -> V {
    V::from_vector(v.to_vector() / scalar)
}

pub fn dot<V: Triplet>(a: &V, b: &V) -> f64 {
    a.to_vector().dot(&b.to_vector())
}

/// Right-handed cross product.
pub fn cross<V: Triplet>(a: &V, b: &V) -> V {
    let a = a.to_vector();
    let b = b.to_vector();
    V::from_vector(a.cross(&b))
}

pub fn norm<V: Triplet>(a: &V) -> f64 {
    a.to_vector().norm()
}

/// Unit vector along `a`, or the zero vector when `|a| == 0`.
pub fn normalize<V: Triplet>(a: &V) -> V {
    try_normalize(a).unwrap_or_else(|_| {
        debug!("normalize: zero-length vector, returning zero");
        V::from_vector(Vector3::zeros())
    })
}

pub fn try_normalize<V: Triplet>(a: &V) -> Result<V> {
    a.to_vector()
        .try_normalize(0.0)
        .map(V::from_vector)
        .ok_or(Error::ZeroLengthVector)
}

/// Linear interpolation from `a` (`t = 0`) to `b` (`t = 1`). `t` is not
/// clamped.
pub fn lerp<V: Triplet>(a: &V, b: &V, t: f64) -> V {
    // (1 - t)a + tb hits both endpoints exactly, a + t(b - a) does not.
    V::from_vector(a.to_vector() * (1.0 - t) + b.to_vector() * t)
}

pub fn norm2(a: &[f64; 2]) -> f64 {
    Vector2::new(a[0], a[1]).norm()
}

/// Unit 2-vector along `a`, or zero when `|a| == 0`.
pub fn normalize2(a: &[f64; 2]) -> [f64; 2] {
    try_normalize2(a).unwrap_or_else(|_| {
        debug!("normalize2: zero-length vector, returning zero");
        [0.0, 0.0]
    })
}

pub fn try_normalize2(a: &[f64; 2]) -> Result<[f64; 2]> {
    let v = Vector2::new(a[0], a[1])
        .try_normalize(0.0)
        .ok_or(Error::ZeroLengthVector)?;
    Ok([v[0], v[1]])
}

impl From<[f64; 3]> for Vec3 {
    fn from(v: [f64; 3]) -> Self {
        Vec3::new(v[0], v[1], v[2])
    }
}

impl From<Vec3> for [f64; 3] {
    fn from(v: Vec3) -> Self {
        v.to_array()
    }
}

impl From<Vector3<f64>> for Vec3 {
    fn from(v: Vector3<f64>) -> Self {
        Vec3::from_vector(v)
    }
}

impl From<Vec3> for Vector3<f64> {
    fn from(v: Vec3) -> Self {
        v.to_vector()
    }
}

impl ops::Add for Vec3 {
    type Output = Vec3;

    fn add(self, rhs: Vec3) -> Self::Output {
        add(&self, &rhs)
    }
}

impl ops::Sub for Vec3 {
    type Output = Vec3;

    fn sub(self, rhs: Vec3) -> Self::Output {
        sub(&self, &rhs)
    }
}

impl ops::Neg for Vec3 {
    type Output = Vec3;

    fn neg(self) -> Self::Output {
        scale(-1.0, &self)
    }
}

impl ops::Mul<f64> for Vec3 {
    type Output = Vec3;

    fn mul(self, rhs: f64) -> Self::Output {
        scale(rhs, &self)
    }
}

impl ops::Mul<Vec3> for f64 {
    type Output = Vec3;

    fn mul(self, rhs: Vec3) -> Self::Output {
        scale(self, &rhs)
    }
}

impl ops::Div<f64> for Vec3 {
    type Output = Vec3;

    fn div(self, rhs: f64) -> Self::Output {
        divide_by_scalar(rhs, &self)
    }
}

impl ops::AddAssign for Vec3 {
    fn add_assign(&mut self, rhs: Vec3) {
        *self = add(self, &rhs);
    }
}

impl ops::SubAssign for Vec3 {
    fn sub_assign(&mut self, rhs: Vec3) {
        *self = sub(self, &rhs);
    }
}

impl fmt::Display for Vec3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

impl fmt::Debug for Vec3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Vec3{self}")
    }
}
