//! C ABI over the vector library, the propagator, the element table, the
//! simulation clock and the scratch slots.
//!
//! Loose vectors are pointers to three contiguous `f64`s, packed vectors are
//! pointers to [`Vec3`]. Every pointer must be non-null (checked) and valid
//! for the access. Result pointers may alias operand pointers: operands are
//! read before the result is written.
//!
//! Fallible functions return `false` (or null) and leave a message for
//! [`kp_take_error`].
#![allow(clippy::missing_safety_doc)]

use std::{ptr, sync::LazyLock};

use parking_lot::Mutex;
use tracing::info;

use crate::{
    bodies::{BodyId, ElementsTable},
    kepler::KeplerianElements,
    scratch::ScratchBuffers,
    time::Chrono,
    vector::{self, Vec3},
};

static ERROR: LazyLock<Mutex<Option<String>>> = LazyLock::new(|| Mutex::new(None));
pub static TABLE: LazyLock<ElementsTable> = LazyLock::new(ElementsTable::solar_system);
pub static CHRONO: LazyLock<Chrono> = LazyLock::new(Chrono::default);
pub static SCRATCH: LazyLock<Mutex<ScratchBuffers>> =
    LazyLock::new(|| Mutex::new(ScratchBuffers::new()));

pub fn replace_error(s: String) {
    ERROR.lock().replace(s);
}

macro_rules! ffi {
    (#[fallible($default:expr)] fn $name:ident($($arg:ident : $ty:ty),*) -> $ret:ty { $($tt:tt)* }) => {
        #[no_mangle]
        pub unsafe extern "C" fn $name($($arg: $ty),*) -> $ret {
            unsafe fn inner($($arg: $ty),*) -> $crate::error::Result<$ret> {
                $($tt)*
            }
            match inner($($arg),*) {
                Err(e) => {
                    replace_error(e.to_string());
                    $default
                }
                Ok(v) => v,
            }
        }
    };
    ($(#[$meta:meta])* fn $name:ident($($arg:ident : $ty:ty),*) $(-> $ret:ty)? { $($tt:tt)* }) => {
        $(#[$meta])*
        #[no_mangle]
        pub unsafe extern "C" fn $name($($arg: $ty),*) $(-> $ret)? {
            $($tt)*
        }
    };
}

unsafe fn load3(p: *const f64) -> [f64; 3] {
    assert!(!p.is_null());
    [*p, *p.add(1), *p.add(2)]
}

unsafe fn store3(p: *mut f64, v: [f64; 3]) {
    assert!(!p.is_null());
    *p = v[0];
    *p.add(1) = v[1];
    *p.add(2) = v[2];
}

unsafe fn load2(p: *const f64) -> [f64; 2] {
    assert!(!p.is_null());
    [*p, *p.add(1)]
}

unsafe fn load(p: *const Vec3) -> Vec3 {
    assert!(!p.is_null());
    *p
}

unsafe fn store(p: *mut Vec3, v: Vec3) {
    assert!(!p.is_null());
    *p = v;
}

ffi! {
    fn dist33(a: *const f64, b: *const f64) -> f64 {
        vector::distance(&load3(a), &load3(b))
    }
}

ffi! {
    fn add33(res: *mut f64, a: *const f64, b: *const f64) {
        store3(res, vector::add(&load3(a), &load3(b)));
    }
}

ffi! {
    fn sub33(res: *mut f64, a: *const f64, b: *const f64) {
        store3(res, vector::sub(&load3(a), &load3(b)));
    }
}

ffi! {
    fn muls3(res: *mut f64, a: f64, b: *const f64) {
        store3(res, vector::scale(a, &load3(b)));
    }
}

ffi! {
    fn divs3(res: *mut f64, a: f64, b: *const f64) {
        store3(res, vector::divide_by_scalar(a, &load3(b)));
    }
}

ffi! {
    /// Writes the dot product into all three components of `res`.
    fn dot33(res: *mut f64, a: *const f64, b: *const f64) {
        let d = vector::dot(&load3(a), &load3(b));
        store3(res, [d; 3]);
    }
}

ffi! {
    fn cross33(res: *mut f64, a: *const f64, b: *const f64) {
        store3(res, vector::cross(&load3(a), &load3(b)));
    }
}

ffi! {
    /// Magnitude of the 2-vector `a`. `_b` is ignored.
    fn norm2(a: *const f64, _b: *const f64) -> f64 {
        vector::norm2(&load2(a))
    }
}

ffi! {
    fn normalize2(a: *mut f64) {
        let [x, y] = vector::normalize2(&load2(a));
        *a = x;
        *a.add(1) = y;
    }
}

ffi! {
    /// Magnitude of `a`. `_b` is ignored.
    fn norm3(a: *const f64, _b: *const f64) -> f64 {
        vector::norm(&load3(a))
    }
}

ffi! {
    fn normalize3(a: *mut f64) {
        store3(a, vector::normalize(&load3(a)));
    }
}

ffi! {
    fn lerp33s(res: *mut f64, a: *const f64, b: *const f64, t: f64) {
        store3(res, vector::lerp(&load3(a), &load3(b), t));
    }
}

ffi! {
    /// Distance between `a` and `b`. `_res` is ignored.
    fn vdist33(_res: *mut Vec3, a: *const Vec3, b: *const Vec3) -> f64 {
        vector::distance(&load(a), &load(b))
    }
}

ffi! {
    fn vadd33(res: *mut Vec3, a: *const Vec3, b: *const Vec3) {
        store(res, vector::add(&load(a), &load(b)));
    }
}

ffi! {
    fn vsub33(res: *mut Vec3, a: *const Vec3, b: *const Vec3) {
        store(res, vector::sub(&load(a), &load(b)));
    }
}

ffi! {
    fn vmuls3(res: *mut Vec3, a: f64, b: *const Vec3) {
        store(res, vector::scale(a, &load(b)));
    }
}

ffi! {
    fn vdivs3(res: *mut Vec3, a: f64, b: *const Vec3) {
        store(res, vector::divide_by_scalar(a, &load(b)));
    }
}

ffi! {
    /// Writes the dot product into all three components of `res`.
    fn vdot33(res: *mut Vec3, a: *const Vec3, b: *const Vec3) {
        let d = vector::dot(&load(a), &load(b));
        store(res, Vec3::new(d, d, d));
    }
}

ffi! {
    fn vcross33(res: *mut Vec3, a: *const Vec3, b: *const Vec3) {
        store(res, vector::cross(&load(a), &load(b)));
    }
}

ffi! {
    /// Magnitude of `a`. `_b` is ignored.
    fn vnorm3(a: *const Vec3, _b: *const Vec3) -> f64 {
        vector::norm(&load(a))
    }
}

ffi! {
    fn vnormalize3(a: *mut Vec3) {
        store(a, vector::normalize(&load(a)));
    }
}

ffi! {
    fn vlerp33s(res: *mut Vec3, a: *const Vec3, b: *const Vec3, t: f64) {
        store(res, vector::lerp(&load(a), &load(b), t));
    }
}

ffi! {
    #[fallible(false)]
    fn k_pos(res: *mut Vec3, k: *const KeplerianElements, t: f64) -> bool {
        assert!(!k.is_null());
        let k = &*k;
        k.validate()?;
        store(res, TABLE.propagator().compute_position(k, t));
        Ok(true)
    }
}

ffi! {
    #[fallible(false)]
    fn kp_body_position(res: *mut Vec3, index: u8, t: f64) -> bool {
        let id = BodyId::from_raw(index)?;
        store(res, TABLE.position(id, t, &TABLE.propagator()));
        Ok(true)
    }
}

ffi! {
    #[fallible(ptr::null())]
    fn kp_body_elements(index: u8) -> *const KeplerianElements {
        let id = BodyId::from_raw(index)?;
        TABLE.elements(id).map(ptr::from_ref)
    }
}

ffi! {
    fn kp_chrono_current() -> f64 {
        CHRONO.current()
    }
}

ffi! {
    #[fallible(false)]
    fn kp_chrono_set(t: f64) -> bool {
        CHRONO.set(t)?;
        Ok(true)
    }
}

ffi! {
    #[fallible(false)]
    fn kp_saved_f64_get(index: usize, out: *mut f64) -> bool {
        assert!(!out.is_null());
        *out = SCRATCH.lock().f64(index)?;
        Ok(true)
    }
}

ffi! {
    #[fallible(false)]
    fn kp_saved_f64_set(index: usize, value: f64) -> bool {
        SCRATCH.lock().set_f64(index, value)?;
        Ok(true)
    }
}

ffi! {
    #[fallible(false)]
    fn kp_saved_i64_get(index: usize, out: *mut i64) -> bool {
        assert!(!out.is_null());
        *out = SCRATCH.lock().i64(index)?;
        Ok(true)
    }
}

ffi! {
    #[fallible(false)]
    fn kp_saved_i64_set(index: usize, value: i64) -> bool {
        SCRATCH.lock().set_i64(index, value)?;
        Ok(true)
    }
}

ffi! {
    /// Forward a guest diagnostic message to the log.
    fn kp_debuglog(buf: *const u8, len: usize) {
        assert!(!buf.is_null());
        let msg = std::slice::from_raw_parts(buf, len);
        info!(target: "keplerpos::guest", "{}", String::from_utf8_lossy(msg));
    }
}

ffi! {
    /// Copy the last error message (not NUL-terminated) into `buf` and
    /// return the number of bytes copied. The message is cleared only when
    /// it fit entirely; a short `buf` gets a prefix and the message stays
    /// for a retry. With a null `buf`, return the message length.
    fn kp_take_error(buf: *mut u8, len: usize) -> usize {
        let mut error = ERROR.lock();
        let Some(message) = error.as_ref() else {
            return 0;
        };
        if buf.is_null() {
            return message.len();
        }
        let n = message.len().min(len);
        ptr::copy_nonoverlapping(message.as_ptr(), buf, n);
        if n == message.len() {
            *error = None;
        }
        n
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::{bodies::KE_VENUS, kepler::compute_position};

    #[test]
    fn loose_ops_allow_aliasing() {
        let mut a = [1.0, 2.0, 3.0];
        let b = [4.0, 5.0, 6.0];
        unsafe {
            add33(a.as_mut_ptr(), a.as_ptr(), b.as_ptr());
            assert_eq!(a, [5.0, 7.0, 9.0]);

            let mut x = [1.0, 0.0, 0.0];
            let y = [0.0, 1.0, 0.0];
            cross33(x.as_mut_ptr(), x.as_ptr(), y.as_ptr());
            assert_eq!(x, [0.0, 0.0, 1.0]);

            let mut d = [0.0; 3];
            dot33(d.as_mut_ptr(), b.as_ptr(), b.as_ptr());
            assert_eq!(d, [77.0; 3]);

            assert_relative_eq!(norm3(b.as_ptr(), ptr::null()), 77f64.sqrt());
            let mut v = [3.0, 4.0];
            assert_eq!(norm2(v.as_ptr(), ptr::null()), 5.0);
            normalize2(v.as_mut_ptr());
            assert_relative_eq!(v[0], 0.6);
            assert_relative_eq!(v[1], 0.8);
        }
    }

    #[test]
    fn packed_ops_match_loose_ops() {
        let a = Vec3::new(0.5, -1.0, 2.0);
        let b = Vec3::new(3.0, 0.25, -4.0);
        let (la, lb) = (a.to_array(), b.to_array());
        let mut res = Vec3::ZERO;
        let mut lres = [0.0; 3];
        unsafe {
            vsub33(&mut res, &a, &b);
            sub33(lres.as_mut_ptr(), la.as_ptr(), lb.as_ptr());
            assert_eq!(res.to_array(), lres);

            vlerp33s(&mut res, &a, &b, 0.75);
            lerp33s(lres.as_mut_ptr(), la.as_ptr(), lb.as_ptr(), 0.75);
            assert_eq!(res.to_array(), lres);

            vmuls3(&mut res, 2.0, &a);
            assert_eq!(res, Vec3::new(1.0, -2.0, 4.0));
            let p: *mut Vec3 = &mut res;
            vdivs3(p, 2.0, p);
            assert_eq!(res, a);

            assert_eq!(
                vdist33(ptr::null_mut(), &a, &b),
                dist33(la.as_ptr(), lb.as_ptr())
            );
            assert_eq!(vnorm3(&a, ptr::null()), norm3(la.as_ptr(), ptr::null()));
        }
    }

    #[test]
    fn k_pos_matches_propagator() {
        let k = TABLE.elements(BodyId::Venus).unwrap();
        let mut res = Vec3::ZERO;
        assert!(unsafe { k_pos(&mut res, k, 1.0e7) });
        assert_eq!(res, compute_position(k, 1.0e7));

        let mut by_index = Vec3::ZERO;
        assert!(unsafe { kp_body_position(&mut by_index, KE_VENUS as u8, 1.0e7) });
        assert_eq!(by_index, res);
        assert!(!unsafe { kp_body_elements(KE_VENUS as u8) }.is_null());
    }

    #[test]
    fn scratch_slots() {
        let mut out = 0.0;
        let mut iout = 0;
        unsafe {
            assert!(kp_saved_f64_set(3, 1.25));
            assert!(kp_saved_f64_get(3, &mut out));
            assert!(kp_saved_i64_set(2, -9));
            assert!(kp_saved_i64_get(2, &mut iout));
        }
        assert_eq!(out, 1.25);
        assert_eq!(iout, -9);
    }

    #[test]
    fn chrono_round_trip() {
        unsafe {
            for t in [42.5, 1e-10, -3.0e-300, 1.0e19, f64::MAX] {
                assert!(kp_chrono_set(t));
                assert_eq!(kp_chrono_current(), t);
            }
        }
    }

    // Every failing call lives in this one test so that no other test
    // overwrites the shared error slot in between.
    #[test]
    fn errors_are_reported() {
        let mut buf = [0u8; 128];
        let mut out = 0.0;
        unsafe {
            assert!(!kp_body_position(&mut Vec3::ZERO, 200, 0.0));
            let n = kp_take_error(buf.as_mut_ptr(), buf.len());
            assert_eq!(std::str::from_utf8(&buf[..n]).unwrap(), "Unknown body id: 200");
            assert_eq!(kp_take_error(buf.as_mut_ptr(), buf.len()), 0);

            assert!(kp_body_elements(0).is_null());
            assert!(kp_take_error(ptr::null_mut(), 0) > 0);
            assert!(kp_take_error(buf.as_mut_ptr(), buf.len()) > 0);

            assert!(!kp_saved_f64_get(128, &mut out));
            let n = kp_take_error(buf.as_mut_ptr(), buf.len());
            assert!(std::str::from_utf8(&buf[..n]).unwrap().contains("128"));

            assert!(!kp_saved_i64_set(16, 0));
            let full = kp_take_error(ptr::null_mut(), 0);
            assert_eq!(kp_take_error(buf.as_mut_ptr(), 5), 5);
            assert_eq!(&buf[..5], b"Index");
            assert_eq!(kp_take_error(buf.as_mut_ptr(), buf.len()), full);
            assert_eq!(kp_take_error(buf.as_mut_ptr(), buf.len()), 0);

            assert!(!kp_chrono_set(f64::NAN));
            assert!(!kp_chrono_set(f64::NEG_INFINITY));
            assert!(kp_chrono_current().is_finite());
            let n = kp_take_error(buf.as_mut_ptr(), buf.len());
            assert!(std::str::from_utf8(&buf[..n]).unwrap().starts_with("Time must be"));

            let mut hyperbolic = *TABLE.elements(BodyId::Mars).unwrap();
            ptr::from_mut(&mut hyperbolic).cast::<f64>().write(1.5);
            let mut res = Vec3::new(7.0, 7.0, 7.0);
            assert!(!k_pos(&mut res, &hyperbolic, 1.0e6));
            assert_eq!(res, Vec3::new(7.0, 7.0, 7.0));
            let n = kp_take_error(buf.as_mut_ptr(), buf.len());
            assert!(std::str::from_utf8(&buf[..n]).unwrap().contains("1.5"));
        }
    }
}
