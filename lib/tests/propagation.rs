use approx::{assert_abs_diff_eq, assert_relative_eq};
use keplerpos::{
    bodies::{Body, BodyId, ElementsTable},
    constants::{GM_SUN, M_AU, M_TAU},
    ffi,
    kepler::{compute_position, KeplerianElements, Propagator},
    vector::{self, Vec3},
    Error,
};
use rand::{rngs::StdRng, Rng, SeedableRng};

fn random_elements(rng: &mut StdRng) -> KeplerianElements {
    let e = rng.gen_range(0.0..0.97);
    let a = rng.gen_range(0.2..40.0) * M_AU;
    KeplerianElements::new(e, a)
        .unwrap()
        .with_orientation(
            rng.gen_range(0.0..std::f64::consts::PI),
            rng.gen_range(0.0..M_TAU),
            rng.gen_range(0.0..M_TAU),
        )
        .with_mean_anomaly_at_epoch(rng.gen_range(0.0..M_TAU))
}

#[test]
fn radius_stays_between_apsides() {
    let mut rng = StdRng::seed_from_u64(7);
    let prop = Propagator::default();
    for _ in 0..500 {
        let k = random_elements(&mut rng);
        let t = rng.gen_range(-1.0e10..1.0e10);
        let state = prop.compute_state(&k, t);
        assert!(state.converged, "{k:?} at {t}");
        let r = vector::norm(&state.position);
        let slack = 1e-9 * k.a();
        assert!(r >= k.periapsis_radius() - slack, "{r} < rp for {k:?}");
        assert!(r <= k.apoapsis_radius() + slack, "{r} > ra for {k:?}");
        assert_relative_eq!(r, state.r, max_relative = 1e-12);
    }
}

#[test]
fn converged_solves_satisfy_keplers_equation() {
    let mut rng = StdRng::seed_from_u64(11);
    let prop = Propagator::default();
    for _ in 0..500 {
        let k = random_elements(&mut rng);
        let state = prop.compute_state(&k, rng.gen_range(0.0..1.0e9));
        assert!(state.converged);
        let residual = state.ea - k.e() * state.ea.sin() - state.ma;
        assert!(residual.abs() < 1e-9, "residual {residual} for {k:?}");
    }
}

#[test]
fn positions_repeat_every_period() {
    let mut rng = StdRng::seed_from_u64(23);
    for _ in 0..100 {
        let k = random_elements(&mut rng);
        let period = k.period(GM_SUN);
        let t = rng.gen_range(0.0..period);
        let p0 = compute_position(&k, t);
        let p1 = compute_position(&k, t + period);
        assert!(
            vector::distance(&p0, &p1) < 1e-6 * k.a(),
            "{p0} vs {p1} for {k:?}"
        );
    }
}

#[test]
fn circular_unit_orbit_quarter_period() {
    let k = KeplerianElements::new(0.0, 1.0).unwrap();
    let prop = Propagator::new(1.0);
    let pos = prop.compute_position(&k, k.period(1.0) / 4.0);
    assert_abs_diff_eq!(pos.x, 0.0, epsilon = 1e-12);
    assert_abs_diff_eq!(pos.y, 1.0, epsilon = 1e-12);
    assert_eq!(pos.z, 0.0);
}

#[test]
fn pretty_ron_table_round_trip() {
    let table = ElementsTable::solar_system();
    let text = ron::ser::to_string_pretty(&table, ron::ser::PrettyConfig::default()).unwrap();
    let back: ElementsTable = ron::from_str(&text).unwrap();
    assert_eq!(back, table);
    for id in BodyId::ALL {
        let t = 3.0e8;
        assert_eq!(
            back.position(id, t, &back.propagator()),
            table.position(id, t, &table.propagator())
        );
    }
}

#[test]
fn edited_table_keeps_derived_fields() {
    let mut bodies: Vec<Body> = ElementsTable::solar_system().into();
    let mars = bodies[BodyId::Mars.index()].elements.as_mut().unwrap();
    mars.set_eccentricity(0.5).unwrap();
    assert_eq!(mars.set_semi_major_axis(-1.0), Err(Error::InvalidSemiMajorAxis(-1.0)));
    let a = mars.a();
    assert_relative_eq!(mars.periapsis_radius(), 0.5 * a);
    assert_relative_eq!(mars.apoapsis_radius(), 1.5 * a);
    assert_relative_eq!(mars.b(), a * 0.75f64.sqrt());

    let table = ElementsTable::try_from(bodies).unwrap();
    assert_eq!(table.elements(BodyId::Mars).unwrap().e(), 0.5);
}

#[test]
fn c_abi_agrees_with_library() {
    let mut rng = StdRng::seed_from_u64(31);
    for _ in 0..100 {
        let a: [f64; 3] = rng.gen();
        let b: [f64; 3] = rng.gen();
        let (pa, pb) = (Vec3::from(a), Vec3::from(b));
        let mut loose = [0.0; 3];
        let mut packed = Vec3::ZERO;
        unsafe {
            assert_eq!(ffi::dist33(a.as_ptr(), b.as_ptr()), vector::distance(&a, &b));
            ffi::cross33(loose.as_mut_ptr(), a.as_ptr(), b.as_ptr());
            ffi::vcross33(&mut packed, &pa, &pb);
        }
        assert_eq!(loose, vector::cross(&a, &b));
        assert_eq!(packed.to_array(), loose);
    }

    let k = ElementsTable::solar_system();
    let k = *k.elements(BodyId::Jupiter).unwrap();
    let mut pos = Vec3::ZERO;
    assert!(unsafe { ffi::k_pos(&mut pos, &k, 2.0e8) });
    assert_eq!(pos, compute_position(&k, 2.0e8));
}
