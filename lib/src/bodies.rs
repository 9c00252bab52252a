//! Definitions of celestial bodies and the table of their elements.

use std::{fmt, sync::Arc};

use num_enum::{IntoPrimitive, TryFromPrimitive};
use serde::{Deserialize, Serialize};

use crate::{
    constants::{DEG_TO_RAD, GM_SUN, M_AU},
    error::{Error, Result},
    kepler::{check_gravitational_parameter, KeplerianElements, Propagator},
    vector::Vec3,
};

pub const KE_SUN: usize = 0;
pub const KE_MERCURY: usize = 1;
pub const KE_VENUS: usize = 2;
pub const KE_EARTH_MOON_BARYCENTER: usize = 3;
pub const KE_MARS: usize = 4;
pub const KE_JUPITER: usize = 5;
pub const KE_SATURN: usize = 6;
pub const KE_URANUS: usize = 7;
pub const KE_NEPTUNE: usize = 8;

/// Number of slots in an [`ElementsTable`].
pub const TABLE_CAPACITY: usize = 9;

/// Index of a body in the [`ElementsTable`].
#[derive(
    Copy,
    Clone,
    Debug,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    IntoPrimitive,
    TryFromPrimitive,
)]
#[repr(u8)]
pub enum BodyId {
    Sun = 0,
    Mercury = 1,
    Venus = 2,
    EarthMoonBarycenter = 3,
    Mars = 4,
    Jupiter = 5,
    Saturn = 6,
    Uranus = 7,
    Neptune = 8,
}

impl BodyId {
    pub const ALL: [BodyId; TABLE_CAPACITY] = [
        BodyId::Sun,
        BodyId::Mercury,
        BodyId::Venus,
        BodyId::EarthMoonBarycenter,
        BodyId::Mars,
        BodyId::Jupiter,
        BodyId::Saturn,
        BodyId::Uranus,
        BodyId::Neptune,
    ];

    pub fn index(self) -> usize {
        u8::from(self) as usize
    }

    pub fn from_raw(raw: u8) -> Result<Self> {
        BodyId::try_from(raw).map_err(|e| Error::UnknownBody(e.number))
    }

    pub fn from_index(index: usize) -> Result<Self> {
        BodyId::ALL
            .get(index)
            .copied()
            .ok_or(Error::IndexOutOfRange {
                index,
                len: TABLE_CAPACITY,
            })
    }

    pub fn name(self) -> &'static str {
        match self {
            BodyId::Sun => "Sun",
            BodyId::Mercury => "Mercury",
            BodyId::Venus => "Venus",
            BodyId::EarthMoonBarycenter => "Earth-Moon barycenter",
            BodyId::Mars => "Mars",
            BodyId::Jupiter => "Jupiter",
            BodyId::Saturn => "Saturn",
            BodyId::Uranus => "Uranus",
            BodyId::Neptune => "Neptune",
        }
    }
}

impl fmt::Display for BodyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A celestial body.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Body {
    pub id: BodyId,
    /// Display name
    pub name: Arc<str>,
    /// Standard gravitational parameter (`m^3/s^2`)
    pub mu: f64,
    /// Heliocentric elements; `None` for the central body.
    pub elements: Option<KeplerianElements>,
}

/// Every body of the system, indexed by [`BodyId`]. Slot 0 is the central
/// body, which has no elements and sits at the origin.
///
/// Built once and shared read-only afterwards.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Body>", into = "Vec<Body>")]
pub struct ElementsTable {
    bodies: [Body; TABLE_CAPACITY],
}

impl TryFrom<Vec<Body>> for ElementsTable {
    type Error = Error;

    fn try_from(bodies: Vec<Body>) -> Result<Self> {
        let len = bodies.len();
        let bodies: [Body; TABLE_CAPACITY] = bodies.try_into().map_err(|_| Error::IndexOutOfRange {
            index: len,
            len: TABLE_CAPACITY,
        })?;
        for (index, body) in bodies.iter().enumerate() {
            if body.id.index() != index {
                return Err(Error::IndexOutOfRange {
                    index: body.id.index(),
                    len: TABLE_CAPACITY,
                });
            }
            check_gravitational_parameter(body.mu)?;
            if index != KE_SUN && body.elements.is_none() {
                return Err(Error::NoElements(body.id));
            }
        }
        Ok(Self { bodies })
    }
}

impl From<ElementsTable> for Vec<Body> {
    fn from(table: ElementsTable) -> Self {
        table.bodies.into()
    }
}

/// J2000 mean elements (Standish, "Keplerian Elements for Approximate
/// Positions of the Major Planets"): `a` (AU), `e`, `i`, mean longitude
/// `L`, longitude of perihelion `ϖ`, longitude of ascending node `Ω`
/// (degrees), and `GM` (`m^3/s^2`).
const J2000_PLANETS: [(BodyId, f64, f64, f64, f64, f64, f64, f64); 8] = [
    (BodyId::Mercury, 0.387_099_27, 0.205_635_93, 7.004_979_02, 252.250_323_50, 77.457_796_28, 48.330_765_93, 2.2032e13),
    (BodyId::Venus, 0.723_335_66, 0.006_776_72, 3.394_676_05, 181.979_099_50, 131.602_467_18, 76.679_842_55, 3.248_59e14),
    (BodyId::EarthMoonBarycenter, 1.000_002_61, 0.016_711_23, -0.000_015_31, 100.464_571_66, 102.937_681_93, 0.0, 4.035_032e14),
    (BodyId::Mars, 1.523_710_34, 0.093_394_10, 1.849_691_42, -4.553_432_05, -23.943_629_59, 49.559_538_91, 4.282_837e13),
    (BodyId::Jupiter, 5.202_887_00, 0.048_386_24, 1.304_396_95, 34.396_440_51, 14.728_479_83, 100.473_909_09, 1.266_865_34e17),
    (BodyId::Saturn, 9.536_675_94, 0.053_861_79, 2.485_991_87, 49.954_244_23, 92.598_878_31, 113.662_424_48, 3.793_118_7e16),
    (BodyId::Uranus, 19.189_164_64, 0.047_257_44, 0.772_637_83, 313.238_104_51, 170.954_276_30, 74.016_925_03, 5.793_939e15),
    (BodyId::Neptune, 30.069_922_76, 0.008_590_48, 1.770_043_47, -55.120_029_69, 44.964_762_27, 131.784_225_74, 6.836_529e15),
];

impl ElementsTable {
    /// The Sun and the eight planets at J2000, `t = 0` being the J2000
    /// epoch.
    pub fn solar_system() -> Self {
        let sun = Body {
            id: BodyId::Sun,
            name: BodyId::Sun.name().into(),
            mu: GM_SUN,
            elements: None,
        };
        let planets = J2000_PLANETS.map(|(id, a, e, i, l, varpi, lan, mu)| {
            let elements = KeplerianElements::new(e, a * M_AU)
                .expect("built-in J2000 elements are valid")
                .with_orientation(i * DEG_TO_RAD, lan * DEG_TO_RAD, (varpi - lan) * DEG_TO_RAD)
                .with_mean_anomaly_at_epoch((l - varpi) * DEG_TO_RAD);
            Body {
                id,
                name: id.name().into(),
                mu,
                elements: Some(elements),
            }
        });
        let [p1, p2, p3, p4, p5, p6, p7, p8] = planets;
        Self {
            bodies: [sun, p1, p2, p3, p4, p5, p6, p7, p8],
        }
    }

    pub fn get(&self, id: BodyId) -> &Body {
        &self.bodies[id.index()]
    }

    /// Bounds-checked access by raw table index.
    pub fn get_index(&self, index: usize) -> Result<&Body> {
        self.bodies.get(index).ok_or(Error::IndexOutOfRange {
            index,
            len: TABLE_CAPACITY,
        })
    }

    pub fn elements(&self, id: BodyId) -> Result<&KeplerianElements> {
        self.get(id).elements.as_ref().ok_or(Error::NoElements(id))
    }

    pub fn central_body(&self) -> &Body {
        &self.bodies[KE_SUN]
    }

    /// A propagator around this table's central body.
    pub fn propagator(&self) -> Propagator {
        Propagator::new(self.central_body().mu)
    }

    /// Position of body `id` at `time`; the central body is always at the
    /// origin.
    pub fn position(&self, id: BodyId, time: f64, propagator: &Propagator) -> Vec3 {
        match &self.get(id).elements {
            Some(k) => propagator.compute_position(k, time),
            None => Vec3::ZERO,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Body> {
        self.bodies.iter()
    }
}

impl Default for ElementsTable {
    fn default() -> Self {
        Self::solar_system()
    }
}
