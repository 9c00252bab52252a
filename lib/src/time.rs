use std::fmt;

use parking_lot::RwLock;
use time::Duration;

use crate::error::{Error, Result};

/// A time offset from the element epoch, as used to label and step ticks.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct SimTime(Duration);

impl SimTime {
    /// Fails on NaN, infinities and values outside the range of
    /// [`Duration`] (about ±9.2e18 s).
    pub fn try_from_seconds(sec: f64) -> Result<SimTime> {
        Duration::checked_seconds_f64(sec)
            .map(SimTime)
            .ok_or(Error::InvalidTime(sec))
    }

    pub fn as_seconds(self) -> f64 {
        self.0.as_seconds_f64()
    }
}

impl fmt::Display for SimTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T{:+}s", self.0.as_seconds_f64())
    }
}

impl fmt::Debug for SimTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self}")
    }
}

/// The current simulation time in seconds, stored as a plain `f64`.
///
/// Owned by the embedding application. It is written once per tick, and
/// every write must finish before the readers of that tick start; readers
/// take a [`Chrono::current`] snapshot and never write.
#[derive(Debug, Default)]
pub struct Chrono {
    current: RwLock<f64>,
}

fn check_time(t: f64) -> Result<f64> {
    if t.is_finite() {
        Ok(t)
    } else {
        Err(Error::InvalidTime(t))
    }
}

impl Chrono {
    pub fn new(start: f64) -> Result<Self> {
        Ok(Self {
            current: RwLock::new(check_time(start)?),
        })
    }

    /// Current time in seconds, as consumed by the propagator.
    pub fn current(&self) -> f64 {
        *self.current.read()
    }

    /// Set the time; non-finite values are rejected and leave it unchanged.
    pub fn set(&self, t: f64) -> Result<()> {
        *self.current.write() = check_time(t)?;
        Ok(())
    }

    /// Advance by one tick and return the new time.
    pub fn advance(&self, step: Duration) -> Result<f64> {
        let mut current = self.current.write();
        *current = check_time(*current + step.as_seconds_f64())?;
        Ok(*current)
    }
}
