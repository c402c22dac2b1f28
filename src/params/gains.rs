use hal::persist::Persist;

use super::{Entry, Param, Visit};
use crate::config::pathset::{Error, Path, PathSet, Value};

/// Values of a [`GainSet`] loaded once per control tick
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Gains {
    pub p: f32,
    pub i: f32,
    pub d: f32,
    pub ff: f32,
    pub imax: f32,
    /// Target filter cutoff in Hz, 0 disables
    pub fltt: f32,
    /// Error filter cutoff in Hz, 0 disables
    pub flte: f32,
    /// Derivative filter cutoff in Hz, 0 disables
    pub fltd: f32,
    /// Slew rate limit of P+D, 0 disables
    pub smax: f32,
}

#[derive(Serialize)]
pub struct GainSet {
    pub p: Param<f32>,
    pub i: Param<f32>,
    pub d: Param<f32>,
    pub ff: Param<f32>,
    pub imax: Param<f32>,
    pub fltt: Param<f32>,
    pub flte: Param<f32>,
    pub fltd: Param<f32>,
    pub smax: Param<f32>,
}

macro_rules! gain_set {
    ($prefix:literal, $defaults:expr) => {{
        let defaults: Gains = $defaults;
        GainSet {
            p: Param::new(concat!($prefix, "P"), defaults.p),
            i: Param::new(concat!($prefix, "I"), defaults.i),
            d: Param::new(concat!($prefix, "D"), defaults.d),
            ff: Param::new(concat!($prefix, "FF"), defaults.ff),
            imax: Param::new(concat!($prefix, "IMAX"), defaults.imax),
            fltt: Param::new(concat!($prefix, "FLTT"), defaults.fltt),
            flte: Param::new(concat!($prefix, "FLTE"), defaults.flte),
            fltd: Param::new(concat!($prefix, "FLTD"), defaults.fltd),
            smax: Param::new(concat!($prefix, "SMAX"), defaults.smax),
        }
    }};
}

fn non_negative(value: f32) -> f32 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

impl GainSet {
    /// Negative or non-finite stored values read as zero, which disables the feature
    pub fn load(&self) -> Gains {
        Gains {
            p: non_negative(self.p.get()),
            i: non_negative(self.i.get()),
            d: non_negative(self.d.get()),
            ff: non_negative(self.ff.get()),
            imax: non_negative(self.imax.get()),
            fltt: non_negative(self.fltt.get()),
            flte: non_negative(self.flte.get()),
            fltd: non_negative(self.fltd.get()),
            smax: non_negative(self.smax.get()),
        }
    }

    fn entries(&self) -> [&Param<f32>; 9] {
        [
            &self.p, &self.i, &self.d, &self.ff, &self.imax, &self.fltt, &self.flte, &self.fltd,
            &self.smax,
        ]
    }
}

impl Visit for GainSet {
    fn visit(&self, f: &mut dyn FnMut(&dyn Entry)) {
        self.entries().iter().for_each(|param| f(*param))
    }
}

impl PathSet for GainSet {
    fn set(&self, mut path: Path, value: Value) -> Result<(), Error> {
        let param = match path.str()? {
            "p" => &self.p,
            "i" => &self.i,
            "d" => &self.d,
            "ff" => &self.ff,
            "imax" => &self.imax,
            "fltt" => &self.fltt,
            "flte" => &self.flte,
            "fltd" => &self.fltd,
            "smax" => &self.smax,
            _ => return Err(Error::UnknownPath),
        };
        param.set(value.parse_gain()?);
        Ok(())
    }
}

/// Rate and angle loop gains of one axis
#[derive(Serialize)]
pub struct AxisGains {
    pub rate: GainSet,
    pub angle: GainSet,
    /// Maximum demanded rate in degrees per second, 0 disables
    pub rmax: Param<f32>,
}

impl AxisGains {
    pub fn roll() -> Self {
        let rate = Gains {
            p: 0.08,
            i: 0.15,
            ff: 0.345,
            imax: 0.666,
            fltt: 3.0,
            fltd: 12.0,
            smax: 150.0,
            ..Default::default()
        };
        let angle = Gains { p: 2.0, imax: 30.0, fltt: 10.0, fltd: 10.0, ..Default::default() };
        Self {
            rate: gain_set!("RLL_RATE_", rate),
            angle: gain_set!("RLL_AGL_", angle),
            rmax: Param::new("RLL_AGL_RMAX", 0.0),
        }
    }

    pub fn pitch() -> Self {
        let rate = Gains {
            p: 0.04,
            i: 0.15,
            ff: 0.345,
            imax: 0.666,
            fltt: 3.0,
            fltd: 12.0,
            smax: 150.0,
            ..Default::default()
        };
        let angle = Gains { p: 2.0, imax: 30.0, fltt: 10.0, fltd: 10.0, ..Default::default() };
        Self {
            rate: gain_set!("PTCH_RATE_", rate),
            angle: gain_set!("PTCH_AGL_", angle),
            rmax: Param::new("PTCH_AGL_RMAX", 0.0),
        }
    }

    pub fn rmax(&self) -> f32 {
        non_negative(self.rmax.get())
    }
}

impl Visit for AxisGains {
    fn visit(&self, f: &mut dyn FnMut(&dyn Entry)) {
        self.rate.visit(f);
        self.angle.visit(f);
        f(&self.rmax);
    }
}

impl PathSet for AxisGains {
    fn set(&self, mut path: Path, value: Value) -> Result<(), Error> {
        match path.str()? {
            "rate" => self.rate.set(path, value),
            "angle" => self.angle.set(path, value),
            "rmax" => {
                self.rmax.set(value.parse_gain()?);
                Ok(())
            }
            _ => Err(Error::UnknownPath),
        }
    }
}

/// Vehicle wide parameters the attitude controllers depend on
#[derive(Serialize)]
pub struct FixedWing {
    /// Airspeed in m/s at or below which integrators are locked
    #[serde(rename = "airspeed-min")]
    pub airspeed_min: Param<f32>,
}

impl Default for FixedWing {
    fn default() -> Self {
        Self { airspeed_min: Param::new("ARSPD_FBW_MIN", 9.0) }
    }
}

impl Visit for FixedWing {
    fn visit(&self, f: &mut dyn FnMut(&dyn Entry)) {
        f(&self.airspeed_min)
    }
}

impl PathSet for FixedWing {
    fn set(&self, mut path: Path, value: Value) -> Result<(), Error> {
        match path.str()? {
            "airspeed-min" => self.airspeed_min.set(value.parse_gain()?),
            _ => return Err(Error::UnknownPath),
        }
        Ok(())
    }
}

/// Saves every parameter of a group
pub fn save_all(group: &dyn Visit, backend: &dyn Persist) {
    group.visit(&mut |entry| entry.save(backend))
}

/// Loads every parameter of a group from the backend
pub fn restore_all(group: &dyn Visit, backend: &dyn Persist) {
    group.visit(&mut |entry| entry.restore(backend))
}

mod test {
    #[test]
    fn test_gain_names() {
        use super::AxisGains;
        use crate::params::Visit;

        let mut names = std::vec::Vec::new();
        AxisGains::roll().visit(&mut |entry| names.push(entry.name()));
        assert_eq!(names.len(), 19);
        assert_eq!(names[0], "RLL_RATE_P");
        assert_eq!(names[8], "RLL_RATE_SMAX");
        assert_eq!(names[14], "RLL_AGL_FLTT");
        assert_eq!(names[18], "RLL_AGL_RMAX");
    }

    #[test]
    fn test_negative_gain_reads_zero() {
        use super::AxisGains;

        let gains = AxisGains::pitch();
        gains.rate.fltd.set(-3.0);
        gains.rate.p.set(f32::NAN);
        let loaded = gains.rate.load();
        assert_eq!(loaded.fltd, 0.0);
        assert_eq!(loaded.p, 0.0);
        assert_eq!(loaded.i, 0.15);
    }

    #[test]
    fn test_save_restore_all() {
        use super::{restore_all, save_all, AxisGains};
        use crate::params::MemoryStorage;

        let storage = MemoryStorage::new();
        let gains = AxisGains::roll();
        gains.rate.p.set(0.12);
        save_all(&gains, &storage);
        assert_eq!(storage.len(), 19);

        let loaded = AxisGains::roll();
        restore_all(&loaded, &storage);
        assert_eq!(loaded.rate.p.get(), 0.12);
        assert!(loaded.angle.p.configured());
    }
}
