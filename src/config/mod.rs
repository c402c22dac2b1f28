//! Path addressed access to every persisted parameter.
//!
//! Paths are `/` separated, e.g. `roll/rate/p` or `tuning/parmset`, and
//! the whole tree serializes to a snapshot of live values.

pub mod pathset;

use hal::persist::Persist;

use crate::params::{AxisGains, Entry, FixedWing, Visit};
use crate::tuning::config::TuningConfig;
use crate::types::control::Axis;
pub use pathset::{Error, Path, PathSet, Value};

#[derive(Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct Parameters {
    pub roll: AxisGains,
    pub pitch: AxisGains,
    pub fixed_wing: FixedWing,
    pub tuning: TuningConfig,
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            roll: AxisGains::roll(),
            pitch: AxisGains::pitch(),
            fixed_wing: FixedWing::default(),
            tuning: TuningConfig::default(),
        }
    }
}

impl Parameters {
    /// Defaults overridden by whatever the backend holds
    pub fn load(backend: &dyn Persist) -> Self {
        let parameters = Self::default();
        parameters.restore_all(backend);
        parameters
    }

    pub fn axis(&self, axis: Axis) -> &AxisGains {
        match axis {
            Axis::Roll => &self.roll,
            Axis::Pitch => &self.pitch,
        }
    }

    pub fn restore_all(&self, backend: &dyn Persist) {
        self.visit(&mut |entry| entry.restore(backend));
        debug!("Parameters restored");
    }

    pub fn save_all(&self, backend: &dyn Persist) {
        self.visit(&mut |entry| entry.save(backend));
    }

    /// Sets a single value from its textual path, e.g. from a command line
    pub fn set_path(&self, path: &str, value: Option<&str>) -> Result<(), Error> {
        self.set(Path::from(path), Value(value))
    }
}

impl Visit for Parameters {
    fn visit(&self, f: &mut dyn FnMut(&dyn Entry)) {
        self.roll.visit(f);
        self.pitch.visit(f);
        self.fixed_wing.visit(f);
        self.tuning.visit(f);
    }
}

impl PathSet for Parameters {
    fn set(&self, mut path: Path, value: Value) -> Result<(), Error> {
        match path.str()? {
            "roll" => self.roll.set(path, value),
            "pitch" => self.pitch.set(path, value),
            "fixed-wing" => self.fixed_wing.set(path, value),
            "tuning" => self.tuning.set(path, value),
            _ => Err(Error::UnknownPath),
        }
    }
}

mod test {
    #[test]
    fn test_set_path() {
        use super::{Error, Parameters};

        let parameters = Parameters::default();
        parameters.set_path("roll/rate/p", Some("0.12")).unwrap();
        parameters.set_path("/pitch/angle/fltt/", Some("5")).unwrap();
        parameters.set_path("fixed-wing/airspeed-min", Some("11")).unwrap();
        assert_eq!(parameters.roll.rate.p.get(), 0.12);
        assert_eq!(parameters.pitch.angle.fltt.get(), 5.0);
        assert_eq!(parameters.fixed_wing.airspeed_min.get(), 11.0);

        assert_eq!(parameters.set_path("yaw/rate/p", Some("1")), Err(Error::UnknownPath));
        assert_eq!(parameters.set_path("roll/rate/p", Some("fast")), Err(Error::InvalidValue));
        assert_eq!(parameters.set_path("roll/rate/p", None), Err(Error::ExpectValue));
        assert_eq!(parameters.set_path("roll/rate", Some("1")), Err(Error::UnknownPath));
    }

    #[test]
    fn test_snapshot() {
        use serde_json::json;

        use super::Parameters;

        let parameters = Parameters::default();
        parameters.roll.rmax.set(75.0);
        let snapshot = serde_json::to_value(&parameters).unwrap();
        assert_eq!(snapshot["roll"]["rmax"], json!(75.0));
        assert_eq!(snapshot["roll"]["angle"]["p"], json!(2.0));
        assert_eq!(snapshot["fixed-wing"]["airspeed-min"], json!(9.0));
        assert_eq!(snapshot["tuning"]["mode-revert"], json!(false));
        assert_eq!(snapshot["tuning"]["parmset"], json!(0));
    }

    #[test]
    fn test_save_and_load() {
        use super::Parameters;
        use crate::params::MemoryStorage;

        let storage = MemoryStorage::new();
        let parameters = Parameters::default();
        parameters.pitch.rate.i.set(0.3);
        parameters.tuning.parmset.set(121);
        parameters.save_all(&storage);

        let loaded = Parameters::load(&storage);
        assert_eq!(loaded.pitch.rate.i.get(), 0.3);
        assert_eq!(loaded.tuning.parmset.get(), 121);
        assert!(loaded.roll.angle.p.configured());
    }
}
