use crate::config::pathset::{Error, Path, PathSet, Value};
use crate::params::{Entry, Param, Visit};

pub const MIN_RANGE: f32 = 1.1;

/// Transmitter tuning settings, each persisted under its own name
#[derive(Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct TuningConfig {
    /// One-based receiver channel carrying the tuning knob, 0 disables tuning
    pub channel: Param<u8>,
    pub channel_min: Param<i16>,
    pub channel_max: Param<i16>,
    /// One-based channel of the parameter selector switch, 0 disables
    pub selector: Param<u8>,
    /// One-based channel of the three position set selector, 0 disables
    pub set_selector: Param<u8>,
    pub range: Param<f32>,
    pub mode_revert: Param<bool>,
    pub error_threshold: Param<f32>,
    pub parmset: Param<i16>,
    pub parmset2: Param<i16>,
    pub parmset3: Param<i16>,
}

impl Default for TuningConfig {
    fn default() -> Self {
        Self {
            channel: Param::new("TUNE_CHAN", 0),
            channel_min: Param::new("TUNE_CHAN_MIN", 1000),
            channel_max: Param::new("TUNE_CHAN_MAX", 2000),
            selector: Param::new("TUNE_SELECTOR", 0),
            set_selector: Param::new("TUNE_SETSEL", 0),
            range: Param::new("TUNE_RANGE", 2.0),
            mode_revert: Param::new("TUNE_MODE_REVERT", false),
            error_threshold: Param::new("TUNE_ERR_THRESH", 0.15),
            parmset: Param::new("TUNE_PARMSET", 0),
            parmset2: Param::new("TUNE_PARMSET2", 0),
            parmset3: Param::new("TUNE_PARMSET3", 0),
        }
    }
}

impl TuningConfig {
    /// Tuning range, clamped so the knob always spans a usable ratio
    pub fn effective_range(&self) -> f32 {
        let range = self.range.get();
        if !range.is_finite() || range < MIN_RANGE {
            return MIN_RANGE;
        }
        range
    }

    /// Parameter set for the given set selector position
    pub fn parmset_for(&self, position: usize) -> i16 {
        match position {
            0 => self.parmset.get(),
            1 => self.parmset2.get(),
            _ => self.parmset3.get(),
        }
    }
}

impl Visit for TuningConfig {
    fn visit(&self, f: &mut dyn FnMut(&dyn Entry)) {
        f(&self.channel);
        f(&self.channel_min);
        f(&self.channel_max);
        f(&self.selector);
        f(&self.set_selector);
        f(&self.range);
        f(&self.mode_revert);
        f(&self.error_threshold);
        f(&self.parmset);
        f(&self.parmset2);
        f(&self.parmset3);
    }
}

impl PathSet for TuningConfig {
    fn set(&self, mut path: Path, value: Value) -> Result<(), Error> {
        match path.str()? {
            "channel" => self.channel.set(value.parse()?),
            "channel-min" => self.channel_min.set(value.parse()?),
            "channel-max" => self.channel_max.set(value.parse()?),
            "selector" => self.selector.set(value.parse()?),
            "set-selector" => self.set_selector.set(value.parse()?),
            "range" => self.range.set(value.parse_gain()?),
            "mode-revert" => self.mode_revert.set(value.parse_or(true)?),
            "error-threshold" => self.error_threshold.set(value.parse_gain()?),
            "parmset" => self.parmset.set(value.parse()?),
            "parmset2" => self.parmset2.set(value.parse()?),
            "parmset3" => self.parmset3.set(value.parse()?),
            _ => return Err(Error::UnknownPath),
        }
        Ok(())
    }
}

mod test {
    #[test]
    fn test_effective_range() {
        use super::TuningConfig;

        let config = TuningConfig::default();
        assert_eq!(config.effective_range(), 2.0);
        config.range.set(0.5);
        assert_eq!(config.effective_range(), 1.1);
        config.range.set(f32::INFINITY);
        assert_eq!(config.effective_range(), 1.1);
    }

    #[test]
    fn test_set_path() {
        use super::TuningConfig;
        use crate::config::pathset::{Error, Path, PathSet, Value};

        let config = TuningConfig::default();
        config.set(Path::from("parmset"), Value::of("115")).unwrap();
        assert_eq!(config.parmset.get(), 115);
        config.set(Path::from("mode-revert"), Value(None)).unwrap();
        assert!(config.mode_revert.get());
        assert_eq!(config.set(Path::from("range"), Value::of("-2")), Err(Error::InvalidValue));
        assert_eq!(config.set(Path::from("channel"), Value(None)), Err(Error::ExpectValue));
        assert_eq!(config.set(Path::from("knob"), Value::of("1")), Err(Error::UnknownPath));
    }
}
