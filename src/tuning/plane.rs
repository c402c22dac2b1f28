//! Fixed-wing tuning tables and their binding to the axis gains.
//!
//! IDs below 50 belong to other vehicle types and are left unused here.

use hal::persist::Persist;

use super::directory::{Directory, ParmId, TuningName, TuningSet};
use super::TuningTarget;
use crate::config::Parameters;
use crate::params::Param;

pub mod parm {
    use super::ParmId;

    pub const RLL_P: ParmId = 50;
    pub const RLL_I: ParmId = 51;
    pub const RLL_D: ParmId = 52;
    pub const RLL_FF: ParmId = 53;
    pub const PIT_P: ParmId = 54;
    pub const PIT_I: ParmId = 55;
    pub const PIT_D: ParmId = 56;
    pub const PIT_FF: ParmId = 57;

    pub const AGL_ROLL_P: ParmId = 71;
    pub const AGL_ROLL_I: ParmId = 72;
    pub const AGL_ROLL_D: ParmId = 73;
    pub const AGL_ROLL_FLTT: ParmId = 74;
    pub const AGL_PITCH_P: ParmId = 75;
    pub const AGL_PITCH_I: ParmId = 76;
    pub const AGL_PITCH_D: ParmId = 77;
    pub const AGL_PITCH_FLTT: ParmId = 78;
}

pub mod set {
    pub const AGL_ROLL_PITCH: u8 = 15;
    pub const AGL_PITCH: u8 = 16;
    pub const AGL_ROLL: u8 = 17;
    pub const FW_ROLL_PITCH: u8 = 21;
    pub const FW_PITCH: u8 = 22;
    pub const FW_ROLL: u8 = 23;
    pub const FW_PITCH_ROLL_PIDS: u8 = 24;
}

use parm::*;

macro_rules! names {
    ($($parm:ident),+) => {
        &[$(TuningName { parm: $parm, name: stringify!($parm) }),+]
    };
}

pub static PLANE: Directory = Directory {
    sets: &[
        TuningSet {
            set: set::AGL_ROLL_PITCH,
            parms: &[AGL_ROLL_P, AGL_ROLL_I, AGL_ROLL_D, AGL_PITCH_P, AGL_PITCH_I, AGL_PITCH_D],
        },
        TuningSet {
            set: set::AGL_PITCH,
            parms: &[AGL_PITCH_P, AGL_PITCH_I, AGL_PITCH_D, AGL_PITCH_FLTT],
        },
        TuningSet { set: set::AGL_ROLL, parms: &[AGL_ROLL_P, AGL_ROLL_I, AGL_ROLL_D, AGL_ROLL_FLTT] },
        TuningSet { set: set::FW_ROLL_PITCH, parms: &[RLL_P, RLL_I, RLL_D, PIT_P, PIT_I, PIT_D] },
        TuningSet { set: set::FW_PITCH, parms: &[PIT_P, PIT_I, PIT_D, PIT_FF] },
        TuningSet { set: set::FW_ROLL, parms: &[RLL_P, RLL_I, RLL_D, RLL_FF] },
        TuningSet {
            set: set::FW_PITCH_ROLL_PIDS,
            parms: &[PIT_P, PIT_I, PIT_D, PIT_FF, RLL_P, RLL_I, RLL_D, RLL_FF],
        },
    ],
    names: names!(
        RLL_P,
        RLL_I,
        RLL_D,
        RLL_FF,
        PIT_P,
        PIT_I,
        PIT_D,
        PIT_FF,
        AGL_ROLL_P,
        AGL_ROLL_I,
        AGL_ROLL_D,
        AGL_ROLL_FLTT,
        AGL_PITCH_P,
        AGL_PITCH_I,
        AGL_PITCH_D,
        AGL_PITCH_FLTT
    ),
};

/// Binds the plane tables to the roll and pitch gains, persisting through `backend`
pub struct PlaneTuning<'a> {
    parameters: &'a Parameters,
    backend: &'a dyn Persist,
}

impl<'a> PlaneTuning<'a> {
    pub fn new(parameters: &'a Parameters, backend: &'a dyn Persist) -> Self {
        Self { parameters, backend }
    }

    fn param(&self, parm: ParmId) -> Option<&'a Param<f32>> {
        let (roll, pitch) = (&self.parameters.roll, &self.parameters.pitch);
        let param = match parm {
            RLL_P => &roll.rate.p,
            RLL_I => &roll.rate.i,
            RLL_D => &roll.rate.d,
            RLL_FF => &roll.rate.ff,
            PIT_P => &pitch.rate.p,
            PIT_I => &pitch.rate.i,
            PIT_D => &pitch.rate.d,
            PIT_FF => &pitch.rate.ff,
            AGL_ROLL_P => &roll.angle.p,
            AGL_ROLL_I => &roll.angle.i,
            AGL_ROLL_D => &roll.angle.d,
            AGL_ROLL_FLTT => &roll.angle.fltt,
            AGL_PITCH_P => &pitch.angle.p,
            AGL_PITCH_I => &pitch.angle.i,
            AGL_PITCH_D => &pitch.angle.d,
            AGL_PITCH_FLTT => &pitch.angle.fltt,
            _ => return None,
        };
        Some(param)
    }
}

impl<'a> TuningTarget for PlaneTuning<'a> {
    fn directory(&self) -> &'static Directory {
        &PLANE
    }

    fn get_value(&self, parm: ParmId) -> Option<f32> {
        self.param(parm).map(|param| param.get())
    }

    fn set_value(&self, parm: ParmId, value: f32) {
        if let Some(param) = self.param(parm) {
            param.set(value)
        }
    }

    fn save_value(&self, parm: ParmId) {
        if let Some(param) = self.param(parm) {
            param.save(self.backend)
        }
    }

    fn reload_value(&self, parm: ParmId) {
        if let Some(param) = self.param(parm) {
            param.reload()
        }
    }
}

mod test {
    #[test]
    fn test_every_parameter_resolves() {
        use hal::persist::NoPersist;

        use super::{PlaneTuning, PLANE};
        use crate::config::Parameters;
        use crate::tuning::TuningTarget;

        let parameters = Parameters::default();
        let plane = PlaneTuning::new(&parameters, &NoPersist);
        for set in PLANE.sets {
            assert!(!set.parms.is_empty());
            for &parm in set.parms {
                assert!(plane.get_value(parm).is_some(), "parm {} in set {}", parm, set.set);
                assert_ne!(PLANE.name(parm), "UNKNOWN");
            }
        }
        for name in PLANE.names {
            assert!(plane.get_value(name.parm).is_some());
        }
        assert_eq!(plane.get_value(0), None);
    }

    #[test]
    fn test_binding() {
        use hal::persist::Persist;

        use super::{parm, PlaneTuning};
        use crate::config::Parameters;
        use crate::params::MemoryStorage;
        use crate::tuning::TuningTarget;

        let parameters = Parameters::default();
        let storage = MemoryStorage::new();
        let plane = PlaneTuning::new(&parameters, &storage);

        plane.set_value(parm::PIT_FF, 0.5);
        assert_eq!(parameters.pitch.rate.ff.get(), 0.5);
        plane.reload_value(parm::PIT_FF);
        assert_eq!(parameters.pitch.rate.ff.get(), 0.345);

        plane.set_value(parm::AGL_ROLL_FLTT, 4.0);
        plane.save_value(parm::AGL_ROLL_FLTT);
        assert_eq!(storage.read("RLL_AGL_FLTT"), Some(4.0f32.to_bits()));
        assert_eq!(super::PLANE.name(parm::AGL_ROLL_FLTT), "AGL_ROLL_FLTT");
    }
}
