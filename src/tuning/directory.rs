//! Static tables describing what a vehicle exposes for transmitter tuning.

/// Identifier of a tunable parameter, vehicle specific
pub type ParmId = u8;

/// PARMSET values at or above this select a tuning set, below it a single parameter
pub const SET_BASE: i16 = 100;

const UNKNOWN: &str = "UNKNOWN";

#[derive(Copy, Clone, Debug)]
pub struct TuningSet {
    pub set: u8,
    pub parms: &'static [ParmId],
}

#[derive(Copy, Clone, Debug)]
pub struct TuningName {
    pub parm: ParmId,
    pub name: &'static str,
}

#[derive(Copy, Clone, Debug)]
pub struct Directory {
    pub sets: &'static [TuningSet],
    pub names: &'static [TuningName],
}

/// Parameters a PARMSET value resolves to
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Parms {
    Single(ParmId),
    Set(&'static [ParmId]),
}

impl Parms {
    pub fn len(&self) -> usize {
        match self {
            Self::Single(_) => 1,
            Self::Set(parms) => parms.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, index: usize) -> Option<ParmId> {
        match self {
            Self::Single(parm) if index == 0 => Some(*parm),
            Self::Single(_) => None,
            Self::Set(parms) => parms.get(index).copied(),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Selection {
    Disabled,
    Parms(Parms),
    UnknownSet,
    EmptySet,
}

impl Directory {
    pub fn set(&self, set: u8) -> Option<&'static [ParmId]> {
        self.sets.iter().find(|s| s.set == set).map(|s| s.parms)
    }

    pub fn name(&self, parm: ParmId) -> &'static str {
        self.names.iter().find(|n| n.parm == parm).map(|n| n.name).unwrap_or(UNKNOWN)
    }

    pub fn has_name(&self, parm: ParmId) -> bool {
        self.names.iter().any(|n| n.parm == parm)
    }

    pub fn resolve(&self, parmset: i16) -> Selection {
        if parmset <= 0 {
            return Selection::Disabled;
        }
        if parmset < SET_BASE {
            if !self.has_name(parmset as ParmId) {
                return Selection::UnknownSet;
            }
            return Selection::Parms(Parms::Single(parmset as ParmId));
        }
        let set = match u8::try_from(parmset - SET_BASE) {
            Ok(set) => set,
            Err(_) => return Selection::UnknownSet,
        };
        match self.set(set) {
            Some(parms) if parms.is_empty() => Selection::EmptySet,
            Some(parms) => Selection::Parms(Parms::Set(parms)),
            None => Selection::UnknownSet,
        }
    }
}

#[cfg(test)]
mod test {
    static DIRECTORY: super::Directory = super::Directory {
        sets: &[
            super::TuningSet { set: 1, parms: &[10, 11, 12] },
            super::TuningSet { set: 2, parms: &[] },
        ],
        names: &[
            super::TuningName { parm: 10, name: "A_P" },
            super::TuningName { parm: 11, name: "A_I" },
            super::TuningName { parm: 12, name: "A_D" },
        ],
    };

    #[test]
    fn test_resolve() {
        use super::{Parms, Selection};

        assert_eq!(DIRECTORY.resolve(0), Selection::Disabled);
        assert_eq!(DIRECTORY.resolve(-101), Selection::Disabled);
        assert_eq!(DIRECTORY.resolve(11), Selection::Parms(Parms::Single(11)));
        assert_eq!(DIRECTORY.resolve(13), Selection::UnknownSet);
        assert_eq!(DIRECTORY.resolve(101), Selection::Parms(Parms::Set(&[10, 11, 12])));
        assert_eq!(DIRECTORY.resolve(102), Selection::EmptySet);
        assert_eq!(DIRECTORY.resolve(103), Selection::UnknownSet);
        assert_eq!(DIRECTORY.resolve(i16::MAX), Selection::UnknownSet);
    }

    #[test]
    fn test_names() {
        use super::Parms;

        assert_eq!(DIRECTORY.name(12), "A_D");
        assert_eq!(DIRECTORY.name(99), "UNKNOWN");

        let parms = Parms::Set(&[10, 11, 12]);
        assert_eq!(parms.len(), 3);
        assert_eq!(parms.get(2), Some(12));
        assert_eq!(parms.get(3), None);
        assert_eq!(Parms::Single(11).get(1), None);
    }
}
