use core::{fmt, str::FromStr};

use super::measurement::CentiDegrees;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum Axis {
    Roll = 0,
    Pitch,
}

impl Axis {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Roll => "roll",
            Self::Pitch => "pitch",
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Axis {
    type Err = ();

    fn from_str(string: &str) -> Result<Self, ()> {
        match string {
            "roll" => Ok(Self::Roll),
            "pitch" => Ok(Self::Pitch),
            _ => Err(()),
        }
    }
}

/// What the vehicle-mode logic asks an axis controller for
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Demand {
    /// Target attitude
    Angle(CentiDegrees),
    /// Attitude error computed by a supervisory layer, target kept for reporting only
    AngleError { error: CentiDegrees, target: CentiDegrees },
    /// Body rate in degrees per second, bypassing the angle loop
    Rate(f32),
}

/// Control surface deflection in centidegrees, within ±4500
pub type Deflection = f32;

pub const MAX_DEFLECTION: Deflection = 4500.0;
