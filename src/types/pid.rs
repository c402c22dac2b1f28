/// Per-tick breakdown of a PID loop output, reported to telemetry and autotune
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize)]
pub struct PidInfo {
    pub target: f32,
    pub actual: f32,
    pub error: f32,
    #[serde(rename = "P")]
    pub p: f32,
    #[serde(rename = "I")]
    pub i: f32,
    #[serde(rename = "D")]
    pub d: f32,
    #[serde(rename = "FF")]
    pub ff: f32,
    #[serde(rename = "Dmod")]
    pub d_mod: f32,
    pub slew_rate: f32,
    pub limit: bool,
}
