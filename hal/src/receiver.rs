/// Pulse width in microseconds
pub type PulseWidth = u16;

pub trait Receiver: core::fmt::Debug {
    fn has_valid_input(&self) -> bool;
    fn num_channel(&self) -> usize;
    /// Zero-based channel index
    fn get_channel(&self, index: usize) -> PulseWidth;
}
