pub mod lpf;
pub mod slew;

pub use lpf::LPF;
pub use slew::SlewLimiter;
