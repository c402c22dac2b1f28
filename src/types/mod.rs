pub mod control;
pub mod measurement;
pub mod pid;
