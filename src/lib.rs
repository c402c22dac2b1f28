#![cfg_attr(not(any(test, feature = "std")), no_std)]

extern crate alloc;
#[macro_use]
extern crate log;
#[macro_use]
extern crate serde;

pub mod ahrs;
pub mod algorithm;
pub mod config;
pub mod fcs;
pub mod logger;
pub mod params;
pub mod tuning;
pub mod types;

#[cfg(test)]
#[macro_use]
extern crate pretty_assertions;
