#![no_std]

pub mod clock;
pub mod persist;
pub mod receiver;
pub mod scheduler;
