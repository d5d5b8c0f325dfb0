#![forbid(unsafe_code)]

pub mod elapsed;
pub mod model;
pub mod scoring;
pub mod session;
pub mod time;

pub use time::Clock;
