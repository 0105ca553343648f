pub mod compute;
pub mod config;
pub mod display;
pub mod entities;
pub mod error;
pub mod level;
pub mod logging;
pub mod media;
pub mod pool;
pub mod projection;
pub mod script;
pub mod sequencer;
