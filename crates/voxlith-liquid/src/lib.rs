//! Liquid cellular automaton: evaporation, falling, horizontal spread and
//! Water/Lava phase change, with cross-chunk transfers handed out as an outbox.
#![forbid(unsafe_code)]

mod config;
mod error;
mod sim;

pub use config::LiquidConfig;
pub use error::LiquidError;
pub use sim::{Delivery, LiquidEvent, LiquidSim, TickOutput, Transfer};
