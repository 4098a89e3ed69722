//! Force-directed layout.
//!
//! [`ForceSimulator`] owns one graph's node state and steps it with
//! radius-limited repulsion, springs and a centering pull. Hosts drive it
//! through [`ForceSimulator::advance`] on a fixed timer and forward the
//! snapshots it returns.

pub mod params;
pub mod simulator;

pub use params::{ParamsPatch, SimulationParameters};
pub use simulator::{ForceSimulator, RunState, SimulatorStats, TickFault};
