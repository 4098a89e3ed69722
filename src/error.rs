//! Error type for the layout engine.
//!
//! Sampling never fails; these cover simulator control, parameter
//! validation, configuration parsing and the async host.

use crate::graph::MAX_NODE_COUNT;

/// Errors surfaced by the simulator and its hosts.
#[derive(Debug, thiserror::Error)]
pub enum LayoutError {
    /// `init`/`set_graph` was called with a node count outside `1..=10000`.
    #[error("node count {count} is outside 1..={MAX_NODE_COUNT}")]
    NodeCount {
        /// The rejected count.
        count: usize,
    },

    /// A parameter was non-finite or out of its allowed range.
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter {
        /// Parameter name as it appears in configuration.
        name: &'static str,
        /// What was wrong with it.
        reason: &'static str,
    },

    /// Configuration text could not be parsed.
    #[error("failed to parse config: {source}")]
    Config {
        /// The underlying JSON error.
        #[from]
        source: serde_json::Error,
    },

    /// The simulator task is no longer running.
    #[error("simulator task has stopped")]
    SimulatorStopped,
}
