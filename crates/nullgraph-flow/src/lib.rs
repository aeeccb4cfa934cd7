//! Max-flow solver (C4) and label propagator (C5): the two sequential,
//! single-threaded passes the driver runs after every translation unit's
//! nodes and edges have been built (§4.4, §4.5).

pub mod maxflow;
pub mod propagate;

pub use maxflow::{run as run_max_flow, MaxFlowStats};
pub use propagate::run as propagate_labels;
