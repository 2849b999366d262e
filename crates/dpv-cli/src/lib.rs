//! CLI library components for the diffusion parameter viewer.

pub mod logging;
pub mod session;
pub mod summarize;
