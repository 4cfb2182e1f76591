//! CLI library components for timepp.

pub mod logging;
pub mod output;
