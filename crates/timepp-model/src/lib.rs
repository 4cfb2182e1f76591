//! Data model for timepp.
//!
//! - [`Table`] / [`TimeIndex`]: the working dataset and its optional time index
//! - [`Frequency`]: calendar frequencies with pandas-style aliases
//! - closed enumerations for every string-valued option
//! - [`ErrorKind`]: the error categories shared by all timepp crates

mod enums;
mod error;
mod frequency;
mod table;

// === Error Types ===
pub use error::{ErrorKind, ModelError, Result};

// === Configuration Enums ===
pub use enums::{ComponentOutput, DecomposeMode, EncodingKind, HandleUnknown};
pub use frequency::{Frequency, FrequencyUnit};

// === Table ===
pub use table::{Table, TimeIndex};
