//! meshbundle core library
//!
//! This crate provides the types, collaborator traits, error handling and
//! logging setup shared by the export and import pipelines.

pub mod error;
pub mod logging;
pub mod traits;
pub mod types;

pub use error::{Error, Result, ResultExt};
pub use traits::*;
pub use types::*;

/// Re-export commonly used items
pub mod prelude {
    pub use crate::error::{Error, Result, ResultExt};
    pub use crate::traits::*;
    pub use crate::types::*;
}
