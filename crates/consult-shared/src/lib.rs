//! Vocabulary shared by the consultation chat crates: identifiers, the
//! explicit user context, provider and duration enums, the error taxonomy
//! and tunable constants.

pub mod constants;
pub mod error;
pub mod types;

pub use error::{ChatError, RemoteError};
pub use types::*;
