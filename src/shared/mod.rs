/// Shared kernel - error types, result alias and cross-cutting helpers
pub mod error;
pub mod result;
pub mod security;
pub mod wait;

pub use result::Result;
