//! HTTP handlers
//!
//! Glob re-exports also carry the utoipa `__path_*` items for `openapi`.

pub mod account;
pub mod card;
pub mod health;
pub mod transfer;

pub use account::*;
pub use card::*;
pub use health::*;
pub use transfer::*;
