//! Infrastructure layer providing external service integrations.
//!
//! Local key-value persistence, configuration files, CSV export and the
//! system clipboard.

pub mod clipboard;
pub mod config;
pub mod export;
pub mod persistence;

pub use clipboard::*;
pub use config::*;
pub use export::*;
pub use persistence::*;
