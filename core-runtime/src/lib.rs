//! # Core Runtime Module
//!
//! Runtime infrastructure shared by every indexer crate:
//! - Logging and tracing initialization
//! - Indexer configuration
//! - Progress event bus
//!
//! Nothing here knows about tags or libraries; the domain crates depend on
//! this one, never the other way around.

pub mod config;
pub mod error;
pub mod events;
pub mod logging;

pub use error::{Error, Result};
