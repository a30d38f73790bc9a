//! Core module - configuration and error infrastructure
//!
//! Holds what the session needs before any game logic runs: the persisted
//! [`BoardSettings`], their load/save helpers, and the core error type.
//!
//! # Resources
//!
//! - [`BoardSettings`] - mode, engine side and difficulty, endpoints, poll rate
//! - [`settings_persistence`] - JSON file in the platform config directory
//! - [`CoreError`] - configuration failures

pub mod error;
pub mod settings;
pub mod settings_persistence;

pub use error::{CoreError, CoreResult};
pub use settings::{BoardSettings, ModeSetting};
pub use settings_persistence::{load_settings, save_settings, settings_path};
