//! Lingua content console library.
//!
//! Editorial core of the language-learning site: content records with
//! SEO/GEO publishing metadata, validation, structured data, version
//! history, role permissions and the storage backends behind them. The
//! `lingua` binary is a thin command-line front end over this crate.

pub mod cli;
pub mod config;
pub mod db;
pub mod error;
pub mod export;
pub mod import;
pub mod models;
pub mod permissions;
pub mod publishing;
pub mod settings;
pub mod state;
pub mod storage;
pub mod structured_data;
pub mod versions;
pub mod workflow;

pub use config::Config;
pub use error::{AppError, AppResult};
pub use state::AppState;
