pub mod channel;
pub mod check;
pub mod config;
pub mod diagnostics;
pub mod docs;
pub mod error;
pub mod event_log;
pub mod identity;
pub mod io;
pub mod paths;
pub mod promote;
pub mod repair;
pub mod tools;
pub mod update;
pub mod version;

pub use error::{Result, VeilError};
