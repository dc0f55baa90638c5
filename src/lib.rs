pub mod error;

pub mod config;

pub mod conf;
pub mod hadoop;

pub mod runtime;

pub mod resource;

pub mod connection;

pub mod catalog;
pub mod function;
pub mod listener;
pub mod services;
pub mod streaming;

pub mod session;

pub use error::{Error, Result};
pub use session::builder::SessionStateBuilder;
pub use session::state::SessionState;
pub use session::Session;
