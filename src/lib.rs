pub mod config;
pub mod constants;
pub mod error;
pub mod identity;
pub mod logging;
pub mod service;
pub mod session;
pub mod store;
pub mod wizard;

// Domain data shapes shared across layers
pub mod domain;
