// Library exports for the binary and for testing
pub mod classifier;
pub mod config;
pub mod constants;
pub mod dispatcher;
pub mod environment;
pub mod error;
pub mod event;
pub mod host;
pub mod monitor;
pub mod output;
pub mod sound;
pub mod tone;
