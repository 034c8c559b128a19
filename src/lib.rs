pub mod app;
pub mod config;
pub mod launch;
pub mod process;
pub mod runtime;
pub mod shared;
