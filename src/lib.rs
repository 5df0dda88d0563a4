pub mod bootstrap;
pub mod cacher;
pub mod cli;
pub mod cloud;
pub mod components;
pub mod config;
pub mod constants;
pub mod datamodel;
pub mod defaults;
pub mod distro;
pub mod error;
pub mod exec;
pub mod overrides;
pub mod sig;
pub mod sku;
pub mod versions;

pub use error::{Error, Result};
