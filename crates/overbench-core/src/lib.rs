// Domain modules
pub mod config;
pub mod distro;
pub mod error;
pub mod naming;
pub mod stats;

pub use config::{TestConfig, TestConfigBuilder};
pub use distro::DistroConfig;
pub use error::{OverbenchError, Result};
pub use naming::{NamingConvention, NamingConventions};
