pub mod config;
pub mod constants;
pub mod reference;

pub use config::{ConfigError, EllipticityConfig, load_config};
pub use reference::{
    ModelSource, SUPPORTED_MODELS, ak135, build_ak135, build_prem, prem, reference_model,
};
