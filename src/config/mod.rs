// src/config/mod.rs
//! Service configuration (`config/dam.toml` + env overrides).

pub mod service;

pub use service::{
    DamConfig, HttpSection, LimitsSection, OracleSection, ScoringSection, ServiceSection,
    DEFAULT_CONFIG_PATH, ENV_CONFIG_PATH,
};
