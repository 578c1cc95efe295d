//! High-level grounding module

pub mod builder;
pub mod config;
pub mod engine;

pub use builder::EngineBuilder;
pub use config::{AdaptiveConfig, DebugConfig, GroundingConfig, TemplateSource};
pub use engine::{LocateResult, MultiStrategyEngine};
