//! Infrastructure layer: providers, stores and the services built on them

pub mod api_key;
pub mod auth;
pub mod cache;
pub mod llm;
pub mod logging;
pub mod services;
pub mod storage;
pub mod usage;
