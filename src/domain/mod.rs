//! Domain layer: entities, pure algorithms and persistence traits

pub mod error;
pub mod identity;
pub mod provider;
pub mod provider_key;
pub mod storage;
pub mod team;
pub mod usage;
pub mod use_case;

pub use error::DomainError;
