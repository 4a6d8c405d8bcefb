//! Infrastructure layer: storage backends, services, provider HTTP and observability

pub mod keyed_lock;
pub mod logging;
pub mod observability;
pub mod provider_key;
pub mod storage;
pub mod team;
pub mod usage;
