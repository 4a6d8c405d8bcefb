//! Provider key infrastructure: storage, HTTP validation and the key service

mod repository;
mod service;
mod validator;

pub use repository::StorageProviderKeyRepository;
pub use service::{DEFAULT_SECRET_CACHE_TTL, ProviderKeyService, SavedProviderKey};
pub use validator::{HttpKeyValidator, ProviderEndpoints};
