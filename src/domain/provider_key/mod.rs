//! Stored provider API keys
//!
//! Secrets are kept encrypted at rest and are only ever returned masked.
//! Validation against the provider is modelled as data ([`KeyValidation`])
//! rather than errors, since an invalid key is an expected outcome.

mod entity;
mod repository;
mod secret;
mod validation;

pub use entity::{MASKED_KEY, ProviderKey, ProviderKeyId, ProviderKeySummary};
pub use repository::ProviderKeyRepository;
pub use secret::{AdminKeyKind, KeyCipher, admin_key_kind, mask_secret};
pub use validation::{ADMIN_CAPABILITIES, AdminKeyCheck, KeyValidation, KeyValidator};

#[cfg(test)]
pub use validation::mock;
