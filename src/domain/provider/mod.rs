//! AI providers: the supported vendors, their pricing table and the model explorer

mod catalog;
mod entity;
mod explorer;

pub use catalog::{EMBEDDED_PROVIDERS, ProviderCatalog};
pub use entity::{AiModel, AiProvider, Provider};
pub use explorer::{
    ModelListing, ModelQuery, PriceBucket, PriceFilter, SortKey, SpeedTier, parse_context_k,
};
