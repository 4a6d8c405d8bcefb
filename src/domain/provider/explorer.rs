//! Model explorer: flatten the provider table, then filter and sort it

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use super::catalog::ProviderCatalog;
use super::entity::{AiModel, AiProvider};

static CONTEXT_K_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d+)[kK]").unwrap());

const BUDGET_CEILING: f64 = 5.0;
const MID_CEILING: f64 = 20.0;

/// Leading integer of a `NNNk` context string; anything else is 0
pub fn parse_context_k(context: &str) -> u32 {
    CONTEXT_K_PATTERN
        .captures(context.trim())
        .and_then(|caps| caps[1].parse().ok())
        .unwrap_or(0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceBucket {
    Budget,
    Mid,
    Premium,
}

impl PriceBucket {
    pub fn for_average(average_price: f64) -> Self {
        if average_price < BUDGET_CEILING {
            Self::Budget
        } else if average_price <= MID_CEILING {
            Self::Mid
        } else {
            Self::Premium
        }
    }
}

/// Derived from a model's position in its provider's list
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum SpeedTier {
    #[serde(rename = "Fast")]
    Fast,
    #[serde(rename = "Very Fast")]
    VeryFast,
    #[serde(rename = "Ultra Fast")]
    UltraFast,
}

impl SpeedTier {
    pub fn for_position(position: usize) -> Self {
        match position {
            0 => Self::Fast,
            1 => Self::VeryFast,
            _ => Self::UltraFast,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PriceFilter {
    #[default]
    All,
    Only(PriceBucket),
}

impl PriceFilter {
    /// Unknown values mean no filtering
    pub fn from_param(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "budget" => Self::Only(PriceBucket::Budget),
            "mid" => Self::Only(PriceBucket::Mid),
            "premium" => Self::Only(PriceBucket::Premium),
            _ => Self::All,
        }
    }

    fn accepts(&self, bucket: PriceBucket) -> bool {
        match self {
            Self::All => true,
            Self::Only(wanted) => *wanted == bucket,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    #[default]
    Price,
    Performance,
    Context,
}

impl SortKey {
    /// Unknown values sort by price
    pub fn from_param(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "performance" => Self::Performance,
            "context" => Self::Context,
            _ => Self::Price,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelQuery {
    /// `None` matches every provider
    pub provider: Option<String>,
    pub search: String,
    pub price: PriceFilter,
    pub sort: SortKey,
}

impl ModelQuery {
    /// Builds a query from raw request parameters; `all` and blanks mean unset
    pub fn from_params(
        provider: Option<&str>,
        search: Option<&str>,
        price: Option<&str>,
        sort: Option<&str>,
    ) -> Self {
        let provider = provider
            .map(str::trim)
            .filter(|p| !p.is_empty() && !p.eq_ignore_ascii_case("all"))
            .map(str::to_string);

        Self {
            provider,
            search: search.unwrap_or_default().trim().to_string(),
            price: price.map(PriceFilter::from_param).unwrap_or_default(),
            sort: sort.map(SortKey::from_param).unwrap_or_default(),
        }
    }
}

/// One row of the explorer table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelListing {
    pub provider_id: String,
    pub provider_name: String,
    pub name: String,
    pub model_id: String,
    pub input_price: f64,
    pub output_price: f64,
    pub average_price: f64,
    pub context: String,
    pub context_k: u32,
    pub price_bucket: PriceBucket,
    pub speed_tier: SpeedTier,
    pub recommended: bool,
    pub beta: bool,
}

impl ModelListing {
    fn new(provider: &AiProvider, position: usize, model: &AiModel) -> Self {
        let average_price = model.average_price();

        Self {
            provider_id: provider.id.clone(),
            provider_name: provider.name.clone(),
            name: model.name.clone(),
            model_id: model.model_id.clone(),
            input_price: model.input_price,
            output_price: model.output_price,
            average_price,
            context: model.context.clone(),
            context_k: parse_context_k(&model.context),
            price_bucket: PriceBucket::for_average(average_price),
            speed_tier: SpeedTier::for_position(position),
            recommended: position == 0,
            beta: provider.id == "grok",
        }
    }

    fn matches_search(&self, needle: &str) -> bool {
        [&self.name, &self.model_id, &self.provider_name]
            .iter()
            .any(|field| field.to_lowercase().contains(needle))
    }
}

impl ProviderCatalog {
    /// Every model of every enabled provider, in table order
    pub fn listings(&self) -> Vec<ModelListing> {
        self.providers()
            .iter()
            .flat_map(|provider| {
                provider
                    .models
                    .iter()
                    .enumerate()
                    .map(move |(position, model)| ModelListing::new(provider, position, model))
            })
            .collect()
    }

    pub fn explore(&self, query: &ModelQuery) -> Vec<ModelListing> {
        let needle = query.search.to_lowercase();

        let mut listings: Vec<ModelListing> = self
            .listings()
            .into_iter()
            .filter(|l| query.provider.as_deref().is_none_or(|p| l.provider_id == p))
            .filter(|l| needle.is_empty() || l.matches_search(&needle))
            .filter(|l| query.price.accepts(l.price_bucket))
            .collect();

        match query.sort {
            SortKey::Price => {
                listings.sort_by(|a, b| a.average_price.total_cmp(&b.average_price))
            }
            SortKey::Performance => listings.sort_by(|a, b| b.speed_tier.cmp(&a.speed_tier)),
            SortKey::Context => listings.sort_by(|a, b| b.context_k.cmp(&a.context_k)),
        }

        listings
    }
}
