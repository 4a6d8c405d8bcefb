//! Offline catalog commands: use-case search, model recommendation and the model table

use crate::domain::provider::{ModelListing, ModelQuery, ProviderCatalog};
use crate::domain::use_case::{ModelRecommendation, ScoredUseCase, UseCaseCatalog};

use super::{ModelsArgs, RecommendArgs, SearchArgs};

pub fn run_search(args: SearchArgs) -> anyhow::Result<()> {
    let results = UseCaseCatalog::embedded().search(&args.query, args.limit.max(1));

    if results.is_empty() {
        println!("No use cases match \"{}\"", args.query);
        return Ok(());
    }

    for line in results.iter().map(format_match) {
        println!("{}", line);
    }
    Ok(())
}

pub fn run_recommend(args: RecommendArgs) -> anyhow::Result<()> {
    let recommendation =
        UseCaseCatalog::embedded().recommend(&args.prompt, ProviderCatalog::embedded());

    for line in format_recommendation(&recommendation) {
        println!("{}", line);
    }
    Ok(())
}

pub fn run_models(args: ModelsArgs) -> anyhow::Result<()> {
    let catalog = ProviderCatalog::embedded();
    let query = ModelQuery::from_params(
        args.provider.as_deref(),
        args.search.as_deref(),
        args.price.as_deref(),
        args.sort.as_deref(),
    );
    let models = catalog.explore(&query);

    println!("Pricing last updated: {}", catalog.pricing_last_updated());
    println!(
        "{:<12} {:<32} {:>10} {:>10} {:>8}  {}",
        "PROVIDER", "MODEL", "INPUT/1M", "OUTPUT/1M", "CONTEXT", "TIER"
    );
    for line in models.iter().map(format_listing) {
        println!("{}", line);
    }
    Ok(())
}

fn format_match(result: &ScoredUseCase<'_>) -> String {
    let use_case = result.use_case;
    format!(
        "[{:>3}] {} ({}) -> {}",
        result.score, use_case.title, use_case.category, use_case.recommended_models.primary
    )
}

fn format_recommendation(recommendation: &ModelRecommendation<'_>) -> Vec<String> {
    let mut lines = vec![format!(
        "{} (confidence {:.0}%)",
        recommendation.model,
        recommendation.confidence * 100.0
    )];

    if let Some(tokens) = recommendation.estimated_tokens {
        let cost = recommendation
            .estimated_cost
            .map_or_else(|| "unpriced".to_string(), |cost| format!("${:.6}", cost));
        lines.push(format!("~{} tokens per request, {}", tokens.total(), cost));
    }
    lines.extend(recommendation.use_cases.iter().map(format_match));
    lines
}

fn format_listing(model: &ModelListing) -> String {
    let mut tier = format!("{:?}", model.speed_tier);
    if model.recommended {
        tier.push_str(" *");
    }
    if model.beta {
        tier.push_str(" beta");
    }

    format!(
        "{:<12} {:<32} {:>10.2} {:>10.2} {:>8}  {}",
        model.provider_id, model.name, model.input_price, model.output_price, model.context, tier
    )
}
