//! Heuristic product recommendations.
//!
//! Three strategies each nominate candidates for a seed product; a
//! fixed-weight merge accumulates scores for products nominated by more
//! than one strategy. The merge is pure; candidate collection is plain
//! repository queries.

use rust_decimal::Decimal;
use serde::Serialize;

use golden_fig_core::ProductId;

use crate::db::{ProductRepository, RepositoryError};
use crate::models::product::{Product, ProductSummary};

/// Weight for the same-category strategy.
const CATEGORY_WEIGHT: Decimal = Decimal::from_parts(5, 0, 0, false, 1); // 0.5
/// Weight for the price-band strategy.
const PRICE_WEIGHT: Decimal = Decimal::from_parts(3, 0, 0, false, 1); // 0.3
/// Weight for the rating strategy.
const RATING_WEIGHT: Decimal = Decimal::from_parts(2, 0, 0, false, 1); // 0.2

/// Price band around the seed: +/- 25%.
const PRICE_BAND_RATIO: Decimal = Decimal::from_parts(25, 0, 0, false, 2); // 0.25

/// Minimum average rating for the rating strategy.
const MIN_RATING: Decimal = Decimal::from_parts(4, 0, 0, false, 0); // 4.0

/// Five-star scale divisor for rating scores.
const RATING_SCALE: Decimal = Decimal::from_parts(5, 0, 0, false, 0); // 5

/// How many candidates each strategy may nominate.
const CANDIDATES_PER_STRATEGY: i64 = 24;

/// Default number of recommendations returned.
pub const DEFAULT_LIMIT: usize = 8;

/// Candidates nominated by each strategy.
#[derive(Debug, Default)]
pub struct CandidateSets {
    pub same_category: Vec<ProductSummary>,
    pub price_band: Vec<ProductSummary>,
    pub top_rated: Vec<ProductSummary>,
}

/// A recommended product with its merged score.
#[derive(Debug, Clone, Serialize)]
pub struct ScoredProduct {
    pub product: ProductSummary,
    pub score: Decimal,
}

/// Merge strategy candidates into a ranked recommendation list.
///
/// Category and price-band hits contribute their full strategy weight;
/// rating hits contribute `weight * average_rating / 5`. Products
/// nominated by several strategies accumulate. The seed is excluded and
/// ties break by ascending product id so results are deterministic.
#[must_use]
pub fn merge(seed: ProductId, sets: CandidateSets, limit: usize) -> Vec<ScoredProduct> {
    let mut scores: std::collections::BTreeMap<ProductId, (ProductSummary, Decimal)> =
        std::collections::BTreeMap::new();

    let mut accumulate = |candidate: ProductSummary, score: Decimal| {
        if candidate.id == seed {
            return;
        }
        scores
            .entry(candidate.id)
            .and_modify(|(_, total)| *total += score)
            .or_insert((candidate, score));
    };

    for candidate in sets.same_category {
        accumulate(candidate, CATEGORY_WEIGHT);
    }
    for candidate in sets.price_band {
        accumulate(candidate, PRICE_WEIGHT);
    }
    for candidate in sets.top_rated {
        let rating = candidate.average_rating.unwrap_or(MIN_RATING);
        accumulate(candidate, RATING_WEIGHT * rating / RATING_SCALE);
    }

    let mut ranked: Vec<ScoredProduct> = scores
        .into_values()
        .map(|(product, score)| ScoredProduct { product, score })
        .collect();

    // BTreeMap iteration already ordered by id; stable sort keeps that as
    // the tie-break.
    ranked.sort_by(|a, b| b.score.cmp(&a.score));
    ranked.truncate(limit);
    ranked
}

/// Collect candidates for a seed product and merge them.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if a candidate query fails.
pub async fn recommend(
    repo: &ProductRepository<'_>,
    seed: &Product,
    limit: usize,
) -> Result<Vec<ScoredProduct>, RepositoryError> {
    let same_category = match &seed.category {
        Some(category) => {
            repo.in_category(category.id, seed.id, CANDIDATES_PER_STRATEGY)
                .await?
        }
        None => Vec::new(),
    };

    let band = seed.price.amount * PRICE_BAND_RATIO;
    let price_band = repo
        .in_price_band(
            (seed.price.amount - band).max(Decimal::ZERO),
            seed.price.amount + band,
            seed.id,
            CANDIDATES_PER_STRATEGY,
        )
        .await?;

    let top_rated = repo
        .top_rated(MIN_RATING, seed.id, CANDIDATES_PER_STRATEGY)
        .await?;

    Ok(merge(
        seed.id,
        CandidateSets {
            same_category,
            price_band,
            top_rated,
        },
        limit,
    ))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use golden_fig_core::{CurrencyCode, Price};

    fn summary(id: i32, rating: Option<Decimal>) -> ProductSummary {
        ProductSummary {
            id: ProductId::new(id),
            name: format!("Product {id}"),
            slug: format!("product-{id}"),
            price: Price::new(Decimal::new(1000, 2), CurrencyCode::USD),
            category_id: None,
            average_rating: rating,
            primary_image_url: None,
        }
    }

    #[test]
    fn test_multi_strategy_hits_accumulate() {
        let sets = CandidateSets {
            same_category: vec![summary(2, None), summary(3, None)],
            price_band: vec![summary(2, None)],
            top_rated: vec![],
        };
        let ranked = merge(ProductId::new(1), sets, DEFAULT_LIMIT);

        assert_eq!(ranked.first().unwrap().product.id, ProductId::new(2));
        assert_eq!(ranked.first().unwrap().score, Decimal::new(8, 1)); // 0.5 + 0.3
        assert_eq!(ranked.get(1).unwrap().product.id, ProductId::new(3));
        assert_eq!(ranked.get(1).unwrap().score, Decimal::new(5, 1));
    }

    #[test]
    fn test_seed_excluded() {
        let sets = CandidateSets {
            same_category: vec![summary(1, None), summary(2, None)],
            price_band: vec![summary(1, None)],
            top_rated: vec![],
        };
        let ranked = merge(ProductId::new(1), sets, DEFAULT_LIMIT);
        assert!(ranked.iter().all(|s| s.product.id != ProductId::new(1)));
    }

    #[test]
    fn test_rating_score_scales_with_average() {
        let sets = CandidateSets {
            same_category: vec![],
            price_band: vec![],
            top_rated: vec![
                summary(2, Some(Decimal::new(5, 0))),
                summary(3, Some(Decimal::new(4, 0))),
            ],
        };
        let ranked = merge(ProductId::new(1), sets, DEFAULT_LIMIT);

        // 0.2 * 5/5 = 0.2, 0.2 * 4/5 = 0.16
        assert_eq!(ranked.first().unwrap().product.id, ProductId::new(2));
        assert_eq!(ranked.first().unwrap().score, Decimal::new(2, 1));
        assert_eq!(ranked.get(1).unwrap().score, Decimal::new(16, 2));
    }

    #[test]
    fn test_ties_break_by_id() {
        let sets = CandidateSets {
            same_category: vec![summary(9, None), summary(4, None)],
            price_band: vec![],
            top_rated: vec![],
        };
        let ranked = merge(ProductId::new(1), sets, DEFAULT_LIMIT);
        assert_eq!(ranked.first().unwrap().product.id, ProductId::new(4));
        assert_eq!(ranked.get(1).unwrap().product.id, ProductId::new(9));
    }

    #[test]
    fn test_limit_truncates() {
        let sets = CandidateSets {
            same_category: (2..20).map(|id| summary(id, None)).collect(),
            price_band: vec![],
            top_rated: vec![],
        };
        let ranked = merge(ProductId::new(1), sets, 5);
        assert_eq!(ranked.len(), 5);
    }
}
