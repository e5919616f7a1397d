//! Reconciles ranked candidate ids with fetched product records

use std::cmp::Ordering;
use std::collections::HashMap;

use serde::Serialize;

use crate::domain::DomainError;
use crate::domain::catalog::ProductSummary;

/// A product as returned to the caller
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MergedProduct {
    #[serde(flatten)]
    pub product: ProductSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_score: Option<f32>,
    pub is_wishlisted: bool,
}

impl MergedProduct {
    pub fn ranked(product: ProductSummary, score: f32) -> Self {
        Self {
            product,
            ai_score: Some(score),
            is_wishlisted: false,
        }
    }

    pub fn unranked(product: ProductSummary) -> Self {
        Self {
            product,
            ai_score: None,
            is_wishlisted: false,
        }
    }

    pub fn id(&self) -> &str {
        &self.product.id
    }
}

/// Rebuilds the candidate order from `product_ids`, attaching the aligned
/// score and dropping ids with no fetched record, then sorts by score.
///
/// `products` may arrive in any order. A duplicated id keeps its first
/// position.
pub fn merge_ranked(
    product_ids: &[String],
    scores: &[f32],
    products: Vec<ProductSummary>,
) -> Result<Vec<MergedProduct>, DomainError> {
    if product_ids.len() != scores.len() {
        return Err(DomainError::malformed_cache_entry(format!(
            "{} product ids but {} scores",
            product_ids.len(),
            scores.len()
        )));
    }

    let mut by_id: HashMap<String, ProductSummary> = products
        .into_iter()
        .map(|p| (p.id.clone(), p))
        .collect();

    let merged = product_ids
        .iter()
        .zip(scores)
        .filter_map(|(id, score)| by_id.remove(id).map(|p| MergedProduct::ranked(p, *score)))
        .collect();

    Ok(sort_by_score(merged))
}

/// Lexical fallback: fetch order is kept and no score is attached
pub fn merge_unranked(products: Vec<ProductSummary>) -> Vec<MergedProduct> {
    sort_by_score(products.into_iter().map(MergedProduct::unranked).collect())
}

/// Stable descending sort by `ai_score`; unscored records sort last and keep
/// their relative order. Applying it twice yields the same sequence.
pub fn sort_by_score(mut products: Vec<MergedProduct>) -> Vec<MergedProduct> {
    products.sort_by(|a, b| compare_scores(b.ai_score, a.ai_score));
    products
}

fn compare_scores(a: Option<f32>, b: Option<f32>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.total_cmp(&b),
        (Some(_), None) => Ordering::Greater,
        (None, Some(_)) => Ordering::Less,
        (None, None) => Ordering::Equal,
    }
}
