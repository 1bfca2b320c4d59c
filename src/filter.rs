use crate::catalog::types::Product;
use std::collections::BTreeSet;

/// Presentation-side filter used to compute the `filtered` view.
///
/// Both criteria are optional; an empty filter keeps everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductFilter {
  /// Exact category match (case-insensitive)
  pub category: Option<String>,
  /// Substring match against title and description (case-insensitive)
  pub query: Option<String>,
}

impl ProductFilter {
  pub fn new(category: Option<String>, query: Option<String>) -> Self {
    let non_blank = |s: String| {
      let trimmed = s.trim().to_string();
      (!trimmed.is_empty()).then_some(trimmed)
    };
    Self {
      category: category.and_then(non_blank),
      query: query.and_then(non_blank),
    }
  }

  /// Check if any criterion is set
  pub fn is_active(&self) -> bool {
    self.category.is_some() || self.query.is_some()
  }

  pub fn matches(&self, product: &Product) -> bool {
    let category_ok = self
      .category
      .as_ref()
      .map(|c| product.category.eq_ignore_ascii_case(c))
      .unwrap_or(true);

    let query_ok = self
      .query
      .as_ref()
      .map(|q| {
        let q = q.to_lowercase();
        product.title.to_lowercase().contains(&q) || product.description.to_lowercase().contains(&q)
      })
      .unwrap_or(true);

    category_ok && query_ok
  }

  /// Matching products, in list order.
  pub fn apply(&self, items: &[Product]) -> Vec<Product> {
    items.iter().filter(|p| self.matches(p)).cloned().collect()
  }
}

/// Distinct non-empty categories, sorted, for category tabs.
pub fn unique_categories(items: &[Product]) -> Vec<String> {
  items
    .iter()
    .map(|p| p.category.clone())
    .filter(|c| !c.is_empty())
    .collect::<BTreeSet<_>>()
    .into_iter()
    .collect()
}
