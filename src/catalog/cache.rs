//! Mirror binding for catalog types.

use crate::cache::Cacheable;

use super::types::Product;

/// Namespace the canonical product list is mirrored under.
pub const PRODUCTS_NAMESPACE: &str = "products";

impl Cacheable for Product {
  fn namespace() -> &'static str {
    PRODUCTS_NAMESPACE
  }
}
