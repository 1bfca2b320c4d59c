//! Serde types matching the product resource's responses.
//!
//! The resource is trusted to return product-shaped entities, but an entity
//! without an id cannot enter the store, so the id is optional here and
//! checked on conversion.

use serde::Deserialize;

use super::types::{Product, ProductId};

#[derive(Debug, Deserialize)]
pub struct ApiProduct {
  pub id: Option<ProductId>,
  #[serde(default)]
  pub title: String,
  #[serde(default)]
  pub price: f64,
  #[serde(default)]
  pub category: String,
  #[serde(default)]
  pub description: String,
  #[serde(default)]
  pub image: String,
}

impl ApiProduct {
  /// Convert into a domain product, or `None` if the entity has no id.
  pub fn into_product(self) -> Option<Product> {
    Some(Product {
      id: self.id?,
      title: self.title,
      price: self.price,
      category: self.category,
      description: self.description,
      image: self.image,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_entity_without_id_is_rejected() {
    let api: ApiProduct = serde_json::from_str(r#"{"title": "Ghost"}"#).unwrap();
    assert!(api.into_product().is_none());
  }

  #[test]
  fn test_null_id_is_rejected() {
    let api: ApiProduct = serde_json::from_str(r#"{"id": null, "title": "Ghost"}"#).unwrap();
    assert!(api.into_product().is_none());
  }

  #[test]
  fn test_entity_with_id_converts() {
    let api: ApiProduct =
      serde_json::from_str(r#"{"id": "12", "title": "Bag", "price": 109.95}"#).unwrap();
    let product = api.into_product().unwrap();
    assert_eq!(product.id, ProductId::from(12i64));
    assert_eq!(product.price, 109.95);
  }
}
