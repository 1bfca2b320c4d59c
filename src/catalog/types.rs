use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Product identifier, normalized at ingestion.
///
/// The remote resource hands out numeric ids while hand-built payloads often
/// carry them as strings. Both are folded into one canonical text form so
/// that `1` and `"1"` name the same product everywhere in the store.
/// An id whose text is the canonical form of a JSON number serializes back
/// as that number, so numeric ids keep their type across the mirror and the
/// remote resource.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProductId(String);

impl ProductId {
  pub fn new(raw: impl Into<String>) -> Self {
    Self(raw.into())
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }

  /// The JSON number this id denotes, if its text is that number's
  /// canonical form. "01" and "1.0" stay textual.
  pub fn as_number(&self) -> Option<serde_json::Number> {
    let number: serde_json::Number = self.0.parse().ok()?;
    let canonical = match number.as_f64() {
      Some(v) if number.is_f64() => float_text(v),
      _ => number.to_string(),
    };
    (canonical == self.0).then_some(number)
  }
}

/// Text of a float id: integral values fold into the integer form.
fn float_text(v: f64) -> String {
  if v.is_finite() && v.fract() == 0.0 && v.abs() < i64::MAX as f64 {
    (v as i64).to_string()
  } else {
    serde_json::Number::from_f64(v)
      .map(|n| n.to_string())
      .unwrap_or_else(|| v.to_string())
  }
}

impl fmt::Display for ProductId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

impl From<i64> for ProductId {
  fn from(n: i64) -> Self {
    Self(n.to_string())
  }
}

impl From<u64> for ProductId {
  fn from(n: u64) -> Self {
    Self(n.to_string())
  }
}

impl From<&str> for ProductId {
  fn from(s: &str) -> Self {
    Self(s.to_string())
  }
}

impl From<String> for ProductId {
  fn from(s: String) -> Self {
    Self(s)
  }
}

impl Serialize for ProductId {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    match self.as_number() {
      Some(n) => n.serialize(serializer),
      None => serializer.serialize_str(&self.0),
    }
  }
}

impl<'de> Deserialize<'de> for ProductId {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    struct IdVisitor;

    impl Visitor<'_> for IdVisitor {
      type Value = ProductId;

      fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a product id (number or string)")
      }

      fn visit_i64<E: de::Error>(self, v: i64) -> Result<ProductId, E> {
        Ok(ProductId::from(v))
      }

      fn visit_u64<E: de::Error>(self, v: u64) -> Result<ProductId, E> {
        Ok(ProductId::from(v))
      }

      fn visit_f64<E: de::Error>(self, v: f64) -> Result<ProductId, E> {
        Ok(ProductId(float_text(v)))
      }

      fn visit_str<E: de::Error>(self, v: &str) -> Result<ProductId, E> {
        Ok(ProductId::from(v))
      }

      fn visit_string<E: de::Error>(self, v: String) -> Result<ProductId, E> {
        Ok(ProductId(v))
      }
    }

    deserializer.deserialize_any(IdVisitor)
  }
}

/// A catalog entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
  pub id: ProductId,
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

/// Product fields without an identity, as sent in create and update bodies
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductDraft {
  pub title: String,
  pub price: f64,
  pub category: String,
  pub description: String,
  pub image: String,
}

impl Product {
  /// Split the identity from the remaining fields.
  pub fn into_parts(self) -> (ProductId, ProductDraft) {
    (
      self.id,
      ProductDraft {
        title: self.title,
        price: self.price,
        category: self.category,
        description: self.description,
        image: self.image,
      },
    )
  }
}

impl ProductDraft {
  pub fn with_id(self, id: ProductId) -> Product {
    Product {
      id,
      title: self.title,
      price: self.price,
      category: self.category,
      description: self.description,
      image: self.image,
    }
  }
}
