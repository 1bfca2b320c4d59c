//! Plain-text rendering of catalog state for the terminal.

use crate::cache::MirrorSnapshot;
use crate::catalog::types::Product;
use crate::store::{CatalogState, OperationKind, OperationStatus};

/// Truncate a string to a maximum number of characters, adding "..." if truncated
pub fn truncate(s: &str, max_len: usize) -> String {
  if s.chars().count() <= max_len {
    s.to_string()
  } else {
    let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
    format!("{}...", kept)
  }
}

pub fn format_price(price: f64) -> String {
  format!("${:.2}", price)
}

/// One row per product: id, price, category, title
pub fn product_table(products: &[Product]) -> String {
  if products.is_empty() {
    return "No products.".to_string();
  }

  let id_width = products
    .iter()
    .map(|p| p.id.as_str().chars().count())
    .max()
    .unwrap_or(2)
    .max(2);

  let mut out = format!(
    "{:<id_width$}  {:>10}  {:<18}  {}\n",
    "ID", "PRICE", "CATEGORY", "TITLE"
  );
  for p in products {
    out.push_str(&format!(
      "{:<id_width$}  {:>10}  {:<18}  {}\n",
      p.id.as_str(),
      format_price(p.price),
      truncate(&p.category, 18),
      truncate(&p.title, 60)
    ));
  }
  out.pop();
  out
}

pub fn product_detail(product: &Product) -> String {
  format!(
    "{}\n  id:          {}\n  price:       {}\n  category:    {}\n  image:       {}\n\n{}",
    product.title,
    product.id,
    format_price(product.price),
    product.category,
    product.image,
    product.description
  )
}

/// Short description of where the seeded list came from
pub fn mirror_summary(snapshot: Option<&MirrorSnapshot<Product>>) -> String {
  match snapshot {
    None => "No cached catalog.".to_string(),
    Some(s) => format!(
      "Cached catalog: {} products, saved {} ago.",
      s.items.len(),
      human_age(s.age())
    ),
  }
}

fn human_age(age: chrono::Duration) -> String {
  let secs = age.num_seconds().max(0);
  match secs {
    0..=59 => format!("{}s", secs),
    60..=3599 => format!("{}m", secs / 60),
    3600..=86_399 => format!("{}h", secs / 3600),
    _ => format!("{}d", secs / 86_400),
  }
}

/// One line per operation that has run, e.g. "fetch: failed"
pub fn status_lines(state: &CatalogState) -> Vec<String> {
  OperationKind::ALL
    .iter()
    .filter_map(|&kind| {
      let label = match state.status(kind) {
        OperationStatus::Idle => return None,
        OperationStatus::Pending => "pending",
        OperationStatus::Succeeded => "ok",
        OperationStatus::Failed => "failed",
      };
      Some(format!("{}: {}", kind.label(), label))
    })
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::catalog::types::ProductId;
  use crate::store::Action;

  fn product(id: &str, title: &str) -> Product {
    Product {
      id: ProductId::from(id),
      title: title.to_string(),
      price: 3.5,
      category: "kitchen".to_string(),
      description: "Holds coffee".to_string(),
      image: "https://img/mug.png".to_string(),
    }
  }

  #[test]
  fn test_truncate_short_string() {
    assert_eq!(truncate("hello", 10), "hello");
  }

  #[test]
  fn test_truncate_exact_length() {
    assert_eq!(truncate("hello", 5), "hello");
  }

  #[test]
  fn test_truncate_long_string() {
    assert_eq!(truncate("hello world", 8), "hello...");
  }

  #[test]
  fn test_truncate_multibyte() {
    assert_eq!(truncate("ÉÉÉÉÉÉÉÉ", 5), "ÉÉ...");
  }

  #[test]
  fn test_format_price() {
    assert_eq!(format_price(109.95), "$109.95");
    assert_eq!(format_price(7.0), "$7.00");
  }

  #[test]
  fn test_empty_table() {
    assert_eq!(product_table(&[]), "No products.");
  }

  #[test]
  fn test_table_rows() {
    let table = product_table(&[product("1", "Mug"), product("12", "Big mug")]);
    let lines: Vec<&str> = table.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("ID"));
    assert!(lines[1].starts_with("1 "));
    assert!(lines[2].contains("$3.50"));
    assert!(lines[2].ends_with("Big mug"));
  }

  #[test]
  fn test_detail_includes_description() {
    let detail = product_detail(&product("1", "Mug"));
    assert!(detail.starts_with("Mug\n"));
    assert!(detail.ends_with("Holds coffee"));
  }

  #[test]
  fn test_human_age() {
    assert_eq!(human_age(chrono::Duration::seconds(42)), "42s");
    assert_eq!(human_age(chrono::Duration::minutes(5)), "5m");
    assert_eq!(human_age(chrono::Duration::hours(3)), "3h");
    assert_eq!(human_age(chrono::Duration::days(2)), "2d");
  }

  #[test]
  fn test_status_lines_skip_idle() {
    let mut state = CatalogState::default();
    assert!(status_lines(&state).is_empty());

    state.apply(Action::Pending(OperationKind::Fetch));
    state.apply(Action::Failed {
      kind: OperationKind::Delete,
      reason: None,
    });
    assert_eq!(status_lines(&state), vec!["fetch: pending", "delete: failed"]);
  }
}
