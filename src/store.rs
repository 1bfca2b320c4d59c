//! Catalog store: canonical product list, the filtered view, and
//! per-operation status.
//!
//! Every change goes through [`CatalogState::apply`], a total function over
//! the current state and an [`Action`]. [`CatalogStore`] pairs the state
//! with the durable mirror and writes the list out whenever a transition
//! changes it.

use crate::cache::DurableMirror;
use crate::catalog::types::{Product, ProductId};
use crate::filter;

/// Message shown when fetching the product list fails
pub const FETCH_FAILED: &str = "Failed to fetch products";

/// The four remote operation families
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
  Fetch,
  Create,
  Update,
  Delete,
}

impl OperationKind {
  pub const ALL: [OperationKind; 4] = [
    OperationKind::Fetch,
    OperationKind::Create,
    OperationKind::Update,
    OperationKind::Delete,
  ];

  pub fn label(self) -> &'static str {
    match self {
      OperationKind::Fetch => "fetch",
      OperationKind::Create => "create",
      OperationKind::Update => "update",
      OperationKind::Delete => "delete",
    }
  }

  /// Error message used when a failure carries no reason
  pub fn fallback_error(self) -> &'static str {
    match self {
      OperationKind::Fetch => FETCH_FAILED,
      OperationKind::Create => "Failed to create product",
      OperationKind::Update => "Failed to update product",
      OperationKind::Delete => "Failed to delete product",
    }
  }
}

/// Status of the latest operation of one kind
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OperationStatus {
  #[default]
  Idle,
  Pending,
  Succeeded,
  Failed,
}

/// Status per operation kind, so concurrent operations of different kinds
/// never overwrite each other's progress.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusRecord {
  fetch: OperationStatus,
  create: OperationStatus,
  update: OperationStatus,
  delete: OperationStatus,
}

impl StatusRecord {
  pub fn get(&self, kind: OperationKind) -> OperationStatus {
    match kind {
      OperationKind::Fetch => self.fetch,
      OperationKind::Create => self.create,
      OperationKind::Update => self.update,
      OperationKind::Delete => self.delete,
    }
  }

  fn set(&mut self, kind: OperationKind, status: OperationStatus) {
    let slot = match kind {
      OperationKind::Fetch => &mut self.fetch,
      OperationKind::Create => &mut self.create,
      OperationKind::Update => &mut self.update,
      OperationKind::Delete => &mut self.delete,
    };
    *slot = status;
  }
}

/// A state transition
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
  /// An operation of this kind was dispatched
  Pending(OperationKind),
  /// Replace the list with the remote collection
  FetchSucceeded(Vec<Product>),
  /// Append the created product
  CreateSucceeded(Product),
  /// Replace the matching product; `None` when the server returned no id
  UpdateSucceeded(Option<Product>),
  /// Remove the product from both views
  DeleteSucceeded(ProductId),
  /// An operation failed; `reason` is the rendered transport error
  Failed {
    kind: OperationKind,
    reason: Option<String>,
  },
  /// Local override of a product, independent of any remote call
  SetProduct(Product),
  /// Replace the filtered view
  SetFiltered(Vec<Product>),
  /// Remove a product from the filtered view only
  RemoveFromFiltered(ProductId),
}

impl Action {
  pub fn name(&self) -> &'static str {
    match self {
      Action::Pending(_) => "pending",
      Action::FetchSucceeded(_) => "fetch_succeeded",
      Action::CreateSucceeded(_) => "create_succeeded",
      Action::UpdateSucceeded(_) => "update_succeeded",
      Action::DeleteSucceeded(_) => "delete_succeeded",
      Action::Failed { .. } => "failed",
      Action::SetProduct(_) => "set_product",
      Action::SetFiltered(_) => "set_filtered",
      Action::RemoveFromFiltered(_) => "remove_from_filtered",
    }
  }
}

/// Whether a transition changed the canonical list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListChange {
  Unchanged,
  Changed,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogState {
  /// Canonical collection, source of truth for the mirror
  pub list: Vec<Product>,
  /// Presentation subset, never mirrored
  pub filtered: Vec<Product>,
  /// Last error message; overwritten, never accumulated
  pub error: Option<String>,
  pub status: StatusRecord,
}

impl CatalogState {
  /// Initial state seeded with a mirrored list
  pub fn seeded(list: Vec<Product>) -> Self {
    Self {
      list,
      ..Self::default()
    }
  }

  /// True while a fetch-all is in flight
  pub fn loading(&self) -> bool {
    self.status.get(OperationKind::Fetch) == OperationStatus::Pending
  }

  pub fn status(&self, kind: OperationKind) -> OperationStatus {
    self.status.get(kind)
  }

  /// Look up a product in the canonical list
  pub fn product(&self, id: &ProductId) -> Option<&Product> {
    self.list.iter().find(|p| &p.id == id)
  }

  /// Distinct categories present in the canonical list
  pub fn categories(&self) -> Vec<String> {
    filter::unique_categories(&self.list)
  }

  /// Apply a transition.
  pub fn apply(&mut self, action: Action) -> ListChange {
    match action {
      Action::Pending(kind) => {
        self.status.set(kind, OperationStatus::Pending);
        if kind == OperationKind::Fetch {
          self.error = None;
        }
        ListChange::Unchanged
      }

      Action::FetchSucceeded(products) => {
        self.status.set(OperationKind::Fetch, OperationStatus::Succeeded);
        self.list = products;
        ListChange::Changed
      }

      Action::CreateSucceeded(product) => {
        self.status.set(OperationKind::Create, OperationStatus::Succeeded);
        // Duplicate ids are kept as-is
        self.list.push(product);
        ListChange::Changed
      }

      Action::UpdateSucceeded(product) => {
        self.status.set(OperationKind::Update, OperationStatus::Succeeded);
        match product {
          Some(product) => self.replace(product),
          None => ListChange::Unchanged,
        }
      }

      Action::DeleteSucceeded(id) => {
        self.status.set(OperationKind::Delete, OperationStatus::Succeeded);
        self.list.retain(|p| p.id != id);
        self.filtered.retain(|p| p.id != id);
        ListChange::Changed
      }

      Action::Failed { kind, reason } => {
        self.status.set(kind, OperationStatus::Failed);
        let message = match kind {
          OperationKind::Fetch => None,
          _ => reason.filter(|r| !r.trim().is_empty()),
        };
        self.error = Some(message.unwrap_or_else(|| kind.fallback_error().to_string()));
        ListChange::Unchanged
      }

      Action::SetProduct(product) => self.replace(product),

      Action::SetFiltered(products) => {
        self.filtered = products;
        ListChange::Unchanged
      }

      Action::RemoveFromFiltered(id) => {
        self.filtered.retain(|p| p.id != id);
        ListChange::Unchanged
      }
    }
  }

  /// Replace the first product with a matching id; a miss is a no-op.
  fn replace(&mut self, product: Product) -> ListChange {
    match self.list.iter_mut().find(|p| p.id == product.id) {
      Some(slot) => {
        *slot = product;
        ListChange::Changed
      }
      None => {
        tracing::debug!(id = %product.id, "No product to replace");
        ListChange::Unchanged
      }
    }
  }
}

/// Catalog state bound to its durable mirror.
pub struct CatalogStore {
  state: CatalogState,
  mirror: DurableMirror,
}

impl CatalogStore {
  /// Build the store, seeding the list from the mirror.
  pub fn initialize(mirror: DurableMirror) -> Self {
    let list: Vec<Product> = mirror.load();
    tracing::debug!(count = list.len(), "Seeded catalog from mirror");
    Self {
      state: CatalogState::seeded(list),
      mirror,
    }
  }

  pub fn state(&self) -> &CatalogState {
    &self.state
  }

  pub fn mirror(&self) -> &DurableMirror {
    &self.mirror
  }

  /// Apply a transition and mirror the list if it changed.
  pub fn apply(&mut self, action: Action) -> ListChange {
    let name = action.name();
    let change = self.state.apply(action);
    tracing::debug!(action = name, changed = (change == ListChange::Changed), "Applied transition");

    if change == ListChange::Changed {
      self.mirror.save(&self.state.list);
    }
    change
  }
}
