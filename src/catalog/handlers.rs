//! Command handlers: one remote call each, resolved into a store transition.
//!
//! Handlers never return an error. A transport failure is logged here and
//! becomes `Action::Failed` carrying the rendered error, so the store always
//! learns why an operation failed.

use crate::catalog::client::RemoteResource;
use crate::catalog::types::{Product, ProductDraft, ProductId};
use crate::error::TransportError;
use crate::store::{Action, OperationKind};

/// A remote operation to run against the catalog
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
  FetchAll,
  Create(ProductDraft),
  Update(Product),
  Delete(ProductId),
}

impl Command {
  pub fn kind(&self) -> OperationKind {
    match self {
      Command::FetchAll => OperationKind::Fetch,
      Command::Create(_) => OperationKind::Create,
      Command::Update(_) => OperationKind::Update,
      Command::Delete(_) => OperationKind::Delete,
    }
  }
}

/// Run a command and resolve it into the transition to apply.
pub async fn run(remote: &dyn RemoteResource, command: Command) -> Action {
  match command {
    Command::FetchAll => fetch_all(remote).await,
    Command::Create(draft) => create(remote, draft).await,
    Command::Update(product) => update(remote, product).await,
    Command::Delete(id) => delete(remote, id).await,
  }
}

pub async fn fetch_all(remote: &dyn RemoteResource) -> Action {
  match remote.list().await {
    Ok(entities) => {
      let total = entities.len();
      let products: Vec<Product> = entities
        .into_iter()
        .filter_map(|e| e.into_product())
        .collect();
      if products.len() < total {
        tracing::warn!(
          skipped = total - products.len(),
          "Dropped fetched entities without an id"
        );
      }
      tracing::info!(count = products.len(), "Fetched products");
      Action::FetchSucceeded(products)
    }
    Err(e) => failed(OperationKind::Fetch, e),
  }
}

pub async fn create(remote: &dyn RemoteResource, draft: ProductDraft) -> Action {
  match remote.create(draft).await {
    Ok(entity) => match entity.into_product() {
      Some(product) => {
        tracing::info!(id = %product.id, "Created product");
        Action::CreateSucceeded(product)
      }
      None => failed(OperationKind::Create, TransportError::MissingId),
    },
    Err(e) => failed(OperationKind::Create, e),
  }
}

pub async fn update(remote: &dyn RemoteResource, product: Product) -> Action {
  let (id, draft) = product.into_parts();
  match remote.update(id.clone(), draft).await {
    Ok(entity) => {
      let updated = entity.into_product();
      match &updated {
        Some(p) => tracing::info!(id = %p.id, "Updated product"),
        None => tracing::warn!(%id, "Update response carried no id"),
      }
      Action::UpdateSucceeded(updated)
    }
    Err(e) => failed(OperationKind::Update, e),
  }
}

pub async fn delete(remote: &dyn RemoteResource, id: ProductId) -> Action {
  match remote.delete(id.clone()).await {
    Ok(()) => {
      tracing::info!(%id, "Deleted product");
      Action::DeleteSucceeded(id)
    }
    Err(e) => failed(OperationKind::Delete, e),
  }
}

fn failed(kind: OperationKind, error: TransportError) -> Action {
  tracing::warn!(operation = kind.label(), error = %error, "Remote operation failed");
  Action::Failed {
    kind,
    reason: Some(error.to_string()),
  }
}
