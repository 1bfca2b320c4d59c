use crate::cache::DurableMirror;
use crate::catalog::client::RemoteResource;
use crate::catalog::handlers::{self, Command};
use crate::catalog::types::{Product, ProductId};
use crate::store::{Action, CatalogState, CatalogStore, OperationKind};
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::sync::mpsc;

/// A catalog session: the store, the remote resource, and the operations
/// currently in flight.
///
/// Commands run concurrently on the runtime; their resolutions come back
/// over a channel and are applied one at a time, in the order they resolve.
pub struct Catalog {
  store: CatalogStore,

  /// Remote product resource
  remote: Arc<dyn RemoteResource>,

  /// Resolution sender handed to spawned handlers
  action_tx: mpsc::UnboundedSender<Action>,
  action_rx: mpsc::UnboundedReceiver<Action>,

  /// Dispatched commands not yet applied
  in_flight: usize,
}

impl Catalog {
  /// Start a session, seeding the list from the mirror.
  pub fn new(remote: Arc<dyn RemoteResource>, mirror: DurableMirror) -> Self {
    let (action_tx, action_rx) = mpsc::unbounded_channel();

    Self {
      store: CatalogStore::initialize(mirror),
      remote,
      action_tx,
      action_rx,
      in_flight: 0,
    }
  }

  pub fn state(&self) -> &CatalogState {
    self.store.state()
  }

  pub fn mirror(&self) -> &DurableMirror {
    self.store.mirror()
  }

  pub fn in_flight(&self) -> usize {
    self.in_flight
  }

  /// Start a command. The pending transition is applied before this returns.
  pub fn dispatch(&mut self, command: Command) {
    let kind = command.kind();
    self.store.apply(Action::Pending(kind));
    self.in_flight += 1;

    let remote = Arc::clone(&self.remote);
    let tx = self.action_tx.clone();

    tokio::spawn(async move {
      let action = AssertUnwindSafe(handlers::run(remote.as_ref(), command))
        .catch_unwind()
        .await
        .unwrap_or_else(|_| {
          tracing::error!(operation = kind.label(), "Handler panicked");
          Action::Failed {
            kind,
            reason: None,
          }
        });
      // Ignore send errors - the session may have been dropped
      let _ = tx.send(action);
    });
  }

  /// Wait for the next in-flight command to resolve and apply it.
  ///
  /// Returns the kind of the resolved operation, or `None` when nothing is
  /// in flight.
  pub async fn next_resolution(&mut self) -> Option<OperationKind> {
    if self.in_flight == 0 {
      return None;
    }

    // The session holds a sender, so the channel never closes here
    let action = self.action_rx.recv().await?;
    self.in_flight -= 1;

    let kind = resolved_kind(&action);
    self.store.apply(action);
    kind
  }

  /// Apply every outstanding resolution.
  pub async fn settle(&mut self) {
    while self.next_resolution().await.is_some() {}
  }

  /// Dispatch a command and wait until everything in flight has resolved.
  pub async fn execute(&mut self, command: Command) -> &CatalogState {
    self.dispatch(command);
    self.settle().await;
    self.state()
  }

  /// Override a product locally without a remote call.
  pub fn set_product(&mut self, product: Product) {
    self.store.apply(Action::SetProduct(product));
  }

  /// Replace the filtered view.
  pub fn set_filtered(&mut self, products: Vec<Product>) {
    self.store.apply(Action::SetFiltered(products));
  }

  /// Remove a product from the filtered view only.
  pub fn remove_from_filtered(&mut self, id: ProductId) {
    self.store.apply(Action::RemoveFromFiltered(id));
  }
}

fn resolved_kind(action: &Action) -> Option<OperationKind> {
  match action {
    Action::FetchSucceeded(_) => Some(OperationKind::Fetch),
    Action::CreateSucceeded(_) => Some(OperationKind::Create),
    Action::UpdateSucceeded(_) => Some(OperationKind::Update),
    Action::DeleteSucceeded(_) => Some(OperationKind::Delete),
    Action::Failed { kind, .. } => Some(*kind),
    _ => None,
  }
}
