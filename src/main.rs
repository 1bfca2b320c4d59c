use catalog_sync::app::Catalog;
use catalog_sync::cache::{DurableMirror, SqliteStorage};
use catalog_sync::catalog::client::HttpRemote;
use catalog_sync::catalog::handlers::Command;
use catalog_sync::catalog::types::{Product, ProductDraft, ProductId};
use catalog_sync::config::{Config, MirrorBackend};
use catalog_sync::filter::ProductFilter;
use catalog_sync::store::{self, CatalogState, OperationKind, OperationStatus};
use catalog_sync::{logging, render};
use clap::{Parser, Subcommand};
use color_eyre::{eyre::eyre, Result};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(name = "c9s")]
#[command(about = "Browse and edit a product catalog with a local mirror")]
#[command(version)]
struct Args {
  /// Path to config file (default: $XDG_CONFIG_HOME/c9s/config.yaml)
  #[arg(short, long)]
  config: Option<PathBuf>,

  /// Use the mirrored catalog only, without refreshing from the remote
  #[arg(long)]
  offline: bool,

  #[command(subcommand)]
  command: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
  /// List products, optionally filtered
  List {
    /// Only products in this category
    #[arg(long)]
    category: Option<String>,
    /// Only products whose title or description contains this text
    #[arg(long)]
    search: Option<String>,
  },
  /// Show one product
  Show { id: String },
  /// List categories
  Categories,
  /// Create a product
  Create {
    #[arg(long)]
    title: String,
    #[arg(long)]
    price: f64,
    #[arg(long)]
    category: String,
    #[arg(long, default_value = "")]
    description: String,
    #[arg(long, default_value = "")]
    image: String,
  },
  /// Update fields of an existing product
  Update {
    id: String,
    #[arg(long)]
    title: Option<String>,
    #[arg(long)]
    price: Option<f64>,
    #[arg(long)]
    category: Option<String>,
    #[arg(long)]
    description: Option<String>,
    #[arg(long)]
    image: Option<String>,
  },
  /// Delete a product
  Delete { id: String },
}

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;

  let args = Args::parse();

  let config = Config::load(args.config.as_deref())?;
  let _log_guard = logging::init(&config)?;

  let remote = HttpRemote::new(&config.api)
    .map_err(|e| eyre!("Invalid API configuration: {}", e))?;
  let mirror = open_mirror(&config);
  let snapshot = mirror.load_snapshot::<Product>();

  let mut catalog = Catalog::new(Arc::new(remote), mirror);

  if args.offline {
    println!("{}", render::mirror_summary(snapshot.as_ref()));
  } else {
    let state = catalog.execute(Command::FetchAll).await;
    if state.status(OperationKind::Fetch) == OperationStatus::Failed {
      eprintln!(
        "warning: {}; {}",
        state.error.as_deref().unwrap_or(store::FETCH_FAILED),
        render::mirror_summary(snapshot.as_ref())
      );
    }
  }

  run_command(&mut catalog, args.command, args.offline).await
}

/// Pick the mirror backend. An unusable database degrades to no mirror.
fn open_mirror(config: &Config) -> DurableMirror {
  match config.mirror.backend {
    MirrorBackend::None => DurableMirror::disabled(),
    MirrorBackend::Sqlite => {
      let opened = config
        .mirror_path()
        .map_err(|e| e.to_string())
        .and_then(|path| SqliteStorage::open(&path).map_err(|e| e.to_string()));
      match opened {
        Ok(storage) => DurableMirror::new(storage),
        Err(e) => {
          tracing::warn!(error = %e, "Mirror unavailable, continuing without it");
          DurableMirror::disabled()
        }
      }
    }
  }
}

async fn run_command(catalog: &mut Catalog, command: Cmd, offline: bool) -> Result<()> {
  match command {
    Cmd::List { category, search } => {
      let filter = ProductFilter::new(category, search);
      if filter.is_active() {
        let filtered = filter.apply(&catalog.state().list);
        catalog.set_filtered(filtered);
        println!("{}", render::product_table(&catalog.state().filtered));
      } else {
        println!("{}", render::product_table(&catalog.state().list));
      }
    }

    Cmd::Show { id } => {
      let id = ProductId::from(id);
      let product = catalog
        .state()
        .product(&id)
        .ok_or_else(|| eyre!("No product with id {}", id))?;
      println!("{}", render::product_detail(product));
    }

    Cmd::Categories => {
      for category in catalog.state().categories() {
        println!("{}", category);
      }
    }

    Cmd::Create {
      title,
      price,
      category,
      description,
      image,
    } => {
      require_online(offline)?;
      let draft = ProductDraft {
        title,
        price,
        category,
        description,
        image,
      };
      let state = catalog.execute(Command::Create(draft)).await;
      check(state, OperationKind::Create)?;
      if let Some(created) = state.list.last() {
        println!("Created product {}", created.id);
      }
    }

    Cmd::Update {
      id,
      title,
      price,
      category,
      description,
      image,
    } => {
      require_online(offline)?;
      let id = ProductId::from(id);
      let mut product = catalog
        .state()
        .product(&id)
        .cloned()
        .ok_or_else(|| eyre!("No product with id {}", id))?;

      if let Some(title) = title {
        product.title = title;
      }
      if let Some(price) = price {
        product.price = price;
      }
      if let Some(category) = category {
        product.category = category;
      }
      if let Some(description) = description {
        product.description = description;
      }
      if let Some(image) = image {
        product.image = image;
      }

      let state = catalog.execute(Command::Update(product)).await;
      check(state, OperationKind::Update)?;
      println!("Updated product {}", id);
    }

    Cmd::Delete { id } => {
      require_online(offline)?;
      let id = ProductId::from(id);
      let state = catalog.execute(Command::Delete(id.clone())).await;
      check(state, OperationKind::Delete)?;
      println!("Deleted product {}", id);
    }
  }

  for line in render::status_lines(catalog.state()) {
    tracing::debug!(status = %line, "Final operation status");
  }

  Ok(())
}

fn require_online(offline: bool) -> Result<()> {
  if offline {
    return Err(eyre!("This command needs the remote catalog; drop --offline"));
  }
  Ok(())
}

/// Turn a failed operation into an error for the exit status.
fn check(state: &CatalogState, kind: OperationKind) -> Result<()> {
  if state.status(kind) == OperationStatus::Failed {
    let message = state.error.as_deref().unwrap_or(kind.fallback_error());
    return Err(eyre!("{}", message));
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;
  use catalog_sync::config::ApiConfig;

  fn offline_catalog() -> Catalog {
    let remote = HttpRemote::new(&ApiConfig::default()).unwrap();
    Catalog::new(Arc::new(remote), DurableMirror::disabled())
  }

  #[tokio::test]
  async fn test_offline_refuses_remote_writes() {
    let invocations = [
      vec!["c9s", "--offline", "create", "--title", "Mug", "--price", "3", "--category", "kitchen"],
      vec!["c9s", "--offline", "update", "1", "--title", "Cup"],
      vec!["c9s", "--offline", "delete", "1"],
    ];

    for argv in invocations {
      let args = Args::try_parse_from(argv).unwrap();
      assert!(args.offline);

      let mut catalog = offline_catalog();
      let err = run_command(&mut catalog, args.command, args.offline)
        .await
        .unwrap_err();
      assert!(err.to_string().contains("--offline"));
      assert_eq!(catalog.in_flight(), 0);
      for kind in OperationKind::ALL {
        assert_eq!(catalog.state().status(kind), OperationStatus::Idle);
      }
    }
  }

  #[tokio::test]
  async fn test_offline_still_reads_the_mirror() {
    let args = Args::try_parse_from(["c9s", "--offline", "categories"]).unwrap();
    let mut catalog = offline_catalog();
    assert!(run_command(&mut catalog, args.command, args.offline).await.is_ok());
  }

  #[test]
  fn test_check_reports_failed_operation() {
    let mut state = CatalogState::default();
    state.apply(store::Action::Failed {
      kind: OperationKind::Delete,
      reason: Some("server responded with status 404 Not Found: ".to_string()),
    });
    assert!(check(&state, OperationKind::Create).is_ok());
    let err = check(&state, OperationKind::Delete).unwrap_err();
    assert!(err.to_string().contains("404"));
  }
}
