use crate::catalog::api_types::ApiProduct;
use crate::catalog::types::{ProductDraft, ProductId};
use crate::config::ApiConfig;
use crate::error::TransportError;
use futures::future::BoxFuture;
use futures::FutureExt;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;
use url::Url;

/// The remote product resource: list, create, update and delete by id.
///
/// Object-safe so the catalog can hold any implementation behind an `Arc`.
pub trait RemoteResource: Send + Sync {
  /// `GET /products`
  fn list(&self) -> BoxFuture<'_, Result<Vec<ApiProduct>, TransportError>>;

  /// `POST /products` with the draft as body
  fn create(&self, draft: ProductDraft) -> BoxFuture<'_, Result<ApiProduct, TransportError>>;

  /// `PUT /products/{id}` with the draft as body
  fn update(
    &self,
    id: ProductId,
    draft: ProductDraft,
  ) -> BoxFuture<'_, Result<ApiProduct, TransportError>>;

  /// `DELETE /products/{id}`
  fn delete(&self, id: ProductId) -> BoxFuture<'_, Result<(), TransportError>>;
}

/// HTTP client for the product resource
#[derive(Clone)]
pub struct HttpRemote {
  client: Client,
  base: Url,
}

impl HttpRemote {
  pub fn new(config: &ApiConfig) -> Result<Self, TransportError> {
    let mut base = Url::parse(&config.base_url)?;

    // Url::join drops the last segment of a base without a trailing slash
    if !base.path().ends_with('/') {
      let path = format!("{}/", base.path());
      base.set_path(&path);
    }

    let client = Client::builder()
      .user_agent(concat!("c9s/", env!("CARGO_PKG_VERSION")))
      .timeout(Duration::from_secs(config.timeout_secs))
      .build()?;

    Ok(Self { client, base })
  }

  fn collection_url(&self) -> Result<Url, TransportError> {
    Ok(self.base.join("products")?)
  }

  fn item_url(&self, id: &ProductId) -> Result<Url, TransportError> {
    let mut url = self.collection_url()?;
    url
      .path_segments_mut()
      .map_err(|_| TransportError::Url(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
      .push(id.as_str());
    Ok(url)
  }

  async fn check(resp: Response) -> Result<Response, TransportError> {
    let status = resp.status();
    if status.is_success() {
      return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(TransportError::Status { status, body })
  }

  async fn decode<T: DeserializeOwned>(resp: Response) -> Result<T, TransportError> {
    let resp = Self::check(resp).await?;
    let bytes = resp.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
  }

  pub async fn list_products(&self) -> Result<Vec<ApiProduct>, TransportError> {
    let url = self.collection_url()?;
    tracing::debug!(%url, "GET products");
    let resp = self.client.get(url).send().await?;
    Self::decode(resp).await
  }

  pub async fn create_product(&self, draft: &ProductDraft) -> Result<ApiProduct, TransportError> {
    let url = self.collection_url()?;
    tracing::debug!(%url, "POST product");
    let resp = self.client.post(url).json(draft).send().await?;
    Self::decode(resp).await
  }

  pub async fn update_product(
    &self,
    id: &ProductId,
    draft: &ProductDraft,
  ) -> Result<ApiProduct, TransportError> {
    let url = self.item_url(id)?;
    tracing::debug!(%url, "PUT product");
    let resp = self.client.put(url).json(draft).send().await?;
    Self::decode(resp).await
  }

  pub async fn delete_product(&self, id: &ProductId) -> Result<(), TransportError> {
    let url = self.item_url(id)?;
    tracing::debug!(%url, "DELETE product");
    let resp = self.client.delete(url).send().await?;
    // The acknowledgement body is not used
    Self::check(resp).await?;
    Ok(())
  }
}

impl RemoteResource for HttpRemote {
  fn list(&self) -> BoxFuture<'_, Result<Vec<ApiProduct>, TransportError>> {
    self.list_products().boxed()
  }

  fn create(&self, draft: ProductDraft) -> BoxFuture<'_, Result<ApiProduct, TransportError>> {
    async move { self.create_product(&draft).await }.boxed()
  }

  fn update(
    &self,
    id: ProductId,
    draft: ProductDraft,
  ) -> BoxFuture<'_, Result<ApiProduct, TransportError>> {
    async move { self.update_product(&id, &draft).await }.boxed()
  }

  fn delete(&self, id: ProductId) -> BoxFuture<'_, Result<(), TransportError>> {
    async move { self.delete_product(&id).await }.boxed()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use httpmock::MockServer;

  fn remote(server: &MockServer) -> HttpRemote {
    let config = ApiConfig {
      base_url: server.base_url(),
      timeout_secs: 5,
    };
    HttpRemote::new(&config).unwrap()
  }

  fn draft() -> ProductDraft {
    ProductDraft {
      title: "Backpack".to_string(),
      price: 109.95,
      category: "bags".to_string(),
      description: "Fits a laptop".to_string(),
      image: "https://img/backpack.png".to_string(),
    }
  }

  #[tokio::test]
  async fn test_list_hits_collection() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
      when.method("GET").path("/products");
      then
        .status(200)
        .header("content-type", "application/json")
        .body(r#"[{"id":1,"title":"A","price":10,"category":"c","description":"d","image":"i"}]"#);
    });

    let products = remote(&server).list_products().await.unwrap();
    mock.assert();
    assert_eq!(products.len(), 1);
    assert_eq!(products[0].id, Some(ProductId::from(1i64)));
  }

  #[tokio::test]
  async fn test_create_posts_body_without_id() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
      when
        .method("POST")
        .path("/products")
        .json_body_includes(r#"{"title":"Backpack","category":"bags"}"#);
      then
        .status(201)
        .header("content-type", "application/json")
        .body(r#"{"id":21,"title":"Backpack","price":109.95,"category":"bags","description":"Fits a laptop","image":"https://img/backpack.png"}"#);
    });

    let created = remote(&server).create_product(&draft()).await.unwrap();
    mock.assert();
    assert_eq!(created.id, Some(ProductId::from(21i64)));
  }

  #[tokio::test]
  async fn test_update_addresses_path_by_id() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
      when
        .method("PUT")
        .path("/products/7")
        .json_body_includes(r#"{"title":"Backpack"}"#);
      then
        .status(200)
        .header("content-type", "application/json")
        .body(r#"{"id":7,"title":"Backpack"}"#);
    });

    let updated = remote(&server)
      .update_product(&ProductId::from("7"), &draft())
      .await
      .unwrap();
    mock.assert();
    assert_eq!(updated.id, Some(ProductId::from(7i64)));
  }

  #[test]
  fn test_update_body_has_no_id_field() {
    let body = serde_json::to_value(draft()).unwrap();
    assert!(body.get("id").is_none());
  }

  #[tokio::test]
  async fn test_delete_ignores_ack_body() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
      when.method("DELETE").path("/products/3");
      then.status(200).body("whatever");
    });

    remote(&server)
      .delete_product(&ProductId::from(3i64))
      .await
      .unwrap();
    mock.assert();
  }

  #[tokio::test]
  async fn test_non_success_status_is_transport_error() {
    let server = MockServer::start();
    server.mock(|when, then| {
      when.method("GET").path("/products");
      then.status(503).body("down for maintenance");
    });

    let err = remote(&server).list_products().await.unwrap_err();
    match err {
      TransportError::Status { status, body } => {
        assert_eq!(status.as_u16(), 503);
        assert_eq!(body, "down for maintenance");
      }
      other => panic!("unexpected error: {other}"),
    }
  }

  #[tokio::test]
  async fn test_malformed_body_is_decode_error() {
    let server = MockServer::start();
    server.mock(|when, then| {
      when.method("GET").path("/products");
      then.status(200).body("not json");
    });

    let err = remote(&server).list_products().await.unwrap_err();
    assert!(matches!(err, TransportError::Decode(_)));
  }

  #[test]
  fn test_base_url_with_path_keeps_prefix() {
    let config = ApiConfig {
      base_url: "https://shop.example.com/api/v2".to_string(),
      timeout_secs: 5,
    };
    let remote = HttpRemote::new(&config).unwrap();
    assert_eq!(
      remote.item_url(&ProductId::from("a/b")).unwrap().as_str(),
      "https://shop.example.com/api/v2/products/a%2Fb"
    );
  }
}
