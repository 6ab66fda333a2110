//! Read-only client for a peer service's resource endpoints.
//!
//! One blocking attempt per call: no retries, no caching. The timeout comes
//! from configuration.

use std::{fmt::Display, marker::PhantomData, time::Duration};

use async_trait::async_trait;
use common::Page;
use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;
use tracing::{info, warn};

use crate::errors::ServiceError;

/// Peer reads a consuming service depends on. Tests substitute an in-process stub.
#[async_trait]
pub trait RemoteResourceClient: Send + Sync {
    type Item: Send;
    type Id: Display + Send + Sync;

    async fn get_by_id(&self, id: &Self::Id) -> Result<Self::Item, ServiceError>;
    /// The peer's default first page.
    async fn list_all(&self) -> Result<Page<Self::Item>, ServiceError>;
}

/// HTTP implementation against `{base_url}/{collection}/{id}` and `{base_url}/{collection}/all`.
/// The id travels as a single percent-encoded path segment.
pub struct HttpResourceClient<T, Id> {
    http: reqwest::Client,
    base_url: String,
    base: Url,
    collection: Vec<String>,
    _types: PhantomData<fn() -> (T, Id)>,
}

impl<T, Id> HttpResourceClient<T, Id> {
    pub fn new(base_url: &str, collection: &str, timeout: Duration) -> Result<Self, ServiceError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ServiceError::Internal(format!("cannot build http client: {e}")))?;
        let base_url = base_url.trim_end_matches('/').to_string();
        let base = Url::parse(&base_url)
            .map_err(|e| ServiceError::Internal(format!("invalid peer url {base_url}: {e}")))?;
        if base.cannot_be_a_base() {
            return Err(ServiceError::Internal(format!("peer url {base_url} cannot hold a path")));
        }
        let collection = collection
            .split('/')
            .filter(|segment| !segment.is_empty())
            .map(str::to_string)
            .collect();
        Ok(Self { http, base_url, base, collection, _types: PhantomData })
    }

    pub fn base_url(&self) -> &str { &self.base_url }

    fn url(&self, tail: &str) -> Url {
        let mut url = self.base.clone();
        // `new` rejects cannot-be-a-base urls, so the segments are always editable
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().extend(&self.collection).push(tail);
        }
        url
    }

    async fn fetch<B: DeserializeOwned>(&self, url: Url) -> Result<B, ServiceError> {
        let resp = self.http.get(url.clone()).send().await.map_err(|e| {
            warn!(%url, error = %e, "peer unreachable");
            ServiceError::Unavailable(format!("GET {url}: {e}"))
        })?;
        let status = resp.status();
        if status == StatusCode::NOT_FOUND {
            info!(%url, "peer reported not found");
            return Err(ServiceError::NotFound(format!("peer has no resource at {url}")));
        }
        if !status.is_success() {
            warn!(%url, %status, "peer returned failure status");
            return Err(ServiceError::Unavailable(format!("GET {url}: status {status}")));
        }
        resp.json::<B>().await.map_err(|e| {
            warn!(%url, error = %e, "peer returned malformed payload");
            ServiceError::Unavailable(format!("GET {url}: malformed payload: {e}"))
        })
    }
}

#[async_trait]
impl<T, Id> RemoteResourceClient for HttpResourceClient<T, Id>
where
    T: DeserializeOwned + Send + 'static,
    Id: Display + Send + Sync + 'static,
{
    type Item = T;
    type Id = Id;

    async fn get_by_id(&self, id: &Id) -> Result<T, ServiceError> {
        let url = self.url(&id.to_string());
        info!(%url, "fetching from peer");
        self.fetch(url).await
    }

    async fn list_all(&self) -> Result<Page<T>, ServiceError> {
        let url = self.url("all");
        info!(%url, "listing from peer");
        self.fetch(url).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{extract::Path, http::StatusCode as AxStatus, routing::get, Json, Router};
    use serde::Deserialize;
    use serde_json::json;
    use tokio::net::TcpListener;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Item { id: i64, name: String }

    async fn stub_peer() -> anyhow::Result<String> {
        let app = Router::new()
            .route("/api/items/all", get(|| async {
                Json(json!({
                    "content": [{"id": 1, "name": "one", "extra": true}],
                    "size": 10,
                    "currentPage": 0,
                    "totalItems": 1,
                    "totalPages": 1
                }))
            }))
            .route("/api/items/:id", get(|Path(id): Path<i64>| async move {
                match id {
                    1 => Ok(Json(json!({"id": 1, "name": "one"}))),
                    2 => Err(AxStatus::INTERNAL_SERVER_ERROR),
                    3 => Ok(Json(json!({"unexpected": "shape"}))),
                    _ => Err(AxStatus::NOT_FOUND),
                }
            }));
        let listener = TcpListener::bind((std::net::Ipv4Addr::LOCALHOST, 0)).await?;
        let addr = listener.local_addr()?;
        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                eprintln!("stub peer error: {}", e);
            }
        });
        Ok(format!("http://{}", addr))
    }

    fn client(base: &str) -> HttpResourceClient<Item, i64> {
        HttpResourceClient::new(base, "/api/items/", Duration::from_secs(2)).expect("client")
    }

    #[tokio::test]
    async fn reads_item_and_page() -> anyhow::Result<()> {
        let base = stub_peer().await?;
        let c = client(&format!("{base}/"));
        assert_eq!(c.get_by_id(&1).await?, Item { id: 1, name: "one".into() });
        let page = c.list_all().await?;
        assert_eq!(page.total_items, 1);
        assert_eq!(page.current_page, 0);
        assert_eq!(page.content, vec![Item { id: 1, name: "one".into() }]);
        Ok(())
    }

    #[test]
    fn id_is_one_encoded_segment() {
        let c = client("http://127.0.0.1:1/");
        assert_eq!(c.url("7").as_str(), "http://127.0.0.1:1/api/items/7");
        assert_eq!(c.url("a/b?c#d").as_str(), "http://127.0.0.1:1/api/items/a%2Fb%3Fc%23d");
        assert_eq!(c.base_url(), "http://127.0.0.1:1");
    }

    #[test]
    fn unusable_base_url_is_rejected() {
        let built = HttpResourceClient::<Item, i64>::new("not a url", "items", Duration::from_secs(1));
        assert!(matches!(built, Err(ServiceError::Internal(_))));
        let built = HttpResourceClient::<Item, i64>::new("mailto:x@y", "items", Duration::from_secs(1));
        assert!(matches!(built, Err(ServiceError::Internal(_))));
    }

    #[tokio::test]
    async fn peer_404_is_not_found() -> anyhow::Result<()> {
        let base = stub_peer().await?;
        assert!(matches!(client(&base).get_by_id(&9).await, Err(ServiceError::NotFound(_))));
        Ok(())
    }

    #[tokio::test]
    async fn peer_failure_or_garbage_is_unavailable() -> anyhow::Result<()> {
        let base = stub_peer().await?;
        let c = client(&base);
        assert!(matches!(c.get_by_id(&2).await, Err(ServiceError::Unavailable(_))));
        assert!(matches!(c.get_by_id(&3).await, Err(ServiceError::Unavailable(_))));
        Ok(())
    }

    #[tokio::test]
    async fn unreachable_peer_is_unavailable() -> anyhow::Result<()> {
        // bind then drop to get a port nothing listens on
        let listener = TcpListener::bind((std::net::Ipv4Addr::LOCALHOST, 0)).await?;
        let addr = listener.local_addr()?;
        drop(listener);
        let c = client(&format!("http://{}", addr));
        assert!(matches!(c.list_all().await, Err(ServiceError::Unavailable(_))));
        Ok(())
    }
}
