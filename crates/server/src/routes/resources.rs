//! Generic CRUD handlers mounted once per resource.
//!
//! Pure mapping: service success to 200/201/204, failures through `ApiError`.

use std::sync::Arc;

use axum::{
    extract::{FromRef, Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use common::{
    to_page,
    types::{CountBody, ExistsBody},
    Page, PageRequest,
};
use serde::{de::DeserializeOwned, Serialize};
use service::resource::{Resource, ResourceRepository, ResourceService};
use tracing::info;

use crate::errors::ApiError;

type Svc<R, Repo> = Arc<ResourceService<R, Repo>>;

pub async fn list<R, Repo>(
    State(svc): State<Svc<R, Repo>>,
    Query(q): Query<PageRequest>,
) -> Result<Json<Page<R>>, ApiError>
where
    R: Resource + Serialize,
    Repo: ResourceRepository<R> + 'static,
{
    info!(kind = R::KIND, page = q.page, size = q.size, "GET list");
    let slice = svc.list(q).await.map_err(ApiError::during(format!("list {}", R::KIND)))?;
    Ok(Json(to_page(slice)))
}

pub async fn list_default<R, Repo>(
    State(svc): State<Svc<R, Repo>>,
) -> Result<Json<Page<R>>, ApiError>
where
    R: Resource + Serialize,
    Repo: ResourceRepository<R> + 'static,
{
    info!(kind = R::KIND, "GET all");
    let slice = svc
        .list_default()
        .await
        .map_err(ApiError::during(format!("list {}", R::KIND)))?;
    Ok(Json(to_page(slice)))
}

pub async fn get_one<R, Repo>(
    State(svc): State<Svc<R, Repo>>,
    Path(id): Path<R::Id>,
) -> Result<Json<R>, ApiError>
where
    R: Resource + Serialize,
    R::Id: DeserializeOwned,
    Repo: ResourceRepository<R> + 'static,
{
    info!(kind = R::KIND, %id, "GET by id");
    let found = svc
        .get(&id)
        .await
        .map_err(ApiError::during(format!("get {} {}", R::KIND, id)))?;
    Ok(Json(found))
}

/// Any id in the body is ignored; storage assigns one.
pub async fn create<R, Repo>(
    State(svc): State<Svc<R, Repo>>,
    Json(input): Json<R>,
) -> Result<(StatusCode, Json<R>), ApiError>
where
    R: Resource + Serialize + DeserializeOwned,
    Repo: ResourceRepository<R> + 'static,
{
    info!(kind = R::KIND, "POST create");
    let created = svc
        .create(input)
        .await
        .map_err(ApiError::during(format!("create {}", R::KIND)))?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn update<R, Repo>(
    State(svc): State<Svc<R, Repo>>,
    Path(id): Path<R::Id>,
    Json(input): Json<R>,
) -> Result<Json<R>, ApiError>
where
    R: Resource + Serialize + DeserializeOwned,
    R::Id: DeserializeOwned,
    Repo: ResourceRepository<R> + 'static,
{
    info!(kind = R::KIND, %id, "PUT update");
    let updated = svc
        .update(&id, input)
        .await
        .map_err(ApiError::during(format!("update {} {}", R::KIND, id)))?;
    Ok(Json(updated))
}

pub async fn remove<R, Repo>(
    State(svc): State<Svc<R, Repo>>,
    Path(id): Path<R::Id>,
) -> Result<StatusCode, ApiError>
where
    R: Resource,
    R::Id: DeserializeOwned,
    Repo: ResourceRepository<R> + 'static,
{
    info!(kind = R::KIND, %id, "DELETE");
    svc.delete(&id)
        .await
        .map_err(ApiError::during(format!("delete {} {}", R::KIND, id)))?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn count<R, Repo>(State(svc): State<Svc<R, Repo>>) -> Result<Json<CountBody>, ApiError>
where
    R: Resource,
    Repo: ResourceRepository<R> + 'static,
{
    info!(kind = R::KIND, "GET count");
    let count = svc.count().await.map_err(ApiError::during(format!("count {}", R::KIND)))?;
    Ok(Json(CountBody { count }))
}

/// Never 404: an absent id is `{"exists": false}`.
pub async fn exists<R, Repo>(
    State(svc): State<Svc<R, Repo>>,
    Path(id): Path<R::Id>,
) -> Result<Json<ExistsBody>, ApiError>
where
    R: Resource,
    R::Id: DeserializeOwned,
    Repo: ResourceRepository<R> + 'static,
{
    info!(kind = R::KIND, %id, "GET exists");
    let exists = svc
        .exists(&id)
        .await
        .map_err(ApiError::during(format!("exists {} {}", R::KIND, id)))?;
    Ok(Json(ExistsBody { exists }))
}

/// Lookup by the resource's unique field, e.g. `/name/{name}` or `/email/{email}`.
pub async fn get_by_unique<R, Repo>(
    State(svc): State<Svc<R, Repo>>,
    Path(value): Path<String>,
) -> Result<Json<R>, ApiError>
where
    R: Resource + Serialize,
    Repo: ResourceRepository<R> + 'static,
{
    info!(kind = R::KIND, field = R::UNIQUE_FIELD, %value, "GET by unique field");
    let found = svc
        .get_by_unique(&value)
        .await
        .map_err(ApiError::during(format!(
            "get {} by {} {}",
            R::KIND,
            R::UNIQUE_FIELD,
            value
        )))?;
    Ok(Json(found))
}

/// Routes every resource has, relative to its collection path.
/// `unique_segment` names the lookup-by-unique-field route (`name`, `email`).
pub fn resource_routes<R, Repo, S>(unique_segment: &str) -> Router<S>
where
    R: Resource + Serialize + DeserializeOwned,
    R::Id: DeserializeOwned,
    Repo: ResourceRepository<R> + 'static,
    S: Clone + Send + Sync + 'static,
    Svc<R, Repo>: FromRef<S>,
{
    Router::new()
        .route("/", get(list::<R, Repo>).post(create::<R, Repo>))
        .route("/all", get(list_default::<R, Repo>))
        .route("/count", get(count::<R, Repo>))
        .route(&format!("/{unique_segment}/:value"), get(get_by_unique::<R, Repo>))
        .route(
            "/:id",
            get(get_one::<R, Repo>).put(update::<R, Repo>).delete(remove::<R, Repo>),
        )
        .route("/:id/exists", get(exists::<R, Repo>))
}
