use axum::{
    extract::{Json, Path, Query, State},
    http::StatusCode,
};
use axum_extra::extract::WithRejection;

use super::run_blocking;
use crate::{
    data::models::{CreateItemRequest, ItemError, ItemFilter, SrsItem, UpdateContentRequest},
    features::items::ItemService,
    utils::Owner,
};

pub async fn create_item(
    State(service): State<ItemService>,
    Owner(owner_id): Owner,
    WithRejection(Json(payload), _): WithRejection<Json<CreateItemRequest>, ItemError>,
) -> Result<(StatusCode, Json<SrsItem>), ItemError> {
    let item = run_blocking(move || service.create(owner_id, payload)).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

pub async fn list_items(
    State(service): State<ItemService>,
    Owner(owner_id): Owner,
    WithRejection(Query(filter), _): WithRejection<Query<ItemFilter>, ItemError>,
) -> Result<Json<Vec<SrsItem>>, ItemError> {
    let items = run_blocking(move || service.list(owner_id, &filter)).await?;
    Ok(Json(items))
}

pub async fn get_item(
    State(service): State<ItemService>,
    Owner(owner_id): Owner,
    WithRejection(Path(item_id), _): WithRejection<Path<i32>, ItemError>,
) -> Result<Json<SrsItem>, ItemError> {
    let item = run_blocking(move || service.get_by_id(item_id, owner_id)).await?;
    Ok(Json(item))
}

pub async fn update_item(
    State(service): State<ItemService>,
    Owner(owner_id): Owner,
    WithRejection(Path(item_id), _): WithRejection<Path<i32>, ItemError>,
    WithRejection(Json(payload), _): WithRejection<Json<UpdateContentRequest>, ItemError>,
) -> Result<Json<SrsItem>, ItemError> {
    let item = run_blocking(move || service.update_content(item_id, owner_id, payload)).await?;
    Ok(Json(item))
}

pub async fn delete_item(
    State(service): State<ItemService>,
    Owner(owner_id): Owner,
    WithRejection(Path(item_id), _): WithRejection<Path<i32>, ItemError>,
) -> Result<StatusCode, ItemError> {
    run_blocking(move || service.delete(item_id, owner_id)).await?;
    Ok(StatusCode::NO_CONTENT)
}
