use axum::extract::{Json, Path, Query, State};
use axum_extra::extract::WithRejection;

use super::run_blocking;
use crate::{
    data::models::{DueQuery, IntervalPreview, ItemError, ReviewRequest, SrsItem},
    features::items::ItemService,
    utils::Owner,
};

pub async fn review_item(
    State(service): State<ItemService>,
    Owner(owner_id): Owner,
    WithRejection(Path(item_id), _): WithRejection<Path<i32>, ItemError>,
    WithRejection(Json(payload), _): WithRejection<Json<ReviewRequest>, ItemError>,
) -> Result<Json<SrsItem>, ItemError> {
    let item = run_blocking(move || service.review(item_id, owner_id, payload.quality)).await?;
    Ok(Json(item))
}

pub async fn due_items(
    State(service): State<ItemService>,
    Owner(owner_id): Owner,
    WithRejection(Query(query), _): WithRejection<Query<DueQuery>, ItemError>,
) -> Result<Json<Vec<SrsItem>>, ItemError> {
    let items =
        run_blocking(move || service.get_due(owner_id, query.as_of, query.limit)).await?;
    Ok(Json(items))
}

pub async fn preview_item(
    State(service): State<ItemService>,
    Owner(owner_id): Owner,
    WithRejection(Path(item_id), _): WithRejection<Path<i32>, ItemError>,
) -> Result<Json<IntervalPreview>, ItemError> {
    let preview = run_blocking(move || service.preview(item_id, owner_id)).await?;
    Ok(Json(preview))
}
