pub mod crud;
pub mod review;

use axum::{
    routing::{get, post},
    Router,
};

use crate::data::models::ItemError;
use crate::features::items::ItemService;

/// Runs blocking store work off the async executor
pub(crate) async fn run_blocking<T, F>(work: F) -> Result<T, ItemError>
where
    F: FnOnce() -> Result<T, ItemError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work).await?
}

pub fn items_router(service: ItemService) -> Router {
    Router::new()
        .route("/", get(crud::list_items).post(crud::create_item))
        .route("/due", get(review::due_items))
        .route(
            "/{item_id}",
            get(crud::get_item)
                .patch(crud::update_item)
                .delete(crud::delete_item),
        )
        .route("/{item_id}/review", post(review::review_item))
        .route("/{item_id}/preview", get(review::preview_item))
        .with_state(service)
}
