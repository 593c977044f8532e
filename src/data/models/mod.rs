pub mod error_models;
pub mod item_models;
pub mod srs_models;

pub use error_models::ItemError;
pub use item_models::{
    ContentChangeset, CreateItemRequest, ItemFilter, ItemRecord, ItemSource, NewItemRecord,
    SrsItem, UpdateContentRequest, MAX_TAG_LEN,
};
pub use srs_models::{DueQuery, IntervalPreview, ReviewRequest};
