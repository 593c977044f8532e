pub mod session;

pub use session::{current_owner_id, set_owner_session, Owner};
