//! SeaORM entities for the post schema.

pub mod activity_log;
pub mod post;
