//! Domain entities - the core business objects.

mod post;

pub use post::{
    ActivityLogEntry, Post, PostDraft, PostWithRelated, RelatedPost, ScoredPost, TaggedPost,
};
