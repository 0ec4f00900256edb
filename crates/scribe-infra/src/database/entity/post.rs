//! Post entity for SeaORM.

use sea_orm::FromQueryResult;
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "posts")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub content: String,
    pub tags: Vec<String>,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::activity_log::Entity")]
    ActivityLog,
}

impl Related<super::activity_log::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ActivityLog.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Conversion from SeaORM Model to Domain Post.
impl From<Model> for scribe_core::domain::Post {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            title: model.title,
            content: model.content,
            tags: model.tags,
            created_at: model.created_at.into(),
        }
    }
}

/// Projection used by tag search; skips the content column.
#[derive(Debug, Clone, FromQueryResult)]
pub struct TagMatch {
    pub id: i32,
    pub title: String,
    pub tags: Vec<String>,
}

impl From<TagMatch> for scribe_core::domain::TaggedPost {
    fn from(row: TagMatch) -> Self {
        Self {
            id: row.id,
            title: row.title,
            tags: row.tags,
        }
    }
}
