//! PostgreSQL repository implementation.

use async_trait::async_trait;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DbConn, DbErr, EntityTrait, NotSet, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait,
};

use scribe_core::domain::{ActivityLogEntry, Post, PostDraft, TaggedPost};
use scribe_core::error::RepoError;
use scribe_core::ports::PostRepository;

use super::entity::activity_log::{self, Entity as ActivityLogEntity};
use super::entity::post::{self, Entity as PostEntity, TagMatch};

/// PostgreSQL post repository.
pub struct PostgresPostRepository {
    db: DbConn,
}

impl PostgresPostRepository {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }
}

fn query_error(e: DbErr) -> RepoError {
    match e {
        DbErr::Conn(err) => RepoError::Connection(err.to_string()),
        DbErr::ConnectionAcquire(err) => RepoError::Connection(err.to_string()),
        other => RepoError::Query(other.to_string()),
    }
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn create_with_audit(&self, draft: PostDraft) -> Result<Post, RepoError> {
        draft.validate().map_err(RepoError::Constraint)?;

        // Dropping `txn` without commit rolls back, so every early return
        // below leaves no partial state.
        let txn = self.db.begin().await.map_err(query_error)?;

        let inserted = post::ActiveModel {
            id: NotSet,
            title: Set(draft.title),
            content: Set(draft.content),
            tags: Set(draft.tags),
            created_at: NotSet,
        }
        .insert(&txn)
        .await
        .map_err(query_error)?;

        let audit = activity_log::ActiveModel {
            id: NotSet,
            action: Set(ActivityLogEntry::NEW_POST.to_string()),
            post_id: Set(inserted.id),
            logged_at: NotSet,
        };
        ActivityLogEntity::insert(audit)
            .exec_without_returning(&txn)
            .await
            .map_err(query_error)?;

        txn.commit().await.map_err(query_error)?;

        tracing::debug!(post_id = inserted.id, "Post and activity log committed");
        Ok(inserted.into())
    }

    async fn find_by_id(&self, id: i32) -> Result<Post, RepoError> {
        PostEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(query_error)?
            .map(Into::into)
            .ok_or(RepoError::NotFound)
    }

    async fn update(&self, id: i32, draft: PostDraft) -> Result<(), RepoError> {
        draft.validate().map_err(RepoError::Constraint)?;

        let result = PostEntity::update_many()
            .col_expr(post::Column::Title, Expr::value(draft.title))
            .col_expr(post::Column::Content, Expr::value(draft.content))
            .col_expr(post::Column::Tags, Expr::value(draft.tags))
            .filter(post::Column::Id.eq(id))
            .exec(&self.db)
            .await
            .map_err(query_error)?;

        if result.rows_affected == 0 {
            return Err(RepoError::NotFound);
        }

        Ok(())
    }

    async fn find_by_tag(&self, tag: &str) -> Result<Vec<TaggedPost>, RepoError> {
        // Array membership, served by the GIN index on `tags`.
        let rows = PostEntity::find()
            .select_only()
            .columns([post::Column::Id, post::Column::Title, post::Column::Tags])
            .filter(Expr::cust_with_values("? = ANY(\"tags\")", [tag]))
            .order_by_asc(post::Column::Id)
            .into_model::<TagMatch>()
            .all(&self.db)
            .await
            .map_err(query_error)?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}
