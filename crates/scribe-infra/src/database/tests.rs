#[cfg(test)]
mod tests {
    use crate::database::entity::post;
    use crate::database::postgres_repo::PostgresPostRepository;
    use scribe_core::domain::PostDraft;
    use scribe_core::error::RepoError;
    use scribe_core::ports::PostRepository;
    use sea_orm::{DatabaseBackend, DbErr, MockDatabase, MockExecResult};

    fn model(id: i32, title: &str, tags: &[&str]) -> post::Model {
        post::Model {
            id,
            title: title.to_owned(),
            content: "Content".to_owned(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            created_at: chrono::Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_find_post_by_id() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![model(1, "Test Post", &["b", "a"])]])
            .into_connection();

        let repo = PostgresPostRepository::new(db);
        let post = repo.find_by_id(1).await.unwrap();

        assert_eq!(post.id, 1);
        assert_eq!(post.title, "Test Post");
        assert_eq!(post.tags, vec!["b", "a"]);
    }

    #[tokio::test]
    async fn test_find_missing_post() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<post::Model>::new()])
            .into_connection();

        let repo = PostgresPostRepository::new(db);
        assert!(matches!(repo.find_by_id(9).await, Err(RepoError::NotFound)));
    }

    #[tokio::test]
    async fn test_create_with_audit_commits_both_rows() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![model(
                1,
                "Getting Started with Go",
                &["golang", "programming", "backend"],
            )]])
            .append_exec_results([MockExecResult {
                last_insert_id: 1,
                rows_affected: 1,
            }])
            .into_connection();

        let repo = PostgresPostRepository::new(db);
        let post = repo
            .create_with_audit(PostDraft::new(
                "Getting Started with Go",
                "Content",
                vec!["golang".into(), "programming".into(), "backend".into()],
            ))
            .await
            .unwrap();

        assert_eq!(post.id, 1);
        assert_eq!(post.tags, vec!["golang", "programming", "backend"]);
    }

    #[tokio::test]
    async fn test_create_fails_when_audit_insert_fails() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![model(1, "Doomed", &[])]])
            .append_exec_errors([DbErr::Custom("activity_logs unavailable".to_owned())])
            .into_connection();

        let repo = PostgresPostRepository::new(db);
        let err = repo
            .create_with_audit(PostDraft::new("Doomed", "Content", vec![]))
            .await
            .unwrap_err();

        assert!(matches!(err, RepoError::Query(_)));
    }

    #[tokio::test]
    async fn test_create_rejects_empty_title_before_touching_db() {
        // No mock results: any query would fail the test with a different error.
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();

        let repo = PostgresPostRepository::new(db);
        let err = repo
            .create_with_audit(PostDraft::new("", "Content", vec![]))
            .await
            .unwrap_err();

        assert!(matches!(err, RepoError::Constraint(_)));
    }

    #[tokio::test]
    async fn test_update_missing_post() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            }])
            .into_connection();

        let repo = PostgresPostRepository::new(db);
        let err = repo
            .update(5, PostDraft::new("t", "c", vec![]))
            .await
            .unwrap_err();

        assert!(matches!(err, RepoError::NotFound));
    }

    #[tokio::test]
    async fn test_find_by_tag_keeps_tag_order() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![
                model(1, "First", &["rust", "web"]),
                model(3, "Third", &["db", "rust"]),
            ]])
            .into_connection();

        let repo = PostgresPostRepository::new(db);
        let found = repo.find_by_tag("rust").await.unwrap();

        assert_eq!(found.len(), 2);
        assert_eq!(found[0].id, 1);
        assert_eq!(found[1].tags, vec!["db", "rust"]);
    }
}
