use super::{check_limit, check_new_comment, NewsStore};
use crate::domain::article::{
    Article, ArticleQuery, ArticleSummary, Category, CounterKind, LEAD_LENGTH,
};
use crate::domain::comment::{Comment, CommentReceipt, CommentStatus, NewComment};
use crate::types::{NewsError, NewsResult};
use async_trait::async_trait;
use sqlx::PgPool;

/// Postgresの数値範囲外エラー
const NUMERIC_VALUE_OUT_OF_RANGE: &str = "22003";

/// Postgresを使ったストレージ実装
#[derive(Debug, Clone)]
pub struct PgNewsStore {
    pool: PgPool,
}

impl PgNewsStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// 接続プールを閉じる
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

fn is_out_of_range(error: &sqlx::Error) -> bool {
    error
        .as_database_error()
        .and_then(|e| e.code())
        .is_some_and(|code| code == NUMERIC_VALUE_OUT_OF_RANGE)
}

/// カウンタ加算のエラー変換（BIGINTの範囲外は黙って丸めずに致命的エラーとする）
fn counter_error(id: i64, kind: CounterKind, error: sqlx::Error) -> NewsError {
    if is_out_of_range(&error) {
        NewsError::counter_overflow(id, kind.column())
    } else {
        NewsError::from_sqlx(format!("{}カウンタの加算", kind), error)
    }
}

#[async_trait]
impl NewsStore for PgNewsStore {
    async fn fetch_articles(&self, query: &ArticleQuery) -> NewsResult<Vec<ArticleSummary>> {
        query.validate()?;

        let mut qb = sqlx::QueryBuilder::<sqlx::Postgres>::new(format!(
            r#"
            SELECT
                n.id,
                n.title,
                LEFT(n.content, {lead}) AS lead,
                char_length(n.content) > {lead} AS lead_truncated,
                n.image,
                n.author,
                n.created_at,
                n.views,
                n.comments,
                n.read_time,
                n.shares,
                n.category_id,
                c.name AS category_name
            FROM news n
            LEFT JOIN categories c ON n.category_id = c.id
            "#,
            lead = LEAD_LENGTH
        ));

        if query.category_id.is_some() || query.exclude_id.is_some() {
            qb.push(" WHERE ");
            let mut separated = qb.separated(" AND ");

            if let Some(category_id) = query.category_id {
                separated.push("n.category_id = ").push_bind_unseparated(category_id);
            }
            if let Some(exclude_id) = query.exclude_id {
                separated.push("n.id <> ").push_bind_unseparated(exclude_id);
            }
        }

        // 同時刻の記事はidの降順にしてページングを安定させる
        qb.push(" ORDER BY n.created_at DESC, n.id DESC");
        qb.push(" LIMIT ").push_bind(query.limit);
        qb.push(" OFFSET ").push_bind(query.offset);

        qb.build_query_as::<ArticleSummary>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| NewsError::from_sqlx("記事一覧の取得", e))
    }

    async fn fetch_article(&self, id: i64) -> NewsResult<Option<Article>> {
        sqlx::query_as::<_, Article>(
            r#"
            SELECT
                n.id, n.title, n.content, n.image, n.author, n.created_at,
                n.views, n.comments, n.read_time, n.shares,
                n.category_id, c.name AS category_name
            FROM news n
            LEFT JOIN categories c ON n.category_id = c.id
            WHERE n.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| NewsError::from_sqlx("記事の取得", e))
    }

    async fn increment_counter(&self, id: i64, kind: CounterKind) -> NewsResult<Option<i64>> {
        // 列名は固定値のみ。値の加算はサーバ側の1文で行う。
        let sql = format!(
            "UPDATE news SET {col} = {col} + 1 WHERE id = $1 RETURNING {col}",
            col = kind.column()
        );

        sqlx::query_scalar::<_, i64>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| counter_error(id, kind, e))
    }

    async fn insert_comment(&self, comment: &NewComment) -> NewsResult<Option<CommentReceipt>> {
        check_new_comment(comment)?;

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| NewsError::from_sqlx("トランザクション開始", e))?;

        let comment_count = sqlx::query_scalar::<_, i64>(
            "UPDATE news SET comments = comments + 1 WHERE id = $1 RETURNING comments",
        )
        .bind(comment.news_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| counter_error(comment.news_id, CounterKind::Comments, e))?;

        // 記事がなければtxをドロップしてロールバック
        let Some(comment_count) = comment_count else {
            return Ok(None);
        };

        let comment_id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO comments (news_id, user_id, name, email, comment, status)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id
            "#,
        )
        .bind(comment.news_id)
        .bind(comment.user_id)
        .bind(&comment.name)
        .bind(&comment.email)
        .bind(&comment.body)
        .bind(CommentStatus::Pending)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| NewsError::from_sqlx("コメントの挿入", e))?;

        tx.commit()
            .await
            .map_err(|e| NewsError::from_sqlx("コメント挿入のコミット", e))?;

        Ok(Some(CommentReceipt {
            comment_id,
            comment_count,
        }))
    }

    async fn fetch_comments(&self, news_id: i64, status: CommentStatus) -> NewsResult<Vec<Comment>> {
        sqlx::query_as::<_, Comment>(
            r#"
            SELECT id, news_id, user_id, name, email, comment AS body, status, created_at
            FROM comments
            WHERE news_id = $1 AND status = $2
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(news_id)
        .bind(status)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| NewsError::from_sqlx("コメント一覧の取得", e))
    }

    async fn fetch_categories(&self, limit: Option<i64>) -> NewsResult<Vec<Category>> {
        check_limit(limit)?;

        let mut qb =
            sqlx::QueryBuilder::<sqlx::Postgres>::new("SELECT id, name FROM categories ORDER BY name, id");
        if let Some(limit) = limit {
            qb.push(" LIMIT ").push_bind(limit);
        }

        qb.build_query_as::<Category>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| NewsError::from_sqlx("カテゴリ一覧の取得", e))
    }
}
