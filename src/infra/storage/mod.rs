//! ストレージゲートウェイ
//!
//! 記事・カテゴリ・コメントのテーブルに対するパラメータ化された読み書きだけを
//! 提供し、業務ロジックは持たない。本番用のPostgres実装と、テストで注入する
//! インメモリ実装がある。

pub mod memory;
pub mod pg;

use crate::domain::article::{Article, ArticleQuery, ArticleSummary, Category, CounterKind};
use crate::domain::comment::{Comment, CommentReceipt, CommentStatus, NewComment};
use crate::types::{NewsError, NewsResult};
use async_trait::async_trait;

pub use memory::{ArticleSeed, MemoryNewsStore};
pub use pg::PgNewsStore;

#[async_trait]
pub trait NewsStore: Send + Sync {
    /// 条件に合う記事の要約を作成日時の新しい順に取得する
    async fn fetch_articles(&self, query: &ArticleQuery) -> NewsResult<Vec<ArticleSummary>>;

    /// 記事を1件取得する（カテゴリ名をJOIN）
    async fn fetch_article(&self, id: i64) -> NewsResult<Option<Article>>;

    /// 指定カウンタを1つの文で +1 し、加算後の値を返す。該当行がなければNone。
    async fn increment_counter(&self, id: i64, kind: CounterKind) -> NewsResult<Option<i64>>;

    /// pendingのコメントを挿入し、記事のコメントカウンタを +1 する。
    /// 記事が存在しなければ何も書き込まずNone。
    async fn insert_comment(&self, comment: &NewComment) -> NewsResult<Option<CommentReceipt>>;

    /// 記事のコメントを状態で絞り込み、作成日時の新しい順に取得する
    async fn fetch_comments(&self, news_id: i64, status: CommentStatus) -> NewsResult<Vec<Comment>>;

    /// カテゴリを名前順に取得する
    async fn fetch_categories(&self, limit: Option<i64>) -> NewsResult<Vec<Category>>;
}

/// 文字列パラメータの検査（PostgresのTEXTはNUL文字を受け付けない）
pub(crate) fn check_text_param(name: &str, value: &str) -> NewsResult<()> {
    if value.contains('\0') {
        return Err(NewsError::invalid_parameter(name, "NUL文字を含めることはできません"));
    }
    Ok(())
}

pub(crate) fn check_new_comment(comment: &NewComment) -> NewsResult<()> {
    check_text_param("name", &comment.name)?;
    check_text_param("email", &comment.email)?;
    check_text_param("comment", &comment.body)?;
    Ok(())
}

pub(crate) fn check_limit(limit: Option<i64>) -> NewsResult<()> {
    match limit {
        Some(limit) if limit <= 0 => Err(NewsError::invalid_parameter(
            "limit",
            format!("正の整数を指定してください: {}", limit),
        )),
        _ => Ok(()),
    }
}
