use super::model::{ArticleSummary, Category};
use crate::infra::storage::NewsStore;
use crate::types::{NewsError, NewsResult};

// 記事一覧クエリの条件構造体
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArticleQuery {
    pub limit: i64,
    pub offset: i64,
    pub category_id: Option<i64>,
    pub exclude_id: Option<i64>,
}

impl ArticleQuery {
    /// 最新記事からlimit件
    pub fn latest(limit: i64) -> Self {
        Self {
            limit,
            offset: 0,
            category_id: None,
            exclude_id: None,
        }
    }

    pub fn offset(mut self, offset: i64) -> Self {
        self.offset = offset;
        self
    }

    pub fn in_category(mut self, category_id: i64) -> Self {
        self.category_id = Some(category_id);
        self
    }

    /// 表示中の記事を候補から外す（関連記事・最近の記事用）
    pub fn excluding(mut self, article_id: i64) -> Self {
        self.exclude_id = Some(article_id);
        self
    }

    /// limitは正、offsetは0以上でなければならない
    pub fn validate(&self) -> NewsResult<()> {
        if self.limit <= 0 {
            return Err(NewsError::invalid_parameter(
                "limit",
                format!("正の整数を指定してください: {}", self.limit),
            ));
        }
        if self.offset < 0 {
            return Err(NewsError::invalid_parameter(
                "offset",
                format!("0以上を指定してください: {}", self.offset),
            ));
        }
        Ok(())
    }
}

/// 記事一覧を取得する
///
/// 作成日時の新しい順。`exclude_id` はlimit/offsetの適用前に候補から除かれる。
/// 該当がなければ空のベクタを返す。
pub async fn list_articles<S: NewsStore + ?Sized>(
    store: &S,
    query: ArticleQuery,
) -> NewsResult<Vec<ArticleSummary>> {
    query.validate()?;

    let articles = store.fetch_articles(&query).await.inspect_err(|e| {
        tracing::error!(error = %e, ?query, "記事一覧の取得に失敗");
    })?;

    tracing::debug!(
        count = articles.len(),
        limit = query.limit,
        offset = query.offset,
        category_id = ?query.category_id,
        exclude_id = ?query.exclude_id,
        "記事一覧を取得"
    );
    Ok(articles)
}

/// 最新の記事を1件だけ取得する（トレンド欄・ティッカー用）
pub async fn get_most_recent<S: NewsStore + ?Sized>(
    store: &S,
    exclude_id: Option<i64>,
) -> NewsResult<Option<ArticleSummary>> {
    let mut query = ArticleQuery::latest(1);
    query.exclude_id = exclude_id;

    let mut articles = list_articles(store, query).await?;
    Ok(if articles.is_empty() {
        None
    } else {
        Some(articles.swap_remove(0))
    })
}

/// カテゴリを名前順に取得する（limit指定時は先頭からlimit件）
pub async fn list_categories<S: NewsStore + ?Sized>(
    store: &S,
    limit: Option<i64>,
) -> NewsResult<Vec<Category>> {
    store.fetch_categories(limit).await.inspect_err(|e| {
        tracing::error!(error = %e, ?limit, "カテゴリ一覧の取得に失敗");
    })
}
