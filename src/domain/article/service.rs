use super::model::{Article, CounterKind};
use crate::domain::engagement;
use crate::infra::storage::NewsStore;
use crate::types::{NewsError, NewsResult};

/// 記事を1件取得し、閲覧数を1つ加算する
///
/// 閲覧は1リクエストにつき必ず1回数える。同じ閲覧者の再読み込みも重複排除しない。
/// 返す記事の `views` は加算後の値。存在しない記事は `NotFound` で、カウンタは変わらない。
pub async fn get_article<S: NewsStore + ?Sized>(store: &S, id: i64) -> NewsResult<Article> {
    let article = store.fetch_article(id).await.inspect_err(|e| {
        tracing::error!(article_id = id, error = %e, "記事の取得に失敗");
    })?;

    let Some(mut article) = article else {
        tracing::warn!(article_id = id, "記事が見つかりません");
        return Err(NewsError::not_found(format!("記事 {}", id)));
    };

    // 取得と加算の間に記事が削除された場合も、取得できた記事はそのまま表示する
    match engagement::increment_counter(store, id, CounterKind::Views).await {
        Ok(views) => article.views = views,
        Err(NewsError::NotFound { .. }) => {}
        Err(e) => return Err(e),
    }

    Ok(article)
}
