use crate::domain::article::CounterKind;
use crate::infra::storage::NewsStore;
use crate::types::{NewsError, NewsResult};
use serde::Serialize;

/// シェア操作の応答（クライアント側のカウンタ表示をそのまま更新できる）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ShareReceipt {
    pub success: bool,
    pub shares: i64,
}

/// 記事のカウンタを1つ加算し、加算後の値を返す
///
/// 加算はストレージ側の1文（`counter = counter + 1`）で行うため、
/// 並行するリクエストからの加算も失われない。該当記事がなければ `NotFound`。
pub async fn increment_counter<S: NewsStore + ?Sized>(
    store: &S,
    article_id: i64,
    kind: CounterKind,
) -> NewsResult<i64> {
    match store.increment_counter(article_id, kind).await {
        Ok(Some(value)) => {
            tracing::debug!(article_id, counter = %kind, value, "カウンタを加算");
            Ok(value)
        }
        Ok(None) => {
            tracing::warn!(article_id, counter = %kind, "カウンタ加算の対象記事が見つかりません");
            Err(NewsError::not_found(format!("記事 {}", article_id)))
        }
        Err(e) => {
            tracing::error!(article_id, counter = %kind, error = %e, "カウンタの加算に失敗");
            Err(e)
        }
    }
}

/// シェアボタン操作
pub async fn share_article<S: NewsStore + ?Sized>(
    store: &S,
    article_id: i64,
) -> NewsResult<ShareReceipt> {
    let shares = increment_counter(store, article_id, CounterKind::Shares).await?;
    tracing::info!(article_id, shares, "記事がシェアされました");

    Ok(ShareReceipt {
        success: true,
        shares,
    })
}
