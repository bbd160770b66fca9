use thiserror::Error;

/// 利用者に見せる汎用的なストレージ障害メッセージ
pub const TRY_AGAIN_LATER: &str = "Something went wrong. Please try again later.";

/// コンテンツ取得・エンゲージメント処理のエラー型
///
/// `NotFound` / `ValidationFailed` / `Unauthenticated` は通常のページ状態として
/// 呼び出し側で描画される。ストレージ系のエラーはリクエストを中断するが、
/// 詳細は利用者に見せずログにのみ残す。
#[derive(Error, Debug)]
pub enum NewsError {
    /// 対象の記事・カテゴリ・コメントが存在しない
    #[error("対象が見つかりません: {target}")]
    NotFound { target: String },

    /// コメント入力の検証エラー（理由はそのまま投稿者に表示する）
    #[error("{reason}")]
    ValidationFailed { reason: String },

    /// ログインしていない状態でのコメント投稿
    #[error("コメントするにはログインが必要です")]
    Unauthenticated,

    /// ゲートウェイに渡されたパラメータが不正
    #[error("パラメータが不正です: {name} - {reason}")]
    InvalidParameter { name: String, reason: String },

    /// カウンタがストレージの表現範囲を超える
    #[error("カウンタがオーバーフローしました: 記事{article_id}の{counter}")]
    CounterOverflow { article_id: i64, counter: String },

    /// データベースに接続できない（接続取得失敗・タイムアウト）
    #[error("データベース接続エラー: {source}")]
    StorageUnavailable {
        #[source]
        source: sqlx::Error,
    },

    /// クエリの実行に失敗
    #[error("データベースクエリエラー: {operation} - {source}")]
    QueryFailed {
        operation: String,
        #[source]
        source: sqlx::Error,
    },
}

impl NewsError {
    /// NotFoundエラーを作成
    pub fn not_found<T: Into<String>>(target: T) -> Self {
        Self::NotFound {
            target: target.into(),
        }
    }

    /// 検証エラーを作成
    pub fn validation<R: Into<String>>(reason: R) -> Self {
        Self::ValidationFailed {
            reason: reason.into(),
        }
    }

    /// 不正パラメータエラーを作成
    pub fn invalid_parameter<N: Into<String>, R: Into<String>>(name: N, reason: R) -> Self {
        Self::InvalidParameter {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// カウンタオーバーフローエラーを作成
    pub fn counter_overflow<C: Into<String>>(article_id: i64, counter: C) -> Self {
        Self::CounterOverflow {
            article_id,
            counter: counter.into(),
        }
    }

    /// sqlxのエラーを分類して変換する
    ///
    /// 接続系（プール枯渇、I/O、TLS）は `StorageUnavailable`、
    /// 数値範囲外（SQLSTATE 22003）は呼び出し元でカウンタ名が分かる場合に備えて
    /// `QueryFailed` のまま返す。
    pub fn from_sqlx<O: Into<String>>(operation: O, source: sqlx::Error) -> Self {
        match source {
            sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::Io(_)
            | sqlx::Error::Tls(_) => Self::StorageUnavailable { source },
            source => Self::QueryFailed {
                operation: operation.into(),
                source,
            },
        }
    }

    /// 通常のページ状態として扱えるエラーかどうか
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::NotFound { .. } | Self::ValidationFailed { .. } | Self::Unauthenticated
        )
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// 利用者に表示するメッセージ
    pub fn public_message(&self) -> String {
        match self {
            Self::NotFound { .. } => "The requested article could not be found.".to_string(),
            Self::ValidationFailed { reason } => reason.clone(),
            Self::Unauthenticated => "You must be logged in to comment.".to_string(),
            Self::InvalidParameter { .. }
            | Self::CounterOverflow { .. }
            | Self::StorageUnavailable { .. }
            | Self::QueryFailed { .. } => TRY_AGAIN_LATER.to_string(),
        }
    }
}

/// NewsErrorのResult型エイリアス
pub type NewsResult<T> = std::result::Result<T, NewsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_message_hides_storage_details() {
        let err = NewsError::from_sqlx("記事一覧取得", sqlx::Error::RowNotFound);
        assert!(matches!(err, NewsError::QueryFailed { .. }));
        assert_eq!(err.public_message(), TRY_AGAIN_LATER);
        assert!(!err.is_recoverable());

        let err = NewsError::from_sqlx("記事一覧取得", sqlx::Error::PoolTimedOut);
        assert!(matches!(err, NewsError::StorageUnavailable { .. }));
        assert_eq!(err.public_message(), TRY_AGAIN_LATER);
    }

    #[test]
    fn test_validation_reason_is_verbatim() {
        let err = NewsError::validation("invalid email");
        assert_eq!(err.to_string(), "invalid email");
        assert_eq!(err.public_message(), "invalid email");
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_not_found_is_recoverable() {
        let err = NewsError::not_found("記事 42");
        assert!(err.is_not_found());
        assert!(err.is_recoverable());
        assert!(NewsError::Unauthenticated.is_recoverable());
    }
}
