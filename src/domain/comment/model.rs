use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// コメントのモデレーション状態（rejectedは扱わない）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "comment_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum CommentStatus {
    Pending,
    Approved,
}

// コメントエンティティ（commentsテーブルと一致、本文列はcomment）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Comment {
    pub id: i64,
    pub news_id: i64,
    pub user_id: Option<i64>,
    pub name: String,
    pub email: String,
    pub body: String,
    pub status: CommentStatus,
    pub created_at: DateTime<Utc>,
}

/// 検証済みの新規コメント（ストレージへの挿入パラメータ）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewComment {
    pub news_id: i64,
    pub user_id: i64,
    pub name: String,
    pub email: String,
    pub body: String,
}

/// コメント挿入の結果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CommentReceipt {
    pub comment_id: i64,
    /// 加算後の記事のコメントカウンタ
    pub comment_count: i64,
}

/// セッション層から渡されるログイン中のユーザー
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    pub id: i64,
    pub display_name: String,
}

/// コメントフォームの入力内容
///
/// 検証に失敗した場合もこの値を保持したままフォームを再描画する。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentDraft {
    pub name: String,
    pub email: String,
    pub body: String,
}

impl CommentDraft {
    pub fn new<N: Into<String>, E: Into<String>, B: Into<String>>(name: N, email: E, body: B) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            body: body.into(),
        }
    }

    /// 未入力のフォーム。表示名はログインユーザー名で埋めておく。
    pub fn prefilled(user: Option<&CurrentUser>) -> Self {
        Self {
            name: user.map(|u| u.display_name.clone()).unwrap_or_default(),
            ..Default::default()
        }
    }

    /// 前後の空白を除去した入力
    pub fn trimmed(&self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            body: self.body.trim().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefilled_uses_display_name() {
        let user = CurrentUser {
            id: 7,
            display_name: "hanako".to_string(),
        };
        let draft = CommentDraft::prefilled(Some(&user));
        assert_eq!(draft.name, "hanako");
        assert!(draft.email.is_empty());

        let anonymous = CommentDraft::prefilled(None);
        assert_eq!(anonymous, CommentDraft::default());
    }

    #[test]
    fn test_trimmed_strips_surrounding_whitespace() {
        let draft = CommentDraft::new("  Taro ", "\ttaro@example.com\n", "  本文  ");
        let trimmed = draft.trimmed();
        assert_eq!(trimmed.name, "Taro");
        assert_eq!(trimmed.email, "taro@example.com");
        assert_eq!(trimmed.body, "本文");
    }
}
