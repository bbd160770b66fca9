use super::model::{Comment, CommentDraft, CommentStatus, CurrentUser, NewComment};
use crate::infra::storage::NewsStore;
use crate::types::{NewsError, NewsResult};
use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

pub const MAX_NAME_LENGTH: usize = 100;
pub const MAX_EMAIL_LENGTH: usize = 100;
pub const MAX_BODY_LENGTH: usize = 1000;

pub const REASON_REQUIRED: &str = "required field missing";
pub const REASON_INVALID_EMAIL: &str = "invalid email";
pub const REASON_TOO_LONG: &str = "exceeds maximum length";

lazy_static! {
    // ローカル部はドットで始まらず、終わらず、連続しない。ドメインは2文字以上のTLDを持つ。
    static ref EMAIL_REGEX: Regex = Regex::new(
        r#"(?i)^[a-z0-9!#$%&'*+/=?^_`{|}~-]+(?:\.[a-z0-9!#$%&'*+/=?^_`{|}~-]+)*@(?:[a-z0-9](?:[a-z0-9-]{0,61}[a-z0-9])?\.)+[a-z]{2,63}$"#
    ).unwrap();
}

/// コメント投稿成功時の結果（呼び出し側は記事ページのコメント欄へリダイレクトする）
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmitOutcome {
    pub article_id: i64,
    pub comment_id: i64,
    pub comment_count: i64,
}

impl SubmitOutcome {
    pub fn redirect_target(&self) -> String {
        format!("/articles/{}#comments", self.article_id)
    }
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_REGEX.is_match(email)
}

/// 入力を検証し、前後の空白を除去した値を返す
///
/// 必須チェック → メール形式 → 文字数の順に判定し、最初の違反で止まる。
pub fn validate_draft(draft: &CommentDraft) -> NewsResult<CommentDraft> {
    let draft = draft.trimmed();

    if draft.name.is_empty() || draft.email.is_empty() || draft.body.is_empty() {
        return Err(NewsError::validation(REASON_REQUIRED));
    }
    if !is_valid_email(&draft.email) {
        return Err(NewsError::validation(REASON_INVALID_EMAIL));
    }
    if draft.name.chars().count() > MAX_NAME_LENGTH
        || draft.email.chars().count() > MAX_EMAIL_LENGTH
        || draft.body.chars().count() > MAX_BODY_LENGTH
    {
        return Err(NewsError::validation(REASON_TOO_LONG));
    }

    Ok(draft)
}

/// コメントを投稿する
///
/// ログイン必須。検証を通った入力はpendingとして保存され、同時に記事の
/// コメントカウンタが1つ加算される（承認済みの件数ではなく投稿数を数える）。
/// 同じ内容の再送信も新しいコメントとして扱う。
pub async fn submit_comment<S: NewsStore + ?Sized>(
    store: &S,
    user: Option<&CurrentUser>,
    article_id: i64,
    draft: &CommentDraft,
) -> NewsResult<SubmitOutcome> {
    let Some(user) = user else {
        tracing::warn!(article_id, "未ログインでのコメント投稿");
        return Err(NewsError::Unauthenticated);
    };

    let draft = validate_draft(draft).inspect_err(|e| {
        tracing::warn!(article_id, user_id = user.id, reason = %e, "コメント入力の検証エラー");
    })?;

    let new_comment = NewComment {
        news_id: article_id,
        user_id: user.id,
        name: draft.name,
        email: draft.email,
        body: draft.body,
    };

    let receipt = store
        .insert_comment(&new_comment)
        .await
        .inspect_err(|e| {
            tracing::error!(article_id, user_id = user.id, error = %e, "コメントの保存に失敗");
        })?
        .ok_or_else(|| {
            tracing::warn!(article_id, "コメント対象の記事が見つかりません");
            NewsError::not_found(format!("記事 {}", article_id))
        })?;

    tracing::info!(
        article_id,
        user_id = user.id,
        comment_id = receipt.comment_id,
        comment_count = receipt.comment_count,
        "コメントを受け付けました（承認待ち）"
    );

    Ok(SubmitOutcome {
        article_id,
        comment_id: receipt.comment_id,
        comment_count: receipt.comment_count,
    })
}

/// 承認済みのコメントだけを新しい順に取得する
pub async fn list_approved_comments<S: NewsStore + ?Sized>(
    store: &S,
    article_id: i64,
) -> NewsResult<Vec<Comment>> {
    store
        .fetch_comments(article_id, CommentStatus::Approved)
        .await
        .inspect_err(|e| {
            tracing::error!(article_id, error = %e, "コメント一覧の取得に失敗");
        })
}
