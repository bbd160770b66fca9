//! ドメイン層
//!
//! - article: 記事一覧・記事詳細・カテゴリ
//! - comment: コメント投稿の検証と承認済みコメントの一覧
//! - engagement: 閲覧数・シェア数・コメント数のカウンタ加算

pub mod article;
pub mod comment;
pub mod engagement;
