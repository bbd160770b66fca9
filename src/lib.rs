//! ニュースサイトの記事取得とエンゲージメントカウンタ
//!
//! 記事一覧（トップページ・カテゴリタブ・トレンド・関連記事）の取得、
//! 記事詳細の閲覧数加算、シェア数の加算、コメント投稿の検証と保存を扱う。
//! ストレージは `infra::storage::NewsStore` として呼び出し側から明示的に渡す。

pub mod app;
pub mod domain;
pub mod infra;
pub mod types;
