//! 型定義モジュール
//!
//! アプリケーション全体で使用される共通的な型定義を管理します。
//! - エラー型: ページ状態として扱うエラーとストレージ障害の統一表現
//! - 設定型: 環境変数から読み込むデータベース接続設定

pub mod config;
pub mod error;

// 便利な再エクスポート
pub use config::{ConfigError, ConfigResult, DatabaseConfig, DatabaseTarget};
pub use error::{NewsError, NewsResult, TRY_AGAIN_LATER};
