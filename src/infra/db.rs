use crate::types::DatabaseConfig;
use anyhow::{Context, Result};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

/// データベース接続プールを作成
///
/// 接続取得のタイムアウトと最大接続数は設定から、クライアント文字コードはUTF-8固定。
pub async fn create_pool(config: &DatabaseConfig) -> Result<PgPool> {
    let options = config
        .connect_options()
        .context("データベース接続設定の変換に失敗しました")?;

    tracing::info!(
        max_connections = config.max_connections,
        timeout_secs = config.connect_timeout.as_secs(),
        "データベースに接続します"
    );

    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(config.connect_timeout)
        .connect_with(options)
        .await
        .context("データベースへの接続に失敗しました")
}

/// データベースの初期化（マイグレーション実行）
pub async fn initialize_database(pool: &PgPool) -> Result<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .context("データベースマイグレーションの実行に失敗しました")
}

/// プールの作成とデータベース初期化を一括で行う便利関数
pub async fn setup_database(config: &DatabaseConfig) -> Result<PgPool> {
    let pool = create_pool(config).await?;
    initialize_database(&pool).await?;
    tracing::info!("データベースの初期化が完了しました");
    Ok(pool)
}
