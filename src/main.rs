use anyhow::{anyhow, bail, Context, Result};
use newsdesk::{
    app::{handle_share, DetailPage, HomePage},
    domain::article::{list_articles, ArticleQuery},
    infra::{db::setup_database, storage::PgNewsStore},
    types::{DatabaseConfig, NewsError},
};
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const USAGE: &str = "使い方: newsdesk [home | list <limit> [offset] | article <id> | share <id>]";

#[tokio::main]
async fn main() -> Result<()> {
    // 環境変数を読み込み（.envファイルがあれば使用）
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,newsdesk=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let config = DatabaseConfig::from_env().context("データベース設定の読み込みに失敗")?;
    let pool = setup_database(&config).await?;
    let store = PgNewsStore::new(pool);

    let result = run(&store, &args).await;
    store.close().await;

    match result {
        Ok(()) => Ok(()),
        Err(e) => match e.downcast_ref::<NewsError>() {
            // 引数の誤りは障害ではないので詳細をそのまま見せる
            Some(news_error @ NewsError::InvalidParameter { .. }) => {
                eprintln!("{}\n{}", news_error, USAGE);
                std::process::exit(2);
            }
            // ストレージ障害の詳細はログにのみ出す
            Some(news_error) if !news_error.is_recoverable() => {
                tracing::error!(error = %e, "リクエストの処理に失敗");
                eprintln!("{}", news_error.public_message());
                std::process::exit(1);
            }
            _ => Err(e),
        },
    }
}

async fn run(store: &PgNewsStore, args: &[String]) -> Result<()> {
    match args.first().map(String::as_str) {
        None | Some("home") => {
            let page = HomePage::load(store).await?;
            if page.is_empty() {
                println!("No news available.");
            }
            print_json(&page)
        }
        Some("list") => {
            let query = parse_list_query(&args[1..])?;
            let articles = list_articles(store, query).await?;
            print_json(&articles)
        }
        Some("article") => {
            let id = parse_arg(args.get(1), "id")?;
            let page = DetailPage::load(store, id, None).await?;
            if page.is_not_found() {
                println!("{}", NewsError::not_found(format!("記事 {}", id)).public_message());
            }
            print_json(&page)
        }
        Some("share") => {
            let id = parse_arg(args.get(1), "id")?;
            let receipt = handle_share(store, id).await?;
            print_json(&receipt)
        }
        Some(other) => bail!("不明なコマンド: {}\n{}", other, USAGE),
    }
}

fn parse_arg(raw: Option<&String>, name: &str) -> Result<i64> {
    let raw = raw.with_context(|| format!("{}を指定してください\n{}", name, USAGE))?;
    raw.parse()
        .with_context(|| format!("{}は整数で指定してください: {}", name, raw))
}

/// `list <limit> [offset]` の引数を検証済みのクエリにする
fn parse_list_query(args: &[String]) -> Result<ArticleQuery> {
    let limit = parse_arg(args.first(), "limit")?;
    let offset = match args.get(1) {
        Some(raw) => parse_arg(Some(raw), "offset")?,
        None => 0,
    };
    let query = ArticleQuery::latest(limit).offset(offset);
    query.validate().map_err(|e| anyhow!("{}\n{}", e, USAGE))?;
    Ok(query)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("JSONへの変換に失敗")?;
    println!("{}", json);
    Ok(())
}
