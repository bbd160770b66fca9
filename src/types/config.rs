use sqlx::postgres::PgConnectOptions;
use std::env;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// 設定関連のエラー型
/// 環境変数の読み込みや設定値の検証に関するエラーを定義
#[derive(Error, Debug)]
pub enum ConfigError {
    /// 設定値が不正
    #[error("設定値が不正です: {name} - {reason}")]
    InvalidValue { name: String, reason: String },

    /// 接続URLが解析できない
    #[error("DATABASE_URLの解析に失敗しました: {source}")]
    InvalidDatabaseUrl {
        #[source]
        source: sqlx::Error,
    },
}

impl ConfigError {
    /// 不正な設定値エラーを作成
    pub fn invalid_value<N: Into<String>, R: Into<String>>(name: N, reason: R) -> Self {
        Self::InvalidValue {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

/// 設定エラーのResult型エイリアス
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

const DEFAULT_HOST: &str = "localhost";
const DEFAULT_PORT: u16 = 5432;
const DEFAULT_USER: &str = "postgres";
const DEFAULT_DATABASE: &str = "newsers";
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 5;
const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// 接続先の指定方法
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseTarget {
    /// DATABASE_URLをそのまま使う
    Url(String),
    /// DB_HOST などの個別の環境変数から組み立てる
    Parts {
        host: String,
        port: u16,
        user: String,
        password: String,
        database: String,
    },
}

/// データベース接続設定
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub target: DatabaseTarget,
    pub connect_timeout: Duration,
    pub max_connections: u32,
}

impl DatabaseConfig {
    /// 環境変数から設定を読み込む
    ///
    /// `DATABASE_URL` があればそれを優先し、なければ `DB_HOST` / `DB_PORT` /
    /// `DB_USER` / `DB_PASS` / `DB_NAME` から組み立てる。
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// 任意の参照関数から設定を読み込む（テスト用に環境変数を差し替えられる）
    pub fn from_lookup<F>(lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let target = match lookup("DATABASE_URL").filter(|url| !url.trim().is_empty()) {
            Some(url) => DatabaseTarget::Url(url),
            None => DatabaseTarget::Parts {
                host: lookup("DB_HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
                port: parse_or("DB_PORT", lookup("DB_PORT"), DEFAULT_PORT)?,
                user: lookup("DB_USER").unwrap_or_else(|| DEFAULT_USER.to_string()),
                password: lookup("DB_PASS").unwrap_or_default(),
                database: lookup("DB_NAME").unwrap_or_else(|| DEFAULT_DATABASE.to_string()),
            },
        };

        let timeout_secs = parse_or(
            "DB_CONNECT_TIMEOUT_SECS",
            lookup("DB_CONNECT_TIMEOUT_SECS"),
            DEFAULT_CONNECT_TIMEOUT_SECS,
        )?;
        if timeout_secs == 0 {
            return Err(ConfigError::invalid_value(
                "DB_CONNECT_TIMEOUT_SECS",
                "1秒以上を指定してください",
            ));
        }

        let max_connections = parse_or(
            "DB_MAX_CONNECTIONS",
            lookup("DB_MAX_CONNECTIONS"),
            DEFAULT_MAX_CONNECTIONS,
        )?;
        if max_connections == 0 {
            return Err(ConfigError::invalid_value(
                "DB_MAX_CONNECTIONS",
                "1以上を指定してください",
            ));
        }

        Ok(Self {
            target,
            connect_timeout: Duration::from_secs(timeout_secs),
            max_connections,
        })
    }

    /// sqlxの接続オプションに変換する（クライアント文字コードはUTF-8固定）
    pub fn connect_options(&self) -> ConfigResult<PgConnectOptions> {
        let options = match &self.target {
            DatabaseTarget::Url(url) => PgConnectOptions::from_str(url)
                .map_err(|source| ConfigError::InvalidDatabaseUrl { source })?,
            DatabaseTarget::Parts {
                host,
                port,
                user,
                password,
                database,
            } => PgConnectOptions::new()
                .host(host)
                .port(*port)
                .username(user)
                .password(password)
                .database(database),
        };

        Ok(options.options([("client_encoding", "UTF8")]))
    }
}

fn parse_or<T: FromStr>(name: &str, raw: Option<String>, default: T) -> ConfigResult<T> {
    match raw {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::invalid_value(name, format!("数値として解析できません: {}", value))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults_without_env() {
        let config = DatabaseConfig::from_lookup(lookup_from(&[])).unwrap();

        assert_eq!(
            config.target,
            DatabaseTarget::Parts {
                host: "localhost".to_string(),
                port: 5432,
                user: "postgres".to_string(),
                password: String::new(),
                database: "newsers".to_string(),
            }
        );
        assert_eq!(config.connect_timeout, Duration::from_secs(5));
        assert_eq!(config.max_connections, 5);
    }

    #[test]
    fn test_database_url_takes_precedence() {
        let config = DatabaseConfig::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://app:secret@db:5432/news"),
            ("DB_HOST", "ignored"),
        ]))
        .unwrap();

        assert_eq!(
            config.target,
            DatabaseTarget::Url("postgres://app:secret@db:5432/news".to_string())
        );
        assert!(config.connect_options().is_ok());
    }

    #[test]
    fn test_invalid_numbers_are_rejected() {
        let result = DatabaseConfig::from_lookup(lookup_from(&[("DB_PORT", "abc")]));
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));

        let result = DatabaseConfig::from_lookup(lookup_from(&[("DB_CONNECT_TIMEOUT_SECS", "0")]));
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));

        let result = DatabaseConfig::from_lookup(lookup_from(&[("DB_MAX_CONNECTIONS", "0")]));
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
    }
}
