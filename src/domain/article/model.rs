use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;

/// カテゴリ未設定・参照切れの記事に表示するカテゴリ名
pub const GENERAL_CATEGORY: &str = "General";
/// read_timeが未設定の記事に表示する読了時間（分）
pub const DEFAULT_READ_TIME: i32 = 5;
/// 一覧用に取得する本文の先頭部分の長さ（文字数）
pub const LEAD_LENGTH: usize = 250;

// 記事エンティティ（詳細ページ用、カテゴリ名をJOIN済み）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Article {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub image: Option<String>,
    pub author: String,
    pub created_at: DateTime<Utc>,
    pub views: i64,
    pub comments: i64,
    pub read_time: Option<i32>,
    pub shares: i64,
    pub category_id: Option<i64>,
    pub category_name: Option<String>,
}

// 軽量記事エンティティ（一覧用、本文は先頭部分のみ）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct ArticleSummary {
    pub id: i64,
    pub title: String,
    /// 本文の先頭 `LEAD_LENGTH` 文字
    pub lead: String,
    /// 本文が `lead` より長い（`lead` の後ろが切れている）
    pub lead_truncated: bool,
    pub image: Option<String>,
    pub author: String,
    pub created_at: DateTime<Utc>,
    pub views: i64,
    pub comments: i64,
    pub read_time: Option<i32>,
    pub shares: i64,
    pub category_id: Option<i64>,
    pub category_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Category {
    pub id: i64,
    pub name: String,
}

/// 記事ごとに独立して加算されるエンゲージメントカウンタ
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CounterKind {
    Views,
    Shares,
    Comments,
}

impl CounterKind {
    /// newsテーブルの列名
    pub fn column(&self) -> &'static str {
        match self {
            CounterKind::Views => "views",
            CounterKind::Shares => "shares",
            CounterKind::Comments => "comments",
        }
    }
}

impl fmt::Display for CounterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

impl Article {
    /// 表示用カテゴリ名（未設定ならGeneral）
    pub fn category_label(&self) -> &str {
        category_label(self.category_name.as_deref())
    }

    pub fn read_time_or_default(&self) -> i32 {
        self.read_time.unwrap_or(DEFAULT_READ_TIME)
    }

    /// 一覧表示用の要約に変換する
    pub fn to_summary(&self) -> ArticleSummary {
        ArticleSummary {
            id: self.id,
            title: self.title.clone(),
            lead: self.content.chars().take(LEAD_LENGTH).collect(),
            lead_truncated: self.content.chars().count() > LEAD_LENGTH,
            image: self.image.clone(),
            author: self.author.clone(),
            created_at: self.created_at,
            views: self.views,
            comments: self.comments,
            read_time: self.read_time,
            shares: self.shares,
            category_id: self.category_id,
            category_name: self.category_name.clone(),
        }
    }

    pub fn counter(&self, kind: CounterKind) -> i64 {
        match kind {
            CounterKind::Views => self.views,
            CounterKind::Shares => self.shares,
            CounterKind::Comments => self.comments,
        }
    }
}

impl ArticleSummary {
    pub fn category_label(&self) -> &str {
        category_label(self.category_name.as_deref())
    }

    pub fn read_time_or_default(&self) -> i32 {
        self.read_time.unwrap_or(DEFAULT_READ_TIME)
    }

    /// 本文の抜粋（width文字を超える場合は "..." で切り詰め）
    ///
    /// `lead` の後ろが切れている場合、幅は `lead` の文字数未満に抑えられ、
    /// 必ず "..." で終わる。つまり `LEAD_LENGTH` 以上の幅を指定しても
    /// 結果は最大 `LEAD_LENGTH - 1` 文字になる。
    pub fn excerpt(&self, width: usize) -> String {
        if self.lead_truncated {
            let cap = self.lead.chars().count().saturating_sub(1);
            excerpt(&self.lead, width.min(cap))
        } else {
            excerpt(&self.lead, width)
        }
    }
}

/// カテゴリ名の表示用フォールバック
pub fn category_label(name: Option<&str>) -> &str {
    match name {
        Some(name) if !name.is_empty() => name,
        _ => GENERAL_CATEGORY,
    }
}

/// 文字列をwidth文字以内に収める。切り詰めた場合は末尾の "..." を含めてwidth文字になる。
pub fn excerpt(text: &str, width: usize) -> String {
    const MARKER: &str = "...";
    let marker_len = MARKER.chars().count();

    if text.chars().count() <= width {
        return text.to_string();
    }
    if width <= marker_len {
        return MARKER.chars().take(width).collect();
    }

    let mut cut: String = text.chars().take(width - marker_len).collect();
    cut.push_str(MARKER);
    cut
}

/// "1 View" / "2 Views" のような件数ラベル
pub fn count_label(count: i64, noun: &str) -> String {
    if count == 1 {
        format!("{} {}", count, noun)
    } else {
        format!("{} {}s", count, noun)
    }
}
