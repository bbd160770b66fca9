use super::{check_limit, check_new_comment, NewsStore};
use crate::domain::article::{Article, ArticleQuery, ArticleSummary, Category, CounterKind};
use crate::domain::comment::{Comment, CommentReceipt, CommentStatus, NewComment};
use crate::types::{NewsError, NewsResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

/// テスト・デモ用の記事データ
#[derive(Debug, Clone)]
pub struct ArticleSeed {
    pub title: String,
    pub content: String,
    pub image: Option<String>,
    pub author: String,
    pub created_at: DateTime<Utc>,
    pub read_time: Option<i32>,
    pub category_id: Option<i64>,
}

impl ArticleSeed {
    pub fn new<T: Into<String>>(title: T, created_at: DateTime<Utc>) -> Self {
        let title = title.into();
        Self {
            content: format!("{}の本文", title),
            title,
            image: None,
            author: "Admin".to_string(),
            created_at,
            read_time: None,
            category_id: None,
        }
    }

    pub fn category(mut self, category_id: i64) -> Self {
        self.category_id = Some(category_id);
        self
    }

    pub fn content<C: Into<String>>(mut self, content: C) -> Self {
        self.content = content.into();
        self
    }

    pub fn read_time(mut self, minutes: i32) -> Self {
        self.read_time = Some(minutes);
        self
    }
}

#[derive(Debug, Default)]
struct MemoryState {
    articles: Vec<Article>,
    categories: Vec<Category>,
    comments: Vec<Comment>,
    next_comment_id: i64,
    unavailable: bool,
}

impl MemoryState {
    fn ensure_available(&self) -> NewsResult<()> {
        if self.unavailable {
            return Err(NewsError::StorageUnavailable {
                source: sqlx::Error::PoolTimedOut,
            });
        }
        Ok(())
    }

    fn category_name(&self, category_id: Option<i64>) -> Option<String> {
        let id = category_id?;
        self.categories
            .iter()
            .find(|c| c.id == id)
            .map(|c| c.name.clone())
    }

    fn joined(&self, article: &Article) -> Article {
        Article {
            category_name: self.category_name(article.category_id),
            ..article.clone()
        }
    }

    fn bump(&mut self, id: i64, kind: CounterKind) -> NewsResult<Option<i64>> {
        let Some(article) = self.articles.iter_mut().find(|a| a.id == id) else {
            return Ok(None);
        };
        let counter = match kind {
            CounterKind::Views => &mut article.views,
            CounterKind::Shares => &mut article.shares,
            CounterKind::Comments => &mut article.comments,
        };
        *counter = counter
            .checked_add(1)
            .ok_or_else(|| NewsError::counter_overflow(id, kind.column()))?;
        Ok(Some(*counter))
    }
}

/// プロセス内で完結するストレージ実装
///
/// Postgres実装と同じ並び順・カウンタ加算・オーバーフロー検出の振る舞いを持つ。
/// 1つのロックの中で加算するため、並行な加算が失われることはない。
#[derive(Debug, Default)]
pub struct MemoryNewsStore {
    state: Mutex<MemoryState>,
}

impl MemoryNewsStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_category<N: Into<String>>(&self, name: N) -> Category {
        let mut state = self.state.lock().await;
        let category = Category {
            id: state.categories.len() as i64 + 1,
            name: name.into(),
        };
        state.categories.push(category.clone());
        category
    }

    /// 記事を追加してidを返す（カウンタは0から始まる）
    pub async fn add_article(&self, seed: ArticleSeed) -> i64 {
        let mut state = self.state.lock().await;
        let id = state.articles.len() as i64 + 1;
        state.articles.push(Article {
            id,
            title: seed.title,
            content: seed.content,
            image: seed.image,
            author: seed.author,
            created_at: seed.created_at,
            views: 0,
            comments: 0,
            read_time: seed.read_time,
            shares: 0,
            category_id: seed.category_id,
            category_name: None,
        });
        id
    }

    /// カウンタの値を直接設定する（オーバーフロー検証用）
    pub async fn set_counter(&self, id: i64, kind: CounterKind, value: i64) {
        let mut state = self.state.lock().await;
        if let Some(article) = state.articles.iter_mut().find(|a| a.id == id) {
            match kind {
                CounterKind::Views => article.views = value,
                CounterKind::Shares => article.shares = value,
                CounterKind::Comments => article.comments = value,
            }
        }
    }

    /// 外部のモデレーション操作（pending → approved）を再現する
    pub async fn approve_comment(&self, comment_id: i64) -> bool {
        let mut state = self.state.lock().await;
        match state.comments.iter_mut().find(|c| c.id == comment_id) {
            Some(comment) => {
                comment.status = CommentStatus::Approved;
                true
            }
            None => false,
        }
    }

    /// 状態に関係なく記事の全コメントを返す
    pub async fn all_comments(&self, news_id: i64) -> Vec<Comment> {
        let state = self.state.lock().await;
        state
            .comments
            .iter()
            .filter(|c| c.news_id == news_id)
            .cloned()
            .collect()
    }

    /// trueの間、全ての操作が接続エラーを返す
    pub async fn set_unavailable(&self, unavailable: bool) {
        self.state.lock().await.unavailable = unavailable;
    }
}

#[async_trait]
impl NewsStore for MemoryNewsStore {
    async fn fetch_articles(&self, query: &ArticleQuery) -> NewsResult<Vec<ArticleSummary>> {
        query.validate()?;
        let state = self.state.lock().await;
        state.ensure_available()?;

        let mut candidates: Vec<&Article> = state
            .articles
            .iter()
            .filter(|a| query.category_id.map_or(true, |c| a.category_id == Some(c)))
            .filter(|a| query.exclude_id != Some(a.id))
            .collect();
        candidates.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });

        Ok(candidates
            .into_iter()
            .skip(query.offset as usize)
            .take(query.limit as usize)
            .map(|a| state.joined(a).to_summary())
            .collect())
    }

    async fn fetch_article(&self, id: i64) -> NewsResult<Option<Article>> {
        let state = self.state.lock().await;
        state.ensure_available()?;

        Ok(state
            .articles
            .iter()
            .find(|a| a.id == id)
            .map(|a| state.joined(a)))
    }

    async fn increment_counter(&self, id: i64, kind: CounterKind) -> NewsResult<Option<i64>> {
        let mut state = self.state.lock().await;
        state.ensure_available()?;
        state.bump(id, kind)
    }

    async fn insert_comment(&self, comment: &NewComment) -> NewsResult<Option<CommentReceipt>> {
        check_new_comment(comment)?;
        let mut state = self.state.lock().await;
        state.ensure_available()?;

        // 加算が失敗した場合はコメントも残さない（1トランザクション相当）
        let Some(comment_count) = state.bump(comment.news_id, CounterKind::Comments)? else {
            return Ok(None);
        };

        state.next_comment_id += 1;
        let comment_id = state.next_comment_id;
        state.comments.push(Comment {
            id: comment_id,
            news_id: comment.news_id,
            user_id: Some(comment.user_id),
            name: comment.name.clone(),
            email: comment.email.clone(),
            body: comment.body.clone(),
            status: CommentStatus::Pending,
            created_at: Utc::now(),
        });

        Ok(Some(CommentReceipt {
            comment_id,
            comment_count,
        }))
    }

    async fn fetch_comments(&self, news_id: i64, status: CommentStatus) -> NewsResult<Vec<Comment>> {
        let state = self.state.lock().await;
        state.ensure_available()?;

        let mut comments: Vec<Comment> = state
            .comments
            .iter()
            .filter(|c| c.news_id == news_id && c.status == status)
            .cloned()
            .collect();
        comments.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(comments)
    }

    async fn fetch_categories(&self, limit: Option<i64>) -> NewsResult<Vec<Category>> {
        check_limit(limit)?;
        let state = self.state.lock().await;
        state.ensure_available()?;

        let mut categories = state.categories.clone();
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        if let Some(limit) = limit {
            categories.truncate(limit as usize);
        }
        Ok(categories)
    }
}
