use crate::domain::{
    article::{
        get_article, get_most_recent, list_articles, list_categories, Article, ArticleQuery,
        ArticleSummary, Category,
    },
    comment::{list_approved_comments, submit_comment, Comment, CommentDraft, CurrentUser},
    engagement::{share_article, ShareReceipt},
};
use crate::infra::storage::NewsStore;
use crate::types::{NewsError, NewsResult};
use serde::{Serialize, Serializer};

/// トップページで使う最新記事の件数（各欄はこの範囲を切り出して使う）
const HOME_HEAD_SIZE: i64 = 6;
const HOME_CATEGORY_TABS: usize = 2;
const CATEGORY_TAB_SIZE: i64 = 5;
/// 記事ページのサイドバーで使う関連記事の件数
const DETAIL_SIDEBAR_SIZE: i64 = 4;

/// 先頭からoffset件を飛ばしてlen件の範囲（範囲外は空）
fn window<T>(items: &[T], offset: usize, len: usize) -> &[T] {
    let start = offset.min(items.len());
    let end = offset.saturating_add(len).min(items.len());
    &items[start..end]
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryTab {
    pub category: Category,
    pub articles: Vec<ArticleSummary>,
}

/// トップページの表示データ
///
/// 最新記事は1回だけ取得し、メイン記事・トップストーリー・トレンドなどの各欄は
/// その結果を参照で切り出す。シリアライズ結果は `sections()` の各欄になる。
#[derive(Debug, Clone)]
pub struct HomePage {
    head: Vec<ArticleSummary>,
    pub categories: Vec<Category>,
    pub category_tabs: Vec<CategoryTab>,
}

impl HomePage {
    pub async fn load<S: NewsStore + ?Sized>(store: &S) -> NewsResult<Self> {
        let head = list_articles(store, ArticleQuery::latest(HOME_HEAD_SIZE)).await?;
        let categories = list_categories(store, None).await?;

        let mut category_tabs = Vec::new();
        for category in categories.iter().take(HOME_CATEGORY_TABS) {
            let articles = list_articles(
                store,
                ArticleQuery::latest(CATEGORY_TAB_SIZE).in_category(category.id),
            )
            .await?;
            category_tabs.push(CategoryTab {
                category: category.clone(),
                articles,
            });
        }

        tracing::debug!(
            articles = head.len(),
            categories = categories.len(),
            "トップページのデータを取得"
        );

        Ok(Self {
            head,
            categories,
            category_tabs,
        })
    }

    /// ヘッダーのトレンドティッカー
    pub fn ticker(&self) -> Option<&ArticleSummary> {
        self.head.first()
    }

    pub fn main_post(&self) -> Option<&ArticleSummary> {
        self.head.first()
    }

    pub fn top_story(&self) -> Option<&ArticleSummary> {
        self.head.get(1)
    }

    pub fn trending(&self) -> &[ArticleSummary] {
        window(&self.head, 2, 3)
    }

    pub fn latest(&self) -> &[ArticleSummary] {
        window(&self.head, 0, 5)
    }

    pub fn popular_main(&self) -> Option<&ArticleSummary> {
        self.head.first()
    }

    pub fn popular_side(&self) -> &[ArticleSummary] {
        window(&self.head, 1, 5)
    }

    pub fn recent_posts(&self) -> &[ArticleSummary] {
        window(&self.head, 0, 2)
    }

    pub fn is_empty(&self) -> bool {
        self.head.is_empty()
    }

    /// 描画する欄の一覧
    pub fn sections(&self) -> HomeSections<'_> {
        HomeSections {
            ticker: self.ticker(),
            main_post: self.main_post(),
            top_story: self.top_story(),
            trending: self.trending(),
            latest: self.latest(),
            popular_main: self.popular_main(),
            popular_side: self.popular_side(),
            recent_posts: self.recent_posts(),
            categories: &self.categories,
            category_tabs: &self.category_tabs,
        }
    }
}

/// トップページの各欄（最新記事を切り出した参照）
#[derive(Debug, Serialize)]
pub struct HomeSections<'a> {
    pub ticker: Option<&'a ArticleSummary>,
    pub main_post: Option<&'a ArticleSummary>,
    pub top_story: Option<&'a ArticleSummary>,
    pub trending: &'a [ArticleSummary],
    pub latest: &'a [ArticleSummary],
    pub popular_main: Option<&'a ArticleSummary>,
    pub popular_side: &'a [ArticleSummary],
    pub recent_posts: &'a [ArticleSummary],
    pub categories: &'a [Category],
    pub category_tabs: &'a [CategoryTab],
}

impl Serialize for HomePage {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.sections().serialize(serializer)
    }
}

/// 記事ページの表示データ
///
/// 記事が見つからない場合も `article` がNoneのページとして描画する。
#[derive(Debug, Clone)]
pub struct DetailPage {
    pub article_id: i64,
    pub article: Option<Article>,
    pub trending: Option<ArticleSummary>,
    sidebar: Vec<ArticleSummary>,
    pub comments: Vec<Comment>,
    pub categories: Vec<Category>,
    pub comment_form: CommentDraft,
}

impl DetailPage {
    /// 記事ページを組み立てる（記事が見つかれば閲覧数を1つ加算する）
    pub async fn load<S: NewsStore + ?Sized>(
        store: &S,
        article_id: i64,
        user: Option<&CurrentUser>,
    ) -> NewsResult<Self> {
        let article = match get_article(store, article_id).await {
            Ok(article) => Some(article),
            Err(NewsError::NotFound { .. }) => None,
            Err(e) => return Err(e),
        };

        let trending = get_most_recent(store, Some(article_id)).await?;
        let sidebar = list_articles(
            store,
            ArticleQuery::latest(DETAIL_SIDEBAR_SIZE).excluding(article_id),
        )
        .await?;
        let comments = match article {
            Some(_) => list_approved_comments(store, article_id).await?,
            None => Vec::new(),
        };
        let categories = list_categories(store, None).await?;

        Ok(Self {
            article_id,
            article,
            trending,
            sidebar,
            comments,
            categories,
            comment_form: CommentDraft::prefilled(user),
        })
    }

    pub fn is_not_found(&self) -> bool {
        self.article.is_none()
    }

    /// 「こちらもおすすめ」欄
    pub fn related(&self) -> &[ArticleSummary] {
        window(&self.sidebar, 0, 2)
    }

    pub fn popular(&self) -> &[ArticleSummary] {
        window(&self.sidebar, 0, 4)
    }

    pub fn recent_posts(&self) -> &[ArticleSummary] {
        window(&self.sidebar, 0, 2)
    }
}

#[derive(Serialize)]
struct DetailSections<'a> {
    article_id: i64,
    article: Option<&'a Article>,
    trending: Option<&'a ArticleSummary>,
    related: &'a [ArticleSummary],
    popular: &'a [ArticleSummary],
    recent_posts: &'a [ArticleSummary],
    comments: &'a [Comment],
    categories: &'a [Category],
    comment_form: &'a CommentDraft,
}

impl Serialize for DetailPage {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        DetailSections {
            article_id: self.article_id,
            article: self.article.as_ref(),
            trending: self.trending.as_ref(),
            related: self.related(),
            popular: self.popular(),
            recent_posts: self.recent_posts(),
            comments: &self.comments,
            categories: &self.categories,
            comment_form: &self.comment_form,
        }
        .serialize(serializer)
    }
}

/// コメントフォーム送信の結果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CommentSubmission {
    /// 記事ページのコメント欄へリダイレクトする
    Redirect { location: String },
    /// 入力を保持したままフォームを再表示する
    Rejected { draft: CommentDraft, message: String },
}

/// コメントフォームの送信を処理する
///
/// 未ログイン・検証エラー・記事なしはフォームの再表示として返し、
/// ストレージ障害だけをエラーとしてリクエストを中断する。
pub async fn handle_comment_submission<S: NewsStore + ?Sized>(
    store: &S,
    user: Option<&CurrentUser>,
    article_id: i64,
    draft: CommentDraft,
) -> NewsResult<CommentSubmission> {
    match submit_comment(store, user, article_id, &draft).await {
        Ok(outcome) => Ok(CommentSubmission::Redirect {
            location: outcome.redirect_target(),
        }),
        Err(e) if e.is_recoverable() => Ok(CommentSubmission::Rejected {
            message: e.public_message(),
            draft,
        }),
        Err(e) => Err(e),
    }
}

/// シェアボタンの処理（記事がなければsuccess=falseを返す）
pub async fn handle_share<S: NewsStore + ?Sized>(
    store: &S,
    article_id: i64,
) -> NewsResult<ShareReceipt> {
    match share_article(store, article_id).await {
        Err(NewsError::NotFound { .. }) => Ok(ShareReceipt {
            success: false,
            shares: 0,
        }),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::storage::{ArticleSeed, MemoryNewsStore};
    use chrono::{Duration, TimeZone, Utc};

    async fn seeded_store(count: usize) -> MemoryNewsStore {
        let store = MemoryNewsStore::new();
        let technology = store.add_category("Technology").await;
        let business = store.add_category("Business").await;
        store.add_category("Sports").await;
        let base = Utc.with_ymd_and_hms(2025, 3, 1, 8, 0, 0).unwrap();

        for i in 0..count {
            let seed = ArticleSeed::new(format!("記事{}", i + 1), base + Duration::minutes(i as i64));
            let seed = match i % 3 {
                0 => seed.category(technology.id),
                1 => seed.category(business.id),
                _ => seed,
            };
            store.add_article(seed).await;
        }
        store
    }

    fn ids(articles: &[ArticleSummary]) -> Vec<i64> {
        articles.iter().map(|a| a.id).collect()
    }

    #[test]
    fn test_window_bounds() {
        let items = [1, 2, 3];
        assert_eq!(window(&items, 0, 2), &[1, 2]);
        assert_eq!(window(&items, 2, 3), &[3]);
        assert!(window(&items, 5, 3).is_empty());
        assert!(window(&items, 1, 0).is_empty());
    }

    // 複合処理・複数モジュール連携系テスト
    mod composition {
        use super::*;

        #[tokio::test]
        async fn test_home_page_sections() -> Result<(), anyhow::Error> {
            let store = seeded_store(8).await;

            let page = HomePage::load(&store).await?;
            assert_eq!(page.main_post().map(|a| a.id), Some(8));
            assert_eq!(page.ticker().map(|a| a.id), Some(8));
            assert_eq!(page.top_story().map(|a| a.id), Some(7));
            assert_eq!(ids(page.trending()), vec![6, 5, 4]);
            assert_eq!(ids(page.latest()), vec![8, 7, 6, 5, 4]);
            assert_eq!(ids(page.popular_side()), vec![7, 6, 5, 4, 3]);
            assert_eq!(ids(page.recent_posts()), vec![8, 7]);

            // カテゴリタブは名前順の先頭2つ
            let tab_names: Vec<&str> = page
                .category_tabs
                .iter()
                .map(|t| t.category.name.as_str())
                .collect();
            assert_eq!(tab_names, vec!["Business", "Sports"]);
            assert_eq!(ids(&page.category_tabs[0].articles), vec![8, 5, 2]);
            assert!(page.category_tabs[1].articles.is_empty());
            assert_eq!(page.categories.len(), 3);
            Ok(())
        }

        #[tokio::test]
        async fn test_home_page_json_has_sections() -> Result<(), anyhow::Error> {
            let store = seeded_store(8).await;
            let page = HomePage::load(&store).await?;

            let json = serde_json::to_value(&page)?;
            let section_ids = |key: &str| -> Vec<i64> {
                json[key]
                    .as_array()
                    .map(|items| items.iter().filter_map(|a| a["id"].as_i64()).collect())
                    .unwrap_or_default()
            };

            assert!(json.get("head").is_none());
            assert_eq!(json["main_post"]["id"], 8);
            assert_eq!(json["top_story"]["id"], 7);
            assert_eq!(section_ids("trending"), vec![6, 5, 4]);
            assert_eq!(section_ids("latest"), vec![8, 7, 6, 5, 4]);
            assert_eq!(section_ids("popular_side"), vec![7, 6, 5, 4, 3]);
            assert_eq!(section_ids("recent_posts"), vec![8, 7]);
            assert_eq!(json["category_tabs"][0]["category"]["name"], "Business");

            let empty = serde_json::to_value(&HomePage::load(&MemoryNewsStore::new()).await?)?;
            assert!(empty["main_post"].is_null());
            assert_eq!(empty["trending"], serde_json::json!([]));
            Ok(())
        }

        #[tokio::test]
        async fn test_detail_page_json_has_sidebar_sections() -> Result<(), anyhow::Error> {
            let store = seeded_store(6).await;
            let page = DetailPage::load(&store, 6, None).await?;

            let json = serde_json::to_value(&page)?;
            assert!(json.get("sidebar").is_none());
            assert_eq!(json["article"]["id"], 6);
            assert_eq!(json["related"].as_array().map(Vec::len), Some(2));
            assert_eq!(json["popular"].as_array().map(Vec::len), Some(4));
            assert_eq!(json["recent_posts"][0]["id"], 5);
            Ok(())
        }

        #[tokio::test]
        async fn test_home_page_does_not_count_views() -> Result<(), anyhow::Error> {
            let store = seeded_store(3).await;

            HomePage::load(&store).await?;
            let article = store.fetch_article(3).await?.expect("記事があるはず");
            assert_eq!(article.views, 0);
            Ok(())
        }

        #[tokio::test]
        async fn test_empty_home_page() -> Result<(), anyhow::Error> {
            let store = MemoryNewsStore::new();

            let page = HomePage::load(&store).await?;
            assert!(page.is_empty());
            assert!(page.main_post().is_none());
            assert!(page.trending().is_empty());
            Ok(())
        }

        #[tokio::test]
        async fn test_detail_page_excludes_current_article() -> Result<(), anyhow::Error> {
            let store = seeded_store(6).await;
            let user = CurrentUser {
                id: 3,
                display_name: "hanako".to_string(),
            };

            let page = DetailPage::load(&store, 6, Some(&user)).await?;
            let article = page.article.as_ref().expect("記事6があるはず");
            assert_eq!(article.views, 1);
            assert_eq!(page.trending.as_ref().map(|a| a.id), Some(5));
            assert_eq!(ids(page.related()), vec![5, 4]);
            assert_eq!(ids(page.popular()), vec![5, 4, 3, 2]);
            assert!(page.popular().iter().all(|a| a.id != 6));
            assert_eq!(page.comment_form.name, "hanako");
            Ok(())
        }

        #[tokio::test]
        async fn test_detail_page_not_found_is_a_page_state() -> Result<(), anyhow::Error> {
            let store = seeded_store(3).await;

            let page = DetailPage::load(&store, 99, None).await?;
            assert!(page.is_not_found());
            assert!(page.comments.is_empty());
            assert_eq!(ids(page.recent_posts()), vec![3, 2]);

            for id in 1..=3 {
                let article = store.fetch_article(id).await?.expect("記事があるはず");
                assert_eq!(article.views, 0);
            }
            Ok(())
        }

        #[tokio::test]
        async fn test_comment_submission_outcomes() -> Result<(), anyhow::Error> {
            let store = seeded_store(2).await;
            let user = CurrentUser {
                id: 1,
                display_name: "Taro".to_string(),
            };

            let draft = CommentDraft::new("Taro", "not-an-email", "本文");
            let result = handle_comment_submission(&store, Some(&user), 1, draft.clone()).await?;
            assert_eq!(
                result,
                CommentSubmission::Rejected {
                    draft,
                    message: "invalid email".to_string(),
                }
            );

            let draft = CommentDraft::new("Taro", "taro@example.com", "本文");
            let result = handle_comment_submission(&store, None, 1, draft.clone()).await?;
            assert!(matches!(result, CommentSubmission::Rejected { .. }));

            let result = handle_comment_submission(&store, Some(&user), 1, draft).await?;
            assert_eq!(
                result,
                CommentSubmission::Redirect {
                    location: "/articles/1#comments".to_string(),
                }
            );
            Ok(())
        }

        #[tokio::test]
        async fn test_storage_failure_aborts_request() {
            let store = seeded_store(2).await;
            store.set_unavailable(true).await;

            let draft = CommentDraft::new("Taro", "taro@example.com", "本文");
            let user = CurrentUser {
                id: 1,
                display_name: "Taro".to_string(),
            };
            let result = handle_comment_submission(&store, Some(&user), 1, draft).await;
            assert!(matches!(result, Err(NewsError::StorageUnavailable { .. })));

            assert!(HomePage::load(&store).await.is_err());
            assert!(DetailPage::load(&store, 1, None).await.is_err());
        }

        #[tokio::test]
        async fn test_share_action() -> Result<(), anyhow::Error> {
            let store = seeded_store(1).await;

            let receipt = handle_share(&store, 1).await?;
            assert_eq!(receipt, ShareReceipt { success: true, shares: 1 });

            let missing = handle_share(&store, 42).await?;
            assert!(!missing.success);
            Ok(())
        }
    }
}
