pub mod model;
pub mod query;
pub mod service;

// 公開APIの再エクスポート

// model.rsから
pub use model::{
    category_label, count_label, excerpt, Article, ArticleSummary, Category, CounterKind,
    DEFAULT_READ_TIME, GENERAL_CATEGORY, LEAD_LENGTH,
};

// query.rsから
pub use query::{get_most_recent, list_articles, list_categories, ArticleQuery};

// service.rsから
pub use service::get_article;
