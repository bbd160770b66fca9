pub mod page;

pub use page::{
    handle_comment_submission, handle_share, CategoryTab, CommentSubmission, DetailPage, HomePage,
    HomeSections,
};
