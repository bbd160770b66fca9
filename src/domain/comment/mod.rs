pub mod model;
pub mod service;

// 公開APIの再エクスポート

// model.rsから
pub use model::{Comment, CommentDraft, CommentReceipt, CommentStatus, CurrentUser, NewComment};

// service.rsから
pub use service::{
    is_valid_email, list_approved_comments, submit_comment, validate_draft, SubmitOutcome,
    MAX_BODY_LENGTH, MAX_EMAIL_LENGTH, MAX_NAME_LENGTH,
};
