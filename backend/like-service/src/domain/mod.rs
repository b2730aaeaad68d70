pub mod models;
pub mod projection;

pub use models::{
    AuthorSummary, CommentListResponse, CommentRecord, CommentView, LikeEdge,
    PostListResponse, PostRecord, PostView,
};
