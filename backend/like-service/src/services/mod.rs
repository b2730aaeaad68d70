pub mod content;
pub mod events;
pub mod likes;

pub use content::ContentService;
pub use events::{LikeEnvelope, LikeEventBus};
pub use likes::LikeService;
