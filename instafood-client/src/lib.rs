mod comment;
pub use comment::{build_tree, render_text, walk, CommentNode, Walk};

mod http;
pub use http::HttpBackend;

mod likes;
pub use likes::RecipeLikes;

pub mod media;

mod notify;
pub use notify::{Notification, Operation, Severity, AUTO_HIDE};

mod search;
pub use search::{categories, filter_recipes, RecipeFilter, RecipeSearch};

mod session;
pub use session::{
    MemoryStore, Session, SessionInfo, SessionStore, SubscriptionId, KEY_FULL_NAME,
    KEY_PROFILE_IMAGE, KEY_TOKEN, KEY_USER_ID,
};

mod thread;
pub use thread::{CommentThread, FetchTicket, ThreadError};

pub mod api {
    pub use instafood_api::*;
}
