mod auth;
pub use auth::{AuthToken, Credentials, LoginResponse};

mod backend;
pub use backend::Backend;

mod comment;
pub use comment::{Comment, CommentId, LikeStatus, NewComment};

mod error;
pub use error::Error;

mod recipe;
pub use recipe::{Likers, NewRecipeLike, RecipeId, RecipeSummary};

mod user;
pub use user::{UserId, UserSummary};

pub type Time = chrono::DateTime<chrono::Utc>;

pub fn validate_string(s: &str) -> Result<(), Error> {
    if s.contains('\0') {
        return Err(Error::NullByteInString(String::from(s)));
    }
    Ok(())
}
