use async_trait::async_trait;

use crate::{
    AuthToken, Comment, CommentId, Credentials, Error, LikeStatus, Likers, LoginResponse,
    NewComment, NewRecipeLike, RecipeId, RecipeSummary, UserId,
};

/// The REST collaborator, seen from the client
///
/// Futures are not required to be `Send`, so that browser implementations qualify.
#[async_trait(?Send)]
pub trait Backend {
    async fn login(&self, creds: &Credentials) -> Result<LoginResponse, Error>;
    async fn list_recipes(&self) -> Result<Vec<RecipeSummary>, Error>;
    async fn list_comments(&self, recipe: &RecipeId) -> Result<Vec<Comment>, Error>;
    async fn create_comment(
        &self,
        token: &AuthToken,
        recipe: &RecipeId,
        comment: &NewComment,
    ) -> Result<Comment, Error>;
    async fn delete_comment(&self, token: &AuthToken, comment: &CommentId) -> Result<(), Error>;
    async fn toggle_like(&self, token: &AuthToken, comment: &CommentId)
        -> Result<LikeStatus, Error>;

    async fn toggle_recipe_like(
        &self,
        token: &AuthToken,
        like: &NewRecipeLike,
    ) -> Result<LikeStatus, Error>;
    async fn recipe_liked(&self, recipe: &RecipeId, user: &UserId) -> Result<LikeStatus, Error>;
    async fn recipe_likers(&self, recipe: &RecipeId) -> Result<Likers, Error>;
}
