use crate::{
    api::{AuthToken, Backend, Error, LikeStatus, NewRecipeLike, RecipeId, RecipeSummary, UserId},
    CommentThread, SessionInfo, ThreadError,
};

/// Like state of one recipe, as seen by the current user
///
/// The count comes with the recipe listing and is then moved by one on each
/// answered toggle, as there is no way to fetch a single recipe back.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RecipeLikes {
    recipe: RecipeId,
    count: u64,
    liked: bool,
    toggling: bool,
}

impl RecipeLikes {
    pub fn new(recipe: &RecipeSummary) -> RecipeLikes {
        RecipeLikes {
            recipe: recipe.id.clone(),
            count: recipe.likes,
            liked: false,
            toggling: false,
        }
    }

    pub fn recipe(&self) -> &RecipeId {
        &self.recipe
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn liked(&self) -> bool {
        self.liked
    }

    pub fn is_toggling(&self) -> bool {
        self.toggling
    }

    /// Record whether the current user likes the recipe, as told by the server
    pub fn set_liked(&mut self, status: LikeStatus) {
        self.liked = status.liked;
    }

    /// Check that a toggle may be sent and mark it in flight, returning what to send
    pub fn begin_toggle(
        &mut self,
        session: Option<&SessionInfo>,
    ) -> Result<(AuthToken, NewRecipeLike), ThreadError> {
        let token = CommentThread::require_token(session.map(|s| &s.token))?;
        let user = match session {
            Some(s) if !s.user_id.0.is_empty() => s.user_id.clone(),
            _ => return Err(ThreadError::Api(Error::AuthRequired)),
        };
        if self.toggling {
            return Err(ThreadError::Busy);
        }
        self.toggling = true;
        let like = NewRecipeLike {
            recipe: self.recipe.clone(),
            user,
        };
        Ok((token, like))
    }

    /// Apply the answer to a toggle sent after `begin_toggle`
    pub fn finish_toggle(
        &mut self,
        res: Result<LikeStatus, Error>,
    ) -> Result<LikeStatus, ThreadError> {
        self.toggling = false;
        let status = res?;
        match (self.liked, status.liked) {
            (false, true) => self.count += 1,
            (true, false) => self.count = self.count.saturating_sub(1),
            _ => (),
        }
        self.liked = status.liked;
        Ok(status)
    }

    /// Ask the server whether `user` likes the recipe; nobody likes it when logged out
    pub async fn load<B: Backend>(
        &mut self,
        backend: &B,
        user: Option<&UserId>,
    ) -> Result<(), ThreadError> {
        let status = match user {
            Some(u) => backend.recipe_liked(&self.recipe, u).await?,
            None => LikeStatus { liked: false },
        };
        self.set_liked(status);
        Ok(())
    }

    pub async fn toggle<B: Backend>(
        &mut self,
        backend: &B,
        session: Option<&SessionInfo>,
    ) -> Result<LikeStatus, ThreadError> {
        let (token, like) = self.begin_toggle(session)?;
        let res = backend.toggle_recipe_like(&token, &like).await;
        let status = self.finish_toggle(res)?;
        tracing::debug!(recipe = ?self.recipe, liked = status.liked, "recipe like toggled");
        Ok(status)
    }
}
