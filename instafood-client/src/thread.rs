use std::sync::Arc;

use crate::{
    api::{AuthToken, Backend, Comment, CommentId, Error, LikeStatus, NewComment, RecipeId},
    build_tree, CommentNode,
};

#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum ThreadError {
    #[error(transparent)]
    Api(#[from] Error),

    #[error("Comment text is empty")]
    EmptyComment,

    #[error("Cancelled by user")]
    Cancelled,

    #[error("Another change is still being sent")]
    Busy,

    /// The change went through, but the thread could not be fetched again
    #[error("Change saved, but reloading failed: {0}")]
    RefreshFailed(#[source] Error),
}

impl ThreadError {
    pub fn is_auth_required(&self) -> bool {
        matches!(self, ThreadError::Api(Error::AuthRequired))
    }
}

/// Issued for each fetch of a thread; only the latest one may update it
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct FetchTicket(u64);

/// Client-side state of the comment section of one recipe
///
/// The forest is only ever replaced wholesale by the result of a full fetch.
/// Failed operations never touch it. At most one mutation is in flight at a
/// time.
#[derive(Clone, Debug)]
pub struct CommentThread {
    recipe: RecipeId,
    forest: Arc<Vec<CommentNode>>,
    draft: String,
    replying_to: Option<CommentId>,
    last_issued: u64,
    loaded: bool,
    mutating: bool,
}

impl CommentThread {
    pub fn new(recipe: RecipeId) -> CommentThread {
        CommentThread {
            recipe,
            forest: Arc::new(Vec::new()),
            draft: String::new(),
            replying_to: None,
            last_issued: 0,
            loaded: false,
            mutating: false,
        }
    }

    pub fn recipe(&self) -> &RecipeId {
        &self.recipe
    }

    pub fn forest(&self) -> &Arc<Vec<CommentNode>> {
        &self.forest
    }

    /// True once at least one fetch succeeded
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Number of top-level comments, as shown on badges
    pub fn top_level_count(&self) -> usize {
        self.forest.len()
    }

    pub fn total_count(&self) -> usize {
        self.forest.iter().map(|n| n.count()).sum()
    }

    pub fn find(&self, id: &CommentId) -> Option<&CommentNode> {
        CommentNode::find_in(&self.forest, id)
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn set_draft(&mut self, text: String) {
        self.draft = text;
    }

    pub fn replying_to(&self) -> Option<&CommentId> {
        self.replying_to.as_ref()
    }

    pub fn reply_to(&mut self, comment: Option<CommentId>) {
        self.replying_to = comment;
    }

    pub fn begin_fetch(&mut self) -> FetchTicket {
        self.last_issued += 1;
        FetchTicket(self.last_issued)
    }

    /// Apply the result of a fetch
    ///
    /// Returns `Ok(false)` if a more recent fetch was issued since `ticket`, in
    /// which case the result is dropped whatever it is.
    pub fn finish_fetch(
        &mut self,
        ticket: FetchTicket,
        res: Result<Vec<Comment>, Error>,
    ) -> Result<bool, ThreadError> {
        if ticket.0 != self.last_issued {
            tracing::debug!(
                ticket = ticket.0,
                latest = self.last_issued,
                "dropping stale comment fetch"
            );
            return Ok(false);
        }
        let flat = res?;
        self.forest = Arc::new(build_tree(&flat));
        self.loaded = true;
        tracing::trace!(recipe = ?self.recipe, comments = flat.len(), "rebuilt comment tree");
        Ok(true)
    }

    /// Check the preconditions of a mutating action
    pub fn require_token(token: Option<&AuthToken>) -> Result<AuthToken, ThreadError> {
        match token {
            Some(t) if !t.is_empty() => Ok(t.clone()),
            _ => Err(ThreadError::Api(Error::AuthRequired)),
        }
    }

    /// Check the preconditions of posting the current draft, returning what to send
    pub fn prepare_post(
        &self,
        token: Option<&AuthToken>,
    ) -> Result<(AuthToken, NewComment), ThreadError> {
        let token = Self::require_token(token)?;
        if self.draft.trim().is_empty() {
            return Err(ThreadError::EmptyComment);
        }
        let comment = NewComment {
            text: self.draft.clone(),
            parent_id: self.replying_to.clone(),
        };
        comment.validate()?;
        Ok((token, comment))
    }

    /// To be called once the server accepted the draft
    pub fn post_succeeded(&mut self) {
        self.draft.clear();
        self.replying_to = None;
    }

    /// True while a mutation was sent and has not been answered yet
    pub fn is_busy(&self) -> bool {
        self.mutating
    }

    /// Mark a mutation as sent, refusing if another one is still in flight
    pub fn begin_mutation(&mut self) -> Result<(), ThreadError> {
        if self.mutating {
            return Err(ThreadError::Busy);
        }
        self.mutating = true;
        Ok(())
    }

    /// Mark the in-flight mutation as answered, whatever the answer
    pub fn end_mutation(&mut self) {
        self.mutating = false;
    }

    pub async fn refresh<B: Backend>(&mut self, backend: &B) -> Result<(), ThreadError> {
        let ticket = self.begin_fetch();
        let res = backend.list_comments(&self.recipe).await;
        self.finish_fetch(ticket, res).map(|_| ())
    }

    /// Refetch after a mutation that the server accepted
    async fn refresh_after<B: Backend>(&mut self, backend: &B) -> Result<(), ThreadError> {
        match self.refresh(backend).await {
            Err(ThreadError::Api(err)) => {
                tracing::warn!(recipe = ?self.recipe, %err, "reloading after a change failed");
                Err(ThreadError::RefreshFailed(err))
            }
            res => res,
        }
    }

    /// Post the current draft, as a reply if a comment is selected
    pub async fn add_comment<B: Backend>(
        &mut self,
        backend: &B,
        token: Option<&AuthToken>,
    ) -> Result<(), ThreadError> {
        let (token, comment) = self.prepare_post(token)?;
        self.begin_mutation()?;
        let res = backend.create_comment(&token, &self.recipe, &comment).await;
        self.end_mutation();
        res?;
        tracing::debug!(recipe = ?self.recipe, parent = ?comment.parent_id, "comment posted");
        self.post_succeeded();
        self.refresh_after(backend).await
    }

    /// Delete a comment, if `confirm` agrees to it
    pub async fn delete_comment<B, F>(
        &mut self,
        backend: &B,
        token: Option<&AuthToken>,
        id: &CommentId,
        confirm: F,
    ) -> Result<(), ThreadError>
    where
        B: Backend,
        F: FnOnce(&CommentNode) -> bool,
    {
        let token = Self::require_token(token)?;
        let node = self
            .find(id)
            .ok_or_else(|| Error::NotFound(format!("comment {}", id.0)))?;
        if !confirm(node) {
            return Err(ThreadError::Cancelled);
        }
        self.begin_mutation()?;
        let res = backend.delete_comment(&token, id).await;
        self.end_mutation();
        res?;
        tracing::debug!(comment = ?id, "comment deleted");
        self.refresh_after(backend).await
    }

    pub async fn like_comment<B: Backend>(
        &mut self,
        backend: &B,
        token: Option<&AuthToken>,
        id: &CommentId,
    ) -> Result<LikeStatus, ThreadError> {
        let token = Self::require_token(token)?;
        self.begin_mutation()?;
        let res = backend.toggle_like(&token, id).await;
        self.end_mutation();
        let status = res?;
        tracing::debug!(comment = ?id, liked = status.liked, "comment like toggled");
        self.refresh_after(backend).await?;
        Ok(status)
    }
}

#[cfg(test)]
mod tests {
    use instafood_mock_server::{MockBackend, MockServer};

    use super::*;
    use crate::api::UserId;

    fn setup() -> (MockServer, RecipeId, AuthToken, UserId) {
        let mut server = MockServer::new();
        let user = server.create_user("ann@example.org", "ann", "hunter2");
        let token = server.issue_token(&user);
        let recipe = server.create_recipe(&user, "Shakshuka");
        (server, recipe, token, user)
    }

    #[tokio::test]
    async fn add_without_token_never_reaches_server() {
        let (server, recipe, _, _) = setup();
        let backend = MockBackend::new(server);
        let mut thread = CommentThread::new(recipe);
        thread.set_draft(String::from("yum"));

        let err = thread.add_comment(&backend, None).await.unwrap_err();
        assert!(err.is_auth_required());
        let blank = AuthToken(String::from("  "));
        let err = thread.add_comment(&backend, Some(&blank)).await.unwrap_err();
        assert!(err.is_auth_required());

        assert_eq!(backend.calls().await, 0);
        assert_eq!(thread.draft(), "yum");
    }

    #[tokio::test]
    async fn empty_draft_is_not_posted() {
        let (server, recipe, token, _) = setup();
        let backend = MockBackend::new(server);
        let mut thread = CommentThread::new(recipe);
        thread.set_draft(String::from(" \n "));
        assert_eq!(
            thread.add_comment(&backend, Some(&token)).await,
            Err(ThreadError::EmptyComment)
        );
        assert_eq!(backend.calls().await, 0);
    }

    #[tokio::test]
    async fn replies_nest_after_rebuild() {
        let (server, recipe, token, _) = setup();
        let backend = MockBackend::new(server);
        let mut thread = CommentThread::new(recipe);
        thread.refresh(&backend).await.unwrap();
        assert!(thread.is_loaded());
        assert_eq!(thread.top_level_count(), 0);

        thread.set_draft(String::from("first"));
        thread.add_comment(&backend, Some(&token)).await.unwrap();
        assert_eq!(thread.draft(), "");
        let first = thread.forest()[0].id.clone();

        thread.set_draft(String::from("reply"));
        thread.reply_to(Some(first.clone()));
        thread.add_comment(&backend, Some(&token)).await.unwrap();
        assert_eq!(thread.replying_to(), None);

        assert_eq!(thread.top_level_count(), 1);
        assert_eq!(thread.total_count(), 2);
        assert_eq!(thread.forest()[0].replies[0].text, "reply");
        assert_eq!(thread.forest()[0].replies[0].parent_id, Some(first));
    }

    #[tokio::test]
    async fn like_shows_up_after_rebuild() {
        let (mut server, recipe, token, user) = setup();
        let other = server.create_user("bob@example.org", "bob", "pw");
        let c = server.add_comment(&recipe, &other, "looks good", None);
        let backend = MockBackend::new(server);
        let mut thread = CommentThread::new(recipe);
        thread.refresh(&backend).await.unwrap();
        assert!(!thread.forest()[0].is_liked_by(&user));

        let status = thread.like_comment(&backend, Some(&token), &c).await.unwrap();
        assert_eq!(status, LikeStatus { liked: true });
        assert!(thread.forest()[0].is_liked_by(&user));
        assert_eq!(thread.forest()[0].likes.len(), 1);

        let status = thread.like_comment(&backend, Some(&token), &c).await.unwrap();
        assert_eq!(status, LikeStatus { liked: false });
        assert!(!thread.forest()[0].is_liked_by(&user));
    }

    #[tokio::test]
    async fn delete_requires_confirmation() {
        let (mut server, recipe, token, user) = setup();
        let c = server.add_comment(&recipe, &user, "oops", None);
        let backend = MockBackend::new(server);
        let mut thread = CommentThread::new(recipe);
        thread.refresh(&backend).await.unwrap();
        let calls_before = backend.calls().await;

        let res = thread
            .delete_comment(&backend, Some(&token), &c, |_| false)
            .await;
        assert_eq!(res, Err(ThreadError::Cancelled));
        assert_eq!(backend.calls().await, calls_before);
        assert_eq!(thread.total_count(), 1);

        thread
            .delete_comment(&backend, Some(&token), &c, |n| n.text == "oops")
            .await
            .unwrap();
        assert_eq!(thread.total_count(), 0);
    }

    #[tokio::test]
    async fn server_rejection_keeps_tree() {
        let (mut server, recipe, _, owner) = setup();
        let c = server.add_comment(&recipe, &owner, "mine", None);
        let intruder = server.create_user("eve@example.org", "eve", "pw");
        let intruder_token = server.issue_token(&intruder);
        let backend = MockBackend::new(server);
        let mut thread = CommentThread::new(recipe);
        thread.refresh(&backend).await.unwrap();
        let before = thread.forest().clone();

        let err = thread
            .delete_comment(&backend, Some(&intruder_token), &c, |_| true)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ThreadError::Api(Error::ServerRejected { status: 403, .. })
        ));
        assert_eq!(thread.forest(), &before);
    }

    #[tokio::test]
    async fn network_failure_keeps_tree() {
        let (mut server, recipe, token, user) = setup();
        server.add_comment(&recipe, &user, "hello", None);
        let backend = MockBackend::new(server);
        let mut thread = CommentThread::new(recipe);
        thread.refresh(&backend).await.unwrap();
        let before = thread.forest().clone();

        backend.fail_next_request().await;
        thread.set_draft(String::from("lost"));
        let err = thread.add_comment(&backend, Some(&token)).await.unwrap_err();
        assert!(matches!(err, ThreadError::Api(Error::Network(_))));
        assert_eq!(thread.forest(), &before);
        assert_eq!(thread.draft(), "lost");

        backend.fail_next_request().await;
        assert!(thread.refresh(&backend).await.is_err());
        assert_eq!(thread.forest(), &before);
    }

    #[tokio::test]
    async fn one_mutation_at_a_time() {
        let (server, recipe, token, _) = setup();
        let backend = MockBackend::new(server);
        let mut thread = CommentThread::new(recipe);
        thread.set_draft(String::from("twice?"));

        thread.begin_mutation().unwrap();
        assert!(thread.is_busy());
        assert_eq!(thread.begin_mutation(), Err(ThreadError::Busy));
        assert_eq!(
            thread.add_comment(&backend, Some(&token)).await,
            Err(ThreadError::Busy)
        );
        assert_eq!(backend.calls().await, 0);
        assert_eq!(thread.draft(), "twice?");

        thread.end_mutation();
        thread.add_comment(&backend, Some(&token)).await.unwrap();
        assert!(!thread.is_busy());
        assert_eq!(thread.total_count(), 1);
    }

    #[tokio::test]
    async fn saved_post_with_failed_reload_is_told_apart() {
        let (server, recipe, token, _) = setup();
        let backend = MockBackend::new(server);
        let mut thread = CommentThread::new(recipe.clone());
        thread.refresh(&backend).await.unwrap();
        let before = thread.forest().clone();

        thread.set_draft(String::from("saved anyway"));
        backend.fail_request_after(1).await;
        let err = thread.add_comment(&backend, Some(&token)).await.unwrap_err();
        assert!(matches!(err, ThreadError::RefreshFailed(Error::Network(_))));
        assert_eq!(thread.draft(), "");
        assert!(!thread.is_busy());
        assert_eq!(thread.forest(), &before);
        assert_eq!(
            backend.server().lock().await.list_comments(&recipe).unwrap().len(),
            1
        );

        thread.refresh(&backend).await.unwrap();
        assert_eq!(thread.forest()[0].text, "saved anyway");
    }

    #[test]
    fn stale_fetch_is_dropped() {
        let mut thread = CommentThread::new(RecipeId::new("r"));
        let old = thread.begin_fetch();
        let new = thread.begin_fetch();
        let comment = |id: &str| Comment {
            id: CommentId::new(id),
            recipe: None,
            text: String::new(),
            author: None,
            parent_id: None,
            likes: Default::default(),
            created_at: chrono::Utc::now(),
        };

        assert_eq!(thread.finish_fetch(new, Ok(vec![comment("new")])), Ok(true));
        assert_eq!(
            thread.finish_fetch(old, Ok(vec![comment("old"), comment("older")])),
            Ok(false)
        );
        assert_eq!(thread.top_level_count(), 1);
        assert_eq!(thread.forest()[0].id, CommentId::new("new"));

        // stale errors are dropped too
        let old = thread.begin_fetch();
        let _new = thread.begin_fetch();
        assert_eq!(
            thread.finish_fetch(old, Err(Error::Network(String::from("timeout")))),
            Ok(false)
        );
    }
}
