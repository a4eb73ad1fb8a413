use std::{
    collections::{BTreeMap, HashMap},
    sync::Arc,
};

use async_trait::async_trait;
use instafood_api::{
    AuthToken, Backend, Comment, CommentId, Credentials, Error, LikeStatus, Likers,
    LoginResponse, NewComment, NewRecipeLike, RecipeId, RecipeSummary, UserId, UserSummary,
};
use tokio::sync::Mutex;

mod router;
pub use router::{router, SharedServer};

fn new_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

#[derive(Debug)]
struct MockUser {
    email: String,
    name: String,
    pass: String,
    profile_image: Option<String>,
}

/// In-memory stand-in for the recipe server
///
/// Comments are kept in creation order, which is also the order in which they
/// are listed.
#[derive(Debug, Default)]
pub struct MockServer {
    users: BTreeMap<UserId, MockUser>,
    sessions: HashMap<AuthToken, UserId>,
    recipes: Vec<RecipeSummary>,
    recipe_likes: HashMap<RecipeId, Vec<UserId>>,
    comments: Vec<Comment>,
}

impl MockServer {
    pub fn new() -> MockServer {
        MockServer::default()
    }

    pub fn create_user(&mut self, email: &str, name: &str, password: &str) -> UserId {
        let id = UserId(new_id());
        self.users.insert(
            id.clone(),
            MockUser {
                email: String::from(email),
                name: String::from(name),
                pass: String::from(password),
                profile_image: None,
            },
        );
        id
    }

    pub fn set_profile_image(&mut self, user: &UserId, image: Option<String>) {
        if let Some(u) = self.users.get_mut(user) {
            u.profile_image = image;
        }
    }

    /// Open a session for `user` without going through the login flow
    pub fn issue_token(&mut self, user: &UserId) -> AuthToken {
        let tok = AuthToken(new_id());
        self.sessions.insert(tok.clone(), user.clone());
        tok
    }

    fn summary(&self, user: &UserId) -> Option<UserSummary> {
        self.users.get(user).map(|u| UserSummary {
            id: user.clone(),
            name: u.name.clone(),
            profile_image: u.profile_image.clone(),
        })
    }

    pub fn create_recipe(&mut self, author: &UserId, title: &str) -> RecipeId {
        let id = RecipeId(new_id());
        self.recipes.push(RecipeSummary {
            id: id.clone(),
            title: String::from(title),
            description: String::new(),
            category: None,
            difficulty: None,
            tags: Vec::new(),
            ingredients: Vec::new(),
            media: Vec::new(),
            author: self.summary(author),
            likes: 0,
            created_at: Some(chrono::Utc::now()),
        });
        id
    }

    pub fn recipe_mut(&mut self, recipe: &RecipeId) -> Option<&mut RecipeSummary> {
        self.recipes.iter_mut().find(|r| r.id == *recipe)
    }

    /// Set whether `user` likes `recipe`, keeping the recipe's like count in sync
    pub fn set_recipe_liked(
        &mut self,
        recipe: &RecipeId,
        user: &UserId,
        liked: bool,
    ) -> Result<LikeStatus, Error> {
        self.has_recipe(recipe)?;
        let likers = self.recipe_likes.entry(recipe.clone()).or_default();
        let known = likers.contains(user);
        if liked && !known {
            likers.push(user.clone());
        } else if !liked && known {
            likers.retain(|u| u != user);
        }
        let count = likers.len() as u64;
        if let Some(r) = self.recipe_mut(recipe) {
            r.likes = count;
        }
        Ok(LikeStatus { liked })
    }

    /// Insert a comment as is, without checking that its parent exists
    pub fn add_comment(
        &mut self,
        recipe: &RecipeId,
        author: &UserId,
        text: &str,
        parent: Option<&CommentId>,
    ) -> CommentId {
        let id = CommentId(new_id());
        self.comments.push(Comment {
            id: id.clone(),
            recipe: Some(recipe.clone()),
            text: String::from(text),
            author: self.summary(author),
            parent_id: parent.cloned(),
            likes: Default::default(),
            created_at: chrono::Utc::now(),
        });
        id
    }

    /// Forget a user, leaving their comments without an author
    pub fn delete_user(&mut self, user: &UserId) {
        self.users.remove(user);
        self.sessions.retain(|_, u| u != user);
        for (recipe, likers) in self.recipe_likes.iter_mut() {
            if likers.contains(user) {
                likers.retain(|u| u != user);
                if let Some(r) = self.recipes.iter_mut().find(|r| r.id == *recipe) {
                    r.likes = likers.len() as u64;
                }
            }
        }
        for c in self.comments.iter_mut() {
            if c.is_authored_by(user) {
                c.author = None;
            }
        }
    }

    fn resolve(&self, tok: &AuthToken) -> Result<UserId, Error> {
        self.sessions.get(tok).cloned().ok_or(Error::AuthRequired)
    }

    fn has_recipe(&self, recipe: &RecipeId) -> Result<(), Error> {
        match self.recipes.iter().any(|r| r.id == *recipe) {
            true => Ok(()),
            false => Err(Error::NotFound(format!("recipe {}", recipe.0))),
        }
    }

    fn comment_mut(&mut self, id: &CommentId) -> Result<&mut Comment, Error> {
        self.comments
            .iter_mut()
            .find(|c| c.id == *id)
            .ok_or_else(|| Error::NotFound(format!("comment {}", id.0)))
    }

    pub fn login(&mut self, creds: &Credentials) -> Result<LoginResponse, Error> {
        creds.validate()?;
        let user = self
            .users
            .iter()
            .find(|(_, u)| u.email == creds.email && u.pass == creds.password)
            .map(|(id, u)| (id.clone(), u.name.clone(), u.profile_image.clone()));
        match user {
            None => Err(Error::ServerRejected {
                status: 400,
                message: Some(String::from("Invalid credentials")),
            }),
            Some((user_id, full_name, profile_image)) => Ok(LoginResponse {
                token: self.issue_token(&user_id),
                user_id,
                full_name,
                profile_image,
            }),
        }
    }

    pub fn list_recipes(&self) -> Vec<RecipeSummary> {
        self.recipes.clone()
    }

    pub fn list_comments(&self, recipe: &RecipeId) -> Result<Vec<Comment>, Error> {
        self.has_recipe(recipe)?;
        Ok(self
            .comments
            .iter()
            .filter(|c| c.recipe.as_ref() == Some(recipe))
            .cloned()
            .collect())
    }

    pub fn create_comment(
        &mut self,
        tok: &AuthToken,
        recipe: &RecipeId,
        comment: &NewComment,
    ) -> Result<Comment, Error> {
        let user = self.resolve(tok)?;
        comment.validate()?;
        self.has_recipe(recipe)?;
        if comment.text.trim().is_empty() {
            return Err(Error::ServerRejected {
                status: 400,
                message: Some(String::from("Comment text is required")),
            });
        }
        if let Some(parent) = &comment.parent_id {
            let found = self
                .comments
                .iter()
                .any(|c| c.id == *parent && c.recipe.as_ref() == Some(recipe));
            if !found {
                return Err(Error::NotFound(format!("parent comment {}", parent.0)));
            }
        }
        let id = self.add_comment(recipe, &user, &comment.text, comment.parent_id.as_ref());
        let res = self.comment_mut(&id)?.clone();
        Ok(res)
    }

    /// Delete one comment; its replies stay, pointing to a parent that is gone
    pub fn delete_comment(&mut self, tok: &AuthToken, id: &CommentId) -> Result<(), Error> {
        let user = self.resolve(tok)?;
        if !self.comment_mut(id)?.is_authored_by(&user) {
            return Err(Error::PermissionDenied);
        }
        self.comments.retain(|c| c.id != *id);
        Ok(())
    }

    /// Like or unlike a recipe on behalf of the user the body names, who must be
    /// the one holding the session
    pub fn toggle_recipe_like(
        &mut self,
        tok: &AuthToken,
        like: &NewRecipeLike,
    ) -> Result<LikeStatus, Error> {
        let user = self.resolve(tok)?;
        if like.user != user {
            return Err(Error::PermissionDenied);
        }
        let liked = self.recipe_liked(&like.recipe, &user)?.liked;
        self.set_recipe_liked(&like.recipe, &user, !liked)
    }

    pub fn recipe_liked(&self, recipe: &RecipeId, user: &UserId) -> Result<LikeStatus, Error> {
        self.has_recipe(recipe)?;
        let liked = self
            .recipe_likes
            .get(recipe)
            .map_or(false, |likers| likers.contains(user));
        Ok(LikeStatus { liked })
    }

    /// Names of the users who liked `recipe`; users that are gone are skipped
    pub fn recipe_likers(&self, recipe: &RecipeId) -> Result<Likers, Error> {
        self.has_recipe(recipe)?;
        let users = self
            .recipe_likes
            .get(recipe)
            .into_iter()
            .flatten()
            .filter_map(|u| self.users.get(u).map(|u| u.name.clone()))
            .collect();
        Ok(Likers { users })
    }

    pub fn toggle_like(&mut self, tok: &AuthToken, id: &CommentId) -> Result<LikeStatus, Error> {
        let user = self.resolve(tok)?;
        let comment = self.comment_mut(id)?;
        let liked = match comment.likes.remove(&user) {
            true => false,
            false => comment.likes.insert(user),
        };
        Ok(LikeStatus { liked })
    }
}

#[derive(Debug, Default)]
struct Stats {
    calls: usize,

    /// Number of requests to let through before failing one
    fail_after: Option<usize>,
}

/// `Backend` talking to a `MockServer` in the same process
///
/// Errors go through the same encoding as over HTTP, so that callers see
/// exactly what a real client would.
#[derive(Debug)]
pub struct MockBackend {
    server: SharedServer,
    stats: Mutex<Stats>,
}

impl MockBackend {
    pub fn new(server: MockServer) -> MockBackend {
        MockBackend::shared(Arc::new(Mutex::new(server)))
    }

    pub fn shared(server: SharedServer) -> MockBackend {
        MockBackend {
            server,
            stats: Mutex::new(Stats::default()),
        }
    }

    pub fn server(&self) -> &SharedServer {
        &self.server
    }

    /// Number of requests that were sent, including failed ones
    pub async fn calls(&self) -> usize {
        self.stats.lock().await.calls
    }

    /// Make the next request fail as if the network was down
    pub async fn fail_next_request(&self) {
        self.fail_request_after(0).await;
    }

    /// Let `ok` requests through, then fail the following one
    pub async fn fail_request_after(&self, ok: usize) {
        self.stats.lock().await.fail_after = Some(ok);
    }

    async fn request(&self) -> Result<(), Error> {
        let mut stats = self.stats.lock().await;
        stats.calls += 1;
        match stats.fail_after {
            Some(0) => {
                stats.fail_after = None;
                Err(Error::Network(String::from("connection refused")))
            }
            Some(n) => {
                stats.fail_after = Some(n - 1);
                Ok(())
            }
            None => Ok(()),
        }
    }
}

fn over_the_wire<T>(res: Result<T, Error>) -> Result<T, Error> {
    res.map_err(|e| Error::parse(e.status_code().as_u16(), &e.contents()))
}

#[async_trait(?Send)]
impl Backend for MockBackend {
    async fn login(&self, creds: &Credentials) -> Result<LoginResponse, Error> {
        self.request().await?;
        over_the_wire(self.server.lock().await.login(creds))
    }

    async fn list_recipes(&self) -> Result<Vec<RecipeSummary>, Error> {
        self.request().await?;
        Ok(self.server.lock().await.list_recipes())
    }

    async fn list_comments(&self, recipe: &RecipeId) -> Result<Vec<Comment>, Error> {
        self.request().await?;
        over_the_wire(self.server.lock().await.list_comments(recipe))
    }

    async fn create_comment(
        &self,
        token: &AuthToken,
        recipe: &RecipeId,
        comment: &NewComment,
    ) -> Result<Comment, Error> {
        self.request().await?;
        over_the_wire(self.server.lock().await.create_comment(token, recipe, comment))
    }

    async fn delete_comment(&self, token: &AuthToken, comment: &CommentId) -> Result<(), Error> {
        self.request().await?;
        over_the_wire(self.server.lock().await.delete_comment(token, comment))
    }

    async fn toggle_like(
        &self,
        token: &AuthToken,
        comment: &CommentId,
    ) -> Result<LikeStatus, Error> {
        self.request().await?;
        over_the_wire(self.server.lock().await.toggle_like(token, comment))
    }

    async fn toggle_recipe_like(
        &self,
        token: &AuthToken,
        like: &NewRecipeLike,
    ) -> Result<LikeStatus, Error> {
        self.request().await?;
        over_the_wire(self.server.lock().await.toggle_recipe_like(token, like))
    }

    async fn recipe_liked(&self, recipe: &RecipeId, user: &UserId) -> Result<LikeStatus, Error> {
        self.request().await?;
        over_the_wire(self.server.lock().await.recipe_liked(recipe, user))
    }

    async fn recipe_likers(&self, recipe: &RecipeId) -> Result<Likers, Error> {
        self.request().await?;
        over_the_wire(self.server.lock().await.recipe_likers(recipe))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (MockServer, UserId, RecipeId) {
        let mut s = MockServer::new();
        let ann = s.create_user("ann@example.org", "ann", "pw");
        let recipe = s.create_recipe(&ann, "Pancakes");
        (s, ann, recipe)
    }

    #[test]
    fn login_checks_password() {
        let (mut s, ann, _) = setup();
        let bad = Credentials {
            email: String::from("ann@example.org"),
            password: String::from("nope"),
        };
        assert!(matches!(
            s.login(&bad),
            Err(Error::ServerRejected { status: 400, .. })
        ));
        let good = Credentials {
            password: String::from("pw"),
            ..bad
        };
        let resp = s.login(&good).unwrap();
        assert_eq!(resp.user_id, ann);
        assert_eq!(resp.full_name, "ann");
    }

    #[test]
    fn only_author_deletes() {
        let (mut s, ann, recipe) = setup();
        let bob = s.create_user("bob@example.org", "bob", "pw");
        let c = s.add_comment(&recipe, &ann, "hi", None);
        let bob_tok = s.issue_token(&bob);
        assert_eq!(s.delete_comment(&bob_tok, &c), Err(Error::PermissionDenied));
        let ann_tok = s.issue_token(&ann);
        s.delete_comment(&ann_tok, &c).unwrap();
        assert!(s.list_comments(&recipe).unwrap().is_empty());
    }

    #[test]
    fn replies_survive_parent_deletion() {
        let (mut s, ann, recipe) = setup();
        let c = s.add_comment(&recipe, &ann, "parent", None);
        s.add_comment(&recipe, &ann, "child", Some(&c));
        let tok = s.issue_token(&ann);
        s.delete_comment(&tok, &c).unwrap();
        let left = s.list_comments(&recipe).unwrap();
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].parent_id, Some(c));
    }

    #[test]
    fn reply_to_unknown_parent_is_refused() {
        let (mut s, ann, recipe) = setup();
        let tok = s.issue_token(&ann);
        let reply = NewComment {
            text: String::from("hello?"),
            parent_id: Some(CommentId::new("missing")),
        };
        assert!(matches!(
            s.create_comment(&tok, &recipe, &reply),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn likes_toggle() {
        let (mut s, ann, recipe) = setup();
        let c = s.add_comment(&recipe, &ann, "hi", None);
        let tok = s.issue_token(&ann);
        assert_eq!(s.toggle_like(&tok, &c), Ok(LikeStatus { liked: true }));
        assert_eq!(s.toggle_like(&tok, &c), Ok(LikeStatus { liked: false }));
        let unknown = AuthToken(String::from("forged"));
        assert_eq!(s.toggle_like(&unknown, &c), Err(Error::AuthRequired));
    }

    #[test]
    fn recipe_likes_follow_the_session() {
        let (mut s, ann, recipe) = setup();
        let bob = s.create_user("bob@example.org", "bob", "pw");
        let ann_tok = s.issue_token(&ann);
        let like = |user: &UserId| NewRecipeLike {
            recipe: recipe.clone(),
            user: user.clone(),
        };

        assert_eq!(s.toggle_recipe_like(&ann_tok, &like(&bob)), Err(Error::PermissionDenied));
        assert_eq!(
            s.toggle_recipe_like(&ann_tok, &like(&ann)),
            Ok(LikeStatus { liked: true })
        );
        s.set_recipe_liked(&recipe, &bob, true).unwrap();
        assert_eq!(s.recipe_liked(&recipe, &ann), Ok(LikeStatus { liked: true }));
        assert_eq!(s.list_recipes()[0].likes, 2);
        assert_eq!(
            s.recipe_likers(&recipe).unwrap().users,
            vec!["ann", "bob"]
        );

        assert_eq!(
            s.toggle_recipe_like(&ann_tok, &like(&ann)),
            Ok(LikeStatus { liked: false })
        );
        s.delete_user(&bob);
        assert_eq!(s.list_recipes()[0].likes, 0);
        assert!(s.recipe_likers(&recipe).unwrap().users.is_empty());
        assert!(matches!(
            s.recipe_liked(&RecipeId::new("missing"), &ann),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn deleted_authors_are_anonymous() {
        let (mut s, ann, recipe) = setup();
        s.add_comment(&recipe, &ann, "ghost", None);
        s.delete_user(&ann);
        assert_eq!(s.list_comments(&recipe).unwrap()[0].author, None);
    }

    #[tokio::test]
    async fn backend_reports_wire_errors() {
        let (mut s, ann, recipe) = setup();
        let c = s.add_comment(&recipe, &ann, "hi", None);
        let bob = s.create_user("bob@example.org", "bob", "pw");
        let bob_tok = s.issue_token(&bob);
        let backend = MockBackend::new(s);
        assert_eq!(
            backend.delete_comment(&bob_tok, &c).await,
            Err(Error::ServerRejected {
                status: 403,
                message: Some(String::from("permission denied")),
            })
        );
        backend.fail_next_request().await;
        assert!(matches!(
            backend.list_comments(&recipe).await,
            Err(Error::Network(_))
        ));
        assert_eq!(backend.list_comments(&recipe).await.unwrap().len(), 1);
        assert_eq!(backend.calls().await, 3);

        backend.fail_request_after(1).await;
        assert!(backend.list_comments(&recipe).await.is_ok());
        assert!(backend.list_comments(&recipe).await.is_err());
        assert!(backend.list_comments(&recipe).await.is_ok());
    }
}
