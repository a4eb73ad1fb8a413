use async_trait::async_trait;

use crate::api::{
    AuthToken, Backend, Comment, CommentId, Credentials, Error, LikeStatus, Likers,
    LoginResponse, NewComment, NewRecipeLike, RecipeId, RecipeSummary, UserId,
};

fn network(e: reqwest::Error) -> Error {
    Error::Network(e.to_string())
}

/// Turn non-success responses into the matching error
async fn check_status(resp: reqwest::Response) -> Result<reqwest::Response, Error> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.bytes().await.map_err(network)?;
    let err = Error::parse(status.as_u16(), &body);
    tracing::warn!(%status, error = %err, "request rejected by server");
    Err(err)
}

async fn json<T>(resp: reqwest::Response) -> Result<T, Error>
where
    T: for<'de> serde::Deserialize<'de>,
{
    check_status(resp).await?.json().await.map_err(network)
}

/// The REST API of a server reachable at `host`
#[derive(Clone, Debug)]
pub struct HttpBackend {
    client: reqwest::Client,
    host: String,
}

impl HttpBackend {
    pub fn new(client: reqwest::Client, host: impl Into<String>) -> HttpBackend {
        let host = host.into();
        HttpBackend {
            client,
            host: String::from(host.trim_end_matches('/')),
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/{}", self.host, path)
    }
}

#[async_trait(?Send)]
impl Backend for HttpBackend {
    async fn login(&self, creds: &Credentials) -> Result<LoginResponse, Error> {
        creds.validate()?;
        let resp = self
            .client
            .post(self.url("auth/login"))
            .json(creds)
            .send()
            .await
            .map_err(network)?;
        json(resp).await
    }

    async fn list_recipes(&self) -> Result<Vec<RecipeSummary>, Error> {
        let resp = self
            .client
            .get(self.url("recipes"))
            .send()
            .await
            .map_err(network)?;
        json(resp).await
    }

    async fn list_comments(&self, recipe: &RecipeId) -> Result<Vec<Comment>, Error> {
        let resp = self
            .client
            .get(self.url(&format!("comments/{}", recipe.0)))
            .send()
            .await
            .map_err(network)?;
        json(resp).await
    }

    async fn create_comment(
        &self,
        token: &AuthToken,
        recipe: &RecipeId,
        comment: &NewComment,
    ) -> Result<Comment, Error> {
        comment.validate()?;
        let path = match &comment.parent_id {
            None => format!("comments/{}", recipe.0),
            Some(parent) => format!("comments/{}/{}", recipe.0, parent.0),
        };
        let resp = self
            .client
            .post(self.url(&path))
            .bearer_auth(&token.0)
            .json(comment)
            .send()
            .await
            .map_err(network)?;
        json(resp).await
    }

    async fn delete_comment(&self, token: &AuthToken, comment: &CommentId) -> Result<(), Error> {
        let resp = self
            .client
            .delete(self.url(&format!("comments/{}", comment.0)))
            .bearer_auth(&token.0)
            .send()
            .await
            .map_err(network)?;
        check_status(resp).await?;
        Ok(())
    }

    async fn toggle_like(
        &self,
        token: &AuthToken,
        comment: &CommentId,
    ) -> Result<LikeStatus, Error> {
        let resp = self
            .client
            .post(self.url(&format!("comments/like/{}", comment.0)))
            .bearer_auth(&token.0)
            .send()
            .await
            .map_err(network)?;
        json(resp).await
    }

    async fn toggle_recipe_like(
        &self,
        token: &AuthToken,
        like: &NewRecipeLike,
    ) -> Result<LikeStatus, Error> {
        let resp = self
            .client
            .post(self.url("likes"))
            .bearer_auth(&token.0)
            .json(like)
            .send()
            .await
            .map_err(network)?;
        json(resp).await
    }

    async fn recipe_liked(&self, recipe: &RecipeId, user: &UserId) -> Result<LikeStatus, Error> {
        let resp = self
            .client
            .get(self.url(&format!("likes/{}/{}", recipe.0, user.0)))
            .send()
            .await
            .map_err(network)?;
        json(resp).await
    }

    async fn recipe_likers(&self, recipe: &RecipeId) -> Result<Likers, Error> {
        let resp = self
            .client
            .get(self.url(&format!("likes/users/{}", recipe.0)))
            .send()
            .await
            .map_err(network)?;
        json(resp).await
    }
}
