use std::sync::Arc;

use axum::{
    async_trait,
    extract::{FromRequestParts, Path, State},
    http::{self, request},
    routing::{get, post},
    Json, Router,
};
use instafood_api::{
    AuthToken, Comment, CommentId, Credentials, Error as ApiError, LikeStatus, Likers,
    LoginResponse, NewComment, NewRecipeLike, RecipeId, RecipeSummary, UserId,
};
use tokio::sync::Mutex;
use tower_http::trace::TraceLayer;

use crate::MockServer;

pub type SharedServer = Arc<Mutex<MockServer>>;

#[derive(Debug, thiserror::Error)]
#[error(transparent)]
pub struct Error(#[from] ApiError);

impl axum::response::IntoResponse for Error {
    fn into_response(self) -> axum::response::Response {
        tracing::info!("returning error to client: {}", self.0);
        (self.0.status_code(), self.0.contents()).into_response()
    }
}

pub struct Bearer(pub AuthToken);

#[async_trait]
impl<S: Sync> FromRequestParts<S> for Bearer {
    type Rejection = Error;

    async fn from_request_parts(req: &mut request::Parts, _state: &S) -> Result<Bearer, Error> {
        let auth = req
            .headers
            .get(http::header::AUTHORIZATION)
            .ok_or(ApiError::AuthRequired)?
            .to_str()
            .map_err(|_| ApiError::AuthRequired)?;
        let mut auth = auth.split(' ');
        if !auth
            .next()
            .ok_or(ApiError::AuthRequired)?
            .eq_ignore_ascii_case("bearer")
        {
            return Err(Error(ApiError::AuthRequired));
        }
        let token = auth.next().ok_or(ApiError::AuthRequired)?;
        if auth.next().is_some() {
            return Err(Error(ApiError::AuthRequired));
        }
        Ok(Bearer(AuthToken(String::from(token))))
    }
}

/// HTTP surface of a mock server, on the same paths as the real one
pub fn router(server: SharedServer) -> Router {
    Router::new()
        .route("/api/auth/login", post(login))
        .route("/api/recipes", get(list_recipes))
        .route(
            "/api/comments/:id",
            get(list_comments).post(create_comment).delete(delete_comment),
        )
        .route("/api/comments/:id/:parent", post(create_reply))
        .route("/api/comments/like/:id", post(toggle_like))
        .route("/api/likes", post(toggle_recipe_like))
        .route("/api/likes/users/:id", get(recipe_likers))
        .route("/api/likes/:id/:user", get(recipe_liked))
        .layer(TraceLayer::new_for_http())
        .with_state(server)
}

async fn login(
    State(server): State<SharedServer>,
    Json(creds): Json<Credentials>,
) -> Result<Json<LoginResponse>, Error> {
    Ok(Json(server.lock().await.login(&creds)?))
}

async fn list_recipes(State(server): State<SharedServer>) -> Json<Vec<RecipeSummary>> {
    Json(server.lock().await.list_recipes())
}

async fn list_comments(
    State(server): State<SharedServer>,
    Path(recipe): Path<RecipeId>,
) -> Result<Json<Vec<Comment>>, Error> {
    Ok(Json(server.lock().await.list_comments(&recipe)?))
}

async fn create_comment(
    State(server): State<SharedServer>,
    Bearer(tok): Bearer,
    Path(recipe): Path<RecipeId>,
    Json(comment): Json<NewComment>,
) -> Result<Json<Comment>, Error> {
    Ok(Json(
        server.lock().await.create_comment(&tok, &recipe, &comment)?,
    ))
}

async fn create_reply(
    State(server): State<SharedServer>,
    Bearer(tok): Bearer,
    Path((recipe, parent)): Path<(RecipeId, CommentId)>,
    Json(mut comment): Json<NewComment>,
) -> Result<Json<Comment>, Error> {
    comment.parent_id = Some(parent);
    Ok(Json(
        server.lock().await.create_comment(&tok, &recipe, &comment)?,
    ))
}

async fn delete_comment(
    State(server): State<SharedServer>,
    Bearer(tok): Bearer,
    Path(comment): Path<CommentId>,
) -> Result<(), Error> {
    server.lock().await.delete_comment(&tok, &comment)?;
    Ok(())
}

async fn toggle_like(
    State(server): State<SharedServer>,
    Bearer(tok): Bearer,
    Path(comment): Path<CommentId>,
) -> Result<Json<LikeStatus>, Error> {
    Ok(Json(server.lock().await.toggle_like(&tok, &comment)?))
}

async fn toggle_recipe_like(
    State(server): State<SharedServer>,
    Bearer(tok): Bearer,
    Json(like): Json<NewRecipeLike>,
) -> Result<Json<LikeStatus>, Error> {
    Ok(Json(server.lock().await.toggle_recipe_like(&tok, &like)?))
}

async fn recipe_liked(
    State(server): State<SharedServer>,
    Path((recipe, user)): Path<(RecipeId, UserId)>,
) -> Result<Json<LikeStatus>, Error> {
    Ok(Json(server.lock().await.recipe_liked(&recipe, &user)?))
}

async fn recipe_likers(
    State(server): State<SharedServer>,
    Path(recipe): Path<RecipeId>,
) -> Result<Json<Likers>, Error> {
    Ok(Json(server.lock().await.recipe_likers(&recipe)?))
}
