use std::collections::BTreeSet;

use crate::{RecipeId, Time, UserId, UserSummary};

#[derive(
    Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, serde::Deserialize, serde::Serialize,
)]
#[serde(transparent)]
pub struct CommentId(pub String);

impl CommentId {
    pub fn new(id: impl Into<String>) -> CommentId {
        CommentId(id.into())
    }
}

/// A comment as returned by the server, in a flat per-recipe list
#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Comment {
    #[serde(rename = "_id")]
    pub id: CommentId,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipe: Option<RecipeId>,

    pub text: String,

    /// None if the author account no longer exists
    #[serde(rename = "user", default)]
    pub author: Option<UserSummary>,

    /// None for top-level comments
    #[serde(rename = "parentComment", default)]
    pub parent_id: Option<CommentId>,

    /// Set of users who liked this comment
    #[serde(default)]
    pub likes: BTreeSet<UserId>,

    #[serde(rename = "createdAt")]
    pub created_at: Time,
}

impl Comment {
    pub fn is_liked_by(&self, user: &UserId) -> bool {
        self.likes.contains(user)
    }

    pub fn is_authored_by(&self, user: &UserId) -> bool {
        self.author.as_ref().map(|a| &a.id) == Some(user)
    }
}

/// Body of a comment creation request
///
/// The parent is not part of the body: it is carried by the request path.
#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct NewComment {
    pub text: String,

    #[serde(skip)]
    pub parent_id: Option<CommentId>,
}

impl NewComment {
    pub fn validate(&self) -> Result<(), crate::Error> {
        crate::validate_string(&self.text)
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct LikeStatus {
    pub liked: bool,
}
