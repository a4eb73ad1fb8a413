use crate::{Time, UserId, UserSummary};

#[derive(
    Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, serde::Deserialize, serde::Serialize,
)]
#[serde(transparent)]
pub struct RecipeId(pub String);

impl RecipeId {
    pub fn new(id: impl Into<String>) -> RecipeId {
        RecipeId(id.into())
    }
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct RecipeSummary {
    #[serde(rename = "_id")]
    pub id: RecipeId,

    pub title: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub category: Option<String>,

    #[serde(default)]
    pub difficulty: Option<String>,

    #[serde(default)]
    pub tags: Vec<String>,

    #[serde(default)]
    pub ingredients: Vec<String>,

    /// Image and video URLs, first one is the cover
    #[serde(default)]
    pub media: Vec<String>,

    #[serde(rename = "user", default)]
    pub author: Option<UserSummary>,

    #[serde(default)]
    pub likes: u64,

    #[serde(rename = "createdAt", default)]
    pub created_at: Option<Time>,
}

/// Body of a recipe like toggle
#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct NewRecipeLike {
    pub recipe: RecipeId,
    pub user: UserId,
}

/// Display names of the users who liked a recipe, in the order they liked it
#[derive(Clone, Debug, Default, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Likers {
    #[serde(default)]
    pub users: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_server_recipe() {
        let r: RecipeSummary = serde_json::from_str(
            r#"{
                "_id": "r1",
                "title": "Lemon tart",
                "category": "Dessert",
                "ingredients": ["lemons", "butter"],
                "likes": 3,
                "user": { "_id": "u1", "username": "ann" }
            }"#,
        )
        .unwrap();
        assert_eq!(r.ingredients, vec!["lemons", "butter"]);
        assert_eq!(r.likes, 3);
        assert!(r.tags.is_empty());

        let bare: RecipeSummary = serde_json::from_str(r#"{ "_id": "r2", "title": "Toast" }"#).unwrap();
        assert!(bare.ingredients.is_empty());
    }

    #[test]
    fn like_body_names_recipe_and_user() {
        let body = serde_json::to_value(NewRecipeLike {
            recipe: RecipeId::new("r1"),
            user: UserId::new("u1"),
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({ "recipe": "r1", "user": "u1" }));
        let likers: Likers = serde_json::from_str(r#"{ "users": ["ann", "bob"] }"#).unwrap();
        assert_eq!(likers.users, vec!["ann", "bob"]);
    }
}
