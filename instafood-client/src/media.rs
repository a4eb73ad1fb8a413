use crate::api::RecipeSummary;

pub const DEFAULT_AVATAR: &str = "/default-user.png";
pub const DEFAULT_RECIPE_IMAGE: &str = "/default-image.png";

const VIDEO_EXTENSIONS: &[&str] = &[".mp4", ".mov", ".avi"];

/// Turn a media reference from the server into something a browser can load
///
/// The server hands out either absolute URLs or paths relative to itself.
pub fn resolve_url(host: &str, url: Option<&str>, fallback: &str) -> String {
    match url.filter(|u| !u.is_empty()) {
        None => String::from(fallback),
        Some(u) if u.starts_with("http") => String::from(u),
        Some(u) => format!("{}{}", host.trim_end_matches('/'), u),
    }
}

pub fn avatar_url(host: &str, profile_image: Option<&str>) -> String {
    resolve_url(host, profile_image, DEFAULT_AVATAR)
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MediaKind {
    Image,
    Video,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Cover {
    pub url: String,
    pub kind: MediaKind,
}

/// First media file of a recipe, used as its card picture
pub fn cover(host: &str, recipe: &RecipeSummary) -> Cover {
    match recipe.media.first() {
        None => Cover {
            url: String::from(DEFAULT_RECIPE_IMAGE),
            kind: MediaKind::Image,
        },
        Some(file) => {
            let lower = file.to_ascii_lowercase();
            let kind = match VIDEO_EXTENSIONS.iter().any(|e| lower.ends_with(e)) {
                true => MediaKind::Video,
                false => MediaKind::Image,
            };
            Cover {
                url: resolve_url(host, Some(file), DEFAULT_RECIPE_IMAGE),
                kind,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::RecipeId;

    const HOST: &str = "http://localhost:5000";

    #[test]
    fn avatars() {
        assert_eq!(avatar_url(HOST, None), DEFAULT_AVATAR);
        assert_eq!(avatar_url(HOST, Some("")), DEFAULT_AVATAR);
        assert_eq!(
            avatar_url(HOST, Some("/uploads/me.png")),
            "http://localhost:5000/uploads/me.png"
        );
        assert_eq!(
            avatar_url("http://localhost:5000/", Some("/uploads/me.png")),
            "http://localhost:5000/uploads/me.png"
        );
        assert_eq!(
            avatar_url(HOST, Some("https://cdn.example.org/me.png")),
            "https://cdn.example.org/me.png"
        );
    }

    #[test]
    fn covers() {
        let mut r = RecipeSummary {
            id: RecipeId::new("r"),
            title: String::from("Soup"),
            description: String::new(),
            category: None,
            difficulty: None,
            tags: Vec::new(),
            ingredients: Vec::new(),
            media: Vec::new(),
            author: None,
            likes: 0,
            created_at: None,
        };
        assert_eq!(cover(HOST, &r).url, DEFAULT_RECIPE_IMAGE);

        r.media = vec![String::from("/uploads/clip.MOV"), String::from("/uploads/a.jpg")];
        assert_eq!(
            cover(HOST, &r),
            Cover {
                url: String::from("http://localhost:5000/uploads/clip.MOV"),
                kind: MediaKind::Video,
            }
        );
    }
}
