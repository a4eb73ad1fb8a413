use percent_encoding::percent_decode_str;

use crate::api::RecipeSummary;

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum RecipeFilter {
    /// Any tag equal, ignoring case
    Tag(String),
    Category(String),
    Difficulty(String),

    /// Substring of the title, description, category, an ingredient or a tag,
    /// ignoring case
    Text(String),
}

impl RecipeFilter {
    /// Filters reachable through `/search/{kind}/{value}` links
    pub fn from_route(kind: &str, value: &str) -> Option<RecipeFilter> {
        let value = String::from(value);
        match kind {
            "tag" => Some(RecipeFilter::Tag(value)),
            "category" => Some(RecipeFilter::Category(value)),
            "difficulty" => Some(RecipeFilter::Difficulty(value)),
            "query" => Some(RecipeFilter::Text(value)),
            _ => None,
        }
    }

    /// Parse a `/search/{kind}/{value}` path, `value` being percent-encoded
    pub fn from_path(path: &str) -> Option<RecipeFilter> {
        let mut parts = path.trim_matches('/').split('/');
        match (parts.next(), parts.next(), parts.next(), parts.next()) {
            (Some("search"), Some(kind), Some(value), None) if !value.is_empty() => {
                let value = percent_decode_str(value).decode_utf8().ok()?;
                RecipeFilter::from_route(kind, &value)
            }
            _ => None,
        }
    }

    pub fn matches(&self, r: &RecipeSummary) -> bool {
        fn same(a: &str, b: &str) -> bool {
            a.to_lowercase() == b.to_lowercase()
        }
        match self {
            RecipeFilter::Tag(t) => r.tags.iter().any(|tag| same(tag, t)),
            RecipeFilter::Category(c) => r.category.as_deref().map_or(false, |rc| same(rc, c)),
            RecipeFilter::Difficulty(d) => {
                r.difficulty.as_deref().map_or(false, |rd| same(rd, d))
            }
            RecipeFilter::Text(s) => {
                let needle = s.trim().to_lowercase();
                needle.is_empty()
                    || r.title.to_lowercase().contains(&needle)
                    || r.description.to_lowercase().contains(&needle)
                    || r.category.as_deref().map_or(false, |c| c.to_lowercase().contains(&needle))
                    || r.ingredients.iter().any(|i| i.to_lowercase().contains(&needle))
                    || r.tags.iter().any(|t| t.to_lowercase().contains(&needle))
            }
        }
    }
}

/// A filter, optionally narrowed down to one category picked among the results
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RecipeSearch {
    pub filter: RecipeFilter,
    pub category: Option<String>,
}

impl RecipeSearch {
    pub fn new(filter: RecipeFilter) -> RecipeSearch {
        RecipeSearch {
            filter,
            category: None,
        }
    }

    /// Matching recipes, in the order they were given
    pub fn run<'a>(&self, recipes: &'a [RecipeSummary]) -> Vec<&'a RecipeSummary> {
        let mut res = filter_recipes(recipes, &self.filter);
        if let Some(c) = &self.category {
            res.retain(|r| r.category.as_ref() == Some(c));
        }
        res
    }
}

pub fn filter_recipes<'a>(
    recipes: &'a [RecipeSummary],
    filter: &RecipeFilter,
) -> Vec<&'a RecipeSummary> {
    recipes.iter().filter(|r| filter.matches(r)).collect()
}

/// Distinct non-empty categories, in order of first appearance
pub fn categories<'a, I>(recipes: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a RecipeSummary>,
{
    let mut res: Vec<String> = Vec::new();
    for c in recipes.into_iter().filter_map(|r| r.category.as_deref()) {
        if !c.is_empty() && !res.iter().any(|known| known == c) {
            res.push(String::from(c));
        }
    }
    res
}
