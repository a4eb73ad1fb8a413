use std::rc::Rc;

use instafood_client::{
    api::RecipeSummary, categories, filter_recipes, RecipeFilter, RecipeSearch,
};
use yew::prelude::*;

use crate::ui;

#[derive(Clone, PartialEq, Properties)]
pub struct RecipeFeedProps {
    pub recipes: Rc<Vec<RecipeSummary>>,
    pub search: RecipeSearch,
    pub loaded: bool,
    pub on_search: Callback<RecipeFilter>,
    pub on_narrow: Callback<Option<String>>,
}

fn title(filter: &RecipeFilter) -> Option<String> {
    match filter {
        RecipeFilter::Text(t) if t.trim().is_empty() => None,
        RecipeFilter::Text(t) => Some(format!("Results for \"{}\"", t.trim())),
        RecipeFilter::Tag(t) => Some(format!("Tagged #{t}")),
        RecipeFilter::Category(c) => Some(format!("Category: {c}")),
        RecipeFilter::Difficulty(d) => Some(format!("Difficulty: {d}")),
    }
}

#[function_component(RecipeFeed)]
pub fn recipe_feed(p: &RecipeFeedProps) -> Html {
    if !p.loaded {
        return html! {
            <div class="d-flex justify-content-center my-5">
                <div class="spinner-border" role="status"></div>
            </div>
        };
    }

    let facets = categories(filter_recipes(&p.recipes, &p.search.filter));
    let found = p.search.run(&p.recipes);
    let facet_button = |label: &str, category: Option<String>| {
        let active = p.search.category == category;
        html! {
            <button
                type="button"
                class={ classes!("btn", "btn-sm", "me-2", "mb-2",
                    if active { "btn-primary" } else { "btn-outline-primary" }) }
                onclick={ p.on_narrow.reform(move |_| category.clone()) }
            >
                { label }
            </button>
        }
    };

    html! {
        <>
            { for title(&p.search.filter).map(|t| html! { <h2 class="mb-3">{ t }</h2> }) }
            if facets.len() > 1 {
                <div class="facets mb-3">
                    { facet_button("All", None) }
                    { for facets.iter().map(|c| facet_button(c, Some(c.clone()))) }
                </div>
            }
            if found.is_empty() {
                <p class="text-center text-muted my-5">{ "No recipes found" }</p>
            }
            <div class="row row-cols-1 row-cols-md-2 row-cols-lg-3 g-4">
                { for found.into_iter().map(|r| html! {
                    <div class="col" key={ r.id.0.clone() }>
                        <ui::RecipeCard recipe={ r.clone() } on_search={ p.on_search.clone() } />
                    </div>
                }) }
            </div>
        </>
    }
}
