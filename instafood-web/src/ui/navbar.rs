use instafood_client::{media, RecipeFilter};
use yew::prelude::*;

use crate::ui::{self, AppContext};

#[derive(Clone, PartialEq, Properties)]
pub struct NavbarProps {
    pub on_login: Callback<()>,
    pub on_logout: Callback<()>,
    pub on_search: Callback<RecipeFilter>,
}

#[function_component(Navbar)]
pub fn navbar(p: &NavbarProps) -> Html {
    let session = use_context::<AppContext>().and_then(|c| c.session);
    let user_menu = match session {
        None => html! {
            <button type="button" class="btn btn-primary m-3" onclick={p.on_login.reform(|_| ())}>
                { "Login" }
            </button>
        },
        Some(info) => html! {
            <div class="dropdown">
                <button
                    type="button"
                    class="btn btn-light m-3 d-flex align-items-center"
                    title="Account"
                    data-bs-toggle="dropdown"
                >
                    <img
                        class="avatar rounded-circle me-2"
                        src={ media::avatar_url(crate::HOST, info.profile_image.as_deref()) }
                        alt=""
                    />
                    { &info.full_name }
                </button>
                <ul class="dropdown-menu dropdown-menu-end mt-3">
                    <li><a class="dropdown-item" href="#" onclick={p.on_logout.reform(|_| ())}>
                        <span class="bi-power me-2" aria-hidden="true"></span>
                        { "Logout" }
                    </a></li>
                </ul>
            </div>
        },
    };
    html! {
        <nav class="navbar sticky-top bg-white shadow-sm d-flex">
            <a class="navbar-brand ms-3" href="/" onclick={
                p.on_search.reform(|e: MouseEvent| {
                    e.prevent_default();
                    RecipeFilter::Text(String::new())
                })
            }>
                { "Instafood" }
            </a>
            <ui::SearchBar on_search={ p.on_search.reform(RecipeFilter::Text) } />
            { user_menu }
        </nav>
    }
}
