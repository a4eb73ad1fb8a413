use instafood_client::{
    api::{Backend, LikeStatus, RecipeSummary},
    media::{self, MediaKind},
    CommentThread, Operation, RecipeFilter, RecipeLikes,
};
use yew::prelude::*;

use crate::ui::{self, AppContext};

#[derive(Clone, PartialEq, Properties)]
pub struct RecipeCardProps {
    pub recipe: RecipeSummary,
    pub on_search: Callback<RecipeFilter>,
}

#[function_component(RecipeCard)]
pub fn recipe_card(p: &RecipeCardProps) -> Html {
    let app = use_context::<AppContext>();
    let comments_open = use_state(|| false);
    let comment_count = use_state(|| None::<usize>);
    let likers = use_state(|| None::<Vec<String>>);

    // shared with in-flight requests, `redraw` makes changes visible
    let likes = use_mut_ref(|| RecipeLikes::new(&p.recipe));
    let redraw = use_state(|| 0_u64);

    {
        let comment_count = comment_count.clone();
        use_effect_with_deps(
            move |recipe| {
                let mut thread = CommentThread::new(recipe.clone());
                wasm_bindgen_futures::spawn_local(async move {
                    match thread.refresh(&crate::backend()).await {
                        Ok(()) => comment_count.set(Some(thread.top_level_count())),
                        Err(err) => tracing::warn!(%err, "failed counting comments"),
                    }
                });
                || ()
            },
            p.recipe.id.clone(),
        );
    }

    {
        let likes = likes.clone();
        let redraw = redraw.clone();
        let user = app
            .as_ref()
            .and_then(|a| a.session.as_ref())
            .map(|s| s.user_id.clone());
        use_effect_with_deps(
            move |(recipe, user)| {
                let (recipe, user) = (recipe.clone(), user.clone());
                wasm_bindgen_futures::spawn_local(async move {
                    let res = match &user {
                        Some(u) => crate::backend().recipe_liked(&recipe, u).await,
                        None => Ok(LikeStatus { liked: false }),
                    };
                    match res {
                        Ok(status) => {
                            likes.borrow_mut().set_liked(status);
                            redraw.set(*redraw + 1);
                        }
                        Err(err) => tracing::warn!(%err, "failed fetching like status"),
                    }
                });
                || ()
            },
            (p.recipe.id.clone(), user),
        );
    }

    let on_like = {
        let likes = likes.clone();
        let redraw = redraw.clone();
        let app = app.clone();
        Callback::from(move |_: MouseEvent| {
            let session = app.as_ref().and_then(|a| a.session.clone());
            let notify = app
                .as_ref()
                .map(|a| a.notify.clone())
                .unwrap_or_else(Callback::noop);
            let sent = likes.borrow_mut().begin_toggle(session.as_ref());
            let (token, like) = match sent {
                Ok(sent) => sent,
                Err(err) => {
                    if let Some(n) = Operation::LikeRecipe.failed_with(&err) {
                        notify.emit(n);
                    }
                    return;
                }
            };
            redraw.set(*redraw + 1);
            let likes = likes.clone();
            let redraw = redraw.clone();
            wasm_bindgen_futures::spawn_local(async move {
                let res = crate::backend().toggle_recipe_like(&token, &like).await;
                let res = likes.borrow_mut().finish_toggle(res);
                if let Err(err) = res {
                    tracing::warn!(%err, "failed toggling recipe like");
                    if let Some(n) = Operation::LikeRecipe.failed_with(&err) {
                        notify.emit(n);
                    }
                }
                redraw.set(*redraw + 1);
            });
        })
    };

    let show_likers = {
        let likers = likers.clone();
        let recipe = p.recipe.id.clone();
        Callback::from(move |_: MouseEvent| {
            let likers = likers.clone();
            let recipe = recipe.clone();
            wasm_bindgen_futures::spawn_local(async move {
                match crate::backend().recipe_likers(&recipe).await {
                    Ok(l) => likers.set(Some(l.users)),
                    Err(err) => tracing::warn!(%err, "failed fetching likers"),
                }
            });
        })
    };

    let cover = media::cover(crate::HOST, &p.recipe);
    let cover = match cover.kind {
        MediaKind::Image => html! {
            <img class="card-img-top" src={ cover.url } alt={ p.recipe.title.clone() } />
        },
        MediaKind::Video => html! {
            <video class="card-img-top" src={ cover.url } muted=true controls=true></video>
        },
    };

    let chip = |label: String, filter: RecipeFilter| {
        html! {
            <a
                href="#"
                class="badge rounded-pill text-bg-light me-1 text-decoration-none"
                onclick={ p.on_search.reform(move |e: MouseEvent| {
                    e.prevent_default();
                    filter.clone()
                }) }
            >
                { label }
            </a>
        }
    };

    let author = p.recipe.author.as_ref();
    let comment_section = match (*comments_open, app) {
        (true, Some(app)) => {
            let comments_open = comments_open.clone();
            let on_count = {
                let comment_count = comment_count.clone();
                Callback::from(move |n: usize| comment_count.set(Some(n)))
            };
            html! {
                <ui::CommentSection
                    recipe={ p.recipe.id.clone() }
                    session={ app.session }
                    notify={ app.notify }
                    { on_count }
                    on_close={ Callback::from(move |_: ()| comments_open.set(false)) }
                />
            }
        }
        _ => html! {},
    };
    let likers_dialog = match &*likers {
        Some(names) => {
            let likers = likers.clone();
            html! {
                <ui::LikersDialog
                    names={ names.clone() }
                    on_close={ Callback::from(move |_: ()| likers.set(None)) }
                />
            }
        }
        None => html! {},
    };
    let open_comments = {
        let comments_open = comments_open.clone();
        Callback::from(move |_: MouseEvent| comments_open.set(true))
    };
    let (like_count, liked, toggling) = {
        let l = likes.borrow();
        (l.count(), l.liked(), l.is_toggling())
    };

    html! {
        <div class="card h-100 recipe-card">
            { cover }
            <div class="card-body">
                <div class="d-flex align-items-center mb-2">
                    <img
                        class="avatar rounded-circle me-2"
                        src={ media::avatar_url(crate::HOST, author.and_then(|a| a.profile_image.as_deref())) }
                        alt=""
                    />
                    <span class="fw-semibold">
                        { author.map(|a| a.name.as_str()).filter(|n| !n.is_empty()).unwrap_or("User") }
                    </span>
                </div>
                <h5 class="card-title">{ &p.recipe.title }</h5>
                <p class="card-text text-muted">{ &p.recipe.description }</p>
                <div>
                    { for p.recipe.category.clone().map(|c| chip(c.clone(), RecipeFilter::Category(c))) }
                    { for p.recipe.difficulty.clone().map(|d| chip(d.clone(), RecipeFilter::Difficulty(d))) }
                    { for p.recipe.tags.iter().map(|t| chip(format!("#{t}"), RecipeFilter::Tag(t.clone()))) }
                </div>
            </div>
            <div class="card-footer d-flex align-items-center">
                <button
                    type="button"
                    class={ classes!("btn", "btn-light", "btn-sm", liked.then(|| "liked")) }
                    title="Like"
                    disabled={ toggling }
                    onclick={ on_like }
                >
                    <span
                        class={ if liked { "bi-heart-fill me-1" } else { "bi-heart me-1" } }
                        aria-hidden="true"
                    ></span>
                    { like_count }
                </button>
                <button
                    type="button"
                    class="btn btn-light btn-sm me-3"
                    title="People who liked this recipe"
                    onclick={ show_likers }
                >
                    <span class="bi-people" aria-hidden="true"></span>
                </button>
                <button
                    type="button"
                    class="btn btn-light btn-sm"
                    title="Comments"
                    onclick={ open_comments }
                >
                    <span class="bi-chat me-1" aria-hidden="true"></span>
                    { comment_count.map(|n| n.to_string()).unwrap_or_default() }
                </button>
            </div>
            { comment_section }
            { likers_dialog }
        </div>
    }
}
