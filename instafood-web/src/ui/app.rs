use std::rc::Rc;

use instafood_client::{
    api::{Backend, Error, RecipeSummary},
    Notification, RecipeFilter, RecipeSearch, Session, SessionInfo, SubscriptionId,
};
use yew::prelude::*;

use crate::{storage::LocalStore, ui};

/// What every component may need to know about the application
#[derive(Clone, PartialEq)]
pub struct AppContext {
    pub session: Option<SessionInfo>,
    pub notify: Callback<Notification>,
}

pub enum AppMsg {
    SessionChanged(Option<SessionInfo>),
    Login(SessionInfo),
    Logout,
    ShowLogin(bool),

    Notify(Notification),
    HideNotification(u64),

    ReceivedRecipes(Result<Vec<RecipeSummary>, Error>),
    Search(RecipeFilter),
    Narrow(Option<String>),
}

pub struct App {
    session: Session,
    subscription: SubscriptionId,
    context: AppContext,
    showing_login: bool,
    notification: Option<(u64, Notification)>,
    next_notification: u64,
    recipes: Rc<Vec<RecipeSummary>>,
    recipes_loaded: bool,
    search: RecipeSearch,
}

fn initial_search() -> RecipeSearch {
    let filter = web_sys::window()
        .and_then(|w| w.location().pathname().ok())
        .and_then(|path| RecipeFilter::from_path(&path))
        .unwrap_or_else(|| RecipeFilter::Text(String::new()));
    RecipeSearch::new(filter)
}

impl Component for App {
    type Message = AppMsg;
    type Properties = ();

    fn create(ctx: &Context<Self>) -> Self {
        let mut session = Session::restore(Box::new(LocalStore));
        let subscription = {
            let on_change = ctx.link().callback(AppMsg::SessionChanged);
            session.subscribe(move |info| on_change.emit(info.cloned()))
        };

        let backend = crate::backend();
        ctx.link().send_future(async move {
            AppMsg::ReceivedRecipes(backend.list_recipes().await)
        });

        App {
            context: AppContext {
                session: session.info().cloned(),
                notify: ctx.link().callback(AppMsg::Notify),
            },
            session,
            subscription,
            showing_login: false,
            notification: None,
            next_notification: 0,
            recipes: Rc::new(Vec::new()),
            recipes_loaded: false,
            search: initial_search(),
        }
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        match msg {
            AppMsg::SessionChanged(info) => {
                self.context = AppContext {
                    session: info,
                    notify: self.context.notify.clone(),
                };
            }
            AppMsg::Login(info) => {
                self.session.login(info);
                self.showing_login = false;
            }
            AppMsg::Logout => self.session.logout(),
            AppMsg::ShowLogin(shown) => self.showing_login = shown,
            AppMsg::Notify(n) => {
                let id = self.next_notification;
                self.next_notification += 1;
                if let Some(delay) = n.auto_hide() {
                    ctx.link().send_future(async move {
                        if let Err(err) = wasm_timer::Delay::new(delay).await {
                            tracing::warn!(?err, "notification timer failed");
                        }
                        AppMsg::HideNotification(id)
                    });
                }
                self.notification = Some((id, n));
            }
            AppMsg::HideNotification(id) => {
                if !matches!(self.notification, Some((current, _)) if current == id) {
                    return false;
                }
                self.notification = None;
            }
            AppMsg::ReceivedRecipes(Ok(recipes)) => {
                tracing::debug!(recipes = recipes.len(), "received recipes");
                self.recipes = Rc::new(recipes);
                self.recipes_loaded = true;
            }
            AppMsg::ReceivedRecipes(Err(err)) => {
                tracing::error!(%err, "failed fetching recipes");
                self.recipes_loaded = true;
                ctx.link()
                    .send_message(AppMsg::Notify(Notification::error("Failed to load recipes")));
            }
            AppMsg::Search(filter) => {
                self.search = RecipeSearch::new(filter);
                self.showing_login = false;
            }
            AppMsg::Narrow(category) => self.search.category = category,
        }
        true
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        let main = match self.showing_login {
            true => html! {
                <ui::Login
                    on_login={ ctx.link().callback(AppMsg::Login) }
                    on_cancel={ ctx.link().callback(|_| AppMsg::ShowLogin(false)) }
                />
            },
            false => html! {
                <ui::RecipeFeed
                    recipes={ self.recipes.clone() }
                    search={ self.search.clone() }
                    loaded={ self.recipes_loaded }
                    on_search={ ctx.link().callback(AppMsg::Search) }
                    on_narrow={ ctx.link().callback(AppMsg::Narrow) }
                />
            },
        };
        let (notification, on_dismiss) = match &self.notification {
            Some((id, n)) => {
                let id = *id;
                (
                    Some(n.clone()),
                    ctx.link().callback(move |_| AppMsg::HideNotification(id)),
                )
            }
            None => (None, Callback::noop()),
        };
        html! {
            <ContextProvider<AppContext> context={ self.context.clone() }>
                <ui::Navbar
                    on_login={ ctx.link().callback(|_| AppMsg::ShowLogin(true)) }
                    on_logout={ ctx.link().callback(|_| AppMsg::Logout) }
                    on_search={ ctx.link().callback(AppMsg::Search) }
                />
                <main class="container py-4">
                    { main }
                </main>
                <ui::Snackbar { notification } { on_dismiss } />
            </ContextProvider<AppContext>>
        }
    }

    fn destroy(&mut self, _ctx: &Context<Self>) {
        self.session.unsubscribe(self.subscription);
    }
}
