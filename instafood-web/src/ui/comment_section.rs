use instafood_client::{
    api::{Backend, Comment, CommentId, Error, LikeStatus, RecipeId, Time, UserId},
    media, CommentNode, CommentThread, FetchTicket, Notification, Operation, SessionInfo,
    ThreadError,
};
use yew::{html::Scope, prelude::*};

use crate::ui;

#[derive(Clone, PartialEq, Properties)]
pub struct CommentSectionProps {
    pub recipe: RecipeId,
    pub session: Option<SessionInfo>,
    pub notify: Callback<Notification>,

    /// Called with the number of top-level comments after each fetch
    pub on_count: Callback<usize>,
    pub on_close: Callback<()>,
}

pub enum CommentSectionMsg {
    Fetched(FetchTicket, Result<Vec<Comment>, Error>),

    DraftChanged(String),
    ReplyTo(Option<CommentId>),
    Post,
    Posted(Result<Comment, Error>),

    AskDelete(CommentId),
    DeleteAnswered(bool),
    Deleted(Result<(), Error>),

    Like(CommentId),
    Liked(Result<LikeStatus, Error>),
}

/// Comment thread of one recipe, shown as a dialog
///
/// Every successful mutation is followed by a full refetch, and a new mutation
/// is only sent once the previous one was answered. Responses that arrive once
/// the dialog is closed are dropped along with the component.
pub struct CommentSection {
    thread: CommentThread,
    confirming: Option<CommentId>,
}

impl CommentSection {
    fn fetch(&mut self, ctx: &Context<Self>) {
        let ticket = self.thread.begin_fetch();
        let recipe = self.thread.recipe().clone();
        ctx.link().send_future(async move {
            let res = crate::backend().list_comments(&recipe).await;
            CommentSectionMsg::Fetched(ticket, res)
        });
    }

    fn token(ctx: &Context<Self>) -> Result<instafood_client::api::AuthToken, ThreadError> {
        CommentThread::require_token(ctx.props().session.as_ref().map(|s| &s.token))
    }

    fn failed(ctx: &Context<Self>, op: Operation, err: ThreadError) {
        tracing::warn!(?op, %err, "comment operation failed");
        if let Some(n) = op.failed_with(&err) {
            ctx.props().notify.emit(n);
        }
    }
}

impl Component for CommentSection {
    type Message = CommentSectionMsg;
    type Properties = CommentSectionProps;

    fn create(ctx: &Context<Self>) -> Self {
        let mut this = Self {
            thread: CommentThread::new(ctx.props().recipe.clone()),
            confirming: None,
        };
        this.fetch(ctx);
        this
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        match msg {
            CommentSectionMsg::Fetched(ticket, res) => match self.thread.finish_fetch(ticket, res) {
                Ok(true) => ctx.props().on_count.emit(self.thread.top_level_count()),
                Ok(false) => return false,
                Err(err) => {
                    Self::failed(ctx, Operation::Load, err);
                    return false;
                }
            },
            CommentSectionMsg::DraftChanged(text) => self.thread.set_draft(text),
            CommentSectionMsg::ReplyTo(id) => self.thread.reply_to(id),
            CommentSectionMsg::Post => {
                let token = ctx.props().session.as_ref().map(|s| &s.token);
                let prepared = self
                    .thread
                    .prepare_post(token)
                    .and_then(|p| self.thread.begin_mutation().map(|()| p));
                match prepared {
                    Err(err) => {
                        Self::failed(ctx, Operation::Add, err);
                        return false;
                    }
                    Ok((token, comment)) => {
                        let recipe = self.thread.recipe().clone();
                        ctx.link().send_future(async move {
                            let res = crate::backend()
                                .create_comment(&token, &recipe, &comment)
                                .await;
                            CommentSectionMsg::Posted(res)
                        });
                    }
                }
            }
            CommentSectionMsg::Posted(res) => {
                self.thread.end_mutation();
                match res {
                    Ok(_) => {
                        self.thread.post_succeeded();
                        self.fetch(ctx);
                    }
                    Err(err) => Self::failed(ctx, Operation::Add, err.into()),
                }
            }
            CommentSectionMsg::AskDelete(id) => {
                if let Err(err) = Self::token(ctx) {
                    Self::failed(ctx, Operation::Delete, err);
                    return false;
                }
                self.confirming = Some(id);
            }
            CommentSectionMsg::DeleteAnswered(confirmed) => {
                let id = match self.confirming.take() {
                    Some(id) => id,
                    None => return false,
                };
                if confirmed {
                    let token = Self::token(ctx)
                        .and_then(|t| self.thread.begin_mutation().map(|()| t));
                    match token {
                        Err(err) => Self::failed(ctx, Operation::Delete, err),
                        Ok(token) => ctx.link().send_future(async move {
                            let res = crate::backend().delete_comment(&token, &id).await;
                            CommentSectionMsg::Deleted(res)
                        }),
                    }
                }
            }
            CommentSectionMsg::Deleted(res) => {
                self.thread.end_mutation();
                match res {
                    Ok(()) => {
                        if let Some(n) = Operation::Delete.succeeded() {
                            ctx.props().notify.emit(n);
                        }
                        self.fetch(ctx);
                    }
                    Err(err) => Self::failed(ctx, Operation::Delete, err.into()),
                }
            }
            CommentSectionMsg::Like(id) => {
                let token =
                    Self::token(ctx).and_then(|t| self.thread.begin_mutation().map(|()| t));
                match token {
                    Err(err) => {
                        Self::failed(ctx, Operation::Like, err);
                        return false;
                    }
                    Ok(token) => ctx.link().send_future(async move {
                        let res = crate::backend().toggle_like(&token, &id).await;
                        CommentSectionMsg::Liked(res)
                    }),
                }
            }
            CommentSectionMsg::Liked(res) => {
                self.thread.end_mutation();
                match res {
                    Ok(status) => {
                        tracing::debug!(liked = status.liked, "like toggled");
                        self.fetch(ctx);
                    }
                    Err(err) => Self::failed(ctx, Operation::Like, err.into()),
                }
            }
        }
        true
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        let link = ctx.link();
        let user = ctx.props().session.as_ref().map(|s| &s.user_id);
        let forest = self.thread.forest();
        let list = match (forest.is_empty(), self.thread.is_loaded()) {
            (true, true) => html! {
                <p class="text-center fst-italic text-muted mt-4">
                    { "No comments yet. Be the first to comment!" }
                </p>
            },
            (true, false) => html! {
                <div class="d-flex justify-content-center my-4">
                    <div class="spinner-border spinner-border-sm" role="status"></div>
                </div>
            },
            (false, _) => html! {
                <div class="mt-3">
                    { for forest.iter().map(|node| view_comment(link, node, user)) }
                </div>
            },
        };
        let replying = self.thread.replying_to().is_some();
        let confirm = self.confirming.as_ref().map(|_| html! {
            <ui::ConfirmDialog
                title="Delete Comment"
                message="Are you sure you want to delete this comment?"
                on_answer={ link.callback(CommentSectionMsg::DeleteAnswered) }
            />
        });

        html! {
            <div class="modal d-block comment-section" tabindex="-1" role="dialog">
                <div class="modal-dialog modal-dialog-scrollable">
                    <div class="modal-content p-2">
                        <div class="modal-header">
                            <h5 class="modal-title">{ "Comments" }</h5>
                            <button
                                type="button"
                                class="btn-close"
                                aria-label="Close"
                                onclick={ ctx.props().on_close.reform(|_| ()) }
                            ></button>
                        </div>
                        <div class="modal-body">
                            { list }
                            <div class="d-flex flex-column gap-2 mt-3">
                                if replying {
                                    <div class="small text-muted">
                                        { "Replying to a comment " }
                                        <a href="#" onclick={ link.callback(|e: MouseEvent| {
                                            e.prevent_default();
                                            CommentSectionMsg::ReplyTo(None)
                                        }) }>{ "(cancel)" }</a>
                                    </div>
                                }
                                <textarea
                                    class="form-control"
                                    rows="3"
                                    required=true
                                    placeholder={ if replying { "Reply to comment…" } else { "Add a comment…" } }
                                    value={ self.thread.draft().to_string() }
                                    oninput={ link.callback(|e: InputEvent| {
                                        let input: web_sys::HtmlTextAreaElement = e.target_unchecked_into();
                                        CommentSectionMsg::DraftChanged(input.value())
                                    }) }
                                />
                                <button
                                    type="button"
                                    class="btn btn-primary align-self-end rounded-pill"
                                    disabled={ self.thread.is_busy() }
                                    onclick={ link.callback(|_| CommentSectionMsg::Post) }
                                >
                                    { "Post" }
                                </button>
                            </div>
                        </div>
                    </div>
                </div>
                { for confirm }
            </div>
        }
    }
}

fn ago(t: Time) -> String {
    let d = chrono::Utc::now() - t;
    if d.num_days() > 0 {
        format!("{}d", d.num_days())
    } else if d.num_hours() > 0 {
        format!("{}h", d.num_hours())
    } else if d.num_minutes() > 0 {
        format!("{}m", d.num_minutes())
    } else {
        String::from("now")
    }
}

fn view_comment(
    link: &Scope<CommentSection>,
    node: &CommentNode,
    user: Option<&UserId>,
) -> Html {
    let author = node.author.as_ref();
    let name = author
        .map(|a| a.name.as_str())
        .filter(|n| !n.is_empty())
        .unwrap_or("User");
    let liked = user.map_or(false, |u| node.is_liked_by(u));
    let owned = user.map_or(false, |u| node.is_authored_by(u));
    let id = node.id.clone();

    html! {
        <div class="comment card p-2 mb-2" key={ node.id.0.clone() }>
            <div class="d-flex align-items-center gap-2">
                <img
                    class="avatar rounded-circle"
                    src={ media::avatar_url(crate::HOST, author.and_then(|a| a.profile_image.as_deref())) }
                    alt=""
                />
                <strong class="small">{ format!("{name}:") }</strong>
                <span class="small text-muted ms-auto">{ ago(node.created_at) }</span>
            </div>
            <div class="small my-1">{ &node.text }</div>
            <div class="d-flex align-items-center gap-2">
                <button
                    type="button"
                    class={ classes!("btn", "btn-sm", "bi-btn", "bi-heart-fill", liked.then(|| "liked")) }
                    title="Like"
                    onclick={ { let id = id.clone(); link.callback(move |_| CommentSectionMsg::Like(id.clone())) } }
                >
                    <span class="ms-1">{ node.likes.len() }</span>
                </button>
                <button
                    type="button"
                    class="btn btn-sm bi-btn bi-reply"
                    title="Reply"
                    onclick={ { let id = id.clone(); link.callback(move |_| CommentSectionMsg::ReplyTo(Some(id.clone()))) } }
                >
                </button>
                if owned {
                    <button
                        type="button"
                        class="btn btn-sm bi-btn bi-trash"
                        title="Delete"
                        onclick={ link.callback(move |_| CommentSectionMsg::AskDelete(id.clone())) }
                    >
                    </button>
                }
            </div>
            if !node.replies.is_empty() {
                <div class="comment-replies ms-4 mt-2">
                    { for node.replies.iter().map(|r| view_comment(link, r, user)) }
                </div>
            }
        </div>
    }
}
