use instafood_client::{
    api::{Backend, Credentials, Error, LoginResponse},
    SessionInfo,
};
use yew::prelude::*;

#[derive(Clone, PartialEq, Properties)]
pub struct LoginProps {
    pub on_login: Callback<SessionInfo>,
    pub on_cancel: Callback<()>,
}

pub struct Login {
    email: String,
    password: String,
    error: Option<String>,
    submitting: bool,
}

pub enum LoginMsg {
    EmailChanged(String),
    PasswordChanged(String),
    Submit,
    Done(Result<LoginResponse, Error>),
}

impl Component for Login {
    type Message = LoginMsg;
    type Properties = LoginProps;

    fn create(_ctx: &Context<Self>) -> Self {
        Self {
            email: String::new(),
            password: String::new(),
            error: None,
            submitting: false,
        }
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        match msg {
            LoginMsg::EmailChanged(e) => self.email = e,
            LoginMsg::PasswordChanged(p) => self.password = p,
            LoginMsg::Submit => {
                if self.submitting {
                    return false;
                }
                self.submitting = true;
                self.error = None;
                let creds = Credentials {
                    email: self.email.trim().to_string(),
                    password: self.password.clone(),
                };
                ctx.link().send_future(async move {
                    LoginMsg::Done(crate::backend().login(&creds).await)
                });
            }
            LoginMsg::Done(Ok(resp)) => {
                self.submitting = false;
                self.password.clear();
                ctx.props().on_login.emit(SessionInfo::from(resp));
            }
            LoginMsg::Done(Err(err)) => {
                tracing::info!(%err, "login failed");
                self.submitting = false;
                self.error = Some(match &err {
                    Error::Network(_) => String::from("Could not reach the server"),
                    Error::AuthRequired => String::from("Invalid email or password"),
                    e => e.server_message().unwrap_or("Login failed").to_string(),
                });
            }
        }
        true
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        macro_rules! callback_for {
            ($msg:ident) => {
                ctx.link().callback(|e: web_sys::Event| {
                    let input: web_sys::HtmlInputElement = e.target_unchecked_into();
                    LoginMsg::$msg(input.value())
                })
            };
        }
        let onsubmit = ctx.link().callback(|e: SubmitEvent| {
            e.prevent_default();
            LoginMsg::Submit
        });
        html! {<>
            <div class="text-center my-4">
                <h1>{ "Login" }</h1>
            </div>
            <form class="login-form" {onsubmit}>
                { for self.error.as_ref().map(|e| html! {
                    <div class="alert alert-danger" role="alert">{ e }</div>
                }) }
                <div class="input-group mb-3">
                    <label class="input-group-text col-xl-1" for="email">{ "Email" }</label>
                    <input
                        type="email"
                        class="form-control form-control-lg"
                        id="email"
                        required=true
                        value={self.email.clone()}
                        onchange={callback_for!(EmailChanged)}
                    />
                </div>
                <div class="input-group mb-3">
                    <label class="input-group-text col-xl-1" for="password">{ "Password" }</label>
                    <input
                        type="password"
                        class="form-control form-control-lg"
                        id="password"
                        required=true
                        value={self.password.clone()}
                        onchange={callback_for!(PasswordChanged)}
                    />
                </div>
                <button type="submit" class="btn btn-primary me-2" disabled={self.submitting}>
                    { "Log in" }
                </button>
                <button
                    type="button"
                    class="btn btn-light"
                    onclick={ctx.props().on_cancel.reform(|_| ())}
                >
                    { "Cancel" }
                </button>
            </form>
        </>}
    }
}
