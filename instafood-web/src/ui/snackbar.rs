use instafood_client::{Notification, Severity};
use yew::prelude::*;

#[derive(Clone, PartialEq, Properties)]
pub struct SnackbarProps {
    pub notification: Option<Notification>,
    pub on_dismiss: Callback<()>,
}

/// Bottom-of-screen message; the parent decides when it goes away
#[function_component(Snackbar)]
pub fn snackbar(p: &SnackbarProps) -> Html {
    let n = match &p.notification {
        Some(n) => n,
        None => return html! {},
    };
    let class = match n.severity {
        Severity::Success => "alert-success",
        Severity::Info => "alert-info",
        Severity::Error => "alert-danger",
    };
    html! {
        <div
            class={ classes!("snackbar", "alert", class, "d-flex", "align-items-center", "shadow") }
            role="alert"
        >
            <div class="flex-fill">{ &n.message }</div>
            <button
                type="button"
                class="btn-close ms-3"
                aria-label="Close"
                onclick={ p.on_dismiss.reform(|_| ()) }
            ></button>
        </div>
    }
}
