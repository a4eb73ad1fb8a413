use yew::prelude::*;

#[derive(Clone, PartialEq, Properties)]
pub struct ConfirmDialogProps {
    pub title: AttrValue,
    pub message: AttrValue,
    pub on_answer: Callback<bool>,
}

#[function_component(ConfirmDialog)]
pub fn confirm_dialog(p: &ConfirmDialogProps) -> Html {
    html! {
        <div class="modal d-block confirm-dialog" tabindex="-1" role="dialog">
            <div class="modal-dialog modal-sm modal-dialog-centered">
                <div class="modal-content">
                    <div class="modal-header">
                        <h5 class="modal-title">{ &p.title }</h5>
                    </div>
                    <div class="modal-body">{ &p.message }</div>
                    <div class="modal-footer">
                        <button
                            type="button"
                            class="btn btn-light"
                            onclick={ p.on_answer.reform(|_| false) }
                        >
                            { "Cancel" }
                        </button>
                        <button
                            type="button"
                            class="btn btn-danger"
                            onclick={ p.on_answer.reform(|_| true) }
                        >
                            { "Confirm" }
                        </button>
                    </div>
                </div>
            </div>
        </div>
    }
}
