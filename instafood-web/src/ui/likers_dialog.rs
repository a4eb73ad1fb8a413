use yew::prelude::*;

#[derive(Clone, PartialEq, Properties)]
pub struct LikersDialogProps {
    pub names: Vec<String>,
    pub on_close: Callback<()>,
}

#[function_component(LikersDialog)]
pub fn likers_dialog(p: &LikersDialogProps) -> Html {
    html! {
        <div class="modal d-block likers-dialog" tabindex="-1" role="dialog">
            <div class="modal-dialog modal-sm modal-dialog-centered">
                <div class="modal-content">
                    <div class="modal-header">
                        <h5 class="modal-title">{ "People who liked this recipe" }</h5>
                    </div>
                    <div class="modal-body">
                        if p.names.is_empty() {
                            <p class="mb-0">{ "No likes yet." }</p>
                        } else {
                            <ul class="list-group list-group-flush">
                                { for p.names.iter().map(|n| html! {
                                    <li class="list-group-item">{ n }</li>
                                }) }
                            </ul>
                        }
                    </div>
                    <div class="modal-footer">
                        <button
                            type="button"
                            class="btn btn-light"
                            onclick={ p.on_close.reform(|_| ()) }
                        >
                            { "Close" }
                        </button>
                    </div>
                </div>
            </div>
        </div>
    }
}
