use wasm_bindgen::JsCast;
use yew::prelude::*;

#[derive(Clone, PartialEq, Properties)]
pub struct SearchBarProps {
    pub on_search: Callback<String>,
}

#[function_component(SearchBar)]
pub fn search_bar(p: &SearchBarProps) -> Html {
    let text = use_state(String::new);
    let oninput = {
        let text = text.clone();
        Callback::from(move |e: InputEvent| {
            let input = e
                .target()
                .and_then(|t| t.dyn_into::<web_sys::HtmlInputElement>().ok());
            if let Some(input) = input {
                text.set(input.value());
            }
        })
    };
    let onkeyup = {
        let text = text.clone();
        let on_search = p.on_search.clone();
        Callback::from(move |e: KeyboardEvent| {
            if e.key() == "Enter" {
                on_search.emit((*text).clone())
            }
        })
    };
    html! {
        <div class="flex-fill">
            <div class="search-bar m-3">
                <input
                    type="search"
                    class="w-100 h-100 px-3"
                    placeholder="Search recipes"
                    value={ (*text).clone() }
                    {oninput}
                    {onkeyup}
                />
            </div>
        </div>
    }
}
