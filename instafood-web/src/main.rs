use instafood_client::HttpBackend;

mod storage;
mod ui;

/// API server, set at build time through `INSTAFOOD_API_HOST`
pub const HOST: &str = match option_env!("INSTAFOOD_API_HOST") {
    Some(host) => host,
    None => "http://localhost:5000",
};

lazy_static::lazy_static! {
    static ref CLIENT: reqwest::Client = reqwest::Client::new();
}

pub fn backend() -> HttpBackend {
    HttpBackend::new(CLIENT.clone(), HOST)
}

fn main() {
    tracing_wasm::set_as_global_default();
    tracing::info!(host = HOST, "starting instafood");
    yew::Renderer::<ui::App>::new().render();
}
