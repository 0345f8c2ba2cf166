//! CNPJ Insight Frontend Entry Point

mod api;
mod app;
mod browser;
mod components;
mod config;
mod context;
mod debounce;
mod logging;
mod models;
mod storage;
mod store;

use app::App;
use leptos::prelude::*;
use tracing::info;

fn main() {
    console_error_panic_hook::set_once();
    let config = config::load();
    logging::init(&config.log_level);
    info!(api_base = %config.api_base, "starting CNPJ Insight");
    mount_to_body(move || view! { <App config=config.clone() /> });
}
