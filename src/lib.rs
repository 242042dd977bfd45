pub mod app;
pub mod config;
pub mod error;
pub mod platform;
pub mod content {
    pub mod client;
    pub mod hooks;
    pub mod queries;
    pub mod store;
}
pub mod models {
    pub mod contact;
    pub mod content;
    pub mod descriptor;
    pub mod listing;
    pub mod site;
}
pub mod rendering {
    pub mod html;
}
pub mod search {
    pub mod client;
    pub mod query;
    pub mod resource;
}
pub mod components {
    pub mod category_card;
    pub mod contact_form;
    pub mod post_card;
    pub mod posts_list;
    pub mod search_bar;
    pub mod site;
    pub mod toast;
}
pub mod api {
    pub mod contact;
    pub mod errors;
    pub mod posts;
    #[cfg(feature = "ssr")]
    pub mod search;
}

#[cfg(feature = "hydrate")]
#[wasm_bindgen::prelude::wasm_bindgen]
pub fn hydrate() {
    console_error_panic_hook::set_once();
    leptos::mount::hydrate_body(app::App);
}
