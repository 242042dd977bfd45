use leptos::prelude::*;
use leptos_meta::{provide_meta_context, MetaTags, Stylesheet, Title};
use leptos_router::components::*;
use leptos_router::hooks::{use_location, use_params_map, use_query_map};
use leptos_router::path;

use crate::components::category_card::TaxonomyGrid;
use crate::components::contact_form::ContactFormView;
use crate::components::post_card::PostCardView;
use crate::components::posts_list::PostsList;
use crate::components::search_bar::SearchResults;
use crate::components::site::{SiteFooter, SiteHeader};
use crate::components::toast::{provide_toasts, ToastHost};
use crate::content::hooks::{provide_content_store, use_content_context, use_posts};
use crate::content::store::{EntryState, PostsSlot};
use crate::models::content::{ContentItem, Post};
use crate::models::listing::{ListContext, PostCard};

/// Shared server state, provided to handlers and server functions.
#[cfg(feature = "ssr")]
#[derive(Clone)]
pub struct AppState {
    pub content_client: std::sync::Arc<dyn crate::content::client::ContentClient>,
    pub search_client: std::sync::Arc<dyn crate::search::client::SearchClient>,
    pub contact_relay: Option<std::sync::Arc<dyn crate::api::contact::ContactRelay>>,
    pub leptos_options: LeptosOptions,
}

#[cfg(feature = "ssr")]
impl axum::extract::FromRef<AppState> for LeptosOptions {
    fn from_ref(state: &AppState) -> Self {
        state.leptos_options.clone()
    }
}

#[cfg(feature = "ssr")]
impl AppState {
    /// Build the HTTP clients described by `config`.
    pub fn from_config(
        config: &crate::config::SiteConfig,
        leptos_options: LeptosOptions,
    ) -> Result<Self, crate::error::AppError> {
        use crate::api::contact::{ContactRelay, WebhookContactRelay};
        use crate::content::client::GraphqlContentClient;
        use crate::search::client::CrafterSearchClient;
        use std::sync::Arc;

        let timeout = config.request_timeout();
        let content_client = Arc::new(GraphqlContentClient::new(
            &config.content_api_url,
            &config.site_name,
            timeout,
        )?);
        let search_client = Arc::new(CrafterSearchClient::new(
            &config.search_url,
            &config.site_name,
            timeout,
        )?);
        let contact_relay = match config.contact_webhook_url.as_deref() {
            Some(url) => Some(Arc::new(WebhookContactRelay::new(url, timeout)?) as Arc<dyn ContactRelay>),
            None => {
                tracing::info!("no contact webhook configured, contact form disabled");
                None
            }
        };

        Ok(Self {
            content_client,
            search_client,
            contact_relay,
            leptos_options,
        })
    }
}

/// JSON endpoints served next to the Leptos routes.
#[cfg(feature = "ssr")]
pub fn api_routes() -> axum::Router<AppState> {
    use axum::routing::{get, post};

    axum::Router::new()
        .route("/api/posts.json", get(crate::api::posts::posts_handler))
        .route("/api/contactus.json", post(crate::api::contact::contact_handler))
        .route("/api/search.json", get(crate::api::search::search_handler))
}

/// The full application router: API endpoints, server functions and pages.
#[cfg(feature = "ssr")]
pub fn router(state: AppState) -> axum::Router {
    use leptos_axum::{generate_route_list, LeptosRoutes};

    let routes = generate_route_list(App);
    let options = state.leptos_options.clone();
    let site_root = options.site_root.to_string();

    api_routes()
        .leptos_routes_with_context(
            &state,
            routes,
            {
                let state = state.clone();
                move || provide_context(state.clone())
            },
            move || shell(options.clone()),
        )
        .fallback_service(tower_http::services::ServeDir::new(site_root))
        .with_state(state)
}

pub fn shell(options: LeptosOptions) -> impl IntoView {
    view! {
        <!DOCTYPE html>
        <html lang="en">
            <head>
                <meta charset="utf-8"/>
                <meta name="viewport" content="width=device-width, initial-scale=1"/>
                <AutoReload options=options.clone()/>
                <HydrationScripts options/>
                <MetaTags/>
            </head>
            <body>
                <App/>
            </body>
        </html>
    }
}

#[component]
pub fn App() -> impl IntoView {
    provide_meta_context();
    provide_content_store();
    provide_toasts();

    view! {
        <Stylesheet id="leptos" href="/pkg/editorial.css"/>
        <Title text="Editorial"/>

        <Router>
            <SiteHeader/>
            <main>
                <Routes fallback=|| view! { "Page not found." }.into_view()>
                    <Route path=path!("/") view=HomePage/>
                    <Route path=path!("/search") view=SearchPage/>
                    <Route path=path!("/categories") view=|| view! { <TaxonomyGrid/> }/>
                    <Route path=path!("/tags") view=|| view! { <TaxonomyGrid tags=true/> }/>
                    <Route path=path!("/category") view=ListPage/>
                    <Route path=path!("/category/:id") view=ListPage/>
                    <Route path=path!("/tag") view=ListPage/>
                    <Route path=path!("/tag/:id") view=ListPage/>
                    <Route path=path!("/contact") view=ContactPage/>
                    <Route path=path!("/articles/*rest") view=PostPage/>
                </Routes>
            </main>
            <SiteFooter/>
            <ToastHost/>
        </Router>
    }
}

#[component]
fn HomePage() -> impl IntoView {
    let posts = use_posts();
    let ctx = use_content_context();

    view! {
        <section class="latest-posts">
            {move || match posts.get() {
                EntryState::Ready(posts) => posts
                    .iter()
                    .map(|post| view! { <PostCardView card=PostCard::from(post)/> })
                    .collect_view()
                    .into_any(),
                EntryState::Failed(e) => {
                    let ctx = ctx.clone();
                    view! {
                        <p class="error">{e.to_string()}</p>
                        <button class="retry" on:click=move |_| { ctx.retry::<PostsSlot>() }>"Retry"</button>
                    }
                    .into_any()
                }
                _ => view! { <p class="loading">"Loading..."</p> }.into_any(),
            }}
        </section>
        <TaxonomyGrid/>
    }
}

#[component]
fn SearchPage() -> impl IntoView {
    view! {
        <h1>"Search"</h1>
        <SearchResults/>
    }
}

/// Section a list route belongs to (`/tag` or `/category`).
pub fn list_section(pathname: &str) -> &'static str {
    if pathname == "/tag" || pathname.starts_with("/tag/") {
        "/tag"
    } else {
        "/category"
    }
}

#[component]
fn ListPage() -> impl IntoView {
    let params = use_params_map();
    let query = use_query_map();
    let location = use_location();

    let context = Memo::new(move |_| ListContext {
        pathname: list_section(&location.pathname.get()).to_string(),
        id: params.read().get("id").or_else(|| query.read().get("id")),
        ..ListContext::default()
    });

    view! {
        <h1>{move || context.with(|c| c.id.clone().unwrap_or_default())}</h1>
        <PostsList context=context/>
    }
}

#[component]
fn ContactPage() -> impl IntoView {
    view! {
        <h1>"Contact Us"</h1>
        <ContactFormView/>
    }
}

fn render_component(item: &ContentItem) -> AnyView {
    match item {
        ContentItem::RichText(text) => view! { <div class="rich-text" inner_html=text.html.clone()></div> }.into_any(),
        ContentItem::Image(image) => view! { <img src=image.src.clone() alt=image.alt.clone()/> }.into_any(),
        ContentItem::ResponsiveColumns(columns) => view! {
            <div class="columns">
                {columns.columns.iter().map(|column| view! {
                    <div class=format!("column {}", column.size)>
                        {column.content.iter().map(|c| render_component(&c.component)).collect_view()}
                    </div>
                }).collect_view()}
            </div>
        }
        .into_any(),
        _ => ().into_any(),
    }
}

fn post_view(post: &Post) -> AnyView {
    let related = ListContext {
        pathname: "/category".into(),
        categories: Some(post.categories.iter().map(|c| c.key.clone()).collect()),
        exclude: Some(post.meta.id.clone()),
        ..ListContext::default()
    };

    view! {
        <Title text=post.title().to_string()/>
        <article class="post">
            <h1>{post.headline.clone()}</h1>
            {post.main_image.clone().map(|src| view! { <img class="main-image" src=src/> })}
            {post.content.iter().map(|c| render_component(&c.component)).collect_view()}
            {post.author_bios.iter().map(|bio| view! {
                <aside class="author-bio">
                    <h3>{bio.name.clone()}</h3>
                    <p>{bio.bio.clone()}</p>
                </aside>
            }).collect_view()}
        </article>
        <section class="related">
            <h2>"Related posts"</h2>
            <PostsList context=Signal::derive(move || related.clone()) items_per_page=3/>
        </section>
    }
    .into_any()
}

#[component]
fn PostPage() -> impl IntoView {
    let posts = use_posts();
    let location = use_location();

    view! {
        {move || {
            let path = location.pathname.get();
            match posts.get() {
                EntryState::Ready(posts) => match posts.iter().find(|p| p.url == path) {
                    Some(post) => post_view(post),
                    None => view! { <p>"Post not found."</p> }.into_any(),
                },
                EntryState::Failed(e) => view! { <p class="error">{e.to_string()}</p> }.into_any(),
                _ => view! { <p class="loading">"Loading..."</p> }.into_any(),
            }
        }}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_section() {
        assert_eq!(list_section("/tag"), "/tag");
        assert_eq!(list_section("/tag/spring"), "/tag");
        assert_eq!(list_section("/category/travel"), "/category");
        assert_eq!(list_section("/category"), "/category");
    }
}
