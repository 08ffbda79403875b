//! Web routes.

use std::sync::Arc;

use axum::{
    Form, Router,
    extract::{Path, Query, State},
    response::{Html, IntoResponse, Json, Redirect},
    routing::{get, post},
};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use serde_json::json;
use tower_http::services::ServeDir;
use tracing::{debug, info};

use til_store::{Categories, CategoryFilter, Fact, FactStore, VoteField};

use crate::WebError;
use crate::session::Sessions;
use crate::state::{Feed, LOAD_ERROR_MESSAGE, LoadStatus, SubmitOutcome};

/// Placeholder shown when the current filter matches nothing.
pub const EMPTY_LIST_MESSAGE: &str = "No facts in selected category. Add new facts!";

/// Shared state for the web server. Page state lives in the visitor's session.
pub struct AppState {
    pub sessions: Sessions,
    pub categories: Arc<Categories>,
}

/// Create the web router.
pub fn create_router(
    store: Arc<dyn FactStore>,
    categories: Arc<Categories>,
    static_dir: Option<&str>,
) -> Router {
    let state = Arc::new(AppState {
        sessions: Sessions::new(store),
        categories,
    });

    let mut router = Router::new()
        .route("/", get(index))
        .route("/form/toggle", post(toggle_form))
        .route("/facts", post(create_fact))
        .route("/facts/{id}/vote/{field}", post(vote))
        .route("/health", get(health))
        .with_state(state);

    // Serve static files if directory provided
    if let Some(dir) = static_dir {
        router = router.nest_service("/static", ServeDir::new(dir));
    }

    router
}

#[derive(Deserialize)]
struct IndexQuery {
    category: Option<String>,
}

async fn index(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Query(query): Query<IndexQuery>,
) -> Result<impl IntoResponse, WebError> {
    let filter = query
        .category
        .map(|category| category.parse::<CategoryFilter>())
        .transpose()?;

    let (jar, feed) = state.sessions.resolve(jar);
    match filter {
        Some(filter) => {
            feed.select_category(filter).await;
        }
        None => feed.ensure_loaded().await,
    }

    let alert = feed.take_alert().await;
    let snapshot = feed.snapshot().await;
    Ok((
        jar,
        Html(render_page(&snapshot, &state.categories, alert.as_deref())),
    ))
}

async fn toggle_form(State(state): State<Arc<AppState>>, jar: CookieJar) -> impl IntoResponse {
    let (jar, feed) = state.sessions.resolve(jar);
    feed.toggle_form().await;
    (jar, Redirect::to("/"))
}

async fn create_fact(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Form(form): Form<FactSubmission>,
) -> impl IntoResponse {
    let (jar, feed) = state.sessions.resolve(jar);
    match feed.submit(form.text, form.source, form.category).await {
        SubmitOutcome::Created(id) => info!(id, "fact shared"),
        SubmitOutcome::Invalid(e) => debug!(error = %e, "fact form incomplete"),
        SubmitOutcome::Failed => {}
    }
    (jar, Redirect::to("/"))
}

async fn vote(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Path((id, field)): Path<(i64, String)>,
) -> Result<impl IntoResponse, WebError> {
    let field: VoteField = field.parse()?;
    let (jar, feed) = state.sessions.resolve(jar);
    feed.vote(id, field).await;
    Ok((jar, Redirect::to("/")))
}

async fn health() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

// =============================================================================
// Rendering
// =============================================================================

fn render_page(feed: &Feed, categories: &Categories, alert: Option<&str>) -> String {
    let toggle_label = if feed.form().open {
        "Close"
    } else {
        "Share a fact"
    };

    let form_html = if feed.form().open {
        render_form(feed, categories)
    } else {
        String::new()
    };

    let alert_html = alert
        .map(|msg| {
            format!(
                r#"<div class="alert" role="alertdialog"><p>{}</p><a href="/" class="btn">OK</a></div>"#,
                html_escape(msg)
            )
        })
        .unwrap_or_default();

    let list_html = match feed.status() {
        LoadStatus::Loading => r#"<p class="loading">Loading...</p>"#.to_string(),
        LoadStatus::Error => format!(r#"<p class="loadingError">{}</p>"#, LOAD_ERROR_MESSAGE),
        LoadStatus::Idle if feed.facts().is_empty() => {
            format!(r#"<p class="loadingError">{}</p>"#, EMPTY_LIST_MESSAGE)
        }
        LoadStatus::Idle => {
            let items: String = feed
                .facts()
                .iter()
                .map(|fact| render_fact(fact, categories))
                .collect();
            format!(r#"<ul class="facts-list">{}</ul>"#, items)
        }
    };

    PAGE_HTML
        .replace("<!-- TOGGLE_LABEL -->", toggle_label)
        .replace("<!-- FORM -->", &form_html)
        .replace("<!-- ALERT -->", &alert_html)
        .replace("<!-- SIDEBAR -->", &render_sidebar(feed.category(), categories))
        .replace("<!-- LIST -->", &list_html)
}

fn render_sidebar(current: CategoryFilter, categories: &Categories) -> String {
    let active = |filter: CategoryFilter| if filter == current { " active" } else { "" };

    let mut html = format!(
        r#"<li class="category"><a class="btn btn-all-categories{}" href="/?category=all">All</a></li>"#,
        active(CategoryFilter::All)
    );
    for category in categories.iter() {
        html.push_str(&format!(
            r#"<li class="category"><a class="btn btn-category{}" style="background-color: {}" href="/?category={}">{}</a></li>"#,
            active(CategoryFilter::Only(category)),
            categories.color_of(category),
            category,
            category
        ));
    }
    html
}

fn render_fact(fact: &Fact, categories: &Categories) -> String {
    let disputed = if fact.is_disputed() {
        r#"<span class="disputed">[DISPUTED]</span> "#
    } else {
        ""
    };

    let votes: String = VoteField::ALL
        .iter()
        .map(|&field| {
            format!(
                r#"<form method="post" action="/facts/{}/vote/{}"><button>{} {}</button></form>"#,
                fact.id,
                field,
                field.glyph(),
                fact.votes(field)
            )
        })
        .collect();

    format!(
        r#"<li class="fact">
            <p>{}{} <a class="source" href="{}" target="_blank" rel="noreferrer">(Source)</a></p>
            <span class="tag" style="background-color: {}">{}</span>
            <div class="vote-buttons">{}</div>
        </li>"#,
        disputed,
        html_escape(&fact.text),
        html_escape(&fact.source),
        categories.color_of(fact.category),
        fact.category,
        votes
    )
}

fn render_form(feed: &Feed, categories: &Categories) -> String {
    let form = feed.form();

    let mut options = String::from(r#"<option value="">Choose category:</option>"#);
    for category in categories.iter() {
        let selected = if form.category == category.name() {
            " selected"
        } else {
            ""
        };
        options.push_str(&format!(
            r#"<option value="{}"{}>{}</option>"#,
            category,
            selected,
            category.name().to_uppercase()
        ));
    }

    FORM_HTML
        .replace("<!-- TEXT -->", &html_escape(&form.text))
        .replace("<!-- REMAINING -->", &form.remaining().to_string())
        .replace("<!-- SOURCE -->", &html_escape(&form.source))
        .replace("<!-- OPTIONS -->", &options)
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

// =============================================================================
// Form Structs
// =============================================================================

#[derive(Deserialize)]
struct FactSubmission {
    #[serde(default)]
    text: String,
    #[serde(default)]
    source: String,
    #[serde(default)]
    category: String,
}

const PAGE_HTML: &str = r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <title>Today I Learned</title>
    <link rel="stylesheet" href="/static/style.css">
    <style>
        body {
            font-family: "Sono", -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, sans-serif;
            max-width: 1500px;
            margin: 0 auto;
            padding: 3rem 2rem;
            background: #292524;
            color: #fafaf9;
        }
        a { color: inherit; }
        .header { display: flex; justify-content: space-between; align-items: center; margin-bottom: 2.5rem; }
        .logo { display: flex; align-items: center; gap: 1rem; }
        .logo img { width: 68px; height: 68px; }
        h1 { font-size: 2.5rem; text-transform: uppercase; margin: 0; }
        .main { display: grid; grid-template-columns: 250px 1fr; gap: 3rem; }
        aside ul, .facts-list { list-style: none; padding: 0; margin: 0; }
        .category { margin-bottom: 1rem; }
        .btn { display: inline-block; border: none; border-radius: 100px; padding: 1rem 1.5rem; cursor: pointer;
               color: inherit; text-decoration: none; text-transform: uppercase; font-size: 1rem;
               background-image: linear-gradient(135deg, #3b82f6, #ef4444, #16a34a, #eab308); }
        .btn-category, .btn-all-categories { width: 100%; box-sizing: border-box; text-align: center; background-image: none; }
        .btn-all-categories { background-image: linear-gradient(135deg, #3b82f6, #ef4444, #16a34a, #eab308); }
        .active { outline: 3px solid #fafaf9; }
        .fact { background: #44403c; margin-bottom: 1rem; padding: 1rem 1.5rem; border-radius: 16px;
                display: flex; align-items: center; gap: 1.5rem; }
        .fact p { flex: 1; margin: 0; line-height: 1.4; }
        .source { color: #a8a29e; margin-left: 0.5rem; }
        .tag { text-transform: uppercase; font-size: 0.85rem; padding: 0.25rem 0.75rem; border-radius: 100px; }
        .disputed { color: #ef4444; font-weight: 600; }
        .vote-buttons { display: flex; gap: 0.5rem; }
        .vote-buttons button { border: none; background: #78716c; color: inherit; font-size: 1.1rem;
                               padding: 0.4rem 0.8rem; border-radius: 100px; cursor: pointer; }
        .vote-buttons button:hover { background: #292524; }
        .fact-form { background: #44403c; margin-bottom: 2.5rem; padding: 1rem 2rem; border-radius: 16px;
                     display: flex; align-items: center; gap: 1rem; }
        .fact-form input, .fact-form select { background: #78716c; border: none; border-radius: 100px;
                     padding: 0.75rem; color: inherit; font-size: 1rem; }
        .fact-form input:first-child { flex: 1; }
        .loading, .loadingError { text-align: center; text-transform: uppercase; font-size: 2rem; margin-top: 3rem; }
        .alert { background: #ef4444; padding: 1rem 2rem; border-radius: 16px; margin-bottom: 2rem;
                 display: flex; justify-content: space-between; align-items: center; }
    </style>
</head>
<body>
    <header class="header">
        <div class="logo">
            <img src="/static/logo.png" alt="Today I Learned Logo">
            <h1>Today I Learned</h1>
        </div>
        <form method="post" action="/form/toggle">
            <button class="btn btn-large"><!-- TOGGLE_LABEL --></button>
        </form>
    </header>
    <!-- ALERT -->
    <!-- FORM -->
    <main class="main">
        <aside><ul><!-- SIDEBAR --></ul></aside>
        <section><!-- LIST --></section>
    </main>
</body>
</html>"#;

const FORM_HTML: &str = r#"<form class="fact-form" method="post" action="/facts">
        <input type="text" name="text" value="<!-- TEXT -->" placeholder="Share a fact with the world...">
        <span><!-- REMAINING --></span>
        <input type="text" name="source" value="<!-- SOURCE -->" placeholder="Trustworthy source...">
        <select name="category"><!-- OPTIONS --></select>
        <button class="btn btn-large">Post</button>
    </form>"#;
