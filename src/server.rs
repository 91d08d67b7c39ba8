use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::extract::{Query, State};
use axum::http::header;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::routing::get;
use axum::Router;
use chrono::NaiveDate;
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::cache::{source_key, SourceKey, TtlCache};
use crate::config::Config;
use crate::dates::DateRange;
use crate::html::{render_page, Page, PageBody, View};
use crate::models::{DetailView, LoadedModules};
use crate::reconcile::{combined, date_bounds, detail, reconcile};
use crate::sources::{load_modules, HttpFetcher};

pub type ModuleCache = TtlCache<SourceKey, Arc<LoadedModules>>;

/// Shared state for every request.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub fetcher: HttpFetcher,
    pub cache: Arc<Mutex<ModuleCache>>,
}

impl AppState {
    pub fn new(config: Config, fetcher: HttpFetcher, cache: ModuleCache) -> Self {
        Self {
            config: Arc::new(config),
            fetcher,
            cache: Arc::new(Mutex::new(cache)),
        }
    }

    /// Cached modules, reloading every source when the entry is missing or stale.
    pub async fn modules(&self) -> Arc<LoadedModules> {
        let key = source_key(&self.config);
        let mut cache = self.cache.lock().await;
        let now = Instant::now();
        if let Some(loaded) = cache.get(&key, now) {
            if let Some(fetched_at) = cache.fetched_at() {
                debug!("serving modules cached {:?} ago", now.duration_since(fetched_at));
            }
            return loaded;
        }

        info!("cache expired, reloading {} modules", self.config.modules.len());
        let loaded = Arc::new(load_modules(&self.config, &self.fetcher).await);
        cache.insert(key, Arc::clone(&loaded), Instant::now());
        loaded
    }

    /// Drop the cached modules so the next request fetches every source again.
    pub async fn invalidate(&self) {
        self.cache.lock().await.invalidate();
    }
}

/// Query parameters for the page; blank values mean "not set".
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub view: Option<String>,
    pub module: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
    pub q: Option<String>,
}

fn parse_date(value: Option<&str>) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value?.trim(), "%Y-%m-%d").ok()
}

impl PageQuery {
    pub fn range(&self, bounds: Option<DateRange>) -> Option<DateRange> {
        DateRange::resolve(
            bounds,
            parse_date(self.start.as_deref()),
            parse_date(self.end.as_deref()),
        )
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/summary.csv", get(summary_csv))
        .route("/refresh", get(refresh))
        .route("/health", get(health))
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}

async fn refresh(State(state): State<AppState>) -> Redirect {
    info!("manual reload requested");
    state.invalidate().await;
    Redirect::to("/")
}

async fn index(State(state): State<AppState>, Query(query): Query<PageQuery>) -> Html<String> {
    let loaded = state.modules().await;
    Html(render_index(&state.config, &loaded, &query))
}

/// Render the page for one request against already loaded modules.
pub fn render_index(config: &Config, loaded: &LoadedModules, query: &PageQuery) -> String {
    let range = query.range(date_bounds(&loaded.modules));
    let names: Vec<String> = config.modules.iter().map(|m| m.name.clone()).collect();
    let search = query.q.as_deref().filter(|q| !q.trim().is_empty());

    match View::parse(query.view.as_deref()) {
        View::Summary => {
            let summary = reconcile(&loaded.modules, range.as_ref(), &config.scoring);
            render_page(&Page {
                body: PageBody::Summary(&summary),
                modules: &names,
                range,
                search,
                issues: &loaded.issues,
                interactive: true,
            })
        }
        View::Detail => {
            let selected = query
                .module
                .as_deref()
                .and_then(|name| loaded.module(name))
                .or_else(|| loaded.modules.first());
            let (module, view) = match selected {
                Some(module) => (
                    module.name.as_str(),
                    detail(module, range.as_ref(), search, &config.columns),
                ),
                None => ("", DetailView::NoData),
            };
            render_page(&Page {
                body: PageBody::Detail {
                    module,
                    view: &view,
                },
                modules: &names,
                range,
                search,
                issues: &loaded.issues,
                interactive: true,
            })
        }
        View::All => {
            let view = combined(&loaded.modules, range.as_ref(), search, &config.columns);
            render_page(&Page {
                body: PageBody::All(&view),
                modules: &names,
                range,
                search,
                issues: &loaded.issues,
                interactive: true,
            })
        }
    }
}

async fn summary_csv(State(state): State<AppState>, Query(query): Query<PageQuery>) -> Response {
    let loaded = state.modules().await;
    let range = query.range(date_bounds(&loaded.modules));
    let summary = reconcile(&loaded.modules, range.as_ref(), &state.config.scoring);

    match crate::export::summary_csv(&summary) {
        Ok(body) => (
            [
                (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
                (
                    header::CONTENT_DISPOSITION,
                    "attachment; filename=\"summary.csv\"",
                ),
            ],
            body,
        )
            .into_response(),
        Err(err) => (
            axum::http::StatusCode::INTERNAL_SERVER_ERROR,
            format!("failed to build CSV: {err}"),
        )
            .into_response(),
    }
}

pub async fn serve(state: AppState, addr: SocketAddr) -> anyhow::Result<()> {
    let app = build_router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("listening on http://{addr}");
    axum::serve(listener, app).await?;
    Ok(())
}
