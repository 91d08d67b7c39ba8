use std::future::Future;

use tracing::{info, warn};

use crate::config::{Config, FetchPolicy};
use crate::error::{LoadIssue, SourceError};
use crate::models::{LoadedModules, ModuleData};
use crate::table::{build_module, parse_table};

const USER_AGENT: &str = concat!("depot-assessment-tracker/", env!("CARGO_PKG_VERSION"));

/// Something that turns a source URL into raw delimited text.
pub trait Fetch {
    fn fetch(&self, url: &str) -> impl Future<Output = Result<String, SourceError>> + Send;
}

/// HTTP GET with an explicit timeout and bounded retries.
#[derive(Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    policy: FetchPolicy,
}

impl HttpFetcher {
    pub fn new(policy: FetchPolicy) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(policy.timeout())
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self { client, policy })
    }

    async fn fetch_once(&self, url: &str) -> Result<String, SourceError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status(status.as_u16()));
        }
        Ok(response.text().await?)
    }
}

impl Fetch for HttpFetcher {
    fn fetch(&self, url: &str) -> impl Future<Output = Result<String, SourceError>> + Send {
        let url = url.to_string();
        async move { retry(&self.policy, &url, || self.fetch_once(&url)).await }
    }
}

/// Run `attempt` until it succeeds, fails with a non-retryable error, or the
/// policy's attempts are used up. Sleeps `delay_before(n)` between attempts.
pub async fn retry<T, F, Fut>(
    policy: &FetchPolicy,
    url: &str,
    mut attempt: F,
) -> Result<T, SourceError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, SourceError>>,
{
    let mut n = 1;
    loop {
        match attempt().await {
            Ok(value) => return Ok(value),
            Err(err) if err.is_retryable() && n < policy.max_attempts() => {
                let delay = policy.delay_before(n);
                warn!("fetch attempt {n} for {url} failed: {err}; retrying in {delay:?}");
                tokio::time::sleep(delay).await;
                n += 1;
            }
            Err(err) => return Err(err),
        }
    }
}

/// Load every declared module, one source at a time.
///
/// Always returns one `ModuleData` per declared module in declaration order.
/// A module without a source, or whose source cannot be fetched or parsed,
/// becomes an empty dataset and the reason is kept in `issues`.
pub async fn load_modules<F: Fetch>(config: &Config, fetcher: &F) -> LoadedModules {
    let mut loaded = LoadedModules::default();

    for module in &config.modules {
        let Some(url) = module.source_url() else {
            info!("module '{}' has no source configured", module.name);
            loaded.modules.push(ModuleData::empty(&module.name, &module.label));
            continue;
        };

        match fetcher.fetch(&url).await.and_then(|text| parse_table(&text)) {
            Ok(table) => {
                info!(
                    "loaded module '{}': {} rows, {} columns",
                    module.name,
                    table.rows.len(),
                    table.headers.len()
                );
                let data = build_module(
                    module,
                    table,
                    &config.columns,
                    config.day_first,
                    &mut loaded.issues,
                );
                loaded.modules.push(data);
            }
            Err(err) => {
                warn!("module '{}' degraded to empty: {err}", module.name);
                loaded.issues.push(LoadIssue::SourceUnavailable {
                    module: module.name.clone(),
                    reason: err.to_string(),
                });
                loaded.modules.push(ModuleData::empty(&module.name, &module.label));
            }
        }
    }

    for issue in &loaded.issues {
        warn!("{issue}");
    }

    loaded
}
