use crate::config::Config;
use crate::fetch::{FetchError, FetchRequest, FetchSettings, LogPager};
use crate::kube::selector::SourceSelector;
use crate::kube::KubeClient;
use crate::web::{run_server, AppState};
use clap::Args;
use std::net::SocketAddr;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum RunError {
    #[error("kubernetes client error: {0}")]
    KubeClient(#[from] crate::kube::KubeClientError),

    #[error("{0}")]
    Fetch(#[from] FetchError),

    #[error("failed to encode page: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid listen address '{0}'")]
    ListenAddr(String),

    #[error("web server error: {0}")]
    WebServer(#[from] std::io::Error),
}

/// Flags of a single page request
#[derive(Debug, Clone, Default, Args)]
pub struct FetchArgs {
    /// Kubernetes namespace
    #[arg(short = 'n', long)]
    pub namespace: Option<String>,

    #[arg(short = 'a', long)]
    pub application_id: Option<String>,

    #[arg(short = 's', long)]
    pub scope_id: Option<String>,

    #[arg(short = 'd', long)]
    pub deployment_id: Option<String>,

    /// Maximum log entries (defaults to fetch.default_limit)
    #[arg(short = 'l', long)]
    pub limit: Option<usize>,

    /// Token returned by the previous page
    #[arg(short = 't', long, default_value = "")]
    pub next_page_token: String,

    /// Space-separated terms that must all appear in a line
    #[arg(short = 'f', long = "filter", default_value = "")]
    pub filter: String,

    /// Start time (RFC 3339)
    #[arg(long)]
    pub start_time: Option<String>,

    /// Restrict to a single pod, by name or uid
    #[arg(short = 'i', long)]
    pub instance_id: Option<String>,
}

impl FetchArgs {
    pub fn into_request(self, default_limit: usize) -> FetchRequest {
        FetchRequest {
            selector: SourceSelector {
                application_id: self.application_id,
                scope_id: self.scope_id,
                deployment_id: self.deployment_id,
            },
            namespace: self.namespace.unwrap_or_default(),
            limit: self.limit.unwrap_or(default_limit),
            next_page_token: self.next_page_token,
            filter_pattern: self.filter,
            start_time: self.start_time,
            instance_id: self.instance_id,
        }
    }
}

fn build_pager(config: &Config) -> Result<LogPager, RunError> {
    let client = Arc::new(KubeClient::new(&config.kubernetes, &config.selector.base)?);
    Ok(LogPager::new(client.clone(), client, FetchSettings::from(config)))
}

/// Fetch one page and print it to stdout as a single JSON line
pub async fn run_fetch(config: Config, args: FetchArgs) -> Result<(), RunError> {
    let request = args.into_request(config.fetch.default_limit);
    // Checked before the client is built, which reads the token file
    if request.namespace.trim().is_empty() {
        return Err(FetchError::MissingNamespace.into());
    }
    let pager = build_pager(&config)?;

    let page = pager.fetch_page(&request).await?;
    println!("{}", serde_json::to_string(&page)?);

    Ok(())
}

/// Serve pages over HTTP
pub async fn run_serve(config: Config, listen: Option<String>) -> Result<(), RunError> {
    let listen = listen.unwrap_or_else(|| config.web.listen.clone());
    let addr: SocketAddr = listen
        .parse()
        .map_err(|_| RunError::ListenAddr(listen.clone()))?;

    info!(api_url = %config.kubernetes.api_url, "Starting log API");

    let state = AppState {
        pager: Arc::new(build_pager(&config)?),
        default_limit: config.fetch.default_limit,
    };
    run_server(state, addr).await?;

    Ok(())
}
