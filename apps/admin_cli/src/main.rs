use std::{path::PathBuf, sync::Arc};

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use clap::{Args, Parser, Subcommand};
use client_core::{ConfigApi, ConfigApiClient};
use list_view::{
    AlwaysConfirm, Confirmer, DeleteOutcome, EventOutcome, HtmlDocument, ListViewController,
    LoadOutcome, ViewEvent,
};
use shared::{
    domain::{ConfigId, HttpMethod},
    protocol::{ConfigDraft, SortField, SortOrder},
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod settings;

use settings::{load_settings, Settings};

#[derive(Parser, Debug)]
#[command(about = "Browse and prune endpoint configs of the admin service")]
struct Cli {
    /// Settings file; defaults to ./admin.toml when present.
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    server_url: Option<String>,
    #[arg(long)]
    page_size: Option<u32>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render one page of the config list.
    List {
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long)]
        keyword: Option<String>,
        #[arg(long)]
        method: Option<String>,
        #[arg(long)]
        sort_field: Option<SortField>,
        #[arg(long)]
        sort_order: Option<SortOrder>,
    },
    /// Print one config as JSON.
    Show { id: i64 },
    /// Delete a config shown on the given page, then re-render that page.
    Delete {
        id: i64,
        #[arg(long, default_value_t = 1)]
        page: u32,
        /// Skip the confirmation prompt.
        #[arg(long)]
        yes: bool,
    },
    /// Create a config and print the stored record.
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        url: String,
        #[arg(long, default_value = "GET")]
        method: String,
        #[command(flatten)]
        payload: PayloadArgs,
    },
    /// Change fields of a config; fields not given keep their current value.
    Edit {
        id: i64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        url: Option<String>,
        #[arg(long)]
        method: Option<String>,
        #[command(flatten)]
        payload: PayloadArgs,
    },
    /// Send a file through a config and print the resulting file url.
    Upload { id: i64, file: PathBuf },
}

/// JSON-encoded request details stored with a config.
#[derive(Args, Debug)]
struct PayloadArgs {
    #[arg(long)]
    parameters: Option<String>,
    #[arg(long)]
    request_body: Option<String>,
    #[arg(long)]
    headers: Option<String>,
    #[arg(long)]
    response_rule: Option<String>,
}

impl PayloadArgs {
    fn apply_to(self, draft: &mut ConfigDraft) {
        if let Some(parameters) = self.parameters {
            draft.parameters = Some(parameters);
        }
        if let Some(request_body) = self.request_body {
            draft.request_body = Some(request_body);
        }
        if let Some(headers) = self.headers {
            draft.headers = Some(headers);
        }
        if let Some(response_rule) = self.response_rule {
            draft.response_rule = Some(response_rule);
        }
    }
}

struct StdinConfirmer;

#[async_trait]
impl Confirmer for StdinConfirmer {
    async fn confirm(&self, prompt: &str) -> bool {
        eprint!("{prompt} [y/N] ");
        let mut line = String::new();
        let mut reader = BufReader::new(tokio::io::stdin());
        match reader.read_line(&mut line).await {
            Ok(_) => matches!(line.trim().to_ascii_lowercase().as_str(), "y" | "yes"),
            Err(err) => {
                warn!(error = %err, "failed to read confirmation");
                false
            }
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut settings = load_settings(cli.config.as_deref())?;
    if let Some(server_url) = cli.server_url.clone() {
        settings.server_url = server_url;
    }
    if let Some(page_size) = cli.page_size {
        settings.page_size = page_size;
    }
    let settings = settings.validated()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&settings.log_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    let api: Arc<dyn ConfigApi> = Arc::new(
        ConfigApiClient::new(&settings.server_url).context("failed to build admin api client")?,
    );
    info!(server_url = %settings.server_url, page_size = settings.page_size, "admin client ready");

    match cli.command {
        Command::List {
            page,
            keyword,
            method,
            sort_field,
            sort_order,
        } => {
            let controller = controller(api, &settings, Arc::new(AlwaysConfirm));
            if sort_field.is_some() || sort_order.is_some() {
                let (current_field, current_order) = controller.query_state().await.sort();
                controller
                    .set_sort(
                        sort_field.unwrap_or(current_field),
                        sort_order.unwrap_or(current_order),
                    )
                    .await;
            }
            {
                let mut view = controller.view().await;
                view.set_keyword_input(keyword.unwrap_or_default());
                view.set_method_filter(method.unwrap_or_default());
            }
            let outcome = controller.load_configs(page, None, None).await;
            ensure_rendered(&outcome)?;
            println!("{}", controller.view().await.to_html());
        }
        Command::Show { id } => {
            let record = api
                .get_config(ConfigId(id))
                .await?
                .into_result()
                .with_context(|| format!("failed to fetch config {id}"))?;
            println!("{}", serde_json::to_string_pretty(&record)?);
        }
        Command::Delete { id, page, yes } => {
            let confirmer: Arc<dyn Confirmer> = if yes {
                Arc::new(AlwaysConfirm)
            } else {
                Arc::new(StdinConfirmer)
            };
            let controller = controller(api, &settings, confirmer);
            ensure_rendered(&controller.load_configs(page, None, None).await)?;

            let id = ConfigId(id);
            match controller.handle_event(ViewEvent::DeleteClicked { id }).await {
                EventOutcome::Delete(DeleteOutcome::Declined) => {
                    println!("delete of config {id} cancelled");
                }
                EventOutcome::Delete(DeleteOutcome::Completed {
                    failure, reload, ..
                }) => {
                    if let Some(reason) = failure {
                        eprintln!("delete of config {id} failed: {reason}");
                    }
                    ensure_rendered(&reload)?;
                    println!("{}", controller.view().await.to_html());
                }
                EventOutcome::Ignored | EventOutcome::Loaded(_) => {
                    bail!("config {id} is not listed on page {page}");
                }
            }
        }
        Command::Add {
            name,
            url,
            method,
            payload,
        } => {
            let mut draft = ConfigDraft::new(name, url, HttpMethod::from(method.as_str()));
            payload.apply_to(&mut draft);
            let record = api
                .add_config(&draft)
                .await?
                .into_result()
                .with_context(|| format!("failed to add config '{}'", draft.name))?;
            println!("{}", serde_json::to_string_pretty(&record)?);
        }
        Command::Edit {
            id,
            name,
            url,
            method,
            payload,
        } => {
            let id = ConfigId(id);
            let current = api
                .get_config(id)
                .await?
                .into_result()
                .with_context(|| format!("failed to fetch config {id}"))?;
            let mut draft = ConfigDraft::from(&current);
            if let Some(name) = name {
                draft.name = name;
            }
            if let Some(url) = url {
                draft.url = url;
            }
            if let Some(method) = method {
                draft.method = HttpMethod::from(method.as_str());
            }
            payload.apply_to(&mut draft);
            let record = api
                .edit_config(id, &draft)
                .await?
                .into_result()
                .with_context(|| format!("failed to edit config {id}"))?;
            println!("{}", serde_json::to_string_pretty(&record)?);
        }
        Command::Upload { id, file } => {
            let contents = tokio::fs::read(&file)
                .await
                .with_context(|| format!("failed to read {}", file.display()))?;
            let file_name = file
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .with_context(|| format!("{} has no file name", file.display()))?;
            let id = ConfigId(id);
            let uploaded = api
                .upload_file(id, &file_name, contents)
                .await?
                .into_result()
                .with_context(|| format!("failed to upload {file_name} through config {id}"))?;
            println!("{}", uploaded.url);
        }
    }

    Ok(())
}

fn controller(
    api: Arc<dyn ConfigApi>,
    settings: &Settings,
    confirmer: Arc<dyn Confirmer>,
) -> ListViewController<HtmlDocument> {
    ListViewController::new(api, confirmer, HtmlDocument::new(), settings.page_size)
}

fn ensure_rendered(outcome: &LoadOutcome) -> Result<()> {
    match outcome {
        LoadOutcome::Rendered { .. } => Ok(()),
        LoadOutcome::Rejected { code, message } => {
            bail!("config list rejected by server (code {code}): {message}")
        }
        LoadOutcome::Failed { reason } => bail!("config list request failed: {reason}"),
        LoadOutcome::Stale { seq } => bail!("config list response {seq} was superseded"),
    }
}
