//! List view controller: turns document events into admin API calls and
//! re-renders the document from their responses.

use std::sync::Arc;

use async_trait::async_trait;
use client_core::ConfigApi;
use shared::{
    domain::ConfigId,
    protocol::{PageResult, SortField, SortOrder},
};
use tokio::sync::{Mutex, MutexGuard};
use tracing::{debug, info, warn};

use super::{
    events::{DeleteOutcome, EventOutcome, Key, ViewEvent},
    reducer::{PagePlacement, PendingLoad, QueryState},
};
use crate::ui::{document::ListView, pagination::pagination_display, table::render_config_table};

pub const DELETE_PROMPT: &str = "Delete this config?";

/// Asks the user to confirm a destructive action.
#[async_trait]
pub trait Confirmer: Send + Sync {
    async fn confirm(&self, prompt: &str) -> bool;
}

/// Confirms everything; used for non-interactive runs.
pub struct AlwaysConfirm;

#[async_trait]
impl Confirmer for AlwaysConfirm {
    async fn confirm(&self, _prompt: &str) -> bool {
        true
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    Rendered {
        page: u32,
        rows: usize,
        total: u64,
        total_pages: u32,
    },
    /// The server answered with a non-zero code; the document is unchanged.
    Rejected { code: i64, message: String },
    /// Transport, decode, or malformed-response failure; the document is unchanged.
    Failed { reason: String },
    /// A newer request was issued while this one was in flight.
    Stale { seq: u64 },
}

enum Fetched {
    Done(LoadOutcome),
    PastLastPage { last_page: u32 },
}

pub struct ListViewController<V: ListView> {
    api: Arc<dyn ConfigApi>,
    confirmer: Arc<dyn Confirmer>,
    state: Mutex<QueryState>,
    view: Mutex<V>,
}

impl<V: ListView> ListViewController<V> {
    pub fn new(
        api: Arc<dyn ConfigApi>,
        confirmer: Arc<dyn Confirmer>,
        view: V,
        page_size: u32,
    ) -> Self {
        Self {
            api,
            confirmer,
            state: Mutex::new(QueryState::new(page_size)),
            view: Mutex::new(view),
        }
    }

    pub async fn view(&self) -> MutexGuard<'_, V> {
        self.view.lock().await
    }

    pub async fn query_state(&self) -> QueryState {
        self.state.lock().await.clone()
    }

    /// Sets the sort used by subsequent loads without fetching.
    pub async fn set_sort(&self, field: SortField, order: SortOrder) {
        self.state.lock().await.set_sort(field, order);
    }

    /// Fetches `page` and re-renders the table and pagination.
    ///
    /// A missing or empty `keyword`/`method` falls back to the document's
    /// filter inputs. On any failure the document keeps what it shows.
    ///
    /// When the server reports fewer pages than `page`, a second request
    /// fetches the last page instead, so one call may issue two list requests.
    pub async fn load_configs(
        &self,
        page: u32,
        keyword: Option<&str>,
        method: Option<&str>,
    ) -> LoadOutcome {
        let (keyword, method) = {
            let view = self.view.lock().await;
            (
                override_or(keyword, || view.keyword_input()),
                override_or(method, || view.method_filter()),
            )
        };

        let mut target = page;
        let mut redirect_past_end = true;
        loop {
            match self
                .fetch_and_render(target, &keyword, &method, redirect_past_end)
                .await
            {
                Fetched::Done(outcome) => return outcome,
                Fetched::PastLastPage { last_page } => {
                    info!(
                        requested_page = target,
                        last_page, "requested page is past the end; loading last page"
                    );
                    target = last_page;
                    redirect_past_end = false;
                }
            }
        }
    }

    async fn fetch_and_render(
        &self,
        page: u32,
        keyword: &str,
        method: &str,
        redirect_past_end: bool,
    ) -> Fetched {
        let PendingLoad { seq, request } =
            self.state
                .lock()
                .await
                .issue(page, keyword.to_string(), method.to_string());
        debug!(
            seq,
            page = request.page,
            page_size = request.page_size,
            keyword = %request.keyword,
            method = %request.method,
            sort_field = %request.sort_field,
            sort_order = %request.sort_order,
            "loading configs"
        );

        let envelope = match self.api.list_configs(&request).await {
            Ok(envelope) => envelope,
            Err(err) => {
                warn!(seq, error = %err, "config list request failed");
                return Fetched::Done(LoadOutcome::Failed {
                    reason: err.to_string(),
                });
            }
        };
        let page_result: PageResult = match envelope.into_result() {
            Ok(page_result) => page_result,
            Err(err) if !err.is_from_server() => {
                warn!(seq, error = %err, "config list response unusable");
                return Fetched::Done(LoadOutcome::Failed {
                    reason: err.to_string(),
                });
            }
            Err(err) => {
                warn!(seq, code = err.status, message = %err.message, "config list rejected");
                return Fetched::Done(LoadOutcome::Rejected {
                    code: err.status,
                    message: err.message,
                });
            }
        };

        let mut state = self.state.lock().await;
        if !state.is_latest(seq) {
            debug!(seq, latest = state.latest_seq(), "discarding stale config list");
            return Fetched::Done(LoadOutcome::Stale { seq });
        }
        if redirect_past_end {
            if let PagePlacement::PastLastPage { last_page } =
                state.placement(request.page, page_result.total_pages)
            {
                return Fetched::PastLastPage { last_page };
            }
        }

        state.commit(request.page, page_result.total_pages);
        let table = render_config_table(&page_result.items);
        let rows = page_result.items.len();
        let display = pagination_display(
            state.current_page(),
            page_result.total,
            page_result.total_pages,
        );
        {
            let mut view = self.view.lock().await;
            view.replace_table(table);
            view.update_pagination(display);
        }
        drop(state);

        Fetched::Done(LoadOutcome::Rendered {
            page: request.page,
            rows,
            total: page_result.total,
            total_pages: page_result.total_pages,
        })
    }

    /// Dispatches one delegated document event.
    pub async fn handle_event(&self, event: ViewEvent) -> EventOutcome {
        debug!(event = event.name(), "list view event");
        match event {
            ViewEvent::HeaderClicked { field } => {
                let Some(field) = field else {
                    return EventOutcome::Ignored;
                };
                let field: SortField = match field.parse() {
                    Ok(field) => field,
                    Err(err) => {
                        debug!(error = %err, "header is not sortable");
                        return EventOutcome::Ignored;
                    }
                };
                self.state.lock().await.toggle_sort(field);
                EventOutcome::Loaded(self.load_configs(1, None, None).await)
            }
            ViewEvent::KeywordKeyPressed(Key::Enter) | ViewEvent::MethodFilterChanged => {
                EventOutcome::Loaded(self.load_configs(1, None, None).await)
            }
            ViewEvent::KeywordKeyPressed(_) => EventOutcome::Ignored,
            ViewEvent::PrevPage => {
                let target = self.state.lock().await.previous_page();
                match target {
                    Some(page) => EventOutcome::Loaded(self.load_configs(page, None, None).await),
                    None => EventOutcome::Ignored,
                }
            }
            ViewEvent::NextPage => {
                let target = self.state.lock().await.next_page();
                match target {
                    Some(page) => EventOutcome::Loaded(self.load_configs(page, None, None).await),
                    None => EventOutcome::Ignored,
                }
            }
            ViewEvent::DeleteClicked { id } => self.delete_config(id).await,
        }
    }

    async fn delete_config(&self, id: ConfigId) -> EventOutcome {
        if !self.view.lock().await.has_delete_target(id) {
            debug!(config_id = id.0, "delete click for a row that is not rendered");
            return EventOutcome::Ignored;
        }
        let page = self.state.lock().await.current_page();

        if !self.confirmer.confirm(DELETE_PROMPT).await {
            debug!(config_id = id.0, "delete declined");
            return EventOutcome::Delete(DeleteOutcome::Declined);
        }

        let failure = match self.api.delete_config(id).await {
            Ok(envelope) if envelope.is_success() => None,
            Ok(envelope) => Some(format!("code {}: {}", envelope.code, envelope.message)),
            Err(err) => Some(err.to_string()),
        };
        match &failure {
            None => info!(config_id = id.0, "config deleted"),
            Some(reason) => warn!(config_id = id.0, %reason, "config delete failed"),
        }

        let reload = self.load_configs(page, None, None).await;
        EventOutcome::Delete(DeleteOutcome::Completed {
            id,
            failure,
            reload,
        })
    }
}

fn override_or(value: Option<&str>, fallback: impl FnOnce() -> String) -> String {
    match value {
        Some(value) if !value.is_empty() => value.to_string(),
        _ => fallback(),
    }
}

#[cfg(test)]
#[path = "../tests/orchestration_tests.rs"]
mod tests;
