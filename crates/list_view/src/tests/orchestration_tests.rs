use super::*;
use client_core::ClientError;
use reqwest::StatusCode;
use serde_json::Value;
use shared::{
    domain::{ConfigRecord, HttpMethod},
    protocol::{ApiEnvelope, ConfigDraft, ListRequest, SortOrder, UploadResult},
};
use tokio::sync::Notify;

use crate::ui::{document::HtmlDocument, table::EMPTY_PLACEHOLDER};

struct FakeAdminApi {
    records: Mutex<Vec<ConfigRecord>>,
    list_requests: Mutex<Vec<ListRequest>>,
    deletes: Mutex<Vec<ConfigId>>,
    list_code: Mutex<i64>,
    list_transport_failure: Mutex<bool>,
    list_missing_data: Mutex<bool>,
    delete_code: i64,
    gated_page: Option<u32>,
    gate: Notify,
}

impl FakeAdminApi {
    fn with_records(count: i64) -> Self {
        let records = (1..=count)
            .map(|id| {
                let method = if id % 2 == 0 {
                    HttpMethod::Get
                } else {
                    HttpMethod::Post
                };
                ConfigRecord::new(
                    ConfigId(id),
                    format!("config-{id:02}"),
                    format!("https://upstream.test/{id}"),
                    method,
                )
            })
            .collect();
        Self {
            records: Mutex::new(records),
            list_requests: Mutex::new(Vec::new()),
            deletes: Mutex::new(Vec::new()),
            list_code: Mutex::new(0),
            list_transport_failure: Mutex::new(false),
            list_missing_data: Mutex::new(false),
            delete_code: 0,
            gated_page: None,
            gate: Notify::new(),
        }
    }

    fn failing_deletes(mut self, code: i64) -> Self {
        self.delete_code = code;
        self
    }

    fn gating_page(mut self, page: u32) -> Self {
        self.gated_page = Some(page);
        self
    }

    fn release_gate(&self) {
        self.gate.notify_one();
    }

    async fn requested_pages(&self) -> Vec<u32> {
        self.list_requests
            .lock()
            .await
            .iter()
            .map(|request| request.page)
            .collect()
    }
}

#[async_trait]
impl ConfigApi for FakeAdminApi {
    async fn list_configs(
        &self,
        request: &ListRequest,
    ) -> Result<ApiEnvelope<PageResult>, ClientError> {
        self.list_requests.lock().await.push(request.clone());
        if self.gated_page == Some(request.page) {
            self.gate.notified().await;
        }
        if *self.list_transport_failure.lock().await {
            return Err(ClientError::Decode {
                endpoint: "/api/list",
                status: StatusCode::BAD_GATEWAY,
                source: serde_json::from_str::<Value>("<html>").expect_err("not json"),
            });
        }
        let code = *self.list_code.lock().await;
        if code != 0 {
            return Ok(ApiEnvelope::failure(code, "query failed"));
        }
        if *self.list_missing_data.lock().await {
            return Ok(ApiEnvelope {
                code: 0,
                message: "success".into(),
                data: None,
            });
        }

        let keyword = request.keyword.to_lowercase();
        let mut matching: Vec<ConfigRecord> = self
            .records
            .lock()
            .await
            .iter()
            .filter(|record| {
                keyword.is_empty()
                    || record.name.to_lowercase().contains(&keyword)
                    || record.url.to_lowercase().contains(&keyword)
            })
            .filter(|record| {
                request.method.is_empty() || record.method == HttpMethod::from(request.method.as_str())
            })
            .cloned()
            .collect();
        matching.sort_by(|a, b| match request.sort_field {
            SortField::Name => a.name.cmp(&b.name),
            _ => a.id.cmp(&b.id),
        });
        if request.sort_order == SortOrder::Desc {
            matching.reverse();
        }

        let total = matching.len() as u64;
        let page_size = request.page_size as usize;
        let total_pages = matching.len().div_ceil(page_size) as u32;
        let items = matching
            .into_iter()
            .skip((request.page as usize - 1) * page_size)
            .take(page_size)
            .collect();
        Ok(ApiEnvelope::ok(PageResult {
            items,
            total,
            total_pages,
            current_page: Some(request.page),
            page_size: Some(request.page_size),
        }))
    }

    async fn delete_config(&self, id: ConfigId) -> Result<ApiEnvelope<Value>, ClientError> {
        self.deletes.lock().await.push(id);
        if self.delete_code != 0 {
            return Ok(ApiEnvelope::failure(self.delete_code, "delete failed"));
        }
        self.records.lock().await.retain(|record| record.id != id);
        Ok(ApiEnvelope::ok(Value::Null))
    }

    async fn get_config(&self, id: ConfigId) -> Result<ApiEnvelope<ConfigRecord>, ClientError> {
        let records = self.records.lock().await;
        Ok(match records.iter().find(|record| record.id == id) {
            Some(record) => ApiEnvelope::ok(record.clone()),
            None => ApiEnvelope::failure(404, "config not found"),
        })
    }

    async fn add_config(&self, draft: &ConfigDraft) -> Result<ApiEnvelope<ConfigRecord>, ClientError> {
        let mut records = self.records.lock().await;
        let id = records.iter().map(|record| record.id.0).max().unwrap_or(0) + 1;
        let record = stored(ConfigId(id), draft);
        records.push(record.clone());
        Ok(ApiEnvelope::ok(record))
    }

    async fn edit_config(
        &self,
        id: ConfigId,
        draft: &ConfigDraft,
    ) -> Result<ApiEnvelope<ConfigRecord>, ClientError> {
        let mut records = self.records.lock().await;
        Ok(match records.iter_mut().find(|record| record.id == id) {
            Some(record) => {
                *record = stored(id, draft);
                ApiEnvelope::ok(record.clone())
            }
            None => ApiEnvelope::failure(404, "config not found"),
        })
    }

    async fn upload_file(
        &self,
        id: ConfigId,
        file_name: &str,
        _contents: Vec<u8>,
    ) -> Result<ApiEnvelope<UploadResult>, ClientError> {
        Ok(ApiEnvelope::ok(UploadResult {
            url: format!("https://cdn.test/{id}/{file_name}"),
        }))
    }
}

fn stored(id: ConfigId, draft: &ConfigDraft) -> ConfigRecord {
    let mut record = ConfigRecord::new(id, draft.name.clone(), draft.url.clone(), draft.method.clone());
    record.parameters = draft.parameters.clone();
    record.request_body = draft.request_body.clone();
    record.headers = draft.headers.clone();
    record.response_rule = draft.response_rule.clone();
    record
}

struct RecordingConfirmer {
    answer: bool,
    prompts: Mutex<Vec<String>>,
}

impl RecordingConfirmer {
    fn answering(answer: bool) -> Arc<Self> {
        Arc::new(Self {
            answer,
            prompts: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl Confirmer for RecordingConfirmer {
    async fn confirm(&self, prompt: &str) -> bool {
        self.prompts.lock().await.push(prompt.to_string());
        self.answer
    }
}

/// Holds the confirmation open until the test answers it.
struct GatedConfirmer {
    asked: Notify,
    answer: Notify,
}

#[async_trait]
impl Confirmer for GatedConfirmer {
    async fn confirm(&self, _prompt: &str) -> bool {
        self.asked.notify_one();
        self.answer.notified().await;
        true
    }
}

fn controller_with(
    api: Arc<FakeAdminApi>,
    confirmer: Arc<RecordingConfirmer>,
) -> ListViewController<HtmlDocument> {
    ListViewController::new(api, confirmer, HtmlDocument::new(), 10)
}

fn ids(range: impl Iterator<Item = i64>) -> Vec<ConfigId> {
    range.map(ConfigId).collect()
}

#[tokio::test]
async fn load_renders_requested_page_and_label() {
    let api = Arc::new(FakeAdminApi::with_records(25));
    let controller = controller_with(api.clone(), RecordingConfirmer::answering(true));

    let outcome = controller.load_configs(2, None, None).await;

    assert_eq!(
        outcome,
        LoadOutcome::Rendered {
            page: 2,
            rows: 10,
            total: 25,
            total_pages: 3
        }
    );
    let view = controller.view().await;
    assert_eq!(view.page_info(), "page 2 / 3 (25 total)");
    assert!(!view.prev_disabled());
    assert!(!view.next_disabled());
    assert_eq!(view.table().delete_ids, ids((6..=15).rev()));
    assert_eq!(controller.query_state().await.current_page(), 2);
}

#[tokio::test]
async fn overrides_win_over_filter_inputs() {
    let api = Arc::new(FakeAdminApi::with_records(3));
    let controller = controller_with(api.clone(), RecordingConfirmer::answering(true));
    {
        let mut view = controller.view().await;
        view.set_keyword_input("ignored");
        view.set_method_filter("GET");
    }

    controller.load_configs(2, Some("login"), Some("POST")).await;

    let requests = api.list_requests.lock().await.clone();
    assert_eq!(
        requests,
        vec![ListRequest {
            page: 2,
            page_size: 10,
            keyword: "login".into(),
            method: "POST".into(),
            sort_field: SortField::Id,
            sort_order: SortOrder::Desc,
        }]
    );
}

#[tokio::test]
async fn missing_or_empty_overrides_fall_back_to_inputs() {
    let api = Arc::new(FakeAdminApi::with_records(3));
    let controller = controller_with(api.clone(), RecordingConfirmer::answering(true));
    {
        let mut view = controller.view().await;
        view.set_keyword_input("config-02");
        view.set_method_filter("GET");
    }

    let outcome = controller.load_configs(1, None, Some("")).await;

    let request = api.list_requests.lock().await[0].clone();
    assert_eq!(request.keyword, "config-02");
    assert_eq!(request.method, "GET");
    assert_eq!(
        outcome,
        LoadOutcome::Rendered {
            page: 1,
            rows: 1,
            total: 1,
            total_pages: 1
        }
    );
    assert_eq!(controller.view().await.table().delete_ids, vec![ConfigId(2)]);
}

#[tokio::test]
async fn empty_result_renders_placeholder_only() {
    let api = Arc::new(FakeAdminApi::with_records(5));
    let controller = controller_with(api, RecordingConfirmer::answering(true));

    controller.load_configs(1, Some("no-such-config"), None).await;

    let view = controller.view().await;
    assert!(view.table().is_placeholder());
    assert_eq!(view.table().rows, 1);
    assert!(view.table().html.contains(EMPTY_PLACEHOLDER));
    assert!(!view.table().html.contains("delete-btn"));
    assert_eq!(view.page_info(), "page 1 / 0 (0 total)");
    assert!(view.prev_disabled());
    assert!(view.next_disabled());
}

#[tokio::test]
async fn non_zero_code_leaves_document_unchanged() {
    let api = Arc::new(FakeAdminApi::with_records(25));
    let controller = controller_with(api.clone(), RecordingConfirmer::answering(true));
    controller.load_configs(1, None, None).await;
    let before = controller.view().await.clone();

    *api.list_code.lock().await = 1;
    let outcome = controller.load_configs(2, None, None).await;

    assert_eq!(
        outcome,
        LoadOutcome::Rejected {
            code: 1,
            message: "query failed".into()
        }
    );
    assert_eq!(*controller.view().await, before);
    assert_eq!(controller.query_state().await.current_page(), 1);
}

#[tokio::test]
async fn transport_failure_leaves_document_unchanged() {
    let api = Arc::new(FakeAdminApi::with_records(25));
    let controller = controller_with(api.clone(), RecordingConfirmer::answering(true));
    controller.load_configs(3, None, None).await;
    let before = controller.view().await.clone();

    *api.list_transport_failure.lock().await = true;
    let outcome = controller.load_configs(1, None, None).await;

    assert!(matches!(outcome, LoadOutcome::Failed { .. }), "{outcome:?}");
    assert_eq!(*controller.view().await, before);
}

#[tokio::test]
async fn success_code_without_payload_is_a_failure_not_a_rejection() {
    let api = Arc::new(FakeAdminApi::with_records(25));
    let controller = controller_with(api.clone(), RecordingConfirmer::answering(true));
    controller.load_configs(2, None, None).await;
    let before = controller.view().await.clone();

    *api.list_missing_data.lock().await = true;
    let outcome = controller.load_configs(3, None, None).await;

    match outcome {
        LoadOutcome::Failed { reason } => {
            assert!(reason.contains("success response without data"), "{reason}")
        }
        other => panic!("unexpected outcome {other:?}"),
    }
    assert_eq!(*controller.view().await, before);
    assert_eq!(controller.query_state().await.current_page(), 2);
}

#[tokio::test]
async fn header_clicks_toggle_sort_and_restart_at_first_page() {
    let api = Arc::new(FakeAdminApi::with_records(25));
    let controller = controller_with(api.clone(), RecordingConfirmer::answering(true));
    controller.load_configs(3, None, None).await;

    let sort_of = |request: &ListRequest| (request.page, request.sort_field, request.sort_order);

    controller
        .handle_event(ViewEvent::HeaderClicked {
            field: Some("id".into()),
        })
        .await;
    controller
        .handle_event(ViewEvent::HeaderClicked {
            field: Some("id".into()),
        })
        .await;
    controller
        .handle_event(ViewEvent::HeaderClicked {
            field: Some("name".into()),
        })
        .await;

    let requests = api.list_requests.lock().await.clone();
    let seen: Vec<_> = requests.iter().skip(1).map(sort_of).collect();
    assert_eq!(
        seen,
        vec![
            (1, SortField::Id, SortOrder::Asc),
            (1, SortField::Id, SortOrder::Desc),
            (1, SortField::Name, SortOrder::Asc),
        ]
    );
    assert_eq!(controller.query_state().await.current_page(), 1);
}

#[tokio::test]
async fn headers_without_sortable_field_are_ignored() {
    let api = Arc::new(FakeAdminApi::with_records(5));
    let controller = controller_with(api.clone(), RecordingConfirmer::answering(true));

    let unmarked = controller
        .handle_event(ViewEvent::HeaderClicked { field: None })
        .await;
    let unknown = controller
        .handle_event(ViewEvent::HeaderClicked {
            field: Some("url".into()),
        })
        .await;

    assert_eq!(unmarked, EventOutcome::Ignored);
    assert_eq!(unknown, EventOutcome::Ignored);
    assert!(api.list_requests.lock().await.is_empty());
}

#[tokio::test]
async fn enter_and_filter_change_reload_first_page() {
    let api = Arc::new(FakeAdminApi::with_records(25));
    let controller = controller_with(api.clone(), RecordingConfirmer::answering(true));
    controller.load_configs(2, None, None).await;
    controller.view().await.set_keyword_input("config-1");

    let typed = controller
        .handle_event(ViewEvent::KeywordKeyPressed(Key::Char('1')))
        .await;
    assert_eq!(typed, EventOutcome::Ignored);

    controller
        .handle_event(ViewEvent::KeywordKeyPressed(Key::Enter))
        .await;
    controller.view().await.set_method_filter("POST");
    controller.handle_event(ViewEvent::MethodFilterChanged).await;

    let requests = api.list_requests.lock().await.clone();
    assert_eq!(requests.len(), 3);
    assert_eq!((requests[1].page, requests[1].keyword.as_str()), (1, "config-1"));
    assert_eq!((requests[2].page, requests[2].method.as_str()), (1, "POST"));
    assert_eq!(
        controller.view().await.table().delete_ids,
        ids([19, 17, 15, 13, 11].into_iter())
    );
}

#[tokio::test]
async fn pagination_controls_respect_boundaries() {
    let api = Arc::new(FakeAdminApi::with_records(25));
    let controller = controller_with(api.clone(), RecordingConfirmer::answering(true));

    assert_eq!(
        controller.handle_event(ViewEvent::NextPage).await,
        EventOutcome::Ignored
    );

    controller.load_configs(1, None, None).await;
    assert_eq!(
        controller.handle_event(ViewEvent::PrevPage).await,
        EventOutcome::Ignored
    );
    controller.handle_event(ViewEvent::NextPage).await;
    controller.handle_event(ViewEvent::NextPage).await;
    assert_eq!(
        controller.handle_event(ViewEvent::NextPage).await,
        EventOutcome::Ignored
    );
    controller.handle_event(ViewEvent::PrevPage).await;

    assert_eq!(api.requested_pages().await, vec![1, 2, 3, 2]);
    assert_eq!(controller.view().await.page_info(), "page 2 / 3 (25 total)");
}

#[tokio::test]
async fn confirmed_delete_calls_once_then_reloads_current_page() {
    let api = Arc::new(FakeAdminApi::with_records(25));
    let confirmer = RecordingConfirmer::answering(true);
    let controller = controller_with(api.clone(), confirmer.clone());
    controller.load_configs(2, None, None).await;

    let outcome = controller
        .handle_event(ViewEvent::DeleteClicked { id: ConfigId(10) })
        .await;

    assert_eq!(
        outcome,
        EventOutcome::Delete(DeleteOutcome::Completed {
            id: ConfigId(10),
            failure: None,
            reload: LoadOutcome::Rendered {
                page: 2,
                rows: 10,
                total: 24,
                total_pages: 3
            },
        })
    );
    assert_eq!(*confirmer.prompts.lock().await, vec![DELETE_PROMPT.to_string()]);
    assert_eq!(*api.deletes.lock().await, vec![ConfigId(10)]);
    assert_eq!(api.requested_pages().await, vec![2, 2]);
    assert!(!controller.view().await.has_delete_target(ConfigId(10)));
}

#[tokio::test]
async fn delete_reloads_page_shown_at_click_even_if_another_page_rendered_meanwhile() {
    let api = Arc::new(FakeAdminApi::with_records(25));
    let confirmer = Arc::new(GatedConfirmer {
        asked: Notify::new(),
        answer: Notify::new(),
    });
    let controller = ListViewController::new(api.clone(), confirmer.clone(), HtmlDocument::new(), 10);
    controller.load_configs(3, None, None).await;

    let (outcome, meanwhile) = futures::join!(
        controller.handle_event(ViewEvent::DeleteClicked { id: ConfigId(3) }),
        async {
            confirmer.asked.notified().await;
            let outcome = controller.load_configs(1, None, None).await;
            confirmer.answer.notify_one();
            outcome
        }
    );

    assert!(matches!(meanwhile, LoadOutcome::Rendered { page: 1, .. }), "{meanwhile:?}");
    assert_eq!(
        outcome,
        EventOutcome::Delete(DeleteOutcome::Completed {
            id: ConfigId(3),
            failure: None,
            reload: LoadOutcome::Rendered {
                page: 3,
                rows: 4,
                total: 24,
                total_pages: 3
            },
        })
    );
    assert_eq!(api.requested_pages().await, vec![3, 1, 3]);
    assert_eq!(controller.query_state().await.current_page(), 3);
}

#[tokio::test]
async fn declined_delete_issues_no_calls() {
    let api = Arc::new(FakeAdminApi::with_records(25));
    let controller = controller_with(api.clone(), RecordingConfirmer::answering(false));
    controller.load_configs(1, None, None).await;

    let outcome = controller
        .handle_event(ViewEvent::DeleteClicked { id: ConfigId(25) })
        .await;

    assert_eq!(outcome, EventOutcome::Delete(DeleteOutcome::Declined));
    assert!(api.deletes.lock().await.is_empty());
    assert_eq!(api.requested_pages().await, vec![1]);
}

#[tokio::test]
async fn failed_delete_still_reloads() {
    let api = Arc::new(FakeAdminApi::with_records(25).failing_deletes(500));
    let controller = controller_with(api.clone(), RecordingConfirmer::answering(true));
    controller.load_configs(1, None, None).await;

    let outcome = controller
        .handle_event(ViewEvent::DeleteClicked { id: ConfigId(25) })
        .await;

    let (failure, reload) = match outcome {
        EventOutcome::Delete(DeleteOutcome::Completed {
            failure, reload, ..
        }) => (failure, reload),
        other => panic!("unexpected outcome {other:?}"),
    };
    assert_eq!(failure.as_deref(), Some("code 500: delete failed"));
    assert!(matches!(reload, LoadOutcome::Rendered { total: 25, .. }));
    assert_eq!(api.requested_pages().await, vec![1, 1]);
    assert!(controller.view().await.has_delete_target(ConfigId(25)));
}

#[tokio::test]
async fn delete_click_for_unrendered_row_is_ignored() {
    let api = Arc::new(FakeAdminApi::with_records(25));
    let confirmer = RecordingConfirmer::answering(true);
    let controller = controller_with(api.clone(), confirmer.clone());
    controller.load_configs(1, None, None).await;

    let outcome = controller
        .handle_event(ViewEvent::DeleteClicked { id: ConfigId(1) })
        .await;

    assert_eq!(outcome, EventOutcome::Ignored);
    assert!(confirmer.prompts.lock().await.is_empty());
    assert!(api.deletes.lock().await.is_empty());
}

#[tokio::test]
async fn deleting_last_row_of_last_page_lands_on_new_last_page() {
    let api = Arc::new(FakeAdminApi::with_records(21));
    let controller = controller_with(api.clone(), RecordingConfirmer::answering(true));
    controller.load_configs(3, None, None).await;
    assert_eq!(controller.view().await.table().delete_ids, vec![ConfigId(1)]);

    let outcome = controller
        .handle_event(ViewEvent::DeleteClicked { id: ConfigId(1) })
        .await;

    let reload = match outcome {
        EventOutcome::Delete(DeleteOutcome::Completed { reload, .. }) => reload,
        other => panic!("unexpected outcome {other:?}"),
    };
    assert_eq!(
        reload,
        LoadOutcome::Rendered {
            page: 2,
            rows: 10,
            total: 20,
            total_pages: 2
        }
    );
    assert_eq!(api.requested_pages().await, vec![3, 3, 2]);
    let view = controller.view().await;
    assert_eq!(view.page_info(), "page 2 / 2 (20 total)");
    assert!(view.next_disabled());
}

#[tokio::test]
async fn stale_response_does_not_overwrite_newer_render() {
    let api = Arc::new(FakeAdminApi::with_records(25).gating_page(1));
    let controller = controller_with(api.clone(), RecordingConfirmer::answering(true));

    let (slow, fast) = futures::join!(controller.load_configs(1, None, None), async {
        let outcome = controller.load_configs(2, None, None).await;
        api.release_gate();
        outcome
    });

    assert!(matches!(slow, LoadOutcome::Stale { .. }), "{slow:?}");
    assert!(matches!(fast, LoadOutcome::Rendered { page: 2, .. }), "{fast:?}");
    let view = controller.view().await;
    assert_eq!(view.page_info(), "page 2 / 3 (25 total)");
    assert_eq!(view.table_renders(), 1);
    assert_eq!(controller.query_state().await.current_page(), 2);
}
