use std::sync::Once;
use std::time::Duration;

use miner_engine::{
    CatalogPaginator, Crawler, FailureKind, FetchSettings, FinishedWork, PoolSettings,
    ReqwestFetcher, SpawnError, Spawner, UnitStatus, WorkUnit, WorkerHandle, WorkerPool,
    MAX_PAGE_COUNT,
};
use pretty_assertions::assert_eq;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Workers that finish on the first poll; `fail-` slugs exit unsuccessfully.
struct InstantSpawner;

struct InstantHandle(String);

impl Spawner for InstantSpawner {
    type Handle = InstantHandle;

    fn start(&mut self, unit: &WorkUnit) -> Result<InstantHandle, SpawnError> {
        Ok(InstantHandle(unit.id.clone()))
    }
}

impl WorkerHandle for InstantHandle {
    fn is_running(&mut self) -> bool {
        false
    }

    fn kill(&mut self) {}

    fn finish(self) -> FinishedWork {
        FinishedWork {
            success: !self.0.starts_with("fail-"),
            message: String::new(),
            output: String::new(),
        }
    }
}

fn listing(slugs: &[&str]) -> String {
    let items: String = slugs
        .iter()
        .map(|slug| format!(r#"<div class="list-pages-item"><p><a href="/{slug}">{slug}</a></p></div>"#))
        .collect();
    format!("<html><body>{items}</body></html>")
}

async fn mount_page(server: &MockServer, page: u32, template: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(format!("/helms/p/{page}")))
        .respond_with(template)
        .mount(server)
        .await;
}

fn crawler(server: &MockServer) -> Crawler<ReqwestFetcher, InstantSpawner> {
    let paginator = CatalogPaginator::new(
        ReqwestFetcher::new(FetchSettings::default()).expect("http client"),
        server.uri(),
        "helms",
    );
    let pool = WorkerPool::new(
        InstantSpawner,
        PoolSettings {
            max_concurrency: 2,
            poll_interval: Duration::from_millis(1),
            unit_timeout: Duration::from_secs(5),
        },
    );
    Crawler::new(paginator, pool)
}

static INIT: Once = Once::new();

fn init_logging() {
    INIT.call_once(miner_logging::initialize_for_tests);
}

#[tokio::test]
async fn failed_page_is_skipped_and_the_rest_still_runs() {
    init_logging();
    let server = MockServer::start().await;
    for page in 1..=5u32 {
        let template = if page == 2 {
            ResponseTemplate::new(500)
        } else {
            let a = format!("helm-{page}-a");
            let b = format!("helm-{page}-b");
            ResponseTemplate::new(200).set_body_raw(listing(&[&a, &b]), "text/html")
        };
        mount_page(&server, page, template).await;
    }

    let summary = crawler(&server).run(5).await;

    assert_eq!(summary.item_type, "helms");
    assert_eq!(summary.pages_requested, 5);
    assert_eq!(summary.pages_processed, 4);
    assert_eq!(summary.failed_pages.len(), 1);
    assert_eq!(summary.failed_pages[0].page, 2);
    assert_eq!(summary.failed_pages[0].error.kind, FailureKind::HttpStatus(500));
    assert_eq!(summary.units_discovered, 8);
    assert_eq!(summary.pool.succeeded, 8);
    assert!(!summary.is_success());

    let ids: Vec<&str> = summary.pool.units.iter().map(|u| u.id.as_str()).collect();
    assert!(ids.contains(&"helm-5-b"));
    assert!(!ids.iter().any(|id| id.starts_with("helm-2")));
}

#[tokio::test]
async fn zero_pages_is_an_empty_success() {
    let server = MockServer::start().await;
    let summary = crawler(&server).run(0).await;

    assert_eq!(summary.pages_processed, 0);
    assert_eq!(summary.units_discovered, 0);
    assert_eq!(summary.pool.total(), 0);
    assert!(summary.is_success());
    assert!(server.received_requests().await.unwrap_or_default().is_empty());
}

#[tokio::test]
async fn page_count_is_capped() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(listing(&[]), "text/html"))
        .mount(&server)
        .await;

    let summary = crawler(&server).run(45).await;

    assert_eq!(summary.pages_requested, 45);
    assert_eq!(summary.pages_processed, MAX_PAGE_COUNT);
    let requests = server.received_requests().await.unwrap_or_default();
    assert_eq!(requests.len(), MAX_PAGE_COUNT as usize);
    assert!(summary.is_success());
}

#[tokio::test]
async fn unit_failures_mark_the_crawl_unsuccessful() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        1,
        ResponseTemplate::new(200).set_body_raw(listing(&["ok-helm", "fail-helm"]), "text/html"),
    )
    .await;

    let summary = crawler(&server).run(1).await;
    assert_eq!(summary.pool.failed, 1);
    let failed = summary.pool.units.iter().find(|u| u.id == "fail-helm").unwrap();
    assert_eq!(failed.status, UnitStatus::Failed);
    assert!(!summary.is_success());
}
