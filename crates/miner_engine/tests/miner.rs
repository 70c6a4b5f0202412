use std::fs;

use miner_engine::{
    DocumentStore, FailureKind, FetchSettings, ItemDocument, ItemMiner, MineError, MineOutcome,
    ReqwestFetcher, UNKNOWN_TYPE,
};
use pretty_assertions::assert_eq;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ITEM_PAGE: &str = r#"
<html><body>
  <div id="breadcrumbs"><a href="/">Home</a> <a href="/capes">Capes &amp; Back Items</a></div>
  <div id="page-title">Cape of Awe</div>
  <p><strong>Description:</strong> Flaps majestically.<br/></p>
</body></html>
"#;

async fn serve(body: &str, slug: &str) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/{slug}")))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body.to_string(), "text/html"))
        .mount(&server)
        .await;
    server
}

fn miner(server: &MockServer, root: &std::path::Path) -> ItemMiner<ReqwestFetcher> {
    ItemMiner::new(
        ReqwestFetcher::new(FetchSettings::default()).expect("http client"),
        DocumentStore::new(root),
        server.uri(),
    )
}

#[tokio::test]
async fn mining_twice_writes_one_document() {
    let server = serve(ITEM_PAGE, "cape-of-awe").await;
    let temp = TempDir::new().unwrap();
    let miner = miner(&server, temp.path());

    let first = miner.mine("cape-of-awe").await.expect("first mine");
    let MineOutcome::Written { path, document } = first else {
        panic!("expected a fresh write, got {first:?}");
    };
    assert_eq!(document.kind, "capes_&_back_items");
    assert_eq!(path, temp.path().join("capes_&_back_items").join(format!("{}.json", document.hash)));

    let stored: ItemDocument = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(stored, document);
    assert_eq!(stored.url, format!("{}/cape-of-awe", server.uri()));
    assert_eq!(stored.description.as_deref(), Some("Flaps majestically."));

    let second = miner.mine("cape-of-awe").await.expect("second mine");
    assert_eq!(second, MineOutcome::AlreadyExists { path: path.clone() });

    let files = fs::read_dir(temp.path().join("capes_&_back_items"))
        .unwrap()
        .count();
    assert_eq!(files, 1);
}

#[tokio::test]
async fn page_without_breadcrumbs_goes_to_unknown() {
    let server = serve("<html><div id=\"page-title\">Odd</div></html>", "odd").await;
    let temp = TempDir::new().unwrap();

    let outcome = miner(&server, temp.path()).mine("odd").await.unwrap();
    assert!(matches!(outcome, MineOutcome::Written { .. }));
    assert!(temp.path().join(UNKNOWN_TYPE).is_dir());
}

#[tokio::test]
async fn failed_fetch_writes_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    let temp = TempDir::new().unwrap();

    let err = miner(&server, temp.path()).mine("gone").await.unwrap_err();
    match err {
        MineError::Fetch(fetch) => assert_eq!(fetch.kind, FailureKind::HttpStatus(500)),
        other => panic!("unexpected error {other:?}"),
    }
    assert_eq!(fs::read_dir(temp.path()).unwrap().count(), 0);
}
