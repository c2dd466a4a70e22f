//! Integration tests for fetching, searching and the HTTP surface
//!
//! These tests use wiremock to serve a tiny wiki and its MediaWiki
//! backlinks API, then run searches against it end-to-end.

use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use wiki_race::config::{Config, FetcherConfig, SearchConfig};
use wiki_race::fetcher::{LinkSource, PageFetcher, TextSource};
use wiki_race::search::{SearchOutcome, Strategy};
use wiki_race::server::{router, serve_on, AppState};
use wiki_race::session::{PollResult, SearchRequest, SessionRegistry, SessionState};
use wiki_race::{EventLog, Page};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Article pattern admitting `/wiki/` pages on the mock server
const MOCK_ARTICLES: &str = r"^http://127\.0\.0\.1:\d+/wiki/[^:]*$";

/// Creates a config pointing the fetcher at the mock wiki
fn create_test_config(server: &MockServer) -> Config {
    Config {
        fetcher: FetcherConfig {
            request_timeout_secs: 5,
            connect_timeout_secs: 5,
            article_pattern: MOCK_ARTICLES.to_string(),
            backlinks_api: Some(format!("{}/w/api.php", server.uri())),
            ..FetcherConfig::default()
        },
        search: SearchConfig {
            max_duration_secs: 30,
            ..SearchConfig::default()
        },
        ..Config::default()
    }
}

fn page(server: &MockServer, title: &str) -> Page {
    Page::parse(&format!("{}/wiki/{}", server.uri(), title)).expect("Failed to parse page")
}

/// Serves an article whose body mentions `words` and links to `links`
async fn mount_article(server: &MockServer, title: &str, words: &str, links: &[&str]) {
    let anchors: String = links
        .iter()
        .map(|link| format!(r#"<a href="/wiki/{}">{}</a> "#, link, link))
        .collect();
    let body = format!(
        "<html><head><title>{}</title></head><body><p>{}</p><p>{}</p></body></html>",
        title, words, anchors
    );

    Mock::given(method("GET"))
        .and(path(format!("/wiki/{}", title)))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/html"))
        .mount(server)
        .await;
}

/// Serves the backlinks of `title` through the MediaWiki API
async fn mount_backlinks(server: &MockServer, title: &str, linking: &[&str]) {
    let backlinks: Vec<Value> = linking
        .iter()
        .enumerate()
        .map(|(id, title)| serde_json::json!({ "pageid": id, "ns": 0, "title": title }))
        .collect();

    Mock::given(method("GET"))
        .and(path("/w/api.php"))
        .and(query_param("list", "backlinks"))
        .and(query_param("bltitle", title))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "query": { "backlinks": backlinks } })),
        )
        .mount(server)
        .await;
}

/// Start -> Alpha -> Finish, Start -> Beta (dead end), Island isolated
async fn mount_small_wiki(server: &MockServer) {
    mount_article(
        server,
        "Start",
        "rivers rivers lakes lakes",
        &["Alpha", "Beta", "File:Map.png"],
    )
    .await;
    mount_article(
        server,
        "Alpha",
        "ocean ocean water water",
        &["Finish", "Start"],
    )
    .await;
    mount_article(server, "Beta", "engines engines pistons pistons", &[]).await;
    mount_article(
        server,
        "Finish",
        "ocean ocean water water tides tides",
        &[],
    )
    .await;

    mount_backlinks(server, "Finish", &["Alpha"]).await;
    mount_backlinks(server, "Alpha", &["Start"]).await;
}

fn registry_for(server: &MockServer) -> SessionRegistry {
    let config = create_test_config(server);
    SessionRegistry::from_config(&config, EventLog::new(256)).expect("Failed to create registry")
}

async fn wait(registry: &SessionRegistry, id: &uuid::Uuid) -> PollResult {
    tokio::time::timeout(Duration::from_secs(10), async {
        loop {
            match registry.poll(id) {
                PollResult::Pending(_) => tokio::time::sleep(Duration::from_millis(10)).await,
                other => return other,
            }
        }
    })
    .await
    .expect("Search did not finish in time")
}

#[tokio::test]
async fn test_fetcher_filters_and_counts_links() {
    let server = MockServer::start().await;
    mount_small_wiki(&server).await;

    let events = EventLog::new(64);
    let fetcher = PageFetcher::from_config(&create_test_config(&server), events.clone())
        .expect("Failed to create fetcher");

    let links = fetcher.links(&page(&server, "Start")).await;
    assert_eq!(
        links.pages(),
        &[page(&server, "Alpha"), page(&server, "Beta")]
    );
    assert_eq!(links.valid_count(), 2);
    assert_eq!(links.total_count(), 3);

    let (backlog, _) = events.subscribe();
    let messages: Vec<_> = backlog.iter().map(|e| e.message.as_str()).collect();
    assert!(messages
        .iter()
        .any(|m| m.starts_with("Found 2 valid links on page:")));
    assert!(messages
        .iter()
        .any(|m| m.starts_with("Found 3 total links on page:")));
}

#[tokio::test]
async fn test_cached_links_avoid_second_request() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/wiki/Cached"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(r#"<p><a href="/wiki/Other">x</a></p>"#, "text/html"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = PageFetcher::from_config(&create_test_config(&server), EventLog::new(16))
        .expect("Failed to create fetcher");

    let first = fetcher.links(&page(&server, "Cached")).await;
    let second = fetcher.links(&page(&server, "Cached")).await;

    assert_eq!(first, second);
    assert_eq!(fetcher.network_fetches(), 1);
    assert_eq!(fetcher.cache().len(), 1);
}

#[tokio::test]
async fn test_text_shares_the_page_download() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/wiki/Shared"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            r#"<p>glaciers glaciers ice ice</p><p><a href="/wiki/Other">x</a></p>"#,
            "text/html",
        ))
        .expect(1)
        .mount(&server)
        .await;

    let events = EventLog::new(64);
    let fetcher = PageFetcher::from_config(&create_test_config(&server), events.clone())
        .expect("Failed to create fetcher");
    let shared = page(&server, "Shared");

    let links = fetcher.links(&shared).await;
    let first = fetcher.text(&shared).await.expect("Shared should have text");
    let second = fetcher.text(&shared).await.expect("Shared should have text");

    assert_eq!(links.valid_count(), 1);
    assert!(first.contains("glaciers"));
    assert_eq!(first, second);
    assert_eq!(fetcher.network_fetches(), 1);

    // Cache hits do not repeat the per-fetch counts
    let (backlog, _) = events.subscribe();
    let counted = backlog
        .iter()
        .filter(|e| e.message.starts_with("Found 1 valid links on page:"))
        .count();
    assert_eq!(counted, 1);
}

#[tokio::test]
async fn test_text_first_then_links_is_one_download() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/wiki/Shared"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            r#"<p>glaciers glaciers <a href="/wiki/Other">x</a></p>"#,
            "text/html",
        ))
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = PageFetcher::from_config(&create_test_config(&server), EventLog::new(16))
        .expect("Failed to create fetcher");
    let shared = page(&server, "Shared");

    assert!(fetcher.text(&shared).await.is_some());
    assert_eq!(fetcher.links(&shared).await.valid_count(), 1);
    assert_eq!(fetcher.network_fetches(), 1);
    assert_eq!(fetcher.text_cache().len(), 1);
}

#[tokio::test]
async fn test_failed_fetch_is_a_dead_end() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/wiki/Missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let events = EventLog::new(16);
    let fetcher = PageFetcher::from_config(&create_test_config(&server), events.clone())
        .expect("Failed to create fetcher");

    let links = fetcher.links(&page(&server, "Missing")).await;
    assert!(links.is_empty());
    assert!(fetcher.text(&page(&server, "Missing")).await.is_none());

    let (backlog, _) = events.subscribe();
    assert!(backlog
        .iter()
        .any(|e| e.message.contains("with error [DeadLink]")));

    // Failures are not cached
    assert!(fetcher.cache().is_empty());
}

#[tokio::test]
async fn test_non_html_is_a_dead_end() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/wiki/Data"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("{}", "application/json"))
        .mount(&server)
        .await;

    let events = EventLog::new(16);
    let fetcher = PageFetcher::from_config(&create_test_config(&server), events.clone())
        .expect("Failed to create fetcher");

    assert!(fetcher.links(&page(&server, "Data")).await.is_empty());
    let (backlog, _) = events.subscribe();
    assert!(backlog
        .iter()
        .any(|e| e.message.contains("[ContentMismatch]")));
}

#[tokio::test]
async fn test_backlinks_through_api() {
    let server = MockServer::start().await;
    mount_backlinks(&server, "Finish", &["Alpha", "Talk:Finish", "Gamma ray"]).await;

    let fetcher = PageFetcher::from_config(&create_test_config(&server), EventLog::new(16))
        .expect("Failed to create fetcher");

    let backlinks = fetcher.backlinks(&page(&server, "Finish")).await;
    assert_eq!(
        backlinks.pages(),
        &[page(&server, "Alpha"), page(&server, "Gamma_ray")]
    );
    assert_eq!(backlinks.total_count(), 3);
}

#[tokio::test]
async fn test_text_comes_from_paragraphs() {
    let server = MockServer::start().await;
    mount_small_wiki(&server).await;

    let fetcher = PageFetcher::from_config(&create_test_config(&server), EventLog::new(16))
        .expect("Failed to create fetcher");

    let text = fetcher
        .text(&page(&server, "Finish"))
        .await
        .expect("Finish should have text");
    assert!(text.contains("tides"));
    assert!(!text.contains("<p>"));
}

#[tokio::test]
async fn test_every_strategy_over_mock_wiki() {
    let server = MockServer::start().await;
    mount_small_wiki(&server).await;
    let registry = registry_for(&server);

    for strategy in Strategy::ALL {
        let id = registry.start(SearchRequest::new(
            page(&server, "Start"),
            page(&server, "Finish"),
            strategy,
        ));

        match wait(&registry, &id).await {
            PollResult::Ready { state, result } => {
                assert_eq!(state, SessionState::Completed, "{}", strategy);
                assert_eq!(result.strategy, strategy);
                assert_eq!(
                    result.path,
                    Some(vec![
                        page(&server, "Start"),
                        page(&server, "Alpha"),
                        page(&server, "Finish"),
                    ]),
                    "{}",
                    strategy
                );
                assert!(result.total_links > 0);
            }
            other => panic!("{}: unexpected poll result {:?}", strategy, other),
        }
    }
}

#[tokio::test]
async fn test_unreachable_finish_is_exhausted() {
    let server = MockServer::start().await;
    mount_small_wiki(&server).await;
    mount_article(&server, "Island", "sand sand", &[]).await;
    let registry = registry_for(&server);

    let id = registry.start(SearchRequest::new(
        page(&server, "Start"),
        page(&server, "Island"),
        Strategy::BreadthFirst,
    ));

    match wait(&registry, &id).await {
        PollResult::Ready { state, result } => {
            assert_eq!(state, SessionState::Exhausted);
            assert_eq!(result.outcome, SearchOutcome::Exhausted);
            assert!(result.path.is_none());
            // Start, Alpha, Beta, Finish
            assert_eq!(result.discovered, 4);
        }
        other => panic!("unexpected poll result {:?}", other),
    }
}

/// Spawns the HTTP surface on an ephemeral port
async fn spawn_app(registry: Arc<SessionRegistry>, static_dir: Option<&std::path::Path>) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind");
    let addr = listener.local_addr().expect("Failed to read address");
    let app = router(AppState::new(registry), static_dir);
    tokio::spawn(serve_on(listener, app, std::future::pending()));
    format!("http://{}", addr)
}

#[tokio::test]
async fn test_http_find_poll_and_consume() {
    let server = MockServer::start().await;
    mount_small_wiki(&server).await;
    let base = spawn_app(Arc::new(registry_for(&server)), None).await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{}/find_path", base))
        .json(&serde_json::json!({
            "start": format!("{}/wiki/Start", server.uri()),
            "finish": format!("{}/wiki/Finish", server.uri()),
            "method": "bidirectional",
        }))
        .send()
        .await
        .expect("Request failed");
    assert_eq!(response.status(), 202);
    let body: Value = response.json().await.expect("Invalid JSON");
    assert_eq!(body["message"], "Search started");
    let search_id = body["search_id"].as_str().expect("Missing search_id").to_string();

    let result = tokio::time::timeout(Duration::from_secs(10), async {
        loop {
            let response = client
                .get(format!("{}/get_results/{}", base, search_id))
                .send()
                .await
                .expect("Request failed");
            match response.status().as_u16() {
                200 => return response.json::<Value>().await.expect("Invalid JSON"),
                202 => tokio::time::sleep(Duration::from_millis(20)).await,
                status => panic!("unexpected status {}", status),
            }
        }
    })
    .await
    .expect("Search did not finish in time");

    assert_eq!(result["completed"], true);
    assert_eq!(result["path_length"], 3);
    assert_eq!(result["search_method"], "bidirectional");
    assert_eq!(result["state"], "completed");
    assert!(result["error"].is_null());
    assert!(result["time"].as_f64().is_some());
    assert!(result["discovered"].as_u64().is_some());
    assert!(result["total_links"].as_u64().is_some());

    // Results are consumed by the first successful read
    let again = client
        .get(format!("{}/get_results/{}", base, search_id))
        .send()
        .await
        .expect("Request failed");
    assert_eq!(again.status(), 404);
}

#[tokio::test]
async fn test_http_rejects_bad_requests() {
    let server = MockServer::start().await;
    let base = spawn_app(Arc::new(registry_for(&server)), None).await;
    let client = reqwest::Client::new();

    let missing = client
        .post(format!("{}/find_path", base))
        .json(&serde_json::json!({ "start": format!("{}/wiki/Start", server.uri()) }))
        .send()
        .await
        .expect("Request failed");
    assert_eq!(missing.status(), 400);
    let body: Value = missing.json().await.expect("Invalid JSON");
    assert!(body["message"].as_str().unwrap_or_default().contains("start"));

    let unknown_method = client
        .post(format!("{}/find_path", base))
        .json(&serde_json::json!({
            "start": format!("{}/wiki/Start", server.uri()),
            "finish": format!("{}/wiki/Finish", server.uri()),
            "method": "depth-first",
        }))
        .send()
        .await
        .expect("Request failed");
    assert_eq!(unknown_method.status(), 400);

    let no_body = client
        .post(format!("{}/find_path", base))
        .send()
        .await
        .expect("Request failed");
    assert_eq!(no_body.status(), 400);

    let unknown = client
        .get(format!("{}/get_results/{}", base, uuid::Uuid::new_v4()))
        .send()
        .await
        .expect("Request failed");
    assert_eq!(unknown.status(), 404);

    let garbage = client
        .get(format!("{}/get_results/not-a-uuid", base))
        .send()
        .await
        .expect("Request failed");
    assert_eq!(garbage.status(), 404);
}

#[tokio::test]
async fn test_http_abort() {
    let server = MockServer::start().await;
    // Every article links onward to one more, slowly
    for n in 0..50 {
        Mock::given(method("GET"))
            .and(path(format!("/wiki/P{}", n)))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw(format!(r#"<p><a href="/wiki/P{}">next</a></p>"#, n + 1), "text/html")
                    .set_delay(Duration::from_millis(50)),
            )
            .mount(&server)
            .await;
    }

    let registry = Arc::new(registry_for(&server));
    let base = spawn_app(Arc::clone(&registry), None).await;
    let client = reqwest::Client::new();

    let id = registry.start(SearchRequest::new(
        page(&server, "P0"),
        page(&server, "Nowhere"),
        Strategy::BreadthFirst,
    ));
    tokio::time::sleep(Duration::from_millis(120)).await;

    let response = client
        .post(format!("{}/abort_search", base))
        .json(&serde_json::json!({ "search_id": id }))
        .send()
        .await
        .expect("Request failed");
    assert_eq!(response.status(), 200);

    match wait(&registry, &id).await {
        PollResult::Ready { state, result } => {
            assert_eq!(state, SessionState::Aborted);
            assert_eq!(result.outcome, SearchOutcome::Cancelled);
        }
        other => panic!("unexpected poll result {:?}", other),
    }

    // Aborting an unknown search is reported as such
    let unknown = client
        .post(format!("{}/abort_search", base))
        .json(&serde_json::json!({ "search_id": uuid::Uuid::new_v4() }))
        .send()
        .await
        .expect("Request failed");
    assert_eq!(unknown.status(), 404);

    // A global abort always succeeds
    let global = client
        .post(format!("{}/abort_search", base))
        .send()
        .await
        .expect("Request failed");
    assert_eq!(global.status(), 200);
    let body: Value = global.json().await.expect("Invalid JSON");
    assert_eq!(body["message"], "Search abort initiated");
}

#[tokio::test]
async fn test_http_log_stream_replays_backlog() {
    let server = MockServer::start().await;
    mount_small_wiki(&server).await;
    let registry = Arc::new(registry_for(&server));
    let base = spawn_app(Arc::clone(&registry), None).await;

    let id = registry.start(SearchRequest::new(
        page(&server, "Start"),
        page(&server, "Finish"),
        Strategy::BreadthFirst,
    ));
    wait(&registry, &id).await;

    let mut response = reqwest::get(format!("{}/logs", base))
        .await
        .expect("Request failed");
    assert_eq!(response.status(), 200);
    assert!(response
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .starts_with("text/event-stream"));

    let mut received = String::new();
    tokio::time::timeout(Duration::from_secs(5), async {
        while !received.contains("Path found") {
            match response.chunk().await.expect("Stream failed") {
                Some(chunk) => received.push_str(&String::from_utf8_lossy(&chunk)),
                None => break,
            }
        }
    })
    .await
    .expect("Log stream stalled");

    assert!(received.contains("data: Search"));
    assert!(received.contains("Path found"));
}

#[tokio::test]
async fn test_static_client_is_served() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    std::fs::write(dir.path().join("index.html"), "<h1>Wiki Race</h1>")
        .expect("Failed to write index");

    let base = spawn_app(Arc::new(registry_for(&server)), Some(dir.path())).await;

    let body = reqwest::get(format!("{}/", base))
        .await
        .expect("Request failed")
        .text()
        .await
        .expect("Failed to read body");
    assert!(body.contains("Wiki Race"));
}
