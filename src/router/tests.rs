use super::*;
use crate::error::SiteErrorStatus;
use crate::route::{Params, RouteLoader};

use std::collections::HashMap;
use std::rc::Weak;

use tokio::sync::oneshot;

// =========================================================
// Test doubles
// =========================================================

#[derive(Default)]
struct MockBrowser {
    location: RefCell<String>,
    history: RefCell<Vec<String>>,
    title: RefCell<Option<String>>,
    attributes: RefCell<HashMap<String, String>>,
    regions: RefCell<HashMap<String, String>>,
    missing_regions: RefCell<Vec<String>>,
    scrolls: Cell<usize>,
}

impl MockBrowser {
    fn at(path: &str) -> Self {
        let browser = Self::default();
        *browser.location.borrow_mut() = path.to_string();
        browser
    }

    fn region(&self, id: &str) -> Option<String> {
        self.regions.borrow().get(id).cloned()
    }

    fn history(&self) -> Vec<String> {
        self.history.borrow().clone()
    }
}

impl Browser for MockBrowser {
    fn current_path(&self) -> String {
        self.location.borrow().clone()
    }

    fn push_history(&self, path: &str) {
        *self.location.borrow_mut() = path.to_string();
        self.history.borrow_mut().push(path.to_string());
    }

    fn set_title(&self, title: &str) {
        *self.title.borrow_mut() = Some(title.to_string());
    }

    fn set_body_attribute(&self, name: &str, value: &str) {
        self.attributes
            .borrow_mut()
            .insert(name.to_string(), value.to_string());
    }

    fn set_region_html(&self, id: &str, html: &str) -> bool {
        if self.missing_regions.borrow().iter().any(|r| r == id) {
            return false;
        }
        self.regions
            .borrow_mut()
            .insert(id.to_string(), html.to_string());
        true
    }

    fn scroll_to_top(&self) {
        self.scrolls.set(self.scrolls.get() + 1);
    }
}

/// Loader that records the params it was called with
struct RecordingLoader {
    payload: ContentPayload,
    calls: RefCell<Vec<Params>>,
}

impl RecordingLoader {
    fn new(payload: ContentPayload) -> Rc<Self> {
        Rc::new(Self {
            payload,
            calls: RefCell::new(Vec::new()),
        })
    }
}

#[async_trait::async_trait(?Send)]
impl RouteLoader for RecordingLoader {
    async fn load(&self, params: &Params) -> SiteResult<ContentPayload> {
        self.calls.borrow_mut().push(params.clone());
        Ok(self.payload.clone())
    }
}

struct FailingLoader;

#[async_trait::async_trait(?Send)]
impl RouteLoader for FailingLoader {
    async fn load(&self, _params: &Params) -> SiteResult<ContentPayload> {
        Err(SiteError::fetch_failure("Failed to fetch broken.html: 500"))
    }
}

/// Loader that blocks until the test releases it
struct GatedLoader {
    gate: RefCell<Option<oneshot::Receiver<()>>>,
    payload: ContentPayload,
}

#[async_trait::async_trait(?Send)]
impl RouteLoader for GatedLoader {
    async fn load(&self, _params: &Params) -> SiteResult<ContentPayload> {
        let gate = self.gate.borrow_mut().take();
        if let Some(rx) = gate {
            let _ = rx.await;
        }
        Ok(self.payload.clone())
    }
}

struct Guard {
    name: &'static str,
    decision: NavigationDecision,
    log: Rc<RefCell<Vec<String>>>,
}

#[async_trait::async_trait(?Send)]
impl BeforeNavigate for Guard {
    async fn before_navigate(&self, event: &NavigationEvent) -> NavigationDecision {
        self.log
            .borrow_mut()
            .push(format!("{}:{:?}->{}", self.name, event.from, event.to));
        self.decision
    }
}

struct AfterHook {
    name: &'static str,
    fail: bool,
    log: Rc<RefCell<Vec<String>>>,
}

#[async_trait::async_trait(?Send)]
impl AfterNavigate for AfterHook {
    async fn after_navigate(&self, event: &NavigationEvent) -> SiteResult<()> {
        self.log
            .borrow_mut()
            .push(format!("{}:{}", self.name, event.to));
        if self.fail {
            return Err(SiteError::missing_mount_point("widget root missing"));
        }
        Ok(())
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

const HEADER: &str = "app-header-content";
const CONTENT: &str = "app-content";

fn site_router(location: &str) -> Router<MockBrowser> {
    init_tracing();
    let router = Router::new(MockBrowser::at(location), SiteConfig::default());
    router
        .add_route(
            "/",
            RouteConfig::new(
                "home",
                "Magyar Közlöny",
                Rc::new(ContentPayload::new("<form>search</form>", "<p>home</p>")),
            ),
        )
        .unwrap();
    router
        .add_route(
            "/rss",
            RouteConfig::new(
                "rss",
                "RSS - Magyar Közlöny",
                Rc::new(ContentPayload::new("", "<p>rss</p>")),
            ),
        )
        .unwrap();
    router
}

// =========================================================
// Basic navigation
// =========================================================

#[tokio::test]
async fn test_navigate_commits_everything() {
    let router = site_router("/");
    let log = Rc::new(RefCell::new(Vec::new()));
    router.after_navigate(Rc::new(AfterHook {
        name: "after",
        fail: false,
        log: log.clone(),
    }));

    let outcome = router.navigate("/rss").await;

    assert!(matches!(outcome, NavigationOutcome::Completed { ref path } if path == "/rss"));
    let browser = router.browser();
    assert_eq!(browser.history(), vec!["/rss"]);
    assert_eq!(browser.title.borrow().as_deref(), Some("RSS - Magyar Közlöny"));
    assert_eq!(
        browser.attributes.borrow().get("data-current-page").map(String::as_str),
        Some("rss")
    );
    assert_eq!(browser.region(HEADER).as_deref(), Some(""));
    assert_eq!(browser.region(CONTENT).as_deref(), Some("<p>rss</p>"));
    assert_eq!(browser.scrolls.get(), 1);

    assert_eq!(router.current_route().as_deref(), Some("/rss"));
    assert_eq!(router.phase(), NavigationPhase::Ready);
    assert_eq!(*log.borrow(), vec!["after:/rss"]);
}

#[tokio::test]
async fn test_navigate_normalizes_html_paths() {
    let router = site_router("/");

    let outcome = router.navigate("rss.html").await;
    assert!(outcome.is_completed());
    assert_eq!(router.browser().history(), vec!["/rss"]);

    router.navigate("index.html").await;
    assert_eq!(router.current_route().as_deref(), Some("/"));
    assert_eq!(
        router.browser().attributes.borrow().get("data-current-page").map(String::as_str),
        Some("index")
    );
}

#[tokio::test]
async fn test_navigate_without_push() {
    let router = site_router("/");

    let outcome = router.navigate_with("/rss", false).await;

    assert!(outcome.is_completed());
    assert!(router.browser().history().is_empty());
    assert_eq!(router.current_route().as_deref(), Some("/rss"));
}

#[tokio::test]
async fn test_start_loads_current_location() {
    let router = site_router("/rss");

    let outcome = router.start().await;

    assert!(outcome.is_completed());
    assert!(router.browser().history().is_empty());
    assert_eq!(router.current_route().as_deref(), Some("/rss"));
}

#[tokio::test]
async fn test_params_reach_loader() {
    let router = site_router("/");
    let loader = RecordingLoader::new(ContentPayload::body("listing"));
    router
        .add_route("/page/:page", RouteConfig::new("listing", "Lista", loader.clone()).dynamic())
        .unwrap();

    router.navigate("/page/3").await;

    let calls = loader.calls.borrow();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].get("page").map(String::as_str), Some("3"));
    assert_eq!(
        router.browser().attributes.borrow().get("data-current-page").map(String::as_str),
        Some("page/3")
    );
}

#[tokio::test]
async fn test_none_payload_leaves_region_unchanged() {
    let router = site_router("/");
    router
        .add_route(
            "/body-only",
            RouteConfig::new("body-only", "", Rc::new(ContentPayload::body("<p>only</p>"))),
        )
        .unwrap();

    router.navigate("/").await;
    router.navigate("/body-only").await;

    let browser = router.browser();
    assert_eq!(browser.region(HEADER).as_deref(), Some("<form>search</form>"));
    assert_eq!(browser.region(CONTENT).as_deref(), Some("<p>only</p>"));
    // Empty route title falls back to the site title
    assert_eq!(browser.title.borrow().as_deref(), Some("Magyar Közlöny"));
}

#[tokio::test]
async fn test_missing_mount_point_does_not_fail() {
    let router = site_router("/");
    router
        .browser()
        .missing_regions
        .borrow_mut()
        .extend([HEADER.to_string(), CONTENT.to_string()]);

    let outcome = router.navigate("/rss").await;

    assert!(outcome.is_completed());
    assert_eq!(router.current_route().as_deref(), Some("/rss"));
    assert!(router.browser().regions.borrow().is_empty());
}

// =========================================================
// Callbacks
// =========================================================

#[tokio::test]
async fn test_before_callbacks_run_in_order_and_refusal_stops() {
    let router = site_router("/");
    let log = Rc::new(RefCell::new(Vec::new()));
    for (name, decision) in [
        ("a", NavigationDecision::Proceed),
        ("b", NavigationDecision::Refuse),
        ("c", NavigationDecision::Proceed),
    ] {
        router.before_navigate(Rc::new(Guard {
            name,
            decision,
            log: log.clone(),
        }));
    }

    let outcome = router.navigate("/rss").await;

    assert!(matches!(outcome, NavigationOutcome::Refused));
    assert_eq!(*log.borrow(), vec!["a:None->/rss", "b:None->/rss"]);
    assert!(router.browser().history().is_empty());
    assert!(router.browser().regions.borrow().is_empty());
    assert_eq!(router.current_route(), None);
    assert_eq!(router.phase(), NavigationPhase::Idle);
}

#[tokio::test]
async fn test_before_callbacks_see_previous_path() {
    let router = site_router("/");
    let log = Rc::new(RefCell::new(Vec::new()));
    router.before_navigate(Rc::new(Guard {
        name: "g",
        decision: NavigationDecision::Proceed,
        log: log.clone(),
    }));

    router.load_route("/").await;
    router.navigate("/rss").await;

    // load_route skips before callbacks
    assert_eq!(*log.borrow(), vec![r#"g:Some("/")->/rss"#]);
}

#[tokio::test]
async fn test_failing_after_callback_does_not_stop_others() {
    let router = site_router("/");
    let log = Rc::new(RefCell::new(Vec::new()));
    router.after_navigate(Rc::new(AfterHook {
        name: "first",
        fail: true,
        log: log.clone(),
    }));
    router.after_navigate(Rc::new(AfterHook {
        name: "second",
        fail: false,
        log: log.clone(),
    }));

    let outcome = router.navigate("/rss").await;

    assert!(outcome.is_completed());
    assert_eq!(*log.borrow(), vec!["first:/rss", "second:/rss"]);
    assert_eq!(router.browser().scrolls.get(), 1);
}

/// After-navigation hook that records the router phase it observes
struct PhaseRecorder {
    router: RefCell<Weak<Router<MockBrowser>>>,
    seen: RefCell<Vec<NavigationPhase>>,
}

#[async_trait::async_trait(?Send)]
impl AfterNavigate for PhaseRecorder {
    async fn after_navigate(&self, _event: &NavigationEvent) -> SiteResult<()> {
        if let Some(router) = self.router.borrow().upgrade() {
            self.seen.borrow_mut().push(router.phase());
        }
        Ok(())
    }
}

#[tokio::test]
async fn test_phase_becomes_ready_after_callbacks() {
    let router = Rc::new(site_router("/"));
    let recorder = Rc::new(PhaseRecorder {
        router: RefCell::new(Rc::downgrade(&router)),
        seen: RefCell::new(Vec::new()),
    });
    router.after_navigate(recorder.clone());

    let outcome = router.navigate("/rss").await;

    assert!(outcome.is_completed());
    assert_eq!(*recorder.seen.borrow(), vec![NavigationPhase::Navigating]);
    assert_eq!(router.current_route().as_deref(), Some("/rss"));
    assert_eq!(router.phase(), NavigationPhase::Ready);
}

#[tokio::test]
async fn test_empty_route_title_uses_site_title() {
    let router = site_router("/");
    router
        .add_route(
            "/ures",
            RouteConfig::new("ures", "", Rc::new(ContentPayload::new("", "<p>ures</p>"))),
        )
        .unwrap();

    router.navigate("/ures").await;

    assert_eq!(
        router.browser().title.borrow().as_deref(),
        Some(SiteConfig::default().site_title.as_str())
    );
}

// =========================================================
// Failures and fallback
// =========================================================

#[tokio::test]
async fn test_navigate_unknown_route_redirects_to_root() {
    let router = site_router("/");

    let outcome = router.navigate("/nincs-ilyen").await;

    match outcome {
        NavigationOutcome::Redirected { from, path } => {
            assert_eq!(from, "/nincs-ilyen");
            assert_eq!(path, "/");
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
    // Unknown paths are never pushed
    assert!(router.browser().history().is_empty());
    assert_eq!(router.current_route().as_deref(), Some("/"));
    assert_eq!(router.phase(), NavigationPhase::Ready);
}

#[tokio::test]
async fn test_repeated_unknown_route_redirects_once_each_time() {
    init_tracing();
    let router = Router::new(MockBrowser::at("/"), SiteConfig::default());
    let root = RecordingLoader::new(ContentPayload::new("", "<p>home</p>"));
    router
        .add_route("/", RouteConfig::new("home", "Magyar Közlöny", root.clone()))
        .unwrap();

    for _ in 0..2 {
        let outcome = router.navigate("/does-not-exist").await;
        match outcome {
            NavigationOutcome::Redirected { from, path } => {
                assert_eq!(from, "/does-not-exist");
                assert_eq!(path, "/");
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    assert_eq!(root.calls.borrow().len(), 2);
    assert!(router.browser().history().is_empty());
    assert_eq!(router.browser().region(CONTENT).as_deref(), Some("<p>home</p>"));
    assert_eq!(router.current_route().as_deref(), Some("/"));
}

#[tokio::test]
async fn test_unknown_route_without_root_fails() {
    init_tracing();
    let router = Router::new(MockBrowser::at("/"), SiteConfig::default());

    let outcome = router.navigate("/nincs-ilyen").await;

    match outcome {
        NavigationOutcome::Failed(err) => assert_eq!(err.status, SiteErrorStatus::NotFound),
        other => panic!("unexpected outcome: {:?}", other),
    }
    assert!(router.browser().history().is_empty());
    assert!(router.browser().regions.borrow().is_empty());
    assert_eq!(router.phase(), NavigationPhase::Idle);
}

#[tokio::test]
async fn test_load_unknown_route_redirects_to_root() {
    let router = site_router("/nincs-ilyen");

    let outcome = router.start().await;

    match outcome {
        NavigationOutcome::Redirected { from, path } => {
            assert_eq!(from, "/nincs-ilyen");
            assert_eq!(path, "/");
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
    assert_eq!(router.current_route().as_deref(), Some("/"));
    assert!(router.browser().history().is_empty());
    assert_eq!(router.browser().region(CONTENT).as_deref(), Some("<p>home</p>"));
}

#[tokio::test]
async fn test_loader_failure_falls_back_to_root_once() {
    let router = site_router("/");
    router
        .add_route("/broken", RouteConfig::new("broken", "Broken", Rc::new(FailingLoader)))
        .unwrap();

    let outcome = router.navigate("/broken").await;

    assert!(matches!(outcome, NavigationOutcome::Redirected { ref path, .. } if path == "/"));
    // Only the original push; the fallback does not touch history
    assert_eq!(router.browser().history(), vec!["/broken"]);
    assert_eq!(router.current_route().as_deref(), Some("/"));
    assert_eq!(router.phase(), NavigationPhase::Ready);
}

#[tokio::test]
async fn test_root_failure_is_terminal() {
    init_tracing();
    let router = Router::new(MockBrowser::at("/"), SiteConfig::default());
    router
        .add_route("/", RouteConfig::new("home", "Home", Rc::new(FailingLoader)))
        .unwrap();
    router
        .add_route("/broken", RouteConfig::new("broken", "Broken", Rc::new(FailingLoader)))
        .unwrap();

    let outcome = router.navigate("/broken").await;

    match outcome {
        NavigationOutcome::Failed(err) => assert_eq!(err.status, SiteErrorStatus::FetchFailure),
        other => panic!("unexpected outcome: {:?}", other),
    }
    assert_eq!(router.current_route(), None);
    assert_eq!(router.phase(), NavigationPhase::Idle);
    assert!(router.browser().regions.borrow().is_empty());
}

// =========================================================
// History
// =========================================================

#[tokio::test]
async fn test_pop_state_reloads_without_push_or_guards() {
    let router = site_router("/");
    let log = Rc::new(RefCell::new(Vec::new()));
    router.before_navigate(Rc::new(Guard {
        name: "g",
        decision: NavigationDecision::Refuse,
        log: log.clone(),
    }));

    *router.browser().location.borrow_mut() = "/rss".to_string();
    let outcome = router.handle_pop_state().await;

    assert!(outcome.is_completed());
    assert!(log.borrow().is_empty());
    assert!(router.browser().history().is_empty());
    assert_eq!(router.current_route().as_deref(), Some("/rss"));
}

// =========================================================
// Concurrency
// =========================================================

#[tokio::test]
async fn test_newer_navigation_supersedes_pending_one() {
    let router = site_router("/");
    let (tx, rx) = oneshot::channel();
    router
        .add_route(
            "/slow",
            RouteConfig::new(
                "slow",
                "Slow",
                Rc::new(GatedLoader {
                    gate: RefCell::new(Some(rx)),
                    payload: ContentPayload::body("<p>slow</p>"),
                }),
            ),
        )
        .unwrap();

    let (slow, fast) = tokio::join!(router.navigate("/slow"), async {
        let outcome = router.navigate("/rss").await;
        let _ = tx.send(());
        outcome
    });

    assert!(matches!(slow, NavigationOutcome::Superseded));
    assert!(fast.is_completed());
    assert_eq!(router.current_route().as_deref(), Some("/rss"));
    assert_eq!(router.browser().region(CONTENT).as_deref(), Some("<p>rss</p>"));
    assert_eq!(router.browser().title.borrow().as_deref(), Some("RSS - Magyar Közlöny"));
    assert_eq!(router.phase(), NavigationPhase::Ready);
}

#[tokio::test]
async fn test_destroy_invalidates_in_flight_navigation() {
    let router = site_router("/");
    let (tx, rx) = oneshot::channel();
    router
        .add_route(
            "/slow",
            RouteConfig::new(
                "slow",
                "Slow",
                Rc::new(GatedLoader {
                    gate: RefCell::new(Some(rx)),
                    payload: ContentPayload::body("<p>slow</p>"),
                }),
            ),
        )
        .unwrap();

    let (outcome, _) = futures::join!(router.navigate("/slow"), async {
        router.destroy();
        let _ = tx.send(());
    });

    assert!(matches!(outcome, NavigationOutcome::Superseded));
    assert!(router.browser().regions.borrow().is_empty());
    assert_eq!(router.state(), NavigationState::default());
}

#[tokio::test]
async fn test_destroy_is_idempotent() {
    let router = site_router("/");
    router.navigate("/rss").await;

    router.destroy();
    router.destroy();

    assert_eq!(router.route_count(), 0);
    assert_eq!(router.current_route(), None);
    assert_eq!(router.phase(), NavigationPhase::Idle);
    assert!(router.match_route("/").is_none());
}

// =========================================================
// Link interception
// =========================================================

fn link(href: &str) -> LinkTarget {
    LinkTarget {
        href: Some(href.to_string()),
        ..LinkTarget::default()
    }
}

#[test]
fn test_resolve_link_intercepts_known_routes() {
    let router = site_router("/");

    assert_eq!(router.resolve_link(&link("/rss")), LinkDecision::Intercept("/rss".into()));
    assert_eq!(router.resolve_link(&link("rss.html")), LinkDecision::Intercept("/rss".into()));
    assert_eq!(router.resolve_link(&link("./index.html")), LinkDecision::Intercept("/".into()));
    assert_eq!(router.resolve_link(&link("/rss?x=1#top")), LinkDecision::Intercept("/rss".into()));
    assert_eq!(
        router.resolve_link(&LinkTarget {
            target: Some("_self".into()),
            ..link("/rss")
        }),
        LinkDecision::Intercept("/rss".into())
    );
}

#[test]
fn test_resolve_link_passes_through() {
    let router = site_router("/");

    for href in [
        "",
        "  ",
        "#top",
        "http://example.hu/rss",
        "https://example.hu/rss",
        "//example.hu/rss",
        "mailto:info@example.hu",
        "tel:+3612345678",
        "/unknown",
        "docs/guide.pdf",
    ] {
        assert_eq!(router.resolve_link(&link(href)), LinkDecision::PassThrough, "{}", href);
    }

    assert_eq!(router.resolve_link(&LinkTarget::default()), LinkDecision::PassThrough);
    assert_eq!(
        router.resolve_link(&LinkTarget {
            download: true,
            ..link("/rss")
        }),
        LinkDecision::PassThrough
    );
    assert_eq!(
        router.resolve_link(&LinkTarget {
            target: Some("_blank".into()),
            ..link("/rss")
        }),
        LinkDecision::PassThrough
    );
    assert_eq!(
        router.resolve_link(&LinkTarget {
            modified: true,
            ..link("/rss")
        }),
        LinkDecision::PassThrough
    );
}
