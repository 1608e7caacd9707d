//! End-to-end dispatch tests: discovery, matching, binding, generation.

use std::fs;
use std::sync::{Arc, Mutex};

use dispatch_router::config::load_config;
use dispatch_router::routing::{
    ManifestReader, RouteLookup, Router, RouterEvent, RouterState, RoutingError, UrlGenerator,
};
use dispatch_router::{RequestContext, Route};

mod common;

fn request(token: &str) -> RequestContext {
    RequestContext::new().with_query("_route", token)
}

fn discovering_router(dir: &std::path::Path) -> Router {
    common::write_manifests(dir);
    Router::new(common::test_registry())
        .with_metadata(Arc::new(ManifestReader::from_dir(dir)))
        .with_autoload(dir)
}

#[test]
fn test_route_from_manifest() {
    let dir = tempfile::tempdir().unwrap();
    let mut router = discovering_router(dir.path());

    let response = router.run(&request("/admin/page/t-e_s.t/10/20")).unwrap();

    assert_eq!(response.body(), "t-e_s.t-10-20");
    assert_eq!(router.actual_route().map(Route::name), Some("homepage"));
    assert_eq!(router.state(), RouterState::Done);
}

#[test]
fn test_token_without_leading_slash() {
    let dir = tempfile::tempdir().unwrap();
    let mut router = discovering_router(dir.path());

    let response = router.run(&request("admin/page/t-e_s.t/10/20")).unwrap();
    assert_eq!(response.body(), "t-e_s.t-10-20");
}

#[test]
fn test_priority_beats_registration_order() {
    let dir = tempfile::tempdir().unwrap();
    let mut router = discovering_router(dir.path());

    assert_eq!(router.run(&request("/blog/latest")).unwrap().body(), "latest");
    assert_eq!(router.run(&request("/blog/hello")).unwrap().body(), "post:hello");
    assert_eq!(
        router.actual_route().map(Route::name),
        Some("blogcontroller_show")
    );
}

#[test]
fn test_discovery_runs_once() {
    let dir = tempfile::tempdir().unwrap();
    let mut router = discovering_router(dir.path());
    assert!(!router.is_discovered());

    router.run(&request("/admin/about")).unwrap();
    let discovered = router.routes().len();
    assert_eq!(discovered, 4);

    router.run(&request("/admin/about")).unwrap();
    router.run(&request("/blog/x")).unwrap();
    assert!(router.is_discovered());
    assert_eq!(router.routes().len(), discovered);
}

#[test]
fn test_not_found_route() {
    let dir = tempfile::tempdir().unwrap();
    let mut router = discovering_router(dir.path());

    let err = router.run(&request("/nothing/here")).unwrap_err();
    assert!(matches!(
        err,
        RoutingError::NotFoundRoute(RouteLookup::Token(ref token)) if token == "/nothing/here"
    ));
    assert_eq!(router.state(), RouterState::Failed);
}

#[test]
fn test_not_valid_route() {
    let mut router = Router::new(common::test_registry());

    let err = router.add_route(Route::default()).unwrap_err();

    assert!(matches!(err, RoutingError::InvalidRoute(_)));
    assert!(router.routes().is_empty());
    assert_eq!(router.state(), RouterState::Uninitialized);
}

#[test]
fn test_missing_autoload_directory() {
    let dir = tempfile::tempdir().unwrap();
    let mut router =
        Router::new(common::test_registry()).with_autoload(dir.path().join("missing"));

    let err = router.run(&request("/")).unwrap_err();
    assert!(matches!(err, RoutingError::Router(_)));
    assert!(!router.is_discovered());
}

#[test]
fn test_generation_url() {
    let mut router = Router::new(common::test_registry());
    router
        .add_route(Route::new("testing_route", "/admin/{entity}/{action}", "Test", "Test"))
        .unwrap();

    let url = router
        .generate_url(
            "testing_route",
            [("action", "post"), ("entity", "article"), ("id", "21")],
            &RequestContext::new(),
        )
        .unwrap();
    assert_eq!(url, "/admin/article/post?id=21");

    let err = router
        .generate_url("testing_route", [("entity", "article")], &RequestContext::new())
        .unwrap_err();
    assert!(matches!(
        err,
        RoutingError::MissingParameter { ref parameter, .. } if parameter == "action"
    ));
}

#[test]
fn test_generated_urls_match_their_route() {
    let routes = vec![
        Route::new("page", "/admin/page/{slug}/{limit}/{offset}", "C", "a")
            .with_requirements([("limit", "[0-9]+"), ("offset", "[0-9]+")]),
        Route::new("file", "/files/{name}.{ext}", "C", "a"),
        Route::new("literal", "/about.html", "C", "a"),
        Route::new("lang", "/{lang}/docs/{topic}", "C", "a").with_requirement("lang", "en|cs"),
    ];
    let parameter_sets: Vec<Vec<(&str, &str)>> = vec![
        vec![("slug", "t-e_s.t"), ("limit", "10"), ("offset", "20")],
        vec![("name", "report-2024"), ("ext", "pdf")],
        vec![],
        vec![("lang", "cs"), ("topic", "routing_rules")],
    ];

    let generator = UrlGenerator::new();
    for (route, params) in routes.iter().zip(parameter_sets) {
        let expected: Vec<(String, String)> = params
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();

        let url = generator.generate(route, params).unwrap();
        assert!(route.is_match(&url), "{} should match {}", route.name(), url);

        let values = route.values_by_match(&url);
        let values: Vec<(String, String)> = values.into_iter().collect();
        let mut expected_sorted = expected.clone();
        let mut values_sorted = values.clone();
        expected_sorted.sort();
        values_sorted.sort();
        assert_eq!(values_sorted, expected_sorted);
    }
}

#[test]
fn test_events_wrap_the_call() {
    let dir = tempfile::tempdir().unwrap();
    let mut router = discovering_router(dir.path());

    let seen = Arc::new(Mutex::new(Vec::new()));
    let log = seen.clone();
    router.subscribe(Arc::new(move |event: &mut RouterEvent<'_>| {
        let entry = match event {
            RouterEvent::Start { token } => format!("start {}", token),
            RouterEvent::BeforeCall { controller, action } => {
                format!("call {}::{}", controller, action)
            }
            RouterEvent::Response { route, response } => {
                response.body_mut().make_ascii_uppercase();
                format!("response {}", route)
            }
        };
        log.lock().unwrap().push(entry);
    }));

    let response = router.run(&request("/admin/about")).unwrap();

    assert_eq!(response.body(), "ABOUT");
    assert_eq!(
        *seen.lock().unwrap(),
        vec![
            "start /admin/about",
            "call TestController::about",
            "response testcontroller_about",
        ]
    );
}

#[test]
fn test_router_from_config_file() {
    let dir = tempfile::tempdir().unwrap();
    common::write_manifests(&dir.path().join("controllers"));
    let path = dir.path().join("routing.toml");
    fs::write(
        &path,
        r#"
[routing]
autoload = "controllers"

[[routing.routes]]
name = "post"
rule = "/p/{slug}"
controller = "BlogController"
action = "show"
requirements = { slug = "[a-z]+" }
"#,
    )
    .unwrap();

    let config = load_config(&path).unwrap();
    let mut router =
        Router::from_config(&config.routing, &config.root, common::test_registry()).unwrap();
    assert_eq!(router.routes().len(), 1);

    assert_eq!(router.run(&request("/p/hello")).unwrap().body(), "post:hello");
    assert_eq!(router.routes().len(), 5);
    assert_eq!(
        router.run(&request("/admin/page/x/1/2")).unwrap().body(),
        "x-1-2"
    );

    let ctx = RequestContext::new().with_script_name("/site/index.php");
    assert_eq!(
        router
            .generate_url("homepage", [("slug", "x"), ("limit", "1"), ("offset", "2")], &ctx)
            .unwrap(),
        "/site/admin/page/x/1/2"
    );
}

#[test]
fn test_config_manifests_read_on_first_dispatch() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("routing.toml");
    fs::write(&path, "[routing]\nautoload = \"controllers\"\n").unwrap();

    let config = load_config(&path).unwrap();
    let mut router =
        Router::from_config(&config.routing, &config.root, common::test_registry()).unwrap();
    assert!(router.routes().is_empty());

    common::write_manifests(&dir.path().join("controllers"));

    assert_eq!(router.run(&request("/blog/latest")).unwrap().body(), "latest");
    assert_eq!(router.routes().len(), 4);
}

#[test]
fn test_duplicate_manifest_does_not_duplicate_routes() {
    let dir = tempfile::tempdir().unwrap();
    common::write_manifests(dir.path());
    fs::create_dir(dir.path().join("legacy")).unwrap();
    fs::write(
        dir.path().join("legacy").join("BlogController.toml"),
        "prefix = \"/old\"\n\n[routes]\nlatest = \"/latest\"\n",
    )
    .unwrap();
    let mut router = discovering_router(dir.path());

    assert_eq!(router.run(&request("/blog/hello")).unwrap().body(), "post:hello");

    let mut names: Vec<_> = router.routes().iter().map(Route::name).collect();
    names.sort();
    assert_eq!(
        names,
        vec![
            "blogcontroller_latest",
            "blogcontroller_show",
            "homepage",
            "testcontroller_about",
        ]
    );
}
