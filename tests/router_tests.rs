//! Route resolution through the public API
//!
//! Covers the matching rules callers rely on: literal segments, bare and
//! constrained parameters, registration-order precedence, and the 405/404
//! split between unknown methods and unmatched paths.

use feather::router::{Router, RouterError};
use feather::{shared, Dispatcher, RequestContext, SharedHandler};

fn noop() -> SharedHandler {
    shared(|_: &mut RequestContext| {})
}

fn router_with(routes: &[(&str, &str)]) -> Router {
    let mut router = Router::new();
    for (pattern, method) in routes {
        router.add_route(pattern, noop(), &[*method]).unwrap();
    }
    router
}

#[test]
fn test_static_pattern_matches_only_its_literal_path() {
    let router = router_with(&[("/about/team", "GET")]);
    assert!(router.route("GET", "/about/team").is_ok());
    for path in ["/about", "/about/team/x", "/about/teams", "/About/team", "/xabout/team"] {
        assert!(
            matches!(router.route("GET", path), Err(RouterError::NotFound { .. })),
            "{path} should not match"
        );
    }
}

#[test]
fn test_bare_param_binds_one_segment() {
    let router = router_with(&[("/:name", "GET")]);
    let m = router.route("GET", "/x").unwrap();
    assert_eq!(m.get_path_param("name"), Some("x"));
    assert!(router.route("GET", "/a/b").is_err());
    assert!(router.route("GET", "/").is_err());
}

#[test]
fn test_constrained_param() {
    let router = router_with(&[("/:name|[0-9]+", "GET")]);
    let m = router.route("GET", "/123").unwrap();
    assert_eq!(m.get_path_param("name"), Some("123"));
    assert!(matches!(
        router.route("GET", "/abc"),
        Err(RouterError::NotFound { .. })
    ));
    // Anchored: a numeric prefix is not enough
    assert!(router.route("GET", "/123abc").is_err());
}

#[test]
fn test_registration_order_beats_specificity() {
    let router = router_with(&[("/:id", "GET"), ("/static", "GET")]);
    let m = router.route("GET", "/static").unwrap();
    assert_eq!(m.route.pattern(), "/:id");
    assert_eq!(m.get_path_param("id"), Some("static"));
}

#[test]
fn test_multiple_params_bind_in_order() {
    let router = router_with(&[("/users/:user/posts/:post|[a-z0-9-]+", "GET")]);
    let m = router.route("GET", "/users/ada/posts/hello-world").unwrap();
    let names: Vec<&str> = m.path_params.iter().map(|(k, _)| k.as_ref()).collect();
    assert_eq!(names, vec!["user", "post"]);
    assert_eq!(m.get_path_param("user"), Some("ada"));
    assert_eq!(m.get_path_param("post"), Some("hello-world"));
    assert!(router.route("GET", "/users/ada/posts/Hello").is_err());
}

#[test]
fn test_unknown_method_is_405_known_method_is_404() {
    let router = router_with(&[("/items", "POST")]);
    let err = router.route("GET", "/items").unwrap_err();
    assert_eq!(err.status(), 405);
    let err = router.route("POST", "/nothing").unwrap_err();
    assert_eq!(err.status(), 404);
}

#[test]
fn test_empty_methods_default_to_get() {
    let mut app = Dispatcher::new();
    app.handle("/ping", |_: &mut RequestContext| {}, &[]).unwrap();
    assert!(app.dispatch("GET", "/ping").is_ok());
    assert!(matches!(
        app.dispatch("POST", "/ping"),
        Err(RouterError::MethodNotAllowed { .. })
    ));
}

#[test]
fn test_invalid_pattern_is_reported() {
    let mut app = Dispatcher::new();
    let err = app
        .get("/broken/:id|(unclosed", |_: &mut RequestContext| {})
        .unwrap_err();
    match err {
        RouterError::InvalidPattern { pattern, reason } => {
            assert_eq!(pattern, "/broken/:id|(unclosed");
            assert!(!reason.is_empty());
        }
        other => panic!("expected InvalidPattern, got {other:?}"),
    }
    assert!(app.router().table().is_empty());
}

#[test]
fn test_metacharacters_in_static_segments_are_literal() {
    let router = router_with(&[("/v1.0/files/a+b", "GET")]);
    assert!(router.route("GET", "/v1.0/files/a+b").is_ok());
    assert!(router.route("GET", "/v1x0/files/a+b").is_err());
    assert!(router.route("GET", "/v1.0/files/aab").is_err());
}
