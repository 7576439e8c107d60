use super::pattern::pattern_to_regex;
use super::{CompiledPattern, Router, RouterError};
use crate::context::RequestContext;
use crate::handler::shared;

fn noop() -> crate::handler::SharedHandler {
    shared(|_: &mut RequestContext| {})
}

#[test]
fn test_root_path() {
    let (re, params) = pattern_to_regex("/");
    assert_eq!(re, "^/$");
    assert!(params.is_empty());
    let p = CompiledPattern::compile("/").unwrap();
    assert!(p.is_match("/"));
    assert!(!p.is_match("/a"));
}

#[test]
fn test_empty_segments_collapse() {
    assert_eq!(pattern_to_regex("//a//b/").0, pattern_to_regex("/a/b").0);
    assert_eq!(pattern_to_regex("a/b").0, "^/a/b$");
}

#[test]
fn test_parameterized_path() {
    let (re, params) = pattern_to_regex("/items/:id");
    assert_eq!(re, "^/items/([^/]+)$");
    assert_eq!(params, vec!["id"]);
}

#[test]
fn test_custom_fragment() {
    let (re, params) = pattern_to_regex("/items/:id|[0-9]+/edit");
    assert_eq!(re, "^/items/([0-9]+)/edit$");
    assert_eq!(params, vec!["id"]);
}

#[test]
fn test_custom_fragment_splits_on_first_pipe_only() {
    let p = CompiledPattern::compile("/pets/:kind|cat|dog").unwrap();
    assert_eq!(p.regex_str(), "^/pets/(cat|dog)$");
    assert!(p.is_match("/pets/cat"));
    assert!(p.is_match("/pets/dog"));
    assert!(!p.is_match("/pets/cow"));
}

#[test]
fn test_pipe_without_colon_is_static() {
    let p = CompiledPattern::compile("/a|b").unwrap();
    assert!(p.param_names().is_empty());
    assert!(p.is_match("/a|b"));
    assert!(!p.is_match("/a"));
}

#[test]
fn test_static_segments_are_escaped() {
    let p = CompiledPattern::compile("/files/report.v1+(final)").unwrap();
    assert!(p.is_match("/files/report.v1+(final)"));
    assert!(!p.is_match("/files/reportXv1+(final)"));
    assert!(!p.is_match("/files/report.v11(final)"));
}

#[test]
fn test_whole_path_anchoring() {
    let p = CompiledPattern::compile("/users").unwrap();
    assert!(p.is_match("/users"));
    assert!(!p.is_match("/users/"));
    assert!(!p.is_match("/users/1"));
    assert!(!p.is_match("/api/users"));
}

#[test]
fn test_bare_param_rejects_empty_and_multi_segment() {
    let p = CompiledPattern::compile("/:name").unwrap();
    assert!(p.is_match("/x"));
    assert!(!p.is_match("/"));
    assert!(!p.is_match("/a/b"));
}

#[test]
fn test_captures_bind_positionally() {
    let p = CompiledPattern::compile("/users/:user/posts/:post|[a-z0-9-]+").unwrap();
    let params = p.captures("/users/7/posts/hello-world").unwrap();
    assert_eq!(params.len(), 2);
    assert_eq!(&*params[0].0, "user");
    assert_eq!(params[0].1, "7");
    assert_eq!(&*params[1].0, "post");
    assert_eq!(params[1].1, "hello-world");
}

#[test]
fn test_optional_group_binds_empty_string() {
    let p = CompiledPattern::compile("/v/:ver|(?:[0-9]+)?").unwrap();
    let params = p.captures("/v/").unwrap();
    assert_eq!(params[0].1, "");
}

#[test]
fn test_invalid_fragment_is_rejected() {
    let err = CompiledPattern::compile("/items/:id|[0-9").unwrap_err();
    match err {
        RouterError::InvalidPattern { pattern, reason } => {
            assert_eq!(pattern, "/items/:id|[0-9");
            assert!(!reason.is_empty());
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_add_route_invalid_registers_nothing() {
    let mut router = Router::new();
    assert!(router.add_route("/:id|(", noop(), &["GET"]).is_err());
    assert!(router.table().is_empty());
}

#[test]
fn test_route_shared_across_methods() {
    let mut router = Router::new();
    let route = router
        .add_route("/things/:id", noop(), &["GET", "DELETE"])
        .unwrap();
    assert_eq!(router.table().len(), 2);
    let get = router.route("GET", "/things/1").unwrap();
    let del = router.route("DELETE", "/things/1").unwrap();
    assert!(std::sync::Arc::ptr_eq(&get.route, &route));
    assert!(std::sync::Arc::ptr_eq(&del.route, &route));
}

#[test]
fn test_method_keys_are_case_sensitive() {
    let mut router = Router::new();
    router.add_route("/", noop(), &["GET"]).unwrap();
    assert!(router.route("GET", "/").is_ok());
    assert!(matches!(
        router.route("get", "/"),
        Err(RouterError::MethodNotAllowed { .. })
    ));
}

#[test]
fn test_repeated_param_name_last_wins() {
    let mut router = Router::new();
    router.add_route("/org/:id/user/:id", noop(), &["GET"]).unwrap();
    let m = router.route("GET", "/org/1/user/2").unwrap();
    assert_eq!(m.get_path_param("id"), Some("2"));
    assert_eq!(m.path_params.len(), 2);
}

#[test]
fn test_path_patterns_listing_keeps_order() {
    let mut router = Router::new();
    router.add_route("/b", noop(), &["GET"]).unwrap();
    router.add_route("/a", noop(), &["GET"]).unwrap();
    router.add_route("/c", noop(), &["POST"]).unwrap();
    assert_eq!(router.get_all_path_patterns(), vec!["/b", "/a", "/c"]);
    let methods: Vec<&str> = router.table().methods().collect();
    assert_eq!(methods, vec!["GET", "POST"]);
}
