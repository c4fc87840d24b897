//! Tests for resource-call dispatch
//!
//! # Test Coverage
//!
//! - Unknown resource and unmatched route produce `404` without running a handler
//! - Exact-method routes win over `ANY` routes, `ANY` serves everything else
//! - Each dispatch invokes the selected handler exactly once
//! - Path and query parameters, headers and body reach the handler
//! - Handler errors surface as `DispatchError`
//! - Cancellation is visible to the handler but never enforced

use http::Method;
use resource_router::dispatcher::parse_method;
use resource_router::{
    handler_fn, CallResourceRequest, CancelSignal, DispatchConfig, DispatchError, Resource,
    ResourceDispatcher, ResourceHandler, ResourceRegistry, RouteMethod,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// One invocation counter per method binding.
#[derive(Default)]
struct Counters {
    any: AtomicUsize,
    get: AtomicUsize,
    put: AtomicUsize,
    post: AtomicUsize,
    delete: AtomicUsize,
    patch: AtomicUsize,
}

impl Counters {
    fn snapshot(&self) -> [usize; 6] {
        [
            self.any.load(Ordering::SeqCst),
            self.get.load(Ordering::SeqCst),
            self.put.load(Ordering::SeqCst),
            self.post.load(Ordering::SeqCst),
            self.delete.load(Ordering::SeqCst),
            self.patch.load(Ordering::SeqCst),
        ]
    }
}

fn counting(
    counters: &Arc<Counters>,
    pick: fn(&Counters) -> &AtomicUsize,
) -> impl ResourceHandler + 'static {
    let counters = Arc::clone(counters);
    handler_fn(move |_, w| {
        pick(&counters).fetch_add(1, Ordering::SeqCst);
        w.write_status(200);
        Ok(())
    })
}

/// `test` resource at `base` with one route per method binding, each under `sub(method)`.
fn counting_dispatcher(base: &str, sub: fn(&str) -> String) -> (ResourceDispatcher, Arc<Counters>) {
    let counters = Arc::new(Counters::default());
    let resource = Resource::builder(base)
        .route(&sub("ANY"), RouteMethod::Any, counting(&counters, |c| &c.any))
        .route(&sub("GET"), RouteMethod::GET, counting(&counters, |c| &c.get))
        .route(&sub("PUT"), RouteMethod::PUT, counting(&counters, |c| &c.put))
        .route(&sub("POST"), RouteMethod::POST, counting(&counters, |c| &c.post))
        .route(&sub("DELETE"), RouteMethod::DELETE, counting(&counters, |c| &c.delete))
        .route(&sub("PATCH"), RouteMethod::PATCH, counting(&counters, |c| &c.patch));
    let registry = ResourceRegistry::builder()
        .register("test", resource)
        .unwrap()
        .build();
    (ResourceDispatcher::new(Arc::new(registry)), counters)
}

fn call(d: &ResourceDispatcher, name: &str, path: &str, method: &str) -> u16 {
    d.dispatch(CallResourceRequest::new(name, path, method))
        .unwrap()
        .status
}

#[test]
fn test_unknown_resource_is_404() {
    let (d, counters) = counting_dispatcher("/", |_| "/".to_string());
    let env = d
        .dispatch(CallResourceRequest::new("non-existing", "/", "GET"))
        .unwrap();
    assert_eq!(env.status, 404);
    assert!(env.body.is_empty());
    assert_eq!(counters.snapshot(), [0; 6]);
}

#[test]
fn test_root_resource_method_routing() {
    let (d, counters) = counting_dispatcher("/", |_| "/".to_string());

    assert_eq!(call(&d, "test", "/", "GET"), 200);
    assert_eq!(counters.snapshot(), [0, 1, 0, 0, 0, 0]);
    assert_eq!(call(&d, "test", "/", "PUT"), 200);
    assert_eq!(call(&d, "test", "/", "POST"), 200);
    assert_eq!(call(&d, "test", "/", "DELETE"), 200);
    assert_eq!(call(&d, "test", "/", "PATCH"), 200);
    assert_eq!(counters.snapshot(), [0, 1, 1, 1, 1, 1]);

    // No exact route for these methods, the ANY route serves them.
    assert_eq!(call(&d, "test", "/", "HEAD"), 200);
    assert_eq!(call(&d, "test", "/", "OPTIONS"), 200);
    assert_eq!(call(&d, "test", "/", "TRACE"), 200);
    assert_eq!(counters.snapshot(), [3, 1, 1, 1, 1, 1]);
}

#[test]
fn test_root_path_spellings_are_equivalent() {
    let (d, counters) = counting_dispatcher("/", |_| "/".to_string());
    assert_eq!(call(&d, "test", "", "GET"), 200);
    assert_eq!(call(&d, "test", "//", "GET"), 200);
    assert_eq!(counters.snapshot(), [0, 2, 0, 0, 0, 0]);
}

#[test]
fn test_parameterised_resource_sub_paths() {
    let (d, counters) = counting_dispatcher("/test/:id", |m| match m {
        "ANY" => "/".to_string(),
        other => format!("/{}", other.to_ascii_lowercase()),
    });

    assert_eq!(call(&d, "test", "/test/1", "GET"), 200);
    assert_eq!(counters.snapshot(), [1, 0, 0, 0, 0, 0]);

    // The request segment `:id` is a plain value bound to the parameter.
    assert_eq!(call(&d, "test", "/test/:id", "GET"), 200);
    assert_eq!(call(&d, "test", "/test/:id", "TRACE"), 200);
    assert_eq!(counters.snapshot(), [3, 0, 0, 0, 0, 0]);

    assert_eq!(call(&d, "test", "/test/1/get", "GET"), 200);
    assert_eq!(call(&d, "test", "/test/2/put", "PUT"), 200);
    assert_eq!(call(&d, "test", "/test/3/post", "POST"), 200);
    assert_eq!(call(&d, "test", "/test/4/delete", "DELETE"), 200);
    assert_eq!(call(&d, "test", "/test/5/patch", "PATCH"), 200);
    assert_eq!(call(&d, "test", "/test/:id/get", "GET"), 200);
    assert_eq!(counters.snapshot(), [3, 2, 1, 1, 1, 1]);

    // Right path, wrong method, and no ANY route at that path.
    assert_eq!(call(&d, "test", "/test/1/get", "POST"), 404);
    // Base path alone never matches a sub-path route.
    assert_eq!(call(&d, "test", "/get", "GET"), 404);
    assert_eq!(counters.snapshot(), [3, 2, 1, 1, 1, 1]);
}

#[test]
fn test_literal_param_text_in_request_binds_as_value() {
    let registry = ResourceRegistry::builder()
        .register(
            "test",
            Resource::builder("/test/:id").route(
                "/",
                RouteMethod::Any,
                handler_fn(|ctx, w| {
                    let id = ctx.get_path_param("id").unwrap_or_default().to_string();
                    w.write_text(200, &id);
                    Ok(())
                }),
            ),
        )
        .unwrap()
        .build();
    let d = ResourceDispatcher::new(Arc::new(registry));

    let env = d
        .dispatch(CallResourceRequest::new("test", "/test/:id", "GET"))
        .unwrap();
    assert_eq!(env.status, 200);
    assert_eq!(&env.body[..], b":id");

    let env = d
        .dispatch(CallResourceRequest::new("test", "/test/{id}", "PUT"))
        .unwrap();
    assert_eq!(&env.body[..], b"{id}");
}

#[test]
fn test_root_wildcard_route_skips_empty_sub_path() {
    let counters = Arc::new(Counters::default());
    let registry = ResourceRegistry::builder()
        .register(
            "r",
            Resource::builder("/").route("/*rest", RouteMethod::Any, counting(&counters, |c| &c.any)),
        )
        .unwrap()
        .build();
    let d = ResourceDispatcher::new(Arc::new(registry));

    assert_eq!(call(&d, "r", "", "GET"), 404);
    assert_eq!(call(&d, "r", "/", "GET"), 404);
    assert_eq!(counters.any.load(Ordering::SeqCst), 0);
    assert_eq!(call(&d, "r", "/a/b", "GET"), 200);
    assert_eq!(counters.any.load(Ordering::SeqCst), 1);
}

#[test]
fn test_dispatch_twice_invokes_twice() {
    let (d, counters) = counting_dispatcher("/", |_| "/".to_string());
    call(&d, "test", "/", "GET");
    call(&d, "test", "/", "GET");
    assert_eq!(counters.get.load(Ordering::SeqCst), 2);
}

#[test]
fn test_unmatched_path_is_404() {
    let (d, counters) = counting_dispatcher("/", |_| "/".to_string());
    assert_eq!(call(&d, "test", "/nope", "GET"), 404);
    assert_eq!(counters.snapshot(), [0; 6]);
}

#[test]
fn test_invalid_or_empty_method_reaches_any_only() {
    let (d, counters) = counting_dispatcher("/", |_| "/".to_string());
    assert_eq!(call(&d, "test", "/", ""), 200);
    assert_eq!(call(&d, "test", "/", "NOT A METHOD"), 200);
    // Methods are case-sensitive: `get` is not GET.
    assert_eq!(call(&d, "test", "/", "get"), 200);
    assert_eq!(counters.snapshot(), [3, 0, 0, 0, 0, 0]);
}

#[test]
fn test_parse_method() {
    assert_eq!(parse_method("GET"), Some(Method::GET));
    assert_eq!(parse_method(""), None);
    assert_eq!(parse_method("BAD METHOD"), None);
    assert_ne!(parse_method("get"), Some(Method::GET));
}

#[test]
fn test_not_found_body_config() {
    let registry = Arc::new(ResourceRegistry::builder().build());
    let config = DispatchConfig {
        not_found_body: true,
        ..DispatchConfig::default()
    };
    let d = ResourceDispatcher::new(registry).with_config(config);
    let env = d
        .dispatch(CallResourceRequest::new("missing", "/", "GET"))
        .unwrap();
    assert_eq!(env.status, 404);
    assert_eq!(env.get_header("content-type"), Some("application/json"));
    let body: serde_json::Value = serde_json::from_slice(&env.body).unwrap();
    assert_eq!(body["error"], "resource not found");
}

#[test]
fn test_handler_sees_request_data() {
    let resource = Resource::builder("/users/:user").route(
        "/posts/{post}",
        RouteMethod::POST,
        handler_fn(|ctx, w| {
            assert_eq!(ctx.resource_name, "users");
            assert_eq!(ctx.method, Some(Method::POST));
            let payload: serde_json::Value = ctx.json_body()?;
            let out = serde_json::json!({
                "user": ctx.get_path_param("user"),
                "post": ctx.get_path_param("post"),
                "limit": ctx.get_query_param("limit"),
                "trace": ctx.get_header("X-Trace"),
                "title": payload["title"],
            });
            w.add_header("X-Handled", "yes");
            w.write_json(201, &out)?;
            Ok(())
        }),
    );
    let registry = ResourceRegistry::builder()
        .register("users", resource)
        .unwrap()
        .build();
    let d = ResourceDispatcher::new(Arc::new(registry));

    let req = CallResourceRequest::new("users", "/users/alice/posts/9", "POST")
        .with_url("/api/plugins/demo/resources/users/alice/posts/9?limit=5")
        .with_header("x-trace", "abc")
        .with_body(r#"{"title":"hello"}"#);
    let env = d.dispatch(req).unwrap();

    assert_eq!(env.status, 201);
    assert_eq!(env.get_header("x-handled"), Some("yes"));
    let body: serde_json::Value = serde_json::from_slice(&env.body).unwrap();
    assert_eq!(
        body,
        serde_json::json!({
            "user": "alice",
            "post": "9",
            "limit": "5",
            "trace": "abc",
            "title": "hello",
        })
    );
}

#[test]
fn test_handler_without_writes_is_empty_200() {
    let registry = ResourceRegistry::builder()
        .register(
            "quiet",
            Resource::builder("/").route("/", RouteMethod::Any, handler_fn(|_, _| Ok(()))),
        )
        .unwrap()
        .build();
    let d = ResourceDispatcher::new(Arc::new(registry));
    let env = d
        .dispatch(CallResourceRequest::new("quiet", "/", "GET"))
        .unwrap();
    assert_eq!(env.status, 200);
    assert!(env.body.is_empty());
    assert!(env.headers.is_empty());
}

#[test]
fn test_handler_error_is_dispatch_error() {
    let registry = ResourceRegistry::builder()
        .register(
            "broken",
            Resource::builder("/").route(
                "/",
                RouteMethod::GET,
                handler_fn(|_, w| {
                    w.write_status(202);
                    anyhow::bail!("backend unavailable")
                }),
            ),
        )
        .unwrap()
        .build();
    let d = ResourceDispatcher::new(Arc::new(registry));
    let err = d
        .dispatch(CallResourceRequest::new("broken", "/", "GET"))
        .unwrap_err();
    let DispatchError::Handler {
        resource,
        method,
        source,
        ..
    } = err;
    assert_eq!(resource, "broken");
    assert_eq!(method, "GET");
    assert_eq!(source.to_string(), "backend unavailable");
}

#[test]
fn test_call_id_header_is_reused() {
    let id = resource_router::CallId::new();
    let registry = ResourceRegistry::builder()
        .register(
            "ids",
            Resource::builder("/").route(
                "/",
                RouteMethod::Any,
                handler_fn(|ctx, w| {
                    w.write_text(200, &ctx.call_id.to_string());
                    Ok(())
                }),
            ),
        )
        .unwrap()
        .build();
    let d = ResourceDispatcher::new(Arc::new(registry));
    let env = d
        .dispatch(CallResourceRequest::new("ids", "/", "GET").with_header("X-Call-Id", id.to_string()))
        .unwrap();
    assert_eq!(std::str::from_utf8(&env.body).unwrap(), id.to_string());
}

#[test]
fn test_cancellation_is_visible_not_enforced() {
    let registry = ResourceRegistry::builder()
        .register(
            "slow",
            Resource::builder("/").route(
                "/",
                RouteMethod::Any,
                handler_fn(|ctx, w| {
                    let state = if ctx.is_cancelled() { "cancelled" } else { "live" };
                    w.write_text(200, state);
                    Ok(())
                }),
            ),
        )
        .unwrap()
        .build();
    let d = ResourceDispatcher::new(Arc::new(registry));

    let live = d
        .dispatch_with_cancel(CallResourceRequest::new("slow", "/", "GET"), CancelSignal::new())
        .unwrap();
    assert_eq!(&live.body[..], b"live");

    let signal = CancelSignal::new();
    signal.cancel();
    let cancelled = d
        .dispatch_with_cancel(CallResourceRequest::new("slow", "/", "GET"), signal)
        .unwrap();
    assert_eq!(cancelled.status, 200);
    assert_eq!(&cancelled.body[..], b"cancelled");

    let expired = d
        .dispatch_with_cancel(
            CallResourceRequest::new("slow", "/", "GET"),
            CancelSignal::with_timeout(Duration::ZERO),
        )
        .unwrap();
    assert_eq!(&expired.body[..], b"cancelled");
}

#[test]
fn test_concurrent_dispatch_shares_registry() {
    let (d, counters) = counting_dispatcher("/", |_| "/".to_string());
    let d = Arc::new(d);
    let threads: Vec<_> = (0..8)
        .map(|_| {
            let d = Arc::clone(&d);
            std::thread::spawn(move || {
                for _ in 0..50 {
                    assert_eq!(call(&d, "test", "/", "GET"), 200);
                }
            })
        })
        .collect();
    for t in threads {
        t.join().unwrap();
    }
    assert_eq!(counters.get.load(Ordering::SeqCst), 400);
}
