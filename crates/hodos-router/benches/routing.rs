//! Lookup benchmarks over a table shaped like a mounted factory tree.
//!
//! `cargo bench -p hodos-router`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use hodos_router::{HttpMethod, Router};
use http::Method;

/// `factories` copies of a users factory, each nested under its own prefix.
fn mounted(factories: usize) -> Router<usize> {
    let mut router = Router::new();
    let mut id = 0;
    for f in 0..factories {
        let prefix = format!("/v1/tenant{f}/users");
        for (method, suffix) in [
            (HttpMethod::Get, ""),
            (HttpMethod::Post, ""),
            (HttpMethod::Get, "/:id"),
            (HttpMethod::Put, "/:id"),
            (HttpMethod::Delete, "/:id"),
            (HttpMethod::Get, "/:id/posts/:postId"),
            (HttpMethod::Get, "/files/*path"),
        ] {
            let _ = router.insert(method, &format!("{prefix}{suffix}"), id);
            id += 1;
        }
    }
    router
}

fn bench_lookup(c: &mut Criterion) {
    let router = mounted(20);
    let cases = [
        ("static", Method::GET, "/v1/tenant7/users"),
        ("two_params", Method::GET, "/v1/tenant7/users/42/posts/9"),
        ("wildcard", Method::GET, "/v1/tenant7/users/files/a/b/c.png"),
        ("head_fallback", Method::HEAD, "/v1/tenant7/users/42"),
        ("method_not_allowed", Method::PATCH, "/v1/tenant7/users/42"),
        ("not_found", Method::GET, "/v1/tenant99/users"),
    ];
    for (name, method, path) in cases {
        c.bench_function(name, |b| b.iter(|| black_box(router.lookup(&method, path))));
    }
}

fn bench_table_size(c: &mut Criterion) {
    let mut group = c.benchmark_group("table_size");
    for factories in [1, 10, 100] {
        let router = mounted(factories);
        let path = format!("/v1/tenant{}/users/42", factories - 1);
        group.bench_with_input(BenchmarkId::from_parameter(factories), &path, |b, path| {
            b.iter(|| black_box(router.lookup(&Method::GET, path)));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_lookup, bench_table_size);
criterion_main!(benches);
