use brrtrouter_cors::dispatcher::{HandlerRequest, HandlerResponse};
use brrtrouter_cors::middleware::CorsMiddleware;
use criterion::{criterion_group, criterion_main, Criterion};
use http::Method;
use regex::Regex;
use std::hint::black_box;

fn sample_requests() -> Vec<HandlerRequest> {
    vec![
        HandlerRequest::new(Method::GET, "/pets").with_header("Origin", "https://app.example.com"),
        HandlerRequest::new(Method::GET, "/pets").with_header("Origin", "https://evil.example.org"),
        HandlerRequest::new(Method::OPTIONS, "/pets")
            .with_header("Origin", "https://admin.example.com")
            .with_header("Access-Control-Request-Method", "PUT"),
        HandlerRequest::new(Method::POST, "/pets"),
    ]
}

fn bench_cors_policies(c: &mut Criterion) {
    let requests = sample_requests();
    let policies = [
        ("wildcard", CorsMiddleware::default()),
        (
            "allow_list",
            CorsMiddleware::builder()
                .origin([
                    "https://app.example.com",
                    "https://admin.example.com",
                    "https://docs.example.com",
                ])
                .credentials(true)
                .max_age(600)
                .build()
                .expect("valid policy"),
        ),
        (
            "pattern",
            CorsMiddleware::builder()
                .origin(Regex::new(r"^https://([a-z]+\.)?example\.com$").expect("valid regex"))
                .exposed_headers(["X-Total-Count"])
                .build()
                .expect("valid policy"),
        ),
    ];

    for (name, cors) in &policies {
        c.bench_function(&format!("cors_handle_{name}"), |b| {
            b.iter(|| {
                for req in &requests {
                    let mut res = HandlerResponse::default();
                    let mut next = |_: &HandlerRequest, res: &mut HandlerResponse| res.status = 200;
                    let flow = cors.handle(req, &mut res, Some(&mut next));
                    black_box((&res, flow));
                }
            })
        });
    }
}

criterion_group!(benches, bench_cors_policies);
criterion_main!(benches);
