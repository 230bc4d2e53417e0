//! End-to-end tests for `/users` forwarding and the substitute fallback.

mod common;

use assert_json_diff::assert_json_eq;
use common::{
    client, json_response, refused_upstream_url, start_proxy, start_silent_upstream,
    start_upstream,
};
use fallback_proxy::substitute::SUBSTITUTE_USERS;
use serde_json::Value;

async fn assert_substitute(resp: reqwest::Response) {
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.headers()["x-proxy-fallback"], "true");
    assert_eq!(resp.headers()["access-control-allow-origin"], "*");
    assert_eq!(resp.headers()["content-type"], "application/json");

    let body: Value = resp.json().await.unwrap();
    assert_json_eq!(body, serde_json::to_value(&SUBSTITUTE_USERS).unwrap());
    assert_eq!(body.as_array().unwrap().len(), 2);
    assert_eq!(body[0]["username"], "johndoe");
    assert_eq!(body[1]["username"], "mor_2314");
}

#[tokio::test]
async fn test_relays_upstream_status_and_body_verbatim() {
    let upstream = start_upstream(|req, _| {
        if req.path_and_query == "/users/1" {
            json_response(404, "{}")
        } else {
            json_response(500, r#"{"unexpected":true}"#)
        }
    })
    .await;
    let proxy = start_proxy(&upstream.url(), 5000).await;

    let resp = client()
        .get(format!("http://{proxy}/users/1"))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 404);
    assert!(resp.headers().get("x-proxy-fallback").is_none());
    assert_eq!(resp.headers()["access-control-allow-origin"], "*");
    assert_eq!(resp.text().await.unwrap(), "{}");
}

#[tokio::test]
async fn test_forwards_path_query_and_rewrites_host() {
    let upstream =
        start_upstream(|req, _| json_response(200, &format!("\"{}\"", req.path_and_query)))
            .await;
    let proxy = start_proxy(&upstream.url(), 5000).await;

    let resp = client()
        .get(format!("http://{proxy}/users?limit=2&sort=desc"))
        .header("x-request-id", "abc-123")
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body, "/users?limit=2&sort=desc");

    let seen = upstream.seen();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].headers["host"], upstream.addr.to_string().as_str());
    assert_eq!(seen[0].headers["x-request-id"], "abc-123");
}

#[tokio::test]
async fn test_forwards_method_and_body() {
    let upstream = start_upstream(|req, _| {
        let echoed = String::from_utf8_lossy(&req.body).to_string();
        json_response(201, &format!(r#"{{"method":"{}","body":{}}}"#, req.method, echoed))
    })
    .await;
    let proxy = start_proxy(&upstream.url(), 5000).await;

    let resp = client()
        .post(format!("http://{proxy}/users"))
        .header("content-type", "application/json")
        .body(r#"{"username":"new"}"#)
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 201);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["method"], "POST");
    assert_eq!(body["body"]["username"], "new");
}

#[tokio::test]
async fn test_each_request_reaches_upstream() {
    let upstream =
        start_upstream(|_, hit| json_response(200, &format!(r#"{{"hit":{hit}}}"#))).await;
    let proxy = start_proxy(&upstream.url(), 5000).await;
    let client = client();

    for expected in 1..=2 {
        let body: Value = client
            .get(format!("http://{proxy}/users"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(body["hit"], expected);
    }
    assert_eq!(upstream.hits(), 2);
}

#[tokio::test]
async fn test_connection_refused_serves_substitute() {
    let proxy = start_proxy(&refused_upstream_url(), 5000).await;

    let resp = client()
        .get(format!("http://{proxy}/users"))
        .send()
        .await
        .unwrap();
    assert_substitute(resp).await;
}

#[tokio::test]
async fn test_fallback_ignores_subpath_and_method() {
    let proxy = start_proxy(&refused_upstream_url(), 5000).await;

    let resp = client()
        .delete(format!("http://{proxy}/users/7"))
        .send()
        .await
        .unwrap();
    assert_substitute(resp).await;
}

#[tokio::test]
async fn test_timeout_serves_substitute() {
    let silent = start_silent_upstream().await;
    let proxy = start_proxy(&format!("http://{silent}"), 300).await;

    let started = std::time::Instant::now();
    let resp = client()
        .get(format!("http://{proxy}/users"))
        .send()
        .await
        .unwrap();

    assert!(started.elapsed() < std::time::Duration::from_secs(5));
    assert_substitute(resp).await;
}

#[tokio::test]
async fn test_unresolvable_host_serves_substitute() {
    let proxy = start_proxy("http://upstream.invalid", 3000).await;

    let resp = client()
        .get(format!("http://{proxy}/users"))
        .send()
        .await
        .unwrap();
    assert_substitute(resp).await;
}

#[tokio::test]
async fn test_upstream_cors_origin_is_preserved() {
    let upstream = start_upstream(|_, _| {
        let mut resp = json_response(200, "[]");
        resp.headers_mut().insert(
            "access-control-allow-origin",
            "https://shop.example".parse().unwrap(),
        );
        resp
    })
    .await;
    let proxy = start_proxy(&upstream.url(), 5000).await;

    let resp = client()
        .get(format!("http://{proxy}/users"))
        .send()
        .await
        .unwrap();

    assert_eq!(
        resp.headers()["access-control-allow-origin"],
        "https://shop.example"
    );
}

#[tokio::test]
async fn test_connection_listed_headers_not_forwarded() {
    let upstream = start_upstream(|_, _| {
        let mut resp = json_response(200, "[]");
        resp.headers_mut()
            .insert("connection", "x-upstream-hint".parse().unwrap());
        resp.headers_mut()
            .insert("x-upstream-hint", "internal".parse().unwrap());
        resp
    })
    .await;
    let proxy = start_proxy(&upstream.url(), 5000).await;

    let resp = client()
        .get(format!("http://{proxy}/users"))
        .header("connection", "x-session-hint")
        .header("x-session-hint", "abc")
        .header("x-request-id", "r-7")
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 200);
    assert!(resp.headers().get("x-upstream-hint").is_none());

    let seen = upstream.seen();
    assert!(seen[0].headers.get("x-session-hint").is_none());
    assert_eq!(seen[0].headers["x-request-id"], "r-7");
}

#[tokio::test]
async fn test_extension_methods_do_not_add_metric_series() {
    let upstream = start_upstream(|_, _| json_response(204, "")).await;
    let proxy = start_proxy(&upstream.url(), 5000).await;
    let client = client();

    for i in 0..10 {
        let method = reqwest::Method::from_bytes(format!("SPAM{i}").as_bytes()).unwrap();
        let resp = client
            .request(method, format!("http://{proxy}/users"))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 204);
    }
    assert_eq!(upstream.hits(), 10);

    let text = client
        .get(format!("http://{proxy}/metrics"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(!text.contains("SPAM"));
    assert!(text.contains("method=\"other\""));
}
