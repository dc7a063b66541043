use async_trait::async_trait;
use axum::body::Body;
use blobgate_core::{Context, Error, ProvideSecret, RawSecret, Result};
use blobgate_server::{router, AppState, ServerConfig};
use http::{Request, StatusCode};
use http_body_util::BodyExt;
use tower::ServiceExt;

#[derive(Debug)]
struct FixedSecret(&'static str);

#[async_trait]
impl ProvideSecret for FixedSecret {
    async fn provide_secret(&self, _: &Context) -> Result<RawSecret> {
        Ok(RawSecret::new(self.0))
    }
}

#[derive(Debug)]
struct MissingSecret;

#[async_trait]
impl ProvideSecret for MissingSecret {
    async fn provide_secret(&self, _: &Context) -> Result<RawSecret> {
        Err(Error::secret_not_found(
            "vault holds no secret named storageConnectionString",
        ))
    }
}

fn app(secrets: impl ProvideSecret + 'static) -> axum::Router {
    let config = ServerConfig {
        vault_uri: "https://example-vault.vault.azure.net".to_string(),
        ..ServerConfig::default()
    };
    router(AppState::new(Context::new(), config, secrets))
}

async fn body_json(resp: http::Response<Body>) -> serde_json::Value {
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_string(resp: http::Response<Body>) -> String {
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn test_issues_token_for_valid_secret() {
    let app = app(FixedSecret(
        "DefaultEndpointsProtocol=https;AccountName=testaccount;\
         AccountKey=dGVzdGFjY291bnRrZXk=;EndpointSuffix=core.windows.net",
    ));

    let resp = app
        .oneshot(Request::get("/api/token").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers()[http::header::CONTENT_TYPE],
        "application/json"
    );

    let body = body_json(resp).await;
    assert_eq!(
        body["uri"],
        "https://testaccount.blob.core.windows.net/images"
    );
    assert_eq!(body["message"], "Pipeline test.");

    let token = body["token"].as_str().unwrap();
    assert!(token.contains("sv="), "missing version: {token}");
    assert!(token.contains("sr=c"), "missing resource: {token}");
    assert!(token.contains("se="), "missing expiry: {token}");
    assert!(token.contains("sp=rwl"), "missing permissions: {token}");
    assert!(token.contains("sig="), "missing signature: {token}");
}

#[tokio::test]
async fn test_vault_failure_maps_to_forbidden() {
    let app = app(MissingSecret);

    let resp = app
        .oneshot(Request::get("/api/token").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    let body = body_string(resp).await;
    assert!(
        body.starts_with("Unable to access secrets in vault: "),
        "unexpected body: {body}"
    );
}

#[tokio::test]
async fn test_malformed_secret_maps_to_bad_request() {
    // AccountName is missing entirely.
    let app = app(FixedSecret(
        "AccountKey=dGVzdGFjY291bnRrZXk=;EndpointSuffix=core.windows.net",
    ));

    let resp = app
        .oneshot(Request::get("/api/token").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = body_string(resp).await;
    assert!(
        !body.contains("dGVzdGFjY291bnRrZXk"),
        "secret content leaked into response: {body}"
    );
}

#[tokio::test]
async fn test_post_is_method_not_allowed() {
    let app = app(FixedSecret("unused"));

    let resp = app
        .oneshot(Request::post("/api/token").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
    let body = body_string(resp).await;
    assert!(body.is_empty(), "expected empty body, got: {body}");
}

#[tokio::test]
async fn test_unknown_path_is_not_found() {
    let app = app(FixedSecret("unused"));

    let resp = app
        .oneshot(Request::get("/api/other").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
