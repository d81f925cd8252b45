use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use headline_generator::{
    api::routes::create_router,
    caption::{BlipCaptioner, Captioner, Description, MockCaptioner, PLACEHOLDER_DESCRIPTION},
    config::Config,
    generator::HeadlineGenerator,
    llm::MockLanguageModel,
    AppState,
};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use tower::ServiceExt;

const BOUNDARY: &str = "----headline-test-boundary";
const ORIGINAL: &str = r#"{"headline":"<h1>First Marathon Journey Begins.</h1>","subheadline":"<h3>Every mile counts</h3>"}"#;

enum Part<'a> {
    File {
        name: &'a str,
        file_name: &'a str,
        content_type: &'a str,
        bytes: &'a [u8],
    },
    Text {
        name: &'a str,
        value: &'a str,
    },
}

fn multipart_body(parts: &[Part]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match part {
            Part::File {
                name,
                file_name,
                content_type,
                bytes,
            } => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n"
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(bytes);
            }
            Part::Text { name, value } => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}")
                        .as_bytes(),
                );
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn standard_parts<'a>(content_type: &'a str, insights: &'a str, original: &'a str) -> Vec<Part<'a>> {
    vec![
        Part::File {
            name: "image",
            file_name: "hero.jpg",
            content_type,
            bytes: b"not really a jpeg",
        },
        Part::Text {
            name: "marketing_insights",
            value: insights,
        },
        Part::Text {
            name: "original_headline",
            value: original,
        },
    ]
}

fn state(captioner: Arc<dyn Captioner>, model: MockLanguageModel) -> AppState {
    AppState {
        config: Arc::new(Config::default()),
        captioner,
        generator: Arc::new(HeadlineGenerator::new(Arc::new(model))),
    }
}

struct SlowCaptioner(Duration);

#[async_trait]
impl Captioner for SlowCaptioner {
    async fn caption(&self, _image: &[u8]) -> Description {
        tokio::time::sleep(self.0).await;
        Description::Captioned("too late".to_string())
    }
}

async fn post_generate(state: AppState, parts: &[Part<'_>]) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri("/generate-headline")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(multipart_body(parts)))
        .unwrap();

    send(state, request).await
}

async fn send(state: AppState, request: Request<Body>) -> (StatusCode, Value) {
    let response = create_router(state).oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn root_reports_name_and_version() {
    let app = create_router(state(
        Arc::new(MockCaptioner::new("x")),
        MockLanguageModel::replying("{}"),
    ));

    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["message"], "Optimeleon Headline Generator API");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn returns_model_json_unchanged() {
    let model = MockLanguageModel::replying(
        r#"{"headline":"<h1>Conquer 26.2 in Comfort</h1>","subheadline":"<h3>Blister-free miles</h3>"}"#,
    );
    let captioner = Arc::new(MockCaptioner::new("a woman running at sunrise"));

    let (status, body) = post_generate(
        state(captioner.clone(), model.clone()),
        &standard_parts("image/jpeg", r#"["Fear of injury","Needs comfort"]"#, ORIGINAL),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "headline": "<h1>Conquer 26.2 in Comfort</h1>",
            "subheadline": "<h3>Blister-free miles</h3>"
        })
    );
    assert_eq!(captioner.get_call_count(), 1);

    let prompt = &model.requests()[0].user;
    assert!(prompt.contains("IMAGE DESCRIPTION: a woman running at sunrise"));
    assert!(prompt.contains("MARKETING INSIGHTS: Fear of injury, Needs comfort"));
    assert!(prompt.contains("use <h1> and <h3> tags"));
}

#[tokio::test]
async fn model_failure_returns_fallback_copy() {
    let (status, body) = post_generate(
        state(
            Arc::new(MockCaptioner::new("a runner")),
            MockLanguageModel::failing("401 unauthorized"),
        ),
        &standard_parts("image/png", "[]", ORIGINAL),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "headline": "<h1>Your Personalized Marathon Adventure Starts Now!</h1>",
            "subheadline": "<h3>Every mile counts</h3>"
        })
    );
}

#[tokio::test]
async fn undecodable_image_puts_placeholder_description_in_prompt() {
    let captioner = BlipCaptioner::new("http://127.0.0.1:9/unreachable", None).unwrap();
    let model = MockLanguageModel::replying("Headline: Your first marathon starts here");

    let (status, body) = post_generate(
        state(Arc::new(captioner), model.clone()),
        &standard_parts("image/jpeg", r#"["Beginner runners"]"#, ORIGINAL),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "headline": "<h1>Headline: Your first marathon starts here</h1>",
            "subheadline": "<h3>AI Generated Subheadline</h3>"
        })
    );

    let requests = model.requests();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].user.contains(PLACEHOLDER_DESCRIPTION));
}

#[tokio::test]
async fn rejects_non_image_upload() {
    let model = MockLanguageModel::replying("{}");
    let (status, body) = post_generate(
        state(Arc::new(MockCaptioner::new("x")), model.clone()),
        &standard_parts("text/plain", "[]", ORIGINAL),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "File must be an image");
    assert_eq!(model.call_count(), 0);
}

#[tokio::test]
async fn rejects_malformed_insights_json() {
    let (status, body) = post_generate(
        state(Arc::new(MockCaptioner::new("x")), MockLanguageModel::replying("{}")),
        &standard_parts("image/png", "[not json", ORIGINAL),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"]
        .as_str()
        .unwrap()
        .starts_with("Invalid JSON format: "));
}

#[tokio::test]
async fn rejects_original_without_subheadline() {
    let (status, body) = post_generate(
        state(Arc::new(MockCaptioner::new("x")), MockLanguageModel::replying("{}")),
        &standard_parts("image/png", "[]", r#"{"headline":"<h1>Hi</h1>"}"#),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["detail"],
        "original_headline must contain 'headline' and 'subheadline' keys"
    );
}

#[tokio::test]
async fn missing_field_is_unprocessable() {
    let parts = vec![
        Part::File {
            name: "image",
            file_name: "hero.png",
            content_type: "image/png",
            bytes: b"png",
        },
        Part::Text {
            name: "marketing_insights",
            value: "[]",
        },
    ];

    let (status, body) = post_generate(
        state(Arc::new(MockCaptioner::new("x")), MockLanguageModel::replying("{}")),
        &parts,
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["detail"], "Missing field: original_headline");
}

#[tokio::test]
async fn oversized_upload_is_payload_too_large() {
    let model = MockLanguageModel::replying("{}");
    let mut state = state(Arc::new(MockCaptioner::new("x")), model.clone());
    state.config = Arc::new(Config {
        max_upload_bytes: 1024,
        ..Config::default()
    });

    let big_image = vec![0u8; 4096];
    let parts = vec![
        Part::File {
            name: "image",
            file_name: "hero.png",
            content_type: "image/png",
            bytes: &big_image,
        },
        Part::Text {
            name: "marketing_insights",
            value: "[]",
        },
        Part::Text {
            name: "original_headline",
            value: ORIGINAL,
        },
    ];

    let (status, body) = post_generate(state, &parts).await;

    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert!(body["detail"].is_string());
    assert_eq!(model.call_count(), 0);
}

#[tokio::test]
async fn non_multipart_body_gets_json_error() {
    let request = Request::builder()
        .method("POST")
        .uri("/generate-headline")
        .header("content-type", "application/json")
        .body(Body::from(r#"{"headline":"<h1>Hi</h1>"}"#))
        .unwrap();

    let (status, body) = send(
        state(Arc::new(MockCaptioner::new("x")), MockLanguageModel::replying("{}")),
        request,
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(!body["detail"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn slow_request_times_out() {
    let model = MockLanguageModel::replying("{}");
    let mut state = state(Arc::new(SlowCaptioner(Duration::from_secs(5))), model.clone());
    state.config = Arc::new(Config {
        request_timeout: Duration::from_millis(10),
        ..Config::default()
    });

    let (status, body) =
        post_generate(state, &standard_parts("image/png", "[]", ORIGINAL)).await;

    assert_eq!(status, StatusCode::REQUEST_TIMEOUT);
    assert_eq!(body["detail"], "Request processing timed out");
    assert_eq!(model.call_count(), 0);
}
