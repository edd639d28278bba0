use base64::{Engine, engine::general_purpose::STANDARD};
use hf_inference_kit::client::{
    Envelope, HfClient, InferenceClient, InferenceInput, PipelineKind, ResponseData,
};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use std::time::Duration;
use wiremock::{
    Mock, MockServer, Request, ResponseTemplate,
    matchers::{body_json, header, method, path},
};

mod common;
use common::{create_temp_dir, create_test_config, write_test_image};

const SENTIMENT_MODEL: &str = "distilbert-base-uncased-finetuned-sst-2-english";

fn top_prediction(envelope: &Envelope) -> (String, f64) {
    match envelope.data() {
        Some(ResponseData::Classification(c)) => (c.top_prediction.clone(), c.confidence),
        other => panic!("expected classification, got {other:?}"),
    }
}

#[tokio::test]
async fn test_classification_request_and_normalization() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("/models/{SENTIMENT_MODEL}")))
        .and(header("authorization", "Bearer hf_test_token"))
        .and(body_json(json!({"inputs": "I love programming"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([[
            {"label": "NEG", "score": 0.1},
            {"label": "POS", "score": 0.9}
        ]])))
        .expect(1)
        .mount(&server)
        .await;

    let client = HfClient::new(
        &create_test_config(&server.uri()),
        Some("hf_test_token".to_string()),
    )
    .unwrap();

    let envelope = client
        .query(
            SENTIMENT_MODEL,
            &InferenceInput::text("I love programming"),
            &PipelineKind::TextClassification,
        )
        .await;

    assert!(envelope.is_success());
    assert_eq!(top_prediction(&envelope), ("POS".to_string(), 0.9));
}

#[tokio::test]
async fn test_server_error_is_retried_then_reported() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/models/gpt2"))
        .respond_with(
            ResponseTemplate::new(500).set_body_json(json!({"error": "Internal failure"})),
        )
        .expect(3)
        .mount(&server)
        .await;

    let client = HfClient::new(&create_test_config(&server.uri()), None).unwrap();
    let envelope = client
        .query(
            "gpt2",
            &InferenceInput::text("Once upon a time"),
            &PipelineKind::TextGeneration,
        )
        .await;

    let message = envelope.message().expect("error envelope");
    assert!(message.starts_with("API request failed"), "{message}");
    assert!(message.contains("500"), "{message}");
    assert!(message.contains("Internal failure"), "{message}");
    assert_eq!(client.cache_info().size, 0);
}

#[tokio::test]
async fn test_huge_backoff_multiplier_yields_error_envelope() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/models/gpt2"))
        .respond_with(ResponseTemplate::new(502))
        .expect(2)
        .mount(&server)
        .await;

    let mut config = create_test_config(&server.uri());
    config.retry.max_attempts = 2;
    config.retry.backoff_multiplier = 1e300;
    let client = HfClient::new(&config, None).unwrap();

    let envelope = client
        .query("gpt2", &InferenceInput::text("hi"), &PipelineKind::TextGeneration)
        .await;

    let message = envelope.message().expect("error envelope");
    assert!(message.starts_with("API request failed"), "{message}");
    assert!(message.contains("502"), "{message}");
}

#[tokio::test]
async fn test_transient_failure_recovers_on_retry() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/models/gpt2"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/models/gpt2"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([{"generated_text": "Once upon a time, a crab"}])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = HfClient::new(&create_test_config(&server.uri()), None).unwrap();
    let envelope = client
        .query(
            "gpt2",
            &InferenceInput::text("Once upon a time"),
            &PipelineKind::TextGeneration,
        )
        .await;

    assert_eq!(
        serde_json::to_value(&envelope).unwrap(),
        json!({"status": "success", "data": {"output": "Once upon a time, a crab"}})
    );
}

#[tokio::test]
async fn test_repeated_query_is_served_from_cache() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("/models/{SENTIMENT_MODEL}")))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([[{"label": "POS", "score": 0.7}]])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = HfClient::new(&create_test_config(&server.uri()), None).unwrap();
    let input = InferenceInput::text("great");

    let first = client
        .query(SENTIMENT_MODEL, &input, &PipelineKind::TextClassification)
        .await;
    let second = client
        .query(SENTIMENT_MODEL, &input, &PipelineKind::TextClassification)
        .await;

    assert_eq!(first, second);
    let info = client.cache_info();
    assert_eq!(info.size, 1);
    assert_eq!(info.hits, 1);

    client.clear_cache();
    assert_eq!(client.cache_info().size, 0);
}

#[tokio::test]
async fn test_unexpected_shape_is_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/models/gpt2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"unexpected": true})))
        .expect(1)
        .mount(&server)
        .await;

    let client = HfClient::new(&create_test_config(&server.uri()), None).unwrap();
    let envelope = client
        .query("gpt2", &InferenceInput::text("hi"), &PipelineKind::TextGeneration)
        .await;

    assert!(
        envelope
            .message()
            .unwrap()
            .starts_with("Failed to format output")
    );
}

#[tokio::test]
async fn test_no_authorization_header_without_credential() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(|req: &Request| !req.headers.contains_key("authorization"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(["ok"])))
        .expect(2)
        .mount(&server)
        .await;

    // A blank credential counts as no credential
    for api_key in [None, Some("   ".to_string())] {
        let client = HfClient::new(&create_test_config(&server.uri()), api_key).unwrap();
        let envelope = client
            .query("gpt2", &InferenceInput::text("hi"), &PipelineKind::TextGeneration)
            .await;

        assert!(envelope.is_success());
    }
}

#[tokio::test]
async fn test_empty_model_id_uses_default_model() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/models/gpt2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let mut config = create_test_config(&server.uri());
    config.client.default_model = Some("gpt2".to_string());
    let client = HfClient::new(&config, None).unwrap();

    let envelope = client
        .query("", &InferenceInput::text("hi"), &PipelineKind::TextGeneration)
        .await;
    assert_eq!(
        serde_json::to_value(&envelope).unwrap()["data"]["output"],
        "No results returned"
    );
}

#[tokio::test]
async fn test_image_is_sent_as_base64_jpeg() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/models/microsoft/resnet-50"))
        .and(|req: &Request| {
            let Ok(body) = serde_json::from_slice::<Value>(&req.body) else {
                return false;
            };
            let Some(encoded) = body["inputs"].as_str() else {
                return false;
            };
            STANDARD
                .decode(encoded)
                .map(|bytes| bytes.starts_with(&[0xFF, 0xD8, 0xFF]))
                .unwrap_or(false)
        })
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"label": "tabby cat", "score": 0.8},
            {"label": "tiger cat", "score": 0.15}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let dir = create_temp_dir();
    let image = write_test_image(&dir, "cat.png", 64, 48);

    let client = HfClient::new(&create_test_config(&server.uri()), None).unwrap();
    let envelope = client
        .query(
            "microsoft/resnet-50",
            &InferenceInput::image(&image),
            &PipelineKind::ImageClassification,
        )
        .await;

    assert_eq!(top_prediction(&envelope), ("tabby cat".to_string(), 0.8));
    match envelope.data() {
        Some(ResponseData::Classification(c)) => {
            assert_eq!(c.all_predictions, vec!["tabby cat (80.00%)", "tiger cat (15.00%)"]);
        }
        other => panic!("expected classification, got {other:?}"),
    }
}

#[tokio::test]
async fn test_unreadable_image_reports_processing_error_without_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let dir = create_temp_dir();
    let broken = dir.path().join("broken.jpg");
    std::fs::write(&broken, b"definitely not a jpeg").unwrap();

    let client = HfClient::new(&create_test_config(&server.uri()), None).unwrap();
    let envelope = client
        .query(
            "microsoft/resnet-50",
            &InferenceInput::image(&broken),
            &PipelineKind::ImageClassification,
        )
        .await;

    assert!(
        envelope
            .message()
            .unwrap()
            .starts_with("Error processing query")
    );
}

#[tokio::test]
async fn test_timeout_is_a_transport_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!(["late"]))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let mut config = create_test_config(&server.uri());
    config.client.timeout_secs = 1;
    config.retry.max_attempts = 1;
    let client = HfClient::new(&config, None).unwrap();

    let envelope = client
        .query("gpt2", &InferenceInput::text("hi"), &PipelineKind::TextGeneration)
        .await;

    assert!(envelope.message().unwrap().starts_with("API request failed"));
}

#[tokio::test]
async fn test_mock_mode_never_touches_the_network() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let mut config = create_test_config(&server.uri());
    config.client.mock_mode = true;
    let client = HfClient::new(&config, None).unwrap();

    for pipeline in [
        PipelineKind::TextClassification,
        PipelineKind::TextGeneration,
        PipelineKind::ImageClassification,
    ] {
        let envelope = client
            .query("any-model", &InferenceInput::text("x"), &pipeline)
            .await;
        assert_eq!(top_prediction(&envelope), ("MOCK_LABEL".to_string(), 0.95));
    }
}
