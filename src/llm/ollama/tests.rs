use super::*;
use serde_json::json;
use url::Url;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn llm_for(server: &MockServer) -> OllamaLlm {
    let url = Url::parse(&server.uri()).expect("mock server uri is a url");
    let config = OllamaConfig {
        host: url.host_str().expect("mock server has a host").to_string(),
        port: url.port().expect("mock server has a port"),
        ..OllamaConfig::default()
    };
    let client = OllamaClient::new(&config)
        .expect("Failed to create client")
        .with_retry_attempts(1);
    OllamaLlm::with_client(client, &GenerationConfig::default())
}

#[test]
fn options_follow_generation_config() {
    let options = GenerationOptions::from(&GenerationConfig::default());
    assert_eq!(
        options,
        GenerationOptions {
            num_predict: 256,
            num_ctx: 2048,
            temperature: 0.3,
            top_k: 20,
            top_p: 0.9,
        }
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn generate_sends_options_and_keep_alive() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .and(body_partial_json(json!({
            "model": "mistral",
            "prompt": "Where should I eat?",
            "stream": false,
            "keep_alive": "10m",
            "options": {"num_predict": 256, "num_ctx": 2048, "top_k": 20}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "model": "mistral",
            "response": "- Green Leaf: vegan bowls",
            "done": true
        })))
        .expect(1)
        .mount(&server)
        .await;

    let llm = llm_for(&server);
    let answer = llm
        .generate("Where should I eat?")
        .await
        .expect("generation succeeds");
    assert_eq!(answer, "- Green Leaf: vegan bowls");
}

#[tokio::test(flavor = "multi_thread")]
async fn server_failure_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let llm = llm_for(&server);
    let error = llm
        .generate("anything")
        .await
        .expect_err("500 is an error");
    assert!(format!("{:#}", error).contains("Failed to generate completion"));
}

#[tokio::test(flavor = "multi_thread")]
async fn malformed_response_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let llm = llm_for(&server);
    let error = llm.generate("anything").await.expect_err("bad json");
    assert!(format!("{:#}", error).contains("Failed to parse generation response"));
}
