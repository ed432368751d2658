use std::time::Duration;

use drill_oracle::*;

use fake_server::{serve_once, unreachable_url};

fn two_sum_request() -> OracleRequest {
    OracleRequest::new(
        "def two_sum(nums, target):\n    seen = {}\n",
        "python",
        "Two Sum - return indices of the two numbers adding up to target.",
    )
    .test_cases([("[2,7,11,15], 9", "[0,1]"), ("[3,3], 6", "[0,1]")])
}

#[tokio::test]
async fn function_oracle_should_post_request_and_return_body() {
    let body = r#"{"status": "success", "testCasesPassed": "2/2"}"#.to_owned();
    let (base_url, server) = serve_once("200 OK", body.clone()).await;

    let cfg = OracleConfig::new(
        OracleKind::Function,
        Url::parse(&format!("{}/functions/v1/analyze-code", base_url)).unwrap(),
    )
    .api_key("t0ken");
    let oracle = new_oracle(&cfg).unwrap();
    assert_eq!(oracle.kind(), OracleKind::Function);

    let got = oracle.grade(&two_sum_request()).await.unwrap();
    assert_eq!(got, body);

    let request = server.await.unwrap();
    assert!(request.starts_with("POST /functions/v1/analyze-code HTTP/1.1"));
    assert!(request.contains("authorization: Bearer t0ken") || request.contains("Authorization: Bearer t0ken"));
    assert!(request.contains(r#""problemDescription":"Two Sum - return indices"#));
    assert!(request.contains(r#""language":"python""#));
    assert!(request.contains(r#""testCases":[{"input":"[2,7,11,15], 9","expected":"[0,1]"}"#));
}

#[tokio::test]
async fn non_2xx_should_be_unexpected_response_code() {
    let (base_url, server) = serve_once("500 Internal Server Error", "{}".to_owned()).await;

    let cfg = OracleConfig::new(OracleKind::Function, Url::parse(&base_url).unwrap());
    let err = new_oracle(&cfg)
        .unwrap()
        .grade(&two_sum_request())
        .await
        .unwrap_err();
    assert!(
        matches!(err, Error::UnexpectedResponseCode { got, .. } if got.as_u16() == 500),
        "{:?}",
        err
    );
    server.await.unwrap();
}

#[tokio::test]
async fn unreachable_oracle_should_be_http_error() {
    let mut cfg = OracleConfig::new(OracleKind::Function, Url::parse(&unreachable_url().await).unwrap());
    cfg.timeout_secs = 5;

    let err = new_oracle(&cfg)
        .unwrap()
        .grade(&two_sum_request())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Http(_)), "{:?}", err);
}

#[tokio::test]
async fn gemini_oracle_should_send_prompt_and_unwrap_candidate() {
    let body = serde_json::json!({
        "candidates": [{
            "content": {"parts": [{"text": "```json\n{\"status\": \"error\", \"testCasesPassed\": \"1/2\"}\n```"}]}
        }]
    })
    .to_string();
    let (base_url, server) = serve_once("200 OK", body).await;

    let cfg = OracleConfig::new(OracleKind::Gemini, Url::parse(&base_url).unwrap()).api_key("k3y");
    let oracle = GeminiOracle::new(&cfg).unwrap();

    let text = tokio::time::timeout(Duration::from_secs(10), oracle.grade(&two_sum_request()))
        .await
        .unwrap()
        .unwrap();
    let verdict = parse_verdict(&text).unwrap();
    assert_eq!(verdict.status, "error");
    assert_eq!(verdict.test_cases_passed, "1/2");

    let request = server.await.unwrap();
    assert!(request.starts_with("POST /models/gemini-1.5-flash:generateContent?key=k3y HTTP/1.1"));
    assert!(request.contains(r#""generationConfig":{"temperature":0.1,"topK":1,"topP":1.0,"maxOutputTokens":2048}"#));
    assert!(request.contains("Consider these test cases"));
}
