use crate::error::*;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use url::Url;

/// Body sent to a grading function endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OracleRequest {
    pub code: String,
    pub language: String,
    pub problem_description: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub test_cases: Vec<OracleTestCase>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OracleTestCase {
    pub input: String,
    pub expected: String,
}

impl OracleRequest {
    pub fn new<S1, S2, S3>(code: S1, language: S2, problem_description: S3) -> Self
    where
        S1: Into<String>,
        S2: Into<String>,
        S3: Into<String>,
    {
        Self {
            code: code.into(),
            language: language.into(),
            problem_description: problem_description.into(),
            test_cases: Vec::new(),
        }
    }

    pub fn test_cases<I, S1, S2>(mut self, cases: I) -> Self
    where
        I: IntoIterator<Item = (S1, S2)>,
        S1: Into<String>,
        S2: Into<String>,
    {
        self.test_cases = cases
            .into_iter()
            .map(|(input, expected)| OracleTestCase {
                input: input.into(),
                expected: expected.into(),
            })
            .collect();
        self
    }
}

/// Verdict as the oracle writes it. Deliberately loose: text generators are
/// inconsistent about types, so the caller validates and normalizes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Verdict {
    pub status: String,
    #[serde(default)]
    pub execution_time: Option<String>,
    #[serde(default)]
    pub memory_used: Option<String>,
    pub test_cases_passed: String,
    #[serde(default)]
    pub failed_test_cases: Vec<VerdictCase>,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub suggestions: Option<String>,
    #[serde(default)]
    pub time_complexity: Option<String>,
    #[serde(default)]
    pub space_complexity: Option<String>,
    /// Either a number or a string such as `"85"` / `"85%"`.
    #[serde(default)]
    pub correctness: Option<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerdictCase {
    #[serde(default)]
    pub input: serde_json::Value,
    #[serde(default)]
    pub expected: serde_json::Value,
    #[serde(default)]
    pub actual: Option<serde_json::Value>,
}

#[async_trait]
pub trait GradingOracle: Send + Sync {
    fn kind(&self) -> crate::OracleKind;

    /// Ask the oracle to judge a submission, returning its raw answer text.
    async fn grade(&self, req: &OracleRequest) -> Result<String>;
}

/// Slice from the first `{` to the last `}` of `text`, if any.
pub fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (start < end).then(|| &text[start..=end])
}

pub fn parse_verdict(text: &str) -> Result<Verdict> {
    let json = self::extract_json_object(text).ok_or(Error::NoJsonObject)?;
    Ok(serde_json::from_str(json)?)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn should_extract_json_wrapped_in_prose() {
        let text = "Here is my analysis:\n```json\n{\"a\": {\"b\": 1}}\n```\nGood luck!";
        assert_eq!(extract_json_object(text), Some("{\"a\": {\"b\": 1}}"));
    }

    #[test]
    fn should_not_extract_without_braces() {
        assert_eq!(extract_json_object("no verdict today"), None);
        assert_eq!(extract_json_object("} backwards {"), None);
    }

    #[test]
    fn should_parse_minimal_verdict() {
        let v = parse_verdict(r#"Sure. {"status": "error", "testCasesPassed": "4/10"}"#).unwrap();
        assert_eq!(v.status, "error");
        assert_eq!(v.test_cases_passed, "4/10");
        assert!(v.failed_test_cases.is_empty());
        assert_eq!(v.correctness, None);
    }

    #[test]
    fn should_parse_full_verdict() {
        let text = r#"{
            "status": "success",
            "executionTime": "42ms",
            "memoryUsed": "8.7MB",
            "testCasesPassed": "10/10",
            "failedTestCases": [{"input": [1, 2], "expected": "[0,1]"}],
            "errorMessage": null,
            "suggestions": "Nice.",
            "timeComplexity": "O(n)",
            "spaceComplexity": "O(n)",
            "correctness": "100%"
        }"#;
        let v = parse_verdict(text).unwrap();
        assert_eq!(v.execution_time.as_deref(), Some("42ms"));
        assert_eq!(v.error_message, None);
        assert_eq!(v.failed_test_cases.len(), 1);
        assert_eq!(v.failed_test_cases[0].actual, None);
        assert_eq!(v.correctness, Some(serde_json::json!("100%")));
    }

    #[test]
    fn broken_json_should_be_error() {
        let err = parse_verdict(r#"{"status": "success", "#).unwrap_err();
        assert!(matches!(err, Error::NoJsonObject));

        let err = parse_verdict(r#"{"status": "success"}"#).unwrap_err();
        assert!(matches!(err, Error::Json(_)), "{:?}", err);
    }

    #[test]
    fn request_should_be_camel_case() {
        let req = OracleRequest::new("print(1)", "python", "Print one.")
            .test_cases([("", "1")]);
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["problemDescription"], "Print one.");
        assert_eq!(json["testCases"][0]["expected"], "1");

        let bare = serde_json::to_value(OracleRequest::new("x", "cpp", "d")).unwrap();
        assert!(bare.get("testCases").is_none());
    }
}
