use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

use drill_oracle::{Verdict, VerdictCase};

use super::TestCase;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum Status {
    Success,
    Error,
}

/// `passed` out of `total` test cases, written as `"passed/total"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PassCount {
    passed: u32,
    total: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParsePassCountError {
    #[error("Expected 'passed/total', got {0:?}")]
    Format(String),

    #[error("Invalid number in pass count: {0}")]
    Number(#[from] ParseIntError),

    #[error("Passed count {passed} exceeds total {total}")]
    Exceeds { passed: u32, total: u32 },
}

impl PassCount {
    pub fn new(passed: u32, total: u32) -> Result<Self, ParsePassCountError> {
        if passed > total {
            return Err(ParsePassCountError::Exceeds { passed, total });
        }
        Ok(Self { passed, total })
    }

    pub const fn all(total: u32) -> Self {
        Self {
            passed: total,
            total,
        }
    }

    /// Like [`PassCount::new`] but caps `passed` at `total`.
    pub fn clamped(passed: u32, total: u32) -> Self {
        Self {
            passed: passed.min(total),
            total,
        }
    }

    pub const fn none(total: u32) -> Self {
        Self { passed: 0, total }
    }

    pub const fn passed(&self) -> u32 {
        self.passed
    }

    pub const fn total(&self) -> u32 {
        self.total
    }

    pub const fn is_all_passed(&self) -> bool {
        self.passed == self.total
    }

    /// Rounded-down percentage of passed cases; 0 when there are no cases.
    pub fn percentage(&self) -> u8 {
        if self.total == 0 {
            return 0;
        }
        (u64::from(self.passed) * 100 / u64::from(self.total)) as u8
    }
}

impl fmt::Display for PassCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.passed, self.total)
    }
}

impl FromStr for PassCount {
    type Err = ParsePassCountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (passed, total) = s
            .split_once('/')
            .ok_or_else(|| ParsePassCountError::Format(s.to_owned()))?;
        Self::new(passed.trim().parse()?, total.trim().parse()?)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedCase {
    pub input: String,
    pub expected: String,
    pub actual: Option<String>,
}

impl From<&TestCase> for FailedCase {
    fn from(t: &TestCase) -> Self {
        Self {
            input: t.input.clone(),
            expected: t.expected_output.clone(),
            actual: None,
        }
    }
}

/// Verdict on one submission. Built through the constructors below, which keep
/// `Success` results at full pass count with no failed cases.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvaluationResult {
    status: Status,
    tests_passed: PassCount,
    failed_cases: Vec<FailedCase>,
    error_message: Option<String>,
    suggestions: String,
    time_complexity: Option<String>,
    space_complexity: Option<String>,
    correctness: Option<u8>,
    execution_time: Option<String>,
    memory_used: Option<String>,
}

impl EvaluationResult {
    pub const DEFAULT_SUGGESTIONS: &str = "No suggestions.";
    pub const FALLBACK_MESSAGE: &str =
        "Failed to analyze code with AI. Please check your implementation.";
    pub const FALLBACK_SUGGESTIONS: &str = "Unable to provide AI feedback at this time. \
        Try implementing a hash map approach for O(n) time complexity.";
    pub const GRADING_FAILURE_MESSAGE: &str = "Internal error during code analysis";

    fn new(
        status: Status,
        tests_passed: PassCount,
        error_message: Option<String>,
        suggestions: String,
    ) -> Self {
        let suggestions = if suggestions.trim().is_empty() {
            Self::DEFAULT_SUGGESTIONS.to_owned()
        } else {
            suggestions
        };
        Self {
            status,
            tests_passed,
            failed_cases: Vec::new(),
            error_message,
            suggestions,
            time_complexity: None,
            space_complexity: None,
            correctness: None,
            execution_time: None,
            memory_used: None,
        }
    }

    pub fn success(total: u32, suggestions: impl Into<String>) -> Self {
        Self::new(
            Status::Success,
            PassCount::all(total),
            None,
            suggestions.into(),
        )
    }

    pub fn error(
        tests_passed: PassCount,
        message: impl Into<String>,
        suggestions: impl Into<String>,
    ) -> Self {
        Self::new(
            Status::Error,
            tests_passed,
            Some(message.into()),
            suggestions.into(),
        )
    }

    /// Reported when the grading oracle cannot produce a usable verdict.
    pub fn fallback(total: u32) -> Self {
        Self::error(
            PassCount::none(total),
            Self::FALLBACK_MESSAGE,
            Self::FALLBACK_SUGGESTIONS,
        )
        .with_complexity("Unknown", "Unknown")
        .with_correctness(0)
    }

    /// Reported when the evaluator itself fails or panics.
    pub fn grading_failure(total: u32) -> Self {
        Self::error(
            PassCount::none(total),
            Self::GRADING_FAILURE_MESSAGE,
            "Please try again or check your code for syntax errors.",
        )
    }

    /// Ignored on success results, which never carry failed cases.
    pub fn with_failed_cases(mut self, cases: impl IntoIterator<Item = FailedCase>) -> Self {
        if self.status == Status::Error {
            self.failed_cases = cases.into_iter().collect();
        }
        self
    }

    pub fn with_complexity(mut self, time: impl Into<String>, space: impl Into<String>) -> Self {
        self.time_complexity = Some(time.into());
        self.space_complexity = Some(space.into());
        self
    }

    /// Clamped to 100.
    pub fn with_correctness(mut self, percent: u8) -> Self {
        self.correctness = Some(percent.min(100));
        self
    }

    pub fn with_resources(
        mut self,
        execution_time: Option<String>,
        memory_used: Option<String>,
    ) -> Self {
        self.execution_time = execution_time;
        self.memory_used = memory_used;
        self
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn is_success(&self) -> bool {
        self.status == Status::Success
    }

    pub fn tests_passed(&self) -> PassCount {
        self.tests_passed
    }

    pub fn failed_cases(&self) -> &[FailedCase] {
        &self.failed_cases
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    pub fn suggestions(&self) -> &str {
        &self.suggestions
    }

    pub fn time_complexity(&self) -> Option<&str> {
        self.time_complexity.as_deref()
    }

    pub fn space_complexity(&self) -> Option<&str> {
        self.space_complexity.as_deref()
    }

    pub fn correctness(&self) -> Option<u8> {
        self.correctness
    }

    pub fn execution_time(&self) -> Option<&str> {
        self.execution_time.as_deref()
    }

    pub fn memory_used(&self) -> Option<&str> {
        self.memory_used.as_deref()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum VerdictError {
    #[error("Unknown verdict status: {0:?}")]
    Status(String),

    #[error("Invalid testCasesPassed")]
    PassCount(#[from] ParsePassCountError),

    #[error("Invalid correctness: {0}")]
    Correctness(serde_json::Value),
}

impl TryFrom<Verdict> for EvaluationResult {
    type Error = VerdictError;

    fn try_from(v: Verdict) -> Result<Self, Self::Error> {
        let tests_passed: PassCount = v.test_cases_passed.parse()?;
        let correctness = v
            .correctness
            .filter(|c| !c.is_null())
            .map(|c| parse_correctness(&c).ok_or(VerdictError::Correctness(c)))
            .transpose()?;

        let is_success = match v.status.trim().to_ascii_lowercase().as_str() {
            "success" => true,
            "error" => false,
            _ => return Err(VerdictError::Status(v.status)),
        };
        let failed_cases: Vec<FailedCase> =
            v.failed_test_cases.iter().map(FailedCase::from).collect();
        let suggestions = v.suggestions.unwrap_or_default();

        let res = if is_success && tests_passed.is_all_passed() && failed_cases.is_empty() {
            EvaluationResult::success(tests_passed.total(), suggestions)
        } else {
            let message = v.error_message.filter(|m| !m.trim().is_empty());
            let message = match (is_success, message) {
                (_, Some(m)) => m,
                (true, None) => "Some test cases failed".to_owned(),
                (false, None) => "Unknown error".to_owned(),
            };
            EvaluationResult::error(tests_passed, message, suggestions)
                .with_failed_cases(failed_cases)
        };

        let mut res = res.with_resources(v.execution_time, v.memory_used);
        res.time_complexity = v.time_complexity;
        res.space_complexity = v.space_complexity;
        if let Some(c) = correctness {
            res = res.with_correctness(c);
        }
        Ok(res)
    }
}

impl From<&VerdictCase> for FailedCase {
    fn from(c: &VerdictCase) -> Self {
        Self {
            input: stringify(&c.input),
            expected: stringify(&c.expected),
            actual: c.actual.as_ref().filter(|a| !a.is_null()).map(stringify),
        }
    }
}

fn stringify(v: &serde_json::Value) -> String {
    match v {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Accepts `85`, `85.5`, `"85"` and `"85%"`; rounds and clamps to 0..=100.
fn parse_correctness(v: &serde_json::Value) -> Option<u8> {
    let n = match v {
        serde_json::Value::Number(n) => n.as_f64()?,
        serde_json::Value::String(s) => s.trim().trim_end_matches('%').trim().parse().ok()?,
        _ => return None,
    };
    if !n.is_finite() {
        return None;
    }
    Some(n.round().clamp(0.0, 100.0) as u8)
}
