use std::fmt::Write as _;

use crate::OracleRequest;

const DEFAULT_TOTAL: usize = 10;

const VERDICT_SHAPE: &str = r#"{
  "status": "success" | "error",
  "executionTime": "estimated time (e.g. '42ms')",
  "memoryUsed": "estimated memory (e.g. '8.7MB')",
  "testCasesPassed": "X/TOTAL",
  "failedTestCases": [
    {
      "input": "test input",
      "expected": "expected output",
      "actual": "what the code would output, if incorrect"
    }
  ],
  "errorMessage": "what went wrong, if anything",
  "suggestions": "feedback on algorithm, efficiency and edge cases",
  "timeComplexity": "Big O notation",
  "spaceComplexity": "Big O notation",
  "correctness": "score 0-100"
}"#;

/// Judging prompt for text-generation oracles.
pub fn build(req: &OracleRequest) -> String {
    let total = match req.test_cases.len() {
        0 => DEFAULT_TOTAL,
        n => n,
    };

    let mut s = String::with_capacity(req.code.len() + 2048);
    s.push_str(
        "You are an expert judge for coding interview problems. \
         Analyze the following code submission.\n\n",
    );
    let _ = writeln!(s, "**Problem**: {}\n", req.problem_description.trim());
    let _ = writeln!(s, "**Language**: {}", req.language);
    let _ = writeln!(s, "**Code**:\n```{}\n{}\n```\n", req.language, req.code);
    let _ = writeln!(
        s,
        "Reply with a single JSON object of this shape and nothing else:\n{}\n",
        VERDICT_SHAPE.replace("TOTAL", &total.to_string())
    );

    if !req.test_cases.is_empty() {
        s.push_str("Consider these test cases:\n");
        for (i, t) in req.test_cases.iter().enumerate() {
            let _ = writeln!(s, "{}. {} → {}", i + 1, t.input, t.expected);
        }
        s.push('\n');
    }

    s.push_str(
        "Check the approach for correctness, estimate its performance, \
         and point out edge cases or logic errors it mishandles.\n",
    );
    s
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn prompt_should_list_testcases_and_total() {
        let req = OracleRequest::new("return []", "javascript", "Two Sum")
            .test_cases([("[3,3], 6", "[0,1]"), ("[3,2,4], 6", "[1,2]")]);
        let p = build(&req);

        assert!(p.contains("**Problem**: Two Sum"));
        assert!(p.contains("```javascript\nreturn []\n```"));
        assert!(p.contains("\"X/2\""));
        assert!(p.contains("1. [3,3], 6 → [0,1]"));
        assert!(p.contains("2. [3,2,4], 6 → [1,2]"));
    }

    #[test]
    fn prompt_without_testcases_should_assume_ten() {
        let p = build(&OracleRequest::new("pass", "python", "Anything"));
        assert!(p.contains("\"X/10\""));
        assert!(!p.contains("Consider these test cases"));
    }
}
