use std::ops::RangeInclusive;
use std::sync::Arc;

use async_trait::async_trait;
use lazy_regex::{lazy_regex, Lazy, Regex};

use super::random::{self, RandomSource, ThreadRandom};
use super::Evaluator;
use crate::model::{EvaluationResult, FailedCase, Language, PassCount, Problem};
use crate::template;

/// Grades by reading the source text only. Nothing is compiled or run: the
/// verdict comes from a few structural signals plus a random pass count.
#[derive(Clone)]
pub struct HeuristicEvaluator {
    min_source_len: usize,
    random: Arc<dyn RandomSource>,
}

impl Default for HeuristicEvaluator {
    fn default() -> Self {
        Self {
            min_source_len: Self::DEFAULT_MIN_SOURCE_LEN,
            random: Arc::new(ThreadRandom),
        }
    }
}

impl std::fmt::Debug for HeuristicEvaluator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HeuristicEvaluator")
            .field("min_source_len", &self.min_source_len)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Signals {
    pub uses_map: bool,
    pub loop_count: usize,
}

impl Signals {
    pub fn has_nested_loops(&self) -> bool {
        self.loop_count >= 2
    }
}

impl HeuristicEvaluator {
    pub const DEFAULT_MIN_SOURCE_LEN: usize = 50;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn min_source_len(mut self, len: usize) -> Self {
        self.min_source_len = len;
        self
    }

    pub fn random(mut self, random: impl RandomSource + 'static) -> Self {
        self.random = Arc::new(random);
        self
    }

    pub fn grade(&self, source: &str, language: Language, problem: &Problem) -> EvaluationResult {
        let total = problem.num_testcases();
        if total == 0 {
            return EvaluationResult::error(
                PassCount::none(0),
                "No test cases",
                "This problem has no test cases to grade against.",
            );
        }

        if self.is_incomplete(source, language) {
            return Self::with_failures(
                EvaluationResult::error(
                    PassCount::none(total),
                    "Incomplete solution",
                    "Implement the function body before submitting.",
                ),
                problem,
                0,
            );
        }

        let signals = self::scan(source, language);
        let key = random::source_key(source);
        let pick = |range: RangeInclusive<u32>| self.random.pick(key, range);
        let tenths = |k: u32| (u64::from(total) * u64::from(k) / 10) as u32;

        log::debug!("Heuristic signals for {}: {:?}", language, signals);

        let res = match (signals.has_nested_loops(), signals.uses_map) {
            (true, false) => {
                let passed = pick(tenths(3)..=tenths(7));
                EvaluationResult::error(
                    PassCount::clamped(passed, total),
                    "Time Limit Exceeded",
                    "Your solution uses nested loops. \
                     Consider using a hash map to achieve O(n) time complexity.",
                )
                .with_complexity("O(n^2)", "O(1)")
            }
            (false, true) => {
                let passed = pick(tenths(8)..=total);
                if passed == total {
                    return EvaluationResult::success(
                        total,
                        "Great work! Your solution passes all test cases.",
                    )
                    .with_complexity("O(n)", "O(n)")
                    .with_correctness(100);
                }
                EvaluationResult::error(
                    PassCount::clamped(passed, total),
                    "Wrong answer on edge cases",
                    "Good approach. Check duplicates, negative numbers \
                     and using the same element twice.",
                )
                .with_complexity("O(n)", "O(n)")
            }
            _ => {
                let passed = pick(tenths(2)..=tenths(5));
                EvaluationResult::error(
                    PassCount::clamped(passed, total),
                    "Logic error",
                    "Trace your solution by hand on the examples \
                     and review the problem constraints.",
                )
            }
        };

        let passed = res.tests_passed().passed();
        Self::with_failures(res, problem, passed)
    }

    fn is_incomplete(&self, source: &str, language: Language) -> bool {
        let trimmed = source.trim();
        trimmed.chars().count() < self.min_source_len
            || trimmed == template::starter_code(language).trim()
    }

    fn with_failures(res: EvaluationResult, problem: &Problem, passed: u32) -> EvaluationResult {
        let percent = res.tests_passed().percentage();
        res.with_failed_cases(
            problem
                .testcases
                .iter()
                .skip(passed as usize)
                .map(FailedCase::from),
        )
        .with_correctness(percent)
    }
}

#[async_trait]
impl Evaluator for HeuristicEvaluator {
    fn name(&self) -> &'static str {
        "heuristic"
    }

    async fn evaluate(
        &self,
        source: &str,
        language: Language,
        problem: &Problem,
    ) -> anyhow::Result<EvaluationResult> {
        Ok(self.grade(source, language, problem))
    }
}

static RE_LOOP: Lazy<Regex> = lazy_regex!(r"\b(for|while)\b");
static RE_FOREACH: Lazy<Regex> = lazy_regex!(r"\.forEach\s*\(");

static RE_BLOCK_COMMENT: Lazy<Regex> = lazy_regex!(r"(?s)/\*.*?\*/");
static RE_SLASH_COMMENT: Lazy<Regex> = lazy_regex!(r"//[^\n]*");
static RE_HASH_COMMENT: Lazy<Regex> = lazy_regex!(r"#[^\n]*");
static RE_DOCSTRING: Lazy<Regex> = lazy_regex!(r#"(?s)""".*?"""|'''.*?'''"#);

static RE_PY_IMPORT: Lazy<Regex> = lazy_regex!(r"(?m)^[ \t]*(import|from)[ \t]+[^\n]*");
static RE_JAVA_IMPORT: Lazy<Regex> = lazy_regex!(r"(?m)^[ \t]*import[ \t]+[^\n]*");
static RE_CPP_INCLUDE: Lazy<Regex> = lazy_regex!(r"(?m)^[ \t]*#[ \t]*include[^\n]*");
static RE_JS_IMPORT: Lazy<Regex> = lazy_regex!(
    r"(?m)^[ \t]*(import[ \t][^\n]*|(const|let|var)[ \t]+\w+[ \t]*=[ \t]*require\([^\n]*)"
);

static RE_PY_MAP: Lazy<Regex> =
    lazy_regex!(r"\bdict\s*\(|\bdefaultdict\b|\bCounter\b|=\s*\{\s*\}");
static RE_JAVA_MAP: Lazy<Regex> =
    lazy_regex!(r"\b(HashMap|TreeMap|LinkedHashMap|Hashtable)\b|\bMap\s*<");
static RE_CPP_MAP: Lazy<Regex> = lazy_regex!(r"\b(unordered_map|map)\s*<");
static RE_JS_MAP: Lazy<Regex> =
    lazy_regex!(r"\bnew\s+Map\s*\(|=\s*\{\s*\}|\bObject\.create\(\s*null");

pub fn scan(source: &str, language: Language) -> Signals {
    use Language::*;

    let code = self::strip_noise(source, language);
    let map_idiom: &Regex = match language {
        Python => &RE_PY_MAP,
        Java => &RE_JAVA_MAP,
        Cpp => &RE_CPP_MAP,
        JavaScript => &RE_JS_MAP,
    };
    Signals {
        uses_map: map_idiom.is_match(&code),
        loop_count: RE_LOOP.find_iter(&code).count() + RE_FOREACH.find_iter(&code).count(),
    }
}

/// Removes comments, docstrings, import/include lines and the starter
/// template's driver if it is still there unchanged.
pub fn strip_noise(source: &str, language: Language) -> String {
    use Language::*;

    let driver = template::driver_code(language);
    let source = if driver.is_empty() {
        source.to_owned()
    } else {
        source.replacen(driver.as_str(), "", 1)
    };

    let noise: &[&Lazy<Regex>] = match language {
        Python => &[&RE_DOCSTRING, &RE_HASH_COMMENT, &RE_PY_IMPORT],
        Java => &[&RE_BLOCK_COMMENT, &RE_SLASH_COMMENT, &RE_JAVA_IMPORT],
        Cpp => &[&RE_BLOCK_COMMENT, &RE_SLASH_COMMENT, &RE_CPP_INCLUDE],
        JavaScript => &[&RE_BLOCK_COMMENT, &RE_SLASH_COMMENT, &RE_JS_IMPORT],
    };

    let mut code = source;
    for re in noise {
        code = re.replace_all(&code, "").into_owned();
    }
    code
}
