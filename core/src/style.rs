use colored::{Color, ColoredString, Colorize};
use crossterm::terminal;

use crate::model::{EvaluationResult, Problem, Status};
use crate::session::Submission;

#[macro_export]
macro_rules! print_success {
    ($fmt:literal, $($e:tt)*) => {
        use ::colored::Colorize as _;
        println!("{}", format!($fmt, $($e)*).green())
    }
}

const BOLD_LINE: &str = "━";
const THIN_LINE: &str = "─";

pub fn is_truecolor_supported() -> bool {
    let Ok(v) = std::env::var("COLORTERM") else {
        return false
    };
    matches!(v.as_str(), "truecolor" | "24bit")
}

pub trait ColorTheme {
    fn color(&self) -> Color;
}

impl ColorTheme for log::Level {
    fn color(&self) -> Color {
        use log::Level::*;
        match self {
            Error => Color::BrightRed,
            Warn => Color::BrightYellow,
            Info => Color::Cyan,
            Debug => Color::Magenta,
            Trace => Color::Blue,
        }
    }
}

impl ColorTheme for Status {
    fn color(&self) -> Color {
        use Status::*;
        if !self::is_truecolor_supported() {
            return match self {
                Success => Color::Green,
                Error => Color::Red,
            };
        }

        match self {
            Success => Color::TrueColor {
                r: 30,
                g: 180,
                b: 40,
            },
            Error => Color::TrueColor {
                r: 220,
                g: 42,
                b: 42,
            },
        }
    }
}

pub fn status_icon(status: Status) -> ColoredString {
    let fg = if is_truecolor_supported() {
        Color::TrueColor {
            r: 255,
            g: 255,
            b: 255,
        }
    } else {
        Color::BrightBlack
    };
    format!(" {} ", status.to_string().to_uppercase())
        .on_color(status.color())
        .bold()
        .color(fg)
}

/// `mm:ss`, or `h:mm:ss` from one hour up.
pub fn format_countdown(secs: u32) -> String {
    let (h, m, s) = (secs / 3600, secs / 60 % 60, secs % 60);
    if h > 0 {
        format!("{}:{:02}:{:02}", h, m, s)
    } else {
        format!("{:02}:{:02}", m, s)
    }
}

fn terminal_cols() -> usize {
    let (cols, _) = terminal::size().unwrap_or((40, 40));
    cols as usize
}

fn print_sub_title(s: &str, cols: usize) {
    println!(
        "{}{}",
        s.cyan().bold(),
        THIN_LINE
            .repeat(cols.saturating_sub(s.chars().count() + 1))
            .bright_black(),
    )
}

pub fn print_problem(problem: &Problem) {
    let cols = self::terminal_cols();
    let bold_bar = BOLD_LINE.repeat(cols).blue().bold();

    println!(
        "\n{} [{}] {}\n{}",
        problem.title.bright_yellow().bold(),
        problem.difficulty,
        format!("({} to solve)", format_countdown(problem.time_budget_secs)).dimmed(),
        bold_bar,
    );
    println!("{}", problem.description.trim());

    for (i, ex) in problem.examples.iter().enumerate() {
        println!();
        print_sub_title(&format!("[example {}]", i + 1), cols);
        println!("{} {}", "Input: ".bold(), ex.input);
        println!("{} {}", "Output:".bold(), ex.output);
        if let Some(explanation) = &ex.explanation {
            println!("{}", explanation.dimmed());
        }
    }

    if !problem.constraints.is_empty() {
        println!();
        print_sub_title("[constraints]", cols);
        for c in &problem.constraints {
            println!("  • {}", c);
        }
    }
    println!("{}", bold_bar);
}

pub fn print_evaluation_result(res: &EvaluationResult) {
    let cols = self::terminal_cols();
    let bold_bar = BOLD_LINE.repeat(cols).blue().bold();
    let passed = res.tests_passed();

    let summary = if res.is_success() {
        format!("All {} tests passed ✨", passed.total()).green()
    } else if passed.passed() > 0 {
        format!("{} tests passed 💣", passed).bright_red()
    } else {
        format!("All {} tests failed 💀", passed.total()).bright_red()
    };
    println!("\n{} {}\n{}", self::status_icon(res.status()), summary, bold_bar);

    if let Some(msg) = res.error_message() {
        println!("{} {}", "Error:".bright_red().bold(), msg);
    }

    let estimates = [
        ("Time complexity", res.time_complexity()),
        ("Space complexity", res.space_complexity()),
        ("Execution time", res.execution_time()),
        ("Memory used", res.memory_used()),
    ];
    for (label, value) in estimates {
        if let Some(v) = value {
            println!("{}: {}", label.bold(), v);
        }
    }
    if let Some(c) = res.correctness() {
        println!("{}: {}%", "Correctness".bold(), c);
    }

    if !res.failed_cases().is_empty() {
        print_sub_title("[failed cases]", cols);
        for case in res.failed_cases() {
            print!("{} {}  {} {}", "in:".dimmed(), case.input, "want:".dimmed(), case.expected);
            if let Some(actual) = &case.actual {
                print!("  {} {}", "got:".dimmed(), actual.bright_red());
            }
            println!();
        }
    }

    print_sub_title("[suggestions]", cols);
    println!("{}", res.suggestions());
    println!("{}", bold_bar);
}

pub fn print_submission(submission: &Submission) {
    println!(
        "{} attempt #{} ({}) at {}",
        "Submitted".bold(),
        submission.attempt,
        submission.reason,
        submission.submitted_at.format("%H:%M:%S"),
    );
    self::print_evaluation_result(&submission.result);
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn countdown_should_be_zero_padded() {
        assert_eq!(format_countdown(1800), "30:00");
        assert_eq!(format_countdown(65), "01:05");
        assert_eq!(format_countdown(0), "00:00");
        assert_eq!(format_countdown(3725), "1:02:05");
    }
}
