//! 控制台输出

use colored::*;

use crate::review::outcome::{GateOutcome, SkipReason};

/// 单行输出，区分 stdout 与 stderr
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportLine {
    Out(String),
    Err(String),
}

/// 生成 gate 结果的控制台输出
pub fn format_outcome(outcome: &GateOutcome) -> Vec<ReportLine> {
    let mut lines = Vec::new();

    match outcome {
        GateOutcome::Skipped(SkipReason::NothingToReview) => {
            lines.push(ReportLine::Out(format!(
                "   {}",
                "⚠️  No reviewable staged changes, allowing commit".yellow()
            )));
        }
        GateOutcome::Skipped(SkipReason::NoCredential) => {
            lines.push(ReportLine::Out(format!(
                "   {}",
                "⚠️  Review skipped: no API credential configured, allowing commit".yellow()
            )));
        }
        GateOutcome::Reviewed(review) if review.approved => {
            lines.push(ReportLine::Out(format!("   {}", "✅ Review PASSED".green())));
            push_feedback(&mut lines, &review.feedback, false);
        }
        GateOutcome::Reviewed(review) => {
            lines.push(ReportLine::Err(format!("   {}", "❌ Review FAILED".red().bold())));
            push_feedback(&mut lines, &review.feedback, true);
            lines.push(ReportLine::Err(String::new()));
            lines.push(ReportLine::Err(
                "💡 Fix the issues above and try again, or bypass with `git commit --no-verify`."
                    .to_string(),
            ));
        }
        GateOutcome::FailedOpen(e) => {
            lines.push(ReportLine::Err(format!(
                "   {}",
                format!("⚠️  Review error: {}", e).yellow()
            )));
            lines.push(ReportLine::Err(
                "   ℹ️  Allowing commit (review disabled due to error)".to_string(),
            ));
        }
    }

    lines
}

fn push_feedback(lines: &mut Vec<ReportLine>, feedback: &str, to_stderr: bool) {
    for line in feedback.lines().filter(|l| !l.trim().is_empty()) {
        let text = format!("      {}", line);
        lines.push(if to_stderr {
            ReportLine::Err(text)
        } else {
            ReportLine::Out(text)
        });
    }
}

/// 打印 gate 结果
pub fn print_outcome(outcome: &GateOutcome) {
    for line in format_outcome(outcome) {
        match line {
            ReportLine::Out(text) => println!("{}", text),
            ReportLine::Err(text) => eprintln!("{}", text),
        }
    }
}
