//! # 控制台汇总
//!
//! 运行结束后打印计数汇总和结果表格。
//!
//! ## 依赖关系
//! - 被 `commands/convert.rs` 调用
//! - 使用 `tabled` 打印表格，`utils/output.rs` 打印消息

use crate::batch::BatchReport;
use crate::models::ResultRecord;
use crate::utils::output::{self, Verbosity};

use tabled::{Table, Tabled};

/// 默认模式下最多列出的失败条目
const MAX_LISTED_FAILURES: usize = 10;

/// 表格行
#[derive(Debug, Clone, Tabled)]
struct RecordRow {
    #[tabled(rename = "Input")]
    input: String,
    #[tabled(rename = "Output")]
    output: String,
    #[tabled(rename = "Result")]
    result: String,
    #[tabled(rename = "Time (s)")]
    seconds: String,
}

impl From<&ResultRecord> for RecordRow {
    fn from(record: &ResultRecord) -> Self {
        RecordRow {
            input: record.input_path.display().to_string(),
            output: record.output_path.display().to_string(),
            result: record.outcome.to_string(),
            seconds: format!("{:.2}", record.duration.as_secs_f64()),
        }
    }
}

/// 打印运行汇总
pub fn print_summary(report: &BatchReport, verbosity: Verbosity) {
    if verbosity.is_quiet() {
        return;
    }

    let s = &report.summary;
    output::print_separator();

    if verbosity.is_verbose() {
        let mut sorted: Vec<&ResultRecord> = report.records.iter().collect();
        sorted.sort_by(|a, b| a.input_path.cmp(&b.input_path));
        let rows: Vec<RecordRow> = sorted.into_iter().map(RecordRow::from).collect();
        if !rows.is_empty() {
            println!("{}", Table::new(&rows));
        }
    } else {
        print_failures(&report.records);
    }

    if report.cancelled {
        output::print_warning("Run was interrupted; summary covers completed files only.");
    }

    let line = format!(
        "{} total, {} succeeded, {} skipped, {} failed",
        s.total, s.succeeded, s.skipped, s.failed
    );
    if s.has_failures() {
        output::print_error(&line);
    } else {
        output::print_done(&line);
    }
}

/// 列出失败的文件（最多 `MAX_LISTED_FAILURES` 条）
fn print_failures(records: &[ResultRecord]) {
    let failures: Vec<RecordRow> = records
        .iter()
        .filter(|r| r.outcome.is_failed())
        .map(RecordRow::from)
        .collect();

    if failures.is_empty() {
        return;
    }

    output::print_warning("Failed files:");
    let shown: Vec<RecordRow> = failures.iter().take(MAX_LISTED_FAILURES).cloned().collect();
    println!("{}", Table::new(&shown));
    if failures.len() > MAX_LISTED_FAILURES {
        output::print_warning(&format!(
            "  ... and {} more (see --log for details)",
            failures.len() - MAX_LISTED_FAILURES
        ));
    }
}
