//! # 结果记录与汇总
//!
//! - `InvocationReport`: 一次外部工具调用的产物
//! - `ResultRecord`: 每个工作单元恰好一条的终态记录
//! - `BatchSummary`: 对全部记录折叠一次得到的计数
//!
//! 记录序列按 *完成* 顺序排列，并发执行下不保证跨运行稳定；
//! 需要稳定顺序的消费者应按时间戳或输入路径自行排序。
//!
//! ## 依赖关系
//! - 被 `batch/runner.rs` 生成
//! - 被 `report/` 消费

use super::outcome::ConversionOutcome;
use super::unit::WorkUnit;

use chrono::{DateTime, Local};
use std::path::PathBuf;
use std::time::Duration;

/// 单次调用的结果：分类结果 + 截断后的进程输出
#[derive(Debug, Clone)]
pub struct InvocationReport {
    pub outcome: ConversionOutcome,
    pub log_snippet: String,
    pub duration: Duration,
}

impl InvocationReport {
    pub fn new(outcome: ConversionOutcome) -> Self {
        InvocationReport {
            outcome,
            log_snippet: String::new(),
            duration: Duration::ZERO,
        }
    }

    pub fn with_log(mut self, log_snippet: impl Into<String>) -> Self {
        self.log_snippet = log_snippet.into();
        self
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }
}

/// 单个工作单元的终态记录
#[derive(Debug, Clone)]
pub struct ResultRecord {
    /// 记录产生（单元完成）的时间
    pub timestamp: DateTime<Local>,
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    pub outcome: ConversionOutcome,
    /// 截断后的进程输出
    pub log_snippet: String,
    pub duration: Duration,
}

impl ResultRecord {
    /// 由一次调用结果生成记录
    pub fn from_invocation(unit: &WorkUnit, report: InvocationReport) -> Self {
        ResultRecord {
            timestamp: Local::now(),
            input_path: unit.input_path().to_path_buf(),
            output_path: unit.output_path().to_path_buf(),
            outcome: report.outcome,
            log_snippet: report.log_snippet,
            duration: report.duration,
        }
    }

    /// 规划阶段跳过的单元，不调用外部工具
    pub fn preexisting(unit: &WorkUnit) -> Self {
        let reason = unit.skip_reason().unwrap_or("output exists").to_string();
        ResultRecord {
            timestamp: Local::now(),
            input_path: unit.input_path().to_path_buf(),
            output_path: unit.output_path().to_path_buf(),
            outcome: ConversionOutcome::SkippedPreexisting { reason },
            log_snippet: String::new(),
            duration: Duration::ZERO,
        }
    }
}

/// 批量处理结果统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub total: usize,
    pub succeeded: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl BatchSummary {
    /// 折叠全部记录
    pub fn from_records(records: &[ResultRecord]) -> Self {
        records.iter().fold(BatchSummary::default(), |mut acc, r| {
            acc.total += 1;
            match &r.outcome {
                ConversionOutcome::Success => acc.succeeded += 1,
                ConversionOutcome::SkippedPreexisting { .. }
                | ConversionOutcome::SkippedAlreadySearchable { .. } => acc.skipped += 1,
                ConversionOutcome::Failed { .. } => acc.failed += 1,
            }
            acc
        })
    }

    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }
}

impl std::fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "total={} succeeded={} skipped={} failed={}",
            self.total, self.succeeded, self.skipped, self.failed
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(outcome: ConversionOutcome) -> ResultRecord {
        let unit = WorkUnit::new("a.pdf", "a_ocr.pdf");
        ResultRecord::from_invocation(&unit, InvocationReport::new(outcome))
    }

    #[test]
    fn test_summary_fold() {
        let records = vec![
            record(ConversionOutcome::Success),
            record(ConversionOutcome::Success),
            record(ConversionOutcome::SkippedAlreadySearchable {
                reason: "already has text".to_string(),
            }),
            record(ConversionOutcome::failed(2, "input file")),
        ];
        let summary = BatchSummary::from_records(&records);
        assert_eq!(
            summary,
            BatchSummary {
                total: 4,
                succeeded: 2,
                skipped: 1,
                failed: 1,
            }
        );
        assert!(summary.has_failures());
    }

    #[test]
    fn test_summary_empty() {
        let summary = BatchSummary::from_records(&[]);
        assert_eq!(summary, BatchSummary::default());
        assert!(!summary.has_failures());
    }

    #[test]
    fn test_preexisting_record_keeps_reason() {
        let unit = WorkUnit::skipped("a.pdf", "a_ocr.pdf", "output exists");
        let rec = ResultRecord::preexisting(&unit);
        assert_eq!(
            rec.outcome,
            ConversionOutcome::SkippedPreexisting {
                reason: "output exists".to_string()
            }
        );
        assert!(rec.log_snippet.is_empty());
    }
}
