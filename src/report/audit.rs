//! # 审计日志导出
//!
//! 将结果记录追加写入 CSV 文件，每条记录一行。
//!
//! ## 格式
//! `timestamp, input_path, output_path, outcome_kind, return_code, log_snippet, duration_secs`
//!
//! 行顺序即记录的完成顺序，不保证跨运行稳定；
//! 需要稳定顺序时请按 timestamp 或 input_path 排序。
//!
//! ## 依赖关系
//! - 被 `commands/convert.rs` 调用
//! - 使用 `models::ResultRecord`
//! - 使用 `csv` + `serde` 写入

use crate::error::{OcrcError, Result};
use crate::models::ResultRecord;

use serde::Serialize;
use std::fs::{self, OpenOptions};
use std::path::Path;

/// CSV 表头
pub const AUDIT_HEADER: [&str; 7] = [
    "timestamp",
    "input_path",
    "output_path",
    "outcome_kind",
    "return_code",
    "log_snippet",
    "duration_secs",
];

/// CSV 中的一行
#[derive(Debug, Serialize)]
struct AuditRow<'a> {
    timestamp: String,
    input_path: String,
    output_path: String,
    outcome_kind: &'a str,
    return_code: Option<i32>,
    log_snippet: String,
    duration_secs: String,
}

impl<'a> From<&'a ResultRecord> for AuditRow<'a> {
    fn from(record: &'a ResultRecord) -> Self {
        AuditRow {
            timestamp: record
                .timestamp
                .to_rfc3339_opts(chrono::SecondsFormat::Secs, false),
            input_path: record.input_path.display().to_string(),
            output_path: record.output_path.display().to_string(),
            outcome_kind: record.outcome.kind(),
            return_code: record.outcome.return_code(),
            log_snippet: single_line(&record.log_snippet),
            duration_secs: format!("{:.2}", record.duration.as_secs_f64()),
        }
    }
}

/// 追加写入记录；文件不存在或为空时先写表头
pub fn append_records(path: &Path, records: &[ResultRecord]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| OcrcError::FileWriteError {
            path: parent.display().to_string(),
            source: e,
        })?;
    }

    let needs_header = fs::metadata(path).map(|m| m.len() == 0).unwrap_or(true);

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| OcrcError::FileWriteError {
            path: path.display().to_string(),
            source: e,
        })?;

    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(file);

    if needs_header {
        wtr.write_record(AUDIT_HEADER)?;
    }

    for record in records {
        wtr.serialize(AuditRow::from(record))?;
    }

    wtr.flush().map_err(|e| OcrcError::FileWriteError {
        path: path.display().to_string(),
        source: e,
    })?;

    Ok(())
}

fn single_line(text: &str) -> String {
    text.replace(['\r', '\n'], " ")
}
