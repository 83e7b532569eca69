//! # 转换参数 CLI 定义
//!
//! 批量 OCR 的全部命令行参数。
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 经 `config.rs` 校验后传递给 `commands/convert.rs`

use crate::utils::tool::DEFAULT_OCR_TOOL;

use clap::Args;
use std::path::PathBuf;

/// 转换参数
#[derive(Args, Debug)]
pub struct ConvertArgs {
    /// Files, folders, or glob patterns (use --recursive for folders and `**` globs)
    #[arg(required = true, value_name = "INPUT")]
    pub inputs: Vec<String>,

    /// Recurse into folders
    #[arg(short, long, default_value_t = false)]
    pub recursive: bool,

    // ─────────────────────────────────────────────────────────────
    // Output
    // ─────────────────────────────────────────────────────────────
    /// Output directory (mutually exclusive with --inplace)
    #[arg(short, long, conflicts_with = "inplace")]
    pub output: Option<PathBuf>,

    /// Write outputs next to inputs (default when --output is not given)
    #[arg(long, default_value_t = false)]
    pub inplace: bool,

    /// Suffix for output filenames (before .pdf)
    #[arg(long, default_value = "_ocr")]
    pub suffix: String,

    /// Overwrite existing outputs
    #[arg(long, default_value_t = false)]
    pub overwrite: bool,

    // ─────────────────────────────────────────────────────────────
    // OCR options
    // ─────────────────────────────────────────────────────────────
    /// OCR languages (Tesseract codes, e.g. 'eng', 'deu+eng')
    #[arg(short, long, default_value = "eng")]
    pub lang: String,

    /// Force OCR even if the document already contains text
    #[arg(long, default_value_t = false)]
    pub force: bool,

    /// ocrmypdf optimization level (0-3)
    #[arg(long, default_value_t = 3)]
    pub optimize: u8,

    /// Output PDF/A-2 for archival
    #[arg(long, default_value_t = false)]
    pub pdfa: bool,

    /// Per-file time limit in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// ocrmypdf executable name or path
    #[arg(long, env = "OCRC_OCRMYPDF", default_value = DEFAULT_OCR_TOOL)]
    pub ocrmypdf: String,

    /// Additional raw arguments passed to ocrmypdf (after `--`)
    #[arg(last = true, value_name = "OCRMYPDF_ARGS")]
    pub extra: Vec<String>,

    // ─────────────────────────────────────────────────────────────
    // Execution control
    // ─────────────────────────────────────────────────────────────
    /// Number of parallel jobs (default: number of CPUs)
    #[arg(short, long)]
    pub jobs: Option<usize>,

    /// Append one CSV row per file to this audit log
    #[arg(long, value_name = "CSV")]
    pub log: Option<PathBuf>,

    /// Show what would be processed without running OCR
    #[arg(long, default_value_t = false)]
    pub dry_run: bool,

    /// Disable the progress bar
    #[arg(long, default_value_t = false)]
    pub no_progress: bool,

    /// Less console output
    #[arg(short, long, default_value_t = false, conflicts_with = "verbose")]
    pub quiet: bool,

    /// More console output
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}
