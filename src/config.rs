//! # 运行配置
//!
//! 将命令行参数校验为一次运行的不可变配置。
//! 所有配置错误都在派发任何工作之前报告。
//!
//! ## 依赖关系
//! - 使用 `cli/convert.rs` 的参数
//! - 被 `commands/convert.rs`, `batch/invoker.rs` 使用

use crate::batch::OutputTarget;
use crate::cli::convert::ConvertArgs;
use crate::error::{OcrcError, Result};
use crate::utils::output::Verbosity;

use std::path::PathBuf;
use std::time::Duration;

/// 一次运行的配置
#[derive(Debug, Clone)]
pub struct OcrConfig {
    pub inputs: Vec<String>,
    pub recursive: bool,
    pub target: OutputTarget,
    pub suffix: String,
    pub overwrite: bool,
    pub lang: String,
    pub force: bool,
    pub optimize: u8,
    pub pdfa: bool,
    pub timeout: Option<Duration>,
    /// 可执行文件名或路径（启动时再解析）
    pub ocr_tool: String,
    pub extra_args: Vec<String>,
    pub jobs: usize,
    pub log_path: Option<PathBuf>,
    pub dry_run: bool,
    pub show_progress: bool,
    pub verbosity: Verbosity,
}

impl OcrConfig {
    /// 校验参数并生成配置
    pub fn from_args(args: ConvertArgs) -> Result<Self> {
        let target = match (args.output, args.inplace) {
            (Some(_), true) => {
                return Err(OcrcError::InvalidArgument(
                    "use either --output or --inplace, not both".to_string(),
                ))
            }
            (Some(dir), false) => OutputTarget::Directory(dir),
            // 两者都未指定时默认原地输出
            (None, _) => OutputTarget::InPlace,
        };

        let jobs = args.jobs.unwrap_or_else(|| num_cpus::get().max(1));
        if jobs == 0 {
            return Err(OcrcError::InvalidArgument(
                "--jobs must be >= 1".to_string(),
            ));
        }

        let lang = args.lang.trim().to_string();
        if lang.is_empty() {
            return Err(OcrcError::InvalidArgument(
                "--lang must not be empty".to_string(),
            ));
        }

        if args.suffix.contains(['/', '\\']) {
            return Err(OcrcError::InvalidArgument(format!(
                "--suffix must not contain path separators: '{}'",
                args.suffix
            )));
        }

        if args.optimize > 3 {
            return Err(OcrcError::InvalidArgument(format!(
                "--optimize must be between 0 and 3, got {}",
                args.optimize
            )));
        }

        let timeout = match args.timeout {
            Some(0) => {
                return Err(OcrcError::InvalidArgument(
                    "--timeout must be greater than 0".to_string(),
                ))
            }
            Some(secs) => Some(Duration::from_secs(secs)),
            None => None,
        };

        let verbosity = Verbosity::from_flags(args.quiet, args.verbose);

        Ok(OcrConfig {
            inputs: args.inputs,
            recursive: args.recursive,
            target,
            suffix: args.suffix,
            overwrite: args.overwrite,
            lang,
            force: args.force,
            optimize: args.optimize,
            pdfa: args.pdfa,
            timeout,
            ocr_tool: args.ocrmypdf,
            extra_args: args.extra,
            jobs,
            log_path: args.log,
            dry_run: args.dry_run,
            show_progress: !args.no_progress && !verbosity.is_quiet(),
            verbosity,
        })
    }
}
