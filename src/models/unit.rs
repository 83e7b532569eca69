//! # 工作单元
//!
//! 一个 “输入文档 -> 输出文档” 的映射，由输出路径规划器创建，
//! 创建后不可变，由批量执行器消费一次。
//!
//! ## 依赖关系
//! - 由 `batch/planner.rs` 创建
//! - 被 `batch/runner.rs`, `batch/invoker.rs` 使用

use std::path::{Path, PathBuf};

/// 待转换的工作单元
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkUnit {
    input_path: PathBuf,
    output_path: PathBuf,
    should_skip: bool,
    skip_reason: Option<String>,
}

impl WorkUnit {
    /// 需要调用外部工具的单元
    pub fn new(input_path: impl Into<PathBuf>, output_path: impl Into<PathBuf>) -> Self {
        WorkUnit {
            input_path: input_path.into(),
            output_path: output_path.into(),
            should_skip: false,
            skip_reason: None,
        }
    }

    /// 规划阶段即决定跳过的单元
    pub fn skipped(
        input_path: impl Into<PathBuf>,
        output_path: impl Into<PathBuf>,
        reason: impl Into<String>,
    ) -> Self {
        WorkUnit {
            input_path: input_path.into(),
            output_path: output_path.into(),
            should_skip: true,
            skip_reason: Some(reason.into()),
        }
    }

    pub fn input_path(&self) -> &Path {
        &self.input_path
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    pub fn should_skip(&self) -> bool {
        self.should_skip
    }

    pub fn skip_reason(&self) -> Option<&str> {
        self.skip_reason.as_deref()
    }
}
