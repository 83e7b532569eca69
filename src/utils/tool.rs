//! # 外部工具定位
//!
//! 启动时解析一次 OCR 可执行文件路径，之后显式传给调用器。
//!
//! ## 依赖关系
//! - 被 `commands/convert.rs` 使用
//! - 使用 `which` crate 搜索 PATH

use crate::error::{OcrcError, Result};

use std::path::PathBuf;

/// 默认的 OCR 可执行文件名
pub const DEFAULT_OCR_TOOL: &str = "ocrmypdf";

/// 解析可执行文件：名称在 PATH 中查找，路径需存在且可执行
pub fn resolve_executable(name_or_path: &str) -> Result<PathBuf> {
    which::which(name_or_path).map_err(|_| OcrcError::CommandNotFound {
        command: name_or_path.to_string(),
    })
}
