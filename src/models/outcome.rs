//! # 转换结果分类
//!
//! 将外部 OCR 工具 (ocrmypdf) 的退出码映射为封闭的结果枚举。
//!
//! ## 退出码约定
//! 映射集中在 [`EXIT_CODE_TABLE`] 中，`0` 表示成功，
//! `6` 表示输入已包含可提取文本（哨兵退出码），其余非零均为失败。
//!
//! ## 依赖关系
//! - 被 `batch/invoker.rs` 和 `batch/runner.rs` 使用
//! - 被 `report/` 用于输出

/// 哨兵退出码：输入已包含文本，未重新 OCR
pub const ALREADY_DONE_OCR: i32 = 6;

/// 进程未能启动（可执行文件缺失、输入不可读等）
pub const SPAWN_FAILURE: i32 = -1;

/// 超时终止
pub const TIMEOUT_EXIT: i32 = 124;

/// 外部工具的已知退出状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolExit {
    Ok,
    BadArgs,
    InputFile,
    MissingDependency,
    InvalidOutputPdf,
    FileAccessError,
    AlreadyDoneOcr,
    ChildProcessError,
    EncryptedPdf,
    InvalidConfig,
    PdfaConversionFailed,
    OtherError,
    Interrupted,
    Unknown,
}

/// 退出码 -> 状态映射表
pub const EXIT_CODE_TABLE: &[(i32, ToolExit)] = &[
    (0, ToolExit::Ok),
    (1, ToolExit::BadArgs),
    (2, ToolExit::InputFile),
    (3, ToolExit::MissingDependency),
    (4, ToolExit::InvalidOutputPdf),
    (5, ToolExit::FileAccessError),
    (ALREADY_DONE_OCR, ToolExit::AlreadyDoneOcr),
    (7, ToolExit::ChildProcessError),
    (8, ToolExit::EncryptedPdf),
    (9, ToolExit::InvalidConfig),
    (10, ToolExit::PdfaConversionFailed),
    (15, ToolExit::OtherError),
    (130, ToolExit::Interrupted),
];

impl ToolExit {
    /// 查表，未登记的退出码归为 `Unknown`
    pub fn from_code(code: i32) -> Self {
        EXIT_CODE_TABLE
            .iter()
            .find(|(c, _)| *c == code)
            .map(|(_, exit)| *exit)
            .unwrap_or(ToolExit::Unknown)
    }

    pub fn description(&self) -> &'static str {
        match self {
            ToolExit::Ok => "ok",
            ToolExit::BadArgs => "invalid arguments",
            ToolExit::InputFile => "input file is not a valid PDF or image",
            ToolExit::MissingDependency => "missing dependency of the OCR tool",
            ToolExit::InvalidOutputPdf => "output file is not a valid PDF",
            ToolExit::FileAccessError => "file access error",
            ToolExit::AlreadyDoneOcr => "page already has text",
            ToolExit::ChildProcessError => "OCR child process failed",
            ToolExit::EncryptedPdf => "input PDF is encrypted",
            ToolExit::InvalidConfig => "invalid OCR configuration",
            ToolExit::PdfaConversionFailed => "PDF/A conversion failed",
            ToolExit::OtherError => "unspecified OCR tool error",
            ToolExit::Interrupted => "OCR tool was interrupted",
            ToolExit::Unknown => "unrecognized exit code",
        }
    }
}

/// 单个工作单元的终态
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversionOutcome {
    /// 退出码 0
    Success,
    /// 输出文件已存在且未要求覆盖，规划阶段即跳过
    SkippedPreexisting { reason: String },
    /// 外部工具检测到已有文本（未指定 force）
    SkippedAlreadySearchable { reason: String },
    /// 其他任何情况
    Failed {
        return_code: i32,
        error_summary: String,
    },
}

impl ConversionOutcome {
    pub fn failed(return_code: i32, error_summary: impl Into<String>) -> Self {
        ConversionOutcome::Failed {
            return_code,
            error_summary: error_summary.into(),
        }
    }

    /// 根据外部工具退出码分类
    ///
    /// 哨兵退出码只在未指定 `force` 时视为跳过；
    /// 指定 `force` 后工具本应重新 OCR，因此同一退出码按失败处理。
    pub fn from_exit_code(code: i32, force: bool) -> Self {
        match ToolExit::from_code(code) {
            ToolExit::Ok => ConversionOutcome::Success,
            ToolExit::AlreadyDoneOcr if !force => ConversionOutcome::SkippedAlreadySearchable {
                reason: "already has text".to_string(),
            },
            exit => ConversionOutcome::failed(
                code,
                format!("{} (exit code {})", exit.description(), code),
            ),
        }
    }

    /// CSV 中使用的结果类别
    pub fn kind(&self) -> &'static str {
        match self {
            ConversionOutcome::Success => "success",
            ConversionOutcome::SkippedPreexisting { .. } => "skipped_preexisting",
            ConversionOutcome::SkippedAlreadySearchable { .. } => "skipped_already_searchable",
            ConversionOutcome::Failed { .. } => "failed",
        }
    }

    /// 对应的进程退出码（规划阶段跳过的单元没有）
    pub fn return_code(&self) -> Option<i32> {
        match self {
            ConversionOutcome::Success => Some(0),
            ConversionOutcome::SkippedPreexisting { .. } => None,
            ConversionOutcome::SkippedAlreadySearchable { .. } => Some(ALREADY_DONE_OCR),
            ConversionOutcome::Failed { return_code, .. } => Some(*return_code),
        }
    }

    #[cfg(test)]
    pub fn is_success(&self) -> bool {
        matches!(self, ConversionOutcome::Success)
    }

    pub fn is_skipped(&self) -> bool {
        matches!(
            self,
            ConversionOutcome::SkippedPreexisting { .. }
                | ConversionOutcome::SkippedAlreadySearchable { .. }
        )
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, ConversionOutcome::Failed { .. })
    }
}

impl std::fmt::Display for ConversionOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConversionOutcome::Success => write!(f, "success"),
            ConversionOutcome::SkippedPreexisting { reason } => write!(f, "skipped ({})", reason),
            ConversionOutcome::SkippedAlreadySearchable { reason } => {
                write!(f, "skipped ({})", reason)
            }
            ConversionOutcome::Failed {
                return_code,
                error_summary,
            } => write!(f, "failed [{}]: {}", return_code, error_summary),
        }
    }
}
