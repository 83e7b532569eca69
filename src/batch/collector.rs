//! # 输入收集器
//!
//! 将用户给出的路径 / 目录 / glob 模式展开为去重、有序的候选文档列表。
//!
//! ## 功能
//! - 单文件输入：按扩展名过滤
//! - 目录输入：列出目录（可递归），记录发现根目录以便输出镜像
//! - glob 模式：使用 `glob` crate 展开
//! - 不存在的字面路径和无法解析的 glob 模式：保留为候选，在调用阶段按单元报告失败
//! - 去重并保留首次出现的顺序
//!
//! ## 依赖关系
//! - 被 `commands/convert.rs` 调用
//! - 使用 `walkdir` 遍历目录，`glob` 展开模式

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// 可识别的输入扩展名（小写，不含点）
pub const SUPPORTED_EXTENSIONS: &[&str] = &["pdf", "png", "jpg", "jpeg", "tif", "tiff", "bmp"];

/// 检查扩展名是否可识别（大小写不敏感）
pub fn is_supported(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| {
            let e = e.to_ascii_lowercase();
            SUPPORTED_EXTENSIONS.contains(&e.as_str())
        })
        .unwrap_or(false)
}

/// 已发现的输入文档
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredInput {
    /// 文档路径
    pub path: PathBuf,
    /// 若经目录发现，记录该目录（用于在输出目录下镜像相对路径）
    pub root: Option<PathBuf>,
}

impl DiscoveredInput {
    pub fn file(path: impl Into<PathBuf>) -> Self {
        DiscoveredInput {
            path: path.into(),
            root: None,
        }
    }

    pub fn under_root(path: impl Into<PathBuf>, root: impl Into<PathBuf>) -> Self {
        DiscoveredInput {
            path: path.into(),
            root: Some(root.into()),
        }
    }

    /// 相对于发现根目录的路径；无根目录时仅为文件名
    pub fn relative_path(&self) -> PathBuf {
        if let Some(root) = &self.root {
            if let Ok(rel) = self.path.strip_prefix(root) {
                return rel.to_path_buf();
            }
        }
        self.path
            .file_name()
            .map(PathBuf::from)
            .unwrap_or_else(|| self.path.clone())
    }
}

/// 输入收集器
pub struct InputCollector {
    /// 原始输入参数（路径、目录或 glob）
    inputs: Vec<String>,
    /// 是否递归
    recursive: bool,
}

impl InputCollector {
    /// 创建新的输入收集器
    pub fn new<I, S>(inputs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            inputs: inputs.into_iter().map(Into::into).collect(),
            recursive: false,
        }
    }

    /// 设置是否递归搜索
    pub fn recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    /// 收集所有候选文档
    pub fn collect(&self) -> Vec<DiscoveredInput> {
        let mut found = Vec::new();

        for raw in &self.inputs {
            let path = Path::new(raw);
            if path.is_dir() {
                found.extend(self.walk_directory(path));
            } else if path.is_file() {
                if is_supported(path) {
                    found.push(DiscoveredInput::file(path));
                }
            } else if Self::has_glob_chars(raw) {
                found.extend(Self::expand_glob(raw));
            } else {
                // 不存在的字面路径：交由调用阶段报告失败
                found.push(DiscoveredInput::file(path));
            }
        }

        Self::dedup(found)
    }

    /// 列出目录中的可识别文件
    fn walk_directory(&self, dir: &Path) -> Vec<DiscoveredInput> {
        let max_depth = if self.recursive { usize::MAX } else { 1 };

        WalkDir::new(dir)
            .max_depth(max_depth)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter(|e| is_supported(e.path()))
            .map(|e| DiscoveredInput::under_root(e.path(), dir))
            .collect()
    }

    /// 展开 glob 模式（`**` 可跨目录）
    fn expand_glob(pattern: &str) -> Vec<DiscoveredInput> {
        let paths = match glob::glob(pattern) {
            Ok(paths) => paths,
            // 无法解析的模式按字面路径处理
            Err(_) => return vec![DiscoveredInput::file(pattern)],
        };

        let mut matched: Vec<PathBuf> = paths
            .filter_map(|p| p.ok())
            .filter(|p| p.is_file() && is_supported(p))
            .collect();
        matched.sort();

        matched.into_iter().map(DiscoveredInput::file).collect()
    }

    fn has_glob_chars(raw: &str) -> bool {
        raw.contains(['*', '?', '['])
    }

    /// 去重，保留首次出现
    fn dedup(found: Vec<DiscoveredInput>) -> Vec<DiscoveredInput> {
        let mut seen: HashSet<PathBuf> = HashSet::new();
        found
            .into_iter()
            .filter(|input| seen.insert(input.path.clone()))
            .collect()
    }
}
