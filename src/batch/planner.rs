//! # 输出路径规划器
//!
//! 根据输入路径和配置计算输出路径，并决定是否跳过。
//!
//! ## 规则
//! - 输出文件名：`{stem}{suffix}.pdf`（外部工具总是输出 PDF）
//! - 原地模式：与输入同目录
//! - 输出目录模式：经目录发现的输入镜像其相对路径，其余输入平铺到输出根目录
//! - 输出已存在且未要求覆盖：标记跳过，原因为 "output exists"
//!
//! 除文件存在性检查外无副作用，不创建目录。
//!
//! ## 依赖关系
//! - 被 `commands/convert.rs` 调用
//! - 使用 `batch/collector.rs` 的 `DiscoveredInput`
//! - 产出 `models::WorkUnit`

use crate::batch::collector::DiscoveredInput;
use crate::models::WorkUnit;

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

/// 规划器标记的跳过原因
pub const OUTPUT_EXISTS: &str = "output exists";

/// 输出位置
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    /// 写在输入文件旁边
    InPlace,
    /// 写入指定目录
    Directory(PathBuf),
}

/// 输出路径规划器
#[derive(Debug, Clone)]
pub struct OutputPlanner {
    target: OutputTarget,
    suffix: String,
    overwrite: bool,
}

impl OutputPlanner {
    pub fn new(target: OutputTarget, suffix: impl Into<String>, overwrite: bool) -> Self {
        Self {
            target,
            suffix: suffix.into(),
            overwrite,
        }
    }

    /// 为单个输入生成工作单元
    pub fn plan(&self, input: &DiscoveredInput) -> WorkUnit {
        let output = self.output_path(input);

        if output.exists() && !self.overwrite {
            WorkUnit::skipped(&input.path, output, OUTPUT_EXISTS)
        } else {
            WorkUnit::new(&input.path, output)
        }
    }

    /// 为全部输入生成工作单元（保持输入顺序）
    pub fn plan_all(&self, inputs: &[DiscoveredInput]) -> Vec<WorkUnit> {
        inputs.iter().map(|input| self.plan(input)).collect()
    }

    /// 去掉本身就是其他输入的规划输出的文件（例如上次运行生成的 `*_ocr.pdf`）
    pub fn exclude_own_outputs(&self, inputs: Vec<DiscoveredInput>) -> Vec<DiscoveredInput> {
        let outputs: HashSet<PathBuf> = inputs.iter().map(|i| self.output_path(i)).collect();
        inputs
            .into_iter()
            .filter(|i| !outputs.contains(&i.path))
            .collect()
    }

    /// 计算输出路径
    pub fn output_path(&self, input: &DiscoveredInput) -> PathBuf {
        let file_name = self.output_file_name(&input.path);

        let output = match &self.target {
            OutputTarget::InPlace => input.path.with_file_name(&file_name),
            OutputTarget::Directory(dir) => {
                let relative = input.relative_path();
                match relative.parent() {
                    Some(parent) => dir.join(parent).join(&file_name),
                    None => dir.join(&file_name),
                }
            }
        };

        // 空后缀时可能与输入重名
        if output == input.path {
            let stem = Self::stem(&input.path);
            return output.with_file_name(format!("{}{}_out.pdf", stem, self.suffix));
        }

        output
    }

    fn output_file_name(&self, input: &Path) -> String {
        format!("{}{}.pdf", Self::stem(input), self.suffix)
    }

    fn stem(path: &Path) -> String {
        path.file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "document".to_string())
    }
}

/// 查找被多个工作单元共用的输出路径
///
/// 同一输出路径的并发写入不受保护，调用方应据此给出警告。
pub fn find_output_collisions(units: &[WorkUnit]) -> Vec<(PathBuf, usize)> {
    let mut counts: HashMap<&Path, usize> = HashMap::new();
    for unit in units.iter().filter(|u| !u.should_skip()) {
        *counts.entry(unit.output_path()).or_insert(0) += 1;
    }

    let mut collisions: Vec<(PathBuf, usize)> = counts
        .into_iter()
        .filter(|(_, n)| *n > 1)
        .map(|(p, n)| (p.to_path_buf(), n))
        .collect();
    collisions.sort();
    collisions
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_inplace_output_path() {
        let planner = OutputPlanner::new(OutputTarget::InPlace, "_ocr", false);
        let input = DiscoveredInput::file("/data/scans/a.pdf");
        assert_eq!(
            planner.output_path(&input),
            PathBuf::from("/data/scans/a_ocr.pdf")
        );
    }

    #[test]
    fn test_image_input_produces_pdf() {
        let planner = OutputPlanner::new(OutputTarget::InPlace, "_ocr", false);
        let input = DiscoveredInput::file("/data/scans/page.png");
        assert_eq!(
            planner.output_path(&input),
            PathBuf::from("/data/scans/page_ocr.pdf")
        );
    }

    #[test]
    fn test_output_dir_flattens_plain_files() {
        let planner = OutputPlanner::new(OutputTarget::Directory("/out".into()), "_ocr", false);
        let input = DiscoveredInput::file("/data/scans/a.pdf");
        assert_eq!(planner.output_path(&input), PathBuf::from("/out/a_ocr.pdf"));
    }

    #[test]
    fn test_output_dir_mirrors_directory_structure() {
        let planner = OutputPlanner::new(OutputTarget::Directory("/out".into()), "_ocr", false);
        let input = DiscoveredInput::under_root("/data/scans/2023/q1/a.pdf", "/data/scans");
        assert_eq!(
            planner.output_path(&input),
            PathBuf::from("/out/2023/q1/a_ocr.pdf")
        );
    }

    #[test]
    fn test_empty_suffix_does_not_overwrite_input() {
        let planner = OutputPlanner::new(OutputTarget::InPlace, "", false);
        let input = DiscoveredInput::file("/data/a.pdf");
        assert_eq!(planner.output_path(&input), PathBuf::from("/data/a_out.pdf"));
    }

    #[test]
    fn test_skip_when_output_exists() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("a.pdf");
        fs::write(&input, b"%PDF").unwrap();
        fs::write(dir.path().join("a_ocr.pdf"), b"%PDF").unwrap();

        let planner = OutputPlanner::new(OutputTarget::InPlace, "_ocr", false);
        let unit = planner.plan(&DiscoveredInput::file(&input));
        assert!(unit.should_skip());
        assert_eq!(unit.skip_reason(), Some(OUTPUT_EXISTS));

        let planner = OutputPlanner::new(OutputTarget::InPlace, "_ocr", true);
        let unit = planner.plan(&DiscoveredInput::file(&input));
        assert!(!unit.should_skip());
        assert_eq!(unit.skip_reason(), None);
    }

    #[test]
    fn test_exclude_own_outputs() {
        let planner = OutputPlanner::new(OutputTarget::InPlace, "_ocr", false);
        let inputs = vec![
            DiscoveredInput::under_root("/d/a.pdf", "/d"),
            DiscoveredInput::under_root("/d/a_ocr.pdf", "/d"),
            DiscoveredInput::under_root("/d/b_ocr.pdf", "/d"),
        ];

        let kept: Vec<PathBuf> = planner
            .exclude_own_outputs(inputs)
            .into_iter()
            .map(|i| i.path)
            .collect();
        // b_ocr.pdf 没有对应的 b.pdf，保留
        assert_eq!(kept, vec![PathBuf::from("/d/a.pdf"), PathBuf::from("/d/b_ocr.pdf")]);
    }

    #[test]
    fn test_find_output_collisions() {
        let planner = OutputPlanner::new(OutputTarget::Directory("/out".into()), "_ocr", false);
        let units = planner.plan_all(&[
            DiscoveredInput::file("/a/doc.pdf"),
            DiscoveredInput::file("/b/doc.pdf"),
            DiscoveredInput::file("/b/other.pdf"),
        ]);

        let collisions = find_output_collisions(&units);
        assert_eq!(collisions, vec![(PathBuf::from("/out/doc_ocr.pdf"), 2)]);
    }
}
