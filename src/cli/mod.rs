//! # CLI 模块
//!
//! 使用 `clap` 定义命令行参数。
//!
//! ## 命令结构
//! `ocrc [OPTIONS] <INPUT>... [-- <OCRMYPDF_ARGS>...]`
//!
//! ## 依赖关系
//! - 被 `main.rs` 使用
//! - 子模块: convert

pub mod convert;

use clap::Parser;

/// ocrc - 基于 ocrmypdf 的批量 OCR 工具
#[derive(Parser)]
#[command(name = "ocrc")]
#[command(author = "Changjiang Wu")]
#[command(version)]
#[command(
    about = "OCR one or many documents at once using ocrmypdf (PDFs and common image formats)",
    long_about = None
)]
pub struct Cli {
    #[command(flatten)]
    pub convert: convert::ConvertArgs,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_defaults() {
        let cli = Cli::try_parse_from(["ocrc", "a.pdf", "b.pdf"]).unwrap();
        let args = cli.convert;
        assert_eq!(args.inputs, vec!["a.pdf", "b.pdf"]);
        assert_eq!(args.lang, "eng");
        assert_eq!(args.suffix, "_ocr");
        assert_eq!(args.optimize, 3);
        assert!(args.jobs.is_none());
        assert!(args.extra.is_empty());
    }

    #[test]
    fn test_parse_extra_args() {
        let cli =
            Cli::try_parse_from(["ocrc", "-j", "2", "a.pdf", "--", "--rotate-pages", "--deskew"])
                .unwrap();
        assert_eq!(cli.convert.jobs, Some(2));
        assert_eq!(cli.convert.extra, vec!["--rotate-pages", "--deskew"]);
    }

    #[test]
    fn test_output_conflicts_with_inplace() {
        let result = Cli::try_parse_from(["ocrc", "-o", "out", "--inplace", "a.pdf"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_inputs_required() {
        assert!(Cli::try_parse_from(["ocrc"]).is_err());
    }
}
