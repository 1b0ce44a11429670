//! 命令行参数定义
//!
//! 布尔开关只能打开对应功能；带值的参数为 `None` 时沿用配置文件或默认值，
//! 合并逻辑见 `settings`。

use std::path::PathBuf;

use clap::Parser;

use crate::clipboard::WatchMode;
use crate::highlight::OutputFormat;

/// 自动高亮剪贴板中的代码并导出为 SVG
#[derive(Parser, Debug)]
#[command(name = "clipper", version)]
#[command(about = "Automated highlighting and export of code in the clipboard as SVG", long_about = None)]
pub struct Cli {
    /// Which lexer/language to use for parsing code (name or file extension, default: c)
    #[arg(long, value_name = "NAME")]
    pub lexer: Option<String>,

    /// Formatter to use for exporting code
    #[arg(long, value_enum, value_name = "FORMAT")]
    pub formatter: Option<OutputFormat>,

    /// Add line numbers to generated output
    #[arg(long)]
    pub line_numbers: bool,

    /// Set the height and width of the svg file to fit its contents
    #[arg(long)]
    pub crop: bool,

    /// Copy the textual representation of the result into the clipboard
    #[arg(long, conflicts_with = "overwrite_clipboard_file")]
    pub overwrite_clipboard_text: bool,

    /// Copy the result into the clipboard as a reference to the stored file (not implemented)
    #[arg(long)]
    pub overwrite_clipboard_file: bool,

    /// Directory into which the exported snippets are saved (default: clipper_snippets)
    #[arg(long, value_name = "PATH")]
    pub outdir: Option<PathBuf>,

    /// Font size of the rendered code in pixels (default: 14)
    #[arg(long, value_name = "PX")]
    pub font_size: Option<u32>,

    /// Clipboard polling interval in milliseconds (default: 10)
    #[arg(long, value_name = "MS")]
    pub poll_interval_ms: Option<u64>,

    /// How to wait for clipboard changes
    #[arg(long, value_enum)]
    pub watch_mode: Option<WatchMode>,

    /// Treat SVG written back to the clipboard by this tool as new input
    #[arg(long)]
    pub reprocess_own_output: bool,

    /// JSON settings file; command-line flags take precedence over it
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Print the available lexers and exit
    #[arg(long)]
    pub list_lexers: bool,
}
