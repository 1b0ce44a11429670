//! 运行设置
//!
//! 优先级：内置默认值 < `--config` 指定的 JSON 设置文件 < 命令行参数。
//! 设置文件字段使用 camelCase，例如：
//!
//! ```json
//! { "lexer": "rust", "crop": true, "clipboardOutput": "text", "pollIntervalMs": 20 }
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::cli::Cli;
use crate::clipboard::listener::POLL_INTERVAL_DEFAULT_MS;
use crate::clipboard::WatchMode;
use crate::error::AppError;
use crate::highlight::{OutputFormat, DEFAULT_FONT_SIZE, DEFAULT_LEXER, MAX_FONT_SIZE};
use crate::storage::DEFAULT_OUTPUT_DIR;

/// 导出后如何处理剪贴板
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClipboardOutput {
    /// 不改动剪贴板
    #[default]
    #[serde(rename = "none")]
    Off,
    /// 写回 SVG 文本
    Text,
    /// 写回导出文件的引用（未实现）
    File,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    pub lexer: String,
    pub formatter: OutputFormat,
    pub line_numbers: bool,
    pub crop: bool,
    pub clipboard_output: ClipboardOutput,
    pub outdir: PathBuf,
    pub font_size: u32,
    pub poll_interval_ms: u64,
    pub watch_mode: WatchMode,
    /// 写回剪贴板的 SVG 不再作为新内容处理
    pub ignore_own_output: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            lexer: DEFAULT_LEXER.to_string(),
            formatter: OutputFormat::Svg,
            line_numbers: false,
            crop: false,
            clipboard_output: ClipboardOutput::Off,
            outdir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            font_size: DEFAULT_FONT_SIZE,
            poll_interval_ms: POLL_INTERVAL_DEFAULT_MS,
            watch_mode: WatchMode::Poll,
            ignore_own_output: true,
        }
    }
}

impl Settings {
    pub fn load_from_path(path: &Path) -> Result<Self, AppError> {
        let content = fs::read_to_string(path)
            .map_err(|e| AppError::Settings(format!("读取设置文件 '{}' 失败: {}", path.display(), e)))?;
        serde_json::from_str(&content)
            .map_err(|e| AppError::Settings(format!("解析设置文件 '{}' 失败: {}", path.display(), e)))
    }

    /// 合并设置文件与命令行参数
    pub fn resolve(cli: &Cli) -> Result<Self, AppError> {
        let base = match cli.config.as_deref() {
            Some(path) => Self::load_from_path(path)?,
            None => Self::default(),
        };
        let settings = base.with_cli_overrides(cli);
        settings.validate()?;
        Ok(settings)
    }

    fn with_cli_overrides(mut self, cli: &Cli) -> Self {
        if let Some(lexer) = &cli.lexer {
            self.lexer.clone_from(lexer);
        }
        if let Some(formatter) = cli.formatter {
            self.formatter = formatter;
        }
        if let Some(outdir) = &cli.outdir {
            self.outdir.clone_from(outdir);
        }
        if let Some(font_size) = cli.font_size {
            self.font_size = font_size;
        }
        if let Some(interval) = cli.poll_interval_ms {
            self.poll_interval_ms = interval;
        }
        if let Some(mode) = cli.watch_mode {
            self.watch_mode = mode;
        }

        self.line_numbers |= cli.line_numbers;
        self.crop |= cli.crop;
        if cli.overwrite_clipboard_text {
            self.clipboard_output = ClipboardOutput::Text;
        }
        if cli.overwrite_clipboard_file {
            self.clipboard_output = ClipboardOutput::File;
        }
        if cli.reprocess_own_output {
            self.ignore_own_output = false;
        }
        self
    }

    fn validate(&self) -> Result<(), AppError> {
        if self.lexer.trim().is_empty() {
            return Err(AppError::Settings("lexer 不能为空".to_string()));
        }
        if !(1..=MAX_FONT_SIZE).contains(&self.font_size) {
            return Err(AppError::Settings(format!(
                "fontSize 必须在 1..={} 之间，当前为 {}",
                MAX_FONT_SIZE, self.font_size
            )));
        }
        if self.outdir.as_os_str().is_empty() {
            return Err(AppError::Settings("outdir 不能为空".to_string()));
        }
        Ok(())
    }
}
