//! # 语法高亮模块（highlight）
//!
//! ## 设计思路
//!
//! 分词完全委托 `syntect` 自带的语法定义，本模块只负责：
//! - 按名称查找语法（找不到即失败，不输出半成品）
//! - 用固定配色主题给 token 上色
//! - 把上色结果写成 SVG 文档
//!
//! ## 实现思路
//!
//! - `Highlighter` 在启动时加载语法集与主题，之后每次渲染复用。
//! - `theme`：静态配色表；`svg`：SVG 版式。
//! - 任一行分词失败都使整次渲染失败，由流水线跳过本次导出。

pub mod svg;
pub mod theme;

use std::fmt;

use serde::Deserialize;
use syntect::easy::HighlightLines;
use syntect::highlighting::Theme;
use syntect::parsing::{SyntaxReference, SyntaxSet};
use syntect::util::LinesWithEndings;

use crate::error::AppError;
use svg::SvgOptions;

pub const DEFAULT_LEXER: &str = "c";
/// 可接受的最大字号（px）
pub const MAX_FONT_SIZE: u32 = 1_000;
pub const DEFAULT_FONT_SIZE: u32 = 14;

/// 常见别名 → `syntect` 能识别的名称或扩展名
const LEXER_ALIASES: &[(&str, &str)] = &[
    ("c++", "cpp"),
    ("csharp", "cs"),
    ("c#", "cs"),
    ("bash", "sh"),
    ("shell", "sh"),
    ("zsh", "sh"),
    ("javascript", "js"),
    ("golang", "go"),
    ("py3", "py"),
    ("python3", "py"),
    ("yml", "yaml"),
];

/// 输出格式，目前只支持 SVG
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Svg,
}

/// 单次渲染请求
#[derive(Debug, Clone, Copy)]
pub struct RenderRequest<'a> {
    pub text: &'a str,
    pub lexer: &'a str,
    pub format: OutputFormat,
    pub line_numbers: bool,
    pub font_size: u32,
}

/// 渲染得到的 SVG 文档文本
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedDocument(String);

impl RenderedDocument {
    pub fn new(markup: String) -> Self {
        Self(markup)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for RenderedDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 可用语法的简要信息（用于 `--list-lexers`）
#[derive(Debug, Clone)]
pub struct LexerInfo {
    pub name: String,
    pub extensions: Vec<String>,
}

pub struct Highlighter {
    syntaxes: SyntaxSet,
    theme: Theme,
}

impl Highlighter {
    pub fn new() -> Result<Self, AppError> {
        Ok(Self {
            syntaxes: SyntaxSet::load_defaults_newlines(),
            theme: theme::build_theme()?,
        })
    }

    /// 按名称、扩展名或别名查找语法（不区分大小写）
    pub fn find_lexer(&self, name: &str) -> Result<&SyntaxReference, AppError> {
        let wanted = name.trim().to_lowercase();
        let token = LEXER_ALIASES
            .iter()
            .find(|(alias, _)| *alias == wanted)
            .map(|(_, target)| *target)
            .unwrap_or(wanted.as_str());

        if token.is_empty() {
            return Err(AppError::UnknownLexer(name.to_string()));
        }

        self.syntaxes
            .find_syntax_by_token(token)
            .ok_or_else(|| AppError::UnknownLexer(name.to_string()))
    }

    pub fn lexers(&self) -> Vec<LexerInfo> {
        let mut lexers: Vec<LexerInfo> = self
            .syntaxes
            .syntaxes()
            .iter()
            .map(|syntax| LexerInfo {
                name: syntax.name.clone(),
                extensions: syntax.file_extensions.clone(),
            })
            .collect();
        lexers.sort_by_key(|info| info.name.to_lowercase());
        lexers
    }

    pub fn render(&self, request: &RenderRequest<'_>) -> Result<RenderedDocument, AppError> {
        if !(1..=MAX_FONT_SIZE).contains(&request.font_size) {
            return Err(AppError::Highlight(format!(
                "字号必须在 1..={} 之间: {}",
                MAX_FONT_SIZE, request.font_size
            )));
        }

        let syntax = self.find_lexer(request.lexer)?;
        let mut highlighter = HighlightLines::new(syntax, &self.theme);

        let mut lines = Vec::new();
        for line in LinesWithEndings::from(request.text) {
            let runs = highlighter
                .highlight_line(line, &self.syntaxes)
                .map_err(|e| AppError::Highlight(format!("{} 语法分词失败: {}", syntax.name, e)))?;
            lines.push(runs);
        }

        let markup = match request.format {
            OutputFormat::Svg => svg::render(
                &lines,
                &SvgOptions {
                    font_size: request.font_size,
                    line_numbers: request.line_numbers,
                    ..SvgOptions::default()
                },
            ),
        };

        log::debug!(
            "🎨 使用 {} 语法渲染 {} 行，输出 {} 字节",
            syntax.name,
            lines.len(),
            markup.len()
        );

        Ok(RenderedDocument::new(markup))
    }
}
