//! 包围盒估算与裁剪模块
//!
//! # 设计思路
//!
//! 高亮器输出的 SVG 根元素不带尺寸，查看器会按默认画布显示，留出大片空白。
//! 这里不做真正的字体度量，而是用两条启发式规则估算一个紧凑的包围盒：
//! - **高度**：所有 `<text>` 元素 `y` 坐标的最大值（最后一行文字的基线）
//! - **宽度**：原始文本最长物理行的字符数 × 字号 × 0.65，
//!   再加上 `<text>` 元素最大的 `x` 偏移（行号栏宽度，无行号时为 0）
//!
//! 然后把根元素 `<svg>` 的开始标签改写为带 `height`、`width` 的版本。
//!
//! # 实现思路
//!
//! - 标签与属性由 `markup` 子模块扫描，不对整篇文档做正则替换。
//! - 估算是文档与原文的纯函数，同一输入多次裁剪结果相同。
//! - 找不到文本元素、字号缺失或非正数时返回 `AppError::MalformedRender`。

pub mod markup;

use crate::error::AppError;
use crate::highlight::RenderedDocument;
use markup::{start_tags, StartTag};

/// 平均字符宽度与字号之比（经验值）
pub const FONT_SIZE_TO_WIDTH_RATIO: f64 = 0.65;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundingBox {
    pub height: u32,
    pub width: u32,
}

fn parse_coordinate(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    let number = trimmed.strip_suffix("px").unwrap_or(trimmed);
    number.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

fn to_pixels(value: f64) -> u32 {
    value.ceil().clamp(0.0, u32::MAX as f64) as u32
}

/// 第一个 `font-size` 声明（像素，整数）
pub fn font_size(document: &str) -> Result<u32, AppError> {
    let declared = start_tags(document)
        .find_map(|tag| tag.attribute("font-size"))
        .ok_or_else(|| AppError::MalformedRender("未找到 font-size 声明".to_string()))?;

    let trimmed = declared.trim();
    let size: i64 = trimmed
        .strip_suffix("px")
        .unwrap_or(trimmed)
        .trim()
        .parse()
        .map_err(|_| AppError::MalformedRender(format!("无法解析字号 '{}'", declared)))?;

    if size <= 0 {
        return Err(AppError::MalformedRender(format!("字号必须为正数，实际为 {}", size)));
    }
    u32::try_from(size).map_err(|_| AppError::MalformedRender(format!("字号过大: {}", size)))
}

fn text_tags(document: &str) -> impl Iterator<Item = StartTag<'_>> {
    start_tags(document).filter(|tag| tag.name == "text")
}

/// 所有 `<text>` 元素中最大的 `y`
pub fn max_text_baseline(document: &str) -> Result<u32, AppError> {
    text_tags(document)
        .filter_map(|tag| tag.attribute("y").and_then(parse_coordinate))
        .fold(None, |max: Option<f64>, y| Some(max.map_or(y, |m| m.max(y))))
        .map(to_pixels)
        .ok_or_else(|| AppError::MalformedRender("未找到带 y 坐标的 <text> 元素".to_string()))
}

fn max_text_offset(document: &str) -> u32 {
    let max_x = text_tags(document)
        .filter_map(|tag| tag.attribute("x").and_then(parse_coordinate))
        .fold(0.0_f64, f64::max);
    to_pixels(max_x)
}

/// 原文最长物理行的字符数（`\n`、`\r\n`、`\r` 都视为换行）
pub fn longest_line_chars(text: &str) -> usize {
    text.split(['\n', '\r'])
        .map(|line| line.chars().count())
        .max()
        .unwrap_or(0)
}

/// 估算紧凑包围盒
pub fn infer_bounding_box(document: &str, source: &str) -> Result<BoundingBox, AppError> {
    let height = max_text_baseline(document)?;
    let font_size = font_size(document)?;

    let text_width = longest_line_chars(source) as f64 * font_size as f64 * FONT_SIZE_TO_WIDTH_RATIO;
    let width = (text_width as u32).saturating_add(max_text_offset(document));

    Ok(BoundingBox { height, width })
}

/// 改写根元素开始标签：宽高放在最前，原有的 `width`/`height` 被替换
pub fn apply_bounding_box(document: &str, bbox: BoundingBox) -> Result<String, AppError> {
    let root = start_tags(document)
        .find(|tag| tag.name == "svg")
        .ok_or_else(|| AppError::MalformedRender("未找到 <svg> 根元素".to_string()))?;

    let mut tag = format!("<svg height=\"{}\" width=\"{}\"", bbox.height, bbox.width);
    for (name, value) in root.attributes() {
        if name == "width" || name == "height" {
            continue;
        }
        tag.push(' ');
        tag.push_str(name);
        tag.push_str("=\"");
        tag.push_str(&value.replace('"', "&quot;"));
        tag.push('"');
    }
    tag.push_str(if root.self_closing { "/>" } else { ">" });

    let mut out = String::with_capacity(document.len() + 32);
    out.push_str(&document[..root.start]);
    out.push_str(&tag);
    out.push_str(&document[root.end..]);
    Ok(out)
}

/// 估算包围盒并改写文档
pub fn crop(document: &RenderedDocument, source: &str) -> Result<(RenderedDocument, BoundingBox), AppError> {
    let bbox = infer_bounding_box(document.as_str(), source)?;
    log::info!("✂️ 裁剪 SVG: height={} width={}", bbox.height, bbox.width);
    let cropped = apply_bounding_box(document.as_str(), bbox)?;
    Ok((RenderedDocument::new(cropped), bbox))
}
