//! # 配色主题
//!
//! 复刻 "Light (Visual Studio)" 配色。主题是一张静态表：
//! 每个 token 类别对应一个作用域选择器和一条样式指令，启动时转换为
//! `syntect` 主题后全程复用。
//!
//! 样式指令语法：空格分隔的若干项
//! - `#rrggbb` / `#rgb`：前景色
//! - `bg:#rrggbb`：背景色
//! - `bold` / `italic` / `underline`，以及对应的 `no` 前缀形式

use std::str::FromStr;

use syntect::highlighting::{
    Color, FontStyle, ScopeSelectors, StyleModifier, Theme, ThemeItem, ThemeSettings,
};

use crate::error::AppError;

pub const THEME_NAME: &str = "Light (Visual Studio)";

pub const DEFAULT_FOREGROUND: Color = Color { r: 0x00, g: 0x00, b: 0x00, a: 0xFF };
pub const DEFAULT_BACKGROUND: Color = Color { r: 0xFF, g: 0xFF, b: 0xFF, a: 0xFF };

/// token 类别 → 样式
#[derive(Debug, Clone, Copy)]
pub struct TokenStyle {
    pub category: &'static str,
    pub selector: &'static str,
    pub style: &'static str,
}

const fn token(category: &'static str, selector: &'static str, style: &'static str) -> TokenStyle {
    TokenStyle { category, selector, style }
}

pub static TOKEN_STYLES: &[TokenStyle] = &[
    token("whitespace", "meta.whitespace, punctuation.whitespace", "#bbbbbb"),
    token("comment", "comment", "#008000"),
    token(
        "comment.preproc",
        "meta.preprocessor, keyword.control.import, keyword.control.directive",
        "#0000FF",
    ),
    token("comment.special", "comment.block.documentation", "noitalic bold"),
    token("string", "string", "#A31515"),
    token("string.char", "constant.character", "#800080"),
    token("number", "constant.numeric", "#098658"),
    token(
        "keyword",
        "keyword, storage.type, storage.modifier, constant.language",
        "#0000FF",
    ),
    // 标点类运算符不属于关键字
    token("operator", "keyword.operator", "#000000"),
    token("operator.word", "keyword.operator.word, keyword.operator.logical.python", "bold"),
    token("name.tag", "entity.name.tag", "bold #000080"),
    token("name.attribute", "entity.other.attribute-name", "#FF0000"),
    token("generic.heading", "markup.heading", "#999999"),
    token("generic.subheading", "markup.heading.2, markup.heading.3", "#aaaaaa"),
    token("generic.deleted", "markup.deleted", "bg:#ffdddd #000000"),
    token("generic.inserted", "markup.inserted", "bg:#ddffdd #000000"),
    token("generic.error", "markup.error, message.error", "#aa0000"),
    token("generic.emph", "markup.italic", "italic"),
    token("generic.strong", "markup.bold", "bold"),
    token("generic.prompt", "markup.prompt, meta.prompt", "#555555"),
    token("generic.output", "markup.output, markup.raw.output", "#888888"),
    token("generic.traceback", "markup.traceback, meta.traceback", "#aa0000"),
    token("error", "invalid", "bg:#e3d2d2 #a61717"),
];

fn parse_hex_color(value: &str) -> Option<Color> {
    let hex = value.strip_prefix('#')?;
    if !hex.is_ascii() {
        return None;
    }
    let expanded: String = match hex.len() {
        3 => hex.chars().flat_map(|c| [c, c]).collect(),
        6 => hex.to_string(),
        _ => return None,
    };
    let channel = |i: usize| u8::from_str_radix(&expanded[i..i + 2], 16).ok();
    Some(Color {
        r: channel(0)?,
        g: channel(2)?,
        b: channel(4)?,
        a: 0xFF,
    })
}

/// 解析一条样式指令
pub fn parse_style_spec(spec: &str) -> Result<StyleModifier, AppError> {
    let mut modifier = StyleModifier::default();
    let mut font_style: Option<FontStyle> = None;

    for part in spec.split_whitespace() {
        let mut set_font = |flag: FontStyle, on: bool| {
            let current = font_style.get_or_insert_with(FontStyle::empty);
            if on {
                current.insert(flag);
            } else {
                current.remove(flag);
            }
        };

        match part {
            "bold" => set_font(FontStyle::BOLD, true),
            "nobold" => set_font(FontStyle::BOLD, false),
            "italic" => set_font(FontStyle::ITALIC, true),
            "noitalic" => set_font(FontStyle::ITALIC, false),
            "underline" => set_font(FontStyle::UNDERLINE, true),
            "nounderline" => set_font(FontStyle::UNDERLINE, false),
            "noinherit" => {}
            _ => {
                let (target, value) = match part.strip_prefix("bg:") {
                    Some(value) => (&mut modifier.background, value),
                    None => (&mut modifier.foreground, part),
                };
                let color = parse_hex_color(value)
                    .ok_or_else(|| AppError::Highlight(format!("无效的样式指令 '{}'（{}）", part, spec)))?;
                *target = Some(color);
            }
        }
    }

    modifier.font_style = font_style;
    Ok(modifier)
}

/// 把静态样式表转换为 `syntect` 主题
pub fn build_theme() -> Result<Theme, AppError> {
    let mut scopes = Vec::with_capacity(TOKEN_STYLES.len());
    for entry in TOKEN_STYLES {
        let scope = ScopeSelectors::from_str(entry.selector).map_err(|e| {
            AppError::Highlight(format!("类别 '{}' 的作用域选择器无效: {:?}", entry.category, e))
        })?;
        let style = parse_style_spec(entry.style)?;
        scopes.push(ThemeItem { scope, style });
    }

    Ok(Theme {
        name: Some(THEME_NAME.to_string()),
        author: None,
        settings: ThemeSettings {
            foreground: Some(DEFAULT_FOREGROUND),
            background: Some(DEFAULT_BACKGROUND),
            ..ThemeSettings::default()
        },
        scopes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn theme_table_builds() {
        let theme = build_theme().expect("static table must be valid");
        assert_eq!(theme.scopes.len(), TOKEN_STYLES.len());
        assert_eq!(theme.name.as_deref(), Some(THEME_NAME));
    }

    #[test]
    fn parse_foreground_and_bold() {
        let modifier = parse_style_spec("bold #000080").unwrap();
        assert_eq!(modifier.foreground, Some(Color { r: 0, g: 0, b: 0x80, a: 0xFF }));
        assert_eq!(modifier.font_style, Some(FontStyle::BOLD));
        assert_eq!(modifier.background, None);
    }

    #[test]
    fn parse_background() {
        let modifier = parse_style_spec("bg:#e3d2d2 #a61717").unwrap();
        assert_eq!(modifier.background, Some(Color { r: 0xe3, g: 0xd2, b: 0xd2, a: 0xFF }));
        assert_eq!(modifier.foreground, Some(Color { r: 0xa6, g: 0x17, b: 0x17, a: 0xFF }));
    }

    #[test]
    fn noitalic_bold_resets_font_style() {
        let modifier = parse_style_spec("noitalic bold").unwrap();
        assert_eq!(modifier.font_style, Some(FontStyle::BOLD));
    }

    #[test]
    fn short_hex_expands() {
        let modifier = parse_style_spec("#f00").unwrap();
        assert_eq!(modifier.foreground, Some(Color { r: 0xFF, g: 0, b: 0, a: 0xFF }));
    }

    #[test]
    fn color_only_spec_inherits_font_style() {
        assert_eq!(parse_style_spec("#008000").unwrap().font_style, None);
    }

    #[test]
    fn invalid_directive_is_rejected() {
        assert!(matches!(parse_style_spec("blink"), Err(AppError::Highlight(_))));
    }
}
