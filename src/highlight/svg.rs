//! # SVG 输出
//!
//! 版式与经典高亮器的 SVG 输出一致：
//! - 每个物理行一个 `<text>`，第一行基线 `y = 字号`，行距 `字号 + 5`
//! - 每段样式一致的 token 一个 `<tspan>`，默认前景色的文本不包裹
//! - 字号与字体族声明在唯一的 `<g>` 上
//! - 根元素不带宽高，裁剪由 `crop` 模块负责
//!
//! SVG 文本不支持背景色，样式中的背景色在这里被忽略。

use std::fmt::Write;

use syntect::highlighting::{Color, FontStyle, Style};

use super::theme::DEFAULT_FOREGROUND;

const XML_HEADER: &str = "<?xml version=\"1.0\"?>\n<!DOCTYPE svg PUBLIC \"-//W3C//DTD SVG 1.0//EN\" \"http://www.w3.org/TR/2001/REC-SVG-20010904/DTD/svg10.dtd\">\n";
const LINE_NUMBER_FILL: &str = "#999999";

#[derive(Debug, Clone)]
pub struct SvgOptions {
    pub font_size: u32,
    pub font_family: &'static str,
    pub line_numbers: bool,
}

impl Default for SvgOptions {
    fn default() -> Self {
        Self {
            font_size: 14,
            font_family: "monospace",
            line_numbers: false,
        }
    }
}

impl SvgOptions {
    pub fn line_step(&self) -> u64 {
        u64::from(self.font_size) + 5
    }

    /// 第 `index` 行（从 0 开始）的基线纵坐标
    pub fn baseline(&self, index: usize) -> u64 {
        (index as u64)
            .saturating_mul(self.line_step())
            .saturating_add(u64::from(self.font_size))
    }

    fn gutter_width(&self, line_count: usize) -> u64 {
        if !self.line_numbers {
            return 0;
        }
        let digits = line_count.max(1).to_string().len() as u64;
        (digits + 1) * u64::from(self.font_size)
    }
}

fn hex(color: Color) -> String {
    format!("#{:02x}{:02x}{:02x}", color.r, color.g, color.b)
}

fn tspan_attributes(style: &Style) -> String {
    let mut attrs = String::new();
    if style.foreground != DEFAULT_FOREGROUND {
        let _ = write!(attrs, " fill=\"{}\"", hex(style.foreground));
    }
    if style.font_style.contains(FontStyle::BOLD) {
        attrs.push_str(" font-weight=\"bold\"");
    }
    if style.font_style.contains(FontStyle::ITALIC) {
        attrs.push_str(" font-style=\"italic\"");
    }
    if style.font_style.contains(FontStyle::UNDERLINE) {
        attrs.push_str(" text-decoration=\"underline\"");
    }
    attrs
}

fn escape_into(out: &mut String, text: &str) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\n' | '\r' => {}
            // XML 1.0 不允许的控制字符
            c if (c as u32) < 0x20 && c != '\t' => {}
            c => out.push(c),
        }
    }
}

fn write_runs(out: &mut String, runs: &[(Style, &str)]) {
    // 合并相邻且属性相同的片段
    let mut pending: Option<(String, String)> = None;

    let flush = |out: &mut String, pending: Option<(String, String)>| {
        if let Some((attrs, text)) = pending {
            if text.is_empty() {
                return;
            }
            if attrs.is_empty() {
                out.push_str(&text);
            } else {
                let _ = write!(out, "<tspan{}>{}</tspan>", attrs, text);
            }
        }
    };

    for (style, piece) in runs {
        let attrs = tspan_attributes(style);
        let mut escaped = String::new();
        escape_into(&mut escaped, piece);

        match pending.as_mut() {
            Some((current, text)) if *current == attrs => text.push_str(&escaped),
            _ => {
                flush(out, pending.take());
                pending = Some((attrs, escaped));
            }
        }
    }
    flush(out, pending);
}

/// 把逐行的样式片段写成 SVG 文档
pub fn render(lines: &[Vec<(Style, &str)>], options: &SvgOptions) -> String {
    let gutter = options.gutter_width(lines.len());
    let mut out = String::with_capacity(XML_HEADER.len() + lines.len() * 80);

    out.push_str(XML_HEADER);
    out.push_str("<svg xmlns=\"http://www.w3.org/2000/svg\">\n");
    let _ = writeln!(
        out,
        "<g font-family=\"{}\" font-size=\"{}px\">",
        options.font_family, options.font_size
    );

    for (index, runs) in lines.iter().enumerate() {
        let y = options.baseline(index);
        if options.line_numbers {
            let _ = writeln!(
                out,
                "<text x=\"{}\" y=\"{}\" text-anchor=\"end\" fill=\"{}\">{}</text>",
                gutter - u64::from(options.font_size / 2),
                y,
                LINE_NUMBER_FILL,
                index + 1
            );
        }
        let _ = write!(out, "<text x=\"{}\" y=\"{}\" xml:space=\"preserve\">", gutter, y);
        write_runs(&mut out, runs);
        out.push_str("</text>\n");
    }

    out.push_str("</g></svg>\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain() -> Style {
        Style {
            foreground: DEFAULT_FOREGROUND,
            background: Color::WHITE,
            font_style: FontStyle::empty(),
        }
    }

    fn blue() -> Style {
        Style {
            foreground: Color { r: 0, g: 0, b: 0xFF, a: 0xFF },
            ..plain()
        }
    }

    #[test]
    fn renders_one_text_element_per_line() {
        let lines = vec![vec![(plain(), "a\n")], vec![(plain(), "b")]];
        let svg = render(&lines, &SvgOptions::default());
        assert!(svg.contains("<text x=\"0\" y=\"14\" xml:space=\"preserve\">a</text>"));
        assert!(svg.contains("<text x=\"0\" y=\"33\" xml:space=\"preserve\">b</text>"));
        assert!(svg.contains("font-size=\"14px\""));
        assert!(svg.contains("<svg xmlns=\"http://www.w3.org/2000/svg\">"));
    }

    #[test]
    fn styled_runs_become_tspans_and_merge() {
        let lines = vec![vec![(blue(), "re"), (blue(), "turn"), (plain(), " 0;\n")]];
        let svg = render(&lines, &SvgOptions::default());
        assert!(svg.contains("<tspan fill=\"#0000ff\">return</tspan> 0;</text>"));
    }

    #[test]
    fn markup_characters_are_escaped() {
        let lines = vec![vec![(plain(), "a < b && c > d\n")]];
        let svg = render(&lines, &SvgOptions::default());
        assert!(svg.contains("a &lt; b &amp;&amp; c &gt; d"));
    }

    #[test]
    fn line_numbers_add_gutter() {
        let options = SvgOptions {
            line_numbers: true,
            ..SvgOptions::default()
        };
        let lines = vec![vec![(plain(), "x\n")], vec![(plain(), "y\n")]];
        let svg = render(&lines, &options);
        assert!(svg.contains("<text x=\"21\" y=\"14\" text-anchor=\"end\" fill=\"#999999\">1</text>"));
        assert!(svg.contains("<text x=\"28\" y=\"33\" xml:space=\"preserve\">y</text>"));
    }

    #[test]
    fn largest_font_size_lays_out_without_overflow() {
        let options = SvgOptions {
            font_size: u32::MAX,
            line_numbers: true,
            ..SvgOptions::default()
        };
        assert_eq!(options.line_step(), u64::from(u32::MAX) + 5);
        assert_eq!(options.baseline(1), 2 * u64::from(u32::MAX) + 5);

        let lines = vec![vec![(plain(), "a\n")], vec![(plain(), "b")]];
        let svg = render(&lines, &options);
        assert!(svg.contains(&format!("y=\"{}\"", 2 * u64::from(u32::MAX) + 5)));
    }

    #[test]
    fn bold_italic_attributes() {
        let style = Style {
            font_style: FontStyle::BOLD | FontStyle::ITALIC,
            ..plain()
        };
        assert_eq!(tspan_attributes(&style), " font-weight=\"bold\" font-style=\"italic\"");
    }
}
