//! 最小化的标记扫描器
//!
//! 只识别裁剪需要的部分：元素开始标签的位置、名称与属性。
//! 处理指令（`<?...?>`）、声明（`<!DOCTYPE ...>`）、注释与结束标签直接跳过；
//! 属性值中的 `>` 不会提前结束标签。

use once_cell::sync::Lazy;
use regex::Regex;

static ATTRIBUTE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"([A-Za-z_:][-A-Za-z0-9_:.]*)\s*=\s*(?:"([^"]*)"|'([^']*)')"#)
        .expect("attribute pattern is valid")
});

/// 一个元素开始标签（含自闭合标签）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StartTag<'a> {
    pub name: &'a str,
    /// 标签在文档中的字节范围，`end` 指向 `>` 之后
    pub start: usize,
    pub end: usize,
    pub self_closing: bool,
    attributes: &'a str,
}

impl<'a> StartTag<'a> {
    pub fn attributes(&self) -> impl Iterator<Item = (&'a str, &'a str)> + 'a {
        ATTRIBUTE.captures_iter(self.attributes).filter_map(|caps| {
            let name = caps.get(1)?.as_str();
            let value = caps.get(2).or_else(|| caps.get(3))?.as_str();
            Some((name, value))
        })
    }

    pub fn attribute(&self, wanted: &str) -> Option<&'a str> {
        self.attributes()
            .find(|(name, _)| *name == wanted)
            .map(|(_, value)| value)
    }
}

/// 从 `from` 开始找到不在引号内的 `>`
fn find_tag_end(doc: &str, from: usize) -> Option<usize> {
    let mut quote: Option<u8> = None;
    for (offset, byte) in doc.as_bytes()[from..].iter().enumerate() {
        match (quote, *byte) {
            (Some(q), b) if b == q => quote = None,
            (Some(_), _) => {}
            (None, b'"') | (None, b'\'') => quote = Some(*byte),
            (None, b'>') => return Some(from + offset),
            (None, _) => {}
        }
    }
    None
}

pub struct StartTags<'a> {
    doc: &'a str,
    pos: usize,
}

impl<'a> Iterator for StartTags<'a> {
    type Item = StartTag<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let start = self.pos + self.doc[self.pos..].find('<')?;
            let rest = &self.doc[start + 1..];

            if rest.starts_with("!--") {
                self.pos = match rest.find("-->") {
                    Some(i) => start + 1 + i + 3,
                    None => self.doc.len(),
                };
                continue;
            }

            let close = find_tag_end(self.doc, start + 1)?;
            self.pos = close + 1;

            if rest.starts_with(['/', '?', '!']) {
                continue;
            }

            let inner = &self.doc[start + 1..close];
            let name_len = inner
                .find(|c: char| c.is_whitespace() || c == '/')
                .unwrap_or(inner.len());
            if name_len == 0 {
                continue;
            }

            let self_closing = inner.trim_end().ends_with('/');
            let attributes = inner[name_len..].trim_end().trim_end_matches('/');

            return Some(StartTag {
                name: &inner[..name_len],
                start,
                end: close + 1,
                self_closing,
                attributes,
            });
        }
    }
}

pub fn start_tags(doc: &str) -> StartTags<'_> {
    StartTags { doc, pos: 0 }
}
