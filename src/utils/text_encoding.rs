// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

//! 页面字符集处理
//!
//! 源站使用日文旧编码（Shift_JIS 等）。传输层声明的字符集经常被误报为
//! Latin-1 系列，此时强制改用旧编码解码。这是一个显式的特殊规则，
//! 并不是完整的字符集检测算法。

use chardetng::EncodingDetector;
use encoding_rs::{Encoding, WINDOWS_1252};
use once_cell::sync::Lazy;
use regex::bytes::Regex;
use thiserror::Error;
use tracing::{debug, info, warn};

/// `<meta charset>` 只在文档开头附近查找
const META_SCAN_LIMIT: usize = 4096;

static META_CHARSET: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)<meta[^>]*charset\s*=\s*["']?([A-Za-z0-9_\-:.]+)"#)
        .expect("meta charset pattern is valid")
});

/// 文本编码处理错误类型
#[derive(Error, Debug, Clone)]
pub enum TextEncodingError {
    #[error("无效的编码格式: {0}")]
    InvalidEncoding(String),
}

/// 字符集的来源
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharsetSource {
    /// Content-Type 响应头
    Header,
    /// 文档内的 `<meta charset>` 声明
    Meta,
    /// chardetng 检测
    Sniffed,
    /// 未声明，使用旧编码
    Fallback,
}

/// 解码后的页面
#[derive(Debug, Clone)]
pub struct DecodedText {
    pub text: String,
    pub encoding: &'static Encoding,
    pub source: CharsetSource,
    /// 是否放弃了声明的字符集（或没有声明）而使用了旧编码
    pub fallback_applied: bool,
    /// 解码过程中是否出现了无法映射的字节
    pub had_errors: bool,
}

/// 字符集决策策略
#[derive(Debug, Clone, Copy)]
pub struct CharsetPolicy {
    fallback: &'static Encoding,
    sniff_undeclared: bool,
}

impl CharsetPolicy {
    /// 创建新的字符集策略
    ///
    /// # 参数
    ///
    /// * `fallback_label` - 旧编码的标签，例如 `shift_jis`
    /// * `sniff_undeclared` - 未声明字符集时是否使用 chardetng 检测
    pub fn new(fallback_label: &str, sniff_undeclared: bool) -> Result<Self, TextEncodingError> {
        let fallback = Encoding::for_label(fallback_label.trim().as_bytes())
            .ok_or_else(|| TextEncodingError::InvalidEncoding(fallback_label.to_string()))?;
        Ok(Self {
            fallback,
            sniff_undeclared,
        })
    }

    /// 决定页面使用的编码
    ///
    /// 返回 (编码, 来源, 是否应用了回退)
    pub fn resolve(
        &self,
        content_type: Option<&str>,
        body: &[u8],
    ) -> (&'static Encoding, CharsetSource, bool) {
        let declared = content_type
            .and_then(charset_from_content_type)
            .map(|label| (label, CharsetSource::Header))
            .or_else(|| meta_charset(body).map(|label| (label, CharsetSource::Meta)));

        match declared {
            Some((label, source)) => match Encoding::for_label(label.as_bytes()) {
                // Latin-1 labels all map to windows-1252 in encoding_rs
                Some(encoding) if encoding == WINDOWS_1252 => {
                    info!(
                        declared = %label,
                        using = self.fallback.name(),
                        "Declared Latin-1 charset overridden"
                    );
                    (self.fallback, source, true)
                }
                Some(encoding) => (encoding, source, false),
                None => {
                    warn!(declared = %label, "Unknown charset label, using fallback");
                    (self.fallback, source, true)
                }
            },
            None if self.sniff_undeclared => {
                let mut detector = EncodingDetector::new();
                detector.feed(body, true);
                let encoding = detector.guess(Some(b"jp"), true);
                debug!(guessed = encoding.name(), "No charset declared, sniffed");
                (encoding, CharsetSource::Sniffed, false)
            }
            None => {
                debug!(using = self.fallback.name(), "No charset declared");
                (self.fallback, CharsetSource::Fallback, true)
            }
        }
    }

    /// 按策略把响应体解码为UTF-8字符串
    pub fn decode(&self, content_type: Option<&str>, body: &[u8]) -> DecodedText {
        let (encoding, source, fallback_applied) = self.resolve(content_type, body);
        let (text, used, had_errors) = encoding.decode(body);
        if had_errors {
            warn!(encoding = used.name(), "Malformed byte sequences replaced while decoding");
        }
        DecodedText {
            text: text.into_owned(),
            encoding: used,
            source,
            fallback_applied,
            had_errors,
        }
    }
}

/// 从 Content-Type 头中提取 charset 参数
pub fn charset_from_content_type(content_type: &str) -> Option<String> {
    content_type.split(';').skip(1).find_map(|param| {
        let (name, value) = param.split_once('=')?;
        if !name.trim().eq_ignore_ascii_case("charset") {
            return None;
        }
        let value = value.trim().trim_matches(|c| c == '"' || c == '\'');
        (!value.is_empty()).then(|| value.to_string())
    })
}

fn meta_charset(body: &[u8]) -> Option<String> {
    let head = &body[..body.len().min(META_SCAN_LIMIT)];
    META_CHARSET
        .captures(head)
        .and_then(|caps| caps.get(1))
        .map(|m| String::from_utf8_lossy(m.as_bytes()).into_owned())
}
