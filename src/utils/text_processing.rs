// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

//! 文本规范化
//!
//! 提取出的每个字段在写入 [`PressRelease`](crate::domain::models::press_release::PressRelease)
//! 之前都要经过这里的处理。

/// 将连续的空白字符和控制字符折叠为单个空格，并去除首尾空白
///
/// 对已规范化的字符串再次调用不会产生任何变化。
pub fn normalize_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending_space = false;

    for ch in text.chars() {
        if ch.is_whitespace() || ch.is_control() {
            pending_space = !out.is_empty();
        } else {
            if pending_space {
                out.push(' ');
                pending_space = false;
            }
            out.push(ch);
        }
    }

    out
}

/// 导出前的字段清理
///
/// 去除控制字符，并把字段内的分隔符替换为空格，避免列错位。
pub fn sanitize_field(field: &str, delimiter: char) -> String {
    let normalized = normalize_text(field);
    if normalized.contains(delimiter) {
        normalize_text(&normalized.replace(delimiter, " "))
    } else {
        normalized
    }
}
