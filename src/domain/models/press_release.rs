// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::utils::text_processing::normalize_text;
use serde::{Deserialize, Serialize};

/// 导出文件的列标题，顺序与 [`PressRelease::fields`] 一致
pub const COLUMN_HEADERS: [&str; 5] = ["発表日", "内容", "部局", "リンクURL", "対象期間"];

/// 报道资料记录
///
/// 从索引页面表格的一行中提取。所有文本字段在构造时已经过规范化，
/// 之后不再修改。相邻月份之间可能出现重复记录，这里不做去重。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PressRelease {
    /// 发表日期（原始字符串，不解析）
    pub date: String,
    /// 标题
    pub title: String,
    /// 部局
    pub department: String,
    /// 绝对链接URL，没有链接时为空字符串
    pub link: String,
    /// 来源期间，等于所属端点的期间标签
    pub period: String,
}

impl PressRelease {
    /// 由原始单元格文本创建记录，所有字段都会被规范化
    pub fn new(date: &str, title: &str, department: &str, link: &str, period: &str) -> Self {
        Self {
            date: normalize_text(date),
            title: normalize_text(title),
            department: normalize_text(department),
            link: normalize_text(link),
            period: normalize_text(period),
        }
    }

    /// 按导出列顺序返回字段
    pub fn fields(&self) -> [&str; 5] {
        [
            &self.date,
            &self.title,
            &self.department,
            &self.link,
            &self.period,
        ]
    }
}
