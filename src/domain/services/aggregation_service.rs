// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::press_release::PressRelease;

/// 聚合服务
///
/// 按端点顺序拼接各页面的记录，然后按原始日期字符串降序排列。
/// 排序键是未解析的原始字符串，不做去重。
pub struct AggregationService;

impl AggregationService {
    /// 拼接并排序
    pub fn aggregate<I>(pages: I) -> Vec<PressRelease>
    where
        I: IntoIterator<Item = Vec<PressRelease>>,
    {
        let mut records: Vec<PressRelease> = pages.into_iter().flatten().collect();
        Self::sort_by_date_desc(&mut records);
        records
    }

    /// 稳定排序，日期相同的记录保持抓取顺序
    pub fn sort_by_date_desc(records: &mut [PressRelease]) {
        records.sort_by(|a, b| b.date.cmp(&a.date));
    }
}
