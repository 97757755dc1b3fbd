// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域模型模块
///
/// - 端点（endpoint）：一个月份的抓取单元
/// - 报道资料（press_release）：从表格行中提取的记录
/// - 批处理报告（batch_report）：整次运行的累积结果
pub mod batch_report;
pub mod endpoint;
pub mod press_release;
