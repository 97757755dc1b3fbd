// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域服务模块
///
/// - URL规划（url_planner）
/// - 表格提取（extraction_service）
/// - 聚合排序（aggregation_service）
/// - 礼貌性限速（rate_limiting_service）
pub mod aggregation_service;
pub mod extraction_service;
pub mod rate_limiting_service;
pub mod url_planner;
