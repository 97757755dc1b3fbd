// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域层模块
///
/// - 领域模型（models）：端点、报道资料与批处理报告
/// - 仓库接口（repositories）：导出产物的存储抽象
/// - 服务（services）：规划、提取、聚合与限速
pub mod models;
pub mod repositories;
pub mod services;
