// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 应用程序模块
///
/// 批处理编排用例
pub mod application;

/// 配置模块
///
/// 处理应用程序的配置设置和环境变量
pub mod config;

/// 领域模块
///
/// 包含核心实体（端点、新闻稿记录、批处理报告）与领域服务
pub mod domain;

/// 引擎模块
///
/// 页面抓取引擎与字符集处理
pub mod engines;

/// 基础设施模块
///
/// 本地存储与多编码导出
pub mod infrastructure;

/// 工具模块
///
/// 提供通用的工具函数和辅助功能
pub mod utils;
