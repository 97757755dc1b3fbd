// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 应用程序模块
///
/// 把领域服务、抓取引擎与导出组合成完整的批处理流程
pub mod use_cases;
