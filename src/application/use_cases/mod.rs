// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 用例模块
///
/// 批处理编排：全量批次与单月抓取两个入口
pub mod harvest_use_case;
