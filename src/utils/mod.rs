// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 工具模块
///
/// 提供文本规范化、字符集处理、URL解析与日志初始化
pub mod errors;
pub mod telemetry;
pub mod text_encoding;
pub mod text_processing;
pub mod url_utils;
