// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 基础设施模块
///
/// 导出产物的序列化与文件存储
pub mod export;
pub mod storage;
