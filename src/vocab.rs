// 该文件是 Kotoba （言叶） 项目的一部分。
// src/vocab.rs - 生词本存储
//
// 本文件根据 Apache 许可证第 2.0 版（以下简称“许可证”）授权使用；
// 除非遵守该许可证条款，否则您不得使用本文件。
// 您可通过以下网址获取许可证副本：
// http://www.apache.org/licenses/LICENSE-2.0
// 除非适用法律要求或书面同意，根据本许可协议分发的软件均按“原样”提供，
// 不附带任何形式的明示或暗示的保证或条件。
// 有关许可权限与限制的具体条款，请参阅本许可协议。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, Wareless Group

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::pipeline::Detection;

/// 生词本中的一个条目
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VocabItem {
  pub english: String,
  pub japanese: String,
  pub count: u32,
  pub first_saved_at: DateTime<Utc>,
  pub last_seen_at: DateTime<Utc>,
}

#[derive(Error, Debug)]
pub enum VocabStoreError {
  #[error("I/O 错误: {0}")]
  Io(#[from] std::io::Error),
  #[error("序列化错误: {0}")]
  Json(#[from] serde_json::Error),
}

/// 把一条检测写入生词本：按英文标签（不区分大小写）去重，
/// 已有条目累加次数并刷新时间，新条目插到最前。返回落库后的条目。
pub fn record(items: &mut Vec<VocabItem>, detection: &Detection) -> VocabItem {
  let key = detection.label.to_lowercase();
  if let Some(item) = items
    .iter_mut()
    .find(|item| item.english.to_lowercase() == key)
  {
    item.count += 1;
    item.last_seen_at = Utc::now();
    return item.clone();
  }

  let now = Utc::now();
  let item = VocabItem {
    english: detection.label.clone(),
    japanese: detection.translated.clone(),
    count: 1,
    first_saved_at: now,
    last_seen_at: now,
  };
  items.insert(0, item.clone());
  item
}

/// 大小写不敏感的子串检索，英文日文任一命中即保留；空查询返回全部
pub fn filter<'a>(items: &'a [VocabItem], query: &str) -> Vec<&'a VocabItem> {
  if query.is_empty() {
    return items.iter().collect();
  }
  let query = query.to_lowercase();
  items
    .iter()
    .filter(|item| {
      item.english.to_lowercase().contains(&query) || item.japanese.contains(&query)
    })
    .collect()
}

/// 平面 JSON 文件形式的生词本存储
pub struct VocabStore {
  path: PathBuf,
}

impl VocabStore {
  pub fn new(path: impl Into<PathBuf>) -> Self {
    Self { path: path.into() }
  }

  /// 读取全部条目。文件不存在或无法解析时返回空列表，不报错。
  pub fn load(&self) -> Vec<VocabItem> {
    let Ok(data) = std::fs::read(&self.path) else {
      return Vec::new();
    };
    match serde_json::from_slice(&data) {
      Ok(items) => items,
      Err(err) => {
        warn!("生词本文件无法解析，按空列表处理: {err}");
        Vec::new()
      }
    }
  }

  /// 整体落盘。先写临时文件再改名，避免写入中断留下半个文件。
  pub fn save(&self, items: &[VocabItem]) -> Result<(), VocabStoreError> {
    let tmp = self.path.with_extension("json.tmp");
    let data = serde_json::to_vec_pretty(items)?;
    std::fs::write(&tmp, data)?;
    std::fs::rename(&tmp, &self.path)?;
    Ok(())
  }
}
