// 该文件是 Kotoba （言叶） 项目的一部分。
// src/reduce.rs - 同类重叠检测去重
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

use crate::pipeline::Detection;

/// 默认 IoU 抑制阈值
pub const DEFAULT_IOU_THRESHOLD: f32 = 0.4;

/// 按标签抑制重叠检测：置信度降序排序后贪心接收，
/// 仅当已接收的同标签检测与候选的 IoU 严格大于阈值时丢弃候选。
/// 单趟、与顺序相关：置信度高者总是胜出。不同标签之间从不互相抑制。
pub fn reduce_overlaps(mut detections: Vec<Detection>, iou_threshold: f32) -> Vec<Detection> {
  detections.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));

  let mut result: Vec<Detection> = Vec::with_capacity(detections.len());
  for candidate in detections {
    let duplicated = result.iter().any(|kept| {
      kept.label == candidate.label && kept.rect.iou(&candidate.rect) > iou_threshold
    });
    if !duplicated {
      result.push(candidate);
    }
  }
  result
}
