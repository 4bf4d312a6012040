// 该文件是 Kotoba （言叶） 项目的一部分。
// src/detector.rs - 推理协作方边界
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

use std::sync::Mutex;

use thiserror::Error;

use crate::geometry::NormalizedRect;

/// 采集图像的方向提示。竖屏取景时为 Right。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Orientation {
  Up,
  #[default]
  Right,
  Down,
  Left,
}

/// 推理输出中的单个目标：类别标签、置信度与归一化边界框
#[derive(Debug, Clone)]
pub struct RawObject {
  pub label: String,
  pub confidence: f32,
  pub bbox: NormalizedRect,
}

/// 推理协作方的两种输出形态：
/// 目标检测结果列表，或仅有类别而没有边界框的分类结果。
#[derive(Debug, Clone)]
pub enum RawInference {
  Objects(Vec<RawObject>),
  Classification { label: String, confidence: f32 },
}

/// 推理协作方。实现方接收图像缓冲区与方向提示，同步完成推理；
/// 管线在专用工作线程上调用，不会阻塞帧提交方。
pub trait Detector<F>: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  fn detect(&self, frame: &F, orientation: Orientation) -> Result<RawInference, Self::Error>;
}

#[derive(Error, Debug)]
pub enum ScriptedDetectorError {
  #[error("脚本结果已耗尽")]
  Exhausted,
}

/// 按脚本依次返回预设结果的检测器，供演示程序与测试使用。
/// 脚本耗尽后重新从头循环。
pub struct ScriptedDetector {
  script: Vec<RawInference>,
  cursor: Mutex<usize>,
}

impl ScriptedDetector {
  pub fn new(script: Vec<RawInference>) -> Self {
    Self {
      script,
      cursor: Mutex::new(0),
    }
  }
}

impl<F> Detector<F> for ScriptedDetector {
  type Error = ScriptedDetectorError;

  fn detect(&self, _frame: &F, _orientation: Orientation) -> Result<RawInference, Self::Error> {
    let mut cursor = self.cursor.lock().unwrap();
    if self.script.is_empty() {
      return Err(ScriptedDetectorError::Exhausted);
    }
    let result = self.script[*cursor % self.script.len()].clone();
    *cursor += 1;
    Ok(result)
  }
}
