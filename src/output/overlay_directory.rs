// 该文件是 Kotoba （言叶） 项目的一部分。
// src/output/overlay_directory.rs - 叠加帧目录输出
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
use std::sync::{Arc, Mutex};

use chrono::{Datelike, Utc};
use image::RgbImage;
use thiserror::Error;

use crate::pipeline::Detection;
use crate::{FromUrl, FromUrlWithScheme, output::overlay};

#[derive(Error, Debug)]
pub enum OverlayDirectoryError {
  #[error("URI 方案不匹配")]
  SchemeMismatch,
  #[error("图像错误: {0}")]
  ImageError(#[from] image::ImageError),
  #[error("I/O 错误: {0}")]
  IoError(#[from] std::io::Error),
}

/// 把叠加了检测框的帧按日期分目录落盘，供演示程序回看。
/// 通过 `folder:///path/to/dir?always` 形式的 URL 配置；
/// 默认只保存检测集非空的帧，带 `always` 参数时每帧都保存。
pub struct OverlayDirectory {
  directory: PathBuf,
  frame_counter: Arc<Mutex<u16>>,
  always: bool,
}

impl FromUrlWithScheme for OverlayDirectory {
  const SCHEME: &'static str = "folder";
}

impl FromUrl for OverlayDirectory {
  type Error = OverlayDirectoryError;

  fn from_url(url: &url::Url) -> Result<Self, Self::Error> {
    if url.scheme() != Self::SCHEME {
      return Err(OverlayDirectoryError::SchemeMismatch);
    }

    let always = url.query_pairs().any(|(k, _)| k == "always");

    Ok(OverlayDirectory {
      directory: PathBuf::from(url.path()),
      frame_counter: Arc::new(Mutex::new(0)),
      always,
    })
  }
}

impl OverlayDirectory {
  pub fn new(directory: impl Into<PathBuf>) -> Self {
    Self {
      directory: directory.into(),
      frame_counter: Arc::new(Mutex::new(0)),
      always: false,
    }
  }

  fn frame_id(&self) -> u16 {
    let mut counter = self.frame_counter.lock().unwrap();
    let id = counter.wrapping_add(1);
    *counter = id;
    id
  }

  fn frame_path(&self) -> Result<PathBuf, OverlayDirectoryError> {
    let now = Utc::now();
    let directory = self
      .directory
      .join(now.year().to_string())
      .join(format!("{:02}", now.month()))
      .join(format!("{:02}", now.day()));
    if !directory.exists() {
      std::fs::create_dir_all(&directory)?;
    }

    Ok(directory.join(format!(
      "{}-{:04X}.png",
      now.format("%H-%M-%S"),
      self.frame_id()
    )))
  }

  /// 把一帧与其检测集写入目录。返回写入的文件路径；
  /// 因检测集为空而跳过时返回 None。
  pub fn save(
    &self,
    frame: &RgbImage,
    detections: &[Detection],
  ) -> Result<Option<PathBuf>, OverlayDirectoryError> {
    if !self.always && detections.is_empty() {
      return Ok(None);
    }

    let mut canvas = frame.clone();
    overlay::draw_detections(&mut canvas, detections);

    let path = self.frame_path()?;
    canvas.save(&path)?;
    Ok(Some(path))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn from_url_requires_folder_scheme() {
    let url = url::Url::parse("file:///tmp/overlays").unwrap();
    assert!(matches!(
      OverlayDirectory::from_url(&url),
      Err(OverlayDirectoryError::SchemeMismatch)
    ));
  }

  #[test]
  fn from_url_reads_path_and_always_flag() {
    let url = url::Url::parse("folder:///tmp/overlays?always").unwrap();
    let output = OverlayDirectory::from_url(&url).unwrap();
    assert_eq!(output.directory, PathBuf::from("/tmp/overlays"));
    assert!(output.always);

    let url = url::Url::parse("folder:///tmp/overlays").unwrap();
    let output = OverlayDirectory::from_url(&url).unwrap();
    assert!(!output.always);
  }

  #[test]
  fn empty_set_is_skipped_by_default() {
    let output = OverlayDirectory::new("/nonexistent/should/not/be/created");
    let frame = RgbImage::new(4, 4);
    assert_eq!(output.save(&frame, &[]).unwrap(), None);
  }
}
