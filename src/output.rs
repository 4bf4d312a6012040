// 该文件是 Kotoba （言叶） 项目的一部分。
// src/output.rs - 检测集发布与观察
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

use std::sync::{Arc, Mutex};

use crate::pipeline::Detection;

pub mod overlay;

mod overlay_directory;
pub use self::overlay_directory::{OverlayDirectory, OverlayDirectoryError};

/// 检测集的发布边界。管线是唯一的写入方，
/// 每次发布整体替换上一帧的检测集，不做增量更新。
pub trait Publish: Send + Sync {
  fn publish(&self, detections: Vec<Detection>);
}

impl<P: Publish + ?Sized> Publish for Arc<P> {
  fn publish(&self, detections: Vec<Detection>) {
    (**self).publish(detections);
  }
}

type Subscriber = Box<dyn Fn(&[Detection]) + Send>;

/// 当前检测集的持有者。渲染方可以随时取快照，
/// 也可以注册回调，在每次发布后收到新的整组检测。
#[derive(Default)]
pub struct DetectionBoard {
  current: Mutex<Arc<Vec<Detection>>>,
  subscribers: Mutex<Vec<Subscriber>>,
}

impl DetectionBoard {
  pub fn new() -> Self {
    Self::default()
  }

  /// 最近一次发布的检测集
  pub fn snapshot(&self) -> Arc<Vec<Detection>> {
    self.current.lock().unwrap().clone()
  }

  pub fn subscribe(&self, callback: impl Fn(&[Detection]) + Send + 'static) {
    self.subscribers.lock().unwrap().push(Box::new(callback));
  }
}

impl Publish for DetectionBoard {
  fn publish(&self, detections: Vec<Detection>) {
    let set = Arc::new(detections);
    *self.current.lock().unwrap() = set.clone();

    // 回调在锁外调用，回调里允许再订阅甚至再发布
    let taken = std::mem::take(&mut *self.subscribers.lock().unwrap());
    for subscriber in taken.iter() {
      subscriber(&set);
    }
    let mut subscribers = self.subscribers.lock().unwrap();
    let added_in_callbacks = std::mem::replace(&mut *subscribers, taken);
    subscribers.extend(added_in_callbacks);
  }
}
