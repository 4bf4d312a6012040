// 该文件是 Kotoba （言叶） 项目的一部分。
// src/pipeline.rs - 帧处理管线
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

use std::sync::mpsc::{Receiver, Sender, channel};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::detector::{Detector, Orientation, RawInference};
use crate::geometry::{NormalizedRect, ViewRect, ViewSize, placeholder_rect};
use crate::output::Publish;
use crate::reduce::{DEFAULT_IOU_THRESHOLD, reduce_overlaps};
use crate::translate::Translator;

/// 默认的最小帧间隔（秒），约 8 帧每秒
pub const DEFAULT_MIN_INTERVAL_SECS: f64 = 0.12;

/// 默认的门闩滞留回收时限
pub const DEFAULT_STALE_AFTER: Duration = Duration::from_secs(5);

/// 单帧中的一个识别结果。管线在推理完成后构造，此后不可变；
/// 不跨帧跟踪，每次发布整体替换上一组。
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
  /// 检测器输出的源语言标签
  pub label: String,
  /// 翻译后的标签
  pub translated: String,
  /// 屏幕空间矩形
  pub rect: ViewRect,
  /// 置信度，区间 [0,1]
  pub confidence: f32,
  /// 原始归一化边界框，留给裁剪等后续处理；分类回退结果没有
  pub normalized: Option<NormalizedRect>,
}

/// 帧提交的准入结果。拒绝是预期行为而非错误，静默丢弃。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
  Accepted,
  /// 距上一接收帧的间隔不足
  Throttled,
  /// 上一帧的推理尚未完成
  Busy,
}

impl Admission {
  pub fn is_accepted(&self) -> bool {
    matches!(self, Admission::Accepted)
  }
}

#[derive(Debug, Clone, Copy)]
pub struct PipelineConfig {
  /// 两次接收帧之间的最小时间间隔（秒）
  pub min_interval_secs: f64,
  /// 同类重叠抑制的 IoU 阈值
  pub iou_threshold: f32,
  /// 门闩滞留超过该时限后在下一次准入检查时强制回收；
  /// None 表示从不回收（原始行为，推理卡死会永久堵塞管线）
  pub stale_after: Option<Duration>,
  /// 传给推理协作方的图像方向提示
  pub orientation: Orientation,
}

impl Default for PipelineConfig {
  fn default() -> Self {
    Self {
      min_interval_secs: DEFAULT_MIN_INTERVAL_SECS,
      iou_threshold: DEFAULT_IOU_THRESHOLD,
      stale_after: Some(DEFAULT_STALE_AFTER),
      orientation: Orientation::default(),
    }
  }
}

impl PipelineConfig {
  pub fn with_min_interval_secs(mut self, secs: f64) -> Self {
    self.min_interval_secs = secs;
    self
  }

  pub fn with_iou_threshold(mut self, threshold: f32) -> Self {
    self.iou_threshold = threshold;
    self
  }

  pub fn with_stale_after(mut self, stale_after: Option<Duration>) -> Self {
    self.stale_after = stale_after;
    self
  }

  pub fn with_orientation(mut self, orientation: Orientation) -> Self {
    self.orientation = orientation;
    self
  }
}

/// 并发门闩：{空闲, 在途} 两态状态机。
/// 空闲→在途 仅发生在准入成功时；在途→空闲 在完成路径上无条件发生。
/// 占用时发放票据，迟到的完成（票据过期）不会改变状态。
struct Gate {
  state: Mutex<GateState>,
}

#[derive(Debug, Clone, Copy)]
enum GateState {
  Idle { epoch: u64 },
  Inflight { epoch: u64, since: Instant },
}

impl Gate {
  fn new() -> Self {
    Self {
      state: Mutex::new(GateState::Idle { epoch: 0 }),
    }
  }

  /// 尝试占用门闩，成功时返回本次在途的票据。
  /// 在途状态滞留超过 stale_after 时强制回收并重新占用。
  fn try_acquire(&self, stale_after: Option<Duration>) -> Option<u64> {
    let mut state = self.state.lock().unwrap();
    match *state {
      GateState::Idle { epoch } => {
        let ticket = epoch + 1;
        *state = GateState::Inflight {
          epoch: ticket,
          since: Instant::now(),
        };
        Some(ticket)
      }
      GateState::Inflight { epoch, since } => {
        let limit = stale_after?;
        if since.elapsed() < limit {
          return None;
        }
        warn!("门闩滞留超过 {:?}，强制回收", limit);
        let ticket = epoch + 1;
        *state = GateState::Inflight {
          epoch: ticket,
          since: Instant::now(),
        };
        Some(ticket)
      }
    }
  }

  /// 凭票据释放。票据仍然有效时转为空闲并返回 true；
  /// 票据已因滞留回收而过期时不改变状态，返回 false。
  fn release(&self, ticket: u64) -> bool {
    let mut state = self.state.lock().unwrap();
    match *state {
      GateState::Inflight { epoch, .. } if epoch == ticket => {
        *state = GateState::Idle { epoch };
        true
      }
      _ => false,
    }
  }
}

struct Job<F> {
  frame: F,
  viewport: ViewSize,
  ticket: u64,
}

/// 帧处理管线。
///
/// 提交方（通常是取景回调）以单调递增的时间戳高频调用 [`submit`]；
/// 管线按固定节奏放行，把接收的帧交给专用工作线程做推理与变换，
/// 最终通过 [`Publish`] 边界整体发布检测集。同一时刻至多一个推理在途，
/// 发布顺序即提交顺序。被拒绝的帧永久丢弃，没有排队与背压。
///
/// [`submit`]: FramePipeline::submit
pub struct FramePipeline<F> {
  config: PipelineConfig,
  gate: Arc<Gate>,
  last_accepted: Mutex<Option<f64>>,
  job_tx: Option<Sender<Job<F>>>,
  worker: Option<JoinHandle<()>>,
}

impl<F: Send + 'static> FramePipeline<F> {
  pub fn new<D, P>(detector: D, publisher: P, config: PipelineConfig) -> Self
  where
    D: Detector<F> + 'static,
    P: Publish + 'static,
  {
    let gate = Arc::new(Gate::new());
    let (job_tx, job_rx) = channel();

    let worker = {
      let gate = gate.clone();
      let translator = Translator::new();
      std::thread::spawn(move || {
        worker_loop(job_rx, detector, publisher, translator, gate, config);
      })
    };

    Self {
      config,
      gate,
      last_accepted: Mutex::new(None),
      job_tx: Some(job_tx),
      worker: Some(worker),
    }
  }

  /// 提交一帧。不阻塞调用方：接收的帧交给工作线程异步处理，
  /// 节流窗口内或推理在途时的帧直接丢弃。
  pub fn submit(&self, timestamp: f64, frame: F, viewport: ViewSize) -> Admission {
    let mut last = self.last_accepted.lock().unwrap();

    if let Some(prev) = *last {
      if timestamp - prev < self.config.min_interval_secs {
        debug!("帧落在节流窗口内，丢弃");
        return Admission::Throttled;
      }
    }

    let Some(ticket) = self.gate.try_acquire(self.config.stale_after) else {
      debug!("推理在途，丢弃当前帧");
      return Admission::Busy;
    };

    *last = Some(timestamp);

    let job = Job {
      frame,
      viewport,
      ticket,
    };
    let sent = self
      .job_tx
      .as_ref()
      .map(|tx| tx.send(job).is_ok())
      .unwrap_or(false);
    if !sent {
      // 连派发都失败时同样必须释放门闩
      self.gate.release(ticket);
      warn!("工作线程不可用，帧被丢弃");
      return Admission::Busy;
    }

    Admission::Accepted
  }
}

impl<F> Drop for FramePipeline<F> {
  fn drop(&mut self) {
    // 关闭任务通道，工作线程处理完剩余任务后退出
    self.job_tx.take();
    if let Some(worker) = self.worker.take() {
      let _ = worker.join();
    }
  }
}

fn worker_loop<F, D, P>(
  job_rx: Receiver<Job<F>>,
  detector: D,
  publisher: P,
  translator: Translator,
  gate: Arc<Gate>,
  config: PipelineConfig,
) where
  D: Detector<F>,
  P: Publish,
{
  while let Ok(job) = job_rx.recv() {
    let outcome = detector.detect(&job.frame, config.orientation);

    // 完成路径：无论成败先释放门闩
    if !gate.release(job.ticket) {
      debug!("滞留回收后的迟到结果，丢弃不发布");
      continue;
    }

    let detections = match outcome {
      Ok(raw) => assemble(raw, job.viewport, &translator, config.iou_threshold),
      Err(err) => {
        warn!("推理失败，发布空检测集: {err}");
        Vec::new()
      }
    };

    publisher.publish(detections);
  }
}

/// 把推理原始输出变换为屏幕空间的检测集：
/// 坐标转换 → 标签翻译 → 同类重叠抑制。
/// 仅有分类结果时给出一个居中占位框，不参与抑制。
fn assemble(
  raw: RawInference,
  viewport: ViewSize,
  translator: &Translator,
  iou_threshold: f32,
) -> Vec<Detection> {
  match raw {
    RawInference::Objects(objects) => {
      let candidates = objects
        .into_iter()
        .map(|object| Detection {
          translated: translator.translate(&object.label),
          rect: object.bbox.to_view_rect(viewport),
          normalized: Some(object.bbox),
          label: object.label,
          confidence: object.confidence,
        })
        .collect();
      reduce_overlaps(candidates, iou_threshold)
    }
    RawInference::Classification { label, confidence } => {
      vec![Detection {
        translated: translator.translate(&label),
        rect: placeholder_rect(viewport),
        normalized: None,
        label,
        confidence,
      }]
    }
  }
}
