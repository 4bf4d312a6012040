// 该文件是 Kotoba （言叶） 项目的一部分。
// src/bin/simple_liveshot.rs - 模拟取景的演示程序
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
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use clap::Parser;
use image::RgbImage;
use tracing::{info, warn};
use url::Url;

use kotoba::FromUrl;
use kotoba::detector::{RawInference, RawObject, ScriptedDetector};
use kotoba::geometry::{NormalizedRect, ViewSize};
use kotoba::output::{DetectionBoard, OverlayDirectory};
use kotoba::pipeline::{FramePipeline, PipelineConfig};
use kotoba::vocab::{self, VocabStore};

const FRAME_WIDTH: u32 = 640;
const FRAME_HEIGHT: u32 = 480;

/// Kotoba 演示程序：合成取景帧驱动检测管线
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
  /// 叠加帧输出目录，形如 folder:///tmp/kotoba?always
  #[arg(long, value_name = "OUTPUT")]
  pub output: Option<Url>,

  /// 生词本 JSON 文件路径，发布的检测会记入其中
  #[arg(long, value_name = "FILE")]
  pub vocab: Option<PathBuf>,

  /// 模拟取景的帧率
  #[arg(long, default_value = "30", value_name = "FPS")]
  pub fps: u32,

  /// 处理的帧数上限（0 表示不限）
  #[arg(long, default_value = "120", value_name = "COUNT")]
  pub frame_number: u64,

  /// 两次接收帧之间的最小间隔（秒）
  #[arg(long, default_value = "0.12", value_name = "SECS")]
  pub min_interval: f64,
}

/// 预设的推理脚本，循环播放几种典型结果形态
fn demo_script() -> Vec<RawInference> {
  vec![
    RawInference::Objects(vec![
      RawObject {
        label: "dog".into(),
        confidence: 0.92,
        bbox: NormalizedRect::new(0.1, 0.2, 0.45, 0.5),
      },
      RawObject {
        label: "dog".into(),
        confidence: 0.81,
        bbox: NormalizedRect::new(0.12, 0.22, 0.45, 0.45),
      },
    ]),
    RawInference::Objects(vec![
      RawObject {
        label: "cup".into(),
        confidence: 0.7,
        bbox: NormalizedRect::new(0.6, 0.1, 0.2, 0.2),
      },
      RawObject {
        label: "tv".into(),
        confidence: 0.64,
        bbox: NormalizedRect::new(0.05, 0.55, 0.5, 0.4),
      },
    ]),
    RawInference::Classification {
      label: "banana".into(),
      confidence: 0.75,
    },
    RawInference::Objects(Vec::new()),
  ]
}

fn synth_frame(index: u64) -> RgbImage {
  let shade = (index % 255) as u8;
  RgbImage::from_fn(FRAME_WIDTH, FRAME_HEIGHT, |x, y| {
    image::Rgb([(x % 256) as u8, (y % 256) as u8, shade])
  })
}

fn main() -> Result<()> {
  tracing_subscriber::fmt::init();

  let args = Args::parse();

  let overlay_output = args
    .output
    .as_ref()
    .map(|url| OverlayDirectory::from_url(url))
    .transpose()?;
  let vocab_store = args.vocab.as_ref().map(VocabStore::new);

  let board = Arc::new(DetectionBoard::new());
  board.subscribe(|set| {
    for detection in set {
      info!(
        "检测: {} / {} ({:.0}%)",
        detection.label,
        detection.translated,
        detection.confidence * 100.0
      );
    }
  });

  let config = PipelineConfig::default().with_min_interval_secs(args.min_interval);
  let pipeline = FramePipeline::new(ScriptedDetector::new(demo_script()), board.clone(), config);

  let (stop_tx, stop_rx) = std::sync::mpsc::channel();
  ctrlc::set_handler(move || {
    let _ = stop_tx.send(());
  })?;

  let mut vocab_items = vocab_store.as_ref().map(|store| store.load());
  let interval = Duration::from_secs_f64(1.0 / args.fps.max(1) as f64);
  let started = Instant::now();
  let viewport = ViewSize::new(FRAME_WIDTH as f32, FRAME_HEIGHT as f32);

  info!("开始模拟取景: {} fps", args.fps);
  let mut frame_index = 0u64;
  let mut accepted = 0u64;
  let mut last_set = board.snapshot();
  loop {
    frame_index += 1;
    let frame = synth_frame(frame_index);
    let timestamp = started.elapsed().as_secs_f64();

    if pipeline
      .submit(timestamp, frame.clone(), viewport)
      .is_accepted()
    {
      accepted += 1;
    }

    // 只在检测集发生了新的发布时落盘与记词
    let published = board.snapshot();
    if !Arc::ptr_eq(&published, &last_set) {
      if let Some(output) = overlay_output.as_ref() {
        if let Err(err) = output.save(&frame, &published) {
          warn!("叠加帧保存失败: {err}");
        }
      }
      if let Some(items) = vocab_items.as_mut() {
        for detection in published.iter() {
          vocab::record(items, detection);
        }
      }
      last_set = published;
    }

    if args.frame_number > 0 && frame_index >= args.frame_number {
      info!("达到指定帧数 {}, 退出取景循环", frame_index);
      break;
    }
    if stop_rx.try_recv().is_ok() {
      warn!("中断信号接收，退出取景循环");
      break;
    }

    std::thread::sleep(interval);
  }

  if let (Some(store), Some(items)) = (vocab_store.as_ref(), vocab_items.as_ref()) {
    store.save(items)?;
    info!("生词本已保存: {} 个条目", items.len());
  }

  info!("取景 {} 帧，接收 {} 帧，任务完成", frame_index, accepted);
  Ok(())
}
