// 该文件是 Kotoba （言叶） 项目的一部分。
// src/geometry.rs - 坐标系转换与几何计算
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

/// 渲染视口尺寸（单位：点）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewSize {
  pub width: f32,
  pub height: f32,
}

impl ViewSize {
  pub fn new(width: f32, height: f32) -> Self {
    Self { width, height }
  }
}

/// 归一化边界框，原点位于左下角，各分量均为图像宽高的比例值
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizedRect {
  pub x: f32,
  pub y: f32,
  pub w: f32,
  pub h: f32,
}

/// 屏幕空间矩形，原点位于左上角，单位为视口点
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewRect {
  pub x: f32,
  pub y: f32,
  pub w: f32,
  pub h: f32,
}

impl NormalizedRect {
  pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
    Self { x, y, w, h }
  }

  /// 转换到屏幕空间。两个坐标系的原点角不同，纵轴需要翻转。
  /// 不做越界裁剪：检测器在图像边缘给出的框可能部分或全部落在视口之外。
  pub fn to_view_rect(&self, viewport: ViewSize) -> ViewRect {
    ViewRect {
      x: self.x * viewport.width,
      y: (1.0 - self.y - self.h) * viewport.height,
      w: self.w * viewport.width,
      h: self.h * viewport.height,
    }
  }
}

impl ViewRect {
  pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
    Self { x, y, w, h }
  }

  /// 屏幕空间矩形反向转回归一化边界框
  pub fn to_normalized(&self, viewport: ViewSize) -> NormalizedRect {
    let w = self.w / viewport.width;
    let h = self.h / viewport.height;
    NormalizedRect {
      x: self.x / viewport.width,
      y: 1.0 - self.y / viewport.height - h,
      w,
      h,
    }
  }

  /// 计算两个矩形的交并比（IoU），不相交时为 0
  pub fn iou(&self, other: &ViewRect) -> f32 {
    let x1 = self.x.max(other.x);
    let y1 = self.y.max(other.y);
    let x2 = (self.x + self.w).min(other.x + other.w);
    let y2 = (self.y + self.h).min(other.y + other.h);

    let intersection = (x2 - x1).max(0.0) * (y2 - y1).max(0.0);
    let union = self.w * self.h + other.w * other.h - intersection;

    if union > 0.0 { intersection / union } else { 0.0 }
  }
}

/// 仅有分类结果、没有边界框时使用的居中占位矩形
pub fn placeholder_rect(viewport: ViewSize) -> ViewRect {
  ViewRect {
    x: viewport.width * 0.3,
    y: viewport.height * 0.35,
    w: viewport.width * 0.4,
    h: viewport.height * 0.3,
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  const EPS: f32 = 1e-4;

  fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < EPS
  }

  #[test]
  fn vertical_axis_is_flipped() {
    let viewport = ViewSize::new(400.0, 800.0);
    // 归一化坐标中贴着底边的框，屏幕空间中应当贴着下边缘
    let rect = NormalizedRect::new(0.0, 0.0, 0.5, 0.25).to_view_rect(viewport);
    assert!(approx(rect.x, 0.0));
    assert!(approx(rect.y, 600.0));
    assert!(approx(rect.w, 200.0));
    assert!(approx(rect.h, 200.0));
    assert!(rect.y + rect.h <= viewport.height + EPS);
  }

  #[test]
  fn conversion_round_trips() {
    let viewport = ViewSize::new(390.0, 844.0);
    let original = NormalizedRect::new(0.12, 0.34, 0.4, 0.22);
    let back = original.to_view_rect(viewport).to_normalized(viewport);
    assert!(approx(back.x, original.x));
    assert!(approx(back.y, original.y));
    assert!(approx(back.w, original.w));
    assert!(approx(back.h, original.h));
  }

  #[test]
  fn edge_boxes_may_leave_viewport() {
    let viewport = ViewSize::new(100.0, 100.0);
    // y0 < 0 意味着框超出图像下边缘，转换结果允许超出视口
    let rect = NormalizedRect::new(0.9, -0.1, 0.3, 0.3).to_view_rect(viewport);
    assert!(rect.x + rect.w > viewport.width);
    assert!(rect.y + rect.h > viewport.height);
  }

  #[test]
  fn iou_identical_rects_is_one() {
    let a = ViewRect::new(10.0, 10.0, 50.0, 50.0);
    assert!(approx(a.iou(&a), 1.0));
  }

  #[test]
  fn iou_disjoint_rects_is_zero() {
    let a = ViewRect::new(0.0, 0.0, 10.0, 10.0);
    let b = ViewRect::new(20.0, 20.0, 10.0, 10.0);
    assert!(approx(a.iou(&b), 0.0));
  }

  #[test]
  fn iou_half_overlap() {
    let a = ViewRect::new(0.0, 0.0, 10.0, 10.0);
    let b = ViewRect::new(5.0, 0.0, 10.0, 10.0);
    // 交 50，并 150
    assert!(approx(a.iou(&b), 50.0 / 150.0));
  }

  #[test]
  fn placeholder_is_centered_fraction_of_viewport() {
    let viewport = ViewSize::new(200.0, 400.0);
    let rect = placeholder_rect(viewport);
    assert!(approx(rect.x, 60.0));
    assert!(approx(rect.y, 140.0));
    assert!(approx(rect.w, 80.0));
    assert!(approx(rect.h, 120.0));
  }
}
