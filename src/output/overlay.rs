// 该文件是 Kotoba （言叶） 项目的一部分。
// src/output/overlay.rs - 检测集叠加绘制
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

use image::{Rgb, RgbImage};
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::rect::Rect;

use crate::pipeline::Detection;

const BOX_COLOR: [u8; 3] = [255, 255, 255];
const STRIP_COLOR: [u8; 3] = [24, 24, 24];
const STRIP_HEIGHT: i32 = 18;
const BORDER_THICKNESS: i32 = 2;

/// 把整组检测画到图像上：白色边框加框顶的深色标签条。
/// 检测矩形以视口点为单位，调用方负责让图像尺寸与视口一致。
pub fn draw_detections(image: &mut RgbImage, detections: &[Detection]) {
  for detection in detections {
    draw_box(image, detection);
  }
}

fn draw_box(image: &mut RgbImage, detection: &Detection) {
  let (w, h) = (image.width() as i32, image.height() as i32);

  let mut x_min = detection.rect.x.floor() as i32;
  let mut y_min = detection.rect.y.floor() as i32;
  let mut x_max = (detection.rect.x + detection.rect.w).ceil() as i32;
  let mut y_max = (detection.rect.y + detection.rect.h).ceil() as i32;

  // Clamp to image bounds
  x_min = x_min.clamp(0, w - 1);
  y_min = y_min.clamp(0, h - 1);
  x_max = x_max.clamp(0, w - 1);
  y_max = y_max.clamp(0, h - 1);

  if x_min >= x_max || y_min >= y_max {
    return;
  }

  // 边框加粗为 2 像素
  for thickness in 0..BORDER_THICKNESS {
    let x_min_t = (x_min + thickness).min(w - 1);
    let y_min_t = (y_min + thickness).min(h - 1);
    let x_max_t = (x_max - thickness).max(0);
    let y_max_t = (y_max - thickness).max(0);

    for x in x_min_t..=x_max_t {
      *image.get_pixel_mut(x as u32, y_min_t as u32) = Rgb(BOX_COLOR);
      *image.get_pixel_mut(x as u32, y_max_t as u32) = Rgb(BOX_COLOR);
    }
    for y in y_min_t..=y_max_t {
      *image.get_pixel_mut(x_min_t as u32, y as u32) = Rgb(BOX_COLOR);
      *image.get_pixel_mut(x_max_t as u32, y as u32) = Rgb(BOX_COLOR);
    }
  }

  // 框顶的标签条，放不下时贴着框内侧
  let strip_y = (y_min - STRIP_HEIGHT).max(0);
  let strip_w = (x_max - x_min).max(1) as u32;
  draw_filled_rect_mut(
    image,
    Rect::at(x_min, strip_y).of_size(strip_w, STRIP_HEIGHT as u32),
    Rgb(STRIP_COLOR),
  );
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::geometry::ViewRect;

  fn det(rect: ViewRect) -> Detection {
    Detection {
      label: "dog".to_string(),
      translated: "犬".to_string(),
      rect,
      confidence: 0.9,
      normalized: None,
    }
  }

  #[test]
  fn draws_border_pixels() {
    let mut image = RgbImage::from_pixel(100, 100, Rgb([0, 0, 0]));
    draw_detections(&mut image, &[det(ViewRect::new(30.0, 40.0, 20.0, 20.0))]);

    assert_eq!(*image.get_pixel(30, 40), Rgb(BOX_COLOR));
    assert_eq!(*image.get_pixel(50, 60), Rgb(BOX_COLOR));
    // 框外像素不受影响
    assert_eq!(*image.get_pixel(80, 80), Rgb([0, 0, 0]));
  }

  #[test]
  fn out_of_bounds_rect_is_clamped_not_panicking() {
    let mut image = RgbImage::from_pixel(50, 50, Rgb([0, 0, 0]));
    draw_detections(&mut image, &[det(ViewRect::new(-10.0, -10.0, 100.0, 100.0))]);
    draw_detections(&mut image, &[det(ViewRect::new(200.0, 200.0, 10.0, 10.0))]);
  }

  #[test]
  fn degenerate_rect_is_skipped() {
    let mut image = RgbImage::from_pixel(50, 50, Rgb([7, 7, 7]));
    draw_detections(&mut image, &[det(ViewRect::new(10.0, 10.0, 0.0, 0.0))]);
    assert_eq!(*image.get_pixel(10, 10), Rgb([7, 7, 7]));
  }
}
