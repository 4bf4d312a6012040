// 该文件是 Kotoba （言叶） 项目的一部分。
// src/translate.rs - 标签翻译
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

use std::collections::HashMap;

mod kana;

/// 英日对照词典（COCO 常见类别，键为规范化后的标签）
const DICT: &[(&str, &str)] = &[
  ("person", "人"),
  ("bicycle", "自転車"),
  ("car", "車"),
  ("motorcycle", "オートバイ"),
  ("airplane", "飛行機"),
  ("bus", "バス"),
  ("train", "電車"),
  ("truck", "トラック"),
  ("boat", "ボート"),
  ("traffic light", "信号"),
  ("fire hydrant", "消火栓"),
  ("stop sign", "一時停止標識"),
  ("parking meter", "パーキングメーター"),
  ("bench", "ベンチ"),
  ("bird", "鳥"),
  ("cat", "猫"),
  ("dog", "犬"),
  ("horse", "馬"),
  ("sheep", "羊"),
  ("cow", "牛"),
  ("elephant", "象"),
  ("bear", "熊"),
  ("zebra", "シマウマ"),
  ("giraffe", "キリン"),
  ("backpack", "リュック"),
  ("umbrella", "傘"),
  ("handbag", "ハンドバッグ"),
  ("tie", "ネクタイ"),
  ("suitcase", "スーツケース"),
  ("frisbee", "フリスビー"),
  ("skis", "スキー板"),
  ("snowboard", "スノーボード"),
  ("sports ball", "ボール"),
  ("kite", "凧"),
  ("baseball bat", "バット"),
  ("baseball glove", "グローブ"),
  ("skateboard", "スケートボード"),
  ("surfboard", "サーフボード"),
  ("tennis racket", "テニスラケット"),
  ("bottle", "ボトル"),
  ("wine glass", "ワイングラス"),
  ("cup", "コップ"),
  ("fork", "フォーク"),
  ("knife", "ナイフ"),
  ("spoon", "スプーン"),
  ("bowl", "ボウル"),
  ("banana", "バナナ"),
  ("apple", "りんご"),
  ("sandwich", "サンドイッチ"),
  ("orange", "オレンジ"),
  ("broccoli", "ブロッコリー"),
  ("carrot", "ニンジン"),
  ("hot dog", "ホットドッグ"),
  ("pizza", "ピザ"),
  ("donut", "ドーナツ"),
  ("cake", "ケーキ"),
  ("chair", "椅子"),
  ("couch", "ソファ"),
  ("potted plant", "観葉植物"),
  ("bed", "ベッド"),
  ("dining table", "ダイニングテーブル"),
  ("toilet", "トイレ"),
  ("television", "テレビ"),
  ("laptop", "ノートPC"),
  ("mouse", "マウス"),
  ("remote", "リモコン"),
  ("keyboard", "キーボード"),
  ("cell phone", "スマホ"),
  ("microwave", "電子レンジ"),
  ("oven", "オーブン"),
  ("toaster", "トースター"),
  ("sink", "流し台"),
  ("refrigerator", "冷蔵庫"),
  ("book", "本"),
  ("clock", "時計"),
  ("vase", "花瓶"),
  ("scissors", "はさみ"),
  ("teddy bear", "テディベア"),
  ("hair drier", "ドライヤー"),
  ("toothbrush", "歯ブラシ"),
];

/// 常见别名到规范键的映射（不同数据集、不同模型的命名习惯不一致）
const SYNONYMS: &[(&str, &str)] = &[
  ("tv", "television"),
  ("tvmonitor", "television"),
  ("tv monitor", "television"),
  ("telly", "television"),
  ("smartphone", "cell phone"),
  ("cellphone", "cell phone"),
  ("mobile phone", "cell phone"),
  ("aeroplane", "airplane"),
  ("motorbike", "motorcycle"),
  ("sofa", "couch"),
  ("notebook", "laptop"),
  ("hair dryer", "hair drier"),
  ("doughnut", "donut"),
];

/// 规范化标签：小写，下划线和连字符转为空格，压缩连续空格并去除首尾空格。
/// 对已规范化的输入再次调用结果不变。
pub fn normalize(label: &str) -> String {
  let mut out = String::with_capacity(label.len());
  let mut prev_space = true;
  for c in label.chars() {
    let c = if c == '_' || c == '-' || c.is_whitespace() {
      ' '
    } else {
      c
    };
    if c == ' ' {
      if !prev_space {
        out.push(' ');
        prev_space = true;
      }
    } else {
      out.extend(c.to_lowercase());
      prev_space = false;
    }
  }
  if out.ends_with(' ') {
    out.pop();
  }
  out
}

/// 检测器类别标签到日语标签的翻译器。
///
/// 查询顺序：规范化 → 别名归一 → 词典查询 → 音译回退 → 标记回退。
/// 该函数是纯函数且总是返回非空字符串，不会失败。
pub struct Translator {
  dict: HashMap<&'static str, &'static str>,
  synonyms: HashMap<&'static str, &'static str>,
}

impl Default for Translator {
  fn default() -> Self {
    Self {
      dict: DICT.iter().copied().collect(),
      synonyms: SYNONYMS.iter().copied().collect(),
    }
  }
}

impl Translator {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn translate(&self, label: &str) -> String {
    let key = normalize(label);
    let canonical = self
      .synonyms
      .get(key.as_str())
      .copied()
      .unwrap_or(key.as_str());

    if let Some(ja) = self.dict.get(canonical) {
      return (*ja).to_string();
    }

    // 词典未命中，尝试把拉丁字母拼写音译为片假名
    if let Some(transliterated) = kana::transliterate(canonical) {
      return transliterated;
    }

    // 最终回退：原文套上标记，避免界面把未翻译的标签当作译文显示
    format!("「{label}」")
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn normalize_handles_separators_and_case() {
    assert_eq!(normalize("Cell_Phone"), "cell phone");
    assert_eq!(normalize("  Traffic--Light "), "traffic light");
    assert_eq!(normalize("HOT  DOG"), "hot dog");
  }

  #[test]
  fn normalize_is_idempotent() {
    for raw in ["Cell_Phone", "tv", "  a  b ", "犬", "!!!", ""] {
      let once = normalize(raw);
      assert_eq!(normalize(&once), once);
    }
  }

  #[test]
  fn dictionary_hit() {
    let translator = Translator::new();
    assert_eq!(translator.translate("dog"), "犬");
    assert_eq!(translator.translate("Cell_Phone"), "スマホ");
  }

  #[test]
  fn synonym_resolves_to_canonical() {
    let translator = Translator::new();
    assert_eq!(translator.translate("tv"), "テレビ");
    assert_eq!(translator.translate("TVMonitor"), "テレビ");
    assert_eq!(translator.translate("Aeroplane"), "飛行機");
  }

  #[test]
  fn latin_fallback_is_transliterated() {
    let translator = Translator::new();
    let out = translator.translate("drone");
    assert!(!out.is_empty());
    // 音译结果是片假名，不带回退标记
    assert!(!out.starts_with('「'));
    assert!(out.chars().all(|c| !c.is_ascii_alphabetic()));
  }

  #[test]
  fn non_latin_fallback_is_marked() {
    let translator = Translator::new();
    assert_eq!(translator.translate("猫じゃない"), "「猫じゃない」");
    assert_eq!(translator.translate("!!!"), "「!!!」");
  }

  #[test]
  fn always_returns_non_empty() {
    let translator = Translator::new();
    for raw in ["", " ", "___", "!!!", "ABC", "słoń", "犬"] {
      assert!(!translator.translate(raw).is_empty());
    }
  }
}
