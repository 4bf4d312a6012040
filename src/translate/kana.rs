// 该文件是 Kotoba （言叶） 项目的一部分。
// src/translate/kana.rs - 拉丁字母到片假名的音译
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

/// 把已规范化的拉丁字母标签按罗马字读法尽力音译为片假名。
/// 输入含有拉丁小写字母和空格以外的字符时放弃，返回 None。
pub(crate) fn transliterate(normalized: &str) -> Option<String> {
  if normalized.is_empty() {
    return None;
  }
  if !normalized
    .chars()
    .all(|c| c.is_ascii_lowercase() || c == ' ')
  {
    return None;
  }

  let words: Vec<String> = normalized.split(' ').map(word_to_kana).collect();
  Some(words.join("・"))
}

fn vowel_index(c: char) -> Option<usize> {
  "aiueo".find(c)
}

fn word_to_kana(word: &str) -> String {
  let chars: Vec<char> = word.chars().collect();
  let mut out = String::new();
  let mut i = 0;

  while i < chars.len() {
    if let Some(v) = vowel_index(chars[i]) {
      out.push_str(syllable("", v));
      i += 1;
      continue;
    }

    // 双写辅音记作促音
    if chars.get(i + 1) == Some(&chars[i]) {
      out.push_str("ッ");
      i += 1;
      continue;
    }

    let (cons, len) = match (chars[i], chars.get(i + 1).copied()) {
      ('s', Some('h')) => ("sh", 2),
      ('c', Some('h')) => ("ch", 2),
      ('t', Some('s')) => ("ts", 2),
      ('t', Some('h')) => ("th", 2),
      ('p', Some('h')) => ("ph", 2),
      ('w', Some('h')) => ("wh", 2),
      (c, _) => (consonant(c), 1),
    };

    match chars.get(i + len).copied().and_then(vowel_index) {
      Some(v) => {
        out.push_str(syllable(cons, v));
        i += len + 1;
      }
      None => {
        // 后面没有元音：n 记作拨音，其余辅音补 u 段假名
        if cons == "n" {
          out.push_str("ン");
        } else {
          out.push_str(syllable(cons, 2));
        }
        i += len;
      }
    }
  }

  out
}

fn consonant(c: char) -> &'static str {
  match c {
    'b' => "b",
    'c' => "c",
    'd' => "d",
    'f' => "f",
    'g' => "g",
    'h' => "h",
    'j' => "j",
    'k' => "k",
    'l' => "l",
    'm' => "m",
    'n' => "n",
    'p' => "p",
    'q' => "q",
    'r' => "r",
    's' => "s",
    't' => "t",
    'v' => "v",
    'w' => "w",
    'x' => "x",
    'y' => "y",
    'z' => "z",
    _ => "",
  }
}

fn syllable(cons: &str, v: usize) -> &'static str {
  let row: [&'static str; 5] = match cons {
    "" => ["ア", "イ", "ウ", "エ", "オ"],
    "k" | "q" => ["カ", "キ", "ク", "ケ", "コ"],
    "g" => ["ガ", "ギ", "グ", "ゲ", "ゴ"],
    "s" => ["サ", "シ", "ス", "セ", "ソ"],
    "z" => ["ザ", "ジ", "ズ", "ゼ", "ゾ"],
    "t" => ["タ", "チ", "ツ", "テ", "ト"],
    "d" => ["ダ", "ヂ", "ヅ", "デ", "ド"],
    "n" => ["ナ", "ニ", "ヌ", "ネ", "ノ"],
    "h" => ["ハ", "ヒ", "フ", "ヘ", "ホ"],
    "b" => ["バ", "ビ", "ブ", "ベ", "ボ"],
    "p" => ["パ", "ピ", "プ", "ペ", "ポ"],
    "f" | "ph" => ["ファ", "フィ", "フ", "フェ", "フォ"],
    "m" => ["マ", "ミ", "ム", "メ", "モ"],
    "y" => ["ヤ", "イ", "ユ", "イェ", "ヨ"],
    "r" | "l" => ["ラ", "リ", "ル", "レ", "ロ"],
    "w" | "wh" => ["ワ", "ウィ", "ウ", "ウェ", "ヲ"],
    "v" => ["ヴァ", "ヴィ", "ヴ", "ヴェ", "ヴォ"],
    "j" => ["ジャ", "ジ", "ジュ", "ジェ", "ジョ"],
    "c" => ["カ", "シ", "ク", "セ", "コ"],
    "x" => ["クサ", "クシ", "クス", "クセ", "クソ"],
    "sh" => ["シャ", "シ", "シュ", "シェ", "ショ"],
    "ch" => ["チャ", "チ", "チュ", "チェ", "チョ"],
    "ts" => ["ツァ", "ツィ", "ツ", "ツェ", "ツォ"],
    "th" => ["サ", "シ", "ス", "セ", "ソ"],
    _ => ["ア", "イ", "ウ", "エ", "オ"],
  };
  row[v]
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn rejects_non_latin_input() {
    assert_eq!(transliterate("猫"), None);
    assert_eq!(transliterate("so-so"), None);
    assert_eq!(transliterate(""), None);
  }

  #[test]
  fn vowels_and_simple_syllables() {
    assert_eq!(transliterate("kana").as_deref(), Some("カナ"));
    assert_eq!(transliterate("sushi").as_deref(), Some("スシ"));
    assert_eq!(transliterate("ai").as_deref(), Some("アイ"));
  }

  #[test]
  fn trailing_consonant_gets_u_column() {
    assert_eq!(transliterate("robot").as_deref(), Some("ロボツ"));
  }

  #[test]
  fn trailing_n_becomes_syllabic_n() {
    assert_eq!(transliterate("pan").as_deref(), Some("パン"));
  }

  #[test]
  fn d_row_columns_are_distinct() {
    assert_eq!(transliterate("du").as_deref(), Some("ヅ"));
    assert_eq!(transliterate("do").as_deref(), Some("ド"));
  }

  #[test]
  fn digraphs_are_single_units() {
    assert_eq!(transliterate("cha").as_deref(), Some("チャ"));
    assert_eq!(transliterate("shoe").as_deref(), Some("ショエ"));
  }

  #[test]
  fn words_are_joined_with_interpunct() {
    assert_eq!(transliterate("hot dog").as_deref(), Some("ホツ・ドグ"));
  }

  #[test]
  fn always_some_for_latin_words() {
    for word in ["drone", "gizmo", "widget", "xylophone", "apple"] {
      let out = transliterate(word).unwrap();
      assert!(!out.is_empty());
    }
  }
}
