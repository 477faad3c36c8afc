// crates/sg_io/src/segy/textual.rs

//! SEG-Y 文本头 (3200 字节, 40 行 × 80 列)
//!
//! 文本头可能为 EBCDIC (cp037) 或 ASCII 编码，读取时自动识别。
//! 原始字节保持不变写回；改写某一行时使用原编码。

use serde::Serialize;
use std::fmt;

/// 文本头字节数
pub const TEXTUAL_HEADER_LEN: usize = 3200;
/// 卡片行数
pub const CARD_COUNT: usize = 40;
/// 每行字符数
pub const CARD_WIDTH: usize = 80;

/// EBCDIC (cp037) → Latin-1
#[rustfmt::skip]
const EBCDIC_TO_LATIN1: [u8; 256] = [
    0x00, 0x01, 0x02, 0x03, 0x9C, 0x09, 0x86, 0x7F, 0x97, 0x8D, 0x8E, 0x0B, 0x0C, 0x0D, 0x0E, 0x0F,
    0x10, 0x11, 0x12, 0x13, 0x9D, 0x85, 0x08, 0x87, 0x18, 0x19, 0x92, 0x8F, 0x1C, 0x1D, 0x1E, 0x1F,
    0x80, 0x81, 0x82, 0x83, 0x84, 0x0A, 0x17, 0x1B, 0x88, 0x89, 0x8A, 0x8B, 0x8C, 0x05, 0x06, 0x07,
    0x90, 0x91, 0x16, 0x93, 0x94, 0x95, 0x96, 0x04, 0x98, 0x99, 0x9A, 0x9B, 0x14, 0x15, 0x9E, 0x1A,
    0x20, 0xA0, 0xE2, 0xE4, 0xE0, 0xE1, 0xE3, 0xE5, 0xE7, 0xF1, 0xA2, 0x2E, 0x3C, 0x28, 0x2B, 0x7C,
    0x26, 0xE9, 0xEA, 0xEB, 0xE8, 0xED, 0xEE, 0xEF, 0xEC, 0xDF, 0x21, 0x24, 0x2A, 0x29, 0x3B, 0xAC,
    0x2D, 0x2F, 0xC2, 0xC4, 0xC0, 0xC1, 0xC3, 0xC5, 0xC7, 0xD1, 0xA6, 0x2C, 0x25, 0x5F, 0x3E, 0x3F,
    0xF8, 0xC9, 0xCA, 0xCB, 0xC8, 0xCD, 0xCE, 0xCF, 0xCC, 0x60, 0x3A, 0x23, 0x40, 0x27, 0x3D, 0x22,
    0xD8, 0x61, 0x62, 0x63, 0x64, 0x65, 0x66, 0x67, 0x68, 0x69, 0xAB, 0xBB, 0xF0, 0xFD, 0xFE, 0xB1,
    0xB0, 0x6A, 0x6B, 0x6C, 0x6D, 0x6E, 0x6F, 0x70, 0x71, 0x72, 0xAA, 0xBA, 0xE6, 0xB8, 0xC6, 0xA4,
    0xB5, 0x7E, 0x73, 0x74, 0x75, 0x76, 0x77, 0x78, 0x79, 0x7A, 0xA1, 0xBF, 0xD0, 0xDD, 0xDE, 0xAE,
    0x5E, 0xA3, 0xA5, 0xB7, 0xA9, 0xA7, 0xB6, 0xBC, 0xBD, 0xBE, 0x5B, 0x5D, 0xAF, 0xA8, 0xB4, 0xD7,
    0x7B, 0x41, 0x42, 0x43, 0x44, 0x45, 0x46, 0x47, 0x48, 0x49, 0xAD, 0xF4, 0xF6, 0xF2, 0xF3, 0xF5,
    0x7D, 0x4A, 0x4B, 0x4C, 0x4D, 0x4E, 0x4F, 0x50, 0x51, 0x52, 0xB9, 0xFB, 0xFC, 0xF9, 0xFA, 0xFF,
    0x5C, 0xF7, 0x53, 0x54, 0x55, 0x56, 0x57, 0x58, 0x59, 0x5A, 0xB2, 0xD4, 0xD6, 0xD2, 0xD3, 0xD5,
    0x30, 0x31, 0x32, 0x33, 0x34, 0x35, 0x36, 0x37, 0x38, 0x39, 0xB3, 0xDB, 0xDC, 0xD9, 0xDA, 0x9F,
];

/// Latin-1 → EBCDIC (cp037)，由正表求逆
const LATIN1_TO_EBCDIC: [u8; 256] = invert(&EBCDIC_TO_LATIN1);

const fn invert(table: &[u8; 256]) -> [u8; 256] {
    let mut out = [0u8; 256];
    let mut i = 0;
    while i < 256 {
        out[table[i] as usize] = i as u8;
        i += 1;
    }
    out
}

/// EBCDIC 字节转 Latin-1
#[inline]
pub fn ebcdic_to_latin1(b: u8) -> u8 {
    EBCDIC_TO_LATIN1[b as usize]
}

/// Latin-1 字节转 EBCDIC
#[inline]
pub fn latin1_to_ebcdic(b: u8) -> u8 {
    LATIN1_TO_EBCDIC[b as usize]
}

/// 文本头编码
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TextEncoding {
    /// EBCDIC (cp037)
    Ebcdic,
    /// ASCII
    Ascii,
}

impl TextEncoding {
    /// 根据内容识别编码
    ///
    /// 首字节为 `'C'` 视为 ASCII，为 EBCDIC 的 `'C'` (0xC3) 视为 EBCDIC；
    /// 否则统计可打印 ASCII 字符占比。
    pub fn detect(bytes: &[u8]) -> Self {
        match bytes.first() {
            Some(b'C') => return Self::Ascii,
            Some(0xC3) => return Self::Ebcdic,
            _ => {}
        }
        let printable = bytes
            .iter()
            .filter(|&&b| b == b' ' || b.is_ascii_graphic())
            .count();
        if printable * 10 >= bytes.len() * 9 {
            Self::Ascii
        } else {
            Self::Ebcdic
        }
    }
}

/// SEG-Y 文本头
#[derive(Debug, Clone, PartialEq)]
pub struct TextualHeader {
    bytes: Vec<u8>,
    encoding: TextEncoding,
}

impl TextualHeader {
    /// 由原始 3200 字节构建，自动识别编码
    ///
    /// 长度不足时以空格补齐，多余部分截断。
    pub fn from_bytes(raw: &[u8]) -> Self {
        let encoding = TextEncoding::detect(raw);
        let pad = match encoding {
            TextEncoding::Ascii => b' ',
            TextEncoding::Ebcdic => 0x40,
        };
        let mut bytes = raw[..raw.len().min(TEXTUAL_HEADER_LEN)].to_vec();
        bytes.resize(TEXTUAL_HEADER_LEN, pad);
        Self { bytes, encoding }
    }

    /// 由文本行构建（ASCII 编码）
    ///
    /// 每行截断或补齐至 80 列，不足 40 行补空行。
    pub fn from_lines<S: AsRef<str>>(lines: &[S]) -> Self {
        let mut header = Self {
            bytes: vec![b' '; TEXTUAL_HEADER_LEN],
            encoding: TextEncoding::Ascii,
        };
        for (i, line) in lines.iter().take(CARD_COUNT).enumerate() {
            header.set_line(i, line.as_ref());
        }
        header
    }

    /// 标准 C01..C40 卡片头，用于新建文件
    pub fn standard(title: &str) -> Self {
        let mut lines: Vec<String> = (1..=CARD_COUNT).map(|i| format!("C{i:02}")).collect();
        lines[0] = format!("C01 {title}");
        lines[CARD_COUNT - 1] = "C40 END TEXTUAL HEADER".to_string();
        Self::from_lines(&lines)
    }

    /// 原始字节
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// 编码
    pub fn encoding(&self) -> TextEncoding {
        self.encoding
    }

    /// 解码为文本行（去除行尾空白）
    pub fn lines(&self) -> Vec<String> {
        self.bytes
            .chunks(CARD_WIDTH)
            .map(|card| {
                card.iter()
                    .map(|&b| {
                        let c = match self.encoding {
                            TextEncoding::Ascii => b,
                            TextEncoding::Ebcdic => ebcdic_to_latin1(b),
                        };
                        if c == b' ' || c.is_ascii_graphic() || c >= 0xA0 {
                            char::from(c)
                        } else {
                            ' '
                        }
                    })
                    .collect::<String>()
                    .trim_end()
                    .to_string()
            })
            .collect()
    }

    /// 改写第 `index` 行（从 0 开始），使用原编码
    ///
    /// 非 Latin-1 字符写为 `?`；越界行号忽略。
    pub fn set_line(&mut self, index: usize, text: &str) {
        if index >= CARD_COUNT {
            return;
        }
        let card = &mut self.bytes[index * CARD_WIDTH..(index + 1) * CARD_WIDTH];
        let mut chars = text.chars();
        for slot in card.iter_mut() {
            let latin1 = match chars.next() {
                Some(c) if (c as u32) < 0x100 => c as u8,
                Some(_) => b'?',
                None => b' ',
            };
            *slot = match self.encoding {
                TextEncoding::Ascii => latin1,
                TextEncoding::Ebcdic => latin1_to_ebcdic(latin1),
            };
        }
    }
}

impl fmt::Display for TextualHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in self.lines() {
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tables_are_inverse() {
        for b in 0..=255u8 {
            assert_eq!(latin1_to_ebcdic(ebcdic_to_latin1(b)), b);
        }
    }

    #[test]
    fn test_ebcdic_letters_and_digits() {
        assert_eq!(ebcdic_to_latin1(0xC3), b'C');
        assert_eq!(ebcdic_to_latin1(0xF0), b'0');
        assert_eq!(ebcdic_to_latin1(0x40), b' ');
        assert_eq!(ebcdic_to_latin1(0x81), b'a');
        assert_eq!(latin1_to_ebcdic(b'Z'), 0xE9);
    }

    #[test]
    fn test_detect_encoding() {
        let ascii = TextualHeader::standard("LINE PR_19");
        assert_eq!(TextEncoding::detect(ascii.as_bytes()), TextEncoding::Ascii);

        let ebcdic: Vec<u8> = ascii.as_bytes().iter().map(|&b| latin1_to_ebcdic(b)).collect();
        assert_eq!(TextEncoding::detect(&ebcdic), TextEncoding::Ebcdic);
    }

    #[test]
    fn test_ebcdic_lines_decoded() {
        let ascii = TextualHeader::standard("LINE PR_19");
        let ebcdic: Vec<u8> = ascii.as_bytes().iter().map(|&b| latin1_to_ebcdic(b)).collect();
        let header = TextualHeader::from_bytes(&ebcdic);
        assert_eq!(header.encoding(), TextEncoding::Ebcdic);
        assert_eq!(header.lines()[0], "C01 LINE PR_19");
        assert_eq!(header.lines()[39], "C40 END TEXTUAL HEADER");
    }

    #[test]
    fn test_set_line_keeps_encoding() {
        let ascii = TextualHeader::standard("X");
        let ebcdic: Vec<u8> = ascii.as_bytes().iter().map(|&b| latin1_to_ebcdic(b)).collect();
        let mut header = TextualHeader::from_bytes(&ebcdic);
        header.set_line(38, "C39 COORDINATES FROM profiles.shp");
        assert_eq!(header.lines()[38], "C39 COORDINATES FROM profiles.shp");
        assert_eq!(header.as_bytes()[38 * 80], 0xC3);
        assert_eq!(header.as_bytes().len(), TEXTUAL_HEADER_LEN);
    }

    #[test]
    fn test_from_bytes_pads_short_input() {
        let header = TextualHeader::from_bytes(b"C01 SHORT");
        assert_eq!(header.as_bytes().len(), TEXTUAL_HEADER_LEN);
        assert_eq!(header.lines().len(), CARD_COUNT);
    }
}
