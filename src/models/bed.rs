//! BED 风格的坐标区间
//!
//! 每行一个 `chr<1-22|X|Y> <start> <end>`，列之间用空格或制表符分隔

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;

use crate::error::ValidationError;

/// 单个区间行的匹配规则
fn bed_line_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^chr(?:[1-9]|1[0-9]|2[0-2]|X|Y)\s+([0-9]+)\s+([0-9]+)$")
            .expect("BED 行正则表达式无效")
    })
}

/// 一个基因组区间
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoordinateRange {
    /// 染色体名称（chr1-chr22, chrX, chrY）
    pub chromosome: String,
    pub start: u64,
    pub end: u64,
    /// 原始输入行，提交时按原样回传
    line: String,
}

impl CoordinateRange {
    /// 解析单行 BED 文本
    ///
    /// # 参数
    /// - `line`: 去掉换行符（包括 `\r`）的一行文本
    /// - `line_no`: 行号（从 1 开始，仅用于错误信息）
    pub fn parse_line(line: &str, line_no: usize) -> Result<Self, ValidationError> {
        let malformed = || ValidationError::MalformedRange {
            line_no,
            line: line.to_string(),
        };

        // 正则已保证只有数字，解析失败只可能是溢出
        let overflow = || ValidationError::CoordinateOverflow {
            line_no,
            line: line.to_string(),
            max: u64::MAX,
        };

        let caps = bed_line_pattern().captures(line).ok_or_else(malformed)?;
        let start: u64 = caps[1].parse().map_err(|_| overflow())?;
        let end: u64 = caps[2].parse().map_err(|_| overflow())?;

        if start >= end {
            return Err(ValidationError::InvertedRange {
                line_no,
                line: line.to_string(),
            });
        }

        let chromosome = line
            .split_whitespace()
            .next()
            .unwrap_or_default()
            .to_string();

        Ok(Self {
            chromosome,
            start,
            end,
            line: line.to_string(),
        })
    }

    /// 原始输入行
    pub fn line(&self) -> &str {
        &self.line
    }

    /// 按列拆分（染色体、起点、终点），用于浏览器逐格输入
    pub fn cells(&self) -> impl Iterator<Item = &str> {
        self.line.split_whitespace()
    }

    /// 区间长度（bp）
    pub fn len(&self) -> u64 {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Display for CoordinateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}-{}", self.chromosome, self.start, self.end)
    }
}

/// 有序的区间集合，最多保留 `max_count` 条
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CoordinateSet {
    ranges: Vec<CoordinateRange>,
    /// 因超出上限被丢弃的行数
    truncated: usize,
}

impl CoordinateSet {
    /// 解析多行 BED 文本
    ///
    /// 超过 `max_count` 的行被截断（不是错误），遇到第一处格式或区间错误立即失败。
    /// `\n`、`\r\n` 和行尾单独的 `\r` 都视为换行。
    pub fn parse(text: &str, max_count: usize) -> Result<Self, ValidationError> {
        let lines: Vec<&str> = text
            .lines()
            .map(|line| line.strip_suffix('\r').unwrap_or(line))
            .collect();
        let truncated = lines.len().saturating_sub(max_count);

        let ranges = lines
            .iter()
            .take(max_count)
            .enumerate()
            .map(|(idx, line)| CoordinateRange::parse_line(line, idx + 1))
            .collect::<Result<Vec<_>, _>>()?;

        if ranges.is_empty() {
            return Err(ValidationError::MalformedRange {
                line_no: 0,
                line: String::new(),
            });
        }

        Ok(Self { ranges, truncated })
    }

    pub fn ranges(&self) -> &[CoordinateRange] {
        &self.ranges
    }

    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// 被截断的行数
    pub fn truncated(&self) -> usize {
        self.truncated
    }

    /// 规范化文本：保留的原始行以 `\n` 连接
    pub fn to_bed_text(&self) -> String {
        self.ranges
            .iter()
            .map(CoordinateRange::line)
            .collect::<Vec<_>>()
            .join("\n")
    }
}
