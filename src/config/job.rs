use serde::{Deserialize, Serialize};

use super::color::ColorClass;

#[derive(Debug, Clone, Deserialize)]
pub struct JobFile {
    pub jobs: Vec<Job>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Job {
    /// PDF file or directory of page images.
    pub input: String,
    /// Output root; artifacts land in `<output>/<document_name>/`.
    pub output: String,
    #[serde(default, deserialize_with = "deserialize_pages")]
    pub pages: Option<Vec<u32>>,
    pub dpi: Option<u32>,
    pub min_area: Option<u32>,
    pub proximity_threshold: Option<u32>,
    pub padding: Option<u32>,
    pub max_dimension: Option<u32>,
    pub quality: Option<u8>,
    pub format: Option<ArtifactFormat>,
    pub pdf_annotations: Option<bool>,
    /// Restricts the enabled color classes for this job.
    pub classes: Option<Vec<ColorClass>>,
}

/// Encoding of extract artifacts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactFormat {
    #[default]
    Png,
    #[serde(alias = "jpg")]
    Jpeg,
}

impl ArtifactFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ArtifactFormat::Png => "png",
            ArtifactFormat::Jpeg => "jpg",
        }
    }
}

/// Largest page number a job may name. Ranges are expanded at parse time.
pub const MAX_PAGE_NUMBER: u32 = 100_000;

/// ページ範囲文字列をパースしてページ番号のベクタに変換する。
///
/// 形式:
/// - 単一ページ: `"5"`
/// - 範囲: `"5-10"` (5, 6, 7, 8, 9, 10)
/// - 混合（カンマ区切り）: `"1, 3, 5-10, 15"`
///
/// 結果はソート済み・重複なし。ページ番号は1始まりで、[`MAX_PAGE_NUMBER`] 以下。
pub fn parse_page_range(s: &str) -> crate::error::Result<Vec<u32>> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Err(crate::error::ExtractError::config(
            "Page range cannot be empty",
        ));
    }

    let mut pages = Vec::new();

    for part in trimmed.split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }

        if let Some((start_str, end_str)) = part.split_once('-') {
            let start = parse_page_number(start_str)?;
            let end = parse_page_number(end_str)?;

            if start > end {
                return Err(crate::error::ExtractError::config(format!(
                    "Invalid page range: start ({start}) > end ({end})"
                )));
            }

            pages.extend(start..=end);
        } else {
            pages.push(parse_page_number(part)?);
        }
    }

    if pages.is_empty() {
        return Err(crate::error::ExtractError::config(
            "Page range resolved to empty set",
        ));
    }

    pages.sort();
    pages.dedup();
    Ok(pages)
}

fn parse_page_number(s: &str) -> crate::error::Result<u32> {
    let page: u32 = s.trim().parse().map_err(|_| {
        crate::error::ExtractError::config(format!("Invalid page number: '{}'", s.trim()))
    })?;
    if page == 0 {
        return Err(crate::error::ExtractError::config(
            "Page numbers start at 1",
        ));
    }
    if page > MAX_PAGE_NUMBER {
        return Err(crate::error::ExtractError::config(format!(
            "Page number {page} exceeds the limit of {MAX_PAGE_NUMBER}"
        )));
    }
    Ok(page)
}

/// serdeのdeserialize_withで使用するページ範囲デシリアライザ
fn deserialize_pages<'de, D>(deserializer: D) -> Result<Option<Vec<u32>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = Option::<String>::deserialize(deserializer)?;
    s.map(|s| parse_page_range(&s).map_err(serde::de::Error::custom))
        .transpose()
}
