use std::fmt;

use serde::{Deserialize, Serialize};

/// Annotation type tracked by the detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorClass {
    /// Highlighter pen (yellow by default).
    Highlight,
    /// Marker pen used for handwritten notes (red by default).
    Mark,
}

impl ColorClass {
    pub fn as_str(self) -> &'static str {
        match self {
            ColorClass::Highlight => "highlight",
            ColorClass::Mark => "mark",
        }
    }
}

impl fmt::Display for ColorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Largest hue on the 8-bit HSV scale (hue is stored as degrees / 2).
pub const HUE_MAX: u8 = 179;

/// HSV の許容範囲。各軸は閉区間 `[lo, hi]`。
///
/// Hue は `lo > hi` のとき 0 をまたいで折り返す（赤は `[170, 10]`）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HsvRange {
    pub hue: [u8; 2],
    pub saturation: [u8; 2],
    pub value: [u8; 2],
}

impl HsvRange {
    /// Returns true iff all three components fall within range.
    pub fn contains(&self, hsv: [u8; 3]) -> bool {
        let [h, s, v] = hsv;
        let [h_lo, h_hi] = self.hue;
        let hue_ok = if h_lo <= h_hi {
            (h_lo..=h_hi).contains(&h)
        } else {
            h >= h_lo || h <= h_hi
        };
        hue_ok
            && (self.saturation[0]..=self.saturation[1]).contains(&s)
            && (self.value[0]..=self.value[1]).contains(&v)
    }

    /// 範囲の妥当性を検証する。
    pub fn validate(&self) -> Result<(), String> {
        if self.hue[0] > HUE_MAX || self.hue[1] > HUE_MAX {
            return Err(format!(
                "hue bounds must be 0-{HUE_MAX}, got [{}, {}]",
                self.hue[0], self.hue[1]
            ));
        }
        if self.saturation[0] > self.saturation[1] {
            return Err(format!(
                "saturation range is inverted: [{}, {}]",
                self.saturation[0], self.saturation[1]
            ));
        }
        if self.value[0] > self.value[1] {
            return Err(format!(
                "value range is inverted: [{}, {}]",
                self.value[0], self.value[1]
            ));
        }
        Ok(())
    }

    pub fn yellow_highlighter() -> Self {
        HsvRange {
            hue: [15, 35],
            saturation: [50, 255],
            value: [50, 255],
        }
    }

    pub fn red_marker() -> Self {
        HsvRange {
            hue: [170, 10],
            saturation: [50, 255],
            value: [50, 255],
        }
    }
}

/// One entry of `color_classes` in settings.yaml.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorClassSettings {
    pub class: ColorClass,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    pub hue: [u8; 2],
    pub saturation: [u8; 2],
    pub value: [u8; 2],
    #[serde(default)]
    pub min_area: Option<u32>,
    #[serde(default)]
    pub proximity_threshold: Option<u32>,
}

fn default_enabled() -> bool {
    true
}

impl ColorClassSettings {
    fn with_range(class: ColorClass, range: HsvRange, min_area: u32) -> Self {
        ColorClassSettings {
            class,
            enabled: true,
            hue: range.hue,
            saturation: range.saturation,
            value: range.value,
            min_area: Some(min_area),
            proximity_threshold: None,
        }
    }

    pub fn range(&self) -> HsvRange {
        HsvRange {
            hue: self.hue,
            saturation: self.saturation,
            value: self.value,
        }
    }

    pub fn default_classes() -> Vec<ColorClassSettings> {
        vec![
            Self::with_range(ColorClass::Highlight, HsvRange::yellow_highlighter(), 500),
            Self::with_range(ColorClass::Mark, HsvRange::red_marker(), 200),
        ]
    }
}

/// Fully resolved per-class parameters, as consumed by the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColorClassConfig {
    pub class: ColorClass,
    pub enabled: bool,
    pub range: HsvRange,
    pub min_area: u32,
    pub proximity_threshold: u32,
}
