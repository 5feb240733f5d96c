// SHA-256 fingerprint of the extraction parameters
//
// Two extraction records with the same fingerprint were produced with the
// same detection, grouping and rendering parameters.

use std::collections::BTreeMap;

use sha2::{Digest, Sha256};

use crate::config::merged::ExtractionConfig;

/// 設定を正規化JSON形式に変換する（キーはアルファベット順で固定）。
///
/// `parallel_workers` は結果に影響しないため含めない。
fn config_to_canonical_json(config: &ExtractionConfig) -> String {
    let mut map = BTreeMap::new();
    map.insert("dpi", serde_json::json!(config.dpi));
    map.insert("format", serde_json::json!(config.format.extension()));
    map.insert("max_dimension", serde_json::json!(config.max_dimension));
    map.insert("padding", serde_json::json!(config.padding));
    map.insert("pdf_annotations", serde_json::json!(config.pdf_annotations));
    map.insert("quality", serde_json::json!(config.quality));

    let classes: Vec<serde_json::Value> = config
        .color_classes
        .iter()
        .filter(|c| c.enabled)
        .map(|c| {
            serde_json::json!({
                "class": c.class.as_str(),
                "hue": c.range.hue,
                "min_area": c.min_area,
                "proximity_threshold": c.proximity_threshold,
                "saturation": c.range.saturation,
                "value": c.range.value,
            })
        })
        .collect();
    map.insert("color_classes", serde_json::Value::Array(classes));

    serde_json::to_string(&map).expect("serializing primitive settings to JSON must not fail")
}

/// 抽出パラメータのSHA-256フィンガープリント（小文字16進数64文字）を計算する。
pub fn settings_fingerprint(config: &ExtractionConfig) -> String {
    let mut hasher = Sha256::new();
    hasher.update(config_to_canonical_json(config).as_bytes());
    hex::encode(hasher.finalize())
}
