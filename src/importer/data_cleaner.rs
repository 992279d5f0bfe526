// ==========================================
// 物料目录导入 - 数据清洗器实现
// ==========================================
// 职责: TRIM / 空值标准化 / 数值与标记解析
// 数值口径: 容忍货币符号、千分位与逗号小数（1.234,50 / 1,234.50 / 1.234.567 / 12,5）
// 单个点号一律为小数点（1.500 = 1.5）
// ==========================================

use crate::importer::importer_trait::DataCleaner as DataCleanerTrait;

pub struct DataCleaner;

impl DataCleanerTrait for DataCleaner {
    fn clean_text(&self, value: &str) -> Option<String> {
        let collapsed = value.split_whitespace().collect::<Vec<_>>().join(" ");
        if collapsed.is_empty() {
            None
        } else {
            Some(collapsed)
        }
    }

    fn parse_number(&self, value: &str) -> Option<f64> {
        let negative = value.trim().starts_with('-');
        let kept: String = value
            .chars()
            .filter(|c| c.is_ascii_digit() || *c == ',' || *c == '.')
            .collect();
        if !kept.chars().any(|c| c.is_ascii_digit()) {
            return None;
        }

        let normalized = normalize_separators(&kept);
        let parsed = normalized.parse::<f64>().ok()?;
        if !parsed.is_finite() {
            return None;
        }
        Some(if negative { -parsed } else { parsed })
    }

    fn parse_flag(&self, value: &str) -> Option<bool> {
        match value.trim().to_lowercase().as_str() {
            "1" | "y" | "yes" | "true" | "s" | "si" | "sí" | "x" | "是" => Some(true),
            "0" | "n" | "no" | "false" | "否" => Some(false),
            _ => None,
        }
    }
}

/// 统一小数点为 '.'，去除千分位
fn normalize_separators(raw: &str) -> String {
    let last_dot = raw.rfind('.');
    let last_comma = raw.rfind(',');

    match (last_dot, last_comma) {
        // 同时出现: 靠后的是小数点
        (Some(dot), Some(comma)) => {
            if dot > comma {
                raw.replace(',', "")
            } else {
                raw.replace('.', "").replace(',', ".")
            }
        }
        // 仅逗号: 单个逗号且其后不超过 2 位视为小数点
        (None, Some(comma)) => {
            let decimals = raw.len() - comma - 1;
            if raw.matches(',').count() == 1 && decimals <= 2 {
                raw.replace(',', ".")
            } else {
                raw.replace(',', "")
            }
        }
        // 仅点号: 多个点为千分位，单个点为小数点
        (Some(_), None) => {
            if raw.matches('.').count() > 1 {
                raw.replace('.', "")
            } else {
                raw.to_string()
            }
        }
        (None, None) => raw.to_string(),
    }
}
