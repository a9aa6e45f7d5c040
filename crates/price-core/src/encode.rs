use serde_json::Value;

use crate::artifact::ModelArtifact;
use crate::error::PredictError;
use crate::schema::{AttrRecord, NUMERIC_FIELDS};

/// 必填校验：cat_cols ∪ NUMERIC_FIELDS 里缺谁报谁，一次性全报（排好序）。
pub fn validate(artifact: &ModelArtifact, record: &AttrRecord) -> Result<(), PredictError> {
    let mut missing: Vec<String> = Vec::new();
    for field in artifact.cat_cols.iter() {
        if !record.contains_key(field) {
            missing.push(field.clone());
        }
    }
    for field in NUMERIC_FIELDS {
        if !record.contains_key(*field) {
            missing.push((*field).to_string());
        }
    }
    if missing.is_empty() {
        return Ok(());
    }
    missing.sort_unstable();
    missing.dedup();
    Err(PredictError::MissingFields { fields: missing })
}

/// 两段式对齐，输出按 feature_names 排好的稠密行。
///
/// 1) 展开：类别字段产一条 `<字段>_<取值>` 指示列，数值字段按名字原样；
/// 2) 投影：落进 full_columns 下标空间（零初始化），训练时没见过的列名
///    静默丢弃，最后按 final_idx 收缩到 feature_names 的顺序。
///
/// drop-first 掉的参考类别不在 full_columns 里，跟未知类别走同一条路，
/// 这里不需要也不允许重新推断哪个类别被 drop。
pub fn encode_row(artifact: &ModelArtifact, record: &AttrRecord) -> Result<Vec<f64>, PredictError> {
    let mut full = vec![0.0f64; artifact.n_full_columns()];

    for (field, value) in record.iter() {
        if artifact.is_categorical(field) {
            let col = match value {
                // Null 类别不产指示列（所有指示位保持 0）
                Value::Null => {
                    tracing::debug!(field = %field, "null categorical value, no indicator");
                    continue;
                }
                Value::String(s) => format!("{field}_{s}"),
                other => format!("{field}_{other}"),
            };
            match artifact.column_pos(&col) {
                Some(pos) => full[pos] = 1.0,
                None => {
                    metrics::counter!("encode_unknown_column_total").increment(1);
                    tracing::debug!(column = %col, "unseen category, dropped");
                }
            }
        } else {
            match artifact.column_pos(field) {
                Some(pos) => full[pos] = numeric_value(field, value)?,
                None => {
                    metrics::counter!("encode_unknown_column_total").increment(1);
                    tracing::debug!(column = %field, "column outside trained universe, dropped");
                }
            }
        }
    }

    // 收缩投影：顺序唯一由 final_idx 决定，与记录的遍历顺序无关
    let row = artifact
        .final_positions()
        .iter()
        .map(|&pos| full[pos])
        .collect();
    Ok(row)
}

/// 数值位置的取值容忍面：Number 原样、Bool 按 0/1、数值字符串按 f64 解析，
/// 其余一律 InvalidValue。
fn numeric_value(field: &str, value: &Value) -> Result<f64, PredictError> {
    match value {
        Value::Number(n) => n.as_f64().ok_or_else(|| invalid(field, value)),
        Value::Bool(true) => Ok(1.0),
        Value::Bool(false) => Ok(0.0),
        Value::String(s) => s.trim().parse::<f64>().map_err(|_| invalid(field, value)),
        _ => Err(invalid(field, value)),
    }
}

fn invalid(field: &str, value: &Value) -> PredictError {
    let shown = match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    PredictError::InvalidValue {
        field: field.to_string(),
        value: shown,
    }
}
