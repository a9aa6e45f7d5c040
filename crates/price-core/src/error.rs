use thiserror::Error;

/// 预测期的可恢复错误，由调用方决定补数据还是放弃。
/// 加载期的致命错误走 anyhow（见 artifact.rs）。
#[derive(Debug, Clone, Error)]
pub enum PredictError {
    /// 必填字段缺失。一次性报出全部缺失名（排好序），不是只报第一个。
    #[error("mandatory fields are absent: {}", .fields.join(", "))]
    MissingFields { fields: Vec<String> },

    /// 数值位置给了转换不了的值。
    #[error("field '{field}' expects a numeric value, got '{value}'")]
    InvalidValue { field: String, value: String },
}
