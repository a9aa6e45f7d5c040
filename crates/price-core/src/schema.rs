use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 原始属性记录：字段名 -> 用户给的值。
/// intake 层负责把数值字段先转成 Number，类别字段保持 String。
pub type AttrRecord = serde_json::Map<String, serde_json::Value>;

/// 字段在编码侧的处理方式。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// 数值：原样进特征向量
    Numeric,
    /// 类别：one-hot 展开成 `<字段>_<取值>` 指示列
    Categorical,
}

#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
}

pub const FIELD_COUNT: usize = 24;

/// 会话的固定提问顺序：一次一个字段，共 24 个。
/// 顺序只影响对话体验，预测端只看字段名。
pub const FIELDS: &[FieldSpec] = &[
    FieldSpec { name: "symboling", kind: FieldKind::Numeric },
    FieldSpec { name: "fueltype", kind: FieldKind::Categorical },
    FieldSpec { name: "aspiration", kind: FieldKind::Categorical },
    FieldSpec { name: "doornumber", kind: FieldKind::Categorical },
    FieldSpec { name: "carbody", kind: FieldKind::Categorical },
    FieldSpec { name: "drivewheel", kind: FieldKind::Categorical },
    FieldSpec { name: "enginelocation", kind: FieldKind::Categorical },
    FieldSpec { name: "wheelbase", kind: FieldKind::Numeric },
    FieldSpec { name: "carlength", kind: FieldKind::Numeric },
    FieldSpec { name: "carwidth", kind: FieldKind::Numeric },
    FieldSpec { name: "carheight", kind: FieldKind::Numeric },
    FieldSpec { name: "curbweight", kind: FieldKind::Numeric },
    FieldSpec { name: "enginetype", kind: FieldKind::Categorical },
    FieldSpec { name: "cylindernumber", kind: FieldKind::Categorical },
    FieldSpec { name: "enginesize", kind: FieldKind::Numeric },
    FieldSpec { name: "fuelsystem", kind: FieldKind::Categorical },
    FieldSpec { name: "boreratio", kind: FieldKind::Numeric },
    FieldSpec { name: "stroke", kind: FieldKind::Numeric },
    FieldSpec { name: "compressionratio", kind: FieldKind::Numeric },
    FieldSpec { name: "horsepower", kind: FieldKind::Numeric },
    FieldSpec { name: "peakrpm", kind: FieldKind::Numeric },
    FieldSpec { name: "citympg", kind: FieldKind::Numeric },
    FieldSpec { name: "highwaympg", kind: FieldKind::Numeric },
    FieldSpec { name: "brand", kind: FieldKind::Categorical },
];

/// 模型侧必填的数值字段。predict 的必填集合 = 工件里的 cat_cols ∪ 这张表。
pub const NUMERIC_FIELDS: &[&str] = &[
    "symboling",
    "wheelbase",
    "carlength",
    "carwidth",
    "carheight",
    "curbweight",
    "enginesize",
    "boreratio",
    "stroke",
    "compressionratio",
    "horsepower",
    "peakrpm",
    "citympg",
    "highwaympg",
];

/// 估价响应。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EstimateResponse {
    pub trace_id: Uuid,
    /// 预测价格（美元，已在 0 处截断）
    pub price: f64,
    pub timings_us: TimingsUs,
}

/// 各阶段耗时（微秒）。
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TimingsUs {
    pub validate: u64,
    pub encode: u64,
    pub infer: u64,
}
