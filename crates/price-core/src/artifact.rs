use anyhow::{bail, Context, Result};
use hashbrown::HashMap;
use std::fs;
use std::path::Path;

use crate::encode;
use crate::error::PredictError;
use crate::schema::AttrRecord;

/// 训练侧导出的全部模型状态。进程启动时加载一次，之后只读共享。
///
/// 文件布局（model_dir 下）：
///   weights.json        f64 数组，长度 = feature_names.len()
///   bias.json           单个 f64
///   feature_names.json  最终特征列（有序，决定点积顺序）
///   full_columns.json   one-hot 展开后的全量列空间
///   cat_cols.json       需要展开的原始类别字段
/// 三个列清单允许 `.json.gz` 形式（导出脚本在列表大时会 gzip）。
#[derive(Debug, Clone)]
pub struct ModelArtifact {
    pub weights: Vec<f64>,
    pub bias: f64,
    pub feature_names: Vec<String>,
    pub full_columns: Vec<String>,
    pub cat_cols: Vec<String>,

    /// 列名 -> full 向量下标，加载时一次建好
    full_index: HashMap<String, usize>,
    /// feature_names[i] 在 full_columns 里的下标（投影用）
    final_idx: Vec<usize>,
}

impl ModelArtifact {
    /// 从模型目录加载全部工件。任何文件缺失/损坏都返回 Err，
    /// 调用方应把它当作致命错误（没有模型就没有服务）。
    pub fn load_from_dir(dir: &Path) -> Result<Self> {
        let weights = load_weights(dir)?;
        let bias = load_bias(dir)?;
        let feature_names = load_columns(dir, "feature_names")?;
        let full_columns = load_columns(dir, "full_columns")?;
        let cat_cols = load_columns(dir, "cat_cols")?;
        Self::from_parts(weights, bias, feature_names, full_columns, cat_cols)
            .with_context(|| format!("model artifacts in '{}' are inconsistent", dir.display()))
    }

    /// 从内存拼装（测试、嵌入场景用）。做两条一致性检查：
    /// 维度匹配、feature_names ⊆ full_columns。
    pub fn from_parts(
        weights: Vec<f64>,
        bias: f64,
        feature_names: Vec<String>,
        full_columns: Vec<String>,
        cat_cols: Vec<String>,
    ) -> Result<Self> {
        if weights.len() != feature_names.len() {
            bail!(
                "weights/feature_names length mismatch: weights={} feature_names={}",
                weights.len(),
                feature_names.len()
            );
        }

        let mut full_index = HashMap::with_capacity(full_columns.len());
        for (i, name) in full_columns.iter().enumerate() {
            full_index.insert(name.clone(), i);
        }

        let mut final_idx = Vec::with_capacity(feature_names.len());
        for (i, name) in feature_names.iter().enumerate() {
            match full_index.get(name) {
                Some(&pos) => final_idx.push(pos),
                None => bail!("feature_names[{i}]='{name}' is not part of full_columns"),
            }
        }

        Ok(Self {
            weights,
            bias,
            feature_names,
            full_columns,
            cat_cols,
            full_index,
            final_idx,
        })
    }

    #[inline]
    pub fn n_features(&self) -> usize {
        self.feature_names.len()
    }

    #[inline]
    pub fn n_full_columns(&self) -> usize {
        self.full_columns.len()
    }

    /// 字段是否按类别处理（出现在 cat_cols 里）。
    #[inline]
    pub fn is_categorical(&self, field: &str) -> bool {
        self.cat_cols.iter().any(|c| c == field)
    }

    #[inline]
    pub(crate) fn column_pos(&self, name: &str) -> Option<usize> {
        self.full_index.get(name).copied()
    }

    #[inline]
    pub(crate) fn final_positions(&self) -> &[usize] {
        &self.final_idx
    }

    /// 线性推理：dot(row, weights) + bias，负数截到 0（价格不为负）。
    /// row 必须已经按 feature_names 的顺序对齐。
    pub fn infer(&self, row: &[f64]) -> f64 {
        debug_assert_eq!(row.len(), self.weights.len());
        let mut z = self.bias;
        for (v, w) in row.iter().zip(self.weights.iter()) {
            z += v * w;
        }
        z.max(0.0)
    }

    /// 完整记录 -> 预测价格。纯函数：校验、对齐、推理，不碰任何共享状态。
    pub fn predict(&self, record: &AttrRecord) -> Result<f64, PredictError> {
        encode::validate(self, record)?;
        let row = encode::encode_row(self, record)?;
        Ok(self.infer(&row))
    }
}

fn load_weights(dir: &Path) -> Result<Vec<f64>> {
    let path = dir.join("weights.json");
    let s = fs::read_to_string(&path)
        .with_context(|| format!("read weights.json: {}", path.display()))?;
    let w: Vec<f64> =
        serde_json::from_str(&s).with_context(|| format!("parse weights.json: {}", path.display()))?;
    Ok(w)
}

fn load_bias(dir: &Path) -> Result<f64> {
    let path = dir.join("bias.json");
    let s = fs::read_to_string(&path)
        .with_context(|| format!("read bias.json: {}", path.display()))?;
    let b: f64 =
        serde_json::from_str(&s).with_context(|| format!("parse bias.json: {}", path.display()))?;
    Ok(b)
}

/// 列清单：先找 `<stem>.json`，没有再找 `<stem>.json.gz`，都没有报错并点名目录。
fn load_columns(dir: &Path, stem: &str) -> Result<Vec<String>> {
    let json_path = dir.join(format!("{stem}.json"));
    if json_path.exists() {
        let s = fs::read_to_string(&json_path)
            .with_context(|| format!("read {stem}.json: {}", json_path.display()))?;
        let cols: Vec<String> = serde_json::from_str(&s)
            .with_context(|| format!("parse {stem}.json: {}", json_path.display()))?;
        return Ok(cols);
    }

    let gz_path = dir.join(format!("{stem}.json.gz"));
    if gz_path.exists() {
        let f = fs::File::open(&gz_path)
            .with_context(|| format!("open {stem}.json.gz: {}", gz_path.display()))?;
        let dec = flate2::read::GzDecoder::new(f);
        let cols: Vec<String> = serde_json::from_reader(dec)
            .with_context(|| format!("parse {stem}.json.gz: {}", gz_path.display()))?;
        return Ok(cols);
    }

    bail!(
        "missing model artifact in model_dir={}: expected {stem}.json or {stem}.json.gz",
        dir.display()
    )
}
