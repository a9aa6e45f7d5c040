use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Instant;
use uuid::Uuid;

use crate::artifact::ModelArtifact;
use crate::config::Config;
use crate::encode;
use crate::error::PredictError;
use crate::schema::{AttrRecord, EstimateResponse, TimingsUs};

/// 进程级核心对象：配置 + 只读模型工件。
/// 工件加载后不再变，clone 出去的副本共享同一份 Arc。
#[derive(Debug, Clone)]
pub struct PriceCore {
    pub cfg: Config,
    pub artifact: Arc<ModelArtifact>,
}

impl PriceCore {
    /// 启动时加载一次模型工件。失败就让进程起不来，没有降级路径。
    pub fn new(cfg: Config) -> Result<Self> {
        let artifact = ModelArtifact::load_from_dir(&cfg.model_dir)
            .with_context(|| format!("load model artifacts from '{}'", cfg.model_dir.display()))?;

        metrics::gauge!("model_feature_dim").set(artifact.n_features() as f64);
        tracing::info!(
            features = artifact.n_features(),
            full_columns = artifact.n_full_columns(),
            cat_cols = artifact.cat_cols.len(),
            "model artifacts loaded"
        );

        Ok(Self {
            cfg,
            artifact: Arc::new(artifact),
        })
    }

    /// 完整记录 -> 结构化估价响应（trace_id + 分段耗时）。
    /// 正常路径不写日志，只出阶段耗时直方图与错误计数。
    pub fn estimate(&self, record: &AttrRecord) -> Result<EstimateResponse, PredictError> {
        let t0 = Instant::now();
        let mut timings = TimingsUs::default();

        // 1) validate：缺字段一次性全报
        let t_validate = Instant::now();
        if let Err(e) = encode::validate(&self.artifact, record) {
            metrics::counter!("estimate_missing_fields_total").increment(1);
            return Err(e);
        }
        timings.validate = now_us(t_validate);
        metrics::histogram!("stage_validate_us").record(timings.validate as f64);

        // 2) encode：展开 + 成员投影
        let t_encode = Instant::now();
        let row = match encode::encode_row(&self.artifact, record) {
            Ok(row) => row,
            Err(e) => {
                metrics::counter!("estimate_invalid_value_total").increment(1);
                return Err(e);
            }
        };
        timings.encode = now_us(t_encode);
        metrics::histogram!("stage_encode_us").record(timings.encode as f64);

        // 3) infer：dot + bias，0 处截断
        let t_infer = Instant::now();
        let price = self.artifact.infer(&row);
        timings.infer = now_us(t_infer);
        metrics::histogram!("stage_infer_us").record(timings.infer as f64);

        metrics::histogram!("e2e_us").record(now_us(t0) as f64);

        Ok(EstimateResponse {
            trace_id: Uuid::new_v4(),
            price,
            timings_us: timings,
        })
    }
}

#[inline]
fn now_us(start: Instant) -> u64 {
    start.elapsed().as_micros() as u64
}
