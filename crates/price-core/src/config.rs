use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// 运行时配置。模型目录在进程启动时给定一次，之后不热更。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// 模型工件目录：weights.json / bias.json / feature_names.json /
    /// full_columns.json / cat_cols.json（列清单允许 .json.gz）
    pub model_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::from("model"),
        }
    }
}
