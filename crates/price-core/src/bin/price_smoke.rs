use anyhow::Result;
use std::path::PathBuf;

use price_core::config::Config;
use price_core::pipeline::PriceCore;

/// 手工冒烟：给一个模型目录，跑一条写死的完整记录。
/// 用法：price_smoke [model_dir]（默认 ./model）
fn main() -> Result<()> {
    // 1) 模型目录
    let model_dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("model"));

    // 2) 加载工件（缺文件直接报错退出）
    let core = PriceCore::new(Config { model_dir })?;
    println!(
        "loaded: features={} full_columns={} cat_cols={}",
        core.artifact.n_features(),
        core.artifact.n_full_columns(),
        core.artifact.cat_cols.len()
    );

    // 3) 一条完整记录（1985 款 alfa-romero 敞篷车）
    let record = serde_json::json!({
        "symboling": 3,
        "fueltype": "gas",
        "aspiration": "std",
        "doornumber": "two",
        "carbody": "convertible",
        "drivewheel": "rwd",
        "enginelocation": "front",
        "wheelbase": 88.6,
        "carlength": 168.8,
        "carwidth": 64.1,
        "carheight": 48.8,
        "curbweight": 2548,
        "enginetype": "dohc",
        "cylindernumber": "four",
        "enginesize": 130,
        "fuelsystem": "mpfi",
        "boreratio": 3.47,
        "stroke": 2.68,
        "compressionratio": 9.0,
        "horsepower": 111,
        "peakrpm": 5000,
        "citympg": 21,
        "highwaympg": 27,
        "brand": "alfa-romero"
    });
    let record = record.as_object().cloned().unwrap_or_default();

    // 4) 估价
    let resp = core.estimate(&record)?;
    println!("price={:.2} trace_id={}", resp.price, resp.trace_id);
    println!(
        "timings_us: validate={} encode={} infer={}",
        resp.timings_us.validate, resp.timings_us.encode, resp.timings_us.infer
    );
    Ok(())
}
