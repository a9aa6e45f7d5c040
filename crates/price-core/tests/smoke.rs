use std::fs;
use std::path::Path;

use price_core::config::Config;
use price_core::error::PredictError;
use price_core::intake::{Intake, Turn};
use price_core::pipeline::PriceCore;
use price_core::schema::{FieldKind, FIELDS};

/// 写一套最小但完整的模型目录：
/// price = 1000 + 2*wheelbase + 50*horsepower - 500*fueltype_diesel
fn write_model_dir(p: &Path) {
    fs::write(p.join("weights.json"), "[2.0, 50.0, -500.0]").unwrap();
    fs::write(p.join("bias.json"), "1000.0").unwrap();
    fs::write(
        p.join("feature_names.json"),
        r#"["wheelbase", "horsepower", "fueltype_diesel"]"#,
    )
    .unwrap();
    fs::write(
        p.join("full_columns.json"),
        r#"["symboling", "wheelbase", "carlength", "carwidth", "carheight",
            "curbweight", "enginesize", "boreratio", "stroke", "compressionratio",
            "horsepower", "peakrpm", "citympg", "highwaympg",
            "fueltype_diesel", "aspiration_turbo", "doornumber_two",
            "carbody_hatchback", "carbody_sedan", "carbody_wagon",
            "drivewheel_fwd", "drivewheel_rwd", "enginelocation_rear",
            "enginetype_ohc", "cylindernumber_four", "fuelsystem_mpfi",
            "brand_toyota", "brand_bmw"]"#,
    )
    .unwrap();
    fs::write(
        p.join("cat_cols.json"),
        r#"["fueltype", "aspiration", "doornumber", "carbody", "drivewheel",
            "enginelocation", "enginetype", "cylindernumber", "fuelsystem", "brand"]"#,
    )
    .unwrap();
}

/// 按会话顺序把 24 个回答灌进 Intake，拿到完整记录。
fn run_intake(answers: &[(&str, &str)]) -> price_core::schema::AttrRecord {
    let mut intake = Intake::new();
    loop {
        let spec = *intake.current();
        let answer = answers
            .iter()
            .find(|(name, _)| *name == spec.name)
            .map(|(_, a)| *a)
            .unwrap_or(match spec.kind {
                FieldKind::Numeric => "0",
                FieldKind::Categorical => "unknown",
            });
        match intake.submit(answer).unwrap() {
            Turn::Ask(_) => {}
            Turn::Done(record) => return record,
        }
    }
}

#[test]
fn full_conversation_to_price() {
    let dir = tempfile::tempdir().unwrap();
    write_model_dir(dir.path());
    let core = PriceCore::new(Config {
        model_dir: dir.path().to_path_buf(),
    })
    .unwrap();

    // diesel：1000 + 2*100 + 50*110 - 500 = 6200
    let record = run_intake(&[
        ("wheelbase", "100.0"),
        ("horsepower", "110"),
        ("fueltype", "diesel"),
    ]);
    assert_eq!(record.len(), FIELDS.len());
    let resp = core.estimate(&record).unwrap();
    assert!((resp.price - 6200.0).abs() < 1e-9, "price={}", resp.price);

    // gas 是参考类别：指示位不置 1
    let record = run_intake(&[
        ("wheelbase", "100.0"),
        ("horsepower", "110"),
        ("fueltype", "gas"),
    ]);
    let resp = core.estimate(&record).unwrap();
    assert!((resp.price - 6700.0).abs() < 1e-9, "price={}", resp.price);

    // electric 训练时没见过：静默丢弃，结果与参考类别相同
    let record = run_intake(&[
        ("wheelbase", "100.0"),
        ("horsepower", "110"),
        ("fueltype", "electric"),
    ]);
    let resp = core.estimate(&record).unwrap();
    assert!((resp.price - 6700.0).abs() < 1e-9, "price={}", resp.price);
}

#[test]
fn price_is_floored_at_zero() {
    let dir = tempfile::tempdir().unwrap();
    write_model_dir(dir.path());
    // bias 压成大负数，让线性部分出负价
    fs::write(dir.path().join("bias.json"), "-1000000.0").unwrap();
    let core = PriceCore::new(Config {
        model_dir: dir.path().to_path_buf(),
    })
    .unwrap();

    let record = run_intake(&[("wheelbase", "100.0"), ("horsepower", "110")]);
    let resp = core.estimate(&record).unwrap();
    assert_eq!(resp.price, 0.0);
}

#[test]
fn missing_fields_are_reported_in_one_error() {
    let dir = tempfile::tempdir().unwrap();
    write_model_dir(dir.path());
    let core = PriceCore::new(Config {
        model_dir: dir.path().to_path_buf(),
    })
    .unwrap();

    let mut record = run_intake(&[]);
    record.remove("horsepower");
    record.remove("brand");
    record.remove("stroke");
    match core.estimate(&record).unwrap_err() {
        PredictError::MissingFields { fields } => {
            assert_eq!(fields, vec!["brand", "horsepower", "stroke"]);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn startup_fails_without_model_dir() {
    let dir = tempfile::tempdir().unwrap();
    // 空目录：一个工件都没有
    let err = PriceCore::new(Config {
        model_dir: dir.path().to_path_buf(),
    })
    .unwrap_err();
    let msg = format!("{err:#}");
    assert!(msg.contains("load model artifacts"), "{msg}");
    assert!(msg.contains(&dir.path().display().to_string()), "{msg}");
}

#[test]
fn artifact_predict_agrees_with_pipeline() {
    let dir = tempfile::tempdir().unwrap();
    write_model_dir(dir.path());
    let core = PriceCore::new(Config {
        model_dir: dir.path().to_path_buf(),
    })
    .unwrap();

    let record = run_intake(&[
        ("wheelbase", "94.5"),
        ("horsepower", "69"),
        ("fueltype", "diesel"),
        ("brand", "toyota"),
    ]);
    let direct = core.artifact.predict(&record).unwrap();
    let resp = core.estimate(&record).unwrap();
    assert_eq!(direct, resp.price);
}
