use anyhow::{Context, Result};
use clap::Parser;
use metrics_exporter_prometheus::PrometheusBuilder;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use price_core::config::Config;
use price_core::intake::{Intake, Turn};
use price_core::pipeline::PriceCore;
use price_core::schema::FieldSpec;

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// 模型工件目录（weights.json / bias.json / feature_names.json / full_columns.json / cat_cols.json）
    #[arg(long, default_value = "model")]
    model_dir: PathBuf,

    /// 会话结束后把 Prometheus 文本格式的指标打到 stderr
    #[arg(long)]
    dump_metrics: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // 日志走 stderr，stdout 留给对话本身
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive("info".parse().unwrap()))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let prom = PrometheusBuilder::new()
        .install_recorder()
        .expect("failed to install prometheus recorder");

    // 模型工件缺失/损坏 => 启动即失败
    let core = PriceCore::new(Config {
        model_dir: args.model_dir,
    })?;

    run_conversation(&core)?;

    if args.dump_metrics {
        eprintln!("{}", prom.render());
    }
    Ok(())
}

/// 一次进程一场会话：按固定顺序提问，收齐 24 个字段后出价。
/// /cancel 或 EOF 丢弃半成品，直接说 cancelled，不碰预测端。
fn run_conversation(core: &PriceCore) -> Result<()> {
    let stdin = io::stdin();
    let mut intake = Intake::new();

    println!("hi! I can estimate a car price. answer the prompts one at a time (send /cancel to stop)");
    prompt(intake.current())?;

    for line in stdin.lock().lines() {
        let line = line.context("read stdin")?;
        let answer = line.trim();

        if answer == "/cancel" {
            tracing::debug!(answered = intake.answered(), "conversation cancelled");
            intake.cancel();
            println!("cancelled");
            return Ok(());
        }

        match intake.submit(answer) {
            Ok(Turn::Ask(next)) => prompt(next)?,
            Ok(Turn::Done(record)) => {
                match core.estimate(&record) {
                    Ok(resp) => {
                        tracing::info!(trace_id = %resp.trace_id, price = resp.price, "estimate ok");
                        println!("predicted price: {}", format_usd(resp.price));
                    }
                    // 核心的错误渲染成一行；shell 本身不崩
                    Err(e) => println!("error: {e}"),
                }
                return Ok(());
            }
            Err(e) => {
                // 无效输入：状态没前进，就同一字段重问
                println!("error: {e}");
                prompt(intake.current())?;
            }
        }
    }

    // EOF 等价于取消
    tracing::debug!(answered = intake.answered(), "stdin closed mid-conversation");
    println!("cancelled");
    Ok(())
}

fn prompt(spec: &FieldSpec) -> io::Result<()> {
    let mut out = io::stdout().lock();
    writeln!(out, "{}", prompt_text(spec.name))?;
    out.flush()
}

/// 每个字段的提问文案。取值举例跟训练数据的口径一致。
fn prompt_text(field: &str) -> &'static str {
    match field {
        "symboling" => "symboling (insurance risk rating, integer from -2 to 3):",
        "fueltype" => "fuel type (gas / diesel):",
        "aspiration" => "aspiration (std / turbo):",
        "doornumber" => "number of doors (two / four):",
        "carbody" => "body style (sedan, hatchback, wagon, convertible, hardtop):",
        "drivewheel" => "drive wheels (fwd / rwd / 4wd):",
        "enginelocation" => "engine location (front / rear):",
        "wheelbase" => "wheelbase in inches (e.g. 99.8):",
        "carlength" => "car length in inches (e.g. 168.8):",
        "carwidth" => "car width in inches (e.g. 64.1):",
        "carheight" => "car height in inches (e.g. 48.8):",
        "curbweight" => "curb weight in pounds (e.g. 2500):",
        "enginetype" => "engine type (ohc, dohc, ohcv, l, rotor, ...):",
        "cylindernumber" => "number of cylinders (four, six, eight, ...):",
        "enginesize" => "engine size in cubic inches (e.g. 130):",
        "fuelsystem" => "fuel system (mpfi, 2bbl, idi, ...):",
        "boreratio" => "bore ratio (e.g. 3.47):",
        "stroke" => "stroke (e.g. 2.68):",
        "compressionratio" => "compression ratio (e.g. 9.0):",
        "horsepower" => "horsepower (e.g. 111):",
        "peakrpm" => "peak rpm (e.g. 5000):",
        "citympg" => "city mpg (e.g. 21):",
        "highwaympg" => "highway mpg (e.g. 27):",
        "brand" => "brand (toyota, bmw, audi, honda, ...):",
        _ => "value:",
    }
}

/// 渲染成 $6,200.00 这种样子：千分位加两位小数。输入已在核心截到非负。
fn format_usd(price: f64) -> String {
    let cents = (price * 100.0).round() as u64;
    format!("${}.{:02}", group_thousands(cents / 100), cents % 100)
}

fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let bytes = digits.as_bytes();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, b) in bytes.iter().enumerate() {
        if i > 0 && (bytes.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(*b as char);
    }
    out
}
