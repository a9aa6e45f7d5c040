use serde_json::{Number, Value};

use crate::error::PredictError;
use crate::schema::{AttrRecord, FieldKind, FieldSpec, FIELDS};

/// 会话内的回答累积器：固定字段表 + 待问下标 + 半成品记录。
/// 显式状态机，一场会话一个实例，谁持有谁负责生命周期，
/// 不存在进程级的可变会话字典。
#[derive(Debug, Clone, Default)]
pub struct Intake {
    next: usize,
    record: AttrRecord,
}

/// submit 的迁移结果。
#[derive(Debug)]
pub enum Turn {
    /// 还没收齐，继续问这个字段
    Ask(&'static FieldSpec),
    /// 24 个字段齐了：完整记录交出去，累积器自动回到初始态
    Done(AttrRecord),
}

impl Intake {
    pub fn new() -> Self {
        Self::default()
    }

    /// 当前等待回答的字段（Done 之后回到第一个）。
    #[inline]
    pub fn current(&self) -> &'static FieldSpec {
        &FIELDS[self.next]
    }

    /// 已收到的回答数。
    #[inline]
    pub fn answered(&self) -> usize {
        self.next
    }

    /// 提交当前字段的回答。数值字段在这里按点规则转换：
    /// 文本含 '.' 按 f64 解析，否则按 i64；解析失败时状态不前进，
    /// 调用方就同一字段重新提问。
    pub fn submit(&mut self, answer: &str) -> Result<Turn, PredictError> {
        let spec = &FIELDS[self.next];
        let text = answer.trim();

        let value = match spec.kind {
            FieldKind::Numeric => coerce_numeric(spec.name, text)?,
            FieldKind::Categorical => Value::String(text.to_string()),
        };

        self.record.insert(spec.name.to_string(), value);
        self.next += 1;

        if self.next == FIELDS.len() {
            let record = std::mem::take(&mut self.record);
            self.next = 0;
            return Ok(Turn::Done(record));
        }
        Ok(Turn::Ask(&FIELDS[self.next]))
    }

    /// 丢弃半成品记录，回到第一个字段（对话里的 /cancel）。
    pub fn cancel(&mut self) {
        self.next = 0;
        self.record.clear();
    }
}

/// 点规则：与训练侧数据清洗的口径一致。含 '.' 的文本按浮点收，
/// 其它必须是整数（"1.5e3" 走浮点分支，"15e2" 会被拒）。
fn coerce_numeric(field: &str, text: &str) -> Result<Value, PredictError> {
    let n = if text.contains('.') {
        text.parse::<f64>().ok().and_then(Number::from_f64)
    } else {
        text.parse::<i64>().ok().map(Number::from)
    };
    match n {
        Some(n) => Ok(Value::Number(n)),
        None => Err(PredictError::InvalidValue {
            field: field.to_string(),
            value: text.to_string(),
        }),
    }
}
