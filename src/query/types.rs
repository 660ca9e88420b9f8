use serde_json::Value;
use std::fmt;

/// 查询错误类型
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueryError {
    #[error("Invalid query syntax: {0}")]
    Parse(String),

    #[error("{0}")]
    Type(String),

    /// `halt` 主动终止输出，不算错误
    #[error("halt")]
    Halt,
}

impl QueryError {
    pub fn is_halt(&self) -> bool {
        matches!(self, QueryError::Halt)
    }
}

/// 内置函数
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    Length,
    Keys,
    Empty,
    Halt,
}

impl Builtin {
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "length" => Some(Self::Length),
            "keys" => Some(Self::Keys),
            "empty" => Some(Self::Empty),
            "halt" => Some(Self::Halt),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Length => "length",
            Self::Keys => "keys",
            Self::Empty => "empty",
            Self::Halt => "halt",
        }
    }
}

/// 查询表达式
#[derive(Debug, Clone, PartialEq)]
pub enum QueryExpr {
    /// `.`
    Identity,
    /// 数字、字符串、`null`、`true`、`false`
    Literal(Value),
    /// `target.name` 或 `target["name"]`
    Field(Box<QueryExpr>, String),
    /// `target[n]`，负数从末尾计
    Index(Box<QueryExpr>, i64),
    /// `target[]`
    Iterate(Box<QueryExpr>),
    /// `target?`，吞掉 target 的错误
    Optional(Box<QueryExpr>),
    /// `left | right`
    Pipe(Box<QueryExpr>, Box<QueryExpr>),
    /// `left, right`
    Comma(Box<QueryExpr>, Box<QueryExpr>),
    Builtin(Builtin),
}

impl fmt::Display for QueryExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryExpr::Identity => write!(f, "."),
            QueryExpr::Literal(value) => write!(f, "{}", value),
            QueryExpr::Field(target, name) => match target.as_ref() {
                QueryExpr::Identity => write!(f, ".{}", Value::String(name.clone())),
                other => write!(f, "{}[{}]", other, Value::String(name.clone())),
            },
            QueryExpr::Index(target, index) => write!(f, "{}[{}]", target, index),
            QueryExpr::Iterate(target) => write!(f, "{}[]", target),
            QueryExpr::Optional(target) => write!(f, "{}?", target),
            QueryExpr::Pipe(left, right) => write!(f, "{} | {}", left, right),
            QueryExpr::Comma(left, right) => write!(f, "{}, {}", left, right),
            QueryExpr::Builtin(builtin) => write!(f, "{}", builtin.as_str()),
        }
    }
}

/// JSON 值的类型名，用于错误消息
pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// 捕获结果写入变量表时使用的字符串形式
///
/// 字符串取原文，其余值使用紧凑 JSON
pub fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
