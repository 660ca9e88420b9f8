use crate::query::{run_query, value_to_string};
use crate::variable::stack::VariableStack;
use serde_json::Value;

/// 变量捕获配置：`save <name> <query>`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VariableCapture {
    /// 变量名称
    pub name: String,

    /// 对响应 JSON 执行的查询表达式，解析器不解释其内容
    pub query: String,
}

impl VariableCapture {
    pub fn new(name: impl Into<String>, query: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            query: query.into(),
        }
    }
}

/// 单个捕获的执行结果
#[derive(Debug, Clone, PartialEq)]
pub enum CaptureOutcome {
    /// 变量被写入（多个结果时保留最后一个）
    Set { name: String, value: String },
    /// 查询没有产生任何值，变量保持原样
    NoValue { name: String },
    /// 查询出错，变量保持原样；不影响后续步骤
    Failed { name: String, error: String },
}

impl CaptureOutcome {
    pub fn name(&self) -> &str {
        match self {
            CaptureOutcome::Set { name, .. }
            | CaptureOutcome::NoValue { name }
            | CaptureOutcome::Failed { name, .. } => name,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, CaptureOutcome::Failed { .. })
    }
}

/// 对响应 body 依次执行所有捕获，并写入变量表
///
/// body 不是合法 JSON 时每个捕获都记为失败
pub fn apply_captures(
    captures: &[VariableCapture],
    body: &str,
    stack: &mut VariableStack,
) -> Vec<CaptureOutcome> {
    if captures.is_empty() {
        return Vec::new();
    }

    let document: Value = match serde_json::from_str(body) {
        Ok(document) => document,
        Err(e) => {
            return captures
                .iter()
                .map(|capture| CaptureOutcome::Failed {
                    name: capture.name.clone(),
                    error: format!("unmarshal: response body is not JSON: {}", e),
                })
                .collect();
        }
    };

    captures
        .iter()
        .map(|capture| apply_capture(capture, &document, stack))
        .collect()
}

fn apply_capture(
    capture: &VariableCapture,
    document: &Value,
    stack: &mut VariableStack,
) -> CaptureOutcome {
    let mut last = None;

    for result in run_query(&capture.query, document) {
        match result {
            Ok(value) => last = Some(value_to_string(&value)),
            Err(err) if err.is_halt() => break,
            Err(err) => {
                // 出错的捕获不写入任何值，包括出错前产生的值
                return CaptureOutcome::Failed {
                    name: capture.name.clone(),
                    error: err.to_string(),
                };
            }
        }
    }

    match last {
        Some(value) => {
            stack.insert(capture.name.clone(), value.clone());
            CaptureOutcome::Set {
                name: capture.name.clone(),
                value,
            }
        }
        None => CaptureOutcome::NoValue {
            name: capture.name.clone(),
        },
    }
}
