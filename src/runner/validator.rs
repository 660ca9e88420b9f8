use std::fmt;

use reqwest::header::HeaderName;

use crate::parser::{ParsedScript, RequestDescriptor};
use crate::variable::template::has_placeholders;

/// 单个结构性问题
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    /// 步骤序号（从 1 开始），整体问题为 None
    pub step: Option<usize>,
    /// 方法行行号
    pub line: Option<usize>,
    pub message: String,
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.step, self.line) {
            (Some(step), Some(line)) => write!(f, "step {} (line {}): {}", step, line, self.message),
            (Some(step), None) => write!(f, "step {}: {}", step, self.message),
            _ => write!(f, "{}", self.message),
        }
    }
}

/// 执行前收集到的全部结构性问题
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationErrors {
    pub issues: Vec<ValidationIssue>,
}

impl ValidationErrors {
    pub fn len(&self) -> usize {
        self.issues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "script validation failed with {} error(s):", self.issues.len())?;
        for issue in &self.issues {
            write!(f, "\n  - {}", issue)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

/// 在发出任何请求前检查整个脚本，一次报告所有问题
pub fn validate(script: &ParsedScript) -> Result<(), ValidationErrors> {
    let mut issues = Vec::new();

    if script.is_empty() {
        issues.push(ValidationIssue {
            step: None,
            line: None,
            message: "script contains no requests".to_string(),
        });
    }

    for (index, request) in script.requests.iter().enumerate() {
        validate_request(index + 1, request, &mut issues);
    }

    if issues.is_empty() {
        Ok(())
    } else {
        Err(ValidationErrors { issues })
    }
}

fn validate_request(step: usize, request: &RequestDescriptor, issues: &mut Vec<ValidationIssue>) {
    let mut report = |message: String| {
        issues.push(ValidationIssue {
            step: Some(step),
            line: Some(request.line),
            message,
        })
    };

    if request.url.trim().is_empty() {
        report("missing url".to_string());
    }

    if let Some(body) = &request.body {
        if let Err(message) = check_body(body) {
            report(message);
        }
    }

    for (name, _) in &request.headers {
        if has_placeholders(name) {
            continue;
        }
        if HeaderName::from_bytes(name.as_bytes()).is_err() {
            report(format!("invalid header name `{}`", name));
        }
    }

    for capture in &request.captures {
        if !is_identifier(&capture.name) {
            report(format!(
                "capture variable `{}` is not a valid identifier",
                capture.name
            ));
        }
        if capture.query.trim().is_empty() {
            report(format!("capture `{}` has an empty query", capture.name));
        }
    }
}

/// body 必须能序列化后再解析回相同的值
fn check_body(body: &serde_json::Value) -> Result<(), String> {
    let text = serde_json::to_string(body).map_err(|e| format!("invalid body: {}", e))?;
    let reparsed: serde_json::Value = serde_json::from_str(&text).map_err(|e| {
        let offset = byte_offset(&text, e.line(), e.column());
        format!("invalid body: {} near `{}`", e, context(&text, offset))
    })?;

    if &reparsed != body {
        return Err("invalid body: value changed after serialization".to_string());
    }
    Ok(())
}

fn byte_offset(text: &str, line: usize, column: usize) -> usize {
    let line_start: usize = text
        .split_inclusive('\n')
        .take(line.saturating_sub(1))
        .map(str::len)
        .sum();
    (line_start + column.saturating_sub(1)).min(text.len())
}

/// 出错位置附近的片段
fn context(text: &str, mut offset: usize) -> String {
    const RADIUS: usize = 10;
    while !text.is_char_boundary(offset) {
        offset -= 1;
    }
    let start = text[..offset]
        .char_indices()
        .rev()
        .nth(RADIUS - 1)
        .map(|(i, _)| i)
        .unwrap_or(0);
    text[start..].chars().take(RADIUS * 2).collect()
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
