use crate::http::types::Method;
use crate::variable::capture::VariableCapture;
use serde_json::Value;
use std::fmt;
use std::path::PathBuf;

/// 脚本中的一个请求步骤
///
/// 解析器产出后不再修改；执行器只读取它，替换变量时使用副本
#[derive(Debug, Clone, PartialEq)]
pub struct RequestDescriptor {
    /// HTTP 方法（解析时已规范化）
    pub method: Method,

    /// 请求 URL，可能包含未替换的 `{{ .name }}` 占位符
    pub url: String,

    /// Headers 列表，保持脚本顺序，同名 header 不合并
    pub headers: Vec<(String, String)>,

    /// 请求体，任意 JSON 值
    pub body: Option<Value>,

    /// 期望的响应状态码，缺省表示不检查
    pub expected_status: Option<u16>,

    /// 变量捕获列表，保持脚本顺序
    pub captures: Vec<VariableCapture>,

    /// 本步骤完成后的等待时间（毫秒）
    pub wait_millis: Option<u64>,

    /// 方法行在脚本中的行号
    pub line: usize,
}

impl RequestDescriptor {
    pub fn new(method: Method, url: impl Into<String>, line: usize) -> Self {
        Self {
            method,
            url: url.into(),
            headers: Vec::new(),
            body: None,
            expected_status: None,
            captures: Vec::new(),
            wait_millis: None,
            line,
        }
    }
}

/// 整个脚本的解析结果
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParsedScript {
    /// 按脚本顺序排列的请求
    pub requests: Vec<RequestDescriptor>,

    /// 源文件路径（用于错误报告）
    pub source_path: Option<PathBuf>,
}

impl ParsedScript {
    pub fn new(requests: Vec<RequestDescriptor>) -> Self {
        Self {
            requests,
            source_path: None,
        }
    }

    pub fn with_source_path(mut self, path: PathBuf) -> Self {
        self.source_path = Some(path);
        self
    }

    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }
}

/// 插入符对齐到出错片段的哪一端
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    /// 指向片段的第一个字符
    Start,
    /// 指向片段的最后一个字符，用于“缺少参数”一类错误
    End,
}

/// 带位置的语法错误
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxError {
    /// 出错行号（从 1 开始）
    pub line_number: usize,
    /// 出错行的原文
    pub source_line: String,
    /// 插入符所在列（从 1 开始，按字符计）
    pub column: usize,
    /// 出错的片段
    pub near: String,
    /// 可读的错误原因
    pub message: String,
    pub source_path: Option<PathBuf>,
}

impl SyntaxError {
    /// 在 `source_line` 中定位 `near`（忽略大小写）并计算列号
    pub fn at_token(
        line_number: usize,
        source_line: &str,
        near: &str,
        anchor: Anchor,
        message: impl Into<String>,
    ) -> Self {
        let haystack = source_line.to_ascii_lowercase();
        let needle = near.to_ascii_lowercase();
        let column = match haystack.find(&needle) {
            Some(byte_index) => {
                let chars_before = source_line[..byte_index].chars().count();
                match anchor {
                    Anchor::Start => chars_before + 1,
                    Anchor::End => chars_before + near.chars().count().max(1),
                }
            }
            None => 1,
        };

        Self {
            line_number,
            source_line: source_line.to_string(),
            column,
            near: near.to_string(),
            message: message.into(),
            source_path: None,
        }
    }

    /// 已知列号时直接构造
    pub fn at_column(
        line_number: usize,
        source_line: &str,
        column: usize,
        message: impl Into<String>,
    ) -> Self {
        let width = source_line.chars().count();
        let column = column.clamp(1, width.max(1));
        let near = source_line
            .chars()
            .skip(column - 1)
            .collect::<String>()
            .trim()
            .to_string();

        Self {
            line_number,
            source_line: source_line.to_string(),
            column,
            near,
            message: message.into(),
            source_path: None,
        }
    }
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.near.is_empty() {
            writeln!(f, "Invalid syntax at position {}.", self.column)?;
        } else {
            writeln!(
                f,
                "Invalid syntax at position {} near `{}`.",
                self.column, self.near
            )?;
        }
        if let Some(path) = &self.source_path {
            writeln!(
                f,
                "  --> {}:{}:{}",
                path.display(),
                self.line_number,
                self.column
            )?;
        }

        let prefix = format!("   {} | ", self.line_number);
        writeln!(f, "{}{}", prefix, self.source_line)?;
        writeln!(
            f,
            "{}^",
            " ".repeat(prefix.chars().count() + self.column - 1)
        )?;
        write!(f, "{}", self.message)
    }
}

/// 解析错误类型
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// 脚本语法错误
    #[error("{0}")]
    Syntax(Box<SyntaxError>),

    /// IO 错误
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ParseError {
    pub fn syntax(&self) -> Option<&SyntaxError> {
        match self {
            ParseError::Syntax(err) => Some(err),
            ParseError::Io(_) => None,
        }
    }
}

impl From<SyntaxError> for ParseError {
    fn from(err: SyntaxError) -> Self {
        ParseError::Syntax(Box::new(err))
    }
}

/// 解析结果类型别名
pub type ParseResult<T> = Result<T, ParseError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptor_new() {
        let req = RequestDescriptor::new(Method::Get, "http://example.com", 3);
        assert_eq!(req.line, 3);
        assert_eq!(req.url, "http://example.com");
        assert!(req.headers.is_empty());
        assert!(req.captures.is_empty());
        assert_eq!(req.body, None);
        assert_eq!(req.expected_status, None);
        assert_eq!(req.wait_millis, None);
    }

    #[test]
    fn test_column_anchored_at_start() {
        let err = SyntaxError::at_token(2, "  foo http://x", "foo", Anchor::Start, "Unknown symbol.");
        assert_eq!(err.column, 3);
    }

    #[test]
    fn test_column_anchored_at_end_is_case_insensitive() {
        let err = SyntaxError::at_token(1, "get", "GET", Anchor::End, "Expecting url.");
        assert_eq!(err.column, 3);
    }

    #[test]
    fn test_render_with_caret() {
        let err = SyntaxError::at_token(12, "foo bar", "foo", Anchor::Start, "Unknown symbol.");
        let rendered = err.to_string();
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines[0], "Invalid syntax at position 1 near `foo`.");
        assert_eq!(lines[1], "   12 | foo bar");
        assert_eq!(lines[2], "        ^");
        assert_eq!(lines[3], "Unknown symbol.");
    }

    #[test]
    fn test_at_column_clamps() {
        let err = SyntaxError::at_column(4, "  \"a\": 1,", 99, "JSON syntax error");
        assert_eq!(err.column, 9);
        assert_eq!(err.near, ",");
    }
}
