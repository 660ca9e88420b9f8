use std::fmt;

/// 词法单元类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// 无法识别的字符
    Illegal,
    /// 输入结束
    Eof,

    /// 普通标识符（URL、header 名、变量名等）
    String,
    /// 数字字面量，如 `200`、`-1.5`
    Number,
    /// 括号配平的内嵌 JSON 文本
    Json,

    // HTTP 方法
    Get,
    Post,
    Put,
    Delete,
    Patch,

    // 步骤关键字
    Http,
    Header,
    Wait,
    Save,
    Capture,
}

/// 关键字表，查找时忽略大小写
static KEYWORDS: &[(&str, TokenKind)] = &[
    ("GET", TokenKind::Get),
    ("POST", TokenKind::Post),
    ("PUT", TokenKind::Put),
    ("DELETE", TokenKind::Delete),
    ("PATCH", TokenKind::Patch),
    ("HTTP", TokenKind::Http),
    ("HEADER", TokenKind::Header),
    ("WAIT", TokenKind::Wait),
    ("SAVE", TokenKind::Save),
    ("[CAPTURE]", TokenKind::Capture),
];

impl TokenKind {
    /// 在关键字表中查找标识符，未命中返回 None
    pub fn lookup(ident: &str) -> Option<TokenKind> {
        KEYWORDS
            .iter()
            .find(|(keyword, _)| keyword.eq_ignore_ascii_case(ident))
            .map(|(_, kind)| *kind)
    }

    pub fn is_keyword(&self) -> bool {
        KEYWORDS.iter().any(|(_, kind)| kind == self)
    }

    pub fn is_method(&self) -> bool {
        matches!(
            self,
            TokenKind::Get | TokenKind::Post | TokenKind::Put | TokenKind::Delete | TokenKind::Patch
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKind::Illegal => "ILLEGAL",
            TokenKind::Eof => "EOF",
            TokenKind::String => "STRING",
            TokenKind::Number => "NUMBER",
            TokenKind::Json => "JSON",
            TokenKind::Get => "GET",
            TokenKind::Post => "POST",
            TokenKind::Put => "PUT",
            TokenKind::Delete => "DELETE",
            TokenKind::Patch => "PATCH",
            TokenKind::Http => "HTTP",
            TokenKind::Header => "HEADER",
            TokenKind::Wait => "WAIT",
            TokenKind::Save => "SAVE",
            TokenKind::Capture => "CAPTURE",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 词法单元
///
/// `start`/`end` 是字符偏移，`line` 从 1 开始
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub literal: String,
    pub line: usize,
    pub start: usize,
    pub end: usize,
}

impl Token {
    pub fn new(
        kind: TokenKind,
        literal: impl Into<String>,
        line: usize,
        start: usize,
        end: usize,
    ) -> Self {
        Self {
            kind,
            literal: literal.into(),
            line,
            start,
            end,
        }
    }
}
