pub mod lexer;
pub mod script;
pub mod token;
pub mod types;

// Re-export commonly used types
pub use lexer::{LexError, Lexer, tokenize};
pub use script::ScriptParser;
pub use token::{Token, TokenKind};
pub use types::{
    Anchor, ParseError, ParseResult, ParsedScript, RequestDescriptor, SyntaxError,
};

/// 从文件路径解析脚本
pub fn parse_file<P: AsRef<std::path::Path>>(path: P) -> ParseResult<ParsedScript> {
    ScriptParser::parse_file(path)
}

/// 从字符串内容解析脚本
pub fn parse_content(content: &str) -> ParseResult<ParsedScript> {
    ScriptParser::parse_content(content)
}
