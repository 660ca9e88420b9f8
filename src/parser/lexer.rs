use crate::parser::token::{Token, TokenKind};
use once_cell::sync::Lazy;
use regex::Regex;

static NUMBER_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^-?[0-9]+(\.[0-9]+)?$").expect("number pattern is valid"));

/// 标识符允许的标点字符（字母和数字之外）
const IDENT_PUNCTUATION: &str = ";/?:@&=+$,#-_.!~*'()[]\"";

/// 词法错误
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LexError {
    /// `{` 之后直到输入结束都没有找到配对的 `}`
    #[error("expected `}}` to close JSON starting at line {line}, found end of input")]
    UnterminatedJson { line: usize },
}

/// 脚本词法分析器
///
/// 每次调用 `next_token` 产生一个词法单元，只向前看一个字符
pub struct Lexer {
    input: Vec<char>,
    ch: Option<char>,
    position: usize,
    read_position: usize,
    line: usize,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        let mut lexer = Self {
            input: input.chars().collect(),
            ch: None,
            position: 0,
            read_position: 0,
            line: 1,
        };
        lexer.read_char();
        lexer
    }

    fn read_char(&mut self) {
        self.ch = self.input.get(self.read_position).copied();
        self.position = self.read_position;
        self.read_position += 1;
    }

    pub fn next_token(&mut self) -> Result<Token, LexError> {
        self.skip_whitespace();

        let Some(ch) = self.ch else {
            return Ok(Token::new(
                TokenKind::Eof,
                "",
                self.line,
                self.position,
                self.position,
            ));
        };

        match ch {
            '{' => {
                let line = self.line;
                let start = self.position;
                let literal = self.read_json()?;
                Ok(Token::new(TokenKind::Json, literal, line, start, self.position))
            }
            c if is_ident_char(c) => {
                let start = self.position;
                let ident = self.read_identifier();
                let kind = if NUMBER_REGEX.is_match(&ident) {
                    TokenKind::Number
                } else {
                    TokenKind::lookup(&ident).unwrap_or(TokenKind::String)
                };
                Ok(Token::new(kind, ident, self.line, start, self.position))
            }
            c => {
                let token = Token::new(
                    TokenKind::Illegal,
                    c.to_string(),
                    self.line,
                    self.position,
                    self.position + 1,
                );
                self.read_char();
                Ok(token)
            }
        }
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.ch {
            if !matches!(c, ' ' | '\t' | '\n' | '\r') {
                break;
            }
            if c == '\n' {
                self.line += 1;
            }
            self.read_char();
        }
    }

    fn read_identifier(&mut self) -> String {
        let start = self.position;
        while self.ch.is_some_and(is_ident_char) {
            self.read_char();
        }
        self.input[start..self.position].iter().collect()
    }

    /// 读取括号配平的 JSON 文本，结束时游标停在 `}` 之后
    fn read_json(&mut self) -> Result<String, LexError> {
        let start = self.position;
        let start_line = self.line;
        let mut depth = 1usize;

        loop {
            self.read_char();
            match self.ch {
                None => return Err(LexError::UnterminatedJson { line: start_line }),
                Some('{') => depth += 1,
                Some('}') => {
                    depth -= 1;
                    if depth == 0 {
                        break;
                    }
                }
                Some('\n') => self.line += 1,
                Some(_) => {}
            }
        }

        let literal = self.input[start..=self.position].iter().collect();
        self.read_char();
        Ok(literal)
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || IDENT_PUNCTUATION.contains(c)
}

/// 把整段输入切分为词法单元，结果以 EOF 结尾
pub fn tokenize(input: &str) -> Result<Vec<Token>, LexError> {
    let mut lexer = Lexer::new(input);
    let mut tokens = Vec::new();
    loop {
        let token = lexer.next_token()?;
        let done = token.kind == TokenKind::Eof;
        tokens.push(token);
        if done {
            return Ok(tokens);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<TokenKind> {
        tokenize(input).unwrap().iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_request_line() {
        let tokens = tokenize("POST https://example.com/api?x=1").unwrap();
        assert_eq!(tokens[0].kind, TokenKind::Post);
        assert_eq!(tokens[1].kind, TokenKind::String);
        assert_eq!(tokens[1].literal, "https://example.com/api?x=1");
        assert_eq!(tokens[2].kind, TokenKind::Eof);
        assert_eq!(tokens[2].literal, "");
    }

    #[test]
    fn test_numbers() {
        assert_eq!(
            kinds("200 -1 3.14 1.x"),
            vec![
                TokenKind::Number,
                TokenKind::Number,
                TokenKind::Number,
                TokenKind::String,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn test_keywords() {
        assert_eq!(
            kinds("HTTP [Capture] wait"),
            vec![
                TokenKind::Http,
                TokenKind::Capture,
                TokenKind::Wait,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn test_json_blob_is_brace_balanced() {
        let tokens = tokenize("GET x\n{\"a\": {\"b\": 1}}\nHTTP 200").unwrap();
        assert_eq!(tokens[2].kind, TokenKind::Json);
        assert_eq!(tokens[2].literal, "{\"a\": {\"b\": 1}}");
        assert_eq!(tokens[2].line, 2);
        assert_eq!(tokens[3].kind, TokenKind::Http);
        assert_eq!(tokens[3].line, 3);
    }

    #[test]
    fn test_multiline_json_advances_line_counter() {
        let tokens = tokenize("{\n\"a\": 1\n}\nsave").unwrap();
        assert_eq!(tokens[0].kind, TokenKind::Json);
        assert_eq!(tokens[0].line, 1);
        assert_eq!(tokens[1].kind, TokenKind::Save);
        assert_eq!(tokens[1].line, 4);
    }

    #[test]
    fn test_unterminated_json() {
        let err = tokenize("GET x\n{\"a\": {\"b\": 1}").unwrap_err();
        assert_eq!(err, LexError::UnterminatedJson { line: 2 });
    }

    #[test]
    fn test_illegal_character() {
        let tokens = tokenize("GET <x>").unwrap();
        assert_eq!(tokens[1].kind, TokenKind::Illegal);
        assert_eq!(tokens[1].literal, "<");
        assert_eq!(tokens[2].literal, "x");
        assert_eq!(tokens[3].kind, TokenKind::Illegal);
    }

    #[test]
    fn test_line_numbers() {
        let tokens = tokenize("GET a\n\n  POST b").unwrap();
        assert_eq!(tokens[0].line, 1);
        assert_eq!(tokens[2].line, 3);
        assert_eq!(tokens[3].line, 3);
    }
}
