use crate::http::types::{Method, Status};
use crate::parser::lexer::tokenize;
use crate::parser::token::{Token, TokenKind};
use crate::parser::types::{
    Anchor, ParseError, ParseResult, ParsedScript, RequestDescriptor, SyntaxError,
};
use crate::variable::capture::VariableCapture;
use serde_json::Value;
use std::path::Path;

/// 脚本中的一个非空、非注释行，按第一个空白拆成两段
#[derive(Debug, Clone, Copy)]
struct Line<'a> {
    /// 行下标（从 0 开始）
    index: usize,
    head: &'a str,
    tail: &'a str,
}

enum Next<'a> {
    Eof,
    Blank,
    Content(Line<'a>),
}

/// 脚本解析器
///
/// 以行为单位推进游标；遇到第一个语法错误即停止
pub struct ScriptParser<'a> {
    lines: Vec<&'a str>,
    current: usize,
}

impl<'a> ScriptParser<'a> {
    pub fn new(content: &'a str) -> Self {
        Self {
            lines: content.lines().collect(),
            current: 0,
        }
    }

    /// 从文件路径解析
    pub fn parse_file<P: AsRef<Path>>(path: P) -> ParseResult<ParsedScript> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let requests = ScriptParser::new(&content)
            .parse()
            .map_err(|err| match err {
                ParseError::Syntax(mut syntax) => {
                    syntax.source_path = Some(path.as_ref().to_path_buf());
                    ParseError::Syntax(syntax)
                }
                other => other,
            })?;
        Ok(ParsedScript::new(requests).with_source_path(path.as_ref().to_path_buf()))
    }

    /// 从字符串内容解析
    pub fn parse_content(content: &str) -> ParseResult<ParsedScript> {
        Ok(ParsedScript::new(ScriptParser::new(content).parse()?))
    }

    pub fn parse(mut self) -> ParseResult<Vec<RequestDescriptor>> {
        let mut requests = Vec::new();

        loop {
            let line = match self.next_line() {
                Next::Eof => break,
                Next::Blank => continue,
                Next::Content(line) => line,
            };

            let method = match TokenKind::lookup(line.head) {
                None => return Err(self.error(line.index, line.head, Anchor::Start, "Unknown symbol.")),
                Some(kind) => match Method::from_token(kind) {
                    Some(method) => method,
                    None => {
                        return Err(self.error(
                            line.index,
                            line.head,
                            Anchor::Start,
                            "Expecting http method.",
                        ));
                    }
                },
            };

            if line.tail.is_empty() {
                return Err(self.error(line.index, line.head, Anchor::End, "Expecting url."));
            }

            let request = self.request(method, line)?;
            tracing::debug!(
                line = request.line,
                method = request.method.as_str(),
                url = %request.url,
                "parsed request"
            );
            requests.push(request);
        }

        Ok(requests)
    }

    /// 解析一个请求块，直到空行、文件结束或下一个方法行
    fn request(&mut self, method: Method, first: Line<'a>) -> ParseResult<RequestDescriptor> {
        let mut request = RequestDescriptor::new(method, first.tail, first.index + 1);

        loop {
            let line = match self.next_line() {
                Next::Eof | Next::Blank => break,
                Next::Content(line) => line,
            };

            let kind = TokenKind::lookup(line.head);

            if kind.is_none() && (line.head.starts_with('{') || line.head.starts_with('[')) {
                request.body = Some(self.body(line.index)?);
                continue;
            }

            match kind {
                Some(kind) if kind.is_method() => {
                    // 回退一行，让它成为下一个请求的起点
                    self.current = line.index;
                    break;
                }
                Some(TokenKind::Http) => {
                    request.expected_status = Some(self.status(&line)?);
                }
                Some(TokenKind::Header) => {
                    let (name, value) = self.pair(&line)?;
                    request.headers.push((name, value));
                }
                Some(TokenKind::Wait) => {
                    request.wait_millis = Some(self.number(&line)?);
                }
                Some(TokenKind::Save) => {
                    let (name, query) = self.pair(&line)?;
                    request.captures.push(VariableCapture::new(name, query));
                }
                _ => {
                    return Err(self.error(line.index, line.head, Anchor::Start, "Unknown symbol."));
                }
            }
        }

        Ok(request)
    }

    /// 解析非负整数参数（`wait`）
    fn number(&self, line: &Line<'a>) -> ParseResult<u64> {
        let token = self.numeric_token(line)?;
        token
            .literal
            .parse::<u64>()
            .map_err(|_| self.error(line.index, &token.literal, Anchor::Start, "Expected number."))
    }

    /// 解析状态码参数（`http`）
    fn status(&self, line: &Line<'a>) -> ParseResult<u16> {
        let token = self.numeric_token(line)?;
        token
            .literal
            .parse::<u16>()
            .ok()
            .and_then(|code| Status::new(code).ok())
            .map(|status| status.code())
            .ok_or_else(|| {
                self.error(
                    line.index,
                    &token.literal,
                    Anchor::Start,
                    "Expected status code.",
                )
            })
    }

    /// 参数必须恰好是一个数字词法单元
    fn numeric_token(&self, line: &Line<'a>) -> ParseResult<Token> {
        if line.tail.is_empty() {
            return Err(self.error(line.index, line.head, Anchor::End, "Expected number."));
        }

        let tokens = tokenize(line.tail)
            .map_err(|_| self.error(line.index, line.tail, Anchor::Start, "Expected number."))?;

        match tokens.as_slice() {
            [token, eof] if token.kind == TokenKind::Number && eof.kind == TokenKind::Eof => {
                Ok(token.clone())
            }
            tokens => {
                let offending = tokens
                    .iter()
                    .find(|t| t.kind != TokenKind::Number)
                    .filter(|t| t.kind != TokenKind::Eof)
                    .map(|t| t.literal.as_str())
                    .unwrap_or(line.tail);
                Err(self.error(line.index, offending, Anchor::Start, "Expected number."))
            }
        }
    }

    /// 拆分 `key value` 形式的参数（`header`、`save`）
    fn pair(&self, line: &Line<'a>) -> ParseResult<(String, String)> {
        if line.tail.is_empty() {
            return Err(self.error(line.index, line.head, Anchor::End, "Expected identifier."));
        }

        match line.tail.split_once(char::is_whitespace) {
            Some((key, value)) if !value.trim().is_empty() => {
                Ok((key.to_string(), value.trim().to_string()))
            }
            _ => Err(self.error(line.index, line.tail, Anchor::End, "Expected value.")),
        }
    }

    /// 收集从 `start` 开始的 JSON 行并解析
    ///
    /// 出错时把 JSON 内部的行列号映射回脚本中的原始行
    fn body(&mut self, start: usize) -> ParseResult<Value> {
        let mut source_lines = vec![start];

        loop {
            let checkpoint = self.current;
            match self.next_line() {
                Next::Eof => break,
                Next::Blank => {
                    self.current = checkpoint;
                    break;
                }
                Next::Content(line) => {
                    if TokenKind::lookup(line.head).is_some() {
                        self.current = line.index;
                        break;
                    }
                    source_lines.push(line.index);
                }
            }
        }

        let text = source_lines
            .iter()
            .map(|&index| self.lines[index])
            .collect::<Vec<_>>()
            .join("\n");

        serde_json::from_str(&text).map_err(|err| {
            let buffer_line = err.line().clamp(1, source_lines.len());
            let index = source_lines[buffer_line - 1];
            let message = err.to_string();
            let cause = message
                .rsplit_once(" at line ")
                .map(|(cause, _)| cause)
                .unwrap_or(&message);

            SyntaxError::at_column(
                index + 1,
                self.lines[index],
                err.column(),
                format!("JSON syntax error: {}", cause),
            )
            .into()
        })
    }

    /// 读取下一行，跳过注释
    fn next_line(&mut self) -> Next<'a> {
        while self.current < self.lines.len() {
            let index = self.current;
            let raw: &'a str = self.lines[index];
            let text = raw.trim();
            self.current += 1;

            if text.is_empty() {
                return Next::Blank;
            }
            if text.starts_with('#') {
                continue;
            }

            let (head, tail) = match text.split_once(char::is_whitespace) {
                Some((head, tail)) => (head, tail.trim()),
                None => (text, ""),
            };
            return Next::Content(Line { index, head, tail });
        }

        Next::Eof
    }

    fn error(
        &self,
        index: usize,
        near: &str,
        anchor: Anchor,
        message: &str,
    ) -> ParseError {
        SyntaxError::at_token(index + 1, self.lines[index], near, anchor, message).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(content: &str) -> ParseResult<Vec<RequestDescriptor>> {
        ScriptParser::new(content).parse()
    }

    fn syntax_error(content: &str) -> SyntaxError {
        match parse(content) {
            Err(ParseError::Syntax(err)) => *err,
            other => panic!("expected syntax error, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_simple_get() {
        let requests = parse("GET http://example.com").unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].method, Method::Get);
        assert_eq!(requests[0].url, "http://example.com");
        assert_eq!(requests[0].line, 1);
    }

    #[test]
    fn test_method_is_case_insensitive() {
        let requests = parse("delete http://example.com/1\n\npAtCh http://example.com/2").unwrap();
        assert_eq!(requests[0].method, Method::Delete);
        assert_eq!(requests[1].method, Method::Patch);
    }

    #[test]
    fn test_parse_all_steps() {
        let content = r#"
# create a customer
POST https://api.example.com/customers
header X-Request-Id {{ .uuid }}
header X-Request-Id again
HTTP 201
save customer_id .id
save name .data.name
wait 500
{
  "name": "Alice",
  "tags": ["a", "b"]
}
"#;
        let requests = parse(content).unwrap();
        assert_eq!(requests.len(), 1);

        let req = &requests[0];
        assert_eq!(req.method, Method::Post);
        assert_eq!(req.line, 3);
        assert_eq!(
            req.headers,
            vec![
                ("X-Request-Id".to_string(), "{{ .uuid }}".to_string()),
                ("X-Request-Id".to_string(), "again".to_string()),
            ]
        );
        assert_eq!(req.expected_status, Some(201));
        assert_eq!(req.captures.len(), 2);
        assert_eq!(req.captures[0].name, "customer_id");
        assert_eq!(req.captures[0].query, ".id");
        assert_eq!(req.captures[1].query, ".data.name");
        assert_eq!(req.wait_millis, Some(500));
        assert_eq!(req.body, Some(json!({"name": "Alice", "tags": ["a", "b"]})));
    }

    #[test]
    fn test_multiple_requests_in_order() {
        let content = "GET http://a\nHTTP 200\n\nPOST http://b\n\n\nPUT http://c\n";
        let requests = parse(content).unwrap();
        let urls: Vec<&str> = requests.iter().map(|r| r.url.as_str()).collect();
        assert_eq!(urls, vec!["http://a", "http://b", "http://c"]);
    }

    #[test]
    fn test_method_line_starts_new_request_without_blank() {
        let content = "GET http://a\nhttp 200\nPOST http://b\nhttp 201";
        let requests = parse(content).unwrap();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].expected_status, Some(200));
        assert_eq!(requests[1].expected_status, Some(201));
        assert_eq!(requests[1].line, 3);
    }

    #[test]
    fn test_body_stops_at_keyword_line() {
        let content = "POST http://a\n{\"a\": 1}\nhttp 200\nGET http://b";
        let requests = parse(content).unwrap();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].body, Some(json!({"a": 1})));
        assert_eq!(requests[0].expected_status, Some(200));
    }

    #[test]
    fn test_array_body() {
        let requests = parse("POST http://a\n[1,\n 2,\n 3]").unwrap();
        assert_eq!(requests[0].body, Some(json!([1, 2, 3])));
    }

    #[test]
    fn test_body_keeps_key_order() {
        let requests = parse("POST http://a\n{\"z\": 1, \"a\": 2, \"m\": 3}").unwrap();
        let body = requests[0].body.as_ref().unwrap();
        let keys: Vec<&String> = body.as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["z", "a", "m"]);
    }

    #[test]
    fn test_comments_are_skipped() {
        let content = "# header\nGET http://a\n# note\nhttp 200\n";
        let requests = parse(content).unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].expected_status, Some(200));
    }

    #[test]
    fn test_empty_script() {
        assert!(parse("").unwrap().is_empty());
        assert!(parse("# only a comment\n\n").unwrap().is_empty());
    }

    #[test]
    fn test_unknown_top_level_symbol() {
        let err = syntax_error("\nfoo http://a");
        assert_eq!(err.line_number, 2);
        assert_eq!(err.column, 1);
        assert_eq!(err.message, "Unknown symbol.");
    }

    #[test]
    fn test_keyword_at_top_level_is_not_a_method() {
        let err = syntax_error("header a b");
        assert_eq!(err.message, "Expecting http method.");
    }

    #[test]
    fn test_missing_url() {
        let err = syntax_error("GET http://a\n\n  post");
        assert_eq!(err.line_number, 3);
        assert_eq!(err.message, "Expecting url.");
        assert_eq!(err.column, 6);
    }

    #[test]
    fn test_step_after_blank_line_is_top_level() {
        let err = syntax_error("GET http://a\n\nhttp 200");
        assert_eq!(err.line_number, 3);
        assert_eq!(err.message, "Expecting http method.");
    }

    #[test]
    fn test_unknown_step_symbol() {
        let err = syntax_error("GET http://a\nretry 3");
        assert_eq!(err.line_number, 2);
        assert_eq!(err.message, "Unknown symbol.");
    }

    #[test]
    fn test_non_numeric_status() {
        let err = syntax_error("GET http://a\nhttp ok");
        assert_eq!(err.message, "Expected number.");
        assert_eq!(err.near, "ok");
        assert_eq!(err.column, 6);
    }

    #[test]
    fn test_out_of_range_status() {
        let err = syntax_error("GET http://a\nhttp 42");
        assert_eq!(err.message, "Expected status code.");
    }

    #[test]
    fn test_negative_wait() {
        let err = syntax_error("GET http://a\nwait -5");
        assert_eq!(err.message, "Expected number.");
    }

    #[test]
    fn test_missing_number() {
        let err = syntax_error("GET http://a\nwait");
        assert_eq!(err.message, "Expected number.");
        assert_eq!(err.column, 4);
    }

    #[test]
    fn test_header_without_value() {
        let err = syntax_error("GET http://a\nheader X-Only");
        assert_eq!(err.message, "Expected value.");
        assert_eq!(err.line_number, 2);
    }

    #[test]
    fn test_save_without_arguments() {
        let err = syntax_error("GET http://a\nsave");
        assert_eq!(err.message, "Expected identifier.");
    }

    #[test]
    fn test_json_error_points_at_script_line() {
        let content = "# script\nPOST http://a\n{\n  \"a\": 1,\n  \"b\": 2,\n}\nhttp 200";
        let err = syntax_error(content);
        assert_eq!(err.line_number, 6);
        assert_eq!(err.source_line, "}");
        assert!(err.message.starts_with("JSON syntax error"));
        assert!(!err.message.contains(" at line "));
    }

    #[test]
    fn test_json_error_skips_comment_lines_in_mapping() {
        let content = "POST http://a\n{\n# comment\n  \"a\": tru\n}";
        let err = syntax_error(content);
        assert_eq!(err.line_number, 4);
    }

    #[test]
    fn test_json_error_line_is_never_first_body_line_when_later() {
        let content = "GET http://x\n\nPOST http://a\n[\n 1,\n 2\n 3\n]";
        let err = syntax_error(content);
        assert_eq!(err.line_number, 7);
        assert_eq!(err.source_line, " 3");
    }
}
