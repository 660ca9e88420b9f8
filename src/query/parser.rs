use crate::query::types::{Builtin, QueryError, QueryExpr};
use serde_json::Value;

/// 解析查询表达式
///
/// 支持的格式（jq 子集）：
/// - `.`、`.id`、`.user.name`、`."key with space"`
/// - `.[0]`、`.[-1]`、`.["key"]`、`.items[]`、`.a?`
/// - `.a | .b`、`.a, .b`、`(.a | .b)`
/// - 字面量 `1`、`"s"`、`null`、`true`、`false`
/// - 内置函数 `length`、`keys`、`empty`、`halt`
pub fn parse_query(input: &str) -> Result<QueryExpr, QueryError> {
    let mut parser = QueryParser::new(input);
    let expr = parser.parse_pipe()?;
    parser.skip_whitespace();
    if let Some(c) = parser.peek() {
        return Err(parser.error(format!("unexpected `{}`", c)));
    }
    Ok(expr)
}

struct QueryParser {
    chars: Vec<char>,
    pos: usize,
}

impl QueryParser {
    fn new(input: &str) -> Self {
        Self {
            chars: input.chars().collect(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
    }

    /// 跳过空白后尝试吃掉字符 `c`
    fn eat(&mut self, c: char) -> bool {
        self.skip_whitespace();
        if self.peek() == Some(c) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, c: char) -> Result<(), QueryError> {
        if self.eat(c) {
            Ok(())
        } else {
            Err(self.error(format!("expected `{}`", c)))
        }
    }

    fn error(&self, message: String) -> QueryError {
        QueryError::Parse(format!("{} at position {}", message, self.pos + 1))
    }

    fn parse_pipe(&mut self) -> Result<QueryExpr, QueryError> {
        let mut left = self.parse_comma()?;
        while self.eat('|') {
            let right = self.parse_comma()?;
            left = QueryExpr::Pipe(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_comma(&mut self) -> Result<QueryExpr, QueryError> {
        let mut left = self.parse_postfix()?;
        while self.eat(',') {
            let right = self.parse_postfix()?;
            left = QueryExpr::Comma(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_postfix(&mut self) -> Result<QueryExpr, QueryError> {
        let primary = self.parse_primary()?;
        self.parse_suffixes(primary)
    }

    fn parse_primary(&mut self) -> Result<QueryExpr, QueryError> {
        self.skip_whitespace();
        match self.peek() {
            None => Err(self.error("unexpected end of query".to_string())),
            Some('.') => {
                self.pos += 1;
                match self.peek() {
                    Some(c) if is_ident_start(c) => {
                        let name = self.ident();
                        Ok(QueryExpr::Field(Box::new(QueryExpr::Identity), name))
                    }
                    Some('"') => {
                        let name = self.string()?;
                        Ok(QueryExpr::Field(Box::new(QueryExpr::Identity), name))
                    }
                    Some('.') => Err(self.error("recursive descent `..` is not supported".to_string())),
                    _ => Ok(QueryExpr::Identity),
                }
            }
            Some('(') => {
                self.pos += 1;
                let inner = self.parse_pipe()?;
                self.expect(')')?;
                Ok(inner)
            }
            Some('"') => Ok(QueryExpr::Literal(Value::String(self.string()?))),
            Some(c) if c == '-' || c.is_ascii_digit() => {
                Ok(QueryExpr::Literal(Value::Number(self.number()?)))
            }
            Some(c) if is_ident_start(c) => {
                let name = self.ident();
                match name.as_str() {
                    "null" => Ok(QueryExpr::Literal(Value::Null)),
                    "true" => Ok(QueryExpr::Literal(Value::Bool(true))),
                    "false" => Ok(QueryExpr::Literal(Value::Bool(false))),
                    other => Builtin::parse(other)
                        .map(QueryExpr::Builtin)
                        .ok_or_else(|| self.error(format!("{}/0 is not defined", other))),
                }
            }
            Some(c) => Err(self.error(format!("unexpected `{}`", c))),
        }
    }

    fn parse_suffixes(&mut self, mut expr: QueryExpr) -> Result<QueryExpr, QueryError> {
        loop {
            // 后缀紧跟在表达式之后，不跳过空白
            match self.peek() {
                Some('.') if self.peek_at(1).is_some_and(is_ident_start) => {
                    self.pos += 1;
                    let name = self.ident();
                    expr = QueryExpr::Field(Box::new(expr), name);
                }
                Some('.') if self.peek_at(1) == Some('"') => {
                    self.pos += 1;
                    let name = self.string()?;
                    expr = QueryExpr::Field(Box::new(expr), name);
                }
                Some('.') if self.peek_at(1) == Some('[') => {
                    self.pos += 1;
                }
                Some('[') => {
                    self.pos += 1;
                    expr = self.parse_bracket(expr)?;
                }
                Some('?') => {
                    self.pos += 1;
                    expr = QueryExpr::Optional(Box::new(expr));
                }
                _ => return Ok(expr),
            }
        }
    }

    /// `[` 已被吃掉
    fn parse_bracket(&mut self, target: QueryExpr) -> Result<QueryExpr, QueryError> {
        self.skip_whitespace();
        let expr = match self.peek() {
            Some(']') => QueryExpr::Iterate(Box::new(target)),
            Some('"') => {
                let name = self.string()?;
                QueryExpr::Field(Box::new(target), name)
            }
            Some(c) if c == '-' || c.is_ascii_digit() => {
                let number = self.number()?;
                let index = number
                    .as_i64()
                    .ok_or_else(|| self.error(format!("index {} is not an integer", number)))?;
                QueryExpr::Index(Box::new(target), index)
            }
            _ => return Err(self.error("expected index, string or `]`".to_string())),
        };
        self.expect(']')?;
        Ok(expr)
    }

    fn ident(&mut self) -> String {
        let start = self.pos;
        while self.peek().is_some_and(is_ident_char) {
            self.pos += 1;
        }
        self.chars[start..self.pos].iter().collect()
    }

    /// 读取 JSON 风格的字符串字面量，转义交给 serde_json 处理
    fn string(&mut self) -> Result<String, QueryError> {
        let start = self.pos;
        self.pos += 1;
        let mut escaped = false;
        loop {
            match self.peek() {
                None => return Err(self.error("unterminated string".to_string())),
                Some('\\') if !escaped => escaped = true,
                Some('"') if !escaped => break,
                Some(_) => escaped = false,
            }
            self.pos += 1;
        }
        self.pos += 1;

        let raw: String = self.chars[start..self.pos].iter().collect();
        serde_json::from_str(&raw).map_err(|e| self.error(format!("invalid string {}: {}", raw, e)))
    }

    fn number(&mut self) -> Result<serde_json::Number, QueryError> {
        let start = self.pos;
        if self.peek() == Some('-') {
            self.pos += 1;
        }
        while self
            .peek()
            .is_some_and(|c| c.is_ascii_digit() || c == '.')
        {
            self.pos += 1;
        }

        let raw: String = self.chars[start..self.pos].iter().collect();
        serde_json::from_str::<serde_json::Number>(&raw)
            .map_err(|_| self.error(format!("invalid number `{}`", raw)))
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(target: QueryExpr, name: &str) -> QueryExpr {
        QueryExpr::Field(Box::new(target), name.to_string())
    }

    #[test]
    fn test_parse_identity() {
        assert_eq!(parse_query(".").unwrap(), QueryExpr::Identity);
        assert_eq!(parse_query("  . ").unwrap(), QueryExpr::Identity);
    }

    #[test]
    fn test_parse_nested_field() {
        let expr = parse_query(".data.user.id").unwrap();
        assert_eq!(
            expr,
            field(field(field(QueryExpr::Identity, "data"), "user"), "id")
        );
    }

    #[test]
    fn test_parse_quoted_field() {
        let expr = parse_query(r#"."first name""#).unwrap();
        assert_eq!(expr, field(QueryExpr::Identity, "first name"));

        let expr = parse_query(r#".["x-id"]"#).unwrap();
        assert_eq!(expr, field(QueryExpr::Identity, "x-id"));
    }

    #[test]
    fn test_parse_index_and_iterate() {
        let expr = parse_query(".items[0].id").unwrap();
        assert_eq!(
            expr,
            field(
                QueryExpr::Index(Box::new(field(QueryExpr::Identity, "items")), 0),
                "id"
            )
        );

        let expr = parse_query(".[-1]").unwrap();
        assert_eq!(expr, QueryExpr::Index(Box::new(QueryExpr::Identity), -1));

        let expr = parse_query(".items[]").unwrap();
        assert_eq!(
            expr,
            QueryExpr::Iterate(Box::new(field(QueryExpr::Identity, "items")))
        );
    }

    #[test]
    fn test_parse_pipe_binds_looser_than_comma() {
        let expr = parse_query(".a, .b | length").unwrap();
        match expr {
            QueryExpr::Pipe(left, right) => {
                assert!(matches!(*left, QueryExpr::Comma(_, _)));
                assert_eq!(*right, QueryExpr::Builtin(Builtin::Length));
            }
            other => panic!("expected pipe, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_parentheses_and_optional() {
        let expr = parse_query("(.a | .b)?").unwrap();
        assert!(matches!(expr, QueryExpr::Optional(_)));
    }

    #[test]
    fn test_parse_literals() {
        assert_eq!(
            parse_query("\"x\"").unwrap(),
            QueryExpr::Literal(Value::String("x".to_string()))
        );
        assert_eq!(parse_query("null").unwrap(), QueryExpr::Literal(Value::Null));
        assert_eq!(
            parse_query("-2").unwrap(),
            QueryExpr::Literal(serde_json::json!(-2))
        );
    }

    #[test]
    fn test_parse_invalid_syntax() {
        assert!(parse_query("").is_err());
        assert!(parse_query(".a |").is_err());
        assert!(parse_query(".[").is_err());
        assert!(parse_query(".a b").is_err());
        assert!(parse_query("foo").is_err());
        assert!(parse_query("..").is_err());
        assert!(parse_query("(.a").is_err());
        assert!(parse_query(".[\"unterminated]").is_err());
    }
}
