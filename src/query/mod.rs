/// 查询模块 - 用 jq 风格的表达式从响应 JSON 中提取值
mod evaluator;
mod parser;
mod types;

pub use evaluator::evaluate_query;
pub use parser::parse_query;
pub use types::{Builtin, QueryError, QueryExpr, type_name, value_to_string};

/// 解析并执行查询；语法错误作为唯一的一项返回
pub fn run_query(
    expression: &str,
    document: &serde_json::Value,
) -> Vec<Result<serde_json::Value, QueryError>> {
    match parse_query(expression) {
        Ok(expr) => evaluate_query(&expr, document),
        Err(err) => vec![Err(err)],
    }
}
