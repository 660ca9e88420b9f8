use crate::query::types::{Builtin, QueryError, QueryExpr, type_name};
use serde_json::Value;

/// 对 JSON 文档求值，返回按顺序产生的结果序列
///
/// 出错时，错误之前已经产生的值仍然保留，错误作为序列的最后一项
pub fn evaluate_query(expr: &QueryExpr, input: &Value) -> Vec<Result<Value, QueryError>> {
    let mut outputs = Vec::new();
    let result = eval(expr, input, &mut outputs);

    let mut results: Vec<Result<Value, QueryError>> = outputs.into_iter().map(Ok).collect();
    if let Err(err) = result {
        results.push(Err(err));
    }
    results
}

fn eval(expr: &QueryExpr, input: &Value, out: &mut Vec<Value>) -> Result<(), QueryError> {
    match expr {
        QueryExpr::Identity => {
            out.push(input.clone());
            Ok(())
        }

        QueryExpr::Literal(value) => {
            out.push(value.clone());
            Ok(())
        }

        QueryExpr::Field(target, name) => each(target, input, out, |value, out| {
            match value {
                Value::Object(map) => out.push(map.get(name).cloned().unwrap_or(Value::Null)),
                Value::Null => out.push(Value::Null),
                other => {
                    return Err(QueryError::Type(format!(
                        "Cannot index {} with \"{}\"",
                        type_name(&other),
                        name
                    )));
                }
            }
            Ok(())
        }),

        QueryExpr::Index(target, index) => each(target, input, out, |value, out| {
            match value {
                Value::Array(items) => {
                    let len = items.len() as i64;
                    let position = if *index < 0 { len + index } else { *index };
                    let item = if (0..len).contains(&position) {
                        items[position as usize].clone()
                    } else {
                        Value::Null
                    };
                    out.push(item);
                }
                Value::Null => out.push(Value::Null),
                other => {
                    return Err(QueryError::Type(format!(
                        "Cannot index {} with number",
                        type_name(&other)
                    )));
                }
            }
            Ok(())
        }),

        QueryExpr::Iterate(target) => each(target, input, out, |value, out| {
            match value {
                Value::Array(items) => out.extend(items),
                Value::Object(map) => out.extend(map.into_iter().map(|(_, v)| v)),
                other => {
                    return Err(QueryError::Type(format!(
                        "Cannot iterate over {}",
                        type_name(&other)
                    )));
                }
            }
            Ok(())
        }),

        QueryExpr::Optional(target) => match eval(target, input, out) {
            Err(QueryError::Halt) => Err(QueryError::Halt),
            _ => Ok(()),
        },

        QueryExpr::Pipe(left, right) => each(left, input, out, |value, out| {
            eval(right, &value, out)
        }),

        QueryExpr::Comma(left, right) => {
            eval(left, input, out)?;
            eval(right, input, out)
        }

        QueryExpr::Builtin(builtin) => eval_builtin(*builtin, input, out),
    }
}

/// 先对 `target` 求值，再把每个结果交给 `f`
///
/// `target` 出错前产生的值仍会被处理，随后返回该错误
fn each<F>(target: &QueryExpr, input: &Value, out: &mut Vec<Value>, mut f: F) -> Result<(), QueryError>
where
    F: FnMut(Value, &mut Vec<Value>) -> Result<(), QueryError>,
{
    let mut values = Vec::new();
    let result = eval(target, input, &mut values);
    for value in values {
        f(value, out)?;
    }
    result
}

fn eval_builtin(builtin: Builtin, input: &Value, out: &mut Vec<Value>) -> Result<(), QueryError> {
    match builtin {
        Builtin::Empty => Ok(()),
        Builtin::Halt => Err(QueryError::Halt),
        Builtin::Length => {
            let length = match input {
                Value::Null => Value::from(0),
                Value::Bool(_) => {
                    return Err(QueryError::Type(
                        "boolean has no length".to_string(),
                    ));
                }
                Value::Number(n) => match (n.as_i64(), n.as_f64()) {
                    (Some(i), _) => Value::from(i.unsigned_abs()),
                    (None, Some(f)) => Value::from(f.abs()),
                    (None, None) => Value::Number(n.clone()),
                },
                Value::String(s) => Value::from(s.chars().count()),
                Value::Array(items) => Value::from(items.len()),
                Value::Object(map) => Value::from(map.len()),
            };
            out.push(length);
            Ok(())
        }
        Builtin::Keys => match input {
            Value::Object(map) => {
                let mut keys: Vec<&String> = map.keys().collect();
                keys.sort();
                out.push(Value::Array(
                    keys.into_iter().map(|k| Value::String(k.clone())).collect(),
                ));
                Ok(())
            }
            Value::Array(items) => {
                out.push(Value::Array((0..items.len()).map(Value::from).collect()));
                Ok(())
            }
            other => Err(QueryError::Type(format!(
                "{} has no keys",
                type_name(other)
            ))),
        },
    }
}
