use crate::variable::stack::VariableStack;
use once_cell::sync::Lazy;
use regex::Regex;

static ACTION_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\.([A-Za-z_][A-Za-z0-9_]*)$").expect("action pattern is valid"));

/// 模板语法错误
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TemplateError {
    #[error("template: unclosed action starting at offset {offset}")]
    Unclosed { offset: usize },

    #[error("template: empty action at offset {offset}")]
    EmptyAction { offset: usize },

    #[error("template: unsupported action `{action}` at offset {offset}, expected `.name`")]
    Unsupported { action: String, offset: usize },
}

/// 替换文本中的所有 `{{ .name }}` 占位符
///
/// 未定义的变量替换为空字符串；语法错误返回 `TemplateError`
pub fn render(template: &str, stack: &VariableStack) -> Result<String, TemplateError> {
    let mut output = String::with_capacity(template.len());
    let mut rest = template;
    let mut consumed = 0;

    while let Some(open) = rest.find("{{") {
        output.push_str(&rest[..open]);
        let offset = consumed + open;
        let after_open = &rest[open + 2..];

        let close = after_open
            .find("}}")
            .ok_or(TemplateError::Unclosed { offset })?;
        let action = after_open[..close].trim();

        if action.is_empty() {
            return Err(TemplateError::EmptyAction { offset });
        }

        let name = ACTION_REGEX
            .captures(action)
            .and_then(|caps| caps.get(1))
            .ok_or_else(|| TemplateError::Unsupported {
                action: action.to_string(),
                offset,
            })?;

        match stack.get(name.as_str()) {
            Some(value) => output.push_str(value),
            None => tracing::debug!(variable = name.as_str(), "template variable not set"),
        }

        let advance = open + 2 + close + 2;
        consumed += advance;
        rest = &rest[advance..];
    }

    output.push_str(rest);
    Ok(output)
}

/// 文本中是否含有模板占位符
pub fn has_placeholders(text: &str) -> bool {
    text.contains("{{")
}
