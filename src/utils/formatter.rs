use crate::http::Response;
use colored::*;

/// 响应输出选项
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OutputOptions {
    /// 原样输出 body，不做 JSON 美化
    pub raw: bool,
    /// 输出所有响应头
    pub show_headers: bool,
    /// 不输出状态行和 trace id
    pub quiet: bool,
}

pub struct ResponseFormatter {
    options: OutputOptions,
    color: bool,
}

impl ResponseFormatter {
    pub fn new(options: OutputOptions) -> Self {
        Self {
            options,
            color: true,
        }
    }

    /// 关闭颜色，便于比较输出
    pub fn without_color(mut self) -> Self {
        self.color = false;
        self
    }

    pub fn format(&self, response: &Response) -> String {
        let mut output = Vec::new();

        if !self.options.quiet {
            let status_line = format!("HTTP {}", response.status);
            if self.color {
                output.push(status_line.cyan().bold().to_string());
            } else {
                output.push(status_line);
            }

            if let Some(trace_id) = response.trace_id() {
                output.push(format!("X-B3-Traceid: {}", trace_id));
            }
        }

        if self.options.show_headers {
            for (key, value) in response.headers.iter() {
                let value_str = value.to_str().unwrap_or("<invalid utf-8>");
                let line = format!("{}: {}", key, value_str);
                if self.color {
                    output.push(line.blue().to_string());
                } else {
                    output.push(line);
                }
            }
        }

        output.push(self.format_body(&response.body));
        // 每个响应后留一个空行
        output.push(String::new());

        output.join("\n")
    }

    /// JSON body 美化输出，非 JSON 或 raw 模式原样返回
    pub fn format_body(&self, body: &str) -> String {
        if self.options.raw {
            return body.to_string();
        }
        try_format_json(body).unwrap_or_else(|_| body.to_string())
    }
}

/// 尝试将 body 格式化为漂亮的 JSON
fn try_format_json(body: &str) -> serde_json::Result<String> {
    let value: serde_json::Value = serde_json::from_str(body)?;
    serde_json::to_string_pretty(&value)
}
