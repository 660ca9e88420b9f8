use crate::auth::TokenProvider;
use crate::http::{Client, Request};
use crate::parser::{ParsedScript, RequestDescriptor};
use crate::runner::reporter::Reporter;
use crate::runner::types::{RunReport, StepResult};
use crate::variable::{CaptureOutcome, TemplateError, VariableStack, apply_captures, render};
use crate::{ReqchainError, Result};
use std::time::Duration;

const SPINNER_FRAMES: [char; 10] = ['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];
const SPINNER_INTERVAL: Duration = Duration::from_millis(80);

/// 按顺序执行脚本中的请求
pub struct ScriptExecutor<P> {
    client: Client,
    provider: P,
    reporter: Reporter,
}

impl<P: TokenProvider> ScriptExecutor<P> {
    pub fn new(client: Client, provider: P, reporter: Reporter) -> Self {
        Self {
            client,
            provider,
            reporter,
        }
    }

    pub fn reporter(&self) -> &Reporter {
        &self.reporter
    }

    /// 认证一次，然后逐个执行步骤；任何致命错误立即停止
    pub async fn run(&self, script: &ParsedScript) -> Result<RunReport> {
        let token = self.provider.token().await?;
        tracing::debug!("authenticated");

        let mut stack = VariableStack::new();
        let mut report = RunReport::default();

        for (index, descriptor) in script.requests.iter().enumerate() {
            let step = index + 1;
            let result = self.execute_step(step, descriptor, &token, &mut stack).await?;
            report.steps.push(result);

            if let Some(millis) = descriptor.wait_millis.filter(|ms| *ms > 0) {
                tracing::debug!(step, millis, "waiting");
                self.wait(Duration::from_millis(millis)).await;
            }
        }

        report.variables = stack
            .sorted()
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Ok(report)
    }

    async fn execute_step(
        &self,
        step: usize,
        descriptor: &RequestDescriptor,
        token: &str,
        stack: &mut VariableStack,
    ) -> Result<StepResult> {
        let uuid = stack.refresh_uuid();
        let request = build_request(step, descriptor, token, stack)?;
        let url = request.url.to_string();
        tracing::debug!(step, method = %descriptor.method, url = %url, uuid = %uuid, "sending request");

        let response = self.client.execute(request).await?;
        tracing::debug!(
            step,
            status = response.status.code(),
            elapsed_ms = response.duration.as_millis() as u64,
            "received response"
        );
        self.reporter.print_response(&response);

        let mut result = StepResult::new(step, descriptor.method, url, &response);
        result.expected_status = descriptor.expected_status;

        if let Some(expected) = descriptor.expected_status {
            if expected != result.status {
                return Err(ReqchainError::StatusMismatch {
                    step,
                    expected,
                    actual: result.status,
                });
            }
        }

        result.captures = apply_captures(&descriptor.captures, &response.body, stack);
        for outcome in &result.captures {
            match outcome {
                CaptureOutcome::Set { name, value } => {
                    tracing::debug!(step, variable = %name, value = %value, "captured")
                }
                CaptureOutcome::NoValue { name } => {
                    tracing::debug!(step, variable = %name, "capture produced no value")
                }
                CaptureOutcome::Failed { name, error } => {
                    tracing::warn!(step, variable = %name, error = %error, "capture failed")
                }
            }
        }
        self.reporter.print_capture_warnings(step, &result.captures);

        Ok(result)
    }

    async fn wait(&self, duration: Duration) {
        let sleep = tokio::time::sleep(duration);
        tokio::pin!(sleep);

        if !self.reporter.is_enabled() {
            sleep.await;
            return;
        }

        let mut ticker = tokio::time::interval(SPINNER_INTERVAL);
        let mut frames = SPINNER_FRAMES.iter().cycle();
        loop {
            tokio::select! {
                _ = &mut sleep => break,
                _ = ticker.tick() => {
                    if let Some(frame) = frames.next() {
                        self.reporter.print_spinner(*frame);
                    }
                }
            }
        }
        self.reporter.clear_spinner();
    }
}

/// 替换变量并组装请求；默认 header 在前，脚本中的 header 追加在后
fn build_request(
    step: usize,
    descriptor: &RequestDescriptor,
    token: &str,
    stack: &VariableStack,
) -> Result<Request> {
    let template = |source: TemplateError| ReqchainError::Template { step, source };

    let url = render(&descriptor.url, stack).map_err(template)?;
    let mut request = Request::new(descriptor.method, &url)?
        .with_header("Content-Type", "application/json")?
        .with_auth_bearer(token)?;

    for (name, value) in &descriptor.headers {
        let name = render(name, stack).map_err(template)?;
        let value = render(value, stack).map_err(template)?;
        request = request.with_header(&name, &value)?;
    }

    if let Some(body) = &descriptor.body {
        let json = serde_json::to_string(body)?;
        request = request.with_json_text(render(&json, stack).map_err(template)?);
    }

    Ok(request)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::Method;
    use serde_json::json;

    #[test]
    fn test_build_request_substitutes_variables() {
        let mut stack = VariableStack::new();
        stack.insert("id", "42");
        stack.insert("name", "Alice");

        let mut descriptor = RequestDescriptor::new(Method::Post, "http://api/users/{{ .id }}", 1);
        descriptor.headers.push(("X-User".to_string(), "{{.name}}".to_string()));
        descriptor.headers.push(("X-User".to_string(), "second".to_string()));
        descriptor.body = Some(json!({"name": "{{ .name }}", "age": 3}));

        let request = build_request(1, &descriptor, "tok", &stack).unwrap();

        assert_eq!(request.url.as_str(), "http://api/users/42");
        assert_eq!(request.header_values("x-user"), vec!["Alice", "second"]);
        assert_eq!(request.header_values("authorization"), vec!["Bearer tok"]);
        assert_eq!(request.header_values("content-type"), vec!["application/json"]);
        assert_eq!(request.body.as_deref(), Some(r#"{"name":"Alice","age":3}"#));
    }

    #[test]
    fn test_build_request_template_error_is_fatal() {
        let descriptor = RequestDescriptor::new(Method::Get, "http://api/{{ .id", 1);
        let result = build_request(3, &descriptor, "tok", &VariableStack::new());
        assert!(matches!(result, Err(ReqchainError::Template { step: 3, .. })));
    }
}
