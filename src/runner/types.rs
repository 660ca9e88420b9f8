use crate::http::{Method, Response};
use crate::variable::CaptureOutcome;
use std::collections::BTreeMap;
use std::time::Duration;

/// 单个已执行步骤的结果
#[derive(Debug, Clone)]
pub struct StepResult {
    /// 步骤序号（从 1 开始）
    pub step: usize,

    pub method: Method,

    /// 替换变量后的 URL
    pub url: String,

    /// 响应状态码
    pub status: u16,

    /// 期望的状态码（如果脚本中声明）
    pub expected_status: Option<u16>,

    /// 请求耗时，不含等待时间
    pub duration: Duration,

    /// 捕获结果，按脚本顺序
    pub captures: Vec<CaptureOutcome>,
}

impl StepResult {
    pub fn new(step: usize, method: Method, url: String, response: &Response) -> Self {
        Self {
            step,
            method,
            url,
            status: response.status.code(),
            expected_status: None,
            duration: response.duration,
            captures: Vec::new(),
        }
    }

    /// 状态码与期望一致，或没有声明期望
    pub fn status_matches(&self) -> bool {
        self.expected_status
            .is_none_or(|expected| expected == self.status)
    }

    pub fn failed_captures(&self) -> usize {
        self.captures.iter().filter(|c| c.is_failed()).count()
    }
}

/// 一次完整运行的报告
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    pub steps: Vec<StepResult>,

    /// 运行结束时的变量表
    pub variables: BTreeMap<String, String>,
}

impl RunReport {
    pub fn total_duration(&self) -> Duration {
        self.steps.iter().map(|s| s.duration).sum()
    }

    pub fn capture_warnings(&self) -> usize {
        self.steps.iter().map(StepResult::failed_captures).sum()
    }
}
