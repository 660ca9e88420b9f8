use crate::http::Response;
use crate::runner::types::{RunReport, StepResult};
use crate::utils::{OutputOptions, ResponseFormatter};
use crate::variable::CaptureOutcome;
use colored::Colorize;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, Color, Table};
use std::io::Write;

/// 控制台输出
pub struct Reporter {
    formatter: ResponseFormatter,
    enabled: bool,
}

impl Reporter {
    pub fn new(options: OutputOptions) -> Self {
        Self {
            formatter: ResponseFormatter::new(options),
            enabled: true,
        }
    }

    /// 不产生任何输出，用于嵌入和测试
    pub fn silent() -> Self {
        Self {
            formatter: ResponseFormatter::new(OutputOptions::default()),
            enabled: false,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn print_response(&self, response: &Response) {
        if self.enabled {
            println!("{}", self.formatter.format(response));
        }
    }

    pub fn print_capture_warnings(&self, step: usize, outcomes: &[CaptureOutcome]) {
        if !self.enabled {
            return;
        }
        for outcome in outcomes {
            if let CaptureOutcome::Failed { name, error } = outcome {
                eprintln!(
                    "{} step {}: capture `{}`: {}",
                    "warning:".yellow().bold(),
                    step,
                    name,
                    error
                );
            }
        }
    }

    /// 等待动画的一帧，写到 stderr
    pub fn print_spinner(&self, frame: char) {
        if self.enabled {
            let mut stderr = std::io::stderr();
            let _ = write!(stderr, "\r{} {}", frame, "waiting...".dimmed());
            let _ = stderr.flush();
        }
    }

    pub fn clear_spinner(&self) {
        if self.enabled {
            let mut stderr = std::io::stderr();
            let _ = write!(stderr, "\r{}\r", " ".repeat(16));
            let _ = stderr.flush();
        }
    }

    pub fn print_summary(&self, report: &RunReport) {
        if !self.enabled {
            return;
        }

        println!("{}", summary_table(report));

        let warnings = report.capture_warnings();
        let line = format!(
            "{} step(s) in {:.3}s",
            report.steps.len(),
            report.total_duration().as_secs_f64()
        );
        if warnings > 0 {
            println!(
                "{}, {}",
                line.bold(),
                format!("{} capture warning(s)", warnings).yellow()
            );
        } else {
            println!("{}", line.bold());
        }
    }
}

/// 汇总表：序号、方法、URL、状态、耗时
pub fn summary_table(report: &RunReport) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_header(vec!["Step", "Method", "URL", "Status", "Time"]);

    for step in &report.steps {
        table.add_row(vec![
            Cell::new(step.step),
            Cell::new(step.method),
            Cell::new(&step.url).add_attribute(Attribute::Dim),
            status_cell(step),
            Cell::new(format!("{}ms", step.duration.as_millis())),
        ]);
    }

    table
}

fn status_cell(step: &StepResult) -> Cell {
    let color = if !step.status_matches() || step.status >= 400 {
        Color::Red
    } else {
        Color::Green
    };

    match step.expected_status {
        Some(expected) if expected != step.status => {
            Cell::new(format!("{} (expected {})", step.status, expected)).fg(color)
        }
        _ => Cell::new(step.status).fg(color),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::Method;
    use reqwest::header::HeaderMap;
    use std::time::Duration;

    #[test]
    fn test_summary_table_rows() {
        let response =
            Response::new(200, HeaderMap::new(), String::new(), Duration::from_millis(12))
                .unwrap();
        let mut second = StepResult::new(2, Method::Post, "http://api/users".to_string(), &response);
        second.expected_status = Some(201);

        let report = RunReport {
            steps: vec![
                StepResult::new(1, Method::Get, "http://api/health".to_string(), &response),
                second,
            ],
            ..Default::default()
        };

        let rendered = summary_table(&report).to_string();
        assert!(rendered.contains("http://api/health"));
        assert!(rendered.contains("POST"));
        assert!(rendered.contains("200 (expected 201)"));
        assert!(rendered.contains("12ms"));
    }
}
