use colored::Colorize;
use itertools::Itertools;
use serde::Serialize;
use serde_json::Value;

use crate::pagination::{PageButton, PageResult};
use crate::resource::ResourceKind;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "text" | "txt" => Some(Self::Text),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct PageReport {
    pub resource: ResourceKind,
    pub items: Vec<Value>,
    pub pagination: PageResult,
    pub showing: (u64, u64),
    pub pages: Vec<PageButton>,
}

const LABEL_FIELDS: [&str; 4] = ["title", "name", "_id", "id"];
const DATE_FIELDS: [&str; 3] = ["createdAt", "updatedAt", "dueDate"];

fn field_text(record: &Value, fields: &[&str]) -> Option<String> {
    fields.iter().find_map(|f| match record.get(*f)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

pub fn record_label(record: &Value) -> String {
    field_text(record, &LABEL_FIELDS).unwrap_or_else(|| record.to_string())
}

fn render_pager(report: &PageReport) -> String {
    report
        .pages
        .iter()
        .map(|b| match b {
            PageButton::Page(n) if *n == report.pagination.page => {
                format!("[{n}]").bold().to_string()
            }
            other => other.to_string(),
        })
        .join(" ")
}

pub fn render_text(report: &PageReport) -> Vec<u8> {
    let mut out = String::new();
    if report.items.is_empty() {
        out.push_str(&format!("no {} found\n", report.resource));
    }
    for (idx, record) in report.items.iter().enumerate() {
        let position = report.showing.0 + idx as u64;
        out.push_str(&format!("{:>4}. {}", position, record_label(record)));
        if let Some(date) = field_text(record, &DATE_FIELDS) {
            out.push_str(&format!("  ({})", date.dimmed()));
        }
        out.push('\n');
    }
    out.push('\n');
    out.push_str(&format!(
        ":: Showing {} to {} of {} {} ::\n",
        report.showing.0, report.showing.1, report.pagination.total, report.resource
    ));
    if report.pagination.page_count > 1 {
        out.push_str(&format!(":: Pages   : {}\n", render_pager(report)));
    }
    out.into_bytes()
}

pub fn render_json(report: &PageReport) -> Vec<u8> {
    serde_json::to_vec_pretty(report).unwrap_or_else(|_| b"{}\n".to_vec())
}

pub fn render(report: &PageReport, format: OutputFormat) -> Vec<u8> {
    match format {
        OutputFormat::Text => render_text(report),
        OutputFormat::Json => render_json(report),
    }
}
