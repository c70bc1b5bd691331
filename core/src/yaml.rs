//! Thin helpers over `serde_yaml::Value` for the handful of fields the gate reads.

use serde::Deserialize;
use serde_yaml::Value;

/// Parse every document in a multi-document YAML stream. Empty documents are dropped.
pub fn parse_documents(content: &str) -> Result<Vec<Value>, serde_yaml::Error> {
    let mut docs = Vec::new();
    for de in serde_yaml::Deserializer::from_str(content) {
        let value = Value::deserialize(de)?;
        if !value.is_null() {
            docs.push(value);
        }
    }
    Ok(docs)
}

/// Walk a dotted path (`a.b.c`) through nested mappings.
pub fn lookup<'a>(value: &'a Value, dotted: &str) -> Option<&'a Value> {
    dotted
        .split('.')
        .try_fold(value, |cur, key| cur.as_mapping()?.get(key))
}

pub fn str_at<'a>(value: &'a Value, dotted: &str) -> Option<&'a str> {
    lookup(value, dotted)?.as_str()
}

/// 1-based line of the first line containing `needle`.
pub fn line_of(content: &str, needle: &str) -> Option<usize> {
    content
        .lines()
        .position(|l| l.contains(needle))
        .map(|i| i + 1)
}

/// 1-based line where a dotted key path is declared, following indentation.
///
/// Good enough for block-style YAML; flow mappings are not tracked.
pub fn line_of_path(content: &str, dotted: &str) -> Option<usize> {
    let lines: Vec<&str> = content.lines().collect();
    let mut start = 0usize;
    let mut parent_indent: Option<usize> = None;
    let mut found = None;

    for key in dotted.split('.') {
        let prefix = format!("{key}:");
        let mut hit = None;
        for (i, line) in lines.iter().enumerate().skip(start) {
            let trimmed = line.trim_start();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            let indent = line.len() - trimmed.len();
            match parent_indent {
                Some(p) if indent <= p => break,
                None if indent > 0 => continue,
                _ => {}
            }
            if trimmed.starts_with(&prefix) {
                hit = Some((i, indent));
                break;
            }
        }
        let (i, indent) = hit?;
        start = i + 1;
        parent_indent = Some(indent);
        found = Some(i + 1);
    }
    found
}
