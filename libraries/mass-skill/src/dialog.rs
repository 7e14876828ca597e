//! Spoken response templates.

use rand::seq::SliceRandom;
use std::collections::{BTreeMap, HashMap};

/// Values substituted into `{slot}` placeholders.
pub type DialogData = BTreeMap<String, String>;

/// Dialog templates keyed by dialog name.
///
/// Each dialog has one or more alternative phrasings; rendering picks one
/// at random so repeated commands don't always sound the same.
#[derive(Debug, Clone, Default)]
pub struct Dialogs {
    templates: HashMap<String, Vec<String>>,
}

impl Dialogs {
    /// Build from `name -> file contents`. One template per line; blank
    /// lines and `#` comments are ignored.
    pub fn from_sources(sources: &BTreeMap<String, String>) -> Self {
        let templates = sources
            .iter()
            .map(|(name, text)| (name.clone(), parse_lines(text)))
            .filter(|(_, lines)| !lines.is_empty())
            .collect();
        Self { templates }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.templates.contains_key(name)
    }

    /// Render a dialog. Unknown dialogs are spoken as their name.
    pub fn render(&self, name: &str, data: &DialogData) -> String {
        let Some(options) = self.templates.get(name) else {
            return name.replace('_', " ");
        };
        let template = options
            .choose(&mut rand::thread_rng())
            .map(String::as_str)
            .unwrap_or_default();
        fill(template, data)
    }
}

fn parse_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

/// Substitute `{key}` placeholders; missing keys become empty.
fn fill(template: &str, data: &DialogData) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        match after.find('}') {
            Some(end) => {
                let key = after[..end].trim();
                if let Some(value) = data.get(key) {
                    out.push_str(value);
                }
                rest = &after[end + 1..];
            }
            None => {
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);

    out.split_whitespace().collect::<Vec<_>>().join(" ")
}
