use std::collections::HashMap;

/// Body template with `{field}` placeholders.
///
/// `{{` and `}}` render as literal braces. A placeholder whose field is not in
/// the map is left as written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    source: String,
}

impl Template {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
        }
    }

    pub fn render(&self, fields: &HashMap<&str, &str>) -> String {
        let mut out = String::with_capacity(self.source.len());
        let mut rest = self.source.as_str();

        while let Some(pos) = rest.find(['{', '}']) {
            out.push_str(&rest[..pos]);
            let tail = &rest[pos..];

            if let Some(after) = tail.strip_prefix("{{") {
                out.push('{');
                rest = after;
                continue;
            }
            if let Some(after) = tail.strip_prefix("}}") {
                out.push('}');
                rest = after;
                continue;
            }
            // A placeholder ends at the first `}` with no `{` in between.
            if tail.starts_with('{') {
                if let Some(end) = tail[1..].find(['{', '}']).map(|i| i + 1) {
                    if tail.as_bytes()[end] == b'}' {
                        match fields.get(&tail[1..end]) {
                            Some(value) => out.push_str(value),
                            None => out.push_str(&tail[..=end]),
                        }
                        rest = &tail[end + 1..];
                        continue;
                    }
                }
            }

            out.push_str(&tail[..1]);
            rest = &tail[1..];
        }

        out.push_str(rest);
        out
    }
}

impl From<&str> for Template {
    fn from(source: &str) -> Self {
        Self::new(source)
    }
}

impl From<String> for Template {
    fn from(source: String) -> Self {
        Self::new(source)
    }
}
