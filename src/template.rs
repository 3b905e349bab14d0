// Import necessary crates and modules
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashMap;

// The placeholder regex is compiled once and shared by every template in the
// process, since template construction happens for each registered resource.
lazy_static! {
    static ref PLACEHOLDER: Regex = Regex::new(r"\{([A-Za-z_][A-Za-z0-9_]*)\}").unwrap();
}

/// A URI template with named placeholders, e.g. `/{context_id}/lineitems/{item_id}/lineitem`.
///
/// Each resource binds one template. The template matches request paths segment by
/// segment; a placeholder captures exactly one non-empty path segment, so a path with
/// a missing parameter simply does not match.
///
/// Fields are private; use `parse` to extract parameters from a path and `expand` to
/// build a concrete path from parameter values.
#[derive(Debug, Clone)]
pub struct UriTemplate {
    template: String,
    names: Vec<String>,
    matcher: Regex,
}

impl UriTemplate {
    /// Compiles a template string into a matcher.
    ///
    /// Placeholders take the form `{name}` and match one path segment. Everything
    /// outside a placeholder is matched literally.
    pub fn new(template: &str) -> UriTemplate {
        let mut names = Vec::new();
        let mut pattern = String::from("^");
        let mut last = 0;
        for captures in PLACEHOLDER.captures_iter(template) {
            let whole = captures.get(0).unwrap();
            pattern.push_str(&regex::escape(&template[last..whole.start()]));
            pattern.push_str("([^/]+)");
            names.push(captures[1].to_string());
            last = whole.end();
        }
        pattern.push_str(&regex::escape(&template[last..]));
        pattern.push('$');

        UriTemplate {
            template: template.to_string(),
            names,
            // The pattern is assembled from escaped literals and a fixed group, so
            // compilation cannot fail for any template accepted above.
            matcher: Regex::new(&pattern).unwrap(),
        }
    }

    /// Returns the original template string.
    pub fn as_str(&self) -> &str {
        &self.template
    }

    /// Returns the placeholder names in template order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// True if the path matches this template exactly.
    pub fn matches(&self, path: &str) -> bool {
        self.matcher.is_match(path)
    }

    /// Parses a request path against the template.
    ///
    /// Returns:
    /// - `Some(map)` with one entry per placeholder when the path matches.
    /// - `None` when the path does not match the template.
    pub fn parse(&self, path: &str) -> Option<HashMap<String, String>> {
        let captures = self.matcher.captures(path)?;
        let mut params = HashMap::new();
        for (index, name) in self.names.iter().enumerate() {
            params.insert(name.clone(), captures[index + 1].to_string());
        }
        Some(params)
    }

    /// Expands the template with concrete parameter values.
    ///
    /// Returns `None` if any placeholder has no value in `params`.
    pub fn expand(&self, params: &HashMap<String, String>) -> Option<String> {
        let mut path = self.template.clone();
        for name in &self.names {
            let value = params.get(name)?;
            path = path.replace(&format!("{{{}}}", name), value);
        }
        Some(path)
    }
}
