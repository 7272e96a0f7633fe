//! Attribute tracking context for the by-tree feed
//!
//! `.gitattributes` files mark which paths carry pointers (`filter=lode`).
//! The tree walk threads a stack of attribute scopes down the traversal so
//! each entry can be asked "should this have been a pointer?".

use glob::Pattern;
use std::rc::Rc;

/// The attribute value that marks a path as pointer-carrying.
pub const TRACK_ATTRIBUTE: &str = "filter=lode";

#[derive(Debug)]
struct AttrRule {
    pattern: Pattern,
    anchored: bool,
    tracked: bool,
}

#[derive(Debug)]
struct AttrScope {
    /// Directory the attribute file lives in, relative to the repo root
    /// ("" for the root).
    base: String,
    rules: Vec<AttrRule>,
}

/// Immutable stack of attribute scopes, shallowest first.
///
/// Cloning is cheap (scopes are reference-counted), so each subtree of the
/// walk carries its own view of the stack.
#[derive(Debug, Clone, Default)]
pub struct AttrStack {
    scopes: Vec<Rc<AttrScope>>,
}

impl AttrStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Extend the stack with the rules of an attribute file found at `base`.
    pub fn push(&self, base: &str, content: &[u8]) -> AttrStack {
        let rules = parse_rules(content);
        if rules.is_empty() {
            return self.clone();
        }
        let mut scopes = self.scopes.clone();
        scopes.push(Rc::new(AttrScope {
            base: base.to_string(),
            rules,
        }));
        AttrStack { scopes }
    }

    /// Whether a repository-relative path is marked as pointer-carrying.
    ///
    /// Scopes are consulted shallowest-first and rules in file order, so the
    /// last (deepest) matching rule wins, matching gitattributes precedence.
    pub fn tracked(&self, path: &str) -> bool {
        let mut tracked = false;
        for scope in &self.scopes {
            let rel = match scope.base.as_str() {
                "" => path,
                base => match path.strip_prefix(base).and_then(|r| r.strip_prefix('/')) {
                    Some(rel) => rel,
                    None => continue,
                },
            };
            for rule in &scope.rules {
                let matched = if rule.anchored {
                    rule.pattern.matches(rel)
                } else {
                    rel.rsplit('/')
                        .next()
                        .is_some_and(|base| rule.pattern.matches(base))
                };
                if matched {
                    tracked = rule.tracked;
                }
            }
        }
        tracked
    }
}

fn parse_rules(content: &[u8]) -> Vec<AttrRule> {
    let Ok(text) = std::str::from_utf8(content) else {
        return Vec::new();
    };
    let mut rules = Vec::new();
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with('[') {
            continue;
        }
        let mut fields = line.split_whitespace();
        let Some(raw_pattern) = fields.next() else {
            continue;
        };
        let tracked = match attr_state(fields) {
            Some(state) => state,
            None => continue,
        };
        if let Ok(pattern) = Pattern::new(raw_pattern.trim_start_matches('/')) {
            rules.push(AttrRule {
                pattern,
                anchored: raw_pattern.trim_start_matches('/').contains('/')
                    || raw_pattern.starts_with('/'),
                tracked,
            });
        }
    }
    rules
}

/// The tracking state a rule's attribute list assigns, if any.
fn attr_state<'a>(attrs: impl Iterator<Item = &'a str>) -> Option<bool> {
    let mut state = None;
    for attr in attrs {
        if attr == TRACK_ATTRIBUTE {
            state = Some(true);
        } else if attr == "-filter" || attr == "!filter" || attr.starts_with("filter=") {
            state = Some(false);
        }
    }
    state
}
