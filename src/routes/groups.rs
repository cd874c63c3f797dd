//! Route-group scoping.
//!
//! Group boundaries are found structurally: from each group declaration we
//! locate the closure's opening brace and match it by depth with a scanner
//! that skips strings and comments. Endpoints are associated to groups by
//! byte-offset containment, never by searching for line text.

use once_cell::sync::Lazy;
use regex::Regex;
use std::ops::Range;

pub use crate::common::block_span;

/// One enclosing route group: inherited prefix and middleware plus the byte
/// span of its closure body.
#[derive(Debug, Clone)]
pub struct GroupSpan {
    pub prefix: String,
    pub middleware: Vec<String>,
    pub body: Range<usize>,
}

static LARAVEL_ARRAY_GROUP: Lazy<Regex> = Lazy::new(|| {
    // The attribute array may nest one level (a middleware list).
    Regex::new(
        r#"Route::group\s*\(\s*\[(?P<attrs>(?:[^\[\]]|\[[^\]]*\])*)\]\s*,\s*(?:static\s+)?function\b"#,
    )
    .expect("group pattern")
});

static LARAVEL_FLUENT_GROUP: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"Route::(?:prefix|middleware|name|domain)\s*\((?P<head>[^;{]*?)->group\s*\(\s*(?:static\s+)?function\b"#)
        .expect("group pattern")
});

static SLIM_GROUP: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"\$(?:app|group)->group\s*\(\s*['"](?P<prefix>[^'"]*)['"]\s*,\s*(?:static\s+)?function\b"#)
        .expect("group pattern")
});

static PREFIX_ATTR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"['"]prefix['"]\s*=>\s*['"]([^'"]*)['"]"#).expect("attr pattern"));
static MIDDLEWARE_ATTR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"['"]middleware['"]\s*=>\s*(?:\[(?P<list>[^\]]*)\]|['"](?P<one>[^'"]*)['"])"#)
        .expect("attr pattern")
});
static PREFIX_CALL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"prefix\s*\(\s*['"]([^'"]*)['"]"#).expect("attr pattern"));
static MIDDLEWARE_CALL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"middleware\s*\(\s*\[?(?P<list>[^)\]]*)"#).expect("attr pattern")
});

/// Collect every route group declared in `text`, with structural body spans.
pub fn find_groups(text: &str) -> Vec<GroupSpan> {
    let mut groups = Vec::new();

    for caps in LARAVEL_ARRAY_GROUP.captures_iter(text) {
        let m = caps.get(0).expect("whole match");
        let attrs = caps.name("attrs").map(|a| a.as_str()).unwrap_or("");
        let prefix = PREFIX_ATTR
            .captures(attrs)
            .map(|c| c[1].to_string())
            .unwrap_or_default();
        let middleware = MIDDLEWARE_ATTR
            .captures(attrs)
            .map(|c| {
                c.name("list")
                    .map(|l| split_quoted_list(l.as_str()))
                    .or_else(|| c.name("one").map(|o| vec![o.as_str().to_string()]))
                    .unwrap_or_default()
            })
            .unwrap_or_default();
        if let Some(body) = block_span(text, m.end()) {
            groups.push(GroupSpan {
                prefix,
                middleware,
                body,
            });
        }
    }

    for caps in LARAVEL_FLUENT_GROUP.captures_iter(text) {
        let m = caps.get(0).expect("whole match");
        let head = m.as_str();
        let prefix = PREFIX_CALL
            .captures(head)
            .map(|c| c[1].to_string())
            .unwrap_or_default();
        let middleware = MIDDLEWARE_CALL
            .captures(head)
            .and_then(|c| c.name("list"))
            .map(|l| split_quoted_list(l.as_str()))
            .unwrap_or_default();
        if let Some(body) = block_span(text, m.end()) {
            groups.push(GroupSpan {
                prefix,
                middleware,
                body,
            });
        }
    }

    for caps in SLIM_GROUP.captures_iter(text) {
        let m = caps.get(0).expect("whole match");
        let prefix = caps.name("prefix").map(|p| p.as_str().to_string()).unwrap_or_default();
        if let Some(body) = block_span(text, m.end()) {
            groups.push(GroupSpan {
                prefix,
                middleware: Vec::new(),
                body,
            });
        }
    }

    groups.sort_by_key(|g| g.body.start);
    groups
}

/// Groups containing `offset`, outermost first.
pub fn enclosing<'a>(groups: &'a [GroupSpan], offset: usize) -> Vec<&'a GroupSpan> {
    groups
        .iter()
        .filter(|g| g.body.contains(&offset))
        .collect()
}

/// Join a group prefix onto a route, normalizing slashes.
pub fn join_prefix(prefix: &str, route: &str) -> String {
    let prefix = prefix.trim_matches('/');
    if prefix.is_empty() {
        return route.to_string();
    }
    let route = route.trim_start_matches('/');
    if route.is_empty() {
        format!("/{prefix}")
    } else {
        format!("/{prefix}/{route}")
    }
}

fn split_quoted_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(|item| item.trim().trim_matches(|c| c == '\'' || c == '"').to_string())
        .filter(|item| !item.is_empty())
        .collect()
}
