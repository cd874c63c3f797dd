//! Endpoint extraction over raw file text.
//!
//! Works independently of the structural parser: the active framework label
//! selects a pattern set, matches are normalized into canonical endpoints,
//! and group prefixes/middleware are inherited by byte-offset containment in
//! structurally scoped group bodies. Middleware and auth hints come from a
//! bounded window around each match; response format from one whole-file
//! scan.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;
use std::path::Path;

use super::groups;
use super::idioms::{self, normalize_route, ParamStyle};
use crate::common::line_of;
use crate::core::{Endpoint, FrameworkKind, HttpMethod, ResponseFormat};

/// Byte window scanned around a match for middleware/auth hints.
const HINT_WINDOW: usize = 240;
/// Forward window scanned for the handler of a Symfony attribute route.
const SYMFONY_HANDLER_WINDOW: usize = 400;

struct RawRoute {
    offset: usize,
    end: usize,
    method: HttpMethod,
    path: String,
    handler: String,
    style: ParamStyle,
}

pub struct RouteExtractor {
    framework: FrameworkKind,
}

impl RouteExtractor {
    pub fn new(framework: FrameworkKind) -> Self {
        Self { framework }
    }

    /// Extract endpoints from one file, ordered by declaration offset.
    /// Idempotent over unchanged content.
    pub fn extract(&self, file: &Path, text: &str) -> Vec<Endpoint> {
        let group_spans = groups::find_groups(text);
        let response_format = detect_response_format(text);

        let mut raw = Vec::new();
        for pattern in idioms::patterns_for(self.framework) {
            for caps in pattern.regex.captures_iter(text) {
                let whole = caps.get(0).expect("whole match");
                let path = caps.name("path").map(|p| p.as_str()).unwrap_or("");
                let method = caps
                    .name("method")
                    .map(|m| HttpMethod::from_keyword(m.as_str()))
                    .unwrap_or(HttpMethod::Any);
                raw.push(RawRoute {
                    offset: whole.start(),
                    end: whole.end(),
                    method,
                    path: path.to_string(),
                    handler: handler_from_captures(&caps),
                    style: pattern.style,
                });
            }
        }
        if self.framework == FrameworkKind::Laravel {
            collect_resources(text, &mut raw);
        }
        if self.framework == FrameworkKind::Symfony {
            collect_symfony(text, &mut raw);
        }

        raw.sort_by(|a, b| (a.offset, &a.path, a.method.as_str()).cmp(&(b.offset, &b.path, b.method.as_str())));
        raw.dedup_by(|a, b| a.offset == b.offset && a.path == b.path && a.method == b.method);

        raw.into_iter()
            .map(|route| self.build_endpoint(file, text, &group_spans, route, response_format))
            .collect()
    }

    fn build_endpoint(
        &self,
        file: &Path,
        text: &str,
        group_spans: &[groups::GroupSpan],
        route: RawRoute,
        response_format: ResponseFormat,
    ) -> Endpoint {
        let enclosing = groups::enclosing(group_spans, route.offset);

        let mut full_path = route.path.clone();
        for group in enclosing.iter().rev() {
            full_path = groups::join_prefix(&group.prefix, &full_path);
        }
        let (canonical, parameters) = normalize_route(&full_path, route.style);

        let mut middleware: BTreeSet<String> = enclosing
            .iter()
            .flat_map(|g| g.middleware.iter().cloned())
            .collect();
        middleware.extend(middleware_hints(text, route.end));

        let mut auth = middleware
            .iter()
            .find(|tag| tag.contains("auth"))
            .cloned();
        if auth.is_none() && self.framework == FrameworkKind::Symfony {
            auth = granted_role_before(text, route.offset);
        }

        Endpoint {
            method: route.method,
            route: canonical,
            handler: route.handler,
            file: file.to_path_buf(),
            line: line_of(text, route.offset),
            parameters,
            middleware,
            auth,
            response_format,
        }
    }
}

/// Char-boundary-safe window slice.
fn window_after(text: &str, from: usize, len: usize) -> &str {
    let start = from.min(text.len());
    let mut end = (from + len).min(text.len());
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[start..end]
}

fn window_before(text: &str, to: usize, len: usize) -> &str {
    let end = to.min(text.len());
    let mut start = end.saturating_sub(len);
    while !text.is_char_boundary(start) {
        start += 1;
    }
    &text[start..end]
}

static MIDDLEWARE_AFTER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"->middleware\s*\(\s*\[?(?P<list>[^)\]]*)"#).expect("middleware pattern")
});
static SLIM_ADD_AFTER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"->add\s*\(\s*\$?(?P<name>[A-Za-z_][\w\\]*)"#).expect("add pattern"));

fn middleware_hints(text: &str, match_end: usize) -> Vec<String> {
    let window = window_after(text, match_end, HINT_WINDOW);
    // Stay inside the declaration statement so a neighboring route's
    // middleware chain is never claimed.
    let window = match window.find(';') {
        Some(stop) => &window[..stop],
        None => window,
    };
    let mut tags = Vec::new();
    if let Some(caps) = MIDDLEWARE_AFTER.captures(window) {
        for item in caps["list"].split(',') {
            let tag = item.trim().trim_matches(|c| c == '\'' || c == '"');
            if !tag.is_empty() {
                tags.push(tag.to_string());
            }
        }
    }
    if let Some(caps) = SLIM_ADD_AFTER.captures(window) {
        let name = caps["name"].rsplit('\\').next().unwrap_or("").to_string();
        if !name.is_empty() {
            tags.push(name);
        }
    }
    tags
}

static IS_GRANTED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"IsGranted\s*\(\s*['"](?P<role>[^'"]+)"#).expect("granted pattern"));

fn granted_role_before(text: &str, offset: usize) -> Option<String> {
    let window = window_before(text, offset, HINT_WINDOW);
    // Attributes between the previous body and this route; a `}` marks the
    // end of the previous method, so anything before it belongs elsewhere.
    let window = match window.rfind('}') {
        Some(stop) => &window[stop + 1..],
        None => window,
    };
    IS_GRANTED
        .captures(window)
        .map(|caps| caps["role"].to_string())
}

fn handler_from_captures(caps: &regex::Captures) -> String {
    if let (Some(class), Some(action)) = (caps.name("class"), caps.name("action")) {
        return format!("{}.{}", short_class(class.as_str()), action.as_str());
    }
    if let Some(handler) = caps.name("handler") {
        return normalize_handler(handler.as_str());
    }
    "{closure}".to_string()
}

fn short_class(name: &str) -> &str {
    name.rsplit('\\').next().unwrap_or(name)
}

/// `App\Controllers\Users::show/$1`, `UserController@show`, and
/// `HomeController:index` all become `Class.action`.
fn normalize_handler(raw: &str) -> String {
    let raw = raw.trim_start_matches('\\');
    let raw = raw.split('/').next().unwrap_or(raw);
    let normalized = raw.replace("::", ".").replace(['@', ':'], ".");
    match normalized.rsplit_once('.') {
        Some((class, action)) => format!("{}.{}", short_class(class), action),
        None => normalized,
    }
}

/// Laravel `Route::resource` shorthand expands into the five conventional
/// endpoints.
fn collect_resources(text: &str, raw: &mut Vec<RawRoute>) {
    const ACTIONS: &[(&str, HttpMethod, &str)] = &[
        ("index", HttpMethod::Get, ""),
        ("store", HttpMethod::Post, ""),
        ("show", HttpMethod::Get, "/{id}"),
        ("update", HttpMethod::Put, "/{id}"),
        ("destroy", HttpMethod::Delete, "/{id}"),
    ];
    for caps in idioms::LARAVEL_RESOURCE_PATTERN.captures_iter(text) {
        let whole = caps.get(0).expect("whole match");
        let base = caps.name("path").map(|p| p.as_str()).unwrap_or("");
        let class = caps.name("class").map(|c| c.as_str()).unwrap_or("");
        let base = format!("/{}", base.trim_matches('/'));
        for (action, method, suffix) in ACTIONS {
            raw.push(RawRoute {
                offset: whole.start(),
                end: whole.end(),
                method: *method,
                path: format!("{base}{suffix}"),
                handler: format!("{}.{}", short_class(class), action),
                style: ParamStyle::Braced,
            });
        }
    }
}

static SYMFONY_METHODS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"methods\s*[:=]\s*[\[{](?P<list>[^\]}]*)[\]}]"#).expect("methods pattern")
});
static NEXT_FUNCTION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"\b(?P<kw>class|function)\s+(?P<name>\w+)"#).expect("decl pattern"));
static FIRST_CLASS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"\bclass\s+(?P<name>\w+)"#).expect("class pattern"));

/// Symfony attribute/annotation routes. A class-level `#[Route]` acts as a
/// prefix for every method route in the file.
fn collect_symfony(text: &str, raw: &mut Vec<RawRoute>) {
    let class_name = FIRST_CLASS
        .captures(text)
        .map(|caps| caps["name"].to_string());

    let mut class_prefix = String::new();
    let mut routes = Vec::new();
    for pattern in idioms::SYMFONY_PATTERNS {
        for caps in pattern.captures_iter(text) {
            let whole = caps.get(0).expect("whole match");
            let path = caps.name("path").map(|p| p.as_str()).unwrap_or("");
            let rest = caps.name("rest").map(|r| r.as_str()).unwrap_or("");

            let window = window_after(text, whole.end(), SYMFONY_HANDLER_WINDOW);
            match NEXT_FUNCTION.captures(window) {
                Some(decl) if &decl["kw"] == "class" => {
                    // Class-level route: remember the prefix, emit nothing.
                    class_prefix = path.trim_matches('/').to_string();
                }
                Some(decl) => {
                    let action = decl["name"].to_string();
                    let handler = match &class_name {
                        Some(class) => format!("{class}.{action}"),
                        None => action,
                    };
                    routes.push((whole.start(), whole.end(), path.to_string(), rest.to_string(), handler));
                }
                None => {}
            }
        }
    }

    for (offset, end, path, rest, handler) in routes {
        let methods = symfony_methods(&rest);
        let full = if class_prefix.is_empty() {
            path.clone()
        } else {
            groups::join_prefix(&class_prefix, &path)
        };
        for method in methods {
            raw.push(RawRoute {
                offset,
                end,
                method,
                path: full.clone(),
                handler: handler.clone(),
                style: ParamStyle::Braced,
            });
        }
    }
}

fn symfony_methods(rest: &str) -> Vec<HttpMethod> {
    let Some(caps) = SYMFONY_METHODS.captures(rest) else {
        return vec![HttpMethod::Any];
    };
    let methods: Vec<HttpMethod> = caps["list"]
        .split(',')
        .map(|m| m.trim().trim_matches(|c| c == '\'' || c == '"'))
        .filter(|m| !m.is_empty())
        .map(HttpMethod::from_keyword)
        .collect();
    if methods.is_empty() {
        vec![HttpMethod::Any]
    } else {
        methods
    }
}

static JSON_HINTS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"json_encode\s*\(|->json\s*\(|JsonResponse|Content-Type:\s*application/json|->toJson\s*\("#,
    )
    .expect("json pattern")
});
static HTML_HINTS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"\breturn\s+view\s*\(|->render\s*\(|->view\s*\(|\$twig->|\.phtml"#)
        .expect("html pattern")
});

/// One whole-file scan; JSON indicators win over template indicators.
pub fn detect_response_format(text: &str) -> ResponseFormat {
    if JSON_HINTS.is_match(text) {
        ResponseFormat::Json
    } else if HTML_HINTS.is_match(text) {
        ResponseFormat::Html
    } else {
        ResponseFormat::Unknown
    }
}
