//! Compiled route-declaration patterns, one set per framework idiom.
//!
//! Every idiom gets multiple alternative syntaxes. Patterns capture with the
//! shared group names `method`, `path`, `class`, `action`, and `handler` so
//! the extractor can consume them uniformly.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::core::FrameworkKind;

/// Parameter delimiter style a pattern set declares routes with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamStyle {
    /// `{id}`, `{id?}`, `{id<\d+>}`
    Braced,
    /// `:id` (plus braced, for mixed custom routers)
    Colon,
    /// `(:num)`, `(:any)`, raw `(\d+)` capture groups
    CiSegment,
}

pub struct RoutePattern {
    pub regex: &'static Lazy<Regex>,
    pub style: ParamStyle,
}

macro_rules! route_regex {
    ($name:ident, $pattern:expr) => {
        static $name: Lazy<Regex> = Lazy::new(|| Regex::new($pattern).expect("route pattern"));
    };
}

route_regex!(
    LARAVEL_CLASS_ARRAY,
    r#"Route::(?P<method>get|post|put|patch|delete|any)\s*\(\s*['"](?P<path>[^'"]*)['"]\s*,\s*\[\s*(?P<class>[A-Za-z_][A-Za-z0-9_\\]*)::class\s*,\s*['"](?P<action>\w+)['"]"#
);
route_regex!(
    LARAVEL_AT_STRING,
    r#"Route::(?P<method>get|post|put|patch|delete|any)\s*\(\s*['"](?P<path>[^'"]*)['"]\s*,\s*['"](?P<handler>[A-Za-z_][\w\\]*@\w+)['"]"#
);
route_regex!(
    LARAVEL_CLOSURE,
    r#"Route::(?P<method>get|post|put|patch|delete|any)\s*\(\s*['"](?P<path>[^'"]*)['"]\s*,\s*(?:static\s+)?(?:function|fn)\b"#
);
route_regex!(
    LARAVEL_RESOURCE,
    r#"Route::(?:api)?[rR]esource\s*\(\s*['"](?P<path>[^'"]*)['"]\s*,\s*(?P<class>[A-Za-z_][A-Za-z0-9_\\]*)::class"#
);

route_regex!(
    SLIM_STRING_HANDLER,
    r#"\$(?:app|group|this)\s*->\s*(?P<method>get|post|put|patch|delete|any|map)\s*\(\s*['"](?P<path>[^'"]*)['"]\s*,\s*['"](?P<handler>[A-Za-z_][\w\\:@]*)['"]"#
);
route_regex!(
    SLIM_CLASS_ARRAY,
    r#"\$(?:app|group|this)\s*->\s*(?P<method>get|post|put|patch|delete|any|map)\s*\(\s*['"](?P<path>[^'"]*)['"]\s*,\s*\[\s*(?P<class>[A-Za-z_][A-Za-z0-9_\\]*)::class\s*,\s*['"](?P<action>\w+)['"]"#
);
route_regex!(
    SLIM_CLOSURE,
    r#"\$(?:app|group|this)\s*->\s*(?P<method>get|post|put|patch|delete|any|map)\s*\(\s*['"](?P<path>[^'"]*)['"]\s*,\s*(?:static\s+)?function\b"#
);

route_regex!(
    CI_ROUTES_CALL,
    r#"\$routes->(?P<method>get|post|put|patch|delete|add)\s*\(\s*['"](?P<path>[^'"]*)['"]\s*,\s*['"](?P<handler>[^'"]+)['"]"#
);
route_regex!(
    CI_ROUTE_ARRAY,
    r#"\$route\[['"](?P<path>[^'"]+)['"]\]\s*=\s*['"](?P<handler>[^'"]+)['"]"#
);

route_regex!(
    GENERIC_VERB_CALL,
    r#"\$\w+\s*->\s*(?P<method>get|post|put|patch|delete)\s*\(\s*['"](?P<path>[^'"]*)['"](?:\s*,\s*['"](?P<handler>[\w\\:@.]+)['"])?"#
);
route_regex!(
    GENERIC_ADD_ROUTE,
    r#"(?i)(?:add_?route|->map)\s*\(\s*['"](?P<method>GET|POST|PUT|PATCH|DELETE)['"]\s*,\s*['"](?P<path>[^'"]*)['"](?:\s*,\s*['"](?P<handler>[^'"]+)['"])?"#
);

/// Symfony PHP 8 attribute; `rest` carries the remaining attribute arguments
/// (methods list, name, requirements).
route_regex!(
    SYMFONY_ATTRIBUTE,
    // `rest` tolerates one nested bracket level for the methods list.
    r#"#\[Route\(\s*(?:path\s*:\s*)?['"](?P<path>[^'"]*)['"](?P<rest>(?:[^\[\]]|\[[^\]]*\])*)\]"#
);
/// Symfony docblock annotation.
route_regex!(
    SYMFONY_ANNOTATION,
    r#"@Route\(\s*['"](?P<path>[^'"]*)['"](?P<rest>[^)]*)\)"#
);

pub static SYMFONY_PATTERNS: &[&Lazy<Regex>] = &[&SYMFONY_ATTRIBUTE, &SYMFONY_ANNOTATION];

pub static LARAVEL_RESOURCE_PATTERN: &Lazy<Regex> = &LARAVEL_RESOURCE;

static LARAVEL_SET: Lazy<Vec<RoutePattern>> = Lazy::new(|| {
    vec![
        RoutePattern {
            regex: &LARAVEL_CLASS_ARRAY,
            style: ParamStyle::Braced,
        },
        RoutePattern {
            regex: &LARAVEL_AT_STRING,
            style: ParamStyle::Braced,
        },
        RoutePattern {
            regex: &LARAVEL_CLOSURE,
            style: ParamStyle::Braced,
        },
    ]
});

static SLIM_SET: Lazy<Vec<RoutePattern>> = Lazy::new(|| {
    vec![
        RoutePattern {
            regex: &SLIM_CLASS_ARRAY,
            style: ParamStyle::Braced,
        },
        RoutePattern {
            regex: &SLIM_STRING_HANDLER,
            style: ParamStyle::Braced,
        },
        RoutePattern {
            regex: &SLIM_CLOSURE,
            style: ParamStyle::Braced,
        },
    ]
});

static CI_SET: Lazy<Vec<RoutePattern>> = Lazy::new(|| {
    vec![
        RoutePattern {
            regex: &CI_ROUTES_CALL,
            style: ParamStyle::CiSegment,
        },
        RoutePattern {
            regex: &CI_ROUTE_ARRAY,
            style: ParamStyle::CiSegment,
        },
    ]
});

static GENERIC_SET: Lazy<Vec<RoutePattern>> = Lazy::new(|| {
    vec![
        RoutePattern {
            regex: &GENERIC_ADD_ROUTE,
            style: ParamStyle::Colon,
        },
        RoutePattern {
            regex: &GENERIC_VERB_CALL,
            style: ParamStyle::Colon,
        },
    ]
});

/// The pattern set active for one framework label. Symfony attribute routes
/// are handled separately because the handler lives outside the match.
pub fn patterns_for(kind: FrameworkKind) -> &'static [RoutePattern] {
    match kind {
        FrameworkKind::Laravel => LARAVEL_SET.as_slice(),
        FrameworkKind::Slim => SLIM_SET.as_slice(),
        FrameworkKind::CodeIgniter => CI_SET.as_slice(),
        FrameworkKind::Symfony => &[],
        FrameworkKind::CustomMvc | FrameworkKind::CustomWithComposer | FrameworkKind::Vanilla => {
            GENERIC_SET.as_slice()
        }
    }
}

/// Normalize one declared path into the canonical `{name}` delimiter form,
/// returning the rewritten route and its ordered parameter names.
pub fn normalize_route(path: &str, style: ParamStyle) -> (String, Vec<String>) {
    let mut route = path.to_string();

    if style == ParamStyle::CiSegment {
        // `(:num)` placeholders and raw capture groups become ordinal names.
        static SEGMENT: Lazy<Regex> =
            Lazy::new(|| Regex::new(r"\((?::\w+|[^()]*)\)").expect("segment pattern"));
        let mut ordinal = 0usize;
        route = SEGMENT
            .replace_all(&route, |_: &regex::Captures| {
                ordinal += 1;
                format!("{{arg{ordinal}}}")
            })
            .into_owned();
    }
    if style == ParamStyle::Colon {
        static COLON: Lazy<Regex> =
            Lazy::new(|| Regex::new(r":(\w+)").expect("colon pattern"));
        route = COLON.replace_all(&route, "{$1}").into_owned();
    }

    // Braced parameters may carry optional markers or requirements:
    // `{id?}`, `{id<\d+>}`. Canonicalize to the bare name.
    static BRACED: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"\{\s*(\w+)[^}]*\}").expect("braced pattern"));
    let mut parameters = Vec::new();
    route = BRACED
        .replace_all(&route, |caps: &regex::Captures| {
            let name = caps[1].to_string();
            let replacement = format!("{{{name}}}");
            parameters.push(name);
            replacement
        })
        .into_owned();

    if !route.starts_with('/') {
        route.insert(0, '/');
    }
    (route, parameters)
}
