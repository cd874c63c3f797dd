//! Directory purpose tagging.
//!
//! A directory's own name is matched against keyword tables first; the full
//! relative path is the fallback for names that are uninformative on their
//! own. Patterns are ordered from most specific to most general.

use std::path::Path;

use crate::core::{DirectoryPurpose, FrameworkKind};

/// Keyword table: any of these names maps to the purpose.
const PURPOSE_KEYWORDS: &[(DirectoryPurpose, &[&str])] = &[
    (DirectoryPurpose::Controller, &["controllers", "controller", "actions", "handlers"]),
    (DirectoryPurpose::Model, &["models", "model", "entities", "entity"]),
    (
        DirectoryPurpose::View,
        &["views", "view", "templates", "template", "pages", "partials", "layouts"],
    ),
    (DirectoryPurpose::Config, &["config", "configs", "settings"]),
    (DirectoryPurpose::Routes, &["routes", "routing"]),
    (DirectoryPurpose::Migration, &["migrations", "migration", "schema"]),
    (DirectoryPurpose::Middleware, &["middleware", "middlewares", "filters"]),
    (DirectoryPurpose::Service, &["services", "service", "usecases", "jobs"]),
    (DirectoryPurpose::Repository, &["repositories", "repository", "dao", "gateways"]),
    (DirectoryPurpose::Test, &["tests", "test", "spec", "specs"]),
    (
        DirectoryPurpose::Asset,
        &["public", "assets", "static", "css", "js", "images", "img", "fonts"],
    ),
    (DirectoryPurpose::Storage, &["storage", "cache", "logs", "tmp", "uploads"]),
    (DirectoryPurpose::Helper, &["helpers", "helper", "utils", "util", "support", "lib"]),
];

/// Infer one directory's purpose from its name, falling back to the full
/// relative path, e.g. `app/Http/Controllers`.
pub fn classify_purpose(relative: &Path) -> Option<DirectoryPurpose> {
    let path = relative.to_string_lossy().replace('\\', "/").to_lowercase();
    let name = path.rsplit('/').next().unwrap_or(&path);

    for (purpose, keywords) in PURPOSE_KEYWORDS {
        if keywords.contains(&name) {
            return Some(*purpose);
        }
    }
    // Path fallback: a keyword anywhere along the path claims uninformative
    // leaf names such as `app/Http/Controllers/Admin`.
    for (purpose, keywords) in PURPOSE_KEYWORDS {
        for keyword in *keywords {
            if path.contains(&format!("/{keyword}/")) || path.starts_with(&format!("{keyword}/")) {
                return Some(*purpose);
            }
        }
    }
    None
}

/// Name the directory's role within the detected framework, when it has one.
pub fn framework_role(relative: &Path, framework: FrameworkKind) -> Option<String> {
    let path = relative.to_string_lossy().replace('\\', "/").to_lowercase();
    let role = match framework {
        FrameworkKind::Laravel => match path.as_str() {
            "app" => "application code",
            "app/http" => "http layer",
            "app/http/controllers" => "http controllers",
            "app/http/middleware" => "http middleware",
            "app/models" => "eloquent models",
            "app/providers" => "service providers",
            "routes" => "route definitions",
            "database/migrations" => "schema migrations",
            "resources/views" => "blade templates",
            _ => return None,
        },
        FrameworkKind::Symfony => match path.as_str() {
            "src/controller" => "controllers",
            "src/entity" => "doctrine entities",
            "src/repository" => "doctrine repositories",
            "config/packages" => "bundle configuration",
            "templates" => "twig templates",
            _ => return None,
        },
        FrameworkKind::CodeIgniter => match path.as_str() {
            "app/controllers" | "application/controllers" => "controllers",
            "app/models" | "application/models" => "models",
            "app/views" | "application/views" => "views",
            "system" => "framework runtime",
            _ => return None,
        },
        _ => return None,
    };
    Some(role.to_string())
}
