//! Query occurrence classification over source text.
//!
//! Every occurrence is classified into raw SQL, prepared statement, or ORM
//! call by pattern family, extracting a table name when the pattern allows
//! it. Literals already claimed by a prepared/raw call site are not counted
//! again by the bare-literal fallback.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;
use std::path::Path;

use crate::common::{line_of, pluralize, snake_case};
use crate::core::{OrmKind, QueryOccurrence, QueryStyle};

/// Facade-style class names that look like Eloquent models but are not.
const NON_MODEL_STATICS: &[&str] = &[
    "DB", "Route", "Schema", "Auth", "Cache", "Log", "Storage", "Validator", "Hash", "Session",
    "Config", "App", "Arr", "Str", "Carbon", "Http", "Mail", "Queue", "Event", "Gate",
];

/// Per-file ORM usage tallies, merged across files to pick the project label.
#[derive(Debug, Default, Clone, Copy)]
pub struct OrmSignals {
    pub eloquent: usize,
    pub doctrine: usize,
    pub codeigniter: usize,
}

impl OrmSignals {
    pub fn merge(&mut self, other: OrmSignals) {
        self.eloquent += other.eloquent;
        self.doctrine += other.doctrine;
        self.codeigniter += other.codeigniter;
    }

    /// Strongest signal wins; ties break toward the more specific ORM.
    pub fn label(&self) -> Option<OrmKind> {
        let best = self.eloquent.max(self.doctrine).max(self.codeigniter);
        if best == 0 {
            return None;
        }
        if self.eloquent == best {
            Some(OrmKind::Eloquent)
        } else if self.doctrine == best {
            Some(OrmKind::Doctrine)
        } else {
            Some(OrmKind::CodeIgniterBuilder)
        }
    }
}

static ELOQUENT_STATIC: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"\b(?P<model>[A-Z]\w*)::(?:where|find|findOrFail|all|create|first|firstOrCreate|firstWhere|with|orderBy|pluck|query|updateOrCreate|destroy)\s*\("#,
    )
    .expect("query pattern")
});
static DB_TABLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"\bDB::table\s*\(\s*['"](?P<table>\w+)['"]"#).expect("query pattern")
});
static CI_BUILDER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"\$this->db->(?:get|get_where|from|insert|update|delete|where)\s*\(\s*['"](?P<table>\w+)['"]"#,
    )
    .expect("query pattern")
});
static DOCTRINE_REPO: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"->getRepository\s*\(\s*(?P<entity>[A-Za-z_][\w\\]*)::class"#)
        .expect("query pattern")
});

static PREPARE_CALL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"->prepare\s*\(\s*['"](?P<sql>[^'"]+)['"]"#).expect("query pattern")
});
static RAW_CALLS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?:->(?:query|exec)|mysqli_query\s*\([^,'"]*,|\b(?:mysql_query|pg_query|sqlite_query))\s*\(?\s*['"](?P<sql>[^'"]+)['"]"#,
    )
    .expect("query pattern")
});
static BARE_SQL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"['"](?P<sql>\s*(?i:SELECT|INSERT|UPDATE|DELETE)\b[^'"]*)['"]"#)
        .expect("query pattern")
});

static SQL_TABLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)\b(?:FROM|INSERT\s+INTO|UPDATE|DELETE\s+FROM|JOIN)\s+[`"]?(?P<table>[A-Za-z_]\w*)"#)
        .expect("query pattern")
});

static ELOQUENT_IMPORT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"Illuminate\\Database\\Eloquent|extends\s+(?:Model|Authenticatable)\b"#)
        .expect("orm pattern")
});
static DOCTRINE_IMPORT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"Doctrine\\ORM|@ORM\\|#\[ORM\\"#).expect("orm pattern")
});
static CI_DB_USE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"\$this->db->\w+"#).expect("orm pattern"));

/// Table name referenced by one SQL string, when recognizable.
pub fn table_from_sql(sql: &str) -> Option<String> {
    SQL_TABLE
        .captures(sql)
        .map(|caps| caps["table"].to_lowercase())
}

/// Eloquent convention: `UserProfile` model maps to `user_profiles`.
pub fn model_table_name(model: &str) -> String {
    pluralize(&snake_case(model))
}

/// Classify every query occurrence in one source file.
pub fn scan_queries(path: &Path, text: &str) -> (Vec<QueryOccurrence>, OrmSignals) {
    let mut occurrences = Vec::new();
    let mut claimed: BTreeSet<usize> = BTreeSet::new();
    let mut signals = OrmSignals::default();

    for caps in ELOQUENT_STATIC.captures_iter(text) {
        let model = &caps["model"];
        if NON_MODEL_STATICS.contains(&model) {
            continue;
        }
        signals.eloquent += 1;
        occurrences.push(QueryOccurrence {
            file: path.to_path_buf(),
            line: line_of(text, caps.get(0).expect("match").start()),
            style: QueryStyle::Orm,
            table: Some(model_table_name(model)),
        });
    }
    for caps in DB_TABLE.captures_iter(text) {
        signals.eloquent += 1;
        occurrences.push(QueryOccurrence {
            file: path.to_path_buf(),
            line: line_of(text, caps.get(0).expect("match").start()),
            style: QueryStyle::Orm,
            table: Some(caps["table"].to_lowercase()),
        });
    }
    for caps in CI_BUILDER.captures_iter(text) {
        signals.codeigniter += 1;
        occurrences.push(QueryOccurrence {
            file: path.to_path_buf(),
            line: line_of(text, caps.get(0).expect("match").start()),
            style: QueryStyle::Orm,
            table: Some(caps["table"].to_lowercase()),
        });
    }
    for caps in DOCTRINE_REPO.captures_iter(text) {
        signals.doctrine += 1;
        let entity = caps["entity"].rsplit('\\').next().unwrap_or("").to_string();
        occurrences.push(QueryOccurrence {
            file: path.to_path_buf(),
            line: line_of(text, caps.get(0).expect("match").start()),
            style: QueryStyle::Orm,
            table: (!entity.is_empty()).then(|| snake_case(&entity)),
        });
    }

    for caps in PREPARE_CALL.captures_iter(text) {
        let sql = caps.name("sql").expect("sql group");
        claimed.insert(sql.start());
        occurrences.push(QueryOccurrence {
            file: path.to_path_buf(),
            line: line_of(text, caps.get(0).expect("match").start()),
            style: QueryStyle::Prepared,
            table: table_from_sql(sql.as_str()),
        });
    }
    for caps in RAW_CALLS.captures_iter(text) {
        let sql = caps.name("sql").expect("sql group");
        claimed.insert(sql.start());
        occurrences.push(QueryOccurrence {
            file: path.to_path_buf(),
            line: line_of(text, caps.get(0).expect("match").start()),
            style: QueryStyle::RawSql,
            table: table_from_sql(sql.as_str()),
        });
    }
    // Bare SQL literals not attached to a recognized call site.
    for caps in BARE_SQL.captures_iter(text) {
        let sql = caps.name("sql").expect("sql group");
        if claimed.contains(&sql.start()) {
            continue;
        }
        occurrences.push(QueryOccurrence {
            file: path.to_path_buf(),
            line: line_of(text, caps.get(0).expect("match").start()),
            style: QueryStyle::RawSql,
            table: table_from_sql(sql.as_str()),
        });
    }

    if ELOQUENT_IMPORT.is_match(text) {
        signals.eloquent += 1;
    }
    if DOCTRINE_IMPORT.is_match(text) {
        signals.doctrine += 1;
    }
    if CI_DB_USE.is_match(text) {
        signals.codeigniter += 1;
    }

    occurrences.sort_by(|a, b| (a.line, a.style as u8).cmp(&(b.line, b.style as u8)));
    (occurrences, signals)
}
