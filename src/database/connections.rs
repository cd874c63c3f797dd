//! Database connection detection from configuration files.
//!
//! Driver-specific patterns run in a fixed order and the first match per file
//! wins: config files are not expected to declare more than one primary
//! driver. `.env` files seed the driver from a `DB_CONNECTION`-style key
//! before secondary patterns fill in host, port, database, user, and charset.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;
use std::path::Path;

use crate::core::{DatabaseConnection, DatabaseDriver};

/// Classification of a configuration file for connection analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFileKind {
    Env,
    PhpConfig,
}

/// Recognize database configuration files by relative path.
pub fn config_file_kind(relative: &Path) -> Option<ConfigFileKind> {
    let path = relative.to_string_lossy().replace('\\', "/").to_lowercase();
    let name = path.rsplit('/').next().unwrap_or(&path);
    if name == ".env" || name == ".env.local" {
        return Some(ConfigFileKind::Env);
    }
    if path == "database.php"
        || path.ends_with("config/database.php")
        || path.ends_with("config/db.php")
    {
        return Some(ConfigFileKind::PhpConfig);
    }
    None
}

pub fn analyze_config_file(kind: ConfigFileKind, text: &str) -> Vec<DatabaseConnection> {
    match kind {
        ConfigFileKind::Env => analyze_env(text).into_iter().collect(),
        ConfigFileKind::PhpConfig => analyze_php_config(text).into_iter().collect(),
    }
}

pub fn driver_from_keyword(word: &str) -> DatabaseDriver {
    match word.to_ascii_lowercase().as_str() {
        "mysql" | "mysqli" | "mariadb" => DatabaseDriver::MySql,
        "pgsql" | "postgres" | "postgresql" => DatabaseDriver::PostgreSql,
        "sqlite" | "sqlite3" => DatabaseDriver::Sqlite,
        "mongodb" | "mongo" => DatabaseDriver::MongoDb,
        _ => DatabaseDriver::Unknown,
    }
}

/// Parse a `.env`-style file into at most one connection.
fn analyze_env(text: &str) -> Option<DatabaseConnection> {
    let mut keys: BTreeMap<&str, String> = BTreeMap::new();
    for line in text.lines() {
        let line = line.trim().trim_start_matches("export ");
        if line.starts_with('#') {
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let key = key.trim();
        if key.starts_with("DB_") {
            let value = value.trim().trim_matches(|c| c == '"' || c == '\'');
            keys.insert(key, value.to_string());
        }
    }

    let driver = keys.get("DB_CONNECTION").map(|v| driver_from_keyword(v));
    if driver.is_none() && !keys.contains_key("DB_HOST") && !keys.contains_key("DB_DATABASE") {
        return None;
    }
    let non_empty = |key: &str| keys.get(key).filter(|v| !v.is_empty()).cloned();
    Some(DatabaseConnection {
        name: "default".to_string(),
        driver: driver.unwrap_or(DatabaseDriver::Unknown),
        host: non_empty("DB_HOST"),
        port: keys.get("DB_PORT").and_then(|v| v.parse().ok()),
        database: non_empty("DB_DATABASE"),
        username: non_empty("DB_USERNAME").or_else(|| non_empty("DB_USER")),
        charset: non_empty("DB_CHARSET"),
    })
}

static NAMED_DRIVER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"['"](?P<name>\w+)['"]\s*=>\s*\[\s*['"]driver['"]\s*=>\s*['"](?P<driver>\w+)['"]"#)
        .expect("driver pattern")
});
static DRIVER_KEY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"['"]driver['"]\s*=>\s*['"](?P<driver>\w+)['"]"#).expect("driver pattern")
});
static PDO_DSN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"['"](?P<driver>mysql|pgsql|sqlite|mongodb):(?P<dsn>[^'"]*)['"]"#)
        .expect("dsn pattern")
});
static MYSQLI_CTOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"new\s+mysqli\s*\("#).expect("mysqli pattern"));
static LEGACY_MYSQL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"\bmysql_connect\s*\("#).expect("legacy pattern"));
static LEGACY_PG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"\bpg_connect\s*\("#).expect("legacy pattern"));
static MONGO_URI: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"mongodb(?:\+srv)?://"#).expect("mongo pattern"));

fn config_value(text: &str, key: &str) -> Option<String> {
    // Tolerates the Laravel `env('DB_X', 'fallback')` wrapper.
    let pattern = format!(
        r#"['"]{key}['"]\s*=>\s*(?:env\(\s*['"][A-Z_]+['"]\s*,\s*)?['"]?(?P<v>[\w./:\-]+)['"]?"#
    );
    Regex::new(&pattern)
        .ok()
        .and_then(|re| re.captures(text))
        .map(|caps| caps["v"].to_string())
}

/// Ordered driver probes over a PHP config file; first match wins.
fn analyze_php_config(text: &str) -> Option<DatabaseConnection> {
    let mut name = "default".to_string();
    let mut host = None;
    let mut port = None;
    let mut database = None;

    let driver = if let Some(caps) = NAMED_DRIVER.captures(text) {
        name = caps["name"].to_string();
        driver_from_keyword(&caps["driver"])
    } else if let Some(caps) = DRIVER_KEY.captures(text) {
        driver_from_keyword(&caps["driver"])
    } else if let Some(caps) = PDO_DSN.captures(text) {
        let dsn = caps["dsn"].to_string();
        host = dsn_field(&dsn, "host");
        port = dsn_field(&dsn, "port").and_then(|p| p.parse().ok());
        database = dsn_field(&dsn, "dbname");
        driver_from_keyword(&caps["driver"])
    } else if MYSQLI_CTOR.is_match(text) || LEGACY_MYSQL.is_match(text) {
        DatabaseDriver::MySql
    } else if LEGACY_PG.is_match(text) {
        DatabaseDriver::PostgreSql
    } else if MONGO_URI.is_match(text) {
        DatabaseDriver::MongoDb
    } else {
        return None;
    };

    Some(DatabaseConnection {
        name,
        driver,
        host: host.or_else(|| config_value(text, "host")),
        port: port.or_else(|| config_value(text, "port").and_then(|p| p.parse().ok())),
        database: database.or_else(|| config_value(text, "database")),
        username: config_value(text, "username").or_else(|| config_value(text, "user")),
        charset: config_value(text, "charset"),
    })
}

fn dsn_field(dsn: &str, field: &str) -> Option<String> {
    dsn.split(';').find_map(|pair| {
        let (key, value) = pair.split_once('=')?;
        (key.trim() == field).then(|| value.trim().to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use std::path::PathBuf;

    #[test]
    fn env_connection_seeds_driver_then_fills_fields() {
        let text = indoc! {r#"
            APP_NAME=shop
            DB_CONNECTION=mysql
            DB_HOST=localhost
            DB_PORT=3306
            DB_DATABASE=shop
            DB_USERNAME=root
            DB_CHARSET=utf8mb4
        "#};
        let conn = analyze_env(text).unwrap();
        assert_eq!(conn.driver, DatabaseDriver::MySql);
        assert_eq!(conn.host.as_deref(), Some("localhost"));
        assert_eq!(conn.port, Some(3306));
        assert_eq!(conn.database.as_deref(), Some("shop"));
        assert_eq!(conn.username.as_deref(), Some("root"));
        assert_eq!(conn.charset.as_deref(), Some("utf8mb4"));
    }

    #[test]
    fn env_without_db_keys_yields_nothing() {
        assert!(analyze_env("APP_NAME=shop\nAPP_DEBUG=true\n").is_none());
    }

    #[test]
    fn laravel_database_config_first_connection_wins() {
        let text = indoc! {r#"
            <?php
            return [
                'default' => env('DB_CONNECTION', 'mysql'),
                'connections' => [
                    'mysql' => [
                        'driver' => 'mysql',
                        'host' => env('DB_HOST', '127.0.0.1'),
                        'port' => env('DB_PORT', '3306'),
                        'database' => env('DB_DATABASE', 'forge'),
                        'username' => env('DB_USERNAME', 'forge'),
                        'charset' => 'utf8mb4',
                    ],
                    'pgsql' => [
                        'driver' => 'pgsql',
                    ],
                ],
            ];
        "#};
        let conn = analyze_php_config(text).unwrap();
        assert_eq!(conn.name, "mysql");
        assert_eq!(conn.driver, DatabaseDriver::MySql);
        assert_eq!(conn.host.as_deref(), Some("127.0.0.1"));
        assert_eq!(conn.database.as_deref(), Some("forge"));
        assert_eq!(conn.charset.as_deref(), Some("utf8mb4"));
    }

    #[test]
    fn pdo_dsn_is_parsed() {
        let text = r#"<?php $pdo = new PDO("pgsql:host=db.internal;port=5433;dbname=app", $u, $p);"#;
        let conn = analyze_php_config(text).unwrap();
        assert_eq!(conn.driver, DatabaseDriver::PostgreSql);
        assert_eq!(conn.host.as_deref(), Some("db.internal"));
        assert_eq!(conn.port, Some(5433));
        assert_eq!(conn.database.as_deref(), Some("app"));
    }

    #[test]
    fn mysqli_constructor_implies_mysql() {
        let text = "<?php $db = new mysqli('localhost', 'root', '', 'legacy');";
        let conn = analyze_php_config(text).unwrap();
        assert_eq!(conn.driver, DatabaseDriver::MySql);
    }

    #[test]
    fn config_files_are_recognized_by_path() {
        assert_eq!(
            config_file_kind(&PathBuf::from(".env")),
            Some(ConfigFileKind::Env)
        );
        assert_eq!(
            config_file_kind(&PathBuf::from("config/database.php")),
            Some(ConfigFileKind::PhpConfig)
        );
        assert_eq!(
            config_file_kind(&PathBuf::from("application/config/database.php")),
            Some(ConfigFileKind::PhpConfig)
        );
        assert_eq!(config_file_kind(&PathBuf::from("src/User.php")), None);
    }
}
