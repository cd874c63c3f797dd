//! Model-class and migration scanning.
//!
//! Model discovery pairs the structural symbol table (which class extends
//! which base) with targeted content patterns for the parts symbols do not
//! carry: `$table` overrides, `$fillable` column lists, relationship calls,
//! and ORM column attributes. Relationship inference is heuristic keyword
//! matching and only ever appends one-way free-text descriptors.

use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;

use crate::common::{block_span, snake_case};
use crate::core::{ColumnHint, FileSymbols, Symbol};
use crate::database::queries::model_table_name;

/// One model class resolved to its table, with whatever hints were nearby.
#[derive(Debug, Clone)]
pub struct ModelHit {
    pub class: String,
    pub table: String,
    pub columns: Vec<ColumnHint>,
    pub relationships: Vec<String>,
}

/// One column learned from a schema migration.
#[derive(Debug, Clone)]
pub struct MigrationColumn {
    pub table: String,
    pub name: String,
    pub data_type: String,
}

const ELOQUENT_BASES: &[&str] = &["Model", "Eloquent", "Authenticatable", "Pivot"];

static TABLE_OVERRIDE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"protected\s+\$table\s*=\s*['"](?P<table>\w+)['"]"#).expect("model pattern")
});
static FILLABLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"protected\s+\$fillable\s*=\s*\[(?P<list>[^\]]*)\]"#).expect("model pattern")
});
static RELATIONSHIP_CALL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"->(?P<verb>hasMany|hasOne|belongsTo|belongsToMany|morphMany|morphOne|morphTo)\s*\(\s*(?P<target>[A-Za-z_][\w\\]*)::class"#,
    )
    .expect("model pattern")
});
static DOCTRINE_ENTITY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"#\[ORM\\Entity|@ORM\\Entity"#).expect("model pattern"));
static DOCTRINE_TABLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"ORM\\Table\s*\(\s*(?:name\s*[:=]\s*)?['"](?P<table>\w+)['"]"#)
        .expect("model pattern")
});
static DOCTRINE_COLUMN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"ORM\\Column(?P<args>\([^)]*\))?\]?\s*(?:(?:private|protected|public)\s+)?(?:\?\s*)?(?:[\w\\|]+\s+)?\$(?P<prop>\w+)"#,
    )
    .expect("model pattern")
});
static COLUMN_TYPE_ARG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"type\s*[:=]\s*["'](?P<ty>\w+)"#).expect("model pattern")
});

/// Discover model classes in one parsed file.
pub fn scan_models(symbols: &FileSymbols, text: &str) -> Vec<ModelHit> {
    let mut hits = Vec::new();
    let is_doctrine_file = DOCTRINE_ENTITY.is_match(text);

    for symbol in &symbols.symbols {
        let Symbol::Class(class) = symbol else {
            continue;
        };
        let extends_eloquent = class
            .extends
            .as_deref()
            .map(|base| {
                let base = base.rsplit('\\').next().unwrap_or(base);
                ELOQUENT_BASES.contains(&base)
            })
            .unwrap_or(false);

        if extends_eloquent {
            let table = TABLE_OVERRIDE
                .captures(text)
                .map(|caps| caps["table"].to_lowercase())
                .unwrap_or_else(|| model_table_name(&class.name));
            let columns = FILLABLE
                .captures(text)
                .map(|caps| {
                    caps["list"]
                        .split(',')
                        .map(|item| item.trim().trim_matches(|c| c == '\'' || c == '"'))
                        .filter(|item| !item.is_empty())
                        .map(|name| ColumnHint {
                            name: name.to_string(),
                            data_type: None,
                        })
                        .collect()
                })
                .unwrap_or_default();
            let relationships = RELATIONSHIP_CALL
                .captures_iter(text)
                .map(|caps| {
                    let target = caps["target"].rsplit('\\').next().unwrap_or("").to_string();
                    format!("{} {} {}", class.name, &caps["verb"], target)
                })
                .collect();
            hits.push(ModelHit {
                class: class.name.clone(),
                table,
                columns,
                relationships,
            });
        } else if is_doctrine_file {
            let table = DOCTRINE_TABLE
                .captures(text)
                .map(|caps| caps["table"].to_lowercase())
                .unwrap_or_else(|| snake_case(&class.name));
            let columns = DOCTRINE_COLUMN
                .captures_iter(text)
                .map(|caps| {
                    let data_type = caps
                        .name("args")
                        .and_then(|args| COLUMN_TYPE_ARG.captures(args.as_str()))
                        .map(|c| c["ty"].to_string());
                    ColumnHint {
                        name: snake_case(&caps["prop"]),
                        data_type,
                    }
                })
                .collect();
            hits.push(ModelHit {
                class: class.name.clone(),
                table,
                columns,
                relationships: Vec::new(),
            });
        }
    }
    hits
}

static SCHEMA_CREATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"Schema::create\s*\(\s*['"](?P<table>\w+)['"]\s*,\s*(?:static\s+)?function\b"#)
        .expect("migration pattern")
});
static TABLE_COLUMN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"\$table->(?P<ty>\w+)\s*\(\s*['"](?P<name>\w+)['"]"#).expect("migration pattern")
});

/// Column modifiers that are not column types.
const NON_COLUMN_CALLS: &[&str] = &["index", "unique", "foreign", "dropColumn", "primary"];

/// Harvest column hints from Laravel-style schema migrations. Each
/// `Schema::create` body is scoped structurally so columns never leak into a
/// neighboring table definition.
pub fn scan_migration(_path: &Path, text: &str) -> Vec<MigrationColumn> {
    let mut columns = Vec::new();
    for caps in SCHEMA_CREATE.captures_iter(text) {
        let table = caps["table"].to_lowercase();
        let whole = caps.get(0).expect("whole match");
        let Some(body) = block_span(text, whole.end()) else {
            continue;
        };
        for col in TABLE_COLUMN.captures_iter(&text[body]) {
            let ty = &col["ty"];
            if NON_COLUMN_CALLS.contains(&ty) {
                continue;
            }
            columns.push(MigrationColumn {
                table: table.clone(),
                name: col["name"].to_string(),
                data_type: ty.to_string(),
            });
        }
    }
    columns
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse_symbols;
    use indoc::indoc;
    use std::path::PathBuf;

    fn models_of(text: &str) -> Vec<ModelHit> {
        let (symbols, _) = parse_symbols(&PathBuf::from("app/Models/M.php"), text);
        scan_models(&symbols, text)
    }

    #[test]
    fn eloquent_model_uses_convention_table() {
        let text = indoc! {r#"
            <?php
            namespace App\Models;

            use Illuminate\Database\Eloquent\Model;

            class OrderItem extends Model
            {
                protected $fillable = ['order_id', 'sku', 'quantity'];

                public function order()
                {
                    return $this->belongsTo(Order::class);
                }
            }
        "#};
        let hits = models_of(text);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].class, "OrderItem");
        assert_eq!(hits[0].table, "order_items");
        let names: Vec<_> = hits[0].columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["order_id", "sku", "quantity"]);
        assert_eq!(hits[0].relationships, vec!["OrderItem belongsTo Order"]);
    }

    #[test]
    fn table_override_wins_over_convention() {
        let text = indoc! {r#"
            <?php
            class Person extends Model
            {
                protected $table = 'people';
            }
        "#};
        let hits = models_of(text);
        assert_eq!(hits[0].table, "people");
    }

    #[test]
    fn doctrine_entity_columns_carry_types() {
        let text = indoc! {r#"
            <?php
            use Doctrine\ORM\Mapping as ORM;

            #[ORM\Entity]
            #[ORM\Table(name: 'customers')]
            class Customer
            {
                #[ORM\Column(type: 'integer')]
                private int $id;

                #[ORM\Column(type: 'string', length: 180)]
                private string $email;
            }
        "#};
        let hits = models_of(text);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].table, "customers");
        assert_eq!(hits[0].columns.len(), 2);
        assert_eq!(hits[0].columns[0].name, "id");
        assert_eq!(hits[0].columns[0].data_type.as_deref(), Some("integer"));
        assert_eq!(hits[0].columns[1].name, "email");
        assert_eq!(hits[0].columns[1].data_type.as_deref(), Some("string"));
    }

    #[test]
    fn plain_classes_are_not_models() {
        assert!(models_of("<?php class Helper {}").is_empty());
    }

    #[test]
    fn migration_columns_are_scoped_per_table() {
        let text = indoc! {r#"
            <?php
            Schema::create('users', function (Blueprint $table) {
                $table->id();
                $table->string('name');
                $table->string('email')->unique();
                $table->timestamps();
            });
            Schema::create('posts', function (Blueprint $table) {
                $table->text('body');
            });
        "#};
        let columns = scan_migration(&PathBuf::from("database/migrations/m.php"), text);
        let users: Vec<_> = columns
            .iter()
            .filter(|c| c.table == "users")
            .map(|c| c.name.as_str())
            .collect();
        assert!(users.contains(&"name"));
        assert!(users.contains(&"email"));
        let posts: Vec<_> = columns.iter().filter(|c| c.table == "posts").collect();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].name, "body");
        assert_eq!(posts[0].data_type, "text");
    }
}
