//! Structural source parsing: lexer, recursive-descent pass, and lowering
//! into the symbol table of the data model.

pub mod ast;
pub mod lexer;
pub mod parser;

use std::path::Path;

use crate::core::{
    AnalysisWarning, ClassSymbol, ConstantSymbol, FileSymbols, FunctionSymbol, NamespaceSymbol,
    PropertySymbol, Symbol, UseSymbol,
};

/// Parse one file's text into its symbol table.
///
/// Total over the file boundary: malformed input yields a partial (possibly
/// empty) symbol list plus warnings, never an error.
pub fn parse_symbols(path: &Path, text: &str) -> (FileSymbols, Vec<AnalysisWarning>) {
    let stream = lexer::lex(text);
    let tree = parser::parse(&stream);

    let mut warnings = Vec::new();
    for gap in tree.gaps() {
        warnings.push(AnalysisWarning::for_file(
            path,
            format!("malformed syntax at line {}: {}", gap.line, gap.reason),
        ));
    }
    let partial = !warnings.is_empty();

    let mut symbols = Vec::new();
    for item in tree.items {
        match item {
            ast::Item::Namespace { name, line } => {
                symbols.push(Symbol::Namespace(NamespaceSymbol { name, line }));
            }
            ast::Item::Use {
                target,
                alias,
                line,
            } => {
                symbols.push(Symbol::Use(UseSymbol {
                    target,
                    alias,
                    line,
                }));
            }
            ast::Item::Class(decl) => symbols.push(Symbol::Class(lower_class(decl))),
            ast::Item::Function(decl) => {
                if !decl.name.is_empty() {
                    symbols.push(Symbol::Function(lower_function(decl)));
                }
            }
            ast::Item::Constant { name, value, line } => {
                symbols.push(Symbol::Constant(ConstantSymbol { name, value, line }));
            }
            ast::Item::Error(_) => {}
        }
    }

    (
        FileSymbols {
            path: path.to_path_buf(),
            symbols,
            partial,
        },
        warnings,
    )
}

fn lower_class(decl: ast::ClassDecl) -> ClassSymbol {
    ClassSymbol {
        name: decl.name,
        kind: decl.kind,
        extends: decl.extends,
        implements: decl.implements,
        trait_uses: decl.trait_uses,
        constants: decl
            .constants
            .into_iter()
            .map(|c| ConstantSymbol {
                name: c.name,
                value: c.value,
                line: c.line,
            })
            .collect(),
        properties: decl
            .properties
            .into_iter()
            .map(|p| PropertySymbol {
                name: p.name,
                visibility: p.visibility,
                is_static: p.is_static,
                line: p.line,
            })
            .collect(),
        methods: decl
            .methods
            .into_iter()
            .filter(|m| !m.name.is_empty())
            .map(lower_function)
            .collect(),
        line: decl.line,
        doc: decl.doc,
    }
}

fn lower_function(decl: ast::FunctionDecl) -> FunctionSymbol {
    FunctionSymbol {
        name: decl.name,
        parameters: decl.parameters,
        visibility: decl.visibility,
        is_static: decl.is_static,
        is_abstract: decl.is_abstract,
        line: decl.line,
        doc: decl.doc,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{ClassKind, Visibility};
    use indoc::indoc;
    use std::path::PathBuf;

    fn symbols_of(src: &str) -> FileSymbols {
        parse_symbols(&PathBuf::from("test.php"), src).0
    }

    fn first_class(file: &FileSymbols) -> &ClassSymbol {
        file.symbols
            .iter()
            .find_map(|s| match s {
                Symbol::Class(c) => Some(c),
                _ => None,
            })
            .expect("expected a class symbol")
    }

    #[test]
    fn extracts_namespace_uses_and_class() {
        let src = indoc! {r#"
            <?php
            namespace App\Http\Controllers;

            use App\Models\User;
            use Illuminate\Http\Request as HttpRequest;

            class UserController extends Controller implements Loggable
            {
                const VERSION = '1.2';
                protected static $instances = [];

                /**
                 * Show one user.
                 */
                public function show($id, Request $request)
                {
                    return User::find($id);
                }

                private function helper() {}
            }
        "#};
        let file = symbols_of(src);
        assert!(!file.partial);

        assert!(matches!(
            &file.symbols[0],
            Symbol::Namespace(ns) if ns.name == "App\\Http\\Controllers"
        ));
        assert!(matches!(
            &file.symbols[1],
            Symbol::Use(u) if u.target == "App\\Models\\User" && u.alias.is_none()
        ));
        assert!(matches!(
            &file.symbols[2],
            Symbol::Use(u) if u.alias.as_deref() == Some("HttpRequest")
        ));

        let class = first_class(&file);
        assert_eq!(class.name, "UserController");
        assert_eq!(class.kind, ClassKind::Class);
        assert_eq!(class.extends.as_deref(), Some("Controller"));
        assert_eq!(class.implements, vec!["Loggable".to_string()]);
        assert_eq!(class.constants[0].name, "VERSION");
        assert_eq!(class.constants[0].value.as_deref(), Some("'1.2'"));
        assert_eq!(class.properties[0].name, "instances");
        assert!(class.properties[0].is_static);
        assert_eq!(class.methods.len(), 2);

        let show = &class.methods[0];
        assert_eq!(show.name, "show");
        assert_eq!(show.parameters, vec!["id".to_string(), "request".to_string()]);
        assert_eq!(show.visibility, Visibility::Public);
        assert_eq!(show.doc.as_deref(), Some("Show one user."));
        assert_eq!(class.methods[1].visibility, Visibility::Private);
    }

    #[test]
    fn defaults_are_stripped_from_parameters() {
        let src = "<?php function greet($name = 'world', array $extra = [1, 2], ...$rest) {}";
        let file = symbols_of(src);
        match &file.symbols[0] {
            Symbol::Function(f) => {
                assert_eq!(f.parameters, vec!["name", "extra", "rest"]);
            }
            other => panic!("expected function, got {other:?}"),
        }
    }

    #[test]
    fn methods_are_not_double_counted_as_free_functions() {
        let src = indoc! {r#"
            <?php
            class A {
                public function inner() {}
            }
            function outer() {}
        "#};
        let file = symbols_of(src);
        let free: Vec<_> = file
            .symbols
            .iter()
            .filter_map(|s| match s {
                Symbol::Function(f) => Some(f.name.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(free, vec!["outer"]);
    }

    #[test]
    fn closures_do_not_produce_function_symbols() {
        let src = "<?php $f = function ($x) { return $x; }; function named() {}";
        let file = symbols_of(src);
        let names: Vec<_> = file
            .symbols
            .iter()
            .filter_map(|s| match s {
                Symbol::Function(f) => Some(f.name.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(names, vec!["named"]);
    }

    #[test]
    fn unterminated_class_body_degrades_to_partial_symbols() {
        let src = indoc! {r#"
            <?php
            class Broken {
                public function kept() {}
            // missing closing brace
        "#};
        let file = symbols_of(src);
        assert!(file.partial);
        let class = first_class(&file);
        assert_eq!(class.name, "Broken");
        assert_eq!(class.methods[0].name, "kept");
    }

    #[test]
    fn malformed_braces_abort_one_symbol_not_the_file() {
        let src = indoc! {r#"
            <?php
            function broken( {
            }
            class Fine {}
        "#};
        let file = symbols_of(src);
        assert!(file.partial);
        // The broken function is dropped; the following class still parses.
        assert_eq!(first_class(&file).name, "Fine");
        assert!(!file
            .symbols
            .iter()
            .any(|s| matches!(s, Symbol::Function(_))));
    }

    #[test]
    fn group_use_expands_each_member() {
        let src = "<?php use App\\Models\\{User, Post as Article};";
        let file = symbols_of(src);
        let uses: Vec<_> = file
            .symbols
            .iter()
            .filter_map(|s| match s {
                Symbol::Use(u) => Some((u.target.clone(), u.alias.clone())),
                _ => None,
            })
            .collect();
        assert_eq!(uses.len(), 2);
        assert_eq!(uses[0].0, "App\\Models\\User");
        assert_eq!(uses[1].0, "App\\Models\\Post");
        assert_eq!(uses[1].1.as_deref(), Some("Article"));
    }

    #[test]
    fn define_and_const_become_constants() {
        let src = "<?php define('APP_ENV', 'production'); const LIMIT = 10;";
        let file = symbols_of(src);
        let consts: Vec<_> = file
            .symbols
            .iter()
            .filter_map(|s| match s {
                Symbol::Constant(c) => Some((c.name.clone(), c.value.clone())),
                _ => None,
            })
            .collect();
        assert_eq!(consts[0].0, "APP_ENV");
        assert_eq!(consts[0].1.as_deref(), Some("'production'"));
        assert_eq!(consts[1].0, "LIMIT");
        assert_eq!(consts[1].1.as_deref(), Some("10"));
    }

    #[test]
    fn interface_and_trait_kinds_are_recognized() {
        let src = "<?php interface Shape { public function area(); } trait Loggy { public function log($m) {} }";
        let file = symbols_of(src);
        let kinds: Vec<_> = file
            .symbols
            .iter()
            .filter_map(|s| match s {
                Symbol::Class(c) => Some((c.kind, c.methods.len())),
                _ => None,
            })
            .collect();
        assert_eq!(kinds, vec![(ClassKind::Interface, 1), (ClassKind::Trait, 1)]);
    }

    #[test]
    fn totality_on_adversarial_fragments() {
        for junk in [
            "",
            "<?php",
            "<?php {{{{",
            "<?php }}}}",
            "<?php class",
            "<?php class {",
            "<?php function ( )",
            "<?php 'unterminated",
            "<?php /* unterminated",
            "<?php <<<EOT\nno end",
            "\u{0}\u{1}<?php $x;",
        ] {
            let (file, _) = parse_symbols(&PathBuf::from("junk.php"), junk);
            let _ = file.symbols;
        }
    }
}
