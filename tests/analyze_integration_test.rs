//! End-to-end analysis over temporary project trees.

use std::fs;
use std::path::Path;

use migramap::config::AnalysisConfig;
use migramap::{
    analyze_project, AnalysisError, DatabaseDriver, DirectoryPurpose, FrameworkKind, HttpMethod,
    OrmKind, QueryStyle,
};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

/// A minimal but complete Laravel-shaped project.
fn laravel_fixture() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path();

    write(
        root,
        "composer.json",
        r#"{
            "name": "acme/shop",
            "require": {
                "php": ">=8.1",
                "laravel/framework": "^10.0",
                "guzzlehttp/guzzle": "^7.2",
                "acme/internal-sdk": "dev-main"
            },
            "require-dev": {"phpunit/phpunit": "^10.0"}
        }"#,
    );
    write(
        root,
        ".env",
        "APP_NAME=shop\nDB_CONNECTION=mysql\nDB_HOST=localhost\nDB_PORT=3306\nDB_DATABASE=shop\nDB_USERNAME=shop\n",
    );
    write(root, "artisan", "#!/usr/bin/env php\n<?php\n");
    write(root, "config/app.php", "<?php return ['name' => 'shop'];");
    write(
        root,
        "routes/web.php",
        r#"<?php

use App\Http\Controllers\UserController;
use Illuminate\Support\Facades\Route;

Route::get('/users/{id}', [UserController::class, 'show']);

Route::group(['prefix' => 'admin', 'middleware' => ['auth']], function () {
    Route::get('/dashboard', [AdminController::class, 'index']);
});
"#,
    );
    write(
        root,
        "app/Http/Controllers/UserController.php",
        r#"<?php

namespace App\Http\Controllers;

use App\Models\User;

class UserController extends Controller
{
    /**
     * Show one user.
     */
    public function show($id)
    {
        return response()->json(User::findOrFail($id));
    }
}
"#,
    );
    write(
        root,
        "app/Models/User.php",
        r#"<?php

namespace App\Models;

use Illuminate\Database\Eloquent\Model;

class User extends Model
{
    protected $fillable = ['name', 'email'];

    public function posts()
    {
        return $this->hasMany(Post::class);
    }
}
"#,
    );
    write(
        root,
        "database/migrations/2024_01_01_000000_create_users_table.php",
        r#"<?php

use Illuminate\Support\Facades\Schema;

return new class {
    public function up(): void
    {
        Schema::create('users', function ($table) {
            $table->id();
            $table->string('name');
            $table->string('email')->unique();
        });
    }
};
"#,
    );
    write(root, "public/index.php", "<?php require __DIR__.'/../vendor/autoload.php';");
    tmp
}

#[test]
fn laravel_project_produces_a_full_model() {
    let tmp = laravel_fixture();
    let config = AnalysisConfig::default();
    let model = analyze_project(tmp.path(), &config).unwrap();

    assert_eq!(model.framework.kind, FrameworkKind::Laravel);
    assert!(model.framework.confidence >= 0.30);

    // Scenario A: GET /users/{id} -> UserController.show with parameter id.
    let show = model
        .endpoints
        .iter()
        .find(|e| e.handler == "UserController.show")
        .expect("user route");
    assert_eq!(show.method, HttpMethod::Get);
    assert_eq!(show.route, "/users/{id}");
    assert_eq!(show.parameters, vec!["id".to_string()]);

    // Group scoping: the admin route inherits prefix and middleware.
    let admin = model
        .endpoints
        .iter()
        .find(|e| e.handler == "AdminController.index")
        .expect("admin route");
    assert_eq!(admin.route, "/admin/dashboard");
    assert!(admin.middleware.contains("auth"));
    assert_eq!(admin.auth.as_deref(), Some("auth"));

    // Scenario C: one mysql connection from .env.
    let conn = model
        .database
        .connections
        .iter()
        .find(|c| c.driver == DatabaseDriver::MySql)
        .expect("mysql connection");
    assert_eq!(conn.host.as_deref(), Some("localhost"));

    assert_eq!(model.database.orm, Some(OrmKind::Eloquent));

    // Round-trip: the users table from the query, the model, and the
    // migration is one entry.
    let users: Vec<_> = model
        .database
        .tables
        .iter()
        .filter(|t| t.name == "users")
        .collect();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0].model_class.as_deref(), Some("User"));
    assert!(users[0].columns.iter().any(|c| c.name == "email"));
    assert!(users[0]
        .relationships
        .iter()
        .any(|r| r == "User hasMany Post"));

    // DependencyResolver totality.
    assert_eq!(model.dependencies.dependencies.len(), 5);
    assert_eq!(model.dependencies.framework_packages, vec!["laravel/framework"]);

    // Scenario D: app/Http/Controllers is tagged controller.
    let controllers = model
        .structure
        .directories
        .iter()
        .find(|d| d.path == Path::new("app/Http/Controllers"))
        .expect("controllers dir");
    assert_eq!(controllers.purpose, Some(DirectoryPurpose::Controller));

    assert_eq!(model.structure.entry_points.len(), 1);
    assert!(model.provenance.files_scanned > 0);
}

#[test]
fn scenario_b_manifest_framework_clears_its_threshold() {
    let tmp = TempDir::new().unwrap();
    write(
        tmp.path(),
        "composer.json",
        r#"{"require": {"slim/slim": "^4.0"}}"#,
    );
    write(
        tmp.path(),
        "src/routes.php",
        "<?php $app->get('/ping', function ($req, $res) { return $res; });",
    );

    let config = AnalysisConfig::default();
    let model = analyze_project(tmp.path(), &config).unwrap();
    assert_eq!(model.framework.kind, FrameworkKind::Slim);
    assert!(model.framework.confidence >= config.threshold_for(FrameworkKind::Slim, 0.40));
    assert_eq!(model.endpoints.len(), 1);
    assert_eq!(model.endpoints[0].route, "/ping");
}

#[test]
fn scenario_e_empty_project_is_the_only_whole_run_failure() {
    let tmp = TempDir::new().unwrap();
    write(tmp.path(), "README.md", "# nothing to see");

    let err = analyze_project(tmp.path(), &AnalysisConfig::default()).unwrap_err();
    assert!(matches!(err, AnalysisError::EmptyProject(_)));
}

#[test]
fn malformed_files_never_abort_the_run() {
    let tmp = TempDir::new().unwrap();
    write(tmp.path(), "src/broken.php", "<?php class Broken { function (((");
    write(
        tmp.path(),
        "src/fine.php",
        "<?php class Fine { public function ok() {} }",
    );
    // Binary garbage with a .php suffix.
    fs::write(tmp.path().join("src/junk.php"), [0xff, 0xfe, 0x00, 0x3c, 0x3f]).unwrap();

    let model = analyze_project(tmp.path(), &AnalysisConfig::default()).unwrap();
    assert!(model
        .files
        .iter()
        .any(|f| f.symbols.iter().any(|s| matches!(s, migramap::Symbol::Class(c) if c.name == "Fine"))));
    assert!(!model.provenance.warnings.is_empty());
}

#[test]
fn missing_manifest_yields_empty_report_and_warning() {
    let tmp = TempDir::new().unwrap();
    write(tmp.path(), "index.php", "<?php echo 'hi';");

    let model = analyze_project(tmp.path(), &AnalysisConfig::default()).unwrap();
    assert!(model.dependencies.dependencies.is_empty());
    assert!(model
        .provenance
        .warnings
        .iter()
        .any(|w| w.message.contains("no package manifest")));
}

#[test]
fn analysis_is_deterministic_over_an_unchanged_tree() {
    let tmp = laravel_fixture();
    let config = AnalysisConfig::default();
    let first = analyze_project(tmp.path(), &config).unwrap();
    let second = analyze_project(tmp.path(), &config).unwrap();

    assert_eq!(first.framework, second.framework);
    assert_eq!(first.endpoints, second.endpoints);
    assert_eq!(first.database.tables, second.database.tables);
    assert_eq!(first.dependencies, second.dependencies);
    assert_eq!(first.structure.pattern, second.structure.pattern);
}

#[test]
fn query_styles_are_classified_across_files() {
    let tmp = TempDir::new().unwrap();
    write(
        tmp.path(),
        "src/legacy.php",
        r#"<?php
$pdo->prepare("SELECT * FROM orders WHERE id = ?");
$db->query("DELETE FROM sessions");
"#,
    );

    let model = analyze_project(tmp.path(), &AnalysisConfig::default()).unwrap();
    let styles: Vec<QueryStyle> = model.database.queries.iter().map(|q| q.style).collect();
    assert!(styles.contains(&QueryStyle::Prepared));
    assert!(styles.contains(&QueryStyle::RawSql));
    let names: Vec<_> = model.database.tables.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["orders", "sessions"]);
}

#[test]
fn model_serializes_with_stable_top_level_fields() {
    let tmp = laravel_fixture();
    let model = analyze_project(tmp.path(), &AnalysisConfig::default()).unwrap();
    let value = serde_json::to_value(&model).unwrap();
    for field in [
        "root",
        "framework",
        "files",
        "endpoints",
        "database",
        "dependencies",
        "structure",
        "provenance",
    ] {
        assert!(value.get(field).is_some(), "missing field {field}");
    }
    assert_eq!(value["framework"]["kind"], "laravel");
}

#[test]
fn scan_budget_is_honored() {
    let tmp = TempDir::new().unwrap();
    for i in 0..10 {
        write(tmp.path(), &format!("src/f{i:02}.php"), "<?php function noop() {}");
    }
    let config = AnalysisConfig {
        max_files_to_scan: 4,
        ..AnalysisConfig::default()
    };
    let model = analyze_project(tmp.path(), &config).unwrap();
    assert_eq!(model.provenance.files_scanned, 4);
    assert_eq!(model.provenance.files_skipped, 6);
}
