//! Static composer-to-npm package mapping.
//!
//! Absence from this table means "unmapped", which feeds the project
//! complexity score; it never drops the dependency from the report.

use crate::core::MigrationComplexity;

/// Known equivalences: composer package, npm package, migration complexity.
const PACKAGE_MAP: &[(&str, &str, MigrationComplexity)] = &[
    ("guzzlehttp/guzzle", "axios", MigrationComplexity::Low),
    ("monolog/monolog", "winston", MigrationComplexity::Low),
    ("vlucas/phpdotenv", "dotenv", MigrationComplexity::Low),
    ("nesbot/carbon", "dayjs", MigrationComplexity::Low),
    ("ramsey/uuid", "uuid", MigrationComplexity::Low),
    ("firebase/php-jwt", "jsonwebtoken", MigrationComplexity::Low),
    ("predis/predis", "ioredis", MigrationComplexity::Low),
    ("stripe/stripe-php", "stripe", MigrationComplexity::Low),
    ("symfony/console", "commander", MigrationComplexity::Low),
    ("symfony/http-client", "axios", MigrationComplexity::Low),
    ("fakerphp/faker", "@faker-js/faker", MigrationComplexity::Low),
    ("phpmailer/phpmailer", "nodemailer", MigrationComplexity::Low),
    ("swiftmailer/swiftmailer", "nodemailer", MigrationComplexity::Low),
    ("phpunit/phpunit", "jest", MigrationComplexity::Medium),
    ("mockery/mockery", "jest", MigrationComplexity::Medium),
    ("twig/twig", "nunjucks", MigrationComplexity::Medium),
    ("league/flysystem", "fs-extra", MigrationComplexity::Medium),
    ("intervention/image", "sharp", MigrationComplexity::Medium),
    ("aws/aws-sdk-php", "aws-sdk", MigrationComplexity::Medium),
    (
        "elasticsearch/elasticsearch",
        "@elastic/elasticsearch",
        MigrationComplexity::Medium,
    ),
    ("league/csv", "csv-parse", MigrationComplexity::Medium),
    ("spatie/laravel-permission", "casl", MigrationComplexity::High),
    ("doctrine/orm", "typeorm", MigrationComplexity::High),
    ("doctrine/dbal", "knex", MigrationComplexity::High),
    ("illuminate/database", "knex", MigrationComplexity::High),
    ("laravel/sanctum", "passport", MigrationComplexity::High),
    ("laravel/passport", "passport", MigrationComplexity::High),
];

/// Web-framework packages: categorically higher migration complexity,
/// tracked separately from ordinary libraries.
pub const FRAMEWORK_PACKAGES: &[&str] = &[
    "laravel/framework",
    "laravel/lumen-framework",
    "symfony/framework-bundle",
    "symfony/symfony",
    "codeigniter4/framework",
    "codeigniter/framework",
    "slim/slim",
    "cakephp/cakephp",
    "yiisoft/yii2",
];

pub fn lookup(package: &str) -> Option<(&'static str, MigrationComplexity)> {
    PACKAGE_MAP
        .iter()
        .find(|(name, _, _)| *name == package)
        .map(|(_, target, complexity)| (*target, *complexity))
}

pub fn is_framework_package(package: &str) -> bool {
    FRAMEWORK_PACKAGES.contains(&package)
}

/// `php` itself and `ext-*` entries are platform requirements, not libraries.
pub fn is_platform_package(package: &str) -> bool {
    package == "php" || package.starts_with("ext-") || package.starts_with("lib-")
}
