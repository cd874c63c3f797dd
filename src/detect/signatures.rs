//! Weighted framework signatures.
//!
//! A signature is marker directories, marker files, content patterns, and
//! manifest packages. Directory, file, and content signals weigh 1 each; a
//! manifest hit weighs [`MANIFEST_WEIGHT`], so a project that declares its
//! framework as a dependency clears that framework's threshold on the
//! manifest alone.

use regex::Regex;

use super::{FrameworkDetector, ProjectEvidence, SignatureScore};
use crate::core::FrameworkKind;

pub const MANIFEST_WEIGHT: f64 = 4.0;

/// Packages that mark a project as framework-built, used both for signature
/// scoring and as negative evidence in the custom detectors.
pub const KNOWN_FRAMEWORK_PACKAGES: &[&str] = &[
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

pub struct Signature {
    pub marker_dirs: &'static [&'static str],
    pub marker_files: &'static [&'static str],
    pub manifest_packages: &'static [&'static str],
    pub content_patterns: &'static [&'static str],
}

impl Signature {
    fn total_weight(&self) -> f64 {
        let mut total =
            (self.marker_dirs.len() + self.marker_files.len() + self.content_patterns.len()) as f64;
        if !self.manifest_packages.is_empty() {
            total += MANIFEST_WEIGHT;
        }
        total
    }
}

/// Generic detector driven by one signature.
pub struct SignatureDetector {
    kind: FrameworkKind,
    threshold: f64,
    signature: Signature,
    patterns: Vec<Regex>,
}

impl SignatureDetector {
    pub fn new(kind: FrameworkKind, threshold: f64, signature: Signature) -> Self {
        let patterns = signature
            .content_patterns
            .iter()
            .filter_map(|p| Regex::new(p).ok())
            .collect();
        Self {
            kind,
            threshold,
            signature,
            patterns,
        }
    }

    fn matched_weight(&self, evidence: &ProjectEvidence) -> f64 {
        let mut matched = 0.0;
        for dir in self.signature.marker_dirs {
            if evidence.has_path(dir) {
                matched += 1.0;
            }
        }
        for file in self.signature.marker_files {
            if evidence.has_path(file) {
                matched += 1.0;
            }
        }
        for pattern in &self.patterns {
            if evidence.any_sample_matches(pattern) {
                matched += 1.0;
            }
        }
        if self
            .signature
            .manifest_packages
            .iter()
            .any(|p| evidence.manifest_mentions(p))
        {
            matched += MANIFEST_WEIGHT;
        }
        matched
    }
}

impl FrameworkDetector for SignatureDetector {
    fn kind(&self) -> FrameworkKind {
        self.kind
    }

    fn default_threshold(&self) -> f64 {
        self.threshold
    }

    fn score(&self, evidence: &ProjectEvidence) -> SignatureScore {
        SignatureScore {
            matched: self.matched_weight(evidence),
            total: self.signature.total_weight(),
        }
    }
}

pub fn laravel() -> SignatureDetector {
    SignatureDetector::new(
        FrameworkKind::Laravel,
        0.30,
        Signature {
            marker_dirs: &["app/http/controllers", "routes", "database/migrations"],
            marker_files: &["artisan", "config/app.php"],
            manifest_packages: &["laravel/framework", "laravel/lumen-framework"],
            content_patterns: &[
                r"Illuminate\\",
                r"extends\s+Controller\b",
                r"Route::\w+\s*\(",
            ],
        },
    )
}

pub fn symfony() -> SignatureDetector {
    SignatureDetector::new(
        FrameworkKind::Symfony,
        0.32,
        Signature {
            marker_dirs: &["src/controller", "config/packages", "templates"],
            marker_files: &["bin/console", "config/services.yaml"],
            manifest_packages: &["symfony/framework-bundle", "symfony/symfony"],
            content_patterns: &[
                r"Symfony\\Component",
                r"#\[Route\(",
                r"extends\s+AbstractController\b",
            ],
        },
    )
}

pub fn codeigniter() -> SignatureDetector {
    SignatureDetector::new(
        FrameworkKind::CodeIgniter,
        0.33,
        Signature {
            marker_dirs: &["system", "application/controllers", "app/controllers"],
            marker_files: &["spark", "application/config/config.php"],
            manifest_packages: &["codeigniter4/framework", "codeigniter/framework"],
            content_patterns: &[
                r"extends\s+CI_Controller\b",
                r"defined\s*\(\s*'BASEPATH'\s*\)",
                r"\$this->load->\w+",
            ],
        },
    )
}

pub fn slim() -> SignatureDetector {
    SignatureDetector::new(
        FrameworkKind::Slim,
        0.40,
        Signature {
            marker_dirs: &[],
            marker_files: &["public/index.php"],
            manifest_packages: &["slim/slim"],
            content_patterns: &[
                r"Slim\\(?:App|Factory)",
                r"\$app->(?:get|post|put|patch|delete)\s*\(",
                r"\$app->run\s*\(\s*\)",
            ],
        },
    )
}

const CUSTOM_SIGNATURE: Signature = Signature {
    marker_dirs: &["controllers", "models", "views"],
    marker_files: &[],
    manifest_packages: &[],
    content_patterns: &[
        r"\$_SERVER\s*\[\s*'REQUEST_URI'\s*\]",
        r"switch\s*\(\s*\$(?:page|action|route|url)\b",
        r"preg_match\s*\([^)]*REQUEST_URI",
    ],
};

fn custom_signature_detector(kind: FrameworkKind, threshold: f64) -> SignatureDetector {
    SignatureDetector::new(kind, threshold, CUSTOM_SIGNATURE)
}

/// Hand-rolled MVC without a composer manifest.
///
/// Negative evidence: any known framework package in the manifest zeroes the
/// score, so custom detection running first can never shadow a declared
/// framework.
pub struct CustomMvcDetector {
    inner: SignatureDetector,
}

impl CustomMvcDetector {
    pub fn new() -> Self {
        Self {
            inner: custom_signature_detector(FrameworkKind::CustomMvc, 0.55),
        }
    }
}

impl Default for CustomMvcDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameworkDetector for CustomMvcDetector {
    fn kind(&self) -> FrameworkKind {
        self.inner.kind()
    }

    fn default_threshold(&self) -> f64 {
        self.inner.default_threshold()
    }

    fn score(&self, evidence: &ProjectEvidence) -> SignatureScore {
        if names_known_framework(evidence) {
            return SignatureScore::zero();
        }
        self.inner.score(evidence)
    }
}

/// Hand-rolled MVC that still manages packages through composer.
pub struct CustomWithComposerDetector {
    inner: SignatureDetector,
}

impl CustomWithComposerDetector {
    pub fn new() -> Self {
        Self {
            inner: custom_signature_detector(FrameworkKind::CustomWithComposer, 0.50),
        }
    }
}

impl Default for CustomWithComposerDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameworkDetector for CustomWithComposerDetector {
    fn kind(&self) -> FrameworkKind {
        self.inner.kind()
    }

    fn default_threshold(&self) -> f64 {
        self.inner.default_threshold()
    }

    fn score(&self, evidence: &ProjectEvidence) -> SignatureScore {
        if evidence.manifest.is_none() || names_known_framework(evidence) {
            return SignatureScore::zero();
        }
        self.inner.score(evidence)
    }
}

fn names_known_framework(evidence: &ProjectEvidence) -> bool {
    KNOWN_FRAMEWORK_PACKAGES
        .iter()
        .any(|p| evidence.manifest_mentions(p))
}
