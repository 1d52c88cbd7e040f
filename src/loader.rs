//! Semantic convention loader
//!
//! Finds YAML documents under a model directory, parses each one into the
//! document tree and feeds them to a [`SemanticConventionSet`].

use anyhow::{anyhow, Context, Result};
use semconv_core::SemanticConventionSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::yaml::parse_document;

pub struct SemconvLoader {
    yaml_root: PathBuf,
    exclude: Vec<PathBuf>,
    debug: bool,
}

impl SemconvLoader {
    pub fn new(yaml_root: impl Into<PathBuf>) -> Self {
        Self {
            yaml_root: yaml_root.into(),
            exclude: Vec::new(),
            debug: false,
        }
    }

    /// Create loader from environment variables
    ///
    /// - `SEMCONV_YAML_ROOT`: model directory, defaults to `model`
    /// - `SEMCONV_EXCLUDE`: comma separated paths, relative to the root
    /// - `SEMCONV_DEBUG`: `1`/`true` traces the first resolution pass
    pub fn from_env() -> Self {
        let root = std::env::var("SEMCONV_YAML_ROOT").unwrap_or_else(|_| "model".to_string());

        let exclude = std::env::var("SEMCONV_EXCLUDE")
            .map(|v| parse_exclude(&v))
            .unwrap_or_default();

        let debug = std::env::var("SEMCONV_DEBUG")
            .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        Self::new(root).with_exclude(exclude).with_debug(debug)
    }

    pub fn with_exclude(mut self, exclude: impl IntoIterator<Item = PathBuf>) -> Self {
        self.exclude.extend(exclude);
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn yaml_root(&self) -> &Path {
        &self.yaml_root
    }

    /// YAML files under the root in load order, exclusions removed
    pub fn discover(&self) -> Result<Vec<PathBuf>> {
        let files = find_yaml_files(&self.yaml_root)?;
        Ok(files
            .into_iter()
            .filter(|path| !self.is_excluded(path))
            .collect())
    }

    fn is_excluded(&self, path: &Path) -> bool {
        let relative = path.strip_prefix(&self.yaml_root).unwrap_or(path);
        self.exclude.iter().any(|ex| relative.starts_with(ex))
    }

    /// Load and resolve every document under the root
    ///
    /// A file that cannot be read aborts the load. A document that fails to
    /// parse is recorded and skipped so the remaining documents still get
    /// checked; the load fails afterwards if anything was recorded.
    pub fn load(&self) -> Result<SemanticConventionSet> {
        info!(
            "Loading semantic conventions from {}",
            self.yaml_root.display()
        );

        let mut set = SemanticConventionSet::new(self.debug);
        let files = self.discover()?;

        for path in &files {
            let source = path.display().to_string();
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", source))?;

            debug!("parsing {}", source);
            match parse_document(&content) {
                Ok(document) => set.parse_document(&source, &document),
                Err(e) => set.record_error(Some(&source), e.to_string()),
            }
        }

        set.finish().with_context(|| {
            format!(
                "Failed to resolve semantic conventions under {}",
                self.yaml_root.display()
            )
        })?;

        if set.has_error() {
            let details: Vec<String> = set.errors().iter().map(ToString::to_string).collect();
            return Err(anyhow!(
                "{} error(s) in semantic conventions:\n{}",
                details.len(),
                details.join("\n")
            ));
        }

        info!(
            "Loaded {} groups with {} total attributes from {} file(s)",
            set.models().len(),
            set.attributes().len(),
            files.len()
        );

        Ok(set)
    }
}

/// Split a comma separated exclude list, skipping empty entries
fn parse_exclude(value: &str) -> Vec<PathBuf> {
    value
        .split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(PathBuf::from)
        .collect()
}

/// Recursively find `.yaml`/`.yml` files, sorted for a stable load order
fn find_yaml_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in std::fs::read_dir(dir)
        .with_context(|| format!("Failed to read directory {}", dir.display()))?
    {
        let entry = entry?;
        let path = entry.path();

        if path.is_dir() {
            files.extend(find_yaml_files(&path)?);
        } else if path
            .extension()
            .map(|e| e == "yaml" || e == "yml")
            .unwrap_or(false)
        {
            files.push(path);
        }
    }

    files.sort();
    Ok(files)
}
