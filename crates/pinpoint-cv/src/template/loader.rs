//! Template loading utilities

use super::Template;
use crate::Result;
use anyhow::Context;
use pinpoint_core::ConfigError;
use std::fs;
use std::path::{Path, PathBuf};

/// Template loader with multiple search strategies
pub struct TemplateLoader {
    template_dirs: Vec<PathBuf>,
    supported_extensions: Vec<String>,
}

impl TemplateLoader {
    /// Create new template loader
    pub fn new() -> Self {
        Self {
            template_dirs: Vec::new(),
            supported_extensions: vec![
                "png".to_string(),
                "jpg".to_string(),
                "jpeg".to_string(),
                "bmp".to_string(),
            ],
        }
    }

    /// Add template directory
    pub fn add_template_dir<P: AsRef<Path>>(mut self, dir: P) -> Self {
        self.template_dirs.push(dir.as_ref().to_path_buf());
        self
    }

    /// Load a template straight from an image file
    pub fn load_path<P: AsRef<Path>>(path: P) -> Result<Template> {
        let path = path.as_ref();
        let image = image::open(path)
            .with_context(|| format!("Failed to load template: {:?}", path))?
            .to_luma8();
        let name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().to_string())
            .unwrap_or_else(|| "template".to_string());

        Ok(Template::new(name, image)
            .with_metadata("path".to_string(), path.to_string_lossy().to_string()))
    }

    /// Load template by name, trying every candidate file name in every directory
    pub fn load_template(&self, name: &str) -> Result<Option<Template>> {
        for candidate in self.generate_template_candidates(name) {
            if let Some(path) = self.find_template_file(&candidate) {
                let template = Self::load_path(&path)?;
                return Ok(Some(Template {
                    name: name.to_string(),
                    ..template
                }
                .with_metadata("original_name".to_string(), candidate)));
            }
        }

        Ok(None)
    }

    /// Like `load_template`, but absence is a configuration error
    pub fn load_required(&self, name: &str) -> std::result::Result<Template, ConfigError> {
        match self.load_template(name) {
            Ok(Some(template)) => Ok(template),
            Ok(None) => Err(ConfigError::MissingTemplate(format!(
                "'{}' in {:?}",
                name, self.template_dirs
            ))),
            Err(e) => Err(ConfigError::MissingTemplate(format!("'{}': {:#}", name, e))),
        }
    }

    /// Generate template name candidates
    fn generate_template_candidates(&self, name: &str) -> Vec<String> {
        let mut candidates = Vec::new();

        for ext in &self.supported_extensions {
            candidates.push(format!("{}.{}", name, ext));
            candidates.push(format!("{}.{}", name.to_lowercase(), ext));
            candidates.push(format!("_{}.{}", name, ext));
            candidates.push(format!("_{}.{}", name.to_lowercase(), ext));
            candidates.push(format!("{}.{}", name.to_uppercase(), ext));
        }

        candidates
    }

    /// Find template file in directories
    fn find_template_file(&self, candidate: &str) -> Option<PathBuf> {
        for dir in &self.template_dirs {
            let path = dir.join(candidate);
            if path.is_file() {
                return Some(path);
            }

            // Case-insensitive search
            if let Ok(entries) = fs::read_dir(dir) {
                for entry in entries.flatten() {
                    let file_name = entry.file_name();
                    if file_name.to_string_lossy().to_lowercase() == candidate.to_lowercase() {
                        return Some(entry.path());
                    }
                }
            }
        }

        None
    }
}

impl Default for TemplateLoader {
    fn default() -> Self {
        Self::new()
    }
}
