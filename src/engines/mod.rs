//! OCR engine implementations
//!
//! This module contains implementations of the OcrEngine trait for different
//! OCR backends. Engines are conditionally compiled based on feature flags;
//! `UnavailableEngine` is always present so a build without any engine still
//! reports a clean OCR failure.

#[cfg(feature = "engine-ocrs")]
pub mod ocrs;

#[cfg(feature = "engine-tesseract")]
pub mod tesseract;

pub mod unavailable;

use crate::config::Config;
use crate::engine::OcrEngine;
use crate::error::{ConvertError, OcrError};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub use unavailable::UnavailableEngine;

/// Registry of the OCR engines compiled into this build
pub struct EngineRegistry {
    engines: Vec<Arc<dyn OcrEngine>>,
}

impl EngineRegistry {
    /// Register every compiled engine. Engines load their models lazily,
    /// so this never touches the network.
    #[cfg_attr(
        not(any(feature = "engine-ocrs", feature = "engine-tesseract")),
        allow(unused_variables, unused_mut)
    )]
    pub fn new(config: &Config) -> Self {
        let mut engines: Vec<Arc<dyn OcrEngine>> = Vec::new();

        #[cfg(feature = "engine-ocrs")]
        engines.push(Arc::new(ocrs::OcrsEngine::new(config)));

        #[cfg(feature = "engine-tesseract")]
        engines.push(Arc::new(tesseract::TesseractEngine::new(config)));

        if engines.is_empty() {
            tracing::warn!("No OCR engine compiled in; OCR fallback will always fail");
        }

        Self { engines }
    }

    /// Build a registry from explicit engines
    pub fn with_engines(engines: Vec<Arc<dyn OcrEngine>>) -> Self {
        Self { engines }
    }

    /// Get an engine by name
    pub fn get(&self, name: &str) -> Option<Arc<dyn OcrEngine>> {
        self.engines.iter().find(|e| e.name() == name).cloned()
    }

    /// The named engine, or the default one when `name` is `None`.
    ///
    /// Without any registered engine the default is `UnavailableEngine`.
    pub fn resolve(&self, name: Option<&str>) -> Result<Arc<dyn OcrEngine>, ConvertError> {
        match name {
            Some(name) => self.get(name).ok_or_else(|| ConvertError::UnknownEngine {
                name: name.to_string(),
                available: if self.engines.is_empty() {
                    "none".to_string()
                } else {
                    self.list().join(", ")
                },
            }),
            None => Ok(self
                .engines
                .first()
                .cloned()
                .unwrap_or_else(|| Arc::new(UnavailableEngine) as Arc<dyn OcrEngine>)),
        }
    }

    /// List all available engine names
    pub fn list(&self) -> Vec<&str> {
        self.engines.iter().map(|e| e.name()).collect()
    }
}

/// Return the cached copy of `url`, downloading it on first use.
///
/// `relative` is resolved against the user cache directory.
pub(crate) fn cached_download(url: &str, relative: &str) -> Result<PathBuf, OcrError> {
    let path = cache_dir().join(relative);

    if path.exists() {
        tracing::info!("Using cached {:?}", path);
        return Ok(path);
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            OcrError::Initialization(format!("Failed to create cache directory: {}", e))
        })?;
    }

    tracing::info!("Downloading {} (this may take a moment)...", relative);
    download_file(url, &path)?;
    tracing::info!("Downloaded {} to {:?}", relative, path);

    Ok(path)
}

fn cache_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("pdf-converter")
}

/// Download a file from URL to path using ureq
fn download_file(url: &str, path: &Path) -> Result<(), OcrError> {
    let response = ureq::get(url)
        .call()
        .map_err(|e| OcrError::Initialization(format!("Failed to download {}: {}", url, e)))?;

    let buffer = response.into_body().read_to_vec().map_err(|e| {
        OcrError::Initialization(format!("Failed to read response body: {}", e))
    })?;

    // Write next to the target and rename so an interrupted download is
    // never mistaken for a cached file
    let partial = path.with_extension("part");
    let mut file = File::create(&partial)
        .map_err(|e| OcrError::Initialization(format!("Failed to create cache file: {}", e)))?;
    file.write_all(&buffer)
        .map_err(|e| OcrError::Initialization(format!("Failed to write cache file: {}", e)))?;
    std::fs::rename(&partial, path)
        .map_err(|e| OcrError::Initialization(format!("Failed to move cache file: {}", e)))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::DynamicImage;

    struct Named(&'static str);

    impl OcrEngine for Named {
        fn name(&self) -> &'static str {
            self.0
        }

        fn description(&self) -> &'static str {
            "test engine"
        }

        fn recognize_image(&self, _image: &DynamicImage) -> Result<String, OcrError> {
            Ok(self.0.to_string())
        }
    }

    #[test]
    fn test_resolve_default_is_first_registered() {
        let engines: Vec<Arc<dyn OcrEngine>> =
            vec![Arc::new(Named("first")), Arc::new(Named("second"))];
        let registry = EngineRegistry::with_engines(engines);
        assert_eq!(registry.resolve(None).unwrap().name(), "first");
        assert_eq!(registry.resolve(Some("second")).unwrap().name(), "second");
        assert_eq!(registry.list(), vec!["first", "second"]);
    }

    #[test]
    fn test_resolve_unknown_name() {
        let engines: Vec<Arc<dyn OcrEngine>> = vec![Arc::new(Named("first"))];
        let registry = EngineRegistry::with_engines(engines);
        match registry.resolve(Some("paddle")) {
            Err(ConvertError::UnknownEngine { name, available }) => {
                assert_eq!(name, "paddle");
                assert_eq!(available, "first");
            }
            Err(other) => panic!("unexpected error: {}", other),
            Ok(engine) => panic!("resolved to {}", engine.name()),
        }
    }

    #[test]
    fn test_empty_registry_falls_back_to_unavailable() {
        let registry = EngineRegistry::with_engines(Vec::new());
        assert_eq!(registry.resolve(None).unwrap().name(), "unavailable");
    }

    #[test]
    fn test_new_registers_compiled_engines() {
        let registry = EngineRegistry::new(&Config::default());
        #[cfg(feature = "engine-ocrs")]
        assert!(registry.get("ocrs").is_some());
        #[cfg(feature = "engine-tesseract")]
        assert!(registry.get("tesseract").is_some());
        #[cfg(not(any(feature = "engine-ocrs", feature = "engine-tesseract")))]
        assert!(registry.list().is_empty());
    }
}
