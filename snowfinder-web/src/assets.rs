//! Landing page and static file locations.

use std::path::{Path, PathBuf};

const EMBEDDED_INDEX: &str = include_str!("../assets/index.html");

/// Page assets resolved once at startup.
#[derive(Debug, Clone)]
pub struct Assets {
    index_html: String,
    static_dir: Option<PathBuf>,
}

impl Default for Assets {
    fn default() -> Self {
        Self::embedded()
    }
}

impl Assets {
    /// The built-in landing page and no static directory.
    pub fn embedded() -> Self {
        Self {
            index_html: EMBEDDED_INDEX.to_string(),
            static_dir: None,
        }
    }

    /// Resolve assets under `dir`: `templates/index.html` replaces the
    /// built-in page when present, `static/` is served when it exists.
    pub fn load<P: AsRef<Path>>(dir: P) -> std::io::Result<Self> {
        let dir = dir.as_ref();
        let template = dir.join("templates").join("index.html");
        let index_html = if template.is_file() {
            log::info!("[snowfinder] assets: using {}", template.display());
            std::fs::read_to_string(&template)?
        } else {
            log::info!("[snowfinder] assets: no template in {}, using built-in page", dir.display());
            EMBEDDED_INDEX.to_string()
        };
        let static_dir = Some(dir.join("static")).filter(|p| p.is_dir());
        Ok(Self {
            index_html,
            static_dir,
        })
    }

    pub fn index_html(&self) -> &str {
        &self.index_html
    }

    pub fn static_dir(&self) -> Option<&Path> {
        self.static_dir.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_dir_falls_back_to_embedded() {
        let dir = tempfile::tempdir().unwrap();
        let assets = Assets::load(dir.path().join("nope")).unwrap();
        assert_eq!(assets.index_html(), EMBEDDED_INDEX);
        assert!(assets.static_dir().is_none());
    }

    #[test]
    fn template_and_static_are_picked_up() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("templates")).unwrap();
        std::fs::create_dir_all(dir.path().join("static")).unwrap();
        std::fs::write(dir.path().join("templates/index.html"), "<h1>custom</h1>").unwrap();

        let assets = Assets::load(dir.path()).unwrap();
        assert_eq!(assets.index_html(), "<h1>custom</h1>");
        assert_eq!(assets.static_dir(), Some(dir.path().join("static").as_path()));
    }
}
