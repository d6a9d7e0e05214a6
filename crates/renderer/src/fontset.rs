//! Font list used for labels.
//!
//! The list is a plain text file with one `name path` pair per line:
//!
//! ```text
//! # comment
//! default  /usr/share/fonts/truetype/dejavu/DejaVuSans.ttf
//! bold     fonts/DejaVuSans-Bold.ttf
//! ```
//!
//! Relative paths resolve against the directory of the list. Font files are
//! read on first use and cached for the life of the set.

use map_common::{MapError, MapResult};
use once_cell::sync::OnceCell;
use rusttype::Font;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

struct FontEntry {
    path: PathBuf,
    /// `Some(None)` once a load attempt failed, so it is not retried.
    font: OnceCell<Option<Font<'static>>>,
}

impl FontEntry {
    fn new(path: PathBuf) -> Self {
        Self {
            path,
            font: OnceCell::new(),
        }
    }

    fn get(&self, name: &str) -> Option<&Font<'static>> {
        self.font
            .get_or_init(|| load_font(name, &self.path))
            .as_ref()
    }
}

fn load_font(name: &str, path: &Path) -> Option<Font<'static>> {
    let data = match std::fs::read(path) {
        Ok(data) => data,
        Err(e) => {
            tracing::warn!(font = name, path = %path.display(), error = %e, "Cannot read font file");
            return None;
        }
    };
    let font = Font::try_from_vec(data);
    match &font {
        Some(_) => tracing::debug!(font = name, path = %path.display(), "Loaded font"),
        None => tracing::warn!(font = name, path = %path.display(), "Not a usable TrueType font"),
    }
    font
}

/// Named fonts for label rendering.
#[derive(Default)]
pub struct FontSet {
    entries: HashMap<String, FontEntry>,
}

impl FontSet {
    /// A set with no fonts; every label is skipped.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parse a font list. Relative paths are joined to `base_dir`.
    pub fn parse(text: &str, base_dir: &Path) -> MapResult<Self> {
        let mut entries = HashMap::new();

        for (number, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let Some((name, path)) = line.split_once(char::is_whitespace) else {
                return Err(MapError::Config(format!(
                    "font list line {}: expected `name path`, got {:?}",
                    number + 1,
                    line
                )));
            };

            let path = PathBuf::from(path.trim());
            let path = if path.is_relative() {
                base_dir.join(path)
            } else {
                path
            };

            if entries.insert(name.to_string(), FontEntry::new(path)).is_some() {
                tracing::warn!(font = name, line = number + 1, "Duplicate font name, last entry wins");
            }
        }

        Ok(Self { entries })
    }

    /// Read and parse a font list file.
    pub fn load(path: impl AsRef<Path>) -> MapResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            MapError::Config(format!("cannot read font list {}: {}", path.display(), e))
        })?;
        let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
        let set = Self::parse(&text, base_dir)?;
        tracing::debug!(path = %path.display(), fonts = set.len(), "Loaded font list");
        Ok(set)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn path(&self, name: &str) -> Option<&Path> {
        self.entries.get(name).map(|entry| entry.path.as_path())
    }

    /// The font registered as `name`, loading it on first use. `None` when the
    /// name is unknown or the file cannot be used.
    pub fn font(&self, name: &str) -> Option<&Font<'static>> {
        match self.entries.get(name) {
            Some(entry) => entry.get(name),
            None => {
                tracing::warn!(font = name, "Unknown font name");
                None
            }
        }
    }
}

impl fmt::Debug for FontSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.entries.iter().map(|(name, entry)| (name, &entry.path)))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_comments_and_relative_paths() {
        let text = "\
# fonts
default   /usr/share/fonts/a.ttf

bold fonts/b.ttf   
";
        let set = FontSet::parse(text, Path::new("/etc/mapserver")).unwrap();
        assert_eq!(set.names(), vec!["bold", "default"]);
        assert_eq!(set.path("default"), Some(Path::new("/usr/share/fonts/a.ttf")));
        assert_eq!(set.path("bold"), Some(Path::new("/etc/mapserver/fonts/b.ttf")));
    }

    #[test]
    fn test_parse_keeps_spaces_inside_path() {
        let set = FontSet::parse("title /opt/My Fonts/t.ttf", Path::new("/")).unwrap();
        assert_eq!(set.path("title"), Some(Path::new("/opt/My Fonts/t.ttf")));
    }

    #[test]
    fn test_parse_duplicate_last_wins() {
        let set = FontSet::parse("a /one.ttf\na /two.ttf\n", Path::new("/")).unwrap();
        assert_eq!(set.len(), 1);
        assert_eq!(set.path("a"), Some(Path::new("/two.ttf")));
    }

    #[test]
    fn test_parse_rejects_name_without_path() {
        let err = FontSet::parse("ok /a.ttf\nlonely\n", Path::new("/")).unwrap_err();
        assert!(matches!(err, MapError::Config(_)));
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn test_missing_font_file_is_not_an_error() {
        let set = FontSet::parse("ghost /nonexistent/ghost.ttf", Path::new("/")).unwrap();
        assert!(set.contains("ghost"));
        assert!(set.font("ghost").is_none());
        // Cached failure
        assert!(set.font("ghost").is_none());
        assert!(set.font("unknown").is_none());
    }

    #[test]
    fn test_garbage_font_file() {
        let dir = test_utils::temp_test_dir();
        std::fs::write(dir.path().join("bad.ttf"), b"not a font").unwrap();
        std::fs::write(dir.path().join("fontset"), "bad bad.ttf\n").unwrap();

        let set = FontSet::load(dir.path().join("fontset")).unwrap();
        assert!(set.font("bad").is_none());
    }

    #[test]
    fn test_load_missing_list() {
        let err = FontSet::load("/nonexistent/fontset").unwrap_err();
        assert!(matches!(err, MapError::Config(_)));
    }

    #[test]
    fn test_shipped_font_list_parses() {
        let set = FontSet::load(crate::config::default_fontset_path()).unwrap();
        assert!(set.contains("default"));
    }
}
