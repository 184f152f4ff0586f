use crate::roster::{Roster, normalize_key};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::cell::Cell;
use std::collections::HashMap;
use std::path::Path;

static IMAGE_EXT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\.(jpe?g|png)$").expect("valid image extension regex"));

const PROBE_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

/// Opaque image reference handed to the renderer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssetRef {
    pub href: String,
}

impl AssetRef {
    pub fn new(href: impl Into<String>) -> Self {
        Self { href: href.into() }
    }
}

/// Source of seat images. Every reference returned by `acquire` is handed back
/// through `release` once the render that asked for it is finished.
pub trait AssetResolver {
    fn acquire(&self, key: &str) -> Option<AssetRef>;

    fn release(&self, _asset: &AssetRef) {}
}

pub struct NoAssets;

impl AssetResolver for NoAssets {
    fn acquire(&self, _key: &str) -> Option<AssetRef> {
        None
    }
}

/// Assets acquired during one render pass; all of them are released on drop.
pub struct AssetLeases<'r> {
    resolver: &'r dyn AssetResolver,
    held: Vec<AssetRef>,
}

impl<'r> AssetLeases<'r> {
    pub fn new(resolver: &'r dyn AssetResolver) -> Self {
        Self {
            resolver,
            held: Vec::new(),
        }
    }

    pub fn acquire(&mut self, key: &str) -> Option<AssetRef> {
        let asset = self.resolver.acquire(key)?;
        self.held.push(asset.clone());
        Some(asset)
    }

    pub fn len(&self) -> usize {
        self.held.len()
    }

    pub fn is_empty(&self) -> bool {
        self.held.is_empty()
    }
}

impl Drop for AssetLeases<'_> {
    fn drop(&mut self) {
        for asset in self.held.drain(..) {
            self.resolver.release(&asset);
        }
    }
}

/// Lookup key for an image file: the file stem, trimmed and lower-cased.
pub fn normalize_base_name(file_name: &str) -> String {
    let base = match file_name.rfind('.') {
        Some(dot) => &file_name[..dot],
        None => file_name,
    };
    normalize_key(base)
}

/// Preference among files sharing a key: jpg, then jpeg, then png.
pub fn extension_rank(file_name: &str) -> u8 {
    let Some(caps) = IMAGE_EXT_RE.captures(file_name) else {
        return 0;
    };
    match caps[1].to_ascii_lowercase().as_str() {
        "jpg" => 3,
        "jpeg" => 2,
        "png" => 1,
        _ => 0,
    }
}

pub fn is_image_file(file_name: &str) -> bool {
    IMAGE_EXT_RE.is_match(file_name)
}

#[derive(Debug, Default)]
pub struct AssetCatalog {
    entries: HashMap<String, AssetRef>,
    outstanding: Cell<usize>,
}

impl AssetCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a catalog from image file names, keeping the preferred
    /// extension when several files share a stem.
    pub fn from_file_names<'a>(names: impl IntoIterator<Item = &'a str>, base: &str) -> Self {
        let mut best: HashMap<String, (&'a str, u8)> = HashMap::new();
        for name in names {
            let key = normalize_base_name(name);
            if key.is_empty() {
                continue;
            }
            let rank = extension_rank(name);
            let keep_existing = best.get(&key).is_some_and(|(_, prev)| *prev >= rank);
            if !keep_existing {
                best.insert(key, (name, rank));
            }
        }
        let entries = best
            .into_iter()
            .map(|(key, (name, _))| (key, AssetRef::new(join_href(base, name))))
            .collect();
        Self {
            entries,
            outstanding: Cell::new(0),
        }
    }

    /// Lists image files in `dir`.
    pub fn scan_directory(dir: &Path) -> std::io::Result<Self> {
        let mut names = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                if is_image_file(name) {
                    names.push(name.to_string());
                }
            }
        }
        let base = dir.to_string_lossy();
        Ok(Self::from_file_names(names.iter().map(String::as_str), &base))
    }

    /// Looks for `<dir>/<name>.{jpg,jpeg,png}` for every roster name.
    pub fn probe_directory(dir: &Path, roster: &Roster) -> Self {
        let mut catalog = Self::new();
        for (_, _, name) in roster.flatten() {
            let base = name.trim();
            let found = PROBE_EXTENSIONS
                .iter()
                .map(|ext| dir.join(format!("{base}.{ext}")))
                .filter(|path| path.is_file())
                .max_by_key(|path| extension_rank(&path.to_string_lossy()));
            if let Some(path) = found {
                catalog.insert(base, AssetRef::new(path.to_string_lossy()));
            }
        }
        tracing::debug!(dir = %dir.display(), found = catalog.len(), "probed picture directory");
        catalog
    }

    pub fn insert(&mut self, name: &str, asset: AssetRef) {
        self.entries.insert(normalize_key(name), asset);
    }

    /// Entries of `other` override or extend this catalog.
    pub fn merge(&mut self, other: AssetCatalog) {
        self.entries.extend(other.entries);
    }

    /// Looks up a picture by roster name; the name is normalized first.
    pub fn get(&self, name: &str) -> Option<&AssetRef> {
        self.entries.get(&normalize_key(name))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// References acquired and not yet released.
    pub fn outstanding(&self) -> usize {
        self.outstanding.get()
    }
}

impl AssetResolver for AssetCatalog {
    fn acquire(&self, key: &str) -> Option<AssetRef> {
        let asset = self.entries.get(key).cloned()?;
        self.outstanding.set(self.outstanding.get() + 1);
        Some(asset)
    }

    fn release(&self, _asset: &AssetRef) {
        self.outstanding.set(self.outstanding.get().saturating_sub(1));
    }
}

fn join_href(base: &str, name: &str) -> String {
    if base.is_empty() {
        return name.to_string();
    }
    format!("{}/{}", base.trim_end_matches(['/', '\\']), name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_name_strips_extension_and_case() {
        assert_eq!(normalize_base_name("Alice Smith.JPG"), "alice smith");
        assert_eq!(normalize_base_name("bob"), "bob");
        assert_eq!(normalize_base_name("a.b.png"), "a.b");
    }

    #[test]
    fn preferred_extension_wins() {
        let catalog = AssetCatalog::from_file_names(
            ["ann.png", "Ann.jpeg", "ann.JPG", "ben.png", "notes.txt"],
            "pics",
        );
        assert_eq!(catalog.get("ann").unwrap().href, "pics/ann.JPG");
        assert_eq!(catalog.get("ben").unwrap().href, "pics/ben.png");
        assert_eq!(catalog.get("notes").unwrap().href, "pics/notes.txt");
    }

    #[test]
    fn merge_overrides_existing_entries() {
        let mut catalog = AssetCatalog::from_file_names(["ann.png", "ben.png"], "auto");
        catalog.merge(AssetCatalog::from_file_names(["ann.jpg", "cy.jpg"], "manual"));
        assert_eq!(catalog.len(), 3);
        assert_eq!(catalog.get("ann").unwrap().href, "manual/ann.jpg");
        assert_eq!(catalog.get("ben").unwrap().href, "auto/ben.png");
    }

    #[test]
    fn leases_release_on_drop() {
        let catalog = AssetCatalog::from_file_names(["ann.png"], "");
        {
            let mut leases = AssetLeases::new(&catalog);
            assert!(leases.acquire("ann").is_some());
            assert!(leases.acquire("ann").is_some());
            assert!(leases.acquire("zed").is_none());
            assert_eq!(leases.len(), 2);
            assert_eq!(catalog.outstanding(), 2);
        }
        assert_eq!(catalog.outstanding(), 0);
    }

    #[test]
    fn extension_rank_orders_formats() {
        assert!(extension_rank("a.jpg") > extension_rank("a.jpeg"));
        assert!(extension_rank("a.jpeg") > extension_rank("a.PNG"));
        assert_eq!(extension_rank("a.gif"), 0);
        assert!(is_image_file("x.Jpeg"));
        assert!(!is_image_file("x.txt"));
    }
}
