//! Page store - loads flat pages from the pages directory

use anyhow::Result;
use indexmap::IndexMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use std::time::SystemTime;
use walkdir::WalkDir;

use super::FlatPage;

/// Relative path, modification time and size of every page file
type Fingerprint = Vec<(PathBuf, Option<SystemTime>, u64)>;

#[derive(Debug, Default)]
struct Loaded {
    pages: IndexMap<String, Arc<FlatPage>>,
    fingerprint: Fingerprint,
}

/// All flat pages of the site, keyed by path
#[derive(Debug)]
pub struct PageStore {
    root: PathBuf,
    extension: String,
    auto_reload: bool,
    loaded: RwLock<Loaded>,
}

impl PageStore {
    /// Load every page under `root` ending with `extension`
    pub fn open<P: AsRef<Path>>(root: P, extension: &str, auto_reload: bool) -> Result<Self> {
        let store = Self {
            root: root.as_ref().to_path_buf(),
            extension: normalize_extension(extension),
            auto_reload,
            loaded: RwLock::new(Loaded::default()),
        };
        store.reload()?;
        Ok(store)
    }

    /// Re-read the whole directory
    pub fn reload(&self) -> Result<()> {
        let loaded = self.load_all()?;
        tracing::info!("Loaded {} pages from {:?}", loaded.pages.len(), self.root);
        let mut guard = self
            .loaded
            .write()
            .map_err(|_| anyhow::anyhow!("page store lock poisoned"))?;
        *guard = loaded;
        Ok(())
    }

    /// Look up a page by path
    pub fn get(&self, path: &str) -> Option<Arc<FlatPage>> {
        self.refresh();
        let guard = self.loaded.read().ok()?;
        guard.pages.get(path.trim_matches('/')).cloned()
    }

    /// Snapshot of all pages, sorted by path
    pub fn pages(&self) -> Vec<Arc<FlatPage>> {
        self.refresh();
        match self.loaded.read() {
            Ok(guard) => guard.pages.values().cloned().collect(),
            Err(_) => Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.loaded.read().map(|g| g.pages.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Reload when auto-reload is on and files changed
    fn refresh(&self) {
        if !self.auto_reload {
            return;
        }

        let current = self.fingerprint();
        let stale = self
            .loaded
            .read()
            .map(|g| g.fingerprint != current)
            .unwrap_or(true);

        if stale {
            tracing::debug!("Pages changed on disk, reloading");
            if let Err(e) = self.reload() {
                tracing::warn!("Failed to reload pages: {}", e);
            }
        }
    }

    fn page_files(&self) -> impl Iterator<Item = walkdir::DirEntry> + '_ {
        WalkDir::new(&self.root)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter(|e| is_page_file(e.path(), &self.extension))
    }

    fn fingerprint(&self) -> Fingerprint {
        if !self.root.exists() {
            return Fingerprint::default();
        }
        self.page_files().map(|e| self.file_stamp(&e)).collect()
    }

    fn file_stamp(&self, entry: &walkdir::DirEntry) -> (PathBuf, Option<SystemTime>, u64) {
        let relative = entry
            .path()
            .strip_prefix(&self.root)
            .unwrap_or(entry.path())
            .to_path_buf();
        let metadata = entry.metadata().ok();
        let modified = metadata.as_ref().and_then(|m| m.modified().ok());
        let len = metadata.map(|m| m.len()).unwrap_or(0);
        (relative, modified, len)
    }

    fn load_all(&self) -> Result<Loaded> {
        let mut loaded = Loaded::default();
        if !self.root.exists() {
            tracing::warn!("Pages directory {:?} does not exist", self.root);
            return Ok(loaded);
        }

        for entry in self.page_files() {
            let path = entry.path();
            loaded.fingerprint.push(self.file_stamp(&entry));

            match self.load_page(path) {
                Ok(page) => {
                    loaded.pages.insert(page.path.clone(), Arc::new(page));
                }
                Err(e) => {
                    tracing::warn!("Failed to load page {:?}: {}", path, e);
                }
            }
        }

        loaded.pages.sort_keys();
        Ok(loaded)
    }

    fn load_page(&self, path: &Path) -> Result<FlatPage> {
        let content = fs::read_to_string(path)?;
        let page_path = self.page_path(path)?;
        Ok(FlatPage::parse(page_path, &content, path))
    }

    /// `<root>/blog/hello.md` -> `blog/hello`
    fn page_path(&self, path: &Path) -> Result<String> {
        let relative = path.strip_prefix(&self.root)?;
        let relative = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        let without_ext = relative
            .strip_suffix(&self.extension)
            .unwrap_or(&relative)
            .to_string();
        Ok(without_ext)
    }
}

fn normalize_extension(extension: &str) -> String {
    if extension.starts_with('.') {
        extension.to_string()
    } else {
        format!(".{}", extension)
    }
}

fn is_page_file(path: &Path, extension: &str) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(|n| n.ends_with(extension) && n.len() > extension.len())
        .unwrap_or(false)
}
