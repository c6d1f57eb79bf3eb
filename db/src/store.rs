//! Persistence of the catalog, tool trees and generated scripts.

use std::collections::{BTreeMap, HashSet};
use std::ffi::OsString;
use std::fs::File;
use std::io::{BufReader, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use tabgen_core::Tool;
use tabgen_generator::Shell;
use tracing::debug;

use crate::catalog::Catalog;
use crate::error::{Result, StorageError};

/// Where the pipeline reads cache records and writes its results.
///
/// Implementations are shared by every worker, so writes for different tools
/// may arrive concurrently.
pub trait CatalogStore: Send + Sync {
    /// Loads the catalog; a store that has none yet returns an empty one.
    fn load_catalog(&self) -> Result<Catalog>;

    fn save_catalog(&self, catalog: &Catalog) -> Result<()>;

    /// Saves the extracted tree of one tool.
    fn save_tool(&self, tool: &Tool) -> Result<()>;

    /// Saves a generated script keyed by tool name and shell.
    fn save_script(&self, name: &str, shell: Shell, script: &str) -> Result<()>;
}

/// Rejects names that would escape the storage directories.
fn check_tool_name(name: &str) -> Result<()> {
    if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\', '\0']) {
        return Err(StorageError::InvalidToolName(name.to_string()));
    }
    Ok(())
}

/// Writes `path` by way of a `.tmp` sibling that is renamed over it once
/// every byte is on disk. On failure the previous file is left untouched.
pub(crate) fn write_atomic<F>(path: &Path, write: F) -> Result<()>
where
    F: FnOnce(&mut BufWriter<File>) -> Result<()>,
{
    let tmp = tmp_path(path);
    let result = File::create(&tmp)
        .map_err(StorageError::from)
        .and_then(|file| {
            let mut writer = BufWriter::new(file);
            write(&mut writer)?;
            finish(writer)?.sync_all()?;
            Ok(())
        })
        .and_then(|()| Ok(std::fs::rename(&tmp, path)?));

    if result.is_err() {
        let _ = std::fs::remove_file(&tmp);
    }
    result
}

/// Flushes `writer` and hands back the inner writer. Dropping a `BufWriter`
/// discards flush errors, so every buffered write ends here.
pub(crate) fn finish<W: Write>(writer: BufWriter<W>) -> std::io::Result<W> {
    writer.into_inner().map_err(|e| e.into_error())
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(OsString::from).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// JSON files and script files under one base directory.
///
/// ```text
/// <base>/catalog.json
/// <base>/tools/<name>.json
/// <base>/completions/bash/<name>
/// <base>/completions/zsh/_<name>
/// ```
#[derive(Debug, Clone)]
pub struct FileStore {
    base_dir: PathBuf,
}

impl FileStore {
    /// Opens a store, creating its directories.
    ///
    /// # Errors
    ///
    /// Returns [`Io`](StorageError::Io) if a directory cannot be created.
    pub fn open(base_dir: impl Into<PathBuf>) -> Result<Self> {
        let store = Self {
            base_dir: base_dir.into(),
        };
        for dir in [
            store.base_dir.clone(),
            store.base_dir.join("tools"),
            store.completion_dir(Shell::Bash),
            store.completion_dir(Shell::Zsh),
        ] {
            std::fs::create_dir_all(&dir)?;
        }
        debug!(base_dir = %store.base_dir.display(), "Opened catalog store");
        Ok(store)
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn catalog_path(&self) -> PathBuf {
        self.base_dir.join("catalog.json")
    }

    pub fn tool_path(&self, name: &str) -> PathBuf {
        self.base_dir.join("tools").join(format!("{name}.json"))
    }

    pub fn completion_dir(&self, shell: Shell) -> PathBuf {
        self.base_dir.join("completions").join(shell.as_str())
    }

    pub fn script_path(&self, name: &str, shell: Shell) -> PathBuf {
        self.completion_dir(shell).join(shell.script_file_name(name))
    }

    /// Loads a previously saved tool tree.
    pub fn load_tool(&self, name: &str) -> Result<Tool> {
        check_tool_name(name)?;
        let file = File::open(self.tool_path(name))?;
        let tool = serde_json::from_reader(BufReader::new(file))?;
        Ok(tool)
    }
}

impl CatalogStore for FileStore {
    fn load_catalog(&self) -> Result<Catalog> {
        let file = match File::open(self.catalog_path()) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Catalog::default()),
            Err(e) => return Err(e.into()),
        };
        let catalog = serde_json::from_reader(BufReader::new(file))?;
        Ok(catalog)
    }

    fn save_catalog(&self, catalog: &Catalog) -> Result<()> {
        write_atomic(&self.catalog_path(), |w| Ok(serde_json::to_writer_pretty(w, catalog)?))
    }

    fn save_tool(&self, tool: &Tool) -> Result<()> {
        check_tool_name(&tool.name)?;
        write_atomic(&self.tool_path(&tool.name), |w| Ok(serde_json::to_writer_pretty(w, tool)?))
    }

    fn save_script(&self, name: &str, shell: Shell, script: &str) -> Result<()> {
        check_tool_name(name)?;
        write_atomic(&self.script_path(name, shell), |w| Ok(w.write_all(script.as_bytes())?))
    }
}

#[derive(Debug, Default)]
struct MemoryState {
    catalog: Catalog,
    tools: BTreeMap<String, Tool>,
    scripts: BTreeMap<(String, Shell), String>,
    catalog_saves: usize,
}

/// In-memory store for tests.
///
/// # Examples
///
/// ```
/// use tabgen_core::Tool;
/// use tabgen_db::{CatalogStore, MemoryStore};
///
/// let store = MemoryStore::new().failing_for("broken");
/// assert!(store.save_tool(&Tool::new("ok", "/bin/ok")).is_ok());
/// assert!(store.save_tool(&Tool::new("broken", "/bin/broken")).is_err());
/// assert!(store.tool("ok").is_some());
/// ```
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
    failing: HashSet<String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_catalog(mut self, catalog: Catalog) -> Self {
        if let Ok(state) = self.state.get_mut() {
            state.catalog = catalog;
        }
        self
    }

    /// Makes every tool and script write for `name` fail.
    pub fn failing_for(mut self, name: &str) -> Self {
        self.failing.insert(name.to_string());
        self
    }

    pub fn catalog(&self) -> Catalog {
        self.lock().map(|s| s.catalog.clone()).unwrap_or_default()
    }

    pub fn tool(&self, name: &str) -> Option<Tool> {
        self.lock().ok().and_then(|s| s.tools.get(name).cloned())
    }

    pub fn script(&self, name: &str, shell: Shell) -> Option<String> {
        self.lock()
            .ok()
            .and_then(|s| s.scripts.get(&(name.to_string(), shell)).cloned())
    }

    /// Number of times the catalog has been saved.
    pub fn catalog_saves(&self) -> usize {
        self.lock().map(|s| s.catalog_saves).unwrap_or_default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, MemoryState>> {
        self.state
            .lock()
            .map_err(|_| StorageError::Io(std::io::Error::other("memory store lock poisoned")))
    }

    fn check_writable(&self, name: &str) -> Result<()> {
        check_tool_name(name)?;
        if self.failing.contains(name) {
            return Err(StorageError::Io(std::io::Error::new(
                ErrorKind::PermissionDenied,
                format!("write refused for {name}"),
            )));
        }
        Ok(())
    }
}

impl CatalogStore for MemoryStore {
    fn load_catalog(&self) -> Result<Catalog> {
        Ok(self.lock()?.catalog.clone())
    }

    fn save_catalog(&self, catalog: &Catalog) -> Result<()> {
        let mut state = self.lock()?;
        state.catalog = catalog.clone();
        state.catalog_saves += 1;
        Ok(())
    }

    fn save_tool(&self, tool: &Tool) -> Result<()> {
        self.check_writable(&tool.name)?;
        self.lock()?.tools.insert(tool.name.clone(), tool.clone());
        Ok(())
    }

    fn save_script(&self, name: &str, shell: Shell, script: &str) -> Result<()> {
        self.check_writable(name)?;
        self.lock()?
            .scripts
            .insert((name.to_string(), shell), script.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CatalogEntry;

    #[test]
    fn test_rejects_path_like_names() {
        for name in ["", ".", "..", "a/b", "..\\x"] {
            assert!(
                matches!(check_tool_name(name), Err(StorageError::InvalidToolName(_))),
                "{name:?}"
            );
        }
        assert!(check_tool_name("git-lfs").is_ok());
    }

    #[test]
    fn test_memory_store_round_trips_catalog() {
        let mut catalog = Catalog::default();
        catalog.insert(CatalogEntry::new("git", "/usr/bin/git"));
        let store = MemoryStore::new();

        store.save_catalog(&catalog).unwrap();
        assert_eq!(store.load_catalog().unwrap(), catalog);
        assert_eq!(store.catalog_saves(), 1);
    }

    #[test]
    fn test_memory_store_failing_tool_blocks_scripts() {
        let store = MemoryStore::new().failing_for("bad");
        assert!(store.save_script("bad", Shell::Bash, "x").is_err());
        store.save_script("good", Shell::Zsh, "#compdef good\n").unwrap();
        assert_eq!(store.script("good", Shell::Zsh).as_deref(), Some("#compdef good\n"));
        assert_eq!(store.script("good", Shell::Bash), None);
    }

    struct BrokenPipe;

    impl Write for BrokenPipe {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::new(ErrorKind::BrokenPipe, "reader went away"))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_finish_surfaces_buffered_write_errors() {
        let mut writer = BufWriter::new(BrokenPipe);
        // Small enough to sit in the buffer, so the error only shows on flush.
        writer.write_all(b"{}").unwrap();

        let err = finish(writer).err().unwrap();
        assert_eq!(err.kind(), ErrorKind::BrokenPipe);
        assert!(matches!(StorageError::from(err), StorageError::Io(_)));
    }

    #[test]
    fn test_failed_write_keeps_previous_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.json");
        std::fs::write(&path, "old").unwrap();

        let result = write_atomic(&path, |w| {
            w.write_all(b"half a docu")?;
            Err(StorageError::Io(std::io::Error::other("disk full")))
        });

        assert!(matches!(result, Err(StorageError::Io(_))));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "old");
        assert!(!tmp_path(&path).exists());
    }

    #[test]
    fn test_file_store_saves_leave_no_temp_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();
        let mut catalog = Catalog::default();
        catalog.insert(CatalogEntry::new("git", "/usr/bin/git"));

        store.save_catalog(&catalog).unwrap();
        store.save_catalog(&catalog).unwrap();
        store.save_tool(&Tool::new("git", "/usr/bin/git")).unwrap();
        store.save_script("git", Shell::Zsh, "#compdef git\n").unwrap();

        assert_eq!(store.load_catalog().unwrap(), catalog);
        assert_eq!(store.load_tool("git").unwrap().path, "/usr/bin/git");
        assert_eq!(
            std::fs::read_to_string(store.script_path("git", Shell::Zsh)).unwrap(),
            "#compdef git\n"
        );
        for sub in ["", "tools", "completions/zsh"] {
            for entry in std::fs::read_dir(dir.path().join(sub)).unwrap() {
                let name = entry.unwrap().file_name();
                assert!(!name.to_string_lossy().ends_with(".tmp"), "{name:?}");
            }
        }
    }

    #[test]
    fn test_tmp_path_appends_suffix() {
        assert_eq!(
            tmp_path(Path::new("/x/tools/git.json")),
            PathBuf::from("/x/tools/git.json.tmp")
        );
        assert_eq!(tmp_path(Path::new("/x/zsh/_git")), PathBuf::from("/x/zsh/_git.tmp"));
    }
}
