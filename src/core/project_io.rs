/*
 * The project save-file codec (`.cfg`). A project file captures the whole
 * in-memory pack, display order included, as a line-oriented text format:
 *
 *   line 1: tool title
 *   line 2: v<version>
 *   line 3: DELIMITER:<delim>   (recorded so future tool versions can adapt)
 *   PACK_NAME/USER_NAME records, then per category a <CATEGORY>_BLOCK pair
 *   wrapping repeated <CATEGORY> .. END_<CATEGORY> entry blocks of
 *   KEY<delim>VALUE lines.
 *
 * Unknown keys inside an entry block are ignored (files written by newer
 * versions stay loadable); unknown lines outside blocks are likewise skipped.
 * Structural damage is not tolerated: a missing version header, an entry line
 * without the delimiter, an unbalanced entry marker or a duplicate
 * identifying name fails the whole load. Parsing builds a fresh `Pack`, so a
 * failed load never corrupts the caller's in-memory state.
 *
 * The `ProjectStoreOperations` trait is the seam the controller depends on;
 * `CoreProjectStore` is the file-system backed implementation.
 */
use super::models::{AirGndEntry, Category, SceneryEntry};
use super::pack::Pack;
use std::fs;
use std::io;
use std::path::Path;

pub const TOOL_TITLE: &str = "YSFlight Pack Builder";
pub const TOOL_VERSION: &str = env!("CARGO_PKG_VERSION");
pub const DEFAULT_DELIMITER: &str = ":=";
pub const PROJECT_FILE_EXTENSION: &str = "cfg";

const DELIMITER_PREFIX: &str = "DELIMITER:";
const PACK_NAME_KEY: &str = "PACK_NAME";
const USER_NAME_KEY: &str = "USER_NAME";

#[derive(Debug)]
pub enum ProjectFileError {
    Io(io::Error),
    MissingHeader,
    MalformedLine { line_number: usize, content: String },
    DuplicateName { category: Category, name: String },
}

impl From<io::Error> for ProjectFileError {
    fn from(err: io::Error) -> Self {
        ProjectFileError::Io(err)
    }
}

impl std::fmt::Display for ProjectFileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProjectFileError::Io(e) => write!(f, "Project file I/O error: {e}"),
            ProjectFileError::MissingHeader => {
                write!(f, "Not a {TOOL_TITLE} project file: version header missing")
            }
            ProjectFileError::MalformedLine {
                line_number,
                content,
            } => write!(f, "Malformed project file line {line_number}: '{content}'"),
            ProjectFileError::DuplicateName { category, name } => write!(
                f,
                "Project file contains two {} entries named '{}'",
                category.display_name(),
                name
            ),
        }
    }
}

impl std::error::Error for ProjectFileError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ProjectFileError::Io(e) => Some(e),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ProjectFileError>;

pub trait ProjectStoreOperations: Send + Sync {
    fn save_project(&self, path: &Path, pack: &Pack) -> Result<()>;
    fn load_project(&self, path: &Path) -> Result<Pack>;
}

pub struct CoreProjectStore {}

impl CoreProjectStore {
    pub fn new() -> Self {
        CoreProjectStore {}
    }
}

impl Default for CoreProjectStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ProjectStoreOperations for CoreProjectStore {
    fn save_project(&self, path: &Path, pack: &Pack) -> Result<()> {
        log::trace!("CoreProjectStore: Saving project to {path:?}");
        fs::write(path, serialize_pack(pack))?;
        log::debug!(
            "CoreProjectStore: Saved project '{}' ({} aircraft, {} ground, {} scenery) to {path:?}",
            pack.pack_name,
            pack.entry_count(Category::Aircraft),
            pack.entry_count(Category::Ground),
            pack.entry_count(Category::Scenery),
        );
        Ok(())
    }

    fn load_project(&self, path: &Path) -> Result<Pack> {
        log::trace!("CoreProjectStore: Loading project from {path:?}");
        let text = fs::read_to_string(path)?;
        let pack = parse_pack(&text)?;
        log::debug!(
            "CoreProjectStore: Loaded project '{}' from {path:?}",
            pack.pack_name
        );
        Ok(pack)
    }
}

/// Serializes the pack into the project file text. Entries appear in display
/// order; every category block is written even when empty.
pub fn serialize_pack(pack: &Pack) -> String {
    let d = DEFAULT_DELIMITER;
    let mut lines: Vec<String> = vec![
        TOOL_TITLE.to_string(),
        format!("v{TOOL_VERSION}"),
        format!("{DELIMITER_PREFIX}{d}"),
        format!("{PACK_NAME_KEY}{d}{}", pack.pack_name),
        format!("{USER_NAME_KEY}{d}{}", pack.user_name),
    ];

    push_air_gnd_block(&mut lines, Category::Aircraft, pack.aircraft());
    push_air_gnd_block(&mut lines, Category::Ground, pack.ground());

    lines.push(Category::Scenery.block_marker().to_string());
    for entry in pack.scenery() {
        lines.push(Category::Scenery.entry_marker().to_string());
        for (key, value) in entry.save_fields() {
            lines.push(format!("{key}{d}{value}"));
        }
        lines.push(Category::Scenery.entry_end_marker().to_string());
    }
    lines.push(Category::Scenery.block_marker().to_string());

    lines.join("\n") + "\n"
}

fn push_air_gnd_block(lines: &mut Vec<String>, category: Category, entries: &[AirGndEntry]) {
    let d = DEFAULT_DELIMITER;
    lines.push(category.block_marker().to_string());
    for entry in entries {
        lines.push(category.entry_marker().to_string());
        for (key, value) in entry.save_fields() {
            lines.push(format!("{key}{d}{value}"));
        }
        lines.push(category.entry_end_marker().to_string());
    }
    lines.push(category.block_marker().to_string());
}

// Parser state: which entry block we are inside, if any.
enum OpenEntry {
    AirGnd(Category, AirGndEntry),
    Scenery(SceneryEntry),
}

impl OpenEntry {
    fn category(&self) -> Category {
        match self {
            OpenEntry::AirGnd(category, _) => *category,
            OpenEntry::Scenery(_) => Category::Scenery,
        }
    }
}

/// Parses project file text into a fresh `Pack`.
pub fn parse_pack(text: &str) -> Result<Pack> {
    let lines: Vec<&str> = text.lines().map(|l| l.trim_end_matches('\r')).collect();
    if lines.len() < 2 || !lines[1].starts_with('v') {
        return Err(ProjectFileError::MissingHeader);
    }

    let delimiter = match lines.get(2).and_then(|l| l.strip_prefix(DELIMITER_PREFIX)) {
        Some(d) if !d.is_empty() => d,
        _ => {
            log::debug!(
                "ProjectIo: no delimiter record on line 3, falling back to '{DEFAULT_DELIMITER}'"
            );
            DEFAULT_DELIMITER
        }
    };

    let mut pack = Pack::default();
    let mut open: Option<OpenEntry> = None;

    for (idx, line) in lines.iter().enumerate().skip(2) {
        let line_number = idx + 1;
        if line.is_empty() || line.starts_with(DELIMITER_PREFIX) {
            continue;
        }

        if let Some(category) = Category::ALL.iter().find(|c| *line == c.entry_marker()) {
            if open.is_some() {
                // Entry marker inside an unclosed entry: structural damage.
                return Err(ProjectFileError::MalformedLine {
                    line_number,
                    content: line.to_string(),
                });
            }
            open = Some(match category {
                Category::Scenery => OpenEntry::Scenery(SceneryEntry::new()),
                cat => OpenEntry::AirGnd(*cat, AirGndEntry::new()),
            });
            continue;
        }

        if let Some(category) = Category::ALL.iter().find(|c| *line == c.entry_end_marker()) {
            match open.take() {
                // The end marker must close the entry that is actually open;
                // END_GROUND after AIRCRAFT is structural damage.
                Some(entry) if entry.category() == *category => commit_entry(&mut pack, entry)?,
                _ => {
                    return Err(ProjectFileError::MalformedLine {
                        line_number,
                        content: line.to_string(),
                    });
                }
            }
            continue;
        }

        if Category::ALL.iter().any(|c| *line == c.block_marker()) {
            continue;
        }

        match &mut open {
            Some(entry) => {
                let Some((key, value)) = line.split_once(delimiter) else {
                    return Err(ProjectFileError::MalformedLine {
                        line_number,
                        content: line.to_string(),
                    });
                };
                let known = match entry {
                    OpenEntry::AirGnd(_, e) => e.apply_save_field(key, value),
                    OpenEntry::Scenery(e) => e.apply_save_field(key, value),
                };
                if !known {
                    log::debug!("ProjectIo: ignoring unknown entry key '{key}' on line {line_number}");
                }
            }
            None => {
                // Header region between blocks. Known records are applied,
                // anything else is tolerated for forward compatibility.
                match line.split_once(delimiter) {
                    Some((PACK_NAME_KEY, value)) => pack.pack_name = value.to_string(),
                    Some((USER_NAME_KEY, value)) => pack.user_name = value.to_string(),
                    _ => log::trace!("ProjectIo: skipping header line {line_number}: '{line}'"),
                }
            }
        }
    }

    Ok(pack)
}

/*
 * Commits a parsed entry to the pack, enforcing the per-category uniqueness
 * invariant. Store-time file-existence validation deliberately does not
 * re-run here: a project must stay loadable on a machine where the source
 * files have moved, so the user can repair the paths.
 */
fn commit_entry(pack: &mut Pack, entry: OpenEntry) -> Result<()> {
    match entry {
        OpenEntry::AirGnd(category, e) => {
            if pack.find_air_gnd(category, &e.identify).is_some() {
                return Err(ProjectFileError::DuplicateName {
                    category,
                    name: e.identify,
                });
            }
            pack.push_air_gnd_unchecked(category, e);
        }
        OpenEntry::Scenery(e) => {
            if pack.find_scenery(&e.map_name).is_some() {
                return Err(ProjectFileError::DuplicateName {
                    category: Category::Scenery,
                    name: e.map_name,
                });
            }
            pack.push_scenery_unchecked(e);
        }
    }
    Ok(())
}
