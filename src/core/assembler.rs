/*
 * Pack export: turns an in-memory pack into the on-disk layout the game
 * consumes. Under the chosen output directory this produces
 *
 *   <pack_name>/
 *     aircraft/air<pack_name>.lst      (only when the category has entries)
 *     ground/gnd<pack_name>.lst
 *     scenery/sce<pack_name>.lst
 *     users/<user_name>/<pack_name>/   (every referenced source file, copied)
 *
 * which is exactly the tree an addon pack is zipped from. Every source file
 * is checked before anything is written, so a vanished file cannot leave a
 * half-built export behind.
 */
use super::dat_file::rewrite_identify;
use super::lst_format::{format_air_gnd_line, format_scenery_line};
use super::models::{AirGndEntry, Category, SceneryEntry};
use super::pack::Pack;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub enum AssemblyError {
    Io(io::Error),
    MissingSourceFile { entry: String, path: PathBuf },
    EmptyPackName,
    EmptyUserName,
}

impl From<io::Error> for AssemblyError {
    fn from(err: io::Error) -> Self {
        AssemblyError::Io(err)
    }
}

impl std::fmt::Display for AssemblyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AssemblyError::Io(e) => write!(f, "Pack assembly I/O error: {e}"),
            AssemblyError::MissingSourceFile { entry, path } => write!(
                f,
                "Source file for entry '{entry}' is missing: {}",
                path.display()
            ),
            AssemblyError::EmptyPackName => write!(f, "The pack needs a name before export."),
            AssemblyError::EmptyUserName => write!(f, "The pack needs a user name before export."),
        }
    }
}

impl std::error::Error for AssemblyError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AssemblyError::Io(e) => Some(e),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, AssemblyError>;

pub trait PackAssemblerOperations: Send + Sync {
    /// Builds the export tree for `pack` under `output_dir` and returns the
    /// pack root directory.
    fn assemble(&self, pack: &Pack, output_dir: &Path) -> Result<PathBuf>;
}

pub struct CorePackAssembler {}

impl CorePackAssembler {
    pub fn new() -> Self {
        CorePackAssembler {}
    }
}

impl Default for CorePackAssembler {
    fn default() -> Self {
        Self::new()
    }
}

impl PackAssemblerOperations for CorePackAssembler {
    fn assemble(&self, pack: &Pack, output_dir: &Path) -> Result<PathBuf> {
        if pack.pack_name.trim().is_empty() {
            return Err(AssemblyError::EmptyPackName);
        }
        if pack.user_name.trim().is_empty() {
            return Err(AssemblyError::EmptyUserName);
        }
        check_sources(pack)?;

        let pack_root = output_dir.join(&pack.pack_name);
        let assets_dir = pack_root
            .join("users")
            .join(&pack.user_name)
            .join(&pack.pack_name);
        fs::create_dir_all(&assets_dir)?;
        log::info!(
            "Assembler: exporting pack '{}' to {}",
            pack.pack_name,
            pack_root.display()
        );

        write_air_gnd_category(pack, Category::Aircraft, pack.aircraft(), &pack_root)?;
        write_air_gnd_category(pack, Category::Ground, pack.ground(), &pack_root)?;
        write_scenery_category(pack, &pack_root)?;

        for entry in pack.aircraft().iter().chain(pack.ground()) {
            copy_air_gnd_assets(entry, &assets_dir)?;
        }
        for entry in pack.scenery() {
            copy_scenery_assets(entry, &assets_dir)?;
        }

        log::info!("Assembler: pack '{}' exported", pack.pack_name);
        Ok(pack_root)
    }
}

/*
 * Verifies that every non-empty file slot of every entry still points at an
 * existing file. Runs before any directory is created; files can disappear
 * between store time and export time.
 */
fn check_sources(pack: &Pack) -> Result<()> {
    for entry in pack.aircraft().iter().chain(pack.ground()) {
        check_entry_sources(&entry.identify, &entry.path_fields())?;
    }
    for entry in pack.scenery() {
        check_entry_sources(&entry.map_name, &entry.path_fields())?;
    }
    Ok(())
}

fn check_entry_sources(name: &str, paths: &[&Path]) -> Result<()> {
    for path in paths {
        if !path.as_os_str().is_empty() && !path.is_file() {
            return Err(AssemblyError::MissingSourceFile {
                entry: name.to_string(),
                path: path.to_path_buf(),
            });
        }
    }
    Ok(())
}

fn write_lst(pack_root: &Path, category: Category, pack_name: &str, lines: &[String]) -> Result<()> {
    let dir = pack_root.join(category.export_subdir());
    fs::create_dir_all(&dir)?;
    let lst_path = dir.join(format!("{}{}.lst", category.lst_prefix(), pack_name));
    fs::write(&lst_path, lines.join("\n") + "\n")?;
    log::debug!(
        "Assembler: wrote {} {} lines to {}",
        lines.len(),
        category.display_name(),
        lst_path.display()
    );
    Ok(())
}

fn write_air_gnd_category(
    pack: &Pack,
    category: Category,
    entries: &[AirGndEntry],
    pack_root: &Path,
) -> Result<()> {
    if entries.is_empty() {
        return Ok(());
    }
    let lines: Vec<String> = entries
        .iter()
        .map(|e| format_air_gnd_line(e, &pack.user_name, &pack.pack_name))
        .collect();
    write_lst(pack_root, category, &pack.pack_name, &lines)
}

fn write_scenery_category(pack: &Pack, pack_root: &Path) -> Result<()> {
    if pack.scenery().is_empty() {
        return Ok(());
    }
    let lines: Vec<String> = pack
        .scenery()
        .iter()
        .map(|e| format_scenery_line(e, &pack.user_name, &pack.pack_name))
        .collect();
    write_lst(pack_root, Category::Scenery, &pack.pack_name, &lines)
}

/// Copies `source` into `assets_dir`, optionally under a different file name.
/// Returns the destination path. An empty source path is skipped.
fn copy_asset(source: &Path, assets_dir: &Path, rename: Option<&str>) -> Result<Option<PathBuf>> {
    if source.as_os_str().is_empty() {
        return Ok(None);
    }
    let file_name: std::ffi::OsString = match rename {
        Some(name) => name.into(),
        None => match source.file_name() {
            Some(name) => name.to_os_string(),
            None => return Ok(None),
        },
    };
    let dest = assets_dir.join(file_name);
    fs::copy(source, &dest)?;
    Ok(Some(dest))
}

fn copy_air_gnd_assets(entry: &AirGndEntry, assets_dir: &Path) -> Result<()> {
    let rename = if entry.dat_rename && !entry.dat_new_name.is_empty() {
        Some(entry.dat_new_name.as_str())
    } else {
        None
    };
    if let Some(dat_copy) = copy_asset(&entry.dat, assets_dir, rename)? {
        if rename.is_some() {
            // The shipped DAT declares the stored name, not whatever the
            // source file happened to say.
            rewrite_identify(&dat_copy, &entry.identify)?;
        }
    }
    copy_asset(&entry.visual_model, assets_dir, None)?;
    copy_asset(&entry.collision, assets_dir, None)?;
    copy_asset(&entry.cockpit, assets_dir, None)?;
    copy_asset(&entry.coarse, assets_dir, None)?;
    Ok(())
}

fn copy_scenery_assets(entry: &SceneryEntry, assets_dir: &Path) -> Result<()> {
    copy_asset(&entry.map, assets_dir, None)?;
    copy_asset(&entry.start_position, assets_dir, None)?;
    copy_asset(&entry.mission, assets_dir, None)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        let mut f = File::create(&path).unwrap();
        write!(f, "{content}").unwrap();
        path
    }

    fn aircraft(dir: &TempDir, identify: &str) -> AirGndEntry {
        let mut e = AirGndEntry::new();
        e.identify = identify.to_string();
        e.dat = write_file(dir, &format!("{identify}.dat"), "IDENTIFY \"OLD\"\nREALPROP 0\n");
        e.visual_model = write_file(dir, &format!("{identify}.dnm"), "dnm");
        e.collision = write_file(dir, &format!("{identify}.srf"), "srf");
        e
    }

    fn scenery(dir: &TempDir, map_name: &str) -> SceneryEntry {
        let mut e = SceneryEntry::new();
        e.map_name = map_name.to_string();
        e.map = write_file(dir, &format!("{map_name}.fld"), "fld");
        e.start_position = write_file(dir, &format!("{map_name}.stp"), "stp");
        e
    }

    fn sample_pack(src: &TempDir) -> Pack {
        let mut pack = Pack::new("Pack1".into(), "Bob".into());
        pack.store_air_gnd(Category::Aircraft, aircraft(src, "Foo"), None)
            .unwrap();
        pack.store_scenery(scenery(src, "Island"), None).unwrap();
        pack
    }

    #[test]
    fn test_assemble_builds_expected_tree() {
        let src = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        let pack = sample_pack(&src);

        let pack_root = CorePackAssembler::new().assemble(&pack, out.path()).unwrap();
        assert_eq!(pack_root, out.path().join("Pack1"));

        let air_lst =
            fs::read_to_string(pack_root.join("aircraft").join("airPack1.lst")).unwrap();
        assert_eq!(
            air_lst,
            "\"users/Bob/Pack1/Foo.dat\" \"users/Bob/Pack1/Foo.dnm\" \"users/Bob/Pack1/Foo.srf\" \"\" \"\"\n"
        );

        let sce_lst =
            fs::read_to_string(pack_root.join("scenery").join("scePack1.lst")).unwrap();
        assert_eq!(
            sce_lst,
            "Island \"users/Bob/Pack1/Island.fld\" \"users/Bob/Pack1/Island.stp\" \"\"\n"
        );

        // Empty category: no directory, no list file.
        assert!(!pack_root.join("ground").exists());

        let assets = pack_root.join("users").join("Bob").join("Pack1");
        for name in ["Foo.dat", "Foo.dnm", "Foo.srf", "Island.fld", "Island.stp"] {
            assert!(assets.join(name).is_file(), "missing asset {name}");
        }
    }

    #[test]
    fn test_dat_rename_ships_renamed_copy_with_rewritten_identify() {
        let src = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        let mut entry = aircraft(&src, "F-16 Custom");
        entry.dat_rename = true;
        entry.dat_new_name = "f16_custom.dat".to_string();
        let mut pack = Pack::new("Jets".into(), "Ann".into());
        pack.store_air_gnd(Category::Aircraft, entry, None).unwrap();

        let pack_root = CorePackAssembler::new().assemble(&pack, out.path()).unwrap();

        let assets = pack_root.join("users").join("Ann").join("Jets");
        assert!(assets.join("f16_custom.dat").is_file());
        assert!(!assets.join("F-16 Custom.dat").exists());

        let shipped = fs::read_to_string(assets.join("f16_custom.dat")).unwrap();
        assert!(shipped.starts_with("IDENTIFY \"F-16 Custom\"\n"));

        // The original source file is untouched.
        let original = fs::read_to_string(src.path().join("F-16 Custom.dat")).unwrap();
        assert!(original.starts_with("IDENTIFY \"OLD\""));

        let air_lst = fs::read_to_string(pack_root.join("aircraft").join("airJets.lst")).unwrap();
        assert!(air_lst.starts_with("\"users/Ann/Jets/f16_custom.dat\" "));
    }

    #[test]
    fn test_missing_source_aborts_before_writing_anything() {
        let src = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        let mut pack = sample_pack(&src);
        // Entry passes store-time validation, then its collision file vanishes.
        let gone = aircraft(&src, "Vanishing");
        fs::remove_file(&gone.collision).unwrap();
        pack.push_air_gnd_unchecked(Category::Aircraft, gone);

        let err = CorePackAssembler::new()
            .assemble(&pack, out.path())
            .unwrap_err();
        match err {
            AssemblyError::MissingSourceFile { entry, path } => {
                assert_eq!(entry, "Vanishing");
                assert!(path.to_string_lossy().ends_with("Vanishing.srf"));
            }
            other => panic!("Expected MissingSourceFile, got {other:?}"),
        }
        assert!(!out.path().join("Pack1").exists());
    }

    #[test]
    fn test_empty_names_rejected() {
        let out = TempDir::new().unwrap();
        let assembler = CorePackAssembler::new();

        let pack = Pack::new("".into(), "Bob".into());
        assert!(matches!(
            assembler.assemble(&pack, out.path()).unwrap_err(),
            AssemblyError::EmptyPackName
        ));

        let pack = Pack::new("Pack1".into(), "  ".into());
        assert!(matches!(
            assembler.assemble(&pack, out.path()).unwrap_err(),
            AssemblyError::EmptyUserName
        ));
    }

    #[test]
    fn test_scenery_map_name_spaces_underscored_in_lst() {
        let src = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        let mut entry = scenery(&src, "Race Course");
        entry.air_race = true;
        let mut pack = Pack::new("Maps".into(), "Bob".into());
        pack.store_scenery(entry, None).unwrap();

        let pack_root = CorePackAssembler::new().assemble(&pack, out.path()).unwrap();
        let sce_lst = fs::read_to_string(pack_root.join("scenery").join("sceMaps.lst")).unwrap();
        assert!(sce_lst.starts_with("Race_Course "));
        assert!(sce_lst.trim_end().ends_with(" AIRRACE"));
    }
}
