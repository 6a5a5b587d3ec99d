use std::path::{Path, PathBuf};

/*
 * The three kinds of LST entry a pack can hold. The enum carries the naming
 * conventions that differ per category: the LST file prefix, the export
 * subdirectory, and the markers used by the project save-file codec.
 */
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Aircraft,
    Ground,
    Scenery,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Aircraft, Category::Ground, Category::Scenery];

    /// Prefix of the generated list file, e.g. `air<pack>.lst`.
    pub fn lst_prefix(&self) -> &'static str {
        match self {
            Category::Aircraft => "air",
            Category::Ground => "gnd",
            Category::Scenery => "sce",
        }
    }

    /// Subdirectory of the exported pack that holds this category's list file.
    pub fn export_subdir(&self) -> &'static str {
        match self {
            Category::Aircraft => "aircraft",
            Category::Ground => "ground",
            Category::Scenery => "scenery",
        }
    }

    /// Marker opening one entry block in the project save file.
    pub fn entry_marker(&self) -> &'static str {
        match self {
            Category::Aircraft => "AIRCRAFT",
            Category::Ground => "GROUND",
            Category::Scenery => "SCENERY",
        }
    }

    /// Marker closing one entry block in the project save file.
    pub fn entry_end_marker(&self) -> &'static str {
        match self {
            Category::Aircraft => "END_AIRCRAFT",
            Category::Ground => "END_GROUND",
            Category::Scenery => "END_SCENERY",
        }
    }

    /// Marker wrapping the whole category section in the project save file.
    pub fn block_marker(&self) -> &'static str {
        match self {
            Category::Aircraft => "AIRCRAFT_BLOCK",
            Category::Ground => "GROUND_BLOCK",
            Category::Scenery => "SCENERY_BLOCK",
        }
    }

    /// Human-readable name for dialogs and error messages.
    pub fn display_name(&self) -> &'static str {
        match self {
            Category::Aircraft => "Aircraft",
            Category::Ground => "Ground Object",
            Category::Scenery => "Scenery",
        }
    }

    /// What the identifying name is called for this category.
    pub fn identity_label(&self) -> &'static str {
        match self {
            Category::Aircraft | Category::Ground => "IDENTIFY",
            Category::Scenery => "Scenery Name",
        }
    }

    pub fn field_count(&self) -> usize {
        field_schema(*self).len()
    }
}

/*
 * Declarative description of one file slot of an entry type: the label shown
 * in the UI and in validation messages, the attribute key used by the project
 * save file, whether a valid entry requires the file to exist, and the file
 * extensions the selection dialog should offer.
 */
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub label: &'static str,
    pub save_key: &'static str,
    pub required: bool,
    pub allowed_extensions: &'static [&'static str],
}

const AIR_GND_FIELDS: [FieldSpec; 5] = [
    FieldSpec {
        label: "DAT",
        save_key: "DAT",
        required: true,
        allowed_extensions: &["dat"],
    },
    FieldSpec {
        label: "Visual Model",
        save_key: "Visual_Model",
        required: true,
        allowed_extensions: &["dnm", "srf"],
    },
    FieldSpec {
        label: "Collision",
        save_key: "Collision",
        required: true,
        allowed_extensions: &["dnm", "srf"],
    },
    FieldSpec {
        label: "Cockpit",
        save_key: "Cockpit",
        required: false,
        allowed_extensions: &["dnm", "srf"],
    },
    FieldSpec {
        label: "Coarse",
        save_key: "Coarse",
        required: false,
        allowed_extensions: &["dnm", "srf"],
    },
];

const SCENERY_FIELDS: [FieldSpec; 3] = [
    FieldSpec {
        label: "Map",
        save_key: "Map",
        required: true,
        allowed_extensions: &["fld"],
    },
    FieldSpec {
        label: "Start Position",
        save_key: "Start_Position",
        required: true,
        allowed_extensions: &["stp"],
    },
    FieldSpec {
        label: "Mission",
        save_key: "Mission",
        required: false,
        allowed_extensions: &["yfs"],
    },
];

/// The ordered file-slot schema for a category. The order matches both the
/// LST line layout and the vertical order of the entry fields in the UI.
pub fn field_schema(category: Category) -> &'static [FieldSpec] {
    match category {
        Category::Aircraft | Category::Ground => &AIR_GND_FIELDS,
        Category::Scenery => &SCENERY_FIELDS,
    }
}

/*
 * One aircraft or ground-object LST entry. The five path fields mirror the
 * columns of an air/gnd LST line; an empty `PathBuf` means the optional slot
 * was left unset. These are the user's source paths, not pack-relative paths;
 * the relative form is derived at format time.
 *
 * `dat_rename`/`dat_new_name` let the user ship the DAT under a different
 * file name; the exported copy also gets its IDENTIFY line rewritten to match
 * `identify`. Entries are not serialized with serde; the project save file
 * has its own line-oriented codec (see `project_io`).
 */
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AirGndEntry {
    pub identify: String,
    pub dat: PathBuf,
    pub visual_model: PathBuf,
    pub collision: PathBuf,
    pub cockpit: PathBuf,
    pub coarse: PathBuf,
    pub dat_rename: bool,
    pub dat_new_name: String,
}

impl AirGndEntry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The path fields in LST column order, aligned with `field_schema`.
    pub fn path_fields(&self) -> [&Path; 5] {
        [
            &self.dat,
            &self.visual_model,
            &self.collision,
            &self.cockpit,
            &self.coarse,
        ]
    }

    pub fn set_path_field(&mut self, slot: usize, path: PathBuf) {
        match slot {
            0 => self.dat = path,
            1 => self.visual_model = path,
            2 => self.collision = path,
            3 => self.cockpit = path,
            4 => self.coarse = path,
            _ => log::error!("Models: ignoring out-of-range air/gnd slot {slot}"),
        }
    }

    /*
     * The ordered key/value pairs the project save file records for this
     * entry. Paths serialize as their lossy string form; booleans as
     * `true`/`false`.
     */
    pub fn save_fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("IDENTIFY", self.identify.clone()),
            ("DAT", self.dat.to_string_lossy().into_owned()),
            (
                "Visual_Model",
                self.visual_model.to_string_lossy().into_owned(),
            ),
            ("Collision", self.collision.to_string_lossy().into_owned()),
            ("Cockpit", self.cockpit.to_string_lossy().into_owned()),
            ("Coarse", self.coarse.to_string_lossy().into_owned()),
            ("dat_rename", self.dat_rename.to_string()),
            ("dat_new_name", self.dat_new_name.clone()),
        ]
    }

    /*
     * Applies one parsed save-file attribute. Returns false for keys this
     * entry type does not know, which the codec deliberately ignores so newer
     * files stay loadable (explicit replacement for the original's dynamic
     * attribute assignment).
     */
    pub fn apply_save_field(&mut self, key: &str, value: &str) -> bool {
        match key {
            "IDENTIFY" => self.identify = value.to_string(),
            "DAT" => self.dat = PathBuf::from(value),
            "Visual_Model" => self.visual_model = PathBuf::from(value),
            "Collision" => self.collision = PathBuf::from(value),
            "Cockpit" => self.cockpit = PathBuf::from(value),
            "Coarse" => self.coarse = PathBuf::from(value),
            "dat_rename" => self.dat_rename = parse_save_bool(value),
            "dat_new_name" => self.dat_new_name = value.to_string(),
            _ => return false,
        }
        true
    }
}

/*
 * One scenery LST entry: a user-chosen map name, the map/start-position/
 * mission files, and the 2018+ air-race flag that appends the AIRRACE token
 * to the formatted LST line.
 */
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SceneryEntry {
    pub map_name: String,
    pub map: PathBuf,
    pub start_position: PathBuf,
    pub mission: PathBuf,
    pub air_race: bool,
}

impl SceneryEntry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn path_fields(&self) -> [&Path; 3] {
        [&self.map, &self.start_position, &self.mission]
    }

    pub fn set_path_field(&mut self, slot: usize, path: PathBuf) {
        match slot {
            0 => self.map = path,
            1 => self.start_position = path,
            2 => self.mission = path,
            _ => log::error!("Models: ignoring out-of-range scenery slot {slot}"),
        }
    }

    pub fn save_fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("map_name", self.map_name.clone()),
            ("Map", self.map.to_string_lossy().into_owned()),
            (
                "Start_Position",
                self.start_position.to_string_lossy().into_owned(),
            ),
            ("Mission", self.mission.to_string_lossy().into_owned()),
            ("air_race", self.air_race.to_string()),
        ]
    }

    pub fn apply_save_field(&mut self, key: &str, value: &str) -> bool {
        match key {
            "map_name" => self.map_name = value.to_string(),
            "Map" => self.map = PathBuf::from(value),
            "Start_Position" => self.start_position = PathBuf::from(value),
            "Mission" => self.mission = PathBuf::from(value),
            "air_race" => self.air_race = parse_save_bool(value),
            _ => return false,
        }
        true
    }
}

// Save files written by older tool drafts carried Python-style `True`/`False`.
fn parse_save_bool(value: &str) -> bool {
    value.eq_ignore_ascii_case("true") || value == "1"
}
