/*
 * The in-memory pack model: three order-preserving entry collections plus the
 * user and pack names that anchor the `users/<user>/<pack>/` paths written to
 * LST files. The pack owns the invariants the GUI used to enforce ad hoc:
 * identifying names are unique per category, and an entry can only be stored
 * once its required files exist on disk. Display order is the vector order,
 * so listbox reordering maps to `move_entry_up`/`move_entry_down`.
 */
use super::models::{AirGndEntry, Category, SceneryEntry, field_schema};
use std::path::Path;

#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    MissingRequiredFiles {
        category: Category,
        labels: Vec<String>,
    },
    DuplicateName {
        category: Category,
        name: String,
    },
    EmptyName {
        category: Category,
    },
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::MissingRequiredFiles { category, labels } => {
                write!(
                    f,
                    "The following files for this {} entry were either not defined or are no longer in their identified position:",
                    category.display_name()
                )?;
                for label in labels {
                    write!(f, "\n- {label}")?;
                }
                Ok(())
            }
            ValidationError::DuplicateName { category, name } => write!(
                f,
                "All {}s must be unique in a pack; '{}' is already stored.",
                category.identity_label(),
                name
            ),
            ValidationError::EmptyName { category } => write!(
                f,
                "A {} entry needs a {} before it can be stored.",
                category.display_name(),
                category.identity_label()
            ),
        }
    }
}

impl std::error::Error for ValidationError {}

pub type Result<T> = std::result::Result<T, ValidationError>;

/// Characters acceptable in user and pack names across the platforms the
/// game runs on.
pub fn is_valid_pack_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || " _-.[]()+".contains(c)
}

/// Strips invalid characters from a user or pack name, returning the cleaned
/// name and the offending characters so the UI can report what was removed.
pub fn sanitize_pack_name(name: &str) -> (String, Vec<char>) {
    let mut cleaned = String::with_capacity(name.len());
    let mut removed = Vec::new();
    for c in name.chars() {
        if is_valid_pack_name_char(c) {
            cleaned.push(c);
        } else {
            removed.push(c);
        }
    }
    (cleaned, removed)
}

// The two entry types share all pack bookkeeping except their identifying
// field; this seam lets the collection logic be written once.
trait IdentifiedEntry {
    fn identifying_name(&self) -> &str;
}

impl IdentifiedEntry for AirGndEntry {
    fn identifying_name(&self) -> &str {
        &self.identify
    }
}

impl IdentifiedEntry for SceneryEntry {
    fn identifying_name(&self) -> &str {
        &self.map_name
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Pack {
    pub pack_name: String,
    pub user_name: String,
    aircraft: Vec<AirGndEntry>,
    ground: Vec<AirGndEntry>,
    scenery: Vec<SceneryEntry>,
}

impl Pack {
    pub fn new(pack_name: String, user_name: String) -> Self {
        Pack {
            pack_name,
            user_name,
            aircraft: Vec::new(),
            ground: Vec::new(),
            scenery: Vec::new(),
        }
    }

    pub fn aircraft(&self) -> &[AirGndEntry] {
        &self.aircraft
    }

    pub fn ground(&self) -> &[AirGndEntry] {
        &self.ground
    }

    pub fn scenery(&self) -> &[SceneryEntry] {
        &self.scenery
    }

    pub fn is_empty(&self) -> bool {
        self.aircraft.is_empty() && self.ground.is_empty() && self.scenery.is_empty()
    }

    pub fn entry_count(&self, category: Category) -> usize {
        match category {
            Category::Aircraft => self.aircraft.len(),
            Category::Ground => self.ground.len(),
            Category::Scenery => self.scenery.len(),
        }
    }

    /// Identifying names in display order.
    pub fn entry_names(&self, category: Category) -> Vec<String> {
        match category {
            Category::Aircraft => names_of(&self.aircraft),
            Category::Ground => names_of(&self.ground),
            Category::Scenery => names_of(&self.scenery),
        }
    }

    pub fn find_air_gnd(&self, category: Category, name: &str) -> Option<&AirGndEntry> {
        let list = match category {
            Category::Aircraft => &self.aircraft,
            Category::Ground => &self.ground,
            Category::Scenery => return None,
        };
        list.iter().find(|e| e.identify == name)
    }

    pub fn find_scenery(&self, name: &str) -> Option<&SceneryEntry> {
        self.scenery.iter().find(|e| e.map_name == name)
    }

    /*
     * Stores an aircraft or ground entry after validating it. `replacing`
     * names the entry currently being edited, if any: that entry is swapped
     * out in place (display order kept), and its name does not count as a
     * duplicate of the incoming one.
     */
    pub fn store_air_gnd(
        &mut self,
        category: Category,
        entry: AirGndEntry,
        replacing: Option<&str>,
    ) -> Result<()> {
        validate_required_files(category, &entry.identify, &entry.path_fields())?;
        let list = match category {
            Category::Aircraft => &mut self.aircraft,
            Category::Ground => &mut self.ground,
            Category::Scenery => {
                log::error!("Pack: store_air_gnd called with Scenery category");
                return Err(ValidationError::EmptyName { category });
            }
        };
        store_in(list, category, entry, replacing)
    }

    pub fn store_scenery(&mut self, entry: SceneryEntry, replacing: Option<&str>) -> Result<()> {
        validate_required_files(Category::Scenery, &entry.map_name, &entry.path_fields())?;
        store_in(&mut self.scenery, Category::Scenery, entry, replacing)
    }

    /// Removes the named entry. Returns false when no such entry exists.
    pub fn remove_entry(&mut self, category: Category, name: &str) -> bool {
        match category {
            Category::Aircraft => remove_from(&mut self.aircraft, name),
            Category::Ground => remove_from(&mut self.ground, name),
            Category::Scenery => remove_from(&mut self.scenery, name),
        }
    }

    /// Moves the named entry one position toward the top of its listbox.
    pub fn move_entry_up(&mut self, category: Category, name: &str) -> bool {
        match category {
            Category::Aircraft => move_in(&mut self.aircraft, name, -1),
            Category::Ground => move_in(&mut self.ground, name, -1),
            Category::Scenery => move_in(&mut self.scenery, name, -1),
        }
    }

    /// Moves the named entry one position toward the bottom of its listbox.
    pub fn move_entry_down(&mut self, category: Category, name: &str) -> bool {
        match category {
            Category::Aircraft => move_in(&mut self.aircraft, name, 1),
            Category::Ground => move_in(&mut self.ground, name, 1),
            Category::Scenery => move_in(&mut self.scenery, name, 1),
        }
    }

    // Used by the project codec, which performs its own duplicate checks on
    // already-validated data and must not re-require source files to exist.
    pub(crate) fn push_air_gnd_unchecked(&mut self, category: Category, entry: AirGndEntry) {
        match category {
            Category::Aircraft => self.aircraft.push(entry),
            Category::Ground => self.ground.push(entry),
            Category::Scenery => {
                log::error!("Pack: push_air_gnd_unchecked called with Scenery category");
            }
        }
    }

    pub(crate) fn push_scenery_unchecked(&mut self, entry: SceneryEntry) {
        self.scenery.push(entry);
    }
}

/*
 * Checks the required slots of `paths` (aligned with the category's field
 * schema) against the file system, collecting the labels of every slot whose
 * file is unset or gone so the user sees the full list at once.
 */
fn validate_required_files(category: Category, name: &str, paths: &[&Path]) -> Result<()> {
    if name.trim().is_empty() {
        return Err(ValidationError::EmptyName { category });
    }
    let mut missing = Vec::new();
    for (spec, path) in field_schema(category).iter().zip(paths.iter()) {
        if spec.required && !path.is_file() {
            missing.push(spec.label.to_string());
        }
    }
    if missing.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::MissingRequiredFiles {
            category,
            labels: missing,
        })
    }
}

fn names_of<T: IdentifiedEntry>(list: &[T]) -> Vec<String> {
    list.iter()
        .map(|e| e.identifying_name().to_string())
        .collect()
}

fn store_in<T: IdentifiedEntry>(
    list: &mut Vec<T>,
    category: Category,
    entry: T,
    replacing: Option<&str>,
) -> Result<()> {
    let incoming = entry.identifying_name().to_string();
    let duplicate = list
        .iter()
        .any(|e| e.identifying_name() == incoming && Some(e.identifying_name()) != replacing);
    if duplicate {
        return Err(ValidationError::DuplicateName {
            category,
            name: incoming,
        });
    }

    match replacing.and_then(|name| list.iter().position(|e| e.identifying_name() == name)) {
        Some(idx) => {
            log::debug!(
                "Pack: replacing {} entry '{}' at position {idx} with '{incoming}'",
                category.display_name(),
                replacing.unwrap_or_default()
            );
            list[idx] = entry;
        }
        None => {
            log::debug!(
                "Pack: storing new {} entry '{incoming}'",
                category.display_name()
            );
            list.push(entry);
        }
    }
    Ok(())
}

fn remove_from<T: IdentifiedEntry>(list: &mut Vec<T>, name: &str) -> bool {
    match list.iter().position(|e| e.identifying_name() == name) {
        Some(idx) => {
            list.remove(idx);
            true
        }
        None => false,
    }
}

fn move_in<T: IdentifiedEntry>(list: &mut [T], name: &str, offset: isize) -> bool {
    let Some(idx) = list.iter().position(|e| e.identifying_name() == name) else {
        return false;
    };
    let target = idx as isize + offset;
    if target < 0 || target as usize >= list.len() {
        return false;
    }
    list.swap(idx, target as usize);
    true
}
