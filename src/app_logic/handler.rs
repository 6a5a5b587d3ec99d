use crate::app_logic::events::{AppEvent, UiCommand};
use crate::core::{
    AirGndEntry, AppSettings, AssemblyError, Category, ConfigManagerOperations,
    Pack, PackAssemblerOperations, ProjectStoreOperations, SceneryEntry, extract_identify,
    sanitize_pack_name,
};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

// Made pub(crate) for access from handler_tests.rs
pub(crate) const APP_NAME_FOR_CONFIG: &str = "YSFPackBuilder";

/*
 * Manages the application state and UI logic in a platform-agnostic manner.
 * It processes events received from the GUI front-end and generates commands
 * to update the UI. All persistence goes through the injected trait objects
 * (`ConfigManagerOperations`, `ProjectStoreOperations`,
 * `PackAssemblerOperations`), so the logic can be tested with mocks.
 *
 * Each category keeps its own entry draft, mirroring the three entry forms
 * of the main window, plus the name of the stored entry that draft is
 * editing, if any. Storing while editing replaces that entry in place.
 */
pub struct PackBuilderLogic {
    pub(crate) pack: Pack,
    pub(crate) aircraft_draft: AirGndEntry,
    pub(crate) ground_draft: AirGndEntry,
    pub(crate) scenery_draft: SceneryEntry,
    pub(crate) editing: HashMap<Category, String>,
    pub(crate) settings: AppSettings,
    pub(crate) current_project_path: Option<std::path::PathBuf>,
    pub(crate) config_manager: Arc<dyn ConfigManagerOperations>,
    pub(crate) project_store: Arc<dyn ProjectStoreOperations>,
    pub(crate) assembler: Arc<dyn PackAssemblerOperations>,
}

impl PackBuilderLogic {
    pub fn new(
        config_manager: Arc<dyn ConfigManagerOperations>,
        project_store: Arc<dyn ProjectStoreOperations>,
        assembler: Arc<dyn PackAssemblerOperations>,
    ) -> Self {
        let settings = AppSettings::default();
        PackBuilderLogic {
            pack: Pack::new(String::new(), settings.user_name.clone()),
            aircraft_draft: AirGndEntry::new(),
            ground_draft: AirGndEntry::new(),
            scenery_draft: SceneryEntry::new(),
            editing: HashMap::new(),
            settings,
            current_project_path: None,
            config_manager,
            project_store,
            assembler,
        }
    }

    pub fn pack(&self) -> &Pack {
        &self.pack
    }

    pub fn settings(&self) -> &AppSettings {
        &self.settings
    }

    pub fn current_project_path(&self) -> Option<&Path> {
        self.current_project_path.as_deref()
    }

    /// Dispatches one UI event and returns the commands the front-end must
    /// apply in order.
    pub fn handle_event(&mut self, event: AppEvent) -> Vec<UiCommand> {
        log::trace!("AppLogic: handling event {event:?}");
        match event {
            AppEvent::AppStarted => self.on_app_started(),
            AppEvent::FileChosen {
                category,
                slot,
                path,
            } => self.on_file_chosen(category, slot, path),
            AppEvent::NameEdited { category, name } => {
                match category {
                    Category::Aircraft => self.aircraft_draft.identify = name,
                    Category::Ground => self.ground_draft.identify = name,
                    Category::Scenery => self.scenery_draft.map_name = name,
                }
                Vec::new()
            }
            AppEvent::AirRaceToggled { enabled } => {
                self.scenery_draft.air_race = enabled;
                Vec::new()
            }
            AppEvent::DatRenameToggled { category, enabled } => {
                if let Some(draft) = self.air_gnd_draft_mut(category) {
                    draft.dat_rename = enabled;
                }
                Vec::new()
            }
            AppEvent::DatNewNameEdited { category, name } => {
                if let Some(draft) = self.air_gnd_draft_mut(category) {
                    draft.dat_new_name = name;
                }
                Vec::new()
            }
            AppEvent::StoreEntryRequested { category } => self.on_store_entry(category),
            AppEvent::ClearFieldsRequested { category } => {
                self.reset_draft(category);
                vec![UiCommand::ClearEntryFields { category }]
            }
            AppEvent::EditEntryRequested { category, name } => {
                self.on_load_entry_into_draft(category, &name, true)
            }
            AppEvent::CopyEntryRequested { category, name } => {
                self.on_load_entry_into_draft(category, &name, false)
            }
            AppEvent::DeleteEntryRequested {
                category,
                name,
                confirmed,
            } => self.on_delete_entry(category, name, confirmed),
            AppEvent::MoveEntryUpRequested { category, name } => {
                if self.pack.move_entry_up(category, &name) {
                    self.refresh_category(category)
                } else {
                    Vec::new()
                }
            }
            AppEvent::MoveEntryDownRequested { category, name } => {
                if self.pack.move_entry_down(category, &name) {
                    self.refresh_category(category)
                } else {
                    Vec::new()
                }
            }
            AppEvent::PackNameEdited { name } => self.on_pack_name_edited(name),
            AppEvent::UserNameEdited { name } => self.on_user_name_edited(name),
            AppEvent::NewProjectRequested => self.on_new_project(),
            AppEvent::SaveProjectRequested { path } => self.on_save_project(path),
            AppEvent::LoadProjectRequested { path } => self.on_load_project(path),
            AppEvent::ExportPackRequested { output_dir } => self.on_export_pack(output_dir),
            AppEvent::SettingsUpdated { settings } => self.on_settings_updated(settings),
        }
    }

    /*
     * Startup sequence: restore the persisted settings, then try to reopen
     * the last used project. Both steps degrade to defaults on failure; a
     * broken config file must not keep the application from starting.
     */
    fn on_app_started(&mut self) -> Vec<UiCommand> {
        match self.config_manager.load_settings(APP_NAME_FOR_CONFIG) {
            Ok(settings) => self.settings = settings,
            Err(e) => {
                log::error!("AppLogic: failed to load settings, using defaults: {e}");
            }
        }
        self.pack.user_name = self.settings.user_name.clone();

        match self.config_manager.load_last_project_path(APP_NAME_FOR_CONFIG) {
            Ok(Some(path)) => match self.project_store.load_project(&path) {
                Ok(pack) => {
                    log::info!("AppLogic: restored last project from {path:?}");
                    self.pack = pack;
                    self.current_project_path = Some(path);
                }
                Err(e) => {
                    log::warn!("AppLogic: could not restore last project {path:?}: {e}");
                }
            },
            Ok(None) => {
                log::debug!("AppLogic: no last project to restore");
            }
            Err(e) => {
                log::error!("AppLogic: failed to load last project path: {e}");
            }
        }

        self.full_refresh()
    }

    fn on_file_chosen(
        &mut self,
        category: Category,
        slot: usize,
        path: std::path::PathBuf,
    ) -> Vec<UiCommand> {
        // The next file dialog opens where the user just was.
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                self.settings.working_directory = parent.to_path_buf();
            }
        }

        let mut commands = vec![UiCommand::SetPathField {
            category,
            slot,
            text: path.to_string_lossy().into_owned(),
        }];

        // Picking the DAT file fills the IDENTIFY field from its contents.
        let is_dat_slot = category != Category::Scenery && slot == 0;
        if is_dat_slot {
            let identify = extract_identify(&path);
            commands.push(UiCommand::SetNameField {
                category,
                text: identify.clone(),
            });
            if let Some(draft) = self.air_gnd_draft_mut(category) {
                draft.identify = identify;
            }
        }

        match category {
            Category::Scenery => self.scenery_draft.set_path_field(slot, path),
            cat => {
                if let Some(draft) = self.air_gnd_draft_mut(cat) {
                    draft.set_path_field(slot, path);
                }
            }
        }
        commands
    }

    fn on_store_entry(&mut self, category: Category) -> Vec<UiCommand> {
        let replacing = self.editing.get(&category).cloned();
        let result = match category {
            Category::Scenery => self
                .pack
                .store_scenery(self.scenery_draft.clone(), replacing.as_deref()),
            cat => {
                let entry = match cat {
                    Category::Aircraft => self.aircraft_draft.clone(),
                    _ => self.ground_draft.clone(),
                };
                self.pack.store_air_gnd(cat, entry, replacing.as_deref())
            }
        };

        match result {
            Ok(()) => {
                self.editing.remove(&category);
                self.reset_draft(category);
                let mut commands = self.refresh_category(category);
                commands.push(UiCommand::ClearEntryFields { category });
                commands
            }
            Err(e) => vec![UiCommand::ShowError {
                title: "Store Entry".to_string(),
                message: e.to_string(),
            }],
        }
    }

    /*
     * Loads a stored entry back into the category's draft, either for
     * editing (storing replaces the original) or as a copy (storing adds a
     * new entry, so the user is expected to change the name first).
     */
    fn on_load_entry_into_draft(
        &mut self,
        category: Category,
        name: &str,
        as_edit: bool,
    ) -> Vec<UiCommand> {
        match category {
            Category::Scenery => {
                let Some(entry) = self.pack.find_scenery(name) else {
                    log::warn!("AppLogic: no scenery entry '{name}' to load");
                    return Vec::new();
                };
                self.scenery_draft = entry.clone();
            }
            cat => {
                let Some(entry) = self.pack.find_air_gnd(cat, name) else {
                    log::warn!(
                        "AppLogic: no {} entry '{name}' to load",
                        cat.display_name()
                    );
                    return Vec::new();
                };
                let entry = entry.clone();
                match cat {
                    Category::Aircraft => self.aircraft_draft = entry,
                    _ => self.ground_draft = entry,
                }
            }
        }

        if as_edit {
            self.editing.insert(category, name.to_string());
        } else {
            self.editing.remove(&category);
        }
        self.draft_to_ui_commands(category)
    }

    fn on_delete_entry(
        &mut self,
        category: Category,
        name: String,
        confirmed: bool,
    ) -> Vec<UiCommand> {
        if !confirmed && self.settings.ask_before_entry_removal {
            return vec![UiCommand::ConfirmEntryRemoval { category, name }];
        }
        if !self.pack.remove_entry(category, &name) {
            log::warn!(
                "AppLogic: no {} entry '{name}' to remove",
                category.display_name()
            );
            return Vec::new();
        }
        // The removed entry may have been mid-edit; a later store must not
        // try to replace it.
        if self.editing.get(&category) == Some(&name) {
            self.editing.remove(&category);
        }
        self.refresh_category(category)
    }

    fn on_pack_name_edited(&mut self, name: String) -> Vec<UiCommand> {
        let (cleaned, removed) = sanitize_pack_name(&name);
        self.pack.pack_name = cleaned.clone();
        if removed.is_empty() {
            return Vec::new();
        }
        vec![
            UiCommand::SetPackName { text: cleaned },
            invalid_name_chars_error("pack name", &removed),
        ]
    }

    fn on_user_name_edited(&mut self, name: String) -> Vec<UiCommand> {
        let (cleaned, removed) = sanitize_pack_name(&name);
        self.pack.user_name = cleaned.clone();
        if removed.is_empty() {
            return Vec::new();
        }
        vec![
            UiCommand::SetUserName { text: cleaned },
            invalid_name_chars_error("user name", &removed),
        ]
    }

    fn on_new_project(&mut self) -> Vec<UiCommand> {
        log::info!("AppLogic: starting a new project");
        self.pack = Pack::new(String::new(), self.settings.user_name.clone());
        self.current_project_path = None;
        for category in Category::ALL {
            self.reset_draft(category);
        }
        self.editing.clear();
        self.full_refresh()
    }

    fn on_save_project(&mut self, path: std::path::PathBuf) -> Vec<UiCommand> {
        match self.project_store.save_project(&path, &self.pack) {
            Ok(()) => {
                self.current_project_path = Some(path.clone());
                if let Err(e) = self
                    .config_manager
                    .save_last_project_path(APP_NAME_FOR_CONFIG, Some(&path))
                {
                    log::error!("AppLogic: failed to remember project path: {e}");
                }
                Vec::new()
            }
            Err(e) => vec![UiCommand::ShowError {
                title: "Save Project".to_string(),
                message: e.to_string(),
            }],
        }
    }

    // A failed load leaves the current pack untouched; the codec only
    // returns a pack for a file it parsed completely.
    fn on_load_project(&mut self, path: std::path::PathBuf) -> Vec<UiCommand> {
        match self.project_store.load_project(&path) {
            Ok(pack) => {
                self.pack = pack;
                self.current_project_path = Some(path.clone());
                for category in Category::ALL {
                    self.reset_draft(category);
                }
                self.editing.clear();
                if let Err(e) = self
                    .config_manager
                    .save_last_project_path(APP_NAME_FOR_CONFIG, Some(&path))
                {
                    log::error!("AppLogic: failed to remember project path: {e}");
                }
                self.full_refresh()
            }
            Err(e) => vec![UiCommand::ShowError {
                title: "Load Project".to_string(),
                message: e.to_string(),
            }],
        }
    }

    fn on_export_pack(&mut self, output_dir: std::path::PathBuf) -> Vec<UiCommand> {
        match self.assembler.assemble(&self.pack, &output_dir) {
            Ok(pack_root) => vec![UiCommand::ShowInfo {
                title: "Export Pack".to_string(),
                message: format!(
                    "Pack '{}' exported to {}",
                    self.pack.pack_name,
                    pack_root.display()
                ),
            }],
            Err(e @ AssemblyError::Io(_)) => vec![UiCommand::ShowError {
                title: "Export Pack".to_string(),
                message: format!("Export failed, the output may be incomplete: {e}"),
            }],
            Err(e) => vec![UiCommand::ShowError {
                title: "Export Pack".to_string(),
                message: e.to_string(),
            }],
        }
    }

    fn on_settings_updated(&mut self, settings: AppSettings) -> Vec<UiCommand> {
        self.settings = settings;
        let mut commands = Vec::new();
        if let Err(e) = self
            .config_manager
            .save_settings(APP_NAME_FOR_CONFIG, &self.settings)
        {
            commands.push(UiCommand::ShowError {
                title: "Settings".to_string(),
                message: format!("Settings could not be saved: {e}"),
            });
        }
        // Preview dimensions may have changed.
        for category in Category::ALL {
            commands.push(self.preview_command(category));
        }
        commands
    }

    fn air_gnd_draft_mut(&mut self, category: Category) -> Option<&mut AirGndEntry> {
        match category {
            Category::Aircraft => Some(&mut self.aircraft_draft),
            Category::Ground => Some(&mut self.ground_draft),
            Category::Scenery => None,
        }
    }

    fn reset_draft(&mut self, category: Category) {
        match category {
            Category::Aircraft => self.aircraft_draft = AirGndEntry::new(),
            Category::Ground => self.ground_draft = AirGndEntry::new(),
            Category::Scenery => self.scenery_draft = SceneryEntry::new(),
        }
    }

    /// Commands that push the category's current draft into the entry form.
    fn draft_to_ui_commands(&self, category: Category) -> Vec<UiCommand> {
        let mut commands = Vec::new();
        match category {
            Category::Scenery => {
                let draft = &self.scenery_draft;
                commands.push(UiCommand::SetNameField {
                    category,
                    text: draft.map_name.clone(),
                });
                for (slot, path) in draft.path_fields().iter().enumerate() {
                    commands.push(UiCommand::SetPathField {
                        category,
                        slot,
                        text: path.to_string_lossy().into_owned(),
                    });
                }
                commands.push(UiCommand::SetAirRace {
                    enabled: draft.air_race,
                });
            }
            cat => {
                let draft = match cat {
                    Category::Aircraft => &self.aircraft_draft,
                    _ => &self.ground_draft,
                };
                commands.push(UiCommand::SetNameField {
                    category,
                    text: draft.identify.clone(),
                });
                for (slot, path) in draft.path_fields().iter().enumerate() {
                    commands.push(UiCommand::SetPathField {
                        category,
                        slot,
                        text: path.to_string_lossy().into_owned(),
                    });
                }
                commands.push(UiCommand::SetDatRename {
                    enabled: draft.dat_rename,
                    new_name: draft.dat_new_name.clone(),
                });
            }
        }
        commands
    }

    fn refresh_category(&self, category: Category) -> Vec<UiCommand> {
        vec![
            UiCommand::RefreshEntryList {
                category,
                names: self.pack.entry_names(category),
            },
            self.preview_command(category),
        ]
    }

    fn preview_command(&self, category: Category) -> UiCommand {
        UiCommand::SetPreviewText {
            category,
            lines: self.preview_lines(category),
        }
    }

    /*
     * The LST preview: the lines the export would write for this category,
     * clipped to the configured number of rows and characters per row so the
     * preview area never needs to scroll.
     */
    pub fn preview_lines(&self, category: Category) -> Vec<String> {
        let lines: Vec<String> = match category {
            Category::Scenery => self
                .pack
                .scenery()
                .iter()
                .map(|e| {
                    crate::core::format_scenery_line(e, &self.pack.user_name, &self.pack.pack_name)
                })
                .collect(),
            cat => {
                let entries = match cat {
                    Category::Aircraft => self.pack.aircraft(),
                    _ => self.pack.ground(),
                };
                entries
                    .iter()
                    .map(|e| {
                        crate::core::format_air_gnd_line(
                            e,
                            &self.pack.user_name,
                            &self.pack.pack_name,
                        )
                    })
                    .collect()
            }
        };
        lines
            .into_iter()
            .take(self.settings.preview_num_rows)
            .map(|line| line.chars().take(self.settings.preview_char_width).collect())
            .collect()
    }

    fn full_refresh(&self) -> Vec<UiCommand> {
        let mut commands = vec![
            UiCommand::SetPackName {
                text: self.pack.pack_name.clone(),
            },
            UiCommand::SetUserName {
                text: self.pack.user_name.clone(),
            },
        ];
        for category in Category::ALL {
            commands.extend(self.refresh_category(category));
            commands.push(UiCommand::ClearEntryFields { category });
        }
        commands
    }
}

fn invalid_name_chars_error(what: &str, removed: &[char]) -> UiCommand {
    let chars: String = removed
        .iter()
        .map(|c| format!("'{c}'"))
        .collect::<Vec<_>>()
        .join(" ");
    UiCommand::ShowError {
        title: "Invalid Name".to_string(),
        message: format!("These characters cannot be used in a {what} and were removed: {chars}"),
    }
}
