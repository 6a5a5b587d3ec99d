/*
 * The event/command vocabulary between a GUI front-end and the application
 * logic. `AppEvent` is what widget interactions translate to; `UiCommand` is
 * what the front-end must render in response. Both are plain data, so the
 * logic layer can be driven and asserted on without any real UI.
 */
use crate::core::{AppSettings, Category};
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// Fired once after the main window exists; restores settings and the
    /// last opened project.
    AppStarted,

    // Entry form edits. `slot` indexes the category's field schema.
    FileChosen {
        category: Category,
        slot: usize,
        path: PathBuf,
    },
    NameEdited {
        category: Category,
        name: String,
    },
    AirRaceToggled {
        enabled: bool,
    },
    DatRenameToggled {
        category: Category,
        enabled: bool,
    },
    DatNewNameEdited {
        category: Category,
        name: String,
    },

    // Entry form buttons.
    StoreEntryRequested {
        category: Category,
    },
    ClearFieldsRequested {
        category: Category,
    },

    // Listbox actions on a stored entry.
    EditEntryRequested {
        category: Category,
        name: String,
    },
    CopyEntryRequested {
        category: Category,
        name: String,
    },
    DeleteEntryRequested {
        category: Category,
        name: String,
        /// True once the user has answered the confirmation dialog.
        confirmed: bool,
    },
    MoveEntryUpRequested {
        category: Category,
        name: String,
    },
    MoveEntryDownRequested {
        category: Category,
        name: String,
    },

    // Pack-level fields and project lifecycle.
    PackNameEdited {
        name: String,
    },
    UserNameEdited {
        name: String,
    },
    NewProjectRequested,
    SaveProjectRequested {
        path: PathBuf,
    },
    LoadProjectRequested {
        path: PathBuf,
    },
    ExportPackRequested {
        output_dir: PathBuf,
    },
    SettingsUpdated {
        settings: AppSettings,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum UiCommand {
    /// Replace the contents of a category's entry listbox.
    RefreshEntryList {
        category: Category,
        names: Vec<String>,
    },
    /// Replace the contents of a category's LST preview area. Lines are
    /// already clipped to the configured preview dimensions.
    SetPreviewText {
        category: Category,
        lines: Vec<String>,
    },
    SetNameField {
        category: Category,
        text: String,
    },
    SetPathField {
        category: Category,
        slot: usize,
        text: String,
    },
    SetAirRace {
        enabled: bool,
    },
    SetDatRename {
        enabled: bool,
        new_name: String,
    },
    ClearEntryFields {
        category: Category,
    },
    SetPackName {
        text: String,
    },
    SetUserName {
        text: String,
    },
    /// Ask the user to confirm removing the named entry; the answer comes
    /// back as `DeleteEntryRequested { confirmed: true }`.
    ConfirmEntryRemoval {
        category: Category,
        name: String,
    },
    ShowError {
        title: String,
        message: String,
    },
    ShowInfo {
        title: String,
        message: String,
    },
}
