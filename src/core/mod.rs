/*
 * This module consolidates the core, platform-agnostic logic of the pack
 * builder. It re-exports the entry/pack data model and the operations
 * abstractions (`ConfigManagerOperations`, `ProjectStoreOperations`,
 * `PackAssemblerOperations`) so higher layers depend on seams rather than on
 * concrete file-system backed implementations.
 */
pub mod assembler;
pub mod config;
pub mod dat_file;
pub mod lst_format;
pub mod models;
pub mod pack;
pub mod project_io;

// Re-export the data model
pub use models::{AirGndEntry, Category, FieldSpec, SceneryEntry, field_schema};

// Re-export pack related items
pub use pack::{Pack, ValidationError, is_valid_pack_name_char, sanitize_pack_name};

// Re-export DAT descriptor helpers
pub use dat_file::{extract_identify, rewrite_identify};

// Re-export LST formatting/parsing items
pub use lst_format::{
    LstParseError, format_air_gnd_line, format_scenery_line, parse_air_gnd_line,
    parse_scenery_line,
};

// Re-export project save/load items
pub use project_io::{
    CoreProjectStore, DEFAULT_DELIMITER, PROJECT_FILE_EXTENSION, ProjectFileError,
    ProjectStoreOperations, TOOL_TITLE, TOOL_VERSION,
};

// Re-export pack assembly items
pub use assembler::{AssemblyError, CorePackAssembler, PackAssemblerOperations};

// Re-export config related items
pub use config::{AppSettings, ConfigError, ConfigManagerOperations, CoreConfigManager};
