/*
 * Formatting and parsing of LST file lines, the plain-text list files the
 * game reads to discover a pack's content. The forward direction follows the
 * game's conventions exactly: space-joined quoted pack-relative paths, with
 * scenery lines carrying the map name in front and an optional trailing
 * AIRRACE token. The reverse direction is this tool's own definition (the
 * format predates it): a quote-aware whitespace tokenizer feeding the same
 * field order back into an entry.
 */
use super::models::{AirGndEntry, SceneryEntry};
use std::path::{Path, PathBuf};

/// Token appended to a scenery line for YSFlight 2018+ air race maps.
pub const AIRRACE_TOKEN: &str = "AIRRACE";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LstParseError {
    UnterminatedQuote,
    WrongTokenCount { expected: usize, found: usize },
}

impl std::fmt::Display for LstParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LstParseError::UnterminatedQuote => {
                write!(f, "LST line has an unterminated double quote")
            }
            LstParseError::WrongTokenCount { expected, found } => {
                write!(f, "LST line has {found} fields, expected {expected}")
            }
        }
    }
}

impl std::error::Error for LstParseError {}

pub type Result<T> = std::result::Result<T, LstParseError>;

/*
 * Builds the quoted `"users/<user>/<pack>/<file>"` token for one file slot.
 * `rename` substitutes the shipped file name (DAT rename). An unset slot
 * with no rename serializes as an empty quoted string, which is how the
 * game's LST format marks an absent optional file.
 */
fn pack_relative_token(user_name: &str, pack_name: &str, source: &Path, rename: &str) -> String {
    let file_name = if !rename.is_empty() {
        rename.to_string()
    } else {
        match source.file_name() {
            Some(name) => name.to_string_lossy().into_owned(),
            None => return "\"\"".to_string(),
        }
    };
    format!("\"users/{user_name}/{pack_name}/{file_name}\"")
}

/// One air/gnd LST line: the five file slots in schema order.
pub fn format_air_gnd_line(entry: &AirGndEntry, user_name: &str, pack_name: &str) -> String {
    let rename = if entry.dat_rename {
        entry.dat_new_name.as_str()
    } else {
        ""
    };
    let parts = [
        pack_relative_token(user_name, pack_name, &entry.dat, rename),
        pack_relative_token(user_name, pack_name, &entry.visual_model, ""),
        pack_relative_token(user_name, pack_name, &entry.collision, ""),
        pack_relative_token(user_name, pack_name, &entry.cockpit, ""),
        pack_relative_token(user_name, pack_name, &entry.coarse, ""),
    ];
    parts.join(" ")
}

/// One scenery LST line: map name (spaces become underscores), the three file
/// slots, and the AIRRACE token when flagged.
pub fn format_scenery_line(entry: &SceneryEntry, user_name: &str, pack_name: &str) -> String {
    let mut parts = vec![
        entry.map_name.replace(' ', "_"),
        pack_relative_token(user_name, pack_name, &entry.map, ""),
        pack_relative_token(user_name, pack_name, &entry.start_position, ""),
        pack_relative_token(user_name, pack_name, &entry.mission, ""),
    ];
    if entry.air_race {
        parts.push(AIRRACE_TOKEN.to_string());
    }
    parts.join(" ")
}

/*
 * Splits an LST line into tokens. Tokens are separated by ASCII whitespace;
 * a token opened by a double quote runs to the closing quote and may contain
 * spaces, and `""` yields an empty token (an unset optional slot).
 */
pub fn split_lst_tokens(line: &str) -> Result<Vec<String>> {
    let mut tokens = Vec::new();
    let mut chars = line.chars().peekable();

    while let Some(&c) = chars.peek() {
        if c.is_ascii_whitespace() {
            chars.next();
            continue;
        }
        if c == '"' {
            chars.next();
            let mut token = String::new();
            let mut closed = false;
            for c in chars.by_ref() {
                if c == '"' {
                    closed = true;
                    break;
                }
                token.push(c);
            }
            if !closed {
                return Err(LstParseError::UnterminatedQuote);
            }
            tokens.push(token);
        } else {
            let mut token = String::new();
            while let Some(&c) = chars.peek() {
                if c.is_ascii_whitespace() {
                    break;
                }
                token.push(c);
                chars.next();
            }
            tokens.push(token);
        }
    }
    Ok(tokens)
}

/*
 * Parses one air/gnd LST line back into an entry. The line only carries the
 * five pack-relative paths, so `identify` is left empty; callers wanting the
 * display name extract it from the referenced DAT file. The parsed paths are
 * the relative forms baked into the line, not source paths.
 */
pub fn parse_air_gnd_line(line: &str) -> Result<AirGndEntry> {
    let tokens = split_lst_tokens(line)?;
    if tokens.len() != 5 {
        return Err(LstParseError::WrongTokenCount {
            expected: 5,
            found: tokens.len(),
        });
    }
    let mut entry = AirGndEntry::new();
    for (slot, token) in tokens.into_iter().enumerate() {
        entry.set_path_field(slot, PathBuf::from(token));
    }
    Ok(entry)
}

/*
 * Parses one scenery LST line: map name, three paths, optional trailing
 * AIRRACE token. The map name keeps its underscored on-disk form; the
 * original spacing is not recoverable from the line.
 */
pub fn parse_scenery_line(line: &str) -> Result<SceneryEntry> {
    let mut tokens = split_lst_tokens(line)?;
    let air_race = tokens.last().is_some_and(|t| t == AIRRACE_TOKEN);
    if air_race {
        tokens.pop();
    }
    if tokens.len() != 4 {
        return Err(LstParseError::WrongTokenCount {
            expected: 4,
            found: tokens.len(),
        });
    }
    let mut entry = SceneryEntry::new();
    entry.air_race = air_race;
    entry.map_name = tokens.remove(0);
    for (slot, token) in tokens.into_iter().enumerate() {
        entry.set_path_field(slot, PathBuf::from(token));
    }
    Ok(entry)
}
