/*
 * Helpers for the game's DAT descriptor files. Only one piece of the format
 * matters to the pack builder: the `IDENTIFY` line carrying the display name
 * of an aircraft or ground object. Extraction fails soft (empty string) so a
 * half-filled entry form never turns a bad file pick into an error dialog;
 * the missing name surfaces later through store-time validation instead.
 */
use std::fs;
use std::io;
use std::path::Path;

pub const DAT_EXTENSION: &str = "dat";

/*
 * Reads `path` and returns the name declared on its first `IDENTIFY` line.
 * Returns an empty string when the path does not end in `.dat`, the file
 * does not exist or cannot be read, or no `IDENTIFY` line is present.
 * DAT files in the wild carry stray non-UTF-8 bytes, so the read is lossy.
 */
pub fn extract_identify(path: &Path) -> String {
    let is_dat = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case(DAT_EXTENSION));
    if !is_dat || !path.is_file() {
        log::debug!("DatFile: {path:?} is not a readable .dat file, no IDENTIFY extracted");
        return String::new();
    }

    match fs::read(path) {
        Ok(bytes) => extract_identify_from_text(&String::from_utf8_lossy(&bytes)),
        Err(e) => {
            log::debug!("DatFile: failed to read {path:?}: {e}");
            String::new()
        }
    }
}

/*
 * The textual part of the extraction, separated from file I/O so it can be
 * tested directly. Scans for the first line starting with the `IDENTIFY`
 * token, strips the token, truncates at the first `#` (in-line comment), and
 * takes either the substring between the first pair of double quotes or the
 * trimmed remainder. Most ground object IDENTIFY lines are unquoted.
 */
pub(crate) fn extract_identify_from_text(text: &str) -> String {
    for line in text.lines() {
        let Some(rest) = line.strip_prefix("IDENTIFY") else {
            continue;
        };
        let rest = match rest.find('#') {
            Some(idx) => &rest[..idx],
            None => rest,
        };
        if rest.contains('"') {
            let mut pieces = rest.split('"');
            pieces.next(); // before the opening quote
            return pieces.next().unwrap_or_default().to_string();
        }
        return rest.trim().to_string();
    }
    String::new()
}

/*
 * Rewrites the first `IDENTIFY ` line of a DAT file to declare `new_identify`
 * (quoted). Used on the exported copy of a renamed DAT so the shipped file
 * matches the name stored in the pack. Only that line's bytes are replaced;
 * everything else, stray non-UTF-8 bytes and CRLF endings included, passes
 * through untouched. A file without an IDENTIFY line is left as is.
 */
pub fn rewrite_identify(path: &Path, new_identify: &str) -> io::Result<()> {
    let bytes = fs::read(path)?;

    let Some(start) = find_identify_line_start(&bytes) else {
        log::debug!("DatFile: no IDENTIFY line in {path:?}, leaving file unchanged");
        return Ok(());
    };
    let mut line_end = start;
    while line_end < bytes.len() && bytes[line_end] != b'\n' {
        line_end += 1;
    }
    if line_end > start && bytes[line_end - 1] == b'\r' {
        line_end -= 1;
    }

    let mut output = Vec::with_capacity(bytes.len() + new_identify.len());
    output.extend_from_slice(&bytes[..start]);
    output.extend_from_slice(format!("IDENTIFY \"{new_identify}\"").as_bytes());
    output.extend_from_slice(&bytes[line_end..]);
    fs::write(path, output)
}

/// Byte offset of the first line starting with `IDENTIFY `.
fn find_identify_line_start(bytes: &[u8]) -> Option<usize> {
    let mut start = 0;
    while start < bytes.len() {
        if bytes[start..].starts_with(b"IDENTIFY ") {
            return Some(start);
        }
        match bytes[start..].iter().position(|&b| b == b'\n') {
            Some(idx) => start += idx + 1,
            None => break,
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn test_extract_quoted_with_comment() {
        let text = "REALPROP\nIDENTIFY \"Foo\" # comment\nAFTBURNR TRUE\n";
        assert_eq!(extract_identify_from_text(text), "Foo");
    }

    #[test]
    fn test_extract_unquoted_is_trimmed() {
        let text = "IDENTIFY Foo\n";
        assert_eq!(extract_identify_from_text(text), "Foo");
        let text = "IDENTIFY   TANK_T72  \n";
        assert_eq!(extract_identify_from_text(text), "TANK_T72");
    }

    #[test]
    fn test_extract_quoted_name_with_spaces() {
        let text = "IDENTIFY \"F-16 Fighting Falcon\"\n";
        assert_eq!(extract_identify_from_text(text), "F-16 Fighting Falcon");
    }

    #[test]
    fn test_comment_before_quote_falls_back_to_trimmed() {
        // The comment is stripped first, so the quotes vanish with it.
        let text = "IDENTIFY Foo # was \"Bar\"\n";
        assert_eq!(extract_identify_from_text(text), "Foo");
    }

    #[test]
    fn test_first_identify_line_wins() {
        let text = "IDENTIFY \"First\"\nIDENTIFY \"Second\"\n";
        assert_eq!(extract_identify_from_text(text), "First");
    }

    #[test]
    fn test_no_identify_line_yields_empty() {
        assert_eq!(extract_identify_from_text("REALPROP 0\n"), "");
        assert_eq!(extract_identify_from_text(""), "");
    }

    #[test]
    fn test_extract_from_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("f16.dat");
        let mut f = File::create(&path).unwrap();
        writeln!(f, "IDENTIFY \"F-16\" # block 50").unwrap();
        assert_eq!(extract_identify(&path), "F-16");
    }

    #[test]
    fn test_wrong_extension_and_missing_file_yield_empty() {
        let dir = tempdir().unwrap();
        let not_dat = dir.path().join("f16.dnm");
        let mut f = File::create(&not_dat).unwrap();
        writeln!(f, "IDENTIFY \"F-16\"").unwrap();
        assert_eq!(extract_identify(&not_dat), "");

        let missing = dir.path().join("nonexistent.dat");
        assert_eq!(extract_identify(&missing), "");
    }

    #[test]
    fn test_rewrite_identify_replaces_first_line_only() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tank.dat");
        let mut f = File::create(&path).unwrap();
        writeln!(f, "REALPROP 0").unwrap();
        writeln!(f, "IDENTIFY OLD_NAME").unwrap();
        writeln!(f, "IDENTIFY SHOULD_STAY").unwrap();

        rewrite_identify(&path, "NEW_NAME").unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(
            text,
            "REALPROP 0\nIDENTIFY \"NEW_NAME\"\nIDENTIFY SHOULD_STAY\n"
        );
        assert_eq!(extract_identify(&path), "NEW_NAME");
    }

    #[test]
    fn test_rewrite_identify_without_identify_line_is_noop() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("plain.dat");
        let mut f = File::create(&path).unwrap();
        writeln!(f, "REALPROP 0").unwrap();

        rewrite_identify(&path, "NAME").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "REALPROP 0\n");
    }

    #[test]
    fn test_rewrite_identify_preserves_non_utf8_bytes() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("raw.dat");
        fs::write(&path, b"REM \xFF\xFE raw\nIDENTIFY OLD\nTHRAFTER \x80\x81\n").unwrap();

        rewrite_identify(&path, "NEW").unwrap();

        assert_eq!(
            fs::read(&path).unwrap(),
            b"REM \xFF\xFE raw\nIDENTIFY \"NEW\"\nTHRAFTER \x80\x81\n"
        );
    }

    #[test]
    fn test_rewrite_identify_preserves_crlf_endings() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("crlf.dat");
        fs::write(&path, b"REALPROP 0\r\nIDENTIFY OLD\r\nAFTBURNR TRUE\r\n").unwrap();

        rewrite_identify(&path, "NEW").unwrap();

        assert_eq!(
            fs::read(&path).unwrap(),
            b"REALPROP 0\r\nIDENTIFY \"NEW\"\r\nAFTBURNR TRUE\r\n"
        );
    }

    #[test]
    fn test_rewrite_identify_without_trailing_newline() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bare.dat");
        fs::write(&path, b"IDENTIFY OLD").unwrap();

        rewrite_identify(&path, "NEW").unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"IDENTIFY \"NEW\"");
    }
}
