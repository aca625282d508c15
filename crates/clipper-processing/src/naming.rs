//! File naming for staged copies and stored clips.

const MAX_EXTENSION_LEN: usize = 16;

/// Extension of `name`, including the leading dot: everything from the last `.` on.
///
/// Returns an empty string when the name has no dot.
pub fn file_extension(name: &str) -> &str {
    name.rfind('.').map(|idx| &name[idx..]).unwrap_or("")
}

/// Extension of `name` when it is safe to use in a local file name.
///
/// Remote display names are arbitrary, so only short alphanumeric extensions are kept.
pub fn local_extension(name: &str) -> Option<&str> {
    let ext = file_extension(name).strip_prefix('.')?;
    let valid = !ext.is_empty()
        && ext.len() <= MAX_EXTENSION_LEN
        && ext.chars().all(|c| c.is_ascii_alphanumeric());
    valid.then_some(ext)
}

/// Name of a stored clip: the literal request timestamps inserted before the extension.
///
/// `movie.mp4`, `00:01:23`, `00:02:34` → `movie_00:01:23_to_00:02:34.mp4`
pub fn clip_file_name(source_name: &str, clip_start: &str, clip_end: &str) -> String {
    let ext = file_extension(source_name);
    let base = &source_name[..source_name.len() - ext.len()];
    format!("{}_{}_to_{}{}", base, clip_start, clip_end, ext)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clip_file_name() {
        assert_eq!(
            clip_file_name("movie.mp4", "00:01:23", "00:02:34"),
            "movie_00:01:23_to_00:02:34.mp4"
        );
        assert_eq!(
            clip_file_name("game.day.2.mov", "00:00:00", "00:00:10"),
            "game.day.2_00:00:00_to_00:00:10.mov"
        );
        assert_eq!(
            clip_file_name("raw", "00:00:00", "00:00:10"),
            "raw_00:00:00_to_00:00:10"
        );
    }

    #[test]
    fn test_file_extension() {
        assert_eq!(file_extension("movie.mp4"), ".mp4");
        assert_eq!(file_extension("archive.tar.gz"), ".gz");
        assert_eq!(file_extension("movie"), "");
        assert_eq!(file_extension("movie."), ".");
    }

    #[test]
    fn test_local_extension() {
        assert_eq!(local_extension("movie.mp4"), Some("mp4"));
        assert_eq!(local_extension("movie.MKV"), Some("MKV"));
        assert_eq!(local_extension("movie"), None);
        assert_eq!(local_extension("movie."), None);
        assert_eq!(local_extension("weird.mp4/../x"), None);
        assert_eq!(local_extension("clip.m p4"), None);
    }
}
