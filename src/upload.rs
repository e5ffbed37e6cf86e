//! Upload widget - accepts one image by drop or path entry
//!
//! Dropping files onto a terminal window pastes their paths, so a drop
//! arrives as pasted text. The file picker is a path input with Tab
//! completion. Both go through the same validation before anything is sent.

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use crate::constants::MAX_UPLOAD_BYTES;
use crate::error::UploadError;
use crate::models::SelectedFile;

const FALLBACK_MIME: &str = "application/octet-stream";

/// Split pasted text into file paths, one per line.
///
/// Handles the forms terminals use when files are dropped: bare paths,
/// quoted paths, backslash-escaped spaces and `file://` URLs.
pub fn parse_dropped_paths(text: &str) -> Vec<PathBuf> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .flat_map(parse_line)
        .collect()
}

/// A bare line is a single path, spaces included. Quoted, escaped or
/// `file://` lines may carry several paths separated by whitespace.
fn parse_line(line: &str) -> Vec<PathBuf> {
    let tokenized = line.starts_with(['\'', '"'])
        || line.contains('\\')
        || line.split_whitespace().all(|t| t.starts_with("file://"));
    if !tokenized {
        return vec![to_path(line)];
    }

    let mut paths = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;
    let mut chars = line.chars();

    while let Some(c) = chars.next() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), c) => current.push(c),
            (None, '\'') | (None, '"') => quote = Some(c),
            (None, '\\') => {
                if let Some(next) = chars.next() {
                    current.push(next);
                }
            }
            (None, c) if c.is_whitespace() => {
                if !current.is_empty() {
                    paths.push(to_path(&current));
                    current.clear();
                }
            }
            (None, c) => current.push(c),
        }
    }
    if !current.is_empty() {
        paths.push(to_path(&current));
    }

    paths
}

fn to_path(raw: &str) -> PathBuf {
    let raw = raw.strip_prefix("file://").unwrap_or(raw);
    expand_home(raw)
}

/// Expand a leading `~` to the home directory
pub fn expand_home(input: &str) -> PathBuf {
    if let Some(rest) = input.strip_prefix('~') {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest.trim_start_matches('/'));
        }
    }
    PathBuf::from(input)
}

/// Read size and sniff the MIME type of a local file
pub fn inspect_file(path: &Path) -> Result<SelectedFile, UploadError> {
    let unreadable = |reason: String| UploadError::Unreadable {
        path: path.display().to_string(),
        reason,
    };

    let meta = fs::metadata(path).map_err(|e| unreadable(e.to_string()))?;
    if !meta.is_file() {
        return Err(unreadable("not a regular file".to_string()));
    }

    let mut head = [0u8; 32];
    let read = fs::File::open(path)
        .and_then(|mut f| f.read(&mut head))
        .map_err(|e| unreadable(e.to_string()))?;

    Ok(SelectedFile {
        path: path.to_path_buf(),
        file_name: path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "image".to_string()),
        mime_type: sniff_mime(&head[..read], path),
        size_bytes: meta.len(),
    })
}

/// Magic bytes first, then the extension
fn sniff_mime(head: &[u8], path: &Path) -> String {
    image::guess_format(head)
        .or_else(|_| image::ImageFormat::from_path(path))
        .map(|format| format.to_mime_type().to_string())
        .unwrap_or_else(|_| FALLBACK_MIME.to_string())
}

/// Check a drop or selection against the widget contract
pub fn validate_selection(files: &[SelectedFile]) -> Result<&SelectedFile, UploadError> {
    let file = match files {
        [] => return Err(UploadError::NoFile),
        [file] => file,
        _ => return Err(UploadError::MultipleFiles),
    };

    if !file.mime_type.starts_with("image/") {
        return Err(UploadError::NotAnImage {
            mime_type: file.mime_type.clone(),
        });
    }

    if file.size_bytes > MAX_UPLOAD_BYTES {
        return Err(UploadError::TooLarge {
            size_bytes: file.size_bytes,
        });
    }

    Ok(file)
}

/// Widget state. Only one upload may be outstanding.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum UploadWidget {
    #[default]
    Empty,
    Uploading {
        id: u64,
        file: SelectedFile,
    },
    Uploaded,
}

impl UploadWidget {
    pub fn is_uploading(&self) -> bool {
        matches!(self, UploadWidget::Uploading { .. })
    }

    /// Whether a drop would currently be accepted
    pub fn accepts_drop(&self) -> Result<(), UploadError> {
        match self {
            UploadWidget::Empty => Ok(()),
            UploadWidget::Uploading { .. } => Err(UploadError::Busy),
            UploadWidget::Uploaded => Err(UploadError::ImagePresent),
        }
    }

    pub fn begin(&mut self, id: u64, file: SelectedFile) -> Result<(), UploadError> {
        self.accepts_drop()?;
        *self = UploadWidget::Uploading { id, file };
        Ok(())
    }

    /// Settle the pending upload. Returns the file when `id` is the one in flight.
    pub fn finish(&mut self, id: u64, succeeded: bool) -> Option<SelectedFile> {
        match self {
            UploadWidget::Uploading { id: pending, file } if *pending == id => {
                let file = file.clone();
                *self = if succeeded {
                    UploadWidget::Uploaded
                } else {
                    UploadWidget::Empty
                };
                Some(file)
            }
            _ => None,
        }
    }

    pub fn clear(&mut self) {
        *self = UploadWidget::Empty;
    }
}

/// Complete a partially typed path against the file system.
///
/// Directories complete with a trailing `/`. Several candidates complete to
/// their common prefix. Returns `None` when nothing changes.
pub fn autocomplete_path(input: &str) -> Option<String> {
    let expanded = expand_home(input).to_string_lossy().to_string();
    let path = PathBuf::from(&expanded);

    if path.is_dir() && !expanded.ends_with('/') {
        return Some(format!("{}/", expanded));
    }

    let (parent, prefix) = if expanded.ends_with('/') {
        (PathBuf::from(&expanded), String::new())
    } else {
        let parent = path.parent()?;
        let parent = if parent.as_os_str().is_empty() {
            PathBuf::from(".")
        } else {
            parent.to_path_buf()
        };
        let prefix = path
            .file_name()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        (parent, prefix)
    };

    let mut matches: Vec<String> = fs::read_dir(&parent)
        .ok()?
        .filter_map(|e| e.ok())
        .filter_map(|e| e.file_name().into_string().ok())
        .filter(|name| name.starts_with(&prefix) && !name.starts_with('.'))
        .collect();
    matches.sort();

    let completed = match matches.as_slice() {
        [] => return None,
        [only] => {
            let full = parent.join(only);
            if full.is_dir() {
                format!("{}/", full.to_string_lossy())
            } else {
                full.to_string_lossy().to_string()
            }
        }
        many => {
            let common = common_prefix(many)?;
            if common.len() <= prefix.len() {
                return None;
            }
            parent.join(&common).to_string_lossy().to_string()
        }
    };

    (completed != expanded).then_some(completed)
}

/// Find common prefix among strings
fn common_prefix(strings: &[String]) -> Option<String> {
    let first = strings.first()?;
    let mut prefix_len = first.len();

    for s in &strings[1..] {
        prefix_len = first
            .char_indices()
            .zip(s.chars())
            .take_while(|((_, a), b)| a == b)
            .last()
            .map(|((i, a), _)| i + a.len_utf8())
            .unwrap_or(0)
            .min(prefix_len);
    }

    (prefix_len > 0).then(|| first[..prefix_len].to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_MAGIC: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";

    fn file(mime: &str, size: u64) -> SelectedFile {
        SelectedFile {
            path: PathBuf::from("portrait.jpg"),
            file_name: "portrait.jpg".into(),
            mime_type: mime.into(),
            size_bytes: size,
        }
    }

    #[test]
    fn test_parse_dropped_paths_variants() {
        assert_eq!(parse_dropped_paths("/tmp/a.jpg"), vec![PathBuf::from("/tmp/a.jpg")]);
        assert_eq!(
            parse_dropped_paths("'/tmp/my photo.png' "),
            vec![PathBuf::from("/tmp/my photo.png")]
        );
        assert_eq!(
            parse_dropped_paths("/tmp/my\\ photo.png"),
            vec![PathBuf::from("/tmp/my photo.png")]
        );
        assert_eq!(
            parse_dropped_paths("file:///tmp/a.jpg\nfile:///tmp/b.jpg\n"),
            vec![PathBuf::from("/tmp/a.jpg"), PathBuf::from("/tmp/b.jpg")]
        );
        assert!(parse_dropped_paths("   \n").is_empty());
        assert_eq!(
            parse_dropped_paths("'/tmp/a b.jpg' '/tmp/c.jpg'"),
            vec![PathBuf::from("/tmp/a b.jpg"), PathBuf::from("/tmp/c.jpg")]
        );
    }

    #[test]
    fn test_bare_path_with_spaces_is_one_file() {
        assert_eq!(
            parse_dropped_paths("/tmp/my photo.jpg\n"),
            vec![PathBuf::from("/tmp/my photo.jpg")]
        );
        assert_eq!(
            parse_dropped_paths("/tmp/my photo.jpg\r\n/tmp/second shot.png"),
            vec![PathBuf::from("/tmp/my photo.jpg"), PathBuf::from("/tmp/second shot.png")]
        );
    }

    #[test]
    fn test_rejects_non_images() {
        for mime in ["text/plain", "application/pdf", "video/mp4", "application/octet-stream"] {
            let files = [file(mime, 1024)];
            assert!(matches!(
                validate_selection(&files),
                Err(UploadError::NotAnImage { .. })
            ));
        }
    }

    #[test]
    fn test_size_limit_is_inclusive() {
        assert!(validate_selection(&[file("image/jpeg", MAX_UPLOAD_BYTES)]).is_ok());
        assert_eq!(
            validate_selection(&[file("image/jpeg", MAX_UPLOAD_BYTES + 1)]),
            Err(UploadError::TooLarge { size_bytes: MAX_UPLOAD_BYTES + 1 })
        );
        assert!(validate_selection(&[file("image/jpeg", 15 * 1024 * 1024)]).is_err());
    }

    #[test]
    fn test_zero_or_many_files_rejected() {
        assert_eq!(validate_selection(&[]), Err(UploadError::NoFile));
        let two = [file("image/png", 10), file("image/png", 10)];
        assert_eq!(validate_selection(&two), Err(UploadError::MultipleFiles));
    }

    #[test]
    fn test_inspect_sniffs_magic_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("upload.bin");
        fs::write(&path, PNG_MAGIC).unwrap();

        let selected = inspect_file(&path).unwrap();
        assert_eq!(selected.mime_type, "image/png");
        assert_eq!(selected.size_bytes, PNG_MAGIC.len() as u64);
        assert_eq!(selected.file_name, "upload.bin");
    }

    #[test]
    fn test_inspect_text_file_is_not_an_image() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        fs::write(&path, "hello").unwrap();

        let selected = inspect_file(&path).unwrap();
        assert!(validate_selection(&[selected]).is_err());
    }

    #[test]
    fn test_inspect_missing_file() {
        let err = inspect_file(Path::new("/definitely/not/here.jpg")).unwrap_err();
        assert!(matches!(err, UploadError::Unreadable { .. }));
    }

    #[test]
    fn test_inspect_oversized_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("big.png");
        let f = fs::File::create(&path).unwrap();
        f.set_len(15 * 1024 * 1024).unwrap();

        let selected = inspect_file(&path).unwrap();
        assert_eq!(selected.mime_type, "image/png");
        assert!(matches!(
            validate_selection(&[selected]),
            Err(UploadError::TooLarge { .. })
        ));
    }

    #[test]
    fn test_widget_gate() {
        let mut widget = UploadWidget::default();
        widget.begin(1, file("image/jpeg", 10)).unwrap();
        assert!(widget.is_uploading());
        assert_eq!(widget.begin(2, file("image/jpeg", 10)), Err(UploadError::Busy));

        // stale id is ignored
        assert!(widget.finish(7, true).is_none());
        assert!(widget.is_uploading());

        assert!(widget.finish(1, false).is_some());
        assert_eq!(widget, UploadWidget::Empty);

        widget.begin(3, file("image/jpeg", 10)).unwrap();
        widget.finish(3, true);
        assert_eq!(widget.accepts_drop(), Err(UploadError::ImagePresent));
        widget.clear();
        assert!(widget.accepts_drop().is_ok());
    }

    #[test]
    fn test_autocomplete_single_file_and_prefix() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("portrait_a.jpg"), b"x").unwrap();
        fs::write(dir.path().join("portrait_b.jpg"), b"x").unwrap();
        fs::write(dir.path().join("selfie.png"), b"x").unwrap();
        let base = dir.path().to_string_lossy().to_string();

        assert_eq!(
            autocomplete_path(&format!("{}/sel", base)),
            Some(format!("{}/selfie.png", base))
        );
        assert_eq!(
            autocomplete_path(&format!("{}/por", base)),
            Some(format!("{}/portrait_", base))
        );
        assert_eq!(autocomplete_path(&format!("{}/portrait_", base)), None);
        assert_eq!(autocomplete_path(&base), Some(format!("{}/", base)));
    }
}
