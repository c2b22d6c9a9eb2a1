// simple-image/src/utils/mod.rs
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Path the encoder should write to before the final rename.
///
/// Returns `None` when `path` already ends with `.<extension>` (compared
/// case-sensitively), otherwise `path` with `.<extension>` appended.
pub fn staging_path(path: &Path, extension: &str) -> Option<PathBuf> {
    let suffix = format!(".{}", extension);
    if path.as_os_str().to_string_lossy().ends_with(&suffix) {
        return None;
    }

    let mut staged = OsString::from(path.as_os_str());
    staged.push(&suffix);
    Some(PathBuf::from(staged))
}

pub fn file_name(path: &Path) -> Option<String> {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
}

pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 6] = ["B", "KB", "MB", "GB", "TB", "PB"];

    if bytes == 0 {
        return "0 B".to_string();
    }

    let base = 1024_f64;
    let bytes_f64 = bytes as f64;
    let exponent = ((bytes_f64.log10() / base.log10()).floor() as usize).min(UNITS.len() - 1);
    let size = bytes_f64 / base.powi(exponent as i32);

    format!("{:.2} {}", size, UNITS[exponent])
}
