use std::path::{Path, PathBuf};

/// Case-sensitive extension check, `ext` given without the dot.
pub fn has_extension(path: &Path, ext: &str) -> bool {
    path.extension().is_some_and(|found| found == ext)
}

/// Reads a corpus list: family headers like `[hwmcc20] - 12 files`, rule
/// lines, a `Total:` trailer, and one path per remaining line.
///
/// Only paths with extension `ext` are kept, in file order.
pub fn parse_input_list(text: &str, ext: &str) -> Vec<PathBuf> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter(|line| {
            !(line.starts_with('[')
                || line.starts_with('=')
                || line.starts_with('-')
                || line.starts_with('#')
                || line.starts_with("Total:"))
        })
        .map(PathBuf::from)
        .filter(|path| has_extension(path, ext))
        .collect()
}
