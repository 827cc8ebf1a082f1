//! Utility functions for the CLI.

use std::fs;
use std::path::{Path, PathBuf};

use filetime::FileTime;
use indicatif::{ProgressBar, ProgressStyle};

/// File extensions the `decompress` command strips to name its output.
pub const COMPRESSED_EXTENSIONS: [&str; 8] =
    ["lz10", "lz11", "huf4", "huf8", "rle", "arch", "cri", "rac"];

/// Create a progress bar with standard styling.
pub fn create_progress_bar(len: u64, enable: bool) -> ProgressBar {
    if !enable {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new(len);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .expect("progress bar template is valid")
            .progress_chars("█▓▒░ "),
    );
    pb
}

/// Output path for a compressed file: the input name with the format
/// extension appended, placed in `output_dir` when given.
pub fn compressed_path(input: &Path, extension: &str, output_dir: Option<&Path>) -> PathBuf {
    let name = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let file = PathBuf::from(format!("{name}.{extension}"));
    match output_dir {
        Some(dir) => dir.join(file),
        None => input.with_file_name(file),
    }
}

/// Output path for a decompressed file: a known compressed extension is
/// stripped, anything else gets `.out` appended.
pub fn decompressed_path(input: &Path, output_dir: Option<&Path>) -> PathBuf {
    let known = input
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| COMPRESSED_EXTENSIONS.contains(&ext.to_lowercase().as_str()));

    let file = if known {
        PathBuf::from(input.file_stem().unwrap_or_default())
    } else {
        let name = input
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        PathBuf::from(format!("{name}.out"))
    };
    match output_dir {
        Some(dir) => dir.join(file),
        None => input.with_file_name(file),
    }
}

/// Carry the source file's modification time over to the output file.
pub fn copy_mtime(source: &Path, dest: &Path) -> std::io::Result<()> {
    let metadata = fs::metadata(source)?;
    let mtime = FileTime::from_last_modification_time(&metadata);
    filetime::set_file_mtime(dest, mtime)
}

/// Space savings in percent, negative when the output grew.
pub fn savings_percent(original: usize, processed: usize) -> f64 {
    if original == 0 {
        return 0.0;
    }
    (1.0 - processed as f64 / original as f64) * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compressed_path_appends_extension() {
        let path = compressed_path(Path::new("data/file.bin"), "lz10", None);
        assert_eq!(path, Path::new("data/file.bin.lz10"));
    }

    #[test]
    fn test_compressed_path_honors_output_dir() {
        let path = compressed_path(Path::new("data/file.bin"), "cri", Some(Path::new("out")));
        assert_eq!(path, Path::new("out/file.bin.cri"));
    }

    #[test]
    fn test_decompressed_path_strips_known_extension() {
        let path = decompressed_path(Path::new("data/file.bin.lz10"), None);
        assert_eq!(path, Path::new("data/file.bin"));

        let path = decompressed_path(Path::new("data/file.bin.RAC"), None);
        assert_eq!(path, Path::new("data/file.bin"));
    }

    #[test]
    fn test_decompressed_path_appends_out_for_unknown() {
        let path = decompressed_path(Path::new("data/file.dat"), None);
        assert_eq!(path, Path::new("data/file.dat.out"));
    }

    #[test]
    fn test_savings_percent() {
        assert!((savings_percent(100, 25) - 75.0).abs() < f64::EPSILON);
        assert!(savings_percent(100, 125) < 0.0);
        assert!((savings_percent(0, 10)).abs() < f64::EPSILON);
    }
}
