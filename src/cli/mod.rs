//! CLI glue: argument parsing and capture file discovery.
//!
//! File discovery is caller-side plumbing, not part of the replay core;
//! the engine only ever sees resolved paths.

mod args;

pub use args::Args;

use std::path::{Path, PathBuf};

use crate::error::Result;

/// Extensions recognized as capture files.
const PCAP_EXTENSIONS: [&str; 5] = ["pcap", "pcapng", "cap", "pcap.gz", "pcapng.gz"];

/// True when the file name looks like a capture file.
pub fn is_pcap_like(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    let lower = name.to_lowercase();
    PCAP_EXTENSIONS
        .iter()
        .any(|ext| lower.ends_with(&format!(".{ext}")))
}

/// Expand the argument paths into an ordered file list: files are kept
/// as given, directories are scanned (non-recursively) for capture files
/// in name order.
pub fn collect_capture_files(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for path in paths {
        if path.is_dir() {
            let mut entries: Vec<PathBuf> = std::fs::read_dir(path)?
                .filter_map(|entry| entry.ok())
                .map(|entry| entry.path())
                .filter(|p| p.is_file() && is_pcap_like(p))
                .collect();
            entries.sort();
            files.extend(entries);
        } else {
            files.push(path.clone());
        }
    }

    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_capture_extensions() {
        assert!(is_pcap_like(Path::new("trace.pcap")));
        assert!(is_pcap_like(Path::new("trace.pcapng")));
        assert!(is_pcap_like(Path::new("TRACE.PCAP")));
        assert!(is_pcap_like(Path::new("trace.pcap.gz")));
        assert!(!is_pcap_like(Path::new("trace.txt")));
        assert!(!is_pcap_like(Path::new("pcap"))); // no extension
    }

    #[test]
    fn scans_directories_in_name_order() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.pcap", "a.pcapng", "notes.txt"] {
            std::fs::write(dir.path().join(name), b"x").unwrap();
        }

        let files = collect_capture_files(&[dir.path().to_path_buf()]).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap())
            .collect();
        assert_eq!(names, ["a.pcapng", "b.pcap"]);
    }

    #[test]
    fn explicit_files_kept_in_given_order() {
        let files = collect_capture_files(&[
            PathBuf::from("second.pcap"),
            PathBuf::from("first.pcap"),
        ])
        .unwrap();
        assert_eq!(files[0], PathBuf::from("second.pcap"));
    }
}
