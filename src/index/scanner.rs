use rayon::prelude::*;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use super::source;
use super::SymbolTable;

#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Classes whose simple name ends with this suffix feed the `#fn` namespace.
    pub function_suffix: String,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            function_suffix: "Functions".to_string(),
        }
    }
}

/// A file the scan skipped, with the reason. Skips never abort the scan.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanDiagnostic {
    pub path: PathBuf,
    pub reason: String,
}

#[derive(Debug)]
pub struct ScanReport {
    pub table: SymbolTable,
    pub scanned_files: usize,
    pub skipped: Vec<ScanDiagnostic>,
}

/// Fatal scan failures. Everything below the root is recovered per file.
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    #[error("scan root does not exist: {0}")]
    RootMissing(PathBuf),
    #[error("scan root is not a directory: {0}")]
    NotADirectory(PathBuf),
    #[error("scan root is not readable: {path}")]
    RootUnreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug)]
pub enum ScanOutcome {
    Complete(ScanReport),
    /// The cancel flag was raised mid-scan; nothing may be published.
    Cancelled,
}

/// Scan a Java source tree and build a fresh symbol table.
pub fn scan(root: &Path, options: &ScanOptions) -> Result<ScanReport, ScanError> {
    let never = AtomicBool::new(false);
    match scan_with_cancel(root, options, &never)? {
        ScanOutcome::Complete(report) => Ok(report),
        // `never` is local and stays false.
        ScanOutcome::Cancelled => unreachable!("scan cancelled without a cancel request"),
    }
}

/// Scan with a cooperative cancel flag, checked between files. A cancelled
/// scan returns `ScanOutcome::Cancelled` and must not be published.
pub fn scan_with_cancel(
    root: &Path,
    options: &ScanOptions,
    cancel: &AtomicBool,
) -> Result<ScanOutcome, ScanError> {
    let files = collect_java_files(root)?;
    info!(root = %root.display(), files = files.len(), "scanning java sources");

    enum FileResult {
        Parsed(Vec<super::ClassInfo>),
        Skipped(ScanDiagnostic),
        Cancelled,
    }

    let parsed: Vec<FileResult> = files
        .par_iter()
        .map(|path| {
            if cancel.load(Ordering::Relaxed) {
                return FileResult::Cancelled;
            }
            let src = match std::fs::read_to_string(path) {
                Ok(src) => src,
                Err(e) => {
                    return FileResult::Skipped(ScanDiagnostic {
                        path: path.clone(),
                        reason: format!("unreadable: {e}"),
                    });
                }
            };
            match source::parse_java_source(&src, &options.function_suffix) {
                Ok(classes) => FileResult::Parsed(classes),
                Err(e) => FileResult::Skipped(ScanDiagnostic {
                    path: path.clone(),
                    reason: e.to_string(),
                }),
            }
        })
        .collect();

    if cancel.load(Ordering::Relaxed) {
        info!(root = %root.display(), "scan cancelled");
        return Ok(ScanOutcome::Cancelled);
    }

    let mut table = SymbolTable::new(&options.function_suffix);
    let mut skipped = Vec::new();
    let mut scanned_files = 0usize;

    for result in parsed {
        match result {
            FileResult::Parsed(classes) => {
                scanned_files += 1;
                for class in classes {
                    table.add_class(class);
                }
            }
            FileResult::Skipped(diag) => {
                warn!(path = %diag.path.display(), reason = %diag.reason, "skipped file");
                skipped.push(diag);
            }
            FileResult::Cancelled => {}
        }
    }
    table.build_function_root();

    info!(
        classes = table.class_count(),
        scanned = scanned_files,
        skipped = skipped.len(),
        "scan complete"
    );
    Ok(ScanOutcome::Complete(ScanReport {
        table,
        scanned_files,
        skipped,
    }))
}

/// Walk the root and collect `.java` files, sorted for deterministic tables.
/// Test sources and build output are not rule-relevant and are left out.
fn collect_java_files(root: &Path) -> Result<Vec<PathBuf>, ScanError> {
    let meta = std::fs::metadata(root).map_err(|e| {
        if e.kind() == io::ErrorKind::NotFound {
            ScanError::RootMissing(root.to_path_buf())
        } else {
            ScanError::RootUnreadable {
                path: root.to_path_buf(),
                source: e,
            }
        }
    })?;
    if !meta.is_dir() {
        return Err(ScanError::NotADirectory(root.to_path_buf()));
    }
    // Probe readability up front; everything below is best-effort.
    std::fs::read_dir(root).map_err(|e| ScanError::RootUnreadable {
        path: root.to_path_buf(),
        source: e,
    })?;

    let mut files: Vec<PathBuf> = WalkDir::new(root)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(e) => Some(e),
            Err(e) => {
                debug!(error = %e, "walk error, entry skipped");
                None
            }
        })
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| p.extension().is_some_and(|ext| ext == "java"))
        .filter(|p| !is_excluded(p, root))
        .collect();
    files.sort();
    Ok(files)
}

fn is_excluded(path: &Path, root: &Path) -> bool {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative.components().any(|c| {
        let name = c.as_os_str().to_string_lossy().to_ascii_lowercase();
        name == "target" || name == "build" || name == ".gradle" || name.contains("test")
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const BASE_INFO: &str = r#"
package com.example.rules;

public class BaseInfo {
    private String idNumber;
    private String name;
    public int getAge() { return 0; }
}
"#;

    const RULE_FUNCTIONS: &str = r#"
package com.example.rules;

public class RuleFunctions {
    public boolean containsAny(String value) { return false; }
}
"#;

    fn write(dir: &Path, rel: &str, content: &str) {
        let path = dir.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_scan_indexes_classes_and_function_namespace() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "src/main/java/BaseInfo.java", BASE_INFO);
        write(dir.path(), "src/main/java/RuleFunctions.java", RULE_FUNCTIONS);

        let report = scan(dir.path(), &ScanOptions::default()).unwrap();
        assert_eq!(report.scanned_files, 2);
        assert!(report.skipped.is_empty());
        assert!(report.table.lookup_class("BaseInfo").is_some());
        assert!(
            report
                .table
                .function_root()
                .is_some_and(|ns| ns.methods.contains_key("containsAny"))
        );
    }

    #[test]
    fn test_broken_file_is_skipped_with_diagnostic() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "BaseInfo.java", BASE_INFO);
        write(dir.path(), "Broken.java", "public class Broken { void oops( }");

        let report = scan(dir.path(), &ScanOptions::default()).unwrap();
        assert!(report.table.lookup_class("BaseInfo").is_some());
        assert!(report.table.lookup_class("Broken").is_none());
        assert_eq!(report.skipped.len(), 1);
        assert!(report.skipped[0].path.ends_with("Broken.java"));
    }

    #[test]
    fn test_non_utf8_file_is_skipped_with_diagnostic() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "BaseInfo.java", BASE_INFO);
        fs::write(dir.path().join("Garbled.java"), [0xFF, 0xFE, 0x00, 0x42]).unwrap();

        let report = scan(dir.path(), &ScanOptions::default()).unwrap();
        assert!(report.table.lookup_class("BaseInfo").is_some());
        assert_eq!(report.skipped.len(), 1);
        assert!(report.skipped[0].path.ends_with("Garbled.java"));
        assert!(report.skipped[0].reason.starts_with("unreadable"));
    }

    #[test]
    fn test_missing_root_is_a_scan_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("no-such-dir");
        assert!(matches!(
            scan(&missing, &ScanOptions::default()),
            Err(ScanError::RootMissing(_))
        ));
    }

    #[test]
    fn test_root_file_is_not_a_directory() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("BaseInfo.java");
        fs::write(&file, BASE_INFO).unwrap();
        assert!(matches!(
            scan(&file, &ScanOptions::default()),
            Err(ScanError::NotADirectory(_))
        ));
    }

    #[test]
    fn test_build_output_and_tests_excluded() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "src/main/java/BaseInfo.java", BASE_INFO);
        write(dir.path(), "target/Generated.java", "public class Generated { }");
        write(
            dir.path(),
            "src/test/java/BaseInfoTest.java",
            "public class BaseInfoTest { }",
        );

        let report = scan(dir.path(), &ScanOptions::default()).unwrap();
        assert_eq!(report.scanned_files, 1);
        assert!(report.table.lookup_class("Generated").is_none());
        assert!(report.table.lookup_class("BaseInfoTest").is_none());
    }

    #[test]
    fn test_scanning_twice_yields_equal_tables() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "a/BaseInfo.java", BASE_INFO);
        write(dir.path(), "b/RuleFunctions.java", RULE_FUNCTIONS);

        let first = scan(dir.path(), &ScanOptions::default()).unwrap();
        let second = scan(dir.path(), &ScanOptions::default()).unwrap();
        assert_eq!(first.table, second.table);
    }

    #[test]
    fn test_cancelled_scan_publishes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "BaseInfo.java", BASE_INFO);

        let cancel = AtomicBool::new(true);
        let outcome = scan_with_cancel(dir.path(), &ScanOptions::default(), &cancel).unwrap();
        assert!(matches!(outcome, ScanOutcome::Cancelled));
    }
}
