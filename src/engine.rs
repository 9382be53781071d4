//! Owns the live symbol table. Queries read an `Arc` snapshot; a rescan builds
//! a whole new table off to the side and swaps it in atomically on success, so
//! a query never observes a partially built or partially updated table. A
//! failed or cancelled scan leaves the previous table untouched.

use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, RwLock};
use tracing::{info, warn};

use crate::completion::{self, Candidate};
use crate::index::scanner::{self, ScanDiagnostic, ScanError, ScanOptions, ScanOutcome};
use crate::index::SymbolTable;

/// What a rescan reports back once the new table is installed.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanSummary {
    pub classes: usize,
    pub scanned_files: usize,
    pub skipped: Vec<ScanDiagnostic>,
}

pub struct AnalyzerEngine {
    table: RwLock<Arc<SymbolTable>>,
}

impl AnalyzerEngine {
    pub fn new() -> Self {
        Self::with_table(SymbolTable::default())
    }

    pub fn with_table(table: SymbolTable) -> Self {
        Self {
            table: RwLock::new(Arc::new(table)),
        }
    }

    pub fn snapshot(&self) -> Arc<SymbolTable> {
        Arc::clone(&self.table.read().unwrap())
    }

    pub fn install(&self, table: SymbolTable) {
        *self.table.write().unwrap() = Arc::new(table);
    }

    /// One keystroke: candidates for the expression under the caret.
    pub fn complete(&self, text: &str, caret: usize) -> Vec<Candidate> {
        completion::complete(text, caret, &self.snapshot())
    }

    /// Bind a root object by rebuilding the published table. The clone and
    /// the republish happen under the write lock so a table published in
    /// between (say by a background rescan) cannot be lost.
    pub fn bind_root(&self, name: &str, class_name: &str) {
        let mut guard = self.table.write().unwrap();
        let mut table = (**guard).clone();
        table.bind_root(name, class_name);
        *guard = Arc::new(table);
    }

    pub fn set_default_root(&self, name: &str) {
        let mut guard = self.table.write().unwrap();
        let mut table = (**guard).clone();
        table.set_default_root(name);
        *guard = Arc::new(table);
    }

    /// Synchronous rescan. Root bindings carry over from the previous table;
    /// on error the previous table stays live.
    pub fn rescan(&self, root: &Path, options: &ScanOptions) -> Result<ScanSummary, ScanError> {
        let report = scanner::scan(root, options)?;
        let summary = ScanSummary {
            classes: report.table.class_count(),
            scanned_files: report.scanned_files,
            skipped: report.skipped,
        };
        self.install(self.adopt_bindings(report.table));
        Ok(summary)
    }

    /// Rescan on a worker thread. The cancel flag is checked between files;
    /// cancellation or failure publishes nothing.
    pub fn rescan_in_background(
        self: &Arc<Self>,
        root: PathBuf,
        options: ScanOptions,
        cancel: Arc<AtomicBool>,
    ) -> std::thread::JoinHandle<()> {
        let engine = Arc::clone(self);
        std::thread::spawn(move || {
            match scanner::scan_with_cancel(&root, &options, &cancel) {
                Ok(ScanOutcome::Complete(report)) => {
                    info!(
                        classes = report.table.class_count(),
                        skipped = report.skipped.len(),
                        "background scan complete, publishing table"
                    );
                    engine.install(engine.adopt_bindings(report.table));
                }
                Ok(ScanOutcome::Cancelled) => {
                    info!("background scan cancelled, previous table kept");
                }
                Err(e) => {
                    warn!(error = %e, "background scan failed, previous table kept");
                }
            }
        })
    }

    fn adopt_bindings(&self, mut table: SymbolTable) -> SymbolTable {
        let previous = self.snapshot();
        for (name, class) in previous.roots() {
            table.bind_root(name, class);
        }
        if let Some(default) = previous.default_root() {
            table.set_default_root(default);
        }
        table
    }
}

impl Default for AnalyzerEngine {
    fn default() -> Self {
        Self::new()
    }
}
