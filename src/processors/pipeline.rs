//! File-level orchestration: load, pick columns, reorder, export.

use std::collections::hash_map::{Entry, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rayon::prelude::*;
use thiserror::Error;

use super::columns::resolve_fields;
use super::reorder::{reorder, FieldSelection, ReorderOutcome, ReorderWarning};
use crate::config::{ExportFormat, PipelineConfig};
use crate::core::loaders::load_table;
use crate::core::writers::write_table;

/// Errors raised by the orchestration layer itself.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Input has no columns to pick coordinates from: {0}")]
    NoColumns(PathBuf),

    #[error("Directory not found: {0}")]
    DirectoryNotFound(PathBuf),

    #[error("No CSV/TXT files found in {folder}")]
    NoFilesFound { folder: PathBuf },

    #[error("Output names for {input} are already used by {claimed_by}")]
    DuplicateStem { input: PathBuf, claimed_by: PathBuf },
}

/// Summary of one reordered file.
#[derive(Debug, Clone)]
pub struct FileReport {
    pub input: PathBuf,
    pub fields: FieldSelection,
    pub rows: usize,
    pub start_index: usize,
    pub start_source_row: usize,
    pub warning: Option<ReorderWarning>,
    pub outputs: Vec<PathBuf>,
}

/// Per-file result of a directory run.
#[derive(Debug)]
pub struct BatchEntry {
    pub input: PathBuf,
    pub result: std::result::Result<FileReport, String>,
}

/// Load `input` and reorder it.
///
/// Coordinate columns come from the overrides, then `config.reorder`, then
/// the header guess.
pub fn reorder_file(
    input: &Path,
    x_field: Option<&str>,
    y_field: Option<&str>,
    config: &PipelineConfig,
) -> Result<(FieldSelection, ReorderOutcome)> {
    let table = load_table(input, &config.loader)
        .with_context(|| format!("Failed to load {}", input.display()))?;

    let fields = resolve_fields(&table.columns, x_field, y_field, &config.reorder)
        .ok_or_else(|| PipelineError::NoColumns(input.to_path_buf()))?;

    let outcome = reorder(&table, &fields, &config.reorder)
        .with_context(|| format!("Failed to reorder {}", input.display()))?;

    if let Some(warning) = outcome.warning {
        log::warn!("{}: {}", input.display(), warning);
    }

    Ok((fields, outcome))
}

/// Write `outcome` to every `(format, path)` target.
pub fn export_outcome(outcome: &ReorderOutcome, targets: &[(ExportFormat, PathBuf)]) -> Result<()> {
    for (format, path) in targets {
        write_table(path, &outcome.table, *format)?;
        log::info!("Wrote {}", path.display());
    }
    Ok(())
}

/// Export targets for a batch input: `<stem>_sorted.<ext>` under `output_dir`.
pub fn batch_targets(
    output_dir: &Path,
    input: &Path,
    formats: &[ExportFormat],
) -> Vec<(ExportFormat, PathBuf)> {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "points".to_string());

    formats
        .iter()
        .map(|&format| {
            let name = format!("{}_sorted.{}", stem, format.extension());
            (format, output_dir.join(name))
        })
        .collect()
}

fn is_table_file(path: &Path) -> bool {
    path.is_file()
        && path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("csv") || ext.eq_ignore_ascii_case("txt"))
            .unwrap_or(false)
}

/// Collect `.csv`/`.txt` files of a directory, sorted by path.
pub fn find_input_files(input_dir: &Path) -> Result<Vec<PathBuf>> {
    if !input_dir.is_dir() {
        return Err(PipelineError::DirectoryNotFound(input_dir.to_path_buf()).into());
    }

    let mut files: Vec<PathBuf> = fs::read_dir(input_dir)
        .with_context(|| format!("Failed to read directory {}", input_dir.display()))?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| is_table_file(path))
        .collect();

    if files.is_empty() {
        return Err(PipelineError::NoFilesFound {
            folder: input_dir.to_path_buf(),
        }
        .into());
    }

    files.sort();
    Ok(files)
}

fn process_one(input: &Path, output_dir: &Path, config: &PipelineConfig) -> Result<FileReport> {
    let (fields, outcome) = reorder_file(input, None, None, config)?;
    let targets = batch_targets(output_dir, input, &config.export.formats);
    export_outcome(&outcome, &targets)?;

    Ok(FileReport {
        input: input.to_path_buf(),
        fields,
        rows: outcome.table.len(),
        start_index: outcome.start_index,
        start_source_row: outcome.start_source_row,
        warning: outcome.warning,
        outputs: targets.into_iter().map(|(_, path)| path).collect(),
    })
}

/// Pair each input with the earlier input whose stem it repeats, if any.
///
/// Stems compare case-insensitively. The first file in path order owns
/// its `<stem>_sorted.*` names.
fn stem_conflicts(files: &[PathBuf]) -> Vec<(PathBuf, Option<PathBuf>)> {
    let mut owners: HashMap<String, &PathBuf> = HashMap::new();

    files
        .iter()
        .map(|input| {
            let stem = input
                .file_stem()
                .map(|s| s.to_string_lossy().to_lowercase())
                .unwrap_or_default();
            let conflict = match owners.entry(stem) {
                Entry::Occupied(owner) => Some(owner.get().to_path_buf()),
                Entry::Vacant(slot) => {
                    slot.insert(input);
                    None
                }
            };
            (input.clone(), conflict)
        })
        .collect()
}

/// Reorder every table file of `input_dir` in parallel.
///
/// Each file is independent: a failure is recorded in its [`BatchEntry`]
/// and the remaining files are still processed. Entries come back in input
/// path order. When two inputs share a stem (`sec.csv`, `sec.txt`) only the
/// first is processed; the later ones fail with
/// [`PipelineError::DuplicateStem`] and nothing is written for them.
pub fn reorder_directory(
    input_dir: &Path,
    output_dir: &Path,
    config: &PipelineConfig,
) -> Result<Vec<BatchEntry>> {
    let files = find_input_files(input_dir)?;
    log::info!("Reordering {} files from {}", files.len(), input_dir.display());

    let tasks = stem_conflicts(&files);

    let entries: Vec<BatchEntry> = tasks
        .par_iter()
        .map(|(input, conflict)| {
            let result = match conflict {
                Some(owner) => Err(PipelineError::DuplicateStem {
                    input: input.clone(),
                    claimed_by: owner.clone(),
                }
                .into()),
                None => process_one(input, output_dir, config),
            }
            .map_err(|e: anyhow::Error| {
                log::error!("{}: {:#}", input.display(), e);
                format!("{:#}", e)
            });
            BatchEntry {
                input: input.clone(),
                result,
            }
        })
        .collect();

    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        let mut file = File::create(&path).unwrap();
        write!(file, "{}", content).unwrap();
        path
    }

    #[test]
    fn test_reorder_file_guesses_columns() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_file(
            temp_dir.path(),
            "section.csv",
            "node,x1,y1,value1\n1,1,1,a\n2,-1,-1,b\n3,-2,-0.5,c\n4,1,-1,d\n",
        );

        let (fields, outcome) = reorder_file(&path, None, None, &PipelineConfig::default()).unwrap();
        assert_eq!(fields, FieldSelection::new("x1", "y1"));
        let nodes: Vec<&str> = outcome.table.records.iter().map(|r| r.values[0].as_str()).collect();
        assert_eq!(nodes, vec!["2", "3", "1", "4"]);
        assert_eq!(outcome.start_index, 2);
    }

    #[test]
    fn test_reorder_file_reports_bad_field() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_file(temp_dir.path(), "bad.csv", "x,y\n1,oops\n");

        let err = reorder_file(&path, None, None, &PipelineConfig::default()).unwrap_err();
        let message = format!("{:#}", err);
        assert!(message.contains("Failed to reorder"));
        assert!(message.contains("'y'"));
        assert!(message.contains("row 1"));
    }

    #[test]
    fn test_batch_targets() {
        let targets = batch_targets(
            Path::new("out"),
            Path::new("in/section_a.txt"),
            &[ExportFormat::Csv, ExportFormat::Txt],
        );
        assert_eq!(targets[0], (ExportFormat::Csv, PathBuf::from("out/section_a_sorted.csv")));
        assert_eq!(targets[1], (ExportFormat::Txt, PathBuf::from("out/section_a_sorted.txt")));
    }

    #[test]
    fn test_find_input_files_filters_and_sorts() {
        let temp_dir = TempDir::new().unwrap();
        write_file(temp_dir.path(), "b.txt", "x y\n1 1\n");
        write_file(temp_dir.path(), "a.CSV", "x,y\n1,1\n");
        write_file(temp_dir.path(), "notes.md", "ignore");

        let files = find_input_files(temp_dir.path()).unwrap();
        let names: Vec<String> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["a.CSV", "b.txt"]);
    }

    #[test]
    fn test_find_input_files_empty_dir() {
        let temp_dir = TempDir::new().unwrap();
        assert!(find_input_files(temp_dir.path()).is_err());
        assert!(find_input_files(&temp_dir.path().join("missing")).is_err());
    }

    #[test]
    fn test_reorder_directory_same_stem_keeps_first() {
        let input = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();
        write_file(input.path(), "sec.csv", "node,x,y\nA,1,1\nB,-1,-1\n");
        write_file(input.path(), "sec.txt", "node x y\nZ 5 5\nW -5 -5\nQ 3 -3\n");

        let entries = reorder_directory(input.path(), output.path(), &PipelineConfig::default()).unwrap();
        assert_eq!(entries.len(), 2);

        let first = entries[0].result.as_ref().unwrap();
        assert!(first.input.ends_with("sec.csv"));
        assert_eq!(first.outputs.len(), 2);

        assert!(entries[1].input.ends_with("sec.txt"));
        let err = entries[1].result.as_ref().unwrap_err();
        assert!(err.contains("already used by"), "{}", err);

        let written: Vec<_> = fs::read_dir(output.path()).unwrap().collect();
        assert_eq!(written.len(), 2);
        let content = fs::read_to_string(output.path().join("sec_sorted.csv")).unwrap();
        assert_eq!(content, "node,x,y\nB,-1,-1\nA,1,1\n");
    }

    #[test]
    fn test_stem_conflicts_case_insensitive() {
        let files = vec![
            PathBuf::from("in/A.csv"),
            PathBuf::from("in/a.txt"),
            PathBuf::from("in/b.csv"),
        ];
        let tasks = stem_conflicts(&files);
        assert_eq!(tasks[0].1, None);
        assert_eq!(tasks[1].1, Some(PathBuf::from("in/A.csv")));
        assert_eq!(tasks[2].1, None);
    }

    #[test]
    fn test_reorder_directory_isolates_failures() {
        let input = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();
        write_file(input.path(), "good.csv", "x,y\n1,1\n-1,-1\n");
        write_file(input.path(), "empty.csv", "x,y\n");

        let entries = reorder_directory(input.path(), output.path(), &PipelineConfig::default()).unwrap();
        assert_eq!(entries.len(), 2);

        let empty = &entries[0];
        assert!(empty.input.ends_with("empty.csv"));
        assert!(empty.result.as_ref().unwrap_err().contains("No points to reorder"));

        let good = entries[1].result.as_ref().unwrap();
        assert_eq!(good.rows, 2);
        assert_eq!(good.outputs.len(), 2);
        assert!(output.path().join("good_sorted.csv").exists());
        assert!(output.path().join("good_sorted.txt").exists());

        let content = fs::read_to_string(output.path().join("good_sorted.csv")).unwrap();
        assert_eq!(content, "x,y\n-1,-1\n1,1\n");
    }
}
