//! This module provides the `ProgramLoader` struct, responsible for building machines
//! from rule sources stored in files or strings.

use crate::machine::TuringMachine;
use crate::types::{Config, TuringMachineError};
use std::fs;
use std::path::{Path, PathBuf};

/// File extension of rule sources picked up by [`ProgramLoader::load_programs`].
pub const PROGRAM_EXTENSION: &str = "tm";

/// `ProgramLoader` is a utility struct for loading a-machines.
/// It provides methods to load machines from individual files, from string content,
/// and to discover and load all `.tm` files within a specified directory.
pub struct ProgramLoader;

impl ProgramLoader {
    /// Loads a single machine from the rule file at `path`.
    ///
    /// # Returns
    ///
    /// * `Ok(TuringMachine)` if the file is read and every rule compiles.
    /// * `Err(TuringMachineError::FileError)` if the file cannot be read.
    /// * `Err(TuringMachineError::SyntaxError)` if the rules are malformed.
    pub fn load_program(path: &Path) -> Result<TuringMachine, TuringMachineError> {
        Self::load_program_with(path, &Config::default())
    }

    /// Loads a single machine from the rule file at `path` with an explicit source
    /// configuration, e.g. a different comment marker.
    pub fn load_program_with(
        path: &Path,
        config: &Config,
    ) -> Result<TuringMachine, TuringMachineError> {
        let content = fs::read_to_string(path).map_err(|e| {
            TuringMachineError::FileError(format!("Failed to read file {}: {}", path.display(), e))
        })?;

        TuringMachine::with_config(&content, config)
    }

    /// Loads a single machine from rule text, e.g. from user input.
    pub fn load_program_from_string(content: &str) -> Result<TuringMachine, TuringMachineError> {
        TuringMachine::new(content)
    }

    /// Loads every `.tm` file of `directory`.
    ///
    /// Subdirectories and other files are skipped. Each loaded file yields either its
    /// path and machine or the error that prevented loading it.
    pub fn load_programs(
        directory: &Path,
    ) -> Vec<Result<(PathBuf, TuringMachine), TuringMachineError>> {
        if !directory.exists() {
            return vec![Err(TuringMachineError::FileError(format!(
                "Directory {} does not exist",
                directory.display()
            )))];
        }

        let entries = match fs::read_dir(directory) {
            Ok(entries) => entries,
            Err(e) => {
                return vec![Err(TuringMachineError::FileError(format!(
                    "Failed to read directory {}: {}",
                    directory.display(),
                    e
                )))]
            }
        };

        let mut results = entries
            .filter_map(|entry| {
                let path = match entry {
                    Ok(entry) => entry.path(),
                    Err(e) => {
                        return Some(Err(TuringMachineError::FileError(format!(
                            "Failed to read directory entry: {}",
                            e
                        ))))
                    }
                };

                if path.is_dir() || path.extension().is_none_or(|ext| ext != PROGRAM_EXTENSION) {
                    return None;
                }

                Some(Self::load_program(&path).map(|machine| (path, machine)))
            })
            .collect::<Vec<_>>();

        // Directory order is platform dependent
        results.sort_by(|a, b| match (a, b) {
            (Ok((a, _)), Ok((b, _))) => a.cmp(b),
            (Ok(_), Err(_)) => std::cmp::Ordering::Less,
            (Err(_), Ok(_)) => std::cmp::Ordering::Greater,
            (Err(_), Err(_)) => std::cmp::Ordering::Equal,
        });
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    fn write_file(path: &Path, content: &str) {
        let mut file = File::create(path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
    }

    #[test]
    fn test_load_valid_program() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("zero-one.tm");
        write_file(&file_path, "# alternating digits\na -> P0 R b\nb -> P1 R a\n");

        let mut machine = ProgramLoader::load_program(&file_path).unwrap();
        assert_eq!(machine.mconf(), Some("a"));
        machine.run(4);
        assert_eq!(machine.tape().to_string(), "0 1 0 1");
    }

    #[test]
    fn test_load_invalid_program() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("invalid.tm");
        write_file(&file_path, "This is not a valid program");

        let err = ProgramLoader::load_program(&file_path).unwrap_err();
        assert!(err.is_malformed());
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempdir().unwrap();
        let err = ProgramLoader::load_program(&dir.path().join("missing.tm")).unwrap_err();
        assert!(matches!(err, TuringMachineError::FileError(_)));
    }

    #[test]
    fn test_load_program_with_comment_symbol() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("semicolon.tm");
        write_file(&file_path, "; header\nq1 -> P# R q1 ; print hashes\n");

        let config = Config {
            comment_symbol: ";".to_string(),
        };
        let mut machine = ProgramLoader::load_program_with(&file_path, &config).unwrap();
        machine.run(2);
        assert_eq!(machine.tape().to_string(), "# #");

        assert!(ProgramLoader::load_program(&file_path).is_err());
    }

    #[test]
    fn test_load_program_from_string() {
        let machine = ProgramLoader::load_program_from_string("q4 -> q3").unwrap();
        assert_eq!(machine.mconf(), Some("q4"));
    }

    #[test]
    fn test_load_programs_from_directory() {
        let dir = tempdir().unwrap();

        write_file(&dir.path().join("valid.tm"), "a -> P0 R b\n");
        write_file(&dir.path().join("invalid.tm"), "a -> \n");
        write_file(&dir.path().join("ignored.txt"), "This file should be ignored");
        std::fs::create_dir(dir.path().join("nested.tm")).unwrap();

        let results = ProgramLoader::load_programs(dir.path());
        assert_eq!(results.len(), 2);

        let (path, machine) = results[0].as_ref().unwrap();
        assert_eq!(path.file_name().unwrap(), "valid.tm");
        assert_eq!(machine.mconf(), Some("a"));
        assert!(results[1].as_ref().unwrap_err().is_malformed());
    }

    #[test]
    fn test_load_programs_missing_directory() {
        let dir = tempdir().unwrap();
        let results = ProgramLoader::load_programs(&dir.path().join("nope"));
        assert_eq!(results.len(), 1);
        assert!(matches!(results[0], Err(TuringMachineError::FileError(_))));
    }
}
