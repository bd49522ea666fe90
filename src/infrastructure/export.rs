use crate::domain::Todo;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to write '{path}': {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("failed to write '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub struct CsvExporter;

impl CsvExporter {
    /// Writes tasks as CSV with an `id,text,completed,createdAt` header.
    ///
    /// Returns the number of rows written.
    pub fn export_todos(todos: &[Todo], path: &Path) -> Result<usize, ExportError> {
        let csv_error = |source| ExportError::Csv {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| ExportError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let mut writer = csv::Writer::from_path(path).map_err(csv_error)?;
        writer
            .write_record(["id", "text", "completed", "createdAt"])
            .map_err(csv_error)?;

        for todo in todos {
            writer
                .write_record([
                    todo.id.to_string(),
                    todo.text.clone(),
                    todo.completed.to_string(),
                    todo.created_at.to_rfc3339(),
                ])
                .map_err(csv_error)?;
        }

        writer.flush().map_err(|source| ExportError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(todos.len())
    }
}
