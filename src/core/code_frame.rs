//! Source-code context around an error location

use super::error::{LoggerError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Lines shown before and after the relevant line when nothing else is configured
pub const DEFAULT_CONTEXT_LINES: usize = 5;

/// Window of source text around one line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeFrame {
    /// 1-based number of the first displayed line
    pub first_line_number: usize,
    pub line_number: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column_number: Option<u32>,
    pub lines_before: Vec<String>,
    pub relevant_line: String,
    pub lines_after: Vec<String>,
}

impl CodeFrame {
    /// Cut a frame out of `source` around the 1-based `line_number`.
    ///
    /// Returns `None` when the line does not exist in the text.
    pub fn extract(
        source: &str,
        line_number: usize,
        column_number: Option<u32>,
        context_lines: usize,
    ) -> Option<Self> {
        let lines: Vec<&str> = source
            .split('\n')
            .map(|line| line.strip_suffix('\r').unwrap_or(line))
            .collect();

        let index = line_number.checked_sub(1)?;
        let relevant_line = lines.get(index)?;

        let start = index.saturating_sub(context_lines);
        let end = index.saturating_add(context_lines).min(lines.len() - 1);

        Some(Self {
            first_line_number: start + 1,
            line_number,
            column_number,
            lines_before: lines[start..index].iter().map(|l| l.to_string()).collect(),
            relevant_line: relevant_line.to_string(),
            lines_after: lines[index + 1..=end].iter().map(|l| l.to_string()).collect(),
        })
    }
}

/// File I/O collaborator used to read source text for code frames
pub trait SourceReader: Send + Sync {
    fn read_source(&self, path: &Path) -> Result<String>;
}

/// Reads source files from the local file system
#[derive(Debug, Clone, Copy, Default)]
pub struct FsSourceReader;

impl SourceReader for FsSourceReader {
    fn read_source(&self, path: &Path) -> Result<String> {
        std::fs::read_to_string(path).map_err(|e| {
            LoggerError::io_operation("reading source file", path.display().to_string(), e)
        })
    }
}

/// Read `path` and extract a frame; any failure yields `None`
pub fn read_code_frame(
    reader: &dyn SourceReader,
    path: &Path,
    line_number: usize,
    column_number: Option<u32>,
    context_lines: usize,
) -> Option<CodeFrame> {
    let source = reader.read_source(path).ok()?;
    CodeFrame::extract(&source, line_number, column_number, context_lines)
}
