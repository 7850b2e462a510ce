//! Source context for managing original files

use serde::{Deserialize, Serialize};

use crate::error::{Result, TextError};
use crate::text::Text;
use crate::types::{FileId, TextLocation};

/// Registry of the original files a pipeline reads from
///
/// Each registered file gets a [`FileId`] and a root [`Text`]. Locations only
/// carry the id; the context turns them back into paths for reporting.
#[derive(Debug, Clone, Default)]
pub struct SourceContext {
    files: Vec<SourceFile>,
}

/// An original file and its root text
#[derive(Debug, Clone)]
pub struct SourceFile {
    /// File path or identifier
    pub path: String,
    /// Root text over the file content
    pub text: Text,
    pub metadata: FileMetadata,
}

/// Metadata about a source file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileMetadata {
    /// File type (c, cobol, plsql, ...)
    pub file_type: Option<String>,
}

impl SourceContext {
    pub fn new() -> Self {
        SourceContext { files: Vec::new() }
    }

    /// Register a file and return its root text
    pub fn add_file(&mut self, path: impl Into<String>, content: &str) -> Text {
        self.add_file_with_metadata(path, content, FileMetadata::default())
    }

    pub fn add_file_with_metadata(
        &mut self,
        path: impl Into<String>,
        content: &str,
        metadata: FileMetadata,
    ) -> Text {
        let id = FileId(self.files.len());
        let text = Text::from_source(id, content);
        self.files.push(SourceFile {
            path: path.into(),
            text: text.clone(),
            metadata,
        });
        text
    }

    pub fn get_file(&self, id: FileId) -> Option<&SourceFile> {
        self.files.get(id.0)
    }

    /// Root text of a registered file
    pub fn root(&self, id: FileId) -> Result<Text> {
        self.get_file(id)
            .map(|file| file.text.clone())
            .ok_or(TextError::UnknownFile(id))
    }

    pub fn path_of(&self, id: FileId) -> Result<&str> {
        self.get_file(id)
            .map(|file| file.path.as_str())
            .ok_or(TextError::UnknownFile(id))
    }

    /// Render a location as `path:line:column`
    pub fn display_location(&self, location: &TextLocation) -> Result<String> {
        let path = self.path_of(location.file)?;
        Ok(format!("{}:{}:{}", path, location.line, location.column))
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn files(&self) -> impl Iterator<Item = (FileId, &SourceFile)> {
        self.files
            .iter()
            .enumerate()
            .map(|(idx, file)| (FileId(idx), file))
    }
}
