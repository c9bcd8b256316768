//! Inputs handed to the pipeline

/// A file as uploaded or downloaded, plus the content type the caller declared
#[derive(Debug, Clone)]
pub struct SourceArtifact {
    pub bytes: Vec<u8>,
    pub declared_content_type: String,
    pub origin_name: Option<String>,
}

impl SourceArtifact {
    pub fn new(bytes: impl Into<Vec<u8>>, declared_content_type: impl Into<String>) -> Self {
        Self {
            bytes: bytes.into(),
            declared_content_type: declared_content_type.into(),
            origin_name: None,
        }
    }

    /// Build an artifact from a file name, inferring the content type from
    /// its extension
    pub fn from_named_bytes(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        let name = name.into();
        Self {
            bytes: bytes.into(),
            declared_content_type: crate::registry::content_type_for_name(&name).to_string(),
            origin_name: Some(name),
        }
    }

    pub fn with_origin_name(mut self, name: impl Into<String>) -> Self {
        self.origin_name = Some(name.into());
        self
    }
}

/// One file found inside an archive
#[derive(Debug, Clone)]
pub struct ArchiveMember {
    /// Path of the member within the archive
    pub name: String,
    /// Content type guessed from the member's extension
    pub inferred_content_type: &'static str,
    pub bytes: Vec<u8>,
    pub archive_origin_name: Option<String>,
}

impl ArchiveMember {
    pub(crate) fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let name = name.into();
        Self {
            inferred_content_type: crate::registry::content_type_for_name(&name),
            name,
            bytes,
            archive_origin_name: None,
        }
    }
}
