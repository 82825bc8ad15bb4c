use std::path::PathBuf;

pub type CoverResult<T> = Result<T, CoverError>;

#[derive(thiserror::Error, Debug)]
pub enum CoverError {
    #[error("malformed document: {0}")]
    Document(String),

    #[error("invalid geometry: {0}")]
    Geometry(String),

    #[error("resource not found: {}", path.display())]
    ResourceNotFound { path: PathBuf },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CoverError {
    pub fn document(msg: impl Into<String>) -> Self {
        Self::Document(msg.into())
    }

    pub fn geometry(msg: impl Into<String>) -> Self {
        Self::Geometry(msg.into())
    }

    pub fn resource(path: impl Into<PathBuf>) -> Self {
        Self::ResourceNotFound { path: path.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_prefixes_are_stable() {
        assert!(
            CoverError::document("x")
                .to_string()
                .contains("malformed document:")
        );
        assert!(
            CoverError::geometry("x")
                .to_string()
                .contains("invalid geometry:")
        );
        assert!(
            CoverError::resource("missing.png")
                .to_string()
                .contains("missing.png")
        );
    }

    #[test]
    fn other_preserves_source() {
        let base = std::io::Error::other("boom");
        let err = CoverError::Other(anyhow::Error::new(base));
        assert!(err.to_string().contains("boom"));
    }
}
