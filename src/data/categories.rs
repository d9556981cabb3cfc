//! Category Vocabulary Module
//! Loads field-of-study keywords and matches course names against them.

use regex::{Regex, RegexBuilder};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CategoryError {
    #[error("Category file not found: {0}")]
    NotFound(PathBuf),
    #[error("Failed to read category file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid keyword pattern: {0}")]
    Pattern(#[from] regex::Error),
}

/// Ordered lowercase keywords, one per non-empty line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryVocabulary {
    keywords: Vec<String>,
}

impl CategoryVocabulary {
    /// Read the vocabulary from a UTF-8 text file.
    pub fn load(path: &Path) -> Result<Self, CategoryError> {
        let text = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => CategoryError::NotFound(path.to_path_buf()),
            _ => CategoryError::Io(e),
        })?;
        Ok(Self::from_text(&text))
    }

    pub fn from_text(text: &str) -> Self {
        // A blank keyword would match every course.
        let keywords = text
            .lines()
            .map(|line| line.trim().to_lowercase())
            .filter(|line| !line.is_empty())
            .collect();
        Self { keywords }
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    pub fn len(&self) -> usize {
        self.keywords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
    }
}

/// Case-insensitive literal substring match against any keyword.
#[derive(Debug, Clone)]
pub struct CourseMatcher {
    pattern: Option<Regex>,
}

impl CourseMatcher {
    pub fn new(vocabulary: &CategoryVocabulary) -> Result<Self, CategoryError> {
        if vocabulary.is_empty() {
            return Ok(Self { pattern: None });
        }

        let alternation = vocabulary
            .keywords()
            .iter()
            .map(|k| regex::escape(k))
            .collect::<Vec<_>>()
            .join("|");
        let pattern = RegexBuilder::new(&alternation)
            .case_insensitive(true)
            .build()?;

        Ok(Self {
            pattern: Some(pattern),
        })
    }

    pub fn is_match(&self, course: &str) -> bool {
        self.pattern
            .as_ref()
            .map(|p| p.is_match(course))
            .unwrap_or(false)
    }
}
