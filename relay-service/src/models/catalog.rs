//! The static movie catalog the assistant answers from.

use serde::{Deserialize, Serialize};
use service_core::error::AppError;
use std::path::Path;

/// One catalog entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    pub title: String,
    pub year: u16,
    pub director: String,
    pub genre: Vec<String>,
    pub plot: String,
    pub actors: Vec<String>,
    pub rating: f32,
}

/// Read-only collection of movies, loaded once at startup.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    movies: Vec<Movie>,
}

impl Catalog {
    pub fn new(movies: Vec<Movie>) -> Self {
        Self { movies }
    }

    /// Parse a JSON array of movies.
    pub fn from_json(raw: &str) -> Result<Self, AppError> {
        let movies: Vec<Movie> = serde_json::from_str(raw).map_err(|e| {
            AppError::ConfigError(anyhow::anyhow!("Invalid movie catalog: {}", e))
        })?;
        Ok(Self::new(movies))
    }

    pub fn load(path: &Path) -> Result<Self, AppError> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            AppError::ConfigError(anyhow::anyhow!(
                "Failed to read movie catalog {}: {}",
                path.display(),
                e
            ))
        })?;

        let catalog = Self::from_json(&raw)?;
        tracing::info!(
            path = %path.display(),
            movies = catalog.len(),
            "Loaded movie catalog"
        );
        Ok(catalog)
    }

    /// Movies in file order.
    pub fn movies(&self) -> &[Movie] {
        &self.movies
    }

    pub fn len(&self) -> usize {
        self.movies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.movies.is_empty()
    }
}
