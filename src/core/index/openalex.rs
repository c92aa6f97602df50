//! OpenAlex work documents.
//!
//! Snapshot records store abstracts as an inverted index
//! (`word -> [positions]`). Documents loaded here always carry a plain
//! `abstract` string instead.

use crate::core::error::{Result, SearchError};
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;

/// Rebuild abstract text from an OpenAlex inverted index.
///
/// Each word is written at every position it lists; unfilled positions
/// stay empty and the joined text is trimmed. Returns `None` for an
/// empty or malformed index.
pub fn abstract_from_inverted_index(inverted: &Map<String, Value>) -> Option<String> {
    let mut placements: Vec<(usize, &str)> = Vec::new();
    for (word, positions) in inverted {
        for position in positions.as_array()? {
            let position = usize::try_from(position.as_u64()?).ok()?;
            placements.push((position, word.as_str()));
        }
    }

    let length = placements.iter().map(|(p, _)| *p).max()? + 1;
    let mut words = vec![""; length];
    for (position, word) in placements {
        words[position] = word;
    }

    Some(words.join(" ").trim().to_string())
}

/// Normalize a work: fill `abstract` from the inverted index and drop it.
///
/// Returns `None` if the document is not an object or has no string `id`.
pub fn normalize_work(mut doc: Value) -> Option<Value> {
    let object = doc.as_object_mut()?;
    object.get("id")?.as_str()?;

    if let Some(Value::Object(inverted)) = object.remove("abstract_inverted_index") {
        let has_abstract = object.get("abstract").is_some_and(Value::is_string);
        if !has_abstract {
            if let Some(text) = abstract_from_inverted_index(&inverted) {
                object.insert("abstract".to_string(), Value::String(text));
            }
        }
    }

    Some(doc)
}

/// Parse works from a JSON array or JSON-lines text
pub fn parse_works(contents: &str) -> Result<Vec<Value>> {
    let trimmed = contents.trim_start();
    let raw: Vec<Value> = if trimmed.starts_with('[') {
        serde_json::from_str(trimmed)?
    } else {
        trimmed
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(serde_json::from_str)
            .collect::<std::result::Result<_, _>>()?
    };

    let total = raw.len();
    let works: Vec<Value> = raw.into_iter().filter_map(normalize_work).collect();
    if works.len() < total {
        tracing::warn!("Skipped {} work(s) without an id", total - works.len());
    }
    Ok(works)
}

/// Load works from a fixture file
pub fn load_works(path: impl AsRef<Path>) -> Result<Vec<Value>> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|e| {
        SearchError::IoError(std::io::Error::new(
            e.kind(),
            format!("{}: {e}", path.display()),
        ))
    })?;
    let works = parse_works(&contents)?;
    tracing::info!("Loaded {} work(s) from {}", works.len(), path.display());
    Ok(works)
}
