// Test fixtures: synthetic OpenAlex works

use scholar_search::core::index::openalex;
use serde_json::{json, Value};
use std::path::PathBuf;
use tempfile::TempDir;

/// Number of works mentioning "neural networks" in `WorksCorpus::neural_networks`
#[allow(dead_code)]
pub const NEURAL_WORKS: usize = 25;

/// Works by Geoffrey Hinton (all at the University of Toronto)
#[allow(dead_code)]
pub const HINTON_WORKS: usize = 5;

/// A set of OpenAlex-shaped work documents
#[allow(dead_code)]
pub struct WorksCorpus {
    raw: Vec<Value>,
}

impl WorksCorpus {
    /// 25 neural network works plus 5 unrelated ones.
    ///
    /// - every 5th neural work is by Geoffrey Hinton (University of Toronto),
    ///   the rest by Yann LeCun (New York University)
    /// - every 4th neural work adds Yoshua Bengio (University of Montreal)
    /// - every 7th neural work stores its abstract as an inverted index
    #[allow(dead_code)]
    pub fn neural_networks() -> Self {
        const ABSTRACTS: [&str; 3] = [
            "neural networks learn representations",
            "training deep neural networks with backpropagation on large image datasets",
            "graph neural networks for molecules and neural networks for proteins",
        ];

        let mut raw = Vec::new();
        for i in 0..NEURAL_WORKS {
            let mut authors = vec![if i % 5 == 0 {
                ("Geoffrey Hinton", "University of Toronto")
            } else {
                ("Yann LeCun", "New York University")
            }];
            if i % 4 == 0 {
                authors.push(("Yoshua Bengio", "University of Montreal"));
            }

            let text = ABSTRACTS[i % ABSTRACTS.len()];
            let mut doc = work(1000 + i, &format!("Neural study {i}"), text, &authors);
            if i % 7 == 0 {
                let object = doc.as_object_mut().unwrap();
                object.remove("abstract");
                object.insert("abstract_inverted_index".to_string(), inverted_index(text));
            }
            raw.push(doc);
        }

        let unrelated = [
            "protein folding with attention",
            "graphene conductivity at low temperature",
            "coral reef recovery after bleaching",
            "medieval trade routes of the baltic",
            "soil carbon under crop rotation",
        ];
        for (i, text) in unrelated.iter().enumerate() {
            raw.push(work(
                2000 + i,
                &format!("Unrelated study {i}"),
                text,
                &[("Dorothy Hodgkin", "University of Cambridge")],
            ));
        }

        Self { raw }
    }

    /// Custom works
    #[allow(dead_code)]
    pub fn with_works(raw: Vec<Value>) -> Self {
        Self { raw }
    }

    /// Normalized works, as the loader would return them
    #[allow(dead_code)]
    pub fn works(&self) -> Vec<Value> {
        self.raw
            .iter()
            .cloned()
            .filter_map(openalex::normalize_work)
            .collect()
    }

    /// Write the raw works as JSON lines
    ///
    /// # Returns
    /// TempDir holding the file (keep alive during test) and the file path
    #[allow(dead_code)]
    pub fn write_jsonl(&self) -> (TempDir, PathBuf) {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let path = dir.path().join("works.jsonl");
        let lines: Vec<String> = self
            .raw
            .iter()
            .map(|w| serde_json::to_string(w).expect("Failed to serialize work"))
            .collect();
        std::fs::write(&path, lines.join("\n")).expect("Failed to write works");
        (dir, path)
    }
}

/// Build one OpenAlex work
#[allow(dead_code)]
pub fn work(number: usize, title: &str, abstract_text: &str, authors: &[(&str, &str)]) -> Value {
    let authorships: Vec<Value> = authors
        .iter()
        .map(|(author, institution)| {
            json!({
                "author": { "display_name": author },
                "institutions": [{ "display_name": institution }]
            })
        })
        .collect();

    json!({
        "id": format!("https://openalex.org/W{number}"),
        "display_name": title,
        "publication_date": format!("20{:02}-0{}-1{}", number % 24, 1 + number % 9, number % 10),
        "ids": { "doi": format!("https://doi.org/10.1234/w{number}") },
        "authorships": authorships,
        "abstract": abstract_text
    })
}

fn inverted_index(text: &str) -> Value {
    let mut index = serde_json::Map::new();
    for (position, word) in text.split_whitespace().enumerate() {
        let positions = index
            .entry(word.to_string())
            .or_insert_with(|| Value::Array(Vec::new()));
        if let Value::Array(list) = positions {
            list.push(json!(position));
        }
    }
    Value::Object(index)
}
