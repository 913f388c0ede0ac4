use crate::error::SessionError;
use include_dir::{include_dir, Dir};
use itertools::Itertools;
use rand::seq::SliceRandom;
use serde::Deserialize;

static PASSAGE_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/src/passages");

/// Number of leading words kept in a score preview
pub const PREVIEW_WORDS: usize = 4;

/// An immutable, tokenized literature excerpt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Passage {
    words: Vec<String>,
}

impl Passage {
    /// Tokenize `source` on whitespace, dropping empty tokens.
    pub fn parse(source: &str) -> Result<Self, SessionError> {
        let words: Vec<String> = source.split_whitespace().map(str::to_owned).collect();

        if words.is_empty() {
            return Err(SessionError::InvalidPassage);
        }

        Ok(Self { words })
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    pub fn word(&self, idx: usize) -> Option<&str> {
        self.words.get(idx).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Words joined by single spaces
    pub fn text(&self) -> String {
        self.words.join(" ")
    }

    /// First few words followed by an ellipsis, whatever the passage length.
    pub fn preview(&self) -> String {
        format!("{}...", self.words.iter().take(PREVIEW_WORDS).join(" "))
    }
}

/// Supplies source text for new sessions
pub trait PassageProvider {
    fn next_passage(&mut self) -> String;
}

/// Always hands out the same text (custom prompt)
#[derive(Debug, Clone)]
pub struct FixedPassage(pub String);

impl PassageProvider for FixedPassage {
    fn next_passage(&mut self) -> String {
        self.0.clone()
    }
}

#[derive(Deserialize, Clone, Debug)]
struct CorpusFile {
    #[allow(dead_code)]
    name: String,
    passages: Vec<String>,
}

/// Built-in literature excerpts plus any user supplied passages
#[derive(Debug, Clone)]
pub struct LiteratureCorpus {
    passages: Vec<String>,
}

impl LiteratureCorpus {
    pub fn builtin() -> Self {
        Self {
            passages: read_corpus("literature.json"),
        }
    }

    /// Builtin corpus extended with `extra`; blank entries are skipped.
    pub fn with_extra<I>(extra: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let mut corpus = Self::builtin();
        corpus
            .passages
            .extend(extra.into_iter().filter(|p| !p.trim().is_empty()));
        corpus
    }

    pub fn passages(&self) -> &[String] {
        &self.passages
    }
}

impl PassageProvider for LiteratureCorpus {
    fn next_passage(&mut self) -> String {
        self.passages
            .choose(&mut rand::thread_rng())
            .cloned()
            .unwrap_or_default()
    }
}

fn read_corpus(file_name: &str) -> Vec<String> {
    let Some(contents) = PASSAGE_DIR
        .get_file(file_name)
        .and_then(|file| file.contents_utf8())
    else {
        tracing::error!("passage corpus {file_name} is missing");
        return Vec::new();
    };

    match serde_json::from_str::<CorpusFile>(contents) {
        Ok(corpus) => corpus.passages,
        Err(e) => {
            tracing::error!("unable to deserialize passage corpus {file_name}: {e}");
            Vec::new()
        }
    }
}
