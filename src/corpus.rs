//! Bag-of-words corpus loading.
//!
//! Documents are term-count vectors over a fixed vocabulary. The on-disk
//! format is the UCI "bag of words" layout:
//!
//! ```text
//! D
//! W
//! NNZ
//! docID wordID count
//! docID wordID count
//! ...
//! ```
//!
//! IDs are 1-indexed on disk and 0-indexed everywhere in this crate. The
//! vocabulary lives in a separate file with one term per line, line `w`
//! naming term `w - 1`.
//!
//! Rows are stored sparsely as `(term, count)` pairs sorted by term, which
//! keeps cosine dot products proportional to the number of nonzeros rather
//! than to the vocabulary size.

use crate::error::{Error, Result};
use std::fs;
use std::io::{BufRead, Read};
use std::path::Path;

/// An immutable document × term count matrix with an optional vocabulary.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentCollection {
    /// Sparse rows: `(term, count)` sorted by term, counts nonzero.
    rows: Vec<Vec<(usize, u32)>>,
    /// Vocabulary size W.
    n_terms: usize,
    /// Term strings, `vocabulary[w]` names term `w`.
    vocabulary: Option<Vec<String>>,
}

impl DocumentCollection {
    /// Build from 0-indexed `(doc, term, count)` triples.
    ///
    /// Zero counts are skipped. A repeated `(doc, term)` keeps the last count.
    pub fn from_triples<I>(n_docs: usize, n_terms: usize, triples: I) -> Result<Self>
    where
        I: IntoIterator<Item = (usize, usize, u32)>,
    {
        let mut rows: Vec<Vec<(usize, u32)>> = vec![Vec::new(); n_docs];
        for (doc, term, count) in triples {
            if doc >= n_docs {
                return Err(Error::DimensionMismatch {
                    expected: n_docs,
                    found: doc + 1,
                });
            }
            if term >= n_terms {
                return Err(Error::DimensionMismatch {
                    expected: n_terms,
                    found: term + 1,
                });
            }
            rows[doc].push((term, count));
        }
        for row in &mut rows {
            normalize_row(row);
        }
        Ok(Self {
            rows,
            n_terms,
            vocabulary: None,
        })
    }

    /// Build from a dense `counts[doc][term]` matrix.
    pub fn from_dense(counts: &[Vec<u32>]) -> Result<Self> {
        let first = counts.first().ok_or(Error::EmptyInput)?;
        let n_terms = first.len();
        if let Some(row) = counts.iter().find(|row| row.len() != n_terms) {
            return Err(Error::DimensionMismatch {
                expected: n_terms,
                found: row.len(),
            });
        }
        let triples = counts.iter().enumerate().flat_map(|(doc, row)| {
            row.iter()
                .enumerate()
                .map(move |(term, &count)| (doc, term, count))
        });
        Self::from_triples(counts.len(), n_terms, triples)
    }

    /// Parse the `docword` text format.
    pub fn parse(text: &str) -> Result<Self> {
        let mut tokens = text
            .lines()
            .enumerate()
            .flat_map(|(i, line)| line.split_whitespace().map(move |tok| (i + 1, tok)));

        let mut header = [0usize; 3];
        let mut header_line = 1;
        let names = ["document count", "vocabulary size", "nonzero count"];
        for (slot, name) in header.iter_mut().zip(names) {
            let (line, tok) = tokens.next().ok_or_else(|| Error::Parse {
                line: header_line,
                message: format!("missing {name} in header"),
            })?;
            *slot = parse_int(line, tok)?;
            header_line = line;
        }
        let [n_docs, n_terms, nnz] = header;

        // Every document costs a row, so D is bounded by the input size.
        if n_docs > text.len() {
            return Err(Error::Parse {
                line: 1,
                message: format!(
                    "document count {n_docs} exceeds what a {}-byte input can hold",
                    text.len()
                ),
            });
        }

        // NNZ is only a hint; a triple takes at least six bytes.
        let mut triples = Vec::with_capacity(nnz.min(text.len() / 6));
        while let Some((line, tok)) = tokens.next() {
            let doc = parse_id(line, tok, n_docs, "docID")?;
            let (line, tok) = tokens.next().ok_or_else(|| truncated(line))?;
            let term = parse_id(line, tok, n_terms, "wordID")?;
            let (line, tok) = tokens.next().ok_or_else(|| truncated(line))?;
            let count = tok.parse::<u32>().map_err(|e| Error::Parse {
                line,
                message: format!("invalid count '{tok}': {e}"),
            })?;
            triples.push((doc, term, count));
        }

        if triples.len() != nnz {
            log::warn!(
                "docword header declares {} nonzero entries, found {}",
                nnz,
                triples.len()
            );
        }

        let collection = Self::from_triples(n_docs, n_terms, triples)?;
        log::info!(
            "loaded corpus: {} documents, {} terms, {} nonzeros",
            collection.n_docs(),
            collection.n_terms(),
            collection.nnz()
        );
        Ok(collection)
    }

    /// Read and parse a `docword` stream.
    pub fn from_reader<R: BufRead>(mut reader: R) -> Result<Self> {
        let mut text = String::new();
        let _ = reader.read_to_string(&mut text)?;
        Self::parse(&text)
    }

    /// Read and parse a `docword` file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let text = fs::read_to_string(path.as_ref())
            .map_err(|e| Error::Io(format!("{}: {e}", path.as_ref().display())))?;
        Self::parse(&text)
    }

    /// Attach a vocabulary. It may not name more terms than the matrix has.
    pub fn with_vocabulary(mut self, vocabulary: Vec<String>) -> Result<Self> {
        if vocabulary.len() > self.n_terms {
            return Err(Error::Parse {
                line: self.n_terms + 1,
                message: format!(
                    "vocabulary has {} terms, corpus declares {}",
                    vocabulary.len(),
                    self.n_terms
                ),
            });
        }
        if vocabulary.len() < self.n_terms {
            log::warn!(
                "vocabulary names {} of {} terms",
                vocabulary.len(),
                self.n_terms
            );
        }
        self.vocabulary = Some(vocabulary);
        Ok(self)
    }

    /// Read a vocabulary file, one term per line.
    pub fn read_vocabulary(path: impl AsRef<Path>) -> Result<Vec<String>> {
        let text = fs::read_to_string(path.as_ref())
            .map_err(|e| Error::Io(format!("{}: {e}", path.as_ref().display())))?;
        Ok(text.lines().map(|l| l.trim().to_string()).collect())
    }

    /// Number of documents D.
    pub fn n_docs(&self) -> usize {
        self.rows.len()
    }

    /// Vocabulary size W.
    pub fn n_terms(&self) -> usize {
        self.n_terms
    }

    /// Number of stored nonzero counts.
    pub fn nnz(&self) -> usize {
        self.rows.iter().map(Vec::len).sum()
    }

    /// Count of `term` in `doc`; zero when absent.
    ///
    /// # Panics
    ///
    /// Panics if `doc` is out of range.
    pub fn count(&self, doc: usize, term: usize) -> u32 {
        let row = &self.rows[doc];
        row.binary_search_by_key(&term, |&(t, _)| t)
            .map(|i| row[i].1)
            .unwrap_or(0)
    }

    /// Sparse row of `doc`, sorted by term.
    pub fn row(&self, doc: usize) -> &[(usize, u32)] {
        &self.rows[doc]
    }

    /// Whether `doc` has no nonzero counts.
    pub fn is_empty_document(&self, doc: usize) -> bool {
        self.rows[doc].is_empty()
    }

    /// Attached vocabulary, if any.
    pub fn vocabulary(&self) -> Option<&[String]> {
        self.vocabulary.as_deref()
    }

    /// Term string for `term`, if a vocabulary is attached and names it.
    pub fn term(&self, term: usize) -> Option<&str> {
        self.vocabulary
            .as_ref()
            .and_then(|v| v.get(term))
            .map(String::as_str)
    }

    /// Drop documents whose term vector is all zero.
    ///
    /// Returns the filtered collection and, for each kept document, its
    /// index in `self`.
    pub fn without_empty_documents(&self) -> (Self, Vec<usize>) {
        let kept: Vec<usize> = (0..self.n_docs())
            .filter(|&d| !self.is_empty_document(d))
            .collect();
        if kept.len() < self.n_docs() {
            log::warn!("dropping {} empty documents", self.n_docs() - kept.len());
        }
        let filtered = Self {
            rows: kept.iter().map(|&d| self.rows[d].clone()).collect(),
            n_terms: self.n_terms,
            vocabulary: self.vocabulary.clone(),
        };
        (filtered, kept)
    }
}

/// Sort by term, keep the last count of a repeated term, drop zeros.
fn normalize_row(row: &mut Vec<(usize, u32)>) {
    row.sort_by_key(|&(term, _)| term);
    row.dedup_by(|later, earlier| {
        if later.0 == earlier.0 {
            earlier.1 = later.1;
            true
        } else {
            false
        }
    });
    row.retain(|&(_, count)| count > 0);
}

fn parse_int(line: usize, tok: &str) -> Result<usize> {
    tok.parse::<usize>().map_err(|e| Error::Parse {
        line,
        message: format!("invalid integer '{tok}': {e}"),
    })
}

fn parse_id(line: usize, tok: &str, bound: usize, what: &str) -> Result<usize> {
    let id = parse_int(line, tok)?;
    if id == 0 || id > bound {
        return Err(Error::Parse {
            line,
            message: format!("{what} {id} outside 1..={bound}"),
        });
    }
    Ok(id - 1)
}

fn truncated(line: usize) -> Error {
    Error::Parse {
        line,
        message: "truncated (docID, wordID, count) triple".to_string(),
    }
}
