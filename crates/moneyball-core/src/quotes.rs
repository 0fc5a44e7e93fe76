// Baseball quotes for the home page (quotes.csv, pipe-delimited).

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum QuoteError {
    #[error("failed to read file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv { path: String, source: csv::Error },

    #[error("no quotes in {path}")]
    Empty { path: String },
}

/// A quote with its author and a link to the author's page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub quote: String,
    pub author: String,
    pub link: String,
}

#[derive(Debug, Clone)]
pub struct QuoteBook {
    quotes: Vec<Quote>,
}

impl QuoteBook {
    pub fn load(path: &Path) -> Result<Self, QuoteError> {
        let path_str = path.display().to_string();
        let file = std::fs::File::open(path).map_err(|e| QuoteError::Io {
            path: path_str.clone(),
            source: e,
        })?;
        let quotes = parse_quotes(file).map_err(|e| QuoteError::Csv {
            path: path_str.clone(),
            source: e,
        })?;
        if quotes.is_empty() {
            return Err(QuoteError::Empty { path: path_str });
        }
        Ok(Self { quotes })
    }

    pub fn len(&self) -> usize {
        self.quotes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quotes.is_empty()
    }

    /// Uniformly random quote. `load` guarantees the book is non-empty.
    pub fn random_with<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&Quote> {
        self.quotes.choose(rng)
    }

    pub fn random(&self) -> Option<&Quote> {
        self.random_with(&mut rand::thread_rng())
    }
}

fn parse_quotes<R: Read>(rdr: R) -> Result<Vec<Quote>, csv::Error> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'|')
        .trim(csv::Trim::All)
        .from_reader(rdr);
    reader.deserialize::<Quote>().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const CSV: &str = "quote|author|link\n\
                       It ain't over till it's over.|Yogi Berra|https://en.wikipedia.org/wiki/Yogi_Berra\n\
                       Baseball is ninety percent mental. The other half is physical.|Yogi Berra|https://en.wikipedia.org/wiki/Yogi_Berra\n\
                       There's no crying in baseball!|Jimmy Dugan|https://en.wikipedia.org/wiki/A_League_of_Their_Own\n";

    #[test]
    fn parses_pipe_delimited_quotes_with_commas() {
        let quotes = parse_quotes(CSV.as_bytes()).unwrap();
        assert_eq!(quotes.len(), 3);
        assert_eq!(quotes[0].author, "Yogi Berra");
        assert!(quotes[1].quote.contains("mental. The other"));
    }

    #[test]
    fn random_picks_from_the_book() {
        let book = QuoteBook {
            quotes: parse_quotes(CSV.as_bytes()).unwrap(),
        };
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..20 {
            let q = book.random_with(&mut rng).unwrap();
            assert!(book.quotes.contains(q));
        }
    }

    #[test]
    fn load_rejects_header_only_file() {
        let path = std::env::temp_dir().join("mb_quotes_empty.csv");
        std::fs::write(&path, "quote|author|link\n").unwrap();
        let err = QuoteBook::load(&path).unwrap_err();
        assert!(matches!(err, QuoteError::Empty { .. }));
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let path = std::env::temp_dir().join("mb_quotes_missing.csv");
        let _ = std::fs::remove_file(&path);
        assert!(matches!(QuoteBook::load(&path), Err(QuoteError::Io { .. })));
    }
}
