//! Loading input vectors from text.
//!
//! One vector per line. Components are separated by commas, whitespace, or
//! both. Blank lines and lines starting with `#` are skipped. Vector lengths
//! are not checked here; [`KohonenMap::configure`](crate::KohonenMap::configure)
//! does that.

use crate::error::{KohonenError, Result};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Parses vectors from any buffered reader.
pub fn read_vectors<R: BufRead>(reader: R) -> Result<Vec<Vec<f64>>> {
    let mut vectors = Vec::new();

    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let values = trimmed
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|field| !field.is_empty())
            .map(|field| {
                field.parse::<f64>().map_err(|e| KohonenError::Parse {
                    line: idx + 1,
                    message: format!("invalid number {:?}: {}", field, e),
                })
            })
            .collect::<Result<Vec<f64>>>()?;

        if values.is_empty() {
            return Err(KohonenError::Parse {
                line: idx + 1,
                message: "no values".to_string(),
            });
        }
        vectors.push(values);
    }

    Ok(vectors)
}

/// Parses vectors from a file.
pub fn load_vectors<P: AsRef<Path>>(path: P) -> Result<Vec<Vec<f64>>> {
    let file = File::open(path.as_ref())?;
    read_vectors(BufReader::new(file))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mixed_separators() {
        let text = "0.1, 0.2 0.3\n\n# comment\n  1,2,3  \n4\t5\t6\n";
        let vectors = read_vectors(text.as_bytes()).unwrap();
        assert_eq!(
            vectors,
            vec![vec![0.1, 0.2, 0.3], vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]]
        );
    }

    #[test]
    fn test_ragged_rows_are_kept() {
        let vectors = read_vectors("1 2\n3\n".as_bytes()).unwrap();
        assert_eq!(vectors[1], vec![3.0]);
    }

    #[test]
    fn test_bad_number_reports_line() {
        let err = read_vectors("1 2\n# skip\n3 x\n".as_bytes()).unwrap_err();
        match err {
            KohonenError::Parse { line, message } => {
                assert_eq!(line, 3);
                assert!(message.contains("\"x\""));
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_separator_only_line() {
        let err = read_vectors(" , ,\n".as_bytes()).unwrap_err();
        assert!(matches!(err, KohonenError::Parse { line: 1, .. }));
    }

    #[test]
    fn test_empty_text() {
        assert!(read_vectors("".as_bytes()).unwrap().is_empty());
    }
}
