use crate::utils::Result;
use std::collections::BTreeMap;

/// Tally of base calls observed for one family member at one genomic site.
///
/// Counts are keyed by the raw single-character base symbol, so gap calls
/// (`-`) and other non-allele symbols are carried through to likelihood
/// scoring unchanged. The ordered map keeps iteration (and therefore
/// floating-point accumulation) order stable across runs.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ReadSummary {
    counts: BTreeMap<char, u32>,
}

impl ReadSummary {
    pub fn new(counts: BTreeMap<char, u32>) -> ReadSummary {
        ReadSummary { counts }
    }

    /// Parses a counts field of the form `C:58,T:2`.
    pub fn from_field(field: &str) -> Result<ReadSummary> {
        let mut counts = BTreeMap::new();
        for encoding in field.split(',') {
            let (symbol, count) = decode_count(encoding)?;
            if counts.insert(symbol, count).is_some() {
                return Err(format!(
                    "Duplicate base '{}' in counts field: '{}'",
                    symbol, field
                ));
            }
        }
        Ok(ReadSummary { counts })
    }

    pub fn counts(&self) -> impl Iterator<Item = (char, u32)> + '_ {
        self.counts.iter().map(|(&base, &count)| (base, count))
    }
}

fn decode_count(encoding: &str) -> Result<(char, u32)> {
    let error_message = || format!("Count must be in 'BASE:COUNT' format: '{}'", encoding);
    let parts: Vec<&str> = encoding.splitn(2, ':').collect();
    let (symbol, count) = match &parts[..] {
        [symbol, count] => (*symbol, *count),
        _ => return Err(error_message()),
    };
    let mut symbols = symbol.chars();
    let base = match (symbols.next(), symbols.next()) {
        (Some(base), None) => base,
        _ => return Err(error_message()),
    };
    let count: u32 = count.parse().map_err(|_| error_message())?;
    Ok((base, count))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_counts_field() {
        let summary = ReadSummary::from_field("C:58,T:2").unwrap();
        let counts: Vec<(char, u32)> = summary.counts().collect();
        assert_eq!(counts, vec![('C', 58), ('T', 2)]);
    }

    #[test]
    fn test_parse_gap_symbol() {
        let summary = ReadSummary::from_field("-:5,C:225").unwrap();
        let counts: Vec<(char, u32)> = summary.counts().collect();
        assert_eq!(counts, vec![('-', 5), ('C', 225)]);
    }

    #[test]
    fn test_reject_duplicate_base() {
        assert!(ReadSummary::from_field("C:58,C:2").is_err());
    }

    #[test]
    fn test_reject_malformed_fields() {
        assert!(ReadSummary::from_field("C58").is_err());
        assert!(ReadSummary::from_field("CT:58").is_err());
        assert!(ReadSummary::from_field(":58").is_err());
        assert!(ReadSummary::from_field("C:").is_err());
        assert!(ReadSummary::from_field("C:-2").is_err());
        assert!(ReadSummary::from_field("").is_err());
    }
}
