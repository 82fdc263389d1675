use crate::domain::model::Player;
use crate::utils::error::{EtlError, Result};
use csv::{ReaderBuilder, StringRecord, Trim};

/// Turns raw CSV bytes into players.
///
/// With headers, columns are matched by name (`Age`, `Name`, ...) and unknown
/// columns are ignored. Without headers only the age column is read.
#[derive(Debug, Clone)]
pub struct CsvPlayerSource {
    has_headers: bool,
    delimiter: u8,
    age_column: usize,
}

impl Default for CsvPlayerSource {
    fn default() -> Self {
        Self {
            has_headers: true,
            delimiter: b',',
            age_column: 0,
        }
    }
}

impl CsvPlayerSource {
    pub fn new(has_headers: bool, delimiter: u8, age_column: usize) -> Self {
        Self {
            has_headers,
            delimiter,
            age_column,
        }
    }

    pub fn parse(&self, data: &[u8]) -> Result<Vec<Player>> {
        let mut reader = ReaderBuilder::new()
            .has_headers(self.has_headers)
            .delimiter(self.delimiter)
            .trim(Trim::All)
            .from_reader(data);

        let players = if self.has_headers {
            reader
                .deserialize::<Player>()
                .collect::<std::result::Result<Vec<_>, csv::Error>>()?
        } else {
            let mut players = Vec::new();
            for row in reader.records() {
                players.push(self.player_from_row(&row?)?);
            }
            players
        };

        tracing::debug!("Parsed {} player records", players.len());
        Ok(players)
    }

    fn player_from_row(&self, row: &StringRecord) -> Result<Player> {
        let line = row.position().map(|p| p.line()).unwrap_or_default();
        let raw = row
            .get(self.age_column)
            .ok_or_else(|| EtlError::ProcessingError {
                message: format!("line {}: no column {} for age", line, self.age_column),
            })?;
        let age = raw.parse::<i64>().map_err(|e| EtlError::ProcessingError {
            message: format!("line {}: invalid age '{}': {}", line, raw, e),
        })?;
        Ok(Player::with_age(age))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_dataset_with_extra_columns() {
        let data = "ID,Name,Age,Photo,Nationality,Flag,Overall,Potential,Club\n\
                    1,A. Player,19,a.png,Spain,es.png,70,80,Club A\n\
                    2,B. Player, 33 ,b.png,Brazil,br.png,81,81,Club B\n";

        let players = CsvPlayerSource::default().parse(data.as_bytes()).unwrap();

        assert_eq!(players.len(), 2);
        assert_eq!(players[0].age, 19);
        assert_eq!(players[0].name, "A. Player");
        assert_eq!(players[1].age, 33);
        assert_eq!(players[1].potential, Some(81));
    }

    #[test]
    fn test_unparseable_age_is_fatal() {
        let data = "Name,Age\nA,twenty\n";
        let err = CsvPlayerSource::default().parse(data.as_bytes()).unwrap_err();
        assert!(matches!(err, EtlError::CsvError(_)));
    }

    #[test]
    fn test_missing_age_column_is_fatal() {
        let data = "Name,Club\nA,B\n";
        assert!(CsvPlayerSource::default().parse(data.as_bytes()).is_err());
    }

    #[test]
    fn test_headerless_semicolon_file() {
        let data = "x;21\ny;-4\n";
        let source = CsvPlayerSource::new(false, b';', 1);
        let players = source.parse(data.as_bytes()).unwrap();

        let ages: Vec<i64> = players.iter().map(|p| p.age).collect();
        assert_eq!(ages, vec![21, -4]);
    }

    #[test]
    fn test_headerless_bad_age_reports_line() {
        let data = "21\nold\n";
        let err = CsvPlayerSource::new(false, b',', 0)
            .parse(data.as_bytes())
            .unwrap_err();
        assert!(matches!(err, EtlError::ProcessingError { .. }));
        assert!(err.to_string().contains("line 2"), "{}", err);
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn test_headerless_missing_column_is_processing_error() {
        let err = CsvPlayerSource::new(false, b',', 3)
            .parse("a,21
".as_bytes())
            .unwrap_err();
        assert!(matches!(err, EtlError::ProcessingError { .. }));
        assert!(err.to_string().contains("no column 3"), "{}", err);
    }

    #[test]
    fn test_header_bad_age_is_csv_error() {
        let err = CsvPlayerSource::default()
            .parse("ID,Name,Age
1,A,old
".as_bytes())
            .unwrap_err();
        assert!(matches!(err, EtlError::CsvError(_)));
    }

    #[test]
    fn test_header_only_file_is_empty() {
        let players = CsvPlayerSource::default().parse(b"ID,Name,Age\n").unwrap();
        assert!(players.is_empty());
    }
}
