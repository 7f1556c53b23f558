//! Run Length Encoded `.rle` decoder. See <https://conwaylife.com/wiki/Run_Length_Encoded>.

use crate::error::PatternError;
use crate::grid::Position;
use crate::rules::GameRules;
use std::str::{Chars, Lines};

/// The `x = W, y = H, rule = R` line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub width: u32,
    pub height: u32,
    /// `None` when the line has no rule field, which the format defines as B3/S23.
    pub rule: Option<String>,
}

impl Header {
    pub fn parse(line: &str) -> Result<Self, PatternError> {
        // The rule goes last and may itself contain commas (`B3/S23:T20,10`).
        let (dimensions, rule) = match line.find("rule") {
            Some(start) => {
                let value = line[start..].split_once('=').map(|(_, value)| value.trim());
                match value {
                    Some(value) => (&line[..start], Some(value.to_string())),
                    None => {
                        return Err(PatternError::InvalidHeader {
                            field: "rule",
                            value: line[start..].to_string(),
                        })
                    }
                }
            }
            None => (line, None),
        };

        let mut width = None;
        let mut height = None;
        for field in dimensions.split(',').map(str::trim).filter(|f| !f.is_empty()) {
            let Some((key, value)) = field.split_once('=') else {
                return Err(PatternError::InvalidHeader {
                    field: "header",
                    value: field.to_string(),
                });
            };
            let (slot, name) = match key.trim() {
                "x" => (&mut width, "x"),
                "y" => (&mut height, "y"),
                _ => continue,
            };
            let value = value.trim();
            *slot = Some(value.parse::<u32>().map_err(|_| PatternError::InvalidHeader {
                field: name,
                value: value.to_string(),
            })?);
        }

        let missing = |field| PatternError::InvalidHeader {
            field,
            value: String::new(),
        };
        Ok(Self {
            width: width.ok_or_else(|| missing("x"))?,
            height: height.ok_or_else(|| missing("y"))?,
            rule,
        })
    }

    /// Whether `run` cells starting at `(column, row)` fit the declared size.
    fn contains_run(&self, column: i32, row: i32, run: u32) -> bool {
        let (Ok(column), Ok(row)) = (u64::try_from(column), u32::try_from(row)) else {
            return false;
        };
        row < self.height && column + u64::from(run) <= u64::from(self.width)
    }

    /// Whether the pattern is meant for Conway's Life.
    pub fn is_conway(&self) -> bool {
        self.rule
            .as_deref()
            .map_or(true, |rule| GameRules::conway().matches_notation(rule))
    }
}

fn is_body(line: &&str) -> bool {
    !line.starts_with('#')
}

/// Lazily yields alive offsets from an RLE body.
///
/// A pattern for a foreign rule decodes to nothing. Check
/// [`Decoder::header`] to tell it apart from an empty pattern.
pub struct Decoder<'a> {
    header: Header,
    lines: std::iter::Filter<Lines<'a>, fn(&&str) -> bool>,
    line: Chars<'a>,
    column: i32,
    row: i32,
    run: Option<u32>,
    // Alive cells of the current `o` run not yet yielded.
    pending: u32,
    done: bool,
}

/// Reads the header and prepares decoding of the body.
pub fn decode(text: &str) -> Result<Decoder<'_>, PatternError> {
    let mut lines = text.lines().filter(is_body as fn(&&str) -> bool);
    let header = lines
        .by_ref()
        .find(|line| !line.trim().is_empty())
        .ok_or(PatternError::MissingHeader)
        .and_then(Header::parse)?;
    let done = !header.is_conway();

    Ok(Decoder {
        header,
        lines,
        line: "".chars(),
        column: 0,
        row: 0,
        run: None,
        pending: 0,
        done,
    })
}

impl Decoder<'_> {
    pub fn header(&self) -> &Header {
        &self.header
    }

    fn next_char(&mut self) -> Option<char> {
        loop {
            if let Some(ch) = self.line.next() {
                return Some(ch);
            }
            self.line = self.lines.next()?.chars();
        }
    }

    fn take_run(&mut self) -> u32 {
        self.run.take().unwrap_or(1)
    }

    fn fail(&mut self, error: PatternError) -> Option<Result<Position, PatternError>> {
        self.done = true;
        Some(Err(error))
    }
}

fn advance(cursor: i32, by: u32) -> Option<i32> {
    i32::try_from(by).ok().and_then(|by| cursor.checked_add(by))
}

impl Iterator for Decoder<'_> {
    type Item = Result<Position, PatternError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.pending > 0 {
                self.pending -= 1;
                let position = (self.column, self.row);
                self.column += 1;
                return Some(Ok(position));
            }
            if self.done {
                return None;
            }

            let Some(ch) = self.next_char() else {
                self.done = true;
                return None;
            };
            let row = self.row;
            match ch {
                '0'..='9' => {
                    let digit = ch as u32 - '0' as u32;
                    match self.run.unwrap_or(0).checked_mul(10).and_then(|r| r.checked_add(digit)) {
                        Some(run) => self.run = Some(run),
                        None => return self.fail(PatternError::RunCountOverflow { row }),
                    }
                }
                'o' => {
                    let run = self.take_run();
                    if advance(self.column, run).is_none() {
                        return self.fail(PatternError::RunCountOverflow { row });
                    }
                    if run > 0 && !self.header.contains_run(self.column, self.row, run) {
                        let Header { width, height, .. } = self.header;
                        return self.fail(PatternError::OutOfBounds { row, width, height });
                    }
                    self.pending = run;
                }
                '$' => {
                    let run = self.take_run();
                    match advance(self.row, run) {
                        Some(next) => self.row = next,
                        None => return self.fail(PatternError::RunCountOverflow { row }),
                    }
                    self.column = 0;
                }
                '!' => self.done = true,
                // `b` and the letters of multi-state rules are all dead here.
                ch if ch.is_ascii_alphabetic() => {
                    let run = self.take_run();
                    match advance(self.column, run) {
                        Some(next) => self.column = next,
                        None => return self.fail(PatternError::RunCountOverflow { row }),
                    }
                }
                ch if ch.is_whitespace() => {}
                ch => return self.fail(PatternError::UnexpectedChar { ch, row }),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offsets(text: &str) -> Result<Vec<Position>, PatternError> {
        decode(text)?.collect()
    }

    #[test]
    fn dead_alive_and_row_end() {
        let text = "#N example\nx = 2, y = 2, rule = B3/S23\nbo$2o!\n";
        assert_eq!(offsets(text).unwrap(), vec![(1, 0), (0, 1), (1, 1)]);
    }

    #[test]
    fn glider_across_lines() {
        let text = "#C glider\nx = 3, y = 3, rule = b3/s23\nbob$2b\no$3o!";
        assert_eq!(
            offsets(text).unwrap(),
            vec![(1, 0), (2, 1), (0, 2), (1, 2), (2, 2)]
        );
    }

    #[test]
    fn multi_row_skip() {
        let text = "x = 1, y = 4\no3$o!";
        assert_eq!(offsets(text).unwrap(), vec![(0, 0), (0, 3)]);
    }

    #[test]
    fn multi_digit_runs() {
        let text = "x = 12, y = 1, rule = B3/S23\n10bo!";
        assert_eq!(offsets(text).unwrap(), vec![(10, 0)]);
        let text = "x = 12, y = 1, rule = B3/S23\n12o!";
        assert_eq!(offsets(text).unwrap().len(), 12);
    }

    #[test]
    fn terminator_stops_decoding() {
        let text = "x = 2, y = 1, rule = B3/S23\no!o\n";
        assert_eq!(offsets(text).unwrap(), vec![(0, 0)]);
    }

    #[test]
    fn foreign_rule_is_empty() {
        let decoder = decode("x = 3, y = 1, rule = B36/S23\n3o!").unwrap();
        assert!(!decoder.header().is_conway());
        assert_eq!(decoder.count(), 0);
    }

    #[test]
    fn header_fields() {
        let header = Header::parse("x = 36, y = 9, rule = B3/S23").unwrap();
        assert_eq!(
            header,
            Header {
                width: 36,
                height: 9,
                rule: Some("B3/S23".to_string())
            }
        );
        let bounded = Header::parse("x=4,y=2,rule=B3/S23:T20,10").unwrap();
        assert_eq!(bounded.rule.as_deref(), Some("B3/S23:T20,10"));
        assert!(Header::parse("x = 4, y = 2").unwrap().is_conway());
    }

    #[test]
    fn malformed_header() {
        assert!(matches!(
            Header::parse("x = four, y = 2"),
            Err(PatternError::InvalidHeader { field: "x", .. })
        ));
        assert!(matches!(
            Header::parse("x = 4"),
            Err(PatternError::InvalidHeader { field: "y", .. })
        ));
        assert!(matches!(decode("#C nothing else\n"), Err(PatternError::MissingHeader)));
    }

    #[test]
    fn malformed_body() {
        assert!(matches!(
            offsets("x = 1, y = 1\no$?o!"),
            Err(PatternError::UnexpectedChar { ch: '?', row: 1 })
        ));
        assert!(matches!(
            offsets("x = 1, y = 1\n99999999999o!"),
            Err(PatternError::RunCountOverflow { row: 0 })
        ));
    }

    #[test]
    fn body_must_fit_the_header() {
        assert!(matches!(
            offsets("x = 1, y = 1, rule = B3/S23\n50000000o!"),
            Err(PatternError::OutOfBounds { row: 0, width: 1, height: 1 })
        ));
        assert!(matches!(
            offsets("x = 2, y = 1\no$o!"),
            Err(PatternError::OutOfBounds { row: 1, .. })
        ));
        // Dead cells past the edge are harmless.
        assert_eq!(offsets("x = 1, y = 1\no5b$!").unwrap(), vec![(0, 0)]);
    }
}
