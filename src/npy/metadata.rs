//! Parser for the Python dictionary literal stored in an `.npy` header, e.g.
//!
//! ```text
//! {'descr': '<f8', 'fortran_order': False, 'shape': (1, 2), }
//! ```
//!
//! Only the subset of Python literal syntax NumPy emits is understood:
//!
//! ```text
//! dict    := '{' [ entry ( ',' entry )* [ ',' ] ] '}'
//! entry   := string ':' value
//! value   := string | 'True' | 'False' | tuple | integer
//! tuple   := '(' [ integer ( ',' integer )* [ ',' ] ] ')'
//! string  := "'" [^']* "'" | '"' [^"]* '"'
//! integer := [0-9]+ [ 'L' ]
//! ```
//!
//! Whitespace is allowed between any two tokens. Note that `(5)` is read as
//! the one-element tuple `(5,)`.

use std::fmt;
use thiserror::Error;

/// A value in the header dictionary.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Value {
    String(String),
    Boolean(bool),
    Integer(usize),
    Tuple(Vec<usize>),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::String(s) => write!(f, "'{s}'"),
            Self::Boolean(true) => write!(f, "True"),
            Self::Boolean(false) => write!(f, "False"),
            Self::Integer(n) => write!(f, "{n}"),
            Self::Tuple(items) => match items.as_slice() {
                [item] => write!(f, "({item},)"),
                items => {
                    write!(f, "(")?;
                    for (i, item) in items.iter().enumerate() {
                        if i > 0 {
                            write!(f, ", ")?;
                        }
                        write!(f, "{item}")?;
                    }
                    write!(f, ")")
                }
            },
        }
    }
}

/// A syntax error in the header dictionary.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ParseDictError {
    /// The text ended in the middle of the dictionary.
    #[error("unexpected end of input, expected {expected}")]
    UnexpectedEnd {
        /// What the parser was looking for.
        expected: &'static str,
    },
    /// A character that does not fit the grammar.
    #[error("unexpected {found:?} at offset {offset}, expected {expected}")]
    UnexpectedChar {
        /// The offending character.
        found: char,
        /// Byte offset of `found` in the header text.
        offset: usize,
        /// What the parser was looking for.
        expected: &'static str,
    },
    /// An integer literal too large for `usize`.
    #[error("integer at offset {offset} does not fit in `usize`")]
    IntegerOverflow {
        /// Byte offset of the first digit.
        offset: usize,
    },
    /// Non-whitespace text after the closing brace.
    #[error("trailing characters at offset {offset}")]
    TrailingCharacters {
        /// Byte offset of the first trailing character.
        offset: usize,
    },
}

/// Parses a header dictionary into its entries, in source order.
pub(crate) fn parse_dict(src: &str) -> Result<Vec<(String, Value)>, ParseDictError> {
    let mut parser = Parser { src, pos: 0 };
    let entries = parser.dict()?;
    parser.skip_ws();
    if parser.pos != src.len() {
        return Err(ParseDictError::TrailingCharacters { offset: parser.pos });
    }
    Ok(entries)
}

struct Parser<'a> {
    src: &'a str,
    pos: usize,
}

impl Parser<'_> {
    fn peek(&self) -> Option<u8> {
        self.src.as_bytes().get(self.pos).copied()
    }

    fn skip_ws(&mut self) {
        while let Some(b' ' | b'\t' | b'\r' | b'\n') = self.peek() {
            self.pos += 1;
        }
    }

    fn unexpected(&self, expected: &'static str) -> ParseDictError {
        match self.src[self.pos..].chars().next() {
            Some(found) => ParseDictError::UnexpectedChar { found, offset: self.pos, expected },
            None => ParseDictError::UnexpectedEnd { expected },
        }
    }

    fn expect(&mut self, byte: u8, expected: &'static str) -> Result<(), ParseDictError> {
        if self.peek() == Some(byte) {
            self.pos += 1;
            Ok(())
        } else {
            Err(self.unexpected(expected))
        }
    }

    fn dict(&mut self) -> Result<Vec<(String, Value)>, ParseDictError> {
        self.skip_ws();
        self.expect(b'{', "'{'")?;
        let mut entries = Vec::new();
        loop {
            self.skip_ws();
            if self.peek() == Some(b'}') {
                self.pos += 1;
                return Ok(entries);
            }
            let key = self.string()?;
            self.skip_ws();
            self.expect(b':', "':'")?;
            self.skip_ws();
            let value = self.value()?;
            entries.push((key, value));
            self.skip_ws();
            match self.peek() {
                Some(b',') => self.pos += 1,
                Some(b'}') => {
                    self.pos += 1;
                    return Ok(entries);
                }
                _ => return Err(self.unexpected("',' or '}'")),
            }
        }
    }

    fn value(&mut self) -> Result<Value, ParseDictError> {
        match self.peek() {
            Some(b'\'' | b'"') => self.string().map(Value::String),
            Some(b'(') => self.tuple().map(Value::Tuple),
            Some(b'0'..=b'9') => self.integer().map(Value::Integer),
            Some(b'T' | b'F') => self.boolean().map(Value::Boolean),
            _ => Err(self.unexpected("a value")),
        }
    }

    fn string(&mut self) -> Result<String, ParseDictError> {
        let quote = match self.peek() {
            Some(q @ (b'\'' | b'"')) => q,
            _ => return Err(self.unexpected("a string")),
        };
        self.pos += 1;
        let rest = &self.src[self.pos..];
        let Some(len) = rest.bytes().position(|b| b == quote) else {
            self.pos = self.src.len();
            return Err(ParseDictError::UnexpectedEnd { expected: "closing quote" });
        };
        self.pos += len + 1;
        Ok(rest[..len].to_string())
    }

    fn boolean(&mut self) -> Result<bool, ParseDictError> {
        let rest = &self.src[self.pos..];
        let (value, len) = if rest.starts_with("True") {
            (true, "True".len())
        } else if rest.starts_with("False") {
            (false, "False".len())
        } else {
            return Err(self.unexpected("'True' or 'False'"));
        };
        self.pos += len;
        Ok(value)
    }

    fn integer(&mut self) -> Result<usize, ParseDictError> {
        let start = self.pos;
        let mut value: usize = 0;
        while let Some(digit @ b'0'..=b'9') = self.peek() {
            value = value
                .checked_mul(10)
                .and_then(|v| v.checked_add(usize::from(digit - b'0')))
                .ok_or(ParseDictError::IntegerOverflow { offset: start })?;
            self.pos += 1;
        }
        if self.pos == start {
            return Err(self.unexpected("an integer"));
        }
        // Python 2 long suffix
        if self.peek() == Some(b'L') {
            self.pos += 1;
        }
        Ok(value)
    }

    fn tuple(&mut self) -> Result<Vec<usize>, ParseDictError> {
        self.expect(b'(', "'('")?;
        let mut items = Vec::new();
        loop {
            self.skip_ws();
            if self.peek() == Some(b')') {
                self.pos += 1;
                return Ok(items);
            }
            items.push(self.integer()?);
            self.skip_ws();
            match self.peek() {
                Some(b',') => self.pos += 1,
                Some(b')') => {
                    self.pos += 1;
                    return Ok(items);
                }
                _ => return Err(self.unexpected("',' or ')'")),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(key: &str, value: Value) -> (String, Value) {
        (key.to_string(), value)
    }

    #[test]
    fn numpy_header() {
        let dict =
            parse_dict("{'descr': '<f8', 'fortran_order': False, 'shape': (1, 2), }").unwrap();
        assert_eq!(
            dict,
            [
                entry("descr", Value::String("<f8".into())),
                entry("fortran_order", Value::Boolean(false)),
                entry("shape", Value::Tuple(vec![1, 2])),
            ]
        );
    }

    #[test]
    fn padding_and_newline() {
        let dict = parse_dict("{'shape': (), }          \n").unwrap();
        assert_eq!(dict, [entry("shape", Value::Tuple(vec![]))]);
    }

    #[test]
    fn one_element_tuple_forms() {
        for src in ["{'shape': (5,)}", "{'shape': (5)}", "{'shape': ( 5 , )}"] {
            assert_eq!(parse_dict(src).unwrap(), [entry("shape", Value::Tuple(vec![5]))]);
        }
    }

    #[test]
    fn free_whitespace_and_double_quotes() {
        let dict = parse_dict("\n{ \"fortran_order\"\t:True ,\"shape\":(3,4,5),'descr':\"|u1\"}")
            .unwrap();
        assert_eq!(
            dict,
            [
                entry("fortran_order", Value::Boolean(true)),
                entry("shape", Value::Tuple(vec![3, 4, 5])),
                entry("descr", Value::String("|u1".into())),
            ]
        );
    }

    #[test]
    fn long_suffix() {
        let dict = parse_dict("{'shape': (3L, 4L), 'n': 7L}").unwrap();
        assert_eq!(
            dict,
            [entry("shape", Value::Tuple(vec![3, 4])), entry("n", Value::Integer(7))]
        );
    }

    #[test]
    fn empty_dict() {
        assert!(parse_dict("{}").unwrap().is_empty());
    }

    #[test]
    fn syntax_errors() {
        assert_eq!(
            parse_dict("{'descr': '<f8'"),
            Err(ParseDictError::UnexpectedEnd { expected: "',' or '}'" })
        );
        assert_eq!(
            parse_dict("{'descr': '<f8}"),
            Err(ParseDictError::UnexpectedEnd { expected: "closing quote" })
        );
        assert_eq!(
            parse_dict("{'shape': (1, x)}"),
            Err(ParseDictError::UnexpectedChar { found: 'x', offset: 14, expected: "an integer" })
        );
        assert_eq!(
            parse_dict("{'a': None}"),
            Err(ParseDictError::UnexpectedChar { found: 'N', offset: 6, expected: "a value" })
        );
        assert_eq!(
            parse_dict("{'a': Truex}"),
            Err(ParseDictError::UnexpectedChar { found: 'x', offset: 10, expected: "',' or '}'" })
        );
        assert_eq!(
            parse_dict("{,}"),
            Err(ParseDictError::UnexpectedChar { found: ',', offset: 1, expected: "a string" })
        );
        assert_eq!(
            parse_dict("{} x"),
            Err(ParseDictError::TrailingCharacters { offset: 3 })
        );
        assert_eq!(
            parse_dict("[1]"),
            Err(ParseDictError::UnexpectedChar { found: '[', offset: 0, expected: "'{'" })
        );
    }

    #[test]
    fn integer_overflow() {
        let src = format!("{{'shape': ({}0,)}}", usize::MAX);
        assert_eq!(parse_dict(&src), Err(ParseDictError::IntegerOverflow { offset: 11 }));
    }

    #[test]
    fn display_is_python_like() {
        assert_eq!(Value::Tuple(vec![5]).to_string(), "(5,)");
        assert_eq!(Value::Tuple(vec![2, 3]).to_string(), "(2, 3)");
        assert_eq!(Value::Tuple(vec![]).to_string(), "()");
        assert_eq!(Value::Boolean(true).to_string(), "True");
        assert_eq!(Value::String("<f4".into()).to_string(), "'<f4'");
    }
}
