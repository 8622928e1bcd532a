use super::{
    metadata::{parse_dict, ParseDictError, Value},
    ReadNpyError,
};
use byteorder::{ByteOrder, LittleEndian};
use std::fmt;
use thiserror::Error;

/// Magic string to indicate npy format.
const MAGIC_STRING: &[u8] = b"\x93NUMPY";

/// Offset just past the version number (1 byte major, 1 byte minor).
const VERSION_END: usize = MAGIC_STRING.len() + 2;

/// Length of the fixed preamble: magic string, version number and the 2-byte
/// `HEADER_LEN` of format version 1.0.
const PREAMBLE_LEN: usize = VERSION_END + 2;

/// An error parsing the array format dictionary of a `.npy` file.
#[derive(Debug, Error)]
pub enum ParseHeaderError {
    /// The array format string contains non-ASCII characters, which is an
    /// error for .npy format version 1.0.
    #[error("non-ascii in array format string")]
    NonAscii,
    /// Syntax error in the metadata dictionary.
    #[error("error parsing metadata dict: {0}")]
    DictParse(#[from] ParseDictError),
    /// An unknown key was found in the metadata dictionary.
    #[error("unknown key: '{0}'")]
    UnknownKey(String),
    /// A key appears twice in the metadata dictionary.
    #[error("duplicate key: '{0}'")]
    DuplicateKey(String),
    /// A required key was missing from the metadata dictionary.
    #[error("missing key: '{0}'")]
    MissingKey(&'static str),
    /// An illegal value was found for a key in the metadata dictionary.
    #[error("illegal value for key '{key}': {value}")]
    IllegalValue {
        /// The key for which the value was illegal.
        key: &'static str,
        /// The illegal value, formatted as a Python literal.
        value: String,
    },
}

/// The array format described by a `.npy` header.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Header {
    pub descr: String,
    pub fortran_order: bool,
    pub shape: Vec<usize>,
}

impl fmt::Display for Header {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{{'descr': {}, 'fortran_order': {}, 'shape': {}, }}",
            Value::String(self.descr.clone()),
            Value::Boolean(self.fortran_order),
            Value::Tuple(self.shape.clone()),
        )
    }
}

impl Header {
    fn from_dict(dict: Vec<(String, Value)>) -> Result<Self, ParseHeaderError> {
        let mut descr = None;
        let mut fortran_order = None;
        let mut shape = None;
        for (key, value) in dict {
            let duplicate = match key.as_str() {
                "descr" => match value {
                    Value::String(s) => descr.replace(s).is_some(),
                    value => return Err(illegal("descr", &value)),
                },
                "fortran_order" => match value {
                    Value::Boolean(b) => fortran_order.replace(b).is_some(),
                    value => return Err(illegal("fortran_order", &value)),
                },
                "shape" => match value {
                    Value::Tuple(dims) => shape.replace(dims).is_some(),
                    value => return Err(illegal("shape", &value)),
                },
                _ => return Err(ParseHeaderError::UnknownKey(key)),
            };
            if duplicate {
                return Err(ParseHeaderError::DuplicateKey(key));
            }
        }
        let descr = descr.ok_or(ParseHeaderError::MissingKey("descr"))?;
        let fortran_order = fortran_order.ok_or(ParseHeaderError::MissingKey("fortran_order"))?;
        let shape = shape.ok_or(ParseHeaderError::MissingKey("shape"))?;
        Ok(Self { descr, fortran_order, shape })
    }

    /// Parses the array format dictionary.
    pub(crate) fn parse(text: &str) -> Result<Self, ParseHeaderError> {
        Self::from_dict(parse_dict(text)?)
    }

    /// Reads the header at the start of `buf`, returning it together with the
    /// bytes that follow it.
    pub(crate) fn from_bytes(buf: &[u8]) -> Result<(Self, &[u8]), ReadNpyError> {
        let truncated = |needed| ReadNpyError::Truncated { needed, len: buf.len() };

        // Check for magic string
        let magic = buf.get(..MAGIC_STRING.len()).ok_or_else(|| truncated(MAGIC_STRING.len()))?;
        if magic != MAGIC_STRING {
            return Err(ReadNpyError::MagicString);
        }

        // Only version 1.0 is understood
        if buf.len() < VERSION_END {
            return Err(truncated(VERSION_END));
        }
        match (buf[MAGIC_STRING.len()], buf[MAGIC_STRING.len() + 1]) {
            (1, 0) => {}
            (major, minor) => return Err(ReadNpyError::Version { major, minor }),
        }

        // Get `HEADER_LEN`
        if buf.len() < PREAMBLE_LEN {
            return Err(truncated(PREAMBLE_LEN));
        }
        let header_len = usize::from(LittleEndian::read_u16(&buf[VERSION_END..PREAMBLE_LEN]));
        let header_end = PREAMBLE_LEN + header_len;
        if buf.len() < header_end {
            return Err(truncated(header_end));
        }

        // Parse the dictionary describing the array's format
        let text = ascii_until_nul(&buf[PREAMBLE_LEN..header_end])?;
        let header = Self::parse(text)?;
        Ok((header, &buf[header_end..]))
    }
}

fn illegal(key: &'static str, value: &Value) -> ParseHeaderError {
    ParseHeaderError::IllegalValue { key, value: value.to_string() }
}

/// Reads ASCII text up to the first NUL byte or the end of `bytes`.
fn ascii_until_nul(bytes: &[u8]) -> Result<&str, ParseHeaderError> {
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    match std::str::from_utf8(&bytes[..end]) {
        Ok(text) if text.is_ascii() => Ok(text),
        _ => Err(ParseHeaderError::NonAscii),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::npy::tests::npy_bytes;

    const F4_2X3: &str = "{'descr': '<f4', 'fortran_order': False, 'shape': (2, 3), }";

    #[test]
    fn reads_header_and_splits_payload() {
        let buf = npy_bytes(F4_2X3, &[7; 24]);
        let (header, payload) = Header::from_bytes(&buf).unwrap();
        assert_eq!(
            header,
            Header { descr: "<f4".into(), fortran_order: false, shape: vec![2, 3] }
        );
        assert_eq!(payload, &[7; 24]);
        // numpy pads the whole header to a multiple of 64 bytes
        assert_eq!((buf.len() - payload.len()) % 64, 0);
    }

    #[test]
    fn truncated_preamble() {
        for len in 0..MAGIC_STRING.len() {
            let err = Header::from_bytes(&MAGIC_STRING[..len]).unwrap_err();
            assert!(matches!(err, ReadNpyError::Truncated { needed: 6, len: l } if l == len));
        }
        let err = Header::from_bytes(b"\x93NUMPY\x01").unwrap_err();
        assert!(matches!(err, ReadNpyError::Truncated { needed: 8, len: 7 }));
        let err = Header::from_bytes(b"\x93NUMPY\x01\x00\x10").unwrap_err();
        assert!(matches!(err, ReadNpyError::Truncated { needed: 10, len: 9 }));
    }

    #[test]
    fn header_len_beyond_buffer() {
        let err = Header::from_bytes(b"\x93NUMPY\x01\x00\x20\x00{}").unwrap_err();
        assert!(matches!(err, ReadNpyError::Truncated { needed: 42, len: 12 }));
    }

    #[test]
    fn magic_string_mismatch() {
        let mut buf = npy_bytes(F4_2X3, &[0; 24]);
        for i in 0..MAGIC_STRING.len() {
            let orig = buf[i];
            buf[i] = b'x';
            assert!(matches!(Header::from_bytes(&buf), Err(ReadNpyError::MagicString)));
            buf[i] = orig;
        }
        assert!(matches!(Header::from_bytes(b"PK\x03\x04\x00\x00"), Err(ReadNpyError::MagicString)));
    }

    #[test]
    fn only_version_1_0() {
        let mut buf = npy_bytes(F4_2X3, &[0; 24]);
        for (major, minor) in [(2, 0), (3, 0), (1, 1), (0, 0)] {
            buf[6] = major;
            buf[7] = minor;
            let err = Header::from_bytes(&buf).unwrap_err();
            assert!(
                matches!(err, ReadNpyError::Version { major: a, minor: b } if (a, b) == (major, minor))
            );
        }
    }

    #[test]
    fn text_stops_at_nul() {
        let dict = b"{'descr': '|u1', 'fortran_order': False, 'shape': (3,), }\0garbage";
        let mut buf = b"\x93NUMPY\x01\x00".to_vec();
        buf.extend_from_slice(&(dict.len() as u16).to_le_bytes());
        buf.extend_from_slice(dict);
        buf.extend_from_slice(&[1, 2, 3]);
        let (header, payload) = Header::from_bytes(&buf).unwrap();
        assert_eq!(header.shape, [3]);
        assert_eq!(payload, [1, 2, 3]);
    }

    #[test]
    fn non_ascii_text() {
        let buf = npy_bytes("{'descr': '<f4\u{e9}', 'fortran_order': False, 'shape': ()}", &[]);
        let err = Header::from_bytes(&buf).unwrap_err();
        assert!(matches!(err, ReadNpyError::ParseHeader(ParseHeaderError::NonAscii)));
    }

    #[test]
    fn missing_keys() {
        for (dict, key) in [
            ("{'fortran_order': False, 'shape': ()}", "descr"),
            ("{'descr': '<f8', 'shape': ()}", "fortran_order"),
            ("{'descr': '<f8', 'fortran_order': False}", "shape"),
        ] {
            let err = Header::parse(dict).unwrap_err();
            assert!(matches!(err, ParseHeaderError::MissingKey(k) if k == key));
        }
    }

    #[test]
    fn unknown_and_duplicate_keys() {
        let err = Header::parse("{'descr': '<f8', 'fortran_order': False, 'shape': (), 'x': 1}")
            .unwrap_err();
        assert!(matches!(err, ParseHeaderError::UnknownKey(k) if k == "x"));
        let err = Header::parse("{'descr': '<f8', 'descr': '<f4', 'fortran_order': False}")
            .unwrap_err();
        assert!(matches!(err, ParseHeaderError::DuplicateKey(k) if k == "descr"));
    }

    #[test]
    fn illegal_values() {
        let err = Header::parse("{'descr': '<f8', 'fortran_order': 0, 'shape': ()}").unwrap_err();
        assert!(matches!(
            err,
            ParseHeaderError::IllegalValue { key: "fortran_order", ref value } if value == "0"
        ));
        let err = Header::parse("{'descr': '<f8', 'fortran_order': False, 'shape': 5}").unwrap_err();
        assert!(matches!(err, ParseHeaderError::IllegalValue { key: "shape", .. }));
        let err = Header::parse("{'descr': (1,), 'fortran_order': False, 'shape': ()}").unwrap_err();
        assert!(matches!(err, ParseHeaderError::IllegalValue { key: "descr", .. }));
    }

    #[test]
    fn display_round_trips() {
        let header = Header::parse(F4_2X3).unwrap();
        assert_eq!(header.to_string(), F4_2X3);
        assert_eq!(Header::parse(&header.to_string()).unwrap(), header);
    }
}
