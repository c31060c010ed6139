use std::fmt;

use crate::consts::{CARD_LEN, CFITSIO_PRIMARY_COMMENTS, KEYWORD_LEN, STRUCTURAL_KEYWORDS};
use crate::error::{OptredError, Result};

/// Value of a single header keyword.
#[derive(Clone, Debug, PartialEq)]
pub enum HeaderValue {
    Logical(bool),
    Integer(i64),
    Float(f64),
    Text(String),
}

impl HeaderValue {
    /// Parse the value field of a card (everything between `= ` and the
    /// comment separator).
    pub fn parse(literal: &str) -> Self {
        let literal = literal.trim();
        if literal.starts_with('\'') {
            let (text, _) = split_quoted(literal);
            return Self::Text(text);
        }
        match literal {
            "T" => return Self::Logical(true),
            "F" => return Self::Logical(false),
            _ => {}
        }
        if let Ok(i) = literal.parse::<i64>() {
            return Self::Integer(i);
        }
        if let Ok(f) = literal.replace(['D', 'd'], "E").parse::<f64>() {
            return Self::Float(f);
        }
        Self::Text(literal.to_string())
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Integer(i) => Some(*i as f64),
            Self::Float(f) => Some(*f),
            Self::Text(s) => s.trim().parse().ok(),
            Self::Logical(_) => None,
        }
    }
}

impl fmt::Display for HeaderValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Logical(true) => write!(f, "T"),
            Self::Logical(false) => write!(f, "F"),
            Self::Integer(i) => write!(f, "{i}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Text(s) => write!(f, "{}", s.trim_end()),
        }
    }
}

impl From<bool> for HeaderValue {
    fn from(v: bool) -> Self {
        Self::Logical(v)
    }
}

impl From<i64> for HeaderValue {
    fn from(v: i64) -> Self {
        Self::Integer(v)
    }
}

impl From<f64> for HeaderValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for HeaderValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for HeaderValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

/// A valued keyword card.
#[derive(Clone, Debug, PartialEq)]
pub struct Keyword {
    pub name: String,
    pub value: HeaderValue,
    pub comment: Option<String>,
}

/// Non-structural content of one HDU header.
///
/// Keywords keep their file order. HISTORY and COMMENT lines are held
/// separately and written after the keywords.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Header {
    keywords: Vec<Keyword>,
    history: Vec<String>,
    comments: Vec<String>,
}

impl Header {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a header from raw 80-column cards, dropping structural keywords.
    pub fn from_cards<I, S>(cards: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut header = Self::new();
        for card in cards {
            header.push_card(card.as_ref())?;
        }
        Ok(header)
    }

    /// Parse one card and add it to the header.
    pub fn push_card(&mut self, card: &str) -> Result<()> {
        if !card.is_ascii() || card.len() > CARD_LEN {
            return Err(OptredError::InvalidCard(card.to_string()));
        }
        let name = card[..card.len().min(KEYWORD_LEN)].trim_end();
        let rest = card.get(KEYWORD_LEN..).unwrap_or("");

        match name {
            "" | "END" => return Ok(()),
            "HISTORY" => {
                self.history.push(rest.trim().to_string());
                return Ok(());
            }
            "COMMENT" => {
                let text = rest.trim();
                if !CFITSIO_PRIMARY_COMMENTS.contains(&text) {
                    self.comments.push(text.to_string());
                }
                return Ok(());
            }
            _ => {}
        }

        let (name, field) = if name == "HIERARCH" {
            match rest.split_once('=') {
                Some((key, field)) => (key.trim().to_string(), field),
                None => return Err(OptredError::InvalidCard(card.to_string())),
            }
        } else if let Some(field) = rest.strip_prefix("= ") {
            (name.to_string(), field)
        } else {
            // Commentary card without a value indicator.
            return Ok(());
        };

        if is_structural(&name) {
            return Ok(());
        }

        let (literal, comment) = split_value_comment(field);
        self.keywords.push(Keyword {
            name,
            value: HeaderValue::parse(literal),
            comment,
        });
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&HeaderValue> {
        self.keywords
            .iter()
            .find(|k| k.name.eq_ignore_ascii_case(name))
            .map(|k| &k.value)
    }

    /// Value of `name` as display text, trimmed.
    pub fn get_text(&self, name: &str) -> Option<String> {
        self.get(name).map(|v| v.to_string().trim().to_string())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Replace the value of an existing keyword or append a new one.
    pub fn set(&mut self, name: &str, value: impl Into<HeaderValue>) {
        let value = value.into();
        match self
            .keywords
            .iter_mut()
            .find(|k| k.name.eq_ignore_ascii_case(name))
        {
            Some(k) => k.value = value,
            None => self.keywords.push(Keyword {
                name: name.to_ascii_uppercase(),
                value,
                comment: None,
            }),
        }
    }

    pub fn remove(&mut self, name: &str) -> Option<HeaderValue> {
        let idx = self
            .keywords
            .iter()
            .position(|k| k.name.eq_ignore_ascii_case(name))?;
        Some(self.keywords.remove(idx).value)
    }

    /// Copy the listed keywords that exist in `source`.
    pub fn copy_from<S: AsRef<str>>(&mut self, source: &Header, keys: &[S]) {
        for key in keys {
            if let Some(kw) = source
                .keywords
                .iter()
                .find(|k| k.name.eq_ignore_ascii_case(key.as_ref()))
            {
                self.set(&kw.name, kw.value.clone());
            }
        }
    }

    pub fn add_history(&mut self, line: impl Into<String>) {
        self.history.push(line.into());
    }

    pub fn add_comment(&mut self, line: impl Into<String>) {
        self.comments.push(line.into());
    }

    pub fn keywords(&self) -> &[Keyword] {
        &self.keywords
    }

    pub fn history(&self) -> &[String] {
        &self.history
    }

    pub fn comments(&self) -> &[String] {
        &self.comments
    }

    pub fn len(&self) -> usize {
        self.keywords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty() && self.history.is_empty() && self.comments.is_empty()
    }
}

/// Whether the FITS writer owns this keyword.
pub fn is_structural(name: &str) -> bool {
    let upper = name.to_ascii_uppercase();
    upper.starts_with("NAXIS") || STRUCTURAL_KEYWORDS.contains(&upper.as_str())
}

/// Split a value field into its literal and optional comment.
fn split_value_comment(field: &str) -> (&str, Option<String>) {
    let trimmed = field.trim_start();
    let search_from = if trimmed.starts_with('\'') {
        let offset = field.len() - trimmed.len();
        offset + quoted_len(trimmed)
    } else {
        0
    };
    match field[search_from..].find('/') {
        Some(pos) => {
            let slash = search_from + pos;
            let comment = field[slash + 1..].trim();
            let comment = (!comment.is_empty()).then(|| comment.to_string());
            (&field[..slash], comment)
        }
        None => (field, None),
    }
}

/// Byte length of a leading quoted string, closing quote included.
fn quoted_len(s: &str) -> usize {
    let bytes = s.as_bytes();
    let mut i = 1;
    while i < bytes.len() {
        if bytes[i] == b'\'' {
            if bytes.get(i + 1) == Some(&b'\'') {
                i += 2;
                continue;
            }
            return i + 1;
        }
        i += 1;
    }
    bytes.len()
}

/// Unescape a leading quoted string; returns the text and the remainder.
fn split_quoted(s: &str) -> (String, &str) {
    let end = quoted_len(s);
    let inner_end = if end >= 2 && s.as_bytes()[end - 1] == b'\'' {
        end - 1
    } else {
        end
    };
    let text = s[1.min(inner_end)..inner_end].replace("''", "'");
    (text.trim_end().to_string(), &s[end..])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card(s: &str) -> String {
        format!("{s:<80}")
    }

    #[test]
    fn test_parse_string_card() {
        let mut h = Header::new();
        h.push_card(&card("IMAGETYP= 'zero    '           / Image type"))
            .unwrap();
        let kw = &h.keywords()[0];
        assert_eq!(kw.name, "IMAGETYP");
        assert_eq!(kw.value, HeaderValue::Text("zero".into()));
        assert_eq!(kw.comment.as_deref(), Some("Image type"));
    }

    #[test]
    fn test_parse_escaped_quote_and_slash_in_string() {
        let mut h = Header::new();
        h.push_card(&card("OBJECT  = 'NGC 1/2 o''clock' / target"))
            .unwrap();
        assert_eq!(h.get_text("OBJECT").unwrap(), "NGC 1/2 o'clock");
        assert_eq!(h.keywords()[0].comment.as_deref(), Some("target"));
    }

    #[test]
    fn test_parse_numeric_and_logical() {
        let h = Header::from_cards([
            card("EXPTIME =                 30.5 / seconds"),
            card("CCDSUM  =                    2"),
            card("DARKTIME=              1.5D+01"),
            card("FLIPPED =                    T"),
        ])
        .unwrap();
        assert_eq!(h.get("EXPTIME"), Some(&HeaderValue::Float(30.5)));
        assert_eq!(h.get("CCDSUM"), Some(&HeaderValue::Integer(2)));
        assert_eq!(h.get("DARKTIME"), Some(&HeaderValue::Float(15.0)));
        assert_eq!(h.get("FLIPPED"), Some(&HeaderValue::Logical(true)));
    }

    #[test]
    fn test_structural_keywords_dropped() {
        let h = Header::from_cards([
            card("SIMPLE  =                    T"),
            card("BITPIX  =                   16"),
            card("NAXIS   =                    2"),
            card("NAXIS1  =                  100"),
            card("BZERO   =                32768"),
            card("FILTER  = 'R       '"),
            card("END"),
        ])
        .unwrap();
        assert_eq!(h.len(), 1);
        assert_eq!(h.get_text("FILTER").unwrap(), "R");
    }

    #[test]
    fn test_history_and_comment() {
        let h = Header::from_cards([
            card("HISTORY 2011-06-08 - Corrected OBSERVER keyword."),
            card("COMMENT some note"),
            card("COMMENT   FITS (Flexible Image Transport System) format is defined in 'Astronomy"),
        ])
        .unwrap();
        assert_eq!(h.history(), &["2011-06-08 - Corrected OBSERVER keyword."]);
        assert_eq!(h.comments(), &["some note"]);
        assert!(h.keywords().is_empty());
    }

    #[test]
    fn test_hierarch_card() {
        let h = Header::from_cards([card("HIERARCH ESO DPR TYPE = 'FLAT,LAMP' / type")]).unwrap();
        assert_eq!(h.get_text("ESO DPR TYPE").unwrap(), "FLAT,LAMP");
    }

    #[test]
    fn test_set_replaces_in_place() {
        let mut h = Header::new();
        h.set("OBJECT", "M51");
        h.set("EXPTIME", 30.0);
        h.set("object", "M101");
        assert_eq!(h.len(), 2);
        assert_eq!(h.keywords()[0].name, "OBJECT");
        assert_eq!(h.get_text("OBJECT").unwrap(), "M101");
    }

    #[test]
    fn test_copy_from_only_present() {
        let mut src = Header::new();
        src.set("OBJECT", "M51");
        src.set("EXPTIME", 30.0);
        src.set("AIRMASS", 1.2);
        let mut dst = Header::new();
        dst.copy_from(&src, &["OBJECT", "EXPTIME", "DEWTEMP"]);
        assert_eq!(dst.len(), 2);
        assert!(!dst.contains("AIRMASS"));
        assert!(!dst.contains("DEWTEMP"));
    }

    #[test]
    fn test_non_ascii_card_rejected() {
        let mut h = Header::new();
        assert!(h.push_card("OBJECT  = 'Ω'").is_err());
    }
}
