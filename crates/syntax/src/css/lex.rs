//! CSS lexical helpers
//!
//! Character classes and the shared consume routines used by several
//! producers (escapes, identifiers, numbers, strings and urls).

use crate::cursor::Cursor;
use crate::error::{LexError, SourceLocation};
use crate::token::{Number, Token, TokenValue};

use super::{
    BAD_NUMBER, BAD_STRING, BAD_URL, DIMENSION, FUNCTION, IDENT, NUMBER, PERCENTAGE, STRING, URL,
};

const REPLACEMENT: char = '\u{FFFD}';

/// Start of an identifier: letter, underscore or non-ASCII
pub fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || !c.is_ascii()
}

/// Identifier continuation: start class, digit or hyphen
pub fn is_ident_char(c: char) -> bool {
    is_ident_start(c) || c.is_ascii_digit() || c == '-'
}

pub fn is_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n')
}

fn is_non_printable(c: char) -> bool {
    matches!(c, '\0'..='\x08' | '\x0B' | '\x0E'..='\x1F' | '\x7F')
}

/// A backslash not followed by a newline
pub(super) fn is_valid_escape(first: Option<char>, second: Option<char>) -> bool {
    first == Some('\\') && second != Some('\n')
}

/// Would an identifier start `offset` characters ahead
pub fn starts_ident_sequence(cursor: &Cursor, offset: usize) -> bool {
    match cursor.peek_at(offset) {
        Some('-') => {
            let next = cursor.peek_at(offset + 1);
            next.is_some_and(|c| is_ident_start(c) || c == '-')
                || is_valid_escape(next, cursor.peek_at(offset + 2))
        }
        Some('\\') => is_valid_escape(Some('\\'), cursor.peek_at(offset + 1)),
        Some(c) => is_ident_start(c),
        None => false,
    }
}

/// Would a number start at the cursor
pub fn starts_number(cursor: &Cursor) -> bool {
    let digit_at = |n: usize| cursor.peek_at(n).is_some_and(|c| c.is_ascii_digit());
    match cursor.peek() {
        Some('+') | Some('-') => digit_at(1) || (cursor.peek_at(1) == Some('.') && digit_at(2)),
        Some('.') => digit_at(1),
        Some(c) => c.is_ascii_digit(),
        None => false,
    }
}

/// Consume an escape; the backslash has already been consumed
///
/// Hex escapes take up to six digits and one trailing whitespace character.
/// Zero, surrogates and values past U+10FFFF become U+FFFD.
pub fn consume_escape(cursor: &mut Cursor) -> char {
    match cursor.advance() {
        None => REPLACEMENT,
        Some(c) if c.is_ascii_hexdigit() => {
            let mut hex = String::from(c);
            while hex.len() < 6 {
                match cursor.peek() {
                    Some(h) if h.is_ascii_hexdigit() => {
                        hex.push(h);
                        cursor.advance();
                    }
                    _ => break,
                }
            }
            if cursor.peek().is_some_and(is_whitespace) {
                cursor.advance();
            }
            u32::from_str_radix(&hex, 16)
                .ok()
                .filter(|&value| value != 0)
                .and_then(char::from_u32)
                .unwrap_or(REPLACEMENT)
        }
        Some(c) => c,
    }
}

/// Consume identifier characters and escapes
pub fn consume_ident_sequence(cursor: &mut Cursor) -> String {
    let mut out = String::new();
    loop {
        match cursor.peek() {
            Some(c) if is_ident_char(c) => {
                out.push(c);
                cursor.advance();
            }
            Some('\\') if is_valid_escape(Some('\\'), cursor.peek_at(1)) => {
                cursor.advance();
                out.push(consume_escape(cursor));
            }
            _ => break,
        }
    }
    out
}

/// Consume an ident, function or url token
pub(super) fn consume_ident_like(cursor: &mut Cursor) -> Token {
    let location = cursor.location();
    let name = consume_ident_sequence(cursor);

    if cursor.peek() != Some('(') {
        return Token::text_token(IDENT, name, location);
    }
    cursor.advance();

    if name.eq_ignore_ascii_case("url") {
        let mut offset = 0;
        while cursor.peek_at(offset).is_some_and(is_whitespace) {
            offset += 1;
        }
        if !matches!(cursor.peek_at(offset), Some('"') | Some('\'')) {
            return consume_url(cursor, location);
        }
    }
    Token::text_token(FUNCTION, name, location)
}

fn consume_url(cursor: &mut Cursor, location: SourceLocation) -> Token {
    let mut value = String::new();
    cursor.consume_while(is_whitespace);

    let bad = |value: String, error: LexError| Token::text_token(BAD_URL, value, location).with_error(error);

    loop {
        match cursor.advance() {
            None => return bad(value, LexError::UnterminatedUrl),
            Some(')') => return Token::text_token(URL, value, location),
            Some(c) if is_whitespace(c) => {
                cursor.consume_while(is_whitespace);
                match cursor.peek() {
                    Some(')') => {
                        cursor.advance();
                        return Token::text_token(URL, value, location);
                    }
                    None => return bad(value, LexError::UnterminatedUrl),
                    Some(_) => {
                        consume_bad_url_remnants(cursor);
                        return bad(value, LexError::IllegalUrlCharacter { character: c });
                    }
                }
            }
            Some(c) if matches!(c, '"' | '\'' | '(') || is_non_printable(c) => {
                consume_bad_url_remnants(cursor);
                return bad(value, LexError::IllegalUrlCharacter { character: c });
            }
            Some('\\') => {
                if is_valid_escape(Some('\\'), cursor.peek()) {
                    value.push(consume_escape(cursor));
                } else {
                    consume_bad_url_remnants(cursor);
                    return bad(value, LexError::InvalidEscape);
                }
            }
            Some(c) => value.push(c),
        }
    }
}

fn consume_bad_url_remnants(cursor: &mut Cursor) {
    while let Some(c) = cursor.advance() {
        match c {
            ')' => break,
            '\\' if is_valid_escape(Some('\\'), cursor.peek()) => {
                consume_escape(cursor);
            }
            _ => {}
        }
    }
}

/// Consume a quoted string; the cursor is on the opening quote
pub(super) fn consume_string(cursor: &mut Cursor) -> Token {
    let location = cursor.location();
    let quote = cursor.advance();
    let mut value = String::new();

    loop {
        match cursor.peek() {
            None => {
                return Token::text_token(BAD_STRING, value, location)
                    .with_error(LexError::UnterminatedString)
            }
            Some('\n') => {
                return Token::text_token(BAD_STRING, value, location)
                    .with_error(LexError::NewlineInString)
            }
            Some(c) if Some(c) == quote => {
                cursor.advance();
                return Token::text_token(STRING, value, location);
            }
            Some('\\') => {
                cursor.advance();
                match cursor.peek() {
                    None => {}
                    Some('\n') => {
                        cursor.advance();
                    }
                    Some(_) => value.push(consume_escape(cursor)),
                }
            }
            Some(c) => {
                value.push(c);
                cursor.advance();
            }
        }
    }
}

/// Consume a number, dimension or percentage
///
/// Malformed numbers become a bad-number token wrapping the partial token.
pub(super) fn consume_numeric(cursor: &mut Cursor) -> Token {
    let location = cursor.location();
    let digit_at = |cursor: &Cursor, n: usize| cursor.peek_at(n).is_some_and(|c| c.is_ascii_digit());
    let mut repr = String::new();
    let mut integer = true;
    let mut error = None;

    if let Some(sign @ ('+' | '-')) = cursor.peek() {
        repr.push(sign);
        cursor.advance();
    }
    let digits = cursor.consume_while(|c| c.is_ascii_digit());
    if digits.is_empty() {
        repr.push('0');
    }
    repr.push_str(&digits);

    if cursor.peek() == Some('.') && digit_at(cursor, 1) {
        cursor.advance();
        repr.push('.');
        repr.push_str(&cursor.consume_while(|c| c.is_ascii_digit()));
        integer = false;
    }

    if cursor.peek() == Some('.') && digit_at(cursor, 1) {
        error = Some(LexError::MultipleDecimalPoints);
    } else if matches!(cursor.peek(), Some('e') | Some('E')) {
        let signed = matches!(cursor.peek_at(1), Some('+') | Some('-'));
        if digit_at(cursor, 1) || (signed && digit_at(cursor, 2)) {
            cursor.advance();
            repr.push('e');
            if signed {
                repr.extend(cursor.advance());
            }
            repr.push_str(&cursor.consume_while(|c| c.is_ascii_digit()));
            integer = false;
            if cursor.peek() == Some('.') && digit_at(cursor, 1) {
                error = Some(LexError::DecimalInExponent);
            }
        } else if signed {
            cursor.skip(2);
            error = Some(LexError::ExponentWithoutDigits);
        }
    }

    if error.is_some() {
        cursor.consume_while(|c| c.is_ascii_digit() || c == '.');
    }

    let number = match Number::parse(&repr, integer) {
        Some(number) => number,
        None => {
            error.get_or_insert(LexError::UnparseableNumber { text: repr });
            Number::Integer(0)
        }
    };

    let token = if starts_ident_sequence(cursor, 0) {
        let unit = consume_ident_sequence(cursor);
        Token::new(DIMENSION, TokenValue::Dimension(number, unit), location)
    } else if cursor.peek() == Some('%') {
        cursor.advance();
        Token::new(PERCENTAGE, TokenValue::Dimension(number, "%".to_string()), location)
    } else {
        Token::new(NUMBER, TokenValue::Number(number), location)
    };

    match error {
        Some(error) => Token::new(BAD_NUMBER, TokenValue::Nested(Box::new(token)), location).with_error(error),
        None => token,
    }
}
