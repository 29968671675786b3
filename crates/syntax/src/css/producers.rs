//! CSS producers
//!
//! One producer per lexical class, registered in priority order by the
//! dialect.

use crate::cursor::Cursor;
use crate::error::LexError;
use crate::options::ParseOptions;
use crate::token::{Token, TokenValue};
use crate::token_type::TokenType;
use crate::tokenizer::Producer;

use super::lex::{
    consume_ident_like, consume_ident_sequence, consume_numeric, consume_string, is_ident_char,
    is_valid_escape, is_whitespace, starts_ident_sequence, starts_number,
};
use super::{
    AT_KEYWORD, CDC, CDO, CLOSE_BRACE, CLOSE_BRACKET, CLOSE_PAREN, COLON, COMMA, COMMENT, DELIM,
    HASH, OPEN_BRACE, OPEN_BRACKET, OPEN_PAREN, SEMICOLON, WHITESPACE,
};

fn delim(cursor: &mut Cursor) -> Option<Token> {
    let location = cursor.location();
    cursor
        .advance()
        .map(|c| Token::new(DELIM, TokenValue::Char(c), location))
}

fn bare(cursor: &mut Cursor, kind: TokenType, len: usize) -> Token {
    let location = cursor.location();
    cursor.skip(len);
    Token::bare(kind, location)
}

pub(super) struct WhitespaceProducer;

impl Producer for WhitespaceProducer {
    fn id(&self) -> &'static str {
        "whitespace"
    }

    fn can_produce(&self, cursor: &Cursor) -> bool {
        cursor.peek().is_some_and(is_whitespace)
    }

    fn produce(&self, cursor: &mut Cursor, out: &mut Vec<Token>, _options: &ParseOptions) {
        let location = cursor.location();
        cursor.consume_while(is_whitespace);
        out.push(Token::bare(WHITESPACE, location));
    }
}

/// `; : , ( ) [ ] { }`
pub(super) struct PunctuationProducer;

impl PunctuationProducer {
    fn kind(c: char) -> Option<TokenType> {
        Some(match c {
            ';' => SEMICOLON,
            ':' => COLON,
            ',' => COMMA,
            '(' => OPEN_PAREN,
            ')' => CLOSE_PAREN,
            '[' => OPEN_BRACKET,
            ']' => CLOSE_BRACKET,
            '{' => OPEN_BRACE,
            '}' => CLOSE_BRACE,
            _ => return None,
        })
    }
}

impl Producer for PunctuationProducer {
    fn id(&self) -> &'static str {
        "punctuation"
    }

    fn can_produce(&self, cursor: &Cursor) -> bool {
        cursor.peek().and_then(Self::kind).is_some()
    }

    fn produce(&self, cursor: &mut Cursor, out: &mut Vec<Token>, _options: &ParseOptions) {
        if let Some(kind) = cursor.peek().and_then(Self::kind) {
            out.push(bare(cursor, kind, 1));
        }
    }
}

pub(super) struct PlusProducer;

impl Producer for PlusProducer {
    fn id(&self) -> &'static str {
        "plus"
    }

    fn can_produce(&self, cursor: &Cursor) -> bool {
        cursor.peek() == Some('+')
    }

    fn produce(&self, cursor: &mut Cursor, out: &mut Vec<Token>, _options: &ParseOptions) {
        if starts_number(cursor) {
            out.push(consume_numeric(cursor));
        } else {
            out.extend(delim(cursor));
        }
    }
}

pub(super) struct MinusProducer;

impl Producer for MinusProducer {
    fn id(&self) -> &'static str {
        "minus"
    }

    fn can_produce(&self, cursor: &Cursor) -> bool {
        cursor.peek() == Some('-')
    }

    fn produce(&self, cursor: &mut Cursor, out: &mut Vec<Token>, _options: &ParseOptions) {
        if starts_number(cursor) {
            out.push(consume_numeric(cursor));
        } else if cursor.starts_with("-->") {
            out.push(bare(cursor, CDC, 3));
        } else if starts_ident_sequence(cursor, 0) {
            out.push(consume_ident_like(cursor));
        } else {
            out.extend(delim(cursor));
        }
    }
}

pub(super) struct DigitProducer;

impl Producer for DigitProducer {
    fn id(&self) -> &'static str {
        "digit"
    }

    fn can_produce(&self, cursor: &Cursor) -> bool {
        cursor.peek().is_some_and(|c| c.is_ascii_digit())
    }

    fn produce(&self, cursor: &mut Cursor, out: &mut Vec<Token>, _options: &ParseOptions) {
        out.push(consume_numeric(cursor));
    }
}

pub(super) struct PeriodProducer;

impl Producer for PeriodProducer {
    fn id(&self) -> &'static str {
        "period"
    }

    fn can_produce(&self, cursor: &Cursor) -> bool {
        cursor.peek() == Some('.')
    }

    fn produce(&self, cursor: &mut Cursor, out: &mut Vec<Token>, _options: &ParseOptions) {
        if starts_number(cursor) {
            out.push(consume_numeric(cursor));
        } else {
            out.extend(delim(cursor));
        }
    }
}

pub(super) struct HashProducer;

impl Producer for HashProducer {
    fn id(&self) -> &'static str {
        "hash"
    }

    fn can_produce(&self, cursor: &Cursor) -> bool {
        cursor.peek() == Some('#')
    }

    fn produce(&self, cursor: &mut Cursor, out: &mut Vec<Token>, _options: &ParseOptions) {
        let next = cursor.peek_at(1);
        if next.is_some_and(is_ident_char) || is_valid_escape(next, cursor.peek_at(2)) {
            let location = cursor.location();
            cursor.advance();
            let name = consume_ident_sequence(cursor);
            out.push(Token::text_token(HASH, name, location));
        } else {
            out.extend(delim(cursor));
        }
    }
}

/// Identifiers, functions and urls starting with an identifier character
pub(super) struct IdentProducer;

impl Producer for IdentProducer {
    fn id(&self) -> &'static str {
        "ident"
    }

    fn can_produce(&self, cursor: &Cursor) -> bool {
        cursor.peek().is_some_and(super::is_ident_start)
    }

    fn produce(&self, cursor: &mut Cursor, out: &mut Vec<Token>, _options: &ParseOptions) {
        out.push(consume_ident_like(cursor));
    }
}

pub(super) struct StringProducer;

impl Producer for StringProducer {
    fn id(&self) -> &'static str {
        "string"
    }

    fn can_produce(&self, cursor: &Cursor) -> bool {
        matches!(cursor.peek(), Some('"') | Some('\''))
    }

    fn produce(&self, cursor: &mut Cursor, out: &mut Vec<Token>, _options: &ParseOptions) {
        out.push(consume_string(cursor));
    }
}

pub(super) struct CommentProducer;

impl Producer for CommentProducer {
    fn id(&self) -> &'static str {
        "comment"
    }

    fn can_produce(&self, cursor: &Cursor) -> bool {
        cursor.starts_with("/*")
    }

    fn produce(&self, cursor: &mut Cursor, out: &mut Vec<Token>, options: &ParseOptions) {
        let location = cursor.location();
        cursor.skip(2);
        let mut text = String::new();
        while !cursor.is_eof() && !cursor.starts_with("*/") {
            text.extend(cursor.advance());
        }
        cursor.skip(2);
        if options.keep_comments {
            out.push(Token::text_token(COMMENT, text, location));
        }
    }
}

pub(super) struct LessThanProducer;

impl Producer for LessThanProducer {
    fn id(&self) -> &'static str {
        "less-than"
    }

    fn can_produce(&self, cursor: &Cursor) -> bool {
        cursor.peek() == Some('<')
    }

    fn produce(&self, cursor: &mut Cursor, out: &mut Vec<Token>, _options: &ParseOptions) {
        if cursor.starts_with("<!--") {
            out.push(bare(cursor, CDO, 4));
        } else {
            out.extend(delim(cursor));
        }
    }
}

pub(super) struct AtProducer;

impl Producer for AtProducer {
    fn id(&self) -> &'static str {
        "at"
    }

    fn can_produce(&self, cursor: &Cursor) -> bool {
        cursor.peek() == Some('@')
    }

    fn produce(&self, cursor: &mut Cursor, out: &mut Vec<Token>, _options: &ParseOptions) {
        if starts_ident_sequence(cursor, 1) {
            let location = cursor.location();
            cursor.advance();
            let name = consume_ident_sequence(cursor);
            out.push(Token::text_token(AT_KEYWORD, name, location));
        } else {
            out.extend(delim(cursor));
        }
    }
}

/// Escaped identifiers; a backslash before a newline is a delim with an error
pub(super) struct ReverseSolidusProducer;

impl Producer for ReverseSolidusProducer {
    fn id(&self) -> &'static str {
        "reverse-solidus"
    }

    fn can_produce(&self, cursor: &Cursor) -> bool {
        cursor.peek() == Some('\\')
    }

    fn produce(&self, cursor: &mut Cursor, out: &mut Vec<Token>, _options: &ParseOptions) {
        if starts_ident_sequence(cursor, 0) {
            out.push(consume_ident_like(cursor));
        } else if let Some(token) = delim(cursor) {
            out.push(token.with_error(LexError::InvalidEscape));
        }
    }
}
