//! JSON5 dialect
//!
//! Tokens for JSON5 documents. Newlines become core `EOL` tokens so strategies
//! can gate on line ends.

use std::sync::LazyLock;

use crate::cursor::Cursor;
use crate::error::LexError;
use crate::options::ParseOptions;
use crate::token::{Number, Token, TokenValue};
use crate::token_type::TokenType;
use crate::tokenizer::{Dialect, Producer};

/// Dialect name of the JSON5 token types
pub const DIALECT: &str = "json5";

pub const OPEN_ARRAY: TokenType = TokenType::new(DIALECT, "[").raw("[");
pub const CLOSE_ARRAY: TokenType = TokenType::new(DIALECT, "]").raw("]");
pub const OPEN_OBJECT: TokenType = TokenType::new(DIALECT, "{").raw("{");
pub const CLOSE_OBJECT: TokenType = TokenType::new(DIALECT, "}").raw("}");
pub const COMMA: TokenType = TokenType::new(DIALECT, "comma").raw(",");
pub const COLON: TokenType = TokenType::new(DIALECT, "colon").raw(":");
pub const BOOLEAN: TokenType = TokenType::new(DIALECT, "boolean");
pub const NULL: TokenType = TokenType::new(DIALECT, "null").raw("null");
pub const STRING: TokenType = TokenType::new(DIALECT, "string").encoder(encode_string);
pub const BAD_STRING: TokenType = TokenType::new(DIALECT, "bad-string").error().encoder(encode_string);
pub const NUMBER: TokenType = TokenType::new(DIALECT, "number");
pub const BAD_NUMBER: TokenType = TokenType::new(DIALECT, "bad-number").error();
pub const IDENT: TokenType = TokenType::new(DIALECT, "ident");
pub const WHITESPACE: TokenType = TokenType::new(DIALECT, "whitespace").whitespace().raw(" ");

pub const TOKEN_TYPES: &[TokenType] = &[
    OPEN_ARRAY, CLOSE_ARRAY, OPEN_OBJECT, CLOSE_OBJECT, COMMA, COLON, BOOLEAN, NULL, STRING,
    BAD_STRING, NUMBER, BAD_NUMBER, IDENT, WHITESPACE,
];

static JSON5: LazyLock<Dialect> = LazyLock::new(|| {
    Dialect::builder(DIALECT)
        .token_types(TOKEN_TYPES)
        .producer(WhitespaceProducer)
        .producer(NewlineProducer)
        .producer(PunctuationProducer)
        .producer(CommentProducer)
        .producer(StringProducer)
        .producer(NumberProducer)
        .producer(WordProducer)
        .build()
        .expect("JSON5 token types and producers are registered once")
});

/// The shared JSON5 dialect
pub fn dialect() -> &'static Dialect {
    &JSON5
}

pub fn tokenize(input: &str) -> Vec<Token> {
    dialect().tokenize(input)
}

fn encode_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

fn is_word_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '$'
}

fn is_word_char(c: char) -> bool {
    is_word_start(c) || c.is_ascii_digit()
}

struct WhitespaceProducer;

impl Producer for WhitespaceProducer {
    fn id(&self) -> &'static str {
        "whitespace"
    }

    fn can_produce(&self, cursor: &Cursor) -> bool {
        cursor.peek().is_some_and(|c| c != '\n' && c.is_whitespace())
    }

    fn produce(&self, cursor: &mut Cursor, out: &mut Vec<Token>, _options: &ParseOptions) {
        let location = cursor.location();
        cursor.consume_while(|c| c != '\n' && c.is_whitespace());
        out.push(Token::bare(WHITESPACE, location));
    }
}

struct NewlineProducer;

impl Producer for NewlineProducer {
    fn id(&self) -> &'static str {
        "newline"
    }

    fn can_produce(&self, cursor: &Cursor) -> bool {
        cursor.peek() == Some('\n')
    }

    fn produce(&self, cursor: &mut Cursor, out: &mut Vec<Token>, _options: &ParseOptions) {
        let location = cursor.location();
        cursor.advance();
        out.push(Token::bare(TokenType::EOL, location));
    }
}

struct PunctuationProducer;

impl PunctuationProducer {
    fn kind(c: char) -> Option<TokenType> {
        Some(match c {
            '[' => OPEN_ARRAY,
            ']' => CLOSE_ARRAY,
            '{' => OPEN_OBJECT,
            '}' => CLOSE_OBJECT,
            ',' => COMMA,
            ':' => COLON,
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
        let location = cursor.location();
        if let Some(kind) = cursor.advance().and_then(Self::kind) {
            out.push(Token::bare(kind, location));
        }
    }
}

/// Line and block comments; never emits tokens
struct CommentProducer;

impl Producer for CommentProducer {
    fn id(&self) -> &'static str {
        "comment"
    }

    fn can_produce(&self, cursor: &Cursor) -> bool {
        cursor.starts_with("//") || cursor.starts_with("/*")
    }

    fn produce(&self, cursor: &mut Cursor, _out: &mut Vec<Token>, _options: &ParseOptions) {
        if cursor.starts_with("//") {
            cursor.consume_while(|c| c != '\n');
        } else {
            cursor.skip(2);
            while !cursor.is_eof() && !cursor.starts_with("*/") {
                cursor.advance();
            }
            cursor.skip(2);
        }
    }
}

struct StringProducer;

impl StringProducer {
    fn hex(cursor: &mut Cursor, len: usize) -> Option<char> {
        let digits: String = (0..len).filter_map(|i| cursor.peek_at(i)).collect();
        if digits.chars().count() != len || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        cursor.skip(len);
        u32::from_str_radix(&digits, 16).ok().and_then(char::from_u32)
    }
}

impl Producer for StringProducer {
    fn id(&self) -> &'static str {
        "string"
    }

    fn can_produce(&self, cursor: &Cursor) -> bool {
        matches!(cursor.peek(), Some('"') | Some('\''))
    }

    fn produce(&self, cursor: &mut Cursor, out: &mut Vec<Token>, _options: &ParseOptions) {
        let location = cursor.location();
        let quote = cursor.advance();
        let mut value = String::new();
        let mut error = None;

        loop {
            match cursor.peek() {
                None => {
                    error.get_or_insert(LexError::UnterminatedString);
                    break;
                }
                Some('\n') => {
                    error.get_or_insert(LexError::NewlineInString);
                    break;
                }
                Some(c) if Some(c) == quote => {
                    cursor.advance();
                    break;
                }
                Some('\\') => {
                    cursor.advance();
                    let Some(escaped) = cursor.advance() else {
                        continue;
                    };
                    let decoded = match escaped {
                        'b' => Some('\u{8}'),
                        'f' => Some('\u{C}'),
                        'n' => Some('\n'),
                        'r' => Some('\r'),
                        't' => Some('\t'),
                        'v' => Some('\u{B}'),
                        '0' => Some('\0'),
                        'x' => Self::hex(cursor, 2),
                        'u' => Self::hex(cursor, 4),
                        '\n' => continue,
                        c => Some(c),
                    };
                    match decoded {
                        Some(c) => value.push(c),
                        None => {
                            error.get_or_insert(LexError::IllegalStringEscape { character: escaped });
                        }
                    }
                }
                Some(c) => {
                    value.push(c);
                    cursor.advance();
                }
            }
        }

        out.push(match error {
            Some(error) => Token::text_token(BAD_STRING, value, location).with_error(error),
            None => Token::text_token(STRING, value, location),
        });
    }
}

struct NumberProducer;

impl NumberProducer {
    fn consume(cursor: &mut Cursor) -> Result<Number, LexError> {
        let mut repr = String::new();
        if let Some(sign @ ('+' | '-')) = cursor.peek() {
            repr.push(sign);
            cursor.advance();
        }
        let negative = repr == "-";

        if cursor.starts_with("Infinity") {
            cursor.skip(8);
            return Ok(Number::Float(if negative { f64::NEG_INFINITY } else { f64::INFINITY }));
        }
        if cursor.starts_with("NaN") {
            cursor.skip(3);
            return Ok(Number::Float(f64::NAN));
        }
        if cursor.starts_with("0x") || cursor.starts_with("0X") {
            cursor.skip(2);
            let digits = cursor.consume_while(|c| c.is_ascii_hexdigit());
            return i64::from_str_radix(&digits, 16)
                .map(|v| Number::Integer(if negative { -v } else { v }))
                .map_err(|_| LexError::UnparseableNumber { text: format!("{}0x{}", repr, digits) });
        }

        let mut integer = true;
        let digits = cursor.consume_while(|c| c.is_ascii_digit());
        let mut has_digits = !digits.is_empty();
        repr.push_str(&digits);

        if cursor.peek() == Some('.') {
            cursor.advance();
            let fraction = cursor.consume_while(|c| c.is_ascii_digit());
            has_digits |= !fraction.is_empty();
            repr.push('.');
            repr.push_str(&fraction);
            integer = false;
            if cursor.peek() == Some('.') {
                cursor.consume_while(|c| c.is_ascii_digit() || c == '.');
                return Err(LexError::MultipleDecimalPoints);
            }
        }
        if !has_digits {
            return Err(LexError::UnparseableNumber { text: repr });
        }

        if matches!(cursor.peek(), Some('e') | Some('E')) {
            cursor.advance();
            repr.push('e');
            if let Some(sign @ ('+' | '-')) = cursor.peek() {
                repr.push(sign);
                cursor.advance();
            }
            let exponent = cursor.consume_while(|c| c.is_ascii_digit());
            if exponent.is_empty() {
                return Err(LexError::ExponentWithoutDigits);
            }
            repr.push_str(&exponent);
            integer = false;
            if cursor.peek() == Some('.') {
                cursor.consume_while(|c| c.is_ascii_digit() || c == '.');
                return Err(LexError::DecimalInExponent);
            }
        }

        // "5." and ".5" are valid JSON5 but not valid Rust float syntax
        let repr = repr.replace("-.", "-0.").replace("+.", "+0.");
        let repr = if repr.starts_with('.') { format!("0{}", repr) } else { repr };
        let repr = if repr.ends_with('.') { format!("{}0", repr) } else { repr.replace(".e", ".0e") };
        Number::parse(&repr, integer).ok_or(LexError::UnparseableNumber { text: repr })
    }
}

impl Producer for NumberProducer {
    fn id(&self) -> &'static str {
        "number"
    }

    fn can_produce(&self, cursor: &Cursor) -> bool {
        match cursor.peek() {
            Some('+') | Some('-') | Some('.') => true,
            Some(c) => c.is_ascii_digit(),
            None => false,
        }
    }

    fn produce(&self, cursor: &mut Cursor, out: &mut Vec<Token>, _options: &ParseOptions) {
        let location = cursor.location();
        let start = cursor.position();
        let token = match Self::consume(cursor) {
            Ok(number) => Token::new(NUMBER, TokenValue::Number(number), location),
            Err(error) => Token::bare(BAD_NUMBER, location).with_error(error),
        };
        if cursor.position() == start {
            cursor.advance();
        }
        out.push(token);
    }
}

/// `true`, `false`, `null` and bare identifiers
struct WordProducer;

impl Producer for WordProducer {
    fn id(&self) -> &'static str {
        "word"
    }

    fn can_produce(&self, cursor: &Cursor) -> bool {
        cursor.peek().is_some_and(is_word_start)
    }

    fn produce(&self, cursor: &mut Cursor, out: &mut Vec<Token>, _options: &ParseOptions) {
        let location = cursor.location();
        let word = cursor.consume_while(is_word_char);
        out.push(match word.as_str() {
            "true" => Token::new(BOOLEAN, TokenValue::Bool(true), location),
            "false" => Token::new(BOOLEAN, TokenValue::Bool(false), location),
            "null" => Token::bare(NULL, location),
            "Infinity" => Token::new(NUMBER, TokenValue::Number(Number::Float(f64::INFINITY)), location),
            "NaN" => Token::new(NUMBER, TokenValue::Number(Number::Float(f64::NAN)), location),
            _ => Token::text_token(IDENT, word, location),
        });
    }
}
