//! CSS dialect
//!
//! Token types and producers for CSS Syntax Level 3 style input.

mod lex;
mod producers;

use std::sync::LazyLock;

pub use lex::{
    consume_escape, consume_ident_sequence, is_ident_char, is_ident_start, is_whitespace,
    starts_ident_sequence, starts_number,
};

use crate::options::ParseOptions;
use crate::token::Token;
use crate::token_type::TokenType;
use crate::tokenizer::{Dialect, Tokenizer};

/// Dialect name of the CSS token types
pub const DIALECT: &str = "css";

pub const STRING: TokenType = TokenType::new(DIALECT, "string").encoder(encode_string);
pub const BAD_STRING: TokenType = TokenType::new(DIALECT, "bad-string").error().encoder(encode_string);
pub const IDENT: TokenType = TokenType::new(DIALECT, "ident").encoder(encode_ident);
pub const FUNCTION: TokenType = TokenType::new(DIALECT, "function").encoder(encode_function);
pub const URL: TokenType = TokenType::new(DIALECT, "url").encoder(encode_url);
pub const BAD_URL: TokenType = TokenType::new(DIALECT, "bad-url").error().encoder(encode_url);
pub const WHITESPACE: TokenType = TokenType::new(DIALECT, "whitespace").whitespace().raw(" ");
pub const COMMENT: TokenType = TokenType::new(DIALECT, "comment").whitespace().encoder(encode_comment);
pub const HASH: TokenType = TokenType::new(DIALECT, "hash").encoder(encode_hash);
pub const DELIM: TokenType = TokenType::new(DIALECT, "delim");
pub const NUMBER: TokenType = TokenType::new(DIALECT, "number");
pub const DIMENSION: TokenType = TokenType::new(DIALECT, "dimension");
pub const PERCENTAGE: TokenType = TokenType::new(DIALECT, "percentage");
pub const BAD_NUMBER: TokenType = TokenType::new(DIALECT, "bad-number").error();
pub const CDO: TokenType = TokenType::new(DIALECT, "cdo").raw("<!--");
pub const CDC: TokenType = TokenType::new(DIALECT, "cdc").raw("-->");
pub const AT_KEYWORD: TokenType = TokenType::new(DIALECT, "at-keyword").encoder(encode_at_keyword);
pub const SEMICOLON: TokenType = TokenType::new(DIALECT, "semicolon").raw(";");
pub const COLON: TokenType = TokenType::new(DIALECT, "colon").raw(":");
pub const COMMA: TokenType = TokenType::new(DIALECT, "comma").raw(",");
pub const OPEN_PAREN: TokenType = TokenType::new(DIALECT, "(").raw("(");
pub const CLOSE_PAREN: TokenType = TokenType::new(DIALECT, ")").raw(")");
pub const OPEN_BRACKET: TokenType = TokenType::new(DIALECT, "[").raw("[");
pub const CLOSE_BRACKET: TokenType = TokenType::new(DIALECT, "]").raw("]");
pub const OPEN_BRACE: TokenType = TokenType::new(DIALECT, "{").raw("{");
pub const CLOSE_BRACE: TokenType = TokenType::new(DIALECT, "}").raw("}");

/// Consumed simple block, produced by the component value consumer
pub const SIMPLE_BLOCK: TokenType = TokenType::new(DIALECT, "simple-block");
/// Consumed function, produced by the component value consumer
pub const FUNCTION_BLOCK: TokenType = TokenType::new(DIALECT, "function-block");

/// Every CSS token type
pub const TOKEN_TYPES: &[TokenType] = &[
    STRING, BAD_STRING, IDENT, FUNCTION, URL, BAD_URL, WHITESPACE, COMMENT, HASH, DELIM, NUMBER,
    DIMENSION, PERCENTAGE, BAD_NUMBER, CDO, CDC, AT_KEYWORD, SEMICOLON, COLON, COMMA, OPEN_PAREN,
    CLOSE_PAREN, OPEN_BRACKET, CLOSE_BRACKET, OPEN_BRACE, CLOSE_BRACE, SIMPLE_BLOCK,
    FUNCTION_BLOCK,
];

static CSS: LazyLock<Dialect> = LazyLock::new(|| {
    Dialect::builder(DIALECT)
        .token_types(TOKEN_TYPES)
        .producer(producers::WhitespaceProducer)
        .producer(producers::PunctuationProducer)
        .producer(producers::PlusProducer)
        .producer(producers::MinusProducer)
        .producer(producers::DigitProducer)
        .producer(producers::PeriodProducer)
        .producer(producers::HashProducer)
        .producer(producers::IdentProducer)
        .producer(producers::StringProducer)
        .producer(producers::CommentProducer)
        .producer(producers::LessThanProducer)
        .producer(producers::AtProducer)
        .producer(producers::ReverseSolidusProducer)
        .fallback(DELIM)
        .filter(filter_input)
        .build()
        .expect("CSS token types and producers are registered once")
});

/// The shared CSS dialect
pub fn dialect() -> &'static Dialect {
    &CSS
}

/// Tokenize CSS with default options
pub fn tokenize(input: &str) -> Vec<Token> {
    dialect().tokenize(input)
}

/// Tokenize CSS with explicit options
pub fn tokenize_with(input: &str, options: &ParseOptions) -> Vec<Token> {
    Tokenizer::with_options(dialect(), options.clone()).tokenize(input)
}

/// Closing token type for an opening bracket type
pub fn closing_for(opening: TokenType) -> Option<TokenType> {
    if opening == OPEN_BRACE {
        Some(CLOSE_BRACE)
    } else if opening == OPEN_BRACKET {
        Some(CLOSE_BRACKET)
    } else if opening == OPEN_PAREN {
        Some(CLOSE_PAREN)
    } else {
        None
    }
}

/// Is this a delim token holding `c`
pub fn is_delim(token: &Token, c: char) -> bool {
    token.is_char(DELIM, c)
}

/// Normalize newlines and replace NUL with U+FFFD
fn filter_input(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
                out.push('\n');
            }
            '\x0C' => out.push('\n'),
            '\0' => out.push('\u{FFFD}'),
            c => out.push(c),
        }
    }
    out
}

fn encode_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\a "),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Characters a plain backslash cannot escape
fn needs_hex_escape(c: char) -> bool {
    c == '\n' || (c.is_control() && c != '\t')
}

/// Write `c` as a hex escape; the trailing space ends the escape
fn push_hex_escape(out: &mut String, c: char) {
    out.push_str(&format!("\\{:x} ", c as u32));
}

/// Escape `value` so that it lexes back as one identifier
///
/// A name that would otherwise start a number or stand alone as `-` gets
/// its leading character escaped.
fn push_ident(out: &mut String, value: &str) {
    if value == "-" {
        out.push_str("\\-");
        return;
    }
    let leading_hyphen = value.starts_with('-');
    for (i, c) in value.chars().enumerate() {
        let numeric_start = c.is_ascii_digit() && (i == 0 || (i == 1 && leading_hyphen));
        if numeric_start || needs_hex_escape(c) {
            push_hex_escape(out, c);
        } else if is_ident_char(c) {
            out.push(c);
        } else {
            out.push('\\');
            out.push(c);
        }
    }
}

/// Escape `value` as the name after `#`, where a leading digit is allowed
fn push_hash_name(out: &mut String, value: &str) {
    for c in value.chars() {
        if needs_hex_escape(c) {
            push_hex_escape(out, c);
        } else if is_ident_char(c) {
            out.push(c);
        } else {
            out.push('\\');
            out.push(c);
        }
    }
}

fn encode_ident(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    push_ident(&mut out, value);
    out
}

fn encode_function(name: &str) -> String {
    let mut out = encode_ident(name);
    out.push('(');
    out
}

fn encode_url(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 5);
    out.push_str("url(");
    for c in value.chars() {
        match c {
            '(' | ')' | '"' | '\'' | '\\' => {
                out.push('\\');
                out.push(c);
            }
            c if needs_hex_escape(c) => push_hex_escape(&mut out, c),
            ' ' | '\t' => {
                out.push('\\');
                out.push(c);
            }
            c => out.push(c),
        }
    }
    out.push(')');
    out
}

fn encode_comment(value: &str) -> String {
    format!("/*{}*/", value)
}

fn encode_hash(value: &str) -> String {
    let mut out = String::from("#");
    push_hash_name(&mut out, value);
    out
}

fn encode_at_keyword(value: &str) -> String {
    let mut out = String::from("@");
    push_ident(&mut out, value);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::{to_text, Number, TokenValue};

    fn kinds(input: &str) -> Vec<TokenType> {
        tokenize(input).iter().map(|t| t.kind).collect()
    }

    fn significant(input: &str) -> Vec<Token> {
        tokenize(input)
            .into_iter()
            .filter(|t| !t.is_whitespace() && !t.is_eof())
            .collect()
    }

    #[test]
    fn test_simple_rule() {
        assert_eq!(
            kinds(".a{color:red}"),
            vec![DELIM, IDENT, OPEN_BRACE, IDENT, COLON, IDENT, CLOSE_BRACE, TokenType::EOF]
        );
    }

    #[test]
    fn test_always_ends_with_eof() {
        for input in ["", "a", "\"unterminated", "/* open", "url(x", "1e+", "\\", "@", "\0"] {
            let tokens = tokenize(input);
            assert!(tokens.last().unwrap().is_eof(), "input {:?}", input);
            assert_eq!(tokens.iter().filter(|t| t.is_eof()).count(), 1);
        }
    }

    #[test]
    fn test_numbers() {
        let tokens = significant("12 -3.5 +.5 1e3 50% 10px 1em");
        assert_eq!(tokens[0].value, TokenValue::Number(Number::Integer(12)));
        assert_eq!(tokens[1].value, TokenValue::Number(Number::Float(-3.5)));
        assert_eq!(tokens[2].value, TokenValue::Number(Number::Float(0.5)));
        assert_eq!(tokens[3].value, TokenValue::Number(Number::Float(1000.0)));
        assert_eq!(tokens[4].kind, PERCENTAGE);
        assert_eq!(tokens[4].unit(), Some("%"));
        assert_eq!(tokens[5].kind, DIMENSION);
        assert_eq!(tokens[5].unit(), Some("px"));
        assert_eq!(tokens[6].unit(), Some("em"));
        assert_eq!(tokens[6].as_number(), Some(Number::Integer(1)));
    }

    #[test]
    fn test_bad_numbers() {
        let tokens = significant("1.2.3");
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].kind, BAD_NUMBER);
        assert_eq!(tokens[0].error_message(), Some("Multiple decimal points in a number token"));

        let tokens = significant("1e2.5");
        assert_eq!(tokens[0].kind, BAD_NUMBER);
        assert_eq!(
            tokens[0].error_message(),
            Some("Decimals not allowed in exponent part of a number")
        );

        let tokens = significant("3e+px");
        assert_eq!(tokens[0].kind, BAD_NUMBER);
        assert_eq!(tokens[0].error_message(), Some("Exponent with no numeric input"));
        assert_eq!(tokens.len(), 1);
    }

    #[test]
    fn test_strings() {
        let tokens = significant(r#""a\"b" 'c\41 d'"#);
        assert_eq!(tokens[0].kind, STRING);
        assert_eq!(tokens[0].as_str(), Some("a\"b"));
        assert_eq!(tokens[1].as_str(), Some("cAd"));
    }

    #[test]
    fn test_bad_strings() {
        let tokens = tokenize("\"abc\ndef");
        assert_eq!(tokens[0].kind, BAD_STRING);
        assert_eq!(tokens[0].error_message(), Some("Illegal newline in string value"));
        assert_eq!(tokens[1].kind, WHITESPACE);

        let tokens = tokenize("'abc");
        assert_eq!(tokens[0].kind, BAD_STRING);
        assert_eq!(tokens[0].error_message(), Some("Unterminated string value; EOF reached"));
    }

    #[test]
    fn test_string_line_continuation() {
        let tokens = tokenize("\"a\\\nb\"");
        assert_eq!(tokens[0].as_str(), Some("ab"));
    }

    #[test]
    fn test_escape_replacement() {
        let tokens = significant(r"'\0 \110000 \D800 x'");
        assert_eq!(tokens[0].as_str(), Some("\u{FFFD}\u{FFFD}\u{FFFD}x"));
    }

    #[test]
    fn test_identifiers() {
        let tokens = significant("-moz-box --custom _x \\31 a émoji");
        assert!(tokens.iter().all(|t| t.kind == IDENT), "{:?}", tokens);
        assert_eq!(tokens[0].as_str(), Some("-moz-box"));
        assert_eq!(tokens[1].as_str(), Some("--custom"));
        assert_eq!(tokens[3].as_str(), Some("1a"));
        assert_eq!(tokens[4].as_str(), Some("émoji"));
    }

    #[test]
    fn test_functions_and_urls() {
        let tokens = significant("rgb( url(a.png) url( \"b.png\" ) url(bad\"x)");
        assert_eq!(tokens[0].kind, FUNCTION);
        assert_eq!(tokens[0].as_str(), Some("rgb"));
        assert_eq!(tokens[1].kind, URL);
        assert_eq!(tokens[1].as_str(), Some("a.png"));
        assert_eq!(tokens[2].kind, FUNCTION);
        assert_eq!(tokens[3].kind, STRING);
        assert_eq!(tokens[4].kind, CLOSE_PAREN);
        assert_eq!(tokens[5].kind, BAD_URL);
    }

    #[test]
    fn test_hash_at_and_delims() {
        let tokens = significant("#fff #-x # @media @ < <!-- --> - +");
        assert_eq!(tokens[0].kind, HASH);
        assert_eq!(tokens[0].as_str(), Some("fff"));
        assert_eq!(tokens[1].kind, HASH);
        assert!(is_delim(&tokens[2], '#'));
        assert_eq!(tokens[3].kind, AT_KEYWORD);
        assert_eq!(tokens[3].as_str(), Some("media"));
        assert!(is_delim(&tokens[4], '@'));
        assert!(is_delim(&tokens[5], '<'));
        assert_eq!(tokens[6].kind, CDO);
        assert_eq!(tokens[7].kind, CDC);
        assert!(is_delim(&tokens[8], '-'));
        assert!(is_delim(&tokens[9], '+'));
    }

    #[test]
    fn test_comments_dropped_or_kept() {
        assert_eq!(kinds("a/* hi */b"), vec![IDENT, IDENT, TokenType::EOF]);
        let options = ParseOptions::new().with_keep_comments(true);
        let tokens = tokenize_with("a/* hi */b", &options);
        assert_eq!(tokens[1].kind, COMMENT);
        assert_eq!(tokens[1].as_str(), Some(" hi "));
    }

    #[test]
    fn test_input_filter() {
        let tokens = tokenize("a\r\nb\0");
        assert_eq!(tokens[2].location.line, 2);
        assert_eq!(tokens[2].as_str(), Some("b\u{FFFD}"));
    }

    #[test]
    fn test_lone_backslash() {
        let tokens = tokenize("\\\n");
        assert!(is_delim(&tokens[0], '\\'));
        assert!(tokens[0].is_error());
    }

    #[test]
    fn test_re_emission() {
        let input = "a{color:\"x\\\"y\";width:10px;b:url(c) #d @e}";
        let text = to_text(&tokenize(input));
        assert_eq!(text, input);
    }

    #[test]
    fn test_string_encoding_round_trips() {
        let original = "line\nquote\" slash\\";
        let text = STRING.encode(original);
        let tokens = tokenize(&text);
        assert_eq!(tokens[0].as_str(), Some(original));
    }

    #[test]
    fn test_ident_encoding_round_trips() {
        for name in ["a b", "1a", "-2x", "-", "a.b", "x\ny", "tab\there", "plain-name"] {
            let text = IDENT.encode(name);
            let tokens = significant(&text);
            assert_eq!(tokens.len(), 1, "{:?} encoded as {:?}", name, text);
            assert_eq!(tokens[0].kind, IDENT, "{:?} encoded as {:?}", name, text);
            assert_eq!(tokens[0].as_str(), Some(name));
        }

        let tokens = significant(r"a\ b");
        assert_eq!(tokens.len(), 1);
        assert_eq!(to_text(&tokens), r"a\ b");

        let text = AT_KEYWORD.encode("my rule");
        assert_eq!(significant(&text)[0].as_str(), Some("my rule"));
        let text = HASH.encode("1 a");
        assert_eq!(significant(&text)[0].kind, HASH);
        assert_eq!(significant(&text)[0].as_str(), Some("1 a"));
    }

    #[test]
    fn test_url_encoding_round_trips() {
        for value in ["a.png", "a b.png", "f(x).png", "quote\"s'", "back\\slash", "line\nbreak"] {
            let text = URL.encode(value);
            let tokens = significant(&text);
            assert_eq!(tokens.len(), 1, "{:?} encoded as {:?}", value, text);
            assert_eq!(tokens[0].kind, URL, "{:?} encoded as {:?}", value, text);
            assert_eq!(tokens[0].as_str(), Some(value));
        }
    }

    #[test]
    fn test_locations() {
        let tokens = tokenize("a\n  b");
        let b = tokens.iter().find(|t| t.as_str() == Some("b")).unwrap();
        assert_eq!((b.location.line, b.location.column), (2, 3));
    }
}
