/*!
# Lexical Analyzer

logos-based tokenizer for the edited language. Whitespace, `//` line comments
and a leading byte order mark are skipped; token spans are byte offsets into the
unmodified input, so they line up with the offsets the incremental core uses.
*/

use logos::Logos;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::core::position::PackedSpan;

/// Token types of the language
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[logos(skip r"[ \t\r\n\f]+|//[^\n]*|\x{FEFF}")]
pub enum TokenKind {
    // Keywords
    #[token("fun")]
    Fun,
    #[token("val")]
    Val,
    #[token("class")]
    Class,
    #[token("return")]
    Return,
    #[token("true")]
    True,
    #[token("false")]
    False,

    // Punctuation
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token(":")]
    Colon,
    #[token(",")]
    Comma,
    #[token(";")]
    Semicolon,
    #[token("=")]
    Assign,
    #[token(".")]
    Dot,

    // Arithmetic operators
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,

    // Literals
    #[regex(r#""([^"\\\n]|\\.)*""#)]
    StringLiteral,
    #[regex(r"[0-9]+")]
    IntLiteral,

    // Identifiers (keywords win on equal length)
    #[regex(r"[A-Za-z_][A-Za-z0-9_]*", priority = 1)]
    Identifier,

    /// Input logos could not match (never produced by logos itself).
    Error,
}

impl TokenKind {
    pub fn is_keyword(self) -> bool {
        matches!(self, TokenKind::Fun | TokenKind::Val | TokenKind::Class | TokenKind::Return | TokenKind::True | TokenKind::False)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            TokenKind::Fun => "fun",
            TokenKind::Val => "val",
            TokenKind::Class => "class",
            TokenKind::Return => "return",
            TokenKind::True => "true",
            TokenKind::False => "false",
            TokenKind::LParen => "(",
            TokenKind::RParen => ")",
            TokenKind::LBrace => "{",
            TokenKind::RBrace => "}",
            TokenKind::Colon => ":",
            TokenKind::Comma => ",",
            TokenKind::Semicolon => ";",
            TokenKind::Assign => "=",
            TokenKind::Dot => ".",
            TokenKind::Plus => "+",
            TokenKind::Minus => "-",
            TokenKind::Star => "*",
            TokenKind::Slash => "/",
            TokenKind::StringLiteral => "string literal",
            TokenKind::IntLiteral => "integer literal",
            TokenKind::Identifier => "identifier",
            TokenKind::Error => "unknown character",
        };
        f.write_str(text)
    }
}

/// Token with its byte span
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: PackedSpan,
}

impl Token {
    pub fn text<'a>(&self, source: &'a str) -> &'a str {
        &source[self.span.start as usize..self.span.end() as usize]
    }
}

/// Tokenize the whole input. Unmatched input becomes `TokenKind::Error`
/// tokens instead of aborting, so the parser can recover around them.
pub fn tokenize(input: &str) -> Vec<Token> {
    TokenKind::lexer(input)
        .spanned()
        .map(|(result, range)| Token {
            kind: result.unwrap_or(TokenKind::Error),
            span: PackedSpan::between(range.start as u32, range.end as u32),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<TokenKind> {
        tokenize(input).into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_basic_tokenization() {
        let input = "fun g(x: Int): Int = x + 1";
        assert_eq!(
            kinds(input),
            vec![
                TokenKind::Fun,
                TokenKind::Identifier,
                TokenKind::LParen,
                TokenKind::Identifier,
                TokenKind::Colon,
                TokenKind::Identifier,
                TokenKind::RParen,
                TokenKind::Colon,
                TokenKind::Identifier,
                TokenKind::Assign,
                TokenKind::Identifier,
                TokenKind::Plus,
                TokenKind::IntLiteral,
            ]
        );
        let tokens = tokenize(input);
        assert_eq!(tokens[1].text(input), "g");
        assert_eq!(tokens[1].span, PackedSpan::new(4, 1));
    }

    #[test]
    fn test_keywords_vs_identifiers() {
        assert_eq!(kinds("fun funny valid val"), vec![TokenKind::Fun, TokenKind::Identifier, TokenKind::Identifier, TokenKind::Val]);
        assert!(TokenKind::Return.is_keyword());
        assert!(!TokenKind::Identifier.is_keyword());
    }

    #[test]
    fn test_comments_and_strings() {
        let input = "// header\nval s = \"a // not a comment\" // trailing";
        assert_eq!(kinds(input), vec![TokenKind::Val, TokenKind::Identifier, TokenKind::Assign, TokenKind::StringLiteral]);
        let tokens = tokenize(input);
        assert_eq!(tokens[3].text(input), "\"a // not a comment\"");
    }

    #[test]
    fn test_unknown_characters_and_bom() {
        assert_eq!(kinds("1 @ 2"), vec![TokenKind::IntLiteral, TokenKind::Error, TokenKind::IntLiteral]);
        let with_bom = "\u{FEFF}val";
        let tokens = tokenize(with_bom);
        assert_eq!(tokens.len(), 1);
        // BOM занимает 3 байта, смещения не сдвигаются
        assert_eq!(tokens[0].span, PackedSpan::new(3, 3));
    }

    #[test]
    fn test_empty_input() {
        assert!(tokenize("").is_empty());
        assert!(tokenize("  \n // only comment").is_empty());
    }
}
