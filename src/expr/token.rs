use crate::error::ExprError;
use std::fmt;

/// A lexical token of the formula language
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Number(f64),
    Ident(String),
    Plus,
    Minus,
    Star,
    Slash,
    /// The bare word `x`
    Cross,
    Dot,
    Tilde,
    Bar,
    LBracket,
    RBracket,
    LParen,
    RParen,
    Comma,
}

/// A token together with its character offset in the source
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub position: usize,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TokenKind::Number(n) => write!(f, "{}", n),
            TokenKind::Ident(name) => write!(f, "{}", name),
            TokenKind::Plus => write!(f, "+"),
            TokenKind::Minus => write!(f, "-"),
            TokenKind::Star => write!(f, "*"),
            TokenKind::Slash => write!(f, "/"),
            TokenKind::Cross => write!(f, "x"),
            TokenKind::Dot => write!(f, "."),
            TokenKind::Tilde => write!(f, "~"),
            TokenKind::Bar => write!(f, "|"),
            TokenKind::LBracket => write!(f, "["),
            TokenKind::RBracket => write!(f, "]"),
            TokenKind::LParen => write!(f, "("),
            TokenKind::RParen => write!(f, ")"),
            TokenKind::Comma => write!(f, ","),
        }
    }
}

/// Splits formula source into tokens.
///
/// Numbers are decimal with an optional fraction; a `.` only belongs to a
/// number when a digit follows it, otherwise it is the dot operator.
pub fn tokenize(source: &str) -> Result<Vec<Token>, ExprError> {
    let chars: Vec<char> = source.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let ch = chars[i];
        let start = i;

        if ch.is_whitespace() {
            i += 1;
            continue;
        }

        if ch.is_ascii_digit() {
            while i < chars.len() && chars[i].is_ascii_digit() {
                i += 1;
            }
            if i + 1 < chars.len() && chars[i] == '.' && chars[i + 1].is_ascii_digit() {
                i += 1;
                while i < chars.len() && chars[i].is_ascii_digit() {
                    i += 1;
                }
            }
            let text: String = chars[start..i].iter().collect();
            let value = text
                .parse::<f64>()
                .map_err(|_| ExprError::UnexpectedCharacter { ch, position: start })?;
            tokens.push(Token { kind: TokenKind::Number(value), position: start });
            continue;
        }

        if ch.is_ascii_alphabetic() || ch == '_' {
            while i < chars.len() && (chars[i].is_ascii_alphanumeric() || chars[i] == '_') {
                i += 1;
            }
            let word: String = chars[start..i].iter().collect();
            let kind = if word == "x" {
                TokenKind::Cross
            } else {
                TokenKind::Ident(word)
            };
            tokens.push(Token { kind, position: start });
            continue;
        }

        let kind = match ch {
            '+' => TokenKind::Plus,
            '-' => TokenKind::Minus,
            '*' => TokenKind::Star,
            '/' => TokenKind::Slash,
            '.' => TokenKind::Dot,
            '~' => TokenKind::Tilde,
            '|' => TokenKind::Bar,
            '[' => TokenKind::LBracket,
            ']' => TokenKind::RBracket,
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            ',' => TokenKind::Comma,
            other => return Err(ExprError::UnexpectedCharacter { ch: other, position: start }),
        };
        tokens.push(Token { kind, position: start });
        i += 1;
    }

    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        tokenize(source).unwrap().into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn cross_is_a_bare_x() {
        assert_eq!(
            kinds("A x Bx"),
            vec![
                TokenKind::Ident("A".into()),
                TokenKind::Cross,
                TokenKind::Ident("Bx".into()),
            ]
        );
    }

    #[test]
    fn dot_between_identifiers_is_an_operator() {
        assert_eq!(
            kinds("W.[0,0,1]"),
            vec![
                TokenKind::Ident("W".into()),
                TokenKind::Dot,
                TokenKind::LBracket,
                TokenKind::Number(0.0),
                TokenKind::Comma,
                TokenKind::Number(0.0),
                TokenKind::Comma,
                TokenKind::Number(1.0),
                TokenKind::RBracket,
            ]
        );
    }

    #[test]
    fn decimal_numbers_keep_their_fraction() {
        assert_eq!(kinds("0.25 * t"), vec![
            TokenKind::Number(0.25),
            TokenKind::Star,
            TokenKind::Ident("t".into()),
        ]);
    }

    #[test]
    fn unknown_characters_are_rejected_with_position() {
        assert_eq!(
            tokenize("A # B"),
            Err(ExprError::UnexpectedCharacter { ch: '#', position: 2 })
        );
    }
}
