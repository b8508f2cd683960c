pub mod token;

use crate::diagnostics::CompileError;
use crate::span::{Span, Spanned};
use logos::Logos;
use token::Token;

/// Tokenizes `source`, dropping comments and collapsing runs of blank
/// lines into a single `Newline`. Any character the lexer can't match
/// is a syntax error at its byte position.
pub fn lex(source: &str) -> Result<Vec<Spanned<Token>>, CompileError> {
    let mut tokens = Vec::new();
    let mut lexer = Token::lexer(source);

    while let Some(result) = lexer.next() {
        let span = lexer.span();
        match result {
            Ok(Token::Comment) => continue,
            Ok(tok) => tokens.push(Spanned::new(tok, Span::new(span.start, span.end))),
            Err(()) => {
                return Err(CompileError::syntax(
                    format!("unexpected character '{}'", &source[span.start..span.end]),
                    Span::new(span.start, span.end),
                ));
            }
        }
    }

    Ok(tokens)
}
