use logos::Logos;

/// Rejects `1.` (a digit run followed by a dot not itself followed by a
/// digit): the language requires `1.0`, never a bare trailing dot.
fn lex_int(lex: &mut logos::Lexer<Token>) -> Result<i64, ()> {
    let rest = lex.remainder();
    if rest.starts_with('.') && !rest[1..].starts_with(|c: char| c.is_ascii_digit()) {
        return Err(());
    }
    lex.slice().parse().map_err(|_| ())
}

#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t]+")]
#[logos(error = ())]
pub enum Token {
    #[token("guarantee")]
    Guarantee,
    #[token("typegroup")]
    TypeGroup,
    #[token("register")]
    Register,
    #[token("impl")]
    Impl,
    #[token("func")]
    Func,
    #[token("sig")]
    Sig,
    #[token("require")]
    Require,
    #[token("failure")]
    Failure,
    #[token("return")]
    Return,
    #[token("guarantees")]
    Guarantees,
    #[token("in")]
    In,
    #[token("builtin")]
    Builtin,
    #[token("try")]
    Try,
    #[token("catch")]
    Catch,
    #[token("let")]
    Let,
    #[token("var")]
    Var,

    #[regex(r"[0-9]+", lex_int)]
    IntLit(i64),

    #[regex(r"[0-9]+\.[0-9]+", |lex| lex.slice().parse::<f64>().ok())]
    FloatLit(f64),

    #[regex(r"[A-Za-z_][A-Za-z0-9_]*", |lex| lex.slice().to_string())]
    Ident(String),

    #[token("->")]
    Arrow,
    #[token("|")]
    Pipe,
    #[token("@")]
    At,
    #[token(".")]
    Dot,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token(":")]
    Colon,
    #[token(",")]
    Comma,
    #[token("=")]
    Eq,

    #[regex(r"\n[\n \t]*")]
    Newline,

    #[regex(r"//[^\n]*")]
    Comment,
}

impl Token {
    /// True for the fixed keyword set; used by the parser to tell a
    /// reserved word apart from an identifier with the same spelling
    /// would be impossible, since the lexer already resolves keywords
    /// to their own variants.
    pub fn is_keyword(&self) -> bool {
        matches!(
            self,
            Token::Guarantee
                | Token::TypeGroup
                | Token::Register
                | Token::Impl
                | Token::Func
                | Token::Sig
                | Token::Require
                | Token::Failure
                | Token::Return
                | Token::Guarantees
                | Token::In
                | Token::Builtin
                | Token::Try
                | Token::Catch
                | Token::Let
                | Token::Var
        )
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::Guarantee => write!(f, "guarantee"),
            Token::TypeGroup => write!(f, "typegroup"),
            Token::Register => write!(f, "register"),
            Token::Impl => write!(f, "impl"),
            Token::Func => write!(f, "func"),
            Token::Sig => write!(f, "sig"),
            Token::Require => write!(f, "require"),
            Token::Failure => write!(f, "failure"),
            Token::Return => write!(f, "return"),
            Token::Guarantees => write!(f, "guarantees"),
            Token::In => write!(f, "in"),
            Token::Builtin => write!(f, "builtin"),
            Token::Try => write!(f, "try"),
            Token::Catch => write!(f, "catch"),
            Token::Let => write!(f, "let"),
            Token::Var => write!(f, "var"),
            Token::IntLit(n) => write!(f, "{n}"),
            Token::FloatLit(n) => write!(f, "{n}"),
            Token::Ident(s) => write!(f, "{s}"),
            Token::Arrow => write!(f, "->"),
            Token::Pipe => write!(f, "|"),
            Token::At => write!(f, "@"),
            Token::Dot => write!(f, "."),
            Token::Plus => write!(f, "+"),
            Token::Minus => write!(f, "-"),
            Token::Star => write!(f, "*"),
            Token::Slash => write!(f, "/"),
            Token::LBrace => write!(f, "{{"),
            Token::RBrace => write!(f, "}}"),
            Token::LParen => write!(f, "("),
            Token::RParen => write!(f, ")"),
            Token::Colon => write!(f, ":"),
            Token::Comma => write!(f, ","),
            Token::Eq => write!(f, "="),
            Token::Newline => write!(f, "newline"),
            Token::Comment => write!(f, "comment"),
        }
    }
}
