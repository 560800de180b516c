use std::{fmt, ops::Range};

use crate::lexer;

#[derive(Copy, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    lo: usize,
    len: u32,
    line: u32,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span) -> Token {
        Token {
            kind,
            lo: span.lo,
            len: span.len,
            line: span.line,
        }
    }

    pub fn span(&self) -> Span {
        Span {
            lo: self.lo,
            len: self.len,
            line: self.line,
        }
    }

    pub fn line(&self) -> u32 {
        self.line
    }

    pub fn is_eof(&self) -> bool {
        self.kind == TokenKind::Eof
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Token({:?}, {}, line {})", self.kind, self.span(), self.line)
    }
}

/// A byte range into the source, plus the (1-based) line it starts on.
#[derive(Copy, Clone, PartialEq, Eq)]
pub struct Span {
    pub lo: usize,
    pub len: u32,
    pub line: u32,
}

impl Span {
    pub fn new_of_bounds(Range { start: lo, end: hi }: Range<usize>, line: u32) -> Span {
        debug_assert!(hi >= lo);
        let len = u32::try_from(hi - lo).expect("token longer than u32::MAX bytes");
        Self::new_of_length(lo, len, line)
    }

    pub fn new_of_length(lo: usize, len: u32, line: u32) -> Span {
        Span { lo, len, line }
    }

    pub fn hi(&self) -> usize {
        self.lo + self.len as usize
    }

    /// Returns a span covering both `self` and `other`. The line is taken from
    /// whichever span starts first.
    pub fn to(self, other: Span) -> Span {
        let (first, last) = if self.lo <= other.lo {
            (self, other)
        } else {
            (other, self)
        };
        let hi = first.hi().max(last.hi());
        Span::new_of_bounds(first.lo..hi, first.line)
    }

    pub fn substr(self, src: &str) -> &str {
        &src[self.lo..self.hi()]
    }

    pub fn wrap<T>(self, inner: T) -> Spanned<T> {
        Spanned { span: self, inner }
    }
}

impl fmt::Debug for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Span({self}, line: {})", self.line)
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let lo = self.lo;
        let hi = self.hi();
        write!(f, "{lo}..{hi}")
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Spanned<T> {
    pub span: Span,
    pub inner: T,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TokenKind {
    For,
    In,
    Do,
    End,
    Var,
    Mut,
    Def,
    Return,
    If,
    Then,
    ElseIf,
    Else,
    /// Marks a descending `for` range.
    Reverse,
    And,
    Or,

    True,
    False,

    Plus,
    Minus,
    Star,
    Slash,
    /// `==`
    EqEq,
    /// `!=`
    NotEq,
    /// `=`
    Assign,
    /// `..`
    DotDot,
    LParen,
    RParen,
    LBrace,
    RBrace,
    Comma,
    /// Statement terminator.
    Semicolon,

    Identifier,
    Integer,
    Float,
    String,

    Whitespace,
    /// `#` up to the end of the line.
    Comment,
    Eof,
    Error(lexer::Error),
}

impl TokenKind {
    pub fn is_trivia(self) -> bool {
        matches!(self, TokenKind::Whitespace | TokenKind::Comment)
    }

    pub fn is_error(self) -> bool {
        matches!(self, TokenKind::Error(_))
    }
}

pub static KEYWORDS: phf::Map<&'static str, TokenKind> = phf::phf_map! {
    "for" => TokenKind::For,
    "in" => TokenKind::In,
    "do" => TokenKind::Do,
    "end" => TokenKind::End,
    "var" => TokenKind::Var,
    "mut" => TokenKind::Mut,
    "def" => TokenKind::Def,
    "return" => TokenKind::Return,
    "if" => TokenKind::If,
    "then" => TokenKind::Then,
    "elseif" => TokenKind::ElseIf,
    "else" => TokenKind::Else,
    "reverse" => TokenKind::Reverse,
    "and" => TokenKind::And,
    "or" => TokenKind::Or,
    "true" => TokenKind::True,
    "false" => TokenKind::False,
};
