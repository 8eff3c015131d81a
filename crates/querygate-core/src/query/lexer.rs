//! Tokenizer for SQL text.
//!
//! Keywords are case-insensitive; identifiers keep the case they were
//! written in. `--` starts a comment that runs to the end of the line.

use super::ast::CompareOp;
use std::fmt;

/// Reserved words
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    Select,
    From,
    Where,
    Order,
    By,
    Asc,
    Desc,
    Limit,
    Offset,
    As,
    And,
    Or,
    Not,
    Like,
    In,
    Between,
    Create,
    Table,
    Insert,
    Into,
    Values,
    Primary,
    Key,
}

impl Keyword {
    const ALL: [(&'static str, Keyword); 23] = [
        ("SELECT", Keyword::Select),
        ("FROM", Keyword::From),
        ("WHERE", Keyword::Where),
        ("ORDER", Keyword::Order),
        ("BY", Keyword::By),
        ("ASC", Keyword::Asc),
        ("DESC", Keyword::Desc),
        ("LIMIT", Keyword::Limit),
        ("OFFSET", Keyword::Offset),
        ("AS", Keyword::As),
        ("AND", Keyword::And),
        ("OR", Keyword::Or),
        ("NOT", Keyword::Not),
        ("LIKE", Keyword::Like),
        ("IN", Keyword::In),
        ("BETWEEN", Keyword::Between),
        ("CREATE", Keyword::Create),
        ("TABLE", Keyword::Table),
        ("INSERT", Keyword::Insert),
        ("INTO", Keyword::Into),
        ("VALUES", Keyword::Values),
        ("PRIMARY", Keyword::Primary),
        ("KEY", Keyword::Key),
    ];

    fn lookup(word: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .find(|(text, _)| text.eq_ignore_ascii_case(word))
            .map(|&(_, kw)| kw)
    }

    /// Canonical upper-case spelling
    pub fn as_str(self) -> &'static str {
        Self::ALL
            .iter()
            .find(|&&(_, kw)| kw == self)
            .map_or("?", |&(text, _)| text)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Keyword(Keyword),
    Identifier(String),
    Integer(i64),
    Float(f64),
    String(String),
    Boolean(bool),
    Null,
    Compare(CompareOp),
    Minus,
    Star,
    Comma,
    LeftParen,
    RightParen,
    Semicolon,
    Eof,
}

impl Token {
    /// True if this is the keyword `kw`
    pub fn is(&self, kw: Keyword) -> bool {
        matches!(self, Token::Keyword(k) if *k == kw)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Keyword(kw) => f.write_str(kw.as_str()),
            Token::Identifier(name) => f.write_str(name),
            Token::Integer(i) => write!(f, "{}", i),
            Token::Float(x) => write!(f, "{}", x),
            Token::String(s) => write!(f, "'{}'", s.replace('\'', "''")),
            Token::Boolean(b) => write!(f, "{}", b),
            Token::Null => f.write_str("NULL"),
            Token::Compare(op) => write!(f, "{}", op),
            Token::Minus => f.write_str("-"),
            Token::Star => f.write_str("*"),
            Token::Comma => f.write_str(","),
            Token::LeftParen => f.write_str("("),
            Token::RightParen => f.write_str(")"),
            Token::Semicolon => f.write_str(";"),
            Token::Eof => f.write_str("end of input"),
        }
    }
}

pub struct Lexer {
    chars: Vec<char>,
    pos: usize,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Self {
            chars: input.chars().collect(),
            pos: 0,
        }
    }

    /// Split the whole input into tokens; the last one is always `Eof`.
    pub fn tokenize(&mut self) -> Result<Vec<Token>, LexerError> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token()?;
            let done = token == Token::Eof;
            tokens.push(token);
            if done {
                return Ok(tokens);
            }
        }
    }

    pub fn next_token(&mut self) -> Result<Token, LexerError> {
        self.skip_trivia();

        let Some(ch) = self.peek() else {
            return Ok(Token::Eof);
        };

        if ch == '\'' {
            return self.string_literal();
        }
        if ch.is_ascii_digit() {
            return self.number();
        }
        if ch.is_alphabetic() || ch == '_' {
            return Ok(self.word());
        }

        self.pos += 1;
        let token = match ch {
            '*' => Token::Star,
            ',' => Token::Comma,
            '(' => Token::LeftParen,
            ')' => Token::RightParen,
            ';' => Token::Semicolon,
            '-' => Token::Minus,
            // `==` is accepted as a synonym for `=`
            '=' => {
                self.eat('=');
                Token::Compare(CompareOp::Eq)
            }
            '<' if self.eat('=') => Token::Compare(CompareOp::Le),
            '<' if self.eat('>') => Token::Compare(CompareOp::Ne),
            '<' => Token::Compare(CompareOp::Lt),
            '>' if self.eat('=') => Token::Compare(CompareOp::Ge),
            '>' => Token::Compare(CompareOp::Gt),
            '!' if self.eat('=') => Token::Compare(CompareOp::Ne),
            other => return Err(LexerError::UnexpectedCharacter(other)),
        };
        Ok(token)
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    /// Consume `ch` if it is next
    fn eat(&mut self, ch: char) -> bool {
        if self.peek() == Some(ch) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn take_while(&mut self, pred: impl Fn(char) -> bool) -> String {
        let start = self.pos;
        while self.peek().is_some_and(&pred) {
            self.pos += 1;
        }
        self.chars[start..self.pos].iter().collect()
    }

    fn skip_trivia(&mut self) {
        loop {
            self.take_while(char::is_whitespace);
            if self.peek() == Some('-') && self.peek_at(1) == Some('-') {
                self.take_while(|c| c != '\n');
            } else {
                return;
            }
        }
    }

    fn number(&mut self) -> Result<Token, LexerError> {
        let mut text = self.take_while(|c| c.is_ascii_digit());

        let is_float = self.peek() == Some('.') && self.peek_at(1).is_some_and(|c| c.is_ascii_digit());
        if is_float {
            self.pos += 1;
            text.push('.');
            text.push_str(&self.take_while(|c| c.is_ascii_digit()));
            return text
                .parse()
                .map(Token::Float)
                .map_err(|_| LexerError::InvalidNumber(text));
        }

        text.parse()
            .map(Token::Integer)
            .map_err(|_| LexerError::InvalidNumber(text))
    }

    fn string_literal(&mut self) -> Result<Token, LexerError> {
        self.pos += 1;
        let mut value = String::new();

        loop {
            match self.peek() {
                None => return Err(LexerError::UnterminatedString),
                Some('\'') => {
                    self.pos += 1;
                    // '' is an escaped quote
                    if !self.eat('\'') {
                        return Ok(Token::String(value));
                    }
                    value.push('\'');
                }
                Some(c) => {
                    self.pos += 1;
                    value.push(c);
                }
            }
        }
    }

    fn word(&mut self) -> Token {
        let word = self.take_while(|c| c.is_alphanumeric() || c == '_');

        if let Some(kw) = Keyword::lookup(&word) {
            return Token::Keyword(kw);
        }
        match word.to_ascii_uppercase().as_str() {
            "NULL" => Token::Null,
            "TRUE" => Token::Boolean(true),
            "FALSE" => Token::Boolean(false),
            _ => Token::Identifier(word),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LexerError {
    UnexpectedCharacter(char),
    InvalidNumber(String),
    UnterminatedString,
}

impl fmt::Display for LexerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LexerError::UnexpectedCharacter(ch) => write!(f, "unrecognized token: \"{}\"", ch),
            LexerError::InvalidNumber(s) => write!(f, "invalid number: {}", s),
            LexerError::UnterminatedString => write!(f, "unterminated string literal"),
        }
    }
}

impl std::error::Error for LexerError {}
