//! Recursive-descent parser from tokens to [`Statement`]s.
//!
//! Input may hold several statements separated by `;`. Empty statements
//! and a trailing `;` are skipped.

use super::ast::*;
use super::lexer::{Keyword, Lexer, LexerError, Token};
use std::fmt;

/// Deepest WHERE expression accepted. Each parenthesis, `NOT`, and
/// `AND`/`OR` link on the path from the root counts one level.
pub const MAX_EXPRESSION_DEPTH: usize = 128;

pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl Parser {
    /// Tokenize `input` and position the parser at its first token
    pub fn new(input: &str) -> Result<Self, ParseError> {
        let tokens = Lexer::new(input).tokenize()?;
        Ok(Self {
            tokens,
            pos: 0,
            depth: 0,
        })
    }

    /// Parse every statement in the input
    pub fn parse(&mut self) -> Result<Vec<Statement>, ParseError> {
        let mut statements = Vec::new();

        loop {
            while self.eat(&Token::Semicolon) {}
            if self.peek() == &Token::Eof {
                break;
            }

            statements.push(self.statement()?);

            if !self.eat(&Token::Semicolon) && self.peek() != &Token::Eof {
                return Err(self.unexpected("; or end of input"));
            }
        }

        if statements.is_empty() {
            return Err(ParseError::EmptyInput);
        }
        Ok(statements)
    }

    /// Parse input that must hold exactly one SELECT
    pub fn parse_query(&mut self) -> Result<Query, ParseError> {
        let mut statements = self.parse()?;
        if statements.len() > 1 {
            return Err(ParseError::MultipleStatements(statements.len()));
        }
        match statements.pop() {
            Some(Statement::Select(query)) => Ok(query),
            Some(other) => Err(ParseError::NotAQuery(other.kind())),
            None => Err(ParseError::EmptyInput),
        }
    }

    fn statement(&mut self) -> Result<Statement, ParseError> {
        match self.peek() {
            Token::Keyword(Keyword::Select) => self.select().map(Statement::Select),
            Token::Keyword(Keyword::Create) => self.create_table().map(Statement::CreateTable),
            Token::Keyword(Keyword::Insert) => self.insert().map(Statement::Insert),
            _ => Err(self.unexpected("SELECT, CREATE or INSERT")),
        }
    }

    fn create_table(&mut self) -> Result<CreateTable, ParseError> {
        self.keyword(Keyword::Create)?;
        self.keyword(Keyword::Table)?;
        let name = self.identifier("table name")?;

        self.expect(Token::LeftParen)?;
        let columns = self.comma_separated(Self::column_def)?;
        self.expect(Token::RightParen)?;

        Ok(CreateTable { name, columns })
    }

    fn column_def(&mut self) -> Result<ColumnDef, ParseError> {
        let name = self.identifier("column name")?;
        let type_name = self.identifier("column type")?;
        let data_type = DataType::from_name(&type_name).ok_or(ParseError::UnknownType(type_name))?;

        let mut column = ColumnDef {
            name,
            data_type,
            primary_key: false,
            not_null: false,
        };
        loop {
            if self.eat_keyword(Keyword::Primary) {
                self.keyword(Keyword::Key)?;
                column.primary_key = true;
            } else if self.eat_keyword(Keyword::Not) {
                self.expect(Token::Null)?;
                column.not_null = true;
            } else {
                return Ok(column);
            }
        }
    }

    fn insert(&mut self) -> Result<Insert, ParseError> {
        self.keyword(Keyword::Insert)?;
        self.keyword(Keyword::Into)?;
        let table = self.identifier("table name")?;

        let columns = if self.eat(&Token::LeftParen) {
            let names = self.comma_separated(|p| p.identifier("column name"))?;
            self.expect(Token::RightParen)?;
            Some(names)
        } else {
            None
        };

        self.keyword(Keyword::Values)?;
        let rows = self.comma_separated(|p| {
            p.expect(Token::LeftParen)?;
            let values = p.comma_separated(Self::literal)?;
            p.expect(Token::RightParen)?;
            Ok(values)
        })?;

        Ok(Insert {
            table,
            columns,
            rows,
        })
    }

    fn select(&mut self) -> Result<Query, ParseError> {
        self.keyword(Keyword::Select)?;
        if matches!(self.peek(), Token::Keyword(Keyword::From) | Token::Eof) {
            return Err(ParseError::EmptySelectList);
        }
        let projection = self.comma_separated(Self::select_column)?;

        self.keyword(Keyword::From)?;
        let table = self.identifier("table name")?;

        let filter = if self.eat_keyword(Keyword::Where) {
            Some(self.expression()?)
        } else {
            None
        };

        let order_by = if self.eat_keyword(Keyword::Order) {
            self.keyword(Keyword::By)?;
            self.comma_separated(Self::sort_key)?
        } else {
            Vec::new()
        };

        let limit = if self.eat_keyword(Keyword::Limit) {
            let count = self.count(ParseError::InvalidLimitValue)?;
            let offset = if self.eat_keyword(Keyword::Offset) {
                self.count(ParseError::InvalidOffsetValue)?
            } else {
                0
            };
            Some(Limit { count, offset })
        } else {
            None
        };

        Ok(Query {
            projection,
            table,
            filter,
            order_by,
            limit,
        })
    }

    fn select_column(&mut self) -> Result<SelectColumn, ParseError> {
        if self.eat(&Token::Star) {
            return Ok(SelectColumn::Wildcard);
        }
        let name = self.identifier("column name or *")?;
        let alias = if self.eat_keyword(Keyword::As) {
            Some(self.identifier("alias")?)
        } else {
            None
        };
        Ok(SelectColumn::Column { name, alias })
    }

    fn sort_key(&mut self) -> Result<SortKey, ParseError> {
        let column = self.identifier("column name")?;
        let descending = if self.eat_keyword(Keyword::Desc) {
            true
        } else {
            self.eat_keyword(Keyword::Asc);
            false
        };
        Ok(SortKey { column, descending })
    }

    // Precedence, loosest first: OR, AND, NOT, comparison, primary

    fn expression(&mut self) -> Result<Expression, ParseError> {
        let entry = self.depth;
        let mut left = self.conjunction()?;
        while self.eat_keyword(Keyword::Or) {
            self.descend()?;
            let right = self.conjunction()?;
            left = Expression::Or(Box::new(left), Box::new(right));
        }
        self.depth = entry;
        Ok(left)
    }

    fn conjunction(&mut self) -> Result<Expression, ParseError> {
        let entry = self.depth;
        let mut left = self.negation()?;
        while self.eat_keyword(Keyword::And) {
            self.descend()?;
            let right = self.negation()?;
            left = Expression::And(Box::new(left), Box::new(right));
        }
        self.depth = entry;
        Ok(left)
    }

    fn negation(&mut self) -> Result<Expression, ParseError> {
        if self.eat_keyword(Keyword::Not) {
            self.descend()?;
            let inner = self.negation()?;
            self.depth -= 1;
            return Ok(Expression::Not(Box::new(inner)));
        }
        self.comparison()
    }

    /// Enter one more expression level; the caller restores `depth` on success
    fn descend(&mut self) -> Result<(), ParseError> {
        self.depth += 1;
        if self.depth > MAX_EXPRESSION_DEPTH {
            return Err(ParseError::TooDeep(MAX_EXPRESSION_DEPTH));
        }
        Ok(())
    }

    fn comparison(&mut self) -> Result<Expression, ParseError> {
        let left = Box::new(self.primary()?);

        if self.eat_keyword(Keyword::Like) {
            return match self.advance() {
                Token::String(pattern) => Ok(Expression::Like {
                    expr: left,
                    pattern,
                }),
                found => Err(ParseError::UnexpectedToken {
                    expected: "string pattern".to_string(),
                    found,
                }),
            };
        }

        if self.eat_keyword(Keyword::In) {
            self.expect(Token::LeftParen)?;
            let values = self.comma_separated(Self::literal)?;
            self.expect(Token::RightParen)?;
            return Ok(Expression::InList { expr: left, values });
        }

        if self.eat_keyword(Keyword::Between) {
            let low = Box::new(self.primary()?);
            self.keyword(Keyword::And)?;
            let high = Box::new(self.primary()?);
            return Ok(Expression::Between {
                expr: left,
                low,
                high,
            });
        }

        if let Token::Compare(op) = *self.peek() {
            self.advance();
            let right = Box::new(self.primary()?);
            return Ok(Expression::Compare { left, op, right });
        }

        Ok(*left)
    }

    fn primary(&mut self) -> Result<Expression, ParseError> {
        match self.peek() {
            Token::Identifier(_) => self.identifier("column name").map(Expression::Column),
            Token::LeftParen => {
                self.advance();
                self.descend()?;
                let inner = self.expression()?;
                self.expect(Token::RightParen)?;
                self.depth -= 1;
                Ok(inner)
            }
            _ => self.literal().map(Expression::Literal),
        }
    }

    fn literal(&mut self) -> Result<Literal, ParseError> {
        let negative = self.eat(&Token::Minus);
        match (self.advance(), negative) {
            (Token::Integer(i), neg) => Ok(Literal::Integer(if neg { -i } else { i })),
            (Token::Float(x), neg) => Ok(Literal::Float(if neg { -x } else { x })),
            (Token::String(s), false) => Ok(Literal::String(s)),
            (Token::Boolean(b), false) => Ok(Literal::Boolean(b)),
            (Token::Null, false) => Ok(Literal::Null),
            (found, true) => Err(ParseError::UnexpectedToken {
                expected: "number".to_string(),
                found,
            }),
            (found, false) => Err(ParseError::UnexpectedToken {
                expected: "literal value".to_string(),
                found,
            }),
        }
    }

    /// Non-negative integer for LIMIT / OFFSET
    fn count(&mut self, invalid: fn(i64) -> ParseError) -> Result<usize, ParseError> {
        let negative = self.eat(&Token::Minus);
        match self.advance() {
            Token::Integer(n) => {
                let n = if negative { -n } else { n };
                usize::try_from(n).map_err(|_| invalid(n))
            }
            found => Err(ParseError::UnexpectedToken {
                expected: "integer".to_string(),
                found,
            }),
        }
    }

    /// One or more `item`s separated by commas
    fn comma_separated<T>(
        &mut self,
        mut item: impl FnMut(&mut Self) -> Result<T, ParseError>,
    ) -> Result<Vec<T>, ParseError> {
        let mut items = vec![item(self)?];
        while self.eat(&Token::Comma) {
            items.push(item(self)?);
        }
        Ok(items)
    }

    fn identifier(&mut self, what: &str) -> Result<String, ParseError> {
        match self.advance() {
            Token::Identifier(name) => Ok(name),
            found => Err(ParseError::UnexpectedToken {
                expected: what.to_string(),
                found,
            }),
        }
    }

    fn peek(&self) -> &Token {
        // Past the end reads as Eof
        self.tokens.get(self.pos).unwrap_or(&Token::Eof)
    }

    /// Take the current token; stays on `Eof` once reached
    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        token
    }

    fn eat(&mut self, token: &Token) -> bool {
        if self.peek() == token {
            self.advance();
            true
        } else {
            false
        }
    }

    fn eat_keyword(&mut self, kw: Keyword) -> bool {
        self.eat(&Token::Keyword(kw))
    }

    fn expect(&mut self, token: Token) -> Result<(), ParseError> {
        if self.eat(&token) {
            Ok(())
        } else {
            Err(self.unexpected(&token.to_string()))
        }
    }

    fn keyword(&mut self, kw: Keyword) -> Result<(), ParseError> {
        self.expect(Token::Keyword(kw))
    }

    fn unexpected(&self, expected: &str) -> ParseError {
        ParseError::UnexpectedToken {
            expected: expected.to_string(),
            found: self.peek().clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ParseError {
    LexerError(LexerError),
    UnexpectedToken { expected: String, found: Token },
    EmptyInput,
    EmptySelectList,
    UnknownType(String),
    NotAQuery(&'static str),
    MultipleStatements(usize),
    InvalidLimitValue(i64),
    InvalidOffsetValue(i64),
    TooDeep(usize),
}

impl From<LexerError> for ParseError {
    fn from(err: LexerError) -> Self {
        ParseError::LexerError(err)
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::LexerError(e) => write!(f, "{}", e),
            ParseError::UnexpectedToken {
                found: Token::Eof, ..
            } => write!(f, "incomplete input"),
            ParseError::UnexpectedToken { expected, found } => {
                write!(f, "near \"{}\": syntax error (expected {})", found, expected)
            }
            ParseError::EmptyInput => write!(f, "no statement to execute"),
            ParseError::EmptySelectList => write!(f, "SELECT list cannot be empty"),
            ParseError::UnknownType(name) => write!(f, "unknown column type: {}", name),
            ParseError::NotAQuery(kind) => write!(f, "expected a SELECT, found {}", kind),
            ParseError::MultipleStatements(n) => {
                write!(f, "expected exactly one statement, found {}", n)
            }
            ParseError::InvalidLimitValue(n) => write!(f, "LIMIT must be non-negative, got {}", n),
            ParseError::InvalidOffsetValue(n) => {
                write!(f, "OFFSET must be non-negative, got {}", n)
            }
            ParseError::TooDeep(limit) => {
                write!(f, "expression nested deeper than {} levels", limit)
            }
        }
    }
}

impl std::error::Error for ParseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ParseError::LexerError(e) => Some(e),
            _ => None,
        }
    }
}
