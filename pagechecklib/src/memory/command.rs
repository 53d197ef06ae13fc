//! The statement subset understood by the in-memory store.
//!
//! ```text
//! INSERT INTO t (a, b) VALUES (1, 'x')
//! SELECT * FROM t WHERE a = 1 AND b = 'x' LIMIT 10
//! SELECT a, b FROM t
//! DELETE FROM t WHERE a = 1
//! ```
//!
//! Keywords and identifiers are case-insensitive; identifiers are
//! lower-cased. Literals are integers, `'strings'` (with `''` escapes),
//! `true`, `false` and `null`. A trailing `;` is accepted.

use crate::error::PagecheckError;
use crate::value::Value;
use crate::Result;

/// A parsed statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    Insert {
        table: String,
        columns: Vec<String>,
        values: Vec<Value>,
    },
    Select {
        table: String,
        /// `None` for `*`
        columns: Option<Vec<String>>,
        filter: Vec<(String, Value)>,
        limit: Option<usize>,
    },
    Delete {
        table: String,
        filter: Vec<(String, Value)>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Word(String),
    Number(i64),
    Str(String),
    Symbol(char),
}

fn tokenize(text: &str) -> std::result::Result<Vec<Token>, String> {
    let mut tokens = Vec::new();
    let mut chars = text.chars().peekable();

    while let Some(&c) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
        } else if c.is_ascii_alphabetic() || c == '_' {
            let mut word = String::new();
            while let Some(&c) = chars.peek() {
                if c.is_ascii_alphanumeric() || c == '_' || c == '.' {
                    word.push(c);
                    chars.next();
                } else {
                    break;
                }
            }
            tokens.push(Token::Word(word));
        } else if c.is_ascii_digit() || c == '-' {
            let mut digits = String::new();
            digits.push(c);
            chars.next();
            while let Some(&c) = chars.peek() {
                if c.is_ascii_digit() {
                    digits.push(c);
                    chars.next();
                } else {
                    break;
                }
            }
            let n = digits
                .parse::<i64>()
                .map_err(|e| format!("bad number '{}': {}", digits, e))?;
            tokens.push(Token::Number(n));
        } else if c == '\'' {
            chars.next();
            let mut s = String::new();
            loop {
                match chars.next() {
                    Some('\'') if chars.peek() == Some(&'\'') => {
                        chars.next();
                        s.push('\'');
                    }
                    Some('\'') => break,
                    Some(c) => s.push(c),
                    None => return Err("unterminated string".to_string()),
                }
            }
            tokens.push(Token::Str(s));
        } else if "(),*=;".contains(c) {
            tokens.push(Token::Symbol(c));
            chars.next();
        } else {
            return Err(format!("unexpected character '{}'", c));
        }
    }

    Ok(tokens)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        token
    }

    fn peek_keyword(&self, keyword: &str) -> bool {
        matches!(self.peek(), Some(Token::Word(w)) if w.eq_ignore_ascii_case(keyword))
    }

    fn keyword(&mut self, keyword: &str) -> std::result::Result<(), String> {
        match self.next() {
            Some(Token::Word(w)) if w.eq_ignore_ascii_case(keyword) => Ok(()),
            other => Err(format!("expected {}, found {:?}", keyword, other)),
        }
    }

    fn symbol(&mut self, symbol: char) -> std::result::Result<(), String> {
        match self.next() {
            Some(Token::Symbol(c)) if c == symbol => Ok(()),
            other => Err(format!("expected '{}', found {:?}", symbol, other)),
        }
    }

    fn eat_symbol(&mut self, symbol: char) -> bool {
        if self.peek() == Some(&Token::Symbol(symbol)) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn ident(&mut self) -> std::result::Result<String, String> {
        match self.next() {
            Some(Token::Word(w)) => Ok(w.to_ascii_lowercase()),
            other => Err(format!("expected identifier, found {:?}", other)),
        }
    }

    fn value(&mut self) -> std::result::Result<Value, String> {
        match self.next() {
            Some(Token::Number(n)) => Ok(Value::Int(n)),
            Some(Token::Str(s)) => Ok(Value::Text(s)),
            Some(Token::Word(w)) if w.eq_ignore_ascii_case("true") => Ok(Value::Bool(true)),
            Some(Token::Word(w)) if w.eq_ignore_ascii_case("false") => Ok(Value::Bool(false)),
            Some(Token::Word(w)) if w.eq_ignore_ascii_case("null") => Ok(Value::Null),
            other => Err(format!("expected literal, found {:?}", other)),
        }
    }

    /// `ident (, ident)*` inside parentheses.
    fn ident_list(&mut self) -> std::result::Result<Vec<String>, String> {
        self.symbol('(')?;
        let mut idents = vec![self.ident()?];
        while self.eat_symbol(',') {
            idents.push(self.ident()?);
        }
        self.symbol(')')?;
        Ok(idents)
    }

    fn value_list(&mut self) -> std::result::Result<Vec<Value>, String> {
        self.symbol('(')?;
        let mut values = vec![self.value()?];
        while self.eat_symbol(',') {
            values.push(self.value()?);
        }
        self.symbol(')')?;
        Ok(values)
    }

    /// Optional `WHERE c = v (AND c = v)*`.
    fn filter(&mut self) -> std::result::Result<Vec<(String, Value)>, String> {
        let mut filter = Vec::new();
        if !self.peek_keyword("where") {
            return Ok(filter);
        }
        self.keyword("where")?;
        loop {
            let column = self.ident()?;
            self.symbol('=')?;
            filter.push((column, self.value()?));
            if !self.peek_keyword("and") {
                break;
            }
            self.keyword("and")?;
        }
        Ok(filter)
    }

    fn finish(&mut self) -> std::result::Result<(), String> {
        self.eat_symbol(';');
        match self.peek() {
            None => Ok(()),
            Some(token) => Err(format!("unexpected trailing {:?}", token)),
        }
    }

    fn statement(&mut self) -> std::result::Result<Statement, String> {
        let verb = self.ident()?;
        let statement = match verb.as_str() {
            "insert" => {
                self.keyword("into")?;
                let table = self.ident()?;
                let columns = self.ident_list()?;
                self.keyword("values")?;
                let values = self.value_list()?;
                if columns.len() != values.len() {
                    return Err(format!(
                        "{} columns but {} values",
                        columns.len(),
                        values.len()
                    ));
                }
                Statement::Insert {
                    table,
                    columns,
                    values,
                }
            }
            "select" => {
                let columns = if self.eat_symbol('*') {
                    None
                } else {
                    let mut columns = vec![self.ident()?];
                    while self.eat_symbol(',') {
                        columns.push(self.ident()?);
                    }
                    Some(columns)
                };
                self.keyword("from")?;
                let table = self.ident()?;
                let filter = self.filter()?;
                let limit = if self.peek_keyword("limit") {
                    self.keyword("limit")?;
                    match self.next() {
                        Some(Token::Number(n)) if n >= 0 => Some(n as usize),
                        other => return Err(format!("expected row count, found {:?}", other)),
                    }
                } else {
                    None
                };
                Statement::Select {
                    table,
                    columns,
                    filter,
                    limit,
                }
            }
            "delete" => {
                self.keyword("from")?;
                let table = self.ident()?;
                let filter = self.filter()?;
                Statement::Delete { table, filter }
            }
            other => return Err(format!("unsupported statement '{}'", other)),
        };
        self.finish()?;
        Ok(statement)
    }
}

/// Parse one statement.
pub fn parse_statement(text: &str) -> Result<Statement> {
    let invalid = |message: String| PagecheckError::Statement {
        statement: text.trim().to_string(),
        message,
    };
    let tokens = tokenize(text).map_err(invalid)?;
    Parser { tokens, pos: 0 }.statement().map_err(invalid)
}
