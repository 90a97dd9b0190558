// src/aggregation/natural_key.rs
use once_cell::sync::Lazy;
use regex::Regex;
use std::cmp::Ordering;
use std::fmt;

// A sign glued to a number is consumed as part of the separator, so range
// labels such as "25-250" read as two numbers rather than 25 and -250.
static NUMERIC_RUN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[+-]?([0-9]+(?:\.[0-9]*)?|\.[0-9]+)").expect("numeric run pattern is valid")
});

/// One piece of a natural key
#[derive(Debug, Clone)]
pub enum Token {
    Number(f64),
    Text(String),
}

impl Ord for Token {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Token::Number(a), Token::Number(b)) => a.total_cmp(b),
            (Token::Text(a), Token::Text(b)) => a.cmp(b),
            (Token::Number(_), Token::Text(_)) => Ordering::Less,
            (Token::Text(_), Token::Number(_)) => Ordering::Greater,
        }
    }
}

impl PartialOrd for Token {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Token {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Token {}

/// Sort key that compares embedded numbers by value.
///
/// Tokens always alternate text and number, starting and ending with a
/// (possibly empty) text token, so two keys only ever compare like with like
/// position by position. Shorter keys that are a prefix of longer ones sort first.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct NaturalKey(Vec<Token>);

impl NaturalKey {
    pub fn tokens(&self) -> &[Token] {
        &self.0
    }
}

impl fmt::Display for NaturalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .0
            .iter()
            .map(|t| match t {
                Token::Number(n) => n.to_string(),
                Token::Text(s) => format!("{:?}", s),
            })
            .collect();
        write!(f, "[{}]", parts.join(", "))
    }
}

/// Split text into alternating text and numeric tokens
pub fn natural_key(text: &str) -> NaturalKey {
    let mut tokens = Vec::new();
    let mut last = 0;

    for caps in NUMERIC_RUN.captures_iter(text) {
        let (Some(whole), Some(digits)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        tokens.push(Token::Text(text[last..whole.start()].to_string()));
        tokens.push(to_token(digits.as_str()));
        last = whole.end();
    }
    tokens.push(Token::Text(text[last..].to_string()));

    NaturalKey(tokens)
}

fn to_token(digits: &str) -> Token {
    match digits.parse::<f64>() {
        Ok(n) => Token::Number(n),
        Err(_) => Token::Text(digits.to_string()),
    }
}

/// Compare two strings by their natural keys
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    natural_key(a).cmp(&natural_key(b))
}

/// Sort a slice in place by the natural key of the text each item yields
pub fn sort_naturally<T, F>(items: &mut [T], text: F)
where
    F: Fn(&T) -> String,
{
    items.sort_by_cached_key(|item| natural_key(&text(item)));
}
