//! Numeric comparison predicates such as `>= 8` or `!=0`.

use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{AlertError, Result};

static MATCHER_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([=!<>]+)\s*(\d+)$").expect("matcher pattern is valid"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl Operator {
    fn parse(op: &str) -> Option<Self> {
        match op {
            "=" | "==" => Some(Operator::Eq),
            "!=" => Some(Operator::Ne),
            "<" => Some(Operator::Lt),
            "<=" => Some(Operator::Le),
            ">" => Some(Operator::Gt),
            ">=" => Some(Operator::Ge),
            _ => None,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Operator::Eq => "=",
            Operator::Ne => "!=",
            Operator::Lt => "<",
            Operator::Le => "<=",
            Operator::Gt => ">",
            Operator::Ge => ">=",
        }
    }
}

/// A parsed `(operator, threshold)` pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Matcher {
    pub operator: Operator,
    pub threshold: i64,
}

impl Matcher {
    pub fn new(operator: Operator, threshold: i64) -> Self {
        Self {
            operator,
            threshold,
        }
    }

    /// Whether `value` satisfies the relation to the threshold
    pub fn check(&self, value: i64) -> bool {
        let t = self.threshold;
        match self.operator {
            Operator::Eq => value == t,
            Operator::Ne => value != t,
            Operator::Lt => value < t,
            Operator::Le => value <= t,
            Operator::Gt => value > t,
            Operator::Ge => value >= t,
        }
    }
}

impl FromStr for Matcher {
    type Err = AlertError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || AlertError::config(format!("Invalid matcher string: {}", s));

        let caps = MATCHER_PATTERN.captures(s.trim()).ok_or_else(invalid)?;
        let operator = Operator::parse(&caps[1]).ok_or_else(invalid)?;
        let threshold = caps[2].parse::<i64>().map_err(|_| invalid())?;

        Ok(Matcher::new(operator, threshold))
    }
}

impl fmt::Display for Matcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.operator.symbol(), self.threshold)
    }
}
