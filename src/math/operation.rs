use super::{Rational, RationalError};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operation {
    Add,
    Sub,
    Mul,
    Div,
}

impl Operation {
    pub fn char(&self) -> &str {
        match self {
            Operation::Add => "+",
            Operation::Sub => "-",
            Operation::Mul => "*",
            Operation::Div => "/",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "+" => Some(Operation::Add),
            "-" => Some(Operation::Sub),
            "*" => Some(Operation::Mul),
            "/" => Some(Operation::Div),
            _ => None,
        }
    }

    pub fn apply(&self, left: &Rational, right: &Rational) -> Result<Rational, RationalError> {
        match self {
            Operation::Add => left.add(right),
            Operation::Sub => left.sub(right),
            Operation::Mul => left.mul(right),
            Operation::Div => left.div(right),
        }
    }
}
