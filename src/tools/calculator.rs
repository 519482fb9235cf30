//! Built-in arithmetic tool

use crate::tools::registry::ToolRegistry;
use crate::tools::signature::ToolSignature;
use anyhow::{anyhow, bail};
use serde_json::{json, Value};

pub const CALCULATOR_TOOL: &str = "calculator";

/// Deepest run of parentheses and unary signs the parser descends into
const MAX_NESTING: usize = 256;

impl ToolRegistry {
    /// Register the `calculator(expression)` tool
    pub fn register_calculator(&mut self) {
        self.register(
            CALCULATOR_TOOL,
            "Evaluate an arithmetic expression with + - * / %, parentheses and decimals",
            ToolSignature::new()
                .param::<String>("expression")
                .describe("expression", "Arithmetic expression, e.g. (2 + 3) * 4"),
            |args| evaluate(args.string("expression")?).map(number_to_json),
        );
    }
}

/// Whole results become integers so `2+2` reads as `4`, not `4.0`
fn number_to_json(value: f64) -> Value {
    if value.fract() == 0.0 && value.abs() < 9.007_199_254_740_992e15 {
        json!(value as i64)
    } else {
        json!(value)
    }
}

/// Evaluate an arithmetic expression
pub fn evaluate(expression: &str) -> anyhow::Result<f64> {
    let mut parser = Parser {
        chars: expression.chars().filter(|c| !c.is_whitespace()).collect(),
        pos: 0,
        depth: 0,
    };
    if parser.chars.is_empty() {
        bail!("empty expression");
    }
    let value = parser.expression()?;
    if let Some(c) = parser.peek() {
        bail!("unexpected '{c}' at position {}", parser.pos);
    }
    if !value.is_finite() {
        bail!("result is not a finite number");
    }
    Ok(value)
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek();
        self.pos += 1;
        c
    }

    // expression := term (('+' | '-') term)*
    fn expression(&mut self) -> anyhow::Result<f64> {
        let mut value = self.term()?;
        while let Some(op @ ('+' | '-')) = self.peek() {
            self.pos += 1;
            let rhs = self.term()?;
            value = if op == '+' { value + rhs } else { value - rhs };
        }
        Ok(value)
    }

    // term := factor (('*' | '/' | '%') factor)*
    fn term(&mut self) -> anyhow::Result<f64> {
        let mut value = self.factor()?;
        while let Some(op @ ('*' | '/' | '%')) = self.peek() {
            self.pos += 1;
            let rhs = self.factor()?;
            value = match op {
                '*' => value * rhs,
                _ if rhs == 0.0 => bail!("division by zero"),
                '/' => value / rhs,
                _ => value % rhs,
            };
        }
        Ok(value)
    }

    // factor := ('-' | '+') factor | '(' expression ')' | number
    fn factor(&mut self) -> anyhow::Result<f64> {
        match self.peek() {
            Some('-') => {
                self.pos += 1;
                Ok(-self.nested(Self::factor)?)
            }
            Some('+') => {
                self.pos += 1;
                self.nested(Self::factor)
            }
            Some('(') => {
                self.pos += 1;
                let value = self.nested(Self::expression)?;
                match self.bump() {
                    Some(')') => Ok(value),
                    _ => Err(anyhow!("missing closing parenthesis")),
                }
            }
            Some(c) if c.is_ascii_digit() || c == '.' => self.number(),
            Some(c) => Err(anyhow!("unexpected '{c}' at position {}", self.pos)),
            None => Err(anyhow!("unexpected end of expression")),
        }
    }

    // Recursion is bounded so hostile input cannot overflow the stack
    fn nested(&mut self, parse: fn(&mut Self) -> anyhow::Result<f64>) -> anyhow::Result<f64> {
        if self.depth >= MAX_NESTING {
            bail!("expression nested too deeply");
        }
        self.depth += 1;
        let value = parse(self);
        self.depth -= 1;
        value
    }

    fn number(&mut self) -> anyhow::Result<f64> {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_ascii_digit() || c == '.') {
            self.pos += 1;
        }
        let literal: String = self.chars[start..self.pos].iter().collect();
        literal
            .parse::<f64>()
            .map_err(|_| anyhow!("invalid number '{literal}'"))
    }
}
