//! Answer suggestions for arithmetic prompts such as `"5 + 3 ="`.
//!
//! The prompt is normalized, checked against a strict character whitelist and
//! only then handed to a small recursive-descent parser. Nothing outside of
//! `+ - * /`, parentheses and decimal literals is ever interpreted.

use std::sync::LazyLock;

use regex::Regex;

static ARITHMETIC_ONLY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9.+\-*/()]+$").expect("arithmetic whitelist pattern should compile")
});

static HAS_OPERATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[+\-*/]").expect("operator pattern should compile"));

/// Deepest nesting of parentheses and unary signs the parser will follow.
const MAX_DEPTH: usize = 64;

/// Suggest an answer for a question prompt.
///
/// Returns `None` for anything that is not a plain arithmetic expression with
/// at least one operator, for malformed expressions and for non-finite results.
///
/// ```
/// use quiz_core::expr::evaluate;
///
/// assert_eq!(evaluate("5 + 3 =").as_deref(), Some("8"));
/// assert_eq!(evaluate("4 x 6").as_deref(), Some("24"));
/// assert_eq!(evaluate("10 ÷ 0"), None);
/// assert_eq!(evaluate("hello"), None);
/// ```
#[must_use]
pub fn evaluate(text: &str) -> Option<String> {
    let normalized = normalize(text);
    if !ARITHMETIC_ONLY.is_match(&normalized) || !HAS_OPERATOR.is_match(&normalized) {
        return None;
    }

    let value = Parser::new(&normalized).parse()?;
    value.is_finite().then(|| format_number(value))
}

/// Strip `=` and whitespace, map multiplication/division synonyms to `*` and `/`.
fn normalize(text: &str) -> String {
    text.chars()
        .filter(|c| *c != '=' && !c.is_whitespace())
        .map(|c| match c {
            'x' | 'X' | '×' => '*',
            '÷' => '/',
            other => other,
        })
        .collect()
}

fn format_number(value: f64) -> String {
    // Collapse negative zero so "0 * -1" reads as "0".
    if value == 0.0 {
        return "0".to_string();
    }
    value.to_string()
}

//
// ─── PARSER ────────────────────────────────────────────────────────────────────
//
// expr    := term (('+' | '-') term)*
// term    := unary (('*' | '/') unary)*
// unary   := ('+' | '-') unary | primary
// primary := number | '(' expr ')'
//

struct Parser<'a> {
    src: &'a [u8],
    pos: usize,
    depth: usize,
}

impl<'a> Parser<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            src: src.as_bytes(),
            pos: 0,
            depth: 0,
        }
    }

    fn parse(mut self) -> Option<f64> {
        let value = self.expr()?;
        (self.pos == self.src.len()).then_some(value)
    }

    fn peek(&self) -> Option<u8> {
        self.src.get(self.pos).copied()
    }

    fn bump(&mut self) {
        self.pos += 1;
    }

    fn expr(&mut self) -> Option<f64> {
        let mut acc = self.term()?;
        while let Some(op @ (b'+' | b'-')) = self.peek() {
            self.bump();
            let rhs = self.term()?;
            acc = if op == b'+' { acc + rhs } else { acc - rhs };
        }
        Some(acc)
    }

    fn term(&mut self) -> Option<f64> {
        let mut acc = self.unary()?;
        while let Some(op @ (b'*' | b'/')) = self.peek() {
            self.bump();
            let rhs = self.unary()?;
            acc = if op == b'*' { acc * rhs } else { acc / rhs };
        }
        Some(acc)
    }

    fn unary(&mut self) -> Option<f64> {
        match self.peek()? {
            sign @ (b'+' | b'-') => {
                self.bump();
                let value = self.nested(Self::unary)?;
                Some(if sign == b'-' { -value } else { value })
            }
            _ => self.primary(),
        }
    }

    fn primary(&mut self) -> Option<f64> {
        match self.peek()? {
            b'(' => {
                self.bump();
                let value = self.nested(Self::expr)?;
                if self.peek()? != b')' {
                    return None;
                }
                self.bump();
                Some(value)
            }
            b'0'..=b'9' | b'.' => self.number(),
            _ => None,
        }
    }

    fn number(&mut self) -> Option<f64> {
        let start = self.pos;
        while matches!(self.peek(), Some(b'0'..=b'9' | b'.')) {
            self.bump();
        }
        let literal = std::str::from_utf8(&self.src[start..self.pos]).ok()?;
        if !literal.bytes().any(|b| b.is_ascii_digit()) {
            return None;
        }
        literal.parse::<f64>().ok()
    }

    fn nested(&mut self, rule: fn(&mut Self) -> Option<f64>) -> Option<f64> {
        if self.depth >= MAX_DEPTH {
            return None;
        }
        self.depth += 1;
        let value = rule(self);
        self.depth -= 1;
        value
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    fn eval(text: &str) -> Option<String> {
        evaluate(text)
    }

    #[test]
    fn evaluates_prompt_with_trailing_equals() {
        assert_eq!(eval("5 + 3 =").as_deref(), Some("8"));
        assert_eq!(eval("12 - 20 =").as_deref(), Some("-8"));
    }

    #[test]
    fn maps_multiplication_and_division_synonyms() {
        assert_eq!(eval("4 x 6").as_deref(), Some("24"));
        assert_eq!(eval("4 X 6").as_deref(), Some("24"));
        assert_eq!(eval("7 × 3").as_deref(), Some("21"));
        assert_eq!(eval("9 ÷ 3 =").as_deref(), Some("3"));
    }

    #[test]
    fn honors_precedence_and_parentheses() {
        assert_eq!(eval("2 + 3 * 4").as_deref(), Some("14"));
        assert_eq!(eval("(2 + 3) * 4").as_deref(), Some("20"));
        assert_eq!(eval("20 / 4 / 5").as_deref(), Some("1"));
        assert_eq!(eval("10 - 4 - 3").as_deref(), Some("3"));
    }

    #[test]
    fn formats_fractions_minimally() {
        assert_eq!(eval("7 / 2").as_deref(), Some("3.5"));
        assert_eq!(eval("1.5 + 1.5").as_deref(), Some("3"));
        assert_eq!(eval("0.1 + 0.2").as_deref(), Some("0.30000000000000004"));
        assert_eq!(eval("1 / 3").as_deref(), Some("0.3333333333333333"));
    }

    #[test]
    fn non_finite_results_yield_nothing() {
        assert_eq!(eval("10 ÷ 0"), None);
        assert_eq!(eval("0 / 0"), None);
    }

    #[test]
    fn rejects_non_arithmetic_text() {
        assert_eq!(eval("hello"), None);
        assert_eq!(eval("alert(1)"), None);
        assert_eq!(eval("2 ** 3"), None);
        assert_eq!(eval("2 ^ 3"), None);
        assert_eq!(eval("sqrt(4) + 1"), None);
        assert_eq!(eval("What is 2 + 2?"), None);
    }

    #[test]
    fn bare_numbers_are_not_suggested() {
        assert_eq!(eval("5"), None);
        assert_eq!(eval("(5)"), None);
        assert_eq!(eval("3.14 ="), None);
        assert_eq!(eval(""), None);
    }

    #[test]
    fn malformed_expressions_yield_nothing() {
        assert_eq!(eval("5 +"), None);
        assert_eq!(eval("* 5"), None);
        assert_eq!(eval("(2 + 3"), None);
        assert_eq!(eval("2 + 3)"), None);
        assert_eq!(eval("() + 1"), None);
        assert_eq!(eval("1.2.3 + 1"), None);
        assert_eq!(eval(". + 1"), None);
        assert_eq!(eval("2(3) + 1"), None);
    }

    #[test]
    fn unary_signs_and_leading_zeros() {
        assert_eq!(eval("-5 + 2").as_deref(), Some("-3"));
        assert_eq!(eval("5 - -3").as_deref(), Some("8"));
        assert_eq!(eval("2 * -3").as_deref(), Some("-6"));
        assert_eq!(eval("007 + 1").as_deref(), Some("8"));
        assert_eq!(eval("0 * -1").as_deref(), Some("0"));
        assert_eq!(eval(".5 + .5").as_deref(), Some("1"));
    }

    #[test]
    fn deep_nesting_is_bounded() {
        let deep = format!("{}1{}+1", "(".repeat(500), ")".repeat(500));
        assert_eq!(eval(&deep), None);

        let shallow = format!("{}1{}+1", "(".repeat(10), ")".repeat(10));
        assert_eq!(eval(&shallow).as_deref(), Some("2"));
    }
}
