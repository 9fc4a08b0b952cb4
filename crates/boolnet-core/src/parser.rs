//! Rule text parser.
//!
//! Rule lines have the form `name = expression`. Expressions combine node
//! names with the case-sensitive keywords `AND`, `OR`, `NOT`, the constants
//! `0` and `1`, and parentheses. Precedence is `NOT` > `AND` > `OR`; binary
//! operators associate to the left.
//!
//! Blank lines and lines starting with `#` are skipped.
//!
//! Nesting is bounded by [`MAX_DEPTH`], both for `NOT`/parenthesis nesting
//! while parsing and for the depth of the resulting tree, so evaluation
//! never recurses further than that on a worker stack.

use crate::{
    error::{CompileError, SyntaxErrorKind},
    expr::Expr,
};

const AND: &str = "AND";
const OR: &str = "OR";
const NOT: &str = "NOT";

/// Deepest expression a rule may nest.
pub const MAX_DEPTH: usize = 256;

/// One parsed `name = expression` line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleLine {
    /// 1-based line number in the source text
    pub line: usize,
    /// Node the rule updates
    pub target: String,
    /// Right-hand side, leaves still named
    pub expr: Expr<String>,
}

/// Parse every rule line of `text`.
///
/// Stops at the first malformed line.
pub fn parse_rules(text: &str) -> Result<Vec<RuleLine>, CompileError> {
    let mut rules = Vec::new();
    for (index, raw) in text.lines().enumerate() {
        if let Some(rule) = parse_rule_line(index + 1, raw)? {
            rules.push(rule);
        }
    }
    Ok(rules)
}

/// Parse a single line. Returns `None` for blank and comment lines.
pub fn parse_rule_line(line: usize, raw: &str) -> Result<Option<RuleLine>, CompileError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Ok(None);
    }

    let syntax = |kind| CompileError::Syntax { line, kind };

    let Some((lhs, rhs)) = raw.split_once('=') else {
        return Err(syntax(SyntaxErrorKind::MissingAssignment));
    };

    let target = lhs.trim();
    if !is_node_name(target) {
        return Err(syntax(SyntaxErrorKind::InvalidTarget(target.to_string())));
    }

    // Columns are 1-based byte offsets into the whole line.
    let rhs_offset = lhs.len() + 1;
    let tokens = tokenize(rhs, rhs_offset).map_err(syntax)?;
    let end_column = raw.len() + 1;
    let expr = Parser::new(tokens, line, end_column).parse()?;

    Ok(Some(RuleLine { line, target: target.to_string(), expr }))
}

/// Parse a bare expression (no `name =` prefix), reporting errors on `line`.
pub fn parse_expr(text: &str, line: usize) -> Result<Expr<String>, CompileError> {
    let tokens =
        tokenize(text, 0).map_err(|kind| CompileError::Syntax { line, kind })?;
    Parser::new(tokens, line, text.len() + 1).parse()
}

/// Identifier usable as a node name: word characters, not a keyword or
/// constant.
pub fn is_node_name(name: &str) -> bool {
    !name.is_empty()
        && name.chars().all(is_word_char)
        && !matches!(name, AND | OR | NOT | "0" | "1")
}

fn is_word_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_'
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum TokenKind {
    Word(String),
    Open,
    Close,
}

#[derive(Debug, Clone)]
struct Token {
    kind: TokenKind,
    column: usize,
}

impl Token {
    fn text(&self) -> String {
        match &self.kind {
            TokenKind::Word(word) => word.clone(),
            TokenKind::Open => "(".to_string(),
            TokenKind::Close => ")".to_string(),
        }
    }
}

fn tokenize(text: &str, offset: usize) -> Result<Vec<Token>, SyntaxErrorKind> {
    let mut tokens = Vec::new();
    let mut chars = text.char_indices().peekable();

    while let Some((index, ch)) = chars.next() {
        let column = offset + index + 1;
        match ch {
            c if c.is_whitespace() => {},
            '(' => tokens.push(Token { kind: TokenKind::Open, column }),
            ')' => tokens.push(Token { kind: TokenKind::Close, column }),
            c if is_word_char(c) => {
                let mut word = String::from(c);
                while let Some(&(_, next)) = chars.peek() {
                    if !is_word_char(next) {
                        break;
                    }
                    word.push(next);
                    chars.next();
                }
                tokens.push(Token { kind: TokenKind::Word(word), column });
            },
            ch => return Err(SyntaxErrorKind::UnexpectedCharacter { ch, column }),
        }
    }

    Ok(tokens)
}

/// Parsed subexpression and its tree depth.
type Parsed = (Expr<String>, usize);

/// Recursive-descent parser over one line's tokens.
struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    line: usize,
    end_column: usize,
    /// Open `NOT`s and parentheses on the current descent
    nesting: usize,
}

impl Parser {
    fn new(tokens: Vec<Token>, line: usize, end_column: usize) -> Self {
        Self { tokens, pos: 0, line, end_column, nesting: 0 }
    }

    fn parse(mut self) -> Result<Expr<String>, CompileError> {
        let (expr, _) = self.or_expr()?;
        match self.peek() {
            None => Ok(expr),
            Some(token) => Err(self.unexpected_after_operand(token)),
        }
    }

    fn or_expr(&mut self) -> Result<Parsed, CompileError> {
        let (mut expr, mut depth) = self.and_expr()?;
        while let Some(column) = self.eat_keyword(OR) {
            let (rhs, rhs_depth) = self.and_expr()?;
            depth = self.deeper(depth.max(rhs_depth), column)?;
            expr = Expr::or(expr, rhs);
        }
        Ok((expr, depth))
    }

    fn and_expr(&mut self) -> Result<Parsed, CompileError> {
        let (mut expr, mut depth) = self.unary()?;
        while let Some(column) = self.eat_keyword(AND) {
            let (rhs, rhs_depth) = self.unary()?;
            depth = self.deeper(depth.max(rhs_depth), column)?;
            expr = Expr::and(expr, rhs);
        }
        Ok((expr, depth))
    }

    fn unary(&mut self) -> Result<Parsed, CompileError> {
        let Some(column) = self.eat_keyword(NOT) else {
            return self.atom();
        };
        self.enter(column)?;
        let (inner, depth) = self.unary()?;
        self.nesting -= 1;
        Ok((Expr::not(inner), self.deeper(depth, column)?))
    }

    fn atom(&mut self) -> Result<Parsed, CompileError> {
        let Some(token) = self.peek().cloned() else {
            return Err(self.syntax(SyntaxErrorKind::EmptyClause { column: self.end_column }));
        };

        match token.kind {
            TokenKind::Open => {
                self.pos += 1;
                self.enter(token.column)?;
                let inner = self.or_expr()?;
                self.nesting -= 1;
                match self.peek() {
                    Some(Token { kind: TokenKind::Close, .. }) => {
                        self.pos += 1;
                        Ok(inner)
                    },
                    None => {
                        Err(self.syntax(SyntaxErrorKind::UnclosedParen { column: token.column }))
                    },
                    Some(other) => Err(self.unexpected_after_operand(other)),
                }
            },
            TokenKind::Close => {
                Err(self.syntax(SyntaxErrorKind::EmptyClause { column: token.column }))
            },
            TokenKind::Word(word) => {
                if matches!(word.as_str(), AND | OR) {
                    return Err(self.syntax(SyntaxErrorKind::ExpectedOperand {
                        column: token.column,
                        found: word,
                    }));
                }
                self.pos += 1;
                let leaf = match word.as_str() {
                    "0" => Expr::Const(false),
                    "1" => Expr::Const(true),
                    _ => Expr::Var(word),
                };
                Ok((leaf, 1))
            },
        }
    }

    /// Descend into a `NOT` or `(` at `column`.
    fn enter(&mut self, column: usize) -> Result<(), CompileError> {
        self.nesting += 1;
        if self.nesting > MAX_DEPTH {
            return Err(self.syntax(SyntaxErrorKind::NestingTooDeep { column }));
        }
        Ok(())
    }

    /// Depth of a new operator node over children at most `depth` deep.
    fn deeper(&self, depth: usize, column: usize) -> Result<usize, CompileError> {
        let depth = depth + 1;
        if depth > MAX_DEPTH {
            return Err(self.syntax(SyntaxErrorKind::NestingTooDeep { column }));
        }
        Ok(depth)
    }

    /// Error for a token found where an operator or the end was expected.
    fn unexpected_after_operand(&self, token: &Token) -> CompileError {
        match token.kind {
            TokenKind::Close => self.syntax(SyntaxErrorKind::UnexpectedParen { column: token.column }),
            TokenKind::Word(_) | TokenKind::Open => {
                CompileError::UndefinedOperator { line: self.line, token: token.text() }
            },
        }
    }

    /// Consume `keyword` if it is next, returning its column.
    fn eat_keyword(&mut self, keyword: &str) -> Option<usize> {
        match self.peek() {
            Some(Token { kind: TokenKind::Word(word), column }) if word == keyword => {
                let column = *column;
                self.pos += 1;
                Some(column)
            },
            _ => None,
        }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn syntax(&self, kind: SyntaxErrorKind) -> CompileError {
        CompileError::Syntax { line: self.line, kind }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Result<Expr<String>, CompileError> {
        parse_expr(text, 1)
    }

    fn var(name: &str) -> Expr<String> {
        Expr::Var(name.to_string())
    }

    #[test]
    fn precedence_not_and_or() {
        let expr = parse("a OR NOT b AND c").unwrap();
        assert_eq!(expr, Expr::or(var("a"), Expr::and(Expr::not(var("b")), var("c"))));
    }

    #[test]
    fn binary_operators_associate_left() {
        let expr = parse("a AND b AND c").unwrap();
        assert_eq!(expr, Expr::and(Expr::and(var("a"), var("b")), var("c")));
    }

    #[test]
    fn parentheses_group_without_spaces() {
        let expr = parse("(a OR b)AND(NOT c)").unwrap();
        assert_eq!(expr, Expr::and(Expr::or(var("a"), var("b")), Expr::not(var("c"))));
    }

    #[test]
    fn constants_parse() {
        assert_eq!(parse("1").unwrap(), Expr::Const(true));
        assert_eq!(parse("NOT 0").unwrap(), Expr::not(Expr::Const(false)));
    }

    #[test]
    fn double_negation() {
        assert_eq!(parse("NOT NOT a").unwrap(), Expr::not(Expr::not(var("a"))));
    }

    #[test]
    fn unbalanced_parentheses() {
        assert!(matches!(
            parse("(a AND b"),
            Err(CompileError::Syntax { kind: SyntaxErrorKind::UnclosedParen { column: 1 }, .. })
        ));
        assert!(matches!(
            parse("a AND b)"),
            Err(CompileError::Syntax { kind: SyntaxErrorKind::UnexpectedParen { column: 8 }, .. })
        ));
    }

    #[test]
    fn empty_clauses() {
        assert!(matches!(
            parse(""),
            Err(CompileError::Syntax { kind: SyntaxErrorKind::EmptyClause { .. }, .. })
        ));
        assert!(matches!(
            parse("a AND"),
            Err(CompileError::Syntax { kind: SyntaxErrorKind::EmptyClause { .. }, .. })
        ));
        assert!(matches!(
            parse("()"),
            Err(CompileError::Syntax { kind: SyntaxErrorKind::EmptyClause { column: 2 }, .. })
        ));
        assert!(matches!(
            parse("a OR OR b"),
            Err(CompileError::Syntax { kind: SyntaxErrorKind::ExpectedOperand { .. }, .. })
        ));
    }

    #[test]
    fn unknown_operator_words() {
        assert_eq!(
            parse("a XOR b"),
            Err(CompileError::UndefinedOperator { line: 1, token: "XOR".to_string() })
        );
        // Keywords are case-sensitive
        assert_eq!(
            parse("a and b"),
            Err(CompileError::UndefinedOperator { line: 1, token: "and".to_string() })
        );
    }

    #[test]
    fn unknown_operator_symbols() {
        assert!(matches!(
            parse("a & b"),
            Err(CompileError::Syntax {
                kind: SyntaxErrorKind::UnexpectedCharacter { ch: '&', column: 3 },
                ..
            })
        ));
    }

    fn too_deep(result: Result<Expr<String>, CompileError>) -> Option<usize> {
        match result {
            Err(CompileError::Syntax {
                kind: SyntaxErrorKind::NestingTooDeep { column }, ..
            }) => Some(column),
            _ => None,
        }
    }

    #[test]
    fn long_not_chain_is_rejected() {
        let text = format!("{}b", "NOT ".repeat(10_000));
        // The 257th NOT starts at byte 1024
        assert_eq!(too_deep(parse(&text)), Some(1025));

        let err = parse_rule_line(2, &format!("a = {text}")).unwrap_err();
        assert_eq!(err.line(), 2);
    }

    #[test]
    fn deep_parentheses_are_rejected() {
        let text = format!("{}a{}", "(".repeat(10_000), ")".repeat(10_000));
        assert_eq!(too_deep(parse(&text)), Some(MAX_DEPTH + 1));

        let unclosed = "(".repeat(10_000);
        assert_eq!(too_deep(parse(&unclosed)), Some(MAX_DEPTH + 1));
    }

    #[test]
    fn long_operator_chain_is_rejected() {
        // Left association makes the tree as deep as the chain is long
        let text = std::iter::repeat_n("a", 10_000).collect::<Vec<_>>().join(" AND ");
        assert!(too_deep(parse(&text)).is_some());

        let text = std::iter::repeat_n("a", 10_000).collect::<Vec<_>>().join(" OR ");
        assert!(too_deep(parse(&text)).is_some());
    }

    #[test]
    fn nesting_up_to_the_bound_parses() {
        let deepest = format!("{}b", "NOT ".repeat(MAX_DEPTH - 1));
        assert_eq!(parse(&deepest).unwrap().size(), MAX_DEPTH);

        let one_more = format!("NOT {deepest}");
        assert_eq!(too_deep(parse(&one_more)), Some(1));

        let parens = format!("{}a{}", "(".repeat(MAX_DEPTH), ")".repeat(MAX_DEPTH));
        assert_eq!(parse(&parens).unwrap(), var("a"));

        let chain = std::iter::repeat_n("a", MAX_DEPTH).collect::<Vec<_>>().join(" AND ");
        assert_eq!(parse(&chain).unwrap().size(), 2 * MAX_DEPTH - 1);
    }

    #[test]
    fn rule_line_columns_are_line_relative() {
        let err = parse_rule_line(4, "x = (a").unwrap_err();
        assert_eq!(
            err,
            CompileError::Syntax { line: 4, kind: SyntaxErrorKind::UnclosedParen { column: 5 } }
        );
    }

    #[test]
    fn skips_blank_and_comment_lines() {
        assert_eq!(parse_rule_line(1, "   ").unwrap(), None);
        assert_eq!(parse_rule_line(2, "# header").unwrap(), None);
    }

    #[test]
    fn rejects_lines_without_assignment() {
        assert_eq!(
            parse_rule_line(3, "a AND b"),
            Err(CompileError::Syntax { line: 3, kind: SyntaxErrorKind::MissingAssignment })
        );
    }

    #[test]
    fn rejects_invalid_targets() {
        for bad in ["= a", "AND = a", "1 = a", "a b = c"] {
            assert!(matches!(
                parse_rule_line(1, bad),
                Err(CompileError::Syntax { kind: SyntaxErrorKind::InvalidTarget(_), .. })
            ));
        }
    }

    #[test]
    fn parses_multiline_text_with_line_numbers() {
        let rules = parse_rules("A = NOT B\n\nB = NOT A\n").unwrap();
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0].target, "A");
        assert_eq!(rules[1].line, 3);

        let err = parse_rules("A = B\nB = (A\n").unwrap_err();
        assert_eq!(err.line(), 2);
    }
}
