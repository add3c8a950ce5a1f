use crate::error::ExprError;
use crate::expr::token::{tokenize, Token, TokenKind};

/// Unary operators of the formula language
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    /// `-a`
    Negate,
    /// `~A`
    Normalize,
    /// `|a|`
    Magnitude,
}

/// Binary operators of the formula language
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Cross,
    Dot,
}

impl BinaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Cross => "x",
            BinaryOp::Dot => ".",
        }
    }
}

impl UnaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            UnaryOp::Negate => "-",
            UnaryOp::Normalize => "~",
            UnaryOp::Magnitude => "| |",
        }
    }
}

/// Abstract syntax tree of a formula
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Number(f64),
    Symbol(String),
    Unary {
        op: UnaryOp,
        operand: Box<Node>,
    },
    Literal(Box<[Node; 3]>),
    Binary {
        op: BinaryOp,
        lhs: Box<Node>,
        rhs: Box<Node>,
    },
}

/// Parses formula source into a syntax tree.
///
/// ```text
/// expr    := term (('+' | '-') term)*
/// term    := product (('*' | '/') product)*
/// product := unary (('x' | '.') unary)*
/// unary   := ('-' | '~') unary | primary
/// primary := NUMBER | IDENT | '(' expr ')' | '|' expr '|' | '[' expr ',' expr ',' expr ']'
/// ```
pub fn parse(source: &str) -> Result<Node, ExprError> {
    let tokens = tokenize(source)?;
    let mut parser = Parser { tokens, pos: 0 };
    let node = parser.expr()?;

    if let Some(token) = parser.peek() {
        return Err(ExprError::UnexpectedToken {
            expected: "end of input",
            found: token.kind.to_string(),
            position: token.position,
        });
    }

    Ok(node)
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
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    /// Consumes the next token when it matches one of the operators in `table`
    fn operator(&mut self, table: &[(TokenKind, BinaryOp)]) -> Option<BinaryOp> {
        let token = self.peek()?;
        let op = table
            .iter()
            .find(|(kind, _)| *kind == token.kind)
            .map(|(_, op)| *op)?;
        self.pos += 1;
        Some(op)
    }

    fn binary_level(
        &mut self,
        table: &[(TokenKind, BinaryOp)],
        operand: fn(&mut Self) -> Result<Node, ExprError>,
    ) -> Result<Node, ExprError> {
        let mut lhs = operand(self)?;
        while let Some(op) = self.operator(table) {
            let rhs = operand(self)?;
            lhs = Node::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
        Ok(lhs)
    }

    fn expr(&mut self) -> Result<Node, ExprError> {
        self.binary_level(
            &[(TokenKind::Plus, BinaryOp::Add), (TokenKind::Minus, BinaryOp::Sub)],
            Self::term,
        )
    }

    fn term(&mut self) -> Result<Node, ExprError> {
        self.binary_level(
            &[(TokenKind::Star, BinaryOp::Mul), (TokenKind::Slash, BinaryOp::Div)],
            Self::product,
        )
    }

    fn product(&mut self) -> Result<Node, ExprError> {
        self.binary_level(
            &[(TokenKind::Cross, BinaryOp::Cross), (TokenKind::Dot, BinaryOp::Dot)],
            Self::unary,
        )
    }

    fn unary(&mut self) -> Result<Node, ExprError> {
        let op = match self.peek().map(|t| &t.kind) {
            Some(TokenKind::Minus) => UnaryOp::Negate,
            Some(TokenKind::Tilde) => UnaryOp::Normalize,
            _ => return self.primary(),
        };
        self.pos += 1;
        let operand = self.unary()?;
        Ok(Node::Unary {
            op,
            operand: Box::new(operand),
        })
    }

    fn primary(&mut self) -> Result<Node, ExprError> {
        let token = self.next().ok_or(ExprError::UnexpectedEnd { expected: "an operand" })?;

        match token.kind {
            TokenKind::Number(value) => Ok(Node::Number(value)),
            TokenKind::Ident(name) => Ok(Node::Symbol(name)),
            TokenKind::LParen => {
                let inner = self.expr()?;
                self.close(TokenKind::RParen, '(', token.position)?;
                Ok(inner)
            }
            TokenKind::Bar => {
                let inner = self.expr()?;
                self.close(TokenKind::Bar, '|', token.position)?;
                Ok(Node::Unary {
                    op: UnaryOp::Magnitude,
                    operand: Box::new(inner),
                })
            }
            TokenKind::LBracket => self.literal(token.position),
            other => Err(ExprError::UnexpectedToken {
                expected: "an operand",
                found: other.to_string(),
                position: token.position,
            }),
        }
    }

    fn literal(&mut self, open: usize) -> Result<Node, ExprError> {
        let mut elements = vec![self.expr()?];
        loop {
            match self.peek().map(|t| &t.kind) {
                Some(TokenKind::Comma) => {
                    self.pos += 1;
                    elements.push(self.expr()?);
                }
                Some(TokenKind::RBracket) => {
                    self.pos += 1;
                    break;
                }
                _ => return Err(ExprError::UnmatchedBracket { open: '[', position: open }),
            }
        }

        let found = elements.len();
        let elements: [Node; 3] = elements
            .try_into()
            .map_err(|_| ExprError::LiteralArity { found, position: open })?;
        Ok(Node::Literal(Box::new(elements)))
    }

    fn close(&mut self, expected: TokenKind, open: char, position: usize) -> Result<(), ExprError> {
        match self.peek() {
            Some(token) if token.kind == expected => {
                self.pos += 1;
                Ok(())
            }
            _ => Err(ExprError::UnmatchedBracket { open, position }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sym(name: &str) -> Box<Node> {
        Box::new(Node::Symbol(name.to_string()))
    }

    #[test]
    fn cross_binds_tighter_than_division() {
        let node = parse("A x B / r").unwrap();
        assert_eq!(
            node,
            Node::Binary {
                op: BinaryOp::Div,
                lhs: Box::new(Node::Binary {
                    op: BinaryOp::Cross,
                    lhs: sym("A"),
                    rhs: sym("B"),
                }),
                rhs: sym("r"),
            }
        );
    }

    #[test]
    fn subtraction_is_left_associative() {
        let node = parse("a - b - c").unwrap();
        assert_eq!(
            node,
            Node::Binary {
                op: BinaryOp::Sub,
                lhs: Box::new(Node::Binary {
                    op: BinaryOp::Sub,
                    lhs: sym("a"),
                    rhs: sym("b"),
                }),
                rhs: sym("c"),
            }
        );
    }

    #[test]
    fn magnitude_bars_wrap_an_expression() {
        let node = parse("|A - B|").unwrap();
        assert!(matches!(node, Node::Unary { op: UnaryOp::Magnitude, .. }));
    }

    #[test]
    fn literal_needs_three_components() {
        assert_eq!(
            parse("[1, 2]"),
            Err(ExprError::LiteralArity { found: 2, position: 0 })
        );
    }

    #[test]
    fn unclosed_brackets_are_reported_at_the_opening() {
        assert_eq!(
            parse("(A + B"),
            Err(ExprError::UnmatchedBracket { open: '(', position: 0 })
        );
        assert_eq!(
            parse("V + [0, 0, r"),
            Err(ExprError::UnmatchedBracket { open: '[', position: 4 })
        );
    }

    #[test]
    fn dangling_operator_hits_end_of_input() {
        assert_eq!(
            parse("A +"),
            Err(ExprError::UnexpectedEnd { expected: "an operand" })
        );
    }

    #[test]
    fn trailing_tokens_are_rejected() {
        assert!(matches!(
            parse("A B"),
            Err(ExprError::UnexpectedToken { expected: "end of input", .. })
        ));
    }
}
