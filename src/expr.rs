//! Expressions: `exp`, `simpleExp`, `term` and `factor` as one precedence
//! climbing loop. Each call returns a finished subtree.

use nom::sequence::delimited;
use nom::Parser;

use crate::data::Token;
use crate::data::TokenType;
use crate::parse::accept;
use crate::parse::expect;
use crate::parse::into_syntax_error;
use crate::parse::within_height;
use crate::parse::Expected;
use crate::parse::PResult;
use crate::parse::SyntaxError;
use crate::parse::TokenInput;
use crate::parse::RED_ZONE;
use crate::parse::STACK_SEGMENT;
use crate::tree::TreeNode;


/// Binding strength, loosest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Tier {
    Comparison,
    Additive,
    Multiplicative,
    Operand,
}

impl Tier {
    fn of(ty: TokenType) -> Option<Tier> {
        match ty {
            TokenType::LessThan | TokenType::MoreThan | TokenType::Equal => Some(Tier::Comparison),
            TokenType::Plus | TokenType::Minus => Some(Tier::Additive),
            TokenType::Mult | TokenType::Div => Some(Tier::Multiplicative),
            _ => None,
        }
    }

    fn tighter(self) -> Tier {
        match self {
            Tier::Comparison => Tier::Additive,
            Tier::Additive => Tier::Multiplicative,
            Tier::Multiplicative | Tier::Operand => Tier::Operand,
        }
    }
}

pub(crate) fn expression(input: TokenInput) -> PResult<'_, TreeNode> {
    climb(input, Tier::Comparison)
}

fn climb(input: TokenInput, min: Tier) -> PResult<'_, TreeNode> {
    let (mut input, mut left) = factor(input)?;
    while let Some(operator) = input.peek() {
        let Some(tier) = Tier::of(operator.token_type) else {
            break;
        };
        if tier < min {
            break;
        }
        // Operands of a tier are built from the next tier up, which keeps
        // every tier left associative.
        let (rest, right) = climb(input.advance(), tier.tighter())?;
        let node = TreeNode::operator(operator.text.as_str(), left, right);
        (input, left) = within_height(rest, node)?;
        // At most one comparison per expression.
        if tier == Tier::Comparison {
            break;
        }
    }
    Ok((input, left))
}

fn factor(input: TokenInput) -> PResult<'_, TreeNode> {
    match input.peek() {
        Some(token) if token.token_type == TokenType::OpenBracket => {
            stacker::maybe_grow(RED_ZONE, STACK_SEGMENT, || {
                delimited(
                    accept(TokenType::OpenBracket),
                    expression,
                    expect(
                        TokenType::CloseBracket,
                        Expected::Token(TokenType::CloseBracket),
                    ),
                )
                .parse(input)
            })
        }
        Some(token) => match TreeNode::operand(token) {
            Some(node) => Ok((input.advance(), node)),
            None => Err(nom::Err::Failure(SyntaxError::unexpected(
                input,
                Some(Expected::Expression),
            ))),
        },
        None => Err(nom::Err::Failure(SyntaxError::unexpected(
            input,
            Some(Expected::Expression),
        ))),
    }
}

/// Reduces a flat run of operand, operator and bracket tokens to a single
/// expression subtree. Every token has to belong to the expression.
pub fn reduce(tokens: &[Token]) -> Result<TreeNode, SyntaxError> {
    let input = TokenInput::new(tokens);
    let (rest, node) = expression(input).map_err(|e| into_syntax_error(e, input))?;
    if rest.peek().is_some() {
        return Err(SyntaxError::unexpected(rest, None));
    }
    Ok(node)
}
