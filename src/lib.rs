//! Front end for TINY: a scanner, and a recursive descent parser that builds
//! the parse tree as it matches.

pub mod data;
pub mod expr;
pub mod lex;
pub mod parse;
pub mod report;
pub mod tree;

pub use data::SourceLocation;
pub use data::Token;
pub use data::TokenType;
pub use lex::scan;
pub use lex::LexError;
pub use lex::Scan;
pub use parse::parse;
pub use parse::SyntaxError;
pub use report::Report;
pub use tree::NodeKind;
pub use tree::TreeNode;
