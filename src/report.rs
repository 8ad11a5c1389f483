use std::fs;
use std::io;
use std::path::Path;

use log::info;
use log::warn;

use crate::data::Token;
use crate::lex::scan;
use crate::lex::LexError;
use crate::parse::parse;
use crate::parse::SyntaxError;
use crate::tree::TreeNode;

#[derive(Debug, thiserror::Error)]
pub enum SaveError {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error("nothing to save: the program has no parse tree")]
    NoTree,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Lexical errors were found, so the parser never ran.
    Skipped,
    Parsed(Option<TreeNode>),
    Failed(SyntaxError),
}

/// One scan and parse of a source text.
#[derive(Debug, Clone)]
pub struct Report {
    pub source: String,
    /// Scanner output, comments included.
    pub tokens: Vec<Token>,
    pub lex_errors: Vec<LexError>,
    pub outcome: Outcome,
}

impl Report {
    pub fn build(source: impl Into<String>) -> Self {
        let source = source.into();
        let scan = scan(&source);
        let outcome = if scan.is_clean() {
            match parse(&scan.tokens) {
                Ok(root) => Outcome::Parsed(root),
                Err(e) => Outcome::Failed(e),
            }
        } else {
            warn!(
                "{} lexical errors, not building a parse tree",
                scan.errors.len()
            );
            Outcome::Skipped
        };
        Self {
            source,
            tokens: scan.tokens,
            lex_errors: scan.errors,
            outcome,
        }
    }

    /// The tokens the parser saw; syntax error indices point into this.
    pub fn parser_tokens(&self) -> Vec<Token> {
        crate::lex::strip_comments(&self.tokens)
    }

    pub fn root(&self) -> Option<&TreeNode> {
        match &self.outcome {
            Outcome::Parsed(root) => root.as_ref(),
            Outcome::Skipped | Outcome::Failed(_) => None,
        }
    }

    pub fn syntax_error(&self) -> Option<&SyntaxError> {
        match &self.outcome {
            Outcome::Failed(e) => Some(e),
            Outcome::Skipped | Outcome::Parsed(_) => None,
        }
    }

    /// The token a syntax error points at.
    pub fn offending_token(&self) -> Option<Token> {
        let e = self.syntax_error()?;
        self.parser_tokens().into_iter().nth(e.token_index)
    }

    pub fn has_errors(&self) -> bool {
        !self.lex_errors.is_empty() || !matches!(self.outcome, Outcome::Parsed(_))
    }

    /// Writes `code.txt`, `tokens.json` and `parseTree.txt` into `dir`,
    /// creating it if needed. Only a program with a parse tree is saved.
    pub fn save(&self, dir: &Path) -> Result<(), SaveError> {
        let root = self.root().ok_or(SaveError::NoTree)?;
        let tokens = self.parser_tokens();
        fs::create_dir_all(dir)?;
        fs::write(dir.join("code.txt"), &self.source)?;
        fs::write(
            dir.join("tokens.json"),
            serde_json::to_string_pretty(&tokens)?,
        )?;
        fs::write(dir.join("parseTree.txt"), root.to_string())?;
        info!("saved {} tokens to {}", tokens.len(), dir.display());
        Ok(())
    }
}
