use std::io;
use std::io::Read;
use std::path::Path;
use std::path::PathBuf;

use clap::Parser;
use log::debug;

use tiny::lex::scan;
use tiny::report::SaveError;
use tiny::Report;
use tiny::SyntaxError;
use tiny::Token;

/// Scan and parse a TINY program
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Source file, or `-` for stdin
    file: PathBuf,

    /// Only run the scanner
    #[arg(long)]
    tokens_only: bool,

    /// Print tokens and the parse tree as JSON
    #[arg(long)]
    json: bool,

    /// Save code.txt, tokens.json and parseTree.txt into this directory
    #[arg(long, value_name = "DIR")]
    save: Option<PathBuf>,
}

#[derive(Debug, thiserror::Error)]
enum Error {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Save(#[from] SaveError),
    #[error("{file}: {count} lexical error(s)")]
    Lexical { file: String, count: usize },
    #[error("{file}: {error}{}", pointer(.file, .token))]
    Syntax {
        file: String,
        error: SyntaxError,
        token: Option<Token>,
    },
}

fn pointer(file: &str, token: &Option<Token>) -> String {
    match token {
        Some(token) => format!("\n  --> {}:{} '{}'", file, token.source_location, token.text),
        None => String::new(),
    }
}

type Result<T> = std::result::Result<T, Error>;

fn read_source(file: &Path) -> Result<String> {
    if file.as_os_str() == "-" {
        let mut text = String::new();
        io::stdin().read_to_string(&mut text)?;
        Ok(text)
    } else {
        Ok(std::fs::read_to_string(file)?)
    }
}

fn print_tokens(tokens: &[Token]) {
    println!("{:>5}  {:<13} value", "line", "type");
    for token in tokens.iter().filter(|t| !t.is_comment()) {
        println!(
            "{:>5}  {:<13} {}",
            token.line(),
            token.token_type.name(),
            token.text
        );
    }
}

fn run() -> Result<()> {
    let args = Args::parse();
    let source = read_source(&args.file)?;
    let name = args.file.display().to_string();
    debug!("read {} bytes from {}", source.len(), name);

    if args.tokens_only {
        let scan = scan(&source);
        if args.json {
            println!("{}", serde_json::to_string_pretty(&scan.parser_tokens())?);
        } else {
            print_tokens(&scan.tokens);
        }
        for e in &scan.errors {
            eprintln!("{}:{}", name, e);
        }
        return if scan.is_clean() {
            Ok(())
        } else {
            Err(Error::Lexical {
                file: name,
                count: scan.errors.len(),
            })
        };
    }

    let report = Report::build(source);
    if args.json {
        let output = serde_json::json!({
            "tokens": report.parser_tokens(),
            "tree": report.root(),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        print_tokens(&report.tokens);
        println!();
        match report.root() {
            Some(root) => print!("{}", root),
            None if report.syntax_error().is_none() && report.lex_errors.is_empty() => {
                println!("(empty program)")
            }
            None => {}
        }
    }

    for e in &report.lex_errors {
        eprintln!("{}:{}", name, e);
    }
    if !report.lex_errors.is_empty() {
        return Err(Error::Lexical {
            file: name,
            count: report.lex_errors.len(),
        });
    }
    if let Some(error) = report.syntax_error() {
        return Err(Error::Syntax {
            token: report.offending_token(),
            error: error.clone(),
            file: name,
        });
    }

    if let Some(dir) = &args.save {
        report.save(dir)?;
    }
    Ok(())
}

fn main() {
    let env = env_logger::Env::default()
        .filter_or("TINY_LOG", "warn")
        .write_style_or("TINY_LOG_STYLE", "auto");
    env_logger::init_from_env(env);

    match run() {
        Ok(()) => {}
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    }
}
