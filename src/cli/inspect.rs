//! Token, AST and canonical-text views of a query

use super::CliError;
use crate::{Result, Token, parse, print, tokenize};

/// One line per token: offsets, kind and source text.
pub fn token_table(query: &str) -> Result<String> {
    let tokens: Vec<Token> = tokenize(query).collect::<Result<_>>()?;
    let lines: Vec<String> = tokens
        .iter()
        .map(|token| {
            format!(
                "{:>4}..{:<4} {:<12} {}",
                token.start,
                token.end,
                format!("{:?}", token.kind),
                token.lexeme
            )
        })
        .collect();
    Ok(lines.join("\n"))
}

pub fn ast_json(query: &str, pretty: bool) -> std::result::Result<String, CliError> {
    let expr = parse(query)?;
    let json = if pretty {
        serde_json::to_string_pretty(&expr)?
    } else {
        serde_json::to_string(&expr)?
    };
    Ok(json)
}

pub fn format_query(query: &str) -> Result<String> {
    Ok(print(&parse(query)?))
}
