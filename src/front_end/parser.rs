use super::Event;
use itertools::Itertools;
use pest::{error::LineColLocation, iterators::Pair, Parser};
use pest_derive::Parser;

#[derive(Parser)]
#[grammar = "front_end/graph.pest"]
struct GraphParser;

/// Parse one line of a `.graph` file.
///
/// Returns `Ok(None)` for blank and comment lines. The error is a human readable
/// description of what is wrong with the line.
pub fn parse_line(input: &str) -> Result<Option<Event>, String> {
    let line = GraphParser::parse(Rule::line, input)
        .map_err(|e| {
            let column = match e.line_col {
                LineColLocation::Pos((_, col)) => col,
                LineColLocation::Span((_, col), _) => col,
            };
            format!("unexpected input at column {} in `{}`", column, input.trim())
        })?
        .next()
        .ok_or_else(|| String::from("empty parse"))?;
    match line.into_inner().next() {
        Some(pair) => match pair.as_rule() {
            Rule::vertex => {
                let (id, label) = pair
                    .into_inner()
                    .next_tuple()
                    .ok_or_else(|| unexpected(input))?;
                Ok(Some(Event::VertexDeclared {
                    id: parse_int(id)?,
                    label: parse_int(label)?,
                }))
            }
            Rule::edge => {
                let (_kind, source, target, label) = pair
                    .into_inner()
                    .next_tuple()
                    .ok_or_else(|| unexpected(input))?;
                Ok(Some(Event::EdgeDeclared {
                    source: parse_int(source)?,
                    target: parse_int(target)?,
                    label: parse_int(label)?,
                }))
            }
            Rule::comment | Rule::EOI => Ok(None),
            _ => Err(unexpected(input)),
        },
        None => Ok(None),
    }
}

fn parse_int(pair: Pair<Rule>) -> Result<i64, String> {
    pair.as_str()
        .parse()
        .map_err(|e| format!("`{}` is not a valid integer: {}", pair.as_str(), e))
}

fn unexpected(input: &str) -> String {
    format!("unexpected record `{}`", input.trim())
}
