//! Pass 1: Lex and parse the document into statements, then drop joiners.

use crate::ast::{Operation, Statement};
use crate::error::ReadError;
use crate::options::{CaseMode, ReadOptions};
use crate::parser;
use std::borrow::Cow;

/// Parse `src` into the statements that carry meaning, in declaration order.
pub fn parse_statements(src: &str, options: &ReadOptions) -> Result<Vec<Statement>, ReadError> {
    let src = match options.case {
        CaseMode::Preserve => Cow::Borrowed(src),
        CaseMode::Lowercase => Cow::Owned(src.to_lowercase()),
    };
    let statements: Vec<Statement> = parser::parse(&src, options.numerals)?
        .into_iter()
        .filter(|s| s.op != Operation::Separator)
        .collect();
    tracing::debug!(statements = statements.len(), "parsed document");
    Ok(statements)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Value;

    #[test]
    fn separators_never_leave_pass_one() {
        let statements =
            parse_statements("a is 1 also b is 2 and also c is 3", &ReadOptions::default())
                .unwrap();
        assert_eq!(statements.len(), 3);
        assert!(statements.iter().all(|s| s.op != Operation::Separator));
    }

    #[test]
    fn lowercase_mode_folds_keys_and_strings() {
        let options = ReadOptions::default().with_case(CaseMode::Lowercase);
        let statements = parse_statements("Name IS \"Ada\"", &options).unwrap();
        assert_eq!(
            statements[0].op,
            Operation::Assign {
                path: vec!["name".into()],
                value: Value::String("ada".into()),
            }
        );
    }
}
