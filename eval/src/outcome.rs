use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Pass,
    Fail,
    NoMatch,
    Error,
}

/// What running a case's steps produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepsOutput {
    /// Every step applied; holds the final text.
    Completed(String),
    /// The step at this index (0-based) found nothing to refactor.
    NoMatch { step: usize },
}

/// `None` means the steps failed with an error.
pub fn classify_outcome(output: Option<&StepsOutput>, expected: &str) -> Outcome {
    match output {
        Some(StepsOutput::Completed(actual)) if actual == expected => Outcome::Pass,
        Some(StepsOutput::Completed(_)) => Outcome::Fail,
        Some(StepsOutput::NoMatch { .. }) => Outcome::NoMatch,
        None => Outcome::Error,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pass_when_text_matches_exactly() {
        let output = StepsOutput::Completed("int x = 1;\n".to_string());
        assert_eq!(classify_outcome(Some(&output), "int x = 1;\n"), Outcome::Pass);
    }

    #[test]
    fn fail_on_any_byte_difference() {
        let output = StepsOutput::Completed("int x = 1;".to_string());
        assert_eq!(classify_outcome(Some(&output), "int x = 1;\n"), Outcome::Fail);
    }

    #[test]
    fn no_match_and_error() {
        let output = StepsOutput::NoMatch { step: 1 };
        assert_eq!(classify_outcome(Some(&output), ""), Outcome::NoMatch);
        assert_eq!(classify_outcome(None, ""), Outcome::Error);
    }
}
