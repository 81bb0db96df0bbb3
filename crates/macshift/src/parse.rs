//! Shared winnow helpers for parsing command output.

use winnow::ascii::space0;
use winnow::combinator::preceded;
use winnow::error::{ContextError, ErrMode};
use winnow::prelude::*;
use winnow::token::take_till;

/// Parser result used throughout the crate.
pub type PResult<T> = std::result::Result<T, ErrMode<ContextError>>;

/// A fatal parse error with no context.
pub(crate) fn cut() -> ErrMode<ContextError> {
    ErrMode::Cut(ContextError::new())
}

/// One whitespace-delimited word, skipping leading blanks.
pub(crate) fn word<'i>(input: &mut &'i str) -> PResult<&'i str> {
    preceded(space0, take_till(1.., char::is_whitespace)).parse_next(input)
}

/// Split a line into whitespace-delimited words.
pub(crate) fn words(line: &str) -> Vec<&str> {
    let mut input = line;
    let mut out = Vec::new();
    while let Ok(w) = word(&mut input) {
        out.push(w);
    }
    out
}

/// Check whether a comma separated flag list (the `<UP,BROADCAST,...>` part of
/// a header) contains `UP`.
pub(crate) fn flags_contain_up(flags: &str) -> bool {
    flags.split(',').any(|f| f == "UP")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_words() {
        assert_eq!(
            words("  ether 52:54:00:12:34:56  txqueuelen 1000"),
            vec!["ether", "52:54:00:12:34:56", "txqueuelen", "1000"]
        );
        assert!(words("   ").is_empty());
        assert!(words("").is_empty());
    }

    #[test]
    fn test_flags_contain_up() {
        assert!(flags_contain_up("UP,BROADCAST,RUNNING,MULTICAST"));
        assert!(flags_contain_up("BROADCAST,MULTICAST,UP,LOWER_UP"));
        assert!(!flags_contain_up("BROADCAST,MULTICAST"));
        assert!(!flags_contain_up("NO-CARRIER,BROADCAST,LOWER_UP"));
    }
}
