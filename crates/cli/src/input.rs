//! Post text gathering.
//!
//! Positional arguments win and are joined with single spaces; with no
//! arguments, stdin is read to EOF and trimmed. Either way an empty
//! result means "no input" and the caller rejects it before any
//! browser launch.

use std::io::Read;

pub fn join_args(args: &[String]) -> Option<String> {
    if args.is_empty() {
        return None;
    }
    let joined = args.join(" ").trim().to_string();
    (!joined.is_empty()).then_some(joined)
}

pub fn gather(args: &[String]) -> Option<String> {
    if let Some(text) = join_args(args) {
        return Some(text);
    }
    let mut buf = String::new();
    std::io::stdin().read_to_string(&mut buf).ok()?;
    let trimmed = buf.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn multiple_args_join_with_single_spaces() {
        assert_eq!(
            join_args(&args(&["hello", "brave", "world"])).as_deref(),
            Some("hello brave world")
        );
    }

    #[test]
    fn no_args_yields_none() {
        assert_eq!(join_args(&[]), None);
    }

    #[test]
    fn whitespace_only_args_yield_none() {
        assert_eq!(join_args(&args(&["  ", ""])), None);
    }

    #[test]
    fn single_arg_passes_through_trimmed() {
        assert_eq!(join_args(&args(&["  hi  "])).as_deref(), Some("hi"));
    }
}
