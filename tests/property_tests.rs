//! Property-based tests for hierlog using proptest

use hierlog::prelude::*;
use hierlog::{CallSiteResolver, CodeFrame, Masker};
use proptest::prelude::*;

fn any_level() -> impl Strategy<Value = LogLevel> {
    prop::sample::select(LogLevel::ALL.to_vec())
}

// ============================================================================
// LogLevel Tests
// ============================================================================

proptest! {
    /// Level names parse back to the same level
    #[test]
    fn test_log_level_str_roundtrip(level in any_level()) {
        let parsed: LogLevel = level.to_str().parse().unwrap();
        prop_assert_eq!(level, parsed);
        prop_assert_eq!(level.to_string(), level.to_str());
    }

    /// Filtering agrees with the numeric rank
    #[test]
    fn test_meets_follows_rank(level in any_level(), min_level in any_level()) {
        prop_assert_eq!(level.meets(min_level), level.rank() >= min_level.rank());
        prop_assert_eq!(level.meets(min_level), level >= min_level);
    }

    /// Ranks 4 and above go to the error stream
    #[test]
    fn test_error_stream_threshold(level in any_level()) {
        prop_assert_eq!(level.is_error_stream(), level.rank() >= 4);
        prop_assert_eq!(LogLevel::from_rank(level.rank()), Some(level));
    }
}

// ============================================================================
// Code Frame Tests
// ============================================================================

proptest! {
    /// The window never reaches past the start or end of the source
    #[test]
    fn test_code_frame_window_is_clamped(
        total in 1usize..60,
        line_seed in 0usize..60,
        context in 0usize..10,
    ) {
        let line = line_seed % total + 1;
        let source = (1..=total).map(|n| format!("line {}", n)).collect::<Vec<_>>().join("\n");
        let frame = CodeFrame::extract(&source, line, None, context).unwrap();

        prop_assert_eq!(frame.lines_before.len(), context.min(line - 1));
        prop_assert_eq!(frame.lines_after.len(), context.min(total - line));
        prop_assert_eq!(&frame.relevant_line, &format!("line {}", line));
        prop_assert_eq!(frame.first_line_number, line - frame.lines_before.len());
    }

    /// Lines past the end of the source yield no frame
    #[test]
    fn test_code_frame_out_of_range(total in 1usize..30, past in 1usize..10) {
        let source = vec!["x"; total].join("\n");
        prop_assert!(CodeFrame::extract(&source, total + past, None, 5).is_none());
    }
}

// ============================================================================
// Path Tests
// ============================================================================

#[cfg(unix)]
proptest! {
    /// A path under the working directory loses exactly the directory prefix
    #[test]
    fn test_path_relative_to_cwd(
        cwd in prop::collection::vec("[a-z]{1,8}", 1..5),
        relative in prop::collection::vec("[a-z]{1,8}", 1..5),
    ) {
        let cwd_path = format!("/{}", cwd.join("/"));
        let relative_path = relative.join("/");
        let resolver = CallSiteResolver::with_cwd(&cwd_path);

        let cleaned = resolver.clean_file_path(&format!("{}/{}", cwd_path, relative_path));
        prop_assert_eq!(cleaned, relative_path);
    }
}

// ============================================================================
// Masking Tests
// ============================================================================

proptest! {
    /// Masked keys never leak their value and the source object is untouched
    #[test]
    fn test_masked_key_hides_value(secret in "[a-zA-Z0-9]{1,24}", other in "[a-z]{1,12}") {
        let masker = Masker::new(&["password".to_string()], &[], "[***]").unwrap();
        let value = LogValue::object([("password", secret.clone()), ("user", other.clone())]);

        let masked = masker.mask_value(&value);
        let masked = masked.as_object().unwrap();
        let password = masked.get("password").unwrap();
        let user = masked.get("user").unwrap();
        prop_assert_eq!(password.as_str(), Some("[***]"));
        prop_assert_eq!(user.as_str(), Some(other.as_str()));

        let original = value.as_object().unwrap().get("password").unwrap();
        prop_assert_eq!(original.as_str(), Some(secret.as_str()));
    }

    /// Regex masking removes every match from text
    #[test]
    fn test_regex_mask_removes_matches(text in "[a-z0-9 ]{0,40}") {
        let masker = Masker::new(&[], &[r"\d+".to_string()], "#").unwrap();
        let masked = masker.mask_text(&text);
        prop_assert!(!masked.chars().any(|c| c.is_ascii_digit()));
    }
}
