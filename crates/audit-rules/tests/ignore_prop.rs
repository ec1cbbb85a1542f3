//! Property-based tests for ignore matching.

use audit_rules::IgnoreSpec;
use bstr::BStr;
use proptest::prelude::*;

fn path_strategy() -> impl Strategy<Value = String> {
    proptest::collection::vec("[a-z]{1,5}(\\.[a-z]{1,3})?", 1..5).prop_map(|parts| parts.join("/"))
}

proptest! {
    /// With no patterns nothing is ignored.
    #[test]
    fn empty_spec_never_ignores(path in path_strategy()) {
        prop_assert!(!IgnoreSpec::compile(b"").matches(BStr::new(path.as_bytes())));
    }

    /// Comments and blank lines never change the outcome.
    #[test]
    fn comments_are_inert(path in path_strategy(), comment in "#[ -~]{0,20}") {
        let content = format!("{comment}\n\n   \n");
        prop_assert!(!IgnoreSpec::compile(content.as_bytes()).matches(BStr::new(path.as_bytes())));
    }

    /// Appending the negation of a file's own name re-includes it, unless a parent is excluded.
    #[test]
    fn trailing_negation_reincludes_top_level_file(name in "[a-z]{1,8}\\.[a-z]{1,3}") {
        let content = format!("*\n!{name}\n");
        prop_assert!(!IgnoreSpec::compile(content.as_bytes()).matches(BStr::new(name.as_bytes())));
    }

    /// An excluded directory keeps its descendants ignored, even against a later negation.
    #[test]
    fn excluded_directory_covers_descendants(dir in "[a-z]{1,6}", rest in path_strategy()) {
        let content = format!("{dir}/\n!{dir}/**\n");
        let path = format!("{dir}/{rest}");
        prop_assert!(IgnoreSpec::compile(content.as_bytes()).matches(BStr::new(path.as_bytes())));
    }
}
