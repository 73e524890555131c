use proptest::prelude::*;
use relay::identity::{build_launch_key, is_match};
use relay::paths::canonical::{normalize_path, normalize_token_path};
use relay::paths::{PathRoots, PathTokenizer, TokenResolver};
use relay::storage::InstallInfo;

fn segment() -> impl Strategy<Value = String> {
    prop_oneof![
        6 => "[A-Za-z0-9_][A-Za-z0-9 _.]{0,6}[A-Za-z0-9_]",
        1 => Just(".".to_string()),
        1 => Just("..".to_string()),
        1 => Just("{gamesroot}".to_string()),
        1 => Just("{GameFolder}".to_string()),
    ]
}

fn separator() -> impl Strategy<Value = &'static str> {
    prop_oneof![Just("\\"), Just("/"), Just("\\\\"), Just("//")]
}

fn any_path() -> impl Strategy<Value = String> {
    (
        prop_oneof![Just(""), Just("C:\\"), Just("c:/"), Just("\\")],
        prop::collection::vec((segment(), separator()), 0..6),
        prop_oneof![Just(""), Just("\\"), Just("/"), Just("  ")],
    )
        .prop_map(|(prefix, parts, suffix)| {
            let mut path = prefix.to_string();
            for (segment, separator) in parts {
                path.push_str(&segment);
                path.push_str(separator);
            }
            path.push_str(suffix);
            path
        })
        .prop_filter("UNC prefixes need a server name", |path| {
            !path.starts_with("\\\\") && !path.starts_with("\\/")
        })
}

fn plain_segments() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec("[A-Za-z][A-Za-z0-9_]{0,7}", 1..5)
}

proptest! {
    #[test]
    fn test_normalize_token_path_is_idempotent(path in any_path()) {
        let once = normalize_token_path(&path);
        prop_assert_eq!(normalize_token_path(&once), once);
    }

    #[test]
    fn test_launch_key_ignores_case_and_separators(
        segments in plain_segments(),
        args in "[a-z\\- ]{0,12}",
    ) {
        let upper = format!("C:\\{}", segments.join("\\"));
        let lower = format!("c:/{}", segments.join("/").to_lowercase());
        let workdir_upper = format!("C:\\{}", segments[0]);
        let workdir_lower = format!("c:/{}/", segments[0].to_lowercase());

        let left = build_launch_key(&upper, &args, &workdir_upper);
        let right = build_launch_key(&lower, &args, &workdir_lower);
        prop_assert_eq!(&left, &right);
        prop_assert!(is_match(&left, &right.to_uppercase()));
        prop_assert_eq!(left, build_launch_key(&upper, &args, &workdir_upper));
    }

    #[test]
    fn test_tokenize_then_resolve_round_trips(segments in plain_segments()) {
        let roots = PathRoots::new("D:\\Lib\\Games", "E:\\Cache", "F:\\LaunchBox", "C:\\Relay");
        let install = InstallInfo::default();
        let path = format!("D:/Lib/Games/{}", segments.join("/"));

        let tokenized = PathTokenizer::new(&roots).tokenize(&path, &install);
        let games_root_prefix = "{GamesRoot}\\";
        prop_assert!(tokenized.starts_with(games_root_prefix));

        let resolved = TokenResolver::new(&roots).resolve(&tokenized, &install, None);
        prop_assert_eq!(resolved, Ok(normalize_path(&path)));
    }
}
