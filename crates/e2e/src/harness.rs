//! Argument handling for the harness-less test binary

/// libtest flags `cargo test` may forward that take no value
const LIBTEST_SWITCHES: &[&str] = &[
    "--nocapture",
    "--show-output",
    "--quiet",
    "-q",
    "--ignored",
    "--include-ignored",
    "--exact",
    "--list",
];

/// libtest flags that take a value, as `--flag value` or `--flag=value`
const LIBTEST_OPTIONS: &[&str] = &["--test-threads", "--color", "--format", "--skip"];

/// Drop the libtest flags so clap only sees the runner's own arguments.
/// Everything else is passed through untouched and left for clap to reject.
pub fn strip_libtest_args<I, S>(args: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut kept = Vec::new();
    let mut args = args.into_iter().map(Into::into);

    while let Some(arg) = args.next() {
        if LIBTEST_SWITCHES.contains(&arg.as_str()) {
            continue;
        }

        let name = arg.split_once('=').map_or(arg.as_str(), |(name, _)| name);
        if LIBTEST_OPTIONS.contains(&name) {
            if !arg.contains('=') {
                args.next();
            }
            continue;
        }

        kept.push(arg);
    }

    kept
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_libtest_flags_are_dropped() {
        let args = strip_libtest_args([
            "e2e",
            "--nocapture",
            "--test-threads",
            "1",
            "--color=never",
            "--tag",
            "smoke",
        ]);
        assert_eq!(args, vec!["e2e", "--tag", "smoke"]);
    }

    #[test]
    fn test_unknown_flags_are_kept() {
        let args = strip_libtest_args(["e2e", "--tga", "smoke", "--help"]);
        assert_eq!(args, vec!["e2e", "--tga", "smoke", "--help"]);
    }
}
