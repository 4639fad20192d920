//! Argument normalization.
//!
//! Turns a raw argv into `(name, value)` pairs plus positional arguments:
//! - `--key=value` splits at the first `=`
//! - a name with no value of its own gets a synthetic `"true"`
//! - `-abc` is three flags, `-ea8` is `-e` plus `-a 8`
//! - everything after a literal `--` is positional, verbatim

use serde::Serialize;

/// Literal that ends name/value processing.
pub const SEPARATOR: &str = "--";

/// Value synthesized for names that carry no value.
pub const IMPLICIT_TRUE: &str = "true";

/// Whether `tok` is an option name: one or two dashes, then a letter.
///
/// `-5`, `-`, `--` and `---x` are values.
pub fn is_name(tok: &str) -> bool {
    tok.strip_prefix("--")
        .or_else(|| tok.strip_prefix('-'))
        .and_then(|body| body.chars().next())
        .is_some_and(char::is_alphabetic)
}

fn is_short_name(tok: &str) -> bool {
    !tok.starts_with("--") && is_name(tok)
}

/// Split at the first literal `--`. The separator itself belongs to neither side.
pub fn split_positional<S: AsRef<str>>(args: &[S]) -> (&[S], &[S]) {
    match args.iter().position(|a| a.as_ref() == SEPARATOR) {
        Some(idx) => (&args[..idx], &args[idx + 1..]),
        None => (args, &args[args.len()..]),
    }
}

/// Split every `name=value` token into `name`, `value` (first `=` only).
pub fn split_equals<S: AsRef<str>>(tokens: &[S]) -> Vec<String> {
    let mut out = Vec::with_capacity(tokens.len());
    for tok in tokens {
        let tok = tok.as_ref();
        match tok.split_once('=') {
            Some((name, value)) if is_name(tok) => {
                out.push(name.to_string());
                out.push(value.to_string());
            }
            _ => out.push(tok.to_string()),
        }
    }
    out
}

/// Insert `"true"` after every name that is followed by another name or ends
/// the stream.
pub fn add_bools<S: AsRef<str>>(tokens: &[S]) -> Vec<String> {
    let mut out = Vec::with_capacity(tokens.len() * 2);
    for (idx, tok) in tokens.iter().enumerate() {
        let tok = tok.as_ref();
        out.push(tok.to_string());
        if is_name(tok)
            && tokens
                .get(idx + 1)
                .is_none_or(|next| is_name(next.as_ref()))
        {
            out.push(IMPLICIT_TRUE.to_string());
        }
    }
    out
}

/// Expand clustered short names into explicit name/value tokens.
///
/// `-abc` becomes `-a true -b true -c true`; `-ea8` becomes `-e true -a 8`.
/// Single-letter names are left as they are.
pub fn expand_clusters<S: AsRef<str>>(tokens: &[S]) -> Vec<String> {
    let mut out = Vec::with_capacity(tokens.len());
    for tok in tokens {
        let tok = tok.as_ref();
        match explode_short(tok) {
            Some(pairs) => {
                for (name, value) in pairs {
                    out.push(name);
                    out.push(value);
                }
            }
            None => out.push(tok.to_string()),
        }
    }
    out
}

/// Decompose a short-name token letter by letter.
///
/// Returns `None` when the token is not a cluster (long names, values, and a
/// lone `-x`). Clustering stops at the first non-letter: the remainder (minus a
/// leading `=`) becomes the value of the last letter seen.
fn explode_short(tok: &str) -> Option<Vec<(String, String)>> {
    if !is_short_name(tok) {
        return None;
    }
    let body = &tok[1..];
    let split = body
        .char_indices()
        .find(|(_, c)| !c.is_alphabetic())
        .map(|(idx, _)| idx);
    let (letters, rest) = match split {
        Some(idx) => (&body[..idx], Some(&body[idx..])),
        None => (body, None),
    };

    if letters.chars().count() == 1 && rest.is_none() {
        return None;
    }

    let mut pairs: Vec<(String, String)> = letters
        .chars()
        .map(|c| (format!("-{c}"), IMPLICIT_TRUE.to_string()))
        .collect();
    if let (Some(rest), Some(last)) = (rest, pairs.last_mut()) {
        last.1 = rest.strip_prefix('=').unwrap_or(rest).to_string();
    }
    tracing::trace!(token = tok, count = pairs.len(), "expanded short cluster");
    Some(pairs)
}

/// A normalized argv: every name paired with exactly one value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Normalized {
    /// `(name, value)` in argument order; names keep their dashes.
    pub pairs: Vec<(String, String)>,
    /// Arguments not bound to a name, in the order encountered, followed by
    /// everything after `--`.
    pub positionals: Vec<String>,
}

impl Normalized {
    /// Flatten the pairs back into a token stream.
    ///
    /// Normalizing this stream again yields the same pairs, unless a value
    /// itself looks like a name (only possible through `--key=-x`).
    pub fn tokens(&self) -> Vec<String> {
        self.pairs
            .iter()
            .flat_map(|(name, value)| [name.clone(), value.clone()])
            .collect()
    }
}

/// Normalize a raw argv.
pub fn normalize<S: AsRef<str>>(args: &[S]) -> Normalized {
    let (named, after) = split_positional(args);
    let mut out = Normalized::default();

    let mut idx = 0;
    while idx < named.len() {
        let arg = named[idx].as_ref();
        idx += 1;

        if !is_name(arg) {
            tracing::trace!(token = arg, "unbound value becomes positional");
            out.positionals.push(arg.to_string());
            continue;
        }

        if let Some(pairs) = explode_short(arg) {
            out.pairs.extend(pairs);
            continue;
        }

        if let Some((name, value)) = arg.split_once('=') {
            tracing::trace!(name, value, "split inline value");
            out.pairs.push((name.to_string(), value.to_string()));
            continue;
        }

        match named.get(idx).map(|s| s.as_ref()) {
            Some(next) if !is_name(next) => {
                out.pairs.push((arg.to_string(), next.to_string()));
                idx += 1;
            }
            _ => {
                tracing::trace!(name = arg, "no value, inserting true");
                out.pairs.push((arg.to_string(), IMPLICIT_TRUE.to_string()));
            }
        }
    }

    if !after.is_empty() {
        tracing::trace!(count = after.len(), "captured arguments after separator");
    }
    out.positionals
        .extend(after.iter().map(|a| a.as_ref().to_string()));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(list: &[(&str, &str)]) -> Vec<(String, String)> {
        list.iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn name_detection() {
        assert!(is_name("-a"));
        assert!(is_name("--foo"));
        assert!(is_name("-é"));
        assert!(!is_name("-5"));
        assert!(!is_name("--5"));
        assert!(!is_name("-"));
        assert!(!is_name("--"));
        assert!(!is_name("---x"));
        assert!(!is_name("value"));
        assert!(!is_name(""));
    }

    #[test]
    fn add_bools_pairs_bare_names() {
        assert_eq!(add_bools(&["--foo"]), vec!["--foo", "true"]);
        assert_eq!(add_bools(&["--foo", "-b"]), vec!["--foo", "true", "-b", "true"]);
        assert_eq!(
            add_bools(&["--foo", "hello", "--bar"]),
            vec!["--foo", "hello", "--bar", "true"]
        );
    }

    #[test]
    fn split_equals_uses_first_equals_only() {
        assert_eq!(split_equals(&["--foo="]), vec!["--foo", ""]);
        assert_eq!(split_equals(&["--foo=hello=world"]), vec!["--foo", "hello=world"]);
        assert_eq!(split_equals(&["a=b"]), vec!["a=b"]);
        assert_eq!(split_equals(&["-5=3"]), vec!["-5=3"]);
    }

    #[test]
    fn split_then_add_bools_is_idempotent() {
        let inputs: Vec<Vec<&str>> = vec![
            vec!["--foo", "1", "--bar", "2"],
            vec!["--foo=1", "--bar"],
            vec!["-a", "-b", "x"],
            vec![],
        ];
        for input in inputs {
            let once = add_bools(&split_equals(&input));
            let twice = add_bools(&split_equals(&once));
            assert_eq!(once, twice, "input: {input:?}");
        }
    }

    #[test]
    fn clusters_expand_letter_by_letter() {
        assert_eq!(
            expand_clusters(&["-abc"]),
            vec!["-a", "true", "-b", "true", "-c", "true"]
        );
        assert_eq!(expand_clusters(&["-ea8"]), vec!["-e", "true", "-a", "8"]);
        assert_eq!(expand_clusters(&["-a5"]), vec!["-a", "5"]);
        assert_eq!(expand_clusters(&["-a", "5"]), vec!["-a", "5"]);
        assert_eq!(expand_clusters(&["--abc"]), vec!["--abc"]);
    }

    #[test]
    fn cluster_with_inline_equals_gives_value_to_last_letter() {
        assert_eq!(expand_clusters(&["-ab=5"]), vec!["-a", "true", "-b", "5"]);
        assert_eq!(expand_clusters(&["-a=5"]), vec!["-a", "5"]);
    }

    #[test]
    fn normalize_pairs_names_with_values() {
        let n = normalize(&["--foo", "hello", "--bar"]);
        assert_eq!(n.pairs, pairs(&[("--foo", "hello"), ("--bar", "true")]));
        assert!(n.positionals.is_empty());
    }

    #[test]
    fn name_looking_value_is_not_consumed() {
        let n = normalize(&["--foo", "-b", "x"]);
        assert_eq!(n.pairs, pairs(&[("--foo", "true"), ("-b", "x")]));
    }

    #[test]
    fn negative_numbers_are_values() {
        let n = normalize(&["-n", "-5", "--x", "-2.5"]);
        assert_eq!(n.pairs, pairs(&[("-n", "-5"), ("--x", "-2.5")]));
    }

    #[test]
    fn cluster_then_trailing_positionals() {
        let n = normalize(&["--name=Lucy", "-ea8", "math", "science", "art"]);
        assert_eq!(
            n.pairs,
            pairs(&[("--name", "Lucy"), ("-e", "true"), ("-a", "8")])
        );
        assert_eq!(n.positionals, vec!["math", "science", "art"]);
    }

    #[test]
    fn all_letter_cluster_does_not_take_next_value() {
        let n = normalize(&["-ab", "5"]);
        assert_eq!(n.pairs, pairs(&[("-a", "true"), ("-b", "true")]));
        assert_eq!(n.positionals, vec!["5"]);
    }

    #[test]
    fn separator_captures_everything_verbatim() {
        let n = normalize(&["pos", "--v", "--", "--x", "-abc", "--", "3"]);
        assert_eq!(n.pairs, pairs(&[("--v", "true")]));
        assert_eq!(n.positionals, vec!["pos", "--x", "-abc", "--", "3"]);
    }

    #[test]
    fn name_before_separator_is_a_flag() {
        let n = normalize(&["--v", "--", "x"]);
        assert_eq!(n.pairs, pairs(&[("--v", "true")]));
        assert_eq!(n.positionals, vec!["x"]);
    }

    #[test]
    fn normalize_is_idempotent_on_its_tokens() {
        let inputs: Vec<Vec<&str>> = vec![
            vec!["--name=Lucy", "-ea8", "--verbose"],
            vec!["--foo=", "-abc", "-f", "1"],
            vec!["-x", "--y", "2.5"],
        ];
        for input in inputs {
            let once = normalize(&input);
            let again = normalize(&once.tokens());
            assert_eq!(once.pairs, again.pairs, "input: {input:?}");
            assert!(again.positionals.is_empty());
        }
    }
}
