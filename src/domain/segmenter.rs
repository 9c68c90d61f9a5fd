//! Long-message handling: truncation and word-boundary aware splitting.

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use crate::domain::validation::ValidationError;

/// Maximum number of characters in a single SMS segment.
pub const SEGMENT_MAX_CHARS: usize = 160;

/// Characters kept by [`SplitPolicy::Truncate`], one more than [`SEGMENT_MAX_CHARS`].
pub const TRUNCATE_CHARS: usize = SEGMENT_MAX_CHARS + 1;

/// Head budget of the first fragment, leaving room for `...(1/N)`.
const FIRST_FRAGMENT_BUDGET: usize = 152;

/// Head budget of every later fragment, leaving room for `(k/N)`.
const NEXT_FRAGMENT_BUDGET: usize = 155;

/// How bodies longer than one segment are handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(try_from = "String")]
pub enum SplitPolicy {
    /// Send the body unchanged and let the gateway accept or reject it.
    SendAsIs,
    /// Keep the first [`TRUNCATE_CHARS`] characters.
    Truncate,
    /// Split into numbered fragments on word boundaries.
    #[default]
    Split,
}

impl SplitPolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::SendAsIs => "send",
            Self::Truncate => "cut",
            Self::Split => "split",
        }
    }
}

impl fmt::Display for SplitPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SplitPolicy {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "send" | "send_as_is" => Ok(Self::SendAsIs),
            "cut" | "truncate" => Ok(Self::Truncate),
            "split" => Ok(Self::Split),
            _ => Err(ValidationError::UnknownSplitPolicy {
                input: s.to_owned(),
            }),
        }
    }
}

impl TryFrom<String> for SplitPolicy {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Apply `policy` to `body`, returning the fragments to send in order.
///
/// Bodies of at most [`SEGMENT_MAX_CHARS`] characters come back unchanged
/// whatever the policy. The body is assumed to be non-empty.
pub fn segment(body: &str, policy: SplitPolicy) -> Vec<String> {
    if body.chars().count() <= SEGMENT_MAX_CHARS {
        return vec![body.to_owned()];
    }

    match policy {
        SplitPolicy::SendAsIs => vec![body.to_owned()],
        SplitPolicy::Truncate => vec![body.chars().take(TRUNCATE_CHARS).collect()],
        SplitPolicy::Split => number_fragments(split_on_boundaries(body)),
    }
}

fn split_on_boundaries(body: &str) -> Vec<&str> {
    let mut fragments = Vec::new();
    let mut rest = body;
    let mut budget = FIRST_FRAGMENT_BUDGET;

    loop {
        match cut_point(rest, budget) {
            None => {
                fragments.push(rest);
                return fragments;
            }
            Some(at) => {
                let (head, tail) = rest.split_at(at);
                fragments.push(head);
                rest = tail;
                budget = NEXT_FRAGMENT_BUDGET;
            }
        }
    }
}

/// Byte offset at which `text` must be cut so the head fits in `budget`
/// characters, or `None` when the whole text already fits.
///
/// The cut lands right after the last boundary character within the budget;
/// without one it falls exactly on the budget.
fn cut_point(text: &str, budget: usize) -> Option<usize> {
    let mut hard_cut = None;
    let mut soft_cut = None;

    for (seen, (idx, ch)) in text.char_indices().enumerate() {
        if seen == budget {
            hard_cut = Some(idx);
            break;
        }
        if is_boundary(ch) {
            soft_cut = Some(idx + ch.len_utf8());
        }
    }

    let hard_cut = hard_cut?;
    Some(soft_cut.unwrap_or(hard_cut))
}

fn is_boundary(ch: char) -> bool {
    ch.is_whitespace() || matches!(ch, '.' | ',' | '!' | ';' | ':' | '-' | ')')
}

fn number_fragments(fragments: Vec<&str>) -> Vec<String> {
    let total = fragments.len();
    fragments
        .into_iter()
        .enumerate()
        .map(|(idx, fragment)| match idx {
            0 => format!("{fragment}...(1/{total})"),
            _ => format!("({}/{total}){fragment}", idx + 1),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(count: usize) -> String {
        (0..count)
            .map(|idx| format!("word{idx:03}"))
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn strip_numbering(fragments: &[String]) -> String {
        let total = fragments.len();
        fragments
            .iter()
            .enumerate()
            .map(|(idx, fragment)| match idx {
                0 => fragment
                    .strip_suffix(&format!("...(1/{total})"))
                    .unwrap()
                    .to_owned(),
                _ => fragment
                    .strip_prefix(&format!("({}/{total})", idx + 1))
                    .unwrap()
                    .to_owned(),
            })
            .collect()
    }

    #[test]
    fn short_bodies_pass_through_every_policy() {
        let exact = "x".repeat(SEGMENT_MAX_CHARS);
        for policy in [SplitPolicy::SendAsIs, SplitPolicy::Truncate, SplitPolicy::Split] {
            assert_eq!(segment("hello", policy), vec!["hello".to_owned()]);
            assert_eq!(segment(&exact, policy), vec![exact.clone()]);
        }
    }

    #[test]
    fn truncate_keeps_one_more_than_segment_limit() {
        let body = "a".repeat(300);
        let fragments = segment(&body, SplitPolicy::Truncate);
        assert_eq!(fragments.len(), 1);
        assert_eq!(fragments[0].chars().count(), 161);
    }

    #[test]
    fn send_as_is_keeps_long_body() {
        let body = "b".repeat(400);
        assert_eq!(segment(&body, SplitPolicy::SendAsIs), vec![body]);
    }

    #[test]
    fn split_numbers_fragments_and_reconstructs_body() {
        let body = words(80);
        assert!(body.chars().count() > SEGMENT_MAX_CHARS);

        let fragments = segment(&body, SplitPolicy::Split);
        let total = fragments.len();
        assert!(total >= 2);
        assert!(fragments[0].ends_with(&format!("...(1/{total})")));
        for (idx, fragment) in fragments.iter().enumerate().skip(1) {
            assert!(fragment.starts_with(&format!("({}/{total})", idx + 1)));
        }
        for fragment in &fragments {
            assert!(fragment.chars().count() <= SEGMENT_MAX_CHARS, "{fragment}");
        }
        assert_eq!(strip_numbering(&fragments), body);
    }

    #[test]
    fn split_cuts_after_last_boundary() {
        let body = words(30);
        let fragments = segment(&body, SplitPolicy::Split);
        // Every "wordNNN" is 7 chars plus a space, so 19 words fill 152 chars.
        assert_eq!(fragments.len(), 2);
        let first_head = fragments[0].strip_suffix("...(1/2)").unwrap();
        assert!(first_head.ends_with(' '));
        assert_eq!(first_head.chars().count(), 152);
        assert!(fragments[1].starts_with("(2/2)word019"));
    }

    #[test]
    fn split_hard_cuts_without_boundary() {
        let body = "z".repeat(400);
        let fragments = segment(&body, SplitPolicy::Split);
        assert_eq!(fragments.len(), 3);
        assert_eq!(fragments[0], format!("{}...(1/3)", "z".repeat(152)));
        assert_eq!(fragments[1], format!("(2/3){}", "z".repeat(155)));
        assert_eq!(fragments[2], format!("(3/3){}", "z".repeat(93)));
    }

    #[test]
    fn split_recognizes_punctuation_boundaries() {
        let mut body = "y".repeat(100);
        body.push(')');
        body.push_str(&"y".repeat(100));
        let fragments = segment(&body, SplitPolicy::Split);
        assert_eq!(fragments.len(), 2);
        assert_eq!(fragments[0], format!("{})...(1/2)", "y".repeat(100)));
        assert_eq!(fragments[1], format!("(2/2){}", "y".repeat(100)));
    }

    #[test]
    fn split_counts_characters_not_bytes() {
        let body = "é".repeat(200);
        let fragments = segment(&body, SplitPolicy::Split);
        assert_eq!(fragments.len(), 2);
        assert_eq!(fragments[0], format!("{}...(1/2)", "é".repeat(152)));
        assert_eq!(fragments[1], format!("(2/2){}", "é".repeat(48)));
    }

    #[test]
    fn split_policy_parses_config_strings() {
        assert_eq!("send".parse::<SplitPolicy>(), Ok(SplitPolicy::SendAsIs));
        assert_eq!("CUT".parse::<SplitPolicy>(), Ok(SplitPolicy::Truncate));
        assert_eq!(" truncate ".parse::<SplitPolicy>(), Ok(SplitPolicy::Truncate));
        assert_eq!("split".parse::<SplitPolicy>(), Ok(SplitPolicy::Split));
        assert_eq!(
            "shred".parse::<SplitPolicy>(),
            Err(ValidationError::UnknownSplitPolicy {
                input: "shred".to_owned()
            })
        );
        for policy in [SplitPolicy::SendAsIs, SplitPolicy::Truncate, SplitPolicy::Split] {
            assert_eq!(policy.as_str().parse::<SplitPolicy>(), Ok(policy));
        }
    }
}
