//! Default fallback handlers: what happens to Bad and Help outcomes when
//! the embedding program has not installed its own.

use strsim::levenshtein;

use crate::errors::DispatchFailure;
use crate::matcher::{BadCommand, HelpRequest};

/// Default bad-command handler. Prints the failure to stderr, with a
/// fuzzy suggestion or the reachable candidates where that helps, and
/// reports exit code 1.
///
/// Public so a custom handler can special-case what it cares about and
/// delegate the rest here.
pub fn print_bad_command(bad: &BadCommand) -> i32 {
    eprintln!("{}", bad.failure);
    match &bad.failure {
        DispatchFailure::UnknownToken { token } => {
            if let Some(suggestion) = suggest_similar(token, &bad.candidates) {
                eprintln!("Did you mean: {}?", suggestion);
            } else if !bad.candidates.is_empty() {
                eprintln!("Expected one of: {}", bad.candidates.join(", "));
            }
        }
        DispatchFailure::Incomplete => {
            if !bad.candidates.is_empty() {
                eprintln!("Expected one of: {}", bad.candidates.join(", "));
            }
        }
        // Ambiguous lists its candidates in its own message; coercion and
        // option failures are self-contained.
        _ => {}
    }
    1
}

/// Default help handler. Prints the consumed prefix, the reached
/// command's own help, and one row per visible child.
pub fn print_help(help: &HelpRequest) -> i32 {
    if !help.prefix.is_empty() {
        println!("{}", help.prefix.join(" "));
    }
    if !help.help.is_empty() {
        println!("{}", help.help);
    }
    for topic in help.topics.iter().filter(|t| !t.hidden) {
        println!("{:>10} : {}", topic.display, topic.help);
    }
    0
}

/// Suggest a similar candidate using Levenshtein distance.
/// Returns Some(suggestion) if a close match is found (distance <= 2).
fn suggest_similar<'a>(input: &str, candidates: &'a [String]) -> Option<&'a str> {
    let input_lower = input.to_lowercase();
    let mut best_match: Option<(&str, usize)> = None;

    for candidate in candidates {
        let distance = levenshtein(&input_lower, candidate);
        if distance <= 2 {
            match best_match {
                Some((_, best_dist)) if distance >= best_dist => {}
                _ => best_match = Some((candidate, distance)),
            }
        }
    }

    best_match.map(|(candidate, _)| candidate)
}

// ============================================================================
// Tests
// ============================================================================
