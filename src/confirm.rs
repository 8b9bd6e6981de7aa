use std::io::{self, BufRead, Write};

/// Owner of the interactive prompt. The orchestrator blocks on this before
/// any state-changing submission; handing it in explicitly keeps the flow
/// scriptable in tests.
pub trait Confirmer {
    fn confirm(&mut self, preview: &[(&str, String)]) -> bool;
}

/// `y`/`yes` in any case approves; everything else, including empty input,
/// declines.
pub fn parse_approval(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

/// Renders the preview frame and blocks on one line of operator input.
pub struct StdinConfirmer;

impl Confirmer for StdinConfirmer {
    fn confirm(&mut self, preview: &[(&str, String)]) -> bool {
        println!("┌─── Transaction Preview ───┐");
        for (label, value) in preview {
            println!("│ {:<10} : {}", label, value);
        }
        println!("└───────────────────────────┘");
        match prompt("Confirm transaction? (y/n): ") {
            Ok(answer) => parse_approval(&answer),
            // A closed stdin is a decline, not a crash.
            Err(_) => false,
        }
    }
}

/// Reads one trimmed line from stdin. EOF reports as an error so callers
/// can stop cleanly instead of spinning.
pub fn prompt(message: &str) -> io::Result<String> {
    print!("{}", message);
    io::stdout().flush()?;
    let mut line = String::new();
    let read = io::stdin().lock().read_line(&mut line)?;
    if read == 0 {
        return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "input closed"));
    }
    Ok(line.trim().to_string())
}

#[cfg(test)]
pub mod scripted {
    use super::Confirmer;
    use std::collections::VecDeque;

    /// Test double: records every preview it is shown and replays
    /// programmed answers. Running out of answers declines.
    pub struct ScriptedConfirmer {
        answers: VecDeque<bool>,
        pub previews: Vec<Vec<(String, String)>>,
    }

    impl ScriptedConfirmer {
        pub fn new(answers: impl IntoIterator<Item = bool>) -> Self {
            Self {
                answers: answers.into_iter().collect(),
                previews: Vec::new(),
            }
        }
    }

    impl Confirmer for ScriptedConfirmer {
        fn confirm(&mut self, preview: &[(&str, String)]) -> bool {
            self.previews.push(
                preview
                    .iter()
                    .map(|(label, value)| (label.to_string(), value.clone()))
                    .collect(),
            );
            self.answers.pop_front().unwrap_or(false)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn yes_variants_approve() {
        assert!(parse_approval("y"));
        assert!(parse_approval("Y"));
        assert!(parse_approval("yes"));
        assert!(parse_approval("YES"));
        assert!(parse_approval("  y  "));
    }

    #[test]
    fn everything_else_declines() {
        assert!(!parse_approval(""));
        assert!(!parse_approval("n"));
        assert!(!parse_approval("no"));
        assert!(!parse_approval("maybe"));
        assert!(!parse_approval("yess"));
    }
}
