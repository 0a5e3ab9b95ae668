//! Staff-system names: "mA", "mB", … "mZ", "mAA", "mBB", … "mZZ", "mAAA", …
//!
//! LilyPond identifiers cannot contain digits, so each system is named by a
//! run of one repeated letter after an `m` prefix.

use crate::error::{Result, TabError};

const PREFIX: char = 'm';

/// Name following `previous`. An empty `previous` starts the sequence.
pub fn next_name(previous: &str) -> Result<String> {
    if previous.is_empty() {
        return Ok(format!("{PREFIX}A"));
    }

    let invalid = |reason| TabError::InvalidSequencerState {
        name: previous.to_string(),
        reason,
    };

    let letters = previous
        .strip_prefix(PREFIX)
        .ok_or_else(|| invalid("must start with 'm'"))?;
    let mut chars = letters.chars();
    let letter = chars
        .next()
        .ok_or_else(|| invalid("no letters after 'm'"))?;
    if chars.any(|c| c != letter) {
        return Err(invalid("all letters after 'm' must be the same"));
    }
    let run = letters.chars().count();

    let (next, run) = if letter == 'Z' {
        ('A', run + 1)
    } else {
        let next = char::from_u32(letter as u32 + 1)
            .ok_or_else(|| invalid("letter has no successor"))?;
        (next, run)
    };

    let mut name = String::with_capacity(run + 1);
    name.push(PREFIX);
    name.extend(std::iter::repeat(next).take(run));
    Ok(name)
}

/// Endless iterator over staff-system names, starting at "mA".
#[derive(Debug, Clone, Default)]
pub struct SystemNames {
    last: String,
}

impl SystemNames {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Iterator for SystemNames {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        // Names produced here always satisfy `next_name`'s preconditions.
        let name = next_name(&self.last).ok()?;
        self.last.clone_from(&name);
        Some(name)
    }
}
