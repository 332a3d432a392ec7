/// Chirp moderation and ordering
///
/// Pure functions applied around the store: body validation and profanity
/// masking before a chirp is written, ordering when chirps are listed.

use std::cmp::Ordering;
use std::str::FromStr;

use crate::error::ValidationError;
use crate::store::Chirp;

pub const MAX_CHIRP_LENGTH: usize = 140;

const BANNED_WORDS: [&str; 3] = ["kerfuffle", "sharbert", "fornax"];
const MASK: &str = "****";

/// Reject bodies over the length limit. Counted in characters, not bytes.
pub fn validate_chirp_body(body: &str) -> Result<(), ValidationError> {
    if body.chars().count() > MAX_CHIRP_LENGTH {
        return Err(ValidationError::TooLong("chirp".to_string(), MAX_CHIRP_LENGTH));
    }
    Ok(())
}

/// Replace banned words with a fixed mask.
///
/// Words are split on single spaces and re-joined with single spaces, so
/// runs of spaces collapse. Matching is whole-word and case-insensitive.
pub fn mask_profanity(body: &str) -> String {
    body.split(' ')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let lowered = word.to_lowercase();
            if BANNED_WORDS.contains(&lowered.as_str()) {
                MASK
            } else {
                word
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Validate then mask; the body that actually gets stored
pub fn moderate(body: &str) -> Result<String, ValidationError> {
    validate_chirp_body(body)?;
    Ok(mask_profanity(body))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl FromStr for SortDirection {
    type Err = std::convert::Infallible;

    /// `desc` (any case) sorts newest first; anything else is ascending.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("desc") {
            Ok(SortDirection::Desc)
        } else {
            Ok(SortDirection::Asc)
        }
    }
}

/// Order by creation time, ties broken by chirp id.
pub fn sort_chirps(chirps: &mut [Chirp], direction: SortDirection) {
    chirps.sort_by(|a, b| {
        let ordering = chronological(a, b);
        match direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    });
}

fn chronological(a: &Chirp, b: &Chirp) -> Ordering {
    a.created_at
        .cmp(&b.created_at)
        .then_with(|| a.id.cmp(&b.id))
}
