//! Hints ("lifelines"): audience poll, fifty-fifty and calling a friend.
//!
//! Each hint kind can be written to a question's `HelpHash` exactly once.
//! The generators here are pure functions over an injected random source.

use super::GameError;
use crate::rng::{RandomAdapter, RandomSource};
use crate::types::Letter;
use rand::seq::IndexedRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Audience votes must sum to this
pub const AUDIENCE_TOTAL: u32 = 100;

/// Upper bound on the combined share of the letters the audience does not favour
const AUDIENCE_SPREAD: u32 = 45;

const FRIENDS: &[&str] = &[
    "Alice", "Boris", "Carmen", "Dmitri", "Elena", "Farid", "Greta", "Hiro",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HintKind {
    AudienceHelp,
    FiftyFifty,
    FriendCall,
}

impl HintKind {
    pub const ALL: [HintKind; 3] = [
        HintKind::AudienceHelp,
        HintKind::FiftyFifty,
        HintKind::FriendCall,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            HintKind::AudienceHelp => "audience_help",
            HintKind::FiftyFifty => "fifty_fifty",
            HintKind::FriendCall => "friend_call",
        }
    }
}

impl fmt::Display for HintKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HintKind {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        HintKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s.trim())
            .ok_or_else(|| GameError::InvalidHintKind(s.to_string()))
    }
}

/// Vote share per letter, always covering all four letters
pub type AudienceVotes = BTreeMap<Letter, u8>;

/// The recorded result of one hint
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Hint {
    AudienceHelp(AudienceVotes),
    /// The two letters left standing, sorted
    FiftyFifty([Letter; 2]),
    FriendCall(String),
}

impl Hint {
    pub fn kind(&self) -> HintKind {
        match self {
            Hint::AudienceHelp(_) => HintKind::AudienceHelp,
            Hint::FiftyFifty(_) => HintKind::FiftyFifty,
            Hint::FriendCall(_) => HintKind::FriendCall,
        }
    }
}

/// Append-only store of the hints used on one question
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "HelpHashRepr", into = "HelpHashRepr")]
pub struct HelpHash {
    hints: BTreeMap<HintKind, Hint>,
}

impl HelpHash {
    pub fn is_empty(&self) -> bool {
        self.hints.is_empty()
    }

    pub fn len(&self) -> usize {
        self.hints.len()
    }

    pub fn contains(&self, kind: HintKind) -> bool {
        self.hints.contains_key(&kind)
    }

    pub fn get(&self, kind: HintKind) -> Option<&Hint> {
        self.hints.get(&kind)
    }

    pub fn audience_help(&self) -> Option<&AudienceVotes> {
        match self.hints.get(&HintKind::AudienceHelp) {
            Some(Hint::AudienceHelp(votes)) => Some(votes),
            _ => None,
        }
    }

    pub fn fifty_fifty(&self) -> Option<&[Letter; 2]> {
        match self.hints.get(&HintKind::FiftyFifty) {
            Some(Hint::FiftyFifty(letters)) => Some(letters),
            _ => None,
        }
    }

    pub fn friend_call(&self) -> Option<&str> {
        match self.hints.get(&HintKind::FriendCall) {
            Some(Hint::FriendCall(text)) => Some(text),
            _ => None,
        }
    }

    /// Record a hint. A kind that is already present is never overwritten.
    pub(crate) fn insert(&mut self, hint: Hint) -> Result<&Hint, GameError> {
        let kind = hint.kind();
        match self.hints.entry(kind) {
            Entry::Occupied(_) => Err(GameError::HintAlreadyUsed(kind)),
            Entry::Vacant(slot) => Ok(&*slot.insert(hint)),
        }
    }
}

/// Storage shape: one optional key per hint kind
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct HelpHashRepr {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    audience_help: Option<AudienceVotes>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    fifty_fifty: Option<[Letter; 2]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    friend_call: Option<String>,
}

impl TryFrom<HelpHashRepr> for HelpHash {
    type Error = GameError;

    fn try_from(repr: HelpHashRepr) -> Result<Self, Self::Error> {
        let mut hints = BTreeMap::new();
        if let Some(votes) = repr.audience_help {
            if votes.len() != Letter::ALL.len() {
                return Err(GameError::Malformed(format!(
                    "audience votes cover {} letters, expected a, b, c and d",
                    votes.len()
                )));
            }
            let total: u32 = votes.values().map(|v| u32::from(*v)).sum();
            if total != AUDIENCE_TOTAL {
                return Err(GameError::Malformed(format!(
                    "audience votes add up to {}, expected {}",
                    total, AUDIENCE_TOTAL
                )));
            }
            hints.insert(HintKind::AudienceHelp, Hint::AudienceHelp(votes));
        }
        if let Some(mut letters) = repr.fifty_fifty {
            if letters[0] == letters[1] {
                return Err(GameError::Malformed(format!(
                    "fifty-fifty kept the same letter twice: {}",
                    letters[0]
                )));
            }
            letters.sort();
            hints.insert(HintKind::FiftyFifty, Hint::FiftyFifty(letters));
        }
        if let Some(text) = repr.friend_call {
            hints.insert(HintKind::FriendCall, Hint::FriendCall(text));
        }
        Ok(Self { hints })
    }
}

impl From<HelpHash> for HelpHashRepr {
    fn from(hash: HelpHash) -> Self {
        let mut repr = HelpHashRepr::default();
        for hint in hash.hints.into_values() {
            match hint {
                Hint::AudienceHelp(votes) => repr.audience_help = Some(votes),
                Hint::FiftyFifty(letters) => repr.fifty_fifty = Some(letters),
                Hint::FriendCall(text) => repr.friend_call = Some(text),
            }
        }
        repr
    }
}

fn wrong_letters(available: &[Letter], correct: Letter) -> Vec<Letter> {
    available.iter().copied().filter(|l| *l != correct).collect()
}

/// `correct` with probability `accuracy`, otherwise a wrong `available` letter
fn pick_letter(
    available: &[Letter],
    correct: Letter,
    accuracy: f64,
    rng: &mut RandomAdapter<'_>,
) -> Letter {
    let wrong = wrong_letters(available, correct);
    let accuracy = if accuracy.is_nan() { 0.0 } else { accuracy.clamp(0.0, 1.0) };
    if wrong.is_empty() || rng.random_bool(accuracy) {
        correct
    } else {
        wrong.choose(rng).copied().unwrap_or(correct)
    }
}

/// Simulate an audience poll over `available` letters.
///
/// With probability `accuracy` the correct letter gets the largest share,
/// otherwise a random wrong letter does. The favourite always holds more
/// than half of the votes; letters outside `available` get none.
pub fn audience_distribution(
    available: &[Letter],
    correct: Letter,
    accuracy: f64,
    rng: &mut dyn RandomSource,
) -> AudienceVotes {
    let mut rng = RandomAdapter::new(rng);
    let favourite = pick_letter(available, correct, accuracy, &mut rng);

    let mut votes: AudienceVotes = Letter::ALL.into_iter().map(|l| (l, 0)).collect();

    let others: Vec<Letter> = available
        .iter()
        .copied()
        .filter(|l| *l != favourite)
        .collect();
    let cap = if others.is_empty() {
        0
    } else {
        AUDIENCE_SPREAD / others.len() as u32
    };

    let mut spread = 0;
    for letter in others {
        let share = rng.random_range(0..=cap);
        spread += share;
        votes.insert(letter, share as u8);
    }
    votes.insert(favourite, (AUDIENCE_TOTAL - spread) as u8);

    votes
}

/// The correct letter plus one random wrong one, sorted
pub fn fifty_fifty(correct: Letter, rng: &mut dyn RandomSource) -> [Letter; 2] {
    let wrong = wrong_letters(&Letter::ALL, correct);
    let other = wrong
        .choose(&mut RandomAdapter::new(rng))
        .copied()
        .unwrap_or(correct);
    let mut pair = [correct, other];
    pair.sort();
    pair
}

/// A friend's suggestion, e.g. "Greta thinks it's answer C".
///
/// The named letter is correct with probability `accuracy`, otherwise one of
/// the wrong `available` letters.
pub fn friend_call(
    available: &[Letter],
    correct: Letter,
    accuracy: f64,
    rng: &mut dyn RandomSource,
) -> String {
    let mut rng = RandomAdapter::new(rng);
    let named = pick_letter(available, correct, accuracy, &mut rng);
    let friend = FRIENDS.choose(&mut rng).copied().unwrap_or("Your friend");

    format!("{} thinks it's answer {}", friend, named.to_uppercase())
}
