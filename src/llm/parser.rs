//! Map free-form decision text onto the fixed action set
//!
//! Matching is a case-insensitive substring search in a fixed priority
//! order, so a reply that mentions several actions resolves to the first
//! one in that order. Unrecognized text maps to `DecisionAction::None`.

use serde::{Deserialize, Serialize};

use crate::core::types::Direction;

/// Actions an organism can take on an external suggestion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionAction {
    Grow,
    Shrink,
    Recolor,
    Reproduce,
    Move(Direction),
    MoveTowardFood,
    None,
}

/// System prompt for decision requests
pub const DECISION_SYSTEM_PROMPT: &str = "You are guiding a single organism in an evolution \
simulation. Reply with exactly one action from the list you are given and nothing else.";

/// Parse decision text into an action
pub fn parse_decision(text: &str) -> DecisionAction {
    let text = text.to_lowercase();

    if text.contains("grow") {
        DecisionAction::Grow
    } else if text.contains("shrink") {
        DecisionAction::Shrink
    } else if text.contains("change color")
        || text.contains("change colour")
        || text.contains("recolor")
    {
        DecisionAction::Recolor
    } else if text.contains("reproduce") {
        DecisionAction::Reproduce
    } else if text.contains("move") {
        parse_move(&text)
    } else {
        DecisionAction::None
    }
}

fn parse_move(text: &str) -> DecisionAction {
    const DIRECTIONS: [(&str, Direction); 4] = [
        ("up", Direction::Up),
        ("down", Direction::Down),
        ("left", Direction::Left),
        ("right", Direction::Right),
    ];

    if let Some((_, dir)) = DIRECTIONS.iter().find(|(word, _)| text.contains(word)) {
        return DecisionAction::Move(*dir);
    }
    if text.contains("towards food") || text.contains("toward food") {
        DecisionAction::MoveTowardFood
    } else {
        DecisionAction::None
    }
}
