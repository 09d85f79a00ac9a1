//! The 2d6 skill check resolver.

use rand::Rng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use veil_core::WorldState;

use crate::node::EnhancedSkillCheck;

/// A forced result overriding the normal comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CriticalOutcome {
    /// Double sixes: success regardless of difficulty.
    Success,
    /// Double ones: failure regardless of difficulty.
    Failure,
}

/// The resolved verdict of a skill check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillCheckOutcome {
    /// Whether the check passed.
    pub success: bool,
    /// The two raw die values.
    pub dice: (u32, u32),
    /// Sum of the dice (2-12).
    pub roll: u32,
    /// Difficulty after emotional modifiers.
    pub difficulty: i32,
    /// The primary skill the check was made against.
    pub skill: String,
    /// Critical tag, when the dice forced the result.
    pub critical: Option<CriticalOutcome>,
}

/// Draw the two dice for a check from the session generator.
pub fn draw_dice(rng: &mut StdRng) -> (u32, u32) {
    (rng.random_range(1..=6), rng.random_range(1..=6))
}

/// Resolve a check against the given dice.
///
/// Effective difficulty is the base plus the modifier for the ambient
/// emotional state, if one matches. The bonus is the primary skill value
/// plus each supporting skill's value scaled by its weight and truncated
/// toward zero. Missing skills count as zero. Double sixes force success
/// and double ones force failure before the comparison is consulted.
pub fn resolve_check(
    check: &EnhancedSkillCheck,
    world: &WorldState,
    emotion: Option<&str>,
    dice: (u32, u32),
) -> SkillCheckOutcome {
    let roll = dice.0 + dice.1;

    let modifier = emotion
        .and_then(|e| check.emotional_modifiers.get(e))
        .copied()
        .unwrap_or(0);
    let difficulty = check.base_difficulty + modifier;

    let mut bonus = world.skill(&check.primary_skill);
    for (skill, weight) in &check.supporting_skills {
        bonus += (world.skill(skill) as f32 * weight) as i32;
    }

    let (success, critical) = match dice {
        (6, 6) => (true, Some(CriticalOutcome::Success)),
        (1, 1) => (false, Some(CriticalOutcome::Failure)),
        _ => (roll as i32 + bonus >= difficulty, None),
    };

    SkillCheckOutcome {
        success,
        dice,
        roll,
        difficulty,
        skill: check.primary_skill.clone(),
        critical,
    }
}
