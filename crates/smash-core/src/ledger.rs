//! Reward ledger: coins, infestation, monthly stats and the poison shop

use smash_api::{Difficulty, Document, PoisonSize, StatItem, MAX_INFESTATION};
use smash_config::{RewardPolicy, Rules};
use smash_store::AuditEventType;
use tracing::{debug, info};

use crate::{CoreEvent, Engine};

/// Smallest share of the table reward the dampened policy pays
const DAMPENING_FLOOR: f64 = 0.5;

/// Reward lost per point of infestation under the dampened policy
const DAMPENING_PER_POINT: f64 = 0.05;

/// Coins paid for smashing an item of `difficulty` at the given infestation
pub fn smash_reward(difficulty: Difficulty, infestation: u32, policy: RewardPolicy) -> u64 {
    let base = difficulty.coin_reward();
    match policy {
        RewardPolicy::Flat => base,
        RewardPolicy::Dampened => {
            let factor =
                (1.0 - DAMPENING_PER_POINT * infestation as f64).max(DAMPENING_FLOOR);
            ((base as f64 * factor).round() as u64).max(1)
        }
    }
}

/// Credit a smash: coins, the month's smashed count and history.
/// Returns the coins awarded.
pub fn credit_smash(document: &mut Document, item: StatItem, rules: &Rules, month: &str) -> u64 {
    let awarded = smash_reward(item.difficulty, document.infestation, rules.reward_policy);
    document.coins = document.coins.saturating_add(awarded);
    document
        .month_mut(month)
        .record_smashed(item, rules.history_limit);
    awarded
}

/// Penalise a miss: infestation (clamped), the month's missed count and
/// history. Returns the infestation actually added.
pub fn penalize_fail(document: &mut Document, item: StatItem, rules: &Rules, month: &str) -> u32 {
    let before = document.infestation;
    document.infestation = before
        .saturating_add(item.difficulty.infestation_weight())
        .min(MAX_INFESTATION);
    document
        .month_mut(month)
        .record_missed(item, rules.history_limit);
    document.infestation - before
}

/// Buy poison if affordable. Returns the infestation cleared, or `None`
/// when the purchase was refused.
pub fn apply_poison(document: &mut Document, size: PoisonSize) -> Option<u32> {
    let cost = size.cost();
    if document.coins < cost {
        return None;
    }

    document.coins -= cost;
    let before = document.infestation;
    document.infestation = before.saturating_sub(size.clears());
    Some(before - document.infestation)
}

impl Engine {
    /// Spend coins on poison to reduce infestation. Refused (no change)
    /// when coins are short.
    pub fn buy_poison(&mut self, size: PoisonSize) -> Vec<CoreEvent> {
        let mut next = self.document.clone();
        let Some(cleared) = apply_poison(&mut next, size) else {
            debug!(
                size = %size,
                coins = self.document.coins,
                cost = size.cost(),
                "Poison purchase refused"
            );
            return Vec::new();
        };

        self.undo.clear_action();

        info!(
            size = %size,
            cost = size.cost(),
            cleared,
            infestation = next.infestation,
            "Poison bought"
        );
        self.audit(AuditEventType::PoisonBought {
            size,
            cost: size.cost(),
            infestation_cleared: cleared,
        });

        let mut events = vec![CoreEvent::PoisonBought {
            size,
            cost: size.cost(),
            infestation_cleared: cleared,
        }];
        events.extend(self.commit(next));
        events
    }
}
