// ─────────────────────────────────────────────────────────────────────
// Goal Arbiter — Goal Ranker
// ─────────────────────────────────────────────────────────────────────
//! Total ordering of scored candidates and primary-goal selection.
//!
//! Order: non-vetoed before vetoed, then total descending, then goal id
//! ascending. The order is total and independent of input order.

use std::cmp::Ordering;

use arbiter_types::{ActionCandidate, ActionScore, Goal, RankedGoal, VetoPolicy};

use crate::scorer::score_action;

/// Outcome of primary-goal selection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Selection<'a> {
    Primary(&'a RankedGoal),
    /// Every candidate was vetoed (or the ranking is empty).
    NoEligibleGoal,
}

impl<'a> Selection<'a> {
    pub fn goal_id(&self) -> Option<&'a str> {
        match self {
            Selection::Primary(r) => Some(r.goal_id.as_str()),
            Selection::NoEligibleGoal => None,
        }
    }
}

pub fn compare_ranked(a: &RankedGoal, b: &RankedGoal) -> Ordering {
    a.score
        .vetoed
        .cmp(&b.score.vetoed)
        .then_with(|| b.score.total.total_cmp(&a.score.total))
        .then_with(|| a.goal_id.cmp(&b.goal_id))
}

/// Ranked candidates plus the vetoed ones the policy removed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Ranking {
    pub ranked: Vec<RankedGoal>,
    /// Empty under `VetoPolicy::KeepLast`; sorted by goal id.
    pub dropped: Vec<RankedGoal>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct GoalRanker {
    policy: VetoPolicy,
}

impl GoalRanker {
    pub fn new(policy: VetoPolicy) -> Self {
        Self { policy }
    }

    pub fn rank(&self, candidates: Vec<RankedGoal>) -> Ranking {
        let (mut ranked, mut dropped): (Vec<_>, Vec<_>) = match self.policy {
            VetoPolicy::KeepLast => (candidates, Vec::new()),
            VetoPolicy::Drop => candidates.into_iter().partition(|r| !r.score.vetoed),
        };
        ranked.sort_by(compare_ranked);
        dropped.sort_by(|a, b| a.goal_id.cmp(&b.goal_id));
        Ranking { ranked, dropped }
    }
}

/// First non-vetoed entry of an already ranked list.
pub fn select_primary(ranked: &[RankedGoal]) -> Selection<'_> {
    ranked
        .iter()
        .find(|r| !r.score.vetoed)
        .map_or(Selection::NoEligibleGoal, Selection::Primary)
}

/// Score every action against `goals`; highest first, ties by name.
pub fn rank_actions(actions: &[ActionCandidate], goals: &[Goal]) -> Vec<ActionScore> {
    let mut scored: Vec<ActionScore> = actions
        .iter()
        .map(|a| ActionScore {
            action: a.name.clone(),
            score: score_action(a, goals),
        })
        .collect();
    scored.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| a.action.cmp(&b.action))
    });
    scored
}

#[cfg(test)]
mod tests {
    use super::*;
    use arbiter_types::{DecisionScore, GoalEvidence, FLOOR_VALUE};

    fn ranked(id: &str, total: f64, vetoed: bool) -> RankedGoal {
        RankedGoal {
            goal_id: id.to_string(),
            score: DecisionScore {
                total: if vetoed { FLOOR_VALUE } else { total },
                vetoed,
                ..Default::default()
            },
        }
    }

    fn ids(list: &[RankedGoal]) -> Vec<&str> {
        list.iter().map(|r| r.goal_id.as_str()).collect()
    }

    #[test]
    fn test_descending_with_id_tiebreak() {
        let out = GoalRanker::default().rank(vec![
            ranked("social", 0.28, false),
            ranked("cognitive", 0.5, false),
            ranked("energy", 0.72, false),
            ranked("beta", 0.5, false),
        ]);
        assert_eq!(ids(&out.ranked), vec!["energy", "beta", "cognitive", "social"]);
    }

    #[test]
    fn test_input_order_irrelevant() {
        let a = vec![
            ranked("a", 0.3, false),
            ranked("b", 0.3, true),
            ranked("c", 0.9, false),
        ];
        let mut b = a.clone();
        b.reverse();
        let ranker = GoalRanker::default();
        assert_eq!(ranker.rank(a), ranker.rank(b));
    }

    #[test]
    fn test_vetoed_kept_last() {
        let out = GoalRanker::new(VetoPolicy::KeepLast).rank(vec![
            ranked("risky", 9.0, true),
            ranked("calm", -3.0, false),
        ]);
        assert_eq!(ids(&out.ranked), vec!["calm", "risky"]);
        assert!(out.ranked[1].score.vetoed);
        assert!(out.dropped.is_empty());
    }

    #[test]
    fn test_vetoed_dropped() {
        let out = GoalRanker::new(VetoPolicy::Drop).rank(vec![
            ranked("zealous", 1.0, true),
            ranked("risky", 9.0, true),
            ranked("calm", 0.1, false),
        ]);
        assert_eq!(ids(&out.ranked), vec!["calm"]);
        assert_eq!(ids(&out.dropped), vec!["risky", "zealous"]);
    }

    #[test]
    fn test_select_primary_skips_vetoed() {
        let list = vec![ranked("a", 0.0, true), ranked("b", 0.1, false)];
        assert_eq!(select_primary(&list).goal_id(), Some("b"));
    }

    #[test]
    fn test_no_eligible_goal() {
        let list = vec![ranked("a", 0.0, true), ranked("b", 0.0, true)];
        assert_eq!(select_primary(&list), Selection::NoEligibleGoal);
        assert_eq!(select_primary(&[]), Selection::NoEligibleGoal);
    }

    #[test]
    fn test_rank_actions_orders_by_score() {
        let goals = vec![Goal::new("energy", 0.9, 0.3)];
        let mk = |name: &str, c: f64| ActionCandidate {
            name: name.to_string(),
            goals: [(
                "energy".to_string(),
                GoalEvidence {
                    considerations: vec![c],
                    discouragements: vec![],
                },
            )]
            .into_iter()
            .collect(),
        };
        let out = rank_actions(&[mk("walk", 0.2), mk("sleep", 0.9), mk("nap", 0.9)], &goals);
        let names: Vec<&str> = out.iter().map(|a| a.action.as_str()).collect();
        assert_eq!(names, vec!["nap", "sleep", "walk"]);
    }
}
