//! Reviewer assignment engine
//!
//! Pure selection and planning logic: picking reviewers for a new pull
//! request, and computing the replacement plan when a whole team is
//! deactivated. Nothing in this module touches storage; callers capture a
//! snapshot of the relevant state, and randomness comes in through the
//! `rand::Rng` handle so tests can pin the outcome with a seed.

use crate::store::{OpenPrSnapshot, ReassignmentPlan};
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Reviewers requested for a freshly created pull request.
pub const DEFAULT_REVIEWER_COUNT: usize = 2;

/// Pick up to `count` distinct reviewers from `candidates`.
///
/// An empty pool yields an empty pick, and a pool of at most `count`
/// candidates is returned whole; only larger pools are sampled.
pub fn select_reviewers<R: Rng + ?Sized>(
    candidates: &[String],
    count: usize,
    rng: &mut R,
) -> Vec<String> {
    candidates.choose_multiple(rng, count).cloned().collect()
}

/// Snapshot of everything the bulk planner needs, captured before any
/// replacement decision is made.
#[derive(Debug, Clone)]
pub struct PlanInput {
    /// The deactivated batch: ineligible as replacements for each other.
    pub deactivated: BTreeSet<String>,
    /// Every OPEN pull request holding a link to a deactivated reviewer.
    pub open_prs: BTreeMap<String, OpenPrSnapshot>,
    /// Current team affiliation per involved user (reviewers and authors).
    pub team_of: HashMap<String, String>,
    /// Active members per involved team, ordered by user id.
    pub members_of: HashMap<String, Vec<String>>,
}

/// A reviewer link that could not be replaced: no eligible candidate in
/// the reviewer's team or the author's team. The link stays in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnfilledSlot {
    pub pr_id: String,
    pub reviewer_id: String,
}

/// The computed plan plus the links it had to leave alone.
#[derive(Debug, Clone)]
pub struct PlanOutcome {
    pub plan: ReassignmentPlan,
    pub gaps: Vec<UnfilledSlot>,
}

/// The ordered fallback chain for one link replacement: the departing
/// reviewer's own team first, then the pull request author's team.
fn pool_strategies<'a>(
    reviewer_team: Option<&'a str>,
    author_team: Option<&'a str>,
) -> Vec<&'a str> {
    let mut teams = Vec::new();
    for team in [reviewer_team, author_team].into_iter().flatten() {
        if !teams.contains(&team) {
            teams.push(team);
        }
    }
    teams
}

/// First non-empty candidate pool along the fallback chain, after
/// excluding the departing reviewer, the author, and the whole
/// deactivated batch.
fn replacement_pool(input: &PlanInput, reviewer_id: &str, author_id: &str) -> Option<Vec<String>> {
    let reviewer_team = input.team_of.get(reviewer_id).map(String::as_str);
    let author_team = input.team_of.get(author_id).map(String::as_str);

    for team in pool_strategies(reviewer_team, author_team) {
        let pool: Vec<String> = input
            .members_of
            .get(team)
            .into_iter()
            .flatten()
            .filter(|id| {
                id.as_str() != reviewer_id
                    && id.as_str() != author_id
                    && !input.deactivated.contains(id.as_str())
            })
            .cloned()
            .collect();

        if !pool.is_empty() {
            return Some(pool);
        }
    }
    None
}

/// Compute the full replacement plan for one deactivated batch.
///
/// The whole plan is computed against the captured snapshot before
/// anything is applied, so no pool is ever drawn from a half-updated link
/// set. Pull requests and links are visited in id order, making the
/// outcome reproducible under a seeded generator.
pub fn plan_reassignments<R: Rng + ?Sized>(input: &PlanInput, rng: &mut R) -> PlanOutcome {
    let mut plan = ReassignmentPlan::new();
    let mut gaps = Vec::new();

    for (pr_id, snapshot) in &input.open_prs {
        for reviewer_id in &snapshot.reviewer_ids {
            if !input.deactivated.contains(reviewer_id) {
                continue;
            }

            match replacement_pool(input, reviewer_id, &snapshot.author_id) {
                Some(pool) => {
                    if let Some(new_id) = select_reviewers(&pool, 1, rng).pop() {
                        plan.entry(pr_id.clone())
                            .or_default()
                            .insert(reviewer_id.clone(), new_id);
                    }
                }
                None => gaps.push(UnfilledSlot {
                    pr_id: pr_id.clone(),
                    reviewer_id: reviewer_id.clone(),
                }),
            }
        }
    }

    PlanOutcome { plan, gaps }
}
