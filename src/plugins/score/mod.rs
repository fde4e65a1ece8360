//! Score plugin.
//!
//! Every destruction cause has its own named delta in [`ScoreRules`]; the board
//! only applies them. A zero delta awards nothing and publishes nothing.

use bevy::prelude::*;

use crate::common::tunables::ScoreRules;
use crate::plugins::bus::{self, BusEvent, Topic};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScoreCause {
    /// A projectile destroyed a hazard.
    HazardShot,
    /// A hazard ran out its lifetime.
    HazardExpired,
}

impl ScoreRules {
    #[inline]
    pub fn delta(&self, cause: ScoreCause) -> i64 {
        match cause {
            ScoreCause::HazardShot => self.hazard_shot,
            ScoreCause::HazardExpired => self.hazard_expired,
        }
    }
}

#[derive(Resource, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ScoreBoard {
    score: i64,
}

impl ScoreBoard {
    #[inline]
    pub fn score(&self) -> i64 {
        self.score
    }

    /// Apply the cause's delta and return the event to publish, if any.
    pub fn award(&mut self, cause: ScoreCause, rules: &ScoreRules) -> Option<BusEvent> {
        let delta = rules.delta(cause);
        if delta == 0 {
            return None;
        }
        self.score = self.score.saturating_add(delta);
        Some(BusEvent::ScoreChanged { score: self.score, delta })
    }

    pub fn reset(&mut self) {
        self.score = 0;
    }
}

pub fn plugin(app: &mut App) {
    app.init_resource::<ScoreBoard>();
    bus::subscribe(app.world_mut(), Topic::ScoreChange, log_score);
}

fn log_score(In(event): In<BusEvent>) {
    if let BusEvent::ScoreChanged { score, delta } = event {
        debug!("score {score} ({delta:+})");
    }
}
