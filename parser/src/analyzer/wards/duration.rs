use crate::game_constants::{DurationRules, TICKS_PER_SECOND};
use crate::types::{Tick, WardType};

/// How long a ward lived and whether it died early enough to count as denied.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WardLifetime {
    pub duration_sec: f64,
    pub is_denied: bool,
}

/// Turns tick deltas into lifetimes. Only tick arithmetic is used; time fields
/// stored on the entity can lag behind the replay clock.
#[derive(Debug, Clone, Default)]
pub struct DurationEvaluator {
    rules: DurationRules,
}

impl DurationEvaluator {
    pub fn new(rules: DurationRules) -> Self {
        Self { rules }
    }

    pub fn evaluate(&self, start: Tick, end: Tick, ward_type: WardType) -> WardLifetime {
        let duration_sec = end.ticks_since(start) as f64 / TICKS_PER_SECOND;
        WardLifetime {
            duration_sec,
            is_denied: self.is_denied(duration_sec, ward_type),
        }
    }

    /// Early removal heuristic. It cannot tell an enemy kill from any other
    /// early removal.
    pub fn is_denied(&self, duration_sec: f64, ward_type: WardType) -> bool {
        let max_sec = self.rules.max_duration_sec(ward_type) as f64;
        duration_sec < max_sec - self.rules.denial_grace_sec as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duration_comes_from_tick_delta() {
        let evaluator = DurationEvaluator::default();
        let lifetime = evaluator.evaluate(Tick(100), Tick(820), WardType::Observer);
        assert_eq!(lifetime.duration_sec, 24.0);
        assert!(lifetime.is_denied);
    }

    #[test]
    fn end_before_start_clamps_to_zero() {
        let evaluator = DurationEvaluator::default();
        let lifetime = evaluator.evaluate(Tick(900), Tick(300), WardType::Sentry);
        assert_eq!(lifetime.duration_sec, 0.0);
        assert!(lifetime.is_denied);
    }

    #[test]
    fn denial_threshold_depends_on_ward_type() {
        let evaluator = DurationEvaluator::default();
        // 355s is exactly the observer threshold and not below it.
        let observer = evaluator.evaluate(Tick(0), Tick(355 * 30), WardType::Observer);
        assert!(!observer.is_denied);
        let sentry = evaluator.evaluate(Tick(0), Tick(355 * 30), WardType::Sentry);
        assert!(sentry.is_denied);
        let sentry_full = evaluator.evaluate(Tick(0), Tick(420 * 30), WardType::Sentry);
        assert!(!sentry_full.is_denied);
    }

    #[test]
    fn custom_rules_move_the_threshold() {
        let evaluator = DurationEvaluator::new(DurationRules {
            observer_max_sec: 420,
            ..DurationRules::defaults()
        });
        assert!(evaluator.is_denied(400.0, WardType::Observer));
        assert!(!evaluator.is_denied(416.0, WardType::Observer));
    }
}
