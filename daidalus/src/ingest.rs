//! The ingestion/output seam (§E.3): a narrow trait a real encounter-file
//! or live-feed reader would implement to drive a [`crate::coordinator::Daidalus`]
//! step by step. Parsing concrete formats (CSV, PVS, draw output) is out of
//! scope here; this module only names the boundary.

use crate::state::{AircraftState, Uncertainty, WindVector};

/// One step's worth of input, in the order the coordinator expects them
/// applied (§5): ownship, then wind/uncertainty, then traffic.
#[derive(Debug, Clone, PartialEq)]
pub struct StepInputs {
    pub time: f64,
    pub ownship: AircraftState,
    pub traffic: Vec<AircraftState>,
    pub wind: WindVector,
    pub ownship_uncertainty: Uncertainty,
}

/// A source of successive [`StepInputs`], driven to exhaustion by a caller
/// such as `daidalus-cli`'s demo loop. A real implementation would read an
/// encounter file or a live feed; this crate ships none.
pub trait StateSource {
    fn next_step(&mut self) -> Option<StepInputs>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Vec3;
    use crate::state::{AircraftState, Position};

    struct FixedSteps(Vec<StepInputs>);

    impl StateSource for FixedSteps {
        fn next_step(&mut self) -> Option<StepInputs> {
            if self.0.is_empty() {
                None
            } else {
                Some(self.0.remove(0))
            }
        }
    }

    #[test]
    fn source_yields_steps_in_order_then_ends() {
        let own = AircraftState::new(
            "own",
            Position::Euclidean(Vec3::new(0.0, 0.0, 0.0)),
            Vec3::new(0.0, 100.0, 0.0),
            0.0,
        );
        let mut source = FixedSteps(vec![StepInputs {
            time: 0.0,
            ownship: own,
            traffic: Vec::new(),
            wind: WindVector::ZERO,
            ownship_uncertainty: Uncertainty::default(),
        }]);
        assert!(source.next_step().is_some());
        assert!(source.next_step().is_none());
    }
}
