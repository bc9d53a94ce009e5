//! Turn-by-turn instruction synthesis

use crate::model::{InstructionStep, Node, StepAction, Waypoint};

/// Builds the waypoint list and one instruction step per node.
///
/// A single-node path yields one `Start` step. Empty input yields empty lists.
pub fn synthesize(path: &[&Node]) -> (Vec<Waypoint>, Vec<InstructionStep>) {
    let waypoints = path
        .iter()
        .map(|node| Waypoint {
            node_id: node.id,
            name: node.name.clone(),
            x: node.x,
            y: node.y,
            floor_level: node.floor_level,
        })
        .collect();

    let last = path.len().saturating_sub(1);
    let steps = path
        .iter()
        .enumerate()
        .map(|(i, node)| {
            let label = node.label();
            let (action, instruction) = if i == 0 {
                (StepAction::Start, format!("Start at {label}"))
            } else if i == last {
                (StepAction::Arrive, format!("Arrive at {label}"))
            } else if node.stairs {
                (StepAction::GoUpStairs, format!("Take the stairs at {label}"))
            } else if node.elevator {
                (StepAction::TakeElevator, format!("Take the elevator at {label}"))
            } else {
                (StepAction::ContinueStraight, format!("Continue to {label}"))
            };

            InstructionStep {
                step: i + 1,
                action,
                instruction,
                node_id: node.id,
                x: node.x,
                y: node.y,
                floor_level: node.floor_level,
            }
        })
        .collect();

    (waypoints, steps)
}
