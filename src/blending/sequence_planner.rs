//! Planning of command sequences into one continuous trajectory

use super::transition_window::{assemble, BlendWindow, TransitionWindowBlender};
use crate::command::Sequence;
use crate::common::{
    JointState, KinematicsSolver, MotionPlanFault, PlanningError, PlanningResult, Trajectory,
};
use crate::trajectory_generation::verification::verify_joint_limits;
use crate::trajectory_generation::TrajectoryGenerator;

/// Plans a [`Sequence`] with one trajectory generator.
///
/// Every item is generated on its own, starting where the previous one ends,
/// and the junctions are blended on the solver's tip link.
pub struct SequencePlanner<'a, K> {
    generator: &'a TrajectoryGenerator<K>,
}

impl<'a, K: KinematicsSolver> SequencePlanner<'a, K> {
    pub fn new(generator: &'a TrajectoryGenerator<K>) -> Self {
        Self { generator }
    }

    pub fn plan(&self, sequence: &Sequence) -> PlanningResult<Trajectory> {
        let result = self.plan_segments(sequence);
        match &result {
            Ok(trajectory) => tracing::info!(
                "Planned sequence of {} commands: {} samples, {:.3} s",
                sequence.len(),
                trajectory.len(),
                trajectory.duration()
            ),
            Err(e) => tracing::warn!("Sequence rejected: {}", e),
        }
        result
    }

    fn plan_segments(&self, sequence: &Sequence) -> PlanningResult<Trajectory> {
        if sequence.is_empty() {
            return Err(MotionPlanFault::EmptySequence.into());
        }
        let junctions = sequence.len() - 1;
        if let Some((junction, item)) = sequence
            .iter()
            .take(junctions)
            .enumerate()
            .find(|(_, item)| !(item.blend_radius.is_finite() && item.blend_radius >= 0.0))
        {
            return Err(MotionPlanFault::InvalidBlendRadius {
                junction,
                radius: item.blend_radius,
            }
            .into());
        }

        let segments = sequence
            .iter()
            .enumerate()
            .try_fold(Vec::<Trajectory>::new(), |mut segments, (i, item)| {
                let mut request = item.request.clone();
                if let Some(previous) = segments.last() {
                    request.start_state = chained_start(previous)?;
                }
                tracing::debug!("Generating sequence item {} ({})", i, request.kind.name());
                segments.push(self.generator.generate(&request)?);
                Ok::<_, PlanningError>(segments)
            })?;

        let kinematics = self.generator.kinematics();
        let limits = &self.generator.limits().joint;
        let blender = TransitionWindowBlender::new(kinematics, kinematics.tip_link(), limits);
        // a window starts no earlier than where the previous one ended on the same segment
        let (windows, _) = segments
            .iter()
            .zip(segments.iter().skip(1))
            .zip(sequence.iter())
            .enumerate()
            .try_fold(
                (Vec::<BlendWindow>::new(), 0),
                |(mut windows, earliest_start), (junction, ((first, second), item))| {
                    let window = blender
                        .window_after(first, second, item.blend_radius, earliest_start)
                        .map_err(|e| e.at_junction(junction))?;
                    let next_start = window.second_start;
                    windows.push(window);
                    Ok::<_, PlanningError>((windows, next_start))
                },
            )?;

        let segment_refs: Vec<&Trajectory> = segments.iter().collect();
        let merged = assemble(&segment_refs, &windows)?;
        verify_joint_limits(&merged, limits)?;
        Ok(merged)
    }
}

/// Rest state at the end of `previous`
fn chained_start(previous: &Trajectory) -> PlanningResult<JointState> {
    let last = previous
        .last()
        .ok_or_else(|| PlanningError::planning_failed("sequence item produced no samples"))?;
    Ok(JointState::at_rest(previous.joint_names.clone(), last.positions.clone()))
}
