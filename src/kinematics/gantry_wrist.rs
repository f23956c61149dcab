//! Cartesian gantry carrying a yaw-pitch-roll wrist
//!
//! Three prismatic axes position the wrist, three revolute axes orient it:
//! `flange = Trans(x, y, z) * Rz(yaw) * Ry(pitch) * Rx(roll)`, and the tool
//! center point sits at a fixed offset from the flange. Inverse kinematics is
//! closed form with two wrist branches; the branch closest to the seed wins.

use std::f64::consts::PI;

use nalgebra::{Isometry3, Translation3, UnitQuaternion, Vector3};

use super::KinematicsError;
use crate::common::{KinematicsSolver, Pose};

pub const BASE_LINK: &str = "base_link";
pub const CARRIAGE_LINK: &str = "carriage";
pub const FLANGE_LINK: &str = "flange";
pub const TCP_LINK: &str = "tcp";

const DOF: usize = 6;
// |cos(pitch)| below this leaves yaw and roll coupled
const GIMBAL_LOCK_EPS: f64 = 1e-9;

/// Analytic 6-axis reference robot
#[derive(Debug, Clone)]
pub struct GantryWristRobot {
    group_name: String,
    joint_names: Vec<String>,
    tool_offset: Vector3<f64>,
    /// [min, max] for X, Y, Z of the flange
    workspace: [[f64; 2]; 3],
}

impl GantryWristRobot {
    pub fn new(
        group_name: impl Into<String>,
        tool_offset: Vector3<f64>,
        workspace: [[f64; 2]; 3],
    ) -> Self {
        let joint_names = [
            "gantry_x",
            "gantry_y",
            "gantry_z",
            "wrist_yaw",
            "wrist_pitch",
            "wrist_roll",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();
        Self {
            group_name: group_name.into(),
            joint_names,
            tool_offset,
            workspace,
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(
            "manipulator",
            Vector3::new(0.0, 0.0, 0.1),
            [[-2.0, 2.0], [-2.0, 2.0], [-2.0, 2.0]],
        )
    }

    fn check_joint_count(&self, count: usize) -> Result<(), KinematicsError> {
        if count != DOF {
            return Err(KinematicsError::JointCount {
                expected: DOF,
                actual: count,
            });
        }
        Ok(())
    }

    fn flange_pose(positions: &[f64]) -> Pose {
        Isometry3::from_parts(
            Translation3::new(positions[0], positions[1], positions[2]),
            UnitQuaternion::from_euler_angles(positions[5], positions[4], positions[3]),
        )
    }

    fn in_workspace(&self, position: &Vector3<f64>) -> bool {
        (0..3).all(|i| position[i] >= self.workspace[i][0] && position[i] <= self.workspace[i][1])
    }

    /// Both wrist solutions `[yaw, pitch, roll]`, each unwrapped towards the seed
    fn wrist_branches(
        rotation: &UnitQuaternion<f64>,
        seed: &[f64],
    ) -> Result<[[f64; 3]; 2], KinematicsError> {
        let (roll, pitch, yaw) = rotation.euler_angles();
        if pitch.cos().abs() < GIMBAL_LOCK_EPS {
            return Err(KinematicsError::Singular(format!("wrist pitch {:.6} rad", pitch)));
        }
        let first = [yaw, pitch, roll];
        let second = [yaw + PI, PI - pitch, roll + PI];
        let unwrap = |angles: [f64; 3]| {
            let mut out = [0.0; 3];
            for i in 0..3 {
                out[i] = nearest_equivalent(angles[i], seed[3 + i]);
            }
            out
        };
        Ok([unwrap(first), unwrap(second)])
    }
}

/// Angle equivalent to `angle` (mod 2π) closest to `reference`
fn nearest_equivalent(angle: f64, reference: f64) -> f64 {
    let two_pi = 2.0 * PI;
    angle + two_pi * ((reference - angle) / two_pi).round()
}

impl KinematicsSolver for GantryWristRobot {
    fn group_name(&self) -> &str {
        &self.group_name
    }

    fn joint_names(&self) -> &[String] {
        &self.joint_names
    }

    fn tip_link(&self) -> &str {
        TCP_LINK
    }

    fn has_link(&self, link_name: &str) -> bool {
        matches!(link_name, BASE_LINK | CARRIAGE_LINK | FLANGE_LINK | TCP_LINK)
    }

    fn forward(&self, link_name: &str, positions: &[f64]) -> Result<Pose, KinematicsError> {
        self.check_joint_count(positions.len())?;
        match link_name {
            BASE_LINK => Ok(Pose::identity()),
            CARRIAGE_LINK => Ok(Isometry3::translation(positions[0], positions[1], positions[2])),
            FLANGE_LINK => Ok(Self::flange_pose(positions)),
            TCP_LINK => Ok(Self::flange_pose(positions) * Translation3::from(self.tool_offset)),
            other => Err(KinematicsError::UnknownLink(other.to_string())),
        }
    }

    fn inverse(
        &self,
        link_name: &str,
        pose: &Pose,
        seed: &[f64],
    ) -> Result<Vec<f64>, KinematicsError> {
        self.check_joint_count(seed.len())?;
        let flange = match link_name {
            FLANGE_LINK => *pose,
            TCP_LINK => pose * Translation3::from(-self.tool_offset),
            BASE_LINK | CARRIAGE_LINK => {
                return Err(KinematicsError::NotSolvable(link_name.to_string()))
            }
            other => return Err(KinematicsError::UnknownLink(other.to_string())),
        };

        let position = flange.translation.vector;
        if !self.in_workspace(&position) {
            return Err(KinematicsError::OutOfReach(format!(
                "flange position [{:.3}, {:.3}, {:.3}] outside workspace",
                position[0], position[1], position[2]
            )));
        }

        let distance =
            |wrist: &[f64; 3]| -> f64 { (0..3).map(|i| (wrist[i] - seed[3 + i]).powi(2)).sum() };
        let [first, second] = Self::wrist_branches(&flange.rotation, seed)?;
        let wrist = if distance(&second) < distance(&first) { second } else { first };

        Ok(vec![position[0], position[1], position[2], wrist[0], wrist[1], wrist[2]])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_tcp_offset() {
        let robot = GantryWristRobot::with_defaults();
        let pose = robot.forward(TCP_LINK, &[0.1, 0.2, 0.3, 0.0, 0.0, 0.0]).unwrap();
        assert!((pose.translation.vector - Vector3::new(0.1, 0.2, 0.4)).norm() < 1e-12);

        // pitching by 90 degrees swings the tool along +x
        let pose = robot.forward(TCP_LINK, &[0.0, 0.0, 0.0, 0.0, PI / 2.0, 0.0]).unwrap();
        assert!((pose.translation.vector - Vector3::new(0.1, 0.0, 0.0)).norm() < 1e-12);
    }

    #[test]
    fn test_inverse_roundtrip() {
        let robot = GantryWristRobot::with_defaults();
        let joints = [0.3, -0.2, 0.5, 0.4, -0.3, 1.2];
        let pose = robot.forward(TCP_LINK, &joints).unwrap();
        let solution = robot.inverse(TCP_LINK, &pose, &joints).unwrap();
        for (a, b) in solution.iter().zip(joints.iter()) {
            assert!((a - b).abs() < 1e-9, "{:?} vs {:?}", solution, joints);
        }
    }

    #[test]
    fn test_inverse_follows_seed_branch() {
        let robot = GantryWristRobot::with_defaults();
        let joints = [0.0, 0.0, 0.0, 0.4, 0.3, 0.2];
        let pose = robot.forward(FLANGE_LINK, &joints).unwrap();
        // seed near the flipped wrist branch
        let flipped_seed = [0.0, 0.0, 0.0, 0.4 + PI, PI - 0.3, 0.2 + PI];
        let solution = robot.inverse(FLANGE_LINK, &pose, &flipped_seed).unwrap();
        assert!((solution[4] - (PI - 0.3)).abs() < 1e-9);
        let check = robot.forward(FLANGE_LINK, &solution).unwrap();
        assert!(check.rotation.angle_to(&pose.rotation) < 1e-6);
    }

    #[test]
    fn test_inverse_unwraps_towards_seed() {
        let robot = GantryWristRobot::with_defaults();
        let joints = [0.0, 0.0, 0.0, 3.0, 0.1, 0.0];
        let pose = robot.forward(FLANGE_LINK, &joints).unwrap();
        let seed = [0.0, 0.0, 0.0, 3.1, 0.1, 0.0];
        let solution = robot.inverse(FLANGE_LINK, &pose, &seed).unwrap();
        assert!((solution[3] - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_inverse_out_of_reach() {
        let robot = GantryWristRobot::with_defaults();
        let pose = Isometry3::translation(5.0, 0.0, 0.0);
        let err = robot.inverse(FLANGE_LINK, &pose, &[0.0; 6]).unwrap_err();
        assert!(matches!(err, KinematicsError::OutOfReach(_)));
    }

    #[test]
    fn test_unknown_link_and_joint_count() {
        let robot = GantryWristRobot::with_defaults();
        assert!(!robot.has_link("gripper"));
        assert!(matches!(
            robot.forward("gripper", &[0.0; 6]),
            Err(KinematicsError::UnknownLink(_))
        ));
        assert!(matches!(
            robot.forward(TCP_LINK, &[0.0; 3]),
            Err(KinematicsError::JointCount { expected: 6, actual: 3 })
        ));
    }
}
