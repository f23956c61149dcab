// LIN-CIRC-LIN sequence on the gantry reference robot
//
// usage: sequence_demo [planner.toml]

use industrial_motion::command::{
    CommandKind, GoalConstraints, MotionRequest, PathConstraint, Sequence,
};
use industrial_motion::common::{pose_from_parts, pose_position, JointState, KinematicsSolver};
use industrial_motion::config::PlannerConfig;
use industrial_motion::kinematics::{GantryWristRobot, TCP_LINK};
use industrial_motion::{SequencePlanner, TrajectoryGenerator};
use nalgebra::{Point3, UnitQuaternion};

const DEFAULT_CONFIG: &str = r#"
sampling_time = 0.01

[cartesian_limits]
max_trans_vel = 2.0
max_trans_acc = 4.0
max_trans_dec = -4.0
max_rot_vel = 2.0

[joint_limits.gantry_x]
max_velocity = 0.25
max_acceleration = 2.0

[joint_limits.gantry_y]
max_velocity = 0.25
max_acceleration = 2.0

[joint_limits.gantry_z]
max_velocity = 0.25
max_acceleration = 2.0

[joint_limits.wrist_yaw]
max_velocity = 1.0
max_acceleration = 4.0

[joint_limits.wrist_pitch]
max_velocity = 1.0
max_acceleration = 4.0

[joint_limits.wrist_roll]
max_velocity = 1.0
max_acceleration = 4.0
"#;

fn lin(group: &str, names: &[String], start: &[f64], goal: Point3<f64>) -> MotionRequest {
    MotionRequest::new(
        CommandKind::Lin,
        group,
        JointState::at_rest(names.to_vec(), start.to_vec()),
        GoalConstraints::pose(TCP_LINK, pose_from_parts(goal, UnitQuaternion::identity())),
    )
    .with_scaling(0.1, 0.1)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("industrial_motion=info".parse()?),
        )
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path);
            PlannerConfig::from_file(&path)?
        }
        None => PlannerConfig::from_toml_str(DEFAULT_CONFIG)?,
    };

    let robot = GantryWristRobot::with_defaults();
    let group = robot.group_name().to_string();
    let names = robot.joint_names().to_vec();
    let generator = TrajectoryGenerator::from_config(robot, config)?;

    // the start states of the later items are replaced by the sequence planner
    let start = [-0.2, -0.5, 0.5, 0.0, 0.0, 0.0];
    let center = Point3::new(0.0, 0.0, 0.6);
    let circ = MotionRequest::new(
        CommandKind::Circ,
        group.as_str(),
        JointState::at_rest(names.clone(), start.to_vec()),
        GoalConstraints::pose(
            TCP_LINK,
            pose_from_parts(Point3::new(0.5, 0.0, 0.6), UnitQuaternion::identity()),
        ),
    )
    .with_path_constraint(PathConstraint::center(TCP_LINK, center))
    .with_scaling(0.1, 0.1);

    let sequence = Sequence::new()
        .with(lin(&group, &names, &start, Point3::new(0.0, -0.5, 0.6)), 0.03)
        .with(circ, 0.03)
        .with(lin(&group, &names, &start, Point3::new(0.5, 0.2, 0.6)), 0.0);

    let trajectory = SequencePlanner::new(&generator).plan(&sequence)?;
    tracing::info!(
        "Sequence planned: {} samples over {:.2} s",
        trajectory.len(),
        trajectory.duration()
    );

    for point in trajectory.points.iter().step_by(50) {
        let pose = generator.kinematics().forward(TCP_LINK, &point.positions)?;
        let p = pose_position(&pose);
        println!(
            "t = {:6.2} s  tcp = [{:7.4}, {:7.4}, {:7.4}]",
            point.time_from_start, p.x, p.y, p.z
        );
    }
    Ok(())
}
