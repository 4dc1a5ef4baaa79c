pub mod kinematics;
pub mod launch_site;

pub use kinematics::{KinematicsStage, TIME_EPSILON_SECONDS};
pub use launch_site::{nearest_launch_site, LaunchSite, LAUNCH_SITES, UNKNOWN_SITE};
