//! 关节层级与姿态传播

mod hierarchy;
mod joint;
mod manager;

pub use hierarchy::{propagate, Hierarchy};
pub(crate) use hierarchy::propagate_unchecked;
pub use joint::{Joint, JointDef, JointId};
pub use manager::{MatrixTargets, Skeleton};
