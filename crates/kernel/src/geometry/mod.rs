pub mod matrix;
pub mod point;
pub mod quaternion;
pub mod transform;
pub mod vector;

pub use matrix::Matrix4x4;
pub use point::{Point2d, Point3d};
pub use quaternion::Quaternion;
pub use transform::{BoundingBox, Rotation3D, Transform3D};
pub use vector::Vec3;
