pub mod link;
pub mod packet;
pub mod router;
pub mod topology;

pub use link::Link;
pub use packet::Packet;
pub use router::{ChangeStatus, DistanceVector, LinkState, Router};
pub use topology::Topology;
