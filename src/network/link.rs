use serde::{Deserialize, Serialize};

use crate::RouterId;

/// Undirected edge reconstructed from the endpoints' link-state tables.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Link {
    pub router_a: RouterId,
    pub router_b: RouterId,
    pub weight: f64,
}

impl Link {
    pub fn connects(&self, x: RouterId, y: RouterId) -> bool {
        (self.router_a == x && self.router_b == y) || (self.router_a == y && self.router_b == x)
    }

    pub fn other_end(&self, router: RouterId) -> Option<RouterId> {
        if self.router_a == router {
            Some(self.router_b)
        } else if self.router_b == router {
            Some(self.router_a)
        } else {
            None
        }
    }
}
