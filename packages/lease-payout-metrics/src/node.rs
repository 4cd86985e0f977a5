use crate::core::Metric;
use prometheus::{self, register_int_counter, IntCounter};

pub struct Node {
    pub requests: IntCounter,
    pub request_errors: IntCounter,
}

impl Metric for Node {
    fn init() -> Self {
        Self {
            requests: register_int_counter!(
                "node_requests",
                "Number of requests sent to the node API."
            )
            .unwrap(),
            request_errors: register_int_counter!(
                "node_request_errors",
                "Number of node API requests that failed."
            )
            .unwrap(),
        }
    }
}
