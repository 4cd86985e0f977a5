use crate::{indexer::Indexer, node::Node, payout::Payout};

pub trait Metric {
    fn init() -> Self;
}

pub struct Metrics {
    pub indexer: Indexer,
    pub node: Node,
    pub payout: Payout,
}

impl Metric for Metrics {
    fn init() -> Self {
        Self {
            indexer: Indexer::init(),
            node: Node::init(),
            payout: Payout::init(),
        }
    }
}
