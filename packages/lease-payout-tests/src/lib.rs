pub mod fixtures;

pub mod defaults {
    pub const GENERATOR: &str = "3PGenerator";
    pub const OTHER_GENERATOR: &str = "3POtherGenerator";
    pub const LEASER_A: &str = "3PLeaserA";
    pub const LEASER_B: &str = "3PLeaserB";
    pub const NODE_ALIAS: &str = "alias:W:node";
    pub const REWARD_TOKEN: &str = "Token";
    pub const INDEXER_BATCH_SIZE: u64 = 100;
}
