#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stats {
    pub username: String,
    pub solved_count: u64,
    pub level: u64,
}
