use std::fmt::Debug;

/// Turns optimized logical plans into physical plans.
pub trait Planner: Debug + Send + Sync {
    fn strategies(&self) -> Vec<&str>;
}

#[derive(Debug)]
pub struct DefaultPlanner {
    strategies: Vec<&'static str>,
}

impl DefaultPlanner {
    pub fn new() -> Self {
        Self { strategies: vec!["scan", "join", "aggregate", "basic_operators"] }
    }
}

impl Default for DefaultPlanner {
    fn default() -> Self {
        Self::new()
    }
}

impl Planner for DefaultPlanner {
    fn strategies(&self) -> Vec<&str> {
        self.strategies.clone()
    }
}
