use std::fmt::Debug;

/// Rewrites resolved logical plans. Rules are applied in the order given.
pub trait Optimizer: Debug + Send + Sync {
    fn rules(&self) -> Vec<&str>;
}

#[derive(Debug)]
pub struct RuleOptimizer {
    rules: Vec<String>,
}

impl RuleOptimizer {
    pub fn new(rules: Vec<String>) -> Self {
        Self { rules }
    }
}

impl Default for RuleOptimizer {
    fn default() -> Self {
        let rules = ["push_down_filter", "prune_columns", "fold_constants", "eliminate_limit"];
        Self::new(rules.iter().map(|it| it.to_string()).collect())
    }
}

impl Optimizer for RuleOptimizer {
    fn rules(&self) -> Vec<&str> {
        self.rules.iter().map(String::as_str).collect()
    }
}
