use super::node::Node;

/// Read-only walk over nodes
pub trait NodeVisitor {
    fn visit(&mut self, node: &Node);
}

/// Sums the capability cost of every visited node
#[derive(Debug, Default)]
pub struct CostCalculator {
    total: u64,
}

impl CostCalculator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn total_cost(&self) -> u64 {
        self.total
    }
}

impl NodeVisitor for CostCalculator {
    fn visit(&mut self, node: &Node) {
        self.total = self.total.saturating_add(node.capability().cost);
    }
}

/// ANDs the validator verdict of every visited node.
///
/// Nodes without a validator count as healthy.
#[derive(Debug)]
pub struct StatusCalculator {
    ok: bool,
}

impl StatusCalculator {
    pub fn new() -> Self {
        Self { ok: true }
    }

    pub fn is_ok(&self) -> bool {
        self.ok
    }
}

impl Default for StatusCalculator {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeVisitor for StatusCalculator {
    fn visit(&mut self, node: &Node) {
        let verdict = node.validator().map(|v| v.validate(node)).unwrap_or(true);
        self.ok = self.ok && verdict;
    }
}
