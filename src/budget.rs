//! Output size guard for operations that can return very large reports.

use tracing::info;

/// Rough token estimate: four bytes of UTF-8 per token, rounded up.
pub fn estimate_tokens(text: &str) -> usize {
    text.len().div_ceil(4)
}

/// Outcome of a budget check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BudgetDecision {
    Allowed {
        estimated_tokens: usize,
        /// The text was over budget and passed only because of the override.
        overridden: bool,
    },
    Denied {
        estimated_tokens: usize,
        error: String,
    },
}

impl BudgetDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, BudgetDecision::Allowed { .. })
    }
}

/// Rejects rendered output whose estimated size exceeds a configured budget.
#[derive(Debug, Clone, Copy)]
pub struct TokenBudgetGuard {
    max_tokens: usize,
}

impl TokenBudgetGuard {
    pub fn new(max_tokens: usize) -> Self {
        Self { max_tokens }
    }

    /// Check `text` against the budget. `override_requested` lets oversized output through.
    pub fn check(&self, text: &str, override_requested: bool) -> BudgetDecision {
        let estimated_tokens = estimate_tokens(text);

        if estimated_tokens <= self.max_tokens {
            return BudgetDecision::Allowed {
                estimated_tokens,
                overridden: false,
            };
        }

        if override_requested {
            info!(
                estimated_tokens,
                max_tokens = self.max_tokens,
                "Token budget exceeded; override requested"
            );
            return BudgetDecision::Allowed {
                estimated_tokens,
                overridden: true,
            };
        }

        info!(
            estimated_tokens,
            max_tokens = self.max_tokens,
            "Token budget exceeded; response withheld"
        );

        BudgetDecision::Denied {
            estimated_tokens,
            error: format!(
                "Response too large: estimated {} tokens exceeds the limit of {} tokens. \
                 Narrow the query (for example a smaller limit, a higher confidence minimum, \
                 or a smaller network), or set break_token_rule to true to bypass this limit \
                 in critical situations.",
                estimated_tokens, self.max_tokens
            ),
        }
    }
}
