/// Computed balance for one user. Never stored: deriving it from jobs
/// and payments avoids a second source of truth that could drift.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UsageBalance {
    pub used_seconds: i64,
    pub allowance_seconds: i64,
}

impl UsageBalance {
    pub fn remaining_seconds(&self) -> i64 {
        (self.allowance_seconds - self.used_seconds).max(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remaining_is_difference_when_allowance_covers_usage() {
        let balance = UsageBalance {
            used_seconds: 600,
            allowance_seconds: 3600,
        };
        assert_eq!(balance.remaining_seconds(), 3000);
    }

    #[test]
    fn remaining_never_goes_negative() {
        let balance = UsageBalance {
            used_seconds: 4000,
            allowance_seconds: 600,
        };
        assert_eq!(balance.remaining_seconds(), 0);
    }
}
