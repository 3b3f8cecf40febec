#[derive(Debug, Clone, Copy)]
pub struct LimitOffset {
    pub limit: i64,
    pub offset: i64,
}

impl Default for LimitOffset {
    fn default() -> Self {
        Self {
            limit: 20,
            offset: 0,
        }
    }
}

impl LimitOffset {
    /// Upper bound for any single page requested by a client.
    pub const MAX_LIMIT: i64 = 100;

    /// Build a page from client-supplied values, clamping them into range.
    pub fn clamped(limit: Option<i64>, offset: Option<i64>) -> Self {
        let default = Self::default();
        Self {
            limit: limit.unwrap_or(default.limit).clamp(1, Self::MAX_LIMIT),
            offset: offset.unwrap_or(default.offset).max(0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamps_out_of_range_values() {
        let page = LimitOffset::clamped(Some(10_000), Some(-5));
        assert_eq!(page.limit, LimitOffset::MAX_LIMIT);
        assert_eq!(page.offset, 0);
    }

    #[test]
    fn falls_back_to_defaults() {
        let page = LimitOffset::clamped(None, None);
        assert_eq!(page.limit, 20);
        assert_eq!(page.offset, 0);
    }
}
