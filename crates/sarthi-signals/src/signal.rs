//! Outcome type for best-effort external lookups.

/// Result of a lookup that is allowed to fail without failing the
/// request. `Unavailable` means the integration is not configured or
/// not applicable; `Failed` means it was attempted and broke.
#[derive(Debug, Clone, PartialEq)]
pub enum Signal<T> {
    Value(T),
    Unavailable,
    Failed(String),
}

impl<T> Signal<T> {
    pub fn value(self) -> Option<T> {
        match self {
            Signal::Value(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_value(&self) -> Option<&T> {
        match self {
            Signal::Value(v) => Some(v),
            _ => None,
        }
    }

    pub fn is_value(&self) -> bool {
        matches!(self, Signal::Value(_))
    }

    /// Fall back to a default when the lookup produced nothing.
    pub fn unwrap_or(self, default: T) -> T {
        match self {
            Signal::Value(v) => v,
            _ => default,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Signal<U> {
        match self {
            Signal::Value(v) => Signal::Value(f(v)),
            Signal::Unavailable => Signal::Unavailable,
            Signal::Failed(e) => Signal::Failed(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_accessors() {
        let s: Signal<u32> = Signal::Value(7);
        assert!(s.is_value());
        assert_eq!(s.as_value(), Some(&7));
        assert_eq!(s.value(), Some(7));

        let f: Signal<u32> = Signal::Failed("timeout".into());
        assert!(!f.is_value());
        assert_eq!(f.value(), None);
    }

    #[test]
    fn test_unwrap_or_and_map() {
        let s: Signal<u32> = Signal::Unavailable;
        assert_eq!(s.unwrap_or(42), 42);

        let m = Signal::Value(2).map(|v: u32| v * 10);
        assert_eq!(m, Signal::Value(20));

        let f: Signal<u32> = Signal::Failed("down".into());
        assert_eq!(f.map(|v| v + 1), Signal::Failed("down".into()));
    }
}
