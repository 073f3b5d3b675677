//! The merge engine shared by every styled element.
//!
//! Three operations recur across the whole model:
//!
//! - [`Defaultable::is_default`]: every field equals its compile-time default.
//! - [`Combine::combine`]: merge a reference into an instance, overwriting only
//!   fields that are still at their default ("default wins toward reference").
//! - [`ApplyOptions::apply_options`]: sparse patch application where only
//!   explicitly `Some` patch fields overwrite the target, regardless of the
//!   target's current state.
//!
//! Element types implement these by listing their fields through the
//! [`merge_field`]/[`apply_field`] helpers, so the per-field rules live in one
//! place instead of being restated for every type.

/// A model type whose fields all have fixed default values.
pub trait Defaultable {
    /// `true` iff every field equals its default. Must hold for a freshly
    /// constructed value and is O(field count) with no side effects.
    fn is_default(&self) -> bool;
}

/// Default-wins merge of a reference value into `self`.
pub trait Combine {
    /// For each field still at its default, take the reference's value.
    /// Non-default fields are left untouched. Nested styled elements delegate
    /// to their own `combine` rather than being compared wholesale.
    fn combine(&mut self, reference: &Self);
}

/// Sparse patch application from a parallel all-optional options type.
pub trait ApplyOptions {
    type Options;

    /// Overwrite exactly the fields the patch specifies. Unlike [`Combine`],
    /// this never consults the target's current default state.
    fn apply_options(&mut self, patch: &Self::Options);
}

/// Overwrite `field` with `reference` only when it still equals `default`.
pub fn merge_field<T: PartialEq + Clone>(field: &mut T, default: &T, reference: &T) {
    if field == default {
        *field = reference.clone();
    }
}

/// Overwrite `field` when the patch carries a value.
pub fn apply_field<T: Clone>(field: &mut T, patch: &Option<T>) {
    if let Some(value) = patch {
        *field = value.clone();
    }
}

/// Combine with an optional reference; `None` is a no-op.
pub fn combine_opt<T: Combine>(target: &mut T, reference: Option<&T>) {
    if let Some(reference) = reference {
        target.combine(reference);
    }
}

/// A collection element addressable by a string key within its collection.
///
/// Keys are compared case-sensitively (ordinal semantics); uniqueness is a
/// per-collection concern.
pub trait Keyed {
    fn key(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq, Default)]
    struct Probe {
        n: u32,
        s: String,
    }

    impl Combine for Probe {
        fn combine(&mut self, reference: &Self) {
            let d = Self::default();
            merge_field(&mut self.n, &d.n, &reference.n);
            merge_field(&mut self.s, &d.s, &reference.s);
        }
    }

    #[test]
    fn merge_field_only_touches_defaults() {
        let mut a = Probe {
            n: 7,
            s: String::new(),
        };
        let b = Probe {
            n: 1,
            s: "ref".into(),
        };
        a.combine(&b);
        assert_eq!(a.n, 7);
        assert_eq!(a.s, "ref");
    }

    #[test]
    fn combine_is_idempotent() {
        let mut a = Probe::default();
        let b = Probe {
            n: 3,
            s: "x".into(),
        };
        a.combine(&b);
        let once = a.clone();
        a.combine(&b);
        assert_eq!(a, once);
    }

    #[test]
    fn combine_opt_with_none_is_noop() {
        let mut a = Probe {
            n: 2,
            s: "keep".into(),
        };
        let before = a.clone();
        combine_opt(&mut a, None);
        assert_eq!(a, before);
    }
}
