use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::{ParamError, Result};
use crate::value::ParamValue;

/// A labeled value owned by a category.
///
/// Label and value are fixed at construction. The active flag is the only
/// mutable part and can be flipped through a shared reference, so items are
/// usually held as `Arc<ParameterItem>`.
pub struct ParameterItem {
    label: String,
    value: ParamValue,
    active: AtomicBool,
}

impl ParameterItem {
    pub fn new(label: impl Into<String>, value: ParamValue, active: bool) -> Result<Self> {
        let label = label.into();
        if label.trim().is_empty() {
            return Err(ParamError::validation("label", "item label must not be empty"));
        }

        Ok(Self {
            label,
            value,
            active: AtomicBool::new(active),
        })
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn value(&self) -> &ParamValue {
        &self.value
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// Set the active flag. Never fails.
    pub fn set_active(&self, active: bool) -> Result<()> {
        self.active.store(active, Ordering::Release);
        Ok(())
    }
}

impl PartialEq for ParameterItem {
    fn eq(&self, other: &Self) -> bool {
        self.is_active() == other.is_active()
            && self.label == other.label
            && self.value == other.value
    }
}

impl Clone for ParameterItem {
    fn clone(&self) -> Self {
        Self {
            label: self.label.clone(),
            value: self.value.clone(),
            active: AtomicBool::new(self.is_active()),
        }
    }
}

impl fmt::Debug for ParameterItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParameterItem")
            .field("label", &self.label)
            .field("value", &self.value)
            .field("active", &self.is_active())
            .finish()
    }
}

impl fmt::Display for ParameterItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let marker = if self.is_active() { "" } else { " (inactive)" };
        write!(f, "{} = {}{}", self.label, self.value, marker)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_new_item() {
        let item = ParameterItem::new("Label 1", ParamValue::from("Value 1"), false).unwrap();
        assert_eq!(item.label(), "Label 1");
        assert_eq!(item.value(), &ParamValue::from("Value 1"));
        assert!(!item.is_active());
    }

    #[test]
    fn test_empty_label_rejected() {
        for label in ["", "   "] {
            let err = ParameterItem::new(label, ParamValue::from(1), true).unwrap_err();
            assert!(matches!(err, ParamError::Validation { field: "label", .. }));
        }
    }

    #[test]
    fn test_set_active_through_shared_ref() {
        let item = Arc::new(ParameterItem::new("k", ParamValue::from(2), false).unwrap());
        let other = Arc::clone(&item);
        other.set_active(true).unwrap();
        assert!(item.is_active());
    }

    #[test]
    fn test_equality_includes_active_flag() {
        let a = ParameterItem::new("k", ParamValue::from(2.5), true).unwrap();
        let b = ParameterItem::new("k", ParamValue::from(2.5), true).unwrap();
        assert_eq!(a, b);

        b.set_active(false).unwrap();
        assert_ne!(a, b);

        let c = ParameterItem::new("k", ParamValue::from("2.5"), true).unwrap();
        assert_ne!(a, c);
    }

    #[test]
    fn test_nan_item_equals_its_clone() {
        let item = ParameterItem::new("ratio", ParamValue::from(f64::NAN), true).unwrap();
        let copy = item.clone();
        assert_eq!(item, copy);
        assert_eq!(copy, item);
    }

    #[test]
    fn test_display() {
        let item = ParameterItem::new("budget", ParamValue::from(1000), false).unwrap();
        assert_eq!(item.to_string(), "budget = 1000 (inactive)");
    }
}
