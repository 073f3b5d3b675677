use serde::{Deserialize, Deserializer, Serialize};

use crate::collection::KeyedList;
use crate::error::StyleError;
use crate::merge::{apply_field, merge_field, ApplyOptions, Combine, Defaultable, Keyed};
use crate::shadow::{Shadow, ShadowOptions};

pub const MAX_TRANSPARENCY_PCT: u8 = 100;

/// A named visual effect applied to a shape or picture.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Effect {
    pub name: String,
    pub shadow: Shadow,
    /// Soft-glow radius in 1/100 points; 0 disables the glow.
    pub glow_100pt: u32,
    #[serde(deserialize_with = "deserialize_transparency")]
    transparency_pct: u8,
}

impl Effect {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn transparency_pct(&self) -> u8 {
        self.transparency_pct
    }

    /// Set overall transparency as a percentage. Values over 100 are rejected.
    pub fn set_transparency_pct(&mut self, pct: u8) -> Result<(), StyleError> {
        validate_transparency(pct)?;
        self.transparency_pct = pct;
        Ok(())
    }
}

fn validate_transparency(pct: u8) -> Result<(), StyleError> {
    if pct > MAX_TRANSPARENCY_PCT {
        return Err(StyleError::InvalidValue {
            field: "transparency_pct",
            reason: format!("{pct} exceeds {MAX_TRANSPARENCY_PCT}"),
        });
    }
    Ok(())
}

fn deserialize_transparency<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error as _;
    let pct = u8::deserialize(deserializer)?;
    validate_transparency(pct).map_err(D::Error::custom)?;
    Ok(pct)
}

impl Keyed for Effect {
    fn key(&self) -> &str {
        &self.name
    }
}

impl Defaultable for Effect {
    fn is_default(&self) -> bool {
        *self == Self::default()
    }
}

impl Combine for Effect {
    fn combine(&mut self, reference: &Self) {
        let d = Self::default();
        self.shadow.combine(&reference.shadow);
        merge_field(&mut self.glow_100pt, &d.glow_100pt, &reference.glow_100pt);
        merge_field(
            &mut self.transparency_pct,
            &d.transparency_pct,
            &reference.transparency_pct,
        );
    }
}

fn deserialize_transparency_opt<'de, D>(deserializer: D) -> Result<Option<u8>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error as _;
    let pct = Option::<u8>::deserialize(deserializer)?;
    if let Some(pct) = pct {
        validate_transparency(pct).map_err(D::Error::custom)?;
    }
    Ok(pct)
}

/// Sparse patch for [`Effect`]. A present `transparency_pct` is range-checked
/// on deserialization, the same as direct assignment.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EffectOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shadow: Option<ShadowOptions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub glow_100pt: Option<u32>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_transparency_opt"
    )]
    pub transparency_pct: Option<u8>,
}

impl Defaultable for EffectOptions {
    fn is_default(&self) -> bool {
        *self == Self::default()
    }
}

impl ApplyOptions for Effect {
    type Options = EffectOptions;

    fn apply_options(&mut self, patch: &EffectOptions) {
        if let Some(shadow) = &patch.shadow {
            self.shadow.apply_options(shadow);
        }
        apply_field(&mut self.glow_100pt, &patch.glow_100pt);
        apply_field(&mut self.transparency_pct, &patch.transparency_pct);
    }
}

/// Ordered effect collection, keyed by effect name.
pub type Effects = KeyedList<Effect>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transparency_is_range_checked() {
        let mut e = Effect::named("soft");
        assert!(e.set_transparency_pct(40).is_ok());
        assert!(e.set_transparency_pct(101).is_err());
        assert_eq!(e.transparency_pct(), 40);
    }

    #[test]
    fn transparency_patches_are_validated_like_direct_assignment() {
        assert!(serde_json::from_str::<EffectOptions>(r#"{"transparencyPct": 150}"#).is_err());

        let patch: EffectOptions = serde_json::from_str(r#"{"transparencyPct": 40}"#).unwrap();
        let mut e = Effect::named("soft");
        e.apply_options(&patch);
        assert_eq!(e.transparency_pct(), 40);
    }

    #[test]
    fn nested_shadow_combines_recursively() {
        let mut e = Effect::named("drop");
        e.shadow.visible = true;
        let mut reference = Effect::named("drop");
        reference.shadow.blur_100pt = 300;
        reference.glow_100pt = 50;
        e.combine(&reference);
        assert!(e.shadow.visible);
        assert_eq!(e.shadow.blur_100pt, 300);
        assert_eq!(e.glow_100pt, 50);
    }
}
