use serde::{Deserialize, Deserializer, Serialize};

use crate::error::StyleError;
use crate::merge::{apply_field, merge_field, ApplyOptions, Combine, Defaultable};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum HorizontalAlignment {
    #[default]
    General,
    Left,
    Center,
    Right,
    Fill,
    Justify,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum VerticalAlignment {
    #[default]
    Bottom,
    Top,
    Center,
    Justify,
}

pub const MIN_TEXT_ROTATION: i16 = -90;
pub const MAX_TEXT_ROTATION: i16 = 90;

/// Cell text alignment.
///
/// `rotation` is range-checked at assignment (−90..=90 degrees), so it is kept
/// behind a setter; the remaining fields are plain data.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Alignment {
    pub horizontal: HorizontalAlignment,
    pub vertical: VerticalAlignment,
    pub wrap_text: bool,
    pub shrink_to_fit: bool,
    pub indent: u8,
    #[serde(deserialize_with = "deserialize_rotation")]
    rotation: i16,
}

impl Alignment {
    pub fn rotation(&self) -> i16 {
        self.rotation
    }

    /// Set text rotation in degrees. Values outside −90..=90 are rejected.
    pub fn set_rotation(&mut self, degrees: i16) -> Result<(), StyleError> {
        validate_rotation(degrees)?;
        self.rotation = degrees;
        Ok(())
    }
}

fn validate_rotation(degrees: i16) -> Result<(), StyleError> {
    if !(MIN_TEXT_ROTATION..=MAX_TEXT_ROTATION).contains(&degrees) {
        return Err(StyleError::InvalidValue {
            field: "rotation",
            reason: format!("{degrees} is outside {MIN_TEXT_ROTATION}..={MAX_TEXT_ROTATION}"),
        });
    }
    Ok(())
}

fn deserialize_rotation<'de, D>(deserializer: D) -> Result<i16, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error as _;
    let degrees = i16::deserialize(deserializer)?;
    validate_rotation(degrees).map_err(D::Error::custom)?;
    Ok(degrees)
}

impl Defaultable for Alignment {
    fn is_default(&self) -> bool {
        *self == Self::default()
    }
}

impl Combine for Alignment {
    fn combine(&mut self, reference: &Self) {
        let d = Self::default();
        merge_field(&mut self.horizontal, &d.horizontal, &reference.horizontal);
        merge_field(&mut self.vertical, &d.vertical, &reference.vertical);
        merge_field(&mut self.wrap_text, &d.wrap_text, &reference.wrap_text);
        merge_field(
            &mut self.shrink_to_fit,
            &d.shrink_to_fit,
            &reference.shrink_to_fit,
        );
        merge_field(&mut self.indent, &d.indent, &reference.indent);
        // Reference rotation passed validation when it was assigned.
        merge_field(&mut self.rotation, &d.rotation, &reference.rotation);
    }
}

fn deserialize_rotation_opt<'de, D>(deserializer: D) -> Result<Option<i16>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error as _;
    let degrees = Option::<i16>::deserialize(deserializer)?;
    if let Some(degrees) = degrees {
        validate_rotation(degrees).map_err(D::Error::custom)?;
    }
    Ok(degrees)
}

/// Sparse patch for [`Alignment`]. A present `rotation` is range-checked on
/// deserialization, the same as direct assignment.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AlignmentOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub horizontal: Option<HorizontalAlignment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vertical: Option<VerticalAlignment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wrap_text: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shrink_to_fit: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub indent: Option<u8>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_rotation_opt"
    )]
    pub rotation: Option<i16>,
}

impl Defaultable for AlignmentOptions {
    fn is_default(&self) -> bool {
        *self == Self::default()
    }
}

impl ApplyOptions for Alignment {
    type Options = AlignmentOptions;

    fn apply_options(&mut self, patch: &AlignmentOptions) {
        apply_field(&mut self.horizontal, &patch.horizontal);
        apply_field(&mut self.vertical, &patch.vertical);
        apply_field(&mut self.wrap_text, &patch.wrap_text);
        apply_field(&mut self.shrink_to_fit, &patch.shrink_to_fit);
        apply_field(&mut self.indent, &patch.indent);
        apply_field(&mut self.rotation, &patch.rotation);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rotation_is_range_checked() {
        let mut a = Alignment::default();
        assert!(a.set_rotation(45).is_ok());
        assert_eq!(a.rotation(), 45);
        assert!(matches!(
            a.set_rotation(91),
            Err(StyleError::InvalidValue { field: "rotation", .. })
        ));
        assert_eq!(a.rotation(), 45);
    }

    #[test]
    fn deserialization_rejects_out_of_range_rotation() {
        let err = serde_json::from_str::<Alignment>(r#"{"rotation": 180}"#);
        assert!(err.is_err());
    }

    #[test]
    fn rotation_patches_are_validated_like_direct_assignment() {
        assert!(serde_json::from_str::<AlignmentOptions>(r#"{"rotation": 120}"#).is_err());

        let patch: AlignmentOptions = serde_json::from_str(r#"{"rotation": -45}"#).unwrap();
        let mut a = Alignment::default();
        a.apply_options(&patch);
        assert_eq!(a.rotation(), -45);
    }

    #[test]
    fn fresh_alignment_is_default() {
        assert!(Alignment::default().is_default());
    }
}
