//! Master data model
//!
//! This module defines the reference-data entities behind the job board's
//! lookup lists: industries, sub-industries, departments, sub-departments,
//! education levels, courses, specializations, job titles and skills.
//!
//! All kinds live in a single `master_data` table distinguished by a kind
//! column. Dependent kinds (sub-industry, sub-department, course,
//! specialization) carry a `parent_id` pointing at an item of their parent
//! kind, which is what the dependent-dropdown lookups walk.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind discriminator for master data items.
///
/// Each kind maps to one lookup list in the job-post form. The cascade
/// topology is encoded in [`MasterDataKind::parent_kind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MasterDataKind {
    /// Top-level industry
    Industry,
    /// Industry subdivision (child of Industry)
    SubIndustry,
    /// Top-level department
    Department,
    /// Department subdivision (child of Department)
    SubDepartment,
    /// Education level (e.g. bachelor, master)
    EducationLevel,
    /// Course (child of EducationLevel)
    Course,
    /// Specialization (child of Course)
    Specialization,
    /// Job title
    JobTitle,
    /// Skill
    Skill,
}

/// All kinds, in seed/display order.
pub const ALL_KINDS: &[MasterDataKind] = &[
    MasterDataKind::Industry,
    MasterDataKind::SubIndustry,
    MasterDataKind::Department,
    MasterDataKind::SubDepartment,
    MasterDataKind::EducationLevel,
    MasterDataKind::Course,
    MasterDataKind::Specialization,
    MasterDataKind::JobTitle,
    MasterDataKind::Skill,
];

impl MasterDataKind {
    /// Convert kind to its database/URL string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            MasterDataKind::Industry => "industry",
            MasterDataKind::SubIndustry => "sub-industry",
            MasterDataKind::Department => "department",
            MasterDataKind::SubDepartment => "sub-department",
            MasterDataKind::EducationLevel => "education-level",
            MasterDataKind::Course => "course",
            MasterDataKind::Specialization => "specialization",
            MasterDataKind::JobTitle => "job-title",
            MasterDataKind::Skill => "skill",
        }
    }

    /// The kind a parent item must have, if this kind is dependent.
    ///
    /// Returns `None` for root kinds. This single function defines the
    /// industry → sub-industry, department → sub-department and
    /// education level → course → specialization cascades.
    pub fn parent_kind(&self) -> Option<MasterDataKind> {
        match self {
            MasterDataKind::SubIndustry => Some(MasterDataKind::Industry),
            MasterDataKind::SubDepartment => Some(MasterDataKind::Department),
            MasterDataKind::Course => Some(MasterDataKind::EducationLevel),
            MasterDataKind::Specialization => Some(MasterDataKind::Course),
            _ => None,
        }
    }

    /// Check if this kind sits at the top of its cascade (takes no parent)
    pub fn is_root(&self) -> bool {
        self.parent_kind().is_none()
    }

    /// The dependent kind keyed off this one, if any
    pub fn child_kind(&self) -> Option<MasterDataKind> {
        match self {
            MasterDataKind::Industry => Some(MasterDataKind::SubIndustry),
            MasterDataKind::Department => Some(MasterDataKind::SubDepartment),
            MasterDataKind::EducationLevel => Some(MasterDataKind::Course),
            MasterDataKind::Course => Some(MasterDataKind::Specialization),
            _ => None,
        }
    }
}

impl fmt::Display for MasterDataKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for MasterDataKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "industry" => Ok(MasterDataKind::Industry),
            "sub-industry" => Ok(MasterDataKind::SubIndustry),
            "department" => Ok(MasterDataKind::Department),
            "sub-department" => Ok(MasterDataKind::SubDepartment),
            "education-level" => Ok(MasterDataKind::EducationLevel),
            "course" => Ok(MasterDataKind::Course),
            "specialization" => Ok(MasterDataKind::Specialization),
            "job-title" => Ok(MasterDataKind::JobTitle),
            "skill" => Ok(MasterDataKind::Skill),
            _ => Err(anyhow::anyhow!("Invalid master data kind: {}", s)),
        }
    }
}

/// A single master data item (one option in one lookup list).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MasterDataItem {
    /// Unique identifier
    pub id: i64,
    /// Which lookup list this item belongs to
    pub kind: MasterDataKind,
    /// URL-friendly slug (unique within a kind)
    pub slug: String,
    /// Human-readable label
    pub label: String,
    /// Parent item ID (for dependent kinds)
    pub parent_id: Option<i64>,
    /// Sort order within the list
    pub sort_order: i32,
    /// Whether the item is offered as an option
    pub is_active: bool,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl MasterDataItem {
    /// Create a new item with the given parameters.
    ///
    /// The ID will be set to 0 and should be assigned by the database.
    pub fn new(
        kind: MasterDataKind,
        slug: String,
        label: String,
        parent_id: Option<i64>,
        sort_order: i32,
    ) -> Self {
        Self {
            id: 0, // Will be set by the database
            kind,
            slug,
            label,
            parent_id,
            sort_order,
            is_active: true,
            created_at: Utc::now(),
        }
    }
}

/// Input for creating a master data item
#[derive(Debug, Clone)]
pub struct CreateMasterDataInput {
    /// Human-readable label
    pub label: String,
    /// URL-friendly slug (generated from label when absent)
    pub slug: Option<String>,
    /// Parent item ID (required for dependent kinds)
    pub parent_id: Option<i64>,
    /// Sort order within the list
    pub sort_order: Option<i32>,
}

/// Input for updating a master data item
#[derive(Debug, Clone, Default)]
pub struct UpdateMasterDataInput {
    /// New label (optional)
    pub label: Option<String>,
    /// New slug (optional)
    pub slug: Option<String>,
    /// New sort order (optional)
    pub sort_order: Option<i32>,
    /// New active flag (optional)
    pub is_active: Option<bool>,
}

impl UpdateMasterDataInput {
    /// Check if any field is set
    pub fn has_changes(&self) -> bool {
        self.label.is_some()
            || self.slug.is_some()
            || self.sort_order.is_some()
            || self.is_active.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_roundtrip() {
        for kind in ALL_KINDS {
            let parsed: MasterDataKind = kind.as_str().parse().unwrap();
            assert_eq!(parsed, *kind);
        }
    }

    #[test]
    fn test_kind_invalid() {
        assert!("salary-band".parse::<MasterDataKind>().is_err());
        assert!("".parse::<MasterDataKind>().is_err());
    }

    #[test]
    fn test_parent_kind_topology() {
        assert_eq!(
            MasterDataKind::SubIndustry.parent_kind(),
            Some(MasterDataKind::Industry)
        );
        assert_eq!(
            MasterDataKind::SubDepartment.parent_kind(),
            Some(MasterDataKind::Department)
        );
        assert_eq!(
            MasterDataKind::Course.parent_kind(),
            Some(MasterDataKind::EducationLevel)
        );
        assert_eq!(
            MasterDataKind::Specialization.parent_kind(),
            Some(MasterDataKind::Course)
        );
        assert!(MasterDataKind::Industry.is_root());
        assert!(MasterDataKind::JobTitle.is_root());
        assert!(MasterDataKind::Skill.is_root());
    }

    #[test]
    fn test_child_kind_mirrors_parent_kind() {
        for kind in ALL_KINDS {
            if let Some(child) = kind.child_kind() {
                assert_eq!(child.parent_kind(), Some(*kind));
            }
        }
    }

    #[test]
    fn test_item_new_defaults() {
        let item = MasterDataItem::new(
            MasterDataKind::Industry,
            "information-technology".to_string(),
            "Information Technology".to_string(),
            None,
            0,
        );

        assert_eq!(item.id, 0);
        assert!(item.is_active);
        assert!(item.parent_id.is_none());
    }

    #[test]
    fn test_update_input_has_changes() {
        let empty = UpdateMasterDataInput::default();
        assert!(!empty.has_changes());

        let update = UpdateMasterDataInput {
            label: Some("Renamed".to_string()),
            ..Default::default()
        };
        assert!(update.has_changes());
    }
}
