//! Per-resource services.
//!
//! Each service borrows the `Client` and exposes one method per endpoint.
//! Option structs for writes serialize straight into the request body;
//! option structs for lists serialize into query pairs.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

use crate::payload::{IdList, Validate, Violations};

pub mod channels;
pub mod deals;
pub mod lead_labels;
pub mod leads;
pub mod notes;
pub mod organizations;
pub mod roles;
pub mod stages;
pub mod users;

pub type ChannelId = String;
pub type DealId = i64;
pub type LeadId = Uuid;
pub type LeadLabelId = Uuid;
pub type NoteId = i64;
pub type OrganizationId = i64;
pub type PersonId = i64;
pub type PipelineId = i64;
pub type RoleId = i64;
pub type StageId = i64;
pub type UserId = i64;

/// A reference to another record.
///
/// Older endpoints inline related records as objects
/// (`{"value": 7, "name": "Acme"}`), newer ones send the bare id. Both
/// decode to the same value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Related {
    pub id: i64,
    pub name: Option<String>,
}

impl<'de> Deserialize<'de> for Related {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        struct Inline {
            #[serde(default)]
            value: Option<i64>,
            #[serde(default)]
            id: Option<i64>,
            #[serde(default)]
            name: Option<String>,
        }

        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Id(i64),
            Inline(Inline),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Id(id) => Ok(Related { id, name: None }),
            Raw::Inline(inline) => match inline.value.or(inline.id) {
                Some(id) => Ok(Related {
                    id,
                    name: inline.name,
                }),
                None => Err(serde::de::Error::missing_field("value")),
            },
        }
    }
}

impl Serialize for Related {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(self.id)
    }
}

/// Percent-encode a caller-supplied id for use as one path segment.
pub(crate) fn segment(raw: &str) -> String {
    urlencoding::encode(raw).into_owned()
}

/// `data` of a single-record delete.
#[derive(Debug, Deserialize)]
pub(crate) struct Deleted<I> {
    pub id: I,
}

/// Query for bulk-delete endpoints: `?ids=1,2,3`.
#[derive(Debug, Clone)]
pub(crate) struct BulkDelete<I> {
    ids: IdList<I>,
}

impl<I> BulkDelete<I> {
    pub(crate) fn new(ids: impl IntoIterator<Item = I>) -> Self {
        Self {
            ids: IdList::new(ids),
        }
    }
}

impl<I: fmt::Display> Serialize for BulkDelete<I> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;
        let mut state = serializer.serialize_struct("BulkDelete", 1)?;
        state.serialize_field("ids", &self.ids.to_string())?;
        state.end()
    }
}

impl<I> Validate for BulkDelete<I> {
    const OPERATION: &'static str = "bulk delete";

    fn violations(&self) -> Vec<String> {
        Violations::new()
            .check(self.ids.is_empty(), "ids must not be empty")
            .into_vec()
    }
}
