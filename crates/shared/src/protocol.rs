use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{Estado, RepairFields, RepairId, RepairRecord};

pub const REPAIRS_TABLE: &str = "reparaciones";

/// Path of the repairs table under a PostgREST-style root.
pub fn repairs_route() -> String {
    format!("/rest/v1/{REPAIRS_TABLE}")
}

/// A `reparaciones` row as it arrives over the wire. Optional text columns may be null or absent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepairRow {
    pub id: RepairId,
    pub modelo: String,
    #[serde(alias = "dueño")]
    pub duenio: String,
    pub sintoma: String,
    #[serde(default)]
    pub observacion: Option<String>,
    #[serde(default)]
    pub tratamiento: Option<String>,
    pub estado: Estado,
    pub created_at: DateTime<Utc>,
}

impl From<RepairRow> for RepairRecord {
    fn from(row: RepairRow) -> Self {
        Self {
            id: row.id,
            modelo: row.modelo,
            duenio: row.duenio,
            sintoma: row.sintoma,
            observacion: row.observacion.unwrap_or_default(),
            tratamiento: row.tratamiento.unwrap_or_default(),
            estado: row.estado,
            created_at: row.created_at,
        }
    }
}

/// Partial row for `update ... where id = X`. Unset columns are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepairPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modelo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "dueño")]
    pub duenio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sintoma: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observacion: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tratamiento: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estado: Option<Estado>,
}

impl RepairPatch {
    pub fn estado(estado: Estado) -> Self {
        Self {
            estado: Some(estado),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Required columns this patch would set to a blank value.
    pub fn blanked_required(&self) -> Vec<&'static str> {
        [
            ("modelo", &self.modelo),
            ("duenio", &self.duenio),
            ("sintoma", &self.sintoma),
        ]
        .into_iter()
        .filter(|(_, value)| value.as_deref().is_some_and(|v| v.trim().is_empty()))
        .map(|(name, _)| name)
        .collect()
    }

    pub fn apply_to(&self, record: &mut RepairRecord) {
        if let Some(v) = &self.modelo {
            record.modelo = v.clone();
        }
        if let Some(v) = &self.duenio {
            record.duenio = v.clone();
        }
        if let Some(v) = &self.sintoma {
            record.sintoma = v.clone();
        }
        if let Some(v) = &self.observacion {
            record.observacion = v.clone();
        }
        if let Some(v) = &self.tratamiento {
            record.tratamiento = v.clone();
        }
        if let Some(v) = self.estado {
            record.estado = v;
        }
    }
}

impl From<RepairFields> for RepairPatch {
    fn from(fields: RepairFields) -> Self {
        Self {
            modelo: Some(fields.modelo),
            duenio: Some(fields.duenio),
            sintoma: Some(fields.sintoma),
            observacion: Some(fields.observacion),
            tratamiento: Some(fields.tratamiento),
            estado: Some(fields.estado),
        }
    }
}

/// Body of an insert: PostgREST accepts either a single object or an array of them.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum InsertBody {
    One(RepairFields),
    Many(Vec<RepairFields>),
}

impl InsertBody {
    pub fn into_rows(self) -> Vec<RepairFields> {
        match self {
            InsertBody::One(fields) => vec![fields],
            InsertBody::Many(rows) => rows,
        }
    }
}
