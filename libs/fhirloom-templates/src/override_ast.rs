//! The override-folder counterpart of [`crate::ast`]: every property is
//! wrapped so the loader can tell "absent" (keep the base value) apart from
//! "present and null" (clear it) apart from "present with a value" (replace
//! it) — the same three-way distinction the retrieved pack's schema override
//! format makes for extension fields.

use indexmap::IndexMap;
use serde::Deserialize;

use crate::ast::{ExpressionType, FieldExpression, FieldType};

/// - `None` — property was absent from the override document (keep base).
/// - `Some(Nullable::Null)` — property was explicitly `null` (clear it).
/// - `Some(Nullable::Value(v))` — property has a value (replace with `v`).
#[derive(Debug, Clone)]
pub enum Nullable<T> {
    Value(T),
    Null,
}

/// A plain `#[derive(Deserialize)]` on `Option<Nullable<T>>` would never
/// distinguish absent from null: serde's blanket `Option<U>` impl treats a
/// literal `null` the same as a missing field and short-circuits to `None`
/// before `Nullable::deserialize` ever runs. Deserializing through this
/// visitor instead (via `deserialize_with` below) keeps that distinction;
/// `#[serde(default)]` still covers the genuinely-absent case.
mod option_nullable {
    use super::Nullable;
    use serde::de::{self, Deserialize, Deserializer};

    pub fn deserialize<'de, D, T>(deserializer: D) -> Result<Option<Nullable<T>>, D::Error>
    where
        D: Deserializer<'de>,
        T: Deserialize<'de>,
    {
        struct NullableVisitor<T>(std::marker::PhantomData<T>);

        impl<'de, T> de::Visitor<'de> for NullableVisitor<T>
        where
            T: Deserialize<'de>,
        {
            type Value = Option<Nullable<T>>;

            fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
                formatter.write_str("a value or null")
            }

            fn visit_unit<E>(self) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(Some(Nullable::Null))
            }

            fn visit_none<E>(self) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(Some(Nullable::Null))
            }

            fn visit_some<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
            where
                D: Deserializer<'de>,
            {
                T::deserialize(deserializer).map(|v| Some(Nullable::Value(v)))
            }
        }

        deserializer.deserialize_option(NullableVisitor(std::marker::PhantomData))
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageTemplateOverride {
    #[serde(default, deserialize_with = "option_nullable::deserialize")]
    pub name: Option<Nullable<String>>,
    #[serde(default)]
    pub resources: Vec<ResourceEntryOverride>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceEntryOverride {
    /// Not itself `Nullable` — this is the match key, not an overridable property.
    pub resource_name: String,
    #[serde(default, deserialize_with = "option_nullable::deserialize")]
    pub segment: Option<Nullable<String>>,
    #[serde(default, deserialize_with = "option_nullable::deserialize")]
    pub resource_path: Option<Nullable<String>>,
    #[serde(default, deserialize_with = "option_nullable::deserialize")]
    pub repeats: Option<Nullable<bool>>,
    #[serde(default, deserialize_with = "option_nullable::deserialize")]
    pub is_referenced: Option<Nullable<bool>>,
    #[serde(default, deserialize_with = "option_nullable::deserialize")]
    pub additional_segments: Option<Nullable<Vec<String>>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceTemplateOverride {
    #[serde(default, deserialize_with = "option_nullable::deserialize")]
    pub resource_type: Option<Nullable<String>>,
    #[serde(default)]
    pub fields: IndexMap<String, FieldExpressionOverride>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldExpressionOverride {
    #[serde(rename = "type", default, deserialize_with = "option_nullable::deserialize")]
    pub field_type: Option<Nullable<FieldType>>,
    #[serde(default, deserialize_with = "option_nullable::deserialize")]
    pub generate_list: Option<Nullable<bool>>,
    #[serde(default, deserialize_with = "option_nullable::deserialize")]
    pub value_of: Option<Nullable<String>>,
    #[serde(default, deserialize_with = "option_nullable::deserialize")]
    pub expression_type: Option<Nullable<ExpressionType>>,
    #[serde(default, deserialize_with = "option_nullable::deserialize")]
    pub specs: Option<Nullable<String>>,
    /// Full replacement, not a key-by-key merge: an override that sets `vars`
    /// replaces the whole map. To add a var while keeping the base ones, an
    /// override must list all of them.
    #[serde(default, deserialize_with = "option_nullable::deserialize")]
    pub vars: Option<Nullable<IndexMap<String, FieldExpression>>>,
    #[serde(default, deserialize_with = "option_nullable::deserialize")]
    pub value_set: Option<Nullable<String>>,
}
