// params.rs
//
// Copyright 2021 Stéphane Cerveau <scerveau@igalia.com>
//
// This file is part of jsonrpc-peer
//
// SPDX-License-Identifier: GPL-3.0-only

//! Typed parameter slots and the by-name / by-position container.
//!
//! A [`Param`] is one slot of a method signature: a name, an optional typed
//! default, a required flag and, once bound, the raw incoming JSON. Method
//! templates are registered from these slots and cloned per invocation;
//! dispatch never mutates a template.

use std::collections::HashMap;

use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::error::PeerError;
use crate::protocol::RpcError;

/// A polymorphic parameter slot.
///
/// The typed variants (`String`, `Int`, `Float`, `Bool`) validate incoming
/// data against their underlying type when it is set; `Generic` accepts any
/// JSON value.
#[derive(Debug, Clone, PartialEq)]
pub enum Param {
    String {
        name: String,
        default: Option<String>,
        required: bool,
        data: Option<Value>,
    },
    Int {
        name: String,
        default: Option<i64>,
        required: bool,
        data: Option<Value>,
    },
    Float {
        name: String,
        default: Option<f64>,
        required: bool,
        data: Option<Value>,
    },
    Bool {
        name: String,
        default: Option<bool>,
        required: bool,
        data: Option<Value>,
    },
    Generic {
        name: String,
        default: Option<Value>,
        required: bool,
        data: Option<Value>,
    },
}

impl Param {
    pub fn string(name: &str, default: Option<String>, required: bool) -> Self {
        Param::String {
            name: name.to_string(),
            default,
            required,
            data: None,
        }
    }

    pub fn int(name: &str, default: Option<i64>, required: bool) -> Self {
        Param::Int {
            name: name.to_string(),
            default,
            required,
            data: None,
        }
    }

    pub fn float(name: &str, default: Option<f64>, required: bool) -> Self {
        Param::Float {
            name: name.to_string(),
            default,
            required,
            data: None,
        }
    }

    pub fn bool(name: &str, default: Option<bool>, required: bool) -> Self {
        Param::Bool {
            name: name.to_string(),
            default,
            required,
            data: None,
        }
    }

    pub fn generic(name: &str, default: Option<Value>, required: bool) -> Self {
        Param::Generic {
            name: name.to_string(),
            default,
            required,
            data: None,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Param::String { name, .. }
            | Param::Int { name, .. }
            | Param::Float { name, .. }
            | Param::Bool { name, .. }
            | Param::Generic { name, .. } => name,
        }
    }

    pub fn set_name(&mut self, new_name: impl Into<String>) {
        match self {
            Param::String { name, .. }
            | Param::Int { name, .. }
            | Param::Float { name, .. }
            | Param::Bool { name, .. }
            | Param::Generic { name, .. } => *name = new_name.into(),
        }
    }

    pub fn is_required(&self) -> bool {
        match self {
            Param::String { required, .. }
            | Param::Int { required, .. }
            | Param::Float { required, .. }
            | Param::Bool { required, .. }
            | Param::Generic { required, .. } => *required,
        }
    }

    /// Set the incoming raw JSON for this slot.
    ///
    /// Typed variants reject values that do not parse into their underlying
    /// type.
    pub fn set_data(&mut self, value: Value) -> Result<(), RpcError> {
        match self {
            Param::String { data, .. } => {
                if value.as_str().is_none() {
                    return Err(RpcError::invalid_params());
                }
                *data = Some(value);
            }
            Param::Int { data, .. } => {
                if value.as_i64().is_none() {
                    return Err(RpcError::invalid_params());
                }
                *data = Some(value);
            }
            Param::Float { data, .. } => {
                if value.as_f64().is_none() {
                    return Err(RpcError::invalid_params());
                }
                *data = Some(value);
            }
            Param::Bool { data, .. } => {
                if value.as_bool().is_none() {
                    return Err(RpcError::invalid_params());
                }
                *data = Some(value);
            }
            Param::Generic { data, .. } => {
                *data = Some(value);
            }
        }
        Ok(())
    }

    /// The raw incoming JSON, if any has been set.
    pub fn data(&self) -> Option<&Value> {
        match self {
            Param::String { data, .. }
            | Param::Int { data, .. }
            | Param::Float { data, .. }
            | Param::Bool { data, .. }
            | Param::Generic { data, .. } => data.as_ref(),
        }
    }

    /// The incoming raw JSON, falling back to the serialized default.
    pub fn get_data(&self) -> Option<Value> {
        if let Some(data) = self.data() {
            return Some(data.clone());
        }
        match self {
            Param::String { default, .. } => default.clone().map(Value::from),
            Param::Int { default, .. } => default.map(Value::from),
            Param::Float { default, .. } => default.map(Value::from),
            Param::Bool { default, .. } => default.map(Value::from),
            Param::Generic { default, .. } => default.clone(),
        }
    }

    /// Fresh slot with the same name/default/required flag and the supplied
    /// data applied. A required slot with neither data nor default fails.
    pub fn clone_with(&self, data: Option<Value>) -> Result<Param, RpcError> {
        let mut clone = self.clone();
        clone.clear_data();
        match data {
            Some(value) => clone.set_data(value)?,
            None => {
                if self.is_required() && !self.has_default() {
                    return Err(RpcError::invalid_params());
                }
            }
        }
        Ok(clone)
    }

    pub fn as_string(&self) -> Result<String, RpcError> {
        match self {
            Param::String { default, data, .. } => data
                .as_ref()
                .and_then(Value::as_str)
                .map(str::to_string)
                .or_else(|| default.clone())
                .ok_or_else(RpcError::invalid_params),
            _ => Err(RpcError::invalid_params()),
        }
    }

    pub fn as_int(&self) -> Result<i64, RpcError> {
        match self {
            Param::Int { default, data, .. } => data
                .as_ref()
                .and_then(Value::as_i64)
                .or(*default)
                .ok_or_else(RpcError::invalid_params),
            _ => Err(RpcError::invalid_params()),
        }
    }

    pub fn as_float(&self) -> Result<f64, RpcError> {
        match self {
            Param::Float { default, data, .. } => data
                .as_ref()
                .and_then(Value::as_f64)
                .or(*default)
                .ok_or_else(RpcError::invalid_params),
            _ => Err(RpcError::invalid_params()),
        }
    }

    pub fn as_bool(&self) -> Result<bool, RpcError> {
        match self {
            Param::Bool { default, data, .. } => data
                .as_ref()
                .and_then(Value::as_bool)
                .or(*default)
                .ok_or_else(RpcError::invalid_params),
            _ => Err(RpcError::invalid_params()),
        }
    }

    fn has_default(&self) -> bool {
        match self {
            Param::String { default, .. } => default.is_some(),
            Param::Int { default, .. } => default.is_some(),
            Param::Float { default, .. } => default.is_some(),
            Param::Bool { default, .. } => default.is_some(),
            Param::Generic { default, .. } => default.is_some(),
        }
    }

    fn clear_data(&mut self) {
        match self {
            Param::String { data, .. }
            | Param::Int { data, .. }
            | Param::Float { data, .. }
            | Param::Bool { data, .. }
            | Param::Generic { data, .. } => *data = None,
        }
    }
}

/// Parameter collection, ordered by position or keyed by name.
///
/// Positional slots are keyed by their decimal index. The tag is stable
/// through a wire round trip: a JSON array decodes as `ByPosition`, an
/// object as `ByName`.
#[derive(Debug, Clone, PartialEq)]
pub enum Parameters {
    ByName(HashMap<String, Param>),
    ByPosition(HashMap<String, Param>),
}

impl Parameters {
    pub fn by_name(params: Vec<Param>) -> Self {
        let values = params
            .into_iter()
            .map(|param| (param.name().to_string(), param))
            .collect();
        Parameters::ByName(values)
    }

    /// Each slot takes its positional name `"0"`, `"1"`, … before storage.
    pub fn by_position(params: Vec<Param>) -> Self {
        let values = params
            .into_iter()
            .enumerate()
            .map(|(index, mut param)| {
                param.set_name(index.to_string());
                (index.to_string(), param)
            })
            .collect();
        Parameters::ByPosition(values)
    }

    pub fn len(&self) -> usize {
        self.values().len()
    }

    pub fn is_empty(&self) -> bool {
        self.values().is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&Param> {
        self.values().get(key)
    }

    /// Insert a slot under `key`. Positional containers reject keys that do
    /// not parse as a non-negative integer.
    pub fn set(&mut self, key: impl Into<String>, param: Param) -> crate::Result<()> {
        let key = key.into();
        match self {
            Parameters::ByName(values) => {
                values.insert(key, param);
            }
            Parameters::ByPosition(values) => {
                if key.parse::<usize>().is_err() {
                    return Err(PeerError::InvalidParameterKey(key));
                }
                values.insert(key, param);
            }
        }
        Ok(())
    }

    fn values(&self) -> &HashMap<String, Param> {
        match self {
            Parameters::ByName(values) | Parameters::ByPosition(values) => values,
        }
    }
}

impl Serialize for Parameters {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Parameters::ByName(values) => {
                let map: serde_json::Map<String, Value> = values
                    .iter()
                    .map(|(name, param)| (name.clone(), param.get_data().unwrap_or(Value::Null)))
                    .collect();
                map.serialize(serializer)
            }
            Parameters::ByPosition(values) => {
                // Contiguous array of length max_index + 1, unfilled slots null
                let mut largest = None;
                for key in values.keys() {
                    if let Ok(index) = key.parse::<usize>() {
                        largest = Some(largest.map_or(index, |l: usize| l.max(index)));
                    }
                }
                let mut slots = match largest {
                    Some(largest) => vec![Value::Null; largest + 1],
                    None => Vec::new(),
                };
                for (key, param) in values {
                    if let Ok(index) = key.parse::<usize>() {
                        slots[index] = param.get_data().unwrap_or(Value::Null);
                    }
                }
                slots.serialize(serializer)
            }
        }
    }
}

impl<'de> Deserialize<'de> for Parameters {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        // Incoming slots are synthesized as Generic params carrying the raw
        // slot value; templates re-type them during binding.
        match Value::deserialize(deserializer)? {
            Value::Array(items) => {
                let values = items
                    .into_iter()
                    .enumerate()
                    .map(|(index, item)| {
                        let name = index.to_string();
                        let param = Param::Generic {
                            name: name.clone(),
                            default: Some(item.clone()),
                            required: false,
                            data: Some(item),
                        };
                        (name, param)
                    })
                    .collect();
                Ok(Parameters::ByPosition(values))
            }
            Value::Object(fields) => {
                let values = fields
                    .into_iter()
                    .map(|(name, item)| {
                        let param = Param::Generic {
                            name: name.clone(),
                            default: Some(item.clone()),
                            required: false,
                            data: Some(item),
                        };
                        (name, param)
                    })
                    .collect();
                Ok(Parameters::ByName(values))
            }
            _ => Err(D::Error::custom("unable to parse parameters")),
        }
    }
}
