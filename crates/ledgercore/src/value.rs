//! # Boundary Values
//!
//! The shapes of data crossing the native boundary: arguments going in,
//! completion values coming back, and the typed extraction that turns a
//! completion into the caller's result type.
//!
//! Every result type declares its `SHAPE` up front. The pending table checks
//! incoming completions against it before handing them to the waiter, the
//! same way a reply is checked against the expected result types.

use crate::error::Error;
use crate::error::Result;
use crate::handles::ResourceHandle;

/// An argument passed to a native function.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NativeArg {
    Str(String),
    OptStr(Option<String>),
    Handle(ResourceHandle),
    Int(i64),
    Bool(bool),
    Bytes(Vec<u8>),
}

impl NativeArg {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            Self::OptStr(s) => s.as_deref(),
            _ => None,
        }
    }

    pub fn as_handle(&self) -> Option<ResourceHandle> {
        match self {
            Self::Handle(h) => Some(*h),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl From<&str> for NativeArg {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}

impl From<String> for NativeArg {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

impl From<Option<&str>> for NativeArg {
    fn from(s: Option<&str>) -> Self {
        Self::OptStr(s.map(str::to_string))
    }
}

impl From<ResourceHandle> for NativeArg {
    fn from(h: ResourceHandle) -> Self {
        Self::Handle(h)
    }
}

impl From<i64> for NativeArg {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<u32> for NativeArg {
    fn from(i: u32) -> Self {
        Self::Int(i as i64)
    }
}

impl From<bool> for NativeArg {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<Vec<u8>> for NativeArg {
    fn from(b: Vec<u8>) -> Self {
        Self::Bytes(b)
    }
}

impl From<&[u8]> for NativeArg {
    fn from(b: &[u8]) -> Self {
        Self::Bytes(b.to_vec())
    }
}

/// A value delivered by a completion callback.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NativeValue {
    Handle(i32),
    Str(String),
    OptStr(Option<String>),
    Bool(bool),
    Int(i64),
    Bytes(Vec<u8>),
}

impl NativeValue {
    pub fn value_type(&self) -> ValueType {
        match self {
            Self::Handle(_) => ValueType::Handle,
            Self::Str(_) => ValueType::Str,
            Self::OptStr(_) => ValueType::OptStr,
            Self::Bool(_) => ValueType::Bool,
            Self::Int(_) => ValueType::Int,
            Self::Bytes(_) => ValueType::Bytes,
        }
    }
}

/// The type of one completion value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ValueType {
    Handle,
    Str,
    OptStr,
    Bool,
    Int,
    Bytes,
}

/// Checks completion values against an expected shape.
pub fn check_shape(shape: &[ValueType], values: &[NativeValue]) -> Result<()> {
    if shape.len() != values.len() {
        return Err(Error::invalid_state(format!(
            "Result count mismatch: expected {}, got {}",
            shape.len(),
            values.len()
        )));
    }

    for (i, (expected, value)) in shape.iter().zip(values).enumerate() {
        let found = value.value_type();
        // a present string satisfies an optional slot
        let compatible = *expected == found || (*expected == ValueType::OptStr && found == ValueType::Str);
        if !compatible {
            return Err(Error::invalid_state(format!(
                "Result {} type mismatch: expected {:?}, found {:?}",
                i, expected, found
            )));
        }
    }

    Ok(())
}

/// A result type that can be built from a completion's values.
pub trait FromValues: Sized + Send + 'static {
    const SHAPE: &'static [ValueType];

    /// Called only with values that already passed `check_shape(Self::SHAPE, ..)`.
    fn from_values(values: Vec<NativeValue>) -> Result<Self>;
}

fn mismatch<T>() -> Result<T> {
    Err(Error::invalid_state("Completion value does not match the expected shape"))
}

fn take_one(values: Vec<NativeValue>) -> Result<NativeValue> {
    let mut iter = values.into_iter();
    match (iter.next(), iter.next()) {
        (Some(v), None) => Ok(v),
        _ => mismatch(),
    }
}

impl FromValues for () {
    const SHAPE: &'static [ValueType] = &[];

    fn from_values(values: Vec<NativeValue>) -> Result<Self> {
        if values.is_empty() { Ok(()) } else { mismatch() }
    }
}

impl FromValues for String {
    const SHAPE: &'static [ValueType] = &[ValueType::Str];

    fn from_values(values: Vec<NativeValue>) -> Result<Self> {
        match take_one(values)? {
            NativeValue::Str(s) => Ok(s),
            _ => mismatch(),
        }
    }
}

impl FromValues for Option<String> {
    const SHAPE: &'static [ValueType] = &[ValueType::OptStr];

    fn from_values(values: Vec<NativeValue>) -> Result<Self> {
        match take_one(values)? {
            NativeValue::OptStr(s) => Ok(s),
            NativeValue::Str(s) => Ok(Some(s)),
            _ => mismatch(),
        }
    }
}

impl FromValues for bool {
    const SHAPE: &'static [ValueType] = &[ValueType::Bool];

    fn from_values(values: Vec<NativeValue>) -> Result<Self> {
        match take_one(values)? {
            NativeValue::Bool(b) => Ok(b),
            _ => mismatch(),
        }
    }
}

impl FromValues for i64 {
    const SHAPE: &'static [ValueType] = &[ValueType::Int];

    fn from_values(values: Vec<NativeValue>) -> Result<Self> {
        match take_one(values)? {
            NativeValue::Int(i) => Ok(i),
            _ => mismatch(),
        }
    }
}

impl FromValues for Vec<u8> {
    const SHAPE: &'static [ValueType] = &[ValueType::Bytes];

    fn from_values(values: Vec<NativeValue>) -> Result<Self> {
        match take_one(values)? {
            NativeValue::Bytes(b) => Ok(b),
            _ => mismatch(),
        }
    }
}

/// A raw native handle id, before it is tracked in the registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RawHandle(pub i32);

impl FromValues for RawHandle {
    const SHAPE: &'static [ValueType] = &[ValueType::Handle];

    fn from_values(values: Vec<NativeValue>) -> Result<Self> {
        match take_one(values)? {
            NativeValue::Handle(h) => Ok(RawHandle(h)),
            _ => mismatch(),
        }
    }
}

impl FromValues for (String, String) {
    const SHAPE: &'static [ValueType] = &[ValueType::Str, ValueType::Str];

    fn from_values(values: Vec<NativeValue>) -> Result<Self> {
        let mut iter = values.into_iter();
        match (iter.next(), iter.next(), iter.next()) {
            (Some(NativeValue::Str(a)), Some(NativeValue::Str(b)), None) => Ok((a, b)),
            _ => mismatch(),
        }
    }
}

impl FromValues for (String, String, String) {
    const SHAPE: &'static [ValueType] = &[ValueType::Str, ValueType::Str, ValueType::Str];

    fn from_values(values: Vec<NativeValue>) -> Result<Self> {
        let mut iter = values.into_iter();
        match (iter.next(), iter.next(), iter.next(), iter.next()) {
            (Some(NativeValue::Str(a)), Some(NativeValue::Str(b)), Some(NativeValue::Str(c)), None) => Ok((a, b, c)),
            _ => mismatch(),
        }
    }
}

impl FromValues for (String, Option<String>, Option<String>) {
    const SHAPE: &'static [ValueType] = &[ValueType::Str, ValueType::OptStr, ValueType::OptStr];

    fn from_values(values: Vec<NativeValue>) -> Result<Self> {
        let opt = |v: NativeValue| match v {
            NativeValue::OptStr(s) => Ok(s),
            NativeValue::Str(s) => Ok(Some(s)),
            _ => mismatch(),
        };

        let mut iter = values.into_iter();
        match (iter.next(), iter.next(), iter.next(), iter.next()) {
            (Some(NativeValue::Str(a)), Some(b), Some(c), None) => Ok((a, opt(b)?, opt(c)?)),
            _ => mismatch(),
        }
    }
}

impl FromValues for (i64, String) {
    const SHAPE: &'static [ValueType] = &[ValueType::Int, ValueType::Str];

    fn from_values(values: Vec<NativeValue>) -> Result<Self> {
        let mut iter = values.into_iter();
        match (iter.next(), iter.next(), iter.next()) {
            (Some(NativeValue::Int(a)), Some(NativeValue::Str(b)), None) => Ok((a, b)),
            _ => mismatch(),
        }
    }
}

impl FromValues for (RawHandle, String) {
    const SHAPE: &'static [ValueType] = &[ValueType::Handle, ValueType::Str];

    fn from_values(values: Vec<NativeValue>) -> Result<Self> {
        let mut iter = values.into_iter();
        match (iter.next(), iter.next(), iter.next()) {
            (Some(NativeValue::Handle(h)), Some(NativeValue::Str(s)), None) => Ok((RawHandle(h), s)),
            _ => mismatch(),
        }
    }
}

impl FromValues for (String, Vec<u8>) {
    const SHAPE: &'static [ValueType] = &[ValueType::Str, ValueType::Bytes];

    fn from_values(values: Vec<NativeValue>) -> Result<Self> {
        let mut iter = values.into_iter();
        match (iter.next(), iter.next(), iter.next()) {
            (Some(NativeValue::Str(s)), Some(NativeValue::Bytes(b)), None) => Ok((s, b)),
            _ => mismatch(),
        }
    }
}
