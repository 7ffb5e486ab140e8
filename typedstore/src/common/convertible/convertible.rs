use crate::common::Value;
use crate::document::Document;
use crate::errors::{ErrorKind, TypedStoreError, TypedStoreResult};
use std::any::{Any, TypeId};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::hash::Hash;
use std::str::FromStr;

/// Two-way conversion between a Rust type and a document [Value].
///
/// Entities are materialized through `from_value` and persisted through `to_value`. The
/// `Output` type is normally `Self`; it exists so that wrappers like `Option<T>` and
/// `Box<T>` can delegate to their inner type.
///
/// Implementations are provided for primitives, strings, options, boxes, vectors, maps,
/// sets, tuples, [Document] and [Value]. Structs and enums get one through
/// `#[derive(Convertible)]`.
pub trait Convertible {
    type Output;

    fn to_value(&self) -> TypedStoreResult<Value>;
    fn from_value(value: &Value) -> TypedStoreResult<Self::Output>;
}

fn mapping_error(value: &Value, expected: &str) -> TypedStoreError {
    log::error!("Value {} of type {} is not {}", value, value.type_name(), expected);
    TypedStoreError::new(
        &format!("Value of type {} is not {}", value.type_name(), expected),
        ErrorKind::ObjectMappingError,
    )
}

// Store clients commonly widen numbers on the wire, so any integer variant is accepted
// as long as it fits the target width.
macro_rules! impl_convertible_for_integers {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl Convertible for $ty {
                type Output = $ty;

                fn to_value(&self) -> TypedStoreResult<Value> {
                    Ok(Value::$variant(*self))
                }

                fn from_value(value: &Value) -> TypedStoreResult<Self> {
                    match value.as_integer() {
                        Some(i) => <$ty>::try_from(i)
                            .map_err(|_| mapping_error(value, concat!("in range of ", stringify!($ty)))),
                        None => Err(mapping_error(value, concat!("an ", stringify!($ty)))),
                    }
                }
            }
        )*
    };
}

impl_convertible_for_integers! {
    i8 => I8,
    u8 => U8,
    i16 => I16,
    u16 => U16,
    i32 => I32,
    u32 => U32,
    i64 => I64,
    u64 => U64,
}

impl Convertible for f32 {
    type Output = f32;

    fn to_value(&self) -> TypedStoreResult<Value> {
        Ok(Value::F32(*self))
    }

    fn from_value(value: &Value) -> TypedStoreResult<Self> {
        match value.as_number() {
            Some(f) => Ok(f as f32),
            None => Err(mapping_error(value, "an f32")),
        }
    }
}

impl Convertible for f64 {
    type Output = f64;

    fn to_value(&self) -> TypedStoreResult<Value> {
        Ok(Value::F64(*self))
    }

    fn from_value(value: &Value) -> TypedStoreResult<Self> {
        match value.as_number() {
            Some(f) => Ok(f),
            None => Err(mapping_error(value, "an f64")),
        }
    }
}

impl Convertible for char {
    type Output = char;

    fn to_value(&self) -> TypedStoreResult<Value> {
        Ok(Value::Char(*self))
    }

    fn from_value(value: &Value) -> TypedStoreResult<Self> {
        match value {
            Value::Char(c) => Ok(*c),
            Value::String(s) if s.chars().count() == 1 => {
                s.chars().next().ok_or_else(|| mapping_error(value, "a char"))
            }
            _ => Err(mapping_error(value, "a char")),
        }
    }
}

impl Convertible for String {
    type Output = String;

    fn to_value(&self) -> TypedStoreResult<Value> {
        Ok(Value::String(self.clone()))
    }

    fn from_value(value: &Value) -> TypedStoreResult<Self> {
        match value {
            Value::String(s) => Ok(s.clone()),
            _ => Err(mapping_error(value, "a string")),
        }
    }
}

impl Convertible for bool {
    type Output = bool;

    fn to_value(&self) -> TypedStoreResult<Value> {
        Ok(Value::Bool(*self))
    }

    fn from_value(value: &Value) -> TypedStoreResult<Self> {
        match value {
            Value::Bool(b) => Ok(*b),
            _ => Err(mapping_error(value, "a bool")),
        }
    }
}

impl Convertible for () {
    type Output = ();

    fn to_value(&self) -> TypedStoreResult<Value> {
        Ok(Value::Null)
    }

    fn from_value(value: &Value) -> TypedStoreResult<Self> {
        match value {
            Value::Null => Ok(()),
            _ => Err(mapping_error(value, "null")),
        }
    }
}

impl Convertible for Document {
    type Output = Document;

    fn to_value(&self) -> TypedStoreResult<Value> {
        Ok(Value::Document(self.clone()))
    }

    fn from_value(value: &Value) -> TypedStoreResult<Self> {
        match value {
            Value::Document(doc) => Ok(doc.clone()),
            _ => Err(mapping_error(value, "a document")),
        }
    }
}

impl Convertible for Value {
    type Output = Value;

    fn to_value(&self) -> TypedStoreResult<Value> {
        Ok(self.clone())
    }

    fn from_value(value: &Value) -> TypedStoreResult<Self> {
        Ok(value.clone())
    }
}

impl<T> Convertible for Option<T>
where
    T: Convertible,
{
    type Output = Option<T::Output>;

    fn to_value(&self) -> TypedStoreResult<Value> {
        match self {
            Some(v) => v.to_value(),
            None => Ok(Value::Null),
        }
    }

    fn from_value(value: &Value) -> TypedStoreResult<Self::Output> {
        match value {
            Value::Null => Ok(None),
            _ => Ok(Some(T::from_value(value)?)),
        }
    }
}

impl<T> Convertible for Box<T>
where
    T: Convertible,
{
    type Output = Box<T::Output>;

    fn to_value(&self) -> TypedStoreResult<Value> {
        self.as_ref().to_value()
    }

    fn from_value(value: &Value) -> TypedStoreResult<Self::Output> {
        Ok(Box::new(T::from_value(value)?))
    }
}

impl<T> Convertible for Vec<T>
where
    T: Convertible + Any,
{
    type Output = Vec<T::Output>;

    fn to_value(&self) -> TypedStoreResult<Value> {
        // Vec<u8> is stored as an opaque byte payload
        if TypeId::of::<T>() == TypeId::of::<u8>() {
            let mut bytes = Vec::with_capacity(self.len());
            for item in self {
                match item.to_value()? {
                    Value::U8(b) => bytes.push(b),
                    other => return Err(mapping_error(&other, "a u8")),
                }
            }
            return Ok(Value::Bytes(bytes));
        }

        let mut arr = Vec::with_capacity(self.len());
        for item in self {
            arr.push(item.to_value()?);
        }
        Ok(Value::Array(arr))
    }

    fn from_value(value: &Value) -> TypedStoreResult<Self::Output> {
        match value {
            Value::Bytes(bytes) => bytes
                .iter()
                .map(|b| T::from_value(&Value::U8(*b)))
                .collect(),
            Value::Array(arr) => arr.iter().map(T::from_value).collect(),
            _ => Err(mapping_error(value, "an array")),
        }
    }
}

impl<K, V> Convertible for BTreeMap<K, V>
where
    K: ToString + FromStr + Ord,
    V: Convertible,
{
    type Output = BTreeMap<K, V::Output>;

    fn to_value(&self) -> TypedStoreResult<Value> {
        let mut doc = Document::new();
        for (k, v) in self {
            doc.put(k.to_string(), v.to_value()?)?;
        }
        Ok(Value::Document(doc))
    }

    fn from_value(value: &Value) -> TypedStoreResult<Self::Output> {
        match value {
            Value::Document(doc) => {
                let mut result = BTreeMap::new();
                for (k, v) in doc.iter() {
                    let key = K::from_str(&k).map_err(|_| key_error(&k))?;
                    result.insert(key, V::from_value(&v)?);
                }
                Ok(result)
            }
            _ => Err(mapping_error(value, "a document")),
        }
    }
}

impl<K, V> Convertible for HashMap<K, V>
where
    K: ToString + FromStr + Eq + Hash,
    V: Convertible,
{
    type Output = HashMap<K, V::Output>;

    fn to_value(&self) -> TypedStoreResult<Value> {
        let mut doc = Document::new();
        for (k, v) in self {
            doc.put(k.to_string(), v.to_value()?)?;
        }
        Ok(Value::Document(doc))
    }

    fn from_value(value: &Value) -> TypedStoreResult<Self::Output> {
        match value {
            Value::Document(doc) => {
                let mut result = HashMap::with_capacity(doc.size());
                for (k, v) in doc.iter() {
                    let key = K::from_str(&k).map_err(|_| key_error(&k))?;
                    result.insert(key, V::from_value(&v)?);
                }
                Ok(result)
            }
            _ => Err(mapping_error(value, "a document")),
        }
    }
}

impl<V> Convertible for HashSet<V>
where
    V: Convertible,
    V::Output: Eq + Hash,
{
    type Output = HashSet<V::Output>;

    fn to_value(&self) -> TypedStoreResult<Value> {
        let mut arr = Vec::with_capacity(self.len());
        for item in self {
            arr.push(item.to_value()?);
        }
        Ok(Value::Array(arr))
    }

    fn from_value(value: &Value) -> TypedStoreResult<Self::Output> {
        match value {
            Value::Array(arr) => arr.iter().map(V::from_value).collect(),
            _ => Err(mapping_error(value, "an array")),
        }
    }
}

fn key_error(key: &str) -> TypedStoreError {
    log::error!("Failed to convert map key {}", key);
    TypedStoreError::new(
        &format!("Failed to convert map key {}", key),
        ErrorKind::ObjectMappingError,
    )
}

macro_rules! impl_convertible_for_tuples {
    ($(($($T:ident),+)),+) => {
        $(
            #[allow(non_snake_case)]
            impl<$($T),+> Convertible for ($($T),+) where $($T: Convertible),+ {
                type Output = ($($T::Output),+);

                fn to_value(&self) -> TypedStoreResult<Value> {
                    let ($($T),+) = self;
                    Ok(Value::Array(vec![$($T.to_value()?),+]))
                }

                fn from_value(value: &Value) -> TypedStoreResult<Self::Output> {
                    match value {
                        Value::Array(arr) if arr.len() == count_idents!($($T),+) => {
                            let mut iter = arr.iter();
                            Ok(($($T::from_value(iter.next().ok_or_else(|| TypedStoreError::new(
                                "Tuple element missing",
                                ErrorKind::ObjectMappingError,
                            ))?)?),+))
                        }
                        _ => Err(mapping_error(value, "a tuple")),
                    }
                }
            }
        )+
    };
}

macro_rules! count_idents {
    ($($idents:ident),*) => {
        <[()]>::len(&[$(count_idents!(@sub $idents)),*])
    };
    (@sub $idents:ident) => { () };
}

impl_convertible_for_tuples! {
    (T1, T2),
    (T1, T2, T3),
    (T1, T2, T3, T4),
    (T1, T2, T3, T4, T5),
    (T1, T2, T3, T4, T5, T6)
}

/// Converts a [Value] into `T`. Used by the derived `Convertible` implementations.
pub fn from_value<T>(value: &Value) -> TypedStoreResult<T::Output>
where
    T: Convertible,
{
    T::from_value(value)
}

pub fn to_value<T>(data: &T) -> TypedStoreResult<Value>
where
    T: Convertible,
{
    data.to_value()
}
