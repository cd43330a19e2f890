//! Serde adapter from any `Serialize` type to a plain value.
//!
//! Works like `serde_json::to_value`, except that a NaN or infinite float
//! has no WTFL literal: it serializes to nothing, and the field, map entry or
//! element holding it is left out.

use serde::ser::{self, Error as _, Serialize};
use serde_json::{Error, Map, Number, Value};

/// `None` when the value has no literal representation.
pub(crate) fn to_plain<T: Serialize + ?Sized>(value: &T) -> Result<Option<Value>, Error> {
    value.serialize(PlainSerializer)
}

fn tagged(variant: Option<&'static str>, value: Value) -> Value {
    match variant {
        Some(name) => {
            let mut map = Map::new();
            map.insert(name.to_owned(), value);
            Value::Object(map)
        }
        None => value,
    }
}

fn key_string<T: Serialize + ?Sized>(key: &T) -> Result<String, Error> {
    match to_plain(key)? {
        Some(Value::String(s)) => Ok(s),
        Some(Value::Number(n)) => Ok(n.to_string()),
        Some(Value::Bool(b)) => Ok(b.to_string()),
        _ => Err(Error::custom("key must be a string")),
    }
}

struct PlainSerializer;

impl ser::Serializer for PlainSerializer {
    type Ok = Option<Value>;
    type Error = Error;
    type SerializeSeq = SeqSerializer;
    type SerializeTuple = SeqSerializer;
    type SerializeTupleStruct = SeqSerializer;
    type SerializeTupleVariant = SeqSerializer;
    type SerializeMap = MapSerializer;
    type SerializeStruct = MapSerializer;
    type SerializeStructVariant = MapSerializer;

    // -- Scalars ------------------------------------------------

    fn serialize_bool(self, v: bool) -> Result<Self::Ok, Error> {
        Ok(Some(Value::Bool(v)))
    }

    fn serialize_i8(self, v: i8) -> Result<Self::Ok, Error> {
        Ok(Some(Value::from(v)))
    }

    fn serialize_i16(self, v: i16) -> Result<Self::Ok, Error> {
        Ok(Some(Value::from(v)))
    }

    fn serialize_i32(self, v: i32) -> Result<Self::Ok, Error> {
        Ok(Some(Value::from(v)))
    }

    fn serialize_i64(self, v: i64) -> Result<Self::Ok, Error> {
        Ok(Some(Value::from(v)))
    }

    fn serialize_i128(self, v: i128) -> Result<Self::Ok, Error> {
        serde_json::to_value(v).map(Some)
    }

    fn serialize_u8(self, v: u8) -> Result<Self::Ok, Error> {
        Ok(Some(Value::from(v)))
    }

    fn serialize_u16(self, v: u16) -> Result<Self::Ok, Error> {
        Ok(Some(Value::from(v)))
    }

    fn serialize_u32(self, v: u32) -> Result<Self::Ok, Error> {
        Ok(Some(Value::from(v)))
    }

    fn serialize_u64(self, v: u64) -> Result<Self::Ok, Error> {
        Ok(Some(Value::from(v)))
    }

    fn serialize_u128(self, v: u128) -> Result<Self::Ok, Error> {
        serde_json::to_value(v).map(Some)
    }

    fn serialize_f32(self, v: f32) -> Result<Self::Ok, Error> {
        Ok(Number::from_f64(f64::from(v)).map(Value::Number))
    }

    fn serialize_f64(self, v: f64) -> Result<Self::Ok, Error> {
        Ok(Number::from_f64(v).map(Value::Number))
    }

    fn serialize_char(self, v: char) -> Result<Self::Ok, Error> {
        Ok(Some(Value::String(v.to_string())))
    }

    fn serialize_str(self, v: &str) -> Result<Self::Ok, Error> {
        Ok(Some(Value::String(v.to_owned())))
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<Self::Ok, Error> {
        Ok(Some(Value::Array(v.iter().map(|&b| Value::from(b)).collect())))
    }

    fn serialize_none(self) -> Result<Self::Ok, Error> {
        Ok(Some(Value::Null))
    }

    fn serialize_some<T: Serialize + ?Sized>(self, value: &T) -> Result<Self::Ok, Error> {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<Self::Ok, Error> {
        Ok(Some(Value::Null))
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<Self::Ok, Error> {
        Ok(Some(Value::Null))
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _index: u32,
        variant: &'static str,
    ) -> Result<Self::Ok, Error> {
        Ok(Some(Value::String(variant.to_owned())))
    }

    fn serialize_newtype_struct<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        value: &T,
    ) -> Result<Self::Ok, Error> {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        _index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<Self::Ok, Error> {
        Ok(to_plain(value)?.map(|inner| tagged(Some(variant), inner)))
    }

    // -- Containers ---------------------------------------------

    fn serialize_seq(self, len: Option<usize>) -> Result<SeqSerializer, Error> {
        Ok(SeqSerializer::new(None, len.unwrap_or(0)))
    }

    fn serialize_tuple(self, len: usize) -> Result<SeqSerializer, Error> {
        Ok(SeqSerializer::new(None, len))
    }

    fn serialize_tuple_struct(self, _name: &'static str, len: usize) -> Result<SeqSerializer, Error> {
        Ok(SeqSerializer::new(None, len))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<SeqSerializer, Error> {
        Ok(SeqSerializer::new(Some(variant), len))
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<MapSerializer, Error> {
        Ok(MapSerializer::new(None))
    }

    fn serialize_struct(self, _name: &'static str, _len: usize) -> Result<MapSerializer, Error> {
        Ok(MapSerializer::new(None))
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _index: u32,
        variant: &'static str,
        _len: usize,
    ) -> Result<MapSerializer, Error> {
        Ok(MapSerializer::new(Some(variant)))
    }
}

struct SeqSerializer {
    variant: Option<&'static str>,
    items: Vec<Value>,
}

impl SeqSerializer {
    fn new(variant: Option<&'static str>, len: usize) -> Self {
        SeqSerializer {
            variant,
            items: Vec::with_capacity(len),
        }
    }

    fn push<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), Error> {
        if let Some(item) = to_plain(value)? {
            self.items.push(item);
        }
        Ok(())
    }

    fn finish(self) -> Result<Option<Value>, Error> {
        Ok(Some(tagged(self.variant, Value::Array(self.items))))
    }
}

impl ser::SerializeSeq for SeqSerializer {
    type Ok = Option<Value>;
    type Error = Error;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), Error> {
        self.push(value)
    }

    fn end(self) -> Result<Self::Ok, Error> {
        self.finish()
    }
}

impl ser::SerializeTuple for SeqSerializer {
    type Ok = Option<Value>;
    type Error = Error;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), Error> {
        self.push(value)
    }

    fn end(self) -> Result<Self::Ok, Error> {
        self.finish()
    }
}

impl ser::SerializeTupleStruct for SeqSerializer {
    type Ok = Option<Value>;
    type Error = Error;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), Error> {
        self.push(value)
    }

    fn end(self) -> Result<Self::Ok, Error> {
        self.finish()
    }
}

impl ser::SerializeTupleVariant for SeqSerializer {
    type Ok = Option<Value>;
    type Error = Error;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), Error> {
        self.push(value)
    }

    fn end(self) -> Result<Self::Ok, Error> {
        self.finish()
    }
}

struct MapSerializer {
    variant: Option<&'static str>,
    map: Map<String, Value>,
    next_key: Option<String>,
}

impl MapSerializer {
    fn new(variant: Option<&'static str>) -> Self {
        MapSerializer {
            variant,
            map: Map::new(),
            next_key: None,
        }
    }

    fn insert<T: Serialize + ?Sized>(&mut self, key: String, value: &T) -> Result<(), Error> {
        if let Some(value) = to_plain(value)? {
            self.map.insert(key, value);
        }
        Ok(())
    }

    fn finish(self) -> Result<Option<Value>, Error> {
        Ok(Some(tagged(self.variant, Value::Object(self.map))))
    }
}

impl ser::SerializeMap for MapSerializer {
    type Ok = Option<Value>;
    type Error = Error;

    fn serialize_key<T: Serialize + ?Sized>(&mut self, key: &T) -> Result<(), Error> {
        self.next_key = Some(key_string(key)?);
        Ok(())
    }

    fn serialize_value<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), Error> {
        let key = self
            .next_key
            .take()
            .ok_or_else(|| Error::custom("map value without a key"))?;
        self.insert(key, value)
    }

    fn end(self) -> Result<Self::Ok, Error> {
        self.finish()
    }
}

impl ser::SerializeStruct for MapSerializer {
    type Ok = Option<Value>;
    type Error = Error;

    fn serialize_field<T: Serialize + ?Sized>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<(), Error> {
        self.insert(key.to_owned(), value)
    }

    fn end(self) -> Result<Self::Ok, Error> {
        self.finish()
    }
}

impl ser::SerializeStructVariant for MapSerializer {
    type Ok = Option<Value>;
    type Error = Error;

    fn serialize_field<T: Serialize + ?Sized>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<(), Error> {
        self.insert(key.to_owned(), value)
    }

    fn end(self) -> Result<Self::Ok, Error> {
        self.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;
    use serde_json::json;
    use std::collections::BTreeMap;

    #[derive(Serialize)]
    struct Reading {
        ok: u8,
        bad: f64,
        worse: Option<f32>,
    }

    #[derive(Serialize)]
    enum Shape {
        Dot,
        Circle(f64),
        Pair(i32, f64),
        Rect { w: f64, h: f64 },
    }

    #[test]
    fn non_finite_fields_are_left_out() {
        let reading = Reading {
            ok: 1,
            bad: f64::NAN,
            worse: Some(f32::INFINITY),
        };
        assert_eq!(to_plain(&reading).unwrap(), Some(json!({ "ok": 1 })));
    }

    #[test]
    fn non_finite_elements_are_left_out() {
        let xs = vec![1.5, f64::NEG_INFINITY, 2.0];
        assert_eq!(to_plain(&xs).unwrap(), Some(json!([1.5, 2.0])));
        assert_eq!(to_plain(&f64::NAN).unwrap(), None);
    }

    #[test]
    fn enums_are_externally_tagged() {
        let shapes = vec![
            Shape::Dot,
            Shape::Circle(1.0),
            Shape::Circle(f64::NAN),
            Shape::Pair(1, f64::NAN),
            Shape::Rect { w: 2.0, h: f64::NAN },
        ];
        assert_eq!(
            to_plain(&shapes).unwrap(),
            Some(json!(["Dot", { "Circle": 1.0 }, { "Pair": [1] }, { "Rect": { "w": 2.0 } }]))
        );
    }

    #[test]
    fn numeric_and_boolean_keys_become_strings() {
        let mut map = BTreeMap::new();
        map.insert(7, None::<u8>);
        assert_eq!(to_plain(&map).unwrap(), Some(json!({ "7": null })));

        let mut map = BTreeMap::new();
        map.insert(true, "yes");
        assert_eq!(to_plain(&map).unwrap(), Some(json!({ "true": "yes" })));
    }

    #[test]
    fn agrees_with_serde_json_on_finite_values() {
        let value = (Some("a"), 'c', -3i64, u64::MAX, (), [1u8, 2]);
        assert_eq!(to_plain(&value).unwrap(), Some(serde_json::to_value(value).unwrap()));
    }
}
