use std::fmt;
use serde::ser::{Serialize, Serializer, SerializeStruct};
use serde::de::{self, Deserialize, Deserializer, MapAccess, SeqAccess, Visitor};

/// A cell coordinate. Out-of-range values are representable; range checks
/// belong to the board.
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub struct Position {
    pub x: i8,
    pub y: i8,
}

impl Position {
    pub const NONE: Position = Position { x: -1, y: -1 };

    pub const fn new(x: i8, y: i8) -> Self {
        Self { x, y }
    }

    pub fn is_none(&self) -> bool {
        *self == Self::NONE
    }

    /// Both coordinates in one word, x in the high byte.
    pub fn packed(&self) -> u16 {
        ((self.x as u8 as u16) << 8) | self.y as u8 as u16
    }

    pub fn offset(&self, dx: i8, dy: i8) -> Self {
        Self::new(self.x.wrapping_add(dx), self.y.wrapping_add(dy))
    }
}

impl fmt::Debug for Position {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.is_none() {
            f.write_str("-")
        } else {
            write!(f, "({}, {})", self.x, self.y)
        }
    }
}

/// A stone moving from one cell to another.
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub struct Move {
    pub from: Position,
    pub to: Position,
}

impl Move {
    /// Sentinel for "no move"; a cancelled search returns it.
    pub const NONE: Move = Move { from: Position::NONE, to: Position::NONE };

    pub const fn new(from: Position, to: Position) -> Self {
        Self { from, to }
    }

    pub fn is_none(&self) -> bool {
        *self == Self::NONE
    }

    pub fn invert(&self) -> Self {
        Self::new(self.to, self.from)
    }

    pub fn packed(&self) -> u32 {
        ((self.from.packed() as u32) << 16) | self.to.packed() as u32
    }
}

impl fmt::Debug for Move {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.is_none() {
            f.write_str("Move::NONE")
        } else {
            write!(f, "{:?}->{:?}", self.from, self.to)
        }
    }
}

impl Serialize for Position {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error> where S: Serializer {
        if self.is_none() {
            serializer.serialize_none()
        } else {
            [self.x, self.y].serialize(serializer)
        }
    }
}

struct PositionVisitor;
impl<'de> Visitor<'de> for PositionVisitor {
    type Value = Position;
    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("an [x, y] pair or null")
    }
    fn visit_none<E>(self) -> Result<Position, E> where E: de::Error {
        Ok(Position::NONE)
    }
    fn visit_unit<E>(self) -> Result<Position, E> where E: de::Error {
        Ok(Position::NONE)
    }
    fn visit_some<D>(self, deserializer: D) -> Result<Position, D::Error> where D: Deserializer<'de> {
        deserializer.deserialize_seq(PositionVisitor)
    }
    fn visit_seq<A>(self, mut seq: A) -> Result<Position, A::Error> where A: SeqAccess<'de> {
        let x = seq.next_element::<i8>()?.ok_or_else(|| de::Error::invalid_length(0, &self))?;
        let y = seq.next_element::<i8>()?.ok_or_else(|| de::Error::invalid_length(1, &self))?;
        if seq.next_element::<de::IgnoredAny>()?.is_some() {
            return Err(de::Error::invalid_length(3, &self));
        }
        Ok(Position::new(x, y))
    }
}

impl<'de> Deserialize<'de> for Position {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error> where D: Deserializer<'de> {
        deserializer.deserialize_option(PositionVisitor)
    }
}

impl Serialize for Move {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error> where S: Serializer {
        let mut s = serializer.serialize_struct("Move", 2)?;
        s.serialize_field("from", &self.from)?;
        s.serialize_field("to", &self.to)?;
        s.end()
    }
}

struct MoveVisitor;
impl<'de> Visitor<'de> for MoveVisitor {
    type Value = Move;
    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a JSON object for Move")
    }
    fn visit_map<V>(self, mut map: V) -> Result<Move, V::Error> where V: MapAccess<'de> {
        let mut from = None;
        let mut to = None;
        while let Some(key) = map.next_key::<String>()? {
            let field = match key.as_str() {
                "from" => &mut from,
                "to" => &mut to,
                _ => { return Err(de::Error::unknown_field(&key, &["from", "to"])); }
            };
            *field = Some(map.next_value::<Position>()?);
        }
        let from = from.ok_or_else(|| de::Error::missing_field("from"))?;
        let to = to.ok_or_else(|| de::Error::missing_field("to"))?;
        Ok(Move { from, to })
    }
}

impl<'de> Deserialize<'de> for Move {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error> where D: Deserializer<'de> {
        deserializer.deserialize_map(MoveVisitor)
    }
}

#[cfg(test)]
#[path = "position_tests.rs"]
mod position_tests;
