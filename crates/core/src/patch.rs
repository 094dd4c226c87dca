use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A field in a partial update: either left out of the request or supplied.
///
/// Use with `#[serde(default)]` so a missing key deserializes as `Absent`.
/// For nullable columns wrap an `Option`, so `null` becomes `Present(None)`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Patch<T> {
    #[default]
    Absent,
    Present(T),
}

impl<T> Patch<T> {
    pub fn is_absent(&self) -> bool {
        matches!(self, Patch::Absent)
    }

    pub fn as_present(&self) -> Option<&T> {
        match self {
            Patch::Present(value) => Some(value),
            Patch::Absent => None,
        }
    }

    /// Overwrite `target` if a value was supplied.
    pub fn apply_to(&self, target: &mut T)
    where
        T: Clone,
    {
        if let Patch::Present(value) = self {
            *target = value.clone();
        }
    }
}

impl<'de, T> Deserialize<'de> for Patch<T>
where
    T: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        T::deserialize(deserializer).map(Patch::Present)
    }
}

impl<T> Serialize for Patch<T>
where
    T: Serialize,
{
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Patch::Present(value) => value.serialize(serializer),
            Patch::Absent => serializer.serialize_none(),
        }
    }
}
