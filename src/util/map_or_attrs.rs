use crate::{osu::OsuDifficultyAttributes, Beatmap, Difficulty};

/// Either a beatmap that still needs a difficulty calculation or the
/// attributes of a previous one.
#[derive(Clone, Debug, PartialEq)]
pub enum MapOrAttrs<'map> {
    Map(&'map Beatmap),
    Attrs(OsuDifficultyAttributes),
}

impl MapOrAttrs<'_> {
    /// Return a reference to the attributes.
    ///
    /// If `self` is of variant `Map`, calculate the attributes with the given
    /// [`Difficulty`] and store them in `self` first.
    pub fn attrs_or_calculate(&mut self, difficulty: &Difficulty) -> &OsuDifficultyAttributes {
        if let Self::Map(map) = *self {
            *self = Self::Attrs(difficulty.calculate(map));
        }

        let Self::Attrs(ref attrs) = *self else {
            unreachable!()
        };

        attrs
    }
}

impl<'map> From<&'map Beatmap> for MapOrAttrs<'map> {
    fn from(map: &'map Beatmap) -> Self {
        Self::Map(map)
    }
}

impl From<OsuDifficultyAttributes> for MapOrAttrs<'_> {
    fn from(attrs: OsuDifficultyAttributes) -> Self {
        Self::Attrs(attrs)
    }
}
