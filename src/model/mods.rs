use std::fmt::{Debug, Formatter, Result as FmtResult};

use rosu_mods::{GameModIntermode, GameModsIntermode, GameModsLegacy};

/// Collection of game mods.
///
/// This type can be created through its `From<T>` implementations where `T`
/// can be
/// - `u32`
/// - [`rosu_mods::GameModsLegacy`]
/// - [`rosu_mods::GameModsIntermode`]
/// - [`&rosu_mods::GameModsIntermode`](rosu_mods::GameModsIntermode)
///
/// # Example
///
/// ```
/// use rosu_reading_pp::GameMods;
/// use rosu_mods::{GameModsIntermode, GameModsLegacy};
///
/// let int = GameMods::from(64 + 8);
/// let legacy = GameMods::from(GameModsLegacy::Hidden | GameModsLegacy::Easy);
/// let intermode = GameMods::from(GameModsIntermode::new());
/// ```
#[derive(Clone, PartialEq)]
pub struct GameMods {
    inner: GameModsInner,
}

impl Debug for GameMods {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self.inner {
            GameModsInner::Intermode(ref mods) => Debug::fmt(mods, f),
            GameModsInner::Legacy(ref mods) => Debug::fmt(mods, f),
        }
    }
}

/// Inner type of [`GameMods`] so that remote types contained in variants don't
/// need to be re-exported.
#[derive(Clone, PartialEq)]
enum GameModsInner {
    Intermode(GameModsIntermode),
    Legacy(GameModsLegacy),
}

impl GameMods {
    pub(crate) const DEFAULT: Self = Self {
        inner: GameModsInner::Legacy(GameModsLegacy::NoMod),
    };

    /// Returns the mods' clock rate.
    pub(crate) fn clock_rate(&self) -> f64 {
        match self.inner {
            GameModsInner::Intermode(ref mods) => mods.legacy_clock_rate(),
            GameModsInner::Legacy(mods) => mods.clock_rate(),
        }
    }

    pub(crate) fn od_ar_hp_multiplier(&self) -> f64 {
        if self.hr() {
            1.4
        } else if self.ez() {
            0.5
        } else {
            1.0
        }
    }

    /// The legacy bit representation; mods without one are ignored.
    pub fn bits(&self) -> u32 {
        match self.inner {
            GameModsInner::Intermode(ref mods) => mods.bits(),
            GameModsInner::Legacy(mods) => mods.bits(),
        }
    }

    /// Whether any of the given legacy bits are set.
    pub fn intersects_bits(&self, bits: u32) -> bool {
        self.bits() & bits != 0
    }
}

macro_rules! impl_has_mod {
    ( $( $fn:ident: $name:ident [ $s:literal ], )* ) => {
        impl GameMods {
            $(
                #[doc = "Check whether [`GameMods`] contain `"]
                #[doc = $s]
                #[doc = "`."]
                pub fn $fn(&self) -> bool {
                    match self.inner {
                        GameModsInner::Intermode(ref mods) => {
                            mods.contains(GameModIntermode::$name)
                        },
                        GameModsInner::Legacy(mods) => {
                            mods.contains(GameModsLegacy::$name)
                        },
                    }
                }
            )*
        }
    };
}

impl_has_mod! {
    nf: NoFail ["NoFail"],
    ez: Easy ["Easy"],
    td: TouchDevice ["TouchDevice"],
    hd: Hidden ["Hidden"],
    hr: HardRock ["HardRock"],
    rx: Relax ["Relax"],
    fl: Flashlight ["Flashlight"],
    so: SpunOut ["SpunOut"],
    dt: DoubleTime ["DoubleTime"],
    nc: Nightcore ["Nightcore"],
    ht: HalfTime ["HalfTime"],
    sv2: ScoreV2 ["ScoreV2"],
}

impl Default for GameMods {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl From<GameModsIntermode> for GameMods {
    fn from(mods: GameModsIntermode) -> Self {
        Self {
            inner: GameModsInner::Intermode(mods),
        }
    }
}

impl From<&GameModsIntermode> for GameMods {
    fn from(mods: &GameModsIntermode) -> Self {
        // Only legacy mods can skip the owned copy
        match mods.checked_bits() {
            Some(bits) => bits.into(),
            None => mods.to_owned().into(),
        }
    }
}

impl From<GameModsLegacy> for GameMods {
    fn from(mods: GameModsLegacy) -> Self {
        Self {
            inner: GameModsInner::Legacy(mods),
        }
    }
}

impl From<u32> for GameMods {
    fn from(bits: u32) -> Self {
        GameModsLegacy::from_bits(bits).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legacy_bits() {
        let mods = GameMods::from(8 + 16 + 64);

        assert!(mods.hd());
        assert!(mods.hr());
        assert!(mods.dt());
        assert!(!mods.fl());
        assert!((mods.clock_rate() - 1.5).abs() < f64::EPSILON);
        assert!((mods.od_ar_hp_multiplier() - 1.4).abs() < f64::EPSILON);
    }

    #[test]
    fn intermode() {
        let mut intermode = GameModsIntermode::new();
        intermode.insert(GameModIntermode::HalfTime);
        intermode.insert(GameModIntermode::Easy);

        let mods = GameMods::from(intermode);

        assert!(mods.ht());
        assert!(mods.ez());
        assert!((mods.clock_rate() - 0.75).abs() < f64::EPSILON);
        assert!((mods.od_ar_hp_multiplier() - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn bit_groups() {
        let mods = GameMods::from(GameModsLegacy::Hidden | GameModsLegacy::Flashlight);

        assert!(mods.intersects_bits(GameModsLegacy::Flashlight.bits()));
        assert!(!mods.intersects_bits(GameModsLegacy::HardRock.bits()));
        assert_eq!(GameMods::default().bits(), 0);
    }
}
