//! Guitar fretboard used to render hints.
//!
//! Strings are listed from the highest (thin E) to the lowest, matching how a
//! fretboard diagram is drawn top to bottom.

use crate::pitch::PitchClass;

/// Open-string pitch classes of standard tuning, high to low: E B G D A E.
pub const STANDARD_TUNING: [PitchClass; 6] = [
    PitchClass::E,
    PitchClass::B,
    PitchClass::G,
    PitchClass::D,
    PitchClass::A,
    PitchClass::E,
];

/// Frets shown per string, open string included.
pub const FRET_COUNT: u8 = 12;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fretboard {
    strings: Vec<PitchClass>,
    frets: u8,
}

impl Default for Fretboard {
    fn default() -> Self {
        Fretboard::standard()
    }
}

impl Fretboard {
    /// Six strings in standard tuning, frets 0 to 11.
    pub fn standard() -> Self {
        Fretboard::new(STANDARD_TUNING.to_vec(), FRET_COUNT)
    }

    pub fn new(strings: Vec<PitchClass>, frets: u8) -> Self {
        Fretboard { strings, frets }
    }

    pub fn strings(&self) -> &[PitchClass] {
        &self.strings
    }

    pub fn frets(&self) -> u8 {
        self.frets
    }

    /// Pitch class sounding at `fret` on `string`, `None` off the board.
    pub fn note_on_fret(&self, string: usize, fret: u8) -> Option<PitchClass> {
        if fret >= self.frets {
            return None;
        }
        self.strings
            .get(string)
            .map(|open| open.transpose(fret as i32))
    }

    pub fn is_highlighted(&self, string: usize, fret: u8, highlighted: &[PitchClass]) -> bool {
        self.note_on_fret(string, fret)
            .is_some_and(|pc| highlighted.contains(&pc))
    }

    /// Every `(string, fret)` sounding one of `highlighted`, string-major.
    pub fn positions_of(&self, highlighted: &[PitchClass]) -> Vec<(usize, u8)> {
        (0..self.strings.len())
            .flat_map(|string| (0..self.frets).map(move |fret| (string, fret)))
            .filter(|&(string, fret)| self.is_highlighted(string, fret, highlighted))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pitch::pitch_class_of;
    use pretty_assertions::assert_eq;

    #[test]
    fn standard_tuning_open_strings() {
        let board = Fretboard::standard();
        let names: Vec<&str> = (0..6)
            .map(|s| board.note_on_fret(s, 0).unwrap().name())
            .collect();
        assert_eq!(names, vec!["E", "B", "G", "D", "A", "E"]);
    }

    #[test]
    fn frets_walk_up_by_semitone() {
        let board = Fretboard::standard();
        assert_eq!(board.note_on_fret(5, 5), Some(PitchClass::A));
        assert_eq!(board.note_on_fret(1, 1), Some(PitchClass::C));
        assert_eq!(board.note_on_fret(2, 11).unwrap().name(), "F#");
        assert_eq!(board.note_on_fret(0, 12), None);
        assert_eq!(board.note_on_fret(6, 0), None);
    }

    #[test]
    fn each_pitch_class_appears_once_per_string() {
        let board = Fretboard::standard();
        let c_sharp = pitch_class_of("C#").unwrap();
        let positions = board.positions_of(&[c_sharp]);
        assert_eq!(positions.len(), 6);
        assert!(positions.contains(&(4, 4)));
        assert!(board.is_highlighted(4, 4, &[c_sharp]));
        assert!(!board.is_highlighted(4, 3, &[c_sharp]));
    }

    #[test]
    fn nothing_highlighted_for_empty_hint() {
        assert!(Fretboard::standard().positions_of(&[]).is_empty());
    }
}
