//! Change-region detection and new→old position translation.
//!
//! The region is found with a longest-common-prefix / longest-common-suffix
//! scan, which is enough for the single contiguous edits an editor sends
//! between two analyses. No diff algorithm is involved.

use crate::core::position::TextRange;

/// The differing span of two versions of one document.
///
/// Outside `old` and `new` the texts are byte-identical: `old[..old.start] ==
/// new[..new.start]` and `old[old.end..] == new[new.end..]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChangeRegion {
    pub old: TextRange,
    pub new: TextRange,
    pub old_len: usize,
    pub new_len: usize,
}

/// `None` when the texts are identical.
///
/// Prefix and suffix never overlap (`p + s <= min(old.len(), new.len())`) and
/// both stop on UTF-8 character boundaries of both texts.
pub fn detect_change_region(old: &str, new: &str) -> Option<ChangeRegion> {
    if old == new {
        return None;
    }
    let (a, b) = (old.as_bytes(), new.as_bytes());
    let shortest = a.len().min(b.len());

    let mut prefix = a.iter().zip(b).take_while(|(x, y)| x == y).count();
    while !(old.is_char_boundary(prefix) && new.is_char_boundary(prefix)) {
        prefix -= 1;
    }

    let mut suffix = a
        .iter()
        .rev()
        .zip(b.iter().rev())
        .take(shortest - prefix)
        .take_while(|(x, y)| x == y)
        .count();
    while !(old.is_char_boundary(a.len() - suffix) && new.is_char_boundary(b.len() - suffix)) {
        suffix -= 1;
    }

    Some(ChangeRegion {
        old: TextRange::new(prefix, a.len() - suffix),
        new: TextRange::new(prefix, b.len() - suffix),
        old_len: a.len(),
        new_len: b.len(),
    })
}

impl ChangeRegion {
    /// Map an offset in the new text to the old text.
    ///
    /// Before the region the offset is unchanged; after it the distance to the
    /// end of the text is preserved. Inside the region the offset is
    /// interpolated proportionally, which only picks a nearby anchor and says
    /// nothing about semantic correspondence.
    pub fn to_old_offset(&self, cursor: usize) -> usize {
        if cursor <= self.new.start {
            cursor
        } else if cursor >= self.new.end {
            keep_distance_to_end(cursor, self.new_len, self.old_len)
        } else {
            self.old.start + (cursor - self.new.start) * self.old.len() / self.new.len()
        }
    }

    /// Inverse direction: old text offset to new text offset.
    pub fn to_new_offset(&self, offset: usize) -> usize {
        if offset <= self.old.start {
            offset
        } else if offset >= self.old.end {
            keep_distance_to_end(offset, self.old_len, self.new_len)
        } else {
            self.new.start + (offset - self.old.start) * self.new.len() / self.old.len()
        }
    }

    /// Signed growth of the document.
    pub fn length_delta(&self) -> isize {
        self.new_len as isize - self.old_len as isize
    }

    pub fn is_pure_insertion(&self) -> bool {
        self.old.is_empty()
    }
}

/// Offset at or after the region in a text of `from_len`, moved to a text of
/// `to_len` with the same distance to the end. Offsets past the end stay past
/// the end (saturating at `usize::MAX`).
fn keep_distance_to_end(offset: usize, from_len: usize, to_len: usize) -> usize {
    match offset.checked_sub(from_len) {
        Some(past_end) => to_len.saturating_add(past_end),
        // the unchanged suffix is at most as long as either text
        None => to_len.saturating_sub(from_len - offset),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn identical_texts_have_no_region() {
        assert_eq!(detect_change_region("fun g() { 1 }", "fun g() { 1 }"), None);
        assert_eq!(detect_change_region("", ""), None);
    }

    #[test]
    fn single_character_replacement() {
        let region = detect_change_region("fun g() { 1 }", "fun g() { 2 }").expect("changed");
        assert_eq!(region.old, TextRange::new(10, 11));
        assert_eq!(region.new, TextRange::new(10, 11));
        assert_eq!(region.length_delta(), 0);
    }

    #[test]
    fn repeated_characters_do_not_overlap() {
        // "aa" -> "aaa": prefix 2 leaves nothing for the suffix
        let region = detect_change_region("aa", "aaa").expect("changed");
        assert_eq!(region.old, TextRange::new(2, 2));
        assert_eq!(region.new, TextRange::new(2, 3));
        assert!(region.is_pure_insertion());
    }

    #[test]
    fn boundaries_respect_utf8() {
        // 'д' (d0 b4) vs 'ж' (d0 b6): общий первый байт не входит в префикс
        let region = detect_change_region("xдy", "xжy").expect("changed");
        assert_eq!(region.old, TextRange::new(1, 3));
        assert_eq!(region.new, TextRange::new(1, 3));
    }

    #[test]
    fn translation_cases() {
        // old: "fun g() { 1 }" new: "fun g() { 12345 }"
        let region = detect_change_region("fun g() { 1 }", "fun g() { 12345 }").expect("changed");
        assert_eq!(region.old, TextRange::new(11, 11));
        assert_eq!(region.new, TextRange::new(11, 15));
        assert_eq!(region.to_old_offset(4), 4);
        assert_eq!(region.to_old_offset(11), 11);
        assert_eq!(region.to_old_offset(13), 11);
        assert_eq!(region.to_old_offset(16), 12);
        assert_eq!(region.to_old_offset(17), 13);
        assert_eq!(region.to_new_offset(12), 16);
    }

    #[test]
    fn proportional_interpolation_inside_region() {
        let region = ChangeRegion { old: TextRange::new(10, 12), new: TextRange::new(10, 18), old_len: 20, new_len: 26 };
        assert_eq!(region.to_old_offset(14), 11);
        assert_eq!(region.to_old_offset(17), 11);
        assert_eq!(region.to_new_offset(11), 14);
        // past the end keeps the distance to the end
        assert_eq!(region.to_old_offset(30), 24);
    }

    #[test]
    fn huge_offsets_saturate() {
        let growing = detect_change_region("fun f() { 1 }", "fun f() { 12 }").expect("changed");
        assert_eq!(growing.to_old_offset(usize::MAX), usize::MAX - 1);
        assert_eq!(growing.to_new_offset(usize::MAX), usize::MAX);

        let shrinking = detect_change_region("fun f() { 12 }", "fun f() { 1 }").expect("changed");
        assert_eq!(shrinking.to_old_offset(usize::MAX), usize::MAX);
        assert_eq!(shrinking.to_new_offset(usize::MAX), usize::MAX - 1);
    }
}
