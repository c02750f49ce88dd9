use proptest::prelude::*;

use scoped_reanalysis::detect_change_region;

fn document() -> impl Strategy<Value = String> {
    // ASCII source with some multi-byte characters mixed in
    proptest::string::string_regex("[a-c{} \n(é€)]{0,24}").expect("valid regex")
}

proptest! {
    #[test]
    fn identical_texts_never_produce_a_region(text in document()) {
        prop_assert_eq!(detect_change_region(&text, &text), None);
    }

    #[test]
    fn texts_agree_outside_the_region(old in document(), new in document()) {
        prop_assume!(old != new);
        let region = detect_change_region(&old, &new).expect("texts differ");

        prop_assert_eq!(region.old.start, region.new.start);
        prop_assert_eq!(&old[..region.old.start], &new[..region.new.start]);
        prop_assert_eq!(&old[region.old.end..], &new[region.new.end..]);
        prop_assert_eq!(old.len() - region.old.end, new.len() - region.new.end);
        prop_assert!(region.old.start <= region.old.end);
        prop_assert!(region.new.start <= region.new.end);
    }

    #[test]
    fn region_boundaries_translate_onto_each_other(old in document(), new in document()) {
        prop_assume!(old != new);
        let region = detect_change_region(&old, &new).expect("texts differ");

        prop_assert_eq!(region.to_old_offset(region.new.start), region.old.start);
        if !region.new.is_empty() {
            prop_assert_eq!(region.to_old_offset(region.new.end), region.old.end);
        }
        prop_assert_eq!(region.to_old_offset(new.len()), old.len());
        prop_assert_eq!(region.to_new_offset(old.len()), new.len());
    }

    #[test]
    fn translation_preserves_order(old in document(), new in document()) {
        prop_assume!(old != new);
        let region = detect_change_region(&old, &new).expect("texts differ");

        let mapped: Vec<usize> = (0..=new.len()).map(|cursor| region.to_old_offset(cursor)).collect();
        prop_assert!(mapped.windows(2).all(|w| w[0] <= w[1]));
        prop_assert!(mapped.iter().all(|offset| *offset <= old.len()));
    }

    #[test]
    fn single_splice_is_recovered(
        prefix in "[a-z ]{0,10}",
        removed in "[0-9]{1,5}",
        inserted in "[A-Z]{0,5}",
        suffix in "[a-z ]{0,10}",
    ) {
        let old = format!("{prefix}{removed}{suffix}");
        let new = format!("{prefix}{inserted}{suffix}");
        let region = detect_change_region(&old, &new).expect("digits never survive the splice");

        // the splice can only be narrower than what was replaced
        prop_assert!(region.old.start >= prefix.len());
        prop_assert!(region.old.end <= prefix.len() + removed.len());
        prop_assert_eq!(region.length_delta(), inserted.len() as isize - removed.len() as isize);
    }
}
