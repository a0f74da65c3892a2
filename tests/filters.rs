//! Match-type and strand-type filters applied through the forest.

use gtftree::{IntervalForest, MatchType, Strand, StrandType};
use pretty_assertions::assert_eq;
use rstest::{fixture, rstest};

#[fixture]
fn forest() -> IntervalForest {
    let mut forest = IntervalForest::new();
    forest.add_entry("chr1", 100, 200, "same", Strand::Plus, 0).unwrap();
    forest.add_entry("chr1", 50, 300, "outer", Strand::Minus, 0).unwrap();
    forest.add_entry("chr1", 120, 180, "inner", Strand::Unknown, 0).unwrap();
    forest.add_entry("chr1", 100, 150, "head", Strand::Minus, 0).unwrap();
    forest.add_entry("chr1", 150, 200, "tail", Strand::Plus, 0).unwrap();
    forest.add_entry("chr1", 190, 400, "right", Strand::Unknown, 0).unwrap();
    forest.finish().unwrap();
    forest
}

fn names(
    forest: &IntervalForest,
    strand: Strand,
    match_type: MatchType,
    strand_type: StrandType,
) -> Vec<String> {
    forest
        .find_overlaps("chr1", 100, 200, strand, match_type, strand_type)
        .unwrap()
        .into_iter()
        .map(|m| m.name)
        .collect()
}

#[rstest]
#[case::any(MatchType::Any, &["outer", "head", "same", "inner", "tail", "right"])]
#[case::exact(MatchType::Exact, &["same"])]
#[case::contain(MatchType::Contain, &["outer", "same"])]
#[case::within(MatchType::Within, &["head", "same", "inner", "tail"])]
#[case::start(MatchType::Start, &["head", "same"])]
#[case::end(MatchType::End, &["same", "tail"])]
fn test_match_types(
    forest: IntervalForest,
    #[case] match_type: MatchType,
    #[case] expected: &[&str],
) {
    assert_eq!(
        names(&forest, Strand::Unknown, match_type, StrandType::Ignore),
        expected
    );
}

#[rstest]
#[case::ignore_plus(Strand::Plus, StrandType::Ignore, &["outer", "head", "same", "inner", "tail", "right"])]
#[case::same_plus(Strand::Plus, StrandType::Same, &["same", "tail"])]
#[case::same_unspecified(Strand::Unknown, StrandType::Same, &[])]
#[case::opposite_plus(Strand::Plus, StrandType::Opposite, &["outer", "head"])]
#[case::opposite_unspecified(Strand::Unknown, StrandType::Opposite, &[])]
#[case::exact_same_minus(Strand::Minus, StrandType::ExactSame, &["outer", "head"])]
#[case::exact_same_unspecified(Strand::Unknown, StrandType::ExactSame, &["inner", "right"])]
fn test_strand_types(
    forest: IntervalForest,
    #[case] strand: Strand,
    #[case] strand_type: StrandType,
    #[case] expected: &[&str],
) {
    assert_eq!(names(&forest, strand, MatchType::Any, strand_type), expected);
}

#[rstest]
fn test_filters_combine(forest: IntervalForest) {
    assert_eq!(
        names(&forest, Strand::Plus, MatchType::Within, StrandType::Same),
        vec!["same", "tail"]
    );
    assert_eq!(
        names(&forest, Strand::Plus, MatchType::Contain, StrandType::Opposite),
        vec!["outer"]
    );
}

#[rstest]
#[case(0, MatchType::Any)]
#[case(3, MatchType::Within)]
#[case(5, MatchType::End)]
fn test_match_type_codes(#[case] code: u8, #[case] expected: MatchType) {
    assert_eq!(MatchType::try_from(code).unwrap(), expected);
    assert_eq!(expected.code(), code);
}

#[rstest]
#[case("exact-same", StrandType::ExactSame)]
#[case("EXACT_SAME", StrandType::ExactSame)]
#[case("opposite", StrandType::Opposite)]
fn test_strand_type_names(#[case] name: &str, #[case] expected: StrandType) {
    assert_eq!(name.parse::<StrandType>().unwrap(), expected);
}

#[test]
fn test_unknown_codes_rejected() {
    assert!(MatchType::try_from(6).is_err());
    assert!(StrandType::try_from(4).is_err());
    assert!(Strand::from_code(2).is_err());
}
