use covenant::effects::{parse_failure_list, FailureId};

#[test]
fn every_known_failure_name_round_trips_through_parse_and_as_str() {
    for name in ["PrintErr", "IOErr", "TimeErr", "RandomErr", "DivideByZero", "UnexpectedErr"] {
        let fid = FailureId::parse(name).unwrap_or_else(|| panic!("{name} should parse"));
        assert_eq!(fid.as_str(), name);
    }
}

#[test]
fn an_unknown_failure_name_does_not_parse() {
    assert!(FailureId::parse("NotARealFailure").is_none());
}

#[test]
fn never_alone_yields_an_empty_set() {
    let set = parse_failure_list(&["Never".to_string()]).unwrap();
    assert!(set.is_empty());
}

#[test]
fn never_combined_with_anything_else_is_rejected() {
    assert!(parse_failure_list(&["Never".to_string(), "PrintErr".to_string()]).is_err());
}

#[test]
fn duplicate_failure_names_are_rejected() {
    assert!(parse_failure_list(&["PrintErr".to_string(), "PrintErr".to_string()]).is_err());
}

#[test]
fn distinct_failure_names_accumulate_into_one_set() {
    let set = parse_failure_list(&["PrintErr".to_string(), "IOErr".to_string()]).unwrap();
    assert_eq!(set.len(), 2);
    assert!(set.contains(&FailureId::PrintErr));
    assert!(set.contains(&FailureId::IOErr));
}

#[test]
fn an_unrecognized_name_in_the_list_is_rejected() {
    assert!(parse_failure_list(&["TotallyUnknown".to_string()]).is_err());
}

#[test]
fn an_empty_list_is_an_empty_set() {
    let set = parse_failure_list(&[]).unwrap();
    assert!(set.is_empty());
}
