//! Tests for coordinates and image naming

use super::*;

#[test]
fn test_heading_degrees() {
    let degrees: Vec<u16> = Heading::ALL.iter().map(|h| h.degrees()).collect();
    assert_eq!(degrees, vec![2, 92, 182, 272]);
}

#[test]
fn test_heading_from_degrees() {
    assert_eq!(Heading::from_degrees(92), Some(Heading::East));
    assert_eq!(Heading::from_degrees(272), Some(Heading::West));
    assert_eq!(Heading::from_degrees(90), None);
}

#[test]
fn test_candidate_point_valid() {
    let point = CandidatePoint::new(40.7128, -74.0060, Heading::North);
    assert!(point.is_ok());
}

#[test]
fn test_candidate_point_invalid_latitude() {
    let result = CandidatePoint::new(91.0, 0.0, Heading::North);
    assert!(matches!(
        result.unwrap_err(),
        CoordError::InvalidLatitude(_)
    ));
}

#[test]
fn test_candidate_point_invalid_longitude() {
    let result = CandidatePoint::new(0.0, -181.0, Heading::South);
    assert!(matches!(
        result.unwrap_err(),
        CoordError::InvalidLongitude(_)
    ));
}

#[test]
fn test_image_filename_format() {
    assert_eq!(
        image_filename(40.7128, -74.006, Heading::East),
        "40.7128_-74.006_92.jpg"
    );
}

#[test]
fn test_image_filename_whole_degrees() {
    assert_eq!(image_filename(45.0, -73.0, Heading::North), "45_-73_2.jpg");
}

#[test]
fn test_coord_key_negative_zero() {
    assert_eq!(CoordKey::new(0.0, 10.0), CoordKey::new(-0.0, 10.0));
}

#[test]
fn test_coord_key_roundtrips_values() {
    let key = CoordKey::new(49.2827291, -123.1207375);
    assert_eq!(key.lat(), 49.2827291);
    assert_eq!(key.lon(), -123.1207375);
}

#[test]
fn test_point_key_matches_coord_key() {
    let point = CandidatePoint::new(51.5074, -0.1278, Heading::West).unwrap();
    assert_eq!(point.key(), CoordKey::new(51.5074, -0.1278));
}
