use super::*;

#[test]
fn farm_name_accepts_plain_text() {
    assert!(farm_name("North Field 2").is_ok());
    assert!(farm_name("Sítio São João").is_ok());
}

#[test]
fn farm_name_required_after_trim() {
    let err = farm_name("   ").unwrap_err();
    assert_eq!(err.field, "farmName");
    assert_eq!(err.message, "Farm name is required");
}

#[test]
fn farm_name_length_limit() {
    assert!(farm_name(&"a".repeat(100)).is_ok());
    let err = farm_name(&"a".repeat(101)).unwrap_err();
    assert!(err.message.contains("less than 100"));
}

#[test]
fn farm_name_rejects_script_block() {
    let err = farm_name("<script>alert(1)</script>").unwrap_err();
    assert_eq!(err.message, "Script tags are not allowed");
}

#[test]
fn farm_name_rejects_html() {
    let err = farm_name("my <b>farm</b>").unwrap_err();
    assert_eq!(err.message, "HTML tags are not allowed");
}

#[test]
fn farm_name_rejects_urls() {
    assert_eq!(
        farm_name("see https://example.com").unwrap_err().message,
        "URLs are not allowed"
    );
    assert_eq!(
        farm_name("www.farm.example").unwrap_err().message,
        "URLs are not allowed"
    );
}

#[test]
fn farm_name_allows_comparison_signs_without_tags() {
    assert!(farm_name("Plot < 5ha").is_ok());
}

#[test]
fn coordinate_messages() {
    assert_eq!(
        latitude_text("").unwrap_err().message,
        "Latitude is required"
    );
    assert_eq!(
        latitude_text("95").unwrap_err().message,
        "Latitude must be between -90 and 90"
    );
    assert_eq!(
        longitude_text("east").unwrap_err().message,
        "Longitude must be between -180 and 180"
    );
    assert!(longitude_text("-180").is_ok());
}

#[test]
fn location_form_reports_every_bad_field() {
    let errors = location_form("", "", "200").unwrap_err();
    let fields: Vec<_> = errors.iter().map(|e| e.field).collect();
    assert_eq!(fields, vec!["farmName", "latitude", "longitude"]);
}

#[test]
fn location_form_ok() {
    assert!(location_form("Home", "35.6762", "139.6503").is_ok());
}

#[test]
fn login_rules() {
    assert!(login("grower@example.com", "secret1").is_ok());
    let errors = login("not-an-email", "123").unwrap_err();
    assert_eq!(errors.len(), 2);
    assert!(login("a@b", "secret1").is_err());
    assert!(login("a@@b.com", "secret1").is_err());
    assert!(login("a b@c.com", "secret1").is_err());
}

#[test]
fn profile_name_rules() {
    assert!(profile_name("Ana").is_ok());
    assert_eq!(profile_name("").unwrap_err().message, "Name is required");
    assert_eq!(
        profile_name(&"x".repeat(101)).unwrap_err().message,
        "Name is too long"
    );
}

#[test]
fn prediction_search_rules() {
    assert!(prediction_search("corn", "loc1").is_ok());
    let errors = prediction_search("", "").unwrap_err();
    assert_eq!(errors.len(), 2);
}
