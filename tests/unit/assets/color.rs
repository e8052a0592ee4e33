use super::*;
use serde_json::json;

#[test]
fn parses_hex_forms() {
    assert_eq!(Color::parse("#ffffff").unwrap(), Color::WHITE);
    assert_eq!(Color::parse("#fff").unwrap(), Color::WHITE);
    assert_eq!(Color::parse("000").unwrap(), Color::BLACK);

    let c = Color::parse("#0000ff80").unwrap();
    assert!((c.b - 1.0).abs() < 1e-9);
    assert!((c.a - 128.0 / 255.0).abs() < 1e-9);
}

#[test]
fn parses_functional_forms() {
    let c = Color::parse("rgba(0,0,0,0.8)").unwrap();
    assert_eq!(c, Color::rgba(0.0, 0.0, 0.0, 0.8));
    let c = Color::parse("RGB(255, 0, 0)").unwrap();
    assert_eq!(c.to_rgba8(), [255, 0, 0, 255]);
}

#[test]
fn rejects_garbage() {
    assert!(Color::parse("#12345").is_err());
    assert!(Color::parse("#gggggg").is_err());
    assert!(Color::parse("rgba(1,2)").is_err());
    assert!(Color::parse("#ééé").is_err());
}

#[test]
fn premultiplies() {
    let p = Color::rgba(1.0, 0.5, 0.0, 0.5).to_rgba8_premul();
    assert_eq!(p.to_array(), [128, 64, 0, 128]);
}

#[test]
fn opacity_scales_alpha_only() {
    let c = Color::WHITE.with_opacity(0.25);
    assert_eq!(c.to_rgba8(), [255, 255, 255, 64]);
}

#[test]
fn deserializes_strings_and_objects() {
    let c: Color = serde_json::from_value(json!("#ff0000")).unwrap();
    assert_eq!(c, Color::rgba(1.0, 0.0, 0.0, 1.0));
    let c: Color = serde_json::from_value(json!({"r": 0.25, "g": 0.5, "b": 0.75})).unwrap();
    assert_eq!(c, Color::rgba(0.25, 0.5, 0.75, 1.0));
}
