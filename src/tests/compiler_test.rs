use super::super::{
    coords::{CoordinateTransform, Point},
    error::Error,
    path_command::PathCommand,
    shape_compiler::{compile_shape, ShapeCompiler, ShapeElement},
    shapes,
    units::UnitConverter,
};

#[test]
fn test_polygon_identity() {
    let elements = [ShapeElement::jump(-100.0, 100.0),
                    ShapeElement::line(0.0, 50.0),
                    ShapeElement::line(0.0, -50.0)];
    let shape = compile_shape(&elements, &CoordinateTransform::identity()).unwrap();
    assert_eq!(shape.commands(),
               &[PathCommand::jump(-100, 100),
                 PathCommand::line(0, 50),
                 PathCommand::line(0, -50)]);
}

#[test]
fn test_first_command_is_jump() {
    let t = CoordinateTransform::identity();
    let lit = [ShapeElement::line(5.0, 5.0), ShapeElement::line(6.0, 6.0)];
    assert_eq!(compile_shape(&lit, &t).unwrap()[0], PathCommand::jump(5, 5));
    let arc = [ShapeElement::arc(7.0, 8.0, 90.0)];
    assert_eq!(compile_shape(&arc, &t).unwrap()[0], PathCommand::jump(7, 8));
}

#[test]
fn test_jump_line_arc_mix() {
    let elements = [ShapeElement::jump(0.0, 0.0),
                    ShapeElement::arc(10.0, 0.0, 0.0),
                    ShapeElement::arc(20.0, 0.0, 1.0),
                    ShapeElement::jump(30.0, 0.0),
                    ShapeElement::line(40.0, 0.0)];
    let shape = compile_shape(&elements, &CoordinateTransform::default()).unwrap();
    assert_eq!(shape.commands(),
               &[PathCommand::jump(0, 0),
                 PathCommand::arc(10, 0, 0.0),
                 PathCommand::arc(20, 0, 1.0),
                 PathCommand::jump(30, 0),
                 PathCommand::line(40, 0)]);
}

#[test]
fn test_transform_applied_to_points_not_angles() {
    let t = CoordinateTransform::scale_xy(2.0, -1.0);
    let elements = [ShapeElement::jump(1.0, 1.0),
                    ShapeElement::arc(3.0, 4.0, 45.5)];
    let shape = compile_shape(&elements, &t).unwrap();
    assert_eq!(shape[0].point(), Point::new(2, -1));
    match shape[1] {
        PathCommand::Arc(p, a) => {
            assert_eq!(p, Point::new(6, -4));
            assert_relative_eq!(a, 45.5);
        }
        other => panic!("expected arc, got {}", other)
    }
}

#[test]
fn test_units_before_correction() {
    let compiler = ShapeCompiler::new(CoordinateTransform::scale_xy(0.5, 0.5))
        .with_units(UnitConverter::default());
    let shape = compiler.compile(&shapes::go_to(10.0, -3.0)).unwrap();
    // 330 bits, 165 after correction; -99 bits, -49.5 truncated
    assert_eq!(shape[0], PathCommand::jump(165, -49));
}

#[test]
fn test_empty_input() {
    let t = CoordinateTransform::identity();
    assert!(matches!(compile_shape(&[], &t), Err(Error::InvalidShape(_))));
}

#[test]
fn test_malformed_input() {
    let t = CoordinateTransform::identity();
    let bad_coord = [ShapeElement::jump(0.0, 0.0), ShapeElement::line(f64::NAN, 1.0)];
    assert!(matches!(compile_shape(&bad_coord, &t), Err(Error::InvalidShape(_))));
    let huge = [ShapeElement::jump(0.0, 0.0), ShapeElement::line(1.0e12, 1.0)];
    assert!(matches!(compile_shape(&huge, &t), Err(Error::InvalidShape(_))));
    let bad_angle = [ShapeElement::jump(0.0, 0.0),
                     ShapeElement::arc(1.0, 1.0, f64::INFINITY)];
    assert!(matches!(compile_shape(&bad_angle, &t), Err(Error::InvalidShape(_))));
}

#[test]
fn test_fractional_bits_rejected() {
    let t = CoordinateTransform::identity();
    let elements = [ShapeElement::jump(0.0, 0.0), ShapeElement::line(1.5, 2.0)];
    assert!(matches!(compile_shape(&elements, &t), Err(Error::InvalidShape(_))));
    // Micrometer input is converted and truncated, not rejected
    let compiler = ShapeCompiler::new(t).with_units(UnitConverter::default());
    let shape = compiler.compile(&elements).unwrap();
    assert_eq!(shape[1], PathCommand::line(49, 66));
}

#[test]
fn test_tagged_json_input() {
    let json = r#"[
        {"type": "point", "x": -100, "y": 100, "laser_on": false},
        {"type": "point", "x": 0, "y": 50, "laser_on": true},
        {"type": "arc", "x": 0, "y": -50, "angle_degrees": 1}
    ]"#;
    let elements: Vec<ShapeElement> = serde_json::from_str(json).unwrap();
    assert_eq!(elements[2], ShapeElement::arc(0.0, -50.0, 1.0));
    let shape = compile_shape(&elements, &CoordinateTransform::identity()).unwrap();
    assert_eq!(shape[1], PathCommand::line(0, 50));
    assert_eq!(shape[2], PathCommand::arc(0, -50, 1.0));
}

#[test]
fn test_repeated_cylinder() {
    let elements = shapes::repeat(&shapes::cylinder(100.0, 200.0), 2).unwrap();
    let shape = compile_shape(&elements, &CoordinateTransform::identity()).unwrap();
    assert_eq!(shape.len(), 12);
    // The second pass starts with a jump back to the lead-in
    assert_eq!(shape[6], PathCommand::jump(-100, 100));
    assert_eq!(shape[11], PathCommand::line(-100, -100));
}
