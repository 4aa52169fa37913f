//! Canned shapes in micrometers, ready for a compiler set up with
//! [`UnitConverter`](crate::units::UnitConverter).

use crate::error::{Error, Result};
use crate::shape_compiler::ShapeElement;

/// Rectangle with its lower left corner at `origin`.
pub fn rectangle(width: f64, height: f64, origin: (f64, f64)) -> Vec<ShapeElement>
{
    let (x0, y0) = origin;
    vec![ShapeElement::jump(x0, y0),
         ShapeElement::line(x0 + width, y0),
         ShapeElement::line(x0 + width, y0 + height),
         ShapeElement::line(x0, y0 + height),
         ShapeElement::line(x0, y0)]
}

pub fn square(size: f64) -> Vec<ShapeElement>
{
    rectangle(size, size, (0.0, 0.0))
}

/// Park the beam at the field centre.
pub fn home() -> Vec<ShapeElement>
{
    go_to(0.0, 0.0)
}

pub fn go_to(x: f64, y: f64) -> Vec<ShapeElement>
{
    vec![ShapeElement::jump(x, y)]
}

/// Cylinder outline: lead-in from the upper left, the body of `length`
/// and `width` starting at the origin, lead-out to the lower left.
pub fn cylinder(width: f64, length: f64) -> Vec<ShapeElement>
{
    let half = width / 2.0;
    vec![ShapeElement::jump(-width, width),
         ShapeElement::line(0.0, half),
         ShapeElement::line(length, half),
         ShapeElement::line(length, -half),
         ShapeElement::line(0.0, -half),
         ShapeElement::line(-width, -width)]
}

/// Repeats the elements `passes` times, one after another.
pub fn repeat(elements: &[ShapeElement], passes: usize) -> Result<Vec<ShapeElement>>
{
    let total = match elements.len().checked_mul(passes) {
        Some(n) => n,
        None => return Err(Error::InvalidShape(
            format!("{} passes of {} elements is too many", passes, elements.len())))
    };
    let mut out = Vec::with_capacity(total);
    for _ in 0..passes {
        out.extend_from_slice(elements);
    }
    Ok(out)
}

#[test]
fn test_rectangle_closes()
{
    let r = rectangle(10.0, 5.0, (1.0, 2.0));
    assert_eq!(r.len(), 5);
    assert_eq!(r[0], ShapeElement::jump(1.0, 2.0));
    assert_eq!(r[2], ShapeElement::line(11.0, 7.0));
    assert_eq!(r[4], ShapeElement::line(1.0, 2.0));
}

#[test]
fn test_repeat()
{
    let c = cylinder(100.0, 200.0);
    assert_eq!(c[1], ShapeElement::line(0.0, 50.0));
    let r = repeat(&c, 3).unwrap();
    assert_eq!(r.len(), 18);
    assert_eq!(r[6], c[0]);
    assert!(repeat(&c, 0).unwrap().is_empty());
}

#[test]
fn test_repeat_overflow()
{
    let c = cylinder(100.0, 200.0);
    assert!(matches!(repeat(&c, usize::MAX), Err(Error::InvalidShape(_))));
}
