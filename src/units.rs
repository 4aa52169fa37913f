use num::ToPrimitive;
use static_assertions::const_assert;

/// Scanner bits per micrometer at the working plane. Measured, not derived
/// from the calibration factor.
pub const BITS_PER_UM: u32 = 33;

const_assert!(BITS_PER_UM > 0);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnitConverter
{
    pub bits_per_um: f64
}

impl UnitConverter
{
    pub fn new(bits_per_um: f64) -> UnitConverter
    {
        UnitConverter {bits_per_um}
    }

    /// Length in micrometers to device bits, truncated toward zero.
    pub fn um_to_bits(&self, length_um: f64) -> i32
    {
        (length_um * self.bits_per_um).trunc() as i32
    }

    /// As `um_to_bits` but `None` when the result does not fit a coordinate.
    pub fn try_um_to_bits(&self, length_um: f64) -> Option<i32>
    {
        (length_um * self.bits_per_um).trunc().to_i32()
    }
}

impl Default for UnitConverter
{
    fn default() -> UnitConverter {
        UnitConverter {bits_per_um: BITS_PER_UM as f64}
    }
}

#[test]
fn test_um_to_bits()
{
    let u = UnitConverter::default();
    assert_eq!(u.um_to_bits(0.0), 0);
    assert_eq!(u.um_to_bits(1.0), 33);
    assert_eq!(u.um_to_bits(-100.0), -3300);
    for n in &[1.0, 7.0, 250.0, -13.0] {
        assert_eq!(u.um_to_bits(2.0 * n), 2 * u.um_to_bits(*n));
    }
}

#[test]
fn test_out_of_range()
{
    let u = UnitConverter::default();
    assert_eq!(u.try_um_to_bits(1.0e9), None);
    assert_eq!(u.try_um_to_bits(f64::NAN), None);
    assert_eq!(u.try_um_to_bits(-10.0), Some(-330));
}

#[test]
fn test_fractional_scale_truncates()
{
    let u = UnitConverter::new(2.5);
    assert_eq!(u.um_to_bits(3.0), 7);
    assert_eq!(u.um_to_bits(-3.0), -7);
}
