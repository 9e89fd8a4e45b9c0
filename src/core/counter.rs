use num_traits as num;
use std::fmt;

/// This trait represents the operations a histogram must be able to perform on the underlying
/// counter type. The `ToPrimitive` trait is needed to convert counts into `i64` for the snapshot
/// codec, and `FromPrimitive` to convert decoded counts back. Counts saturate instead of wrapping,
/// hence the `Saturating` bound.
pub trait Counter:
    num::Num
    + num::ToPrimitive
    + num::FromPrimitive
    + num::Saturating
    + Copy
    + PartialOrd<Self>
    + fmt::Debug
{
    /// Counter as a f64.
    fn as_f64(&self) -> f64;
    /// Counter as a u64.
    fn as_u64(&self) -> u64;
}

macro_rules! unsigned_counter {
    ($($t:ty),*) => {
        $(
            impl Counter for $t {
                #[inline]
                fn as_f64(&self) -> f64 {
                    *self as f64
                }
                #[inline]
                fn as_u64(&self) -> u64 {
                    u64::from(*self)
                }
            }
        )*
    };
}

unsigned_counter!(u8, u16, u32, u64);
